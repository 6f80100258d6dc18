//! Class hierarchy queries.
//!
//! A [`ClassSymbol`] is a borrowed view of a class symbol. Superclass graphs
//! may contain cycles (`class A(B)` / `class B(A)` across rebinding), so every
//! traversal carries a visited set and terminates.
//!
//! Reading the superclasses, directly or through a hierarchy query, freezes
//! them; resolving a member freezes the members. Mutations after that fail
//! with [`SymbolTableError::Protocol`](crate::SymbolTableError::Protocol).

use std::collections::HashSet;

use tuglint_core::TextRange;

use crate::symbol::{ClassData, Symbol, SymbolId};
use crate::table::SymbolTable;

/// A class symbol together with the table it lives in.
#[derive(Debug, Clone, Copy)]
pub struct ClassSymbol<'t> {
    table: &'t SymbolTable,
    id: SymbolId,
    data: &'t ClassData,
}

impl<'t> ClassSymbol<'t> {
    pub(crate) fn new(table: &'t SymbolTable, id: SymbolId) -> Option<Self> {
        let data = table.symbol(id).class_data()?;
        Some(ClassSymbol { table, id, data })
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn symbol(&self) -> &'t Symbol {
        self.table.symbol(self.id)
    }

    pub fn name(&self) -> &'t str {
        &self.symbol().name
    }

    pub fn fully_qualified_name(&self) -> Option<&'t str> {
        self.symbol().fully_qualified_name.as_deref()
    }

    pub fn has_decorators(&self) -> bool {
        self.data.has_decorators
    }

    /// Range of the class name, for symbols built from source.
    pub fn definition(&self) -> Option<TextRange> {
        self.data.definition
    }

    /// Direct superclasses in declaration order. Freezes them.
    pub fn superclasses(&self) -> &'t [SymbolId] {
        self.data.superclasses_frozen.set(true);
        &self.data.superclasses
    }

    /// Members declared directly in the class, without freezing them.
    pub fn declared_members(&self) -> &'t [SymbolId] {
        &self.data.members
    }

    /// Whether some class in the transitive hierarchy has a superclass that
    /// cannot be followed: a superclass expression without a symbol, or a
    /// superclass symbol that is not a class.
    ///
    /// Freezes the superclasses of every class it visits.
    pub fn has_unresolved_type_hierarchy(&self) -> bool {
        let mut visited = HashSet::new();
        self.unresolved_from(self.id, &mut visited)
    }

    fn unresolved_from(&self, class: SymbolId, visited: &mut HashSet<SymbolId>) -> bool {
        if !visited.insert(class) {
            return false;
        }
        let Some(data) = self.table.symbol(class).class_data() else {
            return true;
        };
        data.superclasses_frozen.set(true);
        if data.has_super_class_without_symbol {
            return true;
        }
        data.superclasses
            .iter()
            .any(|&superclass| self.unresolved_from(superclass, visited))
    }

    /// Whether this class is `other` or transitively extends it. Two symbols
    /// match when they are the same symbol or share a fully qualified name.
    pub fn is_or_extends(&self, other: SymbolId) -> bool {
        let target = self.table.symbol(other).fully_qualified_name.as_deref();
        let mut visited = HashSet::new();
        self.walk_hierarchy(self.id, &mut visited, &mut |id, symbol| {
            id == other || (target.is_some() && symbol.fully_qualified_name.as_deref() == target)
        })
    }

    /// Whether this class or a transitive superclass has the fully qualified
    /// name `fully_qualified_name`. Short names never match.
    pub fn is_or_extends_name(&self, fully_qualified_name: &str) -> bool {
        let mut visited = HashSet::new();
        self.walk_hierarchy(self.id, &mut visited, &mut |_, symbol| {
            symbol.fully_qualified_name.as_deref() == Some(fully_qualified_name)
        })
    }

    /// Depth-first search over the hierarchy from `class`, following only
    /// class superclasses. Freezes superclasses along the way.
    fn walk_hierarchy(
        &self,
        class: SymbolId,
        visited: &mut HashSet<SymbolId>,
        matches: &mut dyn FnMut(SymbolId, &Symbol) -> bool,
    ) -> bool {
        if !visited.insert(class) {
            return false;
        }
        let symbol = self.table.symbol(class);
        if matches(class, symbol) {
            return true;
        }
        let Some(data) = symbol.class_data() else {
            return false;
        };
        data.superclasses_frozen.set(true);
        data.superclasses
            .iter()
            .any(|&superclass| self.walk_hierarchy(superclass, visited, matches))
    }

    /// The member named `name`: a declared member first, then the first match
    /// in a depth-first walk of the superclasses in declaration order.
    ///
    /// Freezes the members of every class it searches. Superclasses are read
    /// but not frozen.
    pub fn resolve_member(&self, name: &str) -> Option<SymbolId> {
        let mut visited = HashSet::new();
        self.resolve_from(self.id, name, &mut visited)
    }

    fn resolve_from(&self, class: SymbolId, name: &str, visited: &mut HashSet<SymbolId>) -> Option<SymbolId> {
        if !visited.insert(class) {
            return None;
        }
        let data = self.table.symbol(class).class_data()?;
        data.members_frozen.set(true);
        if let Some(&member) = data
            .members
            .iter()
            .find(|&&member| self.table.symbol(member).name == name)
        {
            return Some(member);
        }
        data.superclasses
            .iter()
            .find_map(|&superclass| self.resolve_from(superclass, name, visited))
    }

    /// Whether an attribute `name` may exist on instances: either the member
    /// resolves or the hierarchy cannot be fully known.
    pub fn can_have_member(&self, name: &str) -> bool {
        self.has_unresolved_type_hierarchy() || self.resolve_member(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::FunctionData;

    fn fqn(name: &str) -> Option<String> {
        Some(format!("mod1.{}", name))
    }

    #[test]
    fn test_cycle_terminates_and_is_resolved() {
        let mut table = SymbolTable::new("mod1");
        let x = table.add_class_symbol("x", fqn("x"));
        let y = table.add_class_symbol("y", fqn("y"));
        let z = table.add_class_symbol("z", fqn("z"));
        table.add_super_class(x, y).unwrap();
        table.add_super_class(y, z).unwrap();
        table.add_super_class(z, x).unwrap();

        let class = table.class_symbol(x).unwrap();
        assert!(!class.has_unresolved_type_hierarchy());
        assert!(class.is_or_extends(y));
        assert!(class.is_or_extends_name("mod1.z"));
        assert!(!class.is_or_extends_name("mod1.a"));
        assert_eq!(class.resolve_member("missing"), None);
    }

    #[test]
    fn test_is_or_extends_name_uses_fully_qualified_name() {
        let mut table = SymbolTable::new("mod1");
        let a = table.add_class_symbol("a", fqn("a"));
        let class = table.class_symbol(a).unwrap();
        assert!(class.is_or_extends_name("mod1.a"));
        assert!(!class.is_or_extends_name("a"));
    }

    #[test]
    fn test_is_or_extends_matches_by_fully_qualified_name() {
        let mut table = SymbolTable::new("mod1");
        let a = table.add_class_symbol("a", fqn("a"));
        let b = table.add_class_symbol("b", fqn("b"));
        let other_b = table.add_other_symbol("b", fqn("b"));
        table.add_super_class(a, b).unwrap();
        let class = table.class_symbol(a).unwrap();
        assert!(class.is_or_extends(a));
        assert!(class.is_or_extends(other_b));
    }

    #[test]
    fn test_non_class_superclass_is_unresolved() {
        let mut table = SymbolTable::new("mod1");
        let a = table.add_class_symbol("a", fqn("a"));
        let b = table.add_class_symbol("b", fqn("b"));
        let f = table.add_function_symbol("f", fqn("f"), FunctionData::default());
        table.add_super_class(a, b).unwrap();
        table.add_super_class(b, f).unwrap();

        assert!(table.class_symbol(a).unwrap().has_unresolved_type_hierarchy());
        assert!(table.class_symbol(b).unwrap().has_unresolved_type_hierarchy());
    }

    #[test]
    fn test_superclass_without_symbol_propagates() {
        let mut table = SymbolTable::new("mod1");
        let a = table.add_class_symbol("a", fqn("a"));
        let b = table.add_class_symbol("b", fqn("b"));
        table.add_super_class(a, b).unwrap();
        table.set_has_super_class_without_symbol(b).unwrap();
        assert!(table.class_symbol(a).unwrap().has_unresolved_type_hierarchy());
        assert!(table.class_symbol(a).unwrap().can_have_member("anything"));
    }

    #[test]
    fn test_hierarchy_query_freezes_every_visited_class() {
        let mut table = SymbolTable::new("mod1");
        let a = table.add_class_symbol("a", fqn("a"));
        let b = table.add_class_symbol("b", fqn("b"));
        let c = table.add_class_symbol("c", fqn("c"));
        table.add_super_class(a, b).unwrap();
        assert!(!table.class_symbol(a).unwrap().has_unresolved_type_hierarchy());
        assert!(table.add_super_class(b, c).is_err());
        assert!(table.symbol(b).class_data().unwrap().is_superclasses_frozen());
        assert!(!table.symbol(b).class_data().unwrap().is_members_frozen());
    }

    #[test]
    fn test_own_member_overrides_inherited() {
        let mut table = SymbolTable::new("mod1");
        let parent = table.add_class_symbol("parent", fqn("parent"));
        let child = table.add_class_symbol("child", fqn("child"));
        let inherited = table.add_other_symbol("run", fqn("parent.run"));
        let own = table.add_other_symbol("run", fqn("child.run"));
        let only_parent = table.add_other_symbol("stop", fqn("parent.stop"));
        table.add_members(parent, [inherited, only_parent]).unwrap();
        table.add_members(child, [own]).unwrap();
        table.add_super_class(child, parent).unwrap();

        let class = table.class_symbol(child).unwrap();
        assert_eq!(class.resolve_member("run"), Some(own));
        assert_eq!(class.resolve_member("stop"), Some(only_parent));
        assert!(class.can_have_member("stop"));
        assert!(!class.can_have_member("jump"));
    }

    #[test]
    fn test_resolve_member_searches_superclasses_in_order() {
        let mut table = SymbolTable::new("mod1");
        let first = table.add_class_symbol("first", fqn("first"));
        let second = table.add_class_symbol("second", fqn("second"));
        let child = table.add_class_symbol("child", fqn("child"));
        let from_first = table.add_other_symbol("m", fqn("first.m"));
        let from_second = table.add_other_symbol("m", fqn("second.m"));
        table.add_members(first, [from_first]).unwrap();
        table.add_members(second, [from_second]).unwrap();
        table.add_super_class(child, first).unwrap();
        table.add_super_class(child, second).unwrap();

        let class = table.class_symbol(child).unwrap();
        assert_eq!(class.resolve_member("m"), Some(from_first));
        // Member resolution leaves the superclasses open.
        let third = table.add_class_symbol("third", fqn("third"));
        assert!(table.add_super_class(child, third).is_ok());
    }
}
