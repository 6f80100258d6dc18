//! The per-file symbol table.
//!
//! [`SymbolTable`] owns every [`Symbol`] and [`Scope`] of one file. Symbols
//! are addressed by [`SymbolId`]; name nodes of the typed tree map to the
//! symbol they use.
//!
//! Tables are normally produced by [`SymbolTable::build`]. The mutation API
//! is public so that hierarchies can also be assembled directly:
//!
//! ```
//! use tuglint_python::SymbolTable;
//!
//! let mut table = SymbolTable::new("shapes");
//! let base = table.add_class_symbol("Base", Some("shapes.Base".to_string()));
//! let square = table.add_class_symbol("Square", Some("shapes.Square".to_string()));
//! table.add_super_class(square, base).unwrap();
//!
//! let square = table.class_symbol(square).unwrap();
//! assert!(square.is_or_extends_name("shapes.Base"));
//! assert!(!square.has_unresolved_type_hierarchy());
//! ```

use std::collections::{BTreeMap, HashMap};

use tracing::warn;
use tuglint_python_cst::{Node, NodeId, Tree};

use crate::error::{ClassMutation, Result, SymbolTableError};
use crate::hierarchy::ClassSymbol;
use crate::scope::{Scope, ScopeId};
use crate::symbol::{ClassData, FunctionData, Symbol, SymbolId, SymbolKind, Usage, UsageKind};

/// Symbols, scopes and name bindings of one file.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    module_name: String,
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
    node_symbols: HashMap<NodeId, SymbolId>,
    node_scopes: HashMap<NodeId, ScopeId>,
    /// Symbols created on demand for builtins and imported attributes, by
    /// fully qualified name.
    shared: BTreeMap<String, SymbolId>,
}

impl SymbolTable {
    /// An empty table for the module `module_name`.
    pub fn new(module_name: impl Into<String>) -> Self {
        SymbolTable {
            module_name: module_name.into(),
            symbols: Vec::new(),
            scopes: Vec::new(),
            node_symbols: HashMap::new(),
            node_scopes: HashMap::new(),
            shared: BTreeMap::new(),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// All symbols in creation order.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| (SymbolId::new(index), symbol))
    }

    // ------------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------------

    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    pub fn add_other_symbol(&mut self, name: &str, fully_qualified_name: Option<String>) -> SymbolId {
        self.add_symbol(Symbol::new(name, fully_qualified_name, SymbolKind::Other))
    }

    pub fn add_class_symbol(&mut self, name: &str, fully_qualified_name: Option<String>) -> SymbolId {
        self.add_symbol(Symbol::new(
            name,
            fully_qualified_name,
            SymbolKind::Class(ClassData::default()),
        ))
    }

    pub fn add_function_symbol(
        &mut self,
        name: &str,
        fully_qualified_name: Option<String>,
        data: FunctionData,
    ) -> SymbolId {
        self.add_symbol(Symbol::new(name, fully_qualified_name, SymbolKind::Function(data)))
    }

    /// Record a usage of `symbol` at `node` and map the node to it.
    pub fn add_usage(&mut self, symbol: SymbolId, node: NodeId, kind: UsageKind) {
        self.symbols[symbol.index()].usages.push(Usage { node, kind });
        self.node_symbols.insert(node, symbol);
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub(crate) fn shared_symbol(&self, fully_qualified_name: &str) -> Option<SymbolId> {
        self.shared.get(fully_qualified_name).copied()
    }

    /// Whether `id` is one of the lazily created builtin symbols.
    pub fn is_builtin(&self, id: SymbolId) -> bool {
        match self.symbol(id).fully_qualified_name.as_deref() {
            Some(fqn) if !fqn.contains('.') => self.shared.get(fqn) == Some(&id),
            _ => false,
        }
    }

    pub(crate) fn register_shared(&mut self, fully_qualified_name: &str, symbol: SymbolId) {
        self.shared.insert(fully_qualified_name.to_string(), symbol);
    }

    // ------------------------------------------------------------------------
    // Class mutation
    // ------------------------------------------------------------------------

    fn class_data_mut(&mut self, class: SymbolId, operation: ClassMutation) -> Result<&mut ClassData> {
        let symbol = &mut self.symbols[class.index()];
        let name = symbol.name.clone();
        let SymbolKind::Class(data) = &mut symbol.kind else {
            return Err(SymbolTableError::NotAClass { symbol: name });
        };
        let frozen = match operation {
            ClassMutation::AddMembers => data.members_frozen.get(),
            ClassMutation::AddSuperClass | ClassMutation::SetHasSuperClassWithoutSymbol => {
                data.superclasses_frozen.get()
            }
        };
        if frozen {
            warn!(class = %name, %operation, "class symbol mutated after freeze");
            return Err(SymbolTableError::Protocol {
                symbol: name,
                operation,
            });
        }
        Ok(data)
    }

    /// Append a superclass. Fails once the superclasses have been read.
    pub fn add_super_class(&mut self, class: SymbolId, superclass: SymbolId) -> Result<()> {
        self.class_data_mut(class, ClassMutation::AddSuperClass)?
            .superclasses
            .push(superclass);
        Ok(())
    }

    /// Append members. Fails once a member has been resolved.
    pub fn add_members(&mut self, class: SymbolId, members: impl IntoIterator<Item = SymbolId>) -> Result<()> {
        self.class_data_mut(class, ClassMutation::AddMembers)?
            .members
            .extend(members);
        Ok(())
    }

    /// Record a superclass expression that has no symbol.
    pub fn set_has_super_class_without_symbol(&mut self, class: SymbolId) -> Result<()> {
        self.class_data_mut(class, ClassMutation::SetHasSuperClassWithoutSymbol)?
            .has_super_class_without_symbol = true;
        Ok(())
    }

    /// A query view of `id`, if it is a class.
    pub fn class_symbol(&self, id: SymbolId) -> Option<ClassSymbol<'_>> {
        ClassSymbol::new(self, id)
    }

    // ------------------------------------------------------------------------
    // Scopes and lookup
    // ------------------------------------------------------------------------

    pub(crate) fn add_scope(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.node_scopes.insert(scope.node, id);
        self.scopes.push(scope);
        id
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> + '_ {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, scope)| (ScopeId::new(index), scope))
    }

    /// The module scope, once the table has been built.
    pub fn module_scope(&self) -> Option<ScopeId> {
        (!self.scopes.is_empty()).then(|| ScopeId::new(0))
    }

    /// The scope opened by `node` (a file, function, lambda, class or
    /// comprehension).
    pub fn scope_opened_by(&self, node: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&node).copied()
    }

    /// The symbol a name node uses, if it was resolved.
    pub fn symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    /// The symbol a node refers to: a name's symbol, the symbol defined by a
    /// `def` or `class`, the attribute of a qualified expression, or the
    /// callee of a call.
    pub fn lookup(&self, tree: &Tree, node: NodeId) -> Option<SymbolId> {
        match tree.node(node) {
            Node::Name(_) => self.symbol_of(node),
            Node::FuncDef(def) => self.symbol_of(def.name),
            Node::ClassDef(def) => self.symbol_of(def.name),
            Node::QualifiedExpr(qualified) => self.symbol_of(qualified.name),
            Node::CallExpr(call) => self.lookup(tree, call.callee),
            _ => None,
        }
    }

    /// Symbols with the given fully qualified name.
    pub fn symbols_with_fqn<'a>(&'a self, fully_qualified_name: &'a str) -> impl Iterator<Item = SymbolId> + 'a {
        self.symbols()
            .filter(move |(_, s)| s.fully_qualified_name.as_deref() == Some(fully_qualified_name))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_super_class_after_read_is_protocol_error() {
        let mut table = SymbolTable::new("m");
        let a = table.add_class_symbol("a", None);
        let b = table.add_class_symbol("b", None);
        let c = table.add_class_symbol("c", None);
        table.add_super_class(a, b).unwrap();
        assert_eq!(table.class_symbol(a).unwrap().superclasses(), &[b]);
        assert_eq!(
            table.add_super_class(a, c),
            Err(SymbolTableError::Protocol {
                symbol: "a".to_string(),
                operation: ClassMutation::AddSuperClass,
            })
        );
        assert!(table.set_has_super_class_without_symbol(a).is_err());
        // Members are still open.
        assert!(table.add_members(a, [c]).is_ok());
    }

    #[test]
    fn test_add_members_after_resolution_is_protocol_error() {
        let mut table = SymbolTable::new("m");
        let a = table.add_class_symbol("a", None);
        let m1 = table.add_other_symbol("m1", None);
        let m2 = table.add_other_symbol("m2", None);
        table.add_members(a, [m1]).unwrap();
        assert_eq!(table.class_symbol(a).unwrap().resolve_member("m1"), Some(m1));
        assert!(matches!(
            table.add_members(a, [m2]),
            Err(SymbolTableError::Protocol {
                operation: ClassMutation::AddMembers,
                ..
            })
        ));
        // Superclasses are still open.
        let b = table.add_class_symbol("b", None);
        assert!(table.add_super_class(a, b).is_ok());
    }

    #[test]
    fn test_class_mutation_on_non_class() {
        let mut table = SymbolTable::new("m");
        let x = table.add_other_symbol("x", None);
        let y = table.add_other_symbol("y", None);
        assert_eq!(
            table.add_super_class(x, y),
            Err(SymbolTableError::NotAClass { symbol: "x".to_string() })
        );
        assert!(table.class_symbol(x).is_none());
    }

    #[test]
    fn test_usages_map_nodes() {
        let mut table = SymbolTable::new("m");
        let x = table.add_other_symbol("x", None);
        table.add_usage(x, NodeId::new(4), UsageKind::Assignment);
        assert_eq!(table.symbol_of(NodeId::new(4)), Some(x));
        assert_eq!(table.symbol_of(NodeId::new(5)), None);
        assert_eq!(table.symbol(x).usages().len(), 1);
    }
}
