//! Lexical scopes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tuglint_python_cst::NodeId;

use crate::symbol::SymbolId;

/// Index of a scope in a [`SymbolTable`](crate::SymbolTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn new(index: usize) -> Self {
        ScopeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope_{}", self.0)
    }
}

/// The construct that opens a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Module,
    Function,
    Lambda,
    Class,
    Comprehension,
}

impl ScopeKind {
    /// Function and lambda bodies.
    pub fn is_function_like(self) -> bool {
        matches!(self, ScopeKind::Function | ScopeKind::Lambda)
    }
}

/// A lexical scope and the names bound in it.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// The node that opens the scope.
    pub node: NodeId,
    pub parent: Option<ScopeId>,
    pub(crate) names: BTreeMap<String, SymbolId>,
    /// Symbols in order of first binding.
    pub(crate) order: Vec<SymbolId>,
    pub(crate) globals: BTreeSet<String>,
    pub(crate) nonlocals: BTreeSet<String>,
}

impl Scope {
    pub(crate) fn new(kind: ScopeKind, node: NodeId, parent: Option<ScopeId>) -> Self {
        Scope {
            kind,
            node,
            parent,
            names: BTreeMap::new(),
            order: Vec::new(),
            globals: BTreeSet::new(),
            nonlocals: BTreeSet::new(),
        }
    }

    /// The symbol bound to `name` in this scope.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.names.get(name).copied()
    }

    /// Symbols bound in this scope, in order of first binding.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.order
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    pub fn is_nonlocal(&self, name: &str) -> bool {
        self.nonlocals.contains(name)
    }

    pub fn globals(&self) -> impl Iterator<Item = &str> + '_ {
        self.globals.iter().map(String::as_str)
    }

    pub fn nonlocals(&self) -> impl Iterator<Item = &str> + '_ {
        self.nonlocals.iter().map(String::as_str)
    }

    /// Bind `name`, replacing any previous binding. A symbol keeps its first
    /// position in the declaration order.
    pub(crate) fn bind(&mut self, name: &str, symbol: SymbolId) {
        if let Some(previous) = self.names.insert(name.to_string(), symbol) {
            if let Some(slot) = self.order.iter_mut().find(|s| **s == previous) {
                *slot = symbol;
                return;
            }
        }
        self.order.push(symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebinding_keeps_position() {
        let mut scope = Scope::new(ScopeKind::Module, NodeId::new(0), None);
        scope.bind("a", SymbolId::new(0));
        scope.bind("b", SymbolId::new(1));
        scope.bind("a", SymbolId::new(2));
        assert_eq!(scope.lookup("a"), Some(SymbolId::new(2)));
        assert_eq!(scope.symbols(), &[SymbolId::new(2), SymbolId::new(1)]);
        assert_eq!(scope.lookup("c"), None);
    }

    #[test]
    fn test_scope_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ScopeKind::Comprehension).unwrap();
        assert_eq!(json, "\"comprehension\"");
        let id: ScopeId = serde_json::from_str("3").unwrap();
        assert_eq!(id.index(), 3);
        assert!(ScopeKind::Lambda.is_function_like());
        assert!(!ScopeKind::Class.is_function_like());
    }
}
