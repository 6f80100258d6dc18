//! Symbols and their usages.
//!
//! Every named entity of a file is a [`Symbol`] in the file's
//! [`SymbolTable`](crate::SymbolTable) arena. Functions and classes carry
//! extra data in their [`SymbolKind`]; a name bound more than once by a
//! `def` or `class` becomes [`SymbolKind::Ambiguous`].

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};
use tuglint_core::TextRange;
use tuglint_python_cst::NodeId;

/// Index of a symbol in a [`SymbolTable`](crate::SymbolTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn new(index: usize) -> Self {
        SymbolId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym_{}", self.0)
    }
}

// ============================================================================
// Usages
// ============================================================================

/// How a name node uses a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    Assignment,
    CompoundAssignment,
    Import,
    Parameter,
    FuncDeclaration,
    ClassDeclaration,
    LoopDeclaration,
    ExceptionInstance,
    WithInstance,
    GlobalDeclaration,
    /// A read.
    Other,
}

impl UsageKind {
    /// Whether the usage binds the name.
    pub fn is_binding(self) -> bool {
        !matches!(self, UsageKind::Other | UsageKind::GlobalDeclaration)
    }
}

/// One occurrence of a symbol's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Usage {
    pub node: NodeId,
    pub kind: UsageKind,
}

// ============================================================================
// Symbol data
// ============================================================================

/// What a function symbol knows about its definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionData {
    /// Names of every parameter, in order, including `*args` and `**kwargs`.
    pub parameter_names: Vec<String>,
    pub has_variadic_parameter: bool,
    pub has_decorators: bool,
    pub decorators: Vec<String>,
    pub is_async: bool,
    /// Defined directly in a class body and not a static or class method.
    pub is_instance_method: bool,
    /// Range of the function name.
    pub definition: Option<TextRange>,
}

/// The mutable-then-frozen state of a class symbol.
///
/// The superclass and member collections are append-only while open. A
/// hierarchy query freezes the superclasses; the first member resolution
/// freezes the members. The two transitions are independent and
/// irreversible. The flags are cells because queries only borrow the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassData {
    pub(crate) superclasses: Vec<SymbolId>,
    pub(crate) members: Vec<SymbolId>,
    pub(crate) has_super_class_without_symbol: bool,
    pub(crate) superclasses_frozen: Cell<bool>,
    pub(crate) members_frozen: Cell<bool>,
    pub has_decorators: bool,
    /// Range of the class name.
    pub definition: Option<TextRange>,
}

impl ClassData {
    pub fn is_superclasses_frozen(&self) -> bool {
        self.superclasses_frozen.get()
    }

    pub fn is_members_frozen(&self) -> bool {
        self.members_frozen.get()
    }
}

/// The specialization of a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// Variables, parameters, imported names and builtins.
    Other,
    Function(FunctionData),
    Class(ClassData),
    /// A name bound by several definitions; each alternative is a symbol.
    Ambiguous(Vec<SymbolId>),
}

/// A named program entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub fully_qualified_name: Option<String>,
    pub kind: SymbolKind,
    pub(crate) usages: Vec<Usage>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, fully_qualified_name: Option<String>, kind: SymbolKind) -> Self {
        Symbol {
            name: name.into(),
            fully_qualified_name,
            kind,
            usages: Vec::new(),
        }
    }

    pub fn usages(&self) -> &[Usage] {
        &self.usages
    }

    /// Usages that bind the name, in source order of discovery.
    pub fn binding_usages(&self) -> impl Iterator<Item = &Usage> + '_ {
        self.usages.iter().filter(|u| u.kind.is_binding())
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, SymbolKind::Class(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self.kind, SymbolKind::Ambiguous(_))
    }

    pub fn function_data(&self) -> Option<&FunctionData> {
        match &self.kind {
            SymbolKind::Function(data) => Some(data),
            _ => None,
        }
    }

    pub fn class_data(&self) -> Option<&ClassData> {
        match &self.kind {
            SymbolKind::Class(data) => Some(data),
            _ => None,
        }
    }

    pub fn alternatives(&self) -> &[SymbolId] {
        match &self.kind {
            SymbolKind::Ambiguous(alternatives) => alternatives,
            _ => &[],
        }
    }

    /// Short label of the specialization.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SymbolKind::Other => "other",
            SymbolKind::Function(_) => "function",
            SymbolKind::Class(_) => "class",
            SymbolKind::Ambiguous(_) => "ambiguous",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fully_qualified_name {
            Some(fqn) => write!(f, "{} {} ({})", self.kind_name(), self.name, fqn),
            None => write!(f, "{} {}", self.kind_name(), self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_usages() {
        let mut symbol = Symbol::new("x", None, SymbolKind::Other);
        symbol.usages.push(Usage {
            node: NodeId::new(1),
            kind: UsageKind::Assignment,
        });
        symbol.usages.push(Usage {
            node: NodeId::new(2),
            kind: UsageKind::Other,
        });
        assert_eq!(symbol.usages().len(), 2);
        assert_eq!(symbol.binding_usages().count(), 1);
        assert!(!UsageKind::GlobalDeclaration.is_binding());
    }

    #[test]
    fn test_display() {
        let symbol = Symbol::new("f", Some("mod.f".to_string()), SymbolKind::Function(FunctionData::default()));
        assert_eq!(symbol.to_string(), "function f (mod.f)");
        assert_eq!(SymbolId::new(3).to_string(), "sym_3");
    }
}
