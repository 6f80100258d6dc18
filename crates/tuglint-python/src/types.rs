//! Minimal type inference.
//!
//! [`InferredType`] answers one question: can a value of this type have a
//! given attribute? Literals, displays and comprehensions infer builtin
//! types; a call to a class infers an instance of that class. Everything else
//! is [`InferredType::Anything`].

use serde::{Deserialize, Serialize};
use tuglint_python_cst::{Kind, NodeId, Tree};

use crate::symbol::SymbolId;
use crate::table::SymbolTable;

/// Attributes every object has.
pub(crate) const OBJECT_MEMBERS: &[&str] = &[
    "__class__",
    "__delattr__",
    "__dict__",
    "__dir__",
    "__doc__",
    "__eq__",
    "__format__",
    "__ge__",
    "__getattribute__",
    "__gt__",
    "__hash__",
    "__init__",
    "__init_subclass__",
    "__le__",
    "__lt__",
    "__module__",
    "__ne__",
    "__new__",
    "__reduce__",
    "__reduce_ex__",
    "__repr__",
    "__setattr__",
    "__sizeof__",
    "__str__",
    "__subclasshook__",
];

const NUMBER_MEMBERS: &[&str] = &[
    "__abs__", "__add__", "__bool__", "__float__", "__floordiv__", "__int__", "__mod__", "__mul__",
    "__neg__", "__pos__", "__pow__", "__sub__", "__truediv__", "conjugate", "imag", "real",
];

const INT_MEMBERS: &[&str] = &[
    "__and__", "__index__", "__invert__", "__lshift__", "__or__", "__rshift__", "__xor__",
    "as_integer_ratio", "bit_length", "denominator", "from_bytes", "numerator", "to_bytes",
];

const FLOAT_MEMBERS: &[&str] = &["as_integer_ratio", "fromhex", "hex", "is_integer"];

const SEQUENCE_MEMBERS: &[&str] = &[
    "__contains__", "__getitem__", "__iter__", "__len__", "count", "index",
];

const STR_MEMBERS: &[&str] = &[
    "__add__", "__mod__", "__mul__", "capitalize", "casefold", "center", "encode", "endswith",
    "expandtabs", "find", "format", "format_map", "isalnum", "isalpha", "isascii", "isdecimal",
    "isdigit", "isidentifier", "islower", "isnumeric", "isprintable", "isspace", "istitle",
    "isupper", "join", "ljust", "lower", "lstrip", "maketrans", "partition", "replace", "rfind",
    "rindex", "rjust", "rpartition", "rsplit", "rstrip", "split", "splitlines", "startswith",
    "strip", "swapcase", "title", "translate", "upper", "zfill",
];

const BYTES_MEMBERS: &[&str] = &[
    "__add__", "__mod__", "__mul__", "capitalize", "center", "decode", "endswith", "expandtabs",
    "find", "fromhex", "hex", "isalnum", "isalpha", "isascii", "isdigit", "islower", "isspace",
    "istitle", "isupper", "join", "ljust", "lower", "lstrip", "maketrans", "partition", "replace",
    "rfind", "rindex", "rjust", "rpartition", "rsplit", "rstrip", "split", "splitlines",
    "startswith", "strip", "swapcase", "title", "translate", "upper", "zfill",
];

const LIST_MEMBERS: &[&str] = &[
    "__add__", "__delitem__", "__iadd__", "__mul__", "__reversed__", "__setitem__", "append",
    "clear", "copy", "extend", "insert", "pop", "remove", "reverse", "sort",
];

const TUPLE_MEMBERS: &[&str] = &["__add__", "__mul__"];

const DICT_MEMBERS: &[&str] = &[
    "__contains__", "__delitem__", "__getitem__", "__iter__", "__len__", "__setitem__", "clear",
    "copy", "fromkeys", "get", "items", "keys", "pop", "popitem", "setdefault", "update", "values",
];

const SET_MEMBERS: &[&str] = &[
    "__and__", "__contains__", "__iter__", "__len__", "__or__", "__sub__", "__xor__", "add",
    "clear", "copy", "difference", "difference_update", "discard", "intersection",
    "intersection_update", "isdisjoint", "issubset", "issuperset", "pop", "remove",
    "symmetric_difference", "symmetric_difference_update", "union", "update",
];

const FROZENSET_MEMBERS: &[&str] = &[
    "__and__", "__contains__", "__iter__", "__len__", "__or__", "__sub__", "__xor__", "copy",
    "difference", "intersection", "isdisjoint", "issubset", "issuperset", "symmetric_difference",
    "union",
];

const GENERATOR_MEMBERS: &[&str] = &[
    "__iter__", "__next__", "close", "gi_code", "gi_frame", "gi_running", "gi_yieldfrom", "send",
    "throw",
];

/// Builtin types that literals and builtin constructors produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinType {
    Int,
    Float,
    Complex,
    Bool,
    Str,
    Bytes,
    NoneType,
    List,
    Tuple,
    Dict,
    Set,
    FrozenSet,
    Generator,
}

impl BuiltinType {
    pub const ALL: &'static [BuiltinType] = &[
        BuiltinType::Int,
        BuiltinType::Float,
        BuiltinType::Complex,
        BuiltinType::Bool,
        BuiltinType::Str,
        BuiltinType::Bytes,
        BuiltinType::NoneType,
        BuiltinType::List,
        BuiltinType::Tuple,
        BuiltinType::Dict,
        BuiltinType::Set,
        BuiltinType::FrozenSet,
        BuiltinType::Generator,
    ];

    /// The builtin class name.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Int => "int",
            BuiltinType::Float => "float",
            BuiltinType::Complex => "complex",
            BuiltinType::Bool => "bool",
            BuiltinType::Str => "str",
            BuiltinType::Bytes => "bytes",
            BuiltinType::NoneType => "NoneType",
            BuiltinType::List => "list",
            BuiltinType::Tuple => "tuple",
            BuiltinType::Dict => "dict",
            BuiltinType::Set => "set",
            BuiltinType::FrozenSet => "frozenset",
            BuiltinType::Generator => "generator",
        }
    }

    pub fn from_name(name: &str) -> Option<BuiltinType> {
        BuiltinType::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Attributes of the type beyond those of `object`.
    pub fn members(self) -> Vec<&'static str> {
        let parts: &[&[&str]] = match self {
            BuiltinType::Int | BuiltinType::Bool => &[NUMBER_MEMBERS, INT_MEMBERS],
            BuiltinType::Float => &[NUMBER_MEMBERS, FLOAT_MEMBERS],
            BuiltinType::Complex => &[NUMBER_MEMBERS],
            BuiltinType::Str => &[SEQUENCE_MEMBERS, STR_MEMBERS],
            BuiltinType::Bytes => &[SEQUENCE_MEMBERS, BYTES_MEMBERS],
            BuiltinType::NoneType => &[&["__bool__"]],
            BuiltinType::List => &[SEQUENCE_MEMBERS, LIST_MEMBERS],
            BuiltinType::Tuple => &[SEQUENCE_MEMBERS, TUPLE_MEMBERS],
            BuiltinType::Dict => &[DICT_MEMBERS],
            BuiltinType::Set => &[SET_MEMBERS],
            BuiltinType::FrozenSet => &[FROZENSET_MEMBERS],
            BuiltinType::Generator => &[GENERATOR_MEMBERS],
        };
        parts.iter().flat_map(|part| part.iter().copied()).collect()
    }

    pub fn has_member(self, name: &str) -> bool {
        OBJECT_MEMBERS.contains(&name) || self.members().contains(&name)
    }
}

/// The statically known type of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    /// Nothing is known.
    Anything,
    Builtin(BuiltinType),
    /// An instance of a class symbol.
    Instance(SymbolId),
}

impl InferredType {
    /// Whether a value of this type may have the attribute `name`.
    ///
    /// Answers `true` whenever the type is not fully known. For instances
    /// this consults the class hierarchy, which freezes it.
    pub fn can_have_member(&self, table: &SymbolTable, name: &str) -> bool {
        match *self {
            InferredType::Anything => true,
            InferredType::Builtin(builtin) => builtin.has_member(name),
            InferredType::Instance(class) => table
                .class_symbol(class)
                .is_none_or(|class| class.can_have_member(name)),
        }
    }
}

/// Infer the type of the expression `id`.
pub fn infer(tree: &Tree, table: &SymbolTable, id: NodeId) -> InferredType {
    use InferredType::{Anything, Builtin};

    match tree.kind(id) {
        Kind::NumericLiteral => Builtin(numeric_type(&tree.first_token(id).value)),
        Kind::StringLiteral => match tree.node(id).as_string_literal() {
            Some(literal) => {
                let bytes = literal
                    .elements
                    .first()
                    .and_then(|&element| tree.node(element).as_string_element())
                    .is_some_and(|element| element.is_bytes());
                Builtin(if bytes { BuiltinType::Bytes } else { BuiltinType::Str })
            }
            None => Anything,
        },
        Kind::None => Builtin(BuiltinType::NoneType),
        Kind::ListLiteral | Kind::ListComprehension => Builtin(BuiltinType::List),
        Kind::Tuple => Builtin(BuiltinType::Tuple),
        Kind::SetLiteral | Kind::SetComprehension => Builtin(BuiltinType::Set),
        Kind::DictionaryLiteral | Kind::DictComprehension => Builtin(BuiltinType::Dict),
        Kind::GeneratorExpr => Builtin(BuiltinType::Generator),
        Kind::Comparison | Kind::In | Kind::Is | Kind::Not => Builtin(BuiltinType::Bool),
        Kind::Name => match tree.node(id).as_name().map(|name| name.name.as_str()) {
            Some("True" | "False") => Builtin(BuiltinType::Bool),
            _ => Anything,
        },
        Kind::ParenthesizedExpr => match tree.node(id).as_parenthesized_expr() {
            Some(parenthesized) => infer(tree, table, parenthesized.expression),
            None => Anything,
        },
        Kind::CallExpr => match tree.node(id).as_call_expr() {
            Some(call) => call_type(tree, table, call.callee),
            None => Anything,
        },
        _ => Anything,
    }
}

fn numeric_type(text: &str) -> BuiltinType {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") || lower.starts_with("0o") || lower.starts_with("0b") {
        BuiltinType::Int
    } else if lower.ends_with('j') {
        BuiltinType::Complex
    } else if lower.contains(['.', 'e']) {
        BuiltinType::Float
    } else {
        BuiltinType::Int
    }
}

/// The type produced by calling `callee`: an instance when it names a class.
fn call_type(tree: &Tree, table: &SymbolTable, callee: NodeId) -> InferredType {
    let Some(symbol) = table.lookup(tree, callee) else {
        return InferredType::Anything;
    };
    if !table.symbol(symbol).is_class() {
        return InferredType::Anything;
    }
    let builtin = table
        .symbol(symbol)
        .fully_qualified_name
        .as_deref()
        .and_then(BuiltinType::from_name)
        .filter(|_| table.is_builtin(symbol));
    match builtin {
        Some(builtin) => InferredType::Builtin(builtin),
        None => InferredType::Instance(symbol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_type() {
        assert_eq!(numeric_type("42"), BuiltinType::Int);
        assert_eq!(numeric_type("0xFE"), BuiltinType::Int);
        assert_eq!(numeric_type("1_000.5"), BuiltinType::Float);
        assert_eq!(numeric_type("1e10"), BuiltinType::Float);
        assert_eq!(numeric_type("3j"), BuiltinType::Complex);
    }

    #[test]
    fn test_builtin_members() {
        assert!(BuiltinType::Str.has_member("upper"));
        assert!(BuiltinType::Str.has_member("__class__"));
        assert!(!BuiltinType::Str.has_member("append"));
        assert!(BuiltinType::List.has_member("append"));
        assert!(BuiltinType::Bool.has_member("bit_length"));
        assert_eq!(BuiltinType::from_name("frozenset"), Some(BuiltinType::FrozenSet));
        assert_eq!(BuiltinType::from_name("object"), None);
    }

    #[test]
    fn test_anything_can_have_any_member() {
        let table = SymbolTable::new("m");
        assert!(InferredType::Anything.can_have_member(&table, "whatever"));
        assert!(!InferredType::Builtin(BuiltinType::NoneType).can_have_member(&table, "strip"));
    }
}
