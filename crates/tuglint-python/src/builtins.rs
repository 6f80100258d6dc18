//! Builtin names.
//!
//! Builtin symbols are created in a table on first use, so a file that never
//! mentions `ValueError` carries no symbol for it. Builtin classes get their
//! superclass chain up to `object` and the members of their type.

use crate::error::Result;
use crate::symbol::{FunctionData, SymbolId};
use crate::table::SymbolTable;
use crate::types::{BuiltinType, OBJECT_MEMBERS};

const BUILTIN_FUNCTIONS: &[&str] = &[
    "__import__", "abs", "aiter", "all", "anext", "any", "ascii", "bin", "breakpoint", "callable",
    "chr", "compile", "delattr", "dir", "divmod", "eval", "exec", "format", "getattr", "globals",
    "hasattr", "hash", "help", "hex", "id", "input", "isinstance", "issubclass", "iter", "len",
    "locals", "max", "min", "next", "oct", "open", "ord", "pow", "print", "repr", "round",
    "setattr", "sorted", "sum", "vars",
];

const BUILTIN_CONSTANTS: &[&str] = &[
    "Ellipsis", "NotImplemented", "__builtins__", "__debug__", "__doc__", "__file__", "__name__",
    "__package__", "__spec__",
];

/// Builtin classes and their single superclass.
const BUILTIN_CLASSES: &[(&str, Option<&str>)] = &[
    ("object", None),
    ("type", Some("object")),
    ("int", Some("object")),
    ("bool", Some("int")),
    ("float", Some("object")),
    ("complex", Some("object")),
    ("str", Some("object")),
    ("bytes", Some("object")),
    ("bytearray", Some("object")),
    ("memoryview", Some("object")),
    ("list", Some("object")),
    ("tuple", Some("object")),
    ("dict", Some("object")),
    ("set", Some("object")),
    ("frozenset", Some("object")),
    ("range", Some("object")),
    ("slice", Some("object")),
    ("enumerate", Some("object")),
    ("zip", Some("object")),
    ("map", Some("object")),
    ("filter", Some("object")),
    ("reversed", Some("object")),
    ("property", Some("object")),
    ("staticmethod", Some("object")),
    ("classmethod", Some("object")),
    ("super", Some("object")),
    ("BaseException", Some("object")),
    ("BaseExceptionGroup", Some("BaseException")),
    ("GeneratorExit", Some("BaseException")),
    ("KeyboardInterrupt", Some("BaseException")),
    ("SystemExit", Some("BaseException")),
    ("Exception", Some("BaseException")),
    ("ArithmeticError", Some("Exception")),
    ("FloatingPointError", Some("ArithmeticError")),
    ("OverflowError", Some("ArithmeticError")),
    ("ZeroDivisionError", Some("ArithmeticError")),
    ("AssertionError", Some("Exception")),
    ("AttributeError", Some("Exception")),
    ("BufferError", Some("Exception")),
    ("EOFError", Some("Exception")),
    ("ExceptionGroup", Some("Exception")),
    ("ImportError", Some("Exception")),
    ("ModuleNotFoundError", Some("ImportError")),
    ("LookupError", Some("Exception")),
    ("IndexError", Some("LookupError")),
    ("KeyError", Some("LookupError")),
    ("MemoryError", Some("Exception")),
    ("NameError", Some("Exception")),
    ("UnboundLocalError", Some("NameError")),
    ("OSError", Some("Exception")),
    ("BlockingIOError", Some("OSError")),
    ("ChildProcessError", Some("OSError")),
    ("ConnectionError", Some("OSError")),
    ("BrokenPipeError", Some("ConnectionError")),
    ("ConnectionAbortedError", Some("ConnectionError")),
    ("ConnectionRefusedError", Some("ConnectionError")),
    ("ConnectionResetError", Some("ConnectionError")),
    ("FileExistsError", Some("OSError")),
    ("FileNotFoundError", Some("OSError")),
    ("InterruptedError", Some("OSError")),
    ("IsADirectoryError", Some("OSError")),
    ("NotADirectoryError", Some("OSError")),
    ("PermissionError", Some("OSError")),
    ("ProcessLookupError", Some("OSError")),
    ("TimeoutError", Some("OSError")),
    ("EnvironmentError", Some("OSError")),
    ("IOError", Some("OSError")),
    ("ReferenceError", Some("Exception")),
    ("RuntimeError", Some("Exception")),
    ("NotImplementedError", Some("RuntimeError")),
    ("RecursionError", Some("RuntimeError")),
    ("StopAsyncIteration", Some("Exception")),
    ("StopIteration", Some("Exception")),
    ("SyntaxError", Some("Exception")),
    ("IndentationError", Some("SyntaxError")),
    ("TabError", Some("IndentationError")),
    ("SystemError", Some("Exception")),
    ("TypeError", Some("Exception")),
    ("ValueError", Some("Exception")),
    ("UnicodeError", Some("ValueError")),
    ("UnicodeDecodeError", Some("UnicodeError")),
    ("UnicodeEncodeError", Some("UnicodeError")),
    ("UnicodeTranslateError", Some("UnicodeError")),
    ("Warning", Some("Exception")),
    ("BytesWarning", Some("Warning")),
    ("DeprecationWarning", Some("Warning")),
    ("FutureWarning", Some("Warning")),
    ("ImportWarning", Some("Warning")),
    ("PendingDeprecationWarning", Some("Warning")),
    ("ResourceWarning", Some("Warning")),
    ("RuntimeWarning", Some("Warning")),
    ("SyntaxWarning", Some("Warning")),
    ("UnicodeWarning", Some("Warning")),
    ("UserWarning", Some("Warning")),
];

const EXCEPTION_MEMBERS: &[&str] = &[
    "__cause__",
    "__context__",
    "__suppress_context__",
    "__traceback__",
    "add_note",
    "args",
    "with_traceback",
];

/// Whether `name` is bound in the builtins module.
pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(&name)
        || BUILTIN_CONSTANTS.contains(&name)
        || BUILTIN_CLASSES.iter().any(|(class, _)| *class == name)
}

/// The symbol for builtin `name`, created on first request.
pub(crate) fn builtin_symbol(table: &mut SymbolTable, name: &str) -> Result<Option<SymbolId>> {
    if let Some(existing) = table.shared_symbol(name) {
        return Ok(Some(existing));
    }
    let symbol = if let Some(&(_, superclass)) = BUILTIN_CLASSES.iter().find(|(class, _)| *class == name) {
        builtin_class(table, name, superclass)?
    } else if BUILTIN_FUNCTIONS.contains(&name) {
        table.add_function_symbol(
            name,
            Some(name.to_string()),
            FunctionData {
                has_variadic_parameter: true,
                ..FunctionData::default()
            },
        )
    } else if BUILTIN_CONSTANTS.contains(&name) {
        table.add_other_symbol(name, Some(name.to_string()))
    } else {
        return Ok(None);
    };
    table.register_shared(name, symbol);
    Ok(Some(symbol))
}

fn builtin_class(table: &mut SymbolTable, name: &str, superclass: Option<&str>) -> Result<SymbolId> {
    let class = table.add_class_symbol(name, Some(name.to_string()));
    // Registered before the superclass chain so the chain can refer back.
    table.register_shared(name, class);

    let mut member_names: Vec<&str> = Vec::new();
    if superclass.is_none() {
        member_names.extend_from_slice(OBJECT_MEMBERS);
    }
    if let Some(builtin) = BuiltinType::from_name(name) {
        member_names.extend(builtin.members());
    }
    if name == "BaseException" {
        member_names.extend_from_slice(EXCEPTION_MEMBERS);
    }
    let members: Vec<SymbolId> = member_names
        .into_iter()
        .map(|member| table.add_other_symbol(member, Some(format!("{}.{}", name, member))))
        .collect();
    table.add_members(class, members)?;

    if let Some(superclass) = superclass {
        if let Some(superclass) = builtin_symbol(table, superclass)? {
            table.add_super_class(class, superclass)?;
        }
    }
    Ok(class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_symbols_are_created_once() {
        let mut table = SymbolTable::new("m");
        let first = builtin_symbol(&mut table, "len").unwrap().unwrap();
        let second = builtin_symbol(&mut table, "len").unwrap().unwrap();
        assert_eq!(first, second);
        assert!(table.symbol(first).is_function());
        assert!(table.is_builtin(first));
        assert_eq!(builtin_symbol(&mut table, "not_a_builtin").unwrap(), None);
    }

    #[test]
    fn test_builtin_exception_hierarchy() {
        let mut table = SymbolTable::new("m");
        let error = builtin_symbol(&mut table, "ZeroDivisionError").unwrap().unwrap();
        let class = table.class_symbol(error).unwrap();
        assert!(class.is_or_extends_name("ArithmeticError"));
        assert!(class.is_or_extends_name("BaseException"));
        assert!(class.is_or_extends_name("object"));
        assert!(!class.has_unresolved_type_hierarchy());
        assert!(class.resolve_member("args").is_some());
        assert!(class.resolve_member("__str__").is_some());
        assert!(class.resolve_member("nope").is_none());
    }

    #[test]
    fn test_builtins_extend_frozen_shared_classes() {
        let mut table = SymbolTable::new("m");
        let exception = builtin_symbol(&mut table, "Exception").unwrap().unwrap();
        let class = table.class_symbol(exception).unwrap();
        assert_eq!(class.superclasses().len(), 1);
        assert!(class.resolve_member("args").is_some());

        // Exception is frozen now; a subclass chain built on it still works.
        let value_error = builtin_symbol(&mut table, "ValueError").unwrap().unwrap();
        let class = table.class_symbol(value_error).unwrap();
        assert_eq!(class.superclasses(), &[exception]);
        assert!(class.is_or_extends(exception));
        assert_eq!(builtin_symbol(&mut table, "Exception").unwrap(), Some(exception));
    }

    #[test]
    fn test_builtin_type_members() {
        let mut table = SymbolTable::new("m");
        let string = builtin_symbol(&mut table, "str").unwrap().unwrap();
        let class = table.class_symbol(string).unwrap();
        assert!(class.can_have_member("upper"));
        assert!(!class.can_have_member("append"));
        assert!(is_builtin_name("print"));
        assert!(!is_builtin_name("prnt"));
    }
}
