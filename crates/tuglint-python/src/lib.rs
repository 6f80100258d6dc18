//! Semantic model and rule dispatch for Python syntax trees.
//!
//! Given a [`Tree`](tuglint_python_cst::Tree) from `tuglint-python-cst`,
//! this crate provides:
//!
//! - [`SymbolTable`]: scopes, symbols and usages for one module, built by
//!   [`SymbolTable::build`]
//! - [`ClassSymbol`]: cycle-safe queries over a class hierarchy, with the
//!   open/frozen protocol on superclasses and members
//! - [`infer`]: a shallow type guess for expressions
//! - [`DispatchEngine`]: the single-pass walk that feeds nodes, the file and
//!   each line to registered rule consumers
//!
//! ```
//! use tuglint_python::SymbolTable;
//! use tuglint_python_cst::{parse_module, ParseOptions};
//!
//! let source = "class A:\n    def run(self): pass\nclass B(A): pass\n";
//! let tree = parse_module(source, ParseOptions::default()).unwrap();
//! let table = SymbolTable::build(&tree, "shapes").unwrap();
//!
//! let b = table.symbols_with_fqn("shapes.B").next().unwrap();
//! let class = table.class_symbol(b).unwrap();
//! assert!(class.is_or_extends_name("shapes.A"));
//! assert!(class.resolve_member("run").is_some());
//! ```

mod binder;
mod builtins;

pub mod context;
pub mod dispatch;
pub mod error;
pub mod hierarchy;
pub mod scope;
pub mod symbol;
pub mod table;
pub mod types;

pub use builtins::is_builtin_name;
pub use context::{PreciseIssue, SubscriptionContext};
pub use dispatch::{line_count, Consumer, DispatchEngine, Subscription, SubscriptionRegistry};
pub use error::{ClassMutation, Result, SymbolTableError};
pub use hierarchy::ClassSymbol;
pub use scope::{Scope, ScopeId, ScopeKind};
pub use symbol::{ClassData, FunctionData, Symbol, SymbolId, SymbolKind, Usage, UsageKind};
pub use table::SymbolTable;
pub use types::{infer, BuiltinType, InferredType};
