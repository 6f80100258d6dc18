//! tuglint: a Python analysis frontend.
//!
//! Parses Python source into a typed syntax tree, builds a symbol table
//! with resolved class hierarchies, and runs rule consumers over the tree
//! in a single pass. The stages live in the workspace crates; this crate
//! ties them into a per-file pipeline and a multi-file driver.
//!
//! ```
//! use tuglint::{analyze, AnalysisOptions};
//! use tuglint_python::SubscriptionRegistry;
//! use tuglint_python_cst::Kind;
//!
//! let mut registry = SubscriptionRegistry::new();
//! registry.register_node(&[Kind::PassStmt], |ctx| {
//!     if let Some(node) = ctx.syntax_node() {
//!         ctx.add_issue(node, "Remove this \"pass\".");
//!     }
//! });
//!
//! let options = AnalysisOptions::default().with_module_name("example");
//! let analysis = analyze("class A:\n    pass\n", &options, &mut registry).unwrap();
//! assert_eq!(analysis.issues.len(), 1);
//! ```

pub mod files;
pub mod logging;
pub mod pipeline;

pub use files::{collect_python_files, SourceFile};
pub use logging::{init_default_tracing, init_tracing, LogFormat};
pub use pipeline::{analyze, analyze_files, AnalysisOptions, FileAnalysis, FileOutcome};
