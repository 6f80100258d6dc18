//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API of the
//! pipeline crate and the workspace crates it builds on. If this file fails
//! to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Pipeline
// ============================================================================

use tuglint::{
    analyze, analyze_files, collect_python_files, init_default_tracing, init_tracing,
    AnalysisOptions, FileAnalysis, FileOutcome, LogFormat, SourceFile,
};

// ============================================================================
// Core vocabulary
// ============================================================================

use tuglint_core::{
    Issue, IssueLocation, OutputErrorCode, Position, SecondaryLocation, Span, TextRange,
    TuglintError, TuglintResult,
};

// ============================================================================
// Syntax tree
// ============================================================================

use tuglint_python_cst::{
    parse_module, prettify_error, tokenize, BuildError, Kind, Node, NodeId, ParseOptions,
    ParserError, PythonVersion, TokType, Token, Tree, TreeVisitor, VisitResult,
};

// ============================================================================
// Semantic model and dispatch
// ============================================================================

use tuglint_python::{
    infer, line_count, BuiltinType, ClassData, ClassMutation, ClassSymbol, Consumer,
    DispatchEngine, FunctionData, InferredType, PreciseIssue, Scope, ScopeId, ScopeKind,
    Subscription, SubscriptionContext, SubscriptionRegistry, Symbol, SymbolId, SymbolKind,
    SymbolTable, SymbolTableError, Usage, UsageKind,
};

// ============================================================================
// Test
// ============================================================================

#[test]
fn api_surface_compiles() {
    // The imports above form the public API contract.
    let _ = std::any::type_name::<AnalysisOptions>();
    let _ = std::any::type_name::<FileOutcome>();
    let _ = std::any::type_name::<Issue>();
    let _ = std::any::type_name::<Tree>();
    let _ = std::any::type_name::<SymbolTable>();
    let _ = std::any::type_name::<SubscriptionRegistry<'static>>();
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(OutputErrorCode::SyntaxError.code(), 3);
    assert_eq!(OutputErrorCode::FileError.code(), 4);
    assert_eq!(OutputErrorCode::InternalError.code(), 10);
}
