//! The per-file analysis pipeline and the multi-file driver.
//!
//! A file goes through three stages: [`parse_module`] builds the typed tree,
//! [`SymbolTable::build`] binds names and class hierarchies, and
//! [`DispatchEngine::run`] feeds the tree to the registered consumers. A
//! failure stops the file at the failing stage.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info_span, warn};
use tuglint_core::{Issue, TuglintError, TuglintResult};
use tuglint_python::{DispatchEngine, SubscriptionRegistry, SymbolTable};
use tuglint_python_cst::{parse_module, ParseOptions, Tree};

use crate::files::{collect_python_files, SourceFile};

// ============================================================================
// Options
// ============================================================================

/// Settings for one analysis run.
///
/// ```
/// use tuglint::AnalysisOptions;
/// use tuglint_python_cst::PythonVersion;
///
/// let options = AnalysisOptions::from_json(r#"{"module_name": "pkg.mod"}"#).unwrap();
/// assert_eq!(options.module_name, "pkg.mod");
/// assert_eq!(options.parse.version, PythonVersion::default());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub parse: ParseOptions,
    /// Prefix of fully qualified names declared in the file. Set per file by
    /// [`analyze_files`].
    pub module_name: String,
}

impl AnalysisOptions {
    pub fn with_parse(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = module_name.into();
        self
    }

    /// Read options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> TuglintResult<Self> {
        serde_json::from_str(json).map_err(|err| TuglintError::internal(format!("invalid analysis options: {}", err)))
    }
}

// ============================================================================
// Single file
// ============================================================================

/// Everything produced for one file.
#[derive(Debug)]
pub struct FileAnalysis {
    pub tree: Tree,
    pub symbols: SymbolTable,
    pub issues: Vec<Issue>,
}

/// Analyze one source text with the consumers of `registry`.
///
/// # Errors
///
/// - [`TuglintError::SyntaxError`] when the source does not parse
/// - [`TuglintError::InternalError`] for structural build failures and
///   symbol table protocol violations
pub fn analyze(
    source: &str,
    options: &AnalysisOptions,
    registry: &mut SubscriptionRegistry<'_>,
) -> TuglintResult<FileAnalysis> {
    let span = info_span!("analyze_file", module = %options.module_name);
    let _guard = span.enter();

    let tree = parse_module(source, options.parse).map_err(|err| {
        warn!(error = %err, "parse failed");
        TuglintError::from(err)
    })?;

    let symbols = SymbolTable::build(&tree, &options.module_name).map_err(|err| {
        error!(error = %err, "symbol table construction failed");
        TuglintError::from(err)
    })?;
    debug!(symbols = symbols.len(), scopes = symbols.scopes().count(), "built symbol table");

    let issues = DispatchEngine::run(&tree, &symbols, registry);
    debug!(issues = issues.len(), consumers = registry.len(), "dispatched");

    Ok(FileAnalysis { tree, symbols, issues })
}

// ============================================================================
// Many files
// ============================================================================

/// The result for one file of [`analyze_files`].
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub module_name: String,
    pub result: TuglintResult<Vec<Issue>>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The issues, or none if the file failed.
    pub fn issues(&self) -> &[Issue] {
        self.result.as_deref().unwrap_or_default()
    }
}

/// Analyze every Python file under `paths`.
///
/// Each path is a file or a directory to walk. `factory` builds a fresh
/// registry per file, so consumer state never leaks from one file to the
/// next. A file that cannot be read or analyzed yields a failed outcome and
/// the run continues. A path that cannot be expanded yields one failed
/// outcome for the path itself.
pub fn analyze_files<'r, P, F>(paths: &[P], options: &AnalysisOptions, mut factory: F) -> Vec<FileOutcome>
where
    P: AsRef<Path>,
    F: FnMut(&Path) -> SubscriptionRegistry<'r>,
{
    let mut outcomes = Vec::new();
    for root in paths {
        let root = root.as_ref();
        match collect_python_files(root) {
            Ok(files) => {
                for file in files {
                    outcomes.push(analyze_file(file, options, &mut factory));
                }
            }
            Err(err) => {
                warn!(path = %root.display(), error = %err, "cannot expand path");
                outcomes.push(FileOutcome {
                    path: root.to_path_buf(),
                    module_name: String::new(),
                    result: Err(err),
                });
            }
        }
    }
    let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
    debug!(files = outcomes.len(), failed, "analysis finished");
    outcomes
}

fn analyze_file<'r, F>(file: SourceFile, options: &AnalysisOptions, factory: &mut F) -> FileOutcome
where
    F: FnMut(&Path) -> SubscriptionRegistry<'r>,
{
    let SourceFile { path, module_name } = file;
    let result = fs::read_to_string(&path)
        .map_err(|err| TuglintError::from_io(path.display().to_string(), &err))
        .and_then(|source| {
            let options = options.clone().with_module_name(module_name.as_str());
            let mut registry = factory(&path);
            analyze(&source, &options, &mut registry).map(|analysis| analysis.issues)
        });
    if let Err(err) = &result {
        warn!(path = %path.display(), code = %err.error_code(), error = %err, "file failed");
    }
    FileOutcome {
        path,
        module_name,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuglint_core::OutputErrorCode;
    use tuglint_python_cst::{BuildError, Kind, ParserError, PythonVersion, Rule};

    fn pass_registry<'r>() -> SubscriptionRegistry<'r> {
        let mut registry = SubscriptionRegistry::new();
        registry.register_node(&[Kind::PassStmt], |ctx| {
            if let Some(node) = ctx.syntax_node() {
                ctx.add_issue(node, "Remove this \"pass\".");
            }
        });
        registry
    }

    #[test]
    fn test_analyze_reports_issues() {
        let mut registry = pass_registry();
        let options = AnalysisOptions::default().with_module_name("demo");
        let analysis = analyze("def f():\n    pass\n", &options, &mut registry).unwrap();
        assert_eq!(analysis.issues.len(), 1);
        assert_eq!(analysis.issues[0].primary.line(), Some(2));
        let f = analysis.symbols.symbols_with_fqn("demo.f").count();
        assert_eq!(f, 1);
        assert!(!analysis.tree.is_empty());
    }

    #[test]
    fn test_analyze_syntax_error() {
        let mut registry = pass_registry();
        let err = analyze("def f(:\n", &AnalysisOptions::default(), &mut registry).unwrap_err();
        assert_eq!(err.error_code(), OutputErrorCode::SyntaxError);
    }

    #[test]
    fn test_structural_build_failure_is_internal() {
        // The conversion `analyze` applies to parse failures.
        let err = TuglintError::from(ParserError::from(BuildError::structural(
            Rule::Trailer,
            2,
            "missing child",
        )));
        assert_eq!(err.error_code(), OutputErrorCode::InternalError);
        assert_eq!(err.to_json()["code"], 10);
        assert!(err.to_string().contains("unexpected Trailer shape at line 2"));
    }

    #[test]
    fn test_options_builders_and_json() {
        let parse = ParseOptions::new(PythonVersion::V3_7);
        let options = AnalysisOptions::default().with_parse(parse).with_module_name("m");
        assert_eq!(options.parse, parse);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(AnalysisOptions::from_json(&json).unwrap(), options);
        assert!(AnalysisOptions::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_version_gated_syntax() {
        let options = AnalysisOptions::default().with_parse(ParseOptions::new(PythonVersion::V3_7));
        let mut registry = pass_registry();
        assert!(analyze("if (n := 1): pass\n", &options, &mut registry).is_err());
        let mut registry = pass_registry();
        assert!(analyze("if (n := 1): pass\n", &AnalysisOptions::default(), &mut registry).is_ok());
    }
}
