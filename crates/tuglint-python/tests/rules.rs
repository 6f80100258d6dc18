//! Rule-shaped consumers run end to end: parse, build the symbol table,
//! dispatch, and check the reported issues.

use tuglint_core::{Issue, IssueLocation};
use tuglint_python::{DispatchEngine, SubscriptionRegistry, SymbolTable};
use tuglint_python_cst::{parse_module, Kind, ParseOptions, Tree};

fn analyze(source: &str, register: impl FnOnce(&mut SubscriptionRegistry<'_>)) -> Vec<Issue> {
    let tree: Tree = parse_module(source, ParseOptions::default()).expect("parse failed");
    let table = SymbolTable::build(&tree, "rules").expect("symbol table");
    let mut registry = SubscriptionRegistry::new();
    register(&mut registry);
    DispatchEngine::run(&tree, &table, &mut registry)
}

fn messages(issues: &[Issue]) -> Vec<&str> {
    issues.iter().map(|issue| issue.message.as_str()).collect()
}

/// Flags `raise` of a class that is known not to derive from BaseException.
fn non_exception_raised(registry: &mut SubscriptionRegistry<'_>) {
    registry.register_node(&[Kind::RaiseStmt], |ctx| {
        let Some(node) = ctx.syntax_node() else {
            return;
        };
        let Some(raise) = ctx.tree().node(node).as_raise_stmt() else {
            return;
        };
        let Some(&raised) = raise.expressions.first() else {
            return;
        };
        let Some(class) = ctx.class_symbol(raised) else {
            return;
        };
        if class.has_unresolved_type_hierarchy() || class.is_or_extends_name("BaseException") {
            return;
        }
        let message = "Change this code so that it raises an object deriving from BaseException.";
        let definition = class.definition();
        let issue = ctx.add_issue(raised, message);
        if let Some(range) = definition {
            issue.secondary_range(range, Some("Class definition.".to_string()));
        }
    });
}

#[test]
fn test_raise_of_plain_class_is_reported() {
    let source = "\
class Plain:
    pass
class Failure(ValueError):
    pass
def run(flag):
    if flag:
        raise Plain()
    raise Failure(\"bad\")
";
    let issues = analyze(source, non_exception_raised);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].primary.line(), Some(7));
    assert_eq!(issues[0].secondary.len(), 1);
    assert_eq!(issues[0].secondary[0].range.start.line, 1);
}

#[test]
fn test_unresolved_hierarchy_is_not_reported() {
    let source = "\
from vendor import Base
class Custom(Base):
    pass
class Dynamic(make_base()):
    pass
raise Custom()
raise Dynamic
";
    let issues = analyze(source, non_exception_raised);
    assert!(issues.is_empty(), "unexpected issues: {:?}", messages(&issues));
}

#[test]
fn test_cyclic_hierarchy_does_not_hang() {
    let source = "\
class A(C):
    pass
class B(A):
    pass
class C(B):
    pass
raise A()
";
    let issues = analyze(source, non_exception_raised);
    assert_eq!(messages(&issues).len(), 1);
}

#[test]
fn test_file_and_line_consumers_see_every_line() {
    let source = "import os\n\nvalue = os.getcwd()  # a trailing comment that is long\n";
    let issues = analyze(source, |registry| {
        registry.register_file(|ctx| {
            let lines = tuglint_python::line_count(ctx.tree());
            ctx.add_file_issue(format!("{} lines", lines));
        });
        registry.register_line(|ctx| {
            let Some(line) = ctx.line() else {
                return;
            };
            if line == 3 {
                ctx.add_line_issue(line, "Line is too long.");
            }
        });
    });
    assert_eq!(messages(&issues), vec!["3 lines", "Line is too long."]);
    assert_eq!(issues[0].primary, IssueLocation::File);
    assert_eq!(issues[1].primary, IssueLocation::Line { line: 3 });
}

#[test]
fn test_issues_are_deterministic_across_runs() {
    let source = "\
def a(): pass
def b(): pass
class C:
    def d(self): pass
";
    let tree = parse_module(source, ParseOptions::default()).expect("parse failed");
    let table = SymbolTable::build(&tree, "rules").expect("symbol table");
    let run = || {
        let mut registry = SubscriptionRegistry::new();
        registry.register_node(&[Kind::FuncDef, Kind::ClassDef], |ctx| {
            if let Some(node) = ctx.syntax_node() {
                if let Some(symbol) = ctx.lookup_symbol(node) {
                    let name = symbol.name.clone();
                    ctx.add_issue(node, name);
                }
            }
        });
        DispatchEngine::run(&tree, &table, &mut registry)
    };
    let first = run();
    let second = run();
    assert_eq!(messages(&first), vec!["a", "b", "C", "d"]);
    assert_eq!(first, second);
}
