//! Subscription registry and the single-pass dispatch engine.
//!
//! Rule consumers subscribe to node kinds, to the file as a whole, or to
//! each source line. [`DispatchEngine::run`] then makes exactly one
//! pre-order walk of the tree:
//!
//! 1. every [`Subscription::File`] consumer runs once, in registration order
//! 2. for each node, every consumer subscribed to its kind runs, in
//!    registration order
//! 3. every [`Subscription::Line`] consumer runs once per source line
//!
//! Each invocation reports into its own buffer, which is appended to the
//! file's issues when the consumer returns. For a fixed tree, symbol table
//! and registration order the issues are always the same.
//!
//! ```
//! use tuglint_python::{DispatchEngine, SubscriptionRegistry, SymbolTable};
//! use tuglint_python_cst::{parse_module, Kind, ParseOptions};
//!
//! let tree = parse_module("pass\nx = 1\npass\n", ParseOptions::default()).unwrap();
//! let table = SymbolTable::build(&tree, "example").unwrap();
//!
//! let mut registry = SubscriptionRegistry::new();
//! registry.register_node(&[Kind::PassStmt], |ctx| {
//!     if let Some(node) = ctx.syntax_node() {
//!         ctx.add_issue(node, "Remove this \"pass\".");
//!     }
//! });
//!
//! let issues = DispatchEngine::run(&tree, &table, &mut registry);
//! assert_eq!(issues.len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};
use tuglint_core::Issue;
use tuglint_python_cst::{Kind, TokType, Tree};

use crate::context::SubscriptionContext;
use crate::table::SymbolTable;

/// What a consumer subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// Every node of this kind.
    Node(Kind),
    /// The file, once, before the walk.
    File,
    /// Every source line, after the walk.
    Line,
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subscription::Node(kind) => write!(f, "{}", kind),
            Subscription::File => write!(f, "FILE"),
            Subscription::Line => write!(f, "LINE"),
        }
    }
}

/// A rule callback.
pub type Consumer<'r> = Box<dyn FnMut(&mut SubscriptionContext<'_>) + 'r>;

/// Consumers and what they subscribe to, for one file.
///
/// A registry is built fresh for every file, before the walk starts.
#[derive(Default)]
pub struct SubscriptionRegistry<'r> {
    consumers: Vec<Consumer<'r>>,
    by_kind: HashMap<Kind, Vec<usize>>,
    file: Vec<usize>,
    line: Vec<usize>,
}

impl<'r> SubscriptionRegistry<'r> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered consumers.
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    fn add(&mut self, consumer: Consumer<'r>) -> usize {
        self.consumers.push(consumer);
        self.consumers.len() - 1
    }

    pub fn register(&mut self, subscription: Subscription, consumer: impl FnMut(&mut SubscriptionContext<'_>) + 'r) {
        let index = self.add(Box::new(consumer));
        self.subscribe(subscription, index);
    }

    fn subscribe(&mut self, subscription: Subscription, index: usize) {
        match subscription {
            Subscription::Node(kind) => self.by_kind.entry(kind).or_default().push(index),
            Subscription::File => self.file.push(index),
            Subscription::Line => self.line.push(index),
        }
    }

    /// Register one consumer for several node kinds.
    pub fn register_node(&mut self, kinds: &[Kind], consumer: impl FnMut(&mut SubscriptionContext<'_>) + 'r) {
        let index = self.add(Box::new(consumer));
        for &kind in kinds {
            self.subscribe(Subscription::Node(kind), index);
        }
    }

    pub fn register_file(&mut self, consumer: impl FnMut(&mut SubscriptionContext<'_>) + 'r) {
        self.register(Subscription::File, consumer);
    }

    pub fn register_line(&mut self, consumer: impl FnMut(&mut SubscriptionContext<'_>) + 'r) {
        self.register(Subscription::Line, consumer);
    }
}

impl fmt::Debug for SubscriptionRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("consumers", &self.consumers.len())
            .field("kinds", &self.by_kind.len())
            .field("file", &self.file.len())
            .field("line", &self.line.len())
            .finish()
    }
}

/// Drives one file's consumers over its tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchEngine;

impl DispatchEngine {
    /// Run every consumer of `registry` over `tree` and collect their issues.
    pub fn run(tree: &Tree, table: &SymbolTable, registry: &mut SubscriptionRegistry<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();

        for &index in &registry.file {
            let mut ctx = SubscriptionContext::new(tree, table, None, None);
            (registry.consumers[index])(&mut ctx);
            issues.extend(ctx.into_issues());
        }

        let mut visited = 0usize;
        if !registry.by_kind.is_empty() {
            for id in tree.descendants(tree.root()) {
                visited += 1;
                let Some(subscribers) = registry.by_kind.get(&tree.kind(id)) else {
                    continue;
                };
                for &index in subscribers {
                    let mut ctx = SubscriptionContext::new(tree, table, Some(id), Some(tree.line(id)));
                    (registry.consumers[index])(&mut ctx);
                    issues.extend(ctx.into_issues());
                }
            }
        }

        if !registry.line.is_empty() {
            let lines = line_count(tree);
            trace!(lines, "dispatching line events");
            for line in 1..=lines {
                for &index in &registry.line {
                    let mut ctx = SubscriptionContext::new(tree, table, None, Some(line));
                    (registry.consumers[index])(&mut ctx);
                    issues.extend(ctx.into_issues());
                }
            }
        }

        debug!(
            consumers = registry.len(),
            nodes = visited,
            issues = issues.len(),
            "dispatched"
        );
        issues
    }
}

/// Number of source lines. A final line break does not start a new line.
pub fn line_count(tree: &Tree) -> u32 {
    let end = tree
        .tokens()
        .iter()
        .rev()
        .find(|token| token.kind == TokType::EndMarker);
    match end {
        Some(token) if token.start.column == 0 => token.start.line.saturating_sub(1),
        Some(token) => token.start.line,
        None => tree.last_token(tree.root()).end.line,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use tuglint_core::IssueLocation;
    use tuglint_python_cst::{parse_module, ParseOptions};

    fn setup(source: &str) -> (Tree, SymbolTable) {
        let tree = parse_module(source, ParseOptions::default()).unwrap();
        let table = SymbolTable::build(&tree, "m").unwrap();
        (tree, table)
    }

    #[test]
    fn test_consumers_run_in_registration_order() {
        let (tree, table) = setup("pass\npass\n");
        let log = RefCell::new(Vec::new());
        let mut registry = SubscriptionRegistry::new();
        registry.register(Subscription::Node(Kind::PassStmt), |ctx| {
            log.borrow_mut().push(("A", ctx.line()));
        });
        registry.register(Subscription::Node(Kind::PassStmt), |ctx| {
            log.borrow_mut().push(("B", ctx.line()));
        });
        DispatchEngine::run(&tree, &table, &mut registry);
        drop(registry);
        assert_eq!(
            log.into_inner(),
            vec![("A", Some(1)), ("B", Some(1)), ("A", Some(2)), ("B", Some(2))]
        );
    }

    #[test]
    fn test_file_before_nodes_before_lines() {
        let (tree, table) = setup("x = 1\ny = 2\n");
        let log = RefCell::new(Vec::new());
        let mut registry = SubscriptionRegistry::new();
        registry.register_line(|ctx| log.borrow_mut().push(format!("line {:?}", ctx.line())));
        registry.register_node(&[Kind::AssignmentStmt], |ctx| {
            log.borrow_mut().push(format!("assignment {:?}", ctx.line()))
        });
        registry.register_file(|ctx| {
            assert!(ctx.syntax_node().is_none());
            log.borrow_mut().push("file".to_string())
        });
        DispatchEngine::run(&tree, &table, &mut registry);
        drop(registry);
        assert_eq!(
            log.into_inner(),
            vec![
                "file",
                "assignment Some(1)",
                "assignment Some(2)",
                "line Some(1)",
                "line Some(2)"
            ]
        );
    }

    #[test]
    fn test_each_consumer_sees_only_its_own_issues() {
        let (tree, table) = setup("pass\n");
        let mut registry = SubscriptionRegistry::new();
        registry.register_node(&[Kind::PassStmt], |ctx| {
            if let Some(node) = ctx.syntax_node() {
                ctx.add_issue(node, "first");
            }
        });
        registry.register_node(&[Kind::PassStmt], |ctx| {
            assert!(ctx.add_file_issue("second").issue().secondary.is_empty());
        });
        let issues = DispatchEngine::run(&tree, &table, &mut registry);
        let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(issues[1].primary, IssueLocation::File);
    }

    #[test]
    fn test_issue_locations() {
        let (tree, table) = setup("def f(a):\n    return a\n");
        let mut registry = SubscriptionRegistry::new();
        registry.register_node(&[Kind::FuncDef], |ctx| {
            let Some(node) = ctx.syntax_node() else {
                return;
            };
            let def = ctx.tree().node(node).as_func_def().unwrap();
            ctx.add_issue_at_token(def.def_keyword, "keyword")
                .secondary(def.name, "name")
                .secondary_node(def.body);
            if let Some(parameters) = def.parameters {
                ctx.add_issue_range(def.name, parameters, "name to parameters");
            }
        });
        registry.register_line(|ctx| {
            if let Some(line) = ctx.line() {
                ctx.add_line_issue(line, "line");
            }
        });
        let issues = DispatchEngine::run(&tree, &table, &mut registry);
        assert_eq!(issues.len(), 4);
        assert_eq!(issues[0].primary.line(), Some(1));
        assert_eq!(issues[0].secondary.len(), 2);
        assert_eq!(issues[0].secondary[0].message.as_deref(), Some("name"));
        assert_eq!(issues[0].secondary[1].message, None);
        let IssueLocation::Precise { range } = &issues[1].primary else {
            panic!("expected a precise location");
        };
        assert_eq!(range.start.line, 1);
        assert_eq!(range.end.line, 1);
        assert_eq!(range.start.column, 4);
        assert_eq!(range.end.column, 7);
        assert_eq!(issues[2].primary, IssueLocation::Line { line: 1 });
        assert_eq!(issues[3].primary, IssueLocation::Line { line: 2 });
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(&setup("").0), 0);
        assert_eq!(line_count(&setup("x = 1").0), 1);
        assert_eq!(line_count(&setup("x = 1\n").0), 1);
        assert_eq!(line_count(&setup("x = 1\n\n# done\n").0), 3);
    }

    #[test]
    fn test_symbol_queries_from_consumers() {
        let source = "\
class Base:
    def run(self): pass
class Child(Base): pass
Child().run()
Child().stop()
";
        let (tree, table) = setup(source);
        let mut registry = SubscriptionRegistry::new();
        registry.register_node(&[Kind::QualifiedExpr], |ctx| {
            let Some(node) = ctx.syntax_node() else {
                return;
            };
            let qualified = ctx.tree().node(node).as_qualified_expr().unwrap();
            let attribute = ctx.tree().node(qualified.name).as_name().unwrap().name.clone();
            let receiver = ctx.inferred_type(qualified.qualifier);
            if !receiver.can_have_member(ctx.symbol_table(), &attribute) {
                ctx.add_issue(qualified.name, format!("Unknown attribute \"{}\".", attribute));
            }
        });
        let issues = DispatchEngine::run(&tree, &table, &mut registry);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Unknown attribute \"stop\".");
        assert_eq!(issues[0].primary.line(), Some(5));
    }
}
