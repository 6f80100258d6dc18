//! What a rule consumer sees during dispatch.

use tuglint_core::{Issue, IssueLocation, SecondaryLocation, TextRange};
use tuglint_python_cst::{NodeId, TokenId, Tree};

use crate::hierarchy::ClassSymbol;
use crate::symbol::{Symbol, SymbolId};
use crate::table::SymbolTable;
use crate::types::{infer, InferredType};

/// The context of one consumer invocation.
///
/// Issues added here go to a buffer owned by this invocation; the engine
/// appends the buffer to the file's issues after the consumer returns.
pub struct SubscriptionContext<'a> {
    tree: &'a Tree,
    table: &'a SymbolTable,
    node: Option<NodeId>,
    line: Option<u32>,
    issues: Vec<Issue>,
}

impl<'a> SubscriptionContext<'a> {
    pub(crate) fn new(tree: &'a Tree, table: &'a SymbolTable, node: Option<NodeId>, line: Option<u32>) -> Self {
        SubscriptionContext {
            tree,
            table,
            node,
            line,
            issues: Vec::new(),
        }
    }

    pub(crate) fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// The visited node, for node subscriptions.
    pub fn syntax_node(&self) -> Option<NodeId> {
        self.node
    }

    /// The visited line, for line subscriptions.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    pub fn symbol_table(&self) -> &'a SymbolTable {
        self.table
    }

    /// The symbol `node` refers to. See [`SymbolTable::lookup`].
    pub fn lookup_symbol(&self, node: NodeId) -> Option<&'a Symbol> {
        self.table.lookup(self.tree, node).map(|id| self.table.symbol(id))
    }

    pub fn lookup_symbol_id(&self, node: NodeId) -> Option<SymbolId> {
        self.table.lookup(self.tree, node)
    }

    /// The class `node` refers to, if any.
    pub fn class_symbol(&self, node: NodeId) -> Option<ClassSymbol<'a>> {
        self.table
            .lookup(self.tree, node)
            .and_then(|id| self.table.class_symbol(id))
    }

    pub fn inferred_type(&self, node: NodeId) -> InferredType {
        infer(self.tree, self.table, node)
    }

    fn push(&mut self, issue: Issue) -> PreciseIssue<'_> {
        self.issues.push(issue);
        let tree = self.tree;
        let last = self.issues.len() - 1;
        PreciseIssue {
            issue: &mut self.issues[last],
            tree,
        }
    }

    /// Report an issue on the whole of `node`.
    pub fn add_issue(&mut self, node: NodeId, message: impl Into<String>) -> PreciseIssue<'_> {
        let range = self.tree.range(node);
        self.push(Issue::precise(range, message))
    }

    pub fn add_issue_at_token(&mut self, token: TokenId, message: impl Into<String>) -> PreciseIssue<'_> {
        let range = self.tree.token(token).range();
        self.push(Issue::precise(range, message))
    }

    /// Report an issue from the start of `from` to the end of `to`.
    pub fn add_issue_range(&mut self, from: NodeId, to: NodeId, message: impl Into<String>) -> PreciseIssue<'_> {
        let range = self.tree.range(from).to(&self.tree.range(to));
        self.push(Issue::precise(range, message))
    }

    pub fn add_file_issue(&mut self, message: impl Into<String>) -> PreciseIssue<'_> {
        self.push(Issue::file(message))
    }

    pub fn add_line_issue(&mut self, line: u32, message: impl Into<String>) -> PreciseIssue<'_> {
        self.push(Issue::new(IssueLocation::Line { line }, message))
    }
}

/// A reported issue that can still take secondary locations.
pub struct PreciseIssue<'c> {
    issue: &'c mut Issue,
    tree: &'c Tree,
}

impl PreciseIssue<'_> {
    /// Add `node` as a secondary location with a message.
    pub fn secondary(self, node: NodeId, message: impl Into<String>) -> Self {
        let range = self.tree.range(node);
        self.secondary_range(range, Some(message.into()))
    }

    /// Add `node` as a secondary location without a message.
    pub fn secondary_node(self, node: NodeId) -> Self {
        let range = self.tree.range(node);
        self.secondary_range(range, None)
    }

    pub fn secondary_range(self, range: TextRange, message: Option<String>) -> Self {
        self.issue.secondary.push(SecondaryLocation { range, message });
        self
    }

    pub fn issue(&self) -> &Issue {
        self.issue
    }
}
