// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Conversion of the raw parse tree into the typed [`Tree`].
//!
//! Every mapping rule reads one raw shape and pushes exactly one typed node,
//! after pushing the nodes for its parts. Ids are therefore assigned
//! bottom-up and the root is pushed last.
//!
//! A node's children are computed when it is pushed: its sub-nodes in source
//! order, interleaved with every real token of its span that no sub-node
//! covers. Commas, brackets and line breaks land on the innermost node whose
//! span contains them without any mapping rule naming them.
//!
//! Parents are linked in a separate pass once the root exists.

mod expression;
mod statement;

use tracing::debug;

use crate::nodes::{Child, Kind, Node, NodeId, TokenId, Tree};
use crate::parser::{BuildError, RawId, RawKind, RawTree};
use crate::tokenizer::TokType;

type BuildResult<T> = std::result::Result<T, BuildError>;

/// Build the typed tree for a whole file.
pub(crate) fn build(raw: &RawTree) -> BuildResult<Tree> {
    let mut builder = Builder {
        raw,
        tree: Tree::with_tokens(raw.tokens().to_vec()),
        in_class_body: false,
    };
    let root = builder.file_input(raw.root())?;
    let mut tree = builder.tree;
    tree.set_root(root);
    link_parents(&mut tree);
    debug!(nodes = tree.len(), tokens = tree.tokens().len(), "built typed tree");
    Ok(tree)
}

/// Assign every reachable node its parent, top-down from the root.
fn link_parents(tree: &mut Tree) {
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let children: Vec<NodeId> = tree.child_nodes(id).collect();
        for child in children {
            tree.set_parent(child, id);
            stack.push(child);
        }
    }
}

/// The sub-nodes and tokens a node is made of.
///
/// Only the outermost tokens matter for the span; tokens between parts are
/// picked up by gap filling whether they are listed or not.
#[derive(Debug, Default)]
struct Parts {
    nodes: Vec<NodeId>,
    tokens: Vec<TokenId>,
}

impl Parts {
    fn new() -> Self {
        Parts::default()
    }

    fn node(mut self, node: impl Into<Option<NodeId>>) -> Self {
        self.nodes.extend(node.into());
        self
    }

    fn nodes(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    fn token(mut self, token: impl Into<Option<TokenId>>) -> Self {
        self.tokens.extend(token.into());
        self
    }

    fn tokens(mut self, tokens: impl IntoIterator<Item = TokenId>) -> Self {
        self.tokens.extend(tokens);
        self
    }
}

struct Builder<'r> {
    raw: &'r RawTree,
    tree: Tree,
    /// Set while building the statements directly inside a class body.
    in_class_body: bool,
}

impl Builder<'_> {
    /// Push a node whose span covers all of `parts`.
    fn push(&mut self, kind: Kind, node: impl Into<Node>, parts: Parts) -> BuildResult<NodeId> {
        let Parts { mut nodes, tokens } = parts;
        nodes.sort_by_key(|&n| self.tree.first_token_id(n));

        let firsts = nodes.iter().map(|&n| self.tree.first_token_id(n));
        let lasts = nodes.iter().map(|&n| self.tree.last_token_id(n));
        let first = firsts.chain(tokens.iter().copied()).min();
        let last = lasts.chain(tokens.iter().copied()).max();
        let (Some(first), Some(last)) = (first, last) else {
            return Err(BuildError::structural(kind, 0, "node without tokens"));
        };

        let mut children = Vec::with_capacity(nodes.len() + tokens.len());
        let mut cursor = first.index();
        for &child in &nodes {
            let start = self.tree.first_token_id(child).index();
            if start < cursor {
                let line = self.tree.token(first).line();
                return Err(BuildError::structural(kind, line, "overlapping children"));
            }
            self.fill_gap(&mut children, cursor, start);
            children.push(Child::Node(child));
            cursor = self.tree.last_token_id(child).index() + 1;
        }
        self.fill_gap(&mut children, cursor, last.index() + 1);

        Ok(self.tree.push(kind, node.into(), children, first, last))
    }

    fn fill_gap(&self, children: &mut Vec<Child>, from: usize, to: usize) {
        let tokens = self.tree.tokens();
        children.extend(
            (from..to)
                .filter(|&i| !tokens[i].is_virtual())
                .map(|i| Child::Token(TokenId::new(i))),
        );
    }

    // ------------------------------------------------------------------------
    // Raw tree access
    // ------------------------------------------------------------------------

    fn unexpected(&self, id: RawId, message: &str) -> BuildError {
        let what = match self.raw.node(id).kind {
            RawKind::Rule(rule) => rule.to_string(),
            RawKind::Token(token) => self.raw.tokens()[token.index()].to_string(),
        };
        BuildError::structural(what, self.raw.line(id), message)
    }

    fn child(&self, id: RawId, index: usize) -> BuildResult<RawId> {
        self.raw
            .children(id)
            .get(index)
            .copied()
            .ok_or_else(|| self.unexpected(id, "missing child"))
    }

    fn token(&self, id: RawId) -> BuildResult<TokenId> {
        self.raw
            .token_id(id)
            .ok_or_else(|| self.unexpected(id, "expected a token"))
    }

    /// First and last real tokens under a raw node.
    fn bounds(&self, id: RawId) -> [TokenId; 2] {
        let tokens = self.raw.tokens();
        let mut first = self.raw.first_token(id).index();
        let mut current = id;
        while let Some(last) = self.raw.last_child(current) {
            current = last;
        }
        let mut last = self
            .raw
            .token_id(current)
            .map_or(first, |token| token.index());
        while first < last && tokens[first].is_virtual() {
            first += 1;
        }
        while last > first && tokens[last].is_virtual() {
            last -= 1;
        }
        [TokenId::new(first), TokenId::new(last)]
    }

    /// The `async` name right before a `def`, `for` or `with` keyword.
    fn async_before(&self, keyword: TokenId) -> Option<TokenId> {
        let index = keyword.index().checked_sub(1)?;
        let token = &self.tree.tokens()[index];
        (token.kind == TokType::Name && token.value == "async").then(|| TokenId::new(index))
    }

    /// The docstring of a module, class or function body.
    fn docstring(&self, body: Option<NodeId>) -> Option<NodeId> {
        let list = self.tree.node(body?).as_statement_list()?;
        let first = *list.statements.first()?;
        let statement = self.tree.node(first).as_expression_stmt()?;
        match statement.expressions.as_slice() {
            [only] if self.tree.is(*only, Kind::StringLiteral) => Some(*only),
            _ => None,
        }
    }
}
