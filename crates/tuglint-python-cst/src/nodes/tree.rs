// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The [`Tree`] arena and its navigation API.

use tuglint_core::{Span, TextRange};

use super::{Child, Kind, Node, NodeId, TokenId};
use crate::tokenizer::Token;
use crate::visitor::{self, TreeVisitor, VisitResult};

/// One node in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub kind: Kind,
    pub node: Node,
    pub children: Vec<Child>,
    pub first_token: TokenId,
    pub last_token: TokenId,
    pub parent: Option<NodeId>,
}

/// A typed syntax tree for one file.
///
/// Built once by [`crate::parse_module`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    tokens: Vec<Token>,
    root: NodeId,
}

impl Tree {
    pub(crate) fn with_tokens(tokens: Vec<Token>) -> Self {
        Tree {
            nodes: Vec::new(),
            tokens,
            root: NodeId::new(0),
        }
    }

    /// Add a node. `children` must be sorted and lie within
    /// `first_token..=last_token`.
    pub(crate) fn push(
        &mut self,
        kind: Kind,
        node: Node,
        children: Vec<Child>,
        first_token: TokenId,
        last_token: TokenId,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            node,
            children,
            first_token,
            last_token,
            parent: None,
        });
        id
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        let data = &mut self.nodes[id.index()];
        debug_assert!(
            data.parent.is_none(),
            "{} already has parent {:?}",
            id,
            data.parent
        );
        data.parent = Some(parent);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids, in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> Kind {
        self.data(id).kind
    }

    pub fn is(&self, id: NodeId, kind: Kind) -> bool {
        self.kind(id) == kind
    }

    /// The typed payload.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.data(id).node
    }

    pub fn children(&self, id: NodeId) -> &[Child] {
        &self.data(id).children
    }

    /// Direct sub-nodes, skipping tokens.
    pub fn child_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().filter_map(|c| c.as_node())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// The nearest ancestor of one of `kinds`.
    pub fn first_ancestor_of(&self, id: NodeId, kinds: &[Kind]) -> Option<NodeId> {
        self.ancestors(id).find(|&a| kinds.contains(&self.kind(a)))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    pub fn first_token_id(&self, id: NodeId) -> TokenId {
        self.data(id).first_token
    }

    pub fn last_token_id(&self, id: NodeId) -> TokenId {
        self.data(id).last_token
    }

    pub fn first_token(&self, id: NodeId) -> &Token {
        self.token(self.first_token_id(id))
    }

    pub fn last_token(&self, id: NodeId) -> &Token {
        self.token(self.last_token_id(id))
    }

    /// Byte span from the start of the first token to the end of the last.
    pub fn span(&self, id: NodeId) -> Span {
        self.first_token(id).span.cover(&self.last_token(id).span)
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.first_token(id).range().to(&self.last_token(id).range())
    }

    /// 1-based line of the first token.
    pub fn line(&self, id: NodeId) -> u32 {
        self.first_token(id).line()
    }

    /// Source text of the node, rebuilt from its leaves.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut first = true;
        self.collect_text(id, &mut first, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, first: &mut bool, out: &mut String) {
        for child in self.children(id) {
            match *child {
                Child::Node(node) => self.collect_text(node, first, out),
                Child::Token(token) => {
                    let token = self.token(token);
                    if !*first {
                        out.push_str(&token.prefix);
                    }
                    out.push_str(&token.value);
                    *first = false;
                }
            }
        }
    }

    /// Every token under `id`, in source order.
    pub fn leaves(&self, id: NodeId) -> Vec<TokenId> {
        let mut out = Vec::new();
        let mut stack = vec![Child::Node(id)];
        while let Some(current) = stack.pop() {
            match current {
                Child::Token(token) => out.push(token),
                Child::Node(node) => stack.extend(self.children(node).iter().rev().copied()),
            }
        }
        out
    }

    /// Invoke the visitor method matching the payload of `id`.
    pub fn accept<V: TreeVisitor + ?Sized>(&self, id: NodeId, visitor: &mut V) -> VisitResult {
        visitor::accept(self, id, visitor)
    }

    /// Pre-order walk from the root, children in source order.
    pub fn walk<V: TreeVisitor + ?Sized>(&self, visitor: &mut V) -> VisitResult {
        visitor::walk(self, self.root, visitor)
    }

    /// Pre-order ids of every node under and including `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let children: Vec<NodeId> = self.child_nodes(current).collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

/// Iterator over a node's ancestors.
pub struct Ancestors<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
