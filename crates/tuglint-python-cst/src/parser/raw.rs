// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The raw concrete parse tree.
//!
//! The grammar produces a generic tree: every interior node is tagged with
//! the grammar [`Rule`] that matched it, and every leaf is a token. Rules
//! that would only wrap a single child (an `or_test` without `or`, an
//! `arith_expr` without `+`) are not materialized, so an expression like
//! `x` is a `NAME` node directly under whatever consumed it.
//!
//! The tree builder navigates this tree positionally: by rule, by token
//! kind, by sibling. [`RawMatcher`] abstracts "what am I looking for".

use std::fmt;

use crate::nodes::TokenId;
use crate::tokenizer::{Keyword, Punct, TokType, Token};

/// Grammar rules that produce raw nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    FileInput,
    StmtList,
    Suite,
    ExpressionStmt,
    AnnAssign,
    TestlistStarExpr,
    PassStmt,
    BreakStmt,
    ContinueStmt,
    DelStmt,
    ReturnStmt,
    RaiseStmt,
    GlobalStmt,
    NonlocalStmt,
    AssertStmt,
    YieldStmt,
    ImportName,
    ImportFrom,
    ImportAsName,
    ImportAsNames,
    DottedAsName,
    DottedAsNames,
    DottedName,
    IfStmt,
    WhileStmt,
    ForStmt,
    TryStmt,
    ExceptClause,
    WithStmt,
    WithItem,
    FuncDef,
    ClassDef,
    Decorators,
    Decorator,
    TypedArgsList,
    Tfpdef,
    VarArgsList,
    Vfpdef,
    NamedExprTest,
    Test,
    Lambdef,
    OrTest,
    AndTest,
    NotTest,
    Comparison,
    CompOperator,
    StarExpr,
    Expr,
    XorExpr,
    AndExpr,
    ShiftExpr,
    ArithExpr,
    Term,
    Factor,
    Power,
    AtomExpr,
    Trailer,
    SubscriptList,
    Subscript,
    SliceOp,
    Atom,
    Name,
    TestlistComp,
    DictOrSetMaker,
    ArgList,
    Argument,
    CompFor,
    CompIf,
    ExprList,
    Testlist,
    YieldExpr,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ============================================================================
// Parse output
// ============================================================================

/// An owned tree as produced by grammar actions.
///
/// Grammar alternatives may backtrack, so actions build plain owned values
/// and the arena is only created once the parse has succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedNode {
    Rule(Rule, Vec<ParsedNode>),
    Leaf(TokenId),
}

impl ParsedNode {
    pub fn rule(&self) -> Option<Rule> {
        match self {
            ParsedNode::Rule(rule, _) => Some(*rule),
            ParsedNode::Leaf(_) => None,
        }
    }
}

// ============================================================================
// Arena
// ============================================================================

/// Index of a node in a [`RawTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawId(u32);

impl RawId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a raw node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Rule(Rule),
    Token(TokenId),
}

#[derive(Debug, Clone)]
pub struct RawNode {
    pub kind: RawKind,
    pub children: Vec<RawId>,
    pub parent: Option<RawId>,
}

/// A raw parse tree together with the token stream it was parsed from.
#[derive(Debug)]
pub struct RawTree {
    nodes: Vec<RawNode>,
    tokens: Vec<Token>,
    root: RawId,
}

impl RawTree {
    /// Move a parse result into an arena, linking parents.
    pub fn new(parsed: ParsedNode, tokens: Vec<Token>) -> Self {
        let mut tree = RawTree {
            nodes: Vec::new(),
            tokens,
            root: RawId(0),
        };
        tree.root = tree.alloc(parsed, None);
        tree
    }

    fn alloc(&mut self, parsed: ParsedNode, parent: Option<RawId>) -> RawId {
        let id = RawId(self.nodes.len() as u32);
        match parsed {
            ParsedNode::Leaf(token) => self.nodes.push(RawNode {
                kind: RawKind::Token(token),
                children: Vec::new(),
                parent,
            }),
            ParsedNode::Rule(rule, children) => {
                self.nodes.push(RawNode {
                    kind: RawKind::Rule(rule),
                    children: Vec::new(),
                    parent,
                });
                let ids: Vec<RawId> = children
                    .into_iter()
                    .map(|child| self.alloc(child, Some(id)))
                    .collect();
                self.nodes[id.index()].children = ids;
            }
        }
        id
    }

    pub fn root(&self) -> RawId {
        self.root
    }

    pub fn node(&self, id: RawId) -> &RawNode {
        &self.nodes[id.index()]
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Give up the tree, keeping only the token stream.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn rule(&self, id: RawId) -> Option<Rule> {
        match self.node(id).kind {
            RawKind::Rule(rule) => Some(rule),
            RawKind::Token(_) => None,
        }
    }

    pub fn token_id(&self, id: RawId) -> Option<TokenId> {
        match self.node(id).kind {
            RawKind::Token(token) => Some(token),
            RawKind::Rule(_) => None,
        }
    }

    pub fn token(&self, id: RawId) -> Option<&Token> {
        self.token_id(id).map(|t| &self.tokens[t.index()])
    }

    pub fn children(&self, id: RawId) -> &[RawId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: RawId) -> Option<RawId> {
        self.node(id).parent
    }

    pub fn is(&self, id: RawId, matcher: impl RawMatcher) -> bool {
        matcher.matches(self, id)
    }

    pub fn first_child(&self, id: RawId, matcher: impl RawMatcher) -> Option<RawId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| matcher.matches(self, c))
    }

    pub fn has_child(&self, id: RawId, matcher: impl RawMatcher) -> bool {
        self.first_child(id, matcher).is_some()
    }

    pub fn children_matching<'a, M: RawMatcher + 'a>(
        &'a self,
        id: RawId,
        matcher: M,
    ) -> impl Iterator<Item = RawId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| matcher.matches(self, c))
    }

    pub fn last_child(&self, id: RawId) -> Option<RawId> {
        self.children(id).last().copied()
    }

    fn sibling(&self, id: RawId, offset: isize) -> Option<RawId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&c| c == id)?;
        let target = position.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }

    pub fn next_sibling(&self, id: RawId) -> Option<RawId> {
        self.sibling(id, 1)
    }

    pub fn previous_sibling(&self, id: RawId) -> Option<RawId> {
        self.sibling(id, -1)
    }

    /// The leftmost token under `id`.
    pub fn first_token(&self, id: RawId) -> TokenId {
        let mut current = id;
        loop {
            match self.node(current).kind {
                RawKind::Token(token) => return token,
                RawKind::Rule(_) => match self.children(current).first() {
                    Some(&child) => current = child,
                    // Rules always have at least one token; an empty rule is
                    // attributed to the end of input.
                    None => return TokenId::new(self.tokens.len().saturating_sub(1)),
                },
            }
        }
    }

    /// The line of the first token under `id`.
    pub fn line(&self, id: RawId) -> u32 {
        self.tokens[self.first_token(id).index()].line()
    }
}

// ============================================================================
// Matchers
// ============================================================================

/// Something a raw node can be tested against.
pub trait RawMatcher: Copy {
    fn matches(&self, tree: &RawTree, id: RawId) -> bool;
}

impl RawMatcher for Rule {
    fn matches(&self, tree: &RawTree, id: RawId) -> bool {
        tree.rule(id) == Some(*self)
    }
}

impl RawMatcher for TokType {
    fn matches(&self, tree: &RawTree, id: RawId) -> bool {
        tree.token(id).is_some_and(|t| t.kind == *self)
    }
}

impl RawMatcher for Keyword {
    fn matches(&self, tree: &RawTree, id: RawId) -> bool {
        TokType::Keyword(*self).matches(tree, id)
    }
}

impl RawMatcher for Punct {
    fn matches(&self, tree: &RawTree, id: RawId) -> bool {
        TokType::Punct(*self).matches(tree, id)
    }
}

impl<M: RawMatcher, const N: usize> RawMatcher for [M; N] {
    fn matches(&self, tree: &RawTree, id: RawId) -> bool {
        self.iter().any(|m| m.matches(tree, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::TokState;

    fn sample() -> RawTree {
        // x + y
        let tokens = TokState::new("x + y").tokenize().unwrap();
        let parsed = ParsedNode::Rule(
            Rule::ArithExpr,
            vec![
                ParsedNode::Rule(Rule::Name, vec![ParsedNode::Leaf(TokenId::new(0))]),
                ParsedNode::Leaf(TokenId::new(1)),
                ParsedNode::Rule(Rule::Name, vec![ParsedNode::Leaf(TokenId::new(2))]),
            ],
        );
        RawTree::new(parsed, tokens)
    }

    #[test]
    fn test_navigation() {
        let tree = sample();
        let root = tree.root();
        assert_eq!(tree.rule(root), Some(Rule::ArithExpr));
        assert_eq!(tree.children(root).len(), 3);

        let plus = tree.first_child(root, Punct::Plus).unwrap();
        let left = tree.previous_sibling(plus).unwrap();
        let right = tree.next_sibling(plus).unwrap();
        assert!(tree.is(left, Rule::Name));
        assert!(tree.is(right, Rule::Name));
        assert_eq!(tree.next_sibling(right), None);
        assert_eq!(tree.previous_sibling(left), None);
        assert_eq!(tree.parent(plus), Some(root));
        assert_eq!(tree.children_matching(root, Rule::Name).count(), 2);
        assert!(tree.is(plus, [Punct::Minus, Punct::Plus]));
        assert!(!tree.has_child(root, Punct::Minus));
    }

    #[test]
    fn test_first_token_and_line() {
        let tree = sample();
        let root = tree.root();
        assert_eq!(tree.first_token(root), TokenId::new(0));
        assert_eq!(tree.line(root), 1);
        let right = tree.last_child(root).unwrap();
        assert_eq!(tree.token(tree.children(right)[0]).unwrap().value, "y");
    }
}
