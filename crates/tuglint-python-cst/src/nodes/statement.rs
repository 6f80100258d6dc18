// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Statement, clause, argument and parameter payloads.

use super::{NodeId, TokenId};

/// The whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    /// Absent for a file without statements.
    pub statements: Option<NodeId>,
    pub end_of_file: TokenId,
    /// The module docstring: a [`super::StringLiteral`] below `statements`.
    pub docstring: Option<NodeId>,
}

/// A sequence of statements: a file body or a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementList {
    pub statements: Vec<NodeId>,
}

/// An `if` statement, or one `elif` branch of an enclosing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    /// `if` or `elif`.
    pub keyword: TokenId,
    pub condition: NodeId,
    pub colon: TokenId,
    pub body: NodeId,
    /// `elif` branches, each an `IfStmt` with `is_elif` set.
    pub elif_branches: Vec<NodeId>,
    pub else_clause: Option<NodeId>,
    pub is_elif: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseClause {
    pub else_keyword: TokenId,
    pub colon: TokenId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassStmt {
    pub keyword: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertStmt {
    pub keyword: TokenId,
    pub condition: NodeId,
    pub message: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelStmt {
    pub keyword: TokenId,
    pub expressions: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    pub keyword: TokenId,
    pub expressions: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YieldStmt {
    pub yield_expr: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaiseStmt {
    pub keyword: TokenId,
    pub expressions: Vec<NodeId>,
    pub from_keyword: Option<TokenId>,
    pub from_expression: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakStmt {
    pub keyword: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinueStmt {
    pub keyword: TokenId,
}

/// A function definition, with its decorators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDef {
    pub decorators: Vec<NodeId>,
    /// The `async` modifier, taken from the token right before `def`.
    pub async_keyword: Option<TokenId>,
    pub def_keyword: TokenId,
    pub name: NodeId,
    pub left_paren: TokenId,
    pub parameters: Option<NodeId>,
    pub right_paren: TokenId,
    pub return_annotation: Option<NodeId>,
    pub colon: TokenId,
    pub body: NodeId,
    pub docstring: Option<NodeId>,
    /// Defined directly in a class body.
    pub is_method_definition: bool,
}

impl FuncDef {
    pub fn is_async(&self) -> bool {
        self.async_keyword.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub decorators: Vec<NodeId>,
    pub class_keyword: TokenId,
    pub name: NodeId,
    pub left_paren: Option<TokenId>,
    /// Superclasses and keyword arguments such as `metaclass=`.
    pub args: Option<NodeId>,
    pub right_paren: Option<TokenId>,
    pub colon: TokenId,
    pub body: NodeId,
    pub docstring: Option<NodeId>,
}

/// `import a.b as c, d`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportName {
    pub import_keyword: TokenId,
    pub modules: Vec<NodeId>,
}

/// `from ..a import b as c`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFrom {
    pub from_keyword: TokenId,
    /// Leading `.` and `...` tokens of a relative import.
    pub dotted_prefix: Vec<TokenId>,
    pub module: Option<NodeId>,
    pub import_keyword: TokenId,
    pub imported_names: Vec<NodeId>,
    /// The `*` of a wildcard import.
    pub wildcard: Option<TokenId>,
}

impl ImportFrom {
    pub fn is_wildcard_import(&self) -> bool {
        self.wildcard.is_some()
    }

    /// Number of leading dots, counting `...` as three.
    pub fn relative_level(&self, tree: &super::Tree) -> usize {
        self.dotted_prefix
            .iter()
            .map(|&t| tree.token(t).value.len())
            .sum()
    }
}

/// A dotted name with an optional alias: `a.b as c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasedName {
    pub dotted_name: NodeId,
    pub as_keyword: Option<TokenId>,
    pub alias: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DottedName {
    pub names: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForStmt {
    pub async_keyword: Option<TokenId>,
    pub for_keyword: TokenId,
    /// Loop targets.
    pub expressions: Vec<NodeId>,
    pub in_keyword: TokenId,
    /// Iterated expressions.
    pub test_expressions: Vec<NodeId>,
    pub colon: TokenId,
    pub body: NodeId,
    pub else_clause: Option<NodeId>,
}

impl ForStmt {
    pub fn is_async(&self) -> bool {
        self.async_keyword.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    pub while_keyword: TokenId,
    pub condition: NodeId,
    pub colon: TokenId,
    pub body: NodeId,
    pub else_clause: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalStmt {
    pub keyword: TokenId,
    pub names: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonlocalStmt {
    pub keyword: TokenId,
    pub names: Vec<NodeId>,
}

/// An expression evaluated for its effect: `f(x)`, `a, b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionStmt {
    pub expressions: Vec<NodeId>,
}

/// `a = b = value`: one [`super::ExpressionList`] per target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentStmt {
    pub lhs_expressions: Vec<NodeId>,
    pub equal_tokens: Vec<TokenId>,
    pub assigned_value: NodeId,
}

/// `a += value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundAssignment {
    pub lhs_expression: NodeId,
    pub operator: TokenId,
    pub rhs_expression: NodeId,
}

/// `a: T = value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedAssignment {
    pub variable: NodeId,
    pub annotation: NodeId,
    pub equal_token: Option<TokenId>,
    pub assigned_value: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryStmt {
    pub try_keyword: TokenId,
    pub colon: TokenId,
    pub body: NodeId,
    pub except_clauses: Vec<NodeId>,
    pub else_clause: Option<NodeId>,
    pub finally_clause: Option<NodeId>,
}

/// `except E as e:` with its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptClause {
    pub except_keyword: TokenId,
    pub exception: Option<NodeId>,
    pub as_keyword: Option<TokenId>,
    pub exception_instance: Option<NodeId>,
    pub colon: TokenId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinallyClause {
    pub finally_keyword: TokenId,
    pub colon: TokenId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithStmt {
    pub async_keyword: Option<TokenId>,
    pub with_keyword: TokenId,
    pub items: Vec<NodeId>,
    pub colon: TokenId,
    pub body: NodeId,
}

impl WithStmt {
    pub fn is_async(&self) -> bool {
        self.async_keyword.is_some()
    }
}

/// `expr as target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithItem {
    pub test: NodeId,
    pub as_keyword: Option<TokenId>,
    pub target: Option<NodeId>,
}

/// `@name.attr(args)` and its line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    pub at_token: TokenId,
    pub name: NodeId,
    pub left_paren: Option<TokenId>,
    pub arguments: Option<NodeId>,
    pub right_paren: Option<TokenId>,
    pub newline: TokenId,
}

// ============================================================================
// Arguments and parameters
// ============================================================================

/// The arguments between the parentheses of a call, class or decorator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgList {
    /// [`RegularArgument`] or [`super::UnpackingExpr`] nodes.
    pub arguments: Vec<NodeId>,
}

/// A positional argument, or a keyword argument when `keyword` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegularArgument {
    pub keyword: Option<NodeId>,
    pub equal_token: Option<TokenId>,
    pub expression: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterList {
    pub parameters: Vec<NodeId>,
}

/// One parameter.
///
/// A bare `*` or `/` marker is a parameter with `star_token` set and no
/// name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// `*`, `**` or `/`.
    pub star_token: Option<TokenId>,
    pub name: Option<NodeId>,
    pub annotation: Option<NodeId>,
    pub equal_token: Option<TokenId>,
    pub default_value: Option<NodeId>,
}

/// `: expr` on a parameter or variable, `-> expr` on a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    /// `:` or `->`.
    pub marker: TokenId,
    pub expression: NodeId,
}
