// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The typed syntax tree.
//!
//! # Arena
//!
//! A [`Tree`] owns every node of one file in a flat arena addressed by
//! [`NodeId`], and every token in a flat vector addressed by [`TokenId`].
//! Nodes refer to each other by id only; the parent link is a plain
//! `Option<NodeId>` written once by the builder's fix-up pass.
//!
//! # Kinds and payloads
//!
//! [`Kind`] is the closed set of node kinds. Each node also carries a typed
//! payload ([`Node`]) with named fields for its parts. Several kinds share a
//! payload type: all binary operators use [`BinaryExpr`], all unary
//! operators [`UnaryExpr`], list/set/generator comprehensions
//! [`ComprehensionExpr`] and the three annotation kinds [`TypeAnnotation`].
//!
//! # Children
//!
//! `children` lists the node's direct sub-nodes and its own tokens in
//! source order. Absent optional parts are not represented. `INDENT` and
//! `DEDENT` tokens never appear. Concatenating the text of all leaves under
//! a node reproduces its source span exactly.

use std::fmt;

mod expression;
mod statement;
mod tree;

pub use expression::*;
pub use statement::*;
pub use tree::{Ancestors, NodeData, Tree};

// ============================================================================
// Ids
// ============================================================================

/// Index of a token in a [`Tree`]'s token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u32);

impl TokenId {
    pub fn new(index: usize) -> Self {
        TokenId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self.0)
    }
}

/// Index of a node in a [`Tree`].
///
/// Ids are assigned in construction order, which is bottom-up: a node's id
/// is larger than the ids of everything below it. The root has the largest
/// id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A direct child of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Child {
    Node(NodeId),
    Token(TokenId),
}

impl Child {
    pub fn as_node(self) -> Option<NodeId> {
        match self {
            Child::Node(id) => Some(id),
            Child::Token(_) => None,
        }
    }

    pub fn as_token(self) -> Option<TokenId> {
        match self {
            Child::Token(id) => Some(id),
            Child::Node(_) => None,
        }
    }
}

// ============================================================================
// Kind
// ============================================================================

/// The closed set of syntax node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    // Statements and clauses
    FileInput,
    StatementList,
    IfStmt,
    ElseClause,
    PassStmt,
    AssertStmt,
    DelStmt,
    ReturnStmt,
    YieldStmt,
    RaiseStmt,
    BreakStmt,
    ContinueStmt,
    FuncDef,
    ClassDef,
    ImportName,
    ImportFrom,
    AliasedName,
    DottedName,
    ForStmt,
    WhileStmt,
    GlobalStmt,
    NonlocalStmt,
    ExpressionStmt,
    AssignmentStmt,
    CompoundAssignment,
    AnnotatedAssignment,
    TryStmt,
    ExceptClause,
    FinallyClause,
    WithStmt,
    WithItem,
    Decorator,

    // Arguments, parameters, annotations
    ArgList,
    RegularArgument,
    ParameterList,
    Parameter,
    TypeAnnotation,
    ReturnTypeAnnotation,
    VariableTypeAnnotation,

    // Expressions
    Name,
    QualifiedExpr,
    CallExpr,
    NumericLiteral,
    StringLiteral,
    StringElement,
    None,
    Ellipsis,
    ListLiteral,
    Tuple,
    SetLiteral,
    DictionaryLiteral,
    KeyValuePair,
    ParenthesizedExpr,
    ExpressionList,
    ListComprehension,
    SetComprehension,
    GeneratorExpr,
    DictComprehension,
    CompFor,
    CompIf,
    ConditionalExpr,
    Lambda,
    StarredExpr,
    UnpackingExpr,
    AwaitExpr,
    SliceExpr,
    SliceList,
    SliceItem,
    SubscriptionExpr,
    YieldExpr,
    AssignmentExpression,

    // Binary operators
    Plus,
    Minus,
    Multiplication,
    Division,
    FloorDivision,
    Modulo,
    MatrixMultiplication,
    ShiftExpr,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    And,
    Or,
    Comparison,
    Power,
    In,
    Is,

    // Unary operators
    UnaryPlus,
    UnaryMinus,
    BitwiseComplement,
    Not,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: &'static [Kind] = &[
        Kind::FileInput,
        Kind::StatementList,
        Kind::IfStmt,
        Kind::ElseClause,
        Kind::PassStmt,
        Kind::AssertStmt,
        Kind::DelStmt,
        Kind::ReturnStmt,
        Kind::YieldStmt,
        Kind::RaiseStmt,
        Kind::BreakStmt,
        Kind::ContinueStmt,
        Kind::FuncDef,
        Kind::ClassDef,
        Kind::ImportName,
        Kind::ImportFrom,
        Kind::AliasedName,
        Kind::DottedName,
        Kind::ForStmt,
        Kind::WhileStmt,
        Kind::GlobalStmt,
        Kind::NonlocalStmt,
        Kind::ExpressionStmt,
        Kind::AssignmentStmt,
        Kind::CompoundAssignment,
        Kind::AnnotatedAssignment,
        Kind::TryStmt,
        Kind::ExceptClause,
        Kind::FinallyClause,
        Kind::WithStmt,
        Kind::WithItem,
        Kind::Decorator,
        Kind::ArgList,
        Kind::RegularArgument,
        Kind::ParameterList,
        Kind::Parameter,
        Kind::TypeAnnotation,
        Kind::ReturnTypeAnnotation,
        Kind::VariableTypeAnnotation,
        Kind::Name,
        Kind::QualifiedExpr,
        Kind::CallExpr,
        Kind::NumericLiteral,
        Kind::StringLiteral,
        Kind::StringElement,
        Kind::None,
        Kind::Ellipsis,
        Kind::ListLiteral,
        Kind::Tuple,
        Kind::SetLiteral,
        Kind::DictionaryLiteral,
        Kind::KeyValuePair,
        Kind::ParenthesizedExpr,
        Kind::ExpressionList,
        Kind::ListComprehension,
        Kind::SetComprehension,
        Kind::GeneratorExpr,
        Kind::DictComprehension,
        Kind::CompFor,
        Kind::CompIf,
        Kind::ConditionalExpr,
        Kind::Lambda,
        Kind::StarredExpr,
        Kind::UnpackingExpr,
        Kind::AwaitExpr,
        Kind::SliceExpr,
        Kind::SliceList,
        Kind::SliceItem,
        Kind::SubscriptionExpr,
        Kind::YieldExpr,
        Kind::AssignmentExpression,
        Kind::Plus,
        Kind::Minus,
        Kind::Multiplication,
        Kind::Division,
        Kind::FloorDivision,
        Kind::Modulo,
        Kind::MatrixMultiplication,
        Kind::ShiftExpr,
        Kind::BitwiseAnd,
        Kind::BitwiseOr,
        Kind::BitwiseXor,
        Kind::And,
        Kind::Or,
        Kind::Comparison,
        Kind::Power,
        Kind::In,
        Kind::Is,
        Kind::UnaryPlus,
        Kind::UnaryMinus,
        Kind::BitwiseComplement,
        Kind::Not,
    ];

    /// Statement kinds: the things a [`StatementList`] holds.
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            Kind::IfStmt
                | Kind::PassStmt
                | Kind::AssertStmt
                | Kind::DelStmt
                | Kind::ReturnStmt
                | Kind::YieldStmt
                | Kind::RaiseStmt
                | Kind::BreakStmt
                | Kind::ContinueStmt
                | Kind::FuncDef
                | Kind::ClassDef
                | Kind::ImportName
                | Kind::ImportFrom
                | Kind::ForStmt
                | Kind::WhileStmt
                | Kind::GlobalStmt
                | Kind::NonlocalStmt
                | Kind::ExpressionStmt
                | Kind::AssignmentStmt
                | Kind::CompoundAssignment
                | Kind::AnnotatedAssignment
                | Kind::TryStmt
                | Kind::WithStmt
        )
    }

    /// Kinds that denote a value.
    pub fn is_expression(self) -> bool {
        self.is_binary()
            || self.is_unary()
            || matches!(
                self,
                Kind::Name
                    | Kind::QualifiedExpr
                    | Kind::CallExpr
                    | Kind::NumericLiteral
                    | Kind::StringLiteral
                    | Kind::None
                    | Kind::Ellipsis
                    | Kind::ListLiteral
                    | Kind::Tuple
                    | Kind::SetLiteral
                    | Kind::DictionaryLiteral
                    | Kind::ParenthesizedExpr
                    | Kind::ListComprehension
                    | Kind::SetComprehension
                    | Kind::GeneratorExpr
                    | Kind::DictComprehension
                    | Kind::ConditionalExpr
                    | Kind::Lambda
                    | Kind::StarredExpr
                    | Kind::UnpackingExpr
                    | Kind::AwaitExpr
                    | Kind::SliceExpr
                    | Kind::SubscriptionExpr
                    | Kind::YieldExpr
                    | Kind::AssignmentExpression
            )
    }

    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Kind::Plus
                | Kind::Minus
                | Kind::Multiplication
                | Kind::Division
                | Kind::FloorDivision
                | Kind::Modulo
                | Kind::MatrixMultiplication
                | Kind::ShiftExpr
                | Kind::BitwiseAnd
                | Kind::BitwiseOr
                | Kind::BitwiseXor
                | Kind::And
                | Kind::Or
                | Kind::Comparison
                | Kind::Power
                | Kind::In
                | Kind::Is
        )
    }

    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Kind::UnaryPlus | Kind::UnaryMinus | Kind::BitwiseComplement | Kind::Not
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Invoke `$callback!` with the full `method_name: PayloadType` list.
///
/// Used to generate the [`Node`] enum here and the per-payload visitor
/// methods in `visitor`.
macro_rules! with_payloads {
    ($callback:ident) => {
        $callback! {
            file_input: FileInput,
            statement_list: StatementList,
            if_stmt: IfStmt,
            else_clause: ElseClause,
            pass_stmt: PassStmt,
            assert_stmt: AssertStmt,
            del_stmt: DelStmt,
            return_stmt: ReturnStmt,
            yield_stmt: YieldStmt,
            raise_stmt: RaiseStmt,
            break_stmt: BreakStmt,
            continue_stmt: ContinueStmt,
            func_def: FuncDef,
            class_def: ClassDef,
            import_name: ImportName,
            import_from: ImportFrom,
            aliased_name: AliasedName,
            dotted_name: DottedName,
            for_stmt: ForStmt,
            while_stmt: WhileStmt,
            global_stmt: GlobalStmt,
            nonlocal_stmt: NonlocalStmt,
            expression_stmt: ExpressionStmt,
            assignment_stmt: AssignmentStmt,
            compound_assignment: CompoundAssignment,
            annotated_assignment: AnnotatedAssignment,
            try_stmt: TryStmt,
            except_clause: ExceptClause,
            finally_clause: FinallyClause,
            with_stmt: WithStmt,
            with_item: WithItem,
            decorator: Decorator,
            arg_list: ArgList,
            regular_argument: RegularArgument,
            parameter_list: ParameterList,
            parameter: Parameter,
            type_annotation: TypeAnnotation,
            name: Name,
            qualified_expr: QualifiedExpr,
            call_expr: CallExpr,
            numeric_literal: NumericLiteral,
            string_literal: StringLiteral,
            string_element: StringElement,
            none_expr: NoneExpr,
            ellipsis_expr: EllipsisExpr,
            list_literal: ListLiteral,
            tuple: Tuple,
            set_literal: SetLiteral,
            dictionary_literal: DictionaryLiteral,
            key_value_pair: KeyValuePair,
            parenthesized_expr: ParenthesizedExpr,
            expression_list: ExpressionList,
            comprehension_expr: ComprehensionExpr,
            dict_comprehension: DictComprehension,
            comp_for: CompFor,
            comp_if: CompIf,
            conditional_expr: ConditionalExpr,
            lambda: Lambda,
            starred_expr: StarredExpr,
            unpacking_expr: UnpackingExpr,
            await_expr: AwaitExpr,
            slice_expr: SliceExpr,
            slice_list: SliceList,
            slice_item: SliceItem,
            subscription_expr: SubscriptionExpr,
            yield_expr: YieldExpr,
            assignment_expression: AssignmentExpression,
            binary_expr: BinaryExpr,
            unary_expr: UnaryExpr,
        }
    };
}

pub(crate) use with_payloads;

macro_rules! node_enum {
    ($($base_name:ident : $payload:ident),* $(,)?) => {
        /// The typed payload of a node.
        #[allow(clippy::large_enum_variant)]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum Node {
            $( $payload($payload), )*
        }

        paste::paste! {
            impl Node {
                $(
                    #[doc = concat!("The [`", stringify!($payload), "`] payload, if this is one.")]
                    pub fn [<as_ $base_name>](&self) -> Option<&$payload> {
                        match self {
                            Node::$payload(inner) => Some(inner),
                            _ => None,
                        }
                    }
                )*
            }
        }

        $(
            impl From<$payload> for Node {
                fn from(payload: $payload) -> Self {
                    Node::$payload(payload)
                }
            }
        )*
    };
}

with_payloads!(node_enum);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_kind_set_is_closed() {
        assert_eq!(Kind::ALL.len(), 92);
        let unique: HashSet<_> = Kind::ALL.iter().collect();
        assert_eq!(unique.len(), Kind::ALL.len());
    }

    #[test]
    fn test_kind_categories() {
        assert!(Kind::FuncDef.is_statement());
        assert!(!Kind::FuncDef.is_expression());
        assert!(Kind::In.is_expression() && Kind::In.is_binary());
        assert!(Kind::Not.is_unary());
        assert!(!Kind::StatementList.is_statement());
        assert!(!Kind::SliceItem.is_expression());
        let binary = Kind::ALL.iter().filter(|k| k.is_binary()).count();
        let unary = Kind::ALL.iter().filter(|k| k.is_unary()).count();
        assert_eq!((binary, unary), (17, 4));
    }

    #[test]
    fn test_payload_accessors() {
        let node = Node::from(PassStmt {
            keyword: TokenId::new(0),
        });
        assert!(node.as_pass_stmt().is_some());
        assert!(node.as_break_stmt().is_none());
    }
}
