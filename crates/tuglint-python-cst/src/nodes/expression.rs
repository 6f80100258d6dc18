// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expression payloads.

use super::{NodeId, TokenId};

/// An identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub token: TokenId,
    pub name: String,
    /// True in expression position (a read or a binding target), false for
    /// definition names, attribute names, keyword argument names and
    /// imported names.
    pub is_variable: bool,
}

/// `qualifier.name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedExpr {
    pub qualifier: NodeId,
    pub dot: TokenId,
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub callee: NodeId,
    pub left_paren: TokenId,
    pub arguments: Option<NodeId>,
    pub right_paren: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericLiteral {
    pub token: TokenId,
}

/// Adjacent string tokens, implicitly concatenated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    pub elements: Vec<NodeId>,
}

/// One string token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringElement {
    pub token: TokenId,
    /// Prefix letters such as `r`, `b`, `f`, `Rb`.
    pub prefix: String,
    pub is_triple_quoted: bool,
    /// The text between the quotes.
    pub trimmed_value: String,
}

impl StringElement {
    /// Split a string token into its prefix, quoting and content.
    pub fn parse(token: TokenId, value: &str) -> Self {
        let quote_at = value.find(['\'', '"']).unwrap_or(value.len());
        let (prefix, quoted) = value.split_at(quote_at);
        let is_triple_quoted = quoted.len() >= 6 && (quoted.starts_with("'''") || quoted.starts_with("\"\"\""));
        let delimiter = if is_triple_quoted { 3 } else { 1 };
        let trimmed_value = quoted
            .get(delimiter..quoted.len().saturating_sub(delimiter))
            .unwrap_or("")
            .to_string();
        StringElement {
            token,
            prefix: prefix.to_string(),
            is_triple_quoted,
            trimmed_value,
        }
    }

    pub fn is_raw(&self) -> bool {
        self.prefix.contains(['r', 'R'])
    }

    pub fn is_bytes(&self) -> bool {
        self.prefix.contains(['b', 'B'])
    }

    pub fn is_formatted(&self) -> bool {
        self.prefix.contains(['f', 'F'])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoneExpr {
    pub token: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EllipsisExpr {
    pub token: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLiteral {
    pub left_bracket: TokenId,
    pub elements: Vec<NodeId>,
    pub right_bracket: TokenId,
}

/// A tuple display. Parentheses are absent for `a, b` forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    pub left_paren: Option<TokenId>,
    pub elements: Vec<NodeId>,
    pub commas: Vec<TokenId>,
    pub right_paren: Option<TokenId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetLiteral {
    pub left_brace: TokenId,
    pub elements: Vec<NodeId>,
    pub right_brace: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryLiteral {
    pub left_brace: TokenId,
    /// [`KeyValuePair`] or [`UnpackingExpr`] nodes.
    pub elements: Vec<NodeId>,
    pub right_brace: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    pub key: NodeId,
    pub colon: TokenId,
    pub value: NodeId,
}

/// `( expression )` without a comma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenthesizedExpr {
    pub left_paren: TokenId,
    pub expression: NodeId,
    pub right_paren: TokenId,
}

/// A comma separated list that is not a value by itself: assignment
/// targets and subscription indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionList {
    pub expressions: Vec<NodeId>,
}

/// A list, set or generator comprehension.
///
/// A generator that is the sole argument of a call has no parentheses of
/// its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComprehensionExpr {
    pub open: Option<TokenId>,
    pub result_expression: NodeId,
    pub comprehension: NodeId,
    pub close: Option<TokenId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictComprehension {
    pub left_brace: TokenId,
    pub key: NodeId,
    pub colon: TokenId,
    pub value: NodeId,
    pub comprehension: NodeId,
    pub right_brace: TokenId,
}

/// `for target in iterable` inside a comprehension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompFor {
    pub async_keyword: Option<TokenId>,
    pub for_keyword: TokenId,
    pub loop_expression: NodeId,
    pub in_keyword: TokenId,
    pub iterable: NodeId,
    pub nested_clause: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompIf {
    pub if_keyword: TokenId,
    pub condition: NodeId,
    pub nested_clause: Option<NodeId>,
}

/// `a if cond else b`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalExpr {
    pub true_expression: NodeId,
    pub if_keyword: TokenId,
    pub condition: NodeId,
    pub else_keyword: TokenId,
    pub false_expression: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lambda {
    pub lambda_keyword: TokenId,
    pub parameters: Option<NodeId>,
    pub colon: TokenId,
    pub body: NodeId,
}

/// `*expr` in a display or an assignment target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarredExpr {
    pub star: TokenId,
    pub expression: NodeId,
}

/// `*expr` or `**expr` in an argument list, `**expr` in a dict display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackingExpr {
    pub star: TokenId,
    pub expression: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwaitExpr {
    pub await_token: TokenId,
    pub expression: NodeId,
}

/// `object[slices]` where at least one element is a proper slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceExpr {
    pub object: NodeId,
    pub left_bracket: TokenId,
    pub slice_list: NodeId,
    pub right_bracket: TokenId,
}

/// The elements of a [`SliceExpr`]: [`SliceItem`]s and plain expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceList {
    pub slices: Vec<NodeId>,
}

/// `lower:upper:stride`, each part optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceItem {
    pub lower_bound: Option<NodeId>,
    pub bound_separator: TokenId,
    pub upper_bound: Option<NodeId>,
    pub stride_separator: Option<TokenId>,
    pub stride: Option<NodeId>,
}

/// `object[subscripts]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionExpr {
    pub object: NodeId,
    pub left_bracket: TokenId,
    pub subscripts: NodeId,
    pub right_bracket: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YieldExpr {
    pub yield_keyword: TokenId,
    pub from_keyword: Option<TokenId>,
    pub expressions: Vec<NodeId>,
}

/// `name := value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentExpression {
    pub name: NodeId,
    pub operator: TokenId,
    pub expression: NodeId,
}

/// Shared payload of every binary operator kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub left_operand: NodeId,
    /// One token, or two for `not in` and `is not`.
    pub operator: Vec<TokenId>,
    pub right_operand: NodeId,
}

impl BinaryExpr {
    /// True for `not in` and `is not`.
    pub fn is_negated(&self) -> bool {
        self.operator.len() == 2
    }
}

/// Shared payload of every unary operator kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub operator: TokenId,
    pub expression: NodeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_element_parts() {
        let plain = StringElement::parse(TokenId::new(0), "'abc'");
        assert_eq!(plain.prefix, "");
        assert!(!plain.is_triple_quoted);
        assert_eq!(plain.trimmed_value, "abc");

        let raw = StringElement::parse(TokenId::new(0), r#"Rb"\d""#);
        assert_eq!(raw.prefix, "Rb");
        assert!(raw.is_raw() && raw.is_bytes() && !raw.is_formatted());
        assert_eq!(raw.trimmed_value, r"\d");

        let doc = StringElement::parse(TokenId::new(0), "f\"\"\"doc\"\"\"");
        assert!(doc.is_triple_quoted);
        assert!(doc.is_formatted());
        assert_eq!(doc.trimmed_value, "doc");

        let empty = StringElement::parse(TokenId::new(0), "''");
        assert!(!empty.is_triple_quoted);
        assert_eq!(empty.trimmed_value, "");
    }
}
