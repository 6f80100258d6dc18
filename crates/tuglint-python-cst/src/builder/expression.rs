// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expression, display, comprehension, argument and subscript mapping rules.

use super::{BuildResult, Builder, Parts};
use crate::nodes::*;
use crate::parser::{BuildError, RawId, Rule};
use crate::tokenizer::{Keyword, Punct, TokType, Token};

const UNPARENTHESIZED_GENERATOR: &str = "Generator expression must be parenthesized if not sole argument.";

/// One element of a raw `{...}` display.
#[derive(Debug, Clone, Copy)]
enum MakerElement {
    /// `key : value`
    Pair(RawId, RawId, RawId),
    /// `** mapping`
    Unpacking(RawId, RawId),
    /// A set element, possibly starred.
    Single(RawId),
}

impl Builder<'_> {
    pub(super) fn expression(&mut self, id: RawId) -> BuildResult<NodeId> {
        let Some(rule) = self.raw.rule(id) else {
            return self.literal(id);
        };
        match rule {
            Rule::Atom => self.atom(id),
            Rule::Name => self.name(id, true),
            Rule::AtomExpr => self.atom_expr(id),
            Rule::Power
            | Rule::Term
            | Rule::ArithExpr
            | Rule::ShiftExpr
            | Rule::AndExpr
            | Rule::XorExpr
            | Rule::Expr
            | Rule::Comparison
            | Rule::AndTest
            | Rule::OrTest => self.binary(id),
            Rule::Factor | Rule::NotTest => self.unary(id),
            Rule::Test => self.conditional(id),
            Rule::Lambdef => self.lambda(id),
            Rule::NamedExprTest => self.assignment_expression(id),
            Rule::StarExpr => {
                let star = self.token(self.child(id, 0)?)?;
                let expression = self.expression(self.child(id, 1)?)?;
                let parts = Parts::new().token(star).node(expression);
                self.push(Kind::StarredExpr, StarredExpr { star, expression }, parts)
            }
            Rule::YieldExpr => self.yield_expr(id),
            Rule::TestlistStarExpr | Rule::Testlist | Rule::ExprList => self.bare_tuple(id),
            _ => Err(self.unexpected(id, "expected an expression")),
        }
    }

    /// The elements of a comma separated list, or the expression itself.
    pub(super) fn items(&mut self, id: RawId) -> BuildResult<Vec<NodeId>> {
        let raw = self.raw;
        if !raw.is(id, [Rule::TestlistStarExpr, Rule::Testlist, Rule::ExprList]) {
            return Ok(vec![self.expression(id)?]);
        }
        let mut items = Vec::new();
        for &child in raw.children(id) {
            if !raw.is(child, Punct::Comma) {
                items.push(self.expression(child)?);
            }
        }
        Ok(items)
    }

    pub(super) fn expression_list(&mut self, id: RawId) -> BuildResult<NodeId> {
        let expressions = self.items(id)?;
        let parts = Parts::new()
            .nodes(expressions.iter().copied())
            .tokens(self.bounds(id));
        self.push(Kind::ExpressionList, ExpressionList { expressions }, parts)
    }

    /// `a, b` without parentheses.
    fn bare_tuple(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let mut elements = Vec::new();
        let mut commas = Vec::new();
        for &child in raw.children(id) {
            if raw.is(child, Punct::Comma) {
                commas.push(self.token(child)?);
            } else {
                elements.push(self.expression(child)?);
            }
        }
        let parts = Parts::new()
            .nodes(elements.iter().copied())
            .tokens(commas.iter().copied());
        self.push(
            Kind::Tuple,
            Tuple {
                left_paren: None,
                elements,
                commas,
                right_paren: None,
            },
            parts,
        )
    }

    pub(super) fn name(&mut self, id: RawId, is_variable: bool) -> BuildResult<NodeId> {
        let token = self.token(self.child(id, 0)?)?;
        let name = self.tree.token(token).value.clone();
        self.push(
            Kind::Name,
            Name {
                token,
                name,
                is_variable,
            },
            Parts::new().token(token),
        )
    }

    fn literal(&mut self, id: RawId) -> BuildResult<NodeId> {
        let token = self.token(id)?;
        let parts = Parts::new().token(token);
        let kind = self.tree.token(token).kind;
        match kind {
            TokType::Number => self.push(Kind::NumericLiteral, NumericLiteral { token }, parts),
            TokType::Keyword(Keyword::None) => self.push(Kind::None, NoneExpr { token }, parts),
            TokType::Punct(Punct::Ellipsis) => self.push(Kind::Ellipsis, EllipsisExpr { token }, parts),
            _ => Err(self.unexpected(id, "expected a literal")),
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    /// `operand (operator operand)*`, folded to the left.
    fn binary(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let Some((&first, rest)) = raw.children(id).split_first() else {
            return Err(self.unexpected(id, "empty operator chain"));
        };
        let mut left = self.expression(first)?;
        for pair in rest.chunks(2) {
            let &[raw_operator, raw_operand] = pair else {
                return Err(self.unexpected(id, "operator without operand"));
            };
            let operator = if raw.is(raw_operator, Rule::CompOperator) {
                raw.children(raw_operator)
                    .iter()
                    .map(|&t| self.token(t))
                    .collect::<BuildResult<Vec<_>>>()?
            } else {
                vec![self.token(raw_operator)?]
            };
            let kind = match operator.first() {
                Some(&token) => binary_kind(self.tree.token(token)),
                None => None,
            };
            let Some(kind) = kind else {
                return Err(self.unexpected(raw_operator, "unknown binary operator"));
            };
            let right = self.expression(raw_operand)?;
            let parts = Parts::new()
                .node(left)
                .tokens(operator.iter().copied())
                .node(right);
            left = self.push(
                kind,
                BinaryExpr {
                    left_operand: left,
                    operator,
                    right_operand: right,
                },
                parts,
            )?;
        }
        Ok(left)
    }

    fn unary(&mut self, id: RawId) -> BuildResult<NodeId> {
        let operator = self.token(self.child(id, 0)?)?;
        let operator_kind = self.tree.token(operator).kind;
        let kind = match operator_kind {
            TokType::Punct(Punct::Plus) => Kind::UnaryPlus,
            TokType::Punct(Punct::Minus) => Kind::UnaryMinus,
            TokType::Punct(Punct::Tilde) => Kind::BitwiseComplement,
            TokType::Keyword(Keyword::Not) => Kind::Not,
            _ => return Err(self.unexpected(id, "unknown unary operator")),
        };
        let expression = self.expression(self.child(id, 1)?)?;
        let parts = Parts::new().token(operator).node(expression);
        self.push(kind, UnaryExpr { operator, expression }, parts)
    }

    /// `body if condition else orelse`
    fn conditional(&mut self, id: RawId) -> BuildResult<NodeId> {
        let true_expression = self.expression(self.child(id, 0)?)?;
        let if_keyword = self.token(self.child(id, 1)?)?;
        let condition = self.expression(self.child(id, 2)?)?;
        let else_keyword = self.token(self.child(id, 3)?)?;
        let false_expression = self.expression(self.child(id, 4)?)?;
        let parts = Parts::new()
            .node(true_expression)
            .node(condition)
            .node(false_expression);
        self.push(
            Kind::ConditionalExpr,
            ConditionalExpr {
                true_expression,
                if_keyword,
                condition,
                else_keyword,
                false_expression,
            },
            parts,
        )
    }

    fn lambda(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let lambda_keyword = self.token(self.child(id, 0)?)?;
        let (parameters, colon_at) = match children.get(1) {
            Some(&params) if raw.is(params, Rule::VarArgsList) => (Some(self.parameter_list(params)?), 2),
            _ => (None, 1),
        };
        let colon = self.token(self.child(id, colon_at)?)?;
        let body = self.expression(self.child(id, colon_at + 1)?)?;
        let parts = Parts::new()
            .token(lambda_keyword)
            .node(parameters)
            .node(body);
        self.push(
            Kind::Lambda,
            Lambda {
                lambda_keyword,
                parameters,
                colon,
                body,
            },
            parts,
        )
    }

    /// `name := value`
    fn assignment_expression(&mut self, id: RawId) -> BuildResult<NodeId> {
        let name = self.name(self.child(id, 0)?, true)?;
        let operator = self.token(self.child(id, 1)?)?;
        let expression = self.expression(self.child(id, 2)?)?;
        let parts = Parts::new().node(name).node(expression);
        self.push(
            Kind::AssignmentExpression,
            AssignmentExpression {
                name,
                operator,
                expression,
            },
            parts,
        )
    }

    fn yield_expr(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let yield_keyword = self.token(self.child(id, 0)?)?;
        let (from_keyword, expressions) = match raw.children(id).get(1..) {
            Some(&[from, value]) if raw.is(from, Keyword::From) => {
                (Some(self.token(from)?), vec![self.expression(value)?])
            }
            Some(&[value]) => (None, self.items(value)?),
            Some(&[]) | None => (None, Vec::new()),
            Some(_) => return Err(self.unexpected(id, "malformed yield")),
        };
        let parts = Parts::new()
            .nodes(expressions.iter().copied())
            .tokens(self.bounds(id));
        self.push(
            Kind::YieldExpr,
            YieldExpr {
                yield_keyword,
                from_keyword,
                expressions,
            },
            parts,
        )
    }

    // ========================================================================
    // Atoms and displays
    // ========================================================================

    fn atom(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let first = self.child(id, 0)?;
        if raw.is(first, Rule::Name) {
            return self.name(first, true);
        }
        if raw.is(first, TokType::String) {
            return self.string_literal(children);
        }
        let Some(&last) = children.last() else {
            return Err(self.unexpected(id, "empty atom"));
        };
        let open = self.token(first)?;
        let close = self.token(last)?;
        let inner = match children.len() {
            3 => Some(children[1]),
            _ => None,
        };
        if raw.is(first, Punct::LeftParen) {
            self.parenthesized(open, inner, close)
        } else if raw.is(first, Punct::LeftBracket) {
            self.list_display(open, inner, close)
        } else if raw.is(first, Punct::LeftBrace) {
            self.brace_display(open, inner, close)
        } else {
            Err(self.unexpected(id, "unknown atom"))
        }
    }

    fn string_literal(&mut self, raw_tokens: &[RawId]) -> BuildResult<NodeId> {
        let mut elements = Vec::with_capacity(raw_tokens.len());
        for &raw_token in raw_tokens {
            let token = self.token(raw_token)?;
            let element = StringElement::parse(token, &self.tree.token(token).value);
            elements.push(self.push(Kind::StringElement, element, Parts::new().token(token))?);
        }
        let parts = Parts::new().nodes(elements.iter().copied());
        self.push(Kind::StringLiteral, StringLiteral { elements }, parts)
    }

    /// `( ... )`: an empty tuple, a parenthesized expression or yield, a
    /// tuple when there is a comma, or a generator.
    fn parenthesized(&mut self, open: TokenId, inner: Option<RawId>, close: TokenId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let Some(inner) = inner else {
            let parts = Parts::new().token(open).token(close);
            return self.push(
                Kind::Tuple,
                Tuple {
                    left_paren: Some(open),
                    elements: Vec::new(),
                    commas: Vec::new(),
                    right_paren: Some(close),
                },
                parts,
            );
        };
        if raw.is(inner, Rule::TestlistComp) {
            match *raw.children(inner) {
                [first, comp] if raw.is(comp, Rule::CompFor) => {
                    return self.comprehension(Kind::GeneratorExpr, Some(open), first, comp, Some(close));
                }
                [_] => {}
                _ => {
                    let (elements, commas) = self.comma_separated(inner)?;
                    let parts = Parts::new()
                        .token(open)
                        .nodes(elements.iter().copied())
                        .token(close);
                    return self.push(
                        Kind::Tuple,
                        Tuple {
                            left_paren: Some(open),
                            elements,
                            commas,
                            right_paren: Some(close),
                        },
                        parts,
                    );
                }
            }
        }
        let expression = match *raw.children(inner) {
            [only] if raw.is(inner, Rule::TestlistComp) => self.expression(only)?,
            _ => self.expression(inner)?,
        };
        let parts = Parts::new().token(open).node(expression).token(close);
        self.push(
            Kind::ParenthesizedExpr,
            ParenthesizedExpr {
                left_paren: open,
                expression,
                right_paren: close,
            },
            parts,
        )
    }

    fn list_display(&mut self, open: TokenId, inner: Option<RawId>, close: TokenId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let elements = match inner {
            None => Vec::new(),
            Some(inner) => match *raw.children(inner) {
                [first, comp] if raw.is(comp, Rule::CompFor) => {
                    return self.comprehension(Kind::ListComprehension, Some(open), first, comp, Some(close));
                }
                _ => self.comma_separated(inner)?.0,
            },
        };
        let parts = Parts::new()
            .token(open)
            .nodes(elements.iter().copied())
            .token(close);
        self.push(
            Kind::ListLiteral,
            ListLiteral {
                left_bracket: open,
                elements,
                right_bracket: close,
            },
            parts,
        )
    }

    /// Elements and commas of a `testlist_comp`.
    fn comma_separated(&mut self, id: RawId) -> BuildResult<(Vec<NodeId>, Vec<TokenId>)> {
        let raw = self.raw;
        let mut elements = Vec::new();
        let mut commas = Vec::new();
        for &child in raw.children(id) {
            if raw.is(child, Punct::Comma) {
                commas.push(self.token(child)?);
            } else {
                elements.push(self.expression(child)?);
            }
        }
        Ok((elements, commas))
    }

    /// `{ ... }`: dictionary or set display, or their comprehensions.
    fn brace_display(&mut self, open: TokenId, inner: Option<RawId>, close: TokenId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let Some(maker) = inner else {
            let parts = Parts::new().token(open).token(close);
            return self.push(
                Kind::DictionaryLiteral,
                DictionaryLiteral {
                    left_brace: open,
                    elements: Vec::new(),
                    right_brace: close,
                },
                parts,
            );
        };

        let children = raw.children(maker);
        let mut raw_elements = Vec::new();
        let mut comprehension = None;
        let mut at = 0;
        while let Some(&child) = children.get(at) {
            if raw.is(child, Punct::Comma) {
                at += 1;
            } else if raw.is(child, Rule::CompFor) {
                comprehension = Some(child);
                at += 1;
            } else if raw.is(child, Punct::DoubleStar) {
                raw_elements.push(MakerElement::Unpacking(child, self.child(maker, at + 1)?));
                at += 2;
            } else if children.get(at + 1).is_some_and(|&c| raw.is(c, Punct::Colon)) {
                raw_elements.push(MakerElement::Pair(child, children[at + 1], self.child(maker, at + 2)?));
                at += 3;
            } else {
                raw_elements.push(MakerElement::Single(child));
                at += 1;
            }
        }

        if let Some(comp) = comprehension {
            return match raw_elements.as_slice() {
                [MakerElement::Pair(key, colon, value)] => {
                    let key = self.expression(*key)?;
                    let colon = self.token(*colon)?;
                    let value = self.expression(*value)?;
                    let comprehension = self.comp_for(comp)?;
                    let parts = Parts::new()
                        .token(open)
                        .node(key)
                        .node(value)
                        .node(comprehension)
                        .token(close);
                    self.push(
                        Kind::DictComprehension,
                        DictComprehension {
                            left_brace: open,
                            key,
                            colon,
                            value,
                            comprehension,
                            right_brace: close,
                        },
                        parts,
                    )
                }
                [MakerElement::Single(result)] => {
                    self.comprehension(Kind::SetComprehension, Some(open), *result, comp, Some(close))
                }
                _ => Err(BuildError::PostCondition {
                    line: self.raw.line(maker),
                    message: "dict unpacking cannot be used in dict comprehension".to_string(),
                }),
            };
        }

        let is_dict = raw_elements
            .iter()
            .any(|e| !matches!(e, MakerElement::Single(_)));
        let mut elements = Vec::with_capacity(raw_elements.len());
        for element in raw_elements {
            elements.push(match element {
                MakerElement::Pair(key, colon, value) => {
                    let key = self.expression(key)?;
                    let colon = self.token(colon)?;
                    let value = self.expression(value)?;
                    let parts = Parts::new().node(key).token(colon).node(value);
                    self.push(Kind::KeyValuePair, KeyValuePair { key, colon, value }, parts)?
                }
                MakerElement::Unpacking(star, expression) => self.unpacking(star, expression)?,
                MakerElement::Single(expression) => self.expression(expression)?,
            });
        }
        let parts = Parts::new()
            .token(open)
            .nodes(elements.iter().copied())
            .token(close);
        if is_dict {
            self.push(
                Kind::DictionaryLiteral,
                DictionaryLiteral {
                    left_brace: open,
                    elements,
                    right_brace: close,
                },
                parts,
            )
        } else {
            self.push(
                Kind::SetLiteral,
                SetLiteral {
                    left_brace: open,
                    elements,
                    right_brace: close,
                },
                parts,
            )
        }
    }

    fn unpacking(&mut self, star: RawId, expression: RawId) -> BuildResult<NodeId> {
        let star = self.token(star)?;
        let expression = self.expression(expression)?;
        let parts = Parts::new().token(star).node(expression);
        self.push(Kind::UnpackingExpr, UnpackingExpr { star, expression }, parts)
    }

    // ========================================================================
    // Comprehensions
    // ========================================================================

    fn comprehension(
        &mut self,
        kind: Kind,
        open: Option<TokenId>,
        result: RawId,
        comp: RawId,
        close: Option<TokenId>,
    ) -> BuildResult<NodeId> {
        let result_expression = self.expression(result)?;
        let comprehension = self.comp_for(comp)?;
        let parts = Parts::new()
            .token(open)
            .node(result_expression)
            .node(comprehension)
            .token(close);
        self.push(
            kind,
            ComprehensionExpr {
                open,
                result_expression,
                comprehension,
                close,
            },
            parts,
        )
    }

    /// `[async] for target in iterable [nested]`
    fn comp_for(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let for_at = raw
            .children(id)
            .iter()
            .position(|&c| raw.is(c, Keyword::For))
            .ok_or_else(|| self.unexpected(id, "missing for keyword"))?;
        let for_keyword = self.token(self.child(id, for_at)?)?;
        let async_keyword = self.async_before(for_keyword);
        let loop_expression = self.expression(self.child(id, for_at + 1)?)?;
        let in_keyword = self.token(self.child(id, for_at + 2)?)?;
        let iterable = self.expression(self.child(id, for_at + 3)?)?;
        let nested_clause = match raw.children(id).get(for_at + 4) {
            Some(&nested) => Some(self.comp_iter(nested)?),
            None => None,
        };
        let parts = Parts::new()
            .token(async_keyword)
            .token(for_keyword)
            .node(loop_expression)
            .node(iterable)
            .node(nested_clause);
        self.push(
            Kind::CompFor,
            CompFor {
                async_keyword,
                for_keyword,
                loop_expression,
                in_keyword,
                iterable,
                nested_clause,
            },
            parts,
        )
    }

    fn comp_iter(&mut self, id: RawId) -> BuildResult<NodeId> {
        if self.raw.is(id, Rule::CompFor) {
            return self.comp_for(id);
        }
        if !self.raw.is(id, Rule::CompIf) {
            return Err(self.unexpected(id, "expected a comprehension clause"));
        }
        let if_keyword = self.token(self.child(id, 0)?)?;
        let condition = self.expression(self.child(id, 1)?)?;
        let nested_clause = match self.raw.children(id).get(2) {
            Some(&nested) => Some(self.comp_iter(nested)?),
            None => None,
        };
        let parts = Parts::new()
            .token(if_keyword)
            .node(condition)
            .node(nested_clause);
        self.push(
            Kind::CompIf,
            CompIf {
                if_keyword,
                condition,
                nested_clause,
            },
            parts,
        )
    }

    // ========================================================================
    // Trailers, arguments and subscripts
    // ========================================================================

    /// `[await] atom trailer*`
    fn atom_expr(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let mut children = raw.children(id);
        let mut await_token = None;
        if let Some((&first, rest)) = children.split_first() {
            if raw.is(first, TokType::Name) {
                await_token = Some(self.token(first)?);
                children = rest;
            }
        }
        let Some((&atom, trailers)) = children.split_first() else {
            return Err(self.unexpected(id, "missing atom"));
        };
        let mut current = self.expression(atom)?;
        for &trailer in trailers {
            current = self.trailer(current, trailer)?;
        }
        match await_token {
            Some(await_token) => {
                let parts = Parts::new().token(await_token).node(current);
                self.push(
                    Kind::AwaitExpr,
                    AwaitExpr {
                        await_token,
                        expression: current,
                    },
                    parts,
                )
            }
            None => Ok(current),
        }
    }

    fn trailer(&mut self, object: NodeId, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let open = self.child(id, 0)?;
        if raw.is(open, Punct::Dot) {
            let dot = self.token(open)?;
            let name = self.name(self.child(id, 1)?, false)?;
            let parts = Parts::new().node(object).node(name);
            return self.push(
                Kind::QualifiedExpr,
                QualifiedExpr {
                    qualifier: object,
                    dot,
                    name,
                },
                parts,
            );
        }

        let Some(&raw_close) = children.last() else {
            return Err(self.unexpected(id, "empty trailer"));
        };
        let left = self.token(open)?;
        let right = self.token(raw_close)?;
        if raw.is(open, Punct::LeftParen) {
            let arguments = match children.get(1) {
                Some(&args) if raw.is(args, Rule::ArgList) => Some(self.arg_list(args)?),
                _ => None,
            };
            let parts = Parts::new().node(object).node(arguments).token(right);
            self.push(
                Kind::CallExpr,
                CallExpr {
                    callee: object,
                    left_paren: left,
                    arguments,
                    right_paren: right,
                },
                parts,
            )
        } else {
            self.subscript(object, left, self.child(id, 1)?, right)
        }
    }

    /// The arguments of a call, class or decorator.
    pub(super) fn arg_list(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let raw_arguments: Vec<RawId> = raw.children_matching(id, Rule::Argument).collect();
        if raw_arguments.len() > 1 {
            if let Some(&generator) = raw_arguments
                .iter()
                .find(|&&a| raw.has_child(a, Rule::CompFor))
            {
                return Err(BuildError::PostCondition {
                    line: raw.line(generator),
                    message: UNPARENTHESIZED_GENERATOR.to_string(),
                });
            }
        }
        let mut arguments = Vec::with_capacity(raw_arguments.len());
        for argument in raw_arguments {
            arguments.push(self.argument(argument)?);
        }
        let parts = Parts::new()
            .nodes(arguments.iter().copied())
            .tokens(self.bounds(id));
        self.push(Kind::ArgList, ArgList { arguments }, parts)
    }

    fn argument(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let (keyword, equal_token, expression) = match *raw.children(id) {
            [star, value] if raw.is(star, [Punct::Star, Punct::DoubleStar]) => {
                return self.unpacking(star, value);
            }
            [name, equal, value] if raw.is(equal, Punct::Equal) => {
                let keyword = self.name(name, false)?;
                (Some(keyword), Some(self.token(equal)?), self.expression(value)?)
            }
            [result, comp] if raw.is(comp, Rule::CompFor) => {
                let generator = self.comprehension(Kind::GeneratorExpr, None, result, comp, None)?;
                (None, None, generator)
            }
            [value] => (None, None, self.expression(value)?),
            _ => return Err(self.unexpected(id, "malformed argument")),
        };
        let parts = Parts::new()
            .node(keyword)
            .token(equal_token)
            .node(expression);
        self.push(
            Kind::RegularArgument,
            RegularArgument {
                keyword,
                equal_token,
                expression,
            },
            parts,
        )
    }

    /// `object[...]`: a slice when any element has a `:`, a subscription
    /// otherwise.
    fn subscript(&mut self, object: NodeId, left: TokenId, list: RawId, right: TokenId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let subscripts: Vec<RawId> = raw.children_matching(list, Rule::Subscript).collect();
        let is_slice = subscripts.iter().any(|&s| raw.has_child(s, Punct::Colon));

        if !is_slice {
            let mut expressions = Vec::with_capacity(subscripts.len());
            for subscript in subscripts {
                expressions.push(self.expression(self.child(subscript, 0)?)?);
            }
            let parts = Parts::new()
                .nodes(expressions.iter().copied())
                .tokens(self.bounds(list));
            let index = self.push(Kind::ExpressionList, ExpressionList { expressions }, parts)?;
            let parts = Parts::new().node(object).node(index).token(right);
            return self.push(
                Kind::SubscriptionExpr,
                SubscriptionExpr {
                    object,
                    left_bracket: left,
                    subscripts: index,
                    right_bracket: right,
                },
                parts,
            );
        }

        let mut slices = Vec::with_capacity(subscripts.len());
        for subscript in subscripts {
            slices.push(if raw.has_child(subscript, Punct::Colon) {
                self.slice_item(subscript)?
            } else {
                self.expression(self.child(subscript, 0)?)?
            });
        }
        let parts = Parts::new()
            .nodes(slices.iter().copied())
            .tokens(self.bounds(list));
        let slice_list = self.push(Kind::SliceList, SliceList { slices }, parts)?;
        let parts = Parts::new().node(object).node(slice_list).token(right);
        self.push(
            Kind::SliceExpr,
            SliceExpr {
                object,
                left_bracket: left,
                slice_list,
                right_bracket: right,
            },
            parts,
        )
    }

    /// `[lower] : [upper] [: [stride]]`
    fn slice_item(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let colon_at = children
            .iter()
            .position(|&c| raw.is(c, Punct::Colon))
            .ok_or_else(|| self.unexpected(id, "missing bound separator"))?;
        let lower_bound = match colon_at {
            0 => None,
            _ => Some(self.expression(children[0])?),
        };
        let bound_separator = self.token(children[colon_at])?;
        let mut upper_bound = None;
        let mut stride_separator = None;
        let mut stride = None;
        for &child in &children[colon_at + 1..] {
            if raw.is(child, Rule::SliceOp) {
                stride_separator = Some(self.token(self.child(child, 0)?)?);
                if let Some(&value) = raw.children(child).get(1) {
                    stride = Some(self.expression(value)?);
                }
            } else {
                upper_bound = Some(self.expression(child)?);
            }
        }
        let parts = Parts::new()
            .node(lower_bound)
            .token(bound_separator)
            .node(upper_bound)
            .token(stride_separator)
            .node(stride);
        self.push(
            Kind::SliceItem,
            SliceItem {
                lower_bound,
                bound_separator,
                upper_bound,
                stride_separator,
                stride,
            },
            parts,
        )
    }
}

/// The kind built for a binary operator, from its first token.
fn binary_kind(token: &Token) -> Option<Kind> {
    let kind = match token.kind {
        TokType::Punct(Punct::Plus) => Kind::Plus,
        TokType::Punct(Punct::Minus) => Kind::Minus,
        TokType::Punct(Punct::Star) => Kind::Multiplication,
        TokType::Punct(Punct::Slash) => Kind::Division,
        TokType::Punct(Punct::DoubleSlash) => Kind::FloorDivision,
        TokType::Punct(Punct::Percent) => Kind::Modulo,
        TokType::Punct(Punct::At) => Kind::MatrixMultiplication,
        TokType::Punct(Punct::LeftShift | Punct::RightShift) => Kind::ShiftExpr,
        TokType::Punct(Punct::Amper) => Kind::BitwiseAnd,
        TokType::Punct(Punct::Vbar) => Kind::BitwiseOr,
        TokType::Punct(Punct::Circumflex) => Kind::BitwiseXor,
        TokType::Punct(Punct::DoubleStar) => Kind::Power,
        TokType::Punct(
            Punct::Less
            | Punct::Greater
            | Punct::EqualEqual
            | Punct::GreaterEqual
            | Punct::LessEqual
            | Punct::NotEqual,
        ) => Kind::Comparison,
        TokType::Keyword(Keyword::And) => Kind::And,
        TokType::Keyword(Keyword::Or) => Kind::Or,
        // `in` and `not in`
        TokType::Keyword(Keyword::In | Keyword::Not) => Kind::In,
        // `is` and `is not`
        TokType::Keyword(Keyword::Is) => Kind::Is,
        _ => return None,
    };
    Some(kind)
}
