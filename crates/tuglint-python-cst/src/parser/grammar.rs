// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The Python grammar.
//!
//! A PEG over the token stream, written with `peg`. Every rule returns a
//! [`ParsedNode`]; rules that only forward a single child (no operator, no
//! trailing comma) return that child unchanged instead of wrapping it.
//!
//! The grammar avoids re-parsing shared prefixes: alternatives that start
//! with the same sub-expression are factored into a common head followed
//! by an optional tail, so nested expressions parse in linear time.

use super::raw::{ParsedNode, Rule};
use crate::nodes::TokenId;
use crate::tokenizer::{Keyword, Punct, TokType, Token};
use crate::version::PythonVersion;

/// Names the grammar recognizes by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Soft {
    Plain,
    Async,
    Await,
}

/// The grammar's view of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tok {
    kind: TokType,
    index: usize,
    soft: Soft,
}

impl Tok {
    pub(crate) fn new(index: usize, token: &Token) -> Self {
        let soft = match (token.kind, token.value.as_str()) {
            (TokType::Name, "async") => Soft::Async,
            (TokType::Name, "await") => Soft::Await,
            _ => Soft::Plain,
        };
        Tok {
            kind: token.kind,
            index,
            soft,
        }
    }
}

fn leaf(tok: Tok) -> ParsedNode {
    ParsedNode::Leaf(TokenId::new(tok.index))
}

/// Anything that can be appended to a child list.
trait PushChildren {
    fn push_into(self, out: &mut Vec<ParsedNode>);
}

impl PushChildren for ParsedNode {
    fn push_into(self, out: &mut Vec<ParsedNode>) {
        out.push(self);
    }
}

impl<T: PushChildren> PushChildren for Option<T> {
    fn push_into(self, out: &mut Vec<ParsedNode>) {
        if let Some(inner) = self {
            inner.push_into(out);
        }
    }
}

impl<T: PushChildren> PushChildren for Vec<T> {
    fn push_into(self, out: &mut Vec<ParsedNode>) {
        for inner in self {
            inner.push_into(out);
        }
    }
}

impl<A: PushChildren, B: PushChildren> PushChildren for (A, B) {
    fn push_into(self, out: &mut Vec<ParsedNode>) {
        self.0.push_into(out);
        self.1.push_into(out);
    }
}

impl<A: PushChildren, B: PushChildren, C: PushChildren> PushChildren for (A, B, C) {
    fn push_into(self, out: &mut Vec<ParsedNode>) {
        self.0.push_into(out);
        self.1.push_into(out);
        self.2.push_into(out);
    }
}

/// Build a rule node from a sequence of parts (nodes, options, vectors,
/// tuples), flattening them in order.
macro_rules! node {
    ($rule:expr; $($part:expr),* $(,)?) => {{
        let mut children: Vec<ParsedNode> = Vec::new();
        $( PushChildren::push_into($part, &mut children); )*
        ParsedNode::Rule($rule, children)
    }};
}

fn children<T: PushChildren>(parts: T) -> Vec<ParsedNode> {
    let mut out = Vec::new();
    parts.push_into(&mut out);
    out
}

/// Left-associative operator chain: `first (op operand)*`.
fn fold(rule: Rule, first: ParsedNode, rest: Vec<(ParsedNode, ParsedNode)>) -> ParsedNode {
    if rest.is_empty() {
        first
    } else {
        node!(rule; first, rest)
    }
}

/// A comma-separated list that collapses to its only element when there is
/// no comma at all.
fn list(
    rule: Rule,
    first: ParsedNode,
    rest: Vec<(ParsedNode, ParsedNode)>,
    trailing: Option<ParsedNode>,
) -> ParsedNode {
    if rest.is_empty() && trailing.is_none() {
        first
    } else {
        node!(rule; first, rest, trailing)
    }
}

/// One element of a `{...}` display.
pub(crate) struct MakerItem {
    children: Vec<ParsedNode>,
    is_dict: bool,
}

pub(crate) enum MakerRest {
    Comprehension(ParsedNode),
    Items(Vec<(ParsedNode, MakerItem)>, Option<ParsedNode>),
}

fn dict_or_set_maker(first: MakerItem, rest: MakerRest) -> Result<ParsedNode, &'static str> {
    let is_dict = first.is_dict;
    match rest {
        MakerRest::Comprehension(comp) => Ok(node!(Rule::DictOrSetMaker; first.children, comp)),
        MakerRest::Items(items, trailing) => {
            if items.iter().any(|(_, item)| item.is_dict != is_dict) {
                return Err(if is_dict { "':'" } else { "set element" });
            }
            let items: Vec<(ParsedNode, Vec<ParsedNode>)> = items
                .into_iter()
                .map(|(comma, item)| (comma, item.children))
                .collect();
            Ok(node!(Rule::DictOrSetMaker; first.children, items, trailing))
        }
    }
}

peg::parser! {
    pub(crate) grammar python(version: PythonVersion) for [Tok] {
        // ====================================================================
        // Terminals
        // ====================================================================

        rule kw(k: Keyword) -> ParsedNode
            = [t] {? if t.kind == TokType::Keyword(k) { Ok(leaf(t)) } else { Err(k.as_str()) } }

        rule p(k: Punct) -> ParsedNode
            = [t] {? if t.kind == TokType::Punct(k) { Ok(leaf(t)) } else { Err(k.as_str()) } }

        rule kind(k: TokType) -> ParsedNode
            = [t] {? if t.kind == k { Ok(leaf(t)) } else { Err(k.describe()) } }

        rule async_kw() -> ParsedNode
            = [t] {? if t.soft == Soft::Async { Ok(leaf(t)) } else { Err("async") } }

        rule await_kw() -> ParsedNode
            = [t] {? if t.soft == Soft::Await { Ok(leaf(t)) } else { Err("await") } }

        rule augassign() -> ParsedNode
            = [t] {?
                match t.kind {
                    TokType::Punct(op) if op.is_augmented_assign() => Ok(leaf(t)),
                    _ => Err("augmented assignment"),
                }
            }

        rule walrus() -> ParsedNode
            = op:p(Punct::ColonEqual) {?
                if version.has_walrus() { Ok(op) } else { Err("assignment expressions need Python 3.8") }
            }

        rule newline() -> ParsedNode = kind(TokType::Newline)

        rule comma() -> ParsedNode = p(Punct::Comma)

        rule name() -> ParsedNode = n:kind(TokType::Name) { node!(Rule::Name; n) }

        // ====================================================================
        // Statements
        // ====================================================================

        pub rule file_input() -> ParsedNode
            = stmts:statement()* end:kind(TokType::EndMarker) { node!(Rule::FileInput; stmts, end) }

        rule statement() -> ParsedNode = compound_stmt() / stmt_list()

        rule stmt_list() -> ParsedNode
            = first:simple_stmt() rest:(s:p(Punct::Semicolon) st:simple_stmt() { (s, st) })*
              semi:p(Punct::Semicolon)? nl:newline()
            { node!(Rule::StmtList; first, rest, semi, nl) }

        rule simple_stmt() -> ParsedNode
            = pass_stmt() / break_stmt() / continue_stmt() / del_stmt() / return_stmt()
            / raise_stmt() / global_stmt() / nonlocal_stmt() / assert_stmt() / import_stmt()
            / yield_stmt() / expression_stmt()

        rule pass_stmt() -> ParsedNode = k:kw(Keyword::Pass) { node!(Rule::PassStmt; k) }

        rule break_stmt() -> ParsedNode = k:kw(Keyword::Break) { node!(Rule::BreakStmt; k) }

        rule continue_stmt() -> ParsedNode
            = k:kw(Keyword::Continue) { node!(Rule::ContinueStmt; k) }

        rule del_stmt() -> ParsedNode = k:kw(Keyword::Del) e:exprlist() { node!(Rule::DelStmt; k, e) }

        rule return_stmt() -> ParsedNode
            = k:kw(Keyword::Return) e:testlist_star_expr()? { node!(Rule::ReturnStmt; k, e) }

        rule raise_stmt() -> ParsedNode
            = k:kw(Keyword::Raise)
              rest:(e:test() cause:(f:kw(Keyword::From) c:test() { (f, c) })? { (e, cause) })?
            { node!(Rule::RaiseStmt; k, rest) }

        rule global_stmt() -> ParsedNode
            = k:kw(Keyword::Global) first:name() rest:(c:comma() n:name() { (c, n) })*
            { node!(Rule::GlobalStmt; k, first, rest) }

        rule nonlocal_stmt() -> ParsedNode
            = k:kw(Keyword::Nonlocal) first:name() rest:(c:comma() n:name() { (c, n) })*
            { node!(Rule::NonlocalStmt; k, first, rest) }

        rule assert_stmt() -> ParsedNode
            = k:kw(Keyword::Assert) t:test() m:(c:comma() m:test() { (c, m) })?
            { node!(Rule::AssertStmt; k, t, m) }

        rule yield_stmt() -> ParsedNode = y:yield_expr() { node!(Rule::YieldStmt; y) }

        rule import_stmt() -> ParsedNode = import_name() / import_from()

        rule import_name() -> ParsedNode
            = k:kw(Keyword::Import) n:dotted_as_names() { node!(Rule::ImportName; k, n) }

        rule dotted_as_names() -> ParsedNode
            = first:dotted_as_name() rest:(c:comma() d:dotted_as_name() { (c, d) })*
            { node!(Rule::DottedAsNames; first, rest) }

        rule dotted_as_name() -> ParsedNode
            = d:dotted_name() alias:(k:kw(Keyword::As) n:name() { (k, n) })?
            { node!(Rule::DottedAsName; d, alias) }

        rule dotted_name() -> ParsedNode
            = first:name() rest:(d:p(Punct::Dot) n:name() { (d, n) })*
            { node!(Rule::DottedName; first, rest) }

        rule import_from() -> ParsedNode
            = k:kw(Keyword::From) source:import_source() i:kw(Keyword::Import) targets:import_targets()
            { node!(Rule::ImportFrom; k, source, i, targets) }

        rule import_dot() -> ParsedNode = p(Punct::Dot) / p(Punct::Ellipsis)

        rule import_source() -> Vec<ParsedNode>
            = dots:import_dot()* d:dotted_name() { children((dots, d)) }
            / import_dot()+

        rule import_targets() -> Vec<ParsedNode>
            = s:p(Punct::Star) { vec![s] }
            / l:p(Punct::LeftParen) n:import_as_names() r:p(Punct::RightParen) { vec![l, n, r] }
            / n:import_as_names() { vec![n] }

        rule import_as_names() -> ParsedNode
            = first:import_as_name() rest:(c:comma() n:import_as_name() { (c, n) })* trailing:comma()?
            { node!(Rule::ImportAsNames; first, rest, trailing) }

        rule import_as_name() -> ParsedNode
            = n:name() alias:(k:kw(Keyword::As) a:name() { (k, a) })?
            { node!(Rule::ImportAsName; n, alias) }

        rule expression_stmt() -> ParsedNode
            = lhs:testlist_star_expr() rest:expression_stmt_rest()
            { node!(Rule::ExpressionStmt; lhs, rest) }

        rule expression_stmt_rest() -> Vec<ParsedNode>
            = a:annassign() { vec![a] }
            / op:augassign() v:(yield_expr() / testlist()) { vec![op, v] }
            / assigns:(eq:p(Punct::Equal) v:(yield_expr() / testlist_star_expr()) { (eq, v) })*
            { children(assigns) }

        rule annassign() -> ParsedNode
            = c:p(Punct::Colon) t:test()
              v:(eq:p(Punct::Equal) v:(yield_expr() / testlist_star_expr()) { (eq, v) })?
            { node!(Rule::AnnAssign; c, t, v) }

        rule testlist_star_expr() -> ParsedNode
            = first:test_or_star() rest:(c:comma() e:test_or_star() { (c, e) })* trailing:comma()?
            { list(Rule::TestlistStarExpr, first, rest, trailing) }

        rule test_or_star() -> ParsedNode = test() / star_expr()

        // ====================================================================
        // Compound statements
        // ====================================================================

        rule compound_stmt() -> ParsedNode
            = if_stmt() / while_stmt() / for_stmt() / try_stmt() / with_stmt() / funcdef()
            / classdef()

        rule else_clause() -> Vec<ParsedNode>
            = e:kw(Keyword::Else) c:p(Punct::Colon) s:suite() { vec![e, c, s] }

        rule if_stmt() -> ParsedNode
            = k:kw(Keyword::If) cond:namedexpr_test() col:p(Punct::Colon) body:suite()
              elifs:(e:kw(Keyword::Elif) c:namedexpr_test() col:p(Punct::Colon) s:suite() { vec![e, c, col, s] })*
              orelse:else_clause()?
            { node!(Rule::IfStmt; k, cond, col, body, elifs, orelse) }

        rule while_stmt() -> ParsedNode
            = k:kw(Keyword::While) cond:namedexpr_test() col:p(Punct::Colon) body:suite()
              orelse:else_clause()?
            { node!(Rule::WhileStmt; k, cond, col, body, orelse) }

        rule for_stmt() -> ParsedNode
            = a:async_kw()? k:kw(Keyword::For) target:exprlist() i:kw(Keyword::In) iter:testlist()
              col:p(Punct::Colon) body:suite() orelse:else_clause()?
            { node!(Rule::ForStmt; a, k, target, i, iter, col, body, orelse) }

        rule try_stmt() -> ParsedNode
            = k:kw(Keyword::Try) col:p(Punct::Colon) body:suite() rest:try_rest()
            { node!(Rule::TryStmt; k, col, body, rest) }

        rule try_rest() -> Vec<ParsedNode>
            = handlers:(e:except_clause() c:p(Punct::Colon) s:suite() { vec![e, c, s] })+
              orelse:else_clause()? fin:finally_clause()?
            { children((handlers, orelse, fin)) }
            / finally_clause()

        rule finally_clause() -> Vec<ParsedNode>
            = f:kw(Keyword::Finally) c:p(Punct::Colon) s:suite() { vec![f, c, s] }

        rule except_clause() -> ParsedNode
            = k:kw(Keyword::Except)
              t:(t:test() alias:(a:kw(Keyword::As) n:name() { (a, n) })? { (t, alias) })?
            { node!(Rule::ExceptClause; k, t) }

        rule with_stmt() -> ParsedNode
            = a:async_kw()? k:kw(Keyword::With) first:with_item()
              rest:(c:comma() w:with_item() { (c, w) })* col:p(Punct::Colon) body:suite()
            { node!(Rule::WithStmt; a, k, first, rest, col, body) }

        rule with_item() -> ParsedNode
            = t:test() alias:(k:kw(Keyword::As) e:expr() { (k, e) })?
            { node!(Rule::WithItem; t, alias) }

        rule funcdef() -> ParsedNode
            = d:decorators()? a:async_kw()? k:kw(Keyword::Def) n:name()
              l:p(Punct::LeftParen) params:typedargslist()? r:p(Punct::RightParen)
              ret:(arrow:p(Punct::Arrow) t:test() { (arrow, t) })?
              col:p(Punct::Colon) body:suite()
            { node!(Rule::FuncDef; d, a, k, n, l, params, r, ret, col, body) }

        rule classdef() -> ParsedNode
            = d:decorators()? k:kw(Keyword::Class) n:name()
              args:(l:p(Punct::LeftParen) a:arglist()? r:p(Punct::RightParen) { (l, a, r) })?
              col:p(Punct::Colon) body:suite()
            { node!(Rule::ClassDef; d, k, n, args, col, body) }

        rule decorators() -> ParsedNode = ds:decorator()+ { node!(Rule::Decorators; ds) }

        rule decorator() -> ParsedNode
            = at:p(Punct::At) n:dotted_name()
              args:(l:p(Punct::LeftParen) a:arglist()? r:p(Punct::RightParen) { (l, a, r) })?
              nl:newline()
            { node!(Rule::Decorator; at, n, args, nl) }

        rule suite() -> ParsedNode
            = s:stmt_list() { node!(Rule::Suite; s) }
            / nl:newline() i:kind(TokType::Indent) stmts:statement()+ d:kind(TokType::Dedent)
            { node!(Rule::Suite; nl, i, stmts, d) }

        // ====================================================================
        // Parameters
        // ====================================================================

        rule typedargslist() -> ParsedNode
            = first:typed_param() rest:(c:comma() t:typed_param() { (c, t) })* trailing:comma()?
            { node!(Rule::TypedArgsList; first, rest, trailing) }

        rule typed_param() -> Vec<ParsedNode>
            = s:p(Punct::DoubleStar) t:tfpdef() { vec![s, t] }
            / s:p(Punct::Star) t:tfpdef()? { children((s, t)) }
            / positional_only()
            / t:tfpdef() d:(eq:p(Punct::Equal) v:test() { (eq, v) })? { children((t, d)) }

        rule tfpdef() -> ParsedNode
            = n:name() a:(c:p(Punct::Colon) t:test() { (c, t) })? { node!(Rule::Tfpdef; n, a) }

        rule positional_only() -> Vec<ParsedNode>
            = s:p(Punct::Slash) {?
                if version.has_positional_only_params() { Ok(vec![s]) } else { Err("parameter") }
            }

        rule varargslist() -> ParsedNode
            = first:var_param() rest:(c:comma() t:var_param() { (c, t) })* trailing:comma()?
            { node!(Rule::VarArgsList; first, rest, trailing) }

        rule var_param() -> Vec<ParsedNode>
            = s:p(Punct::DoubleStar) t:vfpdef() { vec![s, t] }
            / s:p(Punct::Star) t:vfpdef()? { children((s, t)) }
            / positional_only()
            / t:vfpdef() d:(eq:p(Punct::Equal) v:test() { (eq, v) })? { children((t, d)) }

        rule vfpdef() -> ParsedNode = n:name() { node!(Rule::Vfpdef; n) }

        // ====================================================================
        // Expressions
        // ====================================================================

        rule namedexpr_test() -> ParsedNode
            = n:name() op:walrus() v:test() { node!(Rule::NamedExprTest; n, op, v) }
            / test()

        rule test() -> ParsedNode
            = body:or_test()
              cond:(i:kw(Keyword::If) c:or_test() e:kw(Keyword::Else) o:test() { vec![i, c, e, o] })?
            {
                match cond {
                    Some(rest) => node!(Rule::Test; body, rest),
                    None => body,
                }
            }
            / lambdef()

        rule test_nocond() -> ParsedNode = or_test() / lambdef_nocond()

        rule lambdef() -> ParsedNode
            = k:kw(Keyword::Lambda) args:varargslist()? c:p(Punct::Colon) body:test()
            { node!(Rule::Lambdef; k, args, c, body) }

        rule lambdef_nocond() -> ParsedNode
            = k:kw(Keyword::Lambda) args:varargslist()? c:p(Punct::Colon) body:test_nocond()
            { node!(Rule::Lambdef; k, args, c, body) }

        rule or_test() -> ParsedNode
            = first:and_test() rest:(o:kw(Keyword::Or) e:and_test() { (o, e) })*
            { fold(Rule::OrTest, first, rest) }

        rule and_test() -> ParsedNode
            = first:not_test() rest:(o:kw(Keyword::And) e:not_test() { (o, e) })*
            { fold(Rule::AndTest, first, rest) }

        rule not_test() -> ParsedNode
            = k:kw(Keyword::Not) e:not_test() { node!(Rule::NotTest; k, e) }
            / comparison()

        rule comparison() -> ParsedNode
            = first:expr() rest:(o:comp_op() e:expr() { (o, e) })*
            { fold(Rule::Comparison, first, rest) }

        rule comp_op() -> ParsedNode
            = n:kw(Keyword::Not) i:kw(Keyword::In) { node!(Rule::CompOperator; n, i) }
            / i:kw(Keyword::Is) n:kw(Keyword::Not) { node!(Rule::CompOperator; i, n) }
            / o:(kw(Keyword::In) / kw(Keyword::Is) / p(Punct::Less) / p(Punct::Greater)
                 / p(Punct::EqualEqual) / p(Punct::GreaterEqual) / p(Punct::LessEqual)
                 / p(Punct::NotEqual))
            { node!(Rule::CompOperator; o) }

        rule star_expr() -> ParsedNode
            = s:p(Punct::Star) e:expr() { node!(Rule::StarExpr; s, e) }

        rule expr() -> ParsedNode
            = first:xor_expr() rest:(o:p(Punct::Vbar) e:xor_expr() { (o, e) })*
            { fold(Rule::Expr, first, rest) }

        rule xor_expr() -> ParsedNode
            = first:and_expr() rest:(o:p(Punct::Circumflex) e:and_expr() { (o, e) })*
            { fold(Rule::XorExpr, first, rest) }

        rule and_expr() -> ParsedNode
            = first:shift_expr() rest:(o:p(Punct::Amper) e:shift_expr() { (o, e) })*
            { fold(Rule::AndExpr, first, rest) }

        rule shift_expr() -> ParsedNode
            = first:arith_expr()
              rest:(o:(p(Punct::LeftShift) / p(Punct::RightShift)) e:arith_expr() { (o, e) })*
            { fold(Rule::ShiftExpr, first, rest) }

        rule arith_expr() -> ParsedNode
            = first:term() rest:(o:(p(Punct::Plus) / p(Punct::Minus)) e:term() { (o, e) })*
            { fold(Rule::ArithExpr, first, rest) }

        rule term() -> ParsedNode
            = first:factor()
              rest:(o:(p(Punct::Star) / p(Punct::Slash) / p(Punct::Percent) / p(Punct::DoubleSlash)
                       / p(Punct::At)) e:factor() { (o, e) })*
            { fold(Rule::Term, first, rest) }

        rule factor() -> ParsedNode
            = o:(p(Punct::Plus) / p(Punct::Minus) / p(Punct::Tilde)) f:factor()
            { node!(Rule::Factor; o, f) }
            / power()

        rule power() -> ParsedNode
            = a:atom_expr() rest:(o:p(Punct::DoubleStar) f:factor() { (o, f) })?
            {
                match rest {
                    Some(rest) => node!(Rule::Power; a, rest),
                    None => a,
                }
            }

        rule atom_expr() -> ParsedNode
            = aw:await_kw() a:atom() t:trailer()* { node!(Rule::AtomExpr; aw, a, t) }
            / a:atom() t:trailer()* { if t.is_empty() { a } else { node!(Rule::AtomExpr; a, t) } }

        rule trailer() -> ParsedNode
            = l:p(Punct::LeftParen) a:arglist()? r:p(Punct::RightParen) { node!(Rule::Trailer; l, a, r) }
            / l:p(Punct::LeftBracket) s:subscriptlist() r:p(Punct::RightBracket)
            { node!(Rule::Trailer; l, s, r) }
            / d:p(Punct::Dot) n:name() { node!(Rule::Trailer; d, n) }

        rule subscriptlist() -> ParsedNode
            = first:subscript() rest:(c:comma() s:subscript() { (c, s) })* trailing:comma()?
            { node!(Rule::SubscriptList; first, rest, trailing) }

        rule subscript() -> ParsedNode
            = lower:test() tail:slice_tail()? { node!(Rule::Subscript; lower, tail) }
            / tail:slice_tail() { node!(Rule::Subscript; tail) }

        rule slice_tail() -> Vec<ParsedNode>
            = c:p(Punct::Colon) upper:test()? step:sliceop()? { children((c, upper, step)) }

        rule sliceop() -> ParsedNode
            = c:p(Punct::Colon) t:test()? { node!(Rule::SliceOp; c, t) }

        rule atom() -> ParsedNode
            = l:p(Punct::LeftParen) inner:(yield_expr() / testlist_comp())? r:p(Punct::RightParen)
            { node!(Rule::Atom; l, inner, r) }
            / l:p(Punct::LeftBracket) inner:testlist_comp()? r:p(Punct::RightBracket)
            { node!(Rule::Atom; l, inner, r) }
            / l:p(Punct::LeftBrace) inner:dictorsetmaker()? r:p(Punct::RightBrace)
            { node!(Rule::Atom; l, inner, r) }
            / n:name() { node!(Rule::Atom; n) }
            / kind(TokType::Number)
            / s:kind(TokType::String)+ { node!(Rule::Atom; s) }
            / p(Punct::Ellipsis)
            / kw(Keyword::None)
            / t:(kw(Keyword::True) / kw(Keyword::False)) { node!(Rule::Atom; node!(Rule::Name; t)) }

        rule testlist_comp() -> ParsedNode
            = first:namedexpr_or_star() rest:testlist_comp_rest()
            { node!(Rule::TestlistComp; first, rest) }

        rule testlist_comp_rest() -> Vec<ParsedNode>
            = c:comp_for() { vec![c] }
            / items:(c:comma() e:namedexpr_or_star() { (c, e) })* trailing:comma()?
            { children((items, trailing)) }

        rule namedexpr_or_star() -> ParsedNode = namedexpr_test() / star_expr()

        rule dictorsetmaker() -> ParsedNode
            = first:maker_item() rest:maker_rest() {? dict_or_set_maker(first, rest) }

        rule maker_item() -> MakerItem
            = s:p(Punct::DoubleStar) e:expr() { MakerItem { children: vec![s, e], is_dict: true } }
            / k:test() v:(c:p(Punct::Colon) v:test() { (c, v) })?
            {
                let is_dict = v.is_some();
                MakerItem { children: children((k, v)), is_dict }
            }
            / s:star_expr() { MakerItem { children: vec![s], is_dict: false } }

        rule maker_rest() -> MakerRest
            = c:comp_for() { MakerRest::Comprehension(c) }
            / items:(c:comma() i:maker_item() { (c, i) })* trailing:comma()?
            { MakerRest::Items(items, trailing) }

        rule comp_for() -> ParsedNode
            = a:async_kw()? f:kw(Keyword::For) target:exprlist() i:kw(Keyword::In) iter:or_test()
              next:comp_iter()?
            { node!(Rule::CompFor; a, f, target, i, iter, next) }

        rule comp_iter() -> ParsedNode = comp_for() / comp_if()

        rule comp_if() -> ParsedNode
            = i:kw(Keyword::If) t:test_nocond() next:comp_iter()? { node!(Rule::CompIf; i, t, next) }

        rule exprlist() -> ParsedNode
            = first:expr_or_star() rest:(c:comma() e:expr_or_star() { (c, e) })* trailing:comma()?
            { list(Rule::ExprList, first, rest, trailing) }

        rule expr_or_star() -> ParsedNode = expr() / star_expr()

        rule testlist() -> ParsedNode
            = first:test() rest:(c:comma() e:test() { (c, e) })* trailing:comma()?
            { list(Rule::Testlist, first, rest, trailing) }

        rule arglist() -> ParsedNode
            = first:argument() rest:(c:comma() a:argument() { (c, a) })* trailing:comma()?
            { node!(Rule::ArgList; first, rest, trailing) }

        rule argument() -> ParsedNode
            = s:(p(Punct::DoubleStar) / p(Punct::Star)) t:test() { node!(Rule::Argument; s, t) }
            / n:name() eq:p(Punct::Equal) v:test() { node!(Rule::Argument; n, eq, v) }
            / n:name() op:walrus() v:test()
            { node!(Rule::Argument; node!(Rule::NamedExprTest; n, op, v)) }
            / t:test() c:comp_for()? { node!(Rule::Argument; t, c) }

        rule yield_expr() -> ParsedNode
            = y:kw(Keyword::Yield) f:kw(Keyword::From) t:test() { node!(Rule::YieldExpr; y, f, t) }
            / y:kw(Keyword::Yield) v:testlist_star_expr()? { node!(Rule::YieldExpr; y, v) }
    }
}
