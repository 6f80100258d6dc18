// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Statement, clause, import and parameter mapping rules.

use super::{BuildResult, Builder, Parts};
use crate::nodes::*;
use crate::parser::{RawId, Rule};
use crate::tokenizer::{Keyword, Punct};

impl Builder<'_> {
    pub(super) fn file_input(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let Some((&end, statements)) = children.split_last() else {
            return Err(self.unexpected(id, "empty file"));
        };
        let end_of_file = self.token(end)?;
        let statements = if statements.is_empty() {
            None
        } else {
            Some(self.statement_list(statements)?)
        };
        let docstring = self.docstring(statements);
        let parts = Parts::new().node(statements).token(end_of_file);
        self.push(
            Kind::FileInput,
            FileInput {
                statements,
                end_of_file,
                docstring,
            },
            parts,
        )
    }

    /// Flatten raw statement lines into one [`StatementList`].
    ///
    /// A line of simple statements contributes each statement; its
    /// semicolons and line break become tokens of the list.
    fn statement_list(&mut self, lines: &[RawId]) -> BuildResult<NodeId> {
        let raw = self.raw;
        let mut statements = Vec::new();
        let mut parts = Parts::new();
        for &line in lines {
            if raw.is(line, Rule::StmtList) {
                for &child in raw.children(line) {
                    if raw.rule(child).is_some() {
                        statements.push(self.simple_statement(child)?);
                    }
                }
                parts = parts.tokens(self.bounds(line));
            } else {
                statements.push(self.compound_statement(line)?);
            }
        }
        let parts = parts.nodes(statements.iter().copied());
        self.push(Kind::StatementList, StatementList { statements }, parts)
    }

    /// The body of a compound statement.
    fn suite(&mut self, id: RawId, class_body: bool) -> BuildResult<NodeId> {
        let raw = self.raw;
        let lines: Vec<RawId> = raw
            .children(id)
            .iter()
            .copied()
            .filter(|&c| raw.rule(c).is_some())
            .collect();
        let saved = std::mem::replace(&mut self.in_class_body, class_body);
        let body = self.statement_list(&lines);
        self.in_class_body = saved;
        body
    }

    // ========================================================================
    // Simple statements
    // ========================================================================

    fn simple_statement(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let Some(rule) = raw.rule(id) else {
            return Err(self.unexpected(id, "expected a statement"));
        };
        match rule {
            Rule::PassStmt => {
                let keyword = self.token(self.child(id, 0)?)?;
                self.push(Kind::PassStmt, PassStmt { keyword }, Parts::new().token(keyword))
            }
            Rule::BreakStmt => {
                let keyword = self.token(self.child(id, 0)?)?;
                self.push(Kind::BreakStmt, BreakStmt { keyword }, Parts::new().token(keyword))
            }
            Rule::ContinueStmt => {
                let keyword = self.token(self.child(id, 0)?)?;
                self.push(
                    Kind::ContinueStmt,
                    ContinueStmt { keyword },
                    Parts::new().token(keyword),
                )
            }
            Rule::DelStmt => {
                let keyword = self.token(self.child(id, 0)?)?;
                let expressions = self.items(self.child(id, 1)?)?;
                let parts = Parts::new()
                    .nodes(expressions.iter().copied())
                    .tokens(self.bounds(id));
                self.push(Kind::DelStmt, DelStmt { keyword, expressions }, parts)
            }
            Rule::ReturnStmt => {
                let keyword = self.token(self.child(id, 0)?)?;
                let expressions = match raw.children(id).get(1) {
                    Some(&value) => self.items(value)?,
                    None => Vec::new(),
                };
                let parts = Parts::new()
                    .nodes(expressions.iter().copied())
                    .tokens(self.bounds(id));
                self.push(Kind::ReturnStmt, ReturnStmt { keyword, expressions }, parts)
            }
            Rule::RaiseStmt => self.raise_stmt(id),
            Rule::GlobalStmt | Rule::NonlocalStmt => self.scope_declaration(id, rule),
            Rule::AssertStmt => {
                let children = raw.children(id);
                let keyword = self.token(self.child(id, 0)?)?;
                let condition = self.expression(self.child(id, 1)?)?;
                let message = match children.get(3) {
                    Some(&message) => Some(self.expression(message)?),
                    None => None,
                };
                let parts = Parts::new()
                    .node(condition)
                    .node(message)
                    .tokens(self.bounds(id));
                self.push(
                    Kind::AssertStmt,
                    AssertStmt {
                        keyword,
                        condition,
                        message,
                    },
                    parts,
                )
            }
            Rule::YieldStmt => {
                let yield_expr = self.expression(self.child(id, 0)?)?;
                self.push(Kind::YieldStmt, YieldStmt { yield_expr }, Parts::new().node(yield_expr))
            }
            Rule::ImportName => self.import_name(id),
            Rule::ImportFrom => self.import_from(id),
            Rule::ExpressionStmt => self.expression_stmt(id),
            _ => Err(self.unexpected(id, "expected a simple statement")),
        }
    }

    fn raise_stmt(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let keyword = self.token(self.child(id, 0)?)?;
        let mut expressions = Vec::new();
        if let Some(&exception) = children.get(1) {
            expressions.push(self.expression(exception)?);
        }
        let (from_keyword, from_expression) = match children.get(2..4) {
            Some(&[from, cause]) => (Some(self.token(from)?), Some(self.expression(cause)?)),
            _ => (None, None),
        };
        let parts = Parts::new()
            .nodes(expressions.iter().copied())
            .node(from_expression)
            .tokens(self.bounds(id));
        self.push(
            Kind::RaiseStmt,
            RaiseStmt {
                keyword,
                expressions,
                from_keyword,
                from_expression,
            },
            parts,
        )
    }

    fn scope_declaration(&mut self, id: RawId, rule: Rule) -> BuildResult<NodeId> {
        let raw = self.raw;
        let keyword = self.token(self.child(id, 0)?)?;
        let raw_names: Vec<RawId> = raw.children_matching(id, Rule::Name).collect();
        let mut names = Vec::with_capacity(raw_names.len());
        for raw_name in raw_names {
            names.push(self.name(raw_name, false)?);
        }
        let parts = Parts::new()
            .nodes(names.iter().copied())
            .tokens(self.bounds(id));
        if rule == Rule::GlobalStmt {
            self.push(Kind::GlobalStmt, GlobalStmt { keyword, names }, parts)
        } else {
            self.push(Kind::NonlocalStmt, NonlocalStmt { keyword, names }, parts)
        }
    }

    fn expression_stmt(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let lhs = self.child(id, 0)?;
        match children.get(1) {
            None => {
                let expressions = self.items(lhs)?;
                let parts = Parts::new()
                    .nodes(expressions.iter().copied())
                    .tokens(self.bounds(id));
                self.push(Kind::ExpressionStmt, ExpressionStmt { expressions }, parts)
            }
            Some(&annotation) if raw.is(annotation, Rule::AnnAssign) => {
                self.annotated_assignment(lhs, annotation)
            }
            Some(&equal) if raw.is(equal, Punct::Equal) => self.assignment(id),
            Some(&operator) => {
                let operator = self.token(operator)?;
                let lhs_expression = self.expression(lhs)?;
                let rhs_expression = self.expression(self.child(id, 2)?)?;
                let parts = Parts::new()
                    .node(lhs_expression)
                    .node(rhs_expression)
                    .tokens(self.bounds(id));
                self.push(
                    Kind::CompoundAssignment,
                    CompoundAssignment {
                        lhs_expression,
                        operator,
                        rhs_expression,
                    },
                    parts,
                )
            }
        }
    }

    /// `a = b = value`: every target but the value gets an [`ExpressionList`].
    fn assignment(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let Some((&value, targets)) = children.split_last() else {
            return Err(self.unexpected(id, "empty assignment"));
        };
        let mut lhs_expressions = Vec::new();
        let mut equal_tokens = Vec::new();
        for &child in targets {
            if raw.is(child, Punct::Equal) {
                equal_tokens.push(self.token(child)?);
            } else {
                lhs_expressions.push(self.expression_list(child)?);
            }
        }
        let assigned_value = self.expression(value)?;
        let parts = Parts::new()
            .nodes(lhs_expressions.iter().copied())
            .node(assigned_value)
            .tokens(equal_tokens.iter().copied());
        self.push(
            Kind::AssignmentStmt,
            AssignmentStmt {
                lhs_expressions,
                equal_tokens,
                assigned_value,
            },
            parts,
        )
    }

    fn annotated_assignment(&mut self, lhs: RawId, annassign: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(annassign);
        let variable = self.expression(lhs)?;
        let colon = self.token(self.child(annassign, 0)?)?;
        let annotation_expression = self.expression(self.child(annassign, 1)?)?;
        let annotation = self.push(
            Kind::VariableTypeAnnotation,
            TypeAnnotation {
                marker: colon,
                expression: annotation_expression,
            },
            Parts::new().token(colon).node(annotation_expression),
        )?;
        let (equal_token, assigned_value) = match children.get(2..4) {
            Some(&[equal, value]) => (Some(self.token(equal)?), Some(self.expression(value)?)),
            _ => (None, None),
        };
        let parts = Parts::new()
            .node(variable)
            .node(annotation)
            .token(equal_token)
            .node(assigned_value);
        self.push(
            Kind::AnnotatedAssignment,
            AnnotatedAssignment {
                variable,
                annotation,
                equal_token,
                assigned_value,
            },
            parts,
        )
    }

    // ========================================================================
    // Imports
    // ========================================================================

    fn import_name(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let import_keyword = self.token(self.child(id, 0)?)?;
        let names = self.child(id, 1)?;
        let raw_modules: Vec<RawId> = raw.children_matching(names, Rule::DottedAsName).collect();
        let mut modules = Vec::with_capacity(raw_modules.len());
        for module in raw_modules {
            let dotted_name = self.dotted_name(self.child(module, 0)?)?;
            let alias = raw.children(module).get(1..3);
            modules.push(self.aliased_name(dotted_name, alias)?);
        }
        let parts = Parts::new()
            .nodes(modules.iter().copied())
            .tokens(self.bounds(id));
        self.push(
            Kind::ImportName,
            ImportName {
                import_keyword,
                modules,
            },
            parts,
        )
    }

    fn import_from(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let from_keyword = self.token(self.child(id, 0)?)?;
        let mut dotted_prefix = Vec::new();
        let mut module = None;
        let mut import_keyword = None;
        let mut imported_names = Vec::new();
        let mut wildcard = None;
        for &child in &children[1..] {
            match raw.rule(child) {
                Some(Rule::DottedName) => module = Some(self.dotted_name(child)?),
                Some(Rule::ImportAsNames) => {
                    let raw_names: Vec<RawId> = raw.children_matching(child, Rule::ImportAsName).collect();
                    for raw_name in raw_names {
                        let name = self.name(self.child(raw_name, 0)?, false)?;
                        let dotted_name = self.push(
                            Kind::DottedName,
                            DottedName { names: vec![name] },
                            Parts::new().node(name),
                        )?;
                        let alias = raw.children(raw_name).get(1..3);
                        imported_names.push(self.aliased_name(dotted_name, alias)?);
                    }
                }
                Some(_) => return Err(self.unexpected(child, "unexpected import part")),
                None if import_keyword.is_none() => {
                    if raw.is(child, Keyword::Import) {
                        import_keyword = Some(self.token(child)?);
                    } else {
                        dotted_prefix.push(self.token(child)?);
                    }
                }
                None if raw.is(child, Punct::Star) => wildcard = Some(self.token(child)?),
                // Parentheses around the imported names.
                None => {}
            }
        }
        let Some(import_keyword) = import_keyword else {
            return Err(self.unexpected(id, "missing import keyword"));
        };
        let parts = Parts::new()
            .node(module)
            .nodes(imported_names.iter().copied())
            .tokens(self.bounds(id));
        self.push(
            Kind::ImportFrom,
            ImportFrom {
                from_keyword,
                dotted_prefix,
                module,
                import_keyword,
                imported_names,
                wildcard,
            },
            parts,
        )
    }

    /// `dotted_name [as alias]`, where `alias` is the `[as, Name]` pair.
    fn aliased_name(&mut self, dotted_name: NodeId, alias: Option<&[RawId]>) -> BuildResult<NodeId> {
        let (as_keyword, alias) = match alias {
            Some(&[as_keyword, alias]) => (Some(self.token(as_keyword)?), Some(self.name(alias, false)?)),
            _ => (None, None),
        };
        let parts = Parts::new().node(dotted_name).token(as_keyword).node(alias);
        self.push(
            Kind::AliasedName,
            AliasedName {
                dotted_name,
                as_keyword,
                alias,
            },
            parts,
        )
    }

    fn dotted_name(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let raw_names: Vec<RawId> = raw.children_matching(id, Rule::Name).collect();
        let mut names = Vec::with_capacity(raw_names.len());
        for raw_name in raw_names {
            names.push(self.name(raw_name, false)?);
        }
        let parts = Parts::new().nodes(names.iter().copied());
        self.push(Kind::DottedName, DottedName { names }, parts)
    }

    // ========================================================================
    // Compound statements
    // ========================================================================

    fn compound_statement(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        match raw.rule(id) {
            Some(Rule::IfStmt) => self.if_stmt(id),
            Some(Rule::WhileStmt) => self.while_stmt(id),
            Some(Rule::ForStmt) => self.for_stmt(id),
            Some(Rule::TryStmt) => self.try_stmt(id),
            Some(Rule::WithStmt) => self.with_stmt(id),
            Some(Rule::FuncDef) => self.func_def(id),
            Some(Rule::ClassDef) => self.class_def(id),
            _ => Err(self.unexpected(id, "expected a compound statement")),
        }
    }

    /// The `[else, :, suite]` triple starting at `at`, if there is one.
    fn else_clause(&mut self, parent: RawId, at: usize) -> BuildResult<Option<NodeId>> {
        let raw = self.raw;
        let children = raw.children(parent);
        match children.get(at..at + 3) {
            None => Ok(None),
            Some(&[else_keyword, colon, body]) if raw.is(else_keyword, Keyword::Else) => {
                let else_keyword = self.token(else_keyword)?;
                let colon = self.token(colon)?;
                let body = self.suite(body, false)?;
                let parts = Parts::new().token(else_keyword).token(colon).node(body);
                Ok(Some(self.push(
                    Kind::ElseClause,
                    ElseClause {
                        else_keyword,
                        colon,
                        body,
                    },
                    parts,
                )?))
            }
            Some(_) => Err(self.unexpected(parent, "malformed else clause")),
        }
    }

    fn if_stmt(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let keyword = self.token(self.child(id, 0)?)?;
        let condition = self.expression(self.child(id, 1)?)?;
        let colon = self.token(self.child(id, 2)?)?;
        let body = self.suite(self.child(id, 3)?, false)?;

        let mut elif_branches = Vec::new();
        let mut at = 4;
        while let Some(&[elif, elif_condition, elif_colon, elif_body]) = children.get(at..at + 4) {
            if !raw.is(elif, Keyword::Elif) {
                break;
            }
            let keyword = self.token(elif)?;
            let condition = self.expression(elif_condition)?;
            let colon = self.token(elif_colon)?;
            let body = self.suite(elif_body, false)?;
            let parts = Parts::new().token(keyword).node(condition).token(colon).node(body);
            elif_branches.push(self.push(
                Kind::IfStmt,
                IfStmt {
                    keyword,
                    condition,
                    colon,
                    body,
                    elif_branches: Vec::new(),
                    else_clause: None,
                    is_elif: true,
                },
                parts,
            )?);
            at += 4;
        }
        let else_clause = self.else_clause(id, at)?;

        let parts = Parts::new()
            .token(keyword)
            .node(condition)
            .node(body)
            .nodes(elif_branches.iter().copied())
            .node(else_clause);
        self.push(
            Kind::IfStmt,
            IfStmt {
                keyword,
                condition,
                colon,
                body,
                elif_branches,
                else_clause,
                is_elif: false,
            },
            parts,
        )
    }

    fn while_stmt(&mut self, id: RawId) -> BuildResult<NodeId> {
        let while_keyword = self.token(self.child(id, 0)?)?;
        let condition = self.expression(self.child(id, 1)?)?;
        let colon = self.token(self.child(id, 2)?)?;
        let body = self.suite(self.child(id, 3)?, false)?;
        let else_clause = self.else_clause(id, 4)?;
        let parts = Parts::new()
            .token(while_keyword)
            .node(condition)
            .node(body)
            .node(else_clause);
        self.push(
            Kind::WhileStmt,
            WhileStmt {
                while_keyword,
                condition,
                colon,
                body,
                else_clause,
            },
            parts,
        )
    }

    fn for_stmt(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let start = raw
            .children(id)
            .iter()
            .position(|&c| raw.is(c, Keyword::For))
            .ok_or_else(|| self.unexpected(id, "missing for keyword"))?;
        let for_keyword = self.token(self.child(id, start)?)?;
        let async_keyword = self.async_before(for_keyword);
        let expressions = self.items(self.child(id, start + 1)?)?;
        let in_keyword = self.token(self.child(id, start + 2)?)?;
        let test_expressions = self.items(self.child(id, start + 3)?)?;
        let colon = self.token(self.child(id, start + 4)?)?;
        let body = self.suite(self.child(id, start + 5)?, false)?;
        let else_clause = self.else_clause(id, start + 6)?;
        let parts = Parts::new()
            .token(async_keyword)
            .token(for_keyword)
            .nodes(expressions.iter().copied())
            .nodes(test_expressions.iter().copied())
            .node(body)
            .node(else_clause);
        self.push(
            Kind::ForStmt,
            ForStmt {
                async_keyword,
                for_keyword,
                expressions,
                in_keyword,
                test_expressions,
                colon,
                body,
                else_clause,
            },
            parts,
        )
    }

    fn try_stmt(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let try_keyword = self.token(self.child(id, 0)?)?;
        let colon = self.token(self.child(id, 1)?)?;
        let body = self.suite(self.child(id, 2)?, false)?;

        let mut except_clauses = Vec::new();
        let mut else_clause = None;
        let mut finally_clause = None;
        let mut at = 3;
        while at < children.len() {
            let Some(&[head, clause_colon, clause_body]) = children.get(at..at + 3) else {
                return Err(self.unexpected(id, "malformed handler"));
            };
            if raw.is(head, Rule::ExceptClause) {
                except_clauses.push(self.except_clause(head, clause_colon, clause_body)?);
            } else if raw.is(head, Keyword::Else) {
                else_clause = self.else_clause(id, at)?;
            } else if raw.is(head, Keyword::Finally) {
                let finally_keyword = self.token(head)?;
                let colon = self.token(clause_colon)?;
                let body = self.suite(clause_body, false)?;
                let parts = Parts::new().token(finally_keyword).token(colon).node(body);
                finally_clause = Some(self.push(
                    Kind::FinallyClause,
                    FinallyClause {
                        finally_keyword,
                        colon,
                        body,
                    },
                    parts,
                )?);
            } else {
                return Err(self.unexpected(head, "expected except, else or finally"));
            }
            at += 3;
        }

        let parts = Parts::new()
            .token(try_keyword)
            .node(body)
            .nodes(except_clauses.iter().copied())
            .node(else_clause)
            .node(finally_clause);
        self.push(
            Kind::TryStmt,
            TryStmt {
                try_keyword,
                colon,
                body,
                except_clauses,
                else_clause,
                finally_clause,
            },
            parts,
        )
    }

    /// The raw except clause holds `except [test [as name]]`; the colon and
    /// body are its siblings.
    fn except_clause(&mut self, head: RawId, colon: RawId, body: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(head);
        let except_keyword = self.token(self.child(head, 0)?)?;
        let exception = match children.get(1) {
            Some(&exception) => Some(self.expression(exception)?),
            None => None,
        };
        let (as_keyword, exception_instance) = match children.get(2..4) {
            Some(&[as_keyword, instance]) => (Some(self.token(as_keyword)?), Some(self.name(instance, true)?)),
            _ => (None, None),
        };
        let colon = self.token(colon)?;
        let body = self.suite(body, false)?;
        let parts = Parts::new()
            .token(except_keyword)
            .node(exception)
            .node(exception_instance)
            .token(colon)
            .node(body);
        self.push(
            Kind::ExceptClause,
            ExceptClause {
                except_keyword,
                exception,
                as_keyword,
                exception_instance,
                colon,
                body,
            },
            parts,
        )
    }

    fn with_stmt(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let with_at = children
            .iter()
            .position(|&c| raw.is(c, Keyword::With))
            .ok_or_else(|| self.unexpected(id, "missing with keyword"))?;
        let with_keyword = self.token(children[with_at])?;
        let async_keyword = self.async_before(with_keyword);
        let Some((&raw_body, rest)) = children.split_last() else {
            return Err(self.unexpected(id, "empty with statement"));
        };
        let colon = match rest.last() {
            Some(&colon) => self.token(colon)?,
            None => return Err(self.unexpected(id, "missing colon")),
        };

        let raw_items: Vec<RawId> = raw.children_matching(id, Rule::WithItem).collect();
        let mut items = Vec::with_capacity(raw_items.len());
        for item in raw_items {
            items.push(self.with_item(item)?);
        }
        let body = self.suite(raw_body, false)?;
        let parts = Parts::new()
            .token(async_keyword)
            .token(with_keyword)
            .nodes(items.iter().copied())
            .node(body);
        self.push(
            Kind::WithStmt,
            WithStmt {
                async_keyword,
                with_keyword,
                items,
                colon,
                body,
            },
            parts,
        )
    }

    fn with_item(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let test = self.expression(self.child(id, 0)?)?;
        let (as_keyword, target) = match raw.children(id).get(1..3) {
            Some(&[as_keyword, target]) => (Some(self.token(as_keyword)?), Some(self.expression(target)?)),
            _ => (None, None),
        };
        let parts = Parts::new().node(test).token(as_keyword).node(target);
        self.push(
            Kind::WithItem,
            WithItem {
                test,
                as_keyword,
                target,
            },
            parts,
        )
    }

    // ========================================================================
    // Definitions
    // ========================================================================

    fn decorators(&mut self, id: RawId) -> BuildResult<Vec<NodeId>> {
        let raw = self.raw;
        let raw_decorators: Vec<RawId> = raw.children_matching(id, Rule::Decorator).collect();
        let mut decorators = Vec::with_capacity(raw_decorators.len());
        for decorator in raw_decorators {
            decorators.push(self.decorator(decorator)?);
        }
        Ok(decorators)
    }

    /// `@ dotted_name [( [arglist] )] NEWLINE`
    fn decorator(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let at_token = self.token(self.child(id, 0)?)?;
        let name = self.dotted_name(self.child(id, 1)?)?;
        let Some(&raw_newline) = children.last() else {
            return Err(self.unexpected(id, "missing line break"));
        };
        let newline = self.token(raw_newline)?;
        let (left_paren, arguments, right_paren) = match children.get(2..children.len() - 1) {
            Some(&[left, right]) => (Some(self.token(left)?), None, Some(self.token(right)?)),
            Some(&[left, args, right]) => (
                Some(self.token(left)?),
                Some(self.arg_list(args)?),
                Some(self.token(right)?),
            ),
            _ => (None, None, None),
        };
        let parts = Parts::new()
            .token(at_token)
            .node(name)
            .node(arguments)
            .token(newline);
        self.push(
            Kind::Decorator,
            Decorator {
                at_token,
                name,
                left_paren,
                arguments,
                right_paren,
                newline,
            },
            parts,
        )
    }

    fn func_def(&mut self, id: RawId) -> BuildResult<NodeId> {
        let is_method_definition = self.in_class_body;
        let raw = self.raw;
        let children = raw.children(id);
        let decorators = match children.first() {
            Some(&first) if raw.is(first, Rule::Decorators) => self.decorators(first)?,
            _ => Vec::new(),
        };
        let def_at = children
            .iter()
            .position(|&c| raw.is(c, Keyword::Def))
            .ok_or_else(|| self.unexpected(id, "missing def keyword"))?;
        let def_keyword = self.token(children[def_at])?;
        let async_keyword = self.async_before(def_keyword);
        let name = self.name(self.child(id, def_at + 1)?, false)?;
        let left_paren = self.token(self.child(id, def_at + 2)?)?;

        let mut at = def_at + 3;
        let parameters = if raw.is(self.child(id, at)?, Rule::TypedArgsList) {
            at += 1;
            Some(self.parameter_list(children[at - 1])?)
        } else {
            None
        };
        let right_paren = self.token(self.child(id, at)?)?;
        at += 1;

        let return_annotation = if raw.is(self.child(id, at)?, Punct::Arrow) {
            let arrow = self.token(children[at])?;
            let expression = self.expression(self.child(id, at + 1)?)?;
            at += 2;
            Some(self.push(
                Kind::ReturnTypeAnnotation,
                TypeAnnotation {
                    marker: arrow,
                    expression,
                },
                Parts::new().token(arrow).node(expression),
            )?)
        } else {
            None
        };
        let colon = self.token(self.child(id, at)?)?;
        let body = self.suite(self.child(id, at + 1)?, false)?;
        let docstring = self.docstring(Some(body));

        let parts = Parts::new()
            .nodes(decorators.iter().copied())
            .token(async_keyword)
            .token(def_keyword)
            .node(name)
            .node(parameters)
            .node(return_annotation)
            .node(body);
        self.push(
            Kind::FuncDef,
            FuncDef {
                decorators,
                async_keyword,
                def_keyword,
                name,
                left_paren,
                parameters,
                right_paren,
                return_annotation,
                colon,
                body,
                docstring,
                is_method_definition,
            },
            parts,
        )
    }

    fn class_def(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let children = raw.children(id);
        let decorators = match children.first() {
            Some(&first) if raw.is(first, Rule::Decorators) => self.decorators(first)?,
            _ => Vec::new(),
        };
        let class_at = children
            .iter()
            .position(|&c| raw.is(c, Keyword::Class))
            .ok_or_else(|| self.unexpected(id, "missing class keyword"))?;
        let class_keyword = self.token(children[class_at])?;
        let name = self.name(self.child(id, class_at + 1)?, false)?;
        let Some(&raw_body) = children.last() else {
            return Err(self.unexpected(id, "missing body"));
        };
        let colon = self.token(self.child(id, children.len() - 2)?)?;
        let (left_paren, args, right_paren) = match children.get(class_at + 2..children.len() - 2) {
            Some(&[left, right]) => (Some(self.token(left)?), None, Some(self.token(right)?)),
            Some(&[left, args, right]) => (
                Some(self.token(left)?),
                Some(self.arg_list(args)?),
                Some(self.token(right)?),
            ),
            _ => (None, None, None),
        };
        let body = self.suite(raw_body, true)?;
        let docstring = self.docstring(Some(body));

        let parts = Parts::new()
            .nodes(decorators.iter().copied())
            .token(class_keyword)
            .node(name)
            .node(args)
            .node(body);
        self.push(
            Kind::ClassDef,
            ClassDef {
                decorators,
                class_keyword,
                name,
                left_paren,
                args,
                right_paren,
                colon,
                body,
                docstring,
            },
            parts,
        )
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// A `typedargslist` or `varargslist`: parameters separated by commas.
    pub(super) fn parameter_list(&mut self, id: RawId) -> BuildResult<NodeId> {
        let raw = self.raw;
        let mut parameters = Vec::new();
        for group in raw.children(id).split(|&c| raw.is(c, Punct::Comma)) {
            if !group.is_empty() {
                parameters.push(self.parameter(group)?);
            }
        }
        let parts = Parts::new()
            .nodes(parameters.iter().copied())
            .tokens(self.bounds(id));
        self.push(Kind::ParameterList, ParameterList { parameters }, parts)
    }

    /// One parameter: `[* | ** | /] [def [= default]]`.
    fn parameter(&mut self, group: &[RawId]) -> BuildResult<NodeId> {
        let raw = self.raw;
        let mut rest = group;
        let mut star_token = None;
        if let Some((&first, tail)) = rest.split_first() {
            if raw.is(first, [Punct::Star, Punct::DoubleStar, Punct::Slash]) {
                star_token = Some(self.token(first)?);
                rest = tail;
            }
        }
        let (name, annotation, equal_token, default_value) = match *rest {
            [] => (None, None, None, None),
            [definition] => {
                let (name, annotation) = self.parameter_definition(definition)?;
                (Some(name), annotation, None, None)
            }
            [definition, equal, default] => {
                let (name, annotation) = self.parameter_definition(definition)?;
                (
                    Some(name),
                    annotation,
                    Some(self.token(equal)?),
                    Some(self.expression(default)?),
                )
            }
            _ => return Err(self.unexpected(group[0], "malformed parameter")),
        };
        let parts = Parts::new()
            .token(star_token)
            .node(name)
            .node(annotation)
            .token(equal_token)
            .node(default_value);
        self.push(
            Kind::Parameter,
            Parameter {
                star_token,
                name,
                annotation,
                equal_token,
                default_value,
            },
            parts,
        )
    }

    /// `tfpdef` (`name [: annotation]`) or `vfpdef` (`name`).
    fn parameter_definition(&mut self, id: RawId) -> BuildResult<(NodeId, Option<NodeId>)> {
        let raw = self.raw;
        let name = self.name(self.child(id, 0)?, false)?;
        let annotation = match raw.children(id).get(1..3) {
            Some(&[colon, expression]) => {
                let colon = self.token(colon)?;
                let expression = self.expression(expression)?;
                Some(self.push(
                    Kind::TypeAnnotation,
                    TypeAnnotation {
                        marker: colon,
                        expression,
                    },
                    Parts::new().token(colon).node(expression),
                )?)
            }
            _ => None,
        };
        Ok((name, annotation))
    }
}
