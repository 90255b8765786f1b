// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Statements, blocks and the module itself.

use std::rc::Rc;

use crate::parser::{empty_expression, hoist, is_keyword, join, PResult, Parser};
use crate::tokenizer::TokType;
use crate::tree::*;

type Statements = Vec<RightPadded<Statement>>;

impl<'a> Parser<'a> {
    /// The statements of the module and the trailing space before end of
    /// file.
    pub(crate) fn module(&mut self) -> PResult<(Statements, Space)> {
        let mut statements = Vec::new();
        loop {
            let prefix = self.trivia();
            if self.raw().kind == TokType::EndMarker {
                return Ok((statements, prefix));
            }
            statements.extend(self.statement(prefix)?);
        }
    }

    /// One compound statement, or the simple statements of one line.
    fn statement(&mut self, prefix: Space) -> PResult<Statements> {
        let token = self.peek();
        match token.kind {
            TokType::Indent => return self.error("unexpected indent"),
            TokType::Dedent => return self.error("unindent does not match any outer level"),
            _ => {}
        }
        let compound = match (token.kind, token.text) {
            (TokType::Op, "@") => true,
            (TokType::Name, "def" | "class" | "if" | "while" | "for" | "try" | "with") => true,
            (TokType::Name, "async") => {
                matches!(self.peek_nth(1).text, "def" | "for" | "with")
            }
            (TokType::Name, "match") => self.is_match_statement(),
            _ => false,
        };
        if compound {
            let statement = self.compound_statement(prefix)?;
            Ok(vec![RightPadded::new(statement)])
        } else {
            self.simple_statements(prefix)
        }
    }

    fn compound_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let token = self.peek();
        Ok(match token.text {
            "@" => self.decorated(prefix)?,
            "def" => self.function_def(prefix, Vec::new(), Space::EMPTY)?,
            "class" => self.class_def(prefix, Vec::new(), Space::EMPTY)?,
            "if" => Statement::If(self.if_statement(prefix)?),
            "while" => self.while_statement(prefix)?,
            "for" => self.for_statement(prefix)?,
            "try" => self.try_statement(prefix)?,
            "with" => Statement::Try(self.with_statement(prefix)?),
            "match" => self.match_statement(prefix)?,
            "async" => self.async_statement(prefix)?,
            _ => return self.unexpected("a statement"),
        })
    }

    /// Simple statements up to the end of the line. Each statement's
    /// `after` is the space before its `;` or the rest of the line.
    fn simple_statements(&mut self, prefix: Space) -> PResult<Statements> {
        let mut statements = Vec::new();
        let mut prefix = prefix;
        loop {
            let statement = self.simple_statement(prefix)?;
            if self.at_op(";") {
                let after = self.space();
                self.bump();
                statements.push(RightPadded {
                    element: statement,
                    after,
                    markers: Markers::build(vec![Marker::semicolon()]),
                });
                if self.at_line_end() {
                    return Ok(statements);
                }
                prefix = self.space();
                continue;
            }
            if !self.at_line_end() {
                return self.unexpected("end of statement");
            }
            let after = self.space();
            statements.push(RightPadded::build(statement, after));
            return Ok(statements);
        }
    }

    fn at_statement_end(&self) -> bool {
        self.at_line_end() || self.at_op(";")
    }

    fn simple_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let token = self.peek();
        if token.kind == TokType::Name {
            match token.text {
                "pass" => {
                    let prefix = join(prefix, self.expect_keyword("pass")?);
                    return Ok(Statement::Pass(Rc::new(Pass::new(prefix, Markers::EMPTY))));
                }
                "break" => {
                    let prefix = join(prefix, self.expect_keyword("break")?);
                    return Ok(Statement::Break(Rc::new(Break::new(prefix, Markers::EMPTY))));
                }
                "continue" => {
                    let prefix = join(prefix, self.expect_keyword("continue")?);
                    return Ok(Statement::Continue(Rc::new(Continue::new(
                        prefix,
                        Markers::EMPTY,
                    ))));
                }
                "return" => return self.return_statement(prefix),
                "raise" => return self.raise_statement(prefix),
                "global" | "nonlocal" => return self.scope_statement(prefix),
                "del" => return self.del_statement(prefix),
                "assert" => return self.assert_statement(prefix),
                "import" => return self.import_statement(prefix),
                "from" => return self.from_import_statement(prefix),
                "type" if self.is_type_alias() => return self.type_alias(prefix),
                _ => {}
            }
        }
        self.expression_statement(prefix)
    }

    fn return_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("return")?);
        let expression = if self.at_statement_end() {
            None
        } else {
            Some(self.star_expressions()?)
        };
        Ok(Statement::Return(Rc::new(Return::new(
            prefix,
            Markers::EMPTY,
            expression,
        ))))
    }

    fn raise_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("raise")?);
        let exception = if self.at_statement_end() {
            None
        } else {
            let error = self.expression()?;
            if self.at_keyword("from") {
                let before = self.expect_keyword("from")?;
                let cause = self.expression()?;
                let (error_prefix, error) = hoist(error);
                Some(Expression::ErrorFrom(Rc::new(ErrorFrom::new(
                    error_prefix,
                    Markers::EMPTY,
                    error,
                    LeftPadded::build(before, cause),
                ))))
            } else {
                Some(error)
            }
        };
        Ok(Statement::Throw(Rc::new(Throw::new(
            prefix,
            Markers::EMPTY,
            exception,
        ))))
    }

    fn scope_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let keyword = self.peek().text;
        let kind = if keyword == "global" {
            VariableScopeKind::Global
        } else {
            VariableScopeKind::Nonlocal
        };
        let prefix = join(prefix, self.expect_keyword(keyword)?);
        let names = self.undelimited(|p| p.name(), |p| p.peek().kind == TokType::Name)?;
        Ok(Statement::VariableScope(Rc::new(VariableScope::new(
            prefix,
            Markers::EMPTY,
            kind,
            names,
        ))))
    }

    fn del_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("del")?);
        let targets = self.undelimited(|p| p.bitwise_or(), |p| p.starts_expression())?;
        Ok(Statement::Del(Rc::new(Del::new(prefix, Markers::EMPTY, targets))))
    }

    fn assert_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("assert")?);
        let condition = self.expression()?;
        let detail = if self.at_op(",") {
            let before = self.expect_op(",")?;
            Some(LeftPadded::build(before, self.expression()?))
        } else {
            None
        };
        Ok(Statement::Assert(Rc::new(Assert::new(
            prefix,
            Markers::EMPTY,
            condition,
            detail,
        ))))
    }

    fn import_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("import")?);
        let names = self.undelimited(
            |p| {
                let module_prefix = p.space();
                let qualid = p.dotted_name(module_prefix)?;
                p.import_alias(qualid)
            },
            |p| p.peek().kind == TokType::Name,
        )?;
        Ok(Statement::MultiImport(Rc::new(MultiImport::new(
            prefix,
            Markers::EMPTY,
            None,
            false,
            Container::build(Space::EMPTY, names),
        ))))
    }

    fn from_import_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("from")?);
        let module = self.import_module()?;
        let after = self.expect_keyword("import")?;
        let (parenthesized, names) = if self.at_op("(") {
            let names = self.container(
                "(",
                ")",
                |p| p.import_as_name(),
                |space| Rc::new(Import::new(space, Markers::EMPTY, empty_expression(Space::EMPTY), None)),
            )?;
            (true, names)
        } else if self.at_op("*") {
            let star_prefix = self.expect_op("*")?;
            let star = Import::new(
                Space::EMPTY,
                Markers::EMPTY,
                Expression::Identifier(identifier(star_prefix, "*")),
                None,
            );
            (
                false,
                Container::build(Space::EMPTY, vec![RightPadded::new(Rc::new(star))]),
            )
        } else {
            let names =
                self.undelimited(|p| p.import_as_name(), |p| p.peek().kind == TokType::Name)?;
            (false, Container::build(Space::EMPTY, names))
        };
        Ok(Statement::MultiImport(Rc::new(MultiImport::new(
            prefix,
            Markers::EMPTY,
            Some(RightPadded::build(module, after)),
            parenthesized,
            names,
        ))))
    }

    fn import_as_name(&mut self) -> PResult<Rc<Import>> {
        let name = self.name()?;
        self.import_alias(Expression::Identifier(name))
    }

    fn import_alias(&mut self, qualid: Expression) -> PResult<Rc<Import>> {
        let alias = if self.at_keyword("as") {
            let before = self.expect_keyword("as")?;
            Some(LeftPadded::build(before, self.name()?))
        } else {
            None
        };
        Ok(Rc::new(Import::new(Space::EMPTY, Markers::EMPTY, qualid, alias)))
    }

    /// `a.b.c` as nested field accesses.
    pub(super) fn dotted_name(&mut self, prefix: Space) -> PResult<Expression> {
        let mut name = Expression::Identifier(self.name()?.with_prefix(prefix));
        while self.at_op(".") {
            let before = self.expect_op(".")?;
            let member = self.name()?;
            let (prefix, target) = hoist(name);
            name = Expression::FieldAccess(Rc::new(FieldAccess::new(
                prefix,
                Markers::EMPTY,
                target,
                LeftPadded::build(before, member),
            )));
        }
        Ok(name)
    }

    /// The module of a `from` import. Leading dots of a relative import
    /// are kept verbatim: all but the last form the target's name and the
    /// last one is the access dot, so `..pkg.mod` prints as written.
    fn import_module(&mut self) -> PResult<Expression> {
        let prefix = self.space();
        let mut dots: Vec<(String, &str)> = Vec::new();
        while self.at_op(".") {
            let mut gap = String::new();
            self.space().print(&mut gap);
            dots.push((gap, self.bump().text));
        }
        let Some((last_gap, _)) = dots.pop() else {
            return self.dotted_name(prefix);
        };
        let mut leading = String::new();
        for (index, (gap, dot)) in dots.iter().enumerate() {
            if index > 0 {
                leading.push_str(gap);
            }
            leading.push_str(dot);
        }
        if dots.is_empty() {
            // The single dot sits in the target when no module follows.
            if !self.peek().is_name("import") {
                let target = identifier(prefix, "");
                return self.relative_module(target, Space::format(&last_gap));
            }
            return Ok(Expression::Identifier(identifier(prefix, ".")));
        }
        if self.peek().is_name("import") {
            let mut all = leading;
            all.push_str(&last_gap);
            all.push('.');
            return Ok(Expression::Identifier(identifier(prefix, all)));
        }
        let target = identifier(prefix, leading);
        self.relative_module(target, Space::format(&last_gap))
    }

    fn relative_module(&mut self, target: Rc<Identifier>, before: Space) -> PResult<Expression> {
        let first = self.name()?;
        let mut module = Expression::FieldAccess(Rc::new(FieldAccess::new(
            target.prefix.clone(),
            Markers::EMPTY,
            Expression::Identifier(target.with_prefix(Space::EMPTY)),
            LeftPadded::build(before, first),
        )));
        while self.at_op(".") {
            let before = self.expect_op(".")?;
            let member = self.name()?;
            let (prefix, target) = hoist(module);
            module = Expression::FieldAccess(Rc::new(FieldAccess::new(
                prefix,
                Markers::EMPTY,
                target,
                LeftPadded::build(before, member),
            )));
        }
        Ok(module)
    }

    /// `type X = ...` where `type` is the soft keyword.
    fn is_type_alias(&self) -> bool {
        let name = self.peek_nth(1);
        name.kind == TokType::Name
            && !is_keyword(name.text)
            && (self.peek_nth(2).is_op("=") || self.peek_nth(2).is_op("["))
    }

    fn type_alias(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("type")?);
        let name = self.name()?;
        let type_parameters = if self.at_op("[") {
            Some(self.type_parameters()?)
        } else {
            None
        };
        let before = self.expect_op("=")?;
        let value = self.expression()?;
        Ok(Statement::TypeAlias(Rc::new(TypeAlias::new(
            prefix,
            Markers::EMPTY,
            name,
            type_parameters,
            LeftPadded::build(before, value),
        ))))
    }

    /// Assignments, annotated declarations and bare expressions.
    fn expression_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let first = self.assignment_value()?;
        if self.at_op("=") {
            let mut targets = vec![first];
            let mut befores = Vec::new();
            let value = loop {
                befores.push(self.expect_op("=")?);
                let next = self.assignment_value()?;
                if !self.at_op("=") {
                    break next;
                }
                targets.push(next);
            };
            if targets.len() == 1 {
                let (variable, before) = (targets.remove(0), befores.remove(0));
                return Ok(Statement::Assignment(Rc::new(Assignment::new(
                    prefix,
                    Markers::EMPTY,
                    variable,
                    LeftPadded::build(before, value),
                ))));
            }
            let variables = targets
                .into_iter()
                .zip(befores)
                .map(|(target, before)| RightPadded::build(target, before))
                .collect();
            return Ok(Statement::ChainedAssignment(Rc::new(ChainedAssignment::new(
                prefix,
                Markers::EMPTY,
                variables,
                value,
            ))));
        }
        let token = self.peek();
        if token.kind == TokType::Op {
            if let Some(operator) = AssignmentOperator::from_symbol(token.text) {
                let before = self.expect_op(token.text)?;
                let value = self.assignment_value()?;
                return Ok(Statement::AssignmentOp(Rc::new(AssignmentOp::new(
                    prefix,
                    Markers::EMPTY,
                    first,
                    LeftPadded::build(before, operator),
                    value,
                ))));
            }
        }
        if self.at_op(":") {
            return self.annotated_assignment(prefix, first);
        }
        Ok(first.with_prefix(prefix).into_statement())
    }

    fn annotated_assignment(&mut self, prefix: Space, target: Expression) -> PResult<Statement> {
        let before = self.expect_op(":")?;
        let hint = self.type_expression()?;
        let type_hint = Rc::new(TypeHint::new(
            before,
            Markers::EMPTY,
            TypeHintKind::VariableType,
            hint,
        ));
        let initializer = if self.at_op("=") {
            let before = self.expect_op("=")?;
            Some(LeftPadded::build(before, self.assignment_value()?))
        } else {
            None
        };
        if let Expression::Identifier(_) = target {
            let variable = NamedVariable::new(Space::EMPTY, Markers::EMPTY, target, initializer);
            return Ok(Statement::VariableDeclarations(Rc::new(
                VariableDeclarations::new(
                    prefix,
                    Markers::EMPTY,
                    Vec::new(),
                    Some(type_hint),
                    vec![RightPadded::new(Rc::new(variable))],
                ),
            )));
        }
        let hinted = Expression::TypeHintedExpression(Rc::new(TypeHintedExpression::new(
            Space::EMPTY,
            Markers::EMPTY,
            target,
            type_hint,
        )));
        Ok(match initializer {
            Some(initializer) => Statement::Assignment(Rc::new(Assignment::new(
                prefix,
                Markers::EMPTY,
                hinted,
                initializer,
            ))),
            None => hinted.with_prefix(prefix).into_statement(),
        })
    }

    /// The `:` and body of a compound statement.
    pub(super) fn block(&mut self) -> PResult<Rc<Block>> {
        let prefix = self.expect_op(":")?;
        let statements = if self.at_kind(TokType::Newline) {
            self.indented_statements()?
        } else {
            let first = self.space();
            self.simple_statements(first)?
        };
        Ok(Rc::new(Block::new(
            prefix,
            Markers::EMPTY,
            statements,
            Space::EMPTY,
        )))
    }

    fn indented_statements(&mut self) -> PResult<Statements> {
        let mut prefix = self.trivia();
        if self.raw().kind != TokType::Indent {
            return self.unexpected("an indented block");
        }
        self.bump();
        let mut statements = Vec::new();
        loop {
            statements.extend(self.statement(prefix)?);
            if let Some(dedent) = self.dedent_ahead() {
                self.retire(dedent);
                return Ok(statements);
            }
            prefix = self.trivia();
        }
    }

    fn decorated(&mut self, prefix: Space) -> PResult<Statement> {
        let mut decorators = Vec::new();
        let mut next = Space::EMPTY;
        while self.at_op("@") {
            let at = join(next, self.expect_op("@")?);
            let decorator = self.named_expression()?;
            decorators.push(Rc::new(Annotation::new(at, Markers::EMPTY, decorator)));
            if !self.at_line_end() {
                return self.unexpected("end of line after decorator");
            }
            next = self.trivia();
        }
        if self.at_keyword("class") {
            self.class_def(prefix, decorators, next)
        } else {
            self.function_def(prefix, decorators, next)
        }
    }

    fn function_def(
        &mut self,
        prefix: Space,
        decorators: Vec<Rc<Annotation>>,
        keyword_prefix: Space,
    ) -> PResult<Statement> {
        let mut modifiers = Vec::new();
        let mut keyword_prefix = keyword_prefix;
        if self.at_keyword("async") {
            let before = join(keyword_prefix, self.expect_keyword("async")?);
            modifiers.push(Rc::new(Modifier::new(
                before,
                Markers::EMPTY,
                "async".to_string(),
                ModifierKind::Async,
            )));
            keyword_prefix = Space::EMPTY;
        }
        let before = join(keyword_prefix, self.expect_keyword("def")?);
        modifiers.push(Rc::new(Modifier::new(
            before,
            Markers::EMPTY,
            "def".to_string(),
            ModifierKind::Default,
        )));
        let name = self.name()?;
        let type_parameters = if self.at_op("[") {
            Some(self.type_parameters()?)
        } else {
            None
        };
        let parameters = self.container(
            "(",
            ")",
            |p| p.parameter(true),
            |space| Statement::Empty(Rc::new(Empty::new(space, Markers::EMPTY))),
        )?;
        let return_type = if self.at_op("->") {
            let before = self.expect_op("->")?;
            let hint = self.type_expression()?;
            Some(Rc::new(TypeHint::new(
                before,
                Markers::EMPTY,
                TypeHintKind::ReturnType,
                hint,
            )))
        } else {
            None
        };
        let body = self.block()?;
        Ok(Statement::MethodDeclaration(Rc::new(MethodDeclaration::new(
            prefix,
            Markers::EMPTY,
            decorators,
            modifiers,
            name,
            type_parameters,
            parameters,
            return_type,
            body,
        ))))
    }

    /// One parameter of a `def` or `lambda`: a name, `*args`, `**kwargs`,
    /// the bare `*` separator or the `/` marker.
    pub(super) fn parameter(&mut self, annotated: bool) -> PResult<Statement> {
        let prefix = self.space();
        let mut starred = false;
        let name = if self.raw().is_op("/") {
            self.bump();
            Expression::Identifier(identifier(Space::EMPTY, "/"))
        } else if self.raw().is_op("**") || self.raw().is_op("*") {
            let kind = if self.bump().text == "**" {
                SpecialParameterKind::Kwargs
            } else {
                SpecialParameterKind::Args
            };
            starred = true;
            let name = if self.peek().kind == TokType::Name {
                self.name()?
            } else {
                identifier(Space::EMPTY, "")
            };
            Expression::SpecialParameter(Rc::new(SpecialParameter::new(
                Space::EMPTY,
                Markers::EMPTY,
                kind,
                name,
            )))
        } else {
            Expression::Identifier(self.name()?)
        };
        let type_expression = if annotated && self.at_op(":") {
            let before = self.expect_op(":")?;
            let hint = if starred && self.at_op("*") {
                self.star_expression()?
            } else {
                self.type_expression()?
            };
            Some(Rc::new(TypeHint::new(
                before,
                Markers::EMPTY,
                TypeHintKind::VariableType,
                hint,
            )))
        } else {
            None
        };
        let initializer = if self.at_op("=") {
            let before = self.expect_op("=")?;
            Some(LeftPadded::build(before, self.expression()?))
        } else {
            None
        };
        let variable = NamedVariable::new(Space::EMPTY, Markers::EMPTY, name, initializer);
        Ok(Statement::VariableDeclarations(Rc::new(
            VariableDeclarations::new(
                prefix,
                Markers::EMPTY,
                Vec::new(),
                type_expression,
                vec![RightPadded::new(Rc::new(variable))],
            ),
        )))
    }

    pub(super) fn type_parameters(&mut self) -> PResult<Rc<TypeParameters>> {
        let (before, open) = self.open("[")?;
        let parameters = self.delimited(
            "]",
            |p| p.type_parameter(),
            |space| {
                Rc::new(TypeParameter::new(
                    space,
                    Markers::EMPTY,
                    TypeParameterKind::TypeVar,
                    empty_expression(Space::EMPTY),
                    None,
                    None,
                ))
            },
        )?;
        self.close(open, "]")?;
        Ok(Rc::new(TypeParameters::new(
            before,
            Markers::EMPTY,
            parameters,
        )))
    }

    fn type_parameter(&mut self) -> PResult<Rc<TypeParameter>> {
        let prefix = self.space();
        let kind = if self.raw().is_op("**") {
            self.bump();
            TypeParameterKind::ParamSpec
        } else if self.raw().is_op("*") {
            self.bump();
            TypeParameterKind::TypeVarTuple
        } else {
            TypeParameterKind::TypeVar
        };
        let name = Expression::Identifier(self.name()?);
        let bounds = if self.at_op(":") {
            let before = self.expect_op(":")?;
            Some(LeftPadded::build(before, self.expression()?))
        } else {
            None
        };
        let default = if self.at_op("=") {
            let before = self.expect_op("=")?;
            Some(LeftPadded::build(before, self.expression()?))
        } else {
            None
        };
        Ok(Rc::new(TypeParameter::new(
            prefix,
            Markers::EMPTY,
            kind,
            name,
            bounds,
            default,
        )))
    }

    fn class_def(
        &mut self,
        prefix: Space,
        decorators: Vec<Rc<Annotation>>,
        keyword_prefix: Space,
    ) -> PResult<Statement> {
        let before = join(keyword_prefix, self.expect_keyword("class")?);
        let kind = Rc::new(ClassKind::new(before, Markers::EMPTY, ClassType::Class));
        let name = self.name()?;
        let type_parameters = if self.at_op("[") {
            Some(self.type_parameters()?)
        } else {
            None
        };
        let implements = if self.at_op("(") {
            Some(self.container("(", ")", |p| p.argument(), empty_expression)?)
        } else {
            None
        };
        let body = self.block()?;
        Ok(Statement::ClassDeclaration(Rc::new(ClassDeclaration::new(
            prefix,
            Markers::EMPTY,
            decorators,
            kind,
            name,
            type_parameters,
            implements,
            body,
        ))))
    }

    fn if_statement(&mut self, prefix: Space) -> PResult<Rc<If>> {
        let keyword = if self.at_keyword("elif") { "elif" } else { "if" };
        let prefix = join(prefix, self.expect_keyword(keyword)?);
        let condition = self.named_expression()?;
        let condition = Rc::new(ControlParentheses::new(
            Space::EMPTY,
            Markers::EMPTY,
            RightPadded::new(condition),
        ));
        let body = self.block()?;
        let else_part = match self.continuation(&["elif", "else"]) {
            Some("elif") => {
                let before = self.trivia();
                let nested = self.if_statement(Space::EMPTY)?;
                Some(Rc::new(Else::new(
                    before,
                    Markers::EMPTY,
                    RightPadded::new(Statement::If(nested)),
                )))
            }
            Some(_) => {
                let before = join(self.trivia(), self.expect_keyword("else")?);
                let body = self.block()?;
                Some(Rc::new(Else::new(
                    before,
                    Markers::EMPTY,
                    RightPadded::new(Statement::Block(body)),
                )))
            }
            None => None,
        };
        Ok(Rc::new(If::new(
            prefix,
            Markers::EMPTY,
            condition,
            RightPadded::new(Statement::Block(body)),
            else_part,
        )))
    }

    /// Wraps a loop or `try` in its trailing `else:` block, if one follows.
    fn trailing_else(&mut self, prefix: Space, statement: Statement) -> PResult<Statement> {
        if self.continuation(&["else"]).is_none() {
            return Ok(statement.with_prefix(prefix));
        }
        let before = join(self.trivia(), self.expect_keyword("else")?);
        let block = self.block()?;
        Ok(Statement::TrailingElseWrapper(Rc::new(
            TrailingElseWrapper::new(
                prefix,
                Markers::EMPTY,
                statement,
                LeftPadded::build(before, block),
            ),
        )))
    }

    fn while_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("while")?);
        let condition = self.named_expression()?;
        let condition = Rc::new(ControlParentheses::new(
            Space::EMPTY,
            Markers::EMPTY,
            RightPadded::new(condition),
        ));
        let body = self.block()?;
        let loop_ = Statement::WhileLoop(Rc::new(WhileLoop::new(
            Space::EMPTY,
            Markers::EMPTY,
            condition,
            RightPadded::new(Statement::Block(body)),
        )));
        self.trailing_else(prefix, loop_)
    }

    fn for_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("for")?);
        let target = self.target_list()?;
        let before_in = self.expect_keyword("in")?;
        let iterable = self.star_expressions()?;
        let control = Rc::new(ForEachControl::new(
            Space::EMPTY,
            Markers::EMPTY,
            RightPadded::build(target, before_in),
            RightPadded::new(iterable),
        ));
        let body = self.block()?;
        let loop_ = Statement::ForEachLoop(Rc::new(ForEachLoop::new(
            Space::EMPTY,
            Markers::EMPTY,
            control,
            RightPadded::new(Statement::Block(body)),
        )));
        self.trailing_else(prefix, loop_)
    }

    fn try_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("try")?);
        let body = self.block()?;
        let mut catches = Vec::new();
        while self.continuation(&["except"]).is_some() {
            let before = join(self.trivia(), self.expect_keyword("except")?);
            let exception = if self.at_op(":") {
                None
            } else {
                Some(self.exception_type()?)
            };
            let body = self.block()?;
            catches.push(Rc::new(Catch::new(before, Markers::EMPTY, exception, body)));
        }
        // `else` after `except` clauses is part of the try; without any
        // clauses it cannot occur.
        let else_block = if !catches.is_empty() && self.continuation(&["else"]).is_some() {
            let before = join(self.trivia(), self.expect_keyword("else")?);
            Some(LeftPadded::build(before, self.block()?))
        } else {
            None
        };
        let finally = if self.continuation(&["finally"]).is_some() {
            let before = join(self.trivia(), self.expect_keyword("finally")?);
            Some(LeftPadded::build(before, self.block()?))
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            return self.unexpected("'except' or 'finally'");
        }
        Ok(Statement::Try(Rc::new(Try::new(
            prefix,
            Markers::EMPTY,
            None,
            body,
            catches,
            else_block,
            finally,
        ))))
    }

    fn exception_type(&mut self) -> PResult<Rc<ExceptionType>> {
        let (prefix, exception_group) = if self.at_op("*") {
            (self.expect_op("*")?, true)
        } else {
            (Space::EMPTY, false)
        };
        let expression = self.star_expressions()?;
        let alias = if self.at_keyword("as") {
            let before = self.expect_keyword("as")?;
            Some(LeftPadded::build(before, self.name()?))
        } else {
            None
        };
        Ok(Rc::new(ExceptionType::new(
            prefix,
            Markers::EMPTY,
            exception_group,
            expression,
            alias,
        )))
    }

    fn with_statement(&mut self, prefix: Space) -> PResult<Rc<Try>> {
        let prefix = join(prefix, self.expect_keyword("with")?);
        let resources = match self.grouped_with_items() {
            Some(resources) => resources,
            None => {
                let items = self.undelimited(|p| p.with_item(), |p| p.starts_expression())?;
                Container {
                    before: Space::EMPTY,
                    elements: items,
                    markers: Markers::build(vec![Marker::omit_parentheses()]),
                }
            }
        };
        let body = self.block()?;
        Ok(Rc::new(Try::new(
            prefix,
            Markers::EMPTY,
            Some(resources),
            body,
            Vec::new(),
            None,
            None,
        )))
    }

    /// The `with (a as b, c):` form. A parenthesized expression that is
    /// not a list of items, such as `(yield)`, leaves the cursor where it
    /// was and yields `None`.
    fn grouped_with_items(&mut self) -> Option<Container<Rc<Resource>>> {
        if !self.with_items_parenthesized() {
            return None;
        }
        let start = self.pos;
        let grouped = self.container(
            "(",
            ")",
            |p| p.with_item(),
            |space| {
                Rc::new(Resource::new(
                    space,
                    Markers::EMPTY,
                    empty_expression(Space::EMPTY),
                    None,
                ))
            },
        );
        match grouped {
            Ok(resources) => Some(resources),
            Err(_) => {
                self.pos = start;
                None
            }
        }
    }

    /// `with (a as b, c):` groups its items when the closing parenthesis is
    /// directly followed by the `:`.
    fn with_items_parenthesized(&self) -> bool {
        if !self.at_op("(") {
            return false;
        }
        let open = self.significant_from(self.pos);
        let Some(&close) = self.pairs.get(&open) else {
            return false;
        };
        self.tokens[self.significant_from(close + 1)].is_op(":")
    }

    fn with_item(&mut self) -> PResult<Rc<Resource>> {
        let expression = self.expression()?;
        let alias = if self.at_keyword("as") {
            let before = self.expect_keyword("as")?;
            Some(LeftPadded::build(before, self.star_target()?))
        } else {
            None
        };
        Ok(Rc::new(Resource::new(
            Space::EMPTY,
            Markers::EMPTY,
            expression,
            alias,
        )))
    }

    fn async_statement(&mut self, prefix: Space) -> PResult<Statement> {
        if self.peek_nth(1).is_name("def") {
            return self.function_def(prefix, Vec::new(), Space::EMPTY);
        }
        let prefix = join(prefix, self.expect_keyword("async")?);
        let inner_prefix = self.space();
        let statement = if self.at_keyword("for") {
            self.for_statement(inner_prefix)?
        } else {
            Statement::Try(self.with_statement(inner_prefix)?)
        };
        Ok(Statement::Async(Rc::new(Async::new(
            prefix,
            Markers::EMPTY,
            statement,
        ))))
    }

    /// `match` is a soft keyword: the line is a match statement only when a
    /// subject and `:` end it.
    fn is_match_statement(&mut self) -> bool {
        let start = self.pos;
        let result = self.match_header();
        self.pos = start;
        matches!(result, Ok(true))
    }

    fn match_header(&mut self) -> PResult<bool> {
        self.expect_keyword("match")?;
        if self.at_op("=") || self.at_op(".") || self.at_line_end() {
            return Ok(false);
        }
        self.star_named_expressions()?;
        self.expect_op(":")?;
        Ok(self.at_kind(TokType::Newline))
    }

    fn match_statement(&mut self, prefix: Space) -> PResult<Statement> {
        let prefix = join(prefix, self.expect_keyword("match")?);
        let subject = self.star_named_expressions()?;
        let selector = Rc::new(ControlParentheses::new(
            Space::EMPTY,
            Markers::EMPTY,
            RightPadded::new(subject),
        ));
        let colon = self.expect_op(":")?;
        let mut case_prefix = self.trivia();
        if self.raw().kind != TokType::Indent {
            return self.unexpected("an indented block");
        }
        self.bump();
        let mut cases = Vec::new();
        loop {
            let case = self.case_block(case_prefix)?;
            cases.push(RightPadded::new(Statement::Case(case)));
            if let Some(dedent) = self.dedent_ahead() {
                self.retire(dedent);
                break;
            }
            case_prefix = self.trivia();
        }
        let cases = Rc::new(Block::new(colon, Markers::EMPTY, cases, Space::EMPTY));
        Ok(Statement::Switch(Rc::new(Switch::new(
            prefix,
            Markers::EMPTY,
            selector,
            cases,
        ))))
    }

    fn case_block(&mut self, prefix: Space) -> PResult<Rc<Case>> {
        let prefix = join(prefix, self.expect_keyword("case")?);
        let pattern = self.patterns()?;
        let guard = if self.at_keyword("if") {
            let before = self.expect_keyword("if")?;
            Some(LeftPadded::build(before, self.named_expression()?))
        } else {
            None
        };
        let label = Expression::MatchCase(Rc::new(MatchCase::new(
            Space::EMPTY,
            Markers::EMPTY,
            pattern,
            guard,
        )));
        let body = self.block()?;
        Ok(Rc::new(Case::new(prefix, Markers::EMPTY, label, body)))
    }
}
