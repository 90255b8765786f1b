//! Replacing placeholders with captured subtrees.
//!
//! A replacement takes over the prefix of the placeholder it replaces, so
//! the template's own layout around each hole is kept.

use std::rc::Rc;

use rewrite_python_lst::tree::{
    empty, CollectionLiteral, Expression, Identifier, MethodInvocation, Node, RightPadded,
    Statement, Tree,
};
use rewrite_python_lst::visitor::{Transform, TreeVisitor, VisitState};

use super::capture::{Bound, Captured};
use super::code::placeholder_of;
use crate::error::TemplateError;

pub(crate) struct Substitute<'a> {
    state: VisitState,
    values: &'a Captured,
    pub(crate) error: Option<TemplateError>,
}

impl<'a> Substitute<'a> {
    pub(crate) fn new(values: &'a Captured) -> Self {
        Substitute {
            state: VisitState::new(),
            values,
            error: None,
        }
    }

    fn lookup(&mut self, name: &str) -> Option<&'a Bound> {
        let found = self.values.bound(name);
        if found.is_none() && self.error.is_none() {
            self.error = Some(TemplateError::MissingValue(name.to_string()));
        }
        found
    }

    fn shape_error(&mut self, name: &str, expected: &str, found: &Tree) {
        if self.error.is_none() {
            self.error = Some(TemplateError::UnexpectedShape {
                expected: format!("{expected} for {{{name}}}"),
                found: found.kind().to_string(),
            });
        }
    }

    /// Expands variadic placeholders in a list of elements. Returns `None`
    /// when the list holds none.
    fn expand(
        &mut self,
        elements: &[RightPadded<Expression>],
    ) -> Option<Vec<RightPadded<Expression>>> {
        let values = self.values;
        let is_variadic = |padded: &RightPadded<Expression>| {
            placeholder_of(&padded.element.to_tree())
                .and_then(|name| values.bound(name))
                .is_some_and(|bound| matches!(bound, Bound::Many(_)))
        };
        if !elements.iter().any(is_variadic) {
            return None;
        }
        let mut out = Vec::with_capacity(elements.len());
        for padded in elements {
            let tree = padded.element.to_tree();
            let run = match placeholder_of(&tree).and_then(|name| values.bound(name)) {
                Some(Bound::Many(run)) => run,
                _ => {
                    out.push(padded.clone());
                    continue;
                }
            };
            let last = run.len().saturating_sub(1);
            for (i, tree) in run.iter().enumerate() {
                let expression = match tree.as_expression() {
                    Some(expression) => expression,
                    None => match tree.as_statement() {
                        Some(statement) => statement.into_expression(),
                        None => {
                            self.shape_error("a list element", "an expression", tree);
                            continue;
                        }
                    },
                };
                let expression = if i == 0 {
                    expression.with_prefix(padded.element.prefix().clone())
                } else {
                    expression
                };
                out.push(if i == last {
                    padded.clone().with_element(expression)
                } else {
                    RightPadded::new(expression)
                });
            }
        }
        if out.is_empty() {
            out.push(RightPadded::new(Expression::Empty(empty())));
        }
        Some(out)
    }
}

impl<P> TreeVisitor<P> for Substitute<'_> {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_expression(&mut self, expression: Expression, p: &mut P) -> Expression {
        let Expression::Identifier(identifier) = &expression else {
            return expression.accept_variant(self, p);
        };
        let Some(name) = placeholder_of(&expression.to_tree()).map(str::to_string) else {
            return expression.accept_variant(self, p);
        };
        let prefix = identifier.prefix.clone();
        match self.lookup(&name) {
            Some(Bound::One(tree)) => match tree.as_expression() {
                Some(value) => value.with_prefix(prefix),
                None => match tree.as_statement() {
                    Some(statement) => statement.into_expression().with_prefix(prefix),
                    None => {
                        self.shape_error(&name, "an expression", tree);
                        expression
                    }
                },
            },
            // Runs are spliced by the list that holds them.
            _ => expression,
        }
    }

    fn visit_statement(&mut self, statement: Statement, p: &mut P) -> Statement {
        let Some(name) = placeholder_of(&statement.to_tree()).map(str::to_string) else {
            return statement.accept_variant(self, p);
        };
        let prefix = statement.prefix().clone();
        match self.lookup(&name) {
            Some(Bound::One(tree)) => match tree.as_statement() {
                Some(value) => value.with_prefix(prefix),
                None => match tree.as_expression() {
                    Some(expression) => expression.into_statement().with_prefix(prefix),
                    None => {
                        self.shape_error(&name, "a statement", tree);
                        statement
                    }
                },
            },
            _ => statement,
        }
    }

    fn visit_statement_in_list(&mut self, statement: Statement, p: &mut P) -> Transform<Statement> {
        let values = self.values;
        let run = placeholder_of(&statement.to_tree()).and_then(|name| match values.bound(name) {
            Some(Bound::Many(run)) => Some(run),
            _ => None,
        });
        let Some(run) = run else {
            return Transform::Keep(self.visit_statement(statement, p));
        };
        let mut statements = Vec::with_capacity(run.len());
        for (i, tree) in run.iter().enumerate() {
            let value = match tree.as_statement() {
                Some(value) => value,
                None => match tree.as_expression() {
                    Some(expression) => expression.into_statement(),
                    None => {
                        self.shape_error("a statement list", "a statement", tree);
                        continue;
                    }
                },
            };
            statements.push(if i == 0 {
                value.with_prefix(statement.prefix().clone())
            } else {
                value
            });
        }
        Transform::Flatten(statements)
    }

    fn visit_identifier(&mut self, node: Rc<Identifier>, _p: &mut P) -> Rc<Identifier> {
        let Some(name) = placeholder_of(&node.clone().into_tree()).map(str::to_string) else {
            return node;
        };
        match self.lookup(&name) {
            Some(Bound::One(Tree::Identifier(value))) => {
                value.clone().with_prefix(node.prefix.clone())
            }
            Some(Bound::One(tree)) => {
                self.shape_error(&name, "a name", tree);
                node
            }
            _ => node,
        }
    }

    fn visit_method_invocation(
        &mut self,
        node: Rc<MethodInvocation>,
        p: &mut P,
    ) -> Rc<MethodInvocation> {
        let node = node.walk_children(self, p);
        match self.expand(&node.arguments.elements) {
            Some(elements) => {
                let arguments = node.arguments.clone().with_elements(elements);
                node.with_arguments(arguments)
            }
            None => node,
        }
    }

    fn visit_collection_literal(
        &mut self,
        node: Rc<CollectionLiteral>,
        p: &mut P,
    ) -> Rc<CollectionLiteral> {
        let node = node.walk_children(self, p);
        match self.expand(&node.elements.elements) {
            Some(elements) => {
                let container = node.elements.clone().with_elements(elements);
                node.with_elements(container)
            }
            None => node,
        }
    }
}
