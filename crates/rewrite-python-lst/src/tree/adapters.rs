// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Adapters that let an expression stand where a statement is expected and
//! the other way round.
//!
//! Neither adapter owns formatting: prefix and markers belong to the wrapped
//! node and are read and replaced through it. On the wire the adapter still
//! sends them in its own slots, and the receiver drops them in favor of the
//! wrapped node's copies.

use std::rc::Rc;

use rewrite_core::error::RpcResult;
use rewrite_core::identity::Identity;
use rewrite_core::rpc::{ReceiveQueue, RpcField, RpcObject, SendQueue};

use crate::tree::matching::{Match, Matcher};
use crate::tree::{random_id, Expression, Family, Markers, Node, Space, Statement, Tree, TreeId};
use crate::visitor::{TreeVisitor, Walk};

/// An expression used as a statement: a call on its own line, a docstring.
#[derive(Clone, Debug)]
pub struct ExpressionStatement {
    pub id: TreeId,
    pub expression: Expression,
}

impl ExpressionStatement {
    pub fn new(expression: Expression) -> Self {
        ExpressionStatement {
            id: random_id(),
            expression,
        }
    }

    pub fn with_expression(self: Rc<Self>, expression: Expression) -> Rc<Self> {
        if self.expression.is_identical(&expression) {
            return self;
        }
        let mut node = Rc::unwrap_or_clone(self);
        node.expression = expression;
        Rc::new(node)
    }
}

/// A statement used as an expression, e.g. a `def` inside a template that
/// expects an expression.
#[derive(Clone, Debug)]
pub struct StatementExpression {
    pub id: TreeId,
    pub statement: Statement,
}

impl StatementExpression {
    pub fn new(statement: Statement) -> Self {
        StatementExpression {
            id: random_id(),
            statement,
        }
    }

    pub fn with_statement(self: Rc<Self>, statement: Statement) -> Rc<Self> {
        if self.statement.is_identical(&statement) {
            return self;
        }
        let mut node = Rc::unwrap_or_clone(self);
        node.statement = statement;
        Rc::new(node)
    }
}

/// Implements [`Node`] and [`RpcObject`] for an adapter that forwards its
/// formatting to one wrapped field.
macro_rules! adapter_node {
    ($name:ident, $wire:literal, $field:ident, $with:ident, $visit:ident) => {
        impl Node for $name {
            const WIRE_TYPE: &'static str = $wire;
            const FAMILY: Family = Family::Python;
            const KIND: &'static str = stringify!($name);

            fn id(&self) -> TreeId {
                self.id
            }

            fn prefix(&self) -> &Space {
                self.$field.prefix()
            }

            fn markers(&self) -> &Markers {
                self.$field.markers()
            }

            fn with_id(self: Rc<Self>, id: TreeId) -> Rc<Self> {
                if self.id == id {
                    return self;
                }
                let mut node = Rc::unwrap_or_clone(self);
                node.id = id;
                Rc::new(node)
            }

            fn with_prefix(self: Rc<Self>, prefix: Space) -> Rc<Self> {
                if self.$field.prefix() == &prefix {
                    return self;
                }
                let inner = self.$field.clone().with_prefix(prefix);
                self.$with(inner)
            }

            fn with_markers(self: Rc<Self>, markers: Markers) -> Rc<Self> {
                if self.$field.markers() == &markers {
                    return self;
                }
                let inner = self.$field.clone().with_markers(markers);
                self.$with(inner)
            }

            fn into_tree(self: Rc<Self>) -> Tree {
                Tree::$name(self)
            }

            fn from_tree(tree: &Tree) -> Option<&Rc<Self>> {
                match tree {
                    Tree::$name(node) => Some(node),
                    _ => None,
                }
            }

            fn accept<P, V: TreeVisitor<P> + ?Sized>(
                self: Rc<Self>,
                v: &mut V,
                p: &mut P,
            ) -> Rc<Self> {
                v.$visit(self, p)
            }

            fn walk_children<P, V: TreeVisitor<P> + ?Sized>(
                self: Rc<Self>,
                v: &mut V,
                p: &mut P,
            ) -> Rc<Self> {
                let inner = Walk::walk(self.$field.clone(), v, p);
                self.$with(inner)
            }

            fn match_fields(&self, other: &Self, m: &mut dyn Matcher) -> bool {
                self.$field.matches(&other.$field, m)
            }
        }

        impl RpcObject for $name {
            const VALUE_TYPE: &'static str = $wire;

            fn object_id(&self) -> String {
                self.id.to_string()
            }

            /// The delegated prefix and markers still occupy their slots so
            /// both sides walk the same field sequence.
            fn send_object(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
                self.id.send_field(before.map(|b| &b.id), q)?;
                self.prefix().send_field(before.map(|b| b.prefix()), q)?;
                self.markers().send_field(before.map(|b| b.markers()), q)?;
                self.$field.send_field(before.map(|b| &b.$field), q)
            }

            fn receive_object(before: Option<&Self>, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
                let id = RpcField::receive_field(before.map(|b| &b.id), q)?;
                let _prefix: Space = RpcField::receive_field(before.map(|b| b.prefix()), q)?;
                let _markers: Markers = RpcField::receive_field(before.map(|b| b.markers()), q)?;
                Ok($name {
                    id,
                    $field: RpcField::receive_field(before.map(|b| &b.$field), q)?,
                })
            }
        }
    };
}

adapter_node!(
    ExpressionStatement,
    "org.openrewrite.python.tree.Py$ExpressionStatement",
    expression,
    with_expression,
    visit_expression_statement
);

adapter_node!(
    StatementExpression,
    "org.openrewrite.python.tree.Py$StatementExpression",
    statement,
    with_statement,
    visit_statement_expression
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Identifier;

    fn name(text: &str) -> Expression {
        Expression::Identifier(Rc::new(Identifier::new(
            Space::new("  "),
            Markers::EMPTY,
            text.to_string(),
        )))
    }

    #[test]
    fn prefix_belongs_to_the_expression() {
        let statement = Rc::new(ExpressionStatement::new(name("call")));
        assert_eq!(statement.prefix().whitespace, "  ");

        let moved = statement.clone().with_prefix(Space::new("\n"));
        assert_eq!(moved.expression.prefix().whitespace, "\n");
        assert_eq!(moved.id, statement.id);
    }

    #[test]
    fn unchanged_prefix_keeps_the_node() {
        let statement = Rc::new(ExpressionStatement::new(name("call")));
        let same = statement.clone().with_prefix(Space::new("  "));
        assert!(Rc::ptr_eq(&statement, &same));
    }
}
