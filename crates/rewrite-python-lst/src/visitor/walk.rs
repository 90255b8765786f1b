// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! How each kind of field is traversed.
//!
//! Node structs walk their fields with [`Walk::walk`]; the impls here route
//! nodes to the visitor, recurse through padding and lists, and leave plain
//! values alone.

use std::rc::Rc;

use crate::tree::{
    Checksum, Container, Expression, FileAttributes, LeftPadded, Markers, Node, RightPadded,
    SourceFile, Space, Statement, Tree,
};
use crate::visitor::traits::{visit_node, Transform, TreeVisitor};

pub trait Walk: Sized {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self;

    /// Walks an element held in a list, which may remove or multiply it.
    fn walk_in_list<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Transform<Self> {
        Transform::Keep(self.walk(v, p))
    }
}

impl<T: Node> Walk for Rc<T> {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        visit_node(v, self, p)
    }
}

impl<T: Walk> Walk for Option<T> {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        self.map(|value| value.walk(v, p))
    }
}

impl<T: Walk> Walk for Vec<T> {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        let mut out = Vec::with_capacity(self.len());
        for element in self {
            match element.walk_in_list(v, p) {
                Transform::Keep(element) => out.push(element),
                Transform::Remove => {}
                Transform::Flatten(elements) => out.extend(elements),
            }
        }
        out
    }
}

impl<T: Walk> Walk for RightPadded<T> {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        let element = self.element.walk(v, p);
        let after = v.visit_right_padding(self.after, p);
        let markers = v.visit_markers(self.markers, p);
        RightPadded {
            element,
            after,
            markers,
        }
    }

    /// The first element of a flattened replacement keeps the original
    /// padding; the others start with none.
    fn walk_in_list<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Transform<Self> {
        let RightPadded {
            element,
            after,
            markers,
        } = self;
        match element.walk_in_list(v, p) {
            Transform::Keep(element) => Transform::Keep(RightPadded {
                element,
                after: v.visit_right_padding(after, p),
                markers: v.visit_markers(markers, p),
            }),
            Transform::Remove => Transform::Remove,
            Transform::Flatten(elements) => {
                let mut padded = Vec::with_capacity(elements.len());
                let mut original = Some((after, markers));
                for element in elements {
                    padded.push(match original.take() {
                        Some((after, markers)) => RightPadded {
                            element,
                            after,
                            markers,
                        },
                        None => RightPadded::new(element),
                    });
                }
                Transform::Flatten(padded)
            }
        }
    }
}

impl<T: Walk> Walk for LeftPadded<T> {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        let before = v.visit_left_padding(self.before, p);
        let element = self.element.walk(v, p);
        let markers = v.visit_markers(self.markers, p);
        LeftPadded {
            before,
            element,
            markers,
        }
    }
}

impl<T: Walk> Walk for Container<T> {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        let before = v.visit_container_padding(self.before, p);
        let elements = self.elements.walk(v, p);
        let markers = v.visit_markers(self.markers, p);
        Container {
            before,
            elements,
            markers,
        }
    }
}

impl Walk for Space {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        v.visit_space(self, p)
    }
}

impl Walk for Markers {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        v.visit_markers(self, p)
    }
}

impl Walk for Expression {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        v.visit_expression(self, p)
    }
}

impl Walk for Statement {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        v.visit_statement(self, p)
    }

    fn walk_in_list<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Transform<Self> {
        if v.state().is_stopped() {
            return Transform::Keep(self);
        }
        v.visit_statement_in_list(self, p)
    }
}

impl Walk for SourceFile {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        v.visit_source_file(self, p)
    }
}

impl Walk for Tree {
    fn walk<P, V: TreeVisitor<P> + ?Sized>(self, v: &mut V, p: &mut P) -> Self {
        v.visit(self, p)
    }
}

macro_rules! walk_opaque {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Walk for $ty {
                fn walk<P, V: TreeVisitor<P> + ?Sized>(self, _v: &mut V, _p: &mut P) -> Self {
                    self
                }
            }
        )*
    };
}

walk_opaque!(String, bool, Checksum, FileAttributes);
