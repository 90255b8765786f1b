//! Moves a declaration's leading formatting onto the declaration.
//!
//! Recipes that build declarations often leave the indentation on the first
//! decorator, the `def`/`async` modifier or the `class` keyword. The other
//! stages read a statement's layout from its own prefix, so this stage runs
//! first and hoists that space up.

use std::rc::Rc;

use rewrite_python_lst::tree::{ClassDeclaration, MethodDeclaration, Node, Space};
use rewrite_python_lst::visitor::{TreeVisitor, VisitState};

use super::{concat, stage_builders};

#[derive(Debug, Default)]
pub struct NormalizeFormat {
    state: VisitState,
}

impl NormalizeFormat {
    pub fn new() -> Self {
        Self::default()
    }
}

stage_builders!(NormalizeFormat);

/// `prefix` with `moved` appended, and `moved` emptied.
fn hoist<T: Node>(prefix: &Space, first: &Rc<T>) -> Option<(Space, Rc<T>)> {
    if first.prefix().is_empty() {
        return None;
    }
    let joined = concat(prefix, first.prefix());
    Some((joined, first.clone().with_prefix(Space::EMPTY)))
}

impl<P> TreeVisitor<P> for NormalizeFormat {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_method_declaration(
        &mut self,
        node: Rc<MethodDeclaration>,
        p: &mut P,
    ) -> Rc<MethodDeclaration> {
        let node = node.walk_children(self, p);
        if let Some(first) = node.leading_annotations.first() {
            let Some((prefix, first)) = hoist(&node.prefix, first) else {
                return node;
            };
            let mut annotations = node.leading_annotations.clone();
            annotations[0] = first;
            return node.with_leading_annotations(annotations).with_prefix(prefix);
        }
        if let Some(first) = node.modifiers.first() {
            let Some((prefix, first)) = hoist(&node.prefix, first) else {
                return node;
            };
            let mut modifiers = node.modifiers.clone();
            modifiers[0] = first;
            return node.with_modifiers(modifiers).with_prefix(prefix);
        }
        node
    }

    fn visit_class_declaration(
        &mut self,
        node: Rc<ClassDeclaration>,
        p: &mut P,
    ) -> Rc<ClassDeclaration> {
        let node = node.walk_children(self, p);
        if let Some(first) = node.leading_annotations.first() {
            let Some((prefix, first)) = hoist(&node.prefix, first) else {
                return node;
            };
            let mut annotations = node.leading_annotations.clone();
            annotations[0] = first;
            return node.with_leading_annotations(annotations).with_prefix(prefix);
        }
        match hoist(&node.prefix, &node.kind) {
            Some((prefix, kind)) => node.with_kind(kind).with_prefix(prefix),
            None => node,
        }
    }
}
