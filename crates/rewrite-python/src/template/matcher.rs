//! Structural matching with placeholder capture.

use std::collections::HashMap;

use rewrite_core::identity::Identity;
use rewrite_python_lst::tree::matching::Matcher;
use rewrite_python_lst::tree::Tree;

use super::capture::{Bound, Capture, Captured};
use super::code::placeholder_of;

/// Binds placeholders to the target subtrees aligned with them.
pub(crate) struct CaptureMatcher<'a> {
    captures: &'a HashMap<String, Capture>,
    pub(crate) captured: Captured,
}

impl<'a> CaptureMatcher<'a> {
    pub(crate) fn new(captures: &'a HashMap<String, Capture>) -> Self {
        CaptureMatcher {
            captures,
            captured: Captured::new(),
        }
    }

    /// Whether every non-variadic capture was bound.
    pub(crate) fn is_complete(&self) -> bool {
        self.captures
            .values()
            .all(|capture| capture.is_variadic() || self.captured.contains(capture.name()))
    }

    fn bind_one(&mut self, capture: &Capture, target: &Tree) -> bool {
        if let Some(bound) = self.captured.bound(capture.name()) {
            // A capture used twice only matches the very same node twice.
            return match bound {
                Bound::One(first) => first.is_identical(target),
                Bound::Many(_) => false,
            };
        }
        if !capture.accepts(target) {
            return false;
        }
        self.captured.bind(capture.name(), Bound::One(target.clone()));
        true
    }
}

impl Matcher for CaptureMatcher<'_> {
    fn intercept(&mut self, pattern: &Tree, target: &Tree) -> Option<bool> {
        let name = placeholder_of(pattern)?;
        let Some(capture) = self.captures.get(name) else {
            return Some(false);
        };
        if capture.is_variadic() {
            return Some(self.bind_variadic(name, vec![target.clone()]));
        }
        Some(self.bind_one(capture, target))
    }

    fn variadic(&self, pattern: &Tree) -> Option<String> {
        let name = placeholder_of(pattern)?;
        self.captures
            .get(name)
            .filter(|capture| capture.is_variadic())
            .map(|capture| capture.name().to_string())
    }

    fn bind_variadic(&mut self, name: &str, targets: Vec<Tree>) -> bool {
        let Some(capture) = self.captures.get(name) else {
            return false;
        };
        // An empty argument list holds a single `Empty` element.
        let targets: Vec<Tree> = targets
            .into_iter()
            .filter(|tree| !matches!(tree, Tree::Empty(_)))
            .collect();
        if !capture.accepts_count(targets.len()) || !targets.iter().all(|t| capture.accepts(t)) {
            return false;
        }
        if let Some(bound) = self.captured.bound(name) {
            let same = match bound {
                Bound::Many(first) => {
                    first.len() == targets.len()
                        && first.iter().zip(&targets).all(|(a, b)| a.is_identical(b))
                }
                Bound::One(_) => false,
            };
            return same;
        }
        self.captured.bind(name, Bound::Many(targets));
        true
    }
}
