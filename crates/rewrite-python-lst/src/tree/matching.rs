// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Structural comparison of trees.
//!
//! Two trees match when they have the same node kinds and the same
//! semantic fields; whitespace, comments, markers and ids are ignored.
//! A [`Matcher`] can intercept any aligned pair of nodes, which is how
//! template placeholders capture subtrees.

use std::rc::Rc;

use crate::tree::markers::Markers;
use crate::tree::padding::{Container, LeftPadded, RightPadded};
use crate::tree::space::Space;
use crate::tree::{Checksum, FileAttributes, Node, Tree};

/// Hooks consulted while matching.
pub trait Matcher {
    /// Called for every aligned pair of nodes before comparing their fields.
    /// Returning `Some` decides the pair without descending.
    fn intercept(&mut self, _pattern: &Tree, _target: &Tree) -> Option<bool> {
        None
    }

    /// Name of the variadic capture `pattern` stands for, if any.
    fn variadic(&self, _pattern: &Tree) -> Option<String> {
        None
    }

    /// Binds a variadic capture to the run of elements it absorbed.
    fn bind_variadic(&mut self, _name: &str, _targets: Vec<Tree>) -> bool {
        false
    }
}

/// A matcher without placeholders: plain structural equality.
#[derive(Debug, Default)]
pub struct StructuralMatcher;

impl Matcher for StructuralMatcher {}

pub trait Match {
    fn matches(&self, other: &Self, m: &mut dyn Matcher) -> bool;

    /// The tree this value stands for when it appears in a list.
    fn as_tree(&self) -> Option<Tree> {
        None
    }
}

/// Whether two trees are structurally equal.
pub fn trees_match(pattern: &Tree, target: &Tree, m: &mut dyn Matcher) -> bool {
    if let Some(decided) = m.intercept(pattern, target) {
        return decided;
    }
    match (pattern, target) {
        (Tree::Literal(a), Tree::Literal(b)) => return a.same_value(b),
        (Tree::Identifier(a), Tree::Identifier(b)) => return a.same_name(b),
        _ => {}
    }
    pattern.match_same_kind(target, m)
}

impl<T: Node> Match for Rc<T> {
    fn matches(&self, other: &Self, m: &mut dyn Matcher) -> bool {
        trees_match(&self.clone().into_tree(), &other.clone().into_tree(), m)
    }

    fn as_tree(&self) -> Option<Tree> {
        Some(self.clone().into_tree())
    }
}

impl<T: Match> Match for Option<T> {
    fn matches(&self, other: &Self, m: &mut dyn Matcher) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.matches(b, m),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Match> Match for Vec<T> {
    fn matches(&self, other: &Self, m: &mut dyn Matcher) -> bool {
        let variadic = self.iter().enumerate().find_map(|(i, element)| {
            element
                .as_tree()
                .and_then(|tree| m.variadic(&tree))
                .map(|name| (i, name))
        });
        let Some((index, name)) = variadic else {
            return self.len() == other.len()
                && self.iter().zip(other).all(|(a, b)| a.matches(b, m));
        };
        let tail = self.len() - index - 1;
        if other.len() < index + tail {
            return false;
        }
        let head_ok = self[..index]
            .iter()
            .zip(&other[..index])
            .all(|(a, b)| a.matches(b, m));
        let tail_ok = self[index + 1..]
            .iter()
            .zip(&other[other.len() - tail..])
            .all(|(a, b)| a.matches(b, m));
        head_ok
            && tail_ok
            && m.bind_variadic(
                &name,
                other[index..other.len() - tail]
                    .iter()
                    .filter_map(Match::as_tree)
                    .collect(),
            )
    }
}

impl<T: Match> Match for RightPadded<T> {
    fn matches(&self, other: &Self, m: &mut dyn Matcher) -> bool {
        self.element.matches(&other.element, m)
    }

    fn as_tree(&self) -> Option<Tree> {
        self.element.as_tree()
    }
}

impl<T: Match> Match for LeftPadded<T> {
    fn matches(&self, other: &Self, m: &mut dyn Matcher) -> bool {
        self.element.matches(&other.element, m)
    }

    fn as_tree(&self) -> Option<Tree> {
        self.element.as_tree()
    }
}

impl<T: Match> Match for Container<T> {
    fn matches(&self, other: &Self, m: &mut dyn Matcher) -> bool {
        self.elements.matches(&other.elements, m)
    }
}

/// Formatting never participates in matching.
macro_rules! match_always {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Match for $ty {
                fn matches(&self, _other: &Self, _m: &mut dyn Matcher) -> bool {
                    true
                }
            }
        )*
    };
}

match_always!(Space, Markers, Checksum, FileAttributes);

macro_rules! match_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Match for $ty {
                fn matches(&self, other: &Self, _m: &mut dyn Matcher) -> bool {
                    self == other
                }
            }
        )*
    };
}

match_by_value!(String, bool);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_module;

    fn first_statement(source: &str) -> Tree {
        let unit = parse_module("m.py", source).unwrap();
        unit.statements[0].element.to_tree()
    }

    #[test]
    fn names_match_by_their_nfkc_form() {
        let written = first_statement("\u{fb01}le = 1\n");
        assert!(trees_match(&first_statement("file = 1\n"), &written, &mut StructuralMatcher));
        assert!(!trees_match(&first_statement("fine = 1\n"), &written, &mut StructuralMatcher));
    }
}
