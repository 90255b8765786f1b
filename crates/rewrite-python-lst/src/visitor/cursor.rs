// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The path from the root to the node being visited.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::tree::{Node, Tree};

/// One step of the path, with messages scoped to it.
#[derive(Clone)]
pub struct Frame {
    pub tree: Tree,
    messages: HashMap<String, Rc<dyn Any>>,
}

impl Frame {
    fn new(tree: Tree) -> Self {
        Frame {
            tree,
            messages: HashMap::new(),
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("kind", &self.tree.kind())
            .field("messages", &self.messages.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Ancestry of the current node. The last frame is the node itself.
///
/// Visitors use the cursor to ask where they are (the enclosing class, the
/// enclosing block) and to leave messages for later visits in the same
/// subtree.
#[derive(Clone, Debug, Default)]
pub struct Cursor {
    frames: Vec<Frame>,
    root_messages: HashMap<String, Rc<dyn Any>>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cursor positioned at `path`, root first.
    pub fn from_path(path: impl IntoIterator<Item = Tree>) -> Self {
        Cursor {
            frames: path.into_iter().map(Frame::new).collect(),
            root_messages: HashMap::new(),
        }
    }

    pub fn push(&mut self, tree: Tree) {
        self.frames.push(Frame::new(tree));
    }

    pub fn pop(&mut self) -> Option<Tree> {
        self.frames.pop().map(|frame| frame.tree)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_root(&self) -> bool {
        self.frames.len() <= 1
    }

    /// The node being visited.
    pub fn value(&self) -> Option<&Tree> {
        self.frames.last().map(|frame| &frame.tree)
    }

    /// The parent of the node being visited.
    pub fn parent(&self) -> Option<&Tree> {
        self.ancestor(1)
    }

    /// The `n`th ancestor; `0` is the current node.
    pub fn ancestor(&self, n: usize) -> Option<&Tree> {
        let len = self.frames.len();
        (n < len).then(|| &self.frames[len - 1 - n].tree)
    }

    /// Ancestors from the current node up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &Tree> {
        self.frames.iter().rev().map(|frame| &frame.tree)
    }

    /// The nearest strict ancestor of kind `T`.
    pub fn first_enclosing<T: Node>(&self) -> Option<&Rc<T>> {
        self.ancestors().skip(1).find_map(|tree| tree.downcast::<T>())
    }

    /// The nearest strict ancestor satisfying `predicate`.
    pub fn first_enclosing_where(&self, predicate: impl Fn(&Tree) -> bool) -> Option<&Tree> {
        self.ancestors().skip(1).find(|tree| predicate(tree))
    }

    /// Kind names from the root down, e.g.
    /// `CompilationUnit/ClassDeclaration/Block/MethodDeclaration`.
    pub fn path_string(&self) -> String {
        self.frames
            .iter()
            .map(|frame| frame.tree.kind())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Stores a message on the current frame.
    pub fn put_message<T: Any>(&mut self, key: impl Into<String>, value: T) {
        let messages = match self.frames.last_mut() {
            Some(frame) => &mut frame.messages,
            None => &mut self.root_messages,
        };
        messages.insert(key.into(), Rc::new(value));
    }

    /// Stores a message on the nearest enclosing frame of kind `T`, or on the
    /// root when there is none.
    pub fn put_message_on_first_enclosing<T: Node, M: Any>(
        &mut self,
        key: impl Into<String>,
        value: M,
    ) {
        let target = self
            .frames
            .iter_mut()
            .rev()
            .skip(1)
            .find(|frame| frame.tree.is::<T>());
        let messages = match target {
            Some(frame) => &mut frame.messages,
            None => &mut self.root_messages,
        };
        messages.insert(key.into(), Rc::new(value));
    }

    /// A message on the current frame only.
    pub fn get_message<T: Any>(&self, key: &str) -> Option<&T> {
        self.frames
            .last()
            .map(|frame| &frame.messages)
            .unwrap_or(&self.root_messages)
            .get(key)
            .and_then(|value| value.downcast_ref())
    }

    /// The message on the closest frame that has one under `key`.
    pub fn get_nearest_message<T: Any>(&self, key: &str) -> Option<&T> {
        self.frames
            .iter()
            .rev()
            .map(|frame| &frame.messages)
            .chain(std::iter::once(&self.root_messages))
            .find_map(|messages| messages.get(key))
            .and_then(|value| value.downcast_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{empty, identifier, Block, Markers, Space};

    fn block() -> Tree {
        Rc::new(Block::new(Space::EMPTY, Markers::EMPTY, Vec::new(), Space::EMPTY)).into_tree()
    }

    #[test]
    fn path_and_enclosing() {
        let mut cursor = Cursor::new();
        cursor.push(block());
        cursor.push(empty().into_tree());
        cursor.push(identifier(Space::EMPTY, "x").into_tree());

        assert_eq!(cursor.path_string(), "Block/Empty/Identifier");
        assert_eq!(cursor.parent().map(Tree::kind), Some("Empty"));
        assert!(cursor.first_enclosing::<Block>().is_some());
        assert!(cursor.first_enclosing::<crate::tree::Identifier>().is_none());
    }

    #[test]
    fn nearest_message_walks_up() {
        let mut cursor = Cursor::new();
        cursor.push(block());
        cursor.put_message("indent", 4usize);
        cursor.push(empty().into_tree());

        assert_eq!(cursor.get_message::<usize>("indent"), None);
        assert_eq!(cursor.get_nearest_message::<usize>("indent"), Some(&4));

        cursor.put_message_on_first_enclosing::<Block, _>("seen", true);
        cursor.pop();
        assert_eq!(cursor.get_message::<bool>("seen"), Some(&true));
    }
}
