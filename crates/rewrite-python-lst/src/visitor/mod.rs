// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Traversal and rewriting of trees.
//!
//! - [`TreeVisitor`]: one `visit_*` method per node kind, each returning the
//!   node's replacement
//! - [`Walk`]: how fields are traversed; implemented for nodes, padding,
//!   lists and options
//! - [`Cursor`]: the ancestry of the node being visited, with scoped
//!   messages
//!
//! # Traversal Order
//!
//! Depth-first, in print order: a node's prefix, then its markers, then its
//! fields as they appear in source. A visit that changes nothing returns the
//! same `Rc`, so unchanged subtrees are shared between input and output.

pub mod cursor;
mod traits;
mod walk;

pub use cursor::Cursor;
pub use traits::{visit_node, NoopVisitor, Transform, TreeVisitor, VisitState};
pub use walk::Walk;
