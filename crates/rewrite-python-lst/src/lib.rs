// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Lossless semantic trees for Python.
//!
//! This crate turns Python source into an immutable tree that keeps every
//! byte of formatting, and turns the tree back into the same text.
//!
//! # Overview
//!
//! - **Tree**: node kinds, padding, markers and their RPC codecs in [`tree`]
//! - **Parsing**: [`parse_module`] for text, [`parse_path`] for files on disk
//!   with checksum and attributes, [`parse_source`] when a failure should
//!   become a [`ParseError`](tree::ParseError) source file instead
//! - **Printing**: [`print`] and [`print_tree`]
//! - **Traversal**: [`visitor::TreeVisitor`] with a [`visitor::Cursor`]
//!
//! # Quick Start
//!
//! ```
//! use std::rc::Rc;
//! use rewrite_python_lst::tree::SourceFile;
//! use rewrite_python_lst::{parse_module, print};
//!
//! let source = "def hello():\n    print('world')  # greet\n";
//! let unit = parse_module("hello.py", source).unwrap();
//! let printed = print(&SourceFile::CompilationUnit(Rc::new(unit)));
//! assert_eq!(printed, source);
//! ```

pub mod tree;

pub mod parser;
pub mod printer;
pub mod tokenizer;
pub mod visitor;

pub use parser::{parse_module, parse_path, parse_source, prettify_error, ParserError};
pub use printer::{print, print_tree, print_tree_in, print_with, MarkerPrinter};
pub use tree::{Expression, SourceFile, Statement, Tree};
pub use visitor::{Cursor, TreeVisitor};
