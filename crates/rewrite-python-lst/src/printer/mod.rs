// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Printing trees back to source text.
//!
//! The printer walks a tree depth-first and emits, for every node, its
//! prefix, any marker text that precedes its syntax, the syntax itself and
//! any marker text that follows. Whitespace is only ever emitted from a
//! [`Space`]; the printer never invents formatting, so printing a parsed
//! tree reproduces the input byte for byte.
//!
//! Node kinds are split between two routines by [`Family`]: [`shared`]
//! prints the kinds shared with other languages and [`python`] the Python
//! ones. Both work on the same [`Printer`], which pushes the cursor once per
//! node before handing it to the routine that owns the kind.

mod python;
mod shared;

#[cfg(test)]
mod tests;

use std::rc::Rc;

use crate::tree::{
    Container, Expression, Family, Marker, Markers, Node, RightPadded, SourceFile, Space,
    Statement, Tree,
};
use crate::visitor::Cursor;

/// How markers added by recipes show up in printed output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerPrinter {
    /// Search results print as `/*~~>*/` or `/*~~(description)~~>*/` in
    /// front of the marked node.
    #[default]
    Default,
    /// Each search result fences its node with `{{id}}` on both sides.
    Fenced,
    /// Only source text; recipe markers print nothing.
    Sanitized,
}

/// Prints a source file.
pub fn print(source: &SourceFile) -> String {
    print_with(source, MarkerPrinter::Default)
}

pub fn print_with(source: &SourceFile, markers: MarkerPrinter) -> String {
    let mut printer = Printer::new(markers);
    printer.visit(source.to_tree());
    printer.finish()
}

/// Prints any node, e.g. a template result that is not yet part of a file.
pub fn print_tree(tree: &Tree) -> String {
    print_tree_in(tree, Cursor::new())
}

/// Prints a node as it would print at the position `cursor` points to.
/// Context matters for a few kinds: an assignment prints `=` directly in a
/// block and `:=` anywhere else.
pub fn print_tree_in(tree: &Tree, cursor: Cursor) -> String {
    let mut printer = Printer::new(MarkerPrinter::Sanitized);
    printer.cursor = cursor;
    printer.visit(tree.clone());
    printer.finish()
}

/// Output buffer and cursor shared by both printing routines.
pub(crate) struct Printer {
    out: String,
    cursor: Cursor,
    markers: MarkerPrinter,
}

impl Printer {
    fn new(markers: MarkerPrinter) -> Self {
        Printer {
            out: String::new(),
            cursor: Cursor::new(),
            markers,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    /// Prints one node: the cursor moves onto it and the routine of its
    /// family prints it.
    pub(crate) fn visit(&mut self, tree: Tree) {
        self.cursor.push(tree.clone());
        match tree.family() {
            Family::Shared => shared::print(self, &tree),
            Family::Python => python::print(self, &tree),
        }
        self.cursor.pop();
    }

    pub(crate) fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub(crate) fn word(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub(crate) fn space(&mut self, space: &Space) {
        space.print(&mut self.out);
    }

    /// The node's prefix and whatever its markers print before its syntax.
    pub(crate) fn before_syntax(&mut self, prefix: &Space, markers: &Markers) {
        self.space(prefix);
        for marker in markers.iter() {
            let Marker::SearchResult { id, description } = marker else {
                continue;
            };
            match self.markers {
                MarkerPrinter::Default => match description {
                    Some(description) => {
                        self.out.push_str("/*~~(");
                        self.out.push_str(description);
                        self.out.push_str(")~~>*/");
                    }
                    None => self.out.push_str("/*~~>*/"),
                },
                MarkerPrinter::Fenced => {
                    self.out.push_str("{{");
                    self.out.push_str(&id.to_string());
                    self.out.push_str("}}");
                }
                MarkerPrinter::Sanitized => {}
            }
        }
    }

    pub(crate) fn after_syntax(&mut self, markers: &Markers) {
        if self.markers != MarkerPrinter::Fenced {
            return;
        }
        for marker in markers.iter() {
            if let Marker::SearchResult { id, .. } = marker {
                self.out.push_str("{{");
                self.out.push_str(&id.to_string());
                self.out.push_str("}}");
            }
        }
    }

    pub(crate) fn print<T: Print>(&mut self, value: &T) {
        value.print(self);
    }

    pub(crate) fn print_opt<T: Print>(&mut self, value: &Option<T>) {
        if let Some(value) = value {
            value.print(self);
        }
    }

    /// Elements joined by `separator`, each followed by its `after`. A
    /// trailing comma prints after the last element, then its suffix.
    pub(crate) fn padded_list<T: Print>(&mut self, elements: &[RightPadded<T>], separator: &str) {
        let last = elements.len().saturating_sub(1);
        for (index, padded) in elements.iter().enumerate() {
            padded.element.print(self);
            self.space(&padded.after);
            if index < last {
                self.word(separator);
            } else if let Some(suffix) = padded.markers.trailing_comma() {
                self.word(",");
                self.space(suffix);
            }
        }
    }

    /// A comma-separated container between `open` and `close`, which an
    /// `OmitParentheses` marker suppresses.
    pub(crate) fn container<T: Print>(&mut self, container: &Container<T>, open: &str, close: &str) {
        let delimited = !container.markers.has_omit_parentheses();
        self.space(&container.before);
        if delimited {
            self.word(open);
        }
        self.padded_list(&container.elements, ",");
        if delimited {
            self.word(close);
        }
    }

    /// Statements of a block or file, each followed by its `after` and
    /// `;` when it had one.
    pub(crate) fn statements(&mut self, statements: &[RightPadded<Statement>]) {
        for padded in statements {
            self.print(&padded.element);
            self.space(&padded.after);
            if padded.markers.has_semicolon() {
                self.word(";");
            }
        }
    }
}

/// Anything the printer can descend into.
pub(crate) trait Print {
    fn print(&self, p: &mut Printer);
}

impl<T: Node> Print for Rc<T> {
    fn print(&self, p: &mut Printer) {
        p.visit(self.clone().into_tree());
    }
}

impl Print for Expression {
    fn print(&self, p: &mut Printer) {
        p.visit(self.to_tree());
    }
}

impl Print for Statement {
    fn print(&self, p: &mut Printer) {
        p.visit(self.to_tree());
    }
}
