//! Infers a [`FormatStyle`] from code that is already formatted.
//!
//! Indentation is read from blocks: the difference between a block's first
//! statement and the statement that owns the block is one indentation step.
//! The most common step wins, as does the more common of tabs and spaces
//! and the most common line break. Anything with no evidence keeps its
//! default.

use std::collections::HashMap;
use std::rc::Rc;

use rewrite_python_lst::tree::{Block, Node, SourceFile, Space};
use rewrite_python_lst::visitor::{TreeVisitor, VisitState};

use super::indent_width;
use super::style::{FormatStyle, LineBreak, TabsAndIndentsStyle};

#[derive(Debug, Default)]
pub struct Autodetect {
    state: VisitState,
    steps: HashMap<usize, usize>,
    tab_lines: usize,
    space_lines: usize,
    line_breaks: HashMap<LineBreak, usize>,
}

impl Autodetect {
    pub fn new() -> Self {
        Self::default()
    }

    /// The style of one source file.
    pub fn detect(source: &SourceFile) -> FormatStyle {
        let mut detector = Autodetect::new();
        detector.visit_source_file(source.clone(), &mut ());
        detector.style()
    }

    /// The style seen across everything visited so far.
    pub fn style(&self) -> FormatStyle {
        let defaults = TabsAndIndentsStyle::default();
        let indent_size = most_common(&self.steps).unwrap_or(defaults.indent_size);
        let use_tab_character = self.tab_lines > self.space_lines;
        let tabs_and_indents = TabsAndIndentsStyle {
            use_tab_character,
            tab_size: if use_tab_character { indent_size } else { defaults.tab_size },
            indent_size,
        };
        let mut style = FormatStyle {
            tabs_and_indents,
            ..FormatStyle::default()
        };
        if let Some(line_break) = most_common(&self.line_breaks) {
            style.general.line_break = line_break;
        }
        style
    }

    fn count_line_breaks(&mut self, text: &str) {
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            let line_break = match c {
                '\r' if chars.next_if_eq(&'\n').is_some() => LineBreak::CrLf,
                '\r' => LineBreak::Cr,
                '\n' => LineBreak::Lf,
                _ => continue,
            };
            *self.line_breaks.entry(line_break).or_default() += 1;
        }
    }
}

/// The key seen most often; ties go to the smallest key so the result does
/// not depend on map order.
fn most_common<K: Copy + Ord>(counts: &HashMap<K, usize>) -> Option<K> {
    counts
        .iter()
        .max_by(|(ka, a), (kb, b)| a.cmp(b).then(kb.cmp(ka)))
        .map(|(key, _)| *key)
}

impl<P> TreeVisitor<P> for Autodetect {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_space(&mut self, space: Space, _p: &mut P) -> Space {
        self.count_line_breaks(&space.whitespace);
        for comment in &space.comments {
            self.count_line_breaks(&comment.suffix);
        }
        space
    }

    fn visit_block(&mut self, node: Rc<Block>, p: &mut P) -> Rc<Block> {
        let owner = <Self as TreeVisitor<P>>::cursor(self)
            .parent()
            .and_then(|owner| owner.prefix().indent().map(str::to_string))
            .unwrap_or_default();
        let owner_width = indent_width(&owner, TabsAndIndentsStyle::default().tab_size);
        for padded in &node.statements {
            let Some(indent) = padded.element.prefix().indent() else {
                continue;
            };
            if indent.starts_with('\t') {
                self.tab_lines += 1;
            } else if indent.starts_with(' ') {
                self.space_lines += 1;
            }
        }
        let first = node
            .statements
            .first()
            .and_then(|padded| padded.element.prefix().indent().map(str::to_string));
        if let Some(first) = first {
            let width = indent_width(&first, TabsAndIndentsStyle::default().tab_size);
            if width > owner_width {
                *self.steps.entry(width - owner_width).or_default() += 1;
            }
        }
        node.walk_children(self, p)
    }
}
