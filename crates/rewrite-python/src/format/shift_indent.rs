//! Moves every line of a subtree left or right by a fixed number of columns.
//!
//! The template engine parses statement templates inside a wrapper function,
//! so their bodies come back one level deep; shifting by the difference to
//! the insertion point's indentation puts them where they land.

use std::rc::Rc;

use rewrite_python_lst::tree::{CompilationUnit, Node, Space};
use rewrite_python_lst::visitor::{TreeVisitor, VisitState};

use super::style::TabsAndIndentsStyle;
use super::{indent_width, indentation, map_indentation, map_whitespace, stage_builders};

#[derive(Debug, Default)]
pub struct ShiftIndent {
    state: VisitState,
    /// Columns to add; negative values dedent.
    shift: isize,
    style: TabsAndIndentsStyle,
}

impl ShiftIndent {
    pub fn new(shift: isize, style: TabsAndIndentsStyle) -> Self {
        ShiftIndent {
            state: VisitState::new(),
            shift,
            style,
        }
    }

    fn shifted(&self, run: &str, blank: bool) -> String {
        if blank {
            return run.to_string();
        }
        let width = indent_width(run, self.style.tab_size)
            .saturating_add_signed(self.shift);
        indentation(width, &self.style)
    }
}

stage_builders!(ShiftIndent);

impl<P> TreeVisitor<P> for ShiftIndent {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_compilation_unit(
        &mut self,
        node: Rc<CompilationUnit>,
        p: &mut P,
    ) -> Rc<CompilationUnit> {
        // No code follows the end of the file, so nothing there is indented.
        let eof = node.eof.clone();
        node.walk_children(self, p).with_eof(eof)
    }

    fn visit_space(&mut self, space: Space, _p: &mut P) -> Space {
        if self.shift == 0 {
            return space;
        }
        map_whitespace(space, |text| {
            map_indentation(text, |run, blank| self.shifted(run, blank))
        })
    }
}
