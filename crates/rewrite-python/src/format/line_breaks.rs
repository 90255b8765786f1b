//! Converts every line break in the tree's formatting to one style.

use std::borrow::Cow;

use rewrite_python_lst::tree::{Marker, Space};
use rewrite_python_lst::visitor::{TreeVisitor, VisitState};

use super::style::LineBreak;
use super::{map_whitespace, stage_builders};

#[derive(Debug, Default)]
pub struct NormalizeLineBreaks {
    state: VisitState,
    line_break: LineBreak,
}

impl NormalizeLineBreaks {
    pub fn new(line_break: LineBreak) -> Self {
        NormalizeLineBreaks {
            state: VisitState::new(),
            line_break,
        }
    }
}

stage_builders!(NormalizeLineBreaks);

/// `text` with `\r\n`, `\r` and `\n` all replaced by `line_break`.
fn convert(text: &str, line_break: LineBreak) -> Cow<'_, str> {
    if !text.contains(['\r', '\n']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str(line_break.as_str());
            }
            '\n' => out.push_str(line_break.as_str()),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

impl<P> TreeVisitor<P> for NormalizeLineBreaks {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_space(&mut self, space: Space, _p: &mut P) -> Space {
        let line_break = self.line_break;
        map_whitespace(space, |text| convert(text, line_break).into_owned())
    }

    fn visit_marker(&mut self, marker: Marker, p: &mut P) -> Marker {
        match marker {
            Marker::TrailingComma { id, suffix } => Marker::TrailingComma {
                id,
                suffix: self.visit_space(suffix, p),
            },
            other => other,
        }
    }
}
