//! Strips spaces and tabs at the end of lines.

use std::rc::Rc;

use rewrite_python_lst::tree::{Block, CompilationUnit, Marker, Node, RightPadded, Space, Statement};
use rewrite_python_lst::visitor::{TreeVisitor, VisitState};

use super::{map_whitespace, stage_builders};

#[derive(Debug, Default)]
pub struct RemoveTrailingWhitespace {
    state: VisitState,
}

impl RemoveTrailingWhitespace {
    pub fn new() -> Self {
        Self::default()
    }
}

stage_builders!(RemoveTrailingWhitespace);

fn is_horizontal(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// `text` without the horizontal whitespace that ends each of its lines.
fn strip_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    for c in text.chars() {
        if is_horizontal(c) {
            pending.push(c);
            continue;
        }
        if c != '\n' && c != '\r' {
            out.push_str(&pending);
        }
        pending.clear();
        out.push(c);
    }
    out.push_str(&pending);
    out
}

/// Clears the space after a statement when it is nothing but spaces before
/// the line break that starts the next statement. Returns `None` when no
/// statement changed.
fn strip_after(statements: &[RightPadded<Statement>]) -> Option<Vec<RightPadded<Statement>>> {
    let trailing = |padded: &RightPadded<Statement>| {
        !padded.after.is_empty()
            && padded.after.comments.is_empty()
            && padded.after.whitespace.chars().all(is_horizontal)
            && !padded.markers.has_semicolon()
    };
    if !statements.iter().any(trailing) {
        return None;
    }
    Some(
        statements
            .iter()
            .map(|padded| {
                if trailing(padded) {
                    padded.clone().with_after(Space::EMPTY)
                } else {
                    padded.clone()
                }
            })
            .collect(),
    )
}

impl<P> TreeVisitor<P> for RemoveTrailingWhitespace {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_space(&mut self, space: Space, _p: &mut P) -> Space {
        let mut space = map_whitespace(space, strip_lines);
        // A comment runs to the end of its line.
        if space.comments.iter().any(|c| c.text.ends_with(is_horizontal)) {
            for comment in &mut space.comments {
                let kept = comment.text.trim_end_matches(is_horizontal).len();
                comment.text.truncate(kept);
            }
        }
        space
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

    fn visit_compilation_unit(
        &mut self,
        node: Rc<CompilationUnit>,
        p: &mut P,
    ) -> Rc<CompilationUnit> {
        let node = node.walk_children(self, p);
        match strip_after(&node.statements) {
            Some(statements) => node.with_statements(statements),
            None => node,
        }
    }

    fn visit_block(&mut self, node: Rc<Block>, p: &mut P) -> Rc<Block> {
        let node = node.walk_children(self, p);
        match strip_after(&node.statements) {
            Some(statements) => node.with_statements(statements),
            None => node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewrite_python_lst::tree::SourceFile;
    use rewrite_python_lst::{parse_module, print};

    fn format(source: &str) -> String {
        let unit = SourceFile::CompilationUnit(Rc::new(parse_module("w.py", source).unwrap()));
        let formatted = RemoveTrailingWhitespace::new().visit_source_file(unit, &mut ());
        print(&formatted)
    }

    #[test]
    fn strips_line_ends() {
        assert_eq!(strip_lines("  \n\t\r\n  "), "\n\r\n  ");
        assert_eq!(strip_lines("a  b"), "a  b");
    }

    #[test]
    fn statements_and_comments_lose_trailing_spaces() {
        assert_eq!(
            format("x = 1   \n# note  \ny = 2\t\n"),
            "x = 1\n# note\ny = 2\n"
        );
    }

    #[test]
    fn blank_lines_inside_blocks_are_emptied() {
        assert_eq!(
            format("def f():\n    a = 1\n    \n    b = 2\n"),
            "def f():\n    a = 1\n\n    b = 2\n"
        );
    }

    #[test]
    fn space_before_semicolon_and_comment_is_kept() {
        let source = "a = 1 ; b = 2  # done\n";
        assert_eq!(format(source), source);
    }
}
