//! Auto-formatting.
//!
//! The pipeline runs six visitors in order:
//!
//! 1. [`NormalizeFormat`]: moves formatting from a declaration's first
//!    decorator or keyword onto the declaration itself
//! 2. [`MinimumViableSpacing`]: line breaks between statements, spaces
//!    after keywords
//! 3. [`BlankLines`]: minimum and maximum blank lines
//! 4. [`NormalizeTabsOrSpaces`]: indentation characters
//! 5. [`NormalizeLineBreaks`]: one line break style everywhere
//! 6. [`RemoveTrailingWhitespace`]
//!
//! Every stage only touches [`Space`]s and markers; string contents and
//! comment text are left alone. Each stage can be scoped to a cursor and
//! told to stop after a node, which is how a template result is formatted
//! in place without reformatting the rest of its file.

mod autodetect;
mod blank_lines;
mod line_breaks;
mod minimum_viable_spacing;
mod normalize_format;
mod shift_indent;
pub mod style;
mod tabs_spaces;
mod trailing_whitespace;

pub use autodetect::Autodetect;
pub use blank_lines::BlankLines;
pub use line_breaks::NormalizeLineBreaks;
pub use minimum_viable_spacing::MinimumViableSpacing;
pub use normalize_format::NormalizeFormat;
pub use shift_indent::ShiftIndent;
pub use style::{BlankLinesStyle, FormatStyle, GeneralFormatStyle, LineBreak, TabsAndIndentsStyle};
pub use tabs_spaces::NormalizeTabsOrSpaces;
pub use trailing_whitespace::RemoveTrailingWhitespace;

use rewrite_python_lst::tree::{SourceFile, Space, Tree, TreeId};
use rewrite_python_lst::visitor::{Cursor, TreeVisitor};

/// Adds `scoped` and `stop_after` builders to a stage.
macro_rules! stage_builders {
    ($stage:ty) => {
        impl $stage {
            /// Runs the stage as if the visited tree sat under `cursor`.
            pub fn scoped(mut self, cursor: rewrite_python_lst::visitor::Cursor) -> Self {
                self.state = rewrite_python_lst::visitor::VisitState::with_cursor(cursor);
                self
            }

            /// Stops the traversal once the node with `id` has been visited.
            pub fn stop_after(mut self, id: Option<rewrite_python_lst::tree::TreeId>) -> Self {
                if let Some(id) = id {
                    self.state.stop_after(id);
                }
                self
            }
        }
    };
}
pub(crate) use stage_builders;

/// Formats a whole source file.
pub fn auto_format(source: SourceFile, style: &FormatStyle, stop_after: Option<TreeId>) -> SourceFile {
    let mut p = ();
    let source = NormalizeFormat::new()
        .stop_after(stop_after)
        .visit_source_file(source, &mut p);
    let source = MinimumViableSpacing::new(style.tabs_and_indents.clone())
        .stop_after(stop_after)
        .visit_source_file(source, &mut p);
    let source = BlankLines::new(style.blank_lines.clone())
        .stop_after(stop_after)
        .visit_source_file(source, &mut p);
    let source = NormalizeTabsOrSpaces::new(style.tabs_and_indents.clone())
        .stop_after(stop_after)
        .visit_source_file(source, &mut p);
    let source = NormalizeLineBreaks::new(style.general.line_break)
        .stop_after(stop_after)
        .visit_source_file(source, &mut p);
    RemoveTrailingWhitespace::new()
        .stop_after(stop_after)
        .visit_source_file(source, &mut p)
}

/// Formats a subtree that sits under `cursor`.
pub fn auto_format_tree(tree: Tree, style: &FormatStyle, cursor: &Cursor) -> Tree {
    let mut p = ();
    let tree = NormalizeFormat::new()
        .scoped(cursor.clone())
        .visit(tree, &mut p);
    let tree = MinimumViableSpacing::new(style.tabs_and_indents.clone())
        .scoped(cursor.clone())
        .visit(tree, &mut p);
    let tree = BlankLines::new(style.blank_lines.clone())
        .scoped(cursor.clone())
        .visit(tree, &mut p);
    let tree = NormalizeTabsOrSpaces::new(style.tabs_and_indents.clone())
        .scoped(cursor.clone())
        .visit(tree, &mut p);
    let tree = NormalizeLineBreaks::new(style.general.line_break)
        .scoped(cursor.clone())
        .visit(tree, &mut p);
    RemoveTrailingWhitespace::new()
        .scoped(cursor.clone())
        .visit(tree, &mut p)
}

// ============================================================================
// Space helpers shared by the stages
// ============================================================================

/// `first` followed by `second`, as one space.
pub(crate) fn concat(first: &Space, second: &Space) -> Space {
    if second.is_empty() {
        return first.clone();
    }
    if first.is_empty() {
        return second.clone();
    }
    let mut text = first.to_string();
    second.print(&mut text);
    Space::format(&text)
}

/// Applies `f` to the whitespace and every comment suffix of `space`,
/// returning the input unchanged when `f` changed nothing.
pub(crate) fn map_whitespace(space: Space, mut f: impl FnMut(&str) -> String) -> Space {
    let whitespace = f(&space.whitespace);
    let suffixes: Vec<String> = space.comments.iter().map(|c| f(&c.suffix)).collect();
    let unchanged = whitespace == space.whitespace
        && suffixes.iter().zip(&space.comments).all(|(s, c)| *s == c.suffix);
    if unchanged {
        return space;
    }
    let comments = space
        .comments
        .into_iter()
        .zip(suffixes)
        .map(|(comment, suffix)| comment.with_suffix(suffix))
        .collect();
    Space::build(whitespace, comments)
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Rewrites the indentation run that follows every line break in `text`.
/// `f` receives the run and whether the line it starts is blank.
pub(crate) fn map_indentation(text: &str, mut f: impl FnMut(&str, bool) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(is_line_break) {
        out.push_str(&rest[..=pos]);
        rest = &rest[pos + 1..];
        let run = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        let blank = rest[run..].starts_with(is_line_break);
        out.push_str(&f(&rest[..run], blank));
        rest = &rest[run..];
    }
    out.push_str(rest);
    out
}

/// Column width of an indentation run.
pub(crate) fn indent_width(run: &str, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    run.chars().fold(0, |column, c| match c {
        '\t' => column + tab_size - column % tab_size,
        _ => column + 1,
    })
}

/// The indentation run for `width` columns in `style`.
pub(crate) fn indentation(width: usize, style: &TabsAndIndentsStyle) -> String {
    if style.use_tab_character {
        let tab_size = style.tab_size.max(1);
        "\t".repeat(width / tab_size) + &" ".repeat(width % tab_size)
    } else {
        " ".repeat(width)
    }
}

/// The line break `text` already uses, if any.
pub(crate) fn line_break_in(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else if text.contains('\n') || !text.contains('\r') {
        "\n"
    } else {
        "\r"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewrite_python_lst::tree::Comment;

    #[test]
    fn concat_keeps_comments_in_order() {
        let first = Space::build("\n", vec![Comment::new(" a", "\n")]);
        let joined = concat(&first, &Space::new("  "));
        assert_eq!(joined.to_string(), "\n# a\n  ");
        assert_eq!(concat(&Space::EMPTY, &first), first);
    }

    #[test]
    fn indentation_runs_follow_line_breaks() {
        let seen = std::cell::RefCell::new(Vec::new());
        let out = map_indentation("x\n  \n\ty\r\n", |run, blank| {
            seen.borrow_mut().push((run.to_string(), blank));
            run.to_uppercase()
        });
        assert_eq!(out, "x\n  \n\ty\r\n");
        assert_eq!(
            seen.into_inner(),
            vec![
                ("  ".to_string(), true),
                ("\t".to_string(), false),
                (String::new(), true),
                (String::new(), false),
            ]
        );
    }

    #[test]
    fn widths_and_runs() {
        assert_eq!(indent_width("\t  ", 4), 6);
        assert_eq!(indent_width("  \t", 4), 4);
        let tabs = TabsAndIndentsStyle {
            use_tab_character: true,
            ..TabsAndIndentsStyle::default()
        };
        assert_eq!(indentation(6, &tabs), "\t  ");
        assert_eq!(indentation(6, &TabsAndIndentsStyle::default()), "      ");
    }

    #[test]
    fn detects_existing_line_break() {
        assert_eq!(line_break_in("a\r\nb"), "\r\n");
        assert_eq!(line_break_in("a\rb"), "\r");
        assert_eq!(line_break_in("   "), "\n");
    }
}
