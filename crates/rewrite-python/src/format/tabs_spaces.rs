//! Rewrites indentation to use only tabs or only spaces.

use rewrite_python_lst::tree::Space;
use rewrite_python_lst::visitor::{TreeVisitor, VisitState};

use super::style::TabsAndIndentsStyle;
use super::{indent_width, indentation, map_indentation, map_whitespace, stage_builders};

#[derive(Debug, Default)]
pub struct NormalizeTabsOrSpaces {
    state: VisitState,
    style: TabsAndIndentsStyle,
}

impl NormalizeTabsOrSpaces {
    pub fn new(style: TabsAndIndentsStyle) -> Self {
        NormalizeTabsOrSpaces {
            state: VisitState::new(),
            style,
        }
    }

    fn normalize(&self, text: &str) -> String {
        let unwanted = if self.style.use_tab_character { ' ' } else { '\t' };
        if !text.contains(unwanted) {
            return text.to_string();
        }
        map_indentation(text, |run, _| {
            if !run.contains(unwanted) {
                return run.to_string();
            }
            indentation(indent_width(run, self.style.tab_size), &self.style)
        })
    }
}

stage_builders!(NormalizeTabsOrSpaces);

impl<P> TreeVisitor<P> for NormalizeTabsOrSpaces {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_space(&mut self, space: Space, _p: &mut P) -> Space {
        map_whitespace(space, |text| self.normalize(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use rewrite_python_lst::tree::SourceFile;
    use rewrite_python_lst::{parse_module, print};

    fn format(source: &str, style: TabsAndIndentsStyle) -> String {
        let unit = SourceFile::CompilationUnit(Rc::new(parse_module("t.py", source).unwrap()));
        let formatted = NormalizeTabsOrSpaces::new(style).visit_source_file(unit, &mut ());
        print(&formatted)
    }

    #[test]
    fn tabs_become_spaces() {
        assert_eq!(
            format("if x:\n\ty = 1\n\tif y:\n\t\tz = 2\n", TabsAndIndentsStyle::default()),
            "if x:\n    y = 1\n    if y:\n        z = 2\n"
        );
    }

    #[test]
    fn spaces_become_tabs() {
        let style = TabsAndIndentsStyle {
            use_tab_character: true,
            ..TabsAndIndentsStyle::default()
        };
        assert_eq!(
            format("def f():\n    return 1\n", style),
            "def f():\n\treturn 1\n"
        );
    }

    #[test]
    fn comment_lines_are_reindented() {
        assert_eq!(
            format("if x:\n\t# note\n\ty = 1\n", TabsAndIndentsStyle::default()),
            "if x:\n    # note\n    y = 1\n"
        );
    }

    #[test]
    fn already_normal_space_is_kept() {
        let space = Space::new("\n    ");
        let mut stage = NormalizeTabsOrSpaces::default();
        let out = TreeVisitor::<()>::visit_space(&mut stage, space.clone(), &mut ());
        assert_eq!(out, space);
    }

    #[test]
    fn string_contents_are_untouched() {
        let source = "s = '''\n\tkeep\n'''\n";
        assert_eq!(format(source, TabsAndIndentsStyle::default()), source);
    }
}
