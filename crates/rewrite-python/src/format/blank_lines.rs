//! Enforces blank line minimums around definitions and imports and caps
//! runs of blank lines.
//!
//! Only the whitespace before a statement's first comment is adjusted, so a
//! comment stays attached to the statement it precedes.

use std::rc::Rc;

use rewrite_python_lst::tree::{Block, CompilationUnit, Node, RightPadded, Space, Statement, Tree};
use rewrite_python_lst::visitor::{TreeVisitor, VisitState};

use super::style::BlankLinesStyle;
use super::{line_break_in, stage_builders};

#[derive(Debug, Default)]
pub struct BlankLines {
    state: VisitState,
    style: BlankLinesStyle,
}

impl BlankLines {
    pub fn new(style: BlankLinesStyle) -> Self {
        BlankLines {
            state: VisitState::new(),
            style,
        }
    }
}

stage_builders!(BlankLines);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Module,
    Class,
    Code,
}

fn is_definition(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::MethodDeclaration(_) | Statement::ClassDeclaration(_)
    )
}

fn is_function(statement: &Statement) -> bool {
    matches!(statement, Statement::MethodDeclaration(_))
}

fn is_import(statement: &Statement) -> bool {
    matches!(statement, Statement::MultiImport(_))
}

/// Blank lines in the whitespace before the first comment of `prefix`.
fn blank_lines(prefix: &Space) -> usize {
    prefix.whitespace.matches('\n').count().saturating_sub(1)
}

fn with_blank_lines(prefix: &Space, count: usize) -> Space {
    let whitespace = &prefix.whitespace;
    let indent = whitespace
        .rfind('\n')
        .map(|i| &whitespace[i + 1..])
        .unwrap_or_default();
    let line_break = line_break_in(whitespace);
    prefix
        .clone()
        .with_whitespace(line_break.repeat(count + 1) + indent)
}

impl BlankLines {
    /// The allowed range of blank lines before `statements[i]`, or `None`
    /// when its prefix should be left alone.
    fn limits(
        &self,
        statements: &[RightPadded<Statement>],
        i: usize,
        scope: Scope,
    ) -> Option<(usize, usize)> {
        let statement = &statements[i].element;
        if !statement.prefix().whitespace.contains('\n') {
            return None;
        }
        let style = &self.style;
        if i == 0 {
            if scope == Scope::Module {
                return None;
            }
            let minimum = if scope == Scope::Class && is_function(statement) {
                style.before_first_method
            } else {
                0
            };
            return Some((minimum, style.keep_maximum_in_code.max(minimum)));
        }
        if statements[i - 1].markers.has_semicolon() {
            return None;
        }
        let previous = &statements[i - 1].element;
        let (minimum, maximum) = match scope {
            Scope::Module => {
                let minimum = if is_definition(previous) || is_definition(statement) {
                    style.around_top_level_classes_functions
                } else if is_import(previous) && !is_import(statement) {
                    style.after_top_level_imports
                } else {
                    0
                };
                (minimum, style.keep_maximum_in_declarations)
            }
            Scope::Class => {
                let minimum = if is_definition(previous) || is_definition(statement) {
                    style.around_method
                } else {
                    0
                };
                (minimum, style.keep_maximum_in_code)
            }
            Scope::Code => (0, style.keep_maximum_in_code),
        };
        Some((minimum, maximum.max(minimum)))
    }

    /// Returns `None` when every statement already fits its limits.
    fn adjust(
        &self,
        statements: &[RightPadded<Statement>],
        scope: Scope,
    ) -> Option<Vec<RightPadded<Statement>>> {
        let mut changed = false;
        let mut out = Vec::with_capacity(statements.len());
        for (i, padded) in statements.iter().enumerate() {
            let Some((minimum, maximum)) = self.limits(statements, i, scope) else {
                out.push(padded.clone());
                continue;
            };
            let prefix = padded.element.prefix();
            let current = blank_lines(prefix);
            let wanted = current.clamp(minimum, maximum);
            if wanted == current {
                out.push(padded.clone());
                continue;
            }
            let prefix = with_blank_lines(prefix, wanted);
            out.push(
                padded
                    .clone()
                    .with_element(padded.element.clone().with_prefix(prefix)),
            );
            changed = true;
        }
        changed.then_some(out)
    }
}

impl<P> TreeVisitor<P> for BlankLines {
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
        let node = node.walk_children(self, p);
        match self.adjust(&node.statements, Scope::Module) {
            Some(statements) => node.with_statements(statements),
            None => node,
        }
    }

    fn visit_block(&mut self, node: Rc<Block>, p: &mut P) -> Rc<Block> {
        let scope = match <Self as TreeVisitor<P>>::cursor(self).parent() {
            Some(Tree::ClassDeclaration(_)) => Scope::Class,
            _ => Scope::Code,
        };
        let node = node.walk_children(self, p);
        match self.adjust(&node.statements, scope) {
            Some(statements) => node.with_statements(statements),
            None => node,
        }
    }
}
