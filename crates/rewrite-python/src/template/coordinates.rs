//! Where a template result lands relative to the node it was applied to.

use rewrite_python_lst::tree::{Space, Statement, Tree};
use rewrite_python_lst::visitor::TreeVisitor;

use crate::error::{TemplateError, TemplateResult};
use crate::format::{indent_width, ShiftIndent, TabsAndIndentsStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coordinates {
    /// Replace the target, which hands its prefix to the result.
    #[default]
    Replace,
    /// Insert the result as statements before the target.
    Before,
    /// Insert the result as statements after the target.
    After,
}

/// Statements produced by a template, placed around `target`.
pub(crate) fn place_statements(
    mut statements: Vec<Statement>,
    target: &Tree,
    coordinates: Coordinates,
    style: &TabsAndIndentsStyle,
) -> TemplateResult<Vec<Statement>> {
    let Some(target_statement) = target.as_statement() else {
        if coordinates == Coordinates::Replace {
            return Ok(statements);
        }
        return Err(TemplateError::UnexpectedShape {
            expected: "a statement to insert next to".to_string(),
            found: target.kind().to_string(),
        });
    };
    let indent = target.prefix().indent().unwrap_or_default().to_string();
    let shift = indent_width(&indent, style.tab_size) as isize;
    statements = statements
        .into_iter()
        .map(|statement| ShiftIndent::new(shift, style.clone()).visit_statement(statement, &mut ()))
        .collect();
    let line = Space::new(format!("\n{indent}"));
    match coordinates {
        Coordinates::Replace => {
            if let Some(first) = statements.first_mut() {
                *first = first.clone().with_prefix(target.prefix().clone());
            }
            Ok(statements)
        }
        Coordinates::Before => {
            if let Some(first) = statements.first_mut() {
                *first = first.clone().with_prefix(target.prefix().clone());
            }
            statements.push(target_statement.with_prefix(line));
            Ok(statements)
        }
        Coordinates::After => {
            if let Some(first) = statements.first_mut() {
                *first = first.clone().with_prefix(line);
            }
            statements.insert(0, target_statement);
            Ok(statements)
        }
    }
}
