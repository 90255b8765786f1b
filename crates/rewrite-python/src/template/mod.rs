//! Templates and patterns.
//!
//! A template is Python source with `{name}` placeholders. Applying it
//! substitutes a value for each placeholder and formats the result where it
//! lands; matching it as a [`Pattern`] binds each placeholder to the part of
//! a tree aligned with it.
//!
//! ```
//! use rewrite_python::template::{Capture, Pattern};
//! use rewrite_python_lst::parse_module;
//! use rewrite_python_lst::tree::Statement;
//!
//! let unit = parse_module("m.py", "print(x + 1)\n").unwrap();
//! let Statement::ExpressionStatement(call) = &unit.statements[0].element else { unreachable!() };
//! let pattern = Pattern::builder("print({value})")
//!     .capture(Capture::new("value"))
//!     .build()
//!     .unwrap();
//! let captured = pattern.matches(&call.expression.to_tree()).unwrap();
//! assert_eq!(captured.get("value").map(|t| t.kind()), Some("Binary"));
//! ```
//!
//! Placeholders are rewritten to `__placeholder_<name>__` identifiers and
//! the code is parsed inside a synthetic `def __WRAPPER__():`, so the parser
//! sees ordinary Python. A literal brace is written `{{` or `}}`.

mod capture;
mod code;
mod coordinates;
mod matcher;
mod substitute;

pub use capture::{Bound, Capture, Captured};
pub use code::{clear_cache, placeholder_identifier, placeholder_name, set_cache_capacity};
pub use coordinates::Coordinates;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use rewrite_python_lst::tree::matching::trees_match;
use rewrite_python_lst::tree::{Expression, Statement, Tree};
use rewrite_python_lst::visitor::{Cursor, Transform, TreeVisitor, VisitState};

use crate::error::{TemplateError, TemplateResult};
use crate::format::{auto_format_tree, FormatStyle};
use code::{cached_template, rewrite_placeholders, TemplateTree};
use matcher::CaptureMatcher;
use substitute::Substitute;

/// The placeholder names `code` uses, each once, in order of first use.
pub fn placeholder_names(code: &str) -> TemplateResult<Vec<String>> {
    let (_, mut names) = rewrite_placeholders(code)?;
    let mut seen = HashSet::new();
    names.retain(|name| seen.insert(name.clone()));
    Ok(names)
}

/// What applying a template produced.
#[derive(Clone, Debug)]
pub enum Applied {
    Expression(Expression),
    Statements(Vec<Statement>),
}

impl Applied {
    pub fn into_trees(self) -> Vec<Tree> {
        match self {
            Applied::Expression(expression) => vec![expression.to_tree()],
            Applied::Statements(statements) => statements.iter().map(Statement::to_tree).collect(),
        }
    }

    /// The result as one expression; a single statement is wrapped.
    pub fn into_expression(self) -> TemplateResult<Expression> {
        match self {
            Applied::Expression(expression) => Ok(expression),
            Applied::Statements(mut statements) if statements.len() == 1 => {
                Ok(statements.remove(0).into_expression())
            }
            Applied::Statements(_) => Err(TemplateError::UnexpectedShape {
                expected: "an expression".to_string(),
                found: "several statements".to_string(),
            }),
        }
    }

    pub fn into_statements(self) -> Vec<Statement> {
        match self {
            Applied::Expression(expression) => vec![expression.into_statement()],
            Applied::Statements(statements) => statements,
        }
    }
}

/// Builds a [`Template`] or [`Pattern`].
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    code: String,
    captures: Vec<Capture>,
    imports: Vec<String>,
    splices: Vec<(String, String)>,
    style: FormatStyle,
}

impl TemplateBuilder {
    fn new(code: impl Into<String>) -> Self {
        TemplateBuilder {
            code: code.into(),
            captures: Vec::new(),
            imports: Vec::new(),
            splices: Vec::new(),
            style: FormatStyle::default(),
        }
    }

    pub fn capture(mut self, capture: Capture) -> Self {
        self.captures.push(capture);
        self
    }

    /// An import line the template's code relies on, e.g. `import os`.
    pub fn import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    /// Inserts `code` verbatim wherever `{name}` appears, before parsing.
    /// Splices name things that cannot be captures, such as operators.
    pub fn splice(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.splices.push((name.into(), code.into()));
        self
    }

    /// The style results are formatted with.
    pub fn style(mut self, style: FormatStyle) -> Self {
        self.style = style;
        self
    }

    pub fn build(self) -> TemplateResult<Template> {
        let mut code = self.code;
        for (name, text) in &self.splices {
            code = code.replace(&format!("{{{name}}}"), text);
        }
        let (code, used) = rewrite_placeholders(&code)?;
        let mut captures = HashMap::with_capacity(self.captures.len());
        for capture in self.captures {
            if !used.iter().any(|name| name == capture.name()) {
                return Err(TemplateError::UnusedCapture(capture.name().to_string()));
            }
            let name = capture.name().to_string();
            if captures.insert(name.clone(), capture).is_some() {
                return Err(TemplateError::DuplicateCapture(name));
            }
        }
        if let Some(undefined) = used.iter().find(|name| !captures.contains_key(*name)) {
            return Err(TemplateError::UndefinedPlaceholder(undefined.clone()));
        }
        let mut names: Vec<&str> = captures.keys().map(String::as_str).collect();
        names.sort_unstable();
        let tree = cached_template(&code, &names, &self.imports)?;
        Ok(Template {
            tree,
            captures,
            style: self.style,
        })
    }
}

/// Source code with placeholders, parsed once and applied many times.
#[derive(Debug, Clone)]
pub struct Template {
    tree: Rc<TemplateTree>,
    captures: HashMap<String, Capture>,
    style: FormatStyle,
}

impl Template {
    pub fn builder(code: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder::new(code)
    }

    /// A template without placeholders.
    pub fn parse(code: &str) -> TemplateResult<Template> {
        Template::builder(code).build()
    }

    pub fn captures(&self) -> impl Iterator<Item = &Capture> {
        self.captures.values()
    }

    /// Substitutes `values` without placing or formatting the result.
    pub fn substitute(&self, values: &Captured) -> TemplateResult<Applied> {
        if let Some(missing) = self
            .captures
            .keys()
            .find(|name| !values.contains(name.as_str()))
        {
            return Err(TemplateError::MissingValue(missing.clone()));
        }
        let mut renew = Renew(VisitState::renewing_ids());
        let mut substitute = Substitute::new(values);
        let applied = match &*self.tree {
            TemplateTree::Expression(expression) => {
                let fresh = renew.visit_expression(expression.clone(), &mut ());
                Applied::Expression(substitute.visit_expression(fresh, &mut ()))
            }
            TemplateTree::Statements(statements) => {
                let mut out = Vec::with_capacity(statements.len());
                for statement in statements {
                    let fresh = renew.visit_statement(statement.clone(), &mut ());
                    match substitute.visit_statement_in_list(fresh, &mut ()) {
                        Transform::Keep(statement) => out.push(statement),
                        Transform::Flatten(statements) => out.extend(statements),
                        Transform::Remove => {}
                    }
                }
                Applied::Statements(out)
            }
        };
        match substitute.error {
            Some(err) => Err(err),
            None => Ok(applied),
        }
    }

    /// Applies the template at the node `cursor` points to and formats the
    /// result in place.
    pub fn apply(
        &self,
        cursor: &Cursor,
        values: &Captured,
        coordinates: Coordinates,
    ) -> TemplateResult<Applied> {
        let target = cursor.value().ok_or_else(|| TemplateError::UnexpectedShape {
            expected: "a cursor positioned at a node".to_string(),
            found: "an empty cursor".to_string(),
        })?;
        let scope = parent_cursor(cursor);
        let applied = self.substitute(values)?;
        let expression_target = target.as_statement().is_none()
            || (coordinates == Coordinates::Replace && target.as_expression().is_some());
        let applied = match applied {
            Applied::Expression(expression) if expression_target => {
                if coordinates != Coordinates::Replace {
                    return Err(TemplateError::UnexpectedShape {
                        expected: "statements to insert".to_string(),
                        found: "an expression".to_string(),
                    });
                }
                let placed = expression.with_prefix(target.prefix().clone());
                let formatted = auto_format_tree(placed.to_tree(), &self.style, &scope);
                Applied::Expression(formatted.as_expression().ok_or_else(|| {
                    TemplateError::UnexpectedShape {
                        expected: "an expression".to_string(),
                        found: "a statement".to_string(),
                    }
                })?)
            }
            applied => {
                let placed = coordinates::place_statements(
                    applied.into_statements(),
                    target,
                    coordinates,
                    &self.style.tabs_and_indents,
                )?;
                let formatted = placed
                    .into_iter()
                    .map(|statement| {
                        let tree = auto_format_tree(statement.to_tree(), &self.style, &scope);
                        tree.as_statement().ok_or_else(|| TemplateError::UnexpectedShape {
                            expected: "a statement".to_string(),
                            found: tree.kind().to_string(),
                        })
                    })
                    .collect::<TemplateResult<Vec<_>>>()?;
                Applied::Statements(formatted)
            }
        };
        Ok(applied)
    }
}

/// A template used to find code.
#[derive(Debug, Clone)]
pub struct Pattern {
    template: Template,
    root: Tree,
}

impl Pattern {
    pub fn builder(code: impl Into<String>) -> PatternBuilder {
        PatternBuilder(TemplateBuilder::new(code))
    }

    /// Matches `target` against the pattern. Returns the captured values,
    /// or `None` when the trees differ anywhere outside a placeholder.
    pub fn matches(&self, target: &Tree) -> Option<Captured> {
        let mut matcher = CaptureMatcher::new(&self.template.captures);
        if !trees_match(&self.root, target, &mut matcher) || !matcher.is_complete() {
            return None;
        }
        Some(matcher.captured)
    }

    pub fn as_template(&self) -> &Template {
        &self.template
    }
}

/// Builds a [`Pattern`]; see [`TemplateBuilder`].
#[derive(Debug, Clone)]
pub struct PatternBuilder(TemplateBuilder);

impl PatternBuilder {
    pub fn capture(self, capture: Capture) -> Self {
        PatternBuilder(self.0.capture(capture))
    }

    pub fn import(self, import: impl Into<String>) -> Self {
        PatternBuilder(self.0.import(import))
    }

    pub fn splice(self, name: impl Into<String>, code: impl Into<String>) -> Self {
        PatternBuilder(self.0.splice(name, code))
    }

    /// Builds the pattern; its code must be an expression or one statement.
    pub fn build(self) -> TemplateResult<Pattern> {
        let template = self.0.build()?;
        let root = match &*template.tree {
            TemplateTree::Expression(expression) => expression.to_tree(),
            TemplateTree::Statements(statements) if statements.len() == 1 => statements[0].to_tree(),
            tree => {
                return Err(TemplateError::UnexpectedShape {
                    expected: "an expression or a single statement".to_string(),
                    found: tree.shape().to_string(),
                })
            }
        };
        Ok(Pattern { template, root })
    }
}

/// Gives every node a fresh id so each application is a distinct tree.
struct Renew(VisitState);

impl TreeVisitor<()> for Renew {
    fn state(&self) -> &VisitState {
        &self.0
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.0
    }
}

/// `cursor` without its current node.
fn parent_cursor(cursor: &Cursor) -> Cursor {
    let mut path: Vec<Tree> = cursor.ancestors().skip(1).cloned().collect();
    path.reverse();
    Cursor::from_path(path)
}
