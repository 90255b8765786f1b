//! Turning template code into trees.
//!
//! Placeholders become identifiers the parser accepts, and the code is
//! parsed inside a synthetic function so that fragments parse: first as
//! the value of a `return`, then as the function's body. Parsed templates
//! are cached per thread.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use rewrite_core::cache::{BoundedCache, DEFAULT_CACHE_CAPACITY};
use rewrite_python_lst::parse_module;
use rewrite_python_lst::tree::{Expression, Space, Statement, Tree};
use rewrite_python_lst::visitor::TreeVisitor;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::format::{ShiftIndent, TabsAndIndentsStyle};

const WRAPPER: &str = "__WRAPPER__";
const PLACEHOLDER_PREFIX: &str = "__placeholder_";
const PLACEHOLDER_SUFFIX: &str = "__";

static PLACEHOLDER_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}|[{}]").unwrap());

/// The identifier a placeholder is rewritten to.
pub fn placeholder_identifier(name: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{name}{PLACEHOLDER_SUFFIX}")
}

/// The capture name of a rewritten placeholder identifier.
pub fn placeholder_name(identifier: &str) -> Option<&str> {
    identifier
        .strip_prefix(PLACEHOLDER_PREFIX)?
        .strip_suffix(PLACEHOLDER_SUFFIX)
        .filter(|name| !name.is_empty())
}

/// The name of the placeholder `tree` is, if it is one.
pub fn placeholder_of(tree: &Tree) -> Option<&str> {
    match tree {
        Tree::Identifier(identifier) => placeholder_name(&identifier.simple_name),
        Tree::ExpressionStatement(statement) => match &statement.expression {
            Expression::Identifier(identifier) => placeholder_name(&identifier.simple_name),
            _ => None,
        },
        _ => None,
    }
}

/// Rewrites `{name}` placeholders to identifiers and unescapes `{{`/`}}`.
/// Returns the code and the placeholder names in order of appearance.
pub fn rewrite_placeholders(code: &str) -> TemplateResult<(String, Vec<String>)> {
    let mut out = String::with_capacity(code.len());
    let mut names = Vec::new();
    let mut last = 0;
    for found in PLACEHOLDER_SYNTAX.captures_iter(code) {
        let Some(whole) = found.get(0) else {
            continue;
        };
        out.push_str(&code[last..whole.start()]);
        last = whole.end();
        match (whole.as_str(), found.get(1)) {
            ("{{", _) => out.push('{'),
            ("}}", _) => out.push('}'),
            (_, Some(name)) => {
                out.push_str(&placeholder_identifier(name.as_str()));
                names.push(name.as_str().to_string());
            }
            (brace, None) => {
                return Err(TemplateError::PlaceholderSyntax {
                    offset: whole.start(),
                    message: format!("unmatched '{brace}'; write '{brace}{brace}' for a literal brace"),
                })
            }
        }
    }
    out.push_str(&code[last..]);
    Ok((out, names))
}

/// A parsed template, before any values are substituted.
#[derive(Clone, Debug)]
pub enum TemplateTree {
    Expression(Expression),
    /// Statements at indentation zero; the first has an empty prefix.
    Statements(Vec<Statement>),
}

impl TemplateTree {
    pub fn shape(&self) -> &'static str {
        match self {
            TemplateTree::Expression(_) => "an expression",
            TemplateTree::Statements(statements) if statements.len() == 1 => "a statement",
            TemplateTree::Statements(_) => "several statements",
        }
    }
}

fn wrapper_prelude(imports: &[String]) -> String {
    let mut prelude = String::new();
    for import in imports {
        prelude.push_str(import.trim_end());
        prelude.push('\n');
    }
    prelude.push_str("def ");
    prelude.push_str(WRAPPER);
    prelude.push_str("():\n");
    prelude
}

/// The body of the synthetic wrapper function in `source`.
fn wrapper_body(source: &str) -> Result<Vec<Statement>, String> {
    let unit = parse_module("__template__.py", source).map_err(|err| err.to_string())?;
    unit.statements
        .iter()
        .rev()
        .find_map(|padded| match &padded.element {
            Statement::MethodDeclaration(method) if method.name.simple_name == WRAPPER => {
                Some(method.body.statements.iter().map(|s| s.element.clone()).collect())
            }
            _ => None,
        })
        .ok_or_else(|| "the template closed the wrapper function".to_string())
}

fn as_expression(code: &str, imports: &[String]) -> Option<Expression> {
    if code.trim().is_empty() {
        return None;
    }
    let source = format!("{}    return {}\n", wrapper_prelude(imports), code.trim());
    let body = wrapper_body(&source).ok()?;
    match body.as_slice() {
        [Statement::Return(ret)] => ret
            .expression
            .clone()
            .map(|expression| expression.with_prefix(Space::EMPTY)),
        _ => None,
    }
}

fn as_statements(code: &str, imports: &[String]) -> TemplateResult<Vec<Statement>> {
    let mut source = wrapper_prelude(imports);
    for line in code.trim_matches('\n').lines() {
        if !line.trim().is_empty() {
            source.push_str("    ");
        }
        source.push_str(line);
        source.push('\n');
    }
    let body = wrapper_body(&source).map_err(|message| TemplateError::Parse {
        code: code.to_string(),
        message,
    })?;
    let style = TabsAndIndentsStyle::default();
    Ok(body
        .into_iter()
        .enumerate()
        .map(|(i, statement)| {
            let statement = if i == 0 {
                statement.with_prefix(Space::EMPTY)
            } else {
                statement
            };
            ShiftIndent::new(-(style.indent_size as isize), style.clone())
                .visit_statement(statement, &mut ())
        })
        .collect())
}

/// Parses rewritten template code: as an expression when it is one,
/// otherwise as statements.
pub fn parse_template(code: &str, imports: &[String]) -> TemplateResult<TemplateTree> {
    if let Some(expression) = as_expression(code, imports) {
        return Ok(TemplateTree::Expression(expression));
    }
    let statements = as_statements(code, imports)?;
    if statements.is_empty() {
        return Err(TemplateError::Parse {
            code: code.to_string(),
            message: "the template is empty".to_string(),
        });
    }
    Ok(TemplateTree::Statements(statements))
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TemplateKey {
    code: String,
    captures: BTreeSet<String>,
    imports: BTreeSet<String>,
}

thread_local! {
    static TEMPLATE_CACHE: RefCell<BoundedCache<TemplateKey, Rc<TemplateTree>>> =
        RefCell::new(BoundedCache::new(DEFAULT_CACHE_CAPACITY));
}

/// Parses `code` or returns the tree cached for the same code, capture
/// names and imports.
pub fn cached_template(
    code: &str,
    captures: &[&str],
    imports: &[String],
) -> TemplateResult<Rc<TemplateTree>> {
    let key = TemplateKey {
        code: code.to_string(),
        captures: captures.iter().map(|c| c.to_string()).collect(),
        imports: imports.iter().cloned().collect(),
    };
    TEMPLATE_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        cache
            .get_or_try_insert_with(key, || {
                debug!(code, "parsing template");
                parse_template(code, imports).map(Rc::new)
            })
            .cloned()
    })
}

/// Replaces this thread's template cache with an empty one holding at most
/// `capacity` templates.
pub fn set_cache_capacity(capacity: usize) {
    TEMPLATE_CACHE.with(|cache| *cache.borrow_mut() = BoundedCache::new(capacity));
}

/// Drops every cached template on this thread.
pub fn clear_cache() {
    TEMPLATE_CACHE.with(|cache| cache.borrow_mut().clear());
}

pub(crate) fn cache_len() -> usize {
    TEMPLATE_CACHE.with(|cache| cache.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewrite_python_lst::print_tree;

    #[test]
    fn placeholders_become_identifiers() {
        let (code, names) = rewrite_placeholders("{a} + {b}").unwrap();
        assert_eq!(code, "__placeholder_a__ + __placeholder_b__");
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn doubled_braces_are_literal() {
        let (code, names) = rewrite_placeholders("{{1: {v}}}").unwrap();
        assert_eq!(code, "{1: __placeholder_v__}");
        assert_eq!(names, vec!["v"]);
    }

    #[test]
    fn stray_braces_are_rejected() {
        let err = rewrite_placeholders("{1: 2}").unwrap_err();
        assert!(matches!(err, TemplateError::PlaceholderSyntax { offset: 0, .. }));
        assert!(rewrite_placeholders("f(x)}").is_err());
    }

    #[test]
    fn placeholder_names_round_trip() {
        let identifier = placeholder_identifier("my_arg");
        assert_eq!(placeholder_name(&identifier), Some("my_arg"));
        assert_eq!(placeholder_name("__placeholder___"), None);
        assert_eq!(placeholder_name("x"), None);
    }

    #[test]
    fn expressions_parse_as_expressions() {
        let TemplateTree::Expression(expression) = parse_template("a + b", &[]).unwrap() else {
            panic!("expected an expression");
        };
        assert_eq!(print_tree(&expression.to_tree()), "a + b");
    }

    #[test]
    fn statements_come_back_dedented() {
        let tree = parse_template("if x:\n    y = 1\nz = 2", &[]).unwrap();
        let TemplateTree::Statements(statements) = tree else {
            panic!("expected statements");
        };
        assert_eq!(statements.len(), 2);
        assert_eq!(print_tree(&statements[0].to_tree()), "if x:\n    y = 1");
        assert_eq!(print_tree(&statements[1].to_tree()), "\nz = 2");
    }

    #[test]
    fn imports_are_parsed_but_dropped() {
        let tree = parse_template("os.sep", &["import os".to_string()]).unwrap();
        assert!(matches!(tree, TemplateTree::Expression(_)));
    }

    #[test]
    fn unparsable_code_reports_the_template() {
        let err = parse_template("def (:", &[]).unwrap_err();
        let TemplateError::Parse { code, .. } = err else {
            panic!("expected a parse error");
        };
        assert_eq!(code, "def (:");
    }

    #[test]
    fn cache_is_keyed_by_code_captures_and_imports() {
        clear_cache();
        let first = cached_template("x + 1", &["x"], &[]).unwrap();
        let again = cached_template("x + 1", &["x"], &[]).unwrap();
        assert!(Rc::ptr_eq(&first, &again));
        cached_template("x + 1", &[], &[]).unwrap();
        assert_eq!(cache_len(), 2);
        clear_cache();
        assert_eq!(cache_len(), 0);
    }
}
