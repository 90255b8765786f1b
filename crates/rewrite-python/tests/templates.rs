//! Matching and applying templates against parsed modules.

use std::rc::Rc;

use rewrite_python::template::{Capture, Captured, Coordinates, Pattern, Template};
use rewrite_python::TemplateError;
use rewrite_python_lst::tree::*;
use rewrite_python_lst::visitor::Cursor;
use rewrite_python_lst::{parse_module, print_tree};

fn unit(source: &str) -> Rc<CompilationUnit> {
    Rc::new(parse_module("t.py", source).unwrap())
}

/// The expression of the first statement, which must be an expression
/// statement.
fn first_expression(unit: &CompilationUnit) -> Expression {
    match &unit.statements[0].element {
        Statement::ExpressionStatement(statement) => statement.expression.clone(),
        other => other.clone().into_expression(),
    }
}

fn pattern(code: &str, names: &[&str]) -> Pattern {
    names
        .iter()
        .fold(Pattern::builder(code), |builder, name| builder.capture(Capture::new(*name)))
        .build()
        .unwrap()
}

fn matches(pattern: &Pattern, source: &str) -> Option<Captured> {
    let unit = unit(source);
    pattern.matches(&first_expression(&unit).to_tree())
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn match_then_apply_reproduces_the_target() {
    let pattern = pattern("{a} + {b}", &["a", "b"]);
    let captured = matches(&pattern, "x + y\n").expect("pattern should match");
    assert_eq!(print_tree(captured.get("a").unwrap()), "x");
    assert_eq!(print_tree(captured.get("b").unwrap()), " y");

    let applied = pattern.as_template().substitute(&captured).unwrap();
    let trees = applied.into_trees();
    assert_eq!(trees.len(), 1);
    assert_eq!(print_tree(&trees[0]), "x + y");
}

#[test]
fn different_kinds_never_match() {
    let call = pattern("f({x})", &["x"]);
    assert!(matches(&call, "x + 1\n").is_none());
    assert!(matches(&call, "g(1)\n").is_none());
    assert!(matches(&call, "f(1)\n").is_some());

    let plus = pattern("{a} + {b}", &["a", "b"]);
    assert!(matches(&plus, "a - b\n").is_none());
}

#[test]
fn constraints_filter_captures() {
    let pattern = Pattern::builder("{x} + 1")
        .capture(Capture::new("x").with_constraint(|tree| matches!(tree, Tree::Identifier(_))))
        .build()
        .unwrap();
    assert!(matches(&pattern, "a + 1\n").is_some());
    assert!(matches(&pattern, "f() + 1\n").is_none());
}

#[test]
fn literals_of_different_kinds_do_not_match() {
    let none = Pattern::builder("None").build().unwrap();
    assert!(matches(&none, "None\n").is_some());
    assert!(matches(&none, "...\n").is_none());
    assert!(matches(&none, "b\"\"\n").is_none());

    let bytes = Pattern::builder("b\"\"").build().unwrap();
    assert!(matches(&bytes, "\"\"\n").is_none());
    assert!(matches(&bytes, "b''\n").is_some());
}

#[test]
fn literals_match_by_value() {
    let sixteen = Pattern::builder("16").build().unwrap();
    assert!(matches(&sixteen, "0x10\n").is_some());
    assert!(matches(&sixteen, "17\n").is_none());
}

#[test]
fn a_repeated_capture_needs_the_same_node() {
    let pattern = pattern("{x} + {x}", &["x"]);
    // Two occurrences of `a` are two different nodes.
    assert!(matches(&pattern, "a + a\n").is_none());

    let unit = unit("a + b\n");
    let Expression::Binary(binary) = first_expression(&unit) else {
        panic!("expected a binary expression");
    };
    let doubled = binary.clone().with_right(binary.left.clone());
    let captured = pattern.matches(&doubled.into_tree()).expect("same node twice");
    assert_eq!(print_tree(captured.get("x").unwrap()), "a");
}

#[test]
fn variadic_captures_take_a_run_of_arguments() {
    let pattern = Pattern::builder("f({args})")
        .capture(Capture::new("args").variadic(0, None))
        .build()
        .unwrap();
    let captured = matches(&pattern, "f(1, 2, 3)\n").expect("three arguments");
    assert_eq!(captured.get_all("args").map(<[Tree]>::len), Some(3));

    let template = Template::builder("g({args})")
        .capture(Capture::new("args").variadic(0, None))
        .build()
        .unwrap();
    let applied = template.substitute(&captured).unwrap();
    assert_eq!(print_tree(&applied.into_trees()[0]), "g(1, 2, 3)");

    let captured = matches(&pattern, "f()\n").expect("no arguments");
    assert_eq!(captured.get_all("args").map(<[Tree]>::len), Some(0));
    let applied = template.substitute(&captured).unwrap();
    assert_eq!(print_tree(&applied.into_trees()[0]), "g()");
}

#[test]
fn variadic_bounds_are_enforced() {
    let pattern = Pattern::builder("f({args})")
        .capture(Capture::new("args").variadic(1, Some(2)))
        .build()
        .unwrap();
    assert!(matches(&pattern, "f()\n").is_none());
    assert!(matches(&pattern, "f(1, 2)\n").is_some());
    assert!(matches(&pattern, "f(1, 2, 3)\n").is_none());
}

// ============================================================================
// Applying
// ============================================================================

#[test]
fn substitution_keeps_the_placeholder_prefix() {
    let template = Template::builder("print({value})")
        .capture(Capture::new("value"))
        .build()
        .unwrap();
    let values = Captured::new().with("value", identifier(Space::new("   "), "x"));
    let applied = template.substitute(&values).unwrap();
    assert_eq!(print_tree(&applied.into_trees()[0]), "print(x)");
}

#[test]
fn each_application_gets_fresh_ids() {
    let template = Template::parse("f(1)").unwrap();
    let first = template.substitute(&Captured::new()).unwrap().into_trees();
    let second = template.substitute(&Captured::new()).unwrap().into_trees();
    assert_ne!(first[0].id(), second[0].id());
}

#[test]
fn replacing_an_expression_takes_its_prefix() {
    let unit = unit("y = a + b\n");
    let Statement::Assignment(assignment) = &unit.statements[0].element else {
        panic!("expected an assignment");
    };
    let target = assignment.assignment.element.clone();
    let cursor = Cursor::from_path([
        unit.clone().into_tree(),
        assignment.clone().into_tree(),
        target.to_tree(),
    ]);
    let template = Template::builder("max({a}, {b})")
        .capture(Capture::new("a"))
        .capture(Capture::new("b"))
        .build()
        .unwrap();
    let Expression::Binary(binary) = &target else {
        panic!("expected a binary expression");
    };
    let values = Captured::new()
        .with("a", binary.left.clone())
        .with("b", binary.right.clone());
    let applied = template.apply(&cursor, &values, Coordinates::Replace).unwrap();
    assert_eq!(print_tree(&applied.into_trees()[0]), " max(a, b)");
}

/// The cursor path to the first statement of the first function's body.
fn body_statement_cursor(unit: &Rc<CompilationUnit>) -> Cursor {
    let Statement::MethodDeclaration(method) = &unit.statements[0].element else {
        panic!("expected a function");
    };
    let statement = method.body.statements[0].element.clone();
    Cursor::from_path([
        unit.clone().into_tree(),
        method.clone().into_tree(),
        method.body.clone().into_tree(),
        statement.to_tree(),
    ])
}

#[test]
fn statements_can_be_inserted_after_a_target() {
    let unit = unit("def f():\n    x = 1\n");
    let cursor = body_statement_cursor(&unit);
    let template = Template::builder("print({v})")
        .capture(Capture::new("v"))
        .build()
        .unwrap();
    let values = Captured::new().with("v", identifier(Space::EMPTY, "x"));
    let statements = template
        .apply(&cursor, &values, Coordinates::After)
        .unwrap()
        .into_statements();
    let printed: Vec<String> = statements.iter().map(|s| print_tree(&s.to_tree())).collect();
    assert_eq!(printed, vec!["\n    x = 1", "\n    print(x)"]);
}

#[test]
fn statements_can_be_inserted_before_a_target() {
    let unit = unit("def f():\n    x = 1\n");
    let cursor = body_statement_cursor(&unit);
    let template = Template::builder("if {c}:\n    pass")
        .capture(Capture::new("c"))
        .build()
        .unwrap();
    let values = Captured::new().with("c", identifier(Space::EMPTY, "x"));
    let statements = template
        .apply(&cursor, &values, Coordinates::Before)
        .unwrap()
        .into_statements();
    let printed: Vec<String> = statements.iter().map(|s| print_tree(&s.to_tree())).collect();
    assert_eq!(printed, vec!["\n    if x:\n        pass", "\n    x = 1"]);
}

#[test]
fn expressions_cannot_be_inserted_next_to_an_expression() {
    let unit = unit("y = a + b\n");
    let Statement::Assignment(assignment) = &unit.statements[0].element else {
        panic!("expected an assignment");
    };
    let cursor = Cursor::from_path([
        unit.clone().into_tree(),
        assignment.clone().into_tree(),
        assignment.assignment.element.to_tree(),
    ]);
    let template = Template::parse("f()").unwrap();
    let err = template
        .apply(&cursor, &Captured::new(), Coordinates::After)
        .unwrap_err();
    assert!(matches!(err, TemplateError::UnexpectedShape { .. }));
}

// ============================================================================
// Building
// ============================================================================

#[test]
fn placeholders_need_captures() {
    let err = Template::builder("f({x})").build().unwrap_err();
    assert!(matches!(err, TemplateError::UndefinedPlaceholder(name) if name == "x"));

    let err = Template::builder("f(1)")
        .capture(Capture::new("x"))
        .build()
        .unwrap_err();
    assert!(matches!(err, TemplateError::UnusedCapture(name) if name == "x"));

    let err = Template::builder("f({x})")
        .capture(Capture::new("x"))
        .capture(Capture::new("x"))
        .build()
        .unwrap_err();
    assert!(matches!(err, TemplateError::DuplicateCapture(name) if name == "x"));
}

#[test]
fn applying_without_a_value_fails() {
    let template = Template::builder("f({x})")
        .capture(Capture::new("x"))
        .build()
        .unwrap();
    let err = template.substitute(&Captured::new()).unwrap_err();
    assert!(matches!(err, TemplateError::MissingValue(name) if name == "x"));
}

#[test]
fn patterns_must_be_one_node() {
    let err = Pattern::builder("x = 1\ny = 2").build().unwrap_err();
    assert!(matches!(err, TemplateError::UnexpectedShape { .. }));
}

#[test]
fn splices_are_inserted_before_parsing() {
    let pattern = Pattern::builder("{a} {op} {b}")
        .capture(Capture::new("a"))
        .capture(Capture::new("b"))
        .splice("op", "*")
        .build()
        .unwrap();
    assert!(matches(&pattern, "x * y\n").is_some());
    assert!(matches(&pattern, "x + y\n").is_none());
}
