// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use super::*;
use crate::tree::*;

fn parse(source: &str) -> CompilationUnit {
    match parse_module("test.py", source) {
        Ok(unit) => unit,
        Err(err) => panic!("{}", prettify_error(&err, source, "test.py")),
    }
}

fn first_statement(source: &str) -> Statement {
    parse(source).statements[0].element.clone()
}

fn expression_of(statement: &Statement) -> Expression {
    match statement {
        Statement::ExpressionStatement(wrapper) => wrapper.expression.clone(),
        other => panic!("expected an expression statement, got {}", other.kind()),
    }
}

#[test]
fn test_comments_land_on_statement_prefix_and_trailing_space() {
    let unit = parse("# hi\nx = 1 # trailing\n");
    let statement = &unit.statements[0];
    let prefix = statement.element.prefix();
    assert_eq!(prefix.comments.len(), 1);
    assert_eq!(prefix.comments[0].text, " hi");
    assert_eq!(prefix.comments[0].suffix, "\n");
    assert_eq!(statement.after.whitespace, " ");
    assert_eq!(statement.after.comments[0].text, " trailing");
    assert_eq!(unit.eof.whitespace, "\n");
}

#[test]
fn test_implicit_tuples_omit_parentheses() {
    let Statement::Assignment(assignment) = first_statement("a, b = 1, 2\n") else {
        panic!("expected an assignment");
    };
    for side in [&assignment.variable, &assignment.assignment.element] {
        let Expression::CollectionLiteral(tuple) = side else {
            panic!("expected a tuple");
        };
        assert_eq!(tuple.kind, CollectionKind::Tuple);
        assert!(tuple.markers.has_omit_parentheses());
        assert_eq!(tuple.elements.len(), 2);
    }
}

#[test]
fn test_fstring_debug_conversion_and_spec() {
    let statement = first_statement("f\"{x=!r:>5}\"\n");
    let Expression::FormattedString(fstring) = expression_of(&statement) else {
        panic!("expected an f-string");
    };
    assert_eq!(fstring.delimiter, "f\"");
    let Expression::FormattedStringValue(value) = &fstring.parts[0] else {
        panic!("expected a replacement field");
    };
    assert_eq!(value.debug.as_ref().map(|debug| debug.element), Some(true));
    assert_eq!(value.conversion, Some(Conversion::Repr));
    let Some(Expression::FormattedString(spec)) = &value.format else {
        panic!("expected a format spec");
    };
    let Expression::Literal(text) = &spec.parts[0] else {
        panic!("expected literal spec text");
    };
    assert_eq!(text.value_source, ">5");
}

#[test]
fn test_relative_import_dots() {
    let Statement::MultiImport(import) = first_statement("from ... import x\n") else {
        panic!("expected an import");
    };
    let from = import.from.as_ref().unwrap();
    let Expression::Identifier(module) = &from.element else {
        panic!("expected the dots as a name");
    };
    assert_eq!(module.simple_name, "...");
    assert_eq!(module.prefix.whitespace, " ");
    assert_eq!(from.after.whitespace, " ");

    let Statement::MultiImport(import) = first_statement("from ..pkg.mod import y\n") else {
        panic!("expected an import");
    };
    let Expression::FieldAccess(module) = &import.from.as_ref().unwrap().element else {
        panic!("expected a dotted module");
    };
    assert_eq!(module.name.element.simple_name, "mod");
}

#[test]
fn test_trailing_comma_in_call() {
    let statement = first_statement("f(\n    a,\n)\n");
    let Expression::MethodInvocation(call) = expression_of(&statement) else {
        panic!("expected a call");
    };
    assert!(call.select.is_none());
    assert_eq!(call.name.simple_name, "f");
    let last = call.arguments.elements.last().unwrap();
    assert_eq!(last.markers.trailing_comma().map(|s| s.whitespace.as_str()), Some("\n"));
    assert_eq!(last.element.prefix().whitespace, "\n    ");
}

#[test]
fn test_method_call_keeps_receiver_and_dot_space() {
    let statement = first_statement("a .b(1)\n");
    let Expression::MethodInvocation(call) = expression_of(&statement) else {
        panic!("expected a call");
    };
    let select = call.select.as_ref().unwrap();
    assert_eq!(select.after.whitespace, " ");
    assert_eq!(call.name.simple_name, "b");
}

#[test]
fn test_semicolons_become_markers() {
    let unit = parse("a = 1; b = 2\n");
    assert_eq!(unit.statements.len(), 2);
    assert!(unit.statements[0].markers.has_semicolon());
    assert!(!unit.statements[1].markers.has_semicolon());
    assert_eq!(unit.statements[1].element.prefix().whitespace, " ");
}

#[test]
fn test_blocks_and_dedents() {
    let unit = parse("if x:\n    a\n    b\nelif y:\n    c\nelse:\n    d\ne\n");
    assert_eq!(unit.statements.len(), 2);
    let Statement::If(statement) = &unit.statements[0].element else {
        panic!("expected an if");
    };
    let Statement::Block(body) = &statement.then_part.element else {
        panic!("expected a block");
    };
    assert_eq!(body.statements.len(), 2);
    assert_eq!(body.statements[1].element.prefix().whitespace, "\n    ");
    let elif = statement.else_part.as_ref().unwrap();
    let Statement::If(nested) = &elif.body.element else {
        panic!("expected elif as a nested if");
    };
    assert!(nested.else_part.is_some());
    assert_eq!(unit.statements[1].element.prefix().whitespace, "\n");
}

#[test]
fn test_comment_before_dedent_goes_to_next_statement() {
    let unit = parse("if x:\n    a\n# c\nb\n");
    let prefix = unit.statements[1].element.prefix();
    assert_eq!(prefix.whitespace, "\n");
    assert_eq!(prefix.comments[0].text, " c");
}

#[test]
fn test_function_definition_shape() {
    let source = "@dec\nasync def f[T](a: int = 1, *args, b, **kw) -> T:\n    return a\n";
    let Statement::MethodDeclaration(function) = first_statement(source) else {
        panic!("expected a function");
    };
    assert_eq!(function.leading_annotations.len(), 1);
    let keywords: Vec<_> = function.modifiers.iter().map(|m| m.keyword.as_str()).collect();
    assert_eq!(keywords, ["async", "def"]);
    assert_eq!(function.modifiers[0].prefix.whitespace, "\n");
    assert!(function.type_parameters.is_some());
    assert_eq!(function.parameters.len(), 4);
    assert_eq!(
        function.return_type.as_ref().unwrap().kind,
        TypeHintKind::ReturnType
    );
}

#[test]
fn test_comparisons_keep_negation_space() {
    let statement = first_statement("a is  not b\n");
    let Expression::PyBinary(binary) = expression_of(&statement) else {
        panic!("expected a python binary");
    };
    assert_eq!(binary.operator.element, PyBinaryOperator::IsNot);
    assert_eq!(binary.negation.as_ref().unwrap().whitespace, "  ");
}

#[test]
fn test_walrus_and_chained_assignment() {
    let Statement::ChainedAssignment(chain) = first_statement("a = b = (c := 1)\n") else {
        panic!("expected a chained assignment");
    };
    assert_eq!(chain.variables.len(), 2);
    let Expression::Parentheses(group) = &chain.assignment else {
        panic!("expected parentheses");
    };
    assert!(matches!(group.tree.element, Expression::Assignment(_)));
}

#[test]
fn test_annotated_targets() {
    assert!(matches!(
        first_statement("x: int = 1\n"),
        Statement::VariableDeclarations(_)
    ));
    let Statement::Assignment(assignment) = first_statement("self.x: int = 1\n") else {
        panic!("expected an assignment");
    };
    assert!(matches!(
        assignment.variable,
        Expression::TypeHintedExpression(_)
    ));
}

#[test]
fn test_soft_keywords_stay_names() {
    let unit = parse("match = 1\ntype = 2\nmatch(x)\n");
    assert!(matches!(unit.statements[0].element, Statement::Assignment(_)));
    assert!(matches!(unit.statements[1].element, Statement::Assignment(_)));
    assert!(matches!(
        unit.statements[2].element,
        Statement::ExpressionStatement(_)
    ));
}

#[test]
fn test_match_statement() {
    let source = "match p:\n    case Point(x=0, y=_) | [1, *rest]:\n        pass\n    case {'k': v, **kw} if v:\n        pass\n";
    let Statement::Switch(switch) = first_statement(source) else {
        panic!("expected a match");
    };
    assert_eq!(switch.cases.statements.len(), 2);
    let Statement::Case(case) = &switch.cases.statements[0].element else {
        panic!("expected a case");
    };
    let Expression::MatchCase(label) = &case.label else {
        panic!("expected a match case");
    };
    assert_eq!(label.pattern.kind, PatternKind::Or);
}

#[test]
fn test_with_items() {
    let Statement::Try(with) = first_statement("with (open(a) as f, b):\n    pass\n") else {
        panic!("expected a with");
    };
    let resources = with.resources.as_ref().unwrap();
    assert_eq!(resources.len(), 2);
    assert!(!resources.markers.has_omit_parentheses());

    let Statement::Try(with) = first_statement("with (a) as f:\n    pass\n") else {
        panic!("expected a with");
    };
    assert!(with.resources.as_ref().unwrap().markers.has_omit_parentheses());
}

#[test]
fn test_with_parenthesized_yield_is_one_item() {
    let Statement::Try(with) = first_statement("with (yield):\n    pass\n") else {
        panic!("expected a with");
    };
    let resources = with.resources.as_ref().unwrap();
    assert_eq!(resources.len(), 1);
    assert!(resources.markers.has_omit_parentheses());
}

#[test]
fn test_slice_tuples() {
    let statement = first_statement("a[1:2, ::3]\n");
    let Expression::ArrayAccess(access) = expression_of(&statement) else {
        panic!("expected a subscript");
    };
    let Expression::CollectionLiteral(tuple) = &access.dimension.index.element else {
        panic!("expected a tuple of slices");
    };
    assert_eq!(tuple.elements.len(), 2);
    let Expression::Slice(second) = &tuple.elements.elements[1].element else {
        panic!("expected a slice");
    };
    assert!(matches!(second.start.element, Expression::Empty(_)));
    assert!(matches!(second.stop.element, Expression::Empty(_)));
    assert!(second.step.is_some());
}

#[test]
fn test_loop_else_wraps() {
    let statement = first_statement("for x in y:\n    pass\nelse:\n    pass\n");
    let Statement::TrailingElseWrapper(wrapper) = statement else {
        panic!("expected a trailing else");
    };
    assert!(matches!(wrapper.statement, Statement::ForEachLoop(_)));
}

#[test]
fn test_generator_argument_omits_parentheses() {
    let statement = first_statement("sum(x for x in y)\n");
    let Expression::MethodInvocation(call) = expression_of(&statement) else {
        panic!("expected a call");
    };
    let Expression::ComprehensionExpression(generator) = &call.arguments.elements[0].element
    else {
        panic!("expected a generator");
    };
    assert!(generator.markers.has_omit_parentheses());
}

#[test]
fn test_string_concatenation() {
    let statement = first_statement("'a' 'b'\n");
    let Expression::PyBinary(binary) = expression_of(&statement) else {
        panic!("expected a concatenation");
    };
    assert_eq!(
        binary.operator.element,
        PyBinaryOperator::StringConcatenation
    );
    assert_eq!(binary.operator.before.whitespace, " ");
}

#[test]
fn test_bom_is_recorded() {
    let unit = parse("\u{feff}x = 1\n");
    assert!(unit.charset_bom_marked);
    assert_eq!(unit.statements.len(), 1);
}

#[test]
fn test_syntax_errors() {
    for source in ["x = (1,\n", "if x:\npass\n", "  x = 1\n", "def f(:\n    pass\n", "a b\n"] {
        assert!(parse_module("bad.py", source).is_err(), "{source:?} parsed");
    }
}

#[test]
fn test_parse_source_wraps_failures() {
    let source = parse_source("bad.py", "def (:\n");
    let SourceFile::ParseError(error) = source else {
        panic!("expected a parse error");
    };
    assert_eq!(error.text, "def (:\n");
    let Some(Marker::ParseExceptionResult {
        parser_type,
        exception_type,
        ..
    }) = error.markers.parse_exception()
    else {
        panic!("expected the exception marker");
    };
    assert_eq!(parser_type, PARSER_TYPE);
    assert_eq!(exception_type, "SyntaxError");
}

#[test]
fn test_parse_path_records_checksum() {
    let dir = std::env::temp_dir().join(format!("rewrite-python-lst-{}", random_id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("m.py");
    std::fs::write(&path, "x = 1\n").unwrap();
    let source = parse_path(&path, "m.py").unwrap();
    let SourceFile::CompilationUnit(unit) = source else {
        panic!("expected a compilation unit");
    };
    assert_eq!(unit.checksum.as_ref().unwrap().algorithm, "SHA-256");
    assert!(unit.file_attributes.is_some());
    std::fs::remove_dir_all(&dir).unwrap();
}
