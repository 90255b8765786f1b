// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::rc::Rc;

use super::*;
use crate::parser::{parse_module, parse_source, prettify_error};
use crate::tree::*;

fn round_trip(source: &str) {
    let unit = match parse_module("test.py", source) {
        Ok(unit) => unit,
        Err(err) => panic!("{}", prettify_error(&err, source, "test.py")),
    };
    let printed = print(&SourceFile::CompilationUnit(Rc::new(unit)));
    assert_eq!(printed, source, "printing did not reproduce the source");
}

#[test]
fn test_simple_statements() {
    round_trip("x = 1\ny  +=  2 ;z=3\n");
    round_trip("del a, b[0] ,c.d\n");
    round_trip("global a ,b\nnonlocal  c\n");
    round_trip("assert x , 'message'\npass\n");
    round_trip("raise ValueError('x') from err\nraise\n");
    round_trip("import os.path as p, sys\nfrom . import (a as b,\n    c,\n)\nfrom ..x import *\n");
    round_trip("a = b = c\n");
    round_trip("x: int = 1\nself.y: 'Node' = None\n");
    round_trip("type Alias[T] = list[T]\n");
}

#[test]
fn test_expressions() {
    round_trip("a + b * (c - d) ** -e // f @ g\n");
    round_trip("not a and b or c\n");
    round_trip("a if b else c\n");
    round_trip("a is not  b\nc not in d\nx < y <= z\n");
    round_trip("f(a, *args, key=value, **kwargs)\n");
    round_trip("obj .attr[1:2, ::3] [ i ]\n");
    round_trip("lambda x, y=1, *a, **k: x + y\n");
    round_trip("(yield)\n");
    round_trip("await  task\n");
    round_trip("if (n := len(a)) > 10:\n    pass\n");
    round_trip("'a' \"b\"\nb'bytes'\n...\n");
    round_trip("x = 1j + 0x1F + 1_000.5e-3\n");
}

#[test]
fn test_collections_and_comprehensions() {
    round_trip("a = [1, 2 ,3]\nb = ( )\nc = {1,}\nd = {'k': v, **rest}\ne = 1,\nf = []\n");
    round_trip("[x for x in y if x if not z]\n");
    round_trip("{k: v for k, v in items}\n{s for s in t}\n");
    round_trip("sum(x for x in range(3))\n");
    round_trip("[y async for y in aiter()]\n");
    round_trip("a, *b = c\n");
}

#[test]
fn test_fstrings() {
    round_trip("f'plain {x} text'\n");
    round_trip("f\"{x=!r:>{width}}\"\n");
    round_trip("rf'''\n{a}\n{b!s}'''\n");
    round_trip("f'{ x = }'\n");
    round_trip("f'{{escaped}} {y:%Y-%m-%d}'\n");
}

#[test]
fn test_compound_statements() {
    round_trip("if a:\n    b\nelif c:\n    d\nelse:\n    e\n");
    round_trip("while x:\n    break\nelse:\n    continue\n");
    round_trip("for i, j in pairs:\n    pass\nelse:\n    pass\n");
    round_trip(
        "try:\n    a\nexcept ValueError as e:\n    b\nexcept (A, B):\n    c\nexcept:\n    d\nelse:\n    e\nfinally:\n    f\n",
    );
    round_trip("try:\n    pass\nexcept* Group as g:\n    pass\n");
    round_trip("with open(p) as f, lock:\n    pass\n");
    round_trip("with (\n    a as b,\n    c,\n):\n    pass\n");
    round_trip("async def f():\n    async with a as b:\n        async for x in y:\n            await x\n");
    round_trip("if x: pass\n");
}

#[test]
fn test_definitions() {
    round_trip("@decorator\n@other(1)\ndef f(a, b: int = 2, *, c, **kw) -> bool:\n    return a\n");
    round_trip("def g[T: int, *Ts, **P](x: T, /, y) -> None:\n    ...\n");
    round_trip("class A(Base, metaclass=Meta):\n    x = 1\n\n    def m(self):\n        pass\n");
    round_trip("class B:\n    pass\n");
    round_trip("class C[T]():\n    pass\n");
}

#[test]
fn test_annotations() {
    round_trip("x: dict[str, list[int]] = {}\n");
    round_trip("y: int | None | 'Forward'\n");
    round_trip("z: Callable[[int, str], bool]\n");
    round_trip("w: Literal['a', 1, -2]\n");
}

#[test]
fn test_match_statement() {
    round_trip(
        "match command.split():\n    case [action]:\n        pass\n    case [action, obj]:\n        pass\n    case Point(x=0, y=0) | Point(1, 2):\n        pass\n    case {'key': value, **rest}:\n        pass\n    case (a, *others) if a > 0:\n        pass\n    case 1 | -2 | 'three' | None:\n        pass\n    case a.b as c:\n        pass\n    case _:\n        pass\n",
    );
    round_trip("match x:\n    case 1, 2:\n        pass\n    case ( ):\n        pass\n");
}

#[test]
fn test_comments_and_blank_lines() {
    round_trip("# leading\n\n\nx = 1  # trailing\n\n# between\ndef f():\n    # inside\n    pass\n    # dangling\n\n# end\n");
    round_trip("x = [\n    1,  # one\n    2,\n]\n");
    round_trip("a = 1 \\\n    + 2\n");
    round_trip("\n\n");
    round_trip("");
    round_trip("x = 1");
    round_trip("if x:\n\tpass\n");
}

#[test]
fn test_bom_is_reprinted() {
    round_trip("\u{feff}import os\n");
}

#[test]
fn test_parse_error_prints_original_text() {
    let text = "\u{feff}def broken(:\n    pass\n";
    let source = parse_source("bad.py", text);
    assert!(source.is_parse_error());
    assert_eq!(print(&source), text);
}

fn assignment(value: Expression) -> Rc<Assignment> {
    Rc::new(Assignment::new(
        Space::EMPTY,
        Markers::EMPTY,
        identifier(Space::EMPTY, "n").into(),
        LeftPadded::build(Space::single_space(), value),
    ))
}

fn number(prefix: Space, text: &str) -> Expression {
    Expression::Literal(Rc::new(Literal::new(
        prefix,
        Markers::EMPTY,
        text.to_string(),
        LiteralKind::Integer,
    )))
}

#[test]
fn test_assignment_prints_walrus_outside_statement_position() {
    let assign = assignment(number(Space::single_space(), "1"));
    assert_eq!(print_tree(&assign.clone().into_tree()), "n = 1");

    let group = Rc::new(Parentheses::new(
        Space::EMPTY,
        Markers::EMPTY,
        RightPadded::new(Expression::Assignment(assign)),
    ));
    assert_eq!(print_tree(&group.into_tree()), "(n := 1)");
}

fn marked_unit(markers: Markers) -> SourceFile {
    let name = Rc::new(Identifier::new(Space::EMPTY, markers, "target".to_string()));
    let statement = Expression::Identifier(name).into_statement();
    SourceFile::CompilationUnit(Rc::new(CompilationUnit::new(
        Space::EMPTY,
        Markers::EMPTY,
        "t.py".to_string(),
        None,
        false,
        None,
        None,
        Vec::new(),
        vec![RightPadded::new(statement)],
        Space::new("\n"),
    )))
}

#[test]
fn test_search_results_in_each_marker_printer() {
    let marker = Marker::search_result(None);
    let id = marker.id();
    let source = marked_unit(Markers::build(vec![marker]));
    assert_eq!(print(&source), "/*~~>*/target\n");
    assert_eq!(print_with(&source, MarkerPrinter::Sanitized), "target\n");
    assert_eq!(
        print_with(&source, MarkerPrinter::Fenced),
        format!("{{{{{id}}}}}target{{{{{id}}}}}\n")
    );

    let described = marked_unit(Markers::build(vec![Marker::search_result(Some(
        "found it".to_string(),
    ))]));
    assert_eq!(print(&described), "/*~~(found it)~~>*/target\n");
}

#[test]
fn test_suppress_newline_drops_final_line_break() {
    let unit = parse_module("t.py", "x = 1\n").unwrap();
    let unit = Rc::new(unit).with_markers(Markers::build(vec![Marker::suppress_newline()]));
    assert_eq!(print(&SourceFile::CompilationUnit(unit)), "x = 1");
}

#[test]
fn test_quoted_identifier_prints_quotes() {
    let name = Rc::new(Identifier::new(
        Space::EMPTY,
        Markers::build(vec![Marker::quoted(QuoteStyle::Double)]),
        "Node".to_string(),
    ));
    assert_eq!(print_tree(&name.into_tree()), "\"Node\"");
}
