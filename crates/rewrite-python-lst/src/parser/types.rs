// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Annotations: expressions re-shaped into type trees.
//!
//! An annotation parses as an ordinary expression first and is then
//! converted:
//! - `X[A, B]` becomes a parameterized type
//! - `A | B` becomes a union
//! - `None` and the arguments of `Literal[...]` become literal types
//! - a quoted forward reference `"Name"` becomes a quoted identifier
//! - a list inside type arguments (`Callable[[int], str]`) becomes a
//!   bracketed array

use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::{PResult, Parser};
use crate::tree::*;

/// A dotted name as written inside a forward reference.
static FORWARD_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid regex")
});

impl<'a> Parser<'a> {
    pub(super) fn type_expression(&mut self) -> PResult<Expression> {
        let expression = self.expression()?;
        Ok(type_tree(expression))
    }
}

/// Converts an annotation expression into its type tree.
pub fn type_tree(expression: Expression) -> Expression {
    match expression {
        Expression::ArrayAccess(access) => parameterized(access),
        Expression::Binary(binary) if binary.operator.element == BinaryOperator::BitOr => {
            let prefix = binary.prefix.clone();
            let markers = binary.markers.clone();
            let types = union_members(Expression::Binary(binary));
            Expression::UnionType(Rc::new(UnionType::new(prefix, markers, types)))
        }
        Expression::Literal(literal) => match literal.kind {
            LiteralKind::None => literal_type(Expression::Literal(literal)),
            LiteralKind::String => match forward_reference(&literal) {
                Some(name) => name,
                None => Expression::Literal(literal),
            },
            _ => Expression::Literal(literal),
        },
        other => other,
    }
}

fn literal_type(expression: Expression) -> Expression {
    let prefix = expression.prefix().clone();
    Expression::LiteralType(Rc::new(LiteralType::new(
        prefix,
        Markers::EMPTY,
        expression.with_prefix(Space::EMPTY),
    )))
}

/// `"Name"` or `'pkg.Name'` as an identifier carrying its quote style.
fn forward_reference(literal: &Literal) -> Option<Expression> {
    let source = literal.value_source.as_str();
    let style = match source.chars().next()? {
        '"' => QuoteStyle::Double,
        '\'' => QuoteStyle::Single,
        _ => return None,
    };
    let quote = style.quote();
    let inner = source.strip_prefix(quote)?.strip_suffix(quote)?;
    if !FORWARD_REFERENCE.is_match(inner) {
        return None;
    }
    Some(Expression::Identifier(Rc::new(Identifier::new(
        literal.prefix.clone(),
        Markers::build(vec![Marker::quoted(style)]),
        inner.to_string(),
    ))))
}

/// The members of a `|` chain, each keeping the space before the `|` that
/// follows it.
fn union_members(expression: Expression) -> Vec<RightPadded<Expression>> {
    match expression {
        Expression::Binary(binary) if binary.operator.element == BinaryOperator::BitOr => {
            let binary = Rc::unwrap_or_clone(binary);
            let mut members = union_members(binary.left.with_prefix(Space::EMPTY));
            if let Some(last) = members.last_mut() {
                last.after = binary.operator.before;
            }
            members.push(RightPadded::new(type_tree(binary.right)));
            members
        }
        other => vec![RightPadded::new(type_tree(other))],
    }
}

fn is_literal_class(clazz: &Expression) -> bool {
    match clazz {
        Expression::Identifier(name) => name.simple_name == "Literal",
        Expression::FieldAccess(access) => access.name.element.simple_name == "Literal",
        _ => false,
    }
}

fn parameterized(access: Rc<ArrayAccess>) -> Expression {
    let access = Rc::unwrap_or_clone(access);
    let dimension = Rc::unwrap_or_clone(access.dimension);
    let literal_arguments = is_literal_class(&access.indexed);
    let close = dimension.index.after;
    let mut arguments = match dimension.index.element {
        Expression::CollectionLiteral(tuple)
            if tuple.kind == CollectionKind::Tuple && tuple.markers.has_omit_parentheses() =>
        {
            let tuple = Rc::unwrap_or_clone(tuple);
            let mut elements = tuple.elements.elements;
            elements[0].element = elements[0].element.clone().with_prefix(tuple.prefix);
            elements
        }
        index => vec![RightPadded::new(index)],
    };
    if let Some(last) = arguments.last_mut() {
        match last.markers.trailing_comma() {
            Some(_) => {
                last.markers = Markers::build(vec![Marker::trailing_comma(close)]);
            }
            None => last.after = close,
        }
    }
    let arguments = arguments
        .into_iter()
        .map(|argument| {
            argument.map(|element| {
                if literal_arguments {
                    type_argument_literal(element)
                } else {
                    type_argument(element)
                }
            })
        })
        .collect();
    Expression::ParameterizedType(Rc::new(ParameterizedType::new(
        access.prefix,
        access.markers,
        access.indexed,
        Container::build(dimension.prefix, arguments),
    )))
}

fn type_argument(expression: Expression) -> Expression {
    match expression {
        Expression::CollectionLiteral(list) if list.kind == CollectionKind::List => {
            let list = Rc::unwrap_or_clone(list);
            let elements = list.elements.elements;
            let elements = elements
                .into_iter()
                .map(|element| element.map(type_argument))
                .collect();
            Expression::NewArray(Rc::new(NewArray::new(
                list.prefix,
                list.markers,
                Container::build(list.elements.before, elements),
            )))
        }
        other => type_tree(other),
    }
}

fn type_argument_literal(expression: Expression) -> Expression {
    match expression {
        Expression::Literal(_) | Expression::Unary(_) => literal_type(expression),
        other => type_tree(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(source: &str) -> Expression {
        let text = format!("x: {source}\n");
        let unit = crate::parser::parse_module("t.py", &text).unwrap();
        match &unit.statements[0].element {
            Statement::VariableDeclarations(declarations) => declarations
                .type_expression
                .as_ref()
                .unwrap()
                .type_tree
                .clone(),
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn subscripts_become_parameterized_types() {
        let Expression::ParameterizedType(list) = annotation("dict[str, int]") else {
            panic!("expected a parameterized type");
        };
        assert_eq!(list.type_parameters.len(), 2);
        assert_eq!(list.type_parameters.elements[1].element.prefix().whitespace, " ");
    }

    #[test]
    fn unions_flatten() {
        let Expression::UnionType(union) = annotation("int | str | None") else {
            panic!("expected a union");
        };
        assert_eq!(union.types.len(), 3);
        assert!(matches!(union.types[2].element, Expression::LiteralType(_)));
        assert_eq!(union.types[0].after.whitespace, " ");
    }

    #[test]
    fn forward_references_keep_their_quotes() {
        let Expression::Identifier(name) = annotation("'Node'") else {
            panic!("expected an identifier");
        };
        assert_eq!(name.simple_name, "Node");
        assert_eq!(name.markers.quoted(), Some(QuoteStyle::Single));
    }

    #[test]
    fn literal_arguments_are_literal_types() {
        let Expression::ParameterizedType(literal) = annotation("Literal['a', 1]") else {
            panic!("expected a parameterized type");
        };
        assert!(literal
            .type_parameters
            .elements()
            .all(|argument| matches!(argument, Expression::LiteralType(_))));
    }

    #[test]
    fn callable_argument_lists_become_arrays() {
        let Expression::ParameterizedType(callable) = annotation("Callable[[int], str]") else {
            panic!("expected a parameterized type");
        };
        assert!(matches!(
            callable.type_parameters.elements[0].element,
            Expression::NewArray(_)
        ));
    }
}
