// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Printing of the node kinds shared with other languages, in Python
//! syntax.

use crate::printer::{python, Printer};
use crate::tree::*;

pub(super) fn print(p: &mut Printer, tree: &Tree) {
    match tree {
        Tree::Identifier(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            match node.markers.quoted() {
                Some(style) => {
                    let quote = style.quote().to_string();
                    p.word(&quote);
                    p.word(&node.simple_name);
                    p.word(&quote);
                }
                None => p.word(&node.simple_name),
            }
            p.after_syntax(&node.markers);
        }
        Tree::Literal(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word(&node.value_source);
            p.after_syntax(&node.markers);
        }
        Tree::Assignment(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.variable);
            p.space(&node.assignment.before);
            p.word(if in_statement_position(p) { "=" } else { ":=" });
            p.print(&node.assignment.element);
            p.after_syntax(&node.markers);
        }
        Tree::AssignmentOp(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.variable);
            p.space(&node.operator.before);
            p.word(node.operator.element.symbol());
            p.print(&node.assignment);
            p.after_syntax(&node.markers);
        }
        Tree::Binary(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.left);
            p.space(&node.operator.before);
            p.word(node.operator.element.symbol());
            p.print(&node.right);
            p.after_syntax(&node.markers);
        }
        Tree::Unary(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.space(&node.operator.before);
            p.word(node.operator.element.symbol());
            p.print(&node.expression);
            p.after_syntax(&node.markers);
        }
        Tree::FieldAccess(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.target);
            p.space(&node.name.before);
            p.word(".");
            p.print(&node.name.element);
            p.after_syntax(&node.markers);
        }
        Tree::MethodInvocation(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            if let Some(select) = &node.select {
                p.print(&select.element);
                p.space(&select.after);
                if !node.name.simple_name.is_empty() {
                    p.word(".");
                }
            }
            p.print(&node.name);
            p.container(&node.arguments, "(", ")");
            p.after_syntax(&node.markers);
        }
        Tree::ArrayAccess(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.indexed);
            p.print(&node.dimension);
            p.after_syntax(&node.markers);
        }
        Tree::ArrayDimension(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("[");
            p.print(&node.index.element);
            p.space(&node.index.after);
            p.word("]");
            p.after_syntax(&node.markers);
        }
        Tree::Parentheses(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("(");
            p.print(&node.tree.element);
            p.space(&node.tree.after);
            p.word(")");
            p.after_syntax(&node.markers);
        }
        Tree::ControlParentheses(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.tree.element);
            p.space(&node.tree.after);
            p.after_syntax(&node.markers);
        }
        Tree::Block(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word(":");
            p.statements(&node.statements);
            p.space(&node.end);
            p.after_syntax(&node.markers);
        }
        Tree::If(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("if");
            p.print(&node.condition);
            p.print(&node.then_part.element);
            p.space(&node.then_part.after);
            p.print_opt(&node.else_part);
            p.after_syntax(&node.markers);
        }
        Tree::Else(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            // `elif` is an `else` whose body is the nested `if`.
            p.word(if matches!(node.body.element, Statement::If(_)) {
                "el"
            } else {
                "else"
            });
            p.print(&node.body.element);
            p.space(&node.body.after);
            p.after_syntax(&node.markers);
        }
        Tree::WhileLoop(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("while");
            p.print(&node.condition);
            p.print(&node.body.element);
            p.space(&node.body.after);
            p.after_syntax(&node.markers);
        }
        Tree::ForEachLoop(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("for");
            p.print(&node.control);
            p.print(&node.body.element);
            p.space(&node.body.after);
            p.after_syntax(&node.markers);
        }
        Tree::ForEachControl(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.variable.element);
            p.space(&node.variable.after);
            p.word("in");
            p.print(&node.iterable.element);
            p.space(&node.iterable.after);
            p.after_syntax(&node.markers);
        }
        Tree::Try(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            match &node.resources {
                Some(resources) => {
                    p.word("with");
                    p.container(resources, "(", ")");
                }
                None => p.word("try"),
            }
            p.print(&node.body);
            for catch in &node.catches {
                p.print(catch);
            }
            if let Some(else_block) = &node.else_block {
                p.space(&else_block.before);
                p.word("else");
                p.print(&else_block.element);
            }
            if let Some(finally) = &node.finally {
                p.space(&finally.before);
                p.word("finally");
                p.print(&finally.element);
            }
            p.after_syntax(&node.markers);
        }
        Tree::Catch(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("except");
            p.print_opt(&node.exception);
            p.print(&node.body);
            p.after_syntax(&node.markers);
        }
        Tree::Resource(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.expression);
            if let Some(alias) = &node.alias {
                p.space(&alias.before);
                p.word("as");
                p.print(&alias.element);
            }
            p.after_syntax(&node.markers);
        }
        Tree::Throw(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("raise");
            p.print_opt(&node.exception);
            p.after_syntax(&node.markers);
        }
        Tree::Return(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("return");
            p.print_opt(&node.expression);
            p.after_syntax(&node.markers);
        }
        Tree::Break(node) => keyword(p, &node.prefix, &node.markers, "break"),
        Tree::Continue(node) => keyword(p, &node.prefix, &node.markers, "continue"),
        Tree::Assert(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("assert");
            p.print(&node.condition);
            if let Some(detail) = &node.detail {
                p.space(&detail.before);
                p.word(",");
                p.print(&detail.element);
            }
            p.after_syntax(&node.markers);
        }
        Tree::Switch(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("match");
            p.print(&node.selector);
            p.print(&node.cases);
            p.after_syntax(&node.markers);
        }
        Tree::Case(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("case");
            p.print(&node.label);
            p.print(&node.body);
            p.after_syntax(&node.markers);
        }
        Tree::Lambda(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("lambda");
            p.print(&node.parameters);
            p.space(&node.arrow);
            p.word(":");
            p.print(&node.body);
            p.after_syntax(&node.markers);
        }
        Tree::LambdaParameters(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.padded_list(&node.parameters, ",");
            p.after_syntax(&node.markers);
        }
        Tree::MethodDeclaration(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            for annotation in &node.leading_annotations {
                p.print(annotation);
            }
            for modifier in &node.modifiers {
                p.print(modifier);
            }
            p.print(&node.name);
            p.print_opt(&node.type_parameters);
            p.container(&node.parameters, "(", ")");
            p.print_opt(&node.return_type);
            p.print(&node.body);
            p.after_syntax(&node.markers);
        }
        Tree::ClassDeclaration(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            for annotation in &node.leading_annotations {
                p.print(annotation);
            }
            p.print(&node.kind);
            p.print(&node.name);
            p.print_opt(&node.type_parameters);
            if let Some(bases) = &node.implements {
                p.container(bases, "(", ")");
            }
            p.print(&node.body);
            p.after_syntax(&node.markers);
        }
        Tree::ClassKind(node) => keyword(p, &node.prefix, &node.markers, "class"),
        Tree::VariableDeclarations(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            for modifier in &node.modifiers {
                p.print(modifier);
            }
            p.padded_list(&node.variables, ",");
            p.after_syntax(&node.markers);
        }
        Tree::NamedVariable(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.name);
            // The declaration's type hint sits between its first name and
            // the initializer.
            let hint = p
                .cursor()
                .parent()
                .and_then(|parent| parent.downcast::<VariableDeclarations>())
                .filter(|declarations| {
                    declarations
                        .variables
                        .first()
                        .is_some_and(|first| first.element.id == node.id)
                })
                .and_then(|declarations| declarations.type_expression.clone());
            p.print_opt(&hint);
            if let Some(initializer) = &node.initializer {
                p.space(&initializer.before);
                p.word("=");
                p.print(&initializer.element);
            }
            p.after_syntax(&node.markers);
        }
        Tree::Import(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.qualid);
            if let Some(alias) = &node.alias {
                p.space(&alias.before);
                p.word("as");
                p.print(&alias.element);
            }
            p.after_syntax(&node.markers);
        }
        Tree::Annotation(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("@");
            p.print(&node.annotation_type);
            p.after_syntax(&node.markers);
        }
        Tree::NewArray(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.container(&node.initializer, "[", "]");
            p.after_syntax(&node.markers);
        }
        Tree::Modifier(node) => keyword(p, &node.prefix, &node.markers, &node.keyword),
        Tree::Ternary(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.true_part);
            p.space(&node.condition.before);
            p.word("if");
            p.print(&node.condition.element);
            p.space(&node.false_part.before);
            p.word("else");
            p.print(&node.false_part.element);
            p.after_syntax(&node.markers);
        }
        Tree::Yield(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("yield");
            p.print_opt(&node.value);
            p.after_syntax(&node.markers);
        }
        Tree::ParameterizedType(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.clazz);
            p.container(&node.type_parameters, "[", "]");
            p.after_syntax(&node.markers);
        }
        Tree::TypeParameter(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word(node.kind.stars());
            p.print(&node.name);
            if let Some(bounds) = &node.bounds {
                p.space(&bounds.before);
                p.word(":");
                p.print(&bounds.element);
            }
            if let Some(default) = &node.default {
                p.space(&default.before);
                p.word("=");
                p.print(&default.element);
            }
            p.after_syntax(&node.markers);
        }
        Tree::TypeParameters(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("[");
            p.padded_list(&node.parameters, ",");
            p.word("]");
            p.after_syntax(&node.markers);
        }
        Tree::Empty(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.after_syntax(&node.markers);
        }
        Tree::ParseError(node) => {
            if node.charset_bom_marked {
                p.word(&crate::tree::source::BOM.to_string());
            }
            p.word(&node.text);
        }
        other => python::print(p, other),
    }
}

fn keyword(p: &mut Printer, prefix: &Space, markers: &Markers, keyword: &str) {
    p.before_syntax(prefix, markers);
    p.word(keyword);
    p.after_syntax(markers);
}

/// An assignment directly in a block or file is a statement; anywhere else
/// it is a walrus.
fn in_statement_position(p: &Printer) -> bool {
    match p.cursor().parent() {
        None => true,
        Some(parent) => parent.is::<Block>() || parent.is::<CompilationUnit>(),
    }
}
