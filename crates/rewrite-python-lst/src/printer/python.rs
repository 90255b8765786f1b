// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Printing of the Python-only node kinds.

use crate::printer::{shared, Printer};
use crate::tree::source::BOM;
use crate::tree::*;

pub(super) fn print(p: &mut Printer, tree: &Tree) {
    match tree {
        Tree::CompilationUnit(node) => {
            if node.charset_bom_marked {
                p.word(&BOM.to_string());
            }
            p.before_syntax(&node.prefix, &node.markers);
            p.statements(&node.statements);
            p.space(&node.eof);
            if node.markers.has_suppress_newline() && p.out.ends_with('\n') {
                p.out.pop();
            }
            p.after_syntax(&node.markers);
        }
        Tree::Async(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("async");
            p.print(&node.statement);
            p.after_syntax(&node.markers);
        }
        Tree::Await(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("await");
            p.print(&node.expression);
            p.after_syntax(&node.markers);
        }
        Tree::PyBinary(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.left);
            p.space(&node.operator.before);
            let operator = node.operator.element;
            p.word(operator.symbol());
            if let Some(negation) = &node.negation {
                p.space(negation);
                p.word(match operator {
                    PyBinaryOperator::NotIn => "in",
                    _ => "not",
                });
            }
            p.print(&node.right);
            p.after_syntax(&node.markers);
        }
        Tree::ChainedAssignment(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            for variable in &node.variables {
                p.print(&variable.element);
                p.space(&variable.after);
                p.word("=");
            }
            p.print(&node.assignment);
            p.after_syntax(&node.markers);
        }
        Tree::CollectionLiteral(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            let (open, close) = match node.kind {
                CollectionKind::List => ("[", "]"),
                CollectionKind::Set => ("{", "}"),
                CollectionKind::Tuple => ("(", ")"),
            };
            let omit = node.markers.has_omit_parentheses();
            p.space(&node.elements.before);
            if !omit {
                p.word(open);
            }
            p.padded_list(&node.elements.elements, ",");
            if !omit {
                p.word(close);
            }
            p.after_syntax(&node.markers);
        }
        Tree::ComprehensionExpression(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            let (open, close) = node.kind.delimiters();
            let omit = node.markers.has_omit_parentheses();
            if !omit {
                p.word(open);
            }
            p.print(&node.result);
            for clause in &node.clauses {
                p.print(clause);
            }
            p.space(&node.suffix);
            if !omit {
                p.word(close);
            }
            p.after_syntax(&node.markers);
        }
        Tree::ComprehensionClause(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            if let Some(async_space) = &node.async_space {
                p.word("async");
                p.space(async_space);
            }
            p.word("for");
            p.print(&node.iterator_variable);
            p.space(&node.iterated_list.before);
            p.word("in");
            p.print(&node.iterated_list.element);
            for condition in &node.conditions {
                p.print(condition);
            }
            p.after_syntax(&node.markers);
        }
        Tree::ComprehensionCondition(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("if");
            p.print(&node.expression);
            p.after_syntax(&node.markers);
        }
        Tree::Del(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("del");
            p.padded_list(&node.targets, ",");
            p.after_syntax(&node.markers);
        }
        Tree::DictLiteral(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.container(&node.elements, "{", "}");
            p.after_syntax(&node.markers);
        }
        Tree::ErrorFrom(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.error);
            p.space(&node.from.before);
            p.word("from");
            p.print(&node.from.element);
            p.after_syntax(&node.markers);
        }
        Tree::ExceptionType(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            if node.exception_group {
                p.word("*");
            }
            p.print(&node.expression);
            if let Some(alias) = &node.alias {
                p.space(&alias.before);
                p.word("as");
                p.print(&alias.element);
            }
            p.after_syntax(&node.markers);
        }
        // The adapters own no formatting; the wrapped node prints its own.
        Tree::ExpressionStatement(node) => p.print(&node.expression),
        Tree::StatementExpression(node) => p.print(&node.statement),
        Tree::ExpressionTypeTree(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.reference);
            p.after_syntax(&node.markers);
        }
        Tree::FormattedString(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word(&node.delimiter);
            for part in &node.parts {
                p.print(part);
            }
            p.word(closing_quote(&node.delimiter));
            p.after_syntax(&node.markers);
        }
        Tree::FormattedStringValue(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("{");
            p.print(&node.expression.element);
            p.space(&node.expression.after);
            if let Some(debug) = &node.debug {
                if debug.element {
                    p.word("=");
                }
                p.space(&debug.after);
            }
            if let Some(conversion) = node.conversion {
                p.word("!");
                p.word(&conversion.letter().to_string());
            }
            if let Some(format) = &node.format {
                p.word(":");
                p.print(format);
            }
            p.word("}");
            p.after_syntax(&node.markers);
        }
        Tree::KeyValue(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.key.element);
            p.space(&node.key.after);
            p.word(":");
            p.print(&node.value);
            p.after_syntax(&node.markers);
        }
        Tree::LiteralType(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.literal);
            p.after_syntax(&node.markers);
        }
        Tree::MatchCase(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.pattern);
            if let Some(guard) = &node.guard {
                p.space(&guard.before);
                p.word("if");
                p.print(&guard.element);
            }
            p.after_syntax(&node.markers);
        }
        Tree::MatchPattern(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            pattern(p, node);
            p.after_syntax(&node.markers);
        }
        Tree::MultiImport(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            if let Some(from) = &node.from {
                p.word("from");
                p.print(&from.element);
                p.space(&from.after);
            }
            p.word("import");
            if node.parenthesized {
                p.container(&node.names, "(", ")");
            } else {
                p.space(&node.names.before);
                p.padded_list(&node.names.elements, ",");
            }
            p.after_syntax(&node.markers);
        }
        Tree::NamedArgument(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.name);
            p.space(&node.value.before);
            p.word("=");
            p.print(&node.value.element);
            p.after_syntax(&node.markers);
        }
        Tree::Pass(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("pass");
            p.after_syntax(&node.markers);
        }
        Tree::Slice(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.start.element);
            p.space(&node.start.after);
            p.word(":");
            p.print(&node.stop.element);
            p.space(&node.stop.after);
            if let Some(step) = &node.step {
                p.word(":");
                p.print(&step.element);
                p.space(&step.after);
            }
            p.after_syntax(&node.markers);
        }
        Tree::SpecialParameter(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word(match node.kind {
                SpecialParameterKind::Args => "*",
                SpecialParameterKind::Kwargs => "**",
            });
            p.print(&node.name);
            p.after_syntax(&node.markers);
        }
        Tree::Star(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word(match node.kind {
                StarKind::List => "*",
                StarKind::Dict => "**",
            });
            p.print(&node.expression);
            p.after_syntax(&node.markers);
        }
        Tree::TrailingElseWrapper(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.statement);
            p.space(&node.else_block.before);
            p.word("else");
            p.print(&node.else_block.element);
            p.after_syntax(&node.markers);
        }
        Tree::TypeAlias(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("type");
            p.print(&node.name);
            p.print_opt(&node.type_parameters);
            p.space(&node.value.before);
            p.word("=");
            p.print(&node.value.element);
            p.after_syntax(&node.markers);
        }
        Tree::TypeHint(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word(match node.kind {
                TypeHintKind::VariableType => ":",
                TypeHintKind::ReturnType => "->",
            });
            p.print(&node.type_tree);
            p.after_syntax(&node.markers);
        }
        Tree::TypeHintedExpression(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.print(&node.expression);
            p.print(&node.type_hint);
            p.after_syntax(&node.markers);
        }
        Tree::UnionType(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.padded_list(&node.types, "|");
            p.after_syntax(&node.markers);
        }
        Tree::VariableScope(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word(match node.kind {
                VariableScopeKind::Global => "global",
                VariableScopeKind::Nonlocal => "nonlocal",
            });
            p.padded_list(&node.names, ",");
            p.after_syntax(&node.markers);
        }
        Tree::YieldFrom(node) => {
            p.before_syntax(&node.prefix, &node.markers);
            p.word("yield");
            p.space(&node.from);
            p.word("from");
            p.print(&node.expression);
            p.after_syntax(&node.markers);
        }
        other => shared::print(p, other),
    }
}

/// The quotes that close an f-string opened by `delimiter`: everything
/// from its first quote character on. A format spec has no delimiter.
fn closing_quote(delimiter: &str) -> &str {
    match delimiter.find(['\'', '"']) {
        Some(quote) => &delimiter[quote..],
        None => "",
    }
}

fn pattern(p: &mut Printer, node: &MatchPattern) {
    let children = &node.children.elements;
    match node.kind {
        PatternKind::Or => p.padded_list(children, "|"),
        PatternKind::Sequence => p.padded_list(children, ","),
        PatternKind::SequenceList => {
            p.word("[");
            p.padded_list(children, ",");
            p.word("]");
        }
        PatternKind::SequenceTuple | PatternKind::Group => {
            p.word("(");
            p.padded_list(children, ",");
            p.word(")");
        }
        PatternKind::Mapping => {
            p.word("{");
            p.padded_list(children, ",");
            p.word("}");
        }
        PatternKind::As => p.padded_list(children, "as"),
        PatternKind::KeyValue => p.padded_list(children, ":"),
        PatternKind::Keyword => p.padded_list(children, "="),
        PatternKind::DoubleStar => {
            p.word("**");
            p.padded_list(children, ",");
        }
        PatternKind::Star => {
            p.word("*");
            p.padded_list(children, ",");
        }
        PatternKind::ClassName => {
            if let Some((class, arguments)) = children.split_first() {
                p.print(&class.element);
                p.space(&class.after);
                p.word("(");
                p.padded_list(arguments, ",");
                p.word(")");
            }
        }
        PatternKind::Literal | PatternKind::Capture | PatternKind::Value | PatternKind::Wildcard => {
            p.padded_list(children, ",");
        }
    }
}
