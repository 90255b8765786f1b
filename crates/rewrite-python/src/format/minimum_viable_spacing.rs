//! The least whitespace that keeps the printed code valid: statements that
//! are not separated by `;` start on their own line, and keywords are
//! separated from the names that follow them.

use std::rc::Rc;

use rewrite_python_lst::print_tree;
use rewrite_python_lst::tree::{
    Assert, Await, Block, ClassDeclaration, CompilationUnit, ControlParentheses, Del, Expression,
    ForEachControl, ForEachLoop, If, MethodDeclaration, Node, Return, RightPadded, Space,
    Statement, Throw, Tree, WhileLoop, Yield,
};
use rewrite_python_lst::visitor::{TreeVisitor, VisitState};

use super::style::TabsAndIndentsStyle;
use super::stage_builders;

#[derive(Debug, Default)]
pub struct MinimumViableSpacing {
    state: VisitState,
    style: TabsAndIndentsStyle,
}

impl MinimumViableSpacing {
    pub fn new(style: TabsAndIndentsStyle) -> Self {
        MinimumViableSpacing {
            state: VisitState::new(),
            style,
        }
    }
}

stage_builders!(MinimumViableSpacing);

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn starts_with_word(tree: &Tree) -> bool {
    print_tree(tree).starts_with(is_word_char)
}

fn ends_with_word(tree: &Tree) -> bool {
    print_tree(tree).ends_with(is_word_char)
}

/// `expression` with a single leading space if it would otherwise run into
/// the keyword before it.
fn spaced(expression: &Expression) -> Expression {
    if expression.prefix().is_empty() && starts_with_word(&expression.to_tree()) {
        return expression.clone().with_prefix(Space::single_space());
    }
    expression.clone()
}

fn spaced_control(control: &Rc<ControlParentheses>) -> Rc<ControlParentheses> {
    if control.prefix.is_empty() && starts_with_word(&control.clone().into_tree()) {
        return control.clone().with_prefix(Space::single_space());
    }
    control.clone()
}

/// Puts every statement after the first on its own line unless the one
/// before it ends in `;`. Returns `None` when nothing changed.
fn break_lines(
    statements: &[RightPadded<Statement>],
    indent: &str,
) -> Option<Vec<RightPadded<Statement>>> {
    let mut changed = false;
    let mut out = Vec::with_capacity(statements.len());
    for (i, padded) in statements.iter().enumerate() {
        let joined = i > 0 && !statements[i - 1].markers.has_semicolon();
        if joined && !padded.element.prefix().contains_newline() {
            let prefix = padded.element.prefix().clone();
            let broken = Space::build(format!("\n{indent}"), prefix.comments.clone());
            out.push(
                padded
                    .clone()
                    .with_element(padded.element.clone().with_prefix(broken)),
            );
            changed = true;
        } else {
            out.push(padded.clone());
        }
    }
    changed.then_some(out)
}

impl<P> TreeVisitor<P> for MinimumViableSpacing {
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
        match break_lines(&node.statements, "") {
            Some(statements) => node.with_statements(statements),
            None => node,
        }
    }

    fn visit_block(&mut self, node: Rc<Block>, p: &mut P) -> Rc<Block> {
        let owner_indent = <Self as TreeVisitor<P>>::cursor(self)
            .parent()
            .and_then(|owner| owner.prefix().indent().map(str::to_string))
            .unwrap_or_default();
        let node = node.walk_children(self, p);
        let indent = node
            .statements
            .iter()
            .find_map(|s| s.element.prefix().indent().map(str::to_string))
            .unwrap_or_else(|| owner_indent + &self.style.unit());
        match break_lines(&node.statements, &indent) {
            Some(statements) => node.with_statements(statements),
            None => node,
        }
    }

    fn visit_method_declaration(
        &mut self,
        node: Rc<MethodDeclaration>,
        p: &mut P,
    ) -> Rc<MethodDeclaration> {
        let node = node.walk_children(self, p);
        let modifiers: Vec<_> = node
            .modifiers
            .iter()
            .enumerate()
            .map(|(i, modifier)| {
                if i > 0 && modifier.prefix.is_empty() {
                    modifier.clone().with_prefix(Space::single_space())
                } else {
                    modifier.clone()
                }
            })
            .collect();
        let name = if node.name.prefix.is_empty() && !modifiers.is_empty() {
            node.name.clone().with_prefix(Space::single_space())
        } else {
            node.name.clone()
        };
        node.with_modifiers(modifiers).with_name(name)
    }

    fn visit_class_declaration(
        &mut self,
        node: Rc<ClassDeclaration>,
        p: &mut P,
    ) -> Rc<ClassDeclaration> {
        let node = node.walk_children(self, p);
        if node.name.prefix.is_empty() {
            let name = node.name.clone().with_prefix(Space::single_space());
            return node.with_name(name);
        }
        node
    }

    fn visit_return(&mut self, node: Rc<Return>, p: &mut P) -> Rc<Return> {
        let node = node.walk_children(self, p);
        let expression = node.expression.as_ref().map(spaced);
        node.with_expression(expression)
    }

    fn visit_throw(&mut self, node: Rc<Throw>, p: &mut P) -> Rc<Throw> {
        let node = node.walk_children(self, p);
        let exception = node.exception.as_ref().map(spaced);
        node.with_exception(exception)
    }

    fn visit_await(&mut self, node: Rc<Await>, p: &mut P) -> Rc<Await> {
        let node = node.walk_children(self, p);
        let expression = spaced(&node.expression);
        node.with_expression(expression)
    }

    fn visit_yield(&mut self, node: Rc<Yield>, p: &mut P) -> Rc<Yield> {
        let node = node.walk_children(self, p);
        let value = node.value.as_ref().map(spaced);
        node.with_value(value)
    }

    fn visit_assert(&mut self, node: Rc<Assert>, p: &mut P) -> Rc<Assert> {
        let node = node.walk_children(self, p);
        let condition = spaced(&node.condition);
        node.with_condition(condition)
    }

    fn visit_del(&mut self, node: Rc<Del>, p: &mut P) -> Rc<Del> {
        let node = node.walk_children(self, p);
        let Some(first) = node.targets.first() else {
            return node;
        };
        let mut targets = node.targets.clone();
        targets[0] = first.clone().with_element(spaced(&first.element));
        node.with_targets(targets)
    }

    fn visit_if(&mut self, node: Rc<If>, p: &mut P) -> Rc<If> {
        let node = node.walk_children(self, p);
        let condition = spaced_control(&node.condition);
        node.with_condition(condition)
    }

    fn visit_while_loop(&mut self, node: Rc<WhileLoop>, p: &mut P) -> Rc<WhileLoop> {
        let node = node.walk_children(self, p);
        let condition = spaced_control(&node.condition);
        node.with_condition(condition)
    }

    fn visit_for_each_loop(&mut self, node: Rc<ForEachLoop>, p: &mut P) -> Rc<ForEachLoop> {
        let node = node.walk_children(self, p);
        let control = &node.control;
        if !control.prefix.is_empty() || !starts_with_word(&control.clone().into_tree()) {
            return node;
        }
        let control = control.clone().with_prefix(Space::single_space());
        node.with_control(control)
    }

    fn visit_for_each_control(
        &mut self,
        node: Rc<ForEachControl>,
        p: &mut P,
    ) -> Rc<ForEachControl> {
        let node = node.walk_children(self, p);
        let variable = &node.variable;
        let variable = if variable.after.is_empty() && ends_with_word(&variable.element.to_tree()) {
            variable.clone().with_after(Space::single_space())
        } else {
            variable.clone()
        };
        let iterable = node
            .iterable
            .clone()
            .with_element(spaced(&node.iterable.element));
        node.with_variable(variable).with_iterable(iterable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewrite_python_lst::tree::{identifier, Markers, SourceFile};
    use rewrite_python_lst::{parse_module, print};

    fn unit(source: &str) -> Rc<CompilationUnit> {
        Rc::new(parse_module("m.py", source).unwrap())
    }

    #[test]
    fn joined_statements_get_their_own_line() {
        let cu = unit("a = 1\nb = 2\n");
        let mut statements = cu.statements.clone();
        let second = statements[1].element.clone().with_prefix(Space::EMPTY);
        statements[1] = statements[1].clone().with_element(second);
        let joined = SourceFile::CompilationUnit(cu.with_statements(statements));
        assert_eq!(print(&joined), "a = 1b = 2\n");

        let fixed = MinimumViableSpacing::default().visit_source_file(joined, &mut ());
        assert_eq!(print(&fixed), "a = 1\nb = 2\n");
    }

    #[test]
    fn semicolons_keep_statements_on_one_line() {
        let source = SourceFile::CompilationUnit(unit("a = 1; b = 2\n"));
        let fixed = MinimumViableSpacing::default().visit_source_file(source, &mut ());
        assert_eq!(print(&fixed), "a = 1; b = 2\n");
    }

    #[test]
    fn block_statements_take_their_siblings_indent() {
        let cu = unit("def f():\n    a = 1\n    b = 2\n");
        let Statement::MethodDeclaration(method) = &cu.statements[0].element else {
            panic!("expected a function");
        };
        let mut body = method.body.statements.clone();
        let second = body[1].element.clone().with_prefix(Space::EMPTY);
        body[1] = body[1].clone().with_element(second);
        let method = method
            .clone()
            .with_body(method.body.clone().with_statements(body));
        let mut statements = cu.statements.clone();
        statements[0] = statements[0]
            .clone()
            .with_element(Statement::MethodDeclaration(method));
        let source = SourceFile::CompilationUnit(cu.with_statements(statements));

        let fixed = MinimumViableSpacing::default().visit_source_file(source, &mut ());
        assert_eq!(print(&fixed), "def f():\n    a = 1\n    b = 2\n");
    }

    #[test]
    fn keywords_are_separated_from_names() {
        let cu = unit("def f(x):\n    return x\n");
        let Statement::MethodDeclaration(method) = &cu.statements[0].element else {
            panic!("expected a function");
        };
        let Statement::Return(ret) = &method.body.statements[0].element else {
            panic!("expected a return");
        };
        let bare = ret
            .clone()
            .with_expression(Some(Expression::Identifier(identifier(Space::EMPTY, "x"))));
        let body = vec![method.body.statements[0]
            .clone()
            .with_element(Statement::Return(bare))];
        let method = method
            .clone()
            .with_name(identifier(Space::EMPTY, "f"))
            .with_body(method.body.clone().with_statements(body));
        let source = SourceFile::CompilationUnit(cu.clone().with_statements(vec![
            cu.statements[0]
                .clone()
                .with_element(Statement::MethodDeclaration(method)),
        ]));
        assert_eq!(print(&source), "deff(x):\n    returnx\n");

        let fixed = MinimumViableSpacing::default().visit_source_file(source, &mut ());
        assert_eq!(print(&fixed), "def f(x):\n    return x\n");
    }

    #[test]
    fn punctuation_needs_no_space() {
        let ret = Rc::new(Return::new(
            Space::EMPTY,
            Markers::EMPTY,
            Some(spaced(&Expression::Identifier(identifier(Space::EMPTY, "x")))),
        ));
        assert_eq!(print_tree(&ret.into_tree()), "return x");
        let parenthesized = parse_module("p.py", "(x)\n").unwrap();
        let expression = parenthesized.statements[0].element.clone().into_expression();
        assert!(spaced(&expression).prefix().is_empty());
    }
}
