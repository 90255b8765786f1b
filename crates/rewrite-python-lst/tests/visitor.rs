// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Traversal behavior of `TreeVisitor`: structural sharing, cursor
//! discipline, list edits and early stops.

use std::rc::Rc;

use rewrite_python_lst::tree::*;
use rewrite_python_lst::visitor::{Transform, TreeVisitor, VisitState};
use rewrite_python_lst::{parse_module, print};

fn parse(source: &str) -> SourceFile {
    SourceFile::CompilationUnit(Rc::new(parse_module("v.py", source).unwrap()))
}

fn unit(source: &SourceFile) -> &Rc<CompilationUnit> {
    match source {
        SourceFile::CompilationUnit(unit) => unit,
        SourceFile::ParseError(_) => panic!("expected a compilation unit"),
    }
}

/// Re-sets every identifier's name to its current value.
#[derive(Default)]
struct SameName {
    state: VisitState,
    seen: usize,
}

impl TreeVisitor<()> for SameName {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_identifier(&mut self, node: Rc<Identifier>, _p: &mut ()) -> Rc<Identifier> {
        self.seen += 1;
        let name = node.simple_name.clone();
        node.with_simple_name(name)
    }
}

#[test]
fn unchanged_names_keep_the_tree_object() {
    let source = parse("def f(a, b):\n    return a.x + g(b)\n");
    let mut visitor = SameName::default();
    let after = visitor.visit_source_file(source.clone(), &mut ());
    assert!(visitor.seen >= 6);
    assert!(Rc::ptr_eq(unit(&after), unit(&source)));
    assert_eq!(print(&after), print(&source));
}

struct Rename {
    state: VisitState,
    from: &'static str,
    to: &'static str,
}

impl TreeVisitor<()> for Rename {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_identifier(&mut self, node: Rc<Identifier>, _p: &mut ()) -> Rc<Identifier> {
        if node.simple_name == self.from {
            return node.with_simple_name(self.to.to_string());
        }
        node
    }
}

#[test]
fn rename_rebuilds_only_the_changed_path() {
    let source = parse("import os\n\ndef f(a):\n    return a  # keep\n");
    let mut visitor = Rename {
        state: VisitState::new(),
        from: "a",
        to: "value",
    };
    let after = visitor.visit_source_file(source.clone(), &mut ());
    assert_eq!(
        print(&after),
        "import os\n\ndef f(value):\n    return value  # keep\n"
    );
    let before = unit(&source);
    let after = unit(&after);
    assert_eq!(before.id, after.id);
    match (&before.statements[0].element, &after.statements[0].element) {
        (Statement::MultiImport(old), Statement::MultiImport(new)) => {
            assert!(Rc::ptr_eq(old, new));
        }
        _ => panic!("expected the import first"),
    }
}

/// Checks that every node is visited with the cursor one frame deeper than
/// its parent and that the depth is restored afterwards.
#[derive(Default)]
struct DepthCheck {
    state: VisitState,
    stack: Vec<usize>,
    nodes: usize,
}

impl TreeVisitor<()> for DepthCheck {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn pre_visit(&mut self, tree: &Tree, _p: &mut ()) {
        let depth = self.cursor().depth();
        if let Some(parent) = self.stack.last() {
            assert_eq!(depth, parent + 1, "{} entered at the wrong depth", tree.kind());
        }
        assert_eq!(self.cursor().value().map(Tree::id), Some(tree.id()));
        self.stack.push(depth);
        self.nodes += 1;
    }

    fn post_visit(&mut self, tree: &Tree, _p: &mut ()) {
        let depth = self.stack.pop().unwrap();
        assert_eq!(self.cursor().depth(), depth, "{} left at the wrong depth", tree.kind());
    }
}

#[test]
fn cursor_depth_is_restored_after_every_visit() {
    let source = parse(
        "class A:\n    def m(self, *args, **kw) -> int:\n        with x as y:\n            return [i for i in y if i]\n",
    );
    let mut visitor = DepthCheck::default();
    visitor.visit_source_file(source, &mut ());
    assert!(visitor.nodes > 20);
    assert!(visitor.stack.is_empty());
    assert_eq!(visitor.cursor().depth(), 0);
}

/// Drops `pass` statements and doubles `del` statements.
#[derive(Default)]
struct EditStatements {
    state: VisitState,
}

impl TreeVisitor<()> for EditStatements {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_statement_in_list(&mut self, statement: Statement, p: &mut ()) -> Transform<Statement> {
        match statement {
            Statement::Pass(_) => Transform::Remove,
            Statement::Del(ref del) => {
                let copy = del.clone().with_id(random_id());
                Transform::Flatten(vec![statement.clone(), Statement::Del(copy)])
            }
            other => Transform::Keep(self.visit_statement(other, p)),
        }
    }
}

#[test]
fn statements_can_be_removed_and_flattened() {
    let source = parse("x = 1\npass\ndel x\n");
    let mut visitor = EditStatements::default();
    let after = visitor.visit_source_file(source, &mut ());
    let after = unit(&after);
    assert_eq!(after.statements.len(), 3);
    assert!(matches!(after.statements[1].element, Statement::Del(_)));
    assert!(matches!(after.statements[2].element, Statement::Del(_)));
}

/// Stops after the first identifier named `stop`.
struct StopAtName {
    state: VisitState,
}

impl TreeVisitor<()> for StopAtName {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_identifier(&mut self, node: Rc<Identifier>, _p: &mut ()) -> Rc<Identifier> {
        if node.simple_name == "stop" {
            self.state_mut().stop_after(node.id);
            return node;
        }
        let upper = node.simple_name.to_uppercase();
        node.with_simple_name(upper)
    }
}

#[test]
fn stop_after_leaves_the_rest_untouched() {
    let source = parse("a = stop\nb = c\n");
    let mut visitor = StopAtName {
        state: VisitState::new(),
    };
    let after = visitor.visit_source_file(source, &mut ());
    assert!(visitor.state().is_stopped());
    assert_eq!(print(&after), "A = stop\nb = c\n");
}

/// Records the enclosing function of every `return`.
#[derive(Default)]
struct EnclosingNames {
    state: VisitState,
    found: Vec<String>,
}

impl TreeVisitor<()> for EnclosingNames {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_method_declaration(
        &mut self,
        node: Rc<MethodDeclaration>,
        p: &mut (),
    ) -> Rc<MethodDeclaration> {
        let name = node.name.simple_name.clone();
        self.cursor_mut().put_message("function", name);
        node.walk_children(self, p)
    }

    fn visit_return(&mut self, node: Rc<Return>, _p: &mut ()) -> Rc<Return> {
        let enclosing = self
            .cursor()
            .first_enclosing::<MethodDeclaration>()
            .map(|m| m.name.simple_name.clone());
        let message = self.cursor().get_nearest_message::<String>("function").cloned();
        assert_eq!(enclosing, message);
        self.found.extend(message);
        node
    }
}

#[test]
fn cursor_messages_and_enclosing_lookups_agree() {
    let source = parse("def outer():\n    def inner():\n        return 1\n    return inner\n");
    let mut visitor = EnclosingNames::default();
    visitor.visit_source_file(source, &mut ());
    assert_eq!(visitor.found, ["inner", "outer"]);
}

/// Removes the space before call parentheses.
#[derive(Default)]
struct TightCalls {
    state: VisitState,
}

impl TreeVisitor<()> for TightCalls {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_container_padding(&mut self, _before: Space, _p: &mut ()) -> Space {
        Space::EMPTY
    }
}

#[test]
fn container_padding_is_its_own_hook() {
    let source = parse("f (1, g (2))\nx = 1\n");
    let after = TightCalls::default().visit_source_file(source, &mut ());
    assert_eq!(print(&after), "f(1, g(2))\nx = 1\n");
}
