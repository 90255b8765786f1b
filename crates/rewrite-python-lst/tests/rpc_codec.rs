// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tree transfer over the delta protocol: full sends against nothing,
//! deltas against a shared baseline, and the JSON wire shape in between.

use std::path::PathBuf;
use std::rc::Rc;

use itertools::Itertools;
use rewrite_core::rpc::{LocalRefs, ReceiveQueue, RemoteRefs, RpcObjectData, SendQueue, State};
use rewrite_python_lst::tree::*;
use rewrite_python_lst::visitor::{TreeVisitor, VisitState};
use rewrite_python_lst::{parse_module, print};

/// Both ends of one connection: the sender's interning table and the
/// receiver's, kept across exchanges the way a session keeps them.
#[derive(Default)]
struct Link {
    local: LocalRefs,
    remote: RemoteRefs,
}

impl Link {
    fn send(&mut self, after: &SourceFile, before: Option<&SourceFile>) -> Vec<RpcObjectData> {
        let mut q = SendQueue::new(&mut self.local);
        q.send(Some(after), before).unwrap();
        let records = q.finish();
        // Through JSON, as the records travel on the wire.
        let wire = serde_json::to_string(&records).unwrap();
        serde_json::from_str(&wire).unwrap()
    }

    fn receive(&mut self, records: Vec<RpcObjectData>, before: Option<SourceFile>) -> SourceFile {
        let mut q = ReceiveQueue::new(records, &mut self.remote);
        let received = q.receive(before).unwrap().expect("a source file");
        q.expect_end_of_object().unwrap();
        received
    }

    fn transfer(
        &mut self,
        after: &SourceFile,
        before: Option<&SourceFile>,
        theirs: Option<SourceFile>,
    ) -> SourceFile {
        let records = self.send(after, before);
        self.receive(records, theirs)
    }
}

fn parse(source: &str) -> SourceFile {
    SourceFile::CompilationUnit(Rc::new(parse_module("codec.py", source).unwrap()))
}

fn unit(source: &SourceFile) -> &Rc<CompilationUnit> {
    match source {
        SourceFile::CompilationUnit(unit) => unit,
        SourceFile::ParseError(_) => panic!("expected a compilation unit"),
    }
}

#[test]
fn full_send_reproduces_the_source() {
    let source = parse("def f():\n    return 1\n");
    let mut link = Link::default();
    let received = link.transfer(&source, None, None);
    assert_eq!(print(&received), "def f():\n    return 1\n");
    assert_eq!(unit(&received).id, unit(&source).id);
    assert_eq!(unit(&received).source_path, "codec.py");
}

#[test]
fn every_fixture_survives_a_full_send() {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.push("tests/fixtures");
    let paths = dir
        .read_dir()
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "py"))
        .sorted()
        .collect_vec();
    assert!(!paths.is_empty());
    for path in paths {
        let text = std::fs::read_to_string(&path).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        let source = SourceFile::CompilationUnit(Rc::new(parse_module(&name, &text).unwrap()));
        let mut link = Link::default();
        let received = link.transfer(&source, None, None);
        assert_eq!(print(&received), text, "{name} changed in transit");
    }
}

#[test]
fn identical_tree_sends_no_change() {
    let source = parse("x = 1\n");
    let mut link = Link::default();
    let records = link.send(&source, Some(&source));
    assert_eq!(
        records,
        vec![
            RpcObjectData::new(State::NoChange),
            RpcObjectData::new(State::EndOfObject),
        ]
    );
}

struct Rename {
    state: VisitState,
}

impl TreeVisitor<()> for Rename {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_identifier(&mut self, node: Rc<Identifier>, _p: &mut ()) -> Rc<Identifier> {
        if node.simple_name == "old" {
            return node.with_simple_name("new".to_string());
        }
        node
    }
}

#[test]
fn delta_applies_to_the_receivers_copy() {
    let text = "import os\n\nclass C:\n    pass\n\ndef f(old):\n    return old + 1\n";
    let before = parse(text);
    let mut link = Link::default();
    let theirs = link.transfer(&before, None, None);

    let mut rename = Rename {
        state: VisitState::new(),
    };
    let after = rename.visit_source_file(before.clone(), &mut ());
    let full = Link::default().send(&after, None);
    let delta = link.send(&after, Some(&before));
    assert!(delta.len() < full.len(), "a delta should be smaller than a full send");

    let received = link.receive(delta, Some(theirs.clone()));
    assert_eq!(print(&received), print(&after));
    assert!(print(&received).contains("def f(new):\n    return new + 1\n"));

    // Untouched statements are the receiver's own objects.
    let old_statements = &unit(&theirs).statements;
    let new_statements = &unit(&received).statements;
    for index in 0..2 {
        match (&old_statements[index].element, &new_statements[index].element) {
            (Statement::MultiImport(a), Statement::MultiImport(b)) => assert!(Rc::ptr_eq(a, b)),
            (Statement::ClassDeclaration(a), Statement::ClassDeclaration(b)) => {
                assert!(Rc::ptr_eq(a, b))
            }
            (a, b) => panic!("unexpected statements {:?} / {:?}", a.kind(), b.kind()),
        }
    }
}

#[test]
fn removed_statement_is_dropped_on_the_receiver() {
    let before = parse("a = 1\nb = 2\nc = 3\n");
    let mut link = Link::default();
    let theirs = link.transfer(&before, None, None);

    let original = unit(&before);
    let mut statements = original.statements.clone();
    statements.remove(1);
    let after = SourceFile::CompilationUnit(original.clone().with_statements(statements));

    let received = link.transfer(&after, Some(&before), Some(theirs));
    assert_eq!(print(&received), "a = 1\nc = 3\n");
}

#[test]
fn markers_and_comments_travel_with_the_tree() {
    let before = parse("x = 1  # one\n");
    let original = unit(&before);
    let marked = original
        .clone()
        .with_markers(Markers::build(vec![Marker::search_result(Some("hit".to_string()))]));
    let after = SourceFile::CompilationUnit(marked);

    let mut link = Link::default();
    let received = link.transfer(&after, None, None);
    let markers = &unit(&received).markers;
    match markers.search_result() {
        Some(Marker::SearchResult { description, .. }) => {
            assert_eq!(description.as_deref(), Some("hit"))
        }
        other => panic!("expected a search result, found {other:?}"),
    }
    assert_eq!(print(&received), "/*~~(hit)~~>*/x = 1  # one\n");
}

#[test]
fn change_without_a_baseline_is_a_desync() {
    let source = parse("x = 1\n");
    let mut link = Link::default();
    let records = link.send(&source, Some(&parse("y = 2\n")));
    assert_eq!(records[0].state, State::Change);
    let mut q = ReceiveQueue::new(records, &mut link.remote);
    let err = q.receive::<SourceFile>(None).unwrap_err();
    assert!(err.to_string().contains("without a before value"), "{err}");
}
