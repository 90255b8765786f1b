//! Drives the server the way a host does, over an in-memory transport.

use rewrite_core::rpc::{MemoryTransport, ReceiveQueue, RemoteRefs, Request, RpcObjectData, State};
use rewrite_python::{Server, ServerConfig};
use rewrite_python_lst::{print, SourceFile};
use serde_json::{json, Value};

/// The host side: its copies of the server's trees and the refs they use.
struct Host {
    server: Server<MemoryTransport>,
    refs: RemoteRefs,
    next_id: i64,
}

impl Host {
    fn new(config: ServerConfig) -> Self {
        Host {
            server: Server::new(MemoryTransport::default(), config),
            refs: RemoteRefs::default(),
            next_id: 100,
        }
    }

    /// Sends a request and returns the server's response to it.
    fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        let request = serde_json::to_value(Request::new(id, method, params)).unwrap();
        self.server.handle(request).unwrap();
        self.server
            .transport()
            .outbound
            .iter()
            .rev()
            .find(|message| message["id"] == json!(id) && message.get("method").is_none())
            .cloned()
            .expect("no response")
    }

    fn result(&mut self, method: &str, params: Value) -> Value {
        let response = self.request(method, params);
        assert!(response.get("error").is_none(), "{method} failed: {response}");
        response["result"].clone()
    }

    /// Queues the reply to the server's `id`th nested call.
    fn reply(&mut self, id: i64, result: Value) {
        self.server
            .transport_mut()
            .inbound
            .push_back(json!({"jsonrpc": "2.0", "id": id, "result": result}));
    }

    /// Pulls `id` from the server until the end of the object.
    fn pull(&mut self, id: &str, before: Option<SourceFile>) -> Option<SourceFile> {
        let mut records: Vec<RpcObjectData> = Vec::new();
        loop {
            let batch: Vec<RpcObjectData> =
                serde_json::from_value(self.result("GetObject", json!({"id": id}))).unwrap();
            let done = batch.last().map(|data| data.state) == Some(State::EndOfObject);
            records.extend(batch);
            if done {
                break;
            }
        }
        let mut q = ReceiveQueue::new(records, &mut self.refs);
        let received = q.receive(before).unwrap();
        q.expect_end_of_object().unwrap();
        received
    }
}

fn unchanged() -> Value {
    json!([{"state": "NO_CHANGE"}, {"state": "END_OF_OBJECT"}])
}

#[test]
fn parsed_trees_travel_to_the_host_in_batches() {
    let mut host = Host::new(ServerConfig {
        batch_size: 3,
        ..ServerConfig::default()
    });
    let source = "def f():\n    return 1\n";
    let ids = host.result(
        "Parse",
        json!({"inputs": [{"text": source, "sourcePath": "a.py"}]}),
    );
    let id = ids[0].as_str().unwrap().to_string();

    let tree = host.pull(&id, None).unwrap();
    assert_eq!(tree.source_path(), "a.py");
    assert_eq!(print(&tree), source);
}

#[test]
fn visiting_with_a_prepared_recipe_sends_back_a_delta() {
    let mut host = Host::new(ServerConfig::default());
    let ids = host.result(
        "Parse",
        json!({"inputs": [{"text": "x = 1   \ny = 2\n", "sourcePath": "a.py"}]}),
    );
    let id = ids[0].as_str().unwrap().to_string();
    let tree = host.pull(&id, None);

    let prepared = host.result(
        "PrepareRecipe",
        json!({"id": "org.openrewrite.python.format.RemoveTrailingWhitespace"}),
    );
    assert_eq!(
        prepared["descriptor"]["name"],
        json!("org.openrewrite.python.format.RemoveTrailingWhitespace")
    );
    assert!(prepared.get("scanVisitor").is_none());
    let visitor = prepared["editVisitor"].as_str().unwrap().to_string();

    // The server first asks for the host's copy, which is what it sent.
    host.reply(1, unchanged());
    let visited = host.result("Visit", json!({"visitor": visitor, "treeId": id}));
    assert_eq!(visited, json!({"modified": true}));

    let edited = host.pull(&id, tree).unwrap();
    assert_eq!(print(&edited), "x = 1\ny = 2\n");
}

#[test]
fn visiting_an_already_clean_tree_reports_no_change() {
    let mut host = Host::new(ServerConfig::default());
    let ids = host.result(
        "Parse",
        json!({"inputs": [{"text": "x = 1\n", "sourcePath": "a.py"}]}),
    );
    let id = ids[0].as_str().unwrap().to_string();
    host.pull(&id, None);

    host.reply(1, unchanged());
    let visited = host.result(
        "Visit",
        json!({
            "visitor": "org.openrewrite.python.format.RemoveTrailingWhitespace",
            "treeId": id,
        }),
    );
    assert_eq!(visited, json!({"modified": false}));
}

#[test]
fn print_renders_the_hosts_copy() {
    let mut host = Host::new(ServerConfig::default());
    let ids = host.result(
        "Parse",
        json!({"inputs": [{"text": "import os\n", "sourcePath": "m.py"}]}),
    );
    let id = ids[0].as_str().unwrap().to_string();
    host.pull(&id, None);

    host.reply(1, unchanged());
    let printed = host.result("Print", json!({"treeId": id}));
    assert_eq!(printed, json!("import os\n"));

    let nested = &host.server.transport().outbound;
    assert!(nested
        .iter()
        .any(|message| message["method"] == json!("GetObject") && message["id"] == json!(1)));
}

#[test]
fn print_of_an_unknown_tree_fails() {
    let mut host = Host::new(ServerConfig::default());
    host.reply(1, unchanged());
    let response = host.request("Print", json!({"treeId": "missing"}));
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("missing"));
}

#[test]
fn scanning_recipes_generate_files() {
    let mut host = Host::new(ServerConfig::default());
    let prepared = host.result(
        "PrepareRecipe",
        json!({
            "id": "org.openrewrite.python.CreatePythonFile",
            "options": {"relativeFileName": "pkg/new.py", "fileContents": "VALUE = 1\n"},
        }),
    );
    assert!(prepared["scanVisitor"].is_string());
    let handle = prepared["id"].as_str().unwrap().to_string();

    let generated = host.result("Generate", json!({"id": handle}));
    assert_eq!(
        generated["sourceFileTypes"],
        json!(["org.openrewrite.python.tree.Py$CompilationUnit"])
    );
    let id = generated["ids"][0].as_str().unwrap().to_string();
    let tree = host.pull(&id, None).unwrap();
    assert_eq!(tree.source_path(), "pkg/new.py");
    assert_eq!(print(&tree), "VALUE = 1\n");
}

#[test]
fn marketplace_lists_the_builtin_recipes() {
    let mut host = Host::new(ServerConfig::default());
    let listing = host.result("GetMarketplace", Value::Null);
    let text = listing.to_string();
    assert!(text.contains("org.openrewrite.python.format.AutoFormat"));
    assert!(text.contains("org.openrewrite.python.search.FindPattern"));
}

#[test]
fn reset_forgets_every_tree() {
    let mut host = Host::new(ServerConfig::default());
    host.result(
        "Parse",
        json!({"inputs": [{"text": "x = 1\n", "sourcePath": "a.py"}]}),
    );
    assert_eq!(host.server.object_count(), 1);
    assert_eq!(host.result("Reset", Value::Null), json!(true));
    assert_eq!(host.server.object_count(), 0);
}

#[test]
fn required_print_idempotence_is_taken_from_the_context() {
    let mut host = Host::new(ServerConfig::default());
    let ids = host.result(
        "Parse",
        json!({
            "inputs": [{"text": "x = 1\n", "sourcePath": "a.py"}],
            "p": {"messages": {"org.openrewrite.requirePrintEqualsInput": true}},
        }),
    );
    assert_eq!(ids.as_array().map(Vec::len), Some(1));
    assert!(host.server.context().require_print_equals_input());
}
