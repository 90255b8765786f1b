//! End-to-end tests over the binary's stdin and stdout.
//!
//! Exit code expectations:
//! - 0: the host closed stdin
//! - 2: unreadable or invalid config

use std::io::{Cursor, Write};
use std::process::{Command, Stdio};

use rewrite_core::rpc::framing::{read_message, write_message};
use serde_json::{json, Value};

/// Feeds `requests` to the binary, closes stdin and returns the messages
/// it wrote, its stderr and its exit code.
fn run_server(args: &[&str], requests: &[Value]) -> (Vec<Value>, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_rewrite-python-rpc"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start rewrite-python-rpc");

    let mut input = Vec::new();
    for request in requests {
        write_message(&mut input, request).unwrap();
    }
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(&input).unwrap();
    drop(stdin);

    let output = child.wait_with_output().unwrap();
    let mut reader = Cursor::new(output.stdout);
    let mut messages = Vec::new();
    while let Some(message) = read_message(&mut reader).unwrap() {
        messages.push(message);
    }
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (messages, stderr, output.status.code().unwrap_or(-1))
}

fn request(id: i64, method: &str, params: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})
}

#[test]
fn serves_until_stdin_closes() {
    let (messages, _stderr, exit_code) = run_server(
        &["--log-level", "error"],
        &[
            request(1, "GetLanguages", Value::Null),
            request(
                2,
                "Parse",
                json!({"inputs": [{"text": "print('hi')\n", "sourcePath": "hi.py"}]}),
            ),
            request(3, "Reset", Value::Null),
        ],
    );
    assert_eq!(exit_code, 0);
    assert_eq!(messages.len(), 3);
    assert_eq!(
        messages[0]["result"],
        json!(["org.openrewrite.python.tree.Py$CompilationUnit"])
    );
    assert_eq!(messages[1]["result"].as_array().map(Vec::len), Some(1));
    assert_eq!(messages[2]["result"], json!(true));
}

#[test]
fn request_errors_do_not_stop_the_server() {
    let (messages, _stderr, exit_code) = run_server(
        &["--log-level", "error"],
        &[
            request(1, "Nope", Value::Null),
            request(2, "GetObject", json!({"id": "missing"})),
            request(3, "Reset", Value::Null),
        ],
    );
    assert_eq!(exit_code, 0);
    assert_eq!(messages[0]["error"]["code"], json!(-32601));
    assert!(messages[1]["error"].is_object());
    assert_eq!(messages[2]["result"], json!(true));
}

#[test]
fn logs_go_to_the_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("server.log");
    let (messages, _stderr, exit_code) = run_server(
        &["--log-file", log.to_str().unwrap(), "--log-level", "info"],
        &[request(1, "Reset", Value::Null)],
    );
    assert_eq!(exit_code, 0);
    assert_eq!(messages.len(), 1);
    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("starting"));
}

#[test]
fn bad_config_exits_with_2() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("rewrite.toml");
    std::fs::write(&config, "[server]\nbatch_size = \"many\"\n").unwrap();
    let (messages, stderr, exit_code) =
        run_server(&["--config", config.to_str().unwrap()], &[]);
    assert_eq!(exit_code, 2);
    assert!(messages.is_empty());
    assert!(stderr.contains("invalid config"));
}
