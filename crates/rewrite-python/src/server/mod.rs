//! The JSON-RPC server.
//!
//! The host drives everything: it asks the server to parse files, pulls the
//! resulting trees with `GetObject`, prepares recipes and asks the server to
//! visit trees with them. The server is also a client: `Print` and `Visit`
//! first fetch the host's latest version of the tree with a nested
//! `GetObject` call on the same channel.
//!
//! ## Methods
//!
//! | Method | Result |
//! |--------|--------|
//! | `Parse` | ids of the parsed trees |
//! | `ParseProject` | `{id, sourceFileType}` per Python file under a directory |
//! | `GetObject` | the next batch of delta records for a tree |
//! | `GetLanguages` | source file types this server parses |
//! | `Print` | rendered source of a tree |
//! | `Reset` | `true`, after dropping every tree, recipe and cache |
//! | `GetMarketplace` | the recipe listing |
//! | `PrepareRecipe` | a handle and visitor names for a configured recipe |
//! | `Visit` | `{modified}` after running a visitor over a tree |
//! | `Generate` | ids of the files a scanning recipe generates |
//!
//! Errors inside a request become an error response and the loop goes on;
//! only a broken channel stops the server.

mod client;
mod handlers;
mod objects;
pub mod params;
mod project;

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use rewrite_core::cache::DEFAULT_CACHE_CAPACITY;
use rewrite_core::rpc::{ErrorObject, Message, Request, Response, Transport};
use rewrite_core::{ExecutionContext, RpcError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::error::{ServerError, ServerResult};
use crate::format::FormatStyle;
use crate::recipe::{panic_message, Marketplace, PreparedRecipe};
use crate::template;
use client::Client;
use objects::ObjectStore;

/// Records per `GetObject` batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// How long a nested call waits for the host unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Delta records per `GetObject` reply.
    pub batch_size: usize,
    /// Timeout of nested calls to the host.
    pub request_timeout: Duration,
    /// Capacity of the template cache.
    pub cache_capacity: usize,
    /// Log every frame and tag delta records with the sending type.
    pub trace_rpc_messages: bool,
    /// Replace trees that do not print back to their input with parse
    /// errors, regardless of what the host asks for.
    pub require_print_equals_input: bool,
    /// Style for format recipes configured without one.
    pub style: Option<FormatStyle>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            batch_size: DEFAULT_BATCH_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            trace_rpc_messages: false,
            require_print_equals_input: false,
            style: None,
        }
    }
}

/// Whether a request succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Error => "error",
        }
    }
}

/// Told about every handled request, e.g. to write metrics.
pub trait RequestObserver {
    fn request_finished(&mut self, method: &str, elapsed: Duration, outcome: Outcome);
}

/// The server and all state it holds for the host.
pub struct Server<T> {
    client: Client<T>,
    config: ServerConfig,
    objects: ObjectStore,
    marketplace: Marketplace,
    prepared: HashMap<String, PreparedRecipe>,
    ctx: ExecutionContext,
    observer: Option<Box<dyn RequestObserver>>,
}

impl<T: Transport> Server<T> {
    pub fn new(transport: T, config: ServerConfig) -> Self {
        template::set_cache_capacity(config.cache_capacity);
        let marketplace = match &config.style {
            Some(style) => Marketplace::builtin().with_default_style(style.clone()),
            None => Marketplace::builtin(),
        };
        Server {
            client: Client::new(transport, config.request_timeout, config.trace_rpc_messages),
            config,
            objects: ObjectStore::default(),
            marketplace,
            prepared: HashMap::new(),
            ctx: ExecutionContext::new(),
            observer: None,
        }
    }

    /// Replaces the built-in recipe listing.
    pub fn with_marketplace(mut self, marketplace: Marketplace) -> Self {
        self.marketplace = marketplace;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    pub fn transport(&self) -> &T {
        self.client.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.client.transport_mut()
    }

    pub fn into_transport(self) -> T {
        self.client.into_transport()
    }

    /// Number of trees held.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Serves requests until the host closes the channel.
    pub fn run(&mut self) -> ServerResult<()> {
        info!("serving");
        loop {
            let message = match self.client.deferred.pop_front() {
                Some(message) => message,
                None => match self.client.receive() {
                    Ok(Some(message)) => message,
                    Ok(None) => {
                        info!("host closed the channel");
                        return Ok(());
                    }
                    Err(
                        err @ (RpcError::InvalidHeader { .. }
                        | RpcError::MissingContentLength
                        | RpcError::Json(_)),
                    ) => {
                        warn!(error = %err, "malformed message");
                        self.respond(Value::Null, Err(err.into()))?;
                        continue;
                    }
                    Err(err) => return Err(err.into()),
                },
            };
            self.handle(message)?;
        }
    }

    /// Handles one incoming message. Requests are answered on the
    /// transport; an error is returned only when the channel is unusable.
    pub fn handle(&mut self, message: Value) -> ServerResult<()> {
        match Message::from_value(message) {
            Ok(Message::Request(request)) => self.handle_request(request),
            Ok(Message::Response(response)) => {
                warn!(id = %response.id, "ignoring a reply nobody waits for");
                Ok(())
            }
            Err(err) => self.respond(Value::Null, Err(err.into())),
        }
    }

    fn handle_request(&mut self, request: Request) -> ServerResult<()> {
        let _span = info_span!("request", method = %request.method).entered();
        let started = Instant::now();
        let result = self.dispatch_guarded(&request.method, request.params);
        let elapsed = started.elapsed();

        let outcome = if result.is_ok() {
            Outcome::Ok
        } else {
            Outcome::Error
        };
        debug!(elapsed_ms = elapsed.as_millis() as u64, outcome = outcome.as_str(), "handled");
        if let Some(observer) = self.observer.as_mut() {
            observer.request_finished(&request.method, elapsed, outcome);
        }

        // A broken channel cannot carry the error response either.
        let result = match result {
            Err(err @ ServerError::Rpc(RpcError::Io(_) | RpcError::ChannelClosed(_))) => {
                return Err(err);
            }
            other => other,
        };
        match request.id {
            Some(id) => self.respond(id, result),
            None => {
                if let Err(err) = &result {
                    warn!(error = %err, "notification failed");
                }
                Ok(())
            }
        }
    }

    fn respond(&mut self, id: Value, result: ServerResult<Value>) -> ServerResult<()> {
        let response = match result {
            Ok(value) => Response::success(id, value),
            Err(err) => {
                warn!(error = %err, "request failed");
                Response::failure(id, ErrorObject::from(&err))
            }
        };
        let response = serde_json::to_value(response).map_err(RpcError::from)?;
        self.client.send(&response)?;
        Ok(())
    }

    fn dispatch_guarded(&mut self, method: &str, params: Value) -> ServerResult<Value> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(method, params)));
        outcome.unwrap_or_else(|payload| Err(ServerError::Internal(panic_message(payload.as_ref()))))
    }

    fn dispatch(&mut self, method: &str, params: Value) -> ServerResult<Value> {
        match method {
            "Parse" => self.parse(parse_params(method, params)?),
            "ParseProject" => self.parse_project(parse_params(method, params)?),
            "GetObject" => self.get_object(parse_params(method, params)?),
            "GetLanguages" => self.get_languages(),
            "Print" => self.print(parse_params(method, params)?),
            "Reset" => self.reset(),
            "GetMarketplace" => self.get_marketplace(),
            "PrepareRecipe" => self.prepare_recipe(parse_params(method, params)?),
            "Visit" => self.visit(parse_params(method, params)?),
            "Generate" => self.generate(parse_params(method, params)?),
            _ => Err(RpcError::MethodNotFound(method.to_string()).into()),
        }
    }

    /// Drops every tree, prepared recipe and cached template.
    pub fn reset_state(&mut self) {
        self.objects.clear();
        self.prepared.clear();
        self.ctx = ExecutionContext::new();
        template::clear_cache();
    }
}

fn parse_params<P: DeserializeOwned>(method: &str, params: Value) -> ServerResult<P> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(params).map_err(|err| ServerError::invalid_params(method, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewrite_core::rpc::MemoryTransport;
    use serde_json::json;

    fn request(id: i64, method: &str, params: Value) -> Value {
        serde_json::to_value(Request::new(id, method, params)).unwrap()
    }

    fn server(inbound: Vec<Value>) -> Server<MemoryTransport> {
        Server::new(MemoryTransport::new(inbound), ServerConfig::default())
    }

    #[test]
    fn run_answers_until_the_channel_closes() {
        let mut server = server(vec![
            request(1, "GetLanguages", Value::Null),
            request(2, "Reset", Value::Null),
        ]);
        server.run().unwrap();
        let outbound = &server.transport().outbound;
        assert_eq!(outbound.len(), 2);
        assert_eq!(outbound[0]["result"], json!(["org.openrewrite.python.tree.Py$CompilationUnit"]));
        assert_eq!(outbound[1]["result"], json!(true));
    }

    #[test]
    fn unknown_methods_get_an_error_response() {
        let mut server = server(vec![request(7, "Frobnicate", Value::Null)]);
        server.run().unwrap();
        let response = &server.transport().outbound[0];
        assert_eq!(response["id"], json!(7));
        assert_eq!(response["error"]["code"], json!(-32601));
    }

    #[test]
    fn bad_params_are_reported_and_the_loop_continues() {
        let mut server = server(vec![
            request(1, "Print", json!({"nope": true})),
            request(2, "GetLanguages", Value::Null),
        ]);
        server.run().unwrap();
        let outbound = &server.transport().outbound;
        assert_eq!(outbound[0]["error"]["code"], json!(-32602));
        assert!(outbound[1]["result"].is_array());
    }

    #[test]
    fn notifications_get_no_response() {
        let mut server = server(vec![json!({"jsonrpc": "2.0", "method": "Reset"})]);
        server.run().unwrap();
        assert!(server.transport().outbound.is_empty());
    }

    #[test]
    fn a_host_that_hangs_up_mid_request_stops_the_loop() {
        let mut server = server(vec![request(1, "Print", json!({"id": "abc"}))]);
        let err = server.run().unwrap_err();
        assert!(matches!(err, ServerError::Rpc(RpcError::ChannelClosed(_))));
        // Only the nested GetObject went out; no response to the Print.
        let outbound = &server.transport().outbound;
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0]["method"], json!("GetObject"));
    }

    struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<(String, Outcome)>>>);

    impl RequestObserver for Recorder {
        fn request_finished(&mut self, method: &str, _elapsed: Duration, outcome: Outcome) {
            self.0.borrow_mut().push((method.to_string(), outcome));
        }
    }

    #[test]
    fn observer_sees_every_request() {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut server = server(vec![
            request(1, "Reset", Value::Null),
            request(2, "Nope", Value::Null),
        ])
        .with_observer(Box::new(Recorder(seen.clone())));
        server.run().unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![("Reset".to_string(), Outcome::Ok), ("Nope".to_string(), Outcome::Error)]
        );
    }
}
