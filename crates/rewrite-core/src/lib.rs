//! Core infrastructure for rewrite language plug-ins.
//!
//! This crate provides language-agnostic infrastructure:
//! - The RPC delta protocol: `RpcObjectData`, send/receive queues, codec
//!   traits, reference interning and list reconciliation
//! - Content-Length framing and JSON-RPC message shapes
//! - Identity comparison used by immutable tree combinators
//! - Bounded insertion-order caches
//! - Unified diff generation
//! - The execution context shared by recipe runs

pub mod cache;
pub mod context;
pub mod diff;
pub mod error;
pub mod identity;
pub mod rpc;

pub use cache::BoundedCache;
pub use context::{ExecutionContext, RecipeFailure};
pub use error::{RpcError, RpcResult};
pub use identity::Identity;
