//! Execution context threaded through recipe runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message key for the opt-in print-idempotence check.
pub const REQUIRE_PRINT_EQUALS_INPUT: &str = "org.openrewrite.requirePrintEqualsInput";

/// A failure recorded while running a recipe against one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFailure {
    /// Name of the recipe that failed.
    pub recipe: String,
    /// Path of the source file being visited.
    pub source_path: String,
    /// Error message.
    pub message: String,
    /// Rendered cursor path pointing at the offending subtree, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cursor: Vec<String>,
}

/// Mutable state shared by the visitors of one recipe run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    messages: HashMap<String, Value>,
    failures: Vec<RecipeFailure>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_message(&mut self, key: impl Into<String>, value: Value) {
        self.messages.insert(key.into(), value);
    }

    pub fn get_message(&self, key: &str) -> Option<&Value> {
        self.messages.get(key)
    }

    /// Removes and returns a message.
    pub fn poll_message(&mut self, key: &str) -> Option<Value> {
        self.messages.remove(key)
    }

    /// Whether printing a freshly parsed tree must reproduce its input.
    pub fn require_print_equals_input(&self) -> bool {
        self.messages
            .get(REQUIRE_PRINT_EQUALS_INPUT)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_require_print_equals_input(&mut self, required: bool) {
        self.put_message(REQUIRE_PRINT_EQUALS_INPUT, Value::Bool(required));
    }

    pub fn record_failure(&mut self, failure: RecipeFailure) {
        tracing::warn!(
            recipe = %failure.recipe,
            source = %failure.source_path,
            "recipe failed: {}",
            failure.message
        );
        self.failures.push(failure);
    }

    pub fn failures(&self) -> &[RecipeFailure] {
        &self.failures
    }

    pub fn take_failures(&mut self) -> Vec<RecipeFailure> {
        std::mem::take(&mut self.failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_round_trip() {
        let mut ctx = ExecutionContext::new();
        ctx.put_message("count", json!(3));
        assert_eq!(ctx.get_message("count"), Some(&json!(3)));
        assert_eq!(ctx.poll_message("count"), Some(json!(3)));
        assert!(ctx.get_message("count").is_none());
    }

    #[test]
    fn print_check_is_opt_in() {
        let mut ctx = ExecutionContext::new();
        assert!(!ctx.require_print_equals_input());
        ctx.set_require_print_equals_input(true);
        assert!(ctx.require_print_equals_input());
    }

    #[test]
    fn failures_accumulate() {
        let mut ctx = ExecutionContext::new();
        ctx.record_failure(RecipeFailure {
            recipe: "Boom".into(),
            source_path: "a.py".into(),
            message: "exploded".into(),
            cursor: vec!["CompilationUnit".into()],
        });
        assert_eq!(ctx.failures().len(), 1);
        assert_eq!(ctx.take_failures()[0].recipe, "Boom");
        assert!(ctx.failures().is_empty());
    }
}
