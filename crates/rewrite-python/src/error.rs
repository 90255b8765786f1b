//! Error types for templates, recipes and request handling.
//!
//! `TemplateError` and `RecipeError` are raised by their subsystems;
//! `ServerError` is the unified type request handlers return, with
//! `impl From<X>` bridges for each subsystem error and a mapping to the
//! JSON-RPC error object sent back to the host.

use rewrite_core::error::codes;
use rewrite_core::rpc::ErrorObject;
use rewrite_core::RpcError;
use thiserror::Error;

// ============================================================================
// Template errors
// ============================================================================

/// Errors raised while building, parsing, matching or applying a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `{` or `}` that is neither an escape nor a well-formed placeholder.
    #[error("invalid placeholder syntax at offset {offset}: {message}")]
    PlaceholderSyntax { offset: usize, message: String },

    /// The code names a placeholder that has no capture.
    #[error("placeholder {{{0}}} has no capture")]
    UndefinedPlaceholder(String),

    /// A declared capture never appears in the code.
    #[error("capture {0} is not used by the template")]
    UnusedCapture(String),

    /// The same capture name was declared twice.
    #[error("capture {0} is declared more than once")]
    DuplicateCapture(String),

    /// The code did not parse inside the synthetic wrapper.
    #[error("template does not parse: {message}\n{code}")]
    Parse { code: String, message: String },

    /// The template produced a shape the caller cannot use.
    #[error("expected {expected}, but the template is {found}")]
    UnexpectedShape { expected: String, found: String },

    /// Applying the template without a value for one of its captures.
    #[error("no value given for capture {0}")]
    MissingValue(String),
}

pub type TemplateResult<T> = Result<T, TemplateError>;

// ============================================================================
// Recipe errors
// ============================================================================

/// Errors raised while preparing or running recipes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecipeError {
    #[error("unknown recipe: {0}")]
    UnknownRecipe(String),

    #[error("invalid option {option} for {recipe}: {message}")]
    InvalidOption {
        recipe: String,
        option: String,
        message: String,
    },

    /// A visitor failed; `cursor` is the rendered path to the node it was
    /// visiting.
    #[error("{recipe} failed on {source_path} at {cursor}: {message}")]
    Runtime {
        recipe: String,
        source_path: String,
        cursor: String,
        message: String,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

pub type RecipeResult<T> = Result<T, RecipeError>;

// ============================================================================
// Request errors
// ============================================================================

/// Unified error type for request handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The request names an object this server does not hold.
    #[error("no object with id {0}")]
    UnknownObject(String),

    #[error("invalid params for {method}: {message}")]
    InvalidParams { method: String, message: String },

    /// A handler panicked outside of any recipe visitor.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn invalid_params(method: &str, message: impl Into<String>) -> Self {
        ServerError::InvalidParams {
            method: method.to_string(),
            message: message.into(),
        }
    }

    /// The JSON-RPC error code reported for this error.
    pub fn code(&self) -> i64 {
        match self {
            ServerError::Rpc(err) => err.code(),
            ServerError::InvalidParams { .. } | ServerError::UnknownObject(_) => {
                codes::INVALID_PARAMS
            }
            ServerError::Recipe(RecipeError::UnknownRecipe(_))
            | ServerError::Recipe(RecipeError::InvalidOption { .. }) => codes::INVALID_PARAMS,
            _ => codes::INTERNAL_ERROR,
        }
    }

    /// The error and all of its sources, one per line.
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !rendered.ends_with(&text) {
                rendered.push_str("\ncaused by: ");
                rendered.push_str(&text);
            }
            source = cause.source();
        }
        rendered
    }
}

impl From<&ServerError> for ErrorObject {
    fn from(err: &ServerError) -> Self {
        ErrorObject {
            code: err.code(),
            message: err.to_string(),
            data: Some(serde_json::Value::String(err.chain())),
        }
    }
}
