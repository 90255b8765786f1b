//! Refactoring Python sources held as lossless semantic trees.
//!
//! # Overview
//!
//! - **Formatting**: style detection and the auto-format pipeline in [`format`]
//! - **Templates**: building code from snippets and matching patterns in [`template`]
//! - **Recipes**: named transformations and their marketplace in [`recipe`]
//! - **Server**: the JSON-RPC loop a host drives in [`server`]
//!
//! # Quick Start
//!
//! ```
//! use rewrite_core::ExecutionContext;
//! use rewrite_python::recipe::{run, AutoFormat};
//! use rewrite_python_lst::parse_source;
//!
//! let sources = vec![parse_source("a.py", "x = 1   \n")];
//! let recipe = std::rc::Rc::new(AutoFormat::new(None));
//! let outcome = run(recipe, sources, &mut ExecutionContext::new());
//! assert_eq!(outcome.changes.len(), 1);
//! assert!(outcome.failures.is_empty());
//! ```

pub mod error;
pub mod format;
pub mod recipe;
pub mod server;
pub mod template;

pub use error::{
    RecipeError, RecipeResult, ServerError, ServerResult, TemplateError, TemplateResult,
};
pub use server::{Server, ServerConfig};
