//! Recipes: named, configurable transformations of source files.
//!
//! A [`Recipe`] hands out an editor visitor and, for composites, the
//! recipes that run after it. A [`ScanningRecipe`] first scans every source
//! file into an accumulator, may generate new files from it, and then edits
//! with the accumulated data in hand.
//!
//! Recipes are created by name through the [`Marketplace`], which parses
//! their options from JSON, and executed either in one go by [`run`] or
//! step by step through a [`PreparedRecipe`] when the host drives the
//! phases over RPC.
//!
//! The trait is object-safe, so recipes travel as `Rc<dyn Recipe>`.

mod builtin;
mod descriptor;
mod marketplace;
mod runner;

pub use builtin::{
    AutoFormat, CompositeRecipe, CreatePythonFile, DeleteSourceFiles, FindPattern, FormatStage, Stage,
};
pub use descriptor::{describe, OptionDescriptor, RecipeDescriptor};
pub use marketplace::{Marketplace, MarketplaceEntry, RecipeFactory};
pub use runner::{run, Change, PreparedRecipe, RecipeRun};
pub(crate) use runner::{failure_of, panic_message};

use std::any::Any;
use std::rc::Rc;

use rewrite_core::ExecutionContext;
use rewrite_python_lst::tree::SourceFile;
use rewrite_python_lst::visitor::{NoopVisitor, TreeVisitor};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RecipeError, RecipeResult};

/// The visitor type recipes hand out.
pub type RecipeVisitor<'a> = Box<dyn TreeVisitor<ExecutionContext> + 'a>;

/// A named transformation of source files.
pub trait Recipe {
    /// Fully qualified name, e.g. `org.openrewrite.python.format.AutoFormat`.
    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    fn tags(&self) -> Vec<String> {
        Vec::new()
    }

    /// The recipe's options together with their configured values.
    fn options(&self) -> Vec<OptionDescriptor> {
        Vec::new()
    }

    /// The visitor that edits each source file. The default changes nothing.
    fn editor(&self) -> RecipeVisitor<'_> {
        Box::new(NoopVisitor::default())
    }

    /// Whether `source` survives the run. Returning `false` deletes it.
    fn retains(&self, _source: &SourceFile, _ctx: &ExecutionContext) -> bool {
        true
    }

    /// Recipes that run after this one, each on the output of the last.
    fn recipe_list(&self) -> Vec<Rc<dyn Recipe>> {
        Vec::new()
    }

    fn as_scanning(&self) -> Option<&dyn ScanningRecipe> {
        None
    }
}

/// A recipe that looks at every source file before editing any of them.
///
/// The accumulator is created once per run by [`initial_value`] and is
/// downcast by the recipe's own visitors.
///
/// [`initial_value`]: ScanningRecipe::initial_value
pub trait ScanningRecipe: Recipe {
    fn initial_value(&self, ctx: &mut ExecutionContext) -> Box<dyn Any>;

    /// The visitor run over every source file during the scan phase.
    fn scanner<'a>(&'a self, acc: &'a mut dyn Any) -> RecipeVisitor<'a>;

    /// Source files to add once scanning is done.
    fn generate(&self, _acc: &mut dyn Any, _ctx: &mut ExecutionContext) -> Vec<SourceFile> {
        Vec::new()
    }

    /// The editor, given the scan's result. Defaults to [`Recipe::editor`].
    fn editor_with_data<'a>(&'a self, _acc: &'a dyn Any) -> RecipeVisitor<'a> {
        self.editor()
    }
}

/// Deserializes a recipe's options from JSON. A `null` reads as `{}` so
/// recipes whose options all have defaults need none.
pub fn parse_options<T: DeserializeOwned>(recipe: &str, options: &Value) -> RecipeResult<T> {
    let options = match options {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(options).map_err(|err| {
        let message = err.to_string();
        RecipeError::InvalidOption {
            recipe: recipe.to_string(),
            option: option_named_in(&message).unwrap_or("options").to_string(),
            message,
        }
    })
}

/// The option a serde error message names between backticks, if any.
fn option_named_in(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(&message[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Options {
        file_pattern: String,
        #[serde(default)]
        overwrite: bool,
    }

    #[test]
    fn test_recipe_is_object_safe() {
        fn _assert_object_safe(_: Rc<dyn Recipe>) {}
        fn _assert_scanning_object_safe(_: &dyn ScanningRecipe) {}
    }

    #[test]
    fn options_parse_from_camel_case() {
        let options: Options = parse_options("R", &json!({"filePattern": "*.py"})).unwrap();
        assert_eq!(options.file_pattern, "*.py");
        assert!(!options.overwrite);
    }

    #[test]
    fn missing_option_is_named() {
        let err = parse_options::<Options>("R", &Value::Null).unwrap_err();
        let RecipeError::InvalidOption { recipe, option, .. } = err else {
            panic!("expected an invalid option");
        };
        assert_eq!(recipe, "R");
        assert_eq!(option, "filePattern");
    }
}
