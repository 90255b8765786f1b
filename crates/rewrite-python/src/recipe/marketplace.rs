//! The catalog of recipes a server can instantiate by name.

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::builtin::{
    AutoFormat, CompositeRecipe, CreatePythonFile, DeleteSourceFiles, FindPattern, FormatStage,
    Stage,
};
use super::{Recipe, RecipeDescriptor};
use crate::error::{RecipeError, RecipeResult};
use crate::format::FormatStyle;

/// Creates a recipe from its JSON options.
pub type RecipeFactory = Rc<dyn Fn(&Marketplace, &Value) -> RecipeResult<Rc<dyn Recipe>>>;

/// A listed recipe: how it is described and where it is filed.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceEntry {
    pub descriptor: RecipeDescriptor,
    /// Category names from the root down, once per category the recipe is
    /// filed under.
    #[serde(serialize_with = "category_objects")]
    pub category_paths: Vec<Vec<String>>,
    #[serde(skip)]
    factory: RecipeFactory,
}

impl std::fmt::Debug for MarketplaceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceEntry")
            .field("descriptor", &self.descriptor.name)
            .field("category_paths", &self.category_paths)
            .finish()
    }
}

/// Categories travel as `[{"displayName": ...}, ...]` per path.
fn category_objects<S: Serializer>(paths: &[Vec<String>], serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Category<'a> {
        display_name: &'a str,
    }
    let paths: Vec<Vec<Category<'_>>> = paths
        .iter()
        .map(|path| {
            path.iter()
                .map(|name| Category { display_name: name })
                .collect()
        })
        .collect();
    paths.serialize(serializer)
}

/// Recipes by name, in registration order.
#[derive(Debug, Default)]
pub struct Marketplace {
    entries: Vec<MarketplaceEntry>,
    index: HashMap<String, usize>,
    default_style: Option<FormatStyle>,
}

impl Marketplace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A marketplace holding every built-in recipe.
    pub fn builtin() -> Self {
        let mut marketplace = Marketplace::new();
        let format = || vec![vec!["Python".to_string(), "Format".to_string()]];
        let search = || vec![vec!["Python".to_string(), "Search".to_string()]];
        let core = || vec![vec!["Core".to_string()]];

        marketplace.register(AutoFormat::listing(), format(), Rc::new(AutoFormat::create));
        for stage in Stage::ALL {
            marketplace.register(
                FormatStage::listing(stage),
                format(),
                Rc::new(move |marketplace: &Marketplace, options: &Value| {
                    FormatStage::create(stage, marketplace, options)
                }),
            );
        }
        marketplace.register(FindPattern::listing(), search(), Rc::new(FindPattern::create));
        marketplace.register(
            CreatePythonFile::listing(),
            vec![vec!["Python".to_string()]],
            Rc::new(CreatePythonFile::create),
        );
        marketplace.register(
            DeleteSourceFiles::listing(),
            core(),
            Rc::new(DeleteSourceFiles::create),
        );
        marketplace.register(
            CompositeRecipe::listing(),
            core(),
            Rc::new(CompositeRecipe::create),
        );
        marketplace
    }

    /// The style format recipes use when their options name none.
    pub fn with_default_style(mut self, style: FormatStyle) -> Self {
        self.default_style = Some(style);
        self
    }

    pub fn default_style(&self) -> Option<&FormatStyle> {
        self.default_style.as_ref()
    }

    /// Adds a recipe, replacing any recipe registered under the same name.
    pub fn register(
        &mut self,
        descriptor: RecipeDescriptor,
        category_paths: Vec<Vec<String>>,
        factory: RecipeFactory,
    ) {
        let name = descriptor.name.clone();
        let entry = MarketplaceEntry {
            descriptor,
            category_paths,
            factory,
        };
        match self.index.get(&name) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn entries(&self) -> &[MarketplaceEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&MarketplaceEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Instantiates the recipe called `name` with `options`.
    pub fn create(&self, name: &str, options: &Value) -> RecipeResult<Rc<dyn Recipe>> {
        let entry = self
            .get(name)
            .ok_or_else(|| RecipeError::UnknownRecipe(name.to_string()))?;
        (entry.factory)(self, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_lists_format_recipes() {
        let marketplace = Marketplace::builtin();
        let names: Vec<&str> = marketplace
            .entries()
            .iter()
            .map(|entry| entry.descriptor.name.as_str())
            .collect();
        assert_eq!(names[0], "org.openrewrite.python.format.AutoFormat");
        assert!(names.contains(&"org.openrewrite.python.format.RemoveTrailingWhitespace"));
        assert!(names.contains(&"org.openrewrite.config.CompositeRecipe"));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = Marketplace::builtin()
            .create("com.example.Nope", &Value::Null)
            .err()
            .unwrap();
        assert_eq!(err, RecipeError::UnknownRecipe("com.example.Nope".into()));
    }

    #[test]
    fn entries_serialize_with_categories() {
        let marketplace = Marketplace::builtin();
        let entry = marketplace.get("org.openrewrite.python.format.AutoFormat").unwrap();
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(
            value["categoryPaths"],
            json!([[{"displayName": "Python"}, {"displayName": "Format"}]])
        );
        assert_eq!(value["descriptor"]["displayName"], "Auto-format");
    }

    #[test]
    fn registering_again_replaces() {
        let mut marketplace = Marketplace::builtin();
        let count = marketplace.entries().len();
        let mut listing = AutoFormat::listing();
        listing.display_name = "Format everything".to_string();
        marketplace.register(listing, vec![], Rc::new(AutoFormat::create));
        assert_eq!(marketplace.entries().len(), count);
        assert_eq!(
            marketplace.entries()[0].descriptor.display_name,
            "Format everything"
        );
    }
}
