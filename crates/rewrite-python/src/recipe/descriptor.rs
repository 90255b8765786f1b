//! Serializable recipe descriptions for the marketplace.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Recipe;

/// One option of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub display_name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub required: bool,
    /// The configured value; `None` in marketplace listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl OptionDescriptor {
    pub fn new(
        name: &str,
        value_type: &str,
        display_name: &str,
        description: &str,
    ) -> Self {
        OptionDescriptor {
            name: name.to_string(),
            value_type: value_type.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            example: None,
            required: true,
            value: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.value = (!value.is_null()).then_some(value);
        self
    }
}

/// A recipe flattened into data: its metadata, options and children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub options: Vec<OptionDescriptor>,
    #[serde(default)]
    pub recipe_list: Vec<RecipeDescriptor>,
}

/// Describes `recipe` and, recursively, its recipe list.
pub fn describe(recipe: &dyn Recipe) -> RecipeDescriptor {
    RecipeDescriptor {
        name: recipe.name().to_string(),
        display_name: recipe.display_name().to_string(),
        description: recipe.description().to_string(),
        tags: recipe.tags(),
        options: recipe.options(),
        recipe_list: recipe
            .recipe_list()
            .iter()
            .map(|child| describe(child.as_ref()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptors_serialize_camel_case() {
        let option = OptionDescriptor::new("filePattern", "String", "File pattern", "A glob.")
            .example("**/*.py");
        let value = serde_json::to_value(&option).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "filePattern",
                "type": "String",
                "displayName": "File pattern",
                "description": "A glob.",
                "example": "**/*.py",
                "required": true
            })
        );
    }

    #[test]
    fn null_values_are_omitted() {
        let option = OptionDescriptor::new("x", "String", "X", "").value(Value::Null);
        assert_eq!(option.value, None);
    }
}
