//! Request parameters and results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::recipe::RecipeDescriptor;

/// One file to parse: inline `text`, or the file at `path`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseInput {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Path recorded on the tree; defaults to `path`.
    #[serde(default)]
    pub source_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseParams {
    pub inputs: Vec<ParseInput>,
    /// Directory `path`s are made relative to when no `sourcePath` is given.
    #[serde(default)]
    pub relative_to: Option<String>,
    /// Execution context messages.
    #[serde(default)]
    pub p: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseProjectParams {
    pub project_path: String,
    /// Globs, relative to the project, of files and directories to skip.
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub relative_to: Option<String>,
    #[serde(default)]
    pub p: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFile {
    pub id: String,
    pub source_file_type: String,
}

/// Names a tree; hosts send either `id` or `treeId`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectParams {
    #[serde(alias = "treeId")]
    pub id: String,
    #[serde(default)]
    pub source_file_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintParams {
    #[serde(alias = "treeId")]
    pub id: String,
    #[serde(default)]
    pub source_file_type: Option<String>,
    /// `DEFAULT`, `FENCED` or `SANITIZED`.
    #[serde(default)]
    pub marker_printer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareRecipeParams {
    /// Recipe name in the marketplace.
    pub id: String,
    #[serde(default)]
    pub options: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedRecipeResult {
    /// Handle of the prepared instance.
    pub id: String,
    pub descriptor: RecipeDescriptor,
    pub edit_visitor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_visitor: Option<String>,
    pub edit_preconditions: Vec<Value>,
    pub scan_preconditions: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitParams {
    /// `edit:<id>` or `scan:<id>` of a prepared recipe, or a recipe name.
    pub visitor: String,
    #[serde(default)]
    pub source_file_type: Option<String>,
    #[serde(alias = "id")]
    pub tree_id: String,
    #[serde(default)]
    pub p: Value,
    /// Ancestor ids from the root down; informational.
    #[serde(default)]
    pub cursor: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitResult {
    pub modified: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateParams {
    pub id: String,
    #[serde(default)]
    pub p: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub ids: Vec<String>,
    pub source_file_types: Vec<String>,
}
