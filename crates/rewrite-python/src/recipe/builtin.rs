//! Built-in recipes.

use std::any::Any;
use std::rc::Rc;

use globset::{Glob, GlobMatcher};
use rewrite_core::ExecutionContext;
use rewrite_python_lst::parse_source;
use rewrite_python_lst::tree::{Expression, Marker, Markers, SourceFile, Statement};
use rewrite_python_lst::visitor::{NoopVisitor, TreeVisitor, VisitState};
use serde::Deserialize;
use serde_json::Value;

use super::marketplace::Marketplace;
use super::{
    parse_options, OptionDescriptor, Recipe, RecipeDescriptor, RecipeVisitor, ScanningRecipe,
};
use crate::error::{RecipeError, RecipeResult};
use crate::format::{
    auto_format, Autodetect, BlankLines, FormatStyle, MinimumViableSpacing, NormalizeFormat,
    NormalizeLineBreaks, NormalizeTabsOrSpaces, RemoveTrailingWhitespace,
};
use crate::template::{placeholder_names, Capture, Pattern};

fn invalid_option(recipe: &str, option: &str, message: impl ToString) -> RecipeError {
    RecipeError::InvalidOption {
        recipe: recipe.to_string(),
        option: option.to_string(),
        message: message.to_string(),
    }
}

fn listing(name: &str, display_name: &str, description: &str, options: Vec<OptionDescriptor>) -> RecipeDescriptor {
    RecipeDescriptor {
        name: name.to_string(),
        display_name: display_name.to_string(),
        description: description.to_string(),
        tags: Vec::new(),
        options,
        recipe_list: Vec::new(),
    }
}

// ============================================================================
// Formatting
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StyleOptions {
    #[serde(default)]
    style: Option<FormatStyle>,
}

fn style_option(style: Option<&FormatStyle>) -> OptionDescriptor {
    let option = OptionDescriptor::new(
        "style",
        "FormatStyle",
        "Style",
        "Indentation, blank line and line break settings.",
    )
    .optional();
    match style.and_then(|style| serde_json::to_value(style).ok()) {
        Some(value) => option.value(value),
        None => option,
    }
}

/// Runs the whole format pipeline, with the style detected from each file
/// unless one is configured.
#[derive(Debug, Clone, Default)]
pub struct AutoFormat {
    style: Option<FormatStyle>,
}

impl AutoFormat {
    pub const NAME: &'static str = "org.openrewrite.python.format.AutoFormat";

    pub fn new(style: Option<FormatStyle>) -> Self {
        AutoFormat { style }
    }

    pub(crate) fn listing() -> RecipeDescriptor {
        listing(
            Self::NAME,
            "Auto-format",
            "Formats Python code using the configured style, or the style the file already follows.",
            vec![style_option(None)],
        )
    }

    pub(crate) fn create(marketplace: &Marketplace, options: &Value) -> RecipeResult<Rc<dyn Recipe>> {
        let options: StyleOptions = parse_options(Self::NAME, options)?;
        let style = options.style.or_else(|| marketplace.default_style().cloned());
        Ok(Rc::new(AutoFormat::new(style)))
    }
}

impl Recipe for AutoFormat {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Auto-format"
    }

    fn description(&self) -> &str {
        "Formats Python code using the configured style, or the style the file already follows."
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![style_option(self.style.as_ref())]
    }

    fn editor(&self) -> RecipeVisitor<'_> {
        Box::new(AutoFormatVisitor {
            state: VisitState::new(),
            style: self.style.as_ref(),
        })
    }
}

struct AutoFormatVisitor<'a> {
    state: VisitState,
    style: Option<&'a FormatStyle>,
}

impl TreeVisitor<ExecutionContext> for AutoFormatVisitor<'_> {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_source_file(&mut self, source: SourceFile, _ctx: &mut ExecutionContext) -> SourceFile {
        if source.is_parse_error() {
            return source;
        }
        let style = match self.style {
            Some(style) => style.clone(),
            None => Autodetect::detect(&source),
        };
        auto_format(source, &style, None)
    }
}

/// One stage of the format pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NormalizeFormat,
    MinimumViableSpacing,
    BlankLines,
    NormalizeTabsOrSpaces,
    NormalizeLineBreaks,
    RemoveTrailingWhitespace,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::NormalizeFormat,
        Stage::MinimumViableSpacing,
        Stage::BlankLines,
        Stage::NormalizeTabsOrSpaces,
        Stage::NormalizeLineBreaks,
        Stage::RemoveTrailingWhitespace,
    ];

    fn name(self) -> &'static str {
        match self {
            Stage::NormalizeFormat => "org.openrewrite.python.format.NormalizeFormat",
            Stage::MinimumViableSpacing => "org.openrewrite.python.format.MinimumViableSpacing",
            Stage::BlankLines => "org.openrewrite.python.format.BlankLines",
            Stage::NormalizeTabsOrSpaces => "org.openrewrite.python.format.NormalizeTabsOrSpaces",
            Stage::NormalizeLineBreaks => "org.openrewrite.python.format.NormalizeLineBreaks",
            Stage::RemoveTrailingWhitespace => {
                "org.openrewrite.python.format.RemoveTrailingWhitespace"
            }
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Stage::NormalizeFormat => "Normalize format",
            Stage::MinimumViableSpacing => "Minimum viable spacing",
            Stage::BlankLines => "Blank lines",
            Stage::NormalizeTabsOrSpaces => "Normalize tabs or spaces",
            Stage::NormalizeLineBreaks => "Normalize line breaks",
            Stage::RemoveTrailingWhitespace => "Remove trailing whitespace",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Stage::NormalizeFormat => {
                "Moves formatting from a declaration's first decorator or keyword onto the declaration."
            }
            Stage::MinimumViableSpacing => {
                "Adds the line breaks and spaces the code needs to stay valid."
            }
            Stage::BlankLines => "Enforces minimum and maximum blank lines.",
            Stage::NormalizeTabsOrSpaces => "Indents with either tabs or spaces.",
            Stage::NormalizeLineBreaks => "Uses one line break style throughout.",
            Stage::RemoveTrailingWhitespace => "Removes whitespace at the end of lines.",
        }
    }
}

/// A recipe running a single [`Stage`].
#[derive(Debug, Clone)]
pub struct FormatStage {
    stage: Stage,
    style: FormatStyle,
}

impl FormatStage {
    pub fn new(stage: Stage, style: FormatStyle) -> Self {
        FormatStage { stage, style }
    }

    pub(crate) fn listing(stage: Stage) -> RecipeDescriptor {
        listing(
            stage.name(),
            stage.display_name(),
            stage.description(),
            vec![style_option(None)],
        )
    }

    pub(crate) fn create(
        stage: Stage,
        marketplace: &Marketplace,
        options: &Value,
    ) -> RecipeResult<Rc<dyn Recipe>> {
        let options: StyleOptions = parse_options(stage.name(), options)?;
        let style = options
            .style
            .or_else(|| marketplace.default_style().cloned())
            .unwrap_or_default();
        Ok(Rc::new(FormatStage::new(stage, style)))
    }
}

impl Recipe for FormatStage {
    fn name(&self) -> &str {
        self.stage.name()
    }

    fn display_name(&self) -> &str {
        self.stage.display_name()
    }

    fn description(&self) -> &str {
        self.stage.description()
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![style_option(Some(&self.style))]
    }

    fn editor(&self) -> RecipeVisitor<'_> {
        let style = &self.style;
        match self.stage {
            Stage::NormalizeFormat => Box::new(NormalizeFormat::new()),
            Stage::MinimumViableSpacing => {
                Box::new(MinimumViableSpacing::new(style.tabs_and_indents.clone()))
            }
            Stage::BlankLines => Box::new(BlankLines::new(style.blank_lines.clone())),
            Stage::NormalizeTabsOrSpaces => {
                Box::new(NormalizeTabsOrSpaces::new(style.tabs_and_indents.clone()))
            }
            Stage::NormalizeLineBreaks => {
                Box::new(NormalizeLineBreaks::new(style.general.line_break))
            }
            Stage::RemoveTrailingWhitespace => Box::new(RemoveTrailingWhitespace::new()),
        }
    }
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindPatternOptions {
    pattern: String,
    #[serde(default)]
    imports: Vec<String>,
}

/// Marks every expression or statement matching a pattern with a
/// search result. Every placeholder in the pattern matches anything.
#[derive(Debug, Clone)]
pub struct FindPattern {
    code: String,
    imports: Vec<String>,
    pattern: Pattern,
}

impl FindPattern {
    pub const NAME: &'static str = "org.openrewrite.python.search.FindPattern";

    pub fn new(code: &str, imports: Vec<String>) -> RecipeResult<Self> {
        let names =
            placeholder_names(code).map_err(|err| invalid_option(Self::NAME, "pattern", err))?;
        let builder = names
            .iter()
            .fold(Pattern::builder(code), |builder, name| builder.capture(Capture::new(name.as_str())));
        let pattern = imports
            .iter()
            .fold(builder, |builder, import| builder.import(import.as_str()))
            .build()
            .map_err(|err| invalid_option(Self::NAME, "pattern", err))?;
        Ok(FindPattern {
            code: code.to_string(),
            imports,
            pattern,
        })
    }

    pub(crate) fn listing() -> RecipeDescriptor {
        listing(
            Self::NAME,
            "Find pattern",
            "Marks code matching a pattern such as `print({value})`.",
            Self::option_descriptors(),
        )
    }

    fn option_descriptors() -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new(
                "pattern",
                "String",
                "Pattern",
                "Python code; each `{name}` placeholder matches any subtree.",
            )
            .example("{a} == None"),
            OptionDescriptor::new(
                "imports",
                "List",
                "Imports",
                "Import lines the pattern relies on.",
            )
            .optional(),
        ]
    }

    pub(crate) fn create(_marketplace: &Marketplace, options: &Value) -> RecipeResult<Rc<dyn Recipe>> {
        let options: FindPatternOptions = parse_options(Self::NAME, options)?;
        Ok(Rc::new(FindPattern::new(&options.pattern, options.imports)?))
    }
}

impl Recipe for FindPattern {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Find pattern"
    }

    fn description(&self) -> &str {
        "Marks code matching a pattern such as `print({value})`."
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        let mut options = Self::option_descriptors();
        options[0] = options[0].clone().value(self.code.clone());
        options[1] = options[1].clone().value(self.imports.clone());
        options
    }

    fn editor(&self) -> RecipeVisitor<'_> {
        Box::new(FindPatternVisitor {
            state: VisitState::new(),
            pattern: &self.pattern,
            description: self.code.as_str(),
        })
    }
}

struct FindPatternVisitor<'a> {
    state: VisitState,
    pattern: &'a Pattern,
    description: &'a str,
}

impl FindPatternVisitor<'_> {
    /// `markers` with a search result added, or `None` if already marked.
    fn marked(&self, markers: &Markers) -> Option<Markers> {
        if markers.search_result().is_some() {
            return None;
        }
        Some(
            markers
                .clone()
                .add(Marker::search_result(Some(self.description.to_string()))),
        )
    }
}

impl TreeVisitor<ExecutionContext> for FindPatternVisitor<'_> {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_expression(&mut self, expression: Expression, ctx: &mut ExecutionContext) -> Expression {
        let expression = expression.accept_variant(self, ctx);
        if self.pattern.matches(&expression.to_tree()).is_none() {
            return expression;
        }
        match self.marked(expression.markers()) {
            Some(markers) => expression.with_markers(markers),
            None => expression,
        }
    }

    fn visit_statement(&mut self, statement: Statement, ctx: &mut ExecutionContext) -> Statement {
        let statement = statement.accept_variant(self, ctx);
        // The wrapped expression was already checked.
        if matches!(statement, Statement::ExpressionStatement(_))
            || self.pattern.matches(&statement.to_tree()).is_none()
        {
            return statement;
        }
        match self.marked(statement.markers()) {
            Some(markers) => statement.with_markers(markers),
            None => statement,
        }
    }
}

// ============================================================================
// Files
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePythonFileOptions {
    relative_file_name: String,
    #[serde(default)]
    file_contents: String,
    #[serde(default)]
    overwrite_existing: bool,
}

/// Adds a Python file to the project, or rewrites it when it exists and
/// overwriting is allowed.
#[derive(Debug, Clone)]
pub struct CreatePythonFile {
    relative_file_name: String,
    file_contents: String,
    overwrite_existing: bool,
}

impl CreatePythonFile {
    pub const NAME: &'static str = "org.openrewrite.python.CreatePythonFile";

    pub fn new(relative_file_name: &str, file_contents: &str, overwrite_existing: bool) -> Self {
        CreatePythonFile {
            relative_file_name: relative_file_name.to_string(),
            file_contents: file_contents.to_string(),
            overwrite_existing,
        }
    }

    pub(crate) fn listing() -> RecipeDescriptor {
        listing(
            Self::NAME,
            "Create Python file",
            "Creates a Python file with the given contents.",
            Self::option_descriptors(),
        )
    }

    fn option_descriptors() -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new(
                "relativeFileName",
                "String",
                "Relative file path",
                "Path of the file, relative to the project root.",
            )
            .example("pkg/__init__.py"),
            OptionDescriptor::new("fileContents", "String", "File contents", "Source text.")
                .optional(),
            OptionDescriptor::new(
                "overwriteExisting",
                "Boolean",
                "Overwrite existing file",
                "Replace the contents of the file if it already exists.",
            )
            .optional(),
        ]
    }

    pub(crate) fn create(_marketplace: &Marketplace, options: &Value) -> RecipeResult<Rc<dyn Recipe>> {
        let options: CreatePythonFileOptions = parse_options(Self::NAME, options)?;
        if options.relative_file_name.is_empty() {
            return Err(invalid_option(Self::NAME, "relativeFileName", "must not be empty"));
        }
        Ok(Rc::new(CreatePythonFile::new(
            &options.relative_file_name,
            &options.file_contents,
            options.overwrite_existing,
        )))
    }

    fn parse(&self) -> SourceFile {
        parse_source(&self.relative_file_name, &self.file_contents)
    }
}

impl Recipe for CreatePythonFile {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Create Python file"
    }

    fn description(&self) -> &str {
        "Creates a Python file with the given contents."
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        let mut options = Self::option_descriptors();
        options[0] = options[0].clone().value(self.relative_file_name.clone());
        options[1] = options[1].clone().value(self.file_contents.clone());
        options[2] = options[2].clone().value(self.overwrite_existing);
        options
    }

    fn as_scanning(&self) -> Option<&dyn ScanningRecipe> {
        Some(self)
    }
}

impl ScanningRecipe for CreatePythonFile {
    /// Whether the file exists.
    fn initial_value(&self, _ctx: &mut ExecutionContext) -> Box<dyn Any> {
        Box::new(false)
    }

    fn scanner<'a>(&'a self, acc: &'a mut dyn Any) -> RecipeVisitor<'a> {
        Box::new(FileSeen {
            state: VisitState::new(),
            path: &self.relative_file_name,
            seen: acc.downcast_mut::<bool>(),
        })
    }

    fn generate(&self, acc: &mut dyn Any, _ctx: &mut ExecutionContext) -> Vec<SourceFile> {
        match acc.downcast_ref::<bool>() {
            Some(false) => vec![self.parse()],
            _ => Vec::new(),
        }
    }

    fn editor_with_data<'a>(&'a self, acc: &'a dyn Any) -> RecipeVisitor<'a> {
        let exists = acc.downcast_ref::<bool>().copied().unwrap_or(false);
        if exists && self.overwrite_existing {
            Box::new(Overwrite {
                state: VisitState::new(),
                recipe: self,
            })
        } else {
            Box::new(NoopVisitor::default())
        }
    }
}

struct FileSeen<'a> {
    state: VisitState,
    path: &'a str,
    seen: Option<&'a mut bool>,
}

impl TreeVisitor<ExecutionContext> for FileSeen<'_> {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_source_file(&mut self, source: SourceFile, _ctx: &mut ExecutionContext) -> SourceFile {
        if source.source_path() == self.path {
            if let Some(seen) = self.seen.as_deref_mut() {
                *seen = true;
            }
        }
        source
    }
}

struct Overwrite<'a> {
    state: VisitState,
    recipe: &'a CreatePythonFile,
}

impl TreeVisitor<ExecutionContext> for Overwrite<'_> {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }

    fn visit_source_file(&mut self, source: SourceFile, _ctx: &mut ExecutionContext) -> SourceFile {
        if source.source_path() != self.recipe.relative_file_name {
            return source;
        }
        self.recipe.parse()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteSourceFilesOptions {
    file_pattern: String,
}

/// Deletes every source file whose path matches a glob.
#[derive(Debug, Clone)]
pub struct DeleteSourceFiles {
    file_pattern: String,
    matcher: GlobMatcher,
}

impl DeleteSourceFiles {
    pub const NAME: &'static str = "org.openrewrite.DeleteSourceFiles";

    pub fn new(file_pattern: &str) -> RecipeResult<Self> {
        let glob =
            Glob::new(file_pattern).map_err(|err| invalid_option(Self::NAME, "filePattern", err))?;
        Ok(DeleteSourceFiles {
            file_pattern: file_pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub(crate) fn listing() -> RecipeDescriptor {
        listing(
            Self::NAME,
            "Delete files",
            "Deletes source files whose path matches a glob.",
            vec![Self::file_pattern_option()],
        )
    }

    fn file_pattern_option() -> OptionDescriptor {
        OptionDescriptor::new(
            "filePattern",
            "String",
            "File pattern",
            "A glob matched against each source path.",
        )
        .example("**/legacy/*.py")
    }

    pub(crate) fn create(_marketplace: &Marketplace, options: &Value) -> RecipeResult<Rc<dyn Recipe>> {
        let options: DeleteSourceFilesOptions = parse_options(Self::NAME, options)?;
        Ok(Rc::new(DeleteSourceFiles::new(&options.file_pattern)?))
    }
}

impl Recipe for DeleteSourceFiles {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Delete files"
    }

    fn description(&self) -> &str {
        "Deletes source files whose path matches a glob."
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![Self::file_pattern_option().value(self.file_pattern.clone())]
    }

    fn retains(&self, source: &SourceFile, _ctx: &ExecutionContext) -> bool {
        !self.matcher.is_match(source.source_path())
    }
}

// ============================================================================
// Composition
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeRef {
    Name(String),
    Configured {
        name: String,
        #[serde(default)]
        options: Value,
    },
}

fn composite_name() -> String {
    CompositeRecipe::NAME.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompositeOptions {
    #[serde(default = "composite_name")]
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: String,
    recipe_list: Vec<RecipeRef>,
}

/// A declarative recipe: a list of other recipes run in order.
#[derive(Clone)]
pub struct CompositeRecipe {
    name: String,
    display_name: String,
    description: String,
    recipes: Vec<Rc<dyn Recipe>>,
}

impl CompositeRecipe {
    pub const NAME: &'static str = "org.openrewrite.config.CompositeRecipe";

    pub fn new(name: &str, recipes: Vec<Rc<dyn Recipe>>) -> Self {
        CompositeRecipe {
            name: name.to_string(),
            display_name: name.rsplit('.').next().unwrap_or(name).to_string(),
            description: String::new(),
            recipes,
        }
    }

    pub(crate) fn listing() -> RecipeDescriptor {
        listing(
            Self::NAME,
            "Composite recipe",
            "Runs a list of recipes in order.",
            vec![
                OptionDescriptor::new("name", "String", "Name", "Name of the composite.").optional(),
                OptionDescriptor::new(
                    "recipeList",
                    "List",
                    "Recipes",
                    "Recipe names, or objects with a `name` and `options`.",
                ),
            ],
        )
    }

    pub(crate) fn create(marketplace: &Marketplace, options: &Value) -> RecipeResult<Rc<dyn Recipe>> {
        let options: CompositeOptions = parse_options(Self::NAME, options)?;
        let recipes = options
            .recipe_list
            .iter()
            .map(|reference| match reference {
                RecipeRef::Name(name) => marketplace.create(name, &Value::Null),
                RecipeRef::Configured { name, options } => marketplace.create(name, options),
            })
            .collect::<RecipeResult<Vec<_>>>()?;
        let mut recipe = CompositeRecipe::new(&options.name, recipes);
        if let Some(display_name) = options.display_name {
            recipe.display_name = display_name;
        }
        recipe.description = options.description;
        Ok(Rc::new(recipe))
    }
}

impl std::fmt::Debug for CompositeRecipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeRecipe")
            .field("name", &self.name)
            .field("recipes", &self.recipes.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl Recipe for CompositeRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recipe_list(&self) -> Vec<Rc<dyn Recipe>> {
        self.recipes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{describe, run};
    use rewrite_python_lst::print;
    use serde_json::json;

    fn parse(path: &str, source: &str) -> SourceFile {
        parse_source(path, source)
    }

    fn printed_after(run: &crate::recipe::RecipeRun) -> Vec<Option<String>> {
        run.changes
            .iter()
            .map(|change| change.after.as_ref().map(print))
            .collect()
    }

    #[test]
    fn auto_format_detects_tabs() {
        let recipe = Marketplace::builtin()
            .create(AutoFormat::NAME, &Value::Null)
            .unwrap();
        let mut ctx = ExecutionContext::new();
        let run = run(recipe, vec![parse("t.py", "def f():\n\tx = 1   \n")], &mut ctx);
        assert_eq!(printed_after(&run), vec![Some("def f():\n\tx = 1\n".to_string())]);
    }

    #[test]
    fn format_stage_uses_configured_line_break() {
        let recipe = Marketplace::builtin()
            .create(
                "org.openrewrite.python.format.NormalizeLineBreaks",
                &json!({"style": {"general": {"line_break": "CRLF"}}}),
            )
            .unwrap();
        let mut ctx = ExecutionContext::new();
        let run = run(recipe, vec![parse("t.py", "x = 1\ny = 2\n")], &mut ctx);
        assert_eq!(printed_after(&run), vec![Some("x = 1\r\ny = 2\r\n".to_string())]);
    }

    #[test]
    fn unchanged_files_are_not_reported() {
        let recipe = Marketplace::builtin()
            .create("org.openrewrite.python.format.RemoveTrailingWhitespace", &Value::Null)
            .unwrap();
        let mut ctx = ExecutionContext::new();
        let run = run(recipe, vec![parse("t.py", "x = 1\n")], &mut ctx);
        assert!(run.changes.is_empty());
    }

    #[test]
    fn find_pattern_marks_matches() {
        let recipe = Marketplace::builtin()
            .create(FindPattern::NAME, &json!({"pattern": "f({x})"}))
            .unwrap();
        let mut ctx = ExecutionContext::new();
        let run = run(recipe, vec![parse("t.py", "f(1)\ng(2)\n")], &mut ctx);
        assert_eq!(run.changes.len(), 1);
        let Some(SourceFile::CompilationUnit(unit)) = &run.changes[0].after else {
            panic!("expected a compilation unit");
        };
        let marked: Vec<bool> = unit
            .statements
            .iter()
            .map(|statement| match &statement.element {
                Statement::ExpressionStatement(wrapper) => {
                    wrapper.expression.markers().search_result().is_some()
                }
                _ => false,
            })
            .collect();
        assert_eq!(marked, vec![true, false]);
    }

    #[test]
    fn find_pattern_rejects_bad_patterns() {
        let err = FindPattern::new("f(", vec![]).unwrap_err();
        assert!(matches!(err, RecipeError::InvalidOption { option, .. } if option == "pattern"));
    }

    #[test]
    fn delete_source_files_by_glob() {
        let recipe = Marketplace::builtin()
            .create(DeleteSourceFiles::NAME, &json!({"filePattern": "legacy/**"}))
            .unwrap();
        let mut ctx = ExecutionContext::new();
        let sources = vec![parse("legacy/a.py", "a = 1\n"), parse("b.py", "b = 1\n")];
        let run = run(recipe, sources, &mut ctx);
        assert_eq!(run.changes.len(), 1);
        let change = &run.changes[0];
        assert_eq!(change.before.as_ref().map(SourceFile::source_path), Some("legacy/a.py"));
        assert!(change.after.is_none());
    }

    #[test]
    fn create_python_file_generates_missing_file() {
        let options = json!({"relativeFileName": "pkg/new.py", "fileContents": "y = 2\n"});
        let recipe = Marketplace::builtin().create(CreatePythonFile::NAME, &options).unwrap();
        let mut ctx = ExecutionContext::new();
        let run = run(recipe, vec![parse("x.py", "x = 1\n")], &mut ctx);
        assert_eq!(run.changes.len(), 1);
        assert!(run.changes[0].before.is_none());
        assert_eq!(printed_after(&run), vec![Some("y = 2\n".to_string())]);
    }

    #[test]
    fn create_python_file_leaves_existing_file() {
        let options = json!({"relativeFileName": "x.py", "fileContents": "y = 2\n"});
        let recipe = Marketplace::builtin().create(CreatePythonFile::NAME, &options).unwrap();
        let mut ctx = ExecutionContext::new();
        let run = run(recipe, vec![parse("x.py", "x = 1\n")], &mut ctx);
        assert!(run.changes.is_empty());
    }

    #[test]
    fn create_python_file_can_overwrite() {
        let options = json!({
            "relativeFileName": "x.py",
            "fileContents": "y = 2\n",
            "overwriteExisting": true
        });
        let recipe = Marketplace::builtin().create(CreatePythonFile::NAME, &options).unwrap();
        let mut ctx = ExecutionContext::new();
        let run = run(recipe, vec![parse("x.py", "x = 1\n")], &mut ctx);
        assert_eq!(printed_after(&run), vec![Some("y = 2\n".to_string())]);
    }

    #[test]
    fn composite_runs_children_in_order() {
        let options = json!({
            "name": "com.example.Tidy",
            "recipeList": [
                "org.openrewrite.python.format.RemoveTrailingWhitespace",
                {
                    "name": "org.openrewrite.python.format.NormalizeLineBreaks",
                    "options": {"style": {"general": {"line_break": "CRLF"}}}
                }
            ]
        });
        let recipe = Marketplace::builtin().create(CompositeRecipe::NAME, &options).unwrap();
        assert_eq!(recipe.name(), "com.example.Tidy");
        assert_eq!(recipe.display_name(), "Tidy");
        let descriptor = describe(recipe.as_ref());
        assert_eq!(descriptor.recipe_list.len(), 2);

        let mut ctx = ExecutionContext::new();
        let run = run(recipe, vec![parse("t.py", "x = 1  \n")], &mut ctx);
        assert_eq!(printed_after(&run), vec![Some("x = 1\r\n".to_string())]);
    }

    #[test]
    fn composite_children_must_exist() {
        let options = json!({"recipeList": ["com.example.Missing"]});
        let err = Marketplace::builtin()
            .create(CompositeRecipe::NAME, &options)
            .err()
            .unwrap();
        assert_eq!(err, RecipeError::UnknownRecipe("com.example.Missing".into()));
    }
}
