//! Request handlers.

use std::path::{Path, PathBuf};

use rewrite_core::identity::Identity;
use rewrite_core::rpc::Transport;
use rewrite_python_lst::printer::{print_with, MarkerPrinter};
use rewrite_python_lst::tree::{CompilationUnit, Node, SourceFile};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use super::params::{
    GenerateParams, GenerateResult, ObjectParams, ParseParams, ParseProjectParams, ParsedFile,
    PrepareRecipeParams, PreparedRecipeResult, PrintParams, VisitParams, VisitResult,
};
use super::project::{parse_input, project_files, relative_path};
use super::Server;
use crate::error::{RecipeError, ServerError, ServerResult};
use crate::recipe::{failure_of, PreparedRecipe};

const EDIT_PREFIX: &str = "edit:";
const SCAN_PREFIX: &str = "scan:";

fn to_value<S: serde::Serialize>(value: &S) -> ServerResult<Value> {
    serde_json::to_value(value).map_err(|err| ServerError::Rpc(err.into()))
}

fn parsed_file(id: String, source: &SourceFile) -> ParsedFile {
    ParsedFile {
        id,
        source_file_type: source.wire_type().to_string(),
    }
}

impl<T: Transport> Server<T> {
    // ========================================================================
    // Parsing
    // ========================================================================

    pub(super) fn parse(&mut self, params: ParseParams) -> ServerResult<Value> {
        self.absorb_context(&params.p);
        let relative_to = params.relative_to.as_deref().map(Path::new);
        let require = self.require_print_equals_input();
        let mut ids = Vec::with_capacity(params.inputs.len());
        for input in &params.inputs {
            let source_path = match (&input.source_path, &input.path) {
                (Some(source_path), _) => source_path.clone(),
                (None, Some(path)) => match relative_to {
                    Some(base) => relative_path(Path::new(path), base),
                    None => path.clone(),
                },
                (None, None) => {
                    return Err(ServerError::invalid_params(
                        "Parse",
                        "an input needs a path or a sourcePath",
                    ))
                }
            };
            let source = parse_input(
                input.path.as_deref(),
                input.text.as_deref(),
                &source_path,
                require,
            )?;
            ids.push(self.objects.insert(source));
        }
        debug!(count = ids.len(), "parsed");
        to_value(&ids)
    }

    pub(super) fn parse_project(&mut self, params: ParseProjectParams) -> ServerResult<Value> {
        self.absorb_context(&params.p);
        let root = PathBuf::from(&params.project_path);
        let base = params
            .relative_to
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| root.clone());
        let require = self.require_print_equals_input();
        let mut parsed = Vec::new();
        for file in project_files(&root, &params.exclusions)? {
            let source_path = relative_path(&file, &base);
            let source = parse_input(
                Some(file.to_string_lossy().as_ref()),
                None,
                &source_path,
                require,
            )?;
            let source_file = parsed_file(String::new(), &source);
            let id = self.objects.insert(source);
            parsed.push(ParsedFile { id, ..source_file });
        }
        info!(project = %root.display(), count = parsed.len(), "parsed project");
        to_value(&parsed)
    }

    fn require_print_equals_input(&self) -> bool {
        self.config.require_print_equals_input || self.ctx.require_print_equals_input()
    }

    /// Copies the messages of an execution context sent by the host.
    fn absorb_context(&mut self, p: &Value) {
        if let Some(messages) = p.get("messages").and_then(Value::as_object) {
            for (key, value) in messages {
                self.ctx.put_message(key.clone(), value.clone());
            }
        }
    }

    // ========================================================================
    // Object exchange
    // ========================================================================

    pub(super) fn get_object(&mut self, params: ObjectParams) -> ServerResult<Value> {
        let batch = self.objects.next_batch(
            &params.id,
            self.config.batch_size,
            self.config.trace_rpc_messages,
        )?;
        to_value(&batch)
    }

    /// Pulls the host's latest version of `id`.
    fn fetch(&mut self, id: &str, source_file_type: Option<&str>) -> ServerResult<SourceFile> {
        let first = self.client.get_object_batch(id, source_file_type)?;
        let client = &mut self.client;
        let mut pull = || client.get_object_batch(id, source_file_type);
        self.objects
            .receive(id, first, &mut pull)?
            .ok_or_else(|| ServerError::UnknownObject(id.to_string()))
    }

    pub(super) fn get_languages(&mut self) -> ServerResult<Value> {
        Ok(json!([CompilationUnit::WIRE_TYPE]))
    }

    pub(super) fn print(&mut self, params: PrintParams) -> ServerResult<Value> {
        let markers = match params.marker_printer.as_deref() {
            None | Some("DEFAULT") => MarkerPrinter::Default,
            Some("FENCED") => MarkerPrinter::Fenced,
            Some("SANITIZED") => MarkerPrinter::Sanitized,
            Some(other) => {
                return Err(ServerError::invalid_params(
                    "Print",
                    format!("unknown marker printer {other}"),
                ))
            }
        };
        let source = self.fetch(&params.id, params.source_file_type.as_deref())?;
        Ok(Value::String(print_with(&source, markers)))
    }

    pub(super) fn reset(&mut self) -> ServerResult<Value> {
        self.reset_state();
        info!("reset");
        Ok(Value::Bool(true))
    }

    // ========================================================================
    // Recipes
    // ========================================================================

    pub(super) fn get_marketplace(&mut self) -> ServerResult<Value> {
        to_value(&self.marketplace.entries())
    }

    pub(super) fn prepare_recipe(&mut self, params: PrepareRecipeParams) -> ServerResult<Value> {
        let recipe = self.marketplace.create(&params.id, &params.options)?;
        let prepared = PreparedRecipe::new(recipe, &mut self.ctx);
        let handle = Uuid::new_v4().to_string();
        let result = PreparedRecipeResult {
            id: handle.clone(),
            descriptor: prepared.descriptor(),
            edit_visitor: format!("{EDIT_PREFIX}{handle}"),
            scan_visitor: prepared
                .is_scanning()
                .then(|| format!("{SCAN_PREFIX}{handle}")),
            edit_preconditions: Vec::new(),
            scan_preconditions: Vec::new(),
        };
        debug!(recipe = %params.id, handle = %handle, "prepared");
        self.prepared.insert(handle, prepared);
        to_value(&result)
    }

    pub(super) fn visit(&mut self, params: VisitParams) -> ServerResult<Value> {
        self.absorb_context(&params.p);
        let before = self.fetch(&params.tree_id, params.source_file_type.as_deref())?;
        let after = if let Some(handle) = params.visitor.strip_prefix(SCAN_PREFIX) {
            let prepared = self
                .prepared
                .get_mut(handle)
                .ok_or_else(|| ServerError::UnknownObject(handle.to_string()))?;
            let name = prepared.recipe().name().to_string();
            if let Err(err) = prepared.scan(&before, &mut self.ctx) {
                return Err(self.recipe_failed(err, &name));
            }
            Some(before.clone())
        } else if let Some(handle) = params.visitor.strip_prefix(EDIT_PREFIX) {
            let prepared = self
                .prepared
                .get(handle)
                .ok_or_else(|| ServerError::UnknownObject(handle.to_string()))?;
            let name = prepared.recipe().name().to_string();
            match prepared.edit(before.clone(), &mut self.ctx) {
                Ok(after) => after,
                Err(err) => return Err(self.recipe_failed(err, &name)),
            }
        } else {
            let recipe = self.marketplace.create(&params.visitor, &Value::Null)?;
            let prepared = PreparedRecipe::new(recipe, &mut self.ctx);
            match prepared.edit(before.clone(), &mut self.ctx) {
                Ok(after) => after,
                Err(err) => return Err(self.recipe_failed(err, &params.visitor)),
            }
        };

        let modified = !after.is_identical(&Some(before));
        debug!(tree = %params.tree_id, visitor = %params.visitor, modified, "visited");
        self.objects.update(&params.tree_id, after);
        to_value(&VisitResult { modified })
    }

    /// Records a recipe failure on the context and turns it into the
    /// request's error.
    fn recipe_failed(&mut self, err: RecipeError, recipe: &str) -> ServerError {
        self.ctx.record_failure(failure_of(err.clone(), recipe));
        err.into()
    }

    pub(super) fn generate(&mut self, params: GenerateParams) -> ServerResult<Value> {
        self.absorb_context(&params.p);
        let prepared = self
            .prepared
            .get_mut(&params.id)
            .ok_or_else(|| ServerError::UnknownObject(params.id.clone()))?;
        let name = prepared.recipe().name().to_string();
        let generated = match prepared.generate(&mut self.ctx) {
            Ok(generated) => generated,
            Err(err) => return Err(self.recipe_failed(err, &name)),
        };
        let mut result = GenerateResult::default();
        for source in generated {
            result.source_file_types.push(source.wire_type().to_string());
            result.ids.push(self.objects.insert(source));
        }
        debug!(count = result.ids.len(), "generated");
        to_value(&result)
    }
}
