//! Running recipes over a set of source files.
//!
//! A run has three phases: scanning recipes scan every source file, then
//! generate new ones, then every recipe edits every file in order. A
//! visitor that panics fails only the file it was visiting; the failure is
//! recorded on the execution context with the cursor path at the point of
//! the panic and the file is left as it was.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use rewrite_core::identity::Identity;
use rewrite_core::{ExecutionContext, RecipeFailure};
use rewrite_python_lst::tree::SourceFile;
use rewrite_python_lst::visitor::TreeVisitor;
use tracing::debug;

use super::{describe, Recipe, RecipeDescriptor, RecipeVisitor};
use crate::error::{RecipeError, RecipeResult};

/// One file's outcome. `before` is `None` for a generated file and `after`
/// is `None` for a deleted one.
#[derive(Debug, Clone)]
pub struct Change {
    pub before: Option<SourceFile>,
    pub after: Option<SourceFile>,
}

/// The result of [`run`].
#[derive(Debug, Default)]
pub struct RecipeRun {
    /// Files that changed, were generated or were deleted.
    pub changes: Vec<Change>,
    /// Failures of this run; they are also recorded on the context.
    pub failures: Vec<RecipeFailure>,
}

/// A recipe with its recipe list flattened and its accumulators created,
/// ready to be driven phase by phase.
pub struct PreparedRecipe {
    recipe: Rc<dyn Recipe>,
    chain: Vec<Rc<dyn Recipe>>,
    accumulators: Vec<Option<Box<dyn Any>>>,
}

impl PreparedRecipe {
    pub fn new(recipe: Rc<dyn Recipe>, ctx: &mut ExecutionContext) -> Self {
        let mut chain = Vec::new();
        flatten(&recipe, &mut chain);
        let accumulators = chain
            .iter()
            .map(|recipe| recipe.as_scanning().map(|scanning| scanning.initial_value(ctx)))
            .collect();
        PreparedRecipe {
            recipe,
            chain,
            accumulators,
        }
    }

    pub fn recipe(&self) -> &Rc<dyn Recipe> {
        &self.recipe
    }

    pub fn descriptor(&self) -> RecipeDescriptor {
        describe(self.recipe.as_ref())
    }

    /// Whether any recipe in the chain scans.
    pub fn is_scanning(&self) -> bool {
        self.accumulators.iter().any(Option::is_some)
    }

    /// Runs every scanner over `source`.
    pub fn scan(&mut self, source: &SourceFile, ctx: &mut ExecutionContext) -> RecipeResult<()> {
        for (recipe, acc) in self.chain.iter().zip(self.accumulators.iter_mut()) {
            let (Some(scanning), Some(acc)) = (recipe.as_scanning(), acc.as_mut()) else {
                continue;
            };
            let mut scanner = scanning.scanner(&mut **acc);
            visit_guarded(recipe.as_ref(), &mut scanner, source.clone(), ctx)?;
        }
        Ok(())
    }

    /// Collects the files every scanning recipe generates.
    pub fn generate(&mut self, ctx: &mut ExecutionContext) -> RecipeResult<Vec<SourceFile>> {
        let mut generated = Vec::new();
        for (recipe, acc) in self.chain.iter().zip(self.accumulators.iter_mut()) {
            let (Some(scanning), Some(acc)) = (recipe.as_scanning(), acc.as_mut()) else {
                continue;
            };
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| scanning.generate(&mut **acc, ctx)));
            match outcome {
                Ok(files) => generated.extend(files),
                Err(payload) => {
                    return Err(RecipeError::Runtime {
                        recipe: recipe.name().to_string(),
                        source_path: String::new(),
                        cursor: String::new(),
                        message: panic_message(payload.as_ref()),
                    })
                }
            }
        }
        Ok(generated)
    }

    /// Applies every editor in order. `None` means a recipe deleted the file.
    pub fn edit(
        &self,
        source: SourceFile,
        ctx: &mut ExecutionContext,
    ) -> RecipeResult<Option<SourceFile>> {
        let mut current = source;
        for (recipe, acc) in self.chain.iter().zip(&self.accumulators) {
            if !recipe.retains(&current, ctx) {
                debug!(recipe = recipe.name(), source = current.source_path(), "deleted");
                return Ok(None);
            }
            let mut editor = match (recipe.as_scanning(), acc) {
                (Some(scanning), Some(acc)) => scanning.editor_with_data(&**acc),
                _ => recipe.editor(),
            };
            current = visit_guarded(recipe.as_ref(), &mut editor, current, ctx)?;
        }
        Ok(Some(current))
    }
}

impl std::fmt::Debug for PreparedRecipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedRecipe")
            .field("recipe", &self.recipe.name())
            .field("chain", &self.chain.len())
            .finish()
    }
}

/// Runs `recipe` over `sources`.
pub fn run(
    recipe: Rc<dyn Recipe>,
    sources: Vec<SourceFile>,
    ctx: &mut ExecutionContext,
) -> RecipeRun {
    let mut prepared = PreparedRecipe::new(recipe, ctx);
    let name = prepared.recipe().name().to_string();
    let mut run = RecipeRun::default();
    if prepared.is_scanning() {
        for source in &sources {
            if let Err(err) = prepared.scan(source, ctx) {
                run.record(failure_of(err, &name), ctx);
            }
        }
    }
    let generated = match prepared.generate(ctx) {
        Ok(generated) => generated,
        Err(err) => {
            run.record(failure_of(err, &name), ctx);
            Vec::new()
        }
    };
    for source in sources {
        match prepared.edit(source.clone(), ctx) {
            Ok(Some(after)) if after.is_identical(&source) => {}
            Ok(after) => run.changes.push(Change {
                before: Some(source),
                after,
            }),
            Err(err) => run.record(failure_of(err, &name), ctx),
        }
    }
    for source in generated {
        match prepared.edit(source, ctx) {
            Ok(Some(after)) => run.changes.push(Change {
                before: None,
                after: Some(after),
            }),
            Ok(None) => {}
            Err(err) => run.record(failure_of(err, &name), ctx),
        }
    }
    run
}

impl RecipeRun {
    fn record(&mut self, failure: RecipeFailure, ctx: &mut ExecutionContext) {
        ctx.record_failure(failure.clone());
        self.failures.push(failure);
    }
}

/// The failure recorded for `err`, raised while running `recipe`.
pub(crate) fn failure_of(err: RecipeError, recipe: &str) -> RecipeFailure {
    match err {
        RecipeError::Runtime {
            recipe,
            source_path,
            cursor,
            message,
        } => RecipeFailure {
            recipe,
            source_path,
            message,
            cursor: cursor
                .split('/')
                .filter(|kind| !kind.is_empty())
                .map(str::to_string)
                .collect(),
        },
        other => RecipeFailure {
            recipe: recipe.to_string(),
            source_path: String::new(),
            message: other.to_string(),
            cursor: Vec::new(),
        },
    }
}

fn flatten(recipe: &Rc<dyn Recipe>, chain: &mut Vec<Rc<dyn Recipe>>) {
    chain.push(recipe.clone());
    for child in recipe.recipe_list() {
        flatten(&child, chain);
    }
}

/// Visits `source`, turning a panic into a runtime error that carries the
/// cursor path at the point of failure.
pub(crate) fn visit_guarded(
    recipe: &dyn Recipe,
    visitor: &mut RecipeVisitor<'_>,
    source: SourceFile,
    ctx: &mut ExecutionContext,
) -> RecipeResult<SourceFile> {
    let source_path = source.source_path().to_string();
    let outcome =
        panic::catch_unwind(AssertUnwindSafe(|| visitor.visit_source_file(source, ctx)));
    outcome.map_err(|payload| RecipeError::Runtime {
        recipe: recipe.name().to_string(),
        source_path,
        cursor: visitor.cursor().path_string(),
        message: panic_message(payload.as_ref()),
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "visitor panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::CompositeRecipe;
    use rewrite_python_lst::tree::Identifier;
    use rewrite_python_lst::visitor::VisitState;
    use rewrite_python_lst::{parse_source, print};

    /// Renames `x` to `y` and panics on `boom`.
    struct Rename;

    struct RenameVisitor {
        state: VisitState,
    }

    impl TreeVisitor<ExecutionContext> for RenameVisitor {
        fn state(&self) -> &VisitState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut VisitState {
            &mut self.state
        }

        fn visit_identifier(
            &mut self,
            node: Rc<Identifier>,
            _ctx: &mut ExecutionContext,
        ) -> Rc<Identifier> {
            match node.simple_name.as_str() {
                "boom" => panic!("cannot rename boom"),
                "x" => node.with_simple_name("y".to_string()),
                _ => node,
            }
        }
    }

    impl Recipe for Rename {
        fn name(&self) -> &str {
            "test.Rename"
        }

        fn display_name(&self) -> &str {
            "Rename"
        }

        fn description(&self) -> &str {
            "Renames x to y."
        }

        fn editor(&self) -> RecipeVisitor<'_> {
            Box::new(RenameVisitor {
                state: VisitState::new(),
            })
        }
    }

    #[test]
    fn a_panicking_visitor_fails_only_its_file() {
        let mut ctx = ExecutionContext::new();
        let sources = vec![
            parse_source("a.py", "boom = 1\n"),
            parse_source("b.py", "x = 1\n"),
        ];
        let run = run(Rc::new(Rename), sources, &mut ctx);

        assert_eq!(run.failures.len(), 1);
        let failure = &run.failures[0];
        assert_eq!(failure.recipe, "test.Rename");
        assert_eq!(failure.source_path, "a.py");
        assert_eq!(failure.message, "cannot rename boom");
        assert_eq!(failure.cursor.first().map(String::as_str), Some("CompilationUnit"));
        assert_eq!(failure.cursor.last().map(String::as_str), Some("Identifier"));
        assert_eq!(ctx.failures().len(), 1);

        assert_eq!(run.changes.len(), 1);
        assert_eq!(run.changes[0].after.as_ref().map(print).as_deref(), Some("y = 1\n"));
    }

    #[test]
    fn composite_chain_is_flattened_in_order() {
        let inner = CompositeRecipe::new("test.Inner", vec![Rc::new(Rename)]);
        let outer = CompositeRecipe::new("test.Outer", vec![Rc::new(inner), Rc::new(Rename)]);
        let mut ctx = ExecutionContext::new();
        let prepared = PreparedRecipe::new(Rc::new(outer), &mut ctx);
        let names: Vec<&str> = prepared.chain.iter().map(|recipe| recipe.name()).collect();
        assert_eq!(names, vec!["test.Outer", "test.Inner", "test.Rename", "test.Rename"]);
        assert!(!prepared.is_scanning());
        assert_eq!(prepared.descriptor().recipe_list.len(), 2);
    }

    #[test]
    fn edit_leaves_unmatched_files_untouched() {
        let mut ctx = ExecutionContext::new();
        let prepared = PreparedRecipe::new(Rc::new(Rename), &mut ctx);
        let source = parse_source("c.py", "z = 1\n");
        let after = prepared.edit(source.clone(), &mut ctx).unwrap();
        assert!(after.is_identical(&Some(source)));
    }
}
