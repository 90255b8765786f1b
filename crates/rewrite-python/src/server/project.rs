//! Turning files on disk into source files.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use rewrite_core::diff::unified_diff;
use rewrite_python_lst::parser::PARSER_TYPE;
use rewrite_python_lst::tree::{Marker, Markers, ParseError, SourceFile, Space};
use rewrite_python_lst::{parse_path, parse_source, print};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{ServerError, ServerResult};

/// Directories never descended into when walking a project.
const SKIPPED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".venv",
    "venv",
    "__pycache__",
    "node_modules",
    ".tox",
    ".mypy_cache",
];

/// Exception type recorded when a tree does not print back to its input.
const IDEMPOTENCE_EXCEPTION: &str = "PrintIdempotenceException";

/// Parses inline text, or the file at `path` when no text is given.
pub(crate) fn parse_input(
    path: Option<&str>,
    text: Option<&str>,
    source_path: &str,
    require_print_equals_input: bool,
) -> ServerResult<SourceFile> {
    let (source, text) = match (text, path) {
        (Some(text), _) => (parse_source(source_path, text), text.to_string()),
        (None, Some(path)) => {
            let source = parse_path(Path::new(path), source_path).map_err(|source| {
                ServerError::Io {
                    path: path.to_string(),
                    source,
                }
            })?;
            if !require_print_equals_input {
                return Ok(source);
            }
            let text = std::fs::read_to_string(path).map_err(|source| ServerError::Io {
                path: path.to_string(),
                source,
            })?;
            (source, text)
        }
        (None, None) => {
            return Err(ServerError::invalid_params(
                "Parse",
                "an input needs a path or text",
            ))
        }
    };
    if require_print_equals_input {
        Ok(require_print_equals(source, &text))
    } else {
        Ok(source)
    }
}

/// `source`, or a `ParseError` carrying a diff when printing `source` does
/// not reproduce `text`.
pub(crate) fn require_print_equals(source: SourceFile, text: &str) -> SourceFile {
    let SourceFile::CompilationUnit(unit) = &source else {
        return source;
    };
    let printed = print(&source);
    if printed == text {
        return source;
    }
    let diff = unified_diff(&unit.source_path, text, &printed);
    warn!(source_path = %unit.source_path, "printed tree differs from its input");
    let marker = Marker::parse_exception(
        PARSER_TYPE,
        IDEMPOTENCE_EXCEPTION,
        format!("{} is not print idempotent.\n{diff}", unit.source_path),
    );
    let body = text.strip_prefix('\u{feff}').unwrap_or(text);
    SourceFile::ParseError(Rc::new(ParseError::new(
        Space::EMPTY,
        Markers::build(vec![marker]),
        unit.source_path.clone(),
        unit.charset_name.clone(),
        unit.charset_bom_marked,
        unit.checksum.clone(),
        unit.file_attributes.clone(),
        body.to_string(),
    )))
}

/// `path` relative to `base`, with `/` separators.
pub(crate) fn relative_path(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn exclusion_set(exclusions: &[String]) -> ServerResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for exclusion in exclusions {
        let glob = Glob::new(exclusion)
            .map_err(|err| ServerError::invalid_params("ParseProject", err.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| ServerError::invalid_params("ParseProject", err.to_string()))
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    SKIPPED_DIRS.iter().any(|dir| name == *dir)
}

/// The Python files under `root`, sorted, minus those matching
/// `exclusions` (relative to `root`).
pub(crate) fn project_files(root: &Path, exclusions: &[String]) -> ServerResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(ServerError::Io {
            path: root.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }
    let excluded = exclusion_set(exclusions)?;
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || (!is_skipped_dir(entry)
                    && !excluded.is_match(relative_path(entry.path(), root)))
        });
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "py" || ext == "pyi")
        {
            files.push(entry.into_path());
        }
    }
    debug!(root = %root.display(), count = files.len(), "collected project files");
    Ok(files)
}
