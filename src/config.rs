//! TOML configuration.
//!
//! ```toml
//! [server]
//! batch_size = 1000
//! cache_capacity = 100
//! request_timeout_secs = 10
//!
//! [format.tabs_and_indents]
//! use_tab_character = false
//! indent_size = 4
//!
//! [format.general]
//! line_break = "LF"
//! ```
//!
//! Every key is optional. Command-line flags win over the file.

use std::path::Path;
use std::time::Duration;

use rewrite_python::format::FormatStyle;
use rewrite_python::server::{DEFAULT_BATCH_SIZE, DEFAULT_REQUEST_TIMEOUT};
use rewrite_python::ServerConfig;
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::CliError;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_cache_capacity() -> usize {
    rewrite_core::cache::DEFAULT_CACHE_CAPACITY
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub trace_rpc_messages: bool,
    #[serde(default)]
    pub require_print_equals_input: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            batch_size: default_batch_size(),
            cache_capacity: default_cache_capacity(),
            request_timeout_secs: default_request_timeout_secs(),
            trace_rpc_messages: false,
            require_print_equals_input: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    /// Style for the format recipes; detected per file when absent.
    #[serde(default)]
    pub format: Option<FormatStyle>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parses `text`; `path` only labels errors.
    pub fn parse(text: &str, path: &Path) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The server settings, with command-line overrides applied.
    pub fn server_config(&self, cli: &Cli) -> ServerConfig {
        let timeout_secs = cli.timeout_secs.unwrap_or(self.server.request_timeout_secs);
        ServerConfig {
            batch_size: self.server.batch_size,
            request_timeout: Duration::from_secs(timeout_secs),
            cache_capacity: self.server.cache_capacity,
            trace_rpc_messages: cli.trace_rpc_messages || self.server.trace_rpc_messages,
            require_print_equals_input: self.server.require_print_equals_input,
            style: self.format.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rewrite_python::format::LineBreak;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("rewrite-python-rpc").chain(args.iter().copied()))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, Config::default());
        let server = config.server_config(&cli(&[]));
        assert_eq!(server.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(server.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(server.style.is_none());
    }

    #[test]
    fn sections_are_read() {
        let text = r#"
[server]
batch_size = 50
request_timeout_secs = 3

[format.tabs_and_indents]
use_tab_character = true

[format.general]
line_break = "CRLF"
"#;
        let config = Config::parse(text, Path::new("rewrite.toml")).unwrap();
        assert_eq!(config.server.batch_size, 50);
        assert_eq!(config.server.cache_capacity, 100);
        let style = config.format.clone().unwrap();
        assert!(style.tabs_and_indents.use_tab_character);
        assert_eq!(style.tabs_and_indents.indent_size, 4);
        assert_eq!(style.general.line_break, LineBreak::CrLf);

        let server = config.server_config(&cli(&[]));
        assert_eq!(server.request_timeout, Duration::from_secs(3));
        assert_eq!(server.style, Some(style));
    }

    #[test]
    fn flags_override_the_file() {
        let config = Config::parse("[server]\nrequest_timeout_secs = 3\n", Path::new("c.toml")).unwrap();
        let server = config.server_config(&cli(&["--timeout-secs", "30", "--trace-rpc-messages"]));
        assert_eq!(server.request_timeout, Duration::from_secs(30));
        assert!(server.trace_rpc_messages);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::parse("[server]\nbatch = 1\n", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, CliError::ConfigParse { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\ncache_capacity = 7").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.cache_capacity, 7);

        let missing = Config::load(Path::new("/nonexistent/rewrite.toml")).unwrap_err();
        assert!(matches!(missing, CliError::ConfigRead { .. }));
    }
}
