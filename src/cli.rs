//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Python language server for OpenRewrite hosts.
///
/// Speaks Content-Length framed JSON-RPC on stdin and stdout. Logs go to
/// stderr or `--log-file`, never to stdout.
#[derive(Parser, Debug)]
#[command(name = "rewrite-python-rpc", version)]
pub struct Cli {
    /// Append logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Append one `timestamp,method,duration_ms,outcome` row per request.
    #[arg(long)]
    pub metrics_csv: Option<PathBuf>,

    /// Log every RPC frame and tag delta records with the sending type.
    #[arg(long)]
    pub trace_rpc_messages: bool,

    /// TOML config file with `[server]` and `[format]` sections.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level when `RUST_LOG` is not set.
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log line format.
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Seconds to wait for the host to answer a nested request (default: 10).
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["rewrite-python-rpc"]);
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(!cli.trace_rpc_messages);
        assert!(cli.timeout_secs.is_none());
    }

    #[test]
    fn all_flags() {
        let cli = Cli::parse_from([
            "rewrite-python-rpc",
            "--log-file",
            "server.log",
            "--metrics-csv",
            "metrics.csv",
            "--trace-rpc-messages",
            "--config",
            "rewrite.toml",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--timeout-secs",
            "30",
        ]);
        assert_eq!(cli.log_file, Some(PathBuf::from("server.log")));
        assert_eq!(cli.metrics_csv, Some(PathBuf::from("metrics.csv")));
        assert!(cli.trace_rpc_messages);
        assert_eq!(cli.config, Some(PathBuf::from("rewrite.toml")));
        assert_eq!(cli.log_level.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.timeout_secs, Some(30));
    }
}
