//! The `rewrite-python-rpc` binary: a Python language plug-in for
//! OpenRewrite hosts.
//!
//! The host starts this process and talks Content-Length framed JSON-RPC
//! over its stdin and stdout. Everything else (logging, metrics, config)
//! is set up here before handing the channel to
//! [`Server`](rewrite_python::Server).

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
#[cfg(unix)]
pub mod transport;

use rewrite_core::rpc::Transport;
use rewrite_python::Server;
use tracing::info;

pub use cli::Cli;
pub use config::Config;
pub use error::{CliError, ExitStatus};

/// Loads config, installs logging and serves stdio until the host hangs up.
pub fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    logging::init(cli.log_level, cli.log_format, cli.log_file.as_deref())?;
    logging::install_panic_hook();

    let server_config = config.server_config(&cli);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        batch_size = server_config.batch_size,
        timeout_ms = server_config.request_timeout.as_millis() as u64,
        "starting"
    );
    serve(stdio()?, server_config, &cli)
}

/// Serves `transport` until the host closes it.
pub fn serve<T: Transport>(
    transport: T,
    config: rewrite_python::ServerConfig,
    cli: &Cli,
) -> Result<(), CliError> {
    let mut server = Server::new(transport, config);
    if let Some(path) = &cli.metrics_csv {
        server = server.with_observer(Box::new(metrics::CsvMetrics::open(path)?));
    }
    server.run()?;
    Ok(())
}

#[cfg(unix)]
fn stdio() -> Result<impl Transport, CliError> {
    transport::stdio().map_err(CliError::Stdio)
}

#[cfg(not(unix))]
fn stdio() -> Result<impl Transport, CliError> {
    Ok(rewrite_core::rpc::StreamTransport::new(
        std::io::stdin().lock(),
        std::io::stdout(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rewrite_core::rpc::{MemoryTransport, Request};
    use serde_json::Value;

    fn request(id: i64, method: &str) -> Value {
        serde_json::to_value(Request::new(id, method, Value::Null)).unwrap()
    }

    #[test]
    fn serve_writes_metrics_until_the_host_hangs_up() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = dir.path().join("metrics.csv");
        let cli = Cli::parse_from([
            "rewrite-python-rpc",
            "--metrics-csv",
            metrics.to_str().unwrap(),
        ]);
        let transport = MemoryTransport::new([request(1, "GetLanguages"), request(2, "Nope")]);
        serve(transport, Config::default().server_config(&cli), &cli).unwrap();

        let text = std::fs::read_to_string(&metrics).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains(",GetLanguages,"));
        assert!(lines[1].ends_with(",ok"));
        assert!(lines[2].contains(",Nope,"));
        assert!(lines[2].ends_with(",error"));
    }

    #[test]
    fn unopenable_metrics_fail_startup() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = dir.path().join("missing/metrics.csv");
        let cli = Cli::parse_from([
            "rewrite-python-rpc",
            "--metrics-csv",
            metrics.to_str().unwrap(),
        ]);
        let transport = MemoryTransport::new(Vec::<Value>::new());
        let err = serve(transport, Config::default().server_config(&cli), &cli).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
