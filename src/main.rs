//! Binary entry point.

use std::process::ExitCode;

use clap::Parser;

use rewrite_python_rpc::{run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "exiting");
            // Logging may not be installed yet, and stdout is the RPC channel.
            eprintln!("rewrite-python-rpc: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
