//! Startup and shutdown errors of the binary.
//!
//! ## Exit Codes
//!
//! - `0`: the host closed stdin
//! - `2`: bad configuration (unreadable or invalid config file)
//! - `3`: a log or metrics file could not be opened
//! - `4`: the RPC channel broke while serving
//! - `10`: internal errors

use std::fmt;
use std::path::PathBuf;

use rewrite_python::ServerError;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    InvalidConfig = 2,
    OutputFile = 3,
    Protocol = 4,
    Internal = 10,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot open metrics file {}: {source}", path.display())]
    MetricsFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A global subscriber was already installed.
    #[error("cannot install logging: {0}")]
    Logging(String),

    /// Standard input or output could not be set up.
    #[error("cannot open stdio: {0}")]
    Stdio(std::io::Error),

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl From<&CliError> for ExitStatus {
    fn from(err: &CliError) -> Self {
        match err {
            CliError::ConfigRead { .. } | CliError::ConfigParse { .. } => ExitStatus::InvalidConfig,
            CliError::LogFile { .. } | CliError::MetricsFile { .. } => ExitStatus::OutputFile,
            CliError::Stdio(_) | CliError::Server(_) => ExitStatus::Protocol,
            CliError::Logging(_) => ExitStatus::Internal,
        }
    }
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        ExitStatus::from(self).code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewrite_core::RpcError;

    #[test]
    fn exit_codes_by_kind() {
        let config = CliError::ConfigRead {
            path: PathBuf::from("c.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(config.exit_code(), 2);

        let metrics = CliError::MetricsFile {
            path: PathBuf::from("m.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(metrics.exit_code(), 3);

        let broken = CliError::from(ServerError::from(RpcError::UnexpectedEof));
        assert_eq!(broken.exit_code(), 4);
        assert_eq!(CliError::Logging("twice".into()).exit_code(), 10);
    }

    #[test]
    fn messages_name_the_file() {
        let err = CliError::LogFile {
            path: PathBuf::from("/tmp/x.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "cannot open log file /tmp/x.log: gone");
    }
}
