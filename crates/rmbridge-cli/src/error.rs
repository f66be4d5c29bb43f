//! CLI-specific error types and exit code mapping.

use rmbridge_core::{BridgeError, ConfigError, InvocationError, ProvisionError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid local file or remote path.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Environment or flag values could not be resolved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// rmapi could not be provisioned.
    #[error("Setup failed: {0}")]
    Unavailable(String),

    /// rmapi could not be started or supervised.
    #[error("Process error: {0}")]
    Process(String),

    /// rmapi did not finish in time.
    #[error("{0}")]
    Timeout(String),

    /// rmapi ran and reported a failure.
    #[error("{0}")]
    Operation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error (including a failed remote operation)
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Operation(_) | Self::Other(_) => 1,
            Self::Arguments(_) => 2,
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Process(_) => 71,     // EX_OSERR
            Self::Timeout(_) => 75,     // EX_TEMPFAIL
            Self::Config(_) => 78,      // EX_CONFIG
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<ProvisionError> for CliError {
    fn from(err: ProvisionError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<BridgeError> for CliError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Provision(e) => e.into(),
            BridgeError::Invocation(e @ InvocationError::Timeout { .. }) => {
                Self::Timeout(e.to_string())
            }
            BridgeError::Invocation(e) => Self::Process(e.to_string()),
            BridgeError::Operation(failure) => Self::Operation(failure.to_string()),
            BridgeError::Build(e) => Self::Arguments(e.to_string()),
        }
    }
}
