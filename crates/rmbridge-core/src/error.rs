//! Error taxonomy for provisioning, invocation and operations.
//!
//! Each concern gets its own enum so callers can match on the exact failure
//! kind; [`BridgeError`] is the umbrella returned by the detailed client API.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures while acquiring and installing the external executable.
#[derive(Debug, Clone, Error)]
pub enum ProvisionError {
    /// The release index or artifact host could not be reached.
    #[error("Network unreachable while fetching {url}: {reason}")]
    NetworkUnreachable { url: String, reason: String },

    /// The release index answered with something unusable.
    #[error("Release index returned an unusable response: {0}")]
    ReleaseIndex(String),

    /// No release is published for this OS/architecture.
    #[error("No rmapi release is published for this platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// The release exists but carries no artifact for this platform.
    #[error("Release {version} has no asset for platform '{platform_tag}'")]
    AssetNotFound {
        version: String,
        platform_tag: String,
    },

    /// The downloaded archive is truncated, malformed or lacks the executable.
    #[error("Downloaded archive is corrupt: {0}")]
    CorruptArchive(String),

    /// The install location cannot be written.
    #[error("Install location {path} is not writable: {reason}")]
    NotWritable { path: PathBuf, reason: String },
}

impl ProvisionError {
    pub fn not_writable(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::NotWritable {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn corrupt(reason: impl std::fmt::Display) -> Self {
        Self::CorruptArchive(reason.to_string())
    }
}

/// Failures launching or supervising the external process.
#[derive(Debug, Clone, Error)]
pub enum InvocationError {
    #[error("rmapi binary not found at: {path}\n\nRun 'rmbridge setup' to install it.")]
    BinaryNotFound { path: PathBuf },

    #[error("rmapi binary exists but is not executable: {path}")]
    NotExecutable { path: PathBuf },

    #[error("Failed to start rmapi: {reason}")]
    SpawnFailed { reason: String },

    /// The process exceeded its deadline and was terminated.
    #[error("rmapi did not finish within {after:?} and was terminated")]
    Timeout { after: Duration },

    #[error("I/O error while running rmapi: {0}")]
    Io(String),
}

/// The external process ran and exited nonzero.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("rmapi exited with status {exit_code}: {stderr}")]
pub struct OperationFailure {
    pub exit_code: i32,
    pub stderr: String,
}

/// Fail-fast validation errors raised before anything is executed.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error("No file found at '{}'", .0.display())]
    LocalFileMissing(PathBuf),

    #[error("'{}' is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("Cannot read '{}': {reason}", path.display())]
    LocalFileUnreadable { path: PathBuf, reason: String },

    #[error("Invalid remote path '{path}': {reason}")]
    InvalidRemotePath { path: String, reason: String },

    #[error("Remote path '{0}' is outside the managed /papers tree")]
    OutsideManagedRoot(String),

    #[error("Invalid remote name '{0}'")]
    InvalidRemoteName(String),
}

impl BuildError {
    pub fn invalid_remote(path: &str, reason: &str) -> Self {
        Self::InvalidRemotePath {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Umbrella error for the detailed client API.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error(transparent)]
    Operation(#[from] OperationFailure),

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl BridgeError {
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Invocation(InvocationError::Timeout { .. }))
    }

    /// Captured stderr, when the failure came from a finished process.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Operation(failure) => Some(&failure.stderr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_distinguishable() {
        let err = BridgeError::from(InvocationError::Timeout {
            after: Duration::from_secs(10),
        });
        assert!(err.is_timeout());
        assert!(err.stderr().is_none());
    }

    #[test]
    fn test_operation_failure_carries_stderr() {
        let err = BridgeError::from(OperationFailure {
            exit_code: 1,
            stderr: "directory doesn't exist".to_string(),
        });
        assert!(!err.is_timeout());
        assert_eq!(err.stderr(), Some("directory doesn't exist"));
        assert!(err.to_string().contains("status 1"));
    }

    #[test]
    fn test_missing_file_message() {
        let err = BuildError::LocalFileMissing(PathBuf::from("./paper.pdf"));
        assert_eq!(err.to_string(), "No file found at './paper.pdf'");
    }
}
