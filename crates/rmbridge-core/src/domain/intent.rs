//! High-level operation requests.
//!
//! Intents are the stable interface crossing the execution seam: a
//! subprocess backend translates them into argv, a native protocol client
//! would translate them into requests. Neither representation leaks back.

use std::fmt;
use std::path::PathBuf;

use super::remote_path::RemotePath;

/// An operation against the remote document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Create a directory and any missing ancestors. Idempotent.
    EnsureDirectory { path: RemotePath },

    /// Upload a local file into an existing remote directory.
    Upload {
        local_path: PathBuf,
        remote_directory: RemotePath,
        /// Document name on the remote side; the local stem when `None`.
        remote_name: Option<String>,
    },

    /// List the entries of a remote directory.
    List { path: RemotePath },

    /// Move or rename a remote entry.
    Move { from: RemotePath, to: RemotePath },
}

impl Intent {
    /// The `rmapi` subcommand carrying out this intent, also used in logs.
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::EnsureDirectory { .. } => "mkdir",
            Self::Upload { .. } => "put",
            Self::List { .. } => "ls",
            Self::Move { .. } => "mv",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnsureDirectory { path } => write!(f, "mkdir -p {path}"),
            Self::Upload {
                local_path,
                remote_directory,
                remote_name,
            } => {
                write!(f, "put {} -> {remote_directory}", local_path.display())?;
                if let Some(name) = remote_name {
                    write!(f, " as '{name}'")?;
                }
                Ok(())
            }
            Self::List { path } => write!(f, "ls {path}"),
            Self::Move { from, to } => write!(f, "mv {from} {to}"),
        }
    }
}
