//! Subprocess invocation types.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One fully resolved execution of the external tool.
///
/// Built fresh per operation and consumed by a single run; there are no
/// mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    argv: Vec<String>,
    env_overrides: BTreeMap<String, String>,
    working_dir: PathBuf,
}

impl InvocationSpec {
    pub const fn new(
        argv: Vec<String>,
        env_overrides: BTreeMap<String, String>,
        working_dir: PathBuf,
    ) -> Self {
        Self {
            argv,
            env_overrides,
            working_dir,
        }
    }

    /// Arguments passed after the executable path.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Variables layered over the inherited environment.
    pub const fn env_overrides(&self) -> &BTreeMap<String, String> {
        &self.env_overrides
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

/// Captured outcome of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl InvocationResult {
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Backend-neutral result of a successful operation.
///
/// `exit_code` is `None` for backends that do not run a process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationOutcome {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<InvocationResult> for OperationOutcome {
    fn from(result: InvocationResult) -> Self {
        Self {
            exit_code: Some(result.exit_code),
            stdout: result.stdout_text(),
            stderr: result.stderr_text(),
        }
    }
}
