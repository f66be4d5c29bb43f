//! `ExecutionBackend` that shells out to `rmapi`.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use rmbridge_core::{
    BridgeError, ClientConfig, ExecutionBackend, Intent, InvocationError, InvocationResult,
    InvocationSpec, OperationFailure, OperationOutcome, RemotePath,
};
use tempfile::TempDir;
use tracing::{debug, error};

use crate::command::{CommandBuilder, UploadPlan};
use crate::process::ProcessInvoker;

/// Carries out intents by running the `rmapi` command line tool.
#[derive(Debug, Clone)]
pub struct SubprocessBackend {
    builder: CommandBuilder,
    invoker: ProcessInvoker,
}

impl SubprocessBackend {
    pub const fn new(builder: CommandBuilder, invoker: ProcessInvoker) -> Self {
        Self { builder, invoker }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            CommandBuilder::from_config(config),
            ProcessInvoker::from_config(config),
        )
    }

    async fn upload(
        &self,
        verb: &'static str,
        local_path: &Path,
        remote_directory: &RemotePath,
        remote_name: Option<&str>,
    ) -> Result<OperationOutcome, BridgeError> {
        let plan = self
            .builder
            .plan_upload(local_path, remote_directory, remote_name)?;

        // Held until the invocation has finished; dropping it removes the copy
        let staging = if plan.needs_staging() {
            Some(stage(&plan).await?)
        } else {
            None
        };

        let spec = self
            .builder
            .build_upload(&plan, staging.as_ref().map(TempDir::path));
        let result = self.invoke(verb, &spec).await?;
        into_outcome(result)
    }

    async fn ensure_directory(
        &self,
        verb: &'static str,
        path: &RemotePath,
    ) -> Result<OperationOutcome, BridgeError> {
        let spec = self.builder.build_ensure_directory(path);
        let result = self.invoke(verb, &spec).await?;

        // Builds without `-p` report an existing directory as an error
        if !result.success() && reports_existing(&result) {
            debug!(path = %path, "Remote directory already exists");
            return Ok(OperationOutcome::from(result));
        }
        into_outcome(result)
    }

    async fn invoke(
        &self,
        verb: &'static str,
        spec: &InvocationSpec,
    ) -> Result<InvocationResult, InvocationError> {
        let result = self.invoker.run(spec).await?;

        let stderr = result.stderr_text();
        if !stderr.is_empty() {
            if result.success() {
                debug!(verb, "rmapi stderr: {stderr}");
            } else {
                error!(verb, exit_code = result.exit_code, "rmapi stderr: {stderr}");
            }
        }
        Ok(result)
    }
}

#[async_trait]
impl ExecutionBackend for SubprocessBackend {
    async fn execute(&self, intent: &Intent) -> Result<OperationOutcome, BridgeError> {
        let verb = intent.verb();
        match intent {
            Intent::EnsureDirectory { path } => self.ensure_directory(verb, path).await,
            Intent::Upload {
                local_path,
                remote_directory,
                remote_name,
            } => {
                self.upload(verb, local_path, remote_directory, remote_name.as_deref())
                    .await
            }
            Intent::List { path } => {
                let spec = self.builder.build_list(path);
                into_outcome(self.invoke(verb, &spec).await?)
            }
            Intent::Move { from, to } => {
                let spec = self.builder.build_move(from, to);
                into_outcome(self.invoke(verb, &spec).await?)
            }
        }
    }

    fn name(&self) -> &'static str {
        "rmapi-subprocess"
    }
}

fn into_outcome(result: InvocationResult) -> Result<OperationOutcome, BridgeError> {
    if result.success() {
        Ok(OperationOutcome::from(result))
    } else {
        Err(BridgeError::Operation(OperationFailure {
            exit_code: result.exit_code,
            stderr: result.stderr_text(),
        }))
    }
}

fn reports_existing(result: &InvocationResult) -> bool {
    result
        .stderr_text()
        .to_ascii_lowercase()
        .contains("already exists")
}

/// Place the upload source in a private directory under its upload name.
async fn stage(plan: &UploadPlan) -> Result<TempDir, InvocationError> {
    let staging = tempfile::Builder::new()
        .prefix("rmbridge-upload-")
        .tempdir()
        .map_err(|e| staging_error(&e))?;
    let target = staging.path().join(plan.upload_name());

    if let Err(e) = tokio::fs::hard_link(plan.source(), &target).await {
        debug!("Hard link for upload staging failed ({e}), copying instead");
        tokio::fs::copy(plan.source(), &target)
            .await
            .map_err(|e| staging_error(&e))?;
    }

    debug!(staged = %target.display(), "Staged upload");
    Ok(staging)
}

fn staging_error(err: &io::Error) -> InvocationError {
    InvocationError::Io(format!("failed to stage upload: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32, stderr: &str) -> InvocationResult {
        InvocationResult {
            exit_code,
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_nonzero_exit_keeps_stderr() {
        let err = into_outcome(result(2, "unauthorized\n")).unwrap_err();
        assert_eq!(err.stderr(), Some("unauthorized"));
        assert!(matches!(
            err,
            BridgeError::Operation(OperationFailure { exit_code: 2, .. })
        ));
    }

    #[test]
    fn test_existing_directory_detection() {
        assert!(reports_existing(&result(1, "Error: entry Already Exists")));
        assert!(!reports_existing(&result(1, "directory doesn't exist")));
    }
}
