//! Supervised execution of the `rmapi` binary.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use rmbridge_core::{ClientConfig, InvocationError, InvocationResult, InvocationSpec};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::shutdown::terminate;
use crate::locator::BinaryLocator;

/// Time a timed-out process gets between SIGTERM and SIGKILL.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(2);

type ReaderTask = JoinHandle<io::Result<Vec<u8>>>;

/// Runs `rmapi` with a deadline and captures its output.
///
/// Every exit path either reaps the child or hands it to `kill_on_drop`;
/// pipes are owned by reader tasks that end with the process.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    locator: BinaryLocator,
    timeout: Duration,
    kill_grace: Duration,
}

impl ProcessInvoker {
    pub const fn new(locator: BinaryLocator, timeout: Duration) -> Self {
        Self {
            locator,
            timeout,
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(BinaryLocator::new(&config.binary_path), config.timeout)
    }

    #[must_use]
    pub const fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    /// Run one invocation to completion or until the deadline.
    ///
    /// A nonzero exit is a normal result here; interpreting it is up to the
    /// caller. A process killed by a signal reports `128 + signal`.
    pub async fn run(&self, spec: &InvocationSpec) -> Result<InvocationResult, InvocationError> {
        let binary = self.locator.check()?;

        if !spec.working_dir().is_dir() {
            return Err(InvocationError::SpawnFailed {
                reason: format!(
                    "working directory does not exist: {}",
                    spec.working_dir().display()
                ),
            });
        }

        let mut command = Command::new(&binary);
        command
            .args(spec.argv())
            .envs(spec.env_overrides())
            .current_dir(spec.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a timeout can take down anything rmapi spawned
        #[cfg(unix)]
        command.process_group(0);

        debug!(argv = ?spec.argv(), "Running {}", binary.display());
        let started = Instant::now();

        let mut child = command.spawn().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => InvocationError::BinaryNotFound {
                path: binary.clone(),
            },
            io::ErrorKind::PermissionDenied => InvocationError::NotExecutable {
                path: binary.clone(),
            },
            _ => InvocationError::SpawnFailed {
                reason: e.to_string(),
            },
        })?;
        // Kept for the group kill; `child.id()` is gone once the leader is reaped
        let group = child.id();

        let mut stdout_task = spawn_reader(child.stdout.take());
        let mut stderr_task = spawn_reader(child.stderr.take());

        let finished = tokio::time::timeout(self.timeout, async {
            let status = child.wait().await?;
            let stdout = collect(&mut stdout_task).await?;
            let stderr = collect(&mut stderr_task).await?;
            Ok::<_, io::Error>((status, stdout, stderr))
        })
        .await;

        match finished {
            Ok(Ok((status, stdout, stderr))) => {
                let exit_code = exit_code(status);
                debug!(exit_code, elapsed = ?started.elapsed(), "rmapi finished");
                Ok(InvocationResult {
                    exit_code,
                    stdout,
                    stderr,
                })
            }
            Ok(Err(e)) => {
                stdout_task.abort();
                stderr_task.abort();
                Err(InvocationError::Io(e.to_string()))
            }
            Err(_) => {
                stdout_task.abort();
                stderr_task.abort();
                warn!(timeout = ?self.timeout, argv = ?spec.argv(), "rmapi timed out, terminating");
                if let Err(e) = terminate(&mut child, group, self.kill_grace).await {
                    warn!("Failed to terminate timed-out rmapi: {e}");
                }
                Err(InvocationError::Timeout {
                    after: self.timeout,
                })
            }
        }
    }
}

fn spawn_reader<R>(pipe: Option<R>) -> ReaderTask
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

async fn collect(task: &mut ReaderTask) -> io::Result<Vec<u8>> {
    task.await.map_err(io::Error::other)?
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
