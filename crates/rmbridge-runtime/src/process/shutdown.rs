//! Termination of a timed-out `rmapi` process tree.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
#[cfg(unix)]
use tokio::time::timeout;

/// Terminate `child` and its process group, then reap it.
///
/// # Strategy
/// 1. SIGTERM to the whole group, wait up to `grace`
/// 2. SIGKILL to the group, so stragglers the tool spawned go too
/// 3. Wait for the child so no zombie is left behind
///
/// `group` is the pid recorded right after spawning a group leader
/// (`process_group(0)`). It is needed because `child.id()` is gone once the
/// leader has been reaped, while processes it started may still hold the
/// group. Without a group the child alone is killed.
pub async fn terminate(
    child: &mut Child,
    group: Option<u32>,
    grace: Duration,
) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        match group {
            Some(pid) => terminate_group(child, pid, grace).await,
            None => {
                child.kill().await?;
                child.wait().await
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = (group, grace);
        child.kill().await?;
        child.wait().await
    }
}

#[cfg(unix)]
async fn terminate_group(child: &mut Child, pid: u32, grace: Duration) -> io::Result<ExitStatus> {
    let pgid = Pid::from_raw(i32::try_from(pid).map_err(io::Error::other)?);

    match signal::killpg(pgid, Signal::SIGTERM) {
        Ok(()) => {}
        Err(nix::errno::Errno::ESRCH) => return child.wait().await,
        Err(e) => return Err(io::Error::other(e)),
    }

    let status = match timeout(grace, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            kill_group(pgid)?;
            child.wait().await?
        }
    };

    // The leader may be gone while others in its group linger
    kill_group(pgid)?;
    Ok(status)
}

#[cfg(unix)]
fn kill_group(pgid: Pid) -> io::Result<()> {
    match signal::killpg(pgid, Signal::SIGKILL) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}
