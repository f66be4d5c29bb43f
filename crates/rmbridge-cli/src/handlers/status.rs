//! Status command handler.

use std::fmt::Write as _;

use rmbridge_core::ClientConfig;
use rmbridge_runtime::InstallStatus;

/// Print what is installed locally. Never touches the network.
pub fn execute(config: &ClientConfig) {
    print!("{}", render(&InstallStatus::probe(config)));
}

fn render(status: &InstallStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "binary      = {}", status.binary_path.display());
    match &status.problem {
        None => {
            let _ = writeln!(out, "installed   = yes");
        }
        Some(problem) => {
            let _ = writeln!(out, "installed   = no");
            let _ = writeln!(out, "reason      = {}", problem.lines().next().unwrap_or(""));
        }
    }
    if let Some(record) = &status.record {
        let _ = writeln!(out, "release     = {}", record.descriptor.version);
        let _ = writeln!(out, "platform    = {}", record.descriptor.platform_tag);
        let _ = writeln!(out, "installed_at = {}", record.installed_at.to_rfc3339());
    }
    let _ = writeln!(
        out,
        "config      = {}{}",
        status.config_path.display(),
        if status.config_exists { "" } else { " (missing)" }
    );
    out
}
