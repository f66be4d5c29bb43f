//! Platform-specific path resolution.
//!
//! Resolves the data root that holds the managed `rmapi` binary and expands
//! user-supplied paths. No directories are created here; the provisioner
//! owns that side effect.

use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "RMBRIDGE_DATA_DIR";

/// Get the root directory for rmbridge data (installed binary, install record).
///
/// Resolution order:
/// 1. `RMBRIDGE_DATA_DIR` as provided by `lookup` (highest priority)
/// 2. System data directory (e.g., `~/.local/share/rmbridge`)
pub fn data_root_with(lookup: impl Fn(&str) -> Option<String>) -> Result<PathBuf, PathError> {
    if let Some(raw) = lookup(DATA_DIR_ENV) {
        return expand_home(&raw);
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(data_dir.join("rmbridge"))
}

/// Get the data root from the process environment.
pub fn data_root() -> Result<PathBuf, PathError> {
    data_root_with(|key| std::env::var(key).ok())
}

/// Expand a leading `~` in a user-provided path.
///
/// Relative paths stay relative: the external tool resolves them against its
/// working directory exactly as the caller wrote them.
pub fn expand_home(raw: &str) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::EmptyPath);
    }

    if trimmed == "~" {
        return dirs::home_dir().ok_or(PathError::NoHomeDir);
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
        return Ok(home.join(rest));
    }

    Ok(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_keeps_relative_paths() {
        assert_eq!(expand_home("./.rmapi").unwrap(), PathBuf::from("./.rmapi"));
    }

    #[test]
    fn test_expand_home_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.rmapi").unwrap(), home.join(".rmapi"));
            assert_eq!(expand_home("~").unwrap(), home);
        }
    }

    #[test]
    fn test_expand_home_rejects_empty() {
        assert!(matches!(expand_home("   "), Err(PathError::EmptyPath)));
    }

    #[test]
    fn test_data_root_override() {
        let root = data_root_with(|key| (key == DATA_DIR_ENV).then(|| "/opt/rm".to_string()));
        assert_eq!(root.unwrap(), PathBuf::from("/opt/rm"));
    }
}
