//! Managed `rmapi` binary path resolution.

use std::path::{Path, PathBuf};

use super::error::PathError;
use super::platform::data_root_with;

/// File name of the external executable on this platform.
pub const fn binary_file_name() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "rmapi.exe"
    }

    #[cfg(not(target_os = "windows"))]
    {
        "rmapi"
    }
}

/// Default install location: `<data root>/bin/rmapi`.
pub fn default_binary_path_with(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf, PathError> {
    Ok(data_root_with(lookup)?.join("bin").join(binary_file_name()))
}

/// Path of the install record written next to the binary.
pub fn install_record_path(binary_path: &Path) -> PathBuf {
    binary_path.with_file_name("install.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binary_path_under_data_root() {
        let path = default_binary_path_with(|_| Some("/data".to_string())).unwrap();
        assert_eq!(path, Path::new("/data").join("bin").join(binary_file_name()));
    }

    #[test]
    fn test_install_record_is_sibling() {
        let record = install_record_path(Path::new("/data/bin/rmapi"));
        assert_eq!(record, PathBuf::from("/data/bin/install.json"));
    }
}
