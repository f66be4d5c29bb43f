//! Validation of local upload sources.

use std::fs::File;
use std::path::Path;

use crate::error::BuildError;

/// Check that `path` names a regular file this process can open for reading.
pub fn validate_local_file(path: &Path) -> Result<(), BuildError> {
    let metadata = match path.metadata() {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BuildError::LocalFileMissing(path.to_path_buf()));
        }
        Err(e) => {
            return Err(BuildError::LocalFileUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    if !metadata.is_file() {
        return Err(BuildError::NotAFile(path.to_path_buf()));
    }

    File::open(path)
        .map(drop)
        .map_err(|e| BuildError::LocalFileUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
