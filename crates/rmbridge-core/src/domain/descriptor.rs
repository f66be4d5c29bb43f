//! Release metadata for the managed binary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A concrete release artifact chosen for this platform.
///
/// Lives only for the duration of an install; the installed executable is
/// the durable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryDescriptor {
    pub version: String,
    pub platform_tag: String,
    pub download_url: String,
    pub install_path: PathBuf,
}
