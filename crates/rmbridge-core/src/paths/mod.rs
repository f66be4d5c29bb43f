//! Path utilities for rmbridge data directories and user-configurable locations.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - Environment access goes through a lookup closure so callers and tests
//!   can resolve paths without mutating the process environment

mod binary;
mod error;
mod platform;

pub use binary::{binary_file_name, default_binary_path_with, install_record_path};
pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root, data_root_with, expand_home};
