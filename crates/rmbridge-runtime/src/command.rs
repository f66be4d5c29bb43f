//! Argument construction for `rmapi`.
//!
//! Maps intents to the exact argv the tool expects. The builder holds only
//! the per-client environment overlay and working directory; the one
//! filesystem access it performs is the fail-fast check on upload sources.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rmbridge_core::{BuildError, ClientConfig, InvocationSpec, RemotePath, validate_local_file};

/// Builds [`InvocationSpec`]s for one client configuration.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    env: BTreeMap<String, String>,
    working_dir: PathBuf,
}

/// A validated upload, resolved down to the file name `rmapi` will see.
///
/// `rmapi put` names the document after the uploaded file's stem, so a
/// custom remote name means uploading a copy that carries that name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    source: PathBuf,
    upload_name: String,
    remote_directory: RemotePath,
}

impl UploadPlan {
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// File name, extension included, that the tool uploads.
    pub fn upload_name(&self) -> &str {
        &self.upload_name
    }

    /// Whether the source must be staged under [`Self::upload_name`] first.
    pub fn needs_staging(&self) -> bool {
        self.source
            .file_name()
            .is_none_or(|name| name.to_string_lossy() != self.upload_name)
    }
}

impl CommandBuilder {
    pub const fn new(env: BTreeMap<String, String>, working_dir: PathBuf) -> Self {
        Self { env, working_dir }
    }

    /// Builder for `config`, running in the current directory so relative
    /// config paths resolve the way the caller sees them.
    pub fn from_config(config: &ClientConfig) -> Self {
        let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(config.env_overrides(), working_dir)
    }

    /// `mkdir -p <path>`: creates missing ancestors, succeeds if present.
    pub fn build_ensure_directory(&self, path: &RemotePath) -> InvocationSpec {
        self.spec(["mkdir", "-p", path.as_str()])
    }

    /// Validate an upload and decide the name it is uploaded under.
    pub fn plan_upload(
        &self,
        local_path: &Path,
        remote_directory: &RemotePath,
        remote_name: Option<&str>,
    ) -> Result<UploadPlan, BuildError> {
        validate_local_file(local_path)?;

        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| BuildError::NotAFile(local_path.to_path_buf()))?;

        let upload_name = match remote_name {
            None => file_name,
            Some(name) => {
                if name.trim().is_empty() || name.contains('/') {
                    return Err(BuildError::InvalidRemoteName(name.to_string()));
                }
                let extension = local_path.extension().map(|e| e.to_string_lossy());
                upload_file_name(name, extension.as_deref())
            }
        };

        Ok(UploadPlan {
            source: local_path.to_path_buf(),
            upload_name,
            remote_directory: remote_directory.clone(),
        })
    }

    /// `put <file> <remote_directory>`.
    ///
    /// `staged_dir` must hold a copy named [`UploadPlan::upload_name`] when
    /// the plan needs staging; otherwise the source is uploaded directly.
    pub fn build_upload(&self, plan: &UploadPlan, staged_dir: Option<&Path>) -> InvocationSpec {
        let file = match staged_dir {
            Some(dir) if plan.needs_staging() => dir.join(&plan.upload_name),
            _ => plan.source.clone(),
        };
        let file = file.to_string_lossy();
        self.spec(["put", file.as_ref(), plan.remote_directory.as_str()])
    }

    /// `ls <path>`.
    pub fn build_list(&self, path: &RemotePath) -> InvocationSpec {
        self.spec(["ls", path.as_str()])
    }

    /// `mv <from> <to>`.
    pub fn build_move(&self, from: &RemotePath, to: &RemotePath) -> InvocationSpec {
        self.spec(["mv", from.as_str(), to.as_str()])
    }

    fn spec<const N: usize>(&self, argv: [&str; N]) -> InvocationSpec {
        InvocationSpec::new(
            argv.iter().map(ToString::to_string).collect(),
            self.env.clone(),
            self.working_dir.clone(),
        )
    }
}

/// `name` plus the source extension, unless `name` already ends with it.
fn upload_file_name(name: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) if !ext.is_empty() => {
            let suffix = format!(".{}", ext.to_ascii_lowercase());
            if name.to_ascii_lowercase().ends_with(&suffix) {
                name.to_string()
            } else {
                format!("{name}.{ext}")
            }
        }
        _ => name.to_string(),
    }
}
