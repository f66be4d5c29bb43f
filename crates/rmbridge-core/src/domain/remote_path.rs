//! Locations in the remote document tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Root under which every managed path lives.
pub const PAPERS_ROOT: &str = "/papers";

/// A `/`-separated location in the remote document tree.
///
/// Always absolute and normalized: no empty, `.` or `..` segments and no
/// trailing slash except for the root itself. Nothing about the remote
/// entry is cached; existence is only ever learnt through an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    /// Parse and normalize a remote path.
    pub fn parse(raw: &str) -> Result<Self, BuildError> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('/') {
            return Err(BuildError::invalid_remote(raw, "remote paths must be absolute"));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(BuildError::invalid_remote(
                    raw,
                    "relative segments are not allowed",
                ));
            }
            segments.push(segment);
        }

        Ok(Self(format!("/{}", segments.join("/"))))
    }

    /// Parse a path that must lie under [`PAPERS_ROOT`].
    pub fn managed(raw: &str) -> Result<Self, BuildError> {
        let path = Self::parse(raw)?;
        if path.is_managed() {
            Ok(path)
        } else {
            Err(BuildError::OutsideManagedRoot(path.0))
        }
    }

    /// `/papers/<classification>`.
    pub fn papers(classification: &str) -> Result<Self, BuildError> {
        let classification = classification.trim().trim_matches('/');
        if classification.is_empty() {
            return Err(BuildError::invalid_remote(
                classification,
                "classification cannot be empty",
            ));
        }
        Self::managed(&format!("{PAPERS_ROOT}/{classification}"))
    }

    /// Whether this path is the papers root or below it.
    pub fn is_managed(&self) -> bool {
        self.0 == PAPERS_ROOT || self.0.starts_with(&format!("{PAPERS_ROOT}/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RemotePath {
    type Error = BuildError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}
