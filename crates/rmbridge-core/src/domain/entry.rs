//! Remote listing entries.

use serde::{Deserialize, Serialize};

/// Kind of entry in a remote listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    Document,
}

/// One line of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub kind: EntryKind,
    pub name: String,
}

impl RemoteEntry {
    /// Parse a single `[d] name` / `[f] name` line.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (tag, name) = line.trim_start().split_once(' ')?;
        let kind = match tag {
            "[d]" => EntryKind::Directory,
            "[f]" => EntryKind::Document,
            _ => return None,
        };
        let name = name.trim_start();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            name: name.to_string(),
        })
    }

    pub const fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }
}

/// Parse tool listing output, skipping anything that is not an entry line.
pub fn parse_listing(output: &str) -> Vec<RemoteEntry> {
    output.lines().filter_map(RemoteEntry::parse_line).collect()
}
