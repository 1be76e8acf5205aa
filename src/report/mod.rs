//! Unmanaged-file accumulation and the JSON report envelope.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Classification of a reported path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmanagedKind {
    /// Regular file
    File,
    /// Directory reported as one unit; path ends in `/`
    Dir,
    /// Symbolic link
    Link,
    /// Root of a remote mount, never traversed; path ends in `/`
    RemoteDir,
}

impl UnmanagedKind {
    /// Name used in the report
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
            Self::Link => "link",
            Self::RemoteDir => "remote_dir",
        }
    }
}

/// Accumulator for unmanaged entries, keyed and ordered by path.
///
/// Keys compare byte-wise, so iteration order is independent of the order
/// in which the walk discovered the entries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnmanagedFiles {
    /// Path -> kind
    entries: BTreeMap<String, UnmanagedKind>,
}

impl UnmanagedFiles {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`; a second insert for the same path replaces the kind
    pub fn insert(&mut self, path: String, kind: UnmanagedKind) {
        self.entries.insert(path, kind);
    }

    /// Record the root of a remote mount as a single placeholder
    pub fn add_remote_mount(&mut self, mount: &str) {
        self.insert(format!("{mount}/"), UnmanagedKind::RemoteDir);
    }

    /// Kind recorded for `path`, if any
    #[must_use]
    pub fn get(&self, path: &str) -> Option<UnmanagedKind> {
        self.entries.get(path).copied()
    }

    /// Number of recorded entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in sorted path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, UnmanagedKind)> {
        self.entries.iter().map(|(path, kind)| (path.as_str(), *kind))
    }

    /// Finish accumulation and produce the sorted report
    #[must_use]
    pub fn into_report(self) -> Report {
        let files = self
            .entries
            .into_iter()
            .map(|(name, kind)| UnmanagedEntry { name, kind })
            .collect();

        Report {
            extracted: false,
            files,
        }
    }
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmanagedEntry {
    /// Absolute path; directories carry a trailing `/`
    pub name: String,
    /// Classification
    #[serde(rename = "type")]
    pub kind: UnmanagedKind,
}

/// Output envelope printed on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Always `false`: the helper only lists files, it never extracts them
    pub extracted: bool,
    /// Entries sorted by `name`
    pub files: Vec<UnmanagedEntry>,
}

impl Report {
    /// Render the report as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }
}
