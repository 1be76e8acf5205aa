//! Ownership sets built from the package manifest.
//!
//! The manifest yields two maps:
//!
//! - **files**: path -> link target. An empty target means a regular file,
//!   anything else is a symlink and holds the target exactly as recorded.
//! - **dirs**: path -> explicit flag. `true` when the manifest lists the
//!   directory itself, `false` when it was inferred because it is an
//!   ancestor of an owned file (or because of the symlink rule below).
//!
//! After parsing, [`add_implicit_dirs`] closes the directory map over file
//! ancestors. The sets are read-only from then on.
//!
//! # Symlinks onto owned directories
//!
//! A symlink whose target is itself a known directory is recorded in the
//! directory map as well (implicitly). Existing reports depend on this, so
//! it stays even though the link itself is also an owned file.

/// Segment trie used for descendant lookups during the walk.
pub mod dir_trie;

pub use dir_trie::DirTrie;

use crate::manifest::{self, EntryType, SEPARATOR};
use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info};

/// Manifest line printed for packages that own nothing.
pub const NO_FILES_MARKER: &str = "(contains no files)";

/// Owned file path -> link target (empty for regular files).
pub type ManagedFiles = HashMap<String, String>;

/// Owned directory path -> `true` if listed explicitly by the manifest.
pub type ManagedDirs = HashMap<String, bool>;

/// File and directory ownership derived from one manifest snapshot.
#[derive(Debug)]
pub struct Ownership {
    /// Owned files and symlinks
    files: ManagedFiles,
    /// Owned directories, explicit and implied
    dirs: ManagedDirs,
    /// Segment index over `dirs` keys
    trie: DirTrie,
}

impl Ownership {
    /// Build ownership sets from manifest lines and close them over
    /// implicit ancestor directories.
    ///
    /// Empty lines and the `empty_marker` line are skipped. Lines with an
    /// entry type other than file, directory or symlink are parsed but not
    /// recorded.
    ///
    /// # Errors
    ///
    /// Returns an error on the first line without a path.
    pub fn build<'a, I>(lines: I, empty_marker: &str) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut files = ManagedFiles::new();
        let mut dirs = ManagedDirs::new();

        for line in lines {
            if line.is_empty() || line == empty_marker {
                continue;
            }

            let parsed = manifest::parse_line(line)?;
            match parsed.entry_type {
                EntryType::File => {
                    files.insert(parsed.path.to_owned(), String::new());
                }
                EntryType::Directory => {
                    dirs.insert(parsed.path.to_owned(), true);
                }
                EntryType::Symlink => {
                    files.insert(parsed.path.to_owned(), parsed.link_target.to_owned());
                }
                EntryType::Other(indicator) => {
                    debug!(%indicator, path = parsed.path, "Ignoring manifest entry type");
                }
            }
        }

        let explicit = dirs.len();
        add_implicit_dirs(&mut dirs, &files);

        info!(
            files = files.len(),
            explicit_dirs = explicit,
            implicit_dirs = dirs.len() - explicit,
            "Ownership sets built"
        );

        Ok(Self::from_parts(files, dirs))
    }

    /// Build ownership sets from the raw manifest text
    ///
    /// # Errors
    ///
    /// Returns an error on the first line without a path.
    pub fn from_manifest(text: &str, empty_marker: &str) -> Result<Self> {
        Self::build(text.split('\n'), empty_marker)
    }

    /// Wrap already-computed maps without running the implicit closure
    #[must_use]
    pub fn from_parts(files: ManagedFiles, dirs: ManagedDirs) -> Self {
        let trie = dirs.keys().map(String::as_str).collect();
        Self { files, dirs, trie }
    }

    /// Owned files and symlinks
    #[must_use]
    pub const fn files(&self) -> &ManagedFiles {
        &self.files
    }

    /// Owned directories
    #[must_use]
    pub const fn dirs(&self) -> &ManagedDirs {
        &self.dirs
    }

    /// Returns true if `path` is an owned file or symlink
    #[inline]
    #[must_use]
    pub fn owns_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Returns true if `path` is an owned directory, explicit or implied
    #[inline]
    #[must_use]
    pub fn owns_dir(&self, path: &str) -> bool {
        self.dirs.contains_key(path)
    }

    /// Returns true if an owned directory is nested below `path`
    #[inline]
    #[must_use]
    pub fn has_managed_descendant(&self, path: &str) -> bool {
        self.trie.has_descendant(path)
    }
}

/// Add every proper ancestor of an owned file to `dirs` as implicit.
///
/// Existing entries are never overwritten, so an explicit directory stays
/// explicit. Symlinks whose target is a directory key are then added as
/// implicit directories too. That check runs against the map as it stands
/// after the ancestor pass, which keeps the result independent of map
/// iteration order.
pub fn add_implicit_dirs(dirs: &mut ManagedDirs, files: &ManagedFiles) {
    for file in files.keys() {
        for (idx, _) in file.match_indices(SEPARATOR) {
            if idx == 0 {
                continue;
            }
            dirs.entry(file[..idx].to_owned()).or_insert(false);
        }
    }

    let linked_dirs: Vec<&String> = files
        .iter()
        .filter(|(_, target)| !target.is_empty() && dirs.contains_key(target.as_str()))
        .map(|(file, _)| file)
        .collect();

    for file in linked_dirs {
        dirs.entry(file.clone()).or_insert(false);
    }
}

/// Returns true if any key of `dirs` starts with `path` followed by `/`.
///
/// Linear scan; [`Ownership::has_managed_descendant`] answers the same
/// question through the segment trie.
#[must_use]
pub fn has_managed_descendant<S: ::std::hash::BuildHasher>(
    path: &str,
    dirs: &HashMap<String, bool, S>,
) -> bool {
    let prefix = format!("{path}{SEPARATOR}");
    dirs.keys().any(|dir| dir.starts_with(&prefix))
}
