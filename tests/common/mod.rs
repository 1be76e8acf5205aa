#![allow(dead_code)]

use machinery_helper::ownership::{ManagedDirs, ManagedFiles, Ownership};
use machinery_helper::reconcile::{DirEntryInfo, DirReader, EntryKind, IgnoreSet, TreeReconciler};
use machinery_helper::report::UnmanagedFiles;
use std::collections::BTreeMap;
use std::io;

/// In-memory directory tree for driving the walk without a filesystem
#[derive(Debug, Default, Clone)]
pub struct SyntheticTree {
    /// Directory path with trailing `/` -> children in listing order
    listings: BTreeMap<String, Vec<DirEntryInfo>>,
}

impl SyntheticTree {
    pub fn new() -> Self {
        let mut tree = Self::default();
        tree.listings.insert("/".to_string(), Vec::new());
        tree
    }

    /// Add an entry at an absolute path, creating parent directories
    pub fn add(&mut self, path: &str, kind: EntryKind) -> &mut Self {
        let trimmed = path.trim_end_matches('/');
        let (parent, name) = trimmed.rsplit_once('/').expect("absolute path");
        let parent_dir = format!("{parent}/");

        if !parent.is_empty() {
            self.add(parent, EntryKind::Directory);
        }

        let children = self.listings.entry(parent_dir).or_default();
        if !children.iter().any(|c| c.name == name) {
            children.push(DirEntryInfo::new(name, kind));
        }
        if kind == EntryKind::Directory {
            self.listings.entry(format!("{trimmed}/")).or_default();
        }
        self
    }

    pub fn dir(&mut self, path: &str) -> &mut Self {
        self.add(path, EntryKind::Directory)
    }

    pub fn file(&mut self, path: &str) -> &mut Self {
        self.add(path, EntryKind::File)
    }

    pub fn link(&mut self, path: &str) -> &mut Self {
        self.add(path, EntryKind::Symlink)
    }

    /// Same tree with every listing in reverse order
    pub fn reversed(&self) -> Self {
        let mut tree = self.clone();
        for children in tree.listings.values_mut() {
            children.reverse();
        }
        tree
    }

    /// Drop the listing of `dir` so reading it fails
    pub fn make_unreadable(&mut self, dir: &str) -> &mut Self {
        self.listings.remove(dir);
        self
    }
}

impl DirReader for SyntheticTree {
    fn list_dir(&self, dir: &str) -> io::Result<Vec<DirEntryInfo>> {
        self.listings
            .get(dir)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, dir.to_string()))
    }
}

pub fn files(entries: &[(&str, &str)]) -> ManagedFiles {
    entries
        .iter()
        .map(|(path, target)| ((*path).to_string(), (*target).to_string()))
        .collect()
}

pub fn dirs(entries: &[(&str, bool)]) -> ManagedDirs {
    entries
        .iter()
        .map(|(path, explicit)| ((*path).to_string(), *explicit))
        .collect()
}

/// Walk `tree` from `/` and return the accumulated entries
pub fn walk(tree: &SyntheticTree, ownership: &Ownership, ignore: &IgnoreSet) -> UnmanagedFiles {
    let mut unmanaged = UnmanagedFiles::new();
    TreeReconciler::new(ownership, ignore, tree).walk("/", &mut unmanaged);
    unmanaged
}
