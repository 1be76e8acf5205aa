//! Walk the live filesystem and classify entries against the ownership sets.
//!
//! Directory listings come from a [`DirReader`], so the walk can run
//! against synthetic trees in tests. The walk is single-threaded and
//! depth-first; results go into an [`UnmanagedFiles`] accumulator owned by
//! the caller.
//!
//! # Classification
//!
//! For every listed entry, in order:
//!
//! 1. paths that are not valid UTF-8 are logged and skipped
//! 2. paths in the [`IgnoreSet`] are skipped, including their subtree
//! 3. directories:
//!    - owned (explicitly or implied): descend
//!    - an owned directory is nested below: skip without reporting and
//!      **without descending**. Unmanaged files two or more levels below
//!      such a directory never show up in the report.
//!    - otherwise: report as `dir` with a trailing `/`, do not descend
//! 4. everything else:
//!    - owned: skip
//!    - sockets, pipes and device nodes: skip
//!    - symlinks: report as `link`
//!    - otherwise: report as `file`
//!
//! A directory that cannot be listed is treated as empty.

/// Ignore set of paths excluded from traversal.
pub mod ignore;

pub use ignore::IgnoreSet;

use crate::manifest::SEPARATOR;
use crate::ownership::Ownership;
use crate::report::{UnmanagedFiles, UnmanagedKind};
use std::ffi::OsString;
use std::fs::FileType;
use std::io;
use tracing::{debug, warn};

/// File type of a listed entry, as seen without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory
    Directory,
    /// Regular file
    File,
    /// Symbolic link, whatever it points to
    Symlink,
    /// Unix domain socket
    Socket,
    /// Named pipe
    Fifo,
    /// Block device node
    BlockDevice,
    /// Character device node
    CharDevice,
}

impl EntryKind {
    /// Map a `std::fs::FileType` obtained without following symlinks
    #[must_use]
    pub fn from_file_type(file_type: FileType) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;

            if file_type.is_socket() {
                return Self::Socket;
            }
            if file_type.is_fifo() {
                return Self::Fifo;
            }
            if file_type.is_block_device() {
                return Self::BlockDevice;
            }
            if file_type.is_char_device() {
                return Self::CharDevice;
            }
        }

        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else {
            Self::File
        }
    }

    /// Sockets, pipes and device nodes are never reported
    #[inline]
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(
            self,
            Self::Socket | Self::Fifo | Self::BlockDevice | Self::CharDevice
        )
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// File name within the listed directory, possibly not UTF-8
    pub name: OsString,
    /// Type of the entry
    pub kind: EntryKind,
}

impl DirEntryInfo {
    /// Create a listing entry
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Source of directory listings.
pub trait DirReader {
    /// List the direct children of `dir`. `dir` ends with `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read
    fn list_dir(&self, dir: &str) -> io::Result<Vec<DirEntryInfo>>;
}

/// Directory reader backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDirReader;

impl DirReader for FsDirReader {
    fn list_dir(&self, dir: &str) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            // Entries that vanish or fail mid-listing are dropped like an
            // unreadable directory
            let Ok(entry) = entry else {
                continue;
            };
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            entries.push(DirEntryInfo::new(
                entry.file_name(),
                EntryKind::from_file_type(file_type),
            ));
        }

        Ok(entries)
    }
}

/// Normalize a walk root so it ends in exactly one `/`.
#[must_use]
pub fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_end_matches(SEPARATOR);
    format!("{trimmed}{SEPARATOR}")
}

/// Recursive classifier for one inspection run.
pub struct TreeReconciler<'a, R: DirReader + ?Sized> {
    /// Ownership sets from the manifest
    ownership: &'a Ownership,
    /// Paths excluded from traversal
    ignore: &'a IgnoreSet,
    /// Listing capability
    reader: &'a R,
}

impl<'a, R: DirReader + ?Sized> TreeReconciler<'a, R> {
    /// Create a reconciler over fixed ownership sets and ignore set
    #[must_use]
    pub const fn new(ownership: &'a Ownership, ignore: &'a IgnoreSet, reader: &'a R) -> Self {
        Self {
            ownership,
            ignore,
            reader,
        }
    }

    /// Walk `dir` (which must end with `/`) and record unmanaged entries.
    pub fn walk(&self, dir: &str, unmanaged: &mut UnmanagedFiles) {
        let entries = match self.reader.list_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir, error = %e, "Cannot list directory, treating as empty");
                return;
            }
        };

        for entry in entries {
            let mut raw = Vec::with_capacity(dir.len() + entry.name.len());
            raw.extend_from_slice(dir.as_bytes());
            raw.extend_from_slice(entry.name.as_encoded_bytes());

            let Ok(path) = simdutf8::basic::from_utf8(&raw) else {
                warn!(
                    path = %String::from_utf8_lossy(&raw),
                    "Path contains invalid UTF-8 characters, skipping"
                );
                continue;
            };

            if self.ignore.contains(path) {
                debug!(path, "Ignored");
                continue;
            }

            if entry.kind == EntryKind::Directory {
                self.visit_dir(path, unmanaged);
            } else {
                self.visit_file(path, entry.kind, unmanaged);
            }
        }
    }

    /// Classify a directory entry
    fn visit_dir(&self, path: &str, unmanaged: &mut UnmanagedFiles) {
        if self.ownership.owns_dir(path) {
            self.walk(&format!("{path}{SEPARATOR}"), unmanaged);
        } else if self.ownership.has_managed_descendant(path) {
            debug!(path, "Unowned directory with owned descendants, not descending");
        } else {
            Self::record(unmanaged, format!("{path}{SEPARATOR}"), UnmanagedKind::Dir);
        }
    }

    /// Classify a non-directory entry
    fn visit_file(&self, path: &str, kind: EntryKind, unmanaged: &mut UnmanagedFiles) {
        if self.ownership.owns_file(path) || kind.is_special() {
            return;
        }

        let reported = if kind == EntryKind::Symlink {
            UnmanagedKind::Link
        } else {
            UnmanagedKind::File
        };
        Self::record(unmanaged, path.to_owned(), reported);
    }

    /// Store one classification result
    fn record(unmanaged: &mut UnmanagedFiles, path: String, kind: UnmanagedKind) {
        debug!(path = %path, kind = kind.as_str(), "Unmanaged");
        unmanaged.insert(path, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ownership::{ManagedDirs, ManagedFiles};
    use std::collections::HashMap;

    /// In-memory tree: directory path (with trailing `/`) -> children
    struct MapReader(HashMap<String, Vec<DirEntryInfo>>);

    impl DirReader for MapReader {
        fn list_dir(&self, dir: &str) -> io::Result<Vec<DirEntryInfo>> {
            self.0
                .get(dir)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, dir.to_string()))
        }
    }

    fn reader(listing: &[(&str, &[(&str, EntryKind)])]) -> MapReader {
        MapReader(
            listing
                .iter()
                .map(|(dir, children)| {
                    let children = children
                        .iter()
                        .map(|(name, kind)| DirEntryInfo::new(*name, *kind))
                        .collect();
                    ((*dir).to_string(), children)
                })
                .collect(),
        )
    }

    fn ownership(files: &[(&str, &str)], dirs: &[(&str, bool)]) -> Ownership {
        let files: ManagedFiles = files
            .iter()
            .map(|(p, t)| ((*p).to_string(), (*t).to_string()))
            .collect();
        let dirs: ManagedDirs = dirs.iter().map(|(p, e)| ((*p).to_string(), *e)).collect();
        Ownership::from_parts(files, dirs)
    }

    fn walk(reader: &MapReader, ownership: &Ownership, ignore: &IgnoreSet) -> UnmanagedFiles {
        let mut unmanaged = UnmanagedFiles::new();
        TreeReconciler::new(ownership, ignore, reader).walk("/", &mut unmanaged);
        unmanaged
    }

    #[test]
    fn test_unmanaged_dir_between_managed_dirs_is_suppressed() {
        let reader = reader(&[
            ("/", &[("managed_dir", EntryKind::Directory)]),
            ("/managed_dir/", &[("unmanaged_dir", EntryKind::Directory)]),
            (
                "/managed_dir/unmanaged_dir/",
                &[("managed_dir", EntryKind::Directory)],
            ),
        ]);
        let ownership = ownership(
            &[],
            &[
                ("/managed_dir", true),
                ("/managed_dir/unmanaged_dir/managed_dir", true),
            ],
        );

        let unmanaged = walk(&reader, &ownership, &IgnoreSet::new());
        assert!(unmanaged.is_empty());
    }

    #[test]
    fn test_classifies_files_links_and_specials() {
        let reader = reader(&[
            (
                "/",
                &[
                    ("etc", EntryKind::Directory),
                    ("opt", EntryKind::Directory),
                    ("run.sock", EntryKind::Socket),
                    ("fifo", EntryKind::Fifo),
                    ("sda", EntryKind::BlockDevice),
                    ("null", EntryKind::CharDevice),
                ],
            ),
            (
                "/etc/",
                &[
                    ("passwd", EntryKind::File),
                    ("local.conf", EntryKind::File),
                    ("alternatives", EntryKind::Symlink),
                ],
            ),
        ]);
        let ownership = ownership(&[("/etc/passwd", "")], &[]);

        let unmanaged = walk(&reader, &ownership, &IgnoreSet::new());

        let entries: Vec<(&str, UnmanagedKind)> = unmanaged.iter().collect();
        assert_eq!(
            entries,
            [
                ("/etc/alternatives", UnmanagedKind::Link),
                ("/etc/local.conf", UnmanagedKind::File),
                ("/opt/", UnmanagedKind::Dir),
            ]
        );
    }

    #[test]
    fn test_owned_symlink_is_not_reported() {
        let reader = reader(&[
            ("/", &[("usr", EntryKind::Directory)]),
            ("/usr/", &[("lib", EntryKind::Symlink)]),
        ]);
        let ownership = ownership(&[("/usr/lib", "lib64"), ("/usr/bin/ls", "")], &[("/usr", false)]);

        let unmanaged = walk(&reader, &ownership, &IgnoreSet::new());
        assert!(unmanaged.is_empty());
    }

    #[test]
    fn test_ignored_paths_are_neither_reported_nor_entered() {
        let reader = reader(&[
            (
                "/",
                &[
                    ("proc", EntryKind::Directory),
                    ("helper", EntryKind::File),
                    ("srv", EntryKind::Directory),
                ],
            ),
            ("/srv/", &[("data", EntryKind::File)]),
        ]);
        let ownership = ownership(&[], &[("/srv", true)]);
        let ignore: IgnoreSet = ["/proc", "/helper"].into_iter().collect();

        let unmanaged = walk(&reader, &ownership, &ignore);

        let entries: Vec<&str> = unmanaged.iter().map(|(path, _)| path).collect();
        assert_eq!(entries, ["/srv/data"]);
    }

    #[test]
    fn test_unreadable_directory_is_empty() {
        // "/var/" has no listing in the reader and errors out
        let reader = reader(&[("/", &[("var", EntryKind::Directory)])]);
        let ownership = ownership(&[], &[("/var", true)]);

        let unmanaged = walk(&reader, &ownership, &IgnoreSet::new());
        assert!(unmanaged.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_utf8_name_is_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let mut listing = HashMap::new();
        listing.insert(
            "/".to_string(),
            vec![
                DirEntryInfo::new(OsString::from_vec(vec![b'b', 0xff, b'd']), EntryKind::File),
                DirEntryInfo::new("good", EntryKind::File),
            ],
        );
        let reader = MapReader(listing);
        let ownership = ownership(&[], &[]);

        let unmanaged = walk(&reader, &ownership, &IgnoreSet::new());

        assert_eq!(unmanaged.len(), 1);
        assert_eq!(unmanaged.get("/good"), Some(UnmanagedKind::File));
    }

    #[test]
    fn test_normalize_root() {
        assert_eq!(normalize_root("/"), "/");
        assert_eq!(normalize_root(""), "/");
        assert_eq!(normalize_root("/mnt/sysroot"), "/mnt/sysroot/");
        assert_eq!(normalize_root("/mnt/sysroot//"), "/mnt/sysroot/");
    }

    #[cfg(unix)]
    #[test]
    fn test_fs_reader_does_not_follow_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::fs::write(dir.path().join("file"), "x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let root = normalize_root(&dir.path().to_string_lossy());
        let mut entries = FsDirReader.list_dir(&root).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let kinds: Vec<EntryKind> = entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [EntryKind::File, EntryKind::Symlink, EntryKind::Directory]
        );
    }
}
