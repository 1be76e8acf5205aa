//! Mount table parsing.
//!
//! Remote mounts are never traversed; each shows up in the report as one
//! `remote_dir` placeholder. Special (pseudo/virtual) mounts are skipped
//! entirely. Both come from a `/proc/mounts`-style table:
//!
//! ```text
//! <device> <mount point> <fs type> <options> <dump> <pass>
//! ```

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Default location of the kernel mount table.
pub const PROC_MOUNTS_PATH: &str = "/proc/mounts";

/// Filesystem types backed by the network.
pub static DEFAULT_REMOTE_TYPES: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "autofs",
        "nfs",
        "nfs4",
        "cifs",
        "smbfs",
        "smb3",
        "sshfs",
        "fuse.sshfs",
        "ceph",
        "glusterfs",
        "afs",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
});

/// Pseudo and in-memory filesystem types.
pub static DEFAULT_SPECIAL_TYPES: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "proc",
        "sysfs",
        "devtmpfs",
        "tmpfs",
        "devpts",
        "debugfs",
        "securityfs",
        "cgroup",
        "cgroup2",
        "pstore",
        "bpf",
        "tracefs",
        "mqueue",
        "hugetlbfs",
        "configfs",
        "fusectl",
        "rpc_pipefs",
        "binfmt_misc",
        "efivarfs",
        "fuse.gvfsd-fuse",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
});

/// Mount point -> filesystem type, with the classification sets applied.
#[derive(Debug, Clone)]
pub struct MountTable {
    /// Mount point -> filesystem type; later entries win
    mounts: BTreeMap<String, String>,
    /// Types treated as remote
    remote_types: HashSet<String>,
    /// Types treated as special
    special_types: HashSet<String>,
}

impl MountTable {
    /// Parse mount table text using the default type classification
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::parse_with_types(text, &DEFAULT_REMOTE_TYPES, &DEFAULT_SPECIAL_TYPES)
    }

    /// Parse mount table text with explicit remote and special type lists
    #[must_use]
    pub fn parse_with_types(text: &str, remote_types: &[String], special_types: &[String]) -> Self {
        let mut mounts = BTreeMap::new();

        for line in text.lines() {
            let mut fields = line.split_whitespace();
            let (Some(_device), Some(mount_point), Some(fs_type)) =
                (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };

            mounts.insert(unescape(mount_point), fs_type.to_string());
        }

        Self {
            mounts,
            remote_types: remote_types.iter().cloned().collect(),
            special_types: special_types.iter().cloned().collect(),
        }
    }

    /// Read and parse a mount table file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read
    pub fn load(path: &Path, remote_types: &[String], special_types: &[String]) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mount table: {}", path.display()))?;

        let table = Self::parse_with_types(&text, remote_types, special_types);
        debug!(path = %path.display(), mounts = table.mounts.len(), "Mount table loaded");
        Ok(table)
    }

    /// All mount points with their filesystem type
    #[must_use]
    pub const fn mounts(&self) -> &BTreeMap<String, String> {
        &self.mounts
    }

    /// Mount points of network filesystems, sorted
    #[must_use]
    pub fn remote_mounts(&self) -> Vec<String> {
        self.select(|fs_type| self.remote_types.contains(fs_type))
    }

    /// Mount points of pseudo/virtual filesystems, sorted
    #[must_use]
    pub fn special_mounts(&self) -> Vec<String> {
        self.select(|fs_type| self.special_types.contains(fs_type))
    }

    /// Mount points that are neither remote nor special, sorted
    #[must_use]
    pub fn local_mounts(&self) -> Vec<String> {
        self.select(|fs_type| {
            !self.remote_types.contains(fs_type) && !self.special_types.contains(fs_type)
        })
    }

    /// Mount points whose type satisfies `predicate`, in sorted order
    fn select(&self, predicate: impl Fn(&str) -> bool) -> Vec<String> {
        self.mounts
            .iter()
            .filter(|(_, fs_type)| predicate(fs_type))
            .map(|(mount_point, _)| mount_point.clone())
            .collect()
    }
}

/// Decode the octal escapes the kernel uses for whitespace and backslashes
/// in mount points (`\040`, `\011`, `\012`, `\134`).
#[must_use]
pub fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\'
            && let Some(octal) = bytes.get(i + 1..i + 4)
            && octal.iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let value = octal
                .iter()
                .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_MOUNTS: &str = "\
devtmpfs /dev devtmpfs rw,relatime,size=1004132k,nr_inodes=251033,mode=755 0 0
nfs.example.com:/homes/tux /homes/tux nfs rw,relatime,vers=3 0 0
/dev/sda2 /data ext4 rw,relatime,data=ordered 0 0
/dev/sda1 / ext4 rw,relatime,data=ordered 0 0
proc /var/lib/ntp/proc proc rw,relatime 0 0
tmpfs /var/lib/tmpfs tmpfs rw,relatime 0 0
";

    #[test]
    fn test_parse_mounts() {
        let table = MountTable::parse(PROC_MOUNTS);

        let expected: BTreeMap<String, String> = [
            ("/dev", "devtmpfs"),
            ("/homes/tux", "nfs"),
            ("/data", "ext4"),
            ("/", "ext4"),
            ("/var/lib/ntp/proc", "proc"),
            ("/var/lib/tmpfs", "tmpfs"),
        ]
        .iter()
        .map(|(m, t)| ((*m).to_string(), (*t).to_string()))
        .collect();

        assert_eq!(table.mounts(), &expected);
    }

    #[test]
    fn test_special_mounts() {
        let table = MountTable::parse(PROC_MOUNTS);
        assert_eq!(
            table.special_mounts(),
            ["/dev", "/var/lib/ntp/proc", "/var/lib/tmpfs"]
        );
    }

    #[test]
    fn test_local_mounts() {
        let table = MountTable::parse(PROC_MOUNTS);
        assert_eq!(table.local_mounts(), ["/", "/data"]);
    }

    #[test]
    fn test_remote_mounts() {
        let table = MountTable::parse(PROC_MOUNTS);
        assert_eq!(table.remote_mounts(), ["/homes/tux"]);
    }

    #[test]
    fn test_custom_types() {
        let table = MountTable::parse_with_types(
            PROC_MOUNTS,
            &["ext4".to_string()],
            &["nfs".to_string()],
        );
        assert_eq!(table.remote_mounts(), ["/", "/data"]);
        assert_eq!(table.special_mounts(), ["/homes/tux"]);
    }

    #[test]
    fn test_short_lines_are_skipped() {
        let table = MountTable::parse("\nbroken-line\nonly two\n/dev/sdb1 /mnt xfs rw 0 0\n");
        assert_eq!(table.local_mounts(), ["/mnt"]);
    }

    #[test]
    fn test_escaped_mount_point() {
        let table = MountTable::parse("server:/share /mnt/my\\040share cifs rw 0 0\n");
        assert_eq!(table.remote_mounts(), ["/mnt/my share"]);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("/plain"), "/plain");
        assert_eq!(unescape("/a\\011b\\134c"), "/a\tb\\c");
        assert_eq!(unescape("/trailing\\"), "/trailing\\");
        assert_eq!(unescape("/not\\09octal"), "/not\\09octal");
    }

    #[test]
    fn test_load_missing_table_fails() {
        let err = MountTable::load(
            Path::new("/nonexistent/mounts/table"),
            &DEFAULT_REMOTE_TYPES,
            &DEFAULT_SPECIAL_TYPES,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read mount table"));
    }
}
