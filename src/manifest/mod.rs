//! Package manifest parsing.
//!
//! The package manager lists every path it owns as one line in `ls -l`
//! style, e.g.
//!
//! ```text
//! -rw-r--r--    1 root    root    18234080 Mar 31 11:40 /usr/lib64/libruby2.0-static.a
//! lrwxrwxrwx    1 root    root          19 Mar 31 11:45 /usr/lib64/libruby2.0.so -> libruby2.0.so.2.0.0
//! ```
//!
//! Only the leading type indicator, the path and the optional link target
//! are of interest. The format is a trusted contract: a line without a
//! path is reported as an error and aborts the inspection.

/// Running the package manager to obtain the raw manifest text.
pub mod source;

pub use source::{CommandManifestSource, ManifestSource};

use anyhow::{Result, bail};

/// Separator between a symlink path and its target in the manifest.
pub const LINK_ARROW: &str = " -> ";

/// Path separator used in manifest paths.
pub const SEPARATOR: char = '/';

/// Kind of entry, taken from the first character of a manifest line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// `-` regular file
    File,
    /// `d` directory
    Directory,
    /// `l` symbolic link
    Symlink,
    /// Any other indicator (block/char devices, sockets, ...); ignored
    Other(char),
}

impl EntryType {
    /// Map a manifest type indicator to an entry type
    #[must_use]
    pub const fn from_indicator(indicator: char) -> Self {
        match indicator {
            '-' => Self::File,
            'd' => Self::Directory,
            'l' => Self::Symlink,
            other => Self::Other(other),
        }
    }
}

/// One parsed manifest line, borrowing from the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestLine<'a> {
    /// Leading type indicator
    pub entry_type: EntryType,
    /// Absolute path owned by the package
    pub path: &'a str,
    /// Symlink target as recorded by the manifest; empty if not a link
    pub link_target: &'a str,
}

/// Parse a single manifest line into its type, path and link target.
///
/// The path starts at the first `/` of the line and runs to the end of the
/// line, so file names containing spaces stay intact. When the remainder
/// contains exactly one `" -> "`, it is split into path and link target.
///
/// # Errors
///
/// Returns an error if the line contains no `/`, which means the upstream
/// format is not what we expect.
pub fn parse_line(line: &str) -> Result<ManifestLine<'_>> {
    let Some(start) = line.find(SEPARATOR) else {
        bail!("Malformed manifest line, no path found: {line:?}");
    };

    // A line with a path always has at least one character before or at it
    let indicator = line.chars().next().unwrap_or(SEPARATOR);
    let rest = &line[start..];

    let (path, link_target) = match rest.split_once(LINK_ARROW) {
        Some((path, target)) if !target.contains(LINK_ARROW) => (path, target),
        _ => (rest, ""),
    };

    Ok(ManifestLine {
        entry_type: EntryType::from_indicator(indicator),
        path,
        link_target,
    })
}
