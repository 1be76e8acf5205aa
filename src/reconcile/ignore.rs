use std::collections::HashSet;
use std::path::Path;

/// Absolute paths the walk must not report or enter.
///
/// Holds the helper's own executable and the roots of remote and special
/// mounts. Membership is by exact path string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    /// Ignored paths
    paths: HashSet<String>,
}

impl IgnoreSet {
    /// Create an empty ignore set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path
    pub fn insert(&mut self, path: impl Into<String>) {
        self.paths.insert(path.into());
    }

    /// Add a filesystem path; paths that are not valid UTF-8 can never
    /// match a walked path and are dropped
    pub fn insert_path(&mut self, path: &Path) {
        if let Some(path) = path.to_str() {
            self.insert(path);
        }
    }

    /// Returns true if `path` is ignored
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Number of ignored paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if nothing is ignored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for IgnoreSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for path in iter {
            self.insert(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exact_membership() {
        let ignore: IgnoreSet = ["/proc", "/dev"].into_iter().collect();

        assert!(ignore.contains("/proc"));
        assert!(!ignore.contains("/proc/1"));
        assert!(!ignore.contains("/pro"));
        assert_eq!(ignore.len(), 2);
    }

    #[test]
    fn test_insert_path() {
        let mut ignore = IgnoreSet::new();
        assert!(ignore.is_empty());

        ignore.insert_path(&PathBuf::from("/usr/local/bin/machinery-helper"));
        assert!(ignore.contains("/usr/local/bin/machinery-helper"));
    }
}
