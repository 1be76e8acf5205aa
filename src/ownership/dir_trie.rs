use std::collections::HashMap;

/// Prefix tree over `/`-separated path segments.
///
/// Answers "is any managed directory nested below this path?" in
/// O(depth) instead of scanning every managed directory. Segments are
/// split verbatim, empty ones included, so the answer matches a plain
/// `starts_with(path + "/")` test on the original strings.
#[derive(Debug, Default)]
pub struct DirTrie {
    /// Child nodes keyed by path segment
    children: HashMap<String, Self>,
}

impl DirTrie {
    /// Create a new empty trie
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directory path, creating a node per segment
    pub fn insert(&mut self, path: &str) {
        let mut current = self;

        for segment in path.split('/') {
            current = current.children.entry(segment.to_owned()).or_default();
        }
    }

    /// Returns true if some inserted path continues past `path` at a
    /// segment boundary, i.e. starts with `path + "/"`
    #[must_use]
    pub fn has_descendant(&self, path: &str) -> bool {
        let mut current = self;

        for segment in path.split('/') {
            match current.children.get(segment) {
                Some(child) => current = child,
                None => return false,
            }
        }

        !current.children.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for DirTrie {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut trie = Self::new();
        for path in iter {
            trie.insert(path);
        }
        trie
    }
}
