use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// Tracks which configuration fields the helper understands
pub struct ConfigValidator {
    /// Fully qualified `section.key` names that are recognized
    known_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = [
            "manifest.command",
            "manifest.empty_marker",
            "mounts.table",
            "mounts.remote_types",
            "mounts.special_types",
            "scan.root",
            "scan.extra_ignore",
        ]
        .into_iter()
        .collect();

        Self { known_fields }
    }

    /// Log a warning for every field in `config_path` that has no effect.
    ///
    /// Problems reading or parsing the file are left to the parser, which
    /// reports them as errors.
    pub fn warn_unknown_fields(&self, config_path: &Path) {
        let Ok(content) = std::fs::read_to_string(config_path) else {
            return;
        };
        let Ok(parsed) = toml::from_str::<toml::Table>(&content) else {
            return;
        };

        for field in self.unknown_fields(&parsed) {
            warn!(field = %field, path = %config_path.display(), "Unknown configuration field");
        }
    }

    /// Collect unknown `section.key` names from a parsed table
    #[must_use]
    pub fn unknown_fields(&self, table: &toml::Table) -> Vec<String> {
        let mut unknown = Vec::new();

        for (section, value) in table {
            let toml::Value::Table(fields) = value else {
                unknown.push(section.clone());
                continue;
            };

            for key in fields.keys() {
                let full_key = format!("{section}.{key}");
                if !self.known_fields.contains(full_key.as_str()) {
                    unknown.push(full_key);
                }
            }
        }

        unknown.sort();
        unknown
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
