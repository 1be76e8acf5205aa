pub mod parser;
pub mod validator;

use crate::manifest::source::DEFAULT_MANIFEST_COMMAND;
use crate::mounts::{DEFAULT_REMOTE_TYPES, DEFAULT_SPECIAL_TYPES, PROC_MOUNTS_PATH};
use crate::ownership::NO_FILES_MARKER;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV_VAR: &str = "MACHINERY_HELPER_CONFIG";

/// System-wide configuration file, read when present.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/machinery-helper.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub mounts: MountsConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

/// How to obtain the package manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestConfig {
    /// Command line printing the manifest, split with shell-word rules
    #[serde(default = "default_manifest_command")]
    pub command: String,
    /// Line emitted for packages without files
    #[serde(default = "default_empty_marker")]
    pub empty_marker: String,
}

/// Where to read mounts from and how to classify them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MountsConfig {
    #[serde(default = "default_mount_table")]
    pub table: PathBuf,
    #[serde(default = "default_remote_types")]
    pub remote_types: Vec<String>,
    #[serde(default = "default_special_types")]
    pub special_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    /// Directory the walk starts from. Only the walk moves: manifest paths
    /// are not rebased, so they must already carry this prefix.
    #[serde(default = "default_root")]
    pub root: String,
    /// Additional absolute paths to skip
    #[serde(default)]
    pub extra_ignore: Vec<String>,
}

fn default_manifest_command() -> String {
    DEFAULT_MANIFEST_COMMAND.to_string()
}

fn default_empty_marker() -> String {
    NO_FILES_MARKER.to_string()
}

fn default_mount_table() -> PathBuf {
    PathBuf::from(PROC_MOUNTS_PATH)
}

fn default_remote_types() -> Vec<String> {
    DEFAULT_REMOTE_TYPES.clone()
}

fn default_special_types() -> Vec<String> {
    DEFAULT_SPECIAL_TYPES.clone()
}

fn default_root() -> String {
    "/".to_string()
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            command: default_manifest_command(),
            empty_marker: default_empty_marker(),
        }
    }
}

impl Default for MountsConfig {
    fn default() -> Self {
        Self {
            table: default_mount_table(),
            remote_types: default_remote_types(),
            special_types: default_special_types(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extra_ignore: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist. The helper never writes configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        validator::ConfigValidator::new().warn_unknown_fields(path);
        parser::parse_config_file(path)
    }

    /// Resolve which configuration file applies.
    ///
    /// Precedence: explicit path, then `MACHINERY_HELPER_CONFIG`, then the
    /// system file if it exists.
    #[must_use]
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }

        let system = PathBuf::from(SYSTEM_CONFIG_PATH);
        system.exists().then_some(system)
    }
}
