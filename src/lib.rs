#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Counters and offsets bounded by input length
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # machinery-helper - Unmanaged File Inspection
//!
//! Reconciles a live filesystem tree against the package manager's list of
//! owned paths and reports everything the package manager does not know
//! about. The report is consumed by system snapshot and migration tooling
//! to capture local modifications that must be preserved separately.
//!
//! ## Architecture
//!
//! - [`manifest`]: Parsing manifest lines and running the package manager
//! - [`ownership`]: File and directory ownership sets, implicit directories
//! - [`mounts`]: Mount table parsing (remote and special mounts)
//! - [`reconcile`]: Recursive tree walk and classification
//! - [`report`]: Sorted accumulation and the JSON envelope
//! - [`commands`]: Entry points used by the binary
//! - [`config`]: Configuration parsing and validation
//!
//! ## Example Usage
//!
//! ```no_run
//! use machinery_helper::HelperContext;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = HelperContext::new(None)?;
//! let report = machinery_helper::commands::inspect::run(&ctx)?;
//! println!("{}", report.to_json()?);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations invoked by the binary.
pub mod commands;

/// Configuration parsing, validation, and defaults.
#[allow(missing_docs)]
pub mod config;

/// Package manifest parsing and retrieval.
pub mod manifest;

/// Mount table parsing and classification.
pub mod mounts;

/// Ownership sets and implicit directory closure.
pub mod ownership;

/// Filesystem walk and entry classification.
pub mod reconcile;

/// Unmanaged entry accumulation and report rendering.
pub mod report;

use anyhow::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Current version of the helper binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Central context for one inspection run.
///
/// Holds the loaded configuration and the paths of the running helper
/// binary, which must never appear in its own report.
///
/// # Examples
///
/// ```
/// use machinery_helper::HelperContext;
/// use machinery_helper::config::Config;
///
/// let mut config = Config::default();
/// config.scan.root = "/mnt/sysroot".to_string();
/// let ctx = HelperContext::with_config(config);
/// assert_eq!(ctx.config.scan.root, "/mnt/sysroot");
/// ```
#[derive(Debug, Clone)]
pub struct HelperContext {
    /// Configuration file that was loaded, if any.
    pub config_path: Option<PathBuf>,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Absolute paths of the running helper, excluded from the walk: the
    /// resolved executable and the path it was invoked through.
    pub helper_paths: Vec<PathBuf>,
}

impl HelperContext {
    /// Creates a new `HelperContext`, loading configuration from `config_path`
    /// or the default locations.
    ///
    /// # Errors
    /// Returns an error if a configuration file exists but cannot be read,
    /// parsed, or validated.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config::Config::resolve_path(config_path);

        let config = match &config_path {
            Some(path) => config::Config::load(path)?,
            None => config::Config::default(),
        };

        let helper_paths =
            helper_paths(std::env::current_exe().ok(), std::env::args_os().next());
        debug!(config = ?config_path, helper = ?helper_paths, "Context initialized");

        Ok(Self {
            config_path,
            config,
            helper_paths,
        })
    }

    /// Creates a context from an in-memory configuration, without helper
    /// paths. Used by tests and embedding callers.
    #[must_use]
    pub const fn with_config(config: config::Config) -> Self {
        Self {
            config_path: None,
            config,
            helper_paths: Vec::new(),
        }
    }
}

/// Paths under which the running helper can appear in the walk.
///
/// `current_exe` has symlinks resolved, so a helper started through a link
/// also shows up under its invocation path (`argv[0]` made absolute).
fn helper_paths(current_exe: Option<PathBuf>, invoked_as: Option<OsString>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = current_exe.into_iter().collect();

    if let Some(invoked_as) = invoked_as
        && let Ok(invoked) = std::path::absolute(&invoked_as)
        && !paths.contains(&invoked)
    {
        paths.push(invoked);
    }

    paths
}
