//! Command-line interface definitions for machinery-helper.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The CLI definitions are shared between the main binary and build tools (like xtask)
//! for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes (#[arg(help = "...")]),
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::ffi::OsString;
use std::path::PathBuf;

/// Main CLI structure for machinery-helper.
#[derive(Parser)]
#[command(
    name = "machinery-helper",
    version = crate::VERSION,
    about = "List files not owned by any installed package",
    long_about = "Walks the filesystem, compares it against the package manager's file list \
                  and prints every unmanaged file, link and directory as JSON"
)]
pub struct Cli {
    /// Subcommand to execute; without one the inspection runs
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Show debug output on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only report errors on stderr
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (defaults to $MACHINERY_HELPER_CONFIG or /etc/machinery-helper.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to inspect instead of the configured root. Manifest paths
    /// are compared as printed, so the manifest command must list paths
    /// that already start with this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<String>,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Pass the remaining arguments to the system tar
    Tar {
        /// Arguments for tar, passed verbatim
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
        args: Vec<OsString>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
