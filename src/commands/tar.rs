use anyhow::{Context, Result};
use std::ffi::OsString;
use std::process::Command;
use tracing::debug;

/// Hand the remaining arguments to the system `tar` and return its exit code.
///
/// Stdio is inherited so archives can be streamed through the helper.
///
/// # Errors
///
/// Returns an error if `tar` cannot be found or started
pub fn execute(args: &[OsString]) -> Result<i32> {
    execute_with("tar", args)
}

/// Like [`execute`], with an explicit archiver program
///
/// # Errors
///
/// Returns an error if `program` cannot be found or started
pub fn execute_with(program: &str, args: &[OsString]) -> Result<i32> {
    let program_path =
        which::which(program).with_context(|| format!("Archive tool not found: {program}"))?;

    debug!(program = %program_path.display(), ?args, "Delegating to archiver");

    let status = Command::new(&program_path)
        .args(args)
        .status()
        .with_context(|| format!("Failed to run {}", program_path.display()))?;

    // Killed by a signal: report a generic failure
    Ok(status.code().unwrap_or(1))
}
