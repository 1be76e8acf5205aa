use anyhow::{Context, Result, bail};
use std::process::{Command, Stdio};
use tracing::{Level, debug, span, warn};

/// Default command producing the package manifest.
pub const DEFAULT_MANIFEST_COMMAND: &str = "rpm -qlav";

/// Anything that can hand over the raw manifest text.
///
/// Production code runs the package manager; tests feed fixed text.
pub trait ManifestSource {
    /// Return the complete manifest as newline-separated lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be obtained. Callers treat
    /// this as fatal.
    fn read_manifest(&self) -> Result<String>;
}

/// Manifest source that runs an external command once and captures stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandManifestSource {
    /// Program name or path, resolved on `PATH` at run time
    program: String,
    /// Arguments passed verbatim
    args: Vec<String>,
}

impl CommandManifestSource {
    /// Create a source for an explicit program and argument list
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build a source from a shell-like command line such as `rpm -qlav`
    ///
    /// # Errors
    ///
    /// Returns an error if the command line has unbalanced quotes or is empty
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let words = shell_words::split(command_line)
            .with_context(|| format!("Invalid manifest command: {command_line:?}"))?;

        let Some((program, args)) = words.split_first() else {
            bail!("Manifest command is empty");
        };

        Ok(Self::new(program.clone(), args.to_vec()))
    }

    /// Program that will be executed
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Default for CommandManifestSource {
    fn default() -> Self {
        Self::new("rpm", vec!["-qlav".to_string()])
    }
}

impl ManifestSource for CommandManifestSource {
    fn read_manifest(&self) -> Result<String> {
        let span = span!(Level::DEBUG, "read_manifest", program = %self.program);
        let _guard = span.enter();

        let program = which::which(&self.program)
            .with_context(|| format!("Manifest command not found: {}", self.program))?;

        let output = Command::new(&program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run manifest command: {}", program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Manifest command {} failed ({}): {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        // Paths with invalid bytes never match a walked path
        let text = match simdutf8::basic::from_utf8(&output.stdout) {
            Ok(text) => text.to_owned(),
            Err(e) => {
                warn!(error = %e, "Manifest output is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
        };

        debug!(bytes = output.stdout.len(), "Manifest captured");
        Ok(text)
    }
}
