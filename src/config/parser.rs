use super::Config;
use anyhow::{Context, Result, anyhow, bail};
use std::path::Path;

/// Read, parse and validate a TOML configuration file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not UTF-8, is not
/// valid TOML, or fails validation
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let content = simdutf8::basic::from_utf8(&bytes)
        .map_err(|e| anyhow!("Invalid UTF-8 in config file: {e}"))?;

    parse_config_str(content)
        .with_context(|| format!("Invalid configuration in {}", path.display()))
}

/// Parse and validate configuration text
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or fails validation
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;

    // Validate and return validation errors directly without wrapping
    validate_config(&config)?;
    Ok(config)
}

/// Check values that would make an inspection run meaningless
///
/// # Errors
///
/// Returns an error describing the first invalid value
pub fn validate_config(config: &Config) -> Result<()> {
    if config.manifest.command.trim().is_empty() {
        bail!("manifest.command must not be empty");
    }

    if !config.scan.root.starts_with('/') {
        bail!("scan.root must be an absolute path: {}", config.scan.root);
    }

    if !config.mounts.table.is_absolute() {
        bail!(
            "mounts.table must be an absolute path: {}",
            config.mounts.table.display()
        );
    }

    if let Some(relative) = config.scan.extra_ignore.iter().find(|p| !p.starts_with('/')) {
        bail!("scan.extra_ignore entries must be absolute paths: {relative}");
    }

    Ok(())
}
