//! Version report commands

use crate::config::ReportConfig;
use anyhow::{Context, Result};
use tracing::{info, warn};
use verstamp_core::prelude::*;

/// Asset name under which a version inherited through the environment is
/// reported
pub const ENV_ASSET: &str = "env";

/// Build the registry for a report.
///
/// `inherited` is the version found in the environment, if any; it is added
/// through a register hook so it lands after every configured asset.
pub fn build_registry(config: &ReportConfig, inherited: Option<Version>) -> VersionRegistry {
    let mut registry = VersionRegistry::new(config.version.clone());
    if let Some(version) = inherited {
        info!("Including version inherited from the environment");
        registry.on_register(move |event| event.set(ENV_ASSET, version.clone()));
    }
    registry
}

/// Render the full indented report
pub fn render_version(config: &ReportConfig, key: &EnvKey, include_env: bool) -> Result<String> {
    let inherited = if include_env {
        key.try_load()
            .with_context(|| format!("Failed to read {}", key.name()))?
    } else {
        None
    };

    let registry = build_registry(config, inherited);
    let bytes = registry
        .render(&config.prefix, &config.indent)
        .context("Failed to render version report")?;
    Ok(String::from_utf8(bytes)?)
}

/// Render the compact encoding of the configured version
pub fn render_compact(config: &ReportConfig) -> Result<String> {
    config
        .version
        .to_json_string()
        .context("Failed to encode version")
}

/// Render the human summary of the configured version
pub fn render_summary(config: &ReportConfig) -> String {
    let summary = config.version.to_string();
    if summary.is_empty() {
        warn!("Configured version has no populated attributes");
    }
    summary
}

/// Render `NAME=VALUE` for storing the configured version in the environment
pub fn render_env_assignment(config: &ReportConfig, key: &EnvKey) -> Result<String> {
    let value = encode_env_value(&config.version).context("Failed to encode version")?;
    Ok(format!("{}={}", key.name(), value))
}

/// Decode an environment payload and render it indented
pub fn render_env_value(value: &str, prefix: &str, indent: &str) -> Result<String> {
    let version = decode_env_value(value).context("Invalid version payload")?;
    version
        .to_json_indent_string(prefix, indent)
        .context("Failed to render version")
}
