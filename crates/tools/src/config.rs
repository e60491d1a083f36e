//! Configuration management for the verstamp tool

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use verstamp_core::prelude::*;

/// Default per-level indentation of the report
pub const DEFAULT_INDENT: &str = "  ";

/// Report configuration
///
/// ```toml
/// indent = "    "
///
/// [version.Attributes]
/// CommitID = "abc123"
/// BuildDate = "2024-01-01T00:00:00Z"
///
/// [version.Assets.plugin.Attributes]
/// CommitID = "def456"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Main version of the host application
    pub version: Version,
    /// Indentation unit of the report
    pub indent: String,
    /// Prefix written at the start of every report line but the first
    pub prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            version: Version::default(),
            indent: DEFAULT_INDENT.to_string(),
            prefix: String::new(),
        }
    }
}

impl ReportConfig {
    /// Load configuration from a JSON or TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        debug!("Loaded report config from {:?}", path);
        Ok(config)
    }

    /// Parse configuration text, trying JSON first, then TOML
    pub fn parse(content: &str) -> Result<Self> {
        if let Ok(config) = serde_json::from_str(content) {
            return Ok(config);
        }
        toml::from_str(content).context("Config is neither valid JSON nor valid TOML")
    }

    /// Load from `path` when given, otherwise use defaults with the main
    /// attributes taken from the `VERSTAMP_*` build variables
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self {
                version: Version::new(
                    Attributes::from_build_env().context("Invalid VERSTAMP_* variable")?,
                ),
                ..Self::default()
            }),
        }
    }

    /// Apply command line overrides
    pub fn with_overrides(mut self, indent: Option<String>, prefix: Option<String>) -> Self {
        if let Some(indent) = indent {
            self.indent = indent;
        }
        if let Some(prefix) = prefix {
            self.prefix = prefix;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TOML_CONFIG: &str = r#"
indent = "    "

[version.Attributes]
CommitID = "abc123"
BuildDate = "2024-01-01T00:00:00Z"

[version.Assets.plugin.Attributes]
CommitID = "def456"
"#;

    #[test]
    fn test_parse_toml() {
        let config = ReportConfig::parse(TOML_CONFIG).unwrap();
        assert_eq!(config.indent, "    ");
        assert_eq!(config.prefix, "");
        assert_eq!(config.version.attributes.commit_id, "abc123");
        assert!(config.version.attributes.build_date.is_some());
        assert_eq!(config.version.assets["plugin"].attributes.commit_id, "def456");
    }

    #[test]
    fn test_parse_json() {
        let config = ReportConfig::parse(r#"{"version":{"Attributes":{"Hash":"ff"}}}"#).unwrap();
        assert_eq!(config.indent, DEFAULT_INDENT);
        assert_eq!(config.version.attributes.hash, "ff");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(ReportConfig::parse("{{{ nope").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TOML_CONFIG.as_bytes()).unwrap();

        let config = ReportConfig::from_file(file.path()).unwrap();
        assert_eq!(config.version.attributes.commit_id, "abc123");
    }

    #[test]
    fn test_missing_file() {
        let err = ReportConfig::from_file(Path::new("/nonexistent/verstamp.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_overrides() {
        let config = ReportConfig::default().with_overrides(Some("\t".to_string()), None);
        assert_eq!(config.indent, "\t");
        assert_eq!(config.prefix, "");
    }
}
