//! Environment variable transport of a version tree
//!
//! A parent process stores its version in an environment variable so child
//! processes of the same executable can report it. The value is the compact
//! JSON encoding in URL-safe base64 without padding.

use crate::version::Version;
use crate::{Result, VersionError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::env::VarError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Namespace every derived variable name starts with
pub const ENV_NAMESPACE: &str = "VERSTAMP__VERSION__";

/// Encode a version for storage in an environment variable
pub fn encode_env_value(version: &Version) -> Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(version.to_json()?))
}

/// Decode a value produced by [`encode_env_value`]
pub fn decode_env_value(value: &str) -> Result<Version> {
    let bytes = URL_SAFE_NO_PAD.decode(value.trim())?;
    Version::from_json(&bytes)
}

/// Name of the environment variable carrying the version of one executable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvKey {
    name: String,
}

impl EnvKey {
    /// Derive the key from an executable path.
    ///
    /// Only the base name takes part, so the same program started from any
    /// directory resolves to the same variable.
    pub fn for_executable(path: impl AsRef<Path>) -> Self {
        let base = path
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let digest = Sha256::digest(base.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();

        Self {
            name: format!("{}{}", ENV_NAMESPACE, hex),
        }
    }

    /// Derive the key for the running process from `argv[0]`, falling back to
    /// the resolved executable path.
    pub fn current() -> Self {
        let path = std::env::args_os()
            .next()
            .map(PathBuf::from)
            .or_else(|| std::env::current_exe().ok())
            .unwrap_or_default();
        Self::for_executable(path)
    }

    /// The variable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store `version` in the process environment
    pub fn store(&self, version: &Version) -> Result<()> {
        let value = encode_env_value(version)?;
        debug!("Storing {} bytes of version data in {}", value.len(), self.name);
        std::env::set_var(&self.name, value);
        Ok(())
    }

    /// Read the stored version.
    ///
    /// A missing or empty variable yields `Ok(None)`; a corrupt payload is an
    /// error.
    pub fn try_load(&self) -> Result<Option<Version>> {
        match std::env::var(&self.name) {
            Ok(value) if !value.is_empty() => decode_env_value(&value).map(Some),
            Ok(_) | Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(VersionError::NotUnicode {
                name: self.name.clone(),
            }),
        }
    }

    /// Read the stored version.
    ///
    /// # Panics
    ///
    /// Panics when the variable holds a corrupt payload, since that means the
    /// environment was tampered with.
    pub fn load(&self) -> Option<Version> {
        match self.try_load() {
            Ok(version) => version,
            Err(e) => panic!("corrupt version data in {}: {}", self.name, e),
        }
    }

    /// Remove the variable from the process environment
    pub fn clear(&self) {
        std::env::remove_var(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use chrono::DateTime;

    fn sample() -> Version {
        let mut attributes = Attributes::with_commit("abc123");
        attributes.build_date = Some(DateTime::parse_from_rfc3339("2024-03-04T05:06:07Z").unwrap());
        Version::new(attributes)
            .with_asset("plugin", Version::new(Attributes::with_commit("p1")))
            .with_asset("db", Version::default())
    }

    #[test]
    fn test_key_uses_base_name_only() {
        let a = EnvKey::for_executable("/usr/bin/myapp");
        let b = EnvKey::for_executable("./build/myapp");
        let c = EnvKey::for_executable("/usr/bin/otherapp");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_key_format() {
        let key = EnvKey::for_executable("myapp");
        let hash = key.name().strip_prefix(ENV_NAMESPACE).unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_value_is_unpadded_url_safe() {
        let value = encode_env_value(&sample()).unwrap();
        assert!(!value.contains('='));
        assert!(!value.contains('+') && !value.contains('/'));
        assert_eq!(decode_env_value(&value).unwrap(), sample());
    }

    #[test]
    fn test_store_then_load() {
        let key = EnvKey::for_executable("verstamp-env-test-store");
        key.store(&sample()).unwrap();
        assert_eq!(key.load(), Some(sample()));
        key.clear();
        assert_eq!(key.load(), None);
    }

    #[test]
    fn test_missing_or_empty_is_none() {
        let key = EnvKey::for_executable("verstamp-env-test-missing");
        assert!(key.try_load().unwrap().is_none());
        std::env::set_var(key.name(), "");
        assert!(key.try_load().unwrap().is_none());
        key.clear();
    }

    #[test]
    fn test_corrupt_payload_is_error() {
        let key = EnvKey::for_executable("verstamp-env-test-corrupt");
        std::env::set_var(key.name(), "%%%not-base64%%%");
        assert!(matches!(key.try_load(), Err(VersionError::Base64(_))));

        std::env::set_var(key.name(), URL_SAFE_NO_PAD.encode(b"{not json"));
        assert!(matches!(key.try_load(), Err(VersionError::Json(_))));
        key.clear();
    }

    #[test]
    #[should_panic(expected = "corrupt version data")]
    fn test_load_panics_on_corruption() {
        let key = EnvKey::for_executable("verstamp-env-test-panic");
        std::env::set_var(key.name(), "!!!");
        key.load();
    }
}
