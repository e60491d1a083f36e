//! verstamp core - build and version metadata trees
//!
//! This crate models a version tree (build attributes plus named
//! sub-component versions) and renders it as compact or indented JSON with
//! children always sorted by name, so reports are byte-stable across runs.

pub mod attributes;
pub mod env;
pub mod error;
pub mod indent;
pub mod registry;
pub mod version;

pub use error::{Result, VersionError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        attributes::Attributes,
        env::{decode_env_value, encode_env_value, EnvKey},
        error::{Result, VersionError},
        indent::{trim_last_blank_line, IndentedJson},
        registry::{RegisterEvent, VersionRegistry},
        version::{NamedVersion, Version, Versions},
    };
}
