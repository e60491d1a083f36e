//! Version tree: a node of attributes with named child versions

use crate::attributes::Attributes;
use crate::indent::{to_compact_json, trim_last_blank_line, write_key, IndentedJson};
use crate::Result;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A version node
///
/// `assets` maps each sub-component name to its own version. Both encodings
/// emit children sorted by name and leave out the `Assets` key when there are
/// none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Version {
    #[serde(rename = "Attributes", default)]
    pub attributes: Attributes,

    #[serde(rename = "Assets", default)]
    pub assets: HashMap<String, Version>,
}

impl Version {
    /// Create a version without assets
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            assets: HashMap::new(),
        }
    }

    /// Add or replace a named child version
    pub fn with_asset(mut self, name: impl Into<String>, version: Version) -> Self {
        self.assets.insert(name.into(), version);
        self
    }

    /// Children sorted by name
    pub fn named_assets(&self) -> Versions<'_> {
        Versions::from_assets(&self.assets)
    }

    /// Compact JSON encoding
    pub fn to_json(&self) -> Result<Vec<u8>> {
        to_compact_json(self)
    }

    /// Compact JSON encoding as a string
    pub fn to_json_string(&self) -> Result<String> {
        let bytes = self.to_json()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Decode the compact (or any valid) JSON encoding
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let assets = self.named_assets();
        let mut map = serializer.serialize_map(Some(if assets.is_empty() { 1 } else { 2 }))?;
        // Keys in byte order: "Assets" < "Attributes"
        if !assets.is_empty() {
            map.serialize_entry("Assets", &assets)?;
        }
        map.serialize_entry("Attributes", &self.attributes)?;
        map.end()
    }
}

impl IndentedJson for Version {
    fn to_json_indent(&self, prefix: &str, indent: &str) -> Result<Vec<u8>> {
        let nested = format!("{}{}", prefix, indent);
        let mut buf = Vec::with_capacity(256);

        buf.extend_from_slice(b"{\n");
        buf.extend_from_slice(nested.as_bytes());
        buf.extend_from_slice(b"\"Attributes\": ");
        let data = self.attributes.to_json_indent(&nested, indent)?;
        buf.extend_from_slice(trim_last_blank_line(&data));

        let assets = self.named_assets();
        if !assets.is_empty() {
            buf.extend_from_slice(b",\n");
            buf.extend_from_slice(nested.as_bytes());
            buf.extend_from_slice(b"\"Assets\": ");
            let data = assets.to_json_indent(&nested, indent)?;
            buf.extend_from_slice(trim_last_blank_line(&data));
        }

        buf.push(b'\n');
        buf.extend_from_slice(prefix.as_bytes());
        buf.extend_from_slice(b"}\n");
        Ok(buf)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.attributes.summary())
    }
}

/// A child name paired with a borrowed version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedVersion<'a> {
    pub name: &'a str,
    pub version: &'a Version,
}

/// Named versions in ascending name order
#[derive(Debug, Clone, Default)]
pub struct Versions<'a> {
    entries: Vec<NamedVersion<'a>>,
}

impl<'a> Versions<'a> {
    /// Collect and sort the children of an assets map
    pub fn from_assets(assets: &'a HashMap<String, Version>) -> Self {
        assets
            .iter()
            .map(|(name, version)| NamedVersion {
                name: name.as_str(),
                version,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedVersion<'a>> {
        self.entries.iter()
    }

    /// Child names in emission order
    pub fn names(&self) -> Vec<&'a str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }
}

impl<'a> FromIterator<NamedVersion<'a>> for Versions<'a> {
    fn from_iter<I: IntoIterator<Item = NamedVersion<'a>>>(iter: I) -> Self {
        let mut entries: Vec<_> = iter.into_iter().collect();
        entries.sort_by(|a, b| a.name.cmp(b.name));
        Self { entries }
    }
}

impl Serialize for Versions<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(entry.name, entry.version)?;
        }
        map.end()
    }
}

impl IndentedJson for Versions<'_> {
    fn to_json_indent(&self, prefix: &str, indent: &str) -> Result<Vec<u8>> {
        let nested = format!("{}{}", prefix, indent);
        let mut buf = Vec::with_capacity(256 * self.entries.len().max(1));

        buf.extend_from_slice(b"{\n");
        for (i, entry) in self.entries.iter().enumerate() {
            if i != 0 {
                buf.extend_from_slice(b",\n");
            }
            buf.extend_from_slice(nested.as_bytes());
            write_key(&mut buf, entry.name)?;
            let data = entry.version.to_json_indent(&nested, indent)?;
            buf.extend_from_slice(trim_last_blank_line(&data));
        }
        if !self.entries.is_empty() {
            buf.push(b'\n');
        }
        buf.extend_from_slice(prefix.as_bytes());
        buf.extend_from_slice(b"}\n");
        Ok(buf)
    }
}
