//! Registry assembling the final version report
//!
//! Components contribute named versions in three ways: static entries,
//! contributor functions evaluated at assembly time, and register hooks that
//! see the mapping being built right before it is rendered.

use crate::indent::IndentedJson;
use crate::version::Version;
use crate::Result;
use std::collections::HashMap;
use tracing::debug;

/// Function producing named versions at assembly time
pub type ContributorFn = Box<dyn Fn() -> Vec<(String, Version)>>;

/// Hook called with the mapping being assembled
pub type RegisterHook = Box<dyn Fn(&mut RegisterEvent<'_>)>;

/// Access to the assets of the version being assembled
pub struct RegisterEvent<'a> {
    versions: &'a mut HashMap<String, Version>,
}

impl<'a> RegisterEvent<'a> {
    /// Add or replace a named version
    pub fn set(&mut self, name: impl Into<String>, version: Version) {
        let name = name.into();
        debug!("Register hook set version {:?}", name);
        self.versions.insert(name, version);
    }

    /// Look up a version registered so far
    pub fn get(&self, name: &str) -> Option<&Version> {
        self.versions.get(name)
    }

    /// Names registered so far, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.versions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Registry of the main version and its contributed sub-versions
pub struct VersionRegistry {
    main: Version,
    versions: Vec<(String, Version)>,
    contributors: Vec<ContributorFn>,
    hooks: Vec<RegisterHook>,
}

impl VersionRegistry {
    /// Create a registry around the main version
    pub fn new(main: Version) -> Self {
        Self {
            main,
            versions: Vec::new(),
            contributors: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// The main version as configured
    pub fn main(&self) -> &Version {
        &self.main
    }

    /// Register a named version
    pub fn add(&mut self, name: impl Into<String>, version: Version) -> &mut Self {
        self.versions.push((name.into(), version));
        self
    }

    /// Register a function evaluated on every assembly
    pub fn add_contributor<F>(&mut self, contributor: F) -> &mut Self
    where
        F: Fn() -> Vec<(String, Version)> + 'static,
    {
        self.contributors.push(Box::new(contributor));
        self
    }

    /// Register a hook run last on every assembly
    pub fn on_register<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut RegisterEvent<'_>) + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Build the report tree.
    ///
    /// Starts from the main version and its own assets, then applies static
    /// entries, contributors and hooks in that order. A later entry replaces
    /// an earlier one with the same name.
    pub fn assemble(&self) -> Version {
        let mut root = self.main.clone();

        for (name, version) in &self.versions {
            root.assets.insert(name.clone(), version.clone());
        }
        for contributor in &self.contributors {
            root.assets.extend(contributor());
        }

        let mut event = RegisterEvent {
            versions: &mut root.assets,
        };
        for hook in &self.hooks {
            hook(&mut event);
        }

        debug!(
            "Assembled version report with {} asset(s) from {} hook(s)",
            root.assets.len(),
            self.hooks.len()
        );
        root
    }

    /// Assemble and render as indented JSON
    pub fn render(&self, prefix: &str, indent: &str) -> Result<Vec<u8>> {
        self.assemble().to_json_indent(prefix, indent)
    }
}

impl Default for VersionRegistry {
    fn default() -> Self {
        Self::new(Version::default())
    }
}
