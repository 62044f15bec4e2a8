//! The resolved configuration handed to the fragment composer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::schema::{kind_of, OverrideKind};

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "from", content = "name")]
pub enum Origin {
    /// The same-named environment variable.
    Override,
    /// A legacy variable name.
    Alias(String),
    /// Sibling-directory default.
    Default,
    /// Derived from a host probe.
    Probe,
    /// Implied by the configuration mode.
    Mode,
    /// The fetched header bundle.
    HeaderBundle,
    /// Allow-listed environment entry copied verbatim.
    Passthrough,
}

/// A single resolved key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub value: String,
    pub kind: OverrideKind,
    pub origin: Origin,
}

/// Key -> setting map, plus the path recorded at the end of the fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    settings: BTreeMap<String, Setting>,
    config_header: PathBuf,
}

impl ResolvedConfig {
    pub fn new(config_header: impl Into<PathBuf>) -> Self {
        ResolvedConfig {
            settings: BTreeMap::new(),
            config_header: config_header.into(),
        }
    }

    /// Set `key`, taking its override kind from the schema.
    ///
    /// A later call for the same key replaces the earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>, origin: Origin) {
        let key = key.into();
        let kind = kind_of(&key);
        self.settings.insert(
            key,
            Setting {
                value: value.into(),
                kind,
                origin,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<&Setting> {
        self.settings.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(|s| s.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.settings.contains_key(key)
    }

    /// Settings of one kind, sorted by key.
    pub fn of_kind(&self, kind: OverrideKind) -> impl Iterator<Item = (&str, &Setting)> {
        self.settings
            .iter()
            .filter(move |(_, s)| s.kind == kind)
            .map(|(k, s)| (k.as_str(), s))
    }

    /// Absolute path of the generated config header.
    pub fn config_header(&self) -> &Path {
        &self.config_header
    }
}
