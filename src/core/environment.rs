//! Immutable snapshot of the process environment.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::ConfigureError;

static ASSIGNMENT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Variables visible to the configurator, captured once per run.
///
/// Nothing writes to a snapshot after it is built; every resolver borrows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    ///
    /// Entries that are not valid UTF-8 are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Environment { vars }
    }

    /// Build a snapshot from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Environment {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Merge make-style `KEY=VALUE` arguments underneath this snapshot.
    ///
    /// Variables already present in the environment win over arguments.
    pub fn with_assignments(self, args: &[String]) -> Result<Self, ConfigureError> {
        let mut vars = BTreeMap::new();
        for arg in args {
            let (key, value) = parse_assignment(arg)?;
            vars.insert(key.to_string(), value.to_string());
        }
        vars.extend(self.vars);
        Ok(Environment { vars })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// First of `names` that is set, with its value.
    pub fn first_of<'n>(&self, names: &[&'n str]) -> Option<(&'n str, &str)> {
        names
            .iter()
            .find_map(|name| self.get(name).map(|value| (*name, value)))
    }
}

/// Split `KEY=VALUE` at the first `=`.
pub fn parse_assignment(arg: &str) -> Result<(&str, &str), ConfigureError> {
    match arg.split_once('=') {
        Some((key, value)) if ASSIGNMENT_KEY.is_match(key) => Ok((key, value)),
        _ => Err(ConfigureError::InvalidAssignment {
            argument: arg.to_string(),
        }),
    }
}
