use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

/// Immutable name/value mapping that predicates are resolved against.
///
/// Built once by the caller and shared read-only for the whole run. The
/// preprocessor never consults process variables on its own; callers that
/// want them take a snapshot with [`Environment::from_process`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an environment from name/value pairs. Later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Snapshot of the current process variables whose names are identifiers.
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars_os().filter_map(|(name, value)| {
            let name = name.into_string().ok()?;
            let value = value.into_string().ok()?;
            is_identifier(&name).then_some((name, value))
        }))
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Overlay `other` on top of this environment
    pub fn merge(mut self, other: Environment) -> Self {
        self.vars.extend(other.vars);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse a `KEY=VALUE` definition. A bare `KEY` defines it as `"true"`.
pub fn parse_define(definition: &str) -> Result<(String, String)> {
    let (name, value) = match definition.split_once('=') {
        Some((name, value)) => (name.trim(), value),
        None => (definition.trim(), "true"),
    };

    if !is_identifier(name) {
        return Err(anyhow!("Invalid variable name in definition: '{}'", definition));
    }

    Ok((name.to_string(), value.to_string()))
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
