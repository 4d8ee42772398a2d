//! User properties given with `-D key=value`

use anyhow::{bail, Result};
use std::collections::BTreeMap;

/// Properties defined on the command line.
///
/// These are the explicit answers of the run: a property that is set here is
/// never prompted for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProperties {
    values: BTreeMap<String, String>,
}

impl UserProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Boolean view of a property. Unparseable values count as unset.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)?.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        }
    }

    /// `-Dforce=true` skips every confirmation.
    pub fn is_forced(&self) -> bool {
        self.flag("force").unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse one `key=value` definition.
///
/// Used as the clap value parser for `-D`.
pub fn parse_define(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Expected key=value, got '{raw}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Property name missing in '{raw}'");
    }
    Ok((key.to_string(), value.to_string()))
}
