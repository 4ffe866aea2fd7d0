// SPDX-License-Identifier: MIT OR Apache-2.0
//! Kind-specific node configuration bags.

use crate::value::Value;
use indexmap::IndexMap;
use patchflow_media::TextureHandle;
use serde::{Deserialize, Serialize};

/// An ordered key/value bag of kind-specific configuration, e.g. a
/// numeric literal for a `Number` node or shader source text for a
/// `Shader` node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config(IndexMap<String, Value>);

impl Config {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace an entry.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Look up an entry, `Absent` when missing.
    pub fn get(&self, key: &str) -> &Value {
        self.0.get(key).unwrap_or(&Value::Absent)
    }

    /// Numeric entry with a default.
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).number_or(default)
    }

    /// Text entry, if present.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).as_text()
    }

    /// Texture entry, if present.
    pub fn texture(&self, key: &str) -> Option<&TextureHandle> {
        self.get(key).as_texture()
    }

    /// Apply `patch` over this config, replacing overlapping keys and
    /// keeping the rest.
    pub fn merge(&mut self, patch: Config) {
        for (key, value) in patch.0 {
            self.0.insert(key, value);
        }
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_replaces_and_keeps() {
        let mut config = Config::new()
            .with("value", Value::Number(5.0))
            .with("label", Value::Text("a".into()));

        config.merge(Config::new().with("value", Value::Number(10.0)));

        assert_eq!(config.number_or("value", 0.0), 10.0);
        assert_eq!(config.text("label"), Some("a"));
    }

    #[test]
    fn missing_keys_are_absent() {
        let config = Config::new();
        assert!(config.get("missing").is_absent());
        assert_eq!(config.number_or("missing", 7.0), 7.0);
    }
}
