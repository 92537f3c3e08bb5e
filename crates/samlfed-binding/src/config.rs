//! Rule configuration.
//!
//! Policy rules are configured from flat key-value pairs, the shape
//! deployment descriptors naturally produce. The trait is object safe so a
//! configuration source can be handed around as `&dyn RuleConfig`.

use std::collections::HashMap;

/// Key-value configuration consumed by rule constructors.
pub trait RuleConfig: Send + Sync {
    /// Gets a string configuration value.
    fn get(&self, key: &str) -> Option<&str>;

    /// Gets a boolean configuration value.
    ///
    /// Unparseable or missing values fall back to `default`.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    /// Gets an unsigned integer configuration value.
    ///
    /// Unparseable or missing values fall back to `default`.
    fn get_u64(&self, key: &str, default: u64) -> u64 {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }
}

/// [`RuleConfig`] backed by a plain map.
#[derive(Debug, Clone, Default)]
pub struct MapRuleConfig {
    values: HashMap<String, String>,
}

impl MapRuleConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Sets a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl RuleConfig for MapRuleConfig {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}
