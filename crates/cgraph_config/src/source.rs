//! Override sources.
//!
//! A source is a key-value lookup keyed by a field's logical name. The
//! process environment is the production source; `MapSource` serves tests and
//! embedders that carry their own settings.

use indexmap::IndexMap;

use crate::error::{ConfigResult, ConfigurationError};

/// Namespace prefix for environment overrides
pub const ENV_PREFIX: &str = "CGRAPH_";

/// Key-value lookup for configuration overrides
pub trait ConfigSource: Send + Sync {
    /// Raw override for a logical key, or `None` when unset
    ///
    /// # Errors
    ///
    /// Returns error if the override exists but cannot be read as text
    fn lookup(&self, key: &str) -> ConfigResult<Option<String>>;

    /// Name the operator sets for `key`, used in error messages
    fn qualified_key(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Reads `PREFIX` + upper-cased key from the process environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    /// Create a source with a custom prefix
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Prefix prepended to every key
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::with_prefix(ENV_PREFIX)
    }
}

impl ConfigSource for EnvSource {
    fn lookup(&self, key: &str) -> ConfigResult<Option<String>> {
        let name = self.qualified_key(key);
        match std::env::var(&name) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => {
                Err(ConfigurationError::NotUnicode { key: name })
            }
        }
    }

    fn qualified_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.to_ascii_uppercase())
    }
}

/// In-memory source keyed by logical name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSource {
    values: IndexMap<String, String>,
}

impl MapSource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override (builder style)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace an override
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove an override
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.shift_remove(key)
    }

    /// Number of overrides
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no overrides are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn lookup(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_source_qualified_key() {
        let source = EnvSource::default();
        assert_eq!(source.prefix(), "CGRAPH_");
        assert_eq!(
            source.qualified_key("buffer_size_bytes"),
            "CGRAPH_BUFFER_SIZE_BYTES"
        );
    }

    #[test]
    fn test_env_source_reads_process_env() {
        // PATH is set in any sane test environment
        let source = EnvSource::with_prefix("");
        assert!(source.lookup("path").unwrap().is_some());

        let source = EnvSource::with_prefix("CGRAPH_UNIT_TEST_UNSET_");
        assert_eq!(source.lookup("submit_timeout").unwrap(), None);
    }

    #[test]
    fn test_map_source_lookup() {
        let source = MapSource::new()
            .with("submit_timeout", "5")
            .with("overlap_gpu_communication", "true");
        assert_eq!(source.len(), 2);
        assert_eq!(source.lookup("submit_timeout").unwrap(), Some("5".to_string()));
        assert_eq!(source.lookup("get_timeout").unwrap(), None);
        assert_eq!(source.qualified_key("get_timeout"), "get_timeout");
    }

    #[test]
    fn test_map_source_insert_remove() {
        let mut source = MapSource::new();
        assert!(source.is_empty());
        source.insert("get_timeout", "1");
        source.insert("get_timeout", "2");
        assert_eq!(source.len(), 1);
        assert_eq!(source.remove("get_timeout"), Some("2".to_string()));
        assert!(source.is_empty());
    }

    #[test]
    fn test_map_source_from_iter() {
        let source: MapSource = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(source.lookup("b").unwrap(), Some("2".to_string()));
    }
}
