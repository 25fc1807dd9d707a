//! End-to-end test mode.
//!
//! When active, every resolved checkpoint is non-mandatory so automated
//! tests can drive the workflow without satisfying real compliance gates.
//! The compile-time `e2e-test-mode` feature wins; otherwise the runtime
//! flag stored under [`TEST_MODE_KEY`] is consulted.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::Result;

/// Well-known key of the runtime flag.
pub const TEST_MODE_KEY: &str = "raise.e2eTestMode";

/// Whether the crate was built with the `e2e-test-mode` feature.
pub const COMPILED_TEST_MODE: bool = cfg!(feature = "e2e-test-mode");

/// Key-value settings store the runtime flag is read from.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Store backed by a flat JSON object on disk, read once at open.
///
/// Non-string values are kept in their JSON text form.
#[derive(Debug, Clone, Default)]
pub struct JsonFileStore {
    values: HashMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)?;
        let values = map
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, text)
            })
            .collect();
        Ok(Self { values })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Whether a stored flag value means "on".
pub fn is_truthy(value: &str) -> bool {
    let v = value.trim();
    v.eq_ignore_ascii_case("true") || v == "1"
}

/// Resolved test-mode state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestMode {
    pub active: bool,
}

impl TestMode {
    pub const OFF: TestMode = TestMode { active: false };
    pub const ON: TestMode = TestMode { active: true };

    /// Resolve from the compile-time flag, then the runtime store.
    pub fn resolve(store: &dyn KeyValueStore) -> Self {
        Self::resolve_with(COMPILED_TEST_MODE, store)
    }

    /// Resolve with an explicit compile-time flag.
    pub fn resolve_with(compiled: bool, store: &dyn KeyValueStore) -> Self {
        if compiled {
            return Self::ON;
        }
        let active = store.get(TEST_MODE_KEY).is_some_and(|v| is_truthy(&v));
        if active {
            tracing::debug!(event = "test_mode.active", source = "store");
        }
        Self { active }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy("true"));
        assert!(is_truthy(" TRUE "));
        assert!(is_truthy("1"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("yes"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn test_compiled_flag_wins() {
        let store = MemoryStore::new().with(TEST_MODE_KEY, "false");
        assert_eq!(TestMode::resolve_with(true, &store), TestMode::ON);
    }

    #[test]
    fn test_runtime_flag_consulted() {
        let on = MemoryStore::new().with(TEST_MODE_KEY, "true");
        assert_eq!(TestMode::resolve_with(false, &on), TestMode::ON);
        let off = MemoryStore::new();
        assert_eq!(TestMode::resolve_with(false, &off), TestMode::OFF);
        let other_key = MemoryStore::new().with("e2eTestMode", "true");
        assert_eq!(TestMode::resolve_with(false, &other_key), TestMode::OFF);
    }

    #[test]
    fn test_json_file_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"raise.e2eTestMode": true, "theme": "dark"}}"#).unwrap();
        let store = JsonFileStore::open(file.path()).unwrap();
        assert_eq!(store.get(TEST_MODE_KEY).as_deref(), Some("true"));
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        assert_eq!(TestMode::resolve_with(false, &store), TestMode::ON);
    }

    #[test]
    fn test_json_file_store_rejects_non_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();
        assert!(JsonFileStore::open(file.path()).is_err());
    }
}
