//! Extension to content-type lookup.
//!
//! Built once by the caller and handed to [`FileEntity::content_type`]
//! instead of living in global state. Entries set on the table win over the
//! built-in `mime_guess2` database.
//!
//! [`FileEntity::content_type`]: crate::FileEntity::content_type

use std::collections::HashMap;

use log::debug;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct ContentTypes {
    overrides: HashMap<String, String>,
    default: String,
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::with_default(DEFAULT_CONTENT_TYPE)
    }
}

impl ContentTypes {
    pub fn with_default(default: impl Into<String>) -> Self {
        Self {
            overrides: HashMap::new(),
            default: default.into(),
        }
    }

    pub fn default_type(&self) -> &str {
        &self.default
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.overrides.insert(key.to_lowercase(), value.into());
    }

    pub fn exists(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Content type for `key`, if the table or the built-in database knows it.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let key = key.to_lowercase();
        if let Some(value) = self.overrides.get(&key) {
            debug!("ContentTypes: override for '{}': {}", key, value);
            return Some(value.clone());
        }
        mime_guess2::from_ext(&key).first().map(|mime| mime.to_string())
    }

    pub fn get(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or_else(|| default.to_string())
    }

    /// Like [`ContentTypes::get`] with the configured default.
    pub fn resolve(&self, key: &str) -> String {
        self.get(key, &self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut types = ContentTypes::default();
        assert_eq!(types.lookup("key"), None);
        assert_eq!(types.get("key", "fallback"), "fallback");

        types.set("key", "value");
        assert_eq!(types.lookup("key").unwrap(), "value");
        assert_eq!(types.resolve("KEY"), "value");
    }

    #[test]
    fn test_exists_only_after_set() {
        let mut types = ContentTypes::with_default("application/x-unknown");
        assert!(!types.exists("foo-unregistered"));
        assert_eq!(types.resolve("foo-unregistered"), "application/x-unknown");

        types.set("foo-unregistered", "text/x-foo");
        assert!(types.exists("foo-unregistered"));
        assert!(!types.exists("bar-unregistered"));
    }

    #[test]
    fn test_builtin_database() {
        let types = ContentTypes::default();
        assert!(types.exists("txt"));
        assert_eq!(types.resolve("png"), "image/png");
    }

    #[test]
    fn test_override_wins() {
        let mut types = ContentTypes::default();
        types.set("rs", "text/x-rust");
        assert_eq!(types.resolve("rs"), "text/x-rust");
    }
}
