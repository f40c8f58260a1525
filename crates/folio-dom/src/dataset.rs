//! Dataset
//!
//! `data-*` entries of an element. Markup attributes land here verbatim, so
//! an entry exists only when the author wrote it.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset(BTreeMap<String, String>);

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove an entry, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_in_key_order() {
        let mut data = Dataset::new();
        data.set("speed", "2");
        data.set("force", "3");
        data.set("speed", "5");
        assert_eq!(data.iter().collect::<Vec<_>>(), vec![("force", "3"), ("speed", "5")]);
    }

    #[test]
    fn test_remove() {
        let mut data = Dataset::new();
        data.set("text", "ERROR");
        assert!(data.has("text"));
        assert_eq!(data.remove("text").as_deref(), Some("ERROR"));
        assert!(data.remove("text").is_none());
        assert!(data.is_empty());
    }
}
