//! Storage APIs
//!
//! localStorage-style string store. File-backed storage keeps one
//! `key<TAB>value` line per entry, with `\\`, tab and newline escaped.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Storage failure
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read storage file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write storage file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Storage backend
#[derive(Debug, Default)]
pub struct Storage {
    data: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl Storage {
    /// In-memory storage (sessionStorage)
    pub fn session() -> Self {
        Self::default()
    }

    /// Persistent storage (localStorage) at `path`; a missing file is empty
    pub fn local(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let mut data = BTreeMap::new();

        match fs::read_to_string(&path) {
            Ok(contents) => {
                for line in contents.lines() {
                    match line.split_once('\t') {
                        Some((key, value)) => {
                            data.insert(unescape(key), unescape(value));
                        }
                        None if line.is_empty() => {}
                        None => tracing::warn!("Skipping malformed storage line in {}", path.display()),
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(StorageError::Read { path, source }),
        }

        tracing::debug!("Opened storage {} ({} items)", path.display(), data.len());
        Ok(Self { data, path: Some(path) })
    }

    /// Backing file, if persistent
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get item
    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|s| s.as_str())
    }

    /// Set item
    pub fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.data.insert(key.to_string(), value.to_string());
        self.persist()
    }

    /// Remove item
    pub fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.data.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    /// Clear all items
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.data.clear();
        self.persist()
    }

    /// Get number of items
    pub fn length(&self) -> usize {
        self.data.len()
    }

    /// Persist to disk if persistent
    fn persist(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents: String = self
            .data
            .iter()
            .map(|(k, v)| format!("{}\t{}\n", escape(k), escape(v)))
            .collect();
        fs::write(path, contents).map_err(|source| StorageError::Write { path: path.clone(), source })
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_storage() {
        let mut storage = Storage::session();
        storage.set_item("storyState", "{}").unwrap();
        assert_eq!(storage.get_item("storyState"), Some("{}"));
        storage.remove_item("storyState").unwrap();
        assert_eq!(storage.get_item("storyState"), None);
        assert!(storage.path().is_none());
    }

    #[test]
    fn test_local_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.tsv");

        let mut storage = Storage::local(&path).unwrap();
        assert_eq!(storage.length(), 0);
        storage.set_item("storyState", "{\"currentNode\":\"a\\tb\"}\nline2").unwrap();
        storage.set_item("other", "x").unwrap();

        let reopened = Storage::local(&path).unwrap();
        assert_eq!(reopened.get_item("storyState"), Some("{\"currentNode\":\"a\\tb\"}\nline2"));
        assert_eq!(reopened.length(), 2);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.tsv");
        fs::write(&path, "garbage without tab\nstoryState\tok\n").unwrap();

        let storage = Storage::local(&path).unwrap();
        assert_eq!(storage.length(), 1);
        assert_eq!(storage.get_item("storyState"), Some("ok"));
    }

    #[test]
    fn test_clear_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.tsv");
        let mut storage = Storage::local(&path).unwrap();
        storage.set_item("k", "v").unwrap();
        storage.clear().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_escape_round_trip() {
        for s in ["plain", "tab\there", "back\\slash", "new\nline", "\\t literal"] {
            assert_eq!(unescape(&escape(s)), s);
        }
    }
}
