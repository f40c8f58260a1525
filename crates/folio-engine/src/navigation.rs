//! Navigation state and saved progress
//!
//! Progress is stored as JSON under one storage key:
//! `{"currentNode":"c1","previousNode":"portada","previousChoiceIndex":0}`.

use folio_runtime::Storage;
use serde::{Deserialize, Serialize};

use crate::error::NavigationError;
use crate::story::Story;

/// Where the reader is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub current_node: String,
    pub previous_node: Option<String>,
    pub previous_choice_index: Option<usize>,
}

impl NavigationState {
    /// Start of the story, nothing read yet
    pub fn fresh(start_node: &str) -> Self {
        Self {
            current_node: start_node.to_string(),
            previous_node: None,
            previous_choice_index: None,
        }
    }

    /// Move to `next` through option `index` of the current node
    pub fn advance(&mut self, index: usize, next: &str) {
        let previous = std::mem::replace(&mut self.current_node, next.to_string());
        self.previous_node = Some(previous);
        self.previous_choice_index = Some(index);
    }

    /// Repair references to nodes the story does not have. A missing
    /// current node makes the whole state unusable.
    pub fn reconcile(self, story: &Story, start_node: &str) -> Self {
        if !story.contains(&self.current_node) {
            tracing::warn!("Saved node {} is not in the story, starting over", self.current_node);
            return Self::fresh(start_node);
        }
        let dangling = self.previous_node.as_deref().filter(|previous| !story.contains(previous));
        if let Some(previous) = dangling {
            tracing::warn!("Saved previous node {} is not in the story, dropping it", previous);
            return Self {
                previous_node: None,
                previous_choice_index: None,
                current_node: self.current_node,
            };
        }
        self
    }
}

/// Reads and writes [`NavigationState`] under a storage key
#[derive(Debug)]
pub struct ProgressStore {
    storage: Storage,
    key: String,
}

impl ProgressStore {
    pub fn new(storage: Storage, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Saved state, or a fresh one when nothing usable is stored
    pub fn load(&self, start_node: &str) -> NavigationState {
        let Some(raw) = self.storage.get_item(&self.key) else {
            return NavigationState::fresh(start_node);
        };
        match serde_json::from_str(raw) {
            Ok(state) => {
                tracing::debug!("Restored progress from {}", self.key);
                state
            }
            Err(e) => {
                tracing::warn!("Discarding corrupt progress under {}: {}", self.key, e);
                NavigationState::fresh(start_node)
            }
        }
    }

    pub fn save(&mut self, state: &NavigationState) -> Result<(), NavigationError> {
        let raw = serde_json::to_string(state)?;
        self.storage.set_item(&self.key, &raw)?;
        tracing::debug!("Saved progress at {}", state.current_node);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), NavigationError> {
        self.storage.remove_item(&self.key)?;
        Ok(())
    }
}
