//! Engine errors

use std::io;
use std::path::PathBuf;

use folio_dom::DomError;
use folio_runtime::StorageError;

/// Story data could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("failed to read story file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to fetch story from {url}: {source}")]
    Http { url: url::Url, source: reqwest::Error },

    #[error("story data is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

/// A navigation request could not be honoured
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("no story is loaded")]
    StoryUnavailable,

    #[error("options are not available until the page finishes typing")]
    OptionsNotReady,

    #[error("node {node} has no option {index}")]
    NoSuchOption { node: String, index: usize },

    #[error("option {index} of {node} points to unknown node {target}")]
    UnknownNode { node: String, index: usize, target: String },

    #[error("failed to encode progress: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Invalid engine configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("config file is not valid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
