//! Story graph
//!
//! A story is a JSON object keyed by node id:
//!
//! ```json
//! { "portada": { "text": "...", "options": [{ "text": "...", "next": "c1" }] },
//!   "c1": { "text": "...", "isEnding": true } }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::StoryError;

/// A choice leading to another node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryOption {
    /// Markup shown on the choice button
    pub text: String,
    /// Target node id
    pub next: String,
}

/// One page of the story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryNode {
    /// Page markup
    pub text: String,
    #[serde(default)]
    pub options: Vec<StoryOption>,
    #[serde(default)]
    pub is_ending: bool,
}

/// Dangling reference found when a story is loaded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityIssue {
    #[error("start node {0} does not exist")]
    MissingStartNode(String),

    #[error("option {index} of {node} points to unknown node {target}")]
    DanglingOption { node: String, index: usize, target: String },
}

/// Where story data comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorySource {
    File(PathBuf),
    Url(Url),
}

impl StorySource {
    /// `http(s)` URLs are fetched, `file` URLs name a local path and
    /// anything else is a file path as written
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Self::File(path),
                Err(()) => Self::File(PathBuf::from(location)),
            },
            _ => Self::File(PathBuf::from(location)),
        }
    }
}

impl fmt::Display for StorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// The whole story graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Story {
    nodes: BTreeMap<String, StoryNode>,
}

impl Story {
    pub fn from_json(raw: &str) -> Result<Self, StoryError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read or fetch the story
    pub fn load(source: &StorySource) -> Result<Self, StoryError> {
        let raw = match source {
            StorySource::File(path) => std::fs::read_to_string(path).map_err(|source| StoryError::Io {
                path: path.clone(),
                source,
            })?,
            StorySource::Url(url) => fetch(url)?,
        };
        let story = Self::from_json(&raw)?;
        tracing::info!("Loaded story with {} nodes from {}", story.len(), source);
        Ok(story)
    }

    pub fn get(&self, id: &str) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, id: impl Into<String>, node: StoryNode) {
        self.nodes.insert(id.into(), node);
    }

    /// Whether following `option` lands on an ending. Unknown targets are
    /// not endings.
    pub fn leads_to_ending(&self, option: &StoryOption) -> bool {
        self.get(&option.next).is_some_and(|node| node.is_ending)
    }

    /// Every dangling reference, in node id order
    pub fn integrity_report(&self, start_node: &str) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        if !self.contains(start_node) {
            issues.push(IntegrityIssue::MissingStartNode(start_node.to_string()));
        }
        for (id, node) in &self.nodes {
            for (index, option) in node.options.iter().enumerate() {
                if !self.contains(&option.next) {
                    issues.push(IntegrityIssue::DanglingOption {
                        node: id.clone(),
                        index,
                        target: option.next.clone(),
                    });
                }
            }
        }
        issues
    }
}

fn fetch(url: &Url) -> Result<String, StoryError> {
    tracing::debug!("Fetching story from {}", url);
    let http = |source: reqwest::Error| StoryError::Http { url: url.clone(), source };
    reqwest::blocking::get(url.clone())
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(http)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY: &str = r#"{
        "portada": {
            "text": "Hello",
            "options": [
                { "text": "Go on", "next": "c1" },
                { "text": "Give up", "next": "end" }
            ]
        },
        "c1": { "text": "<glitch>ERROR</glitch>", "options": [{ "text": "Back", "next": "portada" }] },
        "end": { "text": "The end.", "isEnding": true }
    }"#;

    #[test]
    fn test_from_json() {
        let story = Story::from_json(STORY).unwrap();
        assert_eq!(story.len(), 3);
        let portada = story.get("portada").unwrap();
        assert_eq!(portada.options.len(), 2);
        assert!(!portada.is_ending);
        assert!(story.get("end").unwrap().is_ending);
        assert!(story.get("end").unwrap().options.is_empty());
    }

    #[test]
    fn test_leads_to_ending() {
        let story = Story::from_json(STORY).unwrap();
        let options = &story.get("portada").unwrap().options;
        assert!(!story.leads_to_ending(&options[0]));
        assert!(story.leads_to_ending(&options[1]));
        assert!(!story.leads_to_ending(&StoryOption { text: "x".into(), next: "nowhere".into() }));
    }

    #[test]
    fn test_integrity_report() {
        let mut story = Story::from_json(STORY).unwrap();
        assert!(story.integrity_report("portada").is_empty());

        story.insert(
            "broken",
            StoryNode {
                text: String::new(),
                options: vec![StoryOption { text: "?".into(), next: "missing".into() }],
                is_ending: false,
            },
        );
        assert_eq!(
            story.integrity_report("start"),
            vec![
                IntegrityIssue::MissingStartNode("start".into()),
                IntegrityIssue::DanglingOption {
                    node: "broken".into(),
                    index: 0,
                    target: "missing".into()
                },
            ]
        );
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Story::from_json("[1, 2]"), Err(StoryError::Json(_))));
        assert!(Story::from_json(r#"{"a": {"options": []}}"#).is_err());
    }

    #[test]
    fn test_source_parse() {
        assert!(matches!(StorySource::parse("https://example.com/story.json"), StorySource::Url(_)));
        assert!(matches!(StorySource::parse("storyNodes.json"), StorySource::File(_)));
        assert!(matches!(StorySource::parse("/tmp/story.json"), StorySource::File(_)));
        assert_eq!(
            StorySource::parse("file:///tmp/story%20one.json"),
            StorySource::File(PathBuf::from("/tmp/story one.json"))
        );
    }

    #[test]
    fn test_load_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.json");
        std::fs::write(&path, STORY).unwrap();
        let location = Url::from_file_path(&path).unwrap();

        let source = StorySource::parse(location.as_str());
        assert_eq!(source, StorySource::File(path));
        assert_eq!(Story::load(&source).unwrap().len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = StorySource::File(dir.path().join("absent.json"));
        assert!(matches!(Story::load(&source), Err(StoryError::Io { .. })));
    }
}
