//! Triggering event payload (the JSON file named by `GITHUB_EVENT_PATH`)

use crate::domain::CommitMessage;
use crate::error::{Result, VersionBumpError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One commit as reported by a push event
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EventCommit {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// The parts of the event payload the decision needs
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Event {
    #[serde(default)]
    pub commits: Option<Vec<EventCommit>>,
}

impl Event {
    /// Read the event payload; a missing path yields an empty event
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Event::default());
        };

        let content = fs::read_to_string(path).map_err(|e| {
            VersionBumpError::config(format!(
                "Cannot read event payload {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| VersionBumpError::config(format!("Invalid event payload: {}", e)))
    }

    pub fn has_commits(&self) -> bool {
        self.commits.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Commit messages joined with their bodies, in event order
    pub fn messages(&self) -> Vec<String> {
        self.commits
            .iter()
            .flatten()
            .map(|c| CommitMessage::from_parts(&c.message, c.body.as_deref()).text)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_push_event() {
        let event = Event::parse(
            r#"{"ref": "refs/heads/main", "commits": [
                {"id": "abc", "message": "feat: login", "body": "oauth"},
                {"id": "def", "message": "fix: typo"}
            ]}"#,
        )
        .unwrap();

        assert!(event.has_commits());
        assert_eq!(event.messages(), vec!["feat: login\noauth", "fix: typo\n"]);
    }

    #[test]
    fn test_event_without_commits() {
        let event = Event::parse(r#"{"action": "opened"}"#).unwrap();
        assert!(!event.has_commits());
        assert!(event.messages().is_empty());
    }

    #[test]
    fn test_load_without_path() {
        assert_eq!(Event::load(None).unwrap(), Event::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("event.json");
        fs::write(&path, r#"{"commits": [{"message": "major: rewrite"}]}"#).unwrap();

        let event = Event::load(Some(&path)).unwrap();
        assert_eq!(event.messages(), vec!["major: rewrite\n"]);
    }

    #[test]
    fn test_load_invalid_payload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("event.json");
        fs::write(&path, "not json").unwrap();

        assert!(Event::load(Some(&path)).is_err());
        assert!(Event::load(Some(&temp.path().join("missing.json"))).is_err());
    }
}
