use crate::error::{Result, VersionBumpError};
use regex::Regex;

/// Header of a conventional commit flagged as breaking: `type(scope)!: ...`
const BREAKING_HEADER: &str = r"^([a-zA-Z]+)(\(.+\))?(!):";

/// Commit message as seen by the decision engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub text: String,
}

impl CommitMessage {
    /// Join a commit subject and body the way the event payload reports them
    pub fn from_parts(message: &str, body: Option<&str>) -> Self {
        CommitMessage {
            text: format!("{}\n{}", message, body.unwrap_or_default()),
        }
    }

    /// Check for a conventional breaking-change marker (`feat!:`, `fix(api)!:`)
    /// using a matcher from [breaking_header_matcher]
    pub fn is_breaking_change(&self, matcher: &Regex) -> bool {
        matcher.is_match(&self.text)
    }

    /// Case-insensitive substring search for any of `words`
    ///
    /// Returns the first word (in list order) that occurs in the message.
    pub fn find_word<'w>(&self, words: &'w [String]) -> Option<&'w str> {
        let haystack = self.text.to_lowercase();
        words
            .iter()
            .filter(|word| !word.is_empty())
            .find(|word| haystack.contains(&word.to_lowercase()))
            .map(String::as_str)
    }

    pub fn contains_any(&self, words: &[String]) -> bool {
        self.find_word(words).is_some()
    }
}

impl From<&str> for CommitMessage {
    fn from(text: &str) -> Self {
        CommitMessage {
            text: text.to_string(),
        }
    }
}

impl From<String> for CommitMessage {
    fn from(text: String) -> Self {
        CommitMessage { text }
    }
}

/// Matcher for a breaking conventional header at the start of a message
pub fn breaking_header_matcher() -> Result<Regex> {
    Regex::new(BREAKING_HEADER).map_err(|e| {
        VersionBumpError::config(format!("Invalid breaking-change pattern: {}", e))
    })
}
