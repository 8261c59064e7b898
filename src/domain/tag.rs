use crate::error::{Result, VersionBumpError};
use regex::Regex;
use semver::Version;

/// Placeholder replaced by the tagged version in commit templates
pub const VERSION_PLACEHOLDER: &str = "{{version}}";

/// Tag naming with a literal prefix (e.g., "v" -> "v1.2.3")
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagPrefix {
    pub prefix: String,
}

impl TagPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        TagPrefix {
            prefix: prefix.into(),
        }
    }

    /// Format a version as a tag name
    pub fn format(&self, version: &Version) -> String {
        format!("{}{}", self.prefix, version)
    }
}

/// Commit message template for bump commits (e.g., "ci: version bump to {{version}}")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTemplate {
    pub template: String,
}

impl CommitTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        CommitTemplate {
            template: template.into(),
        }
    }

    /// Render the commit message for a tag name
    pub fn render(&self, tag: &str) -> String {
        self.template.replace(VERSION_PLACEHOLDER, tag)
    }

    /// Build a case-insensitive matcher recognising commits produced by this
    /// template, with the version generalized to `<prefix>X.Y.Z`
    pub fn bump_commit_matcher(&self, prefix: &TagPrefix) -> Result<Regex> {
        let escaped = regex::escape(&self.template);
        let version_pattern = format!(r"{}\d+\.\d+\.\d+", regex::escape(&prefix.prefix));
        let pattern = escaped.replace(&regex::escape(VERSION_PLACEHOLDER), &version_pattern);

        Regex::new(&format!("(?i){}", pattern)).map_err(|e| {
            VersionBumpError::config(format!(
                "Invalid commit message template '{}': {}",
                self.template, e
            ))
        })
    }
}
