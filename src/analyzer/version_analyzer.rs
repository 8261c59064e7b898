use crate::config::{Config, WordingConfig};
use crate::domain::{
    breaking_header_matcher, resolve_preid, BumpDirective, BumpLevel, CommitMessage,
};
use crate::error::Result;
use regex::Regex;
use std::fmt;
use tracing::{debug, info};

/// Why a run ends without a bump
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A commit message contains the configured skip phrase
    SkipPhrase(String),
    /// A commit message was produced by a previous bump
    PreviousBump,
    /// Default is `prerelease` but no prerelease keyword was found
    NoKeywords,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SkipPhrase(phrase) => write!(
                f,
                "No action necessary because we found '{}' in commit message!",
                phrase
            ),
            SkipReason::PreviousBump => {
                write!(f, "No action necessary because we found a previous bump!")
            }
            SkipReason::NoKeywords => write!(f, "No version keywords found, skipping bump."),
        }
    }
}

/// Outcome of analysing a set of commit messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub directive: BumpDirective,
    pub skip: Option<SkipReason>,
}

impl Decision {
    fn bump(directive: BumpDirective) -> Self {
        Decision {
            directive,
            skip: None,
        }
    }

    fn skip(reason: SkipReason) -> Self {
        Decision {
            directive: BumpDirective::NoBump,
            skip: Some(reason),
        }
    }
}

/// Analyzes commit messages to determine the version bump
pub struct VersionAnalyzer {
    wording: WordingConfig,
    default_bump: BumpLevel,
    preid: Option<String>,
    skip_phrase: Option<String>,
    bump_commit: Regex,
    breaking_header: Regex,
}

impl VersionAnalyzer {
    /// Create a new version analyzer
    ///
    /// Fails when the commit message template cannot be turned into a matcher.
    pub fn new(config: &Config) -> Result<Self> {
        let bump_commit = config
            .commit_template()
            .bump_commit_matcher(&config.tag_prefix())?;
        let breaking_header = breaking_header_matcher()?;

        Ok(VersionAnalyzer {
            wording: config.wording.clone(),
            default_bump: config.default_bump,
            preid: config.preid.clone(),
            skip_phrase: config
                .skip_if_commit_contains
                .clone()
                .filter(|phrase| !phrase.is_empty()),
            bump_commit,
            breaking_header,
        })
    }

    /// Decide the bump directive for the given messages
    pub fn decide<S: AsRef<str>>(&self, messages: &[S]) -> BumpDirective {
        self.analyze(messages).directive
    }

    /// Analyze commit messages and determine the version bump, keeping the
    /// reason when the run should be skipped
    pub fn analyze<S: AsRef<str>>(&self, messages: &[S]) -> Decision {
        let commits: Vec<CommitMessage> = messages
            .iter()
            .map(|m| CommitMessage::from(m.as_ref()))
            .collect();

        if let Some(phrase) = &self.skip_phrase {
            let joined = commits
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(",")
                .to_lowercase();
            if joined.contains(&phrase.to_lowercase()) {
                return Decision::skip(SkipReason::SkipPhrase(phrase.clone()));
            }
        }

        if commits.iter().any(|c| self.bump_commit.is_match(&c.text)) {
            return Decision::skip(SkipReason::PreviousBump);
        }

        let directive = self.waterfall(&commits);
        info!(directive = ?directive, "version action after first waterfall");

        let decision = match directive {
            Some(directive) => Decision::bump(directive),
            None => self.fallback(),
        };
        info!(directive = %decision.directive, "version action after final decision");
        decision
    }

    /// Keyword matching in priority order; `None` when nothing matched
    fn waterfall(&self, commits: &[CommitMessage]) -> Option<BumpDirective> {
        if commits.iter().any(|c| {
            c.is_breaking_change(&self.breaking_header) || c.contains_any(&self.wording.major)
        }) {
            debug!("matched major wording");
            return Some(BumpDirective::Major);
        }

        if commits.iter().any(|c| c.contains_any(&self.wording.minor)) {
            debug!("matched minor wording");
            return Some(BumpDirective::Minor);
        }

        if !self.wording.patch.is_empty()
            && commits.iter().any(|c| c.contains_any(&self.wording.patch))
        {
            debug!("matched patch wording");
            return Some(BumpDirective::Patch);
        }

        if let Some(keyword) = commits
            .iter()
            .find_map(|c| c.find_word(&self.wording.prerelease))
        {
            debug!(keyword, "matched prerelease wording");
            return Some(BumpDirective::Prerelease {
                preid: resolve_preid(Some(keyword), self.preid.as_deref()),
            });
        }

        None
    }

    fn fallback(&self) -> Decision {
        if self.default_bump == BumpLevel::Prerelease && !self.wording.prerelease.is_empty() {
            return Decision::skip(SkipReason::NoKeywords);
        }

        Decision::bump(BumpDirective::from_level(
            self.default_bump,
            resolve_preid(None, self.preid.as_deref()).as_deref(),
        ))
    }
}
