use crate::domain::{BumpLevel, CommitTemplate, TagPrefix};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// File looked up in the working directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "version-bump.toml";

pub const INPUT_DEFAULT: &str = "INPUT_DEFAULT";
pub const INPUT_MAJOR_WORDING: &str = "INPUT_MAJOR-WORDING";
pub const INPUT_MINOR_WORDING: &str = "INPUT_MINOR-WORDING";
pub const INPUT_PATCH_WORDING: &str = "INPUT_PATCH-WORDING";
pub const INPUT_RC_WORDING: &str = "INPUT_RC-WORDING";
pub const INPUT_SKIP_IF_COMMIT_CONTAINS: &str = "INPUT_SKIP-IF-COMMIT-CONTAINS";
pub const INPUT_COMMIT_MESSAGE: &str = "INPUT_COMMIT-MESSAGE";
pub const INPUT_TAG_PREFIX: &str = "INPUT_TAG-PREFIX";
pub const INPUT_PUSH: &str = "INPUT_PUSH";
pub const INPUT_SKIP_TAG: &str = "INPUT_SKIP-TAG";
pub const INPUT_TARGET_BRANCH: &str = "INPUT_TARGET-BRANCH";
pub const INPUT_PREID: &str = "INPUT_PREID";
pub const INPUT_AUTHOR_NAME: &str = "GITHUB_USER";
pub const INPUT_AUTHOR_EMAIL: &str = "GITHUB_EMAIL";

/// Represents the complete configuration for version-bump.
///
/// Contains the keyword lists driving the bump decision, commit and tag
/// formatting, and publish behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Bump applied when no keyword matches
    #[serde(default)]
    pub default_bump: BumpLevel,

    /// Prerelease identifier used for `prerelease` bumps without a keyword override
    #[serde(default)]
    pub preid: Option<String>,

    /// Phrase that cancels the run when found in any commit message
    #[serde(default)]
    pub skip_if_commit_contains: Option<String>,

    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    #[serde(default)]
    pub tag_prefix: String,

    #[serde(default)]
    pub wording: WordingConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,

    #[serde(default)]
    pub author: AuthorConfig,
}

fn default_commit_message() -> String {
    "ci: version bump to {{version}}".to_string()
}

fn default_major_words() -> Vec<String> {
    vec!["BREAKING CHANGE".to_string(), "major".to_string()]
}

fn default_minor_words() -> Vec<String> {
    vec!["feat".to_string(), "minor".to_string()]
}

fn default_prerelease_words() -> Vec<String> {
    vec![
        "rc-alpha".to_string(),
        "rc-beta".to_string(),
        "rc-rc".to_string(),
    ]
}

/// Keywords mapping commit messages to bump categories.
///
/// Matching is a case-insensitive substring search. Empty lists never match.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WordingConfig {
    #[serde(default = "default_major_words")]
    pub major: Vec<String>,

    #[serde(default = "default_minor_words")]
    pub minor: Vec<String>,

    #[serde(default)]
    pub patch: Vec<String>,

    #[serde(default = "default_prerelease_words")]
    pub prerelease: Vec<String>,
}

impl Default for WordingConfig {
    fn default() -> Self {
        WordingConfig {
            major: default_major_words(),
            minor: default_minor_words(),
            patch: Vec::new(),
            prerelease: default_prerelease_words(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Controls what the publish step is allowed to do.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    /// When false the run stops after the decision
    #[serde(default = "default_true")]
    pub push: bool,

    #[serde(default)]
    pub skip_tag: bool,

    /// Branch to push to instead of the one derived from the trigger
    #[serde(default)]
    pub target_branch: Option<String>,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            push: true,
            skip_tag: false,
            target_branch: None,
        }
    }
}

fn default_author_name() -> String {
    "Automated Version Bump".to_string()
}

fn default_author_email() -> String {
    "version-bump@users.noreply.github.com".to_string()
}

/// Identity recorded on bump commits.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AuthorConfig {
    #[serde(default = "default_author_name")]
    pub name: String,

    #[serde(default = "default_author_email")]
    pub email: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        AuthorConfig {
            name: default_author_name(),
            email: default_author_email(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_bump: BumpLevel::default(),
            preid: None,
            skip_if_commit_contains: None,
            commit_message: default_commit_message(),
            tag_prefix: String::new(),
            wording: WordingConfig::default(),
            behavior: BehaviorConfig::default(),
            author: AuthorConfig::default(),
        }
    }
}

/// Split a comma-separated input into trimmed, non-empty words
pub fn parse_word_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Config {
    pub fn tag_prefix(&self) -> TagPrefix {
        TagPrefix::new(self.tag_prefix.clone())
    }

    pub fn commit_template(&self) -> CommitTemplate {
        CommitTemplate::new(self.commit_message.clone())
    }

    /// Overlay action inputs (`INPUT_*` variables) on top of this configuration.
    ///
    /// Keyword lists given as inputs replace the configured lists, even when
    /// empty. Empty string inputs for optional settings clear nothing and are
    /// treated as not provided.
    pub fn apply_inputs(&mut self, inputs: &HashMap<String, String>) -> Result<()> {
        let get = |key: &str| inputs.get(key).map(String::as_str);

        if let Some(level) = get(INPUT_DEFAULT).and_then(non_empty) {
            self.default_bump = level.parse()?;
        }
        if let Some(words) = get(INPUT_MAJOR_WORDING) {
            self.wording.major = parse_word_list(words);
        }
        if let Some(words) = get(INPUT_MINOR_WORDING) {
            self.wording.minor = parse_word_list(words);
        }
        if let Some(words) = get(INPUT_PATCH_WORDING) {
            self.wording.patch = parse_word_list(words);
        }
        if let Some(words) = get(INPUT_RC_WORDING) {
            self.wording.prerelease = parse_word_list(words);
        }
        if let Some(phrase) = get(INPUT_SKIP_IF_COMMIT_CONTAINS).and_then(non_empty) {
            self.skip_if_commit_contains = Some(phrase);
        }
        if let Some(message) = get(INPUT_COMMIT_MESSAGE).and_then(non_empty) {
            self.commit_message = message;
        }
        if let Some(prefix) = get(INPUT_TAG_PREFIX) {
            self.tag_prefix = prefix.trim().to_string();
        }
        if let Some(push) = get(INPUT_PUSH).and_then(non_empty) {
            self.behavior.push = !push.eq_ignore_ascii_case("false");
        }
        if let Some(skip_tag) = get(INPUT_SKIP_TAG).and_then(non_empty) {
            self.behavior.skip_tag = skip_tag.eq_ignore_ascii_case("true");
        }
        if let Some(branch) = get(INPUT_TARGET_BRANCH).and_then(non_empty) {
            self.behavior.target_branch = Some(branch);
        }
        if let Some(preid) = get(INPUT_PREID).and_then(non_empty) {
            self.preid = Some(preid);
        }
        if let Some(name) = get(INPUT_AUTHOR_NAME).and_then(non_empty) {
            self.author.name = name;
        }
        if let Some(email) = get(INPUT_AUTHOR_EMAIL).and_then(non_empty) {
            self.author.email = email;
        }

        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `version-bump.toml` in current directory
/// 3. `.version-bump.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
