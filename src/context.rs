//! Run context: where the packages live and how to reach the remote
//!
//! Everything the workflow would otherwise read from the process environment
//! is collected here once, so the rest of the crate works from explicit
//! values.

use crate::git::RemoteSpec;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const GITHUB_REF: &str = "GITHUB_REF";
pub const GITHUB_HEAD_REF: &str = "GITHUB_HEAD_REF";
pub const GITHUB_ACTOR: &str = "GITHUB_ACTOR";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const GITHUB_SERVER_URL: &str = "GITHUB_SERVER_URL";

const DEFAULT_SERVER_URL: &str = "https://github.com";
/// Remote used when no repository is named
const DEFAULT_REMOTE: &str = "origin";

/// Inputs describing a single run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Directory holding the root `package.json` (or `lerna.json`)
    pub package_root: PathBuf,
    /// Path to the triggering event payload
    pub event_path: Option<PathBuf>,
    /// Fully qualified ref that triggered the run
    pub git_ref: Option<String>,
    /// Head branch of a pull request
    pub head_ref: Option<String>,
    pub remote: RemoteSpec,
}

impl RunContext {
    /// Build the context from a variable map (usually the process environment)
    ///
    /// `package_dir`, when set, is resolved against `workspace`.
    pub fn from_vars(
        vars: &HashMap<String, String>,
        workspace: &Path,
        package_dir: Option<&str>,
        event_path: Option<PathBuf>,
    ) -> Self {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let package_root = match package_dir.map(str::trim).filter(|d| !d.is_empty()) {
            Some(dir) => workspace.join(dir),
            None => workspace.to_path_buf(),
        };

        let remote = match get(GITHUB_REPOSITORY) {
            Some(repository) => RemoteSpec::github(
                get(GITHUB_SERVER_URL).as_deref().unwrap_or(DEFAULT_SERVER_URL),
                &repository,
                get(GITHUB_ACTOR).as_deref(),
                get(GITHUB_TOKEN).as_deref(),
            ),
            None => RemoteSpec::new(DEFAULT_REMOTE),
        };

        RunContext {
            package_root,
            event_path,
            git_ref: get(GITHUB_REF),
            head_ref: get(GITHUB_HEAD_REF),
            remote,
        }
    }
}
