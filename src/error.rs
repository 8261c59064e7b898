use thiserror::Error;

use crate::cli::orchestration::WorkflowStage;

/// Unified error type for version-bump operations
#[derive(Error, Debug)]
pub enum VersionBumpError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Nothing to commit, working tree clean")]
    NothingToCommit,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: WorkflowStage,
        #[source]
        source: Box<VersionBumpError>,
    },
}

/// Convenience type alias for Results in version-bump
pub type Result<T> = std::result::Result<T, VersionBumpError>;

impl VersionBumpError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        VersionBumpError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        VersionBumpError::Version(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        VersionBumpError::Manifest(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        VersionBumpError::Branch(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        VersionBumpError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        VersionBumpError::Remote(msg.into())
    }

    /// Attach the workflow stage that produced this error
    pub fn at_stage(self, stage: WorkflowStage) -> Self {
        VersionBumpError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The workflow stage this error was raised in, if any
    pub fn stage(&self) -> Option<WorkflowStage> {
        match self {
            VersionBumpError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<semver::Error> for VersionBumpError {
    fn from(err: semver::Error) -> Self {
        VersionBumpError::Version(err.to_string())
    }
}
