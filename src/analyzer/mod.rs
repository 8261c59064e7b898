//! Analysis engine for determining version bumps from commit messages

pub mod version_analyzer;

pub use version_analyzer::{Decision, SkipReason, VersionAnalyzer};
