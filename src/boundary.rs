use std::fmt;

use crate::cli::orchestration::WorkflowStage;

/// Non-fatal conditions met while deciding and applying a bump.
/// These are reported to the user but never stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The event payload carries no commits; the default level applies
    NoCommitsInEvent { default_bump: String },
    /// A version commit could not be made (e.g., nothing changed)
    CommitSkipped { stage: WorkflowStage, reason: String },
    /// The target branch did not exist and was created at HEAD
    BranchCreated { branch: String },
    /// A package ended on a different version than the others
    DivergentVersion {
        package: String,
        version: String,
        expected: String,
    },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoCommitsInEvent { default_bump } => write!(
                f,
                "No commits found in the event, using the default bump '{}'",
                default_bump
            ),
            BoundaryWarning::CommitSkipped { stage, reason } => {
                write!(f, "Skipped the {} commit: {}", stage, reason)
            }
            BoundaryWarning::BranchCreated { branch } => {
                write!(f, "Branch '{}' did not exist and was created at HEAD", branch)
            }
            BoundaryWarning::DivergentVersion {
                package,
                version,
                expected,
            } => write!(
                f,
                "Package '{}' is at {} while the others are at {}",
                package, version, expected
            ),
        }
    }
}
