//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations the
//! publish workflow performs, allowing for multiple implementations including
//! real git repositories and mock implementations for testing.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A recording implementation for testing
//!
//! Git state is process-wide: implementations are driven strictly in program
//! order by the workflow and are not shared across threads.

pub mod mock;
pub mod remote;
pub mod repository;

pub use mock::{GitOp, MockRepository};
pub use remote::RemoteSpec;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// Whether a branch can be checked out or must be created first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchLookup {
    /// A local branch, or a remote-tracking `origin/<branch>` to start one from
    Exists,
    /// Neither exists; the branch is created at the current HEAD
    NeedsCreation,
}

/// Common git operation trait for abstraction
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to the matching
/// [crate::error::VersionBumpError] variants.
pub trait Repository {
    /// Record the identity used for commits (`user.name`, `user.email`)
    fn configure_identity(&self, name: &str, email: &str) -> Result<()>;

    /// Stage all tracked modifications and commit them on HEAD
    ///
    /// # Returns
    /// * `Ok(Oid)` - The new commit
    /// * `Err(VersionBumpError::NothingToCommit)` - The tree is unchanged
    fn commit_all(&self, message: &str) -> Result<Oid>;

    /// Fetch branch heads from the remote into `refs/remotes/origin/*`
    fn fetch(&self, remote: &RemoteSpec) -> Result<()>;

    /// Look up a branch by name
    fn lookup_branch(&self, name: &str) -> Result<BranchLookup>;

    /// Check out an existing branch (local, or created from `origin/<name>`)
    fn checkout_branch(&self, name: &str) -> Result<()>;

    /// Create a branch at the current HEAD and check it out
    fn create_branch(&self, name: &str) -> Result<()>;

    /// Create a lightweight tag at HEAD
    ///
    /// Fails when the tag already exists.
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Push a branch, with the given tags following it in the same push
    fn push_branch(&self, remote: &RemoteSpec, branch: &str, follow_tags: &[&str]) -> Result<()>;

    /// Push tags to remote
    fn push_tags(&self, remote: &RemoteSpec, tag_names: &[&str]) -> Result<()>;
}
