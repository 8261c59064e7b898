use crate::error::{Result, VersionBumpError};
use crate::git::{BranchLookup, RemoteSpec, Repository};
use git2::Oid;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// A git operation recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOp {
    ConfigureIdentity { name: String, email: String },
    Commit { message: String },
    Fetch { url: String },
    Checkout { branch: String },
    CreateBranch { branch: String },
    Tag { name: String },
    PushBranch { branch: String, tags: Vec<String> },
    PushTags { tags: Vec<String> },
}

#[derive(Debug, Default)]
struct MockState {
    ops: Vec<GitOp>,
    branches: HashSet<String>,
    tags: HashSet<String>,
    commits: u8,
}

/// Mock repository for testing without actual git operations
///
/// Records every operation in order and keeps just enough state (branches
/// and tags) to reproduce the failures the workflow has to handle.
#[derive(Debug, Default)]
pub struct MockRepository {
    state: Mutex<MockState>,
    nothing_to_commit: bool,
    fail_fetch: bool,
    fail_push: bool,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing branch (local or on the remote)
    pub fn with_branch(self, name: impl Into<String>) -> Self {
        self.lock().branches.insert(name.into());
        self
    }

    /// Add an existing tag
    pub fn with_tag(self, name: impl Into<String>) -> Self {
        self.lock().tags.insert(name.into());
        self
    }

    /// Make every commit report an unchanged tree
    pub fn with_nothing_to_commit(mut self) -> Self {
        self.nothing_to_commit = true;
        self
    }

    pub fn with_failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn with_failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    /// Operations performed so far, in order
    pub fn ops(&self) -> Vec<GitOp> {
        self.lock().ops.clone()
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.lock().tags.contains(name)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, op: GitOp) {
        self.lock().ops.push(op);
    }
}

impl Repository for MockRepository {
    fn configure_identity(&self, name: &str, email: &str) -> Result<()> {
        self.record(GitOp::ConfigureIdentity {
            name: name.to_string(),
            email: email.to_string(),
        });
        Ok(())
    }

    fn commit_all(&self, message: &str) -> Result<Oid> {
        if self.nothing_to_commit {
            return Err(VersionBumpError::NothingToCommit);
        }

        let mut state = self.lock();
        state.ops.push(GitOp::Commit {
            message: message.to_string(),
        });
        state.commits = state.commits.wrapping_add(1);
        Ok(Oid::from_bytes(&[state.commits; 20])?)
    }

    fn fetch(&self, remote: &RemoteSpec) -> Result<()> {
        if self.fail_fetch {
            return Err(VersionBumpError::remote(format!(
                "Fetch from {} failed: connection refused",
                remote
            )));
        }
        self.record(GitOp::Fetch {
            url: remote.url.clone(),
        });
        Ok(())
    }

    fn lookup_branch(&self, name: &str) -> Result<BranchLookup> {
        if self.lock().branches.contains(name) {
            Ok(BranchLookup::Exists)
        } else {
            Ok(BranchLookup::NeedsCreation)
        }
    }

    fn checkout_branch(&self, name: &str) -> Result<()> {
        if !self.lock().branches.contains(name) {
            return Err(VersionBumpError::branch(format!(
                "Cannot find branch '{}'",
                name
            )));
        }
        self.record(GitOp::Checkout {
            branch: name.to_string(),
        });
        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state.branches.insert(name.to_string());
        state.ops.push(GitOp::CreateBranch {
            branch: name.to_string(),
        });
        Ok(())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        if !state.tags.insert(name.to_string()) {
            return Err(VersionBumpError::tag(format!(
                "Tag '{}' already exists",
                name
            )));
        }
        state.ops.push(GitOp::Tag {
            name: name.to_string(),
        });
        Ok(())
    }

    fn push_branch(&self, remote: &RemoteSpec, branch: &str, follow_tags: &[&str]) -> Result<()> {
        if self.fail_push {
            return Err(VersionBumpError::remote(format!(
                "Push to {} rejected: refs/heads/{}: non-fast-forward",
                remote, branch
            )));
        }
        self.record(GitOp::PushBranch {
            branch: branch.to_string(),
            tags: follow_tags.iter().map(|t| t.to_string()).collect(),
        });
        Ok(())
    }

    fn push_tags(&self, remote: &RemoteSpec, tag_names: &[&str]) -> Result<()> {
        if self.fail_push {
            return Err(VersionBumpError::remote(format!(
                "Push to {} rejected",
                remote
            )));
        }
        self.record(GitOp::PushTags {
            tags: tag_names.iter().map(|t| t.to_string()).collect(),
        });
        Ok(())
    }
}
