use crate::error::{Result, VersionBumpError};
use crate::git::{BranchLookup, RemoteSpec};
use git2::build::CheckoutBuilder;
use git2::{
    BranchType, ConfigLevel, Cred, CredentialType, ErrorCode, FetchOptions, Oid, PushOptions,
    RemoteCallbacks, Repository as Git2Repo,
};
use std::cell::RefCell;
use std::path::Path;
use tracing::{debug, info};

/// Refspec mapping remote branch heads to `origin/*` tracking refs
const FETCH_REFSPEC: &str = "+refs/heads/*:refs/remotes/origin/*";
const TRACKING_REMOTE: &str = "origin";

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path.as_ref()).map_err(|e| {
            VersionBumpError::config(format!(
                "Not in a git repository ({}): {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn tracking_name(name: &str) -> String {
        format!("{}/{}", TRACKING_REMOTE, name)
    }

    fn has_branch(&self, name: &str, branch_type: BranchType) -> Result<bool> {
        match self.repo.find_branch(name, branch_type) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(VersionBumpError::branch(format!(
                "Cannot look up branch '{}': {}",
                name, e
            ))),
        }
    }

    /// The configured remote named by `url` (e.g. `origin`), else an anonymous one
    fn remote(&self, remote: &RemoteSpec) -> Result<git2::Remote<'_>> {
        match self.repo.find_remote(&remote.url) {
            Ok(named) => Ok(named),
            Err(_) => Ok(self.repo.remote_anonymous(&remote.authenticated_url())?),
        }
    }

    fn push_refspecs(&self, remote: &RemoteSpec, refspecs: &[String]) -> Result<()> {
        let mut git_remote = self.remote(remote)?;
        let rejected = RefCell::new(Vec::new());

        {
            let mut callbacks = remote_callbacks(remote);
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    rejected
                        .borrow_mut()
                        .push(format!("{}: {}", refname, message));
                }
                Ok(())
            });

            let mut push_options = PushOptions::new();
            push_options.remote_callbacks(callbacks);

            let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();
            git_remote
                .push(&refspec_strs, Some(&mut push_options))
                .map_err(|e| VersionBumpError::remote(format!("Push to {} failed: {}", remote, e)))?;
        }

        let rejected = rejected.into_inner();
        if !rejected.is_empty() {
            return Err(VersionBumpError::remote(format!(
                "Push to {} rejected: {}",
                remote,
                rejected.join("; ")
            )));
        }

        info!(
            remote = %remote,
            refspecs = ?refspecs,
            authenticated = remote.has_credentials(),
            "pushed"
        );
        Ok(())
    }
}

/// Credentials for HTTPS remotes: the token as password, tried once
fn remote_callbacks(remote: &RemoteSpec) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempted = false;

    callbacks.credentials(move |_url, username_from_url, allowed_types| {
        if attempted {
            return Err(git2::Error::from_str(&format!(
                "Authentication failed for {}",
                remote
            )));
        }
        attempted = true;

        match &remote.token {
            Some(token) if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) => {
                let user = remote
                    .username
                    .as_deref()
                    .or(username_from_url)
                    .unwrap_or("x-access-token");
                Cred::userpass_plaintext(user, token)
            }
            _ => Cred::default(),
        }
    });

    callbacks
}

impl super::Repository for Git2Repository {
    fn configure_identity(&self, name: &str, email: &str) -> Result<()> {
        let mut config = self.repo.config()?.open_level(ConfigLevel::Local)?;
        config.set_str("user.name", name)?;
        config.set_str("user.email", email)?;
        debug!(name, email, "configured git identity");
        Ok(())
    }

    fn commit_all(&self, message: &str) -> Result<Oid> {
        let mut index = self.repo.index()?;
        index.update_all(["*"], None)?;
        index.write()?;
        let tree_id = index.write_tree()?;

        let parent = self.repo.head()?.peel_to_commit()?;
        if parent.tree_id() == tree_id {
            return Err(VersionBumpError::NothingToCommit);
        }

        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;

        info!(commit = %oid, message, "committed");
        Ok(oid)
    }

    fn fetch(&self, remote: &RemoteSpec) -> Result<()> {
        let mut git_remote = self.remote(remote)?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(remote));

        git_remote
            .fetch(&[FETCH_REFSPEC], Some(&mut fetch_options), None)
            .map_err(|e| VersionBumpError::remote(format!("Fetch from {} failed: {}", remote, e)))?;

        info!(remote = %remote, "fetched");
        Ok(())
    }

    fn lookup_branch(&self, name: &str) -> Result<BranchLookup> {
        if self.has_branch(name, BranchType::Local)?
            || self.has_branch(&Self::tracking_name(name), BranchType::Remote)?
        {
            Ok(BranchLookup::Exists)
        } else {
            Ok(BranchLookup::NeedsCreation)
        }
    }

    fn checkout_branch(&self, name: &str) -> Result<()> {
        if !self.has_branch(name, BranchType::Local)? {
            let tracking = Self::tracking_name(name);
            let upstream = self
                .repo
                .find_branch(&tracking, BranchType::Remote)
                .map_err(|e| {
                    VersionBumpError::branch(format!("Cannot find branch '{}': {}", name, e))
                })?;
            let commit = upstream.get().peel_to_commit()?;
            let mut branch = self.repo.branch(name, &commit, false)?;
            if let Err(e) = branch.set_upstream(Some(&tracking)) {
                debug!(branch = name, error = %e, "could not set upstream");
            }
        }

        let refname = format!("refs/heads/{}", name);
        let target = self.repo.revparse_single(&refname)?;
        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))
            .map_err(|e| {
                VersionBumpError::branch(format!("Cannot check out '{}': {}", name, e))
            })?;
        self.repo.set_head(&refname)?;

        info!(branch = name, "checked out branch");
        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.branch(name, &head, true).map_err(|e| {
            VersionBumpError::branch(format!("Cannot create branch '{}': {}", name, e))
        })?;
        self.repo.set_head(&format!("refs/heads/{}", name))?;

        info!(branch = name, commit = %head.id(), "created branch at HEAD");
        Ok(())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;

        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .map_err(|e| match e.code() {
                ErrorCode::Exists => VersionBumpError::tag(format!("Tag '{}' already exists", name)),
                _ => VersionBumpError::tag(format!("Cannot create tag '{}': {}", name, e)),
            })?;

        info!(tag = name, commit = %head.id(), "created tag");
        Ok(())
    }

    fn push_branch(&self, remote: &RemoteSpec, branch: &str, follow_tags: &[&str]) -> Result<()> {
        let mut refspecs = vec![format!("refs/heads/{}:refs/heads/{}", branch, branch)];
        refspecs.extend(
            follow_tags
                .iter()
                .map(|tag| format!("refs/tags/{}:refs/tags/{}", tag, tag)),
        );
        self.push_refspecs(remote, &refspecs)
    }

    fn push_tags(&self, remote: &RemoteSpec, tag_names: &[&str]) -> Result<()> {
        let refspecs: Vec<String> = tag_names
            .iter()
            .map(|tag| format!("refs/tags/{}:refs/tags/{}", tag, tag))
            .collect();
        self.push_refspecs(remote, &refspecs)
    }
}
