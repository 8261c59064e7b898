use crate::error::{Result, VersionBumpError};
use regex::Regex;

/// Target branch for the publish step, resolved from the trigger context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
    /// The run was triggered by a pull request (remote refs must be fetched)
    pub is_pull_request: bool,
}

impl BranchContext {
    /// Create a branch context for a plain push
    pub fn new(name: impl Into<String>) -> Self {
        BranchContext {
            name: name.into(),
            is_pull_request: false,
        }
    }

    /// Resolve the branch to push to.
    ///
    /// Precedence: explicit override, then pull-request head ref, then the
    /// name part of the triggering ref (`refs/<kind>/<name>`).
    pub fn resolve(
        target_override: Option<&str>,
        head_ref: Option<&str>,
        git_ref: Option<&str>,
    ) -> Result<Self> {
        let head_ref = head_ref.filter(|r| !r.is_empty());
        let is_pull_request = head_ref.is_some();

        let name = match (target_override.filter(|b| !b.is_empty()), head_ref) {
            (Some(branch), _) => branch.to_string(),
            (None, Some(head)) => head.to_string(),
            (None, None) => {
                let git_ref = git_ref.filter(|r| !r.is_empty()).ok_or_else(|| {
                    VersionBumpError::branch("No target branch, head ref or trigger ref available")
                })?;
                branch_from_ref(git_ref)?
            }
        };

        Ok(BranchContext {
            name,
            is_pull_request,
        })
    }
}

/// Extract the name from a fully qualified ref (`refs/heads/main` -> `main`)
pub fn branch_from_ref(git_ref: &str) -> Result<String> {
    let re = Regex::new(r"refs/[a-zA-Z]+/(.*)")
        .map_err(|e| VersionBumpError::branch(format!("Invalid ref pattern: {}", e)))?;

    re.captures(git_ref)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| VersionBumpError::branch(format!("Cannot derive a branch from ref '{}'", git_ref)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_from_heads_ref() {
        assert_eq!(branch_from_ref("refs/heads/main").unwrap(), "main");
        assert_eq!(branch_from_ref("refs/heads/release/2.x").unwrap(), "release/2.x");
    }

    #[test]
    fn test_branch_from_invalid_ref() {
        assert!(branch_from_ref("main").is_err());
        assert!(branch_from_ref("refs/heads/").is_err());
    }

    #[test]
    fn test_resolve_from_push_ref() {
        let branch = BranchContext::resolve(None, None, Some("refs/heads/develop")).unwrap();
        assert_eq!(branch, BranchContext::new("develop"));
    }

    #[test]
    fn test_resolve_pull_request_head() {
        let branch =
            BranchContext::resolve(None, Some("feature/login"), Some("refs/pull/7/merge")).unwrap();
        assert_eq!(branch.name, "feature/login");
        assert!(branch.is_pull_request);
    }

    #[test]
    fn test_resolve_override_wins() {
        let branch =
            BranchContext::resolve(Some("release"), Some("feature/login"), Some("refs/heads/main"))
                .unwrap();
        assert_eq!(branch.name, "release");
        assert!(branch.is_pull_request);
    }

    #[test]
    fn test_resolve_empty_values_are_ignored() {
        let branch = BranchContext::resolve(Some(""), Some(""), Some("refs/heads/main")).unwrap();
        assert_eq!(branch, BranchContext::new("main"));
    }

    #[test]
    fn test_resolve_without_any_ref_fails() {
        assert!(BranchContext::resolve(None, None, None).is_err());
    }
}
