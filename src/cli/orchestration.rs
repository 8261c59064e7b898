//! Main workflow orchestration logic
//!
//! Two layers:
//! - [run] turns configuration and the run context into an [Outcome]:
//!   discovery, decision, and the early exits (skip, push disabled, dry run)
//! - [run_publish_workflow] applies a decided bump: manifests, commits, branch,
//!   tag and push, against any [Repository] implementation

use std::fmt;
use std::path::Path;

use semver::Version;
use tracing::{info, warn};

use crate::analyzer::VersionAnalyzer;
use crate::boundary::BoundaryWarning;
use crate::config::{AuthorConfig, Config};
use crate::context::RunContext;
use crate::domain::{BranchContext, BumpDirective, CommitTemplate, TagPrefix};
use crate::error::Result;
use crate::event::Event;
use crate::git::{BranchLookup, RemoteSpec, Repository};
use crate::manifest::{bump_all, set_version_all, BumpReport, Workspace};

/// Steps of the publish workflow, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    ConfigureIdentity,
    NormalizeDetached,
    BumpDetached,
    CommitDetached,
    ResolveBranch,
    CheckoutBranch,
    NormalizeBranch,
    BumpBranch,
    WriteMonorepoDescriptor,
    CommitBranch,
    Tag,
    Push,
}

impl WorkflowStage {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowStage::ConfigureIdentity => "configure-identity",
            WorkflowStage::NormalizeDetached => "normalize-detached",
            WorkflowStage::BumpDetached => "bump-detached",
            WorkflowStage::CommitDetached => "commit-detached",
            WorkflowStage::ResolveBranch => "resolve-branch",
            WorkflowStage::CheckoutBranch => "checkout-branch",
            WorkflowStage::NormalizeBranch => "normalize-branch",
            WorkflowStage::BumpBranch => "bump-branch",
            WorkflowStage::WriteMonorepoDescriptor => "write-monorepo-descriptor",
            WorkflowStage::CommitBranch => "commit-branch",
            WorkflowStage::Tag => "tag",
            WorkflowStage::Push => "push",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

trait AtStage<T> {
    fn at(self, stage: WorkflowStage) -> Result<T>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: WorkflowStage) -> Result<T> {
        self.map_err(|e| e.at_stage(stage))
    }
}

/// Where the target branch comes from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchSource {
    /// Explicit target branch
    pub target_override: Option<String>,
    /// Pull request head branch
    pub head_ref: Option<String>,
    /// Ref that triggered the run
    pub git_ref: Option<String>,
}

/// Arguments for the publish workflow
///
/// Everything the workflow needs, decoupled from clap and the environment so
/// the workflow can be driven programmatically.
#[derive(Debug, Clone)]
pub struct PublishWorkflowArgs {
    /// The decided bump
    pub directive: BumpDirective,

    /// Packages to bump and the version they start from
    pub workspace: Workspace,

    pub branch: BranchSource,

    /// Remote for fetch/push
    pub remote: RemoteSpec,

    pub tag_prefix: TagPrefix,

    pub commit_template: CommitTemplate,

    /// Create and push a tag for the new version
    pub create_tag: bool,

    /// Identity for the bump commits
    pub author: AuthorConfig,
}

/// Result of a successful publish workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// Tag name for the new version (`tagPrefix + version`)
    pub tag: String,

    pub version: Version,

    /// The branch that received the bump
    pub branch: String,

    /// Whether the tag was created
    pub tagged: bool,

    /// Whether the branch (and tag) were pushed
    pub pushed: bool,

    pub warnings: Vec<BoundaryWarning>,
}

/// Main publish workflow
///
/// 1. Configure the commit identity
/// 2. Normalize and bump every package in the checked-out (detached) state,
///    then commit
/// 3. Switch to the target branch, creating it when missing
/// 4. Normalize and bump again, update `lerna.json` in monorepo mode, commit
/// 5. Tag the new version and push
///
/// Both commits are best-effort: a failure is reported as a warning. Every
/// other failure stops the run, wrapped with the [WorkflowStage] it came from.
/// Nothing is rolled back.
pub fn run_publish_workflow<R: Repository>(
    repo: &R,
    args: &PublishWorkflowArgs,
) -> Result<WorkflowResult> {
    let mut warnings = Vec::new();
    let workspace = &args.workspace;
    let current = &workspace.current_version;

    repo.configure_identity(&args.author.name, &args.author.email)
        .at(WorkflowStage::ConfigureIdentity)?;

    set_version_all(&workspace.targets, current).at(WorkflowStage::NormalizeDetached)?;
    let detached = bump_all(&workspace.targets, &args.directive).at(WorkflowStage::BumpDetached)?;
    collect_divergence(&detached, &mut warnings);
    info!(from = %current, to = %detached.version, "bumped packages in detached state");

    let tag = args.tag_prefix.format(&detached.version);
    commit_best_effort(
        repo,
        &args.commit_template.render(&tag),
        WorkflowStage::CommitDetached,
        &mut warnings,
    );

    let branch = BranchContext::resolve(
        args.branch.target_override.as_deref(),
        args.branch.head_ref.as_deref(),
        args.branch.git_ref.as_deref(),
    )
    .at(WorkflowStage::ResolveBranch)?;
    info!(branch = %branch.name, pull_request = branch.is_pull_request, "resolved target branch");

    if branch.is_pull_request {
        repo.fetch(&args.remote).at(WorkflowStage::ResolveBranch)?;
    }

    match repo
        .lookup_branch(&branch.name)
        .at(WorkflowStage::CheckoutBranch)?
    {
        BranchLookup::Exists => repo
            .checkout_branch(&branch.name)
            .at(WorkflowStage::CheckoutBranch)?,
        BranchLookup::NeedsCreation => {
            repo.create_branch(&branch.name)
                .at(WorkflowStage::CheckoutBranch)?;
            let warning = BoundaryWarning::BranchCreated {
                branch: branch.name.clone(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
    }

    set_version_all(&workspace.targets, current).at(WorkflowStage::NormalizeBranch)?;
    let bumped = bump_all(&workspace.targets, &args.directive).at(WorkflowStage::BumpBranch)?;
    collect_divergence(&bumped, &mut warnings);
    let version = bumped.version;
    info!(from = %current, to = %version, branch = %branch.name, "bumped packages on branch");

    workspace
        .write_monorepo_version(&version)
        .at(WorkflowStage::WriteMonorepoDescriptor)?;

    let tag = args.tag_prefix.format(&version);
    commit_best_effort(
        repo,
        &args.commit_template.render(&tag),
        WorkflowStage::CommitBranch,
        &mut warnings,
    );

    if args.create_tag {
        repo.create_tag(&tag).at(WorkflowStage::Tag)?;
        repo.push_branch(&args.remote, &branch.name, &[tag.as_str()])
            .at(WorkflowStage::Push)?;
        repo.push_tags(&args.remote, &[tag.as_str()])
            .at(WorkflowStage::Push)?;
    } else {
        repo.push_branch(&args.remote, &branch.name, &[])
            .at(WorkflowStage::Push)?;
    }

    Ok(WorkflowResult {
        tag,
        version,
        branch: branch.name,
        tagged: args.create_tag,
        pushed: true,
        warnings,
    })
}

fn commit_best_effort<R: Repository>(
    repo: &R,
    message: &str,
    stage: WorkflowStage,
    warnings: &mut Vec<BoundaryWarning>,
) {
    if let Err(e) = repo.commit_all(message) {
        let warning = BoundaryWarning::CommitSkipped {
            stage,
            reason: e.to_string(),
        };
        warn!("{}", warning);
        warnings.push(warning);
    }
}

fn collect_divergence(report: &BumpReport, warnings: &mut Vec<BoundaryWarning>) {
    warnings.extend(report.diverged.iter().map(|(target, version)| {
        BoundaryWarning::DivergentVersion {
            package: target.to_string(),
            version: version.to_string(),
            expected: report.version.to_string(),
        }
    }));
}

/// How a run ended, when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The bump was applied and published
    Bumped(WorkflowResult),
    /// The decision was not to bump
    Skipped(String),
    /// A bump was decided but pushing is disabled
    PushDisabled { directive: BumpDirective },
    /// A bump was decided and nothing was changed
    DryRun {
        directive: BumpDirective,
        current: Version,
        next: Version,
        tag: String,
    },
}

/// An [Outcome] with the warnings raised on the way
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outcome: Outcome,
    pub warnings: Vec<BoundaryWarning>,
}

impl RunReport {
    fn new(outcome: Outcome, mut warnings: Vec<BoundaryWarning>) -> Self {
        if let Outcome::Bumped(result) = &outcome {
            warnings.extend(result.warnings.iter().cloned());
        }
        RunReport { outcome, warnings }
    }

    /// Status line for the user
    pub fn message(&self) -> String {
        match &self.outcome {
            Outcome::Bumped(_) => "Version bumped!".to_string(),
            Outcome::Skipped(reason) => reason.clone(),
            Outcome::PushDisabled { .. } => {
                "User requested to skip pushing new tag and package.json. Finished.".to_string()
            }
            Outcome::DryRun {
                directive,
                current,
                next,
                tag,
            } => format!(
                "Dry run: {} would bump {} to {} (tag '{}')",
                directive, current, next, tag
            ),
        }
    }

    /// Tag to publish as the `newTag` output
    pub fn new_tag(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Bumped(result) => Some(&result.tag),
            _ => None,
        }
    }
}

/// Decide and, when a bump is due, publish it
///
/// Manifests, the event payload and the configuration are all validated
/// before `open_repo` is called, so none of those errors leave git or the
/// tree modified.
pub fn run<R, F>(config: &Config, ctx: &RunContext, dry_run: bool, open_repo: F) -> Result<RunReport>
where
    R: Repository,
    F: FnOnce(&Path) -> Result<R>,
{
    let mut warnings = Vec::new();

    let workspace = Workspace::discover(&ctx.package_root)?;
    let event = Event::load(ctx.event_path.as_deref())?;
    let analyzer = VersionAnalyzer::new(config)?;

    if !event.has_commits() {
        let warning = BoundaryWarning::NoCommitsInEvent {
            default_bump: config.default_bump.to_string(),
        };
        warn!("{}", warning);
        warnings.push(warning);
    }

    let messages = event.messages();
    info!(count = messages.len(), "analyzing commit messages");
    let decision = analyzer.analyze(&messages);

    if !decision.directive.is_bump() {
        let reason = decision
            .skip
            .map(|reason| reason.to_string())
            .unwrap_or_else(|| "No version bump required.".to_string());
        info!(reason = %reason, "skipping bump");
        return Ok(RunReport::new(Outcome::Skipped(reason), warnings));
    }
    let directive = decision.directive;

    if !config.behavior.push {
        info!(directive = %directive, "push disabled, stopping after decision");
        return Ok(RunReport::new(Outcome::PushDisabled { directive }, warnings));
    }

    let tag_prefix = config.tag_prefix();

    if dry_run {
        let current = workspace.current_version.clone();
        let next = directive.apply(&current)?;
        let tag = tag_prefix.format(&next);
        info!(directive = %directive, from = %current, to = %next, "dry run");
        return Ok(RunReport::new(
            Outcome::DryRun {
                directive,
                current,
                next,
                tag,
            },
            warnings,
        ));
    }

    let repo = open_repo(&ctx.package_root)?;
    let args = PublishWorkflowArgs {
        directive,
        workspace,
        branch: BranchSource {
            target_override: config.behavior.target_branch.clone(),
            head_ref: ctx.head_ref.clone(),
            git_ref: ctx.git_ref.clone(),
        },
        remote: ctx.remote.clone(),
        tag_prefix,
        commit_template: config.commit_template(),
        create_tag: !config.behavior.skip_tag,
        author: config.author.clone(),
    };

    let result = run_publish_workflow(&repo, &args)?;
    info!(tag = %result.tag, branch = %result.branch, "version bumped");
    Ok(RunReport::new(Outcome::Bumped(result), warnings))
}
