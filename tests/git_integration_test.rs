// End-to-end runs against real repositories: a working clone and a bare remote
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use git2::{Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;
use version_bump::cli::orchestration::{run, Outcome};
use version_bump::config::Config;
use version_bump::context::RunContext;
use version_bump::git::Git2Repository;

struct Fixture {
    _dirs: TempDir,
    work: PathBuf,
    remote: PathBuf,
    event: PathBuf,
}

fn setup(event_json: &str) -> Fixture {
    let dirs = TempDir::new().unwrap();
    let work = dirs.path().join("work");
    let remote = dirs.path().join("remote.git");
    let event = dirs.path().join("event.json");

    Repository::init_bare(&remote).unwrap();

    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(&work, &opts).unwrap();
    fs::write(
        work.join("package.json"),
        "{\n  \"name\": \"app\",\n  \"version\": \"1.0.0\"\n}\n",
    )
    .unwrap();

    let head = {
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("package.json")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = Signature::now("Dev", "dev@example.com").unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "feat: first", &tree, &[])
            .unwrap()
    };

    let mut origin = repo.remote("origin", remote.to_str().unwrap()).unwrap();
    origin
        .push(&["refs/heads/main:refs/heads/main"], None)
        .unwrap();

    // Actions check out the triggering commit with a detached HEAD
    repo.set_head_detached(head).unwrap();

    fs::write(&event, event_json).unwrap();

    Fixture {
        _dirs: dirs,
        work,
        remote,
        event,
    }
}

fn context(fixture: &Fixture, pairs: &[(&str, &str)]) -> RunContext {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    RunContext::from_vars(&vars, &fixture.work, None, Some(fixture.event.clone()))
}

fn remote_version(remote: &Path, refname: &str) -> String {
    let repo = Repository::open_bare(remote).unwrap();
    let commit = repo
        .find_reference(refname)
        .unwrap()
        .peel_to_commit()
        .unwrap();
    let blob = commit
        .tree()
        .unwrap()
        .get_path(Path::new("package.json"))
        .unwrap()
        .to_object(&repo)
        .unwrap()
        .peel_to_blob()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(blob.content()).unwrap();
    json["version"].as_str().unwrap().to_string()
}

#[test]
fn test_bump_commit_tag_and_push() {
    let fixture = setup(r#"{"commits": [{"message": "feat: add login"}]}"#);
    let mut config = Config::default();
    config.tag_prefix = "v".to_string();

    let report = run(
        &config,
        &context(&fixture, &[("GITHUB_REF", "refs/heads/main")]),
        false,
        |path| Git2Repository::open(path),
    )
    .unwrap();

    assert_eq!(report.new_tag(), Some("v1.1.0"));
    assert_eq!(remote_version(&fixture.remote, "refs/heads/main"), "1.1.0");
    assert_eq!(remote_version(&fixture.remote, "refs/tags/v1.1.0"), "1.1.0");

    let remote = Repository::open_bare(&fixture.remote).unwrap();
    let tip = remote
        .find_reference("refs/heads/main")
        .unwrap()
        .peel_to_commit()
        .unwrap();
    assert_eq!(tip.message(), Some("ci: version bump to v1.1.0"));
    assert_eq!(tip.author().name(), Some("Automated Version Bump"));
    assert_eq!(tip.parent_count(), 1);
    assert_eq!(tip.parent(0).unwrap().message(), Some("feat: first"));

    let work = Repository::open(&fixture.work).unwrap();
    assert_eq!(work.head().unwrap().shorthand(), Some("main"));
}

#[test]
fn test_skip_tag_pushes_branch_only() {
    let fixture = setup(r#"{"commits": [{"message": "fix: typo"}]}"#);
    let mut config = Config::default();
    config.behavior.skip_tag = true;

    let report = run(
        &config,
        &context(&fixture, &[("GITHUB_REF", "refs/heads/main")]),
        false,
        |path| Git2Repository::open(path),
    )
    .unwrap();

    match report.outcome {
        Outcome::Bumped(result) => assert!(!result.tagged),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(remote_version(&fixture.remote, "refs/heads/main"), "1.0.1");

    let remote = Repository::open_bare(&fixture.remote).unwrap();
    assert!(remote.tag_names(None).unwrap().is_empty());
}

#[test]
fn test_pull_request_branch_from_remote() {
    let fixture = setup(r#"{"commits": [{"message": "major: rewrite"}]}"#);
    {
        let work = Repository::open(&fixture.work).unwrap();
        let mut origin = work.find_remote("origin").unwrap();
        origin
            .push(&["refs/heads/main:refs/heads/feature"], None)
            .unwrap();
    }

    let report = run(
        &Config::default(),
        &context(
            &fixture,
            &[
                ("GITHUB_REF", "refs/pull/1/merge"),
                ("GITHUB_HEAD_REF", "feature"),
            ],
        ),
        false,
        |path| Git2Repository::open(path),
    )
    .unwrap();

    assert_eq!(report.new_tag(), Some("2.0.0"));
    assert_eq!(remote_version(&fixture.remote, "refs/heads/feature"), "2.0.0");
    assert_eq!(remote_version(&fixture.remote, "refs/heads/main"), "1.0.0");
}

#[test]
fn test_existing_tag_fails_without_push() {
    let fixture = setup(r#"{"commits": [{"message": "fix: typo"}]}"#);
    {
        let work = Repository::open(&fixture.work).unwrap();
        let head = work.head().unwrap().peel_to_commit().unwrap();
        work.tag_lightweight("1.0.1", head.as_object(), false).unwrap();
    }

    let result = run(
        &Config::default(),
        &context(&fixture, &[("GITHUB_REF", "refs/heads/main")]),
        false,
        |path| Git2Repository::open(path),
    );

    assert!(result.is_err());
    assert_eq!(remote_version(&fixture.remote, "refs/heads/main"), "1.0.0");
}
