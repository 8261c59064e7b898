use version_bump::analyzer::{SkipReason, VersionAnalyzer};
use version_bump::config::Config;
use version_bump::domain::{BumpDirective, BumpLevel};

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn decide(config: &Config, messages: &[&str]) -> BumpDirective {
    VersionAnalyzer::new(config).unwrap().decide(messages)
}

#[test]
fn test_patch_keyword_beats_minor_default() {
    let mut config = Config::default();
    config.default_bump = BumpLevel::Minor;
    config.wording.patch = words(&["fix"]);

    assert_eq!(
        decide(&config, &["fix: patch the thing"]),
        BumpDirective::Patch
    );
}

#[test]
fn test_breaking_marker_is_major() {
    assert_eq!(
        decide(&Config::default(), &["feat!: new api"]),
        BumpDirective::Major
    );
    assert_eq!(
        decide(&Config::default(), &["refactor(core)!: drop node 12"]),
        BumpDirective::Major
    );
}

#[test]
fn test_major_wins_over_every_other_keyword() {
    let mut config = Config::default();
    config.wording.patch = words(&["fix"]);

    assert_eq!(
        decide(
            &config,
            &["fix: typo", "feat: login", "chore: rc-beta", "docs: BREAKING CHANGE in api"]
        ),
        BumpDirective::Major
    );
}

#[test]
fn test_prerelease_keyword_sets_preid() {
    let mut config = Config::default();
    config.wording.prerelease = words(&["rc-beta"]);

    assert_eq!(
        decide(&config, &["chore: rc-beta release candidate"]),
        BumpDirective::Prerelease {
            preid: Some("beta".to_string())
        }
    );
}

#[test]
fn test_keyword_preid_wins_over_configured() {
    let mut config = Config::default();
    config.preid = Some("next".to_string());

    assert_eq!(
        decide(&config, &["chore: ship rc-alpha"]),
        BumpDirective::Prerelease {
            preid: Some("alpha".to_string())
        }
    );
}

#[test]
fn test_no_commits_uses_default() {
    let config = Config::default();
    assert_eq!(decide(&config, &[]), BumpDirective::Patch);

    let mut config = Config::default();
    config.default_bump = BumpLevel::Major;
    assert_eq!(decide(&config, &[]), BumpDirective::Major);
}

#[test]
fn test_empty_patch_list_never_yields_patch() {
    let mut config = Config::default();
    config.default_bump = BumpLevel::Minor;
    config.wording.patch = Vec::new();

    assert_eq!(decide(&config, &["fix: something"]), BumpDirective::Minor);
}

#[test]
fn test_skip_phrase_beats_major() {
    let mut config = Config::default();
    config.skip_if_commit_contains = Some("[skip bump]".to_string());

    let analyzer = VersionAnalyzer::new(&config).unwrap();
    let decision = analyzer.analyze(&["feat!: new api", "docs: [SKIP BUMP] please"]);

    assert_eq!(decision.directive, BumpDirective::NoBump);
    assert_eq!(
        decision.skip,
        Some(SkipReason::SkipPhrase("[skip bump]".to_string()))
    );
}

#[test]
fn test_previous_bump_commit_is_skipped() {
    let mut config = Config::default();
    config.tag_prefix = "v".to_string();

    let analyzer = VersionAnalyzer::new(&config).unwrap();
    let decision = analyzer.analyze(&["CI: Version Bump To v1.4.2\n"]);

    assert_eq!(decision.directive, BumpDirective::NoBump);
    assert_eq!(decision.skip, Some(SkipReason::PreviousBump));
}

#[test]
fn test_prerelease_default_without_keyword_skips() {
    let mut config = Config::default();
    config.default_bump = BumpLevel::Prerelease;

    let analyzer = VersionAnalyzer::new(&config).unwrap();
    let decision = analyzer.analyze(&["chore: tidy up"]);

    assert_eq!(decision.directive, BumpDirective::NoBump);
    assert_eq!(decision.skip, Some(SkipReason::NoKeywords));
}

#[test]
fn test_prerelease_default_without_feature_uses_configured_preid() {
    let mut config = Config::default();
    config.default_bump = BumpLevel::Prerelease;
    config.wording.prerelease = Vec::new();
    config.preid = Some("next".to_string());

    assert_eq!(
        decide(&config, &["chore: tidy up"]),
        BumpDirective::Prerelease {
            preid: Some("next".to_string())
        }
    );
}

#[test]
fn test_decision_is_stable_for_same_input() {
    let config = Config::default();
    let messages = ["feat: login\nadds oauth", "fix: typo\n"];
    assert_eq!(decide(&config, &messages), decide(&config, &messages));
}
