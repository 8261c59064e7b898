use crate::domain::parse_version;
use crate::error::{Result, VersionBumpError};
use crate::manifest::{Manifest, PackageTarget, LERNA_JSON, PACKAGE_JSON};
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Packages found in a workspace, with the version they currently share
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub targets: Vec<PackageTarget>,
    /// Path to `lerna.json` in monorepo mode
    pub monorepo_descriptor: Option<PathBuf>,
    pub current_version: Version,
}

impl Workspace {
    /// Discover the packages under `root`.
    ///
    /// A `lerna.json` at the root switches to monorepo mode: its `version` is
    /// the current version and its `packages` globs name the targets (the root
    /// itself is included when it has a `package.json`). Otherwise the root
    /// `package.json` is the only target.
    ///
    /// Every target manifest is read here so that a missing or malformed file
    /// is reported before anything is changed.
    pub fn discover(root: &Path) -> Result<Self> {
        let lerna_path = root.join(LERNA_JSON);

        let (targets, monorepo_descriptor, current) = if lerna_path.is_file() {
            let lerna = Manifest::load(&lerna_path)?;
            let current = lerna.version()?.to_string();

            let mut dirs = Vec::new();
            if root.join(PACKAGE_JSON).is_file() {
                dirs.push(PathBuf::from("."));
            }
            for glob in lerna.packages() {
                for dir in expand_glob(root, &glob)? {
                    if !dirs.contains(&dir) {
                        dirs.push(dir);
                    }
                }
            }

            let targets = dirs
                .into_iter()
                .map(|dir| PackageTarget::new(root, dir))
                .collect::<Vec<_>>();
            (targets, Some(lerna_path), current)
        } else {
            let target = PackageTarget::new(root, ".");
            let current = target.load()?.version()?.to_string();
            (vec![target], None, current)
        };

        if targets.is_empty() {
            return Err(VersionBumpError::config(format!(
                "No packages found for the globs in {}",
                LERNA_JSON
            )));
        }

        for target in &targets {
            target.load()?.version()?;
        }

        let current_version = parse_version(&current)?;
        let package_dirs: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
        info!(package_dirs = ?package_dirs, "resolved package directories");
        let source = if monorepo_descriptor.is_some() {
            LERNA_JSON
        } else {
            PACKAGE_JSON
        };
        info!(version = %current_version, source, "read current version");

        Ok(Workspace {
            root: root.to_path_buf(),
            targets,
            monorepo_descriptor,
            current_version,
        })
    }

    pub fn is_monorepo(&self) -> bool {
        self.monorepo_descriptor.is_some()
    }

    /// Write `version` into `lerna.json` and read it back to verify.
    ///
    /// Returns the version read back. Does nothing outside monorepo mode.
    pub fn write_monorepo_version(&self, version: &Version) -> Result<Option<Version>> {
        let Some(path) = &self.monorepo_descriptor else {
            return Ok(None);
        };

        let mut descriptor = Manifest::load(path)?;
        descriptor.set_version(&version.to_string());
        descriptor.save()?;

        let written = parse_version(Manifest::load(path)?.version()?)?;
        if &written != version {
            return Err(VersionBumpError::manifest(format!(
                "{} holds {} after writing {}",
                LERNA_JSON, written, version
            )));
        }

        info!(version = %written, "wrote version to {}", LERNA_JSON);
        Ok(Some(written))
    }
}

/// Expand a single-wildcard directory glob relative to `root`.
///
/// Only the `prefix/*` shape is expanded, by listing the subdirectories of
/// `prefix` (sorted by name). Any other pattern is returned as-is.
pub fn expand_glob(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = pattern.trim();
    if pattern.is_empty() || pattern == "." {
        return Ok(vec![PathBuf::from(".")]);
    }

    let Some(index) = pattern.find("/*") else {
        return Ok(vec![PathBuf::from(pattern)]);
    };

    let prefix = &pattern[..index];
    let dir = root.join(prefix);
    let entries = fs::read_dir(&dir).map_err(|e| {
        VersionBumpError::config(format!(
            "Cannot list packages for '{}' in {}: {}",
            pattern,
            dir.display(),
            e
        ))
    })?;

    let mut result = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            result.push(Path::new(prefix).join(entry.file_name()));
        }
    }
    result.sort();

    debug!(pattern, dirs = ?result, "expanded glob");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_expand_glob_lists_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("packages/b")).unwrap();
        fs::create_dir_all(temp.path().join("packages/a")).unwrap();
        write(&temp.path().join("packages/README.md"), "docs");

        let dirs = expand_glob(temp.path(), "packages/*").unwrap();
        assert_eq!(
            dirs,
            vec![PathBuf::from("packages/a"), PathBuf::from("packages/b")]
        );
    }

    #[test]
    fn test_expand_glob_literal_and_root() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            expand_glob(temp.path(), "tools/cli").unwrap(),
            vec![PathBuf::from("tools/cli")]
        );
        assert_eq!(expand_glob(temp.path(), ".").unwrap(), vec![PathBuf::from(".")]);
    }

    #[test]
    fn test_expand_glob_missing_prefix() {
        let temp = TempDir::new().unwrap();
        assert!(expand_glob(temp.path(), "packages/*").is_err());
    }

    #[test]
    fn test_discover_single_package() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join(PACKAGE_JSON), r#"{"version": "2.3.4"}"#);

        let workspace = Workspace::discover(temp.path()).unwrap();
        assert!(!workspace.is_monorepo());
        assert_eq!(workspace.targets.len(), 1);
        assert!(workspace.targets[0].is_root());
        assert_eq!(workspace.current_version, Version::new(2, 3, 4));
    }

    #[test]
    fn test_discover_missing_package_json() {
        let temp = TempDir::new().unwrap();
        assert!(Workspace::discover(temp.path()).is_err());
    }

    #[test]
    fn test_discover_monorepo() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join(LERNA_JSON),
            r#"{"version": "1.0.0", "packages": ["packages/*"]}"#,
        );
        write(&temp.path().join(PACKAGE_JSON), r#"{"private": true, "version": "0.0.0"}"#);
        write(&temp.path().join("packages/a/package.json"), r#"{"version": "1.0.0"}"#);
        write(&temp.path().join("packages/b/package.json"), r#"{"version": "1.0.0"}"#);

        let workspace = Workspace::discover(temp.path()).unwrap();
        assert!(workspace.is_monorepo());
        assert_eq!(workspace.current_version, Version::new(1, 0, 0));
        let dirs: Vec<String> = workspace.targets.iter().map(|t| t.to_string()).collect();
        assert_eq!(dirs, vec![".", "packages/a", "packages/b"]);
    }

    #[test]
    fn test_discover_monorepo_rejects_package_without_manifest() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join(LERNA_JSON), r#"{"version": "1.0.0"}"#);
        write(&temp.path().join("packages/a/package.json"), r#"{"version": "1.0.0"}"#);
        fs::create_dir_all(temp.path().join("packages/empty")).unwrap();

        let err = Workspace::discover(temp.path()).unwrap_err();
        assert!(err.to_string().contains("packages/empty"));
    }

    #[test]
    fn test_discover_independent_lerna_fails() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join(LERNA_JSON), r#"{"version": "independent"}"#);
        write(&temp.path().join("packages/a/package.json"), r#"{"version": "1.0.0"}"#);

        assert!(Workspace::discover(temp.path()).is_err());
    }

    #[test]
    fn test_write_monorepo_version() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join(LERNA_JSON), r#"{"version": "1.0.0", "npmClient": "npm"}"#);
        write(&temp.path().join("packages/a/package.json"), r#"{"version": "1.0.0"}"#);

        let workspace = Workspace::discover(temp.path()).unwrap();
        let written = workspace
            .write_monorepo_version(&Version::new(1, 1, 0))
            .unwrap();
        assert_eq!(written, Some(Version::new(1, 1, 0)));

        let lerna = Manifest::load(&temp.path().join(LERNA_JSON)).unwrap();
        assert_eq!(lerna.version().unwrap(), "1.1.0");
    }
}
