use crate::domain::{parse_version, BumpDirective};
use crate::error::{Result, VersionBumpError};
use crate::manifest::{sync_lockfiles, Manifest, PACKAGE_JSON};
use rayon::prelude::*;
use semver::Version;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A package directory holding a `package.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTarget {
    root: PathBuf,
    /// Directory relative to the workspace root ("." for the root package)
    pub dir: PathBuf,
}

impl PackageTarget {
    pub fn new(root: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        PackageTarget {
            root: root.into(),
            dir: dir.into(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.dir == Path::new(".")
    }

    pub fn package_dir(&self) -> PathBuf {
        if self.is_root() {
            self.root.clone()
        } else {
            self.root.join(&self.dir)
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.package_dir().join(PACKAGE_JSON)
    }

    pub fn load(&self) -> Result<Manifest> {
        Manifest::load(&self.manifest_path()).map_err(|e| match e {
            VersionBumpError::Manifest(msg) if !self.is_root() => VersionBumpError::manifest(
                format!("{} (package '{}')", msg, self.dir.display()),
            ),
            other => other,
        })
    }

    pub fn read_version(&self) -> Result<Version> {
        let manifest = self.load()?;
        parse_version(manifest.version()?)
    }

    /// Set the version without bumping, succeeding when it is already set
    pub fn set_version(&self, version: &Version) -> Result<()> {
        let mut manifest = self.load()?;
        let version = version.to_string();
        manifest.set_version(&version);
        manifest.save()?;
        sync_lockfiles(&self.package_dir(), &version)?;
        debug!(package = %self, version = %version, "set version");
        Ok(())
    }

    /// Apply a bump to the version currently in the manifest
    pub fn bump(&self, directive: &BumpDirective) -> Result<Version> {
        let current = self.read_version()?;
        let next = directive.apply(&current)?;
        self.set_version(&next)?;
        debug!(package = %self, from = %current, to = %next, "bumped version");
        Ok(next)
    }
}

impl fmt::Display for PackageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir.display())
    }
}

/// Set every target to `version`, in parallel
///
/// A failure in one target does not undo writes already done in others.
pub fn set_version_all(targets: &[PackageTarget], version: &Version) -> Result<()> {
    targets
        .par_iter()
        .map(|target| target.set_version(version))
        .collect::<Result<Vec<()>>>()?;
    Ok(())
}

/// Versions produced by [bump_all]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpReport {
    /// Version of the last target in discovery order
    pub version: Version,
    /// Targets that ended on a different version than `version`
    pub diverged: Vec<(PackageTarget, Version)>,
}

/// Bump every target in parallel
///
/// Targets start from the same version so they converge; the last target in
/// discovery order provides the representative value.
pub fn bump_all(targets: &[PackageTarget], directive: &BumpDirective) -> Result<BumpReport> {
    let mut versions = targets
        .par_iter()
        .map(|target| target.bump(directive).map(|v| (target.clone(), v)))
        .collect::<Result<Vec<_>>>()?;

    let (_, representative) = versions
        .pop()
        .ok_or_else(|| VersionBumpError::manifest("No package targets to bump"))?;

    let diverged: Vec<(PackageTarget, Version)> = versions
        .into_iter()
        .filter(|(_, version)| version != &representative)
        .collect();
    for (target, version) in &diverged {
        warn!(
            package = %target,
            version = %version,
            expected = %representative,
            "package version diverged from the other packages"
        );
    }

    Ok(BumpReport {
        version: representative,
        diverged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_package(root: &Path, dir: &str, version: &str) -> PackageTarget {
        let package_dir = root.join(dir);
        fs::create_dir_all(&package_dir).unwrap();
        fs::write(
            package_dir.join(PACKAGE_JSON),
            format!("{{\n  \"name\": \"{}\",\n  \"version\": \"{}\"\n}}\n", dir, version),
        )
        .unwrap();
        PackageTarget::new(root, dir)
    }

    #[test]
    fn test_root_target_paths() {
        let target = PackageTarget::new("/work", ".");
        assert!(target.is_root());
        assert_eq!(target.manifest_path(), PathBuf::from("/work/package.json"));
        assert_eq!(target.to_string(), ".");
    }

    #[test]
    fn test_set_version_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let target = write_package(temp.path(), ".", "1.0.0");

        let version = Version::new(1, 0, 0);
        target.set_version(&version).unwrap();
        target.set_version(&version).unwrap();
        assert_eq!(target.read_version().unwrap(), version);
    }

    #[test]
    fn test_bump_target() {
        let temp = TempDir::new().unwrap();
        let target = write_package(temp.path(), ".", "1.0.0");

        let next = target.bump(&BumpDirective::Minor).unwrap();
        assert_eq!(next, Version::new(1, 1, 0));
        assert_eq!(target.read_version().unwrap(), next);
    }

    #[test]
    fn test_bump_all_converges() {
        let temp = TempDir::new().unwrap();
        let targets = vec![
            write_package(temp.path(), "packages/a", "0.9.0"),
            write_package(temp.path(), "packages/b", "1.0.0"),
        ];

        set_version_all(&targets, &Version::new(1, 0, 0)).unwrap();
        let report = bump_all(&targets, &BumpDirective::Patch).unwrap();
        let next = report.version;

        assert_eq!(next, Version::new(1, 0, 1));
        assert!(report.diverged.is_empty());
        for target in &targets {
            assert_eq!(target.read_version().unwrap(), next);
        }
    }

    #[test]
    fn test_bump_all_reports_divergence() {
        let temp = TempDir::new().unwrap();
        let targets = vec![
            write_package(temp.path(), "packages/a", "0.9.0"),
            write_package(temp.path(), "packages/b", "1.0.0"),
        ];

        let report = bump_all(&targets, &BumpDirective::Minor).unwrap();
        assert_eq!(report.version, Version::new(1, 1, 0));
        assert_eq!(
            report.diverged,
            vec![(targets[0].clone(), Version::new(0, 10, 0))]
        );
    }

    #[test]
    fn test_bump_all_without_targets() {
        assert!(bump_all(&[], &BumpDirective::Patch).is_err());
    }

    #[test]
    fn test_missing_package_names_the_package() {
        let temp = TempDir::new().unwrap();
        let target = PackageTarget::new(temp.path(), "packages/ghost");
        let err = target.read_version().unwrap_err();
        assert!(err.to_string().contains("packages/ghost"));
    }
}
