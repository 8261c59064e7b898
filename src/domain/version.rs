use crate::error::{Result, VersionBumpError};
use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parse a version string as written in a manifest (e.g., "1.2.3" or "v1.2.3")
pub fn parse_version(raw: &str) -> Result<Version> {
    let clean = raw.trim().trim_start_matches('v').trim_start_matches('V');
    Version::parse(clean)
        .map_err(|e| VersionBumpError::version(format!("Invalid version '{}': {}", raw, e)))
}

/// Bump level accepted as the configured default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    Major,
    Minor,
    #[default]
    Patch,
    Prerelease,
}

impl FromStr for BumpLevel {
    type Err = VersionBumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(BumpLevel::Major),
            "minor" => Ok(BumpLevel::Minor),
            "patch" => Ok(BumpLevel::Patch),
            "prerelease" => Ok(BumpLevel::Prerelease),
            other => Err(VersionBumpError::config(format!(
                "Unknown bump level '{}' (expected major, minor, patch or prerelease)",
                other
            ))),
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpLevel::Major => write!(f, "major"),
            BumpLevel::Minor => write!(f, "minor"),
            BumpLevel::Patch => write!(f, "patch"),
            BumpLevel::Prerelease => write!(f, "prerelease"),
        }
    }
}

/// Version bump decision for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpDirective {
    NoBump,
    Major,
    Minor,
    Patch,
    Prerelease { preid: Option<String> },
}

impl BumpDirective {
    /// Directive for a configured level, with the prerelease identifier used
    /// when the level is `prerelease`
    pub fn from_level(level: BumpLevel, preid: Option<&str>) -> Self {
        match level {
            BumpLevel::Major => BumpDirective::Major,
            BumpLevel::Minor => BumpDirective::Minor,
            BumpLevel::Patch => BumpDirective::Patch,
            BumpLevel::Prerelease => BumpDirective::Prerelease {
                preid: preid.map(str::to_string),
            },
        }
    }

    pub fn is_bump(&self) -> bool {
        !matches!(self, BumpDirective::NoBump)
    }

    /// Apply the directive to `current`, following npm's increment rules.
    ///
    /// - **Major**: `1.2.3 -> 2.0.0`, but `2.0.0-rc.1 -> 2.0.0`
    /// - **Minor**: `1.2.3 -> 1.3.0`, but `1.3.0-rc.1 -> 1.3.0`
    /// - **Patch**: `1.2.3 -> 1.2.4`, but `1.2.4-rc.1 -> 1.2.4`
    /// - **Prerelease**: `1.2.3 -> 1.2.4-<preid>.0`, `1.2.4-beta.0 -> 1.2.4-beta.1`;
    ///   a different `preid` restarts the counter at 0
    ///
    /// Build metadata is always dropped. `NoBump` returns `current` unchanged.
    pub fn apply(&self, current: &Version) -> Result<Version> {
        let mut next = current.clone();
        next.build = BuildMetadata::EMPTY;
        let has_pre = !current.pre.is_empty();

        match self {
            BumpDirective::NoBump => return Ok(current.clone()),
            BumpDirective::Major => {
                if !(has_pre && current.minor == 0 && current.patch == 0) {
                    next.major += 1;
                }
                next.minor = 0;
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            BumpDirective::Minor => {
                if !(has_pre && current.patch == 0) {
                    next.minor += 1;
                }
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            BumpDirective::Patch => {
                if !has_pre {
                    next.patch += 1;
                }
                next.pre = Prerelease::EMPTY;
            }
            BumpDirective::Prerelease { preid } => {
                if !has_pre {
                    next.patch += 1;
                }
                let identifiers = next_prerelease(current.pre.as_str(), preid.as_deref())?;
                next.pre = Prerelease::new(&identifiers.join(".")).map_err(|e| {
                    VersionBumpError::version(format!(
                        "Invalid prerelease identifier '{}': {}",
                        preid.as_deref().unwrap_or_default(),
                        e
                    ))
                })?;
            }
        }

        Ok(next)
    }
}

fn is_numeric(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.chars().all(|c| c.is_ascii_digit())
}

fn next_prerelease(current: &str, preid: Option<&str>) -> Result<Vec<String>> {
    let mut identifiers: Vec<String> = if current.is_empty() {
        Vec::new()
    } else {
        current.split('.').map(str::to_string).collect()
    };

    if let Some(preid) = preid.filter(|p| !p.is_empty()) {
        let keeps_counter = identifiers.first().map(String::as_str) == Some(preid)
            && identifiers.get(1).map(|id| is_numeric(id)).unwrap_or(false);
        if !keeps_counter {
            return Ok(vec![preid.to_string(), "0".to_string()]);
        }
    }

    if identifiers.is_empty() {
        identifiers.push("0".to_string());
    } else if let Some(last_numeric) = identifiers.iter().rposition(|id| is_numeric(id)) {
        let counter = &identifiers[last_numeric];
        let value = counter.parse::<u64>().map_err(|e| {
            VersionBumpError::version(format!(
                "Prerelease counter '{}' is out of range: {}",
                counter, e
            ))
        })?;
        let next = value.checked_add(1).ok_or_else(|| {
            VersionBumpError::version(format!(
                "Prerelease counter '{}' cannot be incremented",
                counter
            ))
        })?;
        identifiers[last_numeric] = next.to_string();
    } else {
        identifiers.push("0".to_string());
    }

    Ok(identifiers)
}

impl fmt::Display for BumpDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpDirective::NoBump => write!(f, "none"),
            BumpDirective::Major => write!(f, "major"),
            BumpDirective::Minor => write!(f, "minor"),
            BumpDirective::Patch => write!(f, "patch"),
            BumpDirective::Prerelease { preid: None } => write!(f, "prerelease"),
            BumpDirective::Prerelease { preid: Some(id) } => {
                write!(f, "prerelease --preid={}", id)
            }
        }
    }
}
