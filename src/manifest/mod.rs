//! JSON manifests: `package.json`, `lerna.json` and npm lockfiles
//!
//! Manifests are decoded as plain JSON objects so every field other than
//! `version` survives a rewrite untouched, in its original order. The
//! indentation and line endings of the file are kept as well.

pub mod discovery;
pub mod target;

pub use discovery::{expand_glob, Workspace};
pub use target::{bump_all, set_version_all, BumpReport, PackageTarget};

use crate::error::{Result, VersionBumpError};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const PACKAGE_JSON: &str = "package.json";
pub const LERNA_JSON: &str = "lerna.json";
pub const LOCKFILES: [&str; 2] = ["package-lock.json", "npm-shrinkwrap.json"];

const DEFAULT_INDENT: &str = "  ";

/// A JSON manifest file with a `version` field
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    path: PathBuf,
    fields: Map<String, Value>,
    indent: String,
    crlf: bool,
}

impl Manifest {
    /// Load and decode a manifest
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            VersionBumpError::manifest(format!("{} could not be read: {}", path.display(), e))
        })?;

        let fields = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                return Err(VersionBumpError::manifest(format!(
                    "{} is not a JSON object",
                    path.display()
                )))
            }
            Err(e) => {
                return Err(VersionBumpError::manifest(format!(
                    "{} is not valid JSON: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Manifest {
            path: path.to_path_buf(),
            fields,
            indent: detect_indent(&content),
            crlf: content.contains("\r\n"),
        })
    }

    /// The raw `version` field
    pub fn version(&self) -> Result<&str> {
        self.fields
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                VersionBumpError::manifest(format!(
                    "{} has no string 'version' field",
                    self.path.display()
                ))
            })
    }

    pub fn set_version(&mut self, version: &str) {
        self.fields
            .insert("version".to_string(), Value::String(version.to_string()));
    }

    /// Package globs declared by a monorepo root descriptor
    ///
    /// Lerna falls back to `packages/*` when the field is absent.
    pub fn packages(&self) -> Vec<String> {
        match self.fields.get("packages").and_then(Value::as_array) {
            Some(globs) => globs
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            None => vec!["packages/*".to_string()],
        }
    }

    /// Keep an npm lockfile's own version fields in step with the package
    fn sync_lockfile_version(&mut self, version: &str) {
        if self.fields.contains_key("version") {
            self.set_version(version);
        }
        if let Some(root_package) = self
            .fields
            .get_mut("packages")
            .and_then(Value::as_object_mut)
            .and_then(|packages| packages.get_mut(""))
            .and_then(Value::as_object_mut)
        {
            if root_package.contains_key("version") {
                root_package.insert("version".to_string(), Value::String(version.to_string()));
            }
        }
    }

    /// Write the manifest back with its original formatting conventions
    pub fn save(&self) -> Result<()> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
        self.fields.serialize(&mut serializer)?;

        let mut content = String::from_utf8(buffer).map_err(|e| {
            VersionBumpError::manifest(format!("{} encoding error: {}", self.path.display(), e))
        })?;
        content.push('\n');
        if self.crlf {
            content = content.replace('\n', "\r\n");
        }

        fs::write(&self.path, content).map_err(|e| {
            VersionBumpError::manifest(format!(
                "{} could not be updated: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Update the lockfiles next to a package manifest, if any
pub fn sync_lockfiles(package_dir: &Path, version: &str) -> Result<()> {
    for name in LOCKFILES {
        let path = package_dir.join(name);
        if path.is_file() {
            let mut lockfile = Manifest::load(&path)?;
            lockfile.sync_lockfile_version(version);
            lockfile.save()?;
        }
    }
    Ok(())
}

fn detect_indent(content: &str) -> String {
    content
        .lines()
        .skip(1)
        .find(|line| !line.trim().is_empty())
        .map(|line| {
            line.chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect::<String>()
        })
        .filter(|indent| !indent.is_empty())
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}
