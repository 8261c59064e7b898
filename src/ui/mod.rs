//! User interface module - formatting and action outputs.
//!
//! Separates concerns:
//! - `formatter` - Status lines and warnings for the log
//! - This module - Machine-readable outputs consumed by later workflow steps

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::Result;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_fatal, display_report, display_status, display_success,
};

/// Environment variable naming the file that collects step outputs
pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

/// Name of the output carrying the new tag
pub const NEW_TAG_OUTPUT: &str = "newTag";

/// Publish a step output.
///
/// Appends `name=value` to `output_file` when one is given, and always echoes
/// the legacy `::set-output` workflow command.
pub fn set_output(name: &str, value: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}={}", name, value)?;
    }

    println!("{}", set_output_command(name, value));
    Ok(())
}

/// `::set-output name=<name>::<value>`
pub fn set_output_command(name: &str, value: &str) -> String {
    format!("::set-output name={}::{}", name, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_set_output_command() {
        assert_eq!(
            set_output_command(NEW_TAG_OUTPUT, "v1.1.0"),
            "::set-output name=newTag::v1.1.0"
        );
    }

    #[test]
    fn test_set_output_appends_to_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("output");
        fs::write(&path, "other=1\n").unwrap();

        set_output(NEW_TAG_OUTPUT, "v1.1.0", Some(&path)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "other=1\nnewTag=v1.1.0\n");
    }
}
