//! Domain logic - pure business rules independent of git operations

pub mod branch;
pub mod commit;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::BranchContext;
pub use commit::{breaking_header_matcher, CommitMessage};
pub use prerelease::{preid_from_keyword, resolve_preid};
pub use tag::{CommitTemplate, TagPrefix};
pub use version::{parse_version, BumpDirective, BumpLevel};
