//! Emission reduction targets and their disclosed revisions.

pub mod types;

#[cfg(test)]
mod props;

pub use types::{NewTargetRevision, Target, TargetRevision, latest_revision, newest_first};
