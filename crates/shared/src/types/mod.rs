//! Common types used across the workspace.

pub mod id;
pub mod pagination;

#[cfg(test)]
mod pagination_tests;

pub use id::*;
pub use pagination::{MAX_PER_PAGE, PageMeta, PageRequest, PageResponse};
