//! Parent-linked trees and many-to-many composition, held as id arenas.
//!
//! Nothing in storage prevents a node from becoming its own ancestor, so every
//! walk here carries a visited set and stops at the first repeated node.

pub mod arena;
pub mod composition;

#[cfg(test)]
mod props;

pub use arena::{Ancestry, Hierarchy};
pub use composition::Composition;
