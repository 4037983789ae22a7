//! Arena of nodes with explicit parent references.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Result of walking parent links from a node towards its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestry<K> {
    /// The start node followed by each ancestor, nearest first.
    pub nodes: Vec<K>,
    /// The node whose parent link closed a cycle, if the walk hit one.
    pub cycle_at: Option<K>,
}

impl<K: Copy> Ancestry<K> {
    /// The last node reached: the root, or the point a cycle was cut.
    #[must_use]
    pub fn root(&self) -> Option<K> {
        self.nodes.last().copied()
    }

    /// Returns true if the walk was cut short by a cycle.
    #[must_use]
    pub const fn is_cyclic(&self) -> bool {
        self.cycle_at.is_some()
    }

    /// Ancestors only, excluding the start node.
    #[must_use]
    pub fn strict(&self) -> &[K] {
        self.nodes.get(1..).unwrap_or_default()
    }
}

/// Parent-linked tree (or forest) keyed by node id.
#[derive(Debug, Clone)]
pub struct Hierarchy<K> {
    parents: HashMap<K, Option<K>>,
}

impl<K> Default for Hierarchy<K> {
    fn default() -> Self {
        Self {
            parents: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> Hierarchy<K> {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a node and its parent link.
    pub fn insert(&mut self, id: K, parent: Option<K>) {
        self.parents.insert(id, parent);
    }

    /// Removes a node. Children keep pointing at it; walks stop there.
    pub fn remove(&mut self, id: K) -> bool {
        self.parents.remove(&id).is_some()
    }

    /// Returns true if the node is known.
    #[must_use]
    pub fn contains(&self, id: K) -> bool {
        self.parents.contains_key(&id)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns true if there are no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Direct parent of a known node.
    #[must_use]
    pub fn parent(&self, id: K) -> Option<K> {
        self.parents.get(&id).copied().flatten()
    }

    /// Walks from `id` up to its root.
    ///
    /// The walk stops at a node without a parent, at a parent that is not in
    /// the arena, or when a node would be visited twice. An unknown `id`
    /// yields an empty ancestry.
    #[must_use]
    pub fn ancestors(&self, id: K) -> Ancestry<K> {
        let mut nodes = Vec::new();
        let mut seen = HashSet::new();
        let mut cycle_at = None;

        if !self.contains(id) {
            return Ancestry { nodes, cycle_at };
        }

        let mut current = id;
        nodes.push(current);
        seen.insert(current);

        while let Some(parent) = self.parent(current) {
            if !self.contains(parent) {
                break;
            }
            if !seen.insert(parent) {
                cycle_at = Some(current);
                break;
            }
            nodes.push(parent);
            current = parent;
        }

        Ancestry { nodes, cycle_at }
    }

    /// Direct children of `id`.
    #[must_use]
    pub fn children(&self, id: K) -> Vec<K> {
        self.parents
            .iter()
            .filter(|(_, parent)| **parent == Some(id))
            .map(|(child, _)| *child)
            .collect()
    }

    /// Every node below `id`, breadth first. Cycle-safe; `id` itself is
    /// never included.
    #[must_use]
    pub fn descendants(&self, id: K) -> Vec<K> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut frontier = vec![id];

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for node in frontier {
                for child in self.children(node) {
                    if seen.insert(child) {
                        out.push(child);
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }

        out
    }

    /// Returns true if pointing `id` at `parent` would close a cycle.
    #[must_use]
    pub fn would_cycle(&self, id: K, parent: K) -> bool {
        id == parent || self.ancestors(parent).nodes.contains(&id)
    }
}

impl<K: Copy + Eq + Hash> FromIterator<(K, Option<K>)> for Hierarchy<K> {
    fn from_iter<I: IntoIterator<Item = (K, Option<K>)>>(iter: I) -> Self {
        Self {
            parents: iter.into_iter().collect(),
        }
    }
}
