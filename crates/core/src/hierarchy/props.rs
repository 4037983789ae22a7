//! Property-based tests for hierarchy traversal.
//!
//! - Ancestor walks always terminate, even over arbitrary (cyclic) parent maps
//! - Acyclic walks end at a node without a parent
//! - Composition expansion is a superset of direct components

use std::collections::HashSet;

use proptest::prelude::*;

use super::{Composition, Hierarchy};

/// Strategy for an arbitrary parent map over a small id space, cycles allowed.
fn parent_map() -> impl Strategy<Value = Vec<(u8, Option<u8>)>> {
    prop::collection::vec((0u8..24, prop::option::of(0u8..24)), 0..40)
}

/// Strategy for a forest: every parent id is smaller than its child.
fn forest() -> impl Strategy<Value = Vec<(u8, Option<u8>)>> {
    prop::collection::vec(prop::option::of(any::<u8>()), 1..40).prop_map(|parents| {
        parents
            .into_iter()
            .enumerate()
            .map(|(i, parent)| {
                let id = u8::try_from(i).unwrap_or(u8::MAX);
                let parent = parent.filter(|_| id > 0).map(|p| p % id.max(1));
                (id, parent)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Walks never repeat a node, so they are bounded by the arena size.
    #[test]
    fn prop_ancestors_terminate_without_repeats(links in parent_map(), start in 0u8..24) {
        let tree: Hierarchy<u8> = links.into_iter().collect();
        let ancestry = tree.ancestors(start);

        let unique: HashSet<u8> = ancestry.nodes.iter().copied().collect();
        prop_assert_eq!(unique.len(), ancestry.nodes.len());
        prop_assert!(ancestry.nodes.len() <= tree.len());
    }

    /// In a forest the walk ends at a root and never reports a cycle.
    #[test]
    fn prop_forest_walk_reaches_root(links in forest(), pick in any::<prop::sample::Index>()) {
        let ids: Vec<u8> = links.iter().map(|(id, _)| *id).collect();
        let start = ids[pick.index(ids.len())];
        let tree: Hierarchy<u8> = links.into_iter().collect();

        let ancestry = tree.ancestors(start);
        prop_assert!(!ancestry.is_cyclic());
        prop_assert_eq!(ancestry.nodes.first().copied(), Some(start));
        let root = ancestry.root().unwrap();
        prop_assert_eq!(tree.parent(root), None);
    }

    /// Every descendant of a node lists that node among its ancestors.
    #[test]
    fn prop_descendants_agree_with_ancestors(links in forest(), pick in any::<prop::sample::Index>()) {
        let ids: Vec<u8> = links.iter().map(|(id, _)| *id).collect();
        let node = ids[pick.index(ids.len())];
        let tree: Hierarchy<u8> = links.into_iter().collect();

        for below in tree.descendants(node) {
            prop_assert!(tree.ancestors(below).strict().contains(&node));
        }
    }

    /// Expansion contains the direct components and terminates on any graph.
    #[test]
    fn prop_expand_contains_components(edges in prop::collection::vec((0u8..16, 0u8..16), 0..48), start in 0u8..16) {
        let rel: Composition<u8> = edges.into_iter().collect();
        let direct = rel.components(start);
        let expanded = rel.expand(start);
        prop_assert!(direct.is_subset(&expanded));
        prop_assert!(expanded.len() <= 16);
    }
}
