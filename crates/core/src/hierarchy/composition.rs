//! Many-to-many "is made up of" relation, e.g. a composite region and its
//! member countries. Independent of any parent/child tree over the same nodes.

use std::collections::{BTreeMap, BTreeSet};

/// Composite-to-members relation.
#[derive(Debug, Clone)]
pub struct Composition<K> {
    members: BTreeMap<K, BTreeSet<K>>,
}

impl<K> Default for Composition<K> {
    fn default() -> Self {
        Self {
            members: BTreeMap::new(),
        }
    }
}

impl<K: Copy + Ord> Composition<K> {
    /// Creates an empty relation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `composite` contains `member`. Returns false if it already did.
    pub fn add(&mut self, composite: K, member: K) -> bool {
        self.members.entry(composite).or_default().insert(member)
    }

    /// Drops a membership. Returns false if it was not recorded.
    pub fn remove(&mut self, composite: K, member: K) -> bool {
        self.members
            .get_mut(&composite)
            .is_some_and(|set| set.remove(&member))
    }

    /// Direct members of `composite`, without expansion.
    #[must_use]
    pub fn components(&self, composite: K) -> BTreeSet<K> {
        self.members.get(&composite).cloned().unwrap_or_default()
    }

    /// All members reachable through nested composites.
    ///
    /// `composite` itself is only included if some chain of memberships leads
    /// back to it.
    #[must_use]
    pub fn expand(&self, composite: K) -> BTreeSet<K> {
        let mut out = BTreeSet::new();
        let mut stack: Vec<K> = self.components(composite).into_iter().collect();

        while let Some(node) = stack.pop() {
            if out.insert(node) {
                if let Some(nested) = self.members.get(&node) {
                    stack.extend(nested.iter().copied());
                }
            }
        }

        out
    }
}

impl<K: Copy + Ord> FromIterator<(K, K)> for Composition<K> {
    fn from_iter<I: IntoIterator<Item = (K, K)>>(iter: I) -> Self {
        let mut composition = Self::new();
        for (composite, member) in iter {
            composition.add(composite, member);
        }
        composition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_are_not_expanded() {
        // EU = {France, Benelux}, Benelux = {Belgium, Netherlands, Luxembourg}
        let rel: Composition<&str> = [
            ("EU", "France"),
            ("EU", "Benelux"),
            ("Benelux", "Belgium"),
            ("Benelux", "Netherlands"),
            ("Benelux", "Luxembourg"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            rel.components("EU"),
            BTreeSet::from(["Benelux", "France"])
        );
        assert_eq!(
            rel.expand("EU"),
            BTreeSet::from(["Belgium", "Benelux", "France", "Luxembourg", "Netherlands"])
        );
    }

    #[test]
    fn test_unknown_composite_is_empty() {
        let rel: Composition<u8> = Composition::new();
        assert!(rel.components(1).is_empty());
        assert!(rel.expand(1).is_empty());
    }

    #[test]
    fn test_expand_survives_cycles() {
        let rel: Composition<u8> = [(1, 2), (2, 3), (3, 1)].into_iter().collect();
        assert_eq!(rel.expand(1), BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_add_and_remove() {
        let mut rel = Composition::new();
        assert!(rel.add(10, 1));
        assert!(!rel.add(10, 1));
        assert!(rel.add(20, 1));
        assert_eq!(rel.components(10), BTreeSet::from([1]));
        assert!(rel.remove(10, 1));
        assert!(!rel.remove(10, 1));
        assert!(rel.components(10).is_empty());
        assert_eq!(rel.components(20), BTreeSet::from([1]));
    }
}
