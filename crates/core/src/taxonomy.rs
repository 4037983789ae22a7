//! Classification taxonomies.
//!
//! Two independent schemes classify a firm:
//!
//! - the sector scheme, `Sector -> SubSector -> Industry -> SubIndustry`
//! - the CDP scheme, `CdpIndustry -> CdpSector -> CdpActivity`
//!
//! Each level only points at the level directly above it, so a chain walk
//! is bounded by the depth of the scheme. A firm may reference any level of
//! either scheme; nothing checks that the two schemes agree.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// The two classification schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyScheme {
    /// Sector / sub-sector / industry / sub-industry.
    Sector,
    /// CDP industry / sector / activity.
    Cdp,
}

impl TaxonomyScheme {
    /// Levels of the scheme, root first.
    #[must_use]
    pub const fn levels(&self) -> &'static [TaxonomyLevel] {
        match self {
            Self::Sector => &[
                TaxonomyLevel::Sector,
                TaxonomyLevel::SubSector,
                TaxonomyLevel::Industry,
                TaxonomyLevel::SubIndustry,
            ],
            Self::Cdp => &[
                TaxonomyLevel::CdpIndustry,
                TaxonomyLevel::CdpSector,
                TaxonomyLevel::CdpActivity,
            ],
        }
    }
}

/// One level of a taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyLevel {
    /// Top of the sector scheme.
    Sector,
    /// Child of a sector.
    SubSector,
    /// Child of a sub-sector.
    Industry,
    /// Child of an industry.
    SubIndustry,
    /// Top of the CDP scheme.
    CdpIndustry,
    /// Child of a CDP industry.
    CdpSector,
    /// Child of a CDP sector.
    CdpActivity,
}

impl TaxonomyLevel {
    /// Scheme this level belongs to.
    #[must_use]
    pub const fn scheme(&self) -> TaxonomyScheme {
        match self {
            Self::Sector | Self::SubSector | Self::Industry | Self::SubIndustry => {
                TaxonomyScheme::Sector
            }
            Self::CdpIndustry | Self::CdpSector | Self::CdpActivity => TaxonomyScheme::Cdp,
        }
    }

    /// Level a node of this level points at, if any.
    #[must_use]
    pub const fn parent_level(&self) -> Option<Self> {
        match self {
            Self::Sector | Self::CdpIndustry => None,
            Self::SubSector => Some(Self::Sector),
            Self::Industry => Some(Self::SubSector),
            Self::SubIndustry => Some(Self::Industry),
            Self::CdpSector => Some(Self::CdpIndustry),
            Self::CdpActivity => Some(Self::CdpSector),
        }
    }

    /// Distance from the root of the scheme (root = 0).
    #[must_use]
    pub const fn depth(&self) -> usize {
        match self {
            Self::Sector | Self::CdpIndustry => 0,
            Self::SubSector | Self::CdpSector => 1,
            Self::Industry | Self::CdpActivity => 2,
            Self::SubIndustry => 3,
        }
    }

    /// Storage name of the level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sector => "sector",
            Self::SubSector => "sub_sector",
            Self::Industry => "industry",
            Self::SubIndustry => "sub_industry",
            Self::CdpIndustry => "cdp_industry",
            Self::CdpSector => "cdp_sector",
            Self::CdpActivity => "cdp_activity",
        }
    }
}

impl fmt::Display for TaxonomyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of either taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    /// Node ID.
    pub id: Uuid,
    /// Level of the node.
    pub level: TaxonomyLevel,
    /// Display name.
    pub name: String,
    /// Node of the parent level, `None` at the root or when unlinked.
    pub parent: Option<Uuid>,
}

/// A resolved chain, most specific node first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyPath {
    nodes: Vec<TaxonomyNode>,
}

impl TaxonomyPath {
    /// Nodes from the starting node up to the highest reachable one.
    #[must_use]
    pub fn nodes(&self) -> &[TaxonomyNode] {
        &self.nodes
    }

    /// The node at `level`, if the chain reaches it.
    #[must_use]
    pub fn at(&self, level: TaxonomyLevel) -> Option<&TaxonomyNode> {
        self.nodes.iter().find(|n| n.level == level)
    }

    /// True when the chain ends at the root level of its scheme.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.nodes.last().is_some_and(|n| n.level.depth() == 0)
    }

    /// Names from root to the starting node, e.g. `Energy > Oil & Gas`.
    #[must_use]
    pub fn display_path(&self) -> String {
        self.nodes
            .iter()
            .rev()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

/// Checks that `parent` sits exactly one level above `child`.
///
/// # Errors
///
/// `InvalidInput` when the levels do not line up.
pub fn validate_parent(child: TaxonomyLevel, parent: TaxonomyLevel) -> DomainResult<()> {
    if child.parent_level() == Some(parent) {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(format!(
            "{child} cannot have a {parent} parent"
        )))
    }
}

/// Walks a chain upward from `start`, fetching parents through `lookup`.
///
/// `lookup(level, id)` returns the node of `level` with `id`. A missing
/// parent ends the walk early; the path is then incomplete but still valid.
///
/// # Errors
///
/// `InvalidInput` if a fetched node is not of the expected level.
pub fn resolve_path<F>(start: TaxonomyNode, mut lookup: F) -> DomainResult<TaxonomyPath>
where
    F: FnMut(TaxonomyLevel, Uuid) -> Option<TaxonomyNode>,
{
    let mut nodes = vec![start];
    // Each step moves one level up, so the loop runs at most depth times.
    while let Some(current) = nodes.last() {
        let (Some(parent_level), Some(parent_id)) = (current.level.parent_level(), current.parent)
        else {
            break;
        };
        let Some(parent) = lookup(parent_level, parent_id) else {
            break;
        };
        validate_parent(current.level, parent.level)?;
        nodes.push(parent);
    }
    Ok(TaxonomyPath { nodes })
}

/// A firm's taxonomy references, each independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmClassification {
    /// Sector.
    pub sector: Option<Uuid>,
    /// Sub-sector.
    pub subsector: Option<Uuid>,
    /// Industry.
    pub industry: Option<Uuid>,
    /// Sub-industry.
    pub subindustry: Option<Uuid>,
    /// CDP industry.
    pub cdp_industry: Option<Uuid>,
    /// CDP sector.
    pub cdp_sector: Option<Uuid>,
    /// CDP activity.
    pub cdp_activity: Option<Uuid>,
}

impl FirmClassification {
    /// Reference stored for `level`.
    #[must_use]
    pub const fn get(&self, level: TaxonomyLevel) -> Option<Uuid> {
        match level {
            TaxonomyLevel::Sector => self.sector,
            TaxonomyLevel::SubSector => self.subsector,
            TaxonomyLevel::Industry => self.industry,
            TaxonomyLevel::SubIndustry => self.subindustry,
            TaxonomyLevel::CdpIndustry => self.cdp_industry,
            TaxonomyLevel::CdpSector => self.cdp_sector,
            TaxonomyLevel::CdpActivity => self.cdp_activity,
        }
    }

    /// Deepest level of `scheme` the firm references directly.
    #[must_use]
    pub fn most_specific(&self, scheme: TaxonomyScheme) -> Option<(TaxonomyLevel, Uuid)> {
        scheme
            .levels()
            .iter()
            .rev()
            .find_map(|level| self.get(*level).map(|id| (*level, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn node(level: TaxonomyLevel, name: &str, parent: Option<&TaxonomyNode>) -> TaxonomyNode {
        TaxonomyNode {
            id: Uuid::new_v4(),
            level,
            name: name.to_string(),
            parent: parent.map(|p| p.id),
        }
    }

    #[test]
    fn test_parent_levels() {
        assert_eq!(TaxonomyLevel::SubIndustry.parent_level(), Some(TaxonomyLevel::Industry));
        assert_eq!(TaxonomyLevel::CdpActivity.parent_level(), Some(TaxonomyLevel::CdpSector));
        assert_eq!(TaxonomyLevel::Sector.parent_level(), None);
        for scheme in [TaxonomyScheme::Sector, TaxonomyScheme::Cdp] {
            for (depth, level) in scheme.levels().iter().enumerate() {
                assert_eq!(level.depth(), depth);
                assert_eq!(level.scheme(), scheme);
            }
        }
    }

    #[test]
    fn test_resolve_full_chain() {
        let sector = node(TaxonomyLevel::Sector, "Energy", None);
        let sub = node(TaxonomyLevel::SubSector, "Oil & Gas", Some(&sector));
        let ind = node(TaxonomyLevel::Industry, "Exploration", Some(&sub));
        let subind = node(TaxonomyLevel::SubIndustry, "Offshore", Some(&ind));

        let store: HashMap<Uuid, TaxonomyNode> = [&sector, &sub, &ind]
            .into_iter()
            .map(|n| (n.id, n.clone()))
            .collect();

        let path = resolve_path(subind, |_, id| store.get(&id).cloned()).unwrap();
        assert_eq!(path.nodes().len(), 4);
        assert!(path.is_complete());
        assert_eq!(path.at(TaxonomyLevel::Sector).unwrap().name, "Energy");
        assert_eq!(
            path.display_path(),
            "Energy > Oil & Gas > Exploration > Offshore"
        );
    }

    #[test]
    fn test_resolve_stops_at_missing_parent() {
        let sector = node(TaxonomyLevel::Sector, "Energy", None);
        let sub = node(TaxonomyLevel::SubSector, "Oil & Gas", Some(&sector));
        let path = resolve_path(sub, |_, _| None).unwrap();
        assert_eq!(path.nodes().len(), 1);
        assert!(!path.is_complete());
    }

    #[test]
    fn test_resolve_rejects_wrong_level() {
        let wrong = node(TaxonomyLevel::CdpIndustry, "Power", None);
        let sub = TaxonomyNode {
            parent: Some(wrong.id),
            ..node(TaxonomyLevel::SubSector, "Utilities", None)
        };
        let err = resolve_path(sub, |_, _| Some(wrong.clone())).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_parent() {
        assert!(validate_parent(TaxonomyLevel::Industry, TaxonomyLevel::SubSector).is_ok());
        assert!(validate_parent(TaxonomyLevel::Industry, TaxonomyLevel::Sector).is_err());
        assert!(validate_parent(TaxonomyLevel::CdpSector, TaxonomyLevel::Sector).is_err());
    }

    #[test]
    fn test_most_specific_per_scheme() {
        let sector = Uuid::new_v4();
        let industry = Uuid::new_v4();
        let cdp = Uuid::new_v4();
        let firm = FirmClassification {
            sector: Some(sector),
            industry: Some(industry),
            cdp_industry: Some(cdp),
            ..FirmClassification::default()
        };
        assert_eq!(
            firm.most_specific(TaxonomyScheme::Sector),
            Some((TaxonomyLevel::Industry, industry))
        );
        assert_eq!(
            firm.most_specific(TaxonomyScheme::Cdp),
            Some((TaxonomyLevel::CdpIndustry, cdp))
        );
        assert_eq!(FirmClassification::default().most_specific(TaxonomyScheme::Cdp), None);
    }
}
