//! Units grouped by the default unit they convert through.

use std::collections::HashMap;

use esg_shared::types::UnitId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::conversion::{UnitScale, convert};
use crate::error::{DomainError, DomainResult};
use crate::hierarchy::{Ancestry, Hierarchy};

/// A unit of measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unit ID.
    pub id: UnitId,
    /// Display name, e.g. `tCO2e`.
    pub name: String,
    /// The unit this one converts into. `None` for a default unit.
    pub default_unit: Option<UnitId>,
    /// Affine scale relative to the default unit.
    pub scale: UnitScale,
}

impl Unit {
    /// Creates a default unit (identity scale, no further default).
    #[must_use]
    pub fn base(name: impl Into<String>) -> Self {
        Self {
            id: UnitId::new(),
            name: name.into(),
            default_unit: None,
            scale: UnitScale::IDENTITY,
        }
    }

    /// Creates a unit that converts into `default_unit` through `scale`.
    #[must_use]
    pub fn derived(name: impl Into<String>, default_unit: UnitId, scale: UnitScale) -> Self {
        Self {
            id: UnitId::new(),
            name: name.into(),
            default_unit: Some(default_unit),
            scale,
        }
    }

    /// Converts a value in this unit to its default unit.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Arithmetic` on overflow.
    pub fn to_default(&self, value: Decimal) -> DomainResult<Decimal> {
        super::to_default(&self.scale, value)
    }

    /// Converts a value in the default unit to this unit.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Arithmetic` if the coefficient is zero.
    pub fn from_default(&self, default_value: Decimal) -> DomainResult<Decimal> {
        super::from_default(&self.scale, default_value)
    }

    /// Converts a value in this unit to `target`, unchecked.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Arithmetic` if the target coefficient is zero.
    pub fn convert(&self, value: Decimal, target: &Self) -> DomainResult<Decimal> {
        convert(&self.scale, value, &target.scale)
    }
}

/// A set of units and their `default_unit` links.
#[derive(Debug, Clone, Default)]
pub struct UnitBasis {
    units: HashMap<UnitId, Unit>,
    links: Hierarchy<UnitId>,
}

impl UnitBasis {
    /// Creates an empty basis.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a unit.
    pub fn insert(&mut self, unit: Unit) {
        self.links.insert(unit.id, unit.default_unit);
        self.units.insert(unit.id, unit);
    }

    /// Looks up a unit.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// The `default_unit` chain starting at `id`.
    #[must_use]
    pub fn chain(&self, id: UnitId) -> Ancestry<UnitId> {
        self.links.ancestors(id)
    }

    /// The unit at the end of the `default_unit` chain.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredReference` for an unknown unit and
    /// `InvalidInput` if the chain loops.
    pub fn ultimate_default(&self, id: UnitId) -> DomainResult<UnitId> {
        self.path_to_root(id).map(|(root, _)| root)
    }

    /// Converts `value` in unit `id` into the unit at the end of its chain,
    /// applying the scale of every hop.
    ///
    /// # Errors
    ///
    /// The errors of [`Self::ultimate_default`], plus `Arithmetic` on overflow.
    pub fn to_ultimate_default(&self, id: UnitId, value: Decimal) -> DomainResult<Decimal> {
        let (_, path) = self.path_to_root(id)?;
        path.iter()
            .try_fold(value, |acc, unit| self.require(*unit)?.to_default(acc))
    }

    /// Inverse of [`Self::to_ultimate_default`].
    ///
    /// # Errors
    ///
    /// The errors of [`Self::ultimate_default`], plus `Arithmetic` if a
    /// coefficient on the way is zero or on overflow.
    pub fn from_ultimate_default(&self, id: UnitId, default_value: Decimal) -> DomainResult<Decimal> {
        let (_, path) = self.path_to_root(id)?;
        path.iter()
            .rev()
            .try_fold(default_value, |acc, unit| self.require(*unit)?.from_default(acc))
    }

    /// Converts `value` from one unit to another after checking that both
    /// resolve to the same default unit.
    ///
    /// Both units may sit several `default_unit` hops away from the shared
    /// root; the scales along each chain are composed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the units have different defaults, plus the
    /// errors of [`Self::to_ultimate_default`] and
    /// [`Self::from_ultimate_default`].
    pub fn convert_checked(&self, from: UnitId, value: Decimal, to: UnitId) -> DomainResult<Decimal> {
        let from_root = self.ultimate_default(from)?;
        let to_root = self.ultimate_default(to)?;
        if from_root != to_root {
            return Err(DomainError::InvalidInput(format!(
                "units {from} and {to} do not share a default unit"
            )));
        }

        let root_value = self.to_ultimate_default(from, value)?;
        self.from_ultimate_default(to, root_value)
    }

    /// Root of the chain at `id` and the units below it, `id` first.
    fn path_to_root(&self, id: UnitId) -> DomainResult<(UnitId, Vec<UnitId>)> {
        let chain = self.chain(id);
        if chain.is_cyclic() {
            return Err(DomainError::InvalidInput(format!(
                "default_unit chain of unit {id} loops"
            )));
        }
        let Some((root, path)) = chain.nodes.split_last() else {
            return Err(DomainError::MissingRequiredReference {
                entity: "unit",
                detail: id.to_string(),
            });
        };
        Ok((*root, path.to_vec()))
    }

    fn require(&self, id: UnitId) -> DomainResult<&Unit> {
        self.get(id).ok_or_else(|| DomainError::MissingRequiredReference {
            entity: "unit",
            detail: id.to_string(),
        })
    }
}

impl FromIterator<Unit> for UnitBasis {
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        let mut basis = Self::new();
        for unit in iter {
            basis.insert(unit);
        }
        basis
    }
}
