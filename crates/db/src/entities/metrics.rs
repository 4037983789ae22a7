//! `SeaORM` Entity for metrics table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "metrics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::metric_units::Entity")]
    MetricUnits,
}

impl Related<super::metric_units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MetricUnits.def()
    }
}

impl Related<super::units::Entity> for Entity {
    fn to() -> RelationDef {
        super::metric_units::Relation::Units.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::metric_units::Relation::Metrics.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
