//! `SeaORM` Entity for target_data table.
//!
//! Append-only revision history of a target. No uniqueness.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "target_data")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub target_id: Uuid,
    pub publication_date: DateTimeUtc,
    pub base_year: i32,
    pub target_year: i32,
    pub covered_base: Decimal,
    pub targeted_reduction: Decimal,
    pub covered_target: Decimal,
    pub covered_pubyear: Decimal,
    pub percent_of_total: Decimal,
    pub description: String,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::targets::Entity",
        from = "Column::TargetId",
        to = "super::targets::Column::Id",
        on_delete = "Cascade"
    )]
    Targets,
}

impl Related<super::targets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Targets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
