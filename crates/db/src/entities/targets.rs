//! `SeaORM` Entity for targets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "targets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub firm_id: Uuid,
    pub reference_number: i32,
    pub date_set: DateTimeUtc,
    pub status: String,
    pub scope: String,
    pub scope2_scheme: String,
    pub scope3_source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::firms::Entity",
        from = "Column::FirmId",
        to = "super::firms::Column::Id",
        on_delete = "Cascade"
    )]
    Firms,
    #[sea_orm(has_many = "super::target_data::Entity")]
    TargetData,
}

impl Related<super::firms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Firms.def()
    }
}

impl Related<super::target_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TargetData.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
