//! `SeaORM` Entity for isins table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "isins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub firm_id: Uuid,
    pub last_used: DateTimeUtc,
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
}

impl Related<super::firms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Firms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
