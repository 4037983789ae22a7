//! `SeaORM` Entity for units table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub default_unit_id: Option<Uuid>,
    pub coeff: Option<Decimal>,
    #[sea_orm(column_name = "const")]
    pub constant: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::DefaultUnitId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    DefaultUnit,
}

impl ActiveModelBehavior for ActiveModel {}
