//! `SeaORM` Entity for location_components join table.
//!
//! Membership of composite locations. Independent of `locations.parent_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "location_components")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub location_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub component_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::locations::Entity",
        from = "Column::LocationId",
        to = "super::locations::Column::Id",
        on_delete = "Cascade"
    )]
    Composite,
    #[sea_orm(
        belongs_to = "super::locations::Entity",
        from = "Column::ComponentId",
        to = "super::locations::Column::Id",
        on_delete = "Cascade"
    )]
    Component,
}

impl ActiveModelBehavior for ActiveModel {}
