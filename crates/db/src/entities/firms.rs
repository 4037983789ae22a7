//! `SeaORM` Entity for firms table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "firms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub hq_location_id: Option<Uuid>,
    pub account_number: Option<i32>,
    pub sector_id: Option<Uuid>,
    pub sub_sector_id: Option<Uuid>,
    pub industry_id: Option<Uuid>,
    pub sub_industry_id: Option<Uuid>,
    pub cdp_industry_id: Option<Uuid>,
    pub cdp_sector_id: Option<Uuid>,
    pub cdp_activity_id: Option<Uuid>,
    pub currency_id: Option<Uuid>,
    pub has_scope1: bool,
    pub has_scope2: bool,
    pub has_scope3: bool,
    pub has_targets: bool,
    pub site: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::locations::Entity",
        from = "Column::HqLocationId",
        to = "super::locations::Column::Id",
        on_delete = "SetNull"
    )]
    HqLocation,
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::CurrencyId",
        to = "super::currencies::Column::Id",
        on_delete = "SetNull"
    )]
    Currencies,
    #[sea_orm(has_many = "super::isins::Entity")]
    Isins,
    #[sea_orm(has_many = "super::tickers::Entity")]
    Tickers,
    #[sea_orm(has_many = "super::targets::Entity")]
    Targets,
}

impl Related<super::isins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Isins.def()
    }
}

impl Related<super::tickers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickers.def()
    }
}

impl Related<super::targets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Targets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
