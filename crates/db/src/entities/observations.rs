//! `SeaORM` Entity for observations table.
//!
//! One row per fact of any kind. Columns that only some kinds use are
//! nullable; `kind` says which ones are meaningful. `dedup_key` holds the
//! fingerprint of the kind's key tuple and carries the unique index.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "observations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// `general`, `scope1`, `scope2`, `scope3`, `intensity` or `qualitative`.
    pub kind: String,
    pub firm_id: Uuid,
    pub date: DateTimeUtc,
    pub location_id: Option<Uuid>,
    pub source_id: Option<Uuid>,
    pub timescale: String,
    pub forecast: bool,
    pub most_recent: bool,
    pub last_available: bool,
    pub publication_date: Option<DateTimeUtc>,

    // measurement
    pub metric_id: Option<Uuid>,
    pub value: Option<Decimal>,
    pub unit_id: Option<Uuid>,
    pub datatype: Option<String>,
    pub location_based: Option<bool>,

    // general
    pub currency_id: Option<Uuid>,
    pub native_currency: Option<bool>,

    // scope 1/2/3
    pub interpolation: Option<bool>,
    pub amendment: Option<bool>,
    pub scheme: Option<String>,
    pub scope_source: Option<String>,
    pub calculation_method: Option<String>,
    pub scope_source_cleaned: Option<String>,
    pub most_common_scope_source: Option<bool>,
    pub scp3_pcnt_from_other_sources: Option<Decimal>,
    pub scp3_most_common_source: Option<bool>,

    // intensity
    pub numerator: Option<String>,
    pub denominator: Option<String>,

    // qualitative
    pub text_value: Option<String>,

    #[sea_orm(unique)]
    pub dedup_key: String,
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
    #[sea_orm(
        belongs_to = "super::locations::Entity",
        from = "Column::LocationId",
        to = "super::locations::Column::Id",
        on_delete = "Cascade"
    )]
    Locations,
    #[sea_orm(
        belongs_to = "super::sources::Entity",
        from = "Column::SourceId",
        to = "super::sources::Column::Id",
        on_delete = "SetNull"
    )]
    Sources,
    #[sea_orm(
        belongs_to = "super::metrics::Entity",
        from = "Column::MetricId",
        to = "super::metrics::Column::Id",
        on_delete = "Cascade"
    )]
    Metrics,
    #[sea_orm(
        belongs_to = "super::units::Entity",
        from = "Column::UnitId",
        to = "super::units::Column::Id",
        on_delete = "SetNull"
    )]
    Units,
}

impl Related<super::firms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Firms.def()
    }
}

impl Related<super::units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Units.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
