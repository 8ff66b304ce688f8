use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product master record from the source catalog.
///
/// `unit_price` is always above `unit_cost`; the extract phase derives the
/// price as a bounded markup over cost.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_catalog")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: String,
    pub product_name: String,
    pub product_category: String,
    pub product_family: String,
    pub unit_cost: Decimal,
    pub unit_price: Decimal,
    pub launch_date: NaiveDate,
    pub lifecycle_stage: LifecycleStage,
    pub reorder_point: i32,
    pub uom: String,
}

/// Commercial lifecycle position. Descriptive only; no transitions are
/// modeled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum LifecycleStage {
    #[sea_orm(string_value = "Launch")]
    Launch,
    #[sea_orm(string_value = "Growth")]
    Growth,
    #[sea_orm(string_value = "Mature")]
    Mature,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_snapshot::Entity")]
    InventorySnapshots,
}

impl Related<super::inventory_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventorySnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
