use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Weekly stock snapshot, one row per (snapshot_date, product_id).
///
/// Writes are upserts on the composite key, so regenerating a window
/// updates rows in place rather than duplicating them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub snapshot_date: NaiveDate,
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: String,
    pub stock_on_hand: i32,
    /// Never exceeds `stock_on_hand`.
    pub reserved_units: i32,
    pub inbound_units: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::ProductId"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
