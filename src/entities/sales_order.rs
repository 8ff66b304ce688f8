use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A synthesized sales order.
///
/// `order_id` is deterministic (`ORD-{YYYYMMDD}-{seq:04}`) with a per-day
/// sequence, so uniqueness holds as long as runs over the same window are
/// not concurrent.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: String,
    pub order_date: NaiveDate,
    pub customer_id: String,
    pub product_category: String,
    pub product_name: String,
    pub quantity: i32,
    /// `unit_price * quantity * (1 - discount/100)`, rounded half-up to 2dp.
    pub revenue_amount: Decimal,
    pub currency: String,
    pub delivery_status: DeliveryStatus,
    pub salesperson_id: String,
    #[sea_orm(nullable)]
    pub quotation_id: Option<String>,
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
    /// `(unit_price - unit_cost) * quantity * (1 - discount/100)`, 2dp.
    pub gross_profit: Decimal,
    /// Whole percent.
    pub discount_rate: Decimal,
    pub sales_channel: String,
    pub created_at: DateTime<Utc>,
}

/// Delivery status enumeration; values match the destination enum labels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum DeliveryStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Shipped")]
    Shipped,
    #[sea_orm(string_value = "Delivered")]
    Delivered,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::CustomerId"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::salesperson::Entity",
        from = "Column::SalespersonId",
        to = "super::salesperson::Column::SalespersonId"
    )]
    Salesperson,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::salesperson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Salesperson.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
