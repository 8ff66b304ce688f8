use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A synthesized quotation (`QUO-{YYYYMMDD}-{seq:04}`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_quotations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub quotation_id: String,
    pub quotation_date: NaiveDate,
    pub customer_id: String,
    pub product_category: String,
    /// `unit_price * quantity`, no discount applied at quotation time.
    pub quoted_amount: Decimal,
    pub currency: String,
    pub status: QuotationStatus,
    pub salesperson_id: String,
    pub expected_close_date: NaiveDate,
    /// `(unit_price - unit_cost) * quantity`, 2dp.
    pub estimated_margin: Decimal,
    /// Win probability in `[0, 1]`, sampled per status bucket.
    pub probability: f64,
    pub created_at: DateTime<Utc>,
}

/// Quotation status enumeration; values match the destination enum labels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum QuotationStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Lost")]
    Lost,
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
