use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer master record, keyed by the source system's natural id.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub customer_id: String,
    pub customer_name: String,
    pub customer_segment: String,
    pub region: String,
    pub industry: String,
    /// Approved credit line; `credit_utilized` should stay within it, but
    /// the source data treats this as a soft limit.
    pub credit_limit: Decimal,
    pub credit_utilized: Decimal,
    pub first_order_date: NaiveDate,
    pub last_order_date: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sales_order::Entity")]
    Orders,
    #[sea_orm(has_many = "super::sales_quotation::Entity")]
    Quotations,
}

impl Related<super::sales_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::sales_quotation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
