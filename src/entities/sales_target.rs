use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A monthly sales target at company, category, or salesperson granularity.
///
/// Category targets for a month partition the company target; salesperson
/// targets are an equal split with bounded individual jitter.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_targets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// First day of the target month.
    pub target_date: NaiveDate,
    pub granularity: TargetGranularity,
    /// Category name, salesperson id, or "ALL" for company rows.
    pub entity_id: String,
    pub target_amount: Decimal,
}

/// Aggregation level of a target row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum TargetGranularity {
    #[sea_orm(string_value = "company")]
    Company,
    #[sea_orm(string_value = "category")]
    Category,
    #[sea_orm(string_value = "salesperson")]
    Salesperson,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
