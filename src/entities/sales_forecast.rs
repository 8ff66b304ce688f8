use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A revenue/margin forecast for one category and horizon bucket.
///
/// Forecast rows are fully overwritten on every run; variation widens as
/// the horizon lengthens.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_forecasts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub forecast_date: NaiveDate,
    /// Named forward-looking bucket, e.g. "Next Month".
    pub horizon: String,
    pub product_category: String,
    pub predicted_revenue: Decimal,
    pub predicted_margin: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
