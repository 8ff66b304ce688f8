//! Aggregate generators: monthly targets, weekly inventory snapshots, and
//! category forecasts. All three share the category/time grid and scaling
//! factors of the demand model so the aggregates stay numerically coherent
//! with the transaction stream.

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};

use crate::config::GenerationConfig;
use crate::entities::{
    inventory_snapshot, product, sales_forecast, sales_target, salesperson, TargetGranularity,
};
use crate::generate::synthesizer::round_money;

/// Minimum stock level regardless of reorder point.
const STOCK_FLOOR: i32 = 50;

/// Maximum units reserved against a snapshot.
const RESERVED_CAP: i32 = 50;

fn to_money(amount: f64) -> Decimal {
    round_money(Decimal::from_f64(amount).unwrap_or_default())
}

fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Builds target rows for every month in the window.
///
/// The company figure is scaled by the same seasonal/YoY factors as the
/// demand model; category rows partition it proportionally to base demand
/// weight, and salesperson rows split it equally with bounded jitter.
pub fn monthly_targets<R: Rng + ?Sized>(
    cfg: &GenerationConfig,
    start: NaiveDate,
    end: NaiveDate,
    salespeople: &[salesperson::Model],
    rng: &mut R,
) -> Vec<sales_target::ActiveModel> {
    let mut rows = Vec::new();
    let total_weight = cfg.total_weight();

    let mut month = month_start(start);
    while month <= end {
        let company = cfg.base_monthly_target
            * cfg.seasonal_factor(month.month())
            * cfg.yoy_factor(month.year());

        rows.push(sales_target::ActiveModel {
            id: NotSet,
            target_date: Set(month),
            granularity: Set(TargetGranularity::Company),
            entity_id: Set("ALL".to_string()),
            target_amount: Set(to_money(company)),
        });

        for category in &cfg.categories {
            let share = company * (category.base_rate / total_weight);
            rows.push(sales_target::ActiveModel {
                id: NotSet,
                target_date: Set(month),
                granularity: Set(TargetGranularity::Category),
                entity_id: Set(category.name.clone()),
                target_amount: Set(to_money(share)),
            });
        }

        if !salespeople.is_empty() {
            let split = company / salespeople.len() as f64;
            for sp in salespeople {
                let jitter = rng.gen_range(
                    cfg.salesperson_target_jitter.min..=cfg.salesperson_target_jitter.max,
                );
                rows.push(sales_target::ActiveModel {
                    id: NotSet,
                    target_date: Set(month),
                    granularity: Set(TargetGranularity::Salesperson),
                    entity_id: Set(sp.salesperson_id.clone()),
                    target_amount: Set(to_money(split * jitter)),
                });
            }
        }

        month = next_month(month);
    }
    rows
}

/// Builds weekly stock snapshots for every product over a trailing window
/// ending at `today`. One row per (snapshot_date, product_id).
pub fn inventory_snapshots<R: Rng + ?Sized>(
    products: &[product::Model],
    today: NaiveDate,
    weeks: u32,
    rng: &mut R,
) -> Vec<inventory_snapshot::Model> {
    let mut rows = Vec::with_capacity(products.len() * (weeks as usize + 1));

    for weeks_ago in (0..=weeks).rev() {
        let snapshot_date = today - Duration::weeks(weeks_ago as i64);
        for p in products {
            let stock_on_hand = (p.reorder_point + rng.gen_range(-50..=100)).max(STOCK_FLOOR);
            let reserved_units = rng.gen_range(0..=RESERVED_CAP.min(stock_on_hand));
            // Inbound shipments are occasional, not weekly.
            let inbound_units = if rng.gen_bool(0.3) {
                rng.gen_range(1..=100)
            } else {
                0
            };

            rows.push(inventory_snapshot::Model {
                snapshot_date,
                product_id: p.product_id.clone(),
                stock_on_hand,
                reserved_units,
                inbound_units,
            });
        }
    }
    rows
}

/// Builds forecast rows for every configured category and horizon.
///
/// The multiplier widens with the horizon index, modeling decreasing
/// certainty; bounded variation keeps rows plausible without a fixed seed.
pub fn forecasts<R: Rng + ?Sized>(
    cfg: &GenerationConfig,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<sales_forecast::ActiveModel> {
    let mut rows = Vec::with_capacity(cfg.categories.len() * cfg.forecast_horizons.len());

    for category in &cfg.categories {
        let base_revenue = cfg.forecast_revenue_per_weight * category.base_rate;
        let base_margin = base_revenue * cfg.forecast_margin_ratio;

        for (i, horizon) in cfg.forecast_horizons.iter().enumerate() {
            let multiplier = 1.0 + (i as f64 * 0.1);
            let variation = rng.gen_range(0.9..=1.1);

            rows.push(sales_forecast::ActiveModel {
                id: NotSet,
                forecast_date: Set(today),
                horizon: Set(horizon.clone()),
                product_category: Set(category.name.clone()),
                predicted_revenue: Set(to_money(base_revenue * multiplier * variation)),
                predicted_margin: Set(to_money(base_margin * multiplier * variation)),
            });
        }
    }
    rows
}
