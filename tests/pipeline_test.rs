//! End-to-end pipeline tests against an in-memory SQLite destination.
//!
//! SQLite stores decimals as floating point, so monetary assertions compare
//! at two decimal places rather than exactly.

mod common;

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use common::{date, sample_customers, sample_products, sample_salespeople, seed_master, setup_db};
use sales_insights_seeder::config::AppConfig;
use sales_insights_seeder::entities::{
    customer, inventory_snapshot, product, sales_forecast, sales_order, sales_quotation,
    sales_target, salesperson, DeliveryStatus, TargetGranularity,
};
use sales_insights_seeder::masterdata::ExtractedMaster;
use sales_insights_seeder::{Pipeline, RunSummary};

const TODAY: (i32, u32, u32) = (2026, 1, 15);

fn window_config() -> AppConfig {
    let mut cfg = AppConfig::new(
        "sqlite::memory:",
        date(2025, 11, 1),
        date(2025, 12, 31),
    );
    cfg.random_seed = Some(42);
    cfg
}

fn today() -> NaiveDate {
    date(TODAY.0, TODAY.1, TODAY.2)
}

async fn run_pipeline(db: &DatabaseConnection, cfg: AppConfig) -> RunSummary {
    let mut pipeline = Pipeline::new(db.clone(), cfg, today());
    pipeline.run().await.expect("pipeline run")
}

#[tokio::test]
async fn full_run_populates_every_table() {
    let db = setup_db().await;
    seed_master(&db).await;

    let cfg = window_config();
    let categories = cfg.generation.categories.len() as u64;
    let horizons = cfg.generation.forecast_horizons.len() as u64;
    let weeks = cfg.generation.inventory_weeks as u64;

    let summary = run_pipeline(&db, cfg).await;

    assert!(summary.orders > 0, "no orders generated");
    assert!(summary.quotations > 0, "no quotations generated");
    // Two months in window, one company + category rows + 3 salespeople each.
    assert_eq!(summary.targets, 2 * (1 + categories + 3));
    // Four products, one row per trailing week plus the current one.
    assert_eq!(summary.inventory_snapshots, 4 * (weeks + 1));
    assert_eq!(summary.forecasts, categories * horizons);

    assert_eq!(
        sales_order::Entity::find().count(&db).await.unwrap(),
        summary.orders
    );
    assert_eq!(
        sales_quotation::Entity::find().count(&db).await.unwrap(),
        summary.quotations
    );
    assert_eq!(
        sales_target::Entity::find().count(&db).await.unwrap(),
        summary.targets
    );
    assert_eq!(
        inventory_snapshot::Entity::find().count(&db).await.unwrap(),
        summary.inventory_snapshots
    );
    assert_eq!(
        sales_forecast::Entity::find().count(&db).await.unwrap(),
        summary.forecasts
    );
}

#[tokio::test]
async fn orders_stay_in_window_with_unique_ids_and_valid_references() {
    let db = setup_db().await;
    seed_master(&db).await;
    let cfg = window_config();
    let (start, end) = (cfg.start_date, cfg.end_date);
    run_pipeline(&db, cfg).await;

    let customer_ids: HashSet<String> = customer::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.customer_id)
        .collect();
    let salesperson_ids: HashSet<String> = salesperson::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.salesperson_id)
        .collect();

    let orders = sales_order::Entity::find().all(&db).await.unwrap();
    let mut ids = HashSet::new();
    for o in &orders {
        assert!(ids.insert(o.order_id.clone()), "duplicate {}", o.order_id);
        assert!(o.order_id.starts_with("ORD-"));
        assert!(o.order_date >= start && o.order_date <= end);
        assert!((5..=200).contains(&o.quantity));
        assert_eq!(o.currency, "MYR");
        assert!(customer_ids.contains(&o.customer_id));
        assert!(salesperson_ids.contains(&o.salesperson_id));
        assert!(o.quotation_id.is_none());

        // Orders in a past window must have left the initial state.
        assert_ne!(o.delivery_status, DeliveryStatus::Pending);

        let quantity = Decimal::from(o.quantity);
        let discount = Decimal::ONE - o.discount_rate / Decimal::ONE_HUNDRED;
        let expected_revenue = (o.unit_price * quantity * discount).round_dp(2);
        let diff = (o.revenue_amount.round_dp(2) - expected_revenue).abs();
        assert!(diff <= dec!(0.01), "revenue off by {diff} on {}", o.order_id);
        assert!(o.gross_profit.round_dp(2) < o.revenue_amount.round_dp(2) + dec!(0.01));
    }
}

#[tokio::test]
async fn quotations_carry_bounded_probabilities_and_window_dates() {
    let db = setup_db().await;
    seed_master(&db).await;
    let cfg = window_config();
    let (start, end) = (cfg.start_date, cfg.end_date);
    run_pipeline(&db, cfg).await;

    let quotes = sales_quotation::Entity::find().all(&db).await.unwrap();
    assert!(!quotes.is_empty());

    let mut ids = HashSet::new();
    for q in &quotes {
        assert!(ids.insert(q.quotation_id.clone()));
        assert!(q.quotation_id.starts_with("QUO-"));
        assert!(q.quotation_date >= start && q.quotation_date <= end);
        assert!(q.expected_close_date > q.quotation_date);
        assert!((0.0..=1.0).contains(&q.probability));
        assert!(q.quoted_amount > Decimal::ZERO);
        assert!(q.estimated_margin > Decimal::ZERO);
        assert!(q.estimated_margin.round_dp(2) < q.quoted_amount.round_dp(2));
    }
}

#[tokio::test]
async fn rerunning_the_window_is_idempotent() {
    let db = setup_db().await;
    seed_master(&db).await;

    let first = run_pipeline(&db, window_config()).await;
    let second = run_pipeline(&db, window_config()).await;

    // Same seed, same window: the delete-then-insert phases replace their
    // output instead of accumulating it.
    assert_eq!(first.orders, second.orders);
    assert_eq!(first.quotations, second.quotations);
    assert_eq!(first.targets, second.targets);
    assert_eq!(first.forecasts, second.forecasts);

    assert_eq!(
        sales_order::Entity::find().count(&db).await.unwrap(),
        second.orders
    );
    assert_eq!(
        sales_target::Entity::find().count(&db).await.unwrap(),
        second.targets
    );
    assert_eq!(
        sales_forecast::Entity::find().count(&db).await.unwrap(),
        second.forecasts
    );

    // Snapshots upsert on (snapshot_date, product_id) and never duplicate.
    let snapshots = inventory_snapshot::Entity::find().all(&db).await.unwrap();
    assert_eq!(snapshots.len() as u64, second.inventory_snapshots);
    let keys: HashSet<(NaiveDate, String)> = snapshots
        .iter()
        .map(|s| (s.snapshot_date, s.product_id.clone()))
        .collect();
    assert_eq!(keys.len(), snapshots.len());
}

#[tokio::test]
async fn missing_master_data_skips_transactions_but_writes_aggregates() {
    let db = setup_db().await;

    let cfg = window_config();
    let categories = cfg.generation.categories.len() as u64;
    let horizons = cfg.generation.forecast_horizons.len() as u64;
    let summary = run_pipeline(&db, cfg).await;

    assert_eq!(summary.orders, 0);
    assert_eq!(summary.quotations, 0);
    assert_eq!(summary.inventory_snapshots, 0);
    // Company and category targets do not need master data.
    assert_eq!(summary.targets, 2 * (1 + categories));
    assert_eq!(summary.forecasts, categories * horizons);

    let targets = sales_target::Entity::find().all(&db).await.unwrap();
    assert!(targets
        .iter()
        .all(|t| t.granularity != TargetGranularity::Salesperson));
}

#[tokio::test]
async fn master_load_ignores_existing_rows() {
    let db = setup_db().await;

    let extracted = ExtractedMaster {
        customers: sample_customers(5),
        products: sample_products(),
        salespeople: sample_salespeople(3),
    };

    let pipeline = Pipeline::new(db.clone(), window_config(), today());
    pipeline.load_master(&extracted).await.expect("first load");
    pipeline.load_master(&extracted).await.expect("second load");

    assert_eq!(customer::Entity::find().count(&db).await.unwrap(), 5);
    assert_eq!(product::Entity::find().count(&db).await.unwrap(), 4);
    assert_eq!(salesperson::Entity::find().count(&db).await.unwrap(), 3);
}

#[tokio::test]
async fn fixed_seed_reproduces_the_dataset() {
    let db_a = setup_db().await;
    let db_b = setup_db().await;
    seed_master(&db_a).await;
    seed_master(&db_b).await;

    let summary_a = run_pipeline(&db_a, window_config()).await;
    let summary_b = run_pipeline(&db_b, window_config()).await;

    assert_eq!(summary_a.orders, summary_b.orders);
    assert_eq!(summary_a.quotations, summary_b.quotations);

    let ids_a: Vec<String> = sales_order::Entity::find()
        .all(&db_a)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.order_id)
        .collect();
    let ids_b: Vec<String> = sales_order::Entity::find()
        .all(&db_b)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.order_id)
        .collect();
    assert_eq!(ids_a, ids_b);
}
