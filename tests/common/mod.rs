//! Shared helpers for integration tests: an in-memory SQLite destination
//! with the full schema, plus a small master-data fixture.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, IntoActiveModel};

use sales_insights_seeder::entities::{customer, product, salesperson, LifecycleStage};
use sales_insights_seeder::schema::ensure_schema;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Connects an in-memory SQLite database and creates all tables.
///
/// A single connection is required: each `sqlite::memory:` connection is
/// its own database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("sqlite connect");
    ensure_schema(&db).await.expect("schema creation");
    db
}

pub fn sample_customers(n: usize) -> Vec<customer::Model> {
    (0..n)
        .map(|i| customer::Model {
            customer_id: format!("C{i:03}"),
            customer_name: format!("Customer {i}"),
            customer_segment: "Industrial".into(),
            region: "Central".into(),
            industry: "MANUFACTURING".into(),
            credit_limit: dec!(100000.00),
            credit_utilized: dec!(25000.00),
            first_order_date: date(2023, 3, 1),
            last_order_date: date(2025, 10, 20),
        })
        .collect()
}

pub fn sample_products() -> Vec<product::Model> {
    let specs = [
        ("P-PVC-1", "Marine PVC Leather", "PVC Leather", "PVC"),
        ("P-PVC-2", "Automotive PVC Leather", "PVC Leather", "PVC"),
        ("P-FAB-1", "Jacquard Upholstery", "Upholstery Fabric", "FAB"),
        ("P-FAB-2", "Velvet Upholstery", "Upholstery Fabric", "FAB"),
    ];
    specs
        .iter()
        .map(|(id, name, category, family)| product::Model {
            product_id: (*id).into(),
            product_name: (*name).into(),
            product_category: (*category).into(),
            product_family: (*family).into(),
            unit_cost: dec!(20.00),
            unit_price: dec!(44.00),
            launch_date: date(2023, 5, 1),
            lifecycle_stage: LifecycleStage::Growth,
            reorder_point: 150,
            uom: "ROLL".into(),
        })
        .collect()
}

pub fn sample_salespeople(n: usize) -> Vec<salesperson::Model> {
    (0..n)
        .map(|i| salesperson::Model {
            salesperson_id: format!("SS{i:02}"),
            salesperson_name: format!("Rep {i}"),
            department: "SALES".into(),
            territory: "Northern".into(),
            hire_date: date(2020, 1, 6),
        })
        .collect()
}

/// Inserts the standard fixture: 5 customers, 4 products in two configured
/// categories, 3 salespeople.
pub async fn seed_master(db: &DatabaseConnection) {
    customer::Entity::insert_many(
        sample_customers(5)
            .into_iter()
            .map(|m| m.into_active_model()),
    )
    .exec_without_returning(db)
    .await
    .expect("seed customers");

    product::Entity::insert_many(
        sample_products()
            .into_iter()
            .map(|m| m.into_active_model()),
    )
    .exec_without_returning(db)
    .await
    .expect("seed products");

    salesperson::Entity::insert_many(
        sample_salespeople(3)
            .into_iter()
            .map(|m| m.into_active_model()),
    )
    .exec_without_returning(db)
    .await
    .expect("seed salespeople");
}
