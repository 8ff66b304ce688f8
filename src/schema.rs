//! Destination table bootstrap.
//!
//! The analytics schema is owned by the destination store; this module only
//! creates missing tables (`CREATE TABLE IF NOT EXISTS`) so that integration
//! tests and `auto_migrate` runs are self-contained. It never alters or
//! drops existing tables.

use sea_orm::{ConnectionTrait, DbBackend, Statement};
use tracing::info;

use crate::db::DbPool;
use crate::errors::EtlError;

/// Creates any missing destination tables.
///
/// # Errors
/// Returns `EtlError::Database` when a DDL statement fails.
pub async fn ensure_schema(db: &DbPool) -> Result<(), EtlError> {
    let backend = db.get_database_backend();

    // Auto-increment surrogate keys differ per backend; everything else is
    // portable across Postgres and SQLite.
    let serial_pk = match backend {
        DbBackend::Postgres => "BIGSERIAL PRIMARY KEY",
        _ => "INTEGER PRIMARY KEY AUTOINCREMENT",
    };
    let timestamp = match backend {
        DbBackend::Postgres => "TIMESTAMPTZ",
        _ => "TEXT",
    };
    // SQLite gives DECIMAL(...) columns NUMERIC affinity, which stores whole
    // numbers with INTEGER storage and breaks sqlx's float decoding; use REAL
    // affinity there instead.
    let money = match backend {
        DbBackend::Postgres => "DECIMAL(14,2)",
        _ => "REAL",
    };
    let rate = match backend {
        DbBackend::Postgres => "DECIMAL(5,2)",
        _ => "REAL",
    };

    let statements = [
        format!(
            r#"CREATE TABLE IF NOT EXISTS customers (
                customer_id      VARCHAR(40)  PRIMARY KEY,
                customer_name    VARCHAR(255) NOT NULL,
                customer_segment VARCHAR(50)  NOT NULL,
                region           VARCHAR(50)  NOT NULL,
                industry         VARCHAR(100) NOT NULL,
                credit_limit     {money} NOT NULL,
                credit_utilized  {money} NOT NULL,
                first_order_date DATE NOT NULL,
                last_order_date  DATE NOT NULL
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS product_catalog (
                product_id       VARCHAR(40)  PRIMARY KEY,
                product_name     VARCHAR(100) NOT NULL,
                product_category VARCHAR(50)  NOT NULL,
                product_family   VARCHAR(50)  NOT NULL,
                unit_cost        {money} NOT NULL,
                unit_price       {money} NOT NULL,
                launch_date      DATE NOT NULL,
                lifecycle_stage  VARCHAR(20)  NOT NULL,
                reorder_point    INTEGER NOT NULL,
                uom              VARCHAR(20)  NOT NULL
            )"#
        ),
        r#"CREATE TABLE IF NOT EXISTS salespeople (
            salesperson_id   VARCHAR(40)  PRIMARY KEY,
            salesperson_name VARCHAR(255) NOT NULL,
            department       VARCHAR(50)  NOT NULL,
            territory        VARCHAR(50)  NOT NULL,
            hire_date        DATE NOT NULL
        )"#
        .to_string(),
        format!(
            r#"CREATE TABLE IF NOT EXISTS sales_orders (
                order_id         VARCHAR(40)  PRIMARY KEY,
                order_date       DATE NOT NULL,
                customer_id      VARCHAR(40)  NOT NULL,
                product_category VARCHAR(50)  NOT NULL,
                product_name     VARCHAR(100) NOT NULL,
                quantity         INTEGER NOT NULL,
                revenue_amount   {money} NOT NULL,
                currency         VARCHAR(3)   NOT NULL,
                delivery_status  VARCHAR(20)  NOT NULL,
                salesperson_id   VARCHAR(40)  NOT NULL,
                quotation_id     VARCHAR(40),
                unit_price       {money} NOT NULL,
                unit_cost        {money} NOT NULL,
                gross_profit     {money} NOT NULL,
                discount_rate    {rate} NOT NULL,
                sales_channel    VARCHAR(30)  NOT NULL,
                created_at       {timestamp} NOT NULL
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS sales_quotations (
                quotation_id        VARCHAR(40)  PRIMARY KEY,
                quotation_date      DATE NOT NULL,
                customer_id         VARCHAR(40)  NOT NULL,
                product_category    VARCHAR(50)  NOT NULL,
                quoted_amount       {money} NOT NULL,
                currency            VARCHAR(3)   NOT NULL,
                status              VARCHAR(20)  NOT NULL,
                salesperson_id      VARCHAR(40)  NOT NULL,
                expected_close_date DATE NOT NULL,
                estimated_margin    {money} NOT NULL,
                probability         DOUBLE PRECISION NOT NULL,
                created_at          {timestamp} NOT NULL
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS sales_targets (
                id            {serial_pk},
                target_date   DATE NOT NULL,
                granularity   VARCHAR(20) NOT NULL,
                entity_id     VARCHAR(50) NOT NULL,
                target_amount {money} NOT NULL
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS sales_forecasts (
                id                {serial_pk},
                forecast_date     DATE NOT NULL,
                horizon           VARCHAR(50) NOT NULL,
                product_category  VARCHAR(50) NOT NULL,
                predicted_revenue {money} NOT NULL,
                predicted_margin  {money} NOT NULL
            )"#
        ),
        r#"CREATE TABLE IF NOT EXISTS inventory_snapshots (
            snapshot_date  DATE NOT NULL,
            product_id     VARCHAR(40) NOT NULL,
            stock_on_hand  INTEGER NOT NULL,
            reserved_units INTEGER NOT NULL,
            inbound_units  INTEGER NOT NULL,
            PRIMARY KEY (snapshot_date, product_id)
        )"#
        .to_string(),
    ];

    for sql in statements {
        db.execute(Statement::from_string(backend, sql)).await?;
    }

    info!("Destination schema verified");
    Ok(())
}
