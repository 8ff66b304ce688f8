//! Pipeline orchestration and persistence.
//!
//! Phases run strictly sequentially, each inside its own transaction:
//! orders, quotations, targets, inventory, forecasts. A failure rolls back
//! only the failing phase; earlier commits stay. Concurrent runs over
//! overlapping windows are not supported and must be serialized externally.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, Insert,
    IntoActiveModel, QueryFilter, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::entities::{
    inventory_snapshot, sales_forecast, sales_order, sales_quotation, sales_target,
};
use crate::errors::{EtlError, Phase};
use crate::generate::{aggregates, Synthesizer};
use crate::masterdata::{self, ExtractedMaster, MasterData};

/// Rows per multi-row INSERT; keeps bind-parameter counts comfortably
/// under every backend's limit.
const INSERT_CHUNK: usize = 200;

/// Per-phase record counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunSummary {
    pub orders: u64,
    pub quotations: u64,
    pub targets: u64,
    pub inventory_snapshots: u64,
    pub forecasts: u64,
}

impl RunSummary {
    pub fn total(&self) -> u64 {
        self.orders + self.quotations + self.targets + self.inventory_snapshots + self.forecasts
    }
}

/// The seeding pipeline. Owns the destination pool, the configuration,
/// the reference date for lifecycle bucketing, and the random source.
///
/// The reference date and RNG seed are injected so runs are deterministic
/// under test while remaining entropy-seeded in production.
pub struct Pipeline {
    db: DbPool,
    cfg: AppConfig,
    today: NaiveDate,
    rng: StdRng,
}

impl Pipeline {
    pub fn new(db: DbPool, cfg: AppConfig, today: NaiveDate) -> Self {
        let rng = match cfg.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            db,
            cfg,
            today,
            rng,
        }
    }

    /// Extracts master data from the source and loads it into the
    /// destination with insert-or-ignore semantics.
    pub async fn extract_and_load(&mut self, source: &DbPool) -> Result<(), EtlError> {
        let extracted =
            masterdata::extract_master_data(source, &mut self.rng, self.today, 100, 8)
                .await
                .map_err(|e| e.in_phase(Phase::MasterData))?;
        self.load_master(&extracted)
            .await
            .map_err(|e| e.in_phase(Phase::MasterData))
    }

    /// Loads pre-extracted master rows inside one transaction.
    pub async fn load_master(&self, extracted: &ExtractedMaster) -> Result<(), EtlError> {
        let txn = self.db.begin().await?;
        let (customers, products, salespeople) =
            masterdata::load_master_data(&txn, extracted).await?;
        txn.commit().await?;

        info!(
            customers,
            products, salespeople, "Master data load complete"
        );
        Ok(())
    }

    /// Runs all generation phases over the configured window and returns
    /// per-phase record counts.
    pub async fn run(&mut self) -> Result<RunSummary, EtlError> {
        let master = MasterData::load(&self.db).await?;

        let unconfigured = master.unconfigured_categories(&self.cfg.generation);
        if !unconfigured.is_empty() {
            warn!(
                categories = ?unconfigured,
                "Catalog categories without a configured base rate will generate no transactions"
            );
        }

        let mut summary = RunSummary::default();

        summary.orders = self
            .orders_phase(&master)
            .await
            .map_err(|e| e.in_phase(Phase::Orders))?;
        info!(phase = %Phase::Orders, records = summary.orders, "Phase complete");

        summary.quotations = self
            .quotations_phase(&master)
            .await
            .map_err(|e| e.in_phase(Phase::Quotations))?;
        info!(phase = %Phase::Quotations, records = summary.quotations, "Phase complete");

        summary.targets = self
            .targets_phase(&master)
            .await
            .map_err(|e| e.in_phase(Phase::Targets))?;
        info!(phase = %Phase::Targets, records = summary.targets, "Phase complete");

        summary.inventory_snapshots = self
            .inventory_phase(&master)
            .await
            .map_err(|e| e.in_phase(Phase::Inventory))?;
        info!(
            phase = %Phase::Inventory,
            records = summary.inventory_snapshots,
            "Phase complete"
        );

        summary.forecasts = self
            .forecasts_phase()
            .await
            .map_err(|e| e.in_phase(Phase::Forecasts))?;
        info!(phase = %Phase::Forecasts, records = summary.forecasts, "Phase complete");

        Ok(summary)
    }

    async fn orders_phase(&mut self, master: &MasterData) -> Result<u64, EtlError> {
        if master.is_incomplete() {
            warn!("Master data incomplete; skipping order generation");
            return Ok(0);
        }

        let (start, end) = (self.cfg.start_date, self.cfg.end_date);
        let txn = self.db.begin().await?;

        let deleted = sales_order::Entity::delete_many()
            .filter(sales_order::Column::OrderDate.between(start, end))
            .exec(&txn)
            .await?;
        debug!(rows = deleted.rows_affected, "Cleared orders in window");

        let synth = Synthesizer::new(
            master,
            &self.cfg.generation,
            self.today,
            &self.cfg.currency,
        );
        let rng = &mut self.rng;

        let mut seen: HashSet<String> = HashSet::new();
        let mut total = 0u64;
        let mut day = start;
        while day <= end {
            if day.day() == 1 {
                info!(month = %day.format("%Y-%m"), "Generating orders");
            }
            let records = synth.orders_for_date(day, rng);
            for r in &records {
                if !seen.insert(r.order_id.clone()) {
                    return Err(EtlError::IdCollision(r.order_id.clone()));
                }
            }
            total += records.len() as u64;
            insert_chunked(
                &txn,
                records
                    .into_iter()
                    .map(|m| m.into_active_model())
                    .collect(),
            )
            .await?;
            day += Duration::days(1);
        }

        txn.commit().await?;
        Ok(total)
    }

    async fn quotations_phase(&mut self, master: &MasterData) -> Result<u64, EtlError> {
        if master.is_incomplete() {
            warn!("Master data incomplete; skipping quotation generation");
            return Ok(0);
        }

        let (start, end) = (self.cfg.start_date, self.cfg.end_date);
        let txn = self.db.begin().await?;

        let deleted = sales_quotation::Entity::delete_many()
            .filter(sales_quotation::Column::QuotationDate.between(start, end))
            .exec(&txn)
            .await?;
        debug!(rows = deleted.rows_affected, "Cleared quotations in window");

        let synth = Synthesizer::new(
            master,
            &self.cfg.generation,
            self.today,
            &self.cfg.currency,
        );
        let rng = &mut self.rng;

        let mut seen: HashSet<String> = HashSet::new();
        let mut total = 0u64;
        let mut day = start;
        while day <= end {
            if day.day() == 1 {
                info!(month = %day.format("%Y-%m"), "Generating quotations");
            }
            let records = synth.quotations_for_date(day, rng);
            for r in &records {
                if !seen.insert(r.quotation_id.clone()) {
                    return Err(EtlError::IdCollision(r.quotation_id.clone()));
                }
            }
            total += records.len() as u64;
            insert_chunked(
                &txn,
                records
                    .into_iter()
                    .map(|m| m.into_active_model())
                    .collect(),
            )
            .await?;
            day += Duration::days(1);
        }

        txn.commit().await?;
        Ok(total)
    }

    async fn targets_phase(&mut self, master: &MasterData) -> Result<u64, EtlError> {
        let (start, end) = (self.cfg.start_date, self.cfg.end_date);
        if master.salespeople.is_empty() {
            warn!("No salespeople loaded; monthly targets will carry company and category rows only");
        }

        let rows = aggregates::monthly_targets(
            &self.cfg.generation,
            start,
            end,
            &master.salespeople,
            &mut self.rng,
        );

        let txn = self.db.begin().await?;
        let deleted = sales_target::Entity::delete_many()
            .filter(sales_target::Column::TargetDate.between(start.with_day(1).unwrap_or(start), end))
            .exec(&txn)
            .await?;
        debug!(rows = deleted.rows_affected, "Cleared targets in window");

        let total = rows.len() as u64;
        insert_chunked(&txn, rows).await?;
        txn.commit().await?;
        Ok(total)
    }

    async fn inventory_phase(&mut self, master: &MasterData) -> Result<u64, EtlError> {
        if master.products.is_empty() {
            warn!("No products loaded; skipping inventory snapshots");
            return Ok(0);
        }

        let rows = aggregates::inventory_snapshots(
            &master.products,
            self.today,
            self.cfg.generation.inventory_weeks,
            &mut self.rng,
        );
        let total = rows.len() as u64;

        let txn = self.db.begin().await?;
        upsert_snapshots(&txn, rows).await?;
        txn.commit().await?;
        Ok(total)
    }

    async fn forecasts_phase(&mut self) -> Result<u64, EtlError> {
        let rows = aggregates::forecasts(&self.cfg.generation, self.today, &mut self.rng);
        let total = rows.len() as u64;

        let txn = self.db.begin().await?;
        // Forecasts are fully superseded on every run.
        let deleted = sales_forecast::Entity::delete_many().exec(&txn).await?;
        debug!(rows = deleted.rows_affected, "Cleared previous forecasts");

        insert_chunked(&txn, rows).await?;
        txn.commit().await?;
        Ok(total)
    }
}

/// Inserts rows in bounded chunks inside the given transaction.
async fn insert_chunked<A>(txn: &DatabaseTransaction, models: Vec<A>) -> Result<(), DbErr>
where
    A: ActiveModelTrait + Send,
    <<A as ActiveModelTrait>::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    let mut iter = models.into_iter().peekable();
    while iter.peek().is_some() {
        let chunk: Vec<A> = iter.by_ref().take(INSERT_CHUNK).collect();
        Insert::many(chunk).exec_without_returning(txn).await?;
    }
    Ok(())
}

/// Upserts inventory snapshots keyed by (snapshot_date, product_id):
/// re-running a window updates rows in place instead of duplicating them.
async fn upsert_snapshots(
    txn: &DatabaseTransaction,
    rows: Vec<inventory_snapshot::Model>,
) -> Result<(), DbErr> {
    let mut iter = rows.into_iter().peekable();
    while iter.peek().is_some() {
        let chunk: Vec<inventory_snapshot::ActiveModel> = iter
            .by_ref()
            .take(INSERT_CHUNK)
            .map(|m| m.into_active_model())
            .collect();
        inventory_snapshot::Entity::insert_many(chunk)
            .on_conflict(
                OnConflict::columns([
                    inventory_snapshot::Column::SnapshotDate,
                    inventory_snapshot::Column::ProductId,
                ])
                .update_columns([
                    inventory_snapshot::Column::StockOnHand,
                    inventory_snapshot::Column::ReservedUnits,
                    inventory_snapshot::Column::InboundUnits,
                ])
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;
    }
    Ok(())
}
