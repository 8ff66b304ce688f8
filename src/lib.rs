//! Sales Insights Seeder Library
//!
//! This crate synthesizes a temporally and relationally consistent sales
//! dataset (orders, quotations, targets, forecasts, inventory snapshots)
//! from a small set of real master entities, and loads it into the
//! `sales_insights` analytics schema used by the demo dashboards.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod generate;
pub mod masterdata;
pub mod pipeline;
pub mod schema;

pub use config::AppConfig;
pub use errors::{EtlError, Phase};
pub use pipeline::{Pipeline, RunSummary};
