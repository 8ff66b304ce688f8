//! SeaORM entities for the `sales_insights` destination tables.

pub mod customer;
pub mod inventory_snapshot;
pub mod product;
pub mod sales_forecast;
pub mod sales_order;
pub mod sales_quotation;
pub mod sales_target;
pub mod salesperson;

pub use product::LifecycleStage;
pub use sales_order::DeliveryStatus;
pub use sales_quotation::QuotationStatus;
pub use sales_target::TargetGranularity;
