//! Synthetic data generators: the demand model, the transaction
//! synthesizer, the lifecycle state assigner, and the aggregate builders.
//!
//! Everything here is pure over its inputs: the reference date and the
//! random source are injected, and persistence lives in [`crate::pipeline`].

pub mod aggregates;
pub mod demand;
pub mod lifecycle;
pub mod synthesizer;

pub use demand::DemandModel;
pub use synthesizer::Synthesizer;
