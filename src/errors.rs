use sea_orm::error::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Named pipeline phases, used for progress reporting and for attributing
/// failures to the phase whose transaction rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    MasterData,
    Orders,
    Quotations,
    Targets,
    Inventory,
    Forecasts,
}

/// Error taxonomy for the seeding pipeline.
///
/// Connectivity and configuration problems are fatal before any mutation.
/// Missing master data is deliberately NOT represented here: generation
/// steps skip and log instead of failing when a master collection is empty.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// Generated identifiers are deterministic (`ORD-{date}-{seq}`), so a
    /// collision within a run indicates a sequence counter bug and aborts
    /// the phase's transaction.
    #[error("duplicate generated id '{0}': sequence counter produced a collision")]
    IdCollision(String),

    #[error("{phase} phase failed: {source}")]
    Phase {
        phase: Phase,
        #[source]
        source: Box<EtlError>,
    },
}

impl EtlError {
    /// Wraps an error with the phase it occurred in, unless it is already
    /// attributed to a phase.
    pub fn in_phase(self, phase: Phase) -> Self {
        match self {
            err @ EtlError::Phase { .. } => err,
            other => EtlError::Phase {
                phase,
                source: Box::new(other),
            },
        }
    }

    /// The phase this error is attributed to, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            EtlError::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_wrapping_is_idempotent() {
        let err = EtlError::Validation("bad rate table".into()).in_phase(Phase::Orders);
        assert_eq!(err.phase(), Some(Phase::Orders));

        // Re-wrapping must not bury the original phase.
        let rewrapped = err.in_phase(Phase::Targets);
        assert_eq!(rewrapped.phase(), Some(Phase::Orders));
    }

    #[test]
    fn phase_display_is_kebab_case() {
        assert_eq!(Phase::MasterData.to_string(), "master-data");
        assert_eq!(Phase::Orders.to_string(), "orders");
    }
}
