//! Engine error taxonomy.
//!
//! Three failure classes cross the engine boundary: invalid numeric input
//! (rejected before any classification ladder runs), an unavailable critical
//! record store (retryable, always surfaced to the caller), and a detected
//! violation of the single-active-record invariant (surfaced, never silently
//! repaired by picking one record).

use crate::store::StoreError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A numeric field was outside its physically possible range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The critical record store could not be read or written during
    /// reconciliation. The triggering reading must not be considered fully
    /// processed; callers may retry.
    #[error("critical record store unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),

    /// More than one active critical record was found for a patient.
    #[error(
        "patient {patient_id} has {active_count} active critical records, expected at most one"
    )]
    InconsistentState {
        patient_id: Uuid,
        active_count: usize,
    },

    /// A validated value type could not be constructed.
    #[error(transparent)]
    Value(#[from] vigil_types::ValueError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
