//! Critical record storage.
//!
//! The critical record store is the engine's only stateful resource. The
//! trait is deliberately narrow: the reconciler is the single writer and
//! performs its own find-existing / decide / create-update-delete sequence
//! under a per-patient lock, so implementations only need plain reads and
//! writes. `find_active` returns every active record rather than at most
//! one, so an invariant violation in the underlying storage is observable
//! instead of being masked by an arbitrary pick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;
use vigil_types::{RecordStatus, RiskProbability};

/// Errors raised by a critical record store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read critical records: {0}")]
    Read(String),
    #[error("failed to write critical record: {0}")]
    Write(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The single stateful entity: a patient's active critical condition.
///
/// At most one active record may exist per patient at any time. The record
/// is updated in place while the condition persists and hard-deleted when it
/// clears; there is no resolved-history trail on the canonical path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CriticalRecord {
    pub patient_id: Uuid,
    /// The triggered reason texts, in evaluation order.
    pub reasons: Vec<String>,
    /// Maximum of the triggered reasons' candidate risks.
    pub risk_level: RiskProbability,
    pub status: RecordStatus,
    /// Creation time, refreshed on every in-place update.
    pub created_at: DateTime<Utc>,
}

/// Durable storage for critical records.
///
/// Implementations must be safe to share across threads; atomicity of the
/// read-decide-write cycle is the reconciler's responsibility, not the
/// store's.
pub trait CriticalRecordStore: Send + Sync {
    /// Returns all active records for the patient, oldest first.
    fn find_active(&self, patient_id: Uuid) -> StoreResult<Vec<CriticalRecord>>;

    /// Inserts a new record.
    fn insert(&self, record: CriticalRecord) -> StoreResult<()>;

    /// Replaces the patient's active record with `record`.
    fn update(&self, record: CriticalRecord) -> StoreResult<()>;

    /// Deletes the patient's active records. Returns `true` if anything was
    /// deleted; deleting an absent record is a no-op.
    fn delete_active(&self, patient_id: Uuid) -> StoreResult<bool>;
}

/// In-memory critical record store backed by a mutex-guarded map.
///
/// Suitable for tests and single-process deployments; a database-backed
/// implementation would satisfy the same trait.
#[derive(Debug, Default)]
pub struct InMemoryCriticalRecordStore {
    records: Mutex<HashMap<Uuid, Vec<CriticalRecord>>>,
}

impl InMemoryCriticalRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record without any invariant checks. Test seam for setting
    /// up inconsistent states that the reconciler must detect.
    pub fn insert_unchecked(&self, record: CriticalRecord) {
        let mut guard = lock_recovering(&self.records);
        guard.entry(record.patient_id).or_default().push(record);
    }

    /// Returns the number of records held for the patient, any status.
    pub fn record_count(&self, patient_id: Uuid) -> usize {
        let guard = lock_recovering(&self.records);
        guard.get(&patient_id).map_or(0, Vec::len)
    }
}

/// Recovers the inner data from a poisoned mutex instead of panicking; the
/// map itself is always left structurally valid by the operations below.
fn lock_recovering<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl CriticalRecordStore for InMemoryCriticalRecordStore {
    fn find_active(&self, patient_id: Uuid) -> StoreResult<Vec<CriticalRecord>> {
        let guard = lock_recovering(&self.records);
        Ok(guard
            .get(&patient_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.status == RecordStatus::Active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn insert(&self, record: CriticalRecord) -> StoreResult<()> {
        let mut guard = lock_recovering(&self.records);
        guard.entry(record.patient_id).or_default().push(record);
        Ok(())
    }

    fn update(&self, record: CriticalRecord) -> StoreResult<()> {
        let mut guard = lock_recovering(&self.records);
        let records = guard.entry(record.patient_id).or_default();
        match records
            .iter_mut()
            .find(|r| r.status == RecordStatus::Active)
        {
            Some(existing) => *existing = record,
            None => {
                return Err(StoreError::Write(format!(
                    "no active record to update for patient {}",
                    record.patient_id
                )))
            }
        }
        Ok(())
    }

    fn delete_active(&self, patient_id: Uuid) -> StoreResult<bool> {
        let mut guard = lock_recovering(&self.records);
        let Some(records) = guard.get_mut(&patient_id) else {
            return Ok(false);
        };
        let before = records.len();
        records.retain(|r| r.status != RecordStatus::Active);
        let deleted = records.len() < before;
        if records.is_empty() {
            guard.remove(&patient_id);
        }
        Ok(deleted)
    }
}
