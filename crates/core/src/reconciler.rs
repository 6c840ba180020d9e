//! Critical-state reconciliation.
//!
//! The reconciler keeps each patient's single active [`CriticalRecord`] in
//! agreement with the latest triggering reading. Every mutation of the
//! critical record store funnels through [`CriticalStateReconciler::apply`]:
//! the vitals-triad path and the encounter-summary path both evaluate their
//! trigger set and then run the same find-existing / decide /
//! create-update-delete sequence, so no writer can bypass the
//! single-active-record invariant.
//!
//! Reconciliations for the same patient are serialised with a per-patient
//! lock held across the whole read-decide-write cycle; different patients
//! reconcile concurrently.

use crate::error::{EngineError, EngineResult};
use crate::igr::AggregateRiskIndex;
use crate::store::{CriticalRecord, CriticalRecordStore};
use crate::validation::{require_non_negative, require_percent, require_temperature};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};
use uuid::Uuid;
use vigil_types::{RecordStatus, RiskProbability};

/// Aggregate index score above which an encounter summary is itself a
/// critical trigger.
const SUMMARY_CRITICAL_THRESHOLD: u8 = 70;

/// One triggered critical reason with its candidate risk.
#[derive(Clone, Debug, PartialEq)]
struct Trigger {
    reason: String,
    risk: RiskProbability,
}

/// Reconciles per-patient critical state against a [`CriticalRecordStore`].
pub struct CriticalStateReconciler<S> {
    store: S,
    patient_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<S: CriticalRecordStore> CriticalStateReconciler<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            patient_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconciles a patient's critical state from a triad-bearing reading.
    ///
    /// Evaluates the independent reason predicates (all are checked, they are
    /// not mutually exclusive), then creates, updates or deletes the
    /// patient's active record accordingly. Returns the active record after
    /// reconciliation, or `None` when no condition is active.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] if a provided vital is outside its
    ///   physical range; the store is not touched.
    /// - [`EngineError::StorageUnavailable`] if the store fails; the caller
    ///   must treat the triggering reading as not fully processed.
    /// - [`EngineError::InconsistentState`] if more than one active record is
    ///   found for the patient.
    pub fn reconcile(
        &self,
        patient_id: Uuid,
        spo2: Option<f64>,
        temperature: Option<f64>,
        heart_rate: Option<f64>,
    ) -> EngineResult<Option<CriticalRecord>> {
        if let Some(spo2) = spo2 {
            require_percent("spo2", spo2)?;
        }
        if let Some(temp) = temperature {
            require_temperature(temp)?;
        }
        if let Some(hr) = heart_rate {
            require_non_negative("heart rate", hr)?;
        }

        self.apply(patient_id, vital_triggers(spo2, temperature, heart_rate))
    }

    /// Reconciles a patient's critical state from an encounter summary.
    ///
    /// An aggregate index above the critical threshold is a trigger in its
    /// own right; below it the summary clears any summary- or vitals-created
    /// record, exactly like a trigger-free reading. Funnelling this second
    /// write path through the same transaction keeps the single-active-record
    /// invariant intact.
    pub fn reconcile_summary(
        &self,
        patient_id: Uuid,
        index: &AggregateRiskIndex,
    ) -> EngineResult<Option<CriticalRecord>> {
        let triggers = if index.score > SUMMARY_CRITICAL_THRESHOLD {
            vec![Trigger {
                reason: format!(
                    "Aggregate risk index {}/100 above critical threshold",
                    index.score
                ),
                risk: RiskProbability::clamped(f64::from(index.score) / 100.0),
            }]
        } else {
            Vec::new()
        };

        self.apply(patient_id, triggers)
    }

    /// The single reconciliation transaction: find existing, decide,
    /// create / update / delete. Holds the patient's lock across the whole
    /// cycle so concurrent reconciliations for one patient serialise.
    fn apply(
        &self,
        patient_id: Uuid,
        triggers: Vec<Trigger>,
    ) -> EngineResult<Option<CriticalRecord>> {
        let patient_lock = self.patient_lock(patient_id);
        let _guard = lock_recovering(&patient_lock);

        let active = self.store.find_active(patient_id)?;
        if active.len() > 1 {
            warn!(
                %patient_id,
                active_count = active.len(),
                "single-active-record invariant violated"
            );
            return Err(EngineError::InconsistentState {
                patient_id,
                active_count: active.len(),
            });
        }
        let existing = active.into_iter().next();

        if triggers.is_empty() {
            if existing.is_some() {
                self.store.delete_active(patient_id)?;
                debug!(%patient_id, "critical record cleared");
            }
            return Ok(None);
        }

        let risk_level = triggers
            .iter()
            .map(|t| t.risk)
            .fold(RiskProbability::clamped(0.0), RiskProbability::max);
        let reasons: Vec<String> = triggers.into_iter().map(|t| t.reason).collect();

        let record = match existing {
            Some(mut record) => {
                record.reasons = reasons;
                record.risk_level = risk_level;
                record.created_at = Utc::now();
                self.store.update(record.clone())?;
                debug!(%patient_id, risk = %risk_level, "critical record updated");
                record
            }
            None => {
                let record = CriticalRecord {
                    patient_id,
                    reasons,
                    risk_level,
                    status: RecordStatus::Active,
                    created_at: Utc::now(),
                };
                self.store.insert(record.clone())?;
                debug!(%patient_id, risk = %risk_level, "critical record created");
                record
            }
        };

        Ok(Some(record))
    }

    fn patient_lock(&self, patient_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = lock_recovering(&self.patient_locks);
        Arc::clone(locks.entry(patient_id).or_default())
    }
}

/// Evaluates the independent critical reason predicates for the vitals triad.
fn vital_triggers(
    spo2: Option<f64>,
    temperature: Option<f64>,
    heart_rate: Option<f64>,
) -> Vec<Trigger> {
    let mut triggers = Vec::new();

    if let Some(spo2) = spo2 {
        if spo2 < 90.0 {
            triggers.push(Trigger {
                reason: "SpO2 < 90% (hypoxaemia)".into(),
                risk: RiskProbability::clamped(0.9),
            });
        }
    }

    if let Some(temp) = temperature {
        if temp > 39.0 {
            triggers.push(Trigger {
                reason: "Critical fever > 39°C".into(),
                risk: RiskProbability::clamped(0.7),
            });
        }
    }

    if let Some(hr) = heart_rate {
        if hr > 120.0 {
            triggers.push(Trigger {
                reason: "Tachycardia > 120 bpm".into(),
                risk: RiskProbability::clamped(0.8),
            });
        }
        if hr < 40.0 {
            triggers.push(Trigger {
                reason: "Severe bradycardia < 40 bpm".into(),
                risk: RiskProbability::clamped(0.85),
            });
        }
    }

    triggers
}

fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::igr::{IgrBuilder, VitalsBundle};
    use crate::store::{InMemoryCriticalRecordStore, StoreError, StoreResult};

    fn reconciler() -> CriticalStateReconciler<InMemoryCriticalRecordStore> {
        CriticalStateReconciler::new(InMemoryCriticalRecordStore::new())
    }

    #[test]
    fn no_triggers_and_no_record_is_a_no_op() {
        let reconciler = reconciler();
        let patient = Uuid::new_v4();

        let result = reconciler
            .reconcile(patient, Some(98.0), Some(37.0), Some(80.0))
            .expect("reconcile should succeed");
        assert_eq!(result, None);
        assert_eq!(reconciler.store().record_count(patient), 0);
    }

    #[test]
    fn a_triggering_reading_creates_an_active_record() {
        let reconciler = reconciler();
        let patient = Uuid::new_v4();

        let record = reconciler
            .reconcile(patient, Some(85.0), Some(37.0), Some(80.0))
            .expect("reconcile should succeed")
            .expect("a record should be created");

        assert_eq!(record.patient_id, patient);
        assert_eq!(record.status, RecordStatus::Active);
        assert_eq!(record.reasons, vec!["SpO2 < 90% (hypoxaemia)".to_string()]);
        assert_eq!(record.risk_level.value(), 0.9);
    }

    #[test]
    fn risk_level_is_the_maximum_not_the_sum() {
        let reconciler = reconciler();
        let patient = Uuid::new_v4();

        let record = reconciler
            .reconcile(patient, Some(85.0), None, Some(130.0))
            .expect("reconcile should succeed")
            .expect("a record should be created");

        assert_eq!(
            record.reasons,
            vec![
                "SpO2 < 90% (hypoxaemia)".to_string(),
                "Tachycardia > 120 bpm".to_string(),
            ]
        );
        assert_eq!(record.risk_level.value(), 0.9);
    }

    #[test]
    fn tachycardia_and_bradycardia_are_independent_predicates() {
        let reconciler = reconciler();
        let patient = Uuid::new_v4();

        let record = reconciler
            .reconcile(patient, None, None, Some(35.0))
            .expect("reconcile should succeed")
            .expect("a record should be created");
        assert_eq!(
            record.reasons,
            vec!["Severe bradycardia < 40 bpm".to_string()]
        );
        assert_eq!(record.risk_level.value(), 0.85);
    }

    #[test]
    fn repeated_identical_readings_update_in_place() {
        let reconciler = reconciler();
        let patient = Uuid::new_v4();

        let first = reconciler
            .reconcile(patient, Some(85.0), None, None)
            .expect("first reconcile should succeed")
            .expect("a record should be created");
        let second = reconciler
            .reconcile(patient, Some(85.0), None, None)
            .expect("second reconcile should succeed")
            .expect("the record should persist");

        assert_eq!(reconciler.store().record_count(patient), 1);
        assert_eq!(first.reasons, second.reasons);
        assert_eq!(first.risk_level, second.risk_level);
    }

    #[test]
    fn a_clear_reading_deletes_the_record_and_a_third_is_a_no_op() {
        let reconciler = reconciler();
        let patient = Uuid::new_v4();

        reconciler
            .reconcile(patient, None, None, Some(130.0))
            .expect("reconcile should succeed")
            .expect("a record should be created");

        let cleared = reconciler
            .reconcile(patient, Some(98.0), Some(37.0), Some(90.0))
            .expect("reconcile should succeed");
        assert_eq!(cleared, None);
        assert_eq!(reconciler.store().record_count(patient), 0);

        let still_clear = reconciler
            .reconcile(patient, Some(98.0), Some(37.0), Some(90.0))
            .expect("reconcile should succeed");
        assert_eq!(still_clear, None);
    }

    #[test]
    fn worsening_vitals_replace_the_reasons() {
        let reconciler = reconciler();
        let patient = Uuid::new_v4();

        reconciler
            .reconcile(patient, None, None, Some(130.0))
            .expect("reconcile should succeed");
        let record = reconciler
            .reconcile(patient, Some(85.0), Some(39.5), None)
            .expect("reconcile should succeed")
            .expect("the record should persist");

        assert_eq!(
            record.reasons,
            vec![
                "SpO2 < 90% (hypoxaemia)".to_string(),
                "Critical fever > 39°C".to_string(),
            ]
        );
        assert_eq!(record.risk_level.value(), 0.9);
        assert_eq!(reconciler.store().record_count(patient), 1);
    }

    #[test]
    fn summary_path_funnels_through_the_same_invariant() {
        let reconciler = reconciler();
        let patient = Uuid::new_v4();
        let builder = IgrBuilder::new(EngineConfig::default());

        // Vitals path creates the record first.
        reconciler
            .reconcile(patient, Some(85.0), None, None)
            .expect("reconcile should succeed");

        // A critical summary must update in place, not insert a second record.
        let bundle = VitalsBundle {
            heart_rate: Some(150.0),
            spo2: Some(80.0),
            respiratory_rate: Some(35.0),
            ..VitalsBundle::default()
        };
        let index = builder.build(&bundle, &[]).expect("build should succeed");
        assert!(index.score > 70);

        let record = reconciler
            .reconcile_summary(patient, &index)
            .expect("summary reconcile should succeed")
            .expect("the record should persist");

        assert_eq!(reconciler.store().record_count(patient), 1);
        assert_eq!(record.reasons.len(), 1);
        assert!(record.reasons[0].starts_with("Aggregate risk index"));
        assert_eq!(record.risk_level.value(), f64::from(index.score) / 100.0);
    }

    #[test]
    fn a_calm_summary_clears_like_a_trigger_free_reading() {
        let reconciler = reconciler();
        let patient = Uuid::new_v4();
        let builder = IgrBuilder::new(EngineConfig::default());

        reconciler
            .reconcile(patient, Some(85.0), None, None)
            .expect("reconcile should succeed");

        let index = builder
            .build(&VitalsBundle::default(), &[])
            .expect("build should succeed");
        let result = reconciler
            .reconcile_summary(patient, &index)
            .expect("summary reconcile should succeed");

        assert_eq!(result, None);
        assert_eq!(reconciler.store().record_count(patient), 0);
    }

    #[test]
    fn two_seeded_active_records_surface_inconsistent_state() {
        let store = InMemoryCriticalRecordStore::new();
        let patient = Uuid::new_v4();
        let seed = CriticalRecord {
            patient_id: patient,
            reasons: vec!["Tachycardia > 120 bpm".into()],
            risk_level: RiskProbability::clamped(0.8),
            status: RecordStatus::Active,
            created_at: Utc::now(),
        };
        store.insert_unchecked(seed.clone());
        store.insert_unchecked(seed);

        let reconciler = CriticalStateReconciler::new(store);
        let err = reconciler
            .reconcile(patient, Some(85.0), None, None)
            .expect_err("reconcile should detect the violation");
        assert!(matches!(
            err,
            EngineError::InconsistentState {
                active_count: 2,
                ..
            }
        ));
        // Detection must not silently repair the store.
        assert_eq!(reconciler.store().record_count(patient), 2);
    }

    #[test]
    fn invalid_vitals_never_touch_the_store() {
        let reconciler = reconciler();
        let patient = Uuid::new_v4();

        let err = reconciler
            .reconcile(patient, Some(-5.0), None, None)
            .expect_err("negative spo2 should be rejected");
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert_eq!(reconciler.store().record_count(patient), 0);
    }

    /// Store stub whose writes always fail, for error propagation tests.
    struct FailingStore;

    impl CriticalRecordStore for FailingStore {
        fn find_active(&self, _patient_id: Uuid) -> StoreResult<Vec<CriticalRecord>> {
            Ok(Vec::new())
        }
        fn insert(&self, _record: CriticalRecord) -> StoreResult<()> {
            Err(StoreError::Write("disk full".into()))
        }
        fn update(&self, _record: CriticalRecord) -> StoreResult<()> {
            Err(StoreError::Write("disk full".into()))
        }
        fn delete_active(&self, _patient_id: Uuid) -> StoreResult<bool> {
            Err(StoreError::Write("disk full".into()))
        }
    }

    #[test]
    fn store_failures_surface_as_storage_unavailable() {
        let reconciler = CriticalStateReconciler::new(FailingStore);
        let err = reconciler
            .reconcile(Uuid::new_v4(), Some(85.0), None, None)
            .expect_err("write failure should propagate");
        assert!(matches!(err, EngineError::StorageUnavailable(_)));
    }

    #[test]
    fn same_patient_reconciliations_serialise_to_one_record() {
        let reconciler = Arc::new(reconciler());
        let patient = Uuid::new_v4();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let reconciler = Arc::clone(&reconciler);
                scope.spawn(move || {
                    reconciler
                        .reconcile(patient, Some(85.0), None, Some(130.0))
                        .expect("reconcile should succeed");
                });
            }
        });

        assert_eq!(reconciler.store().record_count(patient), 1);
    }

    #[test]
    fn different_patients_reconcile_independently() {
        let reconciler = Arc::new(reconciler());
        let patients: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

        std::thread::scope(|scope| {
            for &patient in &patients {
                let reconciler = Arc::clone(&reconciler);
                scope.spawn(move || {
                    reconciler
                        .reconcile(patient, Some(85.0), None, None)
                        .expect("reconcile should succeed");
                });
            }
        });

        for &patient in &patients {
            assert_eq!(reconciler.store().record_count(patient), 1);
        }
    }
}
