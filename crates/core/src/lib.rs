//! # Vigil Core
//!
//! Clinical risk scoring and critical-state reconciliation for periodic
//! physiological readings.
//!
//! This crate contains the engine's decision logic:
//! - Five pure per-panel classifiers (pulmonary, neurological, metabolic,
//!   digestive, renal) mapping raw metrics to a [`PanelAssessment`]
//! - The combined severity classifier for the {SpO2, heart rate,
//!   temperature} triad
//! - The aggregate risk index builder for whole-encounter summaries
//! - The critical-state reconciler, the one stateful component, which keeps
//!   each patient's single active [`CriticalRecord`] in agreement with the
//!   latest triggering reading
//!
//! **No collaborator concerns**: persistence of raw readings, identity,
//! transport, notification dispatch and report export belong to external
//! collaborators. The engine consumes readings and patient identifiers and
//! produces classification records and critical-state records, nothing more.

pub mod config;
pub mod error;
pub mod igr;
pub mod panels;
pub mod reconciler;
pub mod severity;
pub mod store;

mod validation;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use igr::{AggregateRiskIndex, IgrBuilder, SystemReport, VitalsBundle};
pub use panels::{
    classify_digestive, classify_metabolic, classify_neurological, classify_panel,
    classify_pulmonary, classify_renal, PanelAssessment, PanelReading,
};
pub use reconciler::CriticalStateReconciler;
pub use severity::{classify_combined_severity, CombinedSeverity};
pub use store::{CriticalRecord, CriticalRecordStore, InMemoryCriticalRecordStore, StoreError};
