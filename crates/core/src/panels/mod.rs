//! Per-panel risk classifiers.
//!
//! Each organ panel has one pure, deterministic classifier mapping its raw
//! metrics to a [`PanelAssessment`]. Classifiers hold no state and perform no
//! I/O; callers attach the assessment to the stored reading.
//!
//! The pulmonary, neurological and metabolic classifiers are ordered ladders
//! of mutually exclusive branches where the first matching branch wins. The
//! digestive classifier computes a continuous score first and derives the
//! band from it, and the renal classifier applies its rules in sequence with
//! last-triggered-rule-wins level assignment. There is no cardiac panel
//! classifier: cardiac readings are stored unclassified and cardiac risk is
//! assessed only by the combined severity classifier and the aggregate risk
//! index.

pub mod digestive;
pub mod metabolic;
pub mod neurological;
pub mod pulmonary;
pub mod renal;

pub use digestive::classify_digestive;
pub use metabolic::classify_metabolic;
pub use neurological::classify_neurological;
pub use pulmonary::classify_pulmonary;
pub use renal::classify_renal;

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};
use vigil_types::{HealthScore, RiskLevel};

/// Output of a panel classifier, attached 1:1 to a stored reading.
///
/// Never mutated after creation; a corrected value is a new reading with a
/// new assessment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelAssessment {
    pub risk_level: RiskLevel,
    pub alert: Option<String>,
    pub health_score: HealthScore,
    pub commentary: String,
}

/// Raw metrics for one classifiable panel reading.
///
/// Cardiac has no variant: it carries no per-panel classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "panel", rename_all = "lowercase")]
pub enum PanelReading {
    Pulmonary {
        spo2: f64,
        respiratory_rate: f64,
    },
    Neurological {
        eeg: f64,
        stress: f64,
    },
    Metabolic {
        glucose: f64,
        insulin: f64,
    },
    Digestive {
        acidity: f64,
        motility: f64,
        inflammation: f64,
    },
    Renal {
        creatinine: f64,
        filtration_rate: Option<f64>,
        urea: Option<f64>,
    },
}

/// Dispatches a panel reading to its classifier.
///
/// This is the single seam through which the reading-ingest path obtains an
/// assessment, so the caller never matches on the panel itself.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`](crate::EngineError::InvalidInput) if
/// any metric is outside its physically possible range.
pub fn classify_panel(reading: &PanelReading) -> EngineResult<PanelAssessment> {
    match *reading {
        PanelReading::Pulmonary {
            spo2,
            respiratory_rate,
        } => classify_pulmonary(spo2, respiratory_rate),
        PanelReading::Neurological { eeg, stress } => classify_neurological(eeg, stress),
        PanelReading::Metabolic { glucose, insulin } => classify_metabolic(glucose, insulin),
        PanelReading::Digestive {
            acidity,
            motility,
            inflammation,
        } => classify_digestive(acidity, motility, inflammation),
        PanelReading::Renal {
            creatinine,
            filtration_rate,
            urea,
        } => classify_renal(creatinine, filtration_rate, urea),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_matches_direct_classifier_calls() {
        let via_dispatch = classify_panel(&PanelReading::Pulmonary {
            spo2: 97.0,
            respiratory_rate: 16.0,
        })
        .expect("classification should succeed");
        let direct = classify_pulmonary(97.0, 16.0).expect("classification should succeed");
        assert_eq!(via_dispatch, direct);
    }

    #[test]
    fn panel_reading_serializes_with_panel_tag() {
        let reading = PanelReading::Renal {
            creatinine: 1.0,
            filtration_rate: Some(90.0),
            urea: None,
        };
        let json = serde_json::to_value(&reading).expect("serialize should succeed");
        assert_eq!(json["panel"], "renal");
        assert_eq!(json["creatinine"], 1.0);
    }
}
