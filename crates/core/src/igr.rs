//! Aggregate risk index (IGR) builder.
//!
//! Produces a whole-encounter severity summary by running six simplified
//! subsystem scorers directly against raw vitals (not against persisted
//! panel assessments) and summing their deduction scores into one index
//! capped at 100. The subsystem thresholds use the units of the source
//! rule set: creatinine in µmol/L, urea and glycaemia in mmol/L.
//!
//! The trend is derived from prior index values supplied by the caller,
//! never chosen arbitrarily; with no history the field stays empty.

use crate::config::{EngineConfig, TREND_DEAD_BAND};
use crate::error::EngineResult;
use crate::validation::{require_non_negative, require_percent, require_temperature};
use serde::{Deserialize, Serialize};
use vigil_types::{MentalState, OrganSystem, RiskSummary, Trend};

/// Raw vitals consumed by the aggregate risk index builder.
///
/// Every field is optional; absent signals contribute no deductions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalsBundle {
    /// Heart rate in bpm.
    pub heart_rate: Option<f64>,
    /// Oxygen saturation in percent.
    pub spo2: Option<f64>,
    /// Respiratory rate in breaths per minute.
    pub respiratory_rate: Option<f64>,
    /// Creatinine in µmol/L.
    pub creatinine: Option<f64>,
    /// Blood urea in mmol/L.
    pub urea: Option<f64>,
    /// Core temperature in °C.
    pub temperature: Option<f64>,
    /// Coarse level of consciousness.
    pub mental_state: Option<MentalState>,
    /// EEG activity index on a `[0, 100]` scale.
    pub eeg: Option<f64>,
    /// Blood glucose in mmol/L.
    pub glycaemia: Option<f64>,
}

/// One subsystem's contribution to the aggregate index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemReport {
    pub system: OrganSystem,
    /// Deduction score contributed by this subsystem.
    pub score: u8,
    pub alerts: Vec<String>,
}

/// The aggregate risk index for one encounter summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRiskIndex {
    /// Sum of the six subsystem scores, capped at 100.
    pub score: u8,
    pub summary: RiskSummary,
    /// Direction of change against recent history; `None` when the caller
    /// supplied no prior index values.
    pub trend: Option<Trend>,
    pub systems: Vec<SystemReport>,
}

/// Builds aggregate risk indices under a fixed configuration.
#[derive(Clone, Debug, Default)]
pub struct IgrBuilder {
    config: EngineConfig,
}

impl IgrBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Builds the aggregate risk index for one encounter.
    ///
    /// `prior_scores` holds earlier index values for the same encounter,
    /// oldest first; only the most recent [`EngineConfig::trend_window`]
    /// values participate in the trend derivation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`](crate::EngineError::InvalidInput)
    /// if any provided vital is outside its physical range.
    pub fn build(
        &self,
        bundle: &VitalsBundle,
        prior_scores: &[u8],
    ) -> EngineResult<AggregateRiskIndex> {
        validate_bundle(bundle)?;

        let systems = vec![
            score_cardiac(bundle.heart_rate, bundle.spo2),
            score_pulmonary(bundle.spo2, bundle.respiratory_rate),
            score_renal(bundle.creatinine, bundle.urea),
            score_digestive(bundle.temperature),
            score_neurological(bundle.mental_state, bundle.eeg),
            score_metabolic(bundle.glycaemia),
        ];

        let total: u32 = systems.iter().map(|s| u32::from(s.score)).sum();
        let score = total.min(100) as u8;

        let summary = if score > 70 {
            RiskSummary::Critical
        } else if score > 40 {
            RiskSummary::Monitor
        } else {
            RiskSummary::Stable
        };

        Ok(AggregateRiskIndex {
            score,
            summary,
            trend: self.derive_trend(score, prior_scores),
            systems,
        })
    }

    /// Compares the current index against the mean of the most recent prior
    /// values, with a dead band so small oscillations read as stable. A lower
    /// index means lower risk, hence improvement.
    fn derive_trend(&self, current: u8, prior_scores: &[u8]) -> Option<Trend> {
        if prior_scores.is_empty() {
            return None;
        }

        let window_start = prior_scores.len().saturating_sub(self.config.trend_window());
        let window = &prior_scores[window_start..];
        let mean = window.iter().map(|&s| f64::from(s)).sum::<f64>() / window.len() as f64;
        let delta = f64::from(current) - mean;

        Some(if delta > TREND_DEAD_BAND {
            Trend::Worsening
        } else if delta < -TREND_DEAD_BAND {
            Trend::Improving
        } else {
            Trend::Stable
        })
    }
}

fn validate_bundle(bundle: &VitalsBundle) -> EngineResult<()> {
    if let Some(hr) = bundle.heart_rate {
        require_non_negative("heart rate", hr)?;
    }
    if let Some(spo2) = bundle.spo2 {
        require_percent("spo2", spo2)?;
    }
    if let Some(rate) = bundle.respiratory_rate {
        require_non_negative("respiratory rate", rate)?;
    }
    if let Some(creatinine) = bundle.creatinine {
        require_non_negative("creatinine", creatinine)?;
    }
    if let Some(urea) = bundle.urea {
        require_non_negative("urea", urea)?;
    }
    if let Some(temp) = bundle.temperature {
        require_temperature(temp)?;
    }
    if let Some(eeg) = bundle.eeg {
        require_percent("eeg index", eeg)?;
    }
    if let Some(glycaemia) = bundle.glycaemia {
        require_non_negative("glycaemia", glycaemia)?;
    }
    Ok(())
}

fn score_cardiac(heart_rate: Option<f64>, spo2: Option<f64>) -> SystemReport {
    let mut alerts = Vec::new();
    let mut score = 0u8;

    if let Some(hr) = heart_rate {
        if hr > 140.0 || hr < 40.0 {
            alerts.push("Critical cardiac instability".into());
            score += 40;
        } else if hr > 120.0 {
            alerts.push("Severe tachycardia".into());
            score += 25;
        } else if hr < 50.0 {
            alerts.push("Moderate bradycardia".into());
            score += 15;
        }
    }

    if let Some(spo2) = spo2 {
        if spo2 < 90.0 {
            alerts.push("Associated hypoxaemia".into());
            score += 20;
        }
    }

    SystemReport {
        system: OrganSystem::Cardiac,
        score,
        alerts,
    }
}

fn score_pulmonary(spo2: Option<f64>, respiratory_rate: Option<f64>) -> SystemReport {
    let mut alerts = Vec::new();
    let mut score = 0u8;

    if let Some(spo2) = spo2 {
        if spo2 < 85.0 {
            alerts.push("Severe respiratory distress".into());
            score += 40;
        } else if spo2 < 92.0 {
            alerts.push("Moderate hypoxaemia".into());
            score += 20;
        }
    }

    if let Some(rate) = respiratory_rate {
        if rate > 30.0 {
            alerts.push("Marked tachypnoea".into());
            score += 25;
        } else if rate < 10.0 {
            alerts.push("Concerning bradypnoea".into());
            score += 25;
        }
    }

    SystemReport {
        system: OrganSystem::Pulmonary,
        score,
        alerts,
    }
}

fn score_renal(creatinine: Option<f64>, urea: Option<f64>) -> SystemReport {
    let mut alerts = Vec::new();
    let mut score = 0u8;

    if let Some(creatinine) = creatinine {
        if creatinine > 150.0 {
            alerts.push("Probable renal failure".into());
            score += 30;
        }
    }
    if let Some(urea) = urea {
        if urea > 10.0 {
            alerts.push("Elevated urea".into());
            score += 20;
        }
    }

    SystemReport {
        system: OrganSystem::Renal,
        score,
        alerts,
    }
}

fn score_digestive(temperature: Option<f64>) -> SystemReport {
    let mut alerts = Vec::new();
    let mut score = 0u8;

    if let Some(temp) = temperature {
        if temp > 39.0 {
            alerts.push("Suspected digestive fever".into());
            score += 20;
        } else if temp < 35.0 {
            alerts.push("Hypothermia, possible shock".into());
            score += 40;
        }
    }

    SystemReport {
        system: OrganSystem::Digestive,
        score,
        alerts,
    }
}

fn score_neurological(mental_state: Option<MentalState>, eeg: Option<f64>) -> SystemReport {
    let mut alerts = Vec::new();
    let mut score = 0u8;

    if let Some(state) = mental_state {
        if state.is_altered() {
            alerts.push("Altered consciousness".into());
            score += 40;
        }
    }
    if let Some(eeg) = eeg {
        if eeg > 70.0 {
            alerts.push("Abnormal EEG activity".into());
            score += 25;
        }
    }

    SystemReport {
        system: OrganSystem::Neurological,
        score,
        alerts,
    }
}

fn score_metabolic(glycaemia: Option<f64>) -> SystemReport {
    let mut alerts = Vec::new();
    let mut score = 0u8;

    if let Some(glycaemia) = glycaemia {
        if glycaemia > 11.0 {
            alerts.push("Critical hyperglycaemia".into());
            score += 30;
        } else if glycaemia < 3.0 {
            alerts.push("Severe hypoglycaemia".into());
            score += 40;
        }
    }

    SystemReport {
        system: OrganSystem::Metabolic,
        score,
        alerts,
    }
}
