//! Pulmonary panel classifier.

use crate::error::EngineResult;
use crate::panels::PanelAssessment;
use crate::validation::{require_non_negative, require_percent};
use vigil_types::{HealthScore, RiskLevel};

/// Classifies a pulmonary reading from oxygen saturation and respiratory rate.
///
/// The ladder is evaluated in order and the first matching branch wins; the
/// branch ranges overlap at their boundaries, so the order is load-bearing.
///
/// # Arguments
///
/// * `spo2` - Oxygen saturation in percent, `[0, 100]`.
/// * `respiratory_rate` - Breaths per minute.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`](crate::EngineError::InvalidInput) if
/// either input is outside its physical range.
pub fn classify_pulmonary(spo2: f64, respiratory_rate: f64) -> EngineResult<PanelAssessment> {
    require_percent("spo2", spo2)?;
    require_non_negative("respiratory rate", respiratory_rate)?;

    let assessment = if spo2 < 88.0 || respiratory_rate > 30.0 {
        PanelAssessment {
            risk_level: RiskLevel::Critical,
            alert: Some("Severe hypoxia detected, possible respiratory distress.".into()),
            health_score: HealthScore::new(25)?,
            commentary: "Vital risk: immediate medical intervention recommended.".into(),
        }
    } else if spo2 < 94.0 || respiratory_rate > 24.0 {
        PanelAssessment {
            risk_level: RiskLevel::Elevated,
            alert: Some("Reduced oxygen saturation, possible pulmonary infection.".into()),
            health_score: HealthScore::new(55)?,
            commentary: "Significant impairment of respiratory function detected.".into(),
        }
    } else if (95.0..=100.0).contains(&spo2) && (12.0..=20.0).contains(&respiratory_rate) {
        PanelAssessment {
            risk_level: RiskLevel::Normal,
            alert: Some("Pulmonary function stable.".into()),
            health_score: HealthScore::new(90)?,
            commentary: "Efficient gas exchange, respiration within physiological norms.".into(),
        }
    } else {
        PanelAssessment {
            risk_level: RiskLevel::Moderate,
            alert: Some("Slight variation in rate or saturation.".into()),
            health_score: HealthScore::new(70)?,
            commentary: "Monitoring advised to detect a possible pathological evolution.".into(),
        }
    };

    Ok(assessment)
}
