//! Metabolic panel classifier.

use crate::error::EngineResult;
use crate::panels::PanelAssessment;
use crate::validation::require_non_negative;
use vigil_types::{HealthScore, RiskLevel};

/// Classifies a metabolic reading from blood glucose (mg/dL) and insulin
/// (µU/mL).
///
/// First matching branch wins; branch order is load-bearing. Note the
/// critical branch requires both signals to be deranged, while the elevated
/// branch triggers on either.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`](crate::EngineError::InvalidInput) if
/// either concentration is negative or non-finite.
pub fn classify_metabolic(glucose: f64, insulin: f64) -> EngineResult<PanelAssessment> {
    require_non_negative("glucose", glucose)?;
    require_non_negative("insulin", insulin)?;

    let assessment = if glucose > 160.0 && insulin < 5.0 {
        PanelAssessment {
            risk_level: RiskLevel::Critical,
            alert: Some("Uncompensated hyperglycaemia, risk of severe diabetes.".into()),
            health_score: HealthScore::new(25)?,
            commentary: "Glucose elevated with insufficient insulin response.".into(),
        }
    } else if glucose > 130.0 || insulin < 6.0 {
        PanelAssessment {
            risk_level: RiskLevel::Elevated,
            alert: Some("Insulin resistance detected, monitoring required.".into()),
            health_score: HealthScore::new(55)?,
            commentary: "Glucose regulation outside the expected range.".into(),
        }
    } else if (90.0..=120.0).contains(&glucose) && (5.0..=9.0).contains(&insulin) {
        PanelAssessment {
            risk_level: RiskLevel::Normal,
            alert: Some("Metabolic balance stable.".into()),
            health_score: HealthScore::new(90)?,
            commentary: "Glucose and insulin within physiological norms.".into(),
        }
    } else {
        PanelAssessment {
            risk_level: RiskLevel::Moderate,
            alert: Some("Slight metabolic variation, to be followed up.".into()),
            health_score: HealthScore::new(70)?,
            commentary: "Monitoring advised to confirm the trend.".into(),
        }
    };

    Ok(assessment)
}
