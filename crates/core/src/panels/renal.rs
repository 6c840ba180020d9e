//! Renal panel classifier.

use crate::error::EngineResult;
use crate::panels::PanelAssessment;
use crate::validation::require_non_negative;
use vigil_types::{HealthScore, RiskLevel};

/// Classifies a renal reading from creatinine (mg/dL), an optional glomerular
/// filtration rate (mL/min) and optional blood urea (mg/dL).
///
/// This classifier is not a first-match ladder: it starts from a perfect
/// score and applies each triggered rule in sequence, subtracting from the
/// score and overwriting the level and alert each time. The level reflects
/// the last triggered rule, not the most severe one — a compatibility
/// behaviour that downstream consumers depend on, kept in deliberate
/// divergence from the reconciler's max() policy.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`](crate::EngineError::InvalidInput) if
/// any provided value is negative or non-finite.
pub fn classify_renal(
    creatinine: f64,
    filtration_rate: Option<f64>,
    urea: Option<f64>,
) -> EngineResult<PanelAssessment> {
    require_non_negative("creatinine", creatinine)?;
    if let Some(rate) = filtration_rate {
        require_non_negative("filtration rate", rate)?;
    }
    if let Some(urea) = urea {
        require_non_negative("urea", urea)?;
    }

    let mut risk_level = RiskLevel::Normal;
    let mut alert = String::from("Renal function stable.");
    let mut score = 100.0;

    if creatinine > 1.3 {
        risk_level = RiskLevel::Elevated;
        alert = "Elevated creatinine, possible renal failure.".into();
        score -= 30.0;
    } else if creatinine < 0.7 {
        risk_level = RiskLevel::Moderate;
        alert = "Low creatinine, possible dehydration.".into();
        score -= 10.0;
    }

    if let Some(rate) = filtration_rate {
        if rate < 60.0 {
            risk_level = RiskLevel::Critical;
            alert = "Very low glomerular filtration, risk of renal failure.".into();
            score -= 50.0;
        } else if rate < 80.0 {
            risk_level = RiskLevel::Elevated;
            alert = "Reduced glomerular filtration, impaired renal function.".into();
            score -= 25.0;
        }
    }

    if let Some(urea) = urea {
        if urea > 45.0 {
            risk_level = RiskLevel::Elevated;
            alert = "Elevated blood urea, suspected metabolic disorder.".into();
            score -= 20.0;
        }
    }

    Ok(PanelAssessment {
        risk_level,
        alert: Some(alert),
        health_score: HealthScore::clamped(score),
        commentary: "Automated renal function assessment.".into(),
    })
}
