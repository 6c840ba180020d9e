//! Digestive panel classifier.

use crate::error::EngineResult;
use crate::panels::PanelAssessment;
use crate::validation::{require_percent, require_ph};
use vigil_types::{HealthScore, RiskLevel};

/// Classifies a digestive reading from acidity (pH), motility (`[0, 100]`)
/// and an inflammation index (`[0, 100]`).
///
/// Unlike the other panels, this classifier computes a continuous score
/// first and derives the band from it:
///
/// `score = clamp(100 - |acidity - 7|*10 - (100 - motility)*0.4 - inflammation*0.3, 0, 100)`
///
/// The band thresholds on the unrounded score are: >=85 normal, >=65
/// moderate, >=45 elevated, otherwise critical.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`](crate::EngineError::InvalidInput) if
/// acidity is outside the pH scale or either index is outside `[0, 100]`.
pub fn classify_digestive(
    acidity: f64,
    motility: f64,
    inflammation: f64,
) -> EngineResult<PanelAssessment> {
    require_ph("acidity", acidity)?;
    require_percent("motility", motility)?;
    require_percent("inflammation index", inflammation)?;

    let raw = 100.0 - (acidity - 7.0).abs() * 10.0 - (100.0 - motility) * 0.4 - inflammation * 0.3;
    let score = raw.clamp(0.0, 100.0);
    let health_score = HealthScore::clamped(score);

    let assessment = if score >= 85.0 {
        PanelAssessment {
            risk_level: RiskLevel::Normal,
            alert: None,
            health_score,
            commentary: "Digestive function stable and balanced.".into(),
        }
    } else if score >= 65.0 {
        PanelAssessment {
            risk_level: RiskLevel::Moderate,
            alert: Some("Monitoring recommended, slight motility variations.".into()),
            health_score,
            commentary: "Minor digestive imbalance detected.".into(),
        }
    } else if score >= 45.0 {
        PanelAssessment {
            risk_level: RiskLevel::Elevated,
            alert: Some("Suspected hyperacidity or digestive inflammation.".into()),
            health_score,
            commentary: "Gastrointestinal investigation recommended.".into(),
        }
    } else {
        PanelAssessment {
            risk_level: RiskLevel::Critical,
            alert: Some("High risk of ulceration or chronic inflammation.".into()),
            health_score,
            commentary: "Severe digestive dysfunction detected.".into(),
        }
    };

    Ok(assessment)
}
