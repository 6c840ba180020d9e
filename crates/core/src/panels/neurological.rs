//! Neurological panel classifier.

use crate::error::EngineResult;
use crate::panels::PanelAssessment;
use crate::validation::require_percent;
use vigil_types::{HealthScore, RiskLevel};

/// Classifies a neurological reading from an EEG activity index and a stress
/// index, both on a `[0, 100]` scale.
///
/// First matching branch wins; branch order is load-bearing.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`](crate::EngineError::InvalidInput) if
/// either index is outside `[0, 100]`.
pub fn classify_neurological(eeg: f64, stress: f64) -> EngineResult<PanelAssessment> {
    require_percent("eeg index", eeg)?;
    require_percent("stress index", stress)?;

    let assessment = if eeg < 40.0 || stress > 85.0 {
        PanelAssessment {
            risk_level: RiskLevel::Critical,
            alert: Some("Abnormal brain activity, major neurological stress.".into()),
            health_score: HealthScore::new(25)?,
            commentary: "High risk of cognitive overload or acute neuronal disorder.".into(),
        }
    } else if eeg < 55.0 || stress > 70.0 {
        PanelAssessment {
            risk_level: RiskLevel::Elevated,
            alert: Some("Reduced brain activity or high stress level.".into()),
            health_score: HealthScore::new(55)?,
            commentary: "Moderate impairment of the nervous system detected.".into(),
        }
    } else if (60.0..=90.0).contains(&eeg) && stress <= 60.0 {
        PanelAssessment {
            risk_level: RiskLevel::Normal,
            alert: Some("Brain activity stable.".into()),
            health_score: HealthScore::new(90)?,
            commentary: "Neurophysiological balance within expected range.".into(),
        }
    } else {
        PanelAssessment {
            risk_level: RiskLevel::Moderate,
            alert: Some("Slight variation in neuronal activity.".into()),
            health_score: HealthScore::new(70)?,
            commentary: "Monitoring advised to detect any future evolution.".into(),
        }
    };

    Ok(assessment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn low_eeg_or_extreme_stress_is_critical() {
        let a = classify_neurological(39.9, 10.0).expect("classification should succeed");
        assert_eq!(a.risk_level, RiskLevel::Critical);

        let a = classify_neurological(80.0, 85.1).expect("classification should succeed");
        assert_eq!(a.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn mid_band_eeg_with_calm_stress_is_normal() {
        let a = classify_neurological(75.0, 40.0).expect("classification should succeed");
        assert_eq!(a.risk_level, RiskLevel::Normal);
        assert_eq!(a.health_score.value(), 90);
    }

    #[test]
    fn eeg_between_55_and_60_falls_to_moderate() {
        // Clears both alarm branches but misses the >=60 normal window.
        let a = classify_neurological(57.0, 40.0).expect("classification should succeed");
        assert_eq!(a.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn stress_between_60_and_70_falls_to_moderate() {
        let a = classify_neurological(75.0, 65.0).expect("classification should succeed");
        assert_eq!(a.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn rejects_indices_outside_their_scale() {
        let err = classify_neurological(120.0, 40.0).expect_err("eeg over 100 should be rejected");
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
