//! Combined severity classifier for the vitals triad.
//!
//! Maps the {SpO2, heart rate, temperature} triad to a single additive score
//! with a colour band and triage label. Each present signal can add to the
//! score and, independently, overwrite the band and label when its own
//! threshold is crossed. The blocks run in a fixed order (saturation, heart
//! rate, temperature), so a later block's classification replaces an earlier,
//! possibly more severe one even though the scores still accumulate. This
//! last-write-wins behaviour is a compatibility constant; see the reconciler
//! for the max()-based policy used on the critical path.

use crate::error::EngineResult;
use crate::validation::{require_non_negative, require_percent, require_temperature};
use serde::{Deserialize, Serialize};
use vigil_types::SeverityBand;

/// Output of the combined severity classifier. Ephemeral: computed on
/// demand and not persisted by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedSeverity {
    /// Additive severity score, clamped to `[0, 100]`.
    pub score: u8,
    pub band: SeverityBand,
    pub triage_label: String,
}

/// Classifies the vitals triad into a combined severity.
///
/// All inputs are optional; absent signals contribute nothing. With no
/// triggered rule the result is green/"Stable".
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`](crate::EngineError::InvalidInput) if
/// a provided signal is outside its physical range.
pub fn classify_combined_severity(
    spo2: Option<f64>,
    heart_rate: Option<f64>,
    temperature: Option<f64>,
) -> EngineResult<CombinedSeverity> {
    if let Some(spo2) = spo2 {
        require_percent("spo2", spo2)?;
    }
    if let Some(hr) = heart_rate {
        require_non_negative("heart rate", hr)?;
    }
    if let Some(temp) = temperature {
        require_temperature(temp)?;
    }

    let mut score: u32 = 0;
    let mut band = SeverityBand::Green;
    let mut triage_label = "Patient stable";

    if let Some(spo2) = spo2 {
        if spo2 < 85.0 {
            score += 40;
            band = SeverityBand::Red;
            triage_label = "Severe hypoxaemia";
        } else if spo2 < 90.0 {
            score += 25;
            band = SeverityBand::Orange;
            triage_label = "Moderate hypoxaemia";
        } else if spo2 < 94.0 {
            score += 10;
            band = SeverityBand::Yellow;
            triage_label = "Borderline saturation";
        }
    }

    if let Some(hr) = heart_rate {
        if hr > 140.0 || hr < 40.0 {
            score += 40;
            band = SeverityBand::Red;
            triage_label = "Haemodynamic instability";
        } else if hr > 120.0 {
            score += 25;
            band = SeverityBand::Orange;
            triage_label = "Severe tachycardia";
        } else if hr > 100.0 {
            score += 10;
            band = SeverityBand::Yellow;
            triage_label = "Moderate tachycardia";
        }
    }

    if let Some(temp) = temperature {
        if temp > 40.0 || temp < 35.0 {
            score += 35;
            band = SeverityBand::Red;
            triage_label = "Critical hyper/hypothermia";
        } else if temp >= 39.0 {
            score += 20;
            band = SeverityBand::Orange;
            triage_label = "High fever";
        } else if temp >= 38.0 {
            score += 10;
            band = SeverityBand::Yellow;
            triage_label = "Mild hyperthermia";
        }
    }

    if score == 0 {
        band = SeverityBand::Green;
        triage_label = "Stable";
    }

    Ok(CombinedSeverity {
        score: score.min(100) as u8,
        band,
        triage_label: triage_label.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn no_triggered_rule_is_green_stable() {
        let s = classify_combined_severity(Some(98.0), Some(80.0), Some(36.8))
            .expect("classification should succeed");
        assert_eq!(s.score, 0);
        assert_eq!(s.band, SeverityBand::Green);
        assert_eq!(s.triage_label, "Stable");
    }

    #[test]
    fn absent_signals_contribute_nothing() {
        let s = classify_combined_severity(None, None, None)
            .expect("classification should succeed");
        assert_eq!(s.score, 0);
        assert_eq!(s.band, SeverityBand::Green);
    }

    #[test]
    fn scores_accumulate_across_signals() {
        // spo2 < 85 (+40) and hr > 140 (+40).
        let s = classify_combined_severity(Some(82.0), Some(150.0), None)
            .expect("classification should succeed");
        assert_eq!(s.score, 80);
        assert_eq!(s.band, SeverityBand::Red);
    }

    #[test]
    fn later_block_overwrites_an_earlier_more_severe_band() {
        // Red from spo2 (+40), then the temperature block downgrades the band
        // to yellow (+10) even though the score keeps both contributions.
        let s = classify_combined_severity(Some(82.0), None, Some(38.2))
            .expect("classification should succeed");
        assert_eq!(s.score, 50);
        assert_eq!(s.band, SeverityBand::Yellow);
        assert_eq!(s.triage_label, "Mild hyperthermia");
    }

    #[test]
    fn score_clamps_at_100() {
        // 40 + 40 + 35 = 115 -> 100.
        let s = classify_combined_severity(Some(80.0), Some(30.0), Some(41.0))
            .expect("classification should succeed");
        assert_eq!(s.score, 100);
        assert_eq!(s.band, SeverityBand::Red);
    }

    #[test]
    fn bradycardia_triggers_the_red_heart_rate_rule() {
        let s = classify_combined_severity(None, Some(35.0), None)
            .expect("classification should succeed");
        assert_eq!(s.score, 40);
        assert_eq!(s.triage_label, "Haemodynamic instability");
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let err = classify_combined_severity(None, None, Some(50.0))
            .expect_err("50 degrees should be rejected");
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
