//! Input validation guards.
//!
//! Classifiers never misclassify silently: a magnitude outside its physically
//! possible range is rejected with [`EngineError::InvalidInput`] before any
//! threshold ladder runs. The guards here check physical plausibility only;
//! clinical interpretation belongs to the classifiers.

use crate::error::{EngineError, EngineResult};

/// Validates a percentage-scaled signal (SpO2, EEG index, stress index,
/// motility, inflammation index): finite and within `[0, 100]`.
pub(crate) fn require_percent(name: &str, value: f64) -> EngineResult<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(EngineError::InvalidInput(format!(
            "{name} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validates a rate or concentration (heart rate, respiratory rate, glucose,
/// insulin, creatinine, urea, filtration rate): finite and non-negative.
pub(crate) fn require_non_negative(name: &str, value: f64) -> EngineResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Validates a core body temperature in degrees Celsius.
///
/// Temperatures outside `[20, 45]` are not survivable measurements and are
/// treated as sensor or transcription errors.
pub(crate) fn require_temperature(value: f64) -> EngineResult<()> {
    if !value.is_finite() || !(20.0..=45.0).contains(&value) {
        return Err(EngineError::InvalidInput(format!(
            "temperature must be between 20 and 45 degrees Celsius, got {value}"
        )));
    }
    Ok(())
}

/// Validates a pH-scaled acidity value: finite and within `[0, 14]`.
pub(crate) fn require_ph(name: &str, value: f64) -> EngineResult<()> {
    if !value.is_finite() || !(0.0..=14.0).contains(&value) {
        return Err(EngineError::InvalidInput(format!(
            "{name} must be between 0 and 14, got {value}"
        )));
    }
    Ok(())
}
