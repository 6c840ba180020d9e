//! Foundation types for the vigil clinical risk engine.
//!
//! This crate holds the small, dependency-light vocabulary shared by the
//! engine crates: the qualitative classification enums and the validated
//! numeric newtypes. Nothing here performs I/O or holds state.
//!
//! Key types:
//! - [`RiskLevel`]: the four-band qualitative classification attached to a
//!   panel reading.
//! - [`SeverityBand`]: the colour band produced by the combined severity
//!   classifier.
//! - [`HealthScore`]: an integer health score guaranteed to lie in `[0, 100]`.
//! - [`RiskProbability`]: a risk magnitude guaranteed to lie in `[0.0, 1.0]`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur when creating validated numeric types.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// The score was outside the inclusive `[0, 100]` range.
    #[error("health score must be between 0 and 100, got {0}")]
    ScoreOutOfRange(u16),
    /// The probability was not a finite value in the inclusive `[0.0, 1.0]` range.
    #[error("risk probability must be a finite value between 0.0 and 1.0, got {0}")]
    ProbabilityOutOfRange(f64),
}

/// Qualitative risk classification for a single organ panel.
///
/// Variants are ordered from least to most severe, so `Ord` comparisons
/// reflect clinical severity (`RiskLevel::Critical` is the maximum).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Normal,
    Moderate,
    Elevated,
    Critical,
}

impl RiskLevel {
    /// Returns `true` for the most severe band.
    pub fn is_critical(self) -> bool {
        matches!(self, RiskLevel::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::Normal => "normal",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Elevated => "elevated",
            RiskLevel::Critical => "critical",
        };
        write!(f, "{name}")
    }
}

/// Colour band produced by the combined severity classifier.
///
/// Ordered from least to most severe. Note that the classifier itself
/// assigns the band with last-write-wins semantics rather than by taking
/// the maximum; see the engine crate for details.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityBand {
    Green,
    Yellow,
    Orange,
    Red,
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeverityBand::Green => "green",
            SeverityBand::Yellow => "yellow",
            SeverityBand::Orange => "orange",
            SeverityBand::Red => "red",
        };
        write!(f, "{name}")
    }
}

/// Qualitative whole-encounter summary derived from the aggregate risk index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskSummary {
    /// Index of 40 or below.
    Stable,
    /// Index above 40.
    Monitor,
    /// Index above 70.
    Critical,
}

impl fmt::Display for RiskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RiskSummary::Stable => "stable",
            RiskSummary::Monitor => "patient to monitor",
            RiskSummary::Critical => "critical patient",
        };
        write!(f, "{text}")
    }
}

/// Direction of change of the aggregate risk index against recent history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Worsening => "worsening",
        };
        write!(f, "{name}")
    }
}

/// Lifecycle status of a critical record.
///
/// The canonical reconciliation path only ever stores `Active` records and
/// hard-deletes them when the triggering condition clears; `Resolved` exists
/// for callers that retire records through other means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Resolved,
}

/// The organ systems covered by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganSystem {
    Cardiac,
    Pulmonary,
    Renal,
    Digestive,
    Metabolic,
    Neurological,
}

impl fmt::Display for OrganSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrganSystem::Cardiac => "cardiac",
            OrganSystem::Pulmonary => "pulmonary",
            OrganSystem::Renal => "renal",
            OrganSystem::Digestive => "digestive",
            OrganSystem::Metabolic => "metabolic",
            OrganSystem::Neurological => "neurological",
        };
        write!(f, "{name}")
    }
}

/// Coarse level of consciousness used by the aggregate risk scorers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentalState {
    Alert,
    Confusion,
    Coma,
}

impl MentalState {
    /// Returns `true` when consciousness is altered (confusion or coma).
    pub fn is_altered(self) -> bool {
        matches!(self, MentalState::Confusion | MentalState::Coma)
    }
}

/// An integer health score guaranteed to lie in the inclusive `[0, 100]` range.
///
/// Classifiers emit fixed band scores via [`HealthScore::new`] and computed
/// scores via [`HealthScore::clamped`], which saturates instead of failing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthScore(u8);

impl HealthScore {
    /// Creates a new `HealthScore`, rejecting values above 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::ScoreOutOfRange(u16::from(value)));
        }
        Ok(Self(value))
    }

    /// Creates a `HealthScore` from a computed value, clamping to `[0, 100]`
    /// and rounding to the nearest integer.
    ///
    /// Non-finite inputs clamp to 0.
    pub fn clamped(value: f64) -> Self {
        if !value.is_finite() {
            return Self(0);
        }
        Self(value.round().clamp(0.0, 100.0) as u8)
    }

    /// Returns the inner score.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for HealthScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A risk magnitude guaranteed to be finite and within `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskProbability(f64);

impl RiskProbability {
    /// Creates a new `RiskProbability`, rejecting non-finite values and
    /// values outside `[0.0, 1.0]`.
    pub fn new(value: f64) -> Result<Self, ValueError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ValueError::ProbabilityOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Creates a `RiskProbability` from a computed value, clamping to
    /// `[0.0, 1.0]`. Non-finite inputs clamp to 0.
    pub fn clamped(value: f64) -> Self {
        if !value.is_finite() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the inner probability.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns the greater of two probabilities.
    pub fn max(self, other: Self) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for RiskProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
