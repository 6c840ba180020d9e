//! Engine configuration.
//!
//! Configuration is resolved once at startup and passed into services, so no
//! evaluation path reads process-wide state. The classification thresholds
//! themselves are fixed compatibility constants and deliberately not
//! configurable; only the trend derivation window is.

use crate::error::{EngineError, EngineResult};

/// Default number of prior index values the trend derivation consults.
pub const DEFAULT_TREND_WINDOW: usize = 5;

/// Dead band, in index points, within which the index is considered stable.
pub const TREND_DEAD_BAND: f64 = 5.0;

/// Engine configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    trend_window: usize,
}

impl EngineConfig {
    /// Create a new `EngineConfig`.
    ///
    /// `trend_window` is the number of most recent prior aggregate index
    /// values consulted when deriving a trend. It must be at least 1.
    pub fn new(trend_window: usize) -> EngineResult<Self> {
        if trend_window == 0 {
            return Err(EngineError::InvalidInput(
                "trend window must be at least 1".into(),
            ));
        }
        Ok(Self { trend_window })
    }

    pub fn trend_window(&self) -> usize {
        self.trend_window
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_window: DEFAULT_TREND_WINDOW,
        }
    }
}
