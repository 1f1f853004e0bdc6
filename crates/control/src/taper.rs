//! Charge Current Tapering
//!
//! A taper strategy maps the present pack condition to a factor in [0, 1]
//! that scales the requested charge current. The default strategy combines
//! three independent reductions: approaching full, running hot, and charging
//! cold. The factors multiply, so a cell that is both cold and nearly full
//! receives the smallest current.

use electrical::PackSnapshot;
use serde::{Deserialize, Serialize};
use simcore::ConfigurationError;

use crate::thresholds::ThresholdConfig;

/// Charge-side control parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeConfig {
    pub taper: TaperPolicy,
    /// Base charge current before tapering; larger requests are cut to it (A)
    pub max_current_a: f64,
    /// SoC band below the soc_max warning level over which current ramps to zero
    pub soc_window: f64,
    /// Temperature band below the temp_max warning level over which current ramps to zero (°C)
    pub temperature_window_c: f64,
    /// Coldest cell temperature at which charging is fully derated (°C)
    pub cold_cutoff_c: f64,
    /// Coldest cell temperature above which no cold derating applies (°C)
    pub cold_full_current_c: f64,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            taper: TaperPolicy::Linear,
            max_current_a: 20.0,
            soc_window: 0.10,
            temperature_window_c: 10.0,
            cold_cutoff_c: 0.0,
            cold_full_current_c: 10.0,
        }
    }
}

impl ChargeConfig {
    pub fn with_taper(mut self, taper: TaperPolicy) -> Self {
        self.taper = taper;
        self
    }

    pub fn with_max_current(mut self, max_current_a: f64) -> Self {
        self.max_current_a = max_current_a;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.max_current_a.is_finite() && self.max_current_a > 0.0) {
            return Err(ConfigurationError::NotPositive("charge.max_current_a"));
        }
        if !(self.soc_window.is_finite() && self.soc_window >= 0.0) {
            return Err(ConfigurationError::NotPositive("charge.soc_window"));
        }
        if !(self.temperature_window_c.is_finite() && self.temperature_window_c >= 0.0) {
            return Err(ConfigurationError::NotPositive("charge.temperature_window_c"));
        }
        if !(self.cold_cutoff_c.is_finite() && self.cold_full_current_c.is_finite())
            || self.cold_cutoff_c > self.cold_full_current_c
        {
            return Err(ConfigurationError::Inconsistent(format!(
                "charge cold cutoff {} °C must not exceed full-current temperature {} °C",
                self.cold_cutoff_c, self.cold_full_current_c
            )));
        }
        Ok(())
    }
}

/// 1 at or below `start`, 0 at or above `end`, linear in between.
pub(crate) fn ramp_down(x: f64, start: f64, end: f64) -> f64 {
    if x <= start {
        1.0
    } else if x >= end {
        0.0
    } else {
        (end - x) / (end - start)
    }
}

/// 0 at or below `start`, 1 at or above `end`, linear in between.
pub(crate) fn ramp_up(x: f64, start: f64, end: f64) -> f64 {
    1.0 - ramp_down(x, start, end)
}

/// Trait for charge taper strategies
pub trait ChargeTaper: Send + Sync + std::fmt::Debug {
    /// Factor in [0, 1] applied to the requested charge current
    fn factor(&self, snapshot: &PackSnapshot, thresholds: &ThresholdConfig, config: &ChargeConfig) -> f64;

    /// Clone this strategy into a boxed trait object
    fn box_clone(&self) -> Box<dyn ChargeTaper>;
}

impl Clone for Box<dyn ChargeTaper> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

// ============================================================================
// Linear taper
// ============================================================================

/// Linear ramps toward the soc_max and temp_max warning levels, times a
/// linear cold derating on the coldest cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearTaper;

impl LinearTaper {
    pub fn soc_factor(mean_soc: f64, thresholds: &ThresholdConfig, config: &ChargeConfig) -> f64 {
        let end = thresholds.soc_max.warning;
        ramp_down(mean_soc, end - config.soc_window, end)
    }

    pub fn thermal_factor(max_temperature: f64, thresholds: &ThresholdConfig, config: &ChargeConfig) -> f64 {
        let end = thresholds.temp_max.warning;
        ramp_down(max_temperature, end - config.temperature_window_c, end)
    }

    pub fn cold_factor(min_temperature: f64, config: &ChargeConfig) -> f64 {
        ramp_up(min_temperature, config.cold_cutoff_c, config.cold_full_current_c)
    }
}

impl ChargeTaper for LinearTaper {
    fn factor(&self, snapshot: &PackSnapshot, thresholds: &ThresholdConfig, config: &ChargeConfig) -> f64 {
        Self::soc_factor(snapshot.mean_soc, thresholds, config)
            * Self::thermal_factor(snapshot.max_temperature, thresholds, config)
            * Self::cold_factor(snapshot.min_temperature, config)
    }

    fn box_clone(&self) -> Box<dyn ChargeTaper> {
        Box::new(*self)
    }
}

// ============================================================================
// Constant current
// ============================================================================

/// No taper: the requested current is passed through unchanged. Only the
/// safety state machine stops the charge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantCurrent;

impl ChargeTaper for ConstantCurrent {
    fn factor(&self, _snapshot: &PackSnapshot, _thresholds: &ThresholdConfig, _config: &ChargeConfig) -> f64 {
        1.0
    }

    fn box_clone(&self) -> Box<dyn ChargeTaper> {
        Box::new(*self)
    }
}

/// Configuration-facing selector for the taper strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaperPolicy {
    #[default]
    Linear,
    Constant,
}

impl TaperPolicy {
    pub fn strategy(self) -> Box<dyn ChargeTaper> {
        match self {
            TaperPolicy::Linear => Box::new(LinearTaper),
            TaperPolicy::Constant => Box::new(ConstantCurrent),
        }
    }
}
