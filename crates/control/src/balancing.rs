//! Passive cell balancing
//!
//! When the cell voltage spread exceeds a threshold, every cell whose SoC sits
//! above the pack mean is bled through its balancing resistor. Cells at or
//! below the mean are never touched.

use electrical::{BalancingCommand, PackSnapshot};
use serde::{Deserialize, Serialize};
use simcore::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancingConfig {
    pub enabled: bool,
    /// Voltage spread that triggers balancing (V)
    pub threshold_v: f64,
    /// Margin above the mean SoC a cell must exceed to be bled
    pub soc_tolerance: f64,
    /// Bleed current per balanced cell (A)
    pub bleed_current_a: f64,
}

impl Default for BalancingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_v: 0.02,
            soc_tolerance: 0.002,
            bleed_current_a: 0.1,
        }
    }
}

impl BalancingConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.threshold_v.is_finite() && self.threshold_v >= 0.0) {
            return Err(ConfigurationError::NotPositive("balancing.threshold_v"));
        }
        if !(self.soc_tolerance.is_finite() && self.soc_tolerance >= 0.0) {
            return Err(ConfigurationError::NotPositive("balancing.soc_tolerance"));
        }
        if !(self.bleed_current_a.is_finite() && self.bleed_current_a > 0.0) {
            return Err(ConfigurationError::NotPositive("balancing.bleed_current_a"));
        }
        Ok(())
    }
}

/// Bleed plan for the tick after `snapshot`.
pub fn plan_balancing(snapshot: &PackSnapshot, config: &BalancingConfig) -> BalancingCommand {
    let mut command = BalancingCommand::none();
    if !config.enabled || snapshot.imbalance <= config.threshold_v {
        return command;
    }
    let cutoff = snapshot.mean_soc + config.soc_tolerance;
    for cell in &snapshot.cells {
        if cell.state().soc > cutoff {
            command.bleed(cell.index(), config.bleed_current_a);
        }
    }
    command
}
