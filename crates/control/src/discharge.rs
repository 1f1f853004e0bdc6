//! Discharge current ceiling
//!
//! The ceiling falls linearly to zero as the mean SoC approaches the soc_min
//! warning level, and as the cell voltage spread approaches the imbalance
//! critical level. The tighter of the two wins.

use electrical::PackSnapshot;
use serde::{Deserialize, Serialize};
use simcore::ConfigurationError;

use crate::taper::{ramp_down, ramp_up};
use crate::thresholds::ThresholdConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DischargeConfig {
    /// Ceiling with a healthy, balanced pack (A)
    pub max_current_a: f64,
    /// SoC band above the soc_min warning level over which the ceiling ramps to zero
    pub soc_window: f64,
    /// Voltage spread at which imbalance derating starts (V)
    pub imbalance_derate_v: f64,
}

impl Default for DischargeConfig {
    fn default() -> Self {
        Self {
            max_current_a: 30.0,
            soc_window: 0.10,
            imbalance_derate_v: 0.10,
        }
    }
}

impl DischargeConfig {
    pub fn with_max_current(mut self, max_current_a: f64) -> Self {
        self.max_current_a = max_current_a;
        self
    }

    pub fn validate(&self, thresholds: &ThresholdConfig) -> Result<(), ConfigurationError> {
        if !(self.max_current_a.is_finite() && self.max_current_a > 0.0) {
            return Err(ConfigurationError::NotPositive("discharge.max_current_a"));
        }
        if !(self.soc_window.is_finite() && self.soc_window >= 0.0) {
            return Err(ConfigurationError::NotPositive("discharge.soc_window"));
        }
        if !(self.imbalance_derate_v.is_finite() && self.imbalance_derate_v >= 0.0)
            || self.imbalance_derate_v > thresholds.imbalance_max.critical
        {
            return Err(ConfigurationError::OutOfRange {
                name: "discharge.imbalance_derate_v",
                value: self.imbalance_derate_v,
                min: 0.0,
                max: thresholds.imbalance_max.critical,
            });
        }
        Ok(())
    }
}

/// SoC derating alone, in [0, 1].
pub fn soc_factor(mean_soc: f64, thresholds: &ThresholdConfig, config: &DischargeConfig) -> f64 {
    let floor = thresholds.soc_min.warning;
    ramp_up(mean_soc, floor, floor + config.soc_window)
}

/// Imbalance derating alone, in [0, 1].
pub fn imbalance_factor(imbalance: f64, thresholds: &ThresholdConfig, config: &DischargeConfig) -> f64 {
    ramp_down(imbalance, config.imbalance_derate_v, thresholds.imbalance_max.critical)
}

/// Largest discharge current the controller will allow for `snapshot` (A).
pub fn discharge_ceiling(snapshot: &PackSnapshot, thresholds: &ThresholdConfig, config: &DischargeConfig) -> f64 {
    let factor = soc_factor(snapshot.mean_soc, thresholds, config)
        .min(imbalance_factor(snapshot.imbalance, thresholds, config));
    config.max_current_a * factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use electrical::{Pack, PackConfig, VarianceConfig};

    fn snapshot(mean_soc: f64, imbalance: f64) -> PackSnapshot {
        let config = PackConfig::new(1, 2).with_variance(VarianceConfig::none());
        let mut snap = Pack::new(&config).unwrap().measure();
        snap.mean_soc = mean_soc;
        snap.imbalance = imbalance;
        snap
    }

    #[test]
    fn test_full_ceiling_for_healthy_pack() {
        let t = ThresholdConfig::default();
        let c = DischargeConfig::default();
        assert_eq!(discharge_ceiling(&snapshot(0.6, 0.01), &t, &c), 30.0);
    }

    #[test]
    fn test_ceiling_falls_toward_soc_floor() {
        let t = ThresholdConfig::default();
        let c = DischargeConfig::default();
        assert_relative_eq!(discharge_ceiling(&snapshot(0.15, 0.0), &t, &c), 15.0, epsilon = 1e-9);
        assert_eq!(discharge_ceiling(&snapshot(0.10, 0.0), &t, &c), 0.0);
        assert_eq!(discharge_ceiling(&snapshot(0.02, 0.0), &t, &c), 0.0);
    }

    #[test]
    fn test_ceiling_falls_with_imbalance() {
        let t = ThresholdConfig::default();
        let c = DischargeConfig::default();
        // 0.2 V is halfway between the 0.1 V derate start and the 0.3 V critical level
        assert_relative_eq!(discharge_ceiling(&snapshot(0.8, 0.2), &t, &c), 15.0, epsilon = 1e-9);
        assert_eq!(discharge_ceiling(&snapshot(0.8, 0.35), &t, &c), 0.0);
    }

    #[test]
    fn test_tighter_derating_wins() {
        let t = ThresholdConfig::default();
        let c = DischargeConfig::default();
        // SoC factor 0.5, imbalance factor 0.25
        let ceiling = discharge_ceiling(&snapshot(0.15, 0.25), &t, &c);
        assert_relative_eq!(ceiling, 7.5, epsilon = 1e-9);
    }

    #[test]
    fn test_config_validation() {
        let t = ThresholdConfig::default();
        assert!(DischargeConfig::default().validate(&t).is_ok());
        assert!(DischargeConfig::default().with_max_current(0.0).validate(&t).is_err());
        let past_critical = DischargeConfig {
            imbalance_derate_v: 0.5,
            ..Default::default()
        };
        assert!(past_critical.validate(&t).is_err());
    }
}
