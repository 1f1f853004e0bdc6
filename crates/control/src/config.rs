//! Simulation configuration
//!
//! Every section has serde defaults, so a JSON file only needs to name the
//! fields it changes.

use electrical::analysis::voltage_sag;
use electrical::{Pack, PackConfig};
use log::warn;
use serde::{Deserialize, Serialize};
use simcore::ConfigurationError;

use crate::balancing::BalancingConfig;
use crate::bms::BatteryManagementSystem;
use crate::discharge::DischargeConfig;
use crate::error::BmsError;
use crate::profile::LoadProfile;
use crate::taper::ChargeConfig;
use crate::thresholds::ThresholdConfig;

/// Controller tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub charge: ChargeConfig,
    pub discharge: DischargeConfig,
    pub balancing: BalancingConfig,
}

impl ControlConfig {
    pub fn with_charge(mut self, charge: ChargeConfig) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_discharge(mut self, discharge: DischargeConfig) -> Self {
        self.discharge = discharge;
        self
    }

    pub fn with_balancing(mut self, balancing: BalancingConfig) -> Self {
        self.balancing = balancing;
        self
    }

    pub fn validate(&self, thresholds: &ThresholdConfig) -> Result<(), ConfigurationError> {
        self.charge.validate()?;
        self.discharge.validate(thresholds)?;
        self.balancing.validate()
    }

    /// Check the current maxima against `parallel` strings of cells rated
    /// for `cell_ceiling` amps each, with balancing bleed on top of a
    /// discharging cell.
    pub fn validate_ceilings(&self, parallel: usize, cell_ceiling: f64) -> Result<(), ConfigurationError> {
        let strings = parallel as f64;
        let bleed = self.balancing.bleed_current_a;
        if bleed >= cell_ceiling {
            return Err(ConfigurationError::OutOfRange {
                name: "balancing.bleed_current_a",
                value: bleed,
                min: 0.0,
                max: cell_ceiling,
            });
        }
        let charge_limit = strings * cell_ceiling;
        if self.charge.max_current_a > charge_limit {
            return Err(ConfigurationError::OutOfRange {
                name: "charge.max_current_a",
                value: self.charge.max_current_a,
                min: 0.0,
                max: charge_limit,
            });
        }
        let discharge_limit = strings * (cell_ceiling - bleed);
        if self.discharge.max_current_a > discharge_limit {
            return Err(ConfigurationError::OutOfRange {
                name: "discharge.max_current_a",
                value: self.discharge.max_current_a,
                min: 0.0,
                max: discharge_limit,
            });
        }
        Ok(())
    }
}

/// Length and environment of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub ticks: u64,
    /// Step length (s)
    pub dt_s: f64,
    pub ambient_temperature_c: f64,
    /// Stop early after this many consecutive Critical ticks
    pub halt_after_critical_ticks: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 24 * 60,
            dt_s: 60.0,
            ambient_temperature_c: 25.0,
            halt_after_critical_ticks: None,
        }
    }
}

impl RunConfig {
    pub fn new(ticks: u64, dt_s: f64) -> Self {
        Self {
            ticks,
            dt_s,
            ..Default::default()
        }
    }

    pub fn with_ambient(mut self, ambient_temperature_c: f64) -> Self {
        self.ambient_temperature_c = ambient_temperature_c;
        self
    }

    pub fn with_halt_after(mut self, critical_ticks: u64) -> Self {
        self.halt_after_critical_ticks = Some(critical_ticks);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.dt_s.is_finite() && self.dt_s > 0.0) {
            return Err(ConfigurationError::NotPositive("run.dt_s"));
        }
        if !self.ambient_temperature_c.is_finite() {
            return Err(ConfigurationError::Inconsistent(
                "run.ambient_temperature_c must be finite".to_string(),
            ));
        }
        if self.halt_after_critical_ticks == Some(0) {
            return Err(ConfigurationError::NotPositive("run.halt_after_critical_ticks"));
        }
        Ok(())
    }
}

/// Complete description of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub pack: PackConfig,
    pub thresholds: ThresholdConfig,
    pub control: ControlConfig,
    pub run: RunConfig,
    pub profile: LoadProfile,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            pack: PackConfig::default(),
            thresholds: ThresholdConfig::default(),
            control: ControlConfig::default(),
            run: RunConfig::default(),
            profile: LoadProfile::daily_cycle(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, BmsError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.pack.validate()?;
        self.thresholds.validate()?;
        self.control.validate(&self.thresholds)?;
        self.control
            .validate_ceilings(self.pack.parallel, self.pack.cell.max_abs_current_a)?;
        self.run.validate()?;
        self.profile.validate()
    }

    /// Worst terminal voltage of a nominal cell carrying its share of the
    /// discharge maximum at ambient temperature, and the SoC where it occurs.
    pub fn discharge_sag(&self) -> (f64, f64) {
        let per_string = self.control.discharge.max_current_a / self.pack.parallel as f64;
        voltage_sag(&self.pack.cell, per_string, self.run.ambient_temperature_c)
    }

    /// Whether a full-rate discharge would pull a cell under the critical
    /// voltage floor before the SoC derating takes over.
    pub fn sags_below_voltage_floor(&self) -> bool {
        self.discharge_sag().0 < self.thresholds.voltage_min.critical
    }

    /// Build the pack and its controller.
    pub fn build(&self) -> Result<BatteryManagementSystem, ConfigurationError> {
        self.validate()?;
        if self.sags_below_voltage_floor() {
            let (voltage, soc) = self.discharge_sag();
            warn!(
                "{:.1} A discharge sags a cell to {:.3} V at SoC {:.2}, under the {:.2} V critical floor",
                self.control.discharge.max_current_a, voltage, soc, self.thresholds.voltage_min.critical
            );
        }
        let pack = Pack::new(&self.pack)?;
        BatteryManagementSystem::new(pack, self.thresholds.clone(), self.control.clone())
    }
}
