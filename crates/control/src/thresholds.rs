//! Safety thresholds
//!
//! Every monitored metric has a warning level and a stricter critical level.
//! Upper-bound metrics trip when the measurement rises past a level,
//! lower-bound metrics when it falls below one.

use std::fmt;

use electrical::PackSnapshot;
use serde::{Deserialize, Serialize};
use simcore::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Upper,
    Lower,
}

/// A monitored pack quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Lowest cell voltage (V)
    VoltageMin,
    /// Highest cell voltage (V)
    VoltageMax,
    /// Hottest cell (°C)
    TempMax,
    /// Magnitude of the pack current (A)
    CurrentMax,
    /// Mean SoC, lower bound
    SocMin,
    /// Mean SoC, upper bound
    SocMax,
    /// Max minus min cell voltage (V)
    ImbalanceMax,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::VoltageMin,
        Metric::VoltageMax,
        Metric::TempMax,
        Metric::CurrentMax,
        Metric::SocMin,
        Metric::SocMax,
        Metric::ImbalanceMax,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::VoltageMin => "voltage_min",
            Metric::VoltageMax => "voltage_max",
            Metric::TempMax => "temp_max",
            Metric::CurrentMax => "current_max",
            Metric::SocMin => "soc_min",
            Metric::SocMax => "soc_max",
            Metric::ImbalanceMax => "imbalance_max",
        }
    }

    pub fn bound(self) -> Bound {
        match self {
            Metric::VoltageMin | Metric::SocMin => Bound::Lower,
            _ => Bound::Upper,
        }
    }

    /// Read this metric off a pack snapshot.
    pub fn measure(self, snapshot: &PackSnapshot) -> f64 {
        match self {
            Metric::VoltageMin => snapshot.min_cell_voltage,
            Metric::VoltageMax => snapshot.max_cell_voltage,
            Metric::TempMax => snapshot.max_temperature,
            Metric::CurrentMax => snapshot.pack_current.abs(),
            Metric::SocMin | Metric::SocMax => snapshot.mean_soc,
            Metric::ImbalanceMax => snapshot.imbalance,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub warning: f64,
    pub critical: f64,
}

impl Limit {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Limit { warning, critical }
    }
}

/// One metric past one of its levels at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub metric: Metric,
    pub severity: Severity,
    pub value: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Per-cell voltage floor (V)
    pub voltage_min: Limit,
    /// Per-cell voltage ceiling (V)
    pub voltage_max: Limit,
    /// Cell temperature ceiling (°C)
    pub temp_max: Limit,
    /// Pack current magnitude ceiling (A)
    pub current_max: Limit,
    pub soc_min: Limit,
    pub soc_max: Limit,
    /// Cell voltage spread ceiling (V)
    pub imbalance_max: Limit,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            voltage_min: Limit::new(2.9, 2.7),
            voltage_max: Limit::new(4.15, 4.25),
            temp_max: Limit::new(45.0, 55.0),
            current_max: Limit::new(40.0, 60.0),
            soc_min: Limit::new(0.10, 0.05),
            soc_max: Limit::new(0.90, 0.98),
            imbalance_max: Limit::new(0.15, 0.30),
        }
    }
}

impl ThresholdConfig {
    pub fn limit(&self, metric: Metric) -> Limit {
        match metric {
            Metric::VoltageMin => self.voltage_min,
            Metric::VoltageMax => self.voltage_max,
            Metric::TempMax => self.temp_max,
            Metric::CurrentMax => self.current_max,
            Metric::SocMin => self.soc_min,
            Metric::SocMax => self.soc_max,
            Metric::ImbalanceMax => self.imbalance_max,
        }
    }

    pub fn with_limit(mut self, metric: Metric, limit: Limit) -> Self {
        let slot = match metric {
            Metric::VoltageMin => &mut self.voltage_min,
            Metric::VoltageMax => &mut self.voltage_max,
            Metric::TempMax => &mut self.temp_max,
            Metric::CurrentMax => &mut self.current_max,
            Metric::SocMin => &mut self.soc_min,
            Metric::SocMax => &mut self.soc_max,
            Metric::ImbalanceMax => &mut self.imbalance_max,
        };
        *slot = limit;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for metric in Metric::ALL {
            let limit = self.limit(metric);
            if !limit.warning.is_finite() || !limit.critical.is_finite() {
                return Err(ConfigurationError::Inconsistent(format!(
                    "{metric}: levels must be finite"
                )));
            }
            let inverted = match metric.bound() {
                Bound::Upper => limit.warning > limit.critical,
                Bound::Lower => limit.warning < limit.critical,
            };
            if inverted {
                return Err(ConfigurationError::InvertedLimit {
                    metric: metric.name(),
                    warning: limit.warning,
                    critical: limit.critical,
                });
            }
        }

        for metric in [Metric::SocMin, Metric::SocMax] {
            let limit = self.limit(metric);
            for value in [limit.warning, limit.critical] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigurationError::OutOfRange {
                        name: metric.name(),
                        value,
                        min: 0.0,
                        max: 1.0,
                    });
                }
            }
        }
        for metric in [Metric::CurrentMax, Metric::ImbalanceMax] {
            if self.limit(metric).warning <= 0.0 {
                return Err(ConfigurationError::NotPositive(metric.name()));
            }
        }

        if self.voltage_min.warning >= self.voltage_max.warning {
            return Err(ConfigurationError::Inconsistent(format!(
                "voltage_min warning {} must sit below voltage_max warning {}",
                self.voltage_min.warning, self.voltage_max.warning
            )));
        }
        if self.soc_min.warning >= self.soc_max.warning {
            return Err(ConfigurationError::Inconsistent(format!(
                "soc_min warning {} must sit below soc_max warning {}",
                self.soc_min.warning, self.soc_max.warning
            )));
        }
        Ok(())
    }

    /// Severity and the level crossed for `value` of `metric`, if any.
    pub fn classify(&self, metric: Metric, value: f64) -> Option<(Severity, f64)> {
        let limit = self.limit(metric);
        let past = |level: f64| match metric.bound() {
            Bound::Upper => value > level,
            Bound::Lower => value < level,
        };
        if past(limit.critical) {
            Some((Severity::Critical, limit.critical))
        } else if past(limit.warning) {
            Some((Severity::Warning, limit.warning))
        } else {
            None
        }
    }

    /// Every metric of `snapshot` past a level, in `Metric::ALL` order.
    pub fn evaluate(&self, snapshot: &PackSnapshot) -> Vec<Violation> {
        Metric::ALL
            .iter()
            .filter_map(|&metric| {
                let value = metric.measure(snapshot);
                self.classify(metric, value).map(|(severity, threshold)| Violation {
                    metric,
                    severity,
                    value,
                    threshold,
                })
            })
            .collect()
    }
}
