//! Load profiles
//!
//! A profile maps simulated time to the operator's demand. Segments are
//! half-open `[start_s, end_s)` windows; time outside every segment is rest.
//! A periodic profile wraps time modulo its period before the lookup.

use serde::{Deserialize, Serialize};
use simcore::ConfigurationError;

/// What the operator asks of the pack. Magnitudes are non-negative amps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Demand {
    #[default]
    Rest,
    Charge { current: f64 },
    Discharge { current: f64 },
}

impl Demand {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match *self {
            Demand::Rest => Ok(()),
            Demand::Charge { current } | Demand::Discharge { current } => {
                if current.is_finite() && current >= 0.0 {
                    Ok(())
                } else {
                    Err(ConfigurationError::NotPositive("demand current"))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSegment {
    pub start_s: f64,
    pub end_s: f64,
    pub demand: Demand,
}

impl ProfileSegment {
    pub fn new(start_s: f64, end_s: f64, demand: Demand) -> Self {
        Self { start_s, end_s, demand }
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start_s <= t && t < self.end_s
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadProfile {
    /// Repeat period (s); `None` plays the segments once
    pub period_s: Option<f64>,
    pub segments: Vec<ProfileSegment>,
}

const HOUR: f64 = 3600.0;

impl LoadProfile {
    /// A single demand held forever.
    pub fn constant(demand: Demand) -> Self {
        Self {
            period_s: None,
            segments: vec![ProfileSegment::new(0.0, f64::MAX, demand)],
        }
    }

    /// A 24 h usage day: morning discharge, rest, heavy use, light use, rest,
    /// medium use, then an evening charge. Pack-level amps.
    pub fn daily_cycle() -> Self {
        let discharge = |current| Demand::Discharge { current };
        Self {
            period_s: Some(24.0 * HOUR),
            segments: vec![
                ProfileSegment::new(0.0, 2.0 * HOUR, discharge(5.0)),
                ProfileSegment::new(2.0 * HOUR, 8.0 * HOUR, Demand::Rest),
                ProfileSegment::new(8.0 * HOUR, 10.0 * HOUR, discharge(15.0)),
                ProfileSegment::new(10.0 * HOUR, 12.0 * HOUR, discharge(2.0)),
                ProfileSegment::new(12.0 * HOUR, 14.0 * HOUR, Demand::Rest),
                ProfileSegment::new(14.0 * HOUR, 16.0 * HOUR, discharge(10.0)),
                ProfileSegment::new(16.0 * HOUR, 18.0 * HOUR, Demand::Charge { current: 15.0 }),
            ],
        }
    }

    pub fn with_segment(mut self, segment: ProfileSegment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_period(mut self, period_s: f64) -> Self {
        self.period_s = Some(period_s);
        self
    }

    /// Demand at simulated time `t` (s). The first matching segment wins.
    pub fn demand_at(&self, t: f64) -> Demand {
        let t = match self.period_s {
            Some(period) => t.rem_euclid(period),
            None => t,
        };
        self.segments
            .iter()
            .find(|segment| segment.contains(t))
            .map_or(Demand::Rest, |segment| segment.demand)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(period) = self.period_s {
            if !(period.is_finite() && period > 0.0) {
                return Err(ConfigurationError::NotPositive("profile.period_s"));
            }
        }
        for segment in &self.segments {
            if !(segment.start_s.is_finite() && segment.end_s.is_finite()) || segment.start_s >= segment.end_s {
                return Err(ConfigurationError::Inconsistent(format!(
                    "profile segment [{}, {}) is empty or unbounded",
                    segment.start_s, segment.end_s
                )));
            }
            segment.demand.validate()?;
        }
        Ok(())
    }
}
