//! Manufacturing spread between nominally identical cells.
//!
//! Offsets are drawn from a seeded generator once, when the pack is built, so
//! two packs built from the same seed and configuration are identical.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use simcore::ConfigurationError;

use crate::cell::ManufacturingVariance;

/// Relative standard deviations of the per-cell offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarianceConfig {
    pub capacity_std: f64,
    pub resistance_std: f64,
    pub ocv_std: f64,
}

impl Default for VarianceConfig {
    fn default() -> Self {
        VarianceConfig {
            capacity_std: 0.03,
            resistance_std: 0.05,
            ocv_std: 0.002,
        }
    }
}

impl VarianceConfig {
    /// Every cell exactly nominal.
    pub fn none() -> Self {
        VarianceConfig {
            capacity_std: 0.0,
            resistance_std: 0.0,
            ocv_std: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let spreads = [
            ("capacity_std", self.capacity_std),
            ("resistance_std", self.resistance_std),
            ("ocv_std", self.ocv_std),
        ];
        for (name, value) in spreads {
            if !(0.0..=0.25).contains(&value) {
                return Err(ConfigurationError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: 0.25,
                });
            }
        }
        Ok(())
    }
}

// Draws beyond four sigma are folded back so a scale never reaches zero.
const MAX_SIGMAS: f64 = 4.0;

fn scale_sampler(name: &'static str, std: f64) -> Result<Normal<f64>, ConfigurationError> {
    Normal::new(0.0, std).map_err(|_| ConfigurationError::OutOfRange {
        name,
        value: std,
        min: 0.0,
        max: 0.25,
    })
}

fn draw(normal: &Normal<f64>, std: f64, rng: &mut StdRng) -> f64 {
    let limit = MAX_SIGMAS * std;
    1.0 + normal.sample(rng).clamp(-limit, limit)
}

/// Sample `count` per-cell offsets from `seed`.
///
/// Pure in its arguments: the same seed, configuration and count always give
/// the same offsets in the same order.
pub fn sample_variance(
    config: &VarianceConfig,
    seed: u64,
    count: usize,
) -> Result<Vec<ManufacturingVariance>, ConfigurationError> {
    config.validate()?;
    let capacity = scale_sampler("capacity_std", config.capacity_std)?;
    let resistance = scale_sampler("resistance_std", config.resistance_std)?;
    let ocv = scale_sampler("ocv_std", config.ocv_std)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let offsets = (0..count)
        .map(|_| ManufacturingVariance {
            capacity_scale: draw(&capacity, config.capacity_std, &mut rng),
            resistance_scale: draw(&resistance, config.resistance_std, &mut rng),
            ocv_scale: draw(&ocv, config.ocv_std, &mut rng),
        })
        .collect();
    Ok(offsets)
}
