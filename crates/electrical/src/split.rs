//! Current sharing between parallel strings
//!
//! How the pack current divides across its parallel strings decides how fast
//! manufacturing spread turns into imbalance, so the policy is a strategy
//! chosen by configuration rather than baked into the pack.

use serde::{Deserialize, Serialize};

/// Trait for current split strategies
pub trait CurrentSplit: Send + Sync + std::fmt::Debug {
    /// Divide `total` amps over strings with the given net resistances (Ω).
    ///
    /// The returned currents sum to `total` and keep its sign.
    fn split(&self, total: f64, string_resistances: &[f64]) -> Vec<f64>;

    /// Clone this strategy into a boxed trait object
    fn box_clone(&self) -> Box<dyn CurrentSplit>;
}

impl Clone for Box<dyn CurrentSplit> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Every string carries the same share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualSplit;

impl CurrentSplit for EqualSplit {
    fn split(&self, total: f64, string_resistances: &[f64]) -> Vec<f64> {
        let n = string_resistances.len();
        if n == 0 {
            return Vec::new();
        }
        vec![total / n as f64; n]
    }

    fn box_clone(&self) -> Box<dyn CurrentSplit> {
        Box::new(*self)
    }
}

/// Strings carry current in proportion to their conductance, as they would
/// when tied to a common bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConductanceWeighted;

impl CurrentSplit for ConductanceWeighted {
    fn split(&self, total: f64, string_resistances: &[f64]) -> Vec<f64> {
        let conductances: Vec<f64> = string_resistances.iter().map(|r| 1.0 / r).collect();
        let sum: f64 = conductances.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return EqualSplit.split(total, string_resistances);
        }
        conductances.iter().map(|g| total * g / sum).collect()
    }

    fn box_clone(&self) -> Box<dyn CurrentSplit> {
        Box::new(*self)
    }
}

/// Configuration-facing selector for the split strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    #[default]
    Equal,
    ConductanceWeighted,
}

impl SplitPolicy {
    pub fn strategy(self) -> Box<dyn CurrentSplit> {
        match self {
            SplitPolicy::Equal => Box::new(EqualSplit),
            SplitPolicy::ConductanceWeighted => Box::new(ConductanceWeighted),
        }
    }
}
