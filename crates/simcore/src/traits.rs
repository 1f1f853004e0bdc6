use serde::{Deserialize, Serialize};

/// Per-tick context handed from the controller down to the pack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimContext {
    /// Step length (s)
    pub dt: f64,
    /// Simulated time at the start of the step (s)
    pub t: f64,
    /// Ambient temperature around the pack (°C)
    pub ambient_temperature: f64,
}

impl SimContext {
    pub fn new(dt: f64, t: f64, ambient_temperature: f64) -> Self {
        SimContext {
            dt,
            t,
            ambient_temperature,
        }
    }

    /// Context for the step that follows this one.
    pub fn advance(self) -> Self {
        SimContext {
            t: self.t + self.dt,
            ..self
        }
    }
}

/// SoC boundary a cell was pinned against during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocBoundary {
    /// Charging current kept pushing a full cell
    Full,
    /// Discharge current kept pulling an empty cell
    Empty,
}

pub trait Model {
    fn reset(&mut self);
}
