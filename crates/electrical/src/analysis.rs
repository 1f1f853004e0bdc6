//! Single-cell characterisation helpers
//!
//! These run a throwaway copy of a cell so the pack under simulation is never
//! touched. Results are plain vectors ready for a plotting collaborator.

use simcore::ModelError;

use crate::cell::{Cell, CellConstants, CellPosition, ManufacturingVariance};

/// Result of a constant-current discharge
#[derive(Debug, Clone, Default)]
pub struct DischargeCurve {
    pub times: Vec<f64>,
    pub voltages: Vec<f64>,
    pub soc: Vec<f64>,
    pub temperatures: Vec<f64>,
}

impl DischargeCurve {
    /// Charge delivered before the run stopped (Ah).
    pub fn delivered_ah(&self, current: f64) -> f64 {
        self.times.last().map_or(0.0, |t| t * current / 3600.0)
    }
}

/// Discharge a fresh nominal cell at constant current until it is empty,
/// drops below `cutoff_voltage`, or `duration_s` elapses.
///
/// # Arguments
/// * `constants` - Cell parameters
/// * `current` - Constant discharge current (A)
/// * `ambient_temperature` - Ambient and starting temperature (°C)
/// * `cutoff_voltage` - Terminal voltage that ends the run (V)
/// * `duration_s` - Upper bound on simulated time (s)
/// * `dt` - Time step (s)
pub fn simulate_cell_discharge(
    constants: &CellConstants,
    current: f64,
    ambient_temperature: f64,
    cutoff_voltage: f64,
    duration_s: f64,
    dt: f64,
) -> Result<DischargeCurve, ModelError> {
    let mut cell = Cell::new(
        CellPosition::default(),
        constants.clone(),
        ManufacturingVariance::default(),
        1.0,
        ambient_temperature,
    );
    let mut curve = DischargeCurve::default();
    let mut t = 0.0;

    while t < duration_s {
        let state = cell.step(current, ambient_temperature, dt)?;
        t += dt;
        curve.times.push(t);
        curve.voltages.push(state.voltage);
        curve.soc.push(state.soc);
        curve.temperatures.push(state.temperature);

        if state.soc <= 0.0 || state.voltage <= cutoff_voltage {
            break;
        }
    }
    Ok(curve)
}

/// Sample the open-circuit voltage curve at `n_points` evenly spaced SoC
/// values. Returns (soc, voltage) pairs.
pub fn sample_ocv(constants: &CellConstants, n_points: usize) -> Vec<(f64, f64)> {
    if n_points < 2 {
        return vec![(0.0, constants.ocv_curve.voltage_at(0.0))];
    }
    (0..n_points)
        .map(|i| {
            let soc = i as f64 / (n_points - 1) as f64;
            (soc, constants.ocv_curve.voltage_at(soc))
        })
        .collect()
}

/// Worst-case terminal voltage of a fresh cell under `peak_current`.
///
/// Returns (min_voltage, soc_at_min_voltage)
pub fn voltage_sag(constants: &CellConstants, peak_current: f64, temperature: f64) -> (f64, f64) {
    let cell = Cell::new(
        CellPosition::default(),
        constants.clone(),
        ManufacturingVariance::default(),
        1.0,
        temperature,
    );
    let resistance = cell.resistance(temperature, 1.0);
    let test_socs = [1.0, 0.8, 0.6, 0.4, 0.2, 0.1, 0.05];

    test_socs
        .iter()
        .map(|&soc| (cell.terminal_voltage(soc, 1.0, peak_current, resistance), soc))
        .fold((f64::INFINITY, 1.0), |worst, candidate| {
            if candidate.0 < worst.0 { candidate } else { worst }
        })
}
