//! Equivalent-circuit lithium-ion cell
//!
//! A single cell is modelled as an open-circuit voltage source in series with
//! an ohmic resistance, sitting on a lumped thermal mass. Aging is tracked as
//! a state-of-health factor that fades capacity and raises resistance.
//!
//! Sign convention: positive current discharges the cell, negative current
//! charges it.

use log::debug;
use serde::{Deserialize, Serialize};
use simcore::{ConfigurationError, ModelError, SocBoundary};

const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OcvPoint {
    pub soc: f64,
    pub voltage: f64,
}

impl OcvPoint {
    pub const fn new(soc: f64, voltage: f64) -> Self {
        OcvPoint { soc, voltage }
    }
}

/// Open-circuit voltage as a function of SoC.
///
/// Anchors are joined with a monotone piecewise cubic Hermite interpolant, so
/// a strictly increasing anchor table yields a strictly increasing curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<OcvPoint>", into = "Vec<OcvPoint>")]
pub struct OcvCurve {
    points: Vec<OcvPoint>,
}

impl OcvCurve {
    pub fn new(points: Vec<OcvPoint>) -> Result<Self, ConfigurationError> {
        if points.len() < 2 {
            return Err(ConfigurationError::OcvCurve(format!(
                "need at least two anchors, got {}",
                points.len()
            )));
        }
        if points
            .iter()
            .any(|p| !p.soc.is_finite() || !p.voltage.is_finite() || p.voltage <= 0.0)
        {
            return Err(ConfigurationError::OcvCurve(
                "anchors must be finite with positive voltage".to_string(),
            ));
        }
        let first = points[0].soc;
        let last = points[points.len() - 1].soc;
        if first != 0.0 || last != 1.0 {
            return Err(ConfigurationError::OcvCurve(format!(
                "anchors must span SoC 0..1, got {first}..{last}"
            )));
        }
        for pair in points.windows(2) {
            if pair[1].soc <= pair[0].soc || pair[1].voltage <= pair[0].voltage {
                return Err(ConfigurationError::OcvCurve(format!(
                    "anchors must strictly increase, ({}, {}) follows ({}, {})",
                    pair[1].soc, pair[1].voltage, pair[0].soc, pair[0].voltage
                )));
            }
        }
        Ok(OcvCurve { points })
    }

    pub fn points(&self) -> &[OcvPoint] {
        &self.points
    }

    /// Open-circuit voltage at the given SoC (clamped to 0..1).
    pub fn voltage_at(&self, soc: f64) -> f64 {
        let s = soc.clamp(0.0, 1.0);
        let p = &self.points;
        let k = p
            .windows(2)
            .position(|pair| s <= pair[1].soc)
            .unwrap_or(p.len() - 2);

        let (a, b) = (p[k], p[k + 1]);
        let h = b.soc - a.soc;
        let t = (s - a.soc) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        // Hermite basis
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * a.voltage + h10 * h * self.tangent(k) + h01 * b.voltage + h11 * h * self.tangent(k + 1)
    }

    fn secant(&self, k: usize) -> f64 {
        let (a, b) = (self.points[k], self.points[k + 1]);
        (b.voltage - a.voltage) / (b.soc - a.soc)
    }

    // Fritsch-Butland weighted harmonic mean keeps the interpolant monotone.
    fn tangent(&self, k: usize) -> f64 {
        let n = self.points.len();
        if k == 0 {
            return self.secant(0);
        }
        if k == n - 1 {
            return self.secant(n - 2);
        }
        let h0 = self.points[k].soc - self.points[k - 1].soc;
        let h1 = self.points[k + 1].soc - self.points[k].soc;
        let d0 = self.secant(k - 1);
        let d1 = self.secant(k);
        if d0 * d1 <= 0.0 {
            return 0.0;
        }
        3.0 * (h0 + h1) / ((2.0 * h1 + h0) / d0 + (h1 + 2.0 * h0) / d1)
    }
}

impl Default for OcvCurve {
    fn default() -> Self {
        OcvCurve {
            points: vec![
                OcvPoint::new(0.00, 3.00),
                OcvPoint::new(0.05, 3.30),
                OcvPoint::new(0.10, 3.45),
                OcvPoint::new(0.20, 3.56),
                OcvPoint::new(0.40, 3.66),
                OcvPoint::new(0.60, 3.78),
                OcvPoint::new(0.80, 3.95),
                OcvPoint::new(0.90, 4.06),
                OcvPoint::new(1.00, 4.20),
            ],
        }
    }
}

impl TryFrom<Vec<OcvPoint>> for OcvCurve {
    type Error = ConfigurationError;

    fn try_from(points: Vec<OcvPoint>) -> Result<Self, Self::Error> {
        OcvCurve::new(points)
    }
}

impl From<OcvCurve> for Vec<OcvPoint> {
    fn from(curve: OcvCurve) -> Self {
        curve.points
    }
}

/// Nominal parameters shared by every cell of a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConstants {
    /// Rated capacity of a fresh cell (Ah)
    pub rated_capacity_ah: f64,
    /// Ohmic resistance at the reference temperature, fresh cell (Ω)
    pub internal_resistance_ohm: f64,
    pub ocv_curve: OcvCurve,
    /// Temperature at which `internal_resistance_ohm` applies (°C)
    pub reference_temperature_c: f64,
    /// Fractional resistance rise per °C below the reference temperature
    pub cold_resistance_coefficient: f64,
    /// Fractional resistance rise at SoH = 0
    pub aged_resistance_gain: f64,
    /// Fraction of rated capacity left at SoH = 0
    pub end_of_life_capacity: f64,
    /// Fractional OCV depression at SoH = 0
    pub ocv_aging_drop: f64,
    /// Heat capacity of the cell (J/K)
    pub thermal_mass_j_per_k: f64,
    /// Heat transfer to ambient (W/K)
    pub heat_transfer_w_per_k: f64,
    /// SoH lost per equivalent full cycle
    pub cycle_fade: f64,
    /// Temperature above which calendar fade accelerates (°C)
    pub high_temperature_threshold_c: f64,
    /// SoH lost per hour spent above the high-temperature threshold
    pub high_temperature_fade_per_hour: f64,
    /// Model sanity bound on |current| through one cell (A)
    pub max_abs_current_a: f64,
}

impl Default for CellConstants {
    fn default() -> Self {
        CellConstants {
            rated_capacity_ah: 3.2,
            internal_resistance_ohm: 0.02,
            ocv_curve: OcvCurve::default(),
            reference_temperature_c: 25.0,
            cold_resistance_coefficient: 0.015,
            aged_resistance_gain: 1.0,
            end_of_life_capacity: 0.7,
            ocv_aging_drop: 0.02,
            thermal_mass_j_per_k: 200.0,
            heat_transfer_w_per_k: 0.1,
            cycle_fade: 0.002,
            high_temperature_threshold_c: 35.0,
            high_temperature_fade_per_hour: 0.001,
            max_abs_current_a: 50.0,
        }
    }
}

impl CellConstants {
    pub fn with_capacity(mut self, rated_capacity_ah: f64) -> Self {
        self.rated_capacity_ah = rated_capacity_ah;
        self
    }

    pub fn with_resistance(mut self, internal_resistance_ohm: f64) -> Self {
        self.internal_resistance_ohm = internal_resistance_ohm;
        self
    }

    pub fn with_ocv_curve(mut self, ocv_curve: OcvCurve) -> Self {
        self.ocv_curve = ocv_curve;
        self
    }

    pub fn with_max_current(mut self, max_abs_current_a: f64) -> Self {
        self.max_abs_current_a = max_abs_current_a;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let positive = [
            ("rated_capacity_ah", self.rated_capacity_ah),
            ("internal_resistance_ohm", self.internal_resistance_ohm),
            ("thermal_mass_j_per_k", self.thermal_mass_j_per_k),
            ("max_abs_current_a", self.max_abs_current_a),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigurationError::NotPositive(name));
            }
        }

        let non_negative = [
            ("cold_resistance_coefficient", self.cold_resistance_coefficient),
            ("aged_resistance_gain", self.aged_resistance_gain),
            ("heat_transfer_w_per_k", self.heat_transfer_w_per_k),
            ("cycle_fade", self.cycle_fade),
            ("high_temperature_fade_per_hour", self.high_temperature_fade_per_hour),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigurationError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: f64::INFINITY,
                });
            }
        }

        let fractions = [
            ("end_of_life_capacity", self.end_of_life_capacity),
            ("ocv_aging_drop", self.ocv_aging_drop),
        ];
        for (name, value) in fractions {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigurationError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        if self.end_of_life_capacity <= 0.0 {
            return Err(ConfigurationError::NotPositive("end_of_life_capacity"));
        }

        if !self.reference_temperature_c.is_finite() || !self.high_temperature_threshold_c.is_finite() {
            return Err(ConfigurationError::Inconsistent(
                "cell temperatures must be finite".to_string(),
            ));
        }

        // Deserialization already checked the anchors; rebuild to catch
        // curves assembled by hand.
        OcvCurve::new(self.ocv_curve.points.clone())?;
        Ok(())
    }
}

/// Fixed per-cell multipliers sampled once at pack construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManufacturingVariance {
    pub capacity_scale: f64,
    pub resistance_scale: f64,
    pub ocv_scale: f64,
}

impl Default for ManufacturingVariance {
    fn default() -> Self {
        ManufacturingVariance {
            capacity_scale: 1.0,
            resistance_scale: 1.0,
            ocv_scale: 1.0,
        }
    }
}

/// Where a cell sits in the pack grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellPosition {
    /// Row-major index within the pack
    pub index: usize,
    /// Series position inside its string
    pub series: usize,
    /// Parallel string the cell belongs to
    pub string: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellState {
    /// Terminal voltage (V)
    pub voltage: f64,
    pub soc: f64,
    /// Core temperature (°C)
    pub temperature: f64,
    pub soh: f64,
    /// Ohmic resistance at the current temperature and SoH (Ω)
    pub internal_resistance: f64,
    /// Current applied during the last step (A, positive = discharge)
    pub current: f64,
    /// Charge throughput counted toward the next equivalent cycle (Ah)
    pub cycle_throughput_ah: f64,
    pub equivalent_cycles: u32,
    /// Set when the last step pushed SoC against a boundary
    pub saturation: Option<SocBoundary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub position: CellPosition,
    pub constants: CellConstants,
    pub variance: ManufacturingVariance,
    state: CellState,
}

impl Cell {
    /// Create a fresh cell at rest.
    pub fn new(
        position: CellPosition,
        constants: CellConstants,
        variance: ManufacturingVariance,
        soc: f64,
        temperature: f64,
    ) -> Self {
        let mut cell = Cell {
            position,
            constants,
            variance,
            state: CellState {
                voltage: 0.0,
                soc: soc.clamp(0.0, 1.0),
                temperature,
                soh: 1.0,
                internal_resistance: 0.0,
                current: 0.0,
                cycle_throughput_ah: 0.0,
                equivalent_cycles: 0,
                saturation: None,
            },
        };
        cell.state.internal_resistance = cell.resistance(temperature, 1.0);
        cell.state.voltage = cell.terminal_voltage(cell.state.soc, 1.0, 0.0, cell.state.internal_resistance);
        cell
    }

    pub fn state(&self) -> &CellState {
        &self.state
    }

    pub fn index(&self) -> usize {
        self.position.index
    }

    /// Rated capacity including manufacturing spread (Ah).
    pub fn rated_capacity_ah(&self) -> f64 {
        self.constants.rated_capacity_ah * self.variance.capacity_scale
    }

    /// Capacity available at the given SoH (Ah).
    pub fn usable_capacity_ah(&self, soh: f64) -> f64 {
        let eol = self.constants.end_of_life_capacity;
        self.rated_capacity_ah() * (eol + (1.0 - eol) * soh.clamp(0.0, 1.0))
    }

    /// Ohmic resistance at the given temperature and SoH (Ω).
    ///
    /// Rises linearly below the reference temperature and as SoH falls.
    pub fn resistance(&self, temperature: f64, soh: f64) -> f64 {
        let c = &self.constants;
        let cold = 1.0 + c.cold_resistance_coefficient * (c.reference_temperature_c - temperature).max(0.0);
        let aged = 1.0 + c.aged_resistance_gain * (1.0 - soh.clamp(0.0, 1.0));
        c.internal_resistance_ohm * self.variance.resistance_scale * cold * aged
    }

    pub fn open_circuit_voltage(&self, soc: f64, soh: f64) -> f64 {
        let aging = 1.0 - self.constants.ocv_aging_drop * (1.0 - soh.clamp(0.0, 1.0));
        self.constants.ocv_curve.voltage_at(soc) * self.variance.ocv_scale * aging
    }

    pub fn terminal_voltage(&self, soc: f64, soh: f64, current: f64, resistance: f64) -> f64 {
        self.open_circuit_voltage(soc, soh) - current * resistance
    }

    /// Reject inputs `step` would refuse, without touching the cell.
    pub fn check_step(&self, current: f64, ambient_temperature: f64, dt: f64) -> Result<(), ModelError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ModelError::InvalidTimestep(dt));
        }
        if !current.is_finite() {
            return Err(ModelError::NonFinite {
                quantity: "current",
                value: current,
            });
        }
        if !ambient_temperature.is_finite() {
            return Err(ModelError::NonFinite {
                quantity: "ambient temperature",
                value: ambient_temperature,
            });
        }
        if current.abs() > self.constants.max_abs_current_a {
            return Err(ModelError::CurrentCeiling {
                cell: self.position.index,
                current,
                ceiling: self.constants.max_abs_current_a,
            });
        }
        Ok(())
    }

    /// Advance the cell by `dt` seconds under `current`.
    pub fn step(&mut self, current: f64, ambient_temperature: f64, dt: f64) -> Result<CellState, ModelError> {
        self.check_step(current, ambient_temperature, dt)?;

        let c = &self.constants;
        let prev = self.state;
        let resistance = self.resistance(prev.temperature, prev.soh);

        // Coulomb counting
        let capacity_as = self.usable_capacity_ah(prev.soh) * SECONDS_PER_HOUR;
        let unclamped_soc = prev.soc - current * dt / capacity_as;
        let saturation = if unclamped_soc > 1.0 && current < 0.0 {
            Some(SocBoundary::Full)
        } else if unclamped_soc < 0.0 && current > 0.0 {
            Some(SocBoundary::Empty)
        } else {
            None
        };
        let soc = unclamped_soc.clamp(0.0, 1.0);

        // Lumped thermal mass
        let heat_generated = current * current * resistance;
        let heat_lost = c.heat_transfer_w_per_k * (prev.temperature - ambient_temperature);
        let temperature = prev.temperature + dt * (heat_generated - heat_lost) / c.thermal_mass_j_per_k;

        // Cycle fade from throughput, calendar fade while hot
        let cycle_ah = self.rated_capacity_ah();
        let mut throughput = prev.cycle_throughput_ah + current.abs() * dt / SECONDS_PER_HOUR;
        let mut cycles = prev.equivalent_cycles;
        let mut soh = prev.soh;
        while throughput >= cycle_ah {
            throughput -= cycle_ah;
            cycles += 1;
            soh -= c.cycle_fade;
        }
        if temperature > c.high_temperature_threshold_c {
            soh -= c.high_temperature_fade_per_hour * dt / SECONDS_PER_HOUR;
        }
        let soh = soh.max(0.0).min(prev.soh);

        let internal_resistance = self.resistance(temperature, soh);
        let voltage = self.terminal_voltage(soc, soh, current, internal_resistance);

        if let Some(boundary) = saturation {
            debug!(
                "cell {} pinned at {:?} under {:.3} A",
                self.position.index, boundary, current
            );
        }

        self.state = CellState {
            voltage,
            soc,
            temperature,
            soh,
            internal_resistance,
            current,
            cycle_throughput_ah: throughput,
            equivalent_cycles: cycles,
            saturation,
        };
        Ok(self.state)
    }

    /// Check a deserialized cell before it joins a pack.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.constants.validate()?;
        let s = &self.state;
        let fractions = [("cell soc", s.soc), ("cell soh", s.soh)];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        let v = &self.variance;
        if [v.capacity_scale, v.resistance_scale, v.ocv_scale]
            .iter()
            .any(|scale| !(scale.is_finite() && *scale > 0.0))
        {
            return Err(ConfigurationError::NotPositive("manufacturing variance scale"));
        }
        if ![s.voltage, s.temperature, s.internal_resistance, s.current, s.cycle_throughput_ah]
            .iter()
            .all(|x| x.is_finite())
        {
            return Err(ConfigurationError::Inconsistent(format!(
                "cell {} carries non-finite state",
                self.position.index
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn fresh_cell(soc: f64) -> Cell {
        Cell::new(
            CellPosition::default(),
            CellConstants::default(),
            ManufacturingVariance::default(),
            soc,
            25.0,
        )
    }

    #[test]
    fn test_ocv_hits_anchors_and_is_monotone() {
        let curve = OcvCurve::default();
        for p in curve.points() {
            assert_abs_diff_eq!(curve.voltage_at(p.soc), p.voltage, epsilon = 1e-12);
        }

        let mut prev = curve.voltage_at(0.0);
        for i in 1..=1000 {
            let v = curve.voltage_at(i as f64 / 1000.0);
            assert!(v > prev, "OCV should strictly increase, {} <= {} at step {}", v, prev, i);
            prev = v;
        }
    }

    #[test]
    fn test_ocv_rejects_non_monotone_anchors() {
        let points = vec![
            OcvPoint::new(0.0, 3.0),
            OcvPoint::new(0.5, 3.9),
            OcvPoint::new(0.7, 3.8),
            OcvPoint::new(1.0, 4.2),
        ];
        assert!(matches!(OcvCurve::new(points), Err(ConfigurationError::OcvCurve(_))));

        let short = vec![OcvPoint::new(0.0, 3.0), OcvPoint::new(0.9, 4.1)];
        assert!(OcvCurve::new(short).is_err());
    }

    #[test]
    fn test_ocv_curve_deserialization_validates() {
        let ok: Result<OcvCurve, _> =
            serde_json::from_str(r#"[{"soc":0.0,"voltage":3.0},{"soc":1.0,"voltage":4.2}]"#);
        assert!(ok.is_ok());

        let bad: Result<OcvCurve, _> =
            serde_json::from_str(r#"[{"soc":0.0,"voltage":4.0},{"soc":1.0,"voltage":3.2}]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_discharge_coulomb_counting() {
        let mut cell = fresh_cell(0.8);
        // 3.2 A for 360 s removes 0.32 Ah, a tenth of a fresh cell
        let state = cell.step(3.2, 25.0, 360.0).unwrap();
        assert_relative_eq!(state.soc, 0.7, epsilon = 1e-12);
        assert!(state.saturation.is_none());
    }

    #[test]
    fn test_voltage_includes_ohmic_drop() {
        let mut cell = fresh_cell(0.5);
        let state = cell.step(-5.0, 25.0, 1.0).unwrap();
        let ocv = cell.open_circuit_voltage(state.soc, state.soh);
        assert_relative_eq!(state.voltage, ocv + 5.0 * state.internal_resistance, epsilon = 1e-12);
        assert!(state.voltage > ocv, "charging should lift terminal voltage above OCV");
    }

    #[test]
    fn test_rest_at_ambient_is_fixed_point() {
        let mut cell = fresh_cell(0.42);
        let before = *cell.state();
        let after = cell.step(0.0, before.temperature, 10.0).unwrap();
        assert_eq!(after.soc, before.soc);
        assert_eq!(after.temperature, before.temperature);
        assert_eq!(after.voltage, before.voltage);
    }

    #[test]
    fn test_hot_rest_fades_without_moving_soc_or_temperature() {
        let mut cell = Cell::new(
            CellPosition::default(),
            CellConstants::default(),
            ManufacturingVariance::default(),
            0.42,
            45.0,
        );
        let before = *cell.state();
        let after = cell.step(0.0, 45.0, 600.0).unwrap();
        assert_eq!(after.soc, before.soc);
        assert_eq!(after.temperature, before.temperature);
        assert!(after.soh < before.soh);
        assert!(after.voltage < before.voltage);
        // 2 % OCV drop per unit of SoH lost
        let drop = before.voltage - after.voltage;
        assert_relative_eq!(drop, 0.02 * (before.soh - after.soh) * before.voltage, epsilon = 1e-9);
    }

    #[test]
    fn test_charge_saturates_full_cell() {
        let mut cell = fresh_cell(0.999);
        let state = cell.step(-10.0, 25.0, 60.0).unwrap();
        assert_eq!(state.soc, 1.0);
        assert_eq!(state.saturation, Some(SocBoundary::Full));

        // Discharging from full is not saturation
        let state = cell.step(1.0, 25.0, 1.0).unwrap();
        assert!(state.saturation.is_none());
    }

    #[test]
    fn test_discharge_saturates_empty_cell() {
        let mut cell = fresh_cell(0.0);
        let state = cell.step(2.0, 25.0, 10.0).unwrap();
        assert_eq!(state.soc, 0.0);
        assert_eq!(state.saturation, Some(SocBoundary::Empty));
    }

    #[test]
    fn test_invalid_inputs_leave_cell_untouched() {
        let mut cell = fresh_cell(0.5);
        let before = cell.clone();

        assert_eq!(cell.step(1.0, 25.0, 0.0), Err(ModelError::InvalidTimestep(0.0)));
        assert!(matches!(cell.step(1.0, 25.0, -1.0), Err(ModelError::InvalidTimestep(_))));
        assert!(matches!(
            cell.step(50.5, 25.0, 1.0),
            Err(ModelError::CurrentCeiling { ceiling, .. }) if ceiling == 50.0
        ));
        assert!(matches!(cell.step(f64::NAN, 25.0, 1.0), Err(ModelError::NonFinite { .. })));
        assert_eq!(cell, before);
    }

    #[test]
    fn test_resistance_rises_when_cold_and_aged() {
        let cell = fresh_cell(0.5);
        let warm = cell.resistance(25.0, 1.0);
        assert!(cell.resistance(0.0, 1.0) > warm);
        assert_relative_eq!(cell.resistance(40.0, 1.0), warm);

        let mut prev = warm;
        for i in 1..=10 {
            let soh = 1.0 - i as f64 / 10.0;
            let r = cell.resistance(25.0, soh);
            assert!(r >= prev);
            prev = r;
        }
    }

    #[test]
    fn test_joule_heating_and_relaxation() {
        let mut cell = fresh_cell(0.9);
        for _ in 0..100 {
            cell.step(20.0, 25.0, 1.0).unwrap();
        }
        let hot = cell.state().temperature;
        assert!(hot > 25.0);

        for _ in 0..1000 {
            cell.step(0.0, 25.0, 10.0).unwrap();
        }
        let cooled = cell.state().temperature;
        assert!(cooled < hot && cooled > 25.0);
    }

    #[test]
    fn test_equivalent_cycle_fade() {
        let mut cell = fresh_cell(1.0);
        // 3.2 A for just over an hour moves one rated capacity
        for _ in 0..61 {
            cell.step(3.2, 20.0, 60.0).unwrap();
        }
        let state = cell.state();
        assert_eq!(state.equivalent_cycles, 1);
        assert!(state.temperature < cell.constants.high_temperature_threshold_c);
        assert_relative_eq!(state.soh, 1.0 - cell.constants.cycle_fade, epsilon = 1e-9);
    }

    #[test]
    fn test_high_temperature_fade() {
        let mut cell = fresh_cell(0.5);
        cell.step(0.0, 45.0, 1.0).unwrap();
        assert_eq!(cell.state().soh, 1.0);

        let mut hot = Cell::new(
            CellPosition::default(),
            CellConstants::default(),
            ManufacturingVariance::default(),
            0.5,
            45.0,
        );
        hot.step(0.0, 45.0, 3600.0).unwrap();
        assert_relative_eq!(hot.state().soh, 1.0 - 0.001, epsilon = 1e-12);
    }

    #[test]
    fn test_bounds_hold_under_sustained_forcing() {
        let mut cell = fresh_cell(0.5);
        let mut prev_soh = cell.state().soh;
        for i in 0..2000 {
            let current = if (i / 200) % 2 == 0 { 20.0 } else { -20.0 };
            let state = cell.step(current, 30.0, 30.0).unwrap();
            assert!((0.0..=1.0).contains(&state.soc));
            assert!((0.0..=1.0).contains(&state.soh));
            assert!(state.soh <= prev_soh);
            prev_soh = state.soh;
        }
        assert!(prev_soh < 1.0);
    }

    #[test]
    fn test_constants_validation() {
        assert!(CellConstants::default().validate().is_ok());
        assert_eq!(
            CellConstants::default().with_capacity(0.0).validate(),
            Err(ConfigurationError::NotPositive("rated_capacity_ah"))
        );
        let mut c = CellConstants::default();
        c.end_of_life_capacity = 1.5;
        assert!(c.validate().is_err());
    }
}
