//! Series-parallel pack aggregation
//!
//! The pack owns an S×P grid of cells: row = position within a series string,
//! column = parallel string. It splits the commanded current across strings,
//! steps every cell, and reports pack-level figures. It makes no safety
//! judgments; that is the controller's job.

use log::trace;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use simcore::{ConfigurationError, ModelError, SocBoundary};

use crate::cell::{Cell, CellConstants, CellPosition, CellState};
use crate::split::{CurrentSplit, SplitPolicy};
use crate::variance::{VarianceConfig, sample_variance};

/// Topology and nominal parameters of a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Cells in series per string
    pub series: usize,
    /// Parallel strings
    pub parallel: usize,
    pub cell: CellConstants,
    pub variance: VarianceConfig,
    /// Seed for manufacturing spread
    pub seed: u64,
    pub split_policy: SplitPolicy,
    pub initial_soc: f64,
    /// Initial cell temperature (°C)
    pub initial_temperature_c: f64,
}

impl Default for PackConfig {
    fn default() -> Self {
        PackConfig {
            series: 12,
            parallel: 4,
            cell: CellConstants::default(),
            variance: VarianceConfig::default(),
            seed: 42,
            split_policy: SplitPolicy::Equal,
            initial_soc: 0.8,
            initial_temperature_c: 25.0,
        }
    }
}

impl PackConfig {
    pub fn new(series: usize, parallel: usize) -> Self {
        PackConfig {
            series,
            parallel,
            ..Default::default()
        }
    }

    pub fn with_cell(mut self, cell: CellConstants) -> Self {
        self.cell = cell;
        self
    }

    pub fn with_variance(mut self, variance: VarianceConfig) -> Self {
        self.variance = variance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_split_policy(mut self, split_policy: SplitPolicy) -> Self {
        self.split_policy = split_policy;
        self
    }

    pub fn with_initial_soc(mut self, initial_soc: f64) -> Self {
        self.initial_soc = initial_soc;
        self
    }

    pub fn with_initial_temperature(mut self, initial_temperature_c: f64) -> Self {
        self.initial_temperature_c = initial_temperature_c;
        self
    }

    pub fn cell_count(&self) -> usize {
        self.series * self.parallel
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.series == 0 || self.parallel == 0 {
            return Err(ConfigurationError::EmptyTopology {
                series: self.series,
                parallel: self.parallel,
            });
        }
        if !(0.0..=1.0).contains(&self.initial_soc) {
            return Err(ConfigurationError::OutOfRange {
                name: "initial_soc",
                value: self.initial_soc,
                min: 0.0,
                max: 1.0,
            });
        }
        if !self.initial_temperature_c.is_finite() {
            return Err(ConfigurationError::Inconsistent(
                "initial_temperature_c must be finite".to_string(),
            ));
        }
        self.cell.validate()?;
        self.variance.validate()
    }
}

/// Per-cell bleed currents requested by the balancing logic.
///
/// Bleed is dissipated in the balancing resistor: it drains the cell but is
/// not part of the pack current.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalancingCommand {
    bleed: Vec<f64>,
}

impl BalancingCommand {
    pub fn none() -> Self {
        BalancingCommand::default()
    }

    /// Request `current` amps of bleed on the cell at `index`. Negative
    /// requests are ignored; passive balancing can only discharge.
    pub fn bleed(&mut self, index: usize, current: f64) {
        if !(current.is_finite() && current > 0.0) {
            return;
        }
        if self.bleed.len() <= index {
            self.bleed.resize(index + 1, 0.0);
        }
        self.bleed[index] = current;
    }

    pub fn current_for(&self, index: usize) -> f64 {
        self.bleed.get(index).copied().unwrap_or(0.0)
    }

    /// Indices of the cells being bled.
    pub fn cells(&self) -> Vec<usize> {
        self.bleed
            .iter()
            .enumerate()
            .filter(|(_, current)| **current > 0.0)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bleed.iter().all(|current| *current <= 0.0)
    }
}

/// Pack current magnitudes the cells can take (A).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentLimits {
    pub discharge: f64,
    pub charge: f64,
}

impl CurrentLimits {
    /// Clamp a signed pack current (positive = discharge) into the limits.
    pub fn clamp(&self, current: f64) -> f64 {
        current.clamp(-self.charge, self.discharge)
    }
}

const LIMIT_MARGIN: f64 = 1e-9;

/// Pack-level view of one tick, including every cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackSnapshot {
    pub series: usize,
    pub parallel: usize,
    /// Voltage of the representative string (string 0) (V)
    pub pack_voltage: f64,
    /// Commanded pack current, bleed excluded (A, positive = discharge)
    pub pack_current: f64,
    pub string_currents: Vec<f64>,
    pub string_voltages: Vec<f64>,
    pub mean_soc: f64,
    pub mean_soh: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub mean_temperature: f64,
    pub min_cell_voltage: f64,
    pub max_cell_voltage: f64,
    /// Max minus min cell voltage (V)
    pub imbalance: f64,
    /// Any cell pushed against a SoC boundary this tick
    pub saturated: bool,
    /// Every cell, row-major by (series position, string)
    pub cells: Vec<Cell>,
}

impl PackSnapshot {
    pub fn cell_states(&self) -> impl Iterator<Item = &CellState> {
        self.cells.iter().map(Cell::state)
    }

    pub fn saturated_cells(&self) -> impl Iterator<Item = (usize, SocBoundary)> + '_ {
        self.cells
            .iter()
            .filter_map(|cell| cell.state().saturation.map(|boundary| (cell.index(), boundary)))
    }
}

#[derive(Debug, Clone)]
pub struct Pack {
    grid: Array2<Cell>,
    split_policy: SplitPolicy,
    split: Box<dyn CurrentSplit>,
    pack_current: f64,
    string_currents: Vec<f64>,
}

impl Pack {
    /// Build a pack of fresh cells with seeded manufacturing spread.
    pub fn new(config: &PackConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let offsets = sample_variance(&config.variance, config.seed, config.cell_count())?;
        let cells = offsets
            .into_iter()
            .enumerate()
            .map(|(index, variance)| {
                Cell::new(
                    position_of(index, config.parallel),
                    config.cell.clone(),
                    variance,
                    config.initial_soc,
                    config.initial_temperature_c,
                )
            })
            .collect();
        Self::from_cells(config, cells)
    }

    /// Build a pack from explicit cells, row-major by (series position,
    /// string). Cell positions are renumbered to match.
    pub fn from_cells(config: &PackConfig, mut cells: Vec<Cell>) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let expected = config.cell_count();
        if cells.len() != expected {
            return Err(ConfigurationError::CellCount {
                series: config.series,
                parallel: config.parallel,
                expected,
                actual: cells.len(),
            });
        }
        for (index, cell) in cells.iter_mut().enumerate() {
            cell.position = position_of(index, config.parallel);
            cell.validate()?;
        }

        let grid = Array2::from_shape_vec((config.series, config.parallel), cells)
            .map_err(|e| ConfigurationError::Inconsistent(e.to_string()))?;

        Ok(Pack {
            grid,
            split_policy: config.split_policy,
            split: config.split_policy.strategy(),
            pack_current: 0.0,
            string_currents: vec![0.0; config.parallel],
        })
    }

    /// Rebuild a pack from a snapshot taken with the same topology.
    pub fn restore(config: &PackConfig, snapshot: &PackSnapshot) -> Result<Self, ConfigurationError> {
        if snapshot.series != config.series || snapshot.parallel != config.parallel {
            return Err(ConfigurationError::Inconsistent(format!(
                "snapshot topology {}S{}P does not match configured {}S{}P",
                snapshot.series, snapshot.parallel, config.series, config.parallel
            )));
        }
        let mut pack = Self::from_cells(config, snapshot.cells.clone())?;
        pack.pack_current = snapshot.pack_current;
        if snapshot.string_currents.len() == config.parallel {
            pack.string_currents = snapshot.string_currents.clone();
        }
        Ok(pack)
    }

    pub fn series(&self) -> usize {
        self.grid.nrows()
    }

    pub fn parallel(&self) -> usize {
        self.grid.ncols()
    }

    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    pub fn split_policy(&self) -> SplitPolicy {
        self.split_policy
    }

    pub fn cell(&self, series: usize, string: usize) -> Option<&Cell> {
        self.grid.get((series, string))
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.iter()
    }

    /// Net ohmic resistance of each parallel string (Ω).
    pub fn string_resistances(&self) -> Vec<f64> {
        self.grid
            .columns()
            .into_iter()
            .map(|string| string.iter().map(|cell| cell.state().internal_resistance).sum())
            .collect()
    }

    /// Largest pack current magnitudes, discharge and charge, that keep every
    /// cell inside its hard ceiling under the present split with `balancing`
    /// applied.
    pub fn current_limits(&self, balancing: &BalancingCommand) -> CurrentLimits {
        let weights = self.split.split(1.0, &self.string_resistances());
        let mut limits = CurrentLimits {
            discharge: f64::INFINITY,
            charge: f64::INFINITY,
        };
        for ((_, string), cell) in self.grid.indexed_iter() {
            let weight = weights[string];
            if !(weight.is_finite() && weight > 0.0) {
                continue;
            }
            let ceiling = cell.constants.max_abs_current_a;
            let bleed = balancing.current_for(cell.index());
            limits.discharge = limits.discharge.min((ceiling - bleed).max(0.0) / weight);
            // Bleed only pulls a charging cell back toward zero
            limits.charge = limits.charge.min(ceiling / weight);
        }
        // Stay clear of rounding at the ceiling itself
        limits.discharge *= 1.0 - LIMIT_MARGIN;
        limits.charge *= 1.0 - LIMIT_MARGIN;
        limits
    }

    /// Step every cell under `current` with no balancing.
    pub fn apply(&mut self, current: f64, ambient_temperature: f64, dt: f64) -> Result<PackSnapshot, ModelError> {
        self.apply_balanced(current, &BalancingCommand::none(), ambient_temperature, dt)
    }

    /// Step every cell under `current`, with bleed added on balanced cells.
    ///
    /// All cell inputs are checked before any cell moves, so an error leaves
    /// the pack exactly as it was.
    pub fn apply_balanced(
        &mut self,
        current: f64,
        balancing: &BalancingCommand,
        ambient_temperature: f64,
        dt: f64,
    ) -> Result<PackSnapshot, ModelError> {
        if !current.is_finite() {
            return Err(ModelError::NonFinite {
                quantity: "pack current",
                value: current,
            });
        }
        let shares = self.split.split(current, &self.string_resistances());

        for ((_, string), cell) in self.grid.indexed_iter() {
            let cell_current = shares[string] + balancing.current_for(cell.index());
            cell.check_step(cell_current, ambient_temperature, dt)?;
        }
        for ((_, string), cell) in self.grid.indexed_iter_mut() {
            let cell_current = shares[string] + balancing.current_for(cell.index());
            cell.step(cell_current, ambient_temperature, dt)?;
        }

        self.pack_current = current;
        self.string_currents = shares;

        let snapshot = self.measure();
        trace!(
            "pack {:.3} V {:.3} A soc {:.4} imbalance {:.4} V",
            snapshot.pack_voltage, snapshot.pack_current, snapshot.mean_soc, snapshot.imbalance
        );
        Ok(snapshot)
    }

    /// Snapshot of the present state without stepping.
    pub fn measure(&self) -> PackSnapshot {
        let n = self.grid.len() as f64;
        let string_voltages: Vec<f64> = self
            .grid
            .columns()
            .into_iter()
            .map(|string| string.iter().map(|cell| cell.state().voltage).sum())
            .collect();

        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        let mut min_t = f64::INFINITY;
        let mut max_t = f64::NEG_INFINITY;
        let mut soc_sum = 0.0;
        let mut soh_sum = 0.0;
        let mut temp_sum = 0.0;
        let mut saturated = false;
        for cell in self.grid.iter() {
            let s = cell.state();
            min_v = min_v.min(s.voltage);
            max_v = max_v.max(s.voltage);
            min_t = min_t.min(s.temperature);
            max_t = max_t.max(s.temperature);
            soc_sum += s.soc;
            soh_sum += s.soh;
            temp_sum += s.temperature;
            saturated |= s.saturation.is_some();
        }

        PackSnapshot {
            series: self.series(),
            parallel: self.parallel(),
            pack_voltage: string_voltages[0],
            pack_current: self.pack_current,
            string_currents: self.string_currents.clone(),
            string_voltages,
            mean_soc: soc_sum / n,
            mean_soh: soh_sum / n,
            min_temperature: min_t,
            max_temperature: max_t,
            mean_temperature: temp_sum / n,
            min_cell_voltage: min_v,
            max_cell_voltage: max_v,
            imbalance: max_v - min_v,
            saturated,
            cells: self.grid.iter().cloned().collect(),
        }
    }
}

fn position_of(index: usize, parallel: usize) -> CellPosition {
    CellPosition {
        index,
        series: index / parallel,
        string: index % parallel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ManufacturingVariance;
    use approx::assert_relative_eq;

    fn matched_config(series: usize, parallel: usize) -> PackConfig {
        PackConfig::new(series, parallel)
            .with_variance(VarianceConfig::none())
            .with_initial_soc(0.5)
    }

    fn weak_pair(capacity_scale: f64) -> (PackConfig, Pack) {
        let config = matched_config(1, 2);
        let mut weak = ManufacturingVariance::default();
        weak.capacity_scale = capacity_scale;
        let cells = vec![
            Cell::new(CellPosition::default(), config.cell.clone(), ManufacturingVariance::default(), 0.5, 25.0),
            Cell::new(CellPosition::default(), config.cell.clone(), weak, 0.5, 25.0),
        ];
        let pack = Pack::from_cells(&config, cells).unwrap();
        (config, pack)
    }

    #[test]
    fn test_grid_layout() {
        let pack = Pack::new(&PackConfig::new(4, 3)).unwrap();
        assert_eq!(pack.series(), 4);
        assert_eq!(pack.parallel(), 3);
        assert_eq!(pack.cell_count(), 12);

        let cell = pack.cell(2, 1).unwrap();
        assert_eq!(cell.position, CellPosition { index: 7, series: 2, string: 1 });
        assert!(pack.cell(4, 0).is_none());
    }

    #[test]
    fn test_rejects_bad_topology() {
        assert!(matches!(
            Pack::new(&PackConfig::new(0, 2)),
            Err(ConfigurationError::EmptyTopology { .. })
        ));

        let config = matched_config(2, 2);
        let cells = vec![Cell::new(
            CellPosition::default(),
            config.cell.clone(),
            ManufacturingVariance::default(),
            0.5,
            25.0,
        )];
        assert!(matches!(
            Pack::from_cells(&config, cells),
            Err(ConfigurationError::CellCount { expected: 4, actual: 1, .. })
        ));
    }

    #[test]
    fn test_same_seed_same_pack() {
        let config = PackConfig::new(6, 2).with_seed(11);
        let a = Pack::new(&config).unwrap().measure();
        let b = Pack::new(&config).unwrap().measure();
        assert_eq!(a, b);

        let c = Pack::new(&config.clone().with_seed(12)).unwrap().measure();
        assert_ne!(a.cells, c.cells);
    }

    #[test]
    fn test_pack_voltage_is_representative_string_sum() {
        let config = PackConfig::new(4, 2).with_seed(3);
        let mut pack = Pack::new(&config).unwrap();
        for i in 0..200 {
            let current = if i < 100 { 8.0 } else { -6.0 };
            let snap = pack.apply(current, 25.0, 5.0).unwrap();
            let string_sum: f64 = snap
                .cells
                .iter()
                .filter(|cell| cell.position.string == 0)
                .map(|cell| cell.state().voltage)
                .sum();
            assert_relative_eq!(snap.pack_voltage, string_sum, epsilon = 1e-12);
            assert_eq!(snap.string_voltages.len(), 2);

            let mean: f64 = snap.cell_states().map(|s| s.soc).sum::<f64>() / 8.0;
            assert_relative_eq!(snap.mean_soc, mean, epsilon = 1e-12);
            assert_relative_eq!(snap.imbalance, snap.max_cell_voltage - snap.min_cell_voltage);
        }
    }

    #[test]
    fn test_series_cells_share_string_current() {
        let config = PackConfig::new(3, 2).with_seed(5).with_split_policy(SplitPolicy::ConductanceWeighted);
        let mut pack = Pack::new(&config).unwrap();
        let snap = pack.apply(10.0, 25.0, 1.0).unwrap();
        for cell in &snap.cells {
            assert_eq!(cell.state().current, snap.string_currents[cell.position.string]);
        }
        assert_relative_eq!(snap.string_currents.iter().sum::<f64>(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_equal_split_ignores_resistance_spread() {
        let config = PackConfig::new(2, 4).with_seed(9);
        let mut pack = Pack::new(&config).unwrap();
        let snap = pack.apply(-8.0, 25.0, 1.0).unwrap();
        assert!(snap.string_currents.iter().all(|i| *i == -2.0));
    }

    #[test]
    fn test_conductance_split_loads_stiffer_string() {
        let config = matched_config(1, 2).with_split_policy(SplitPolicy::ConductanceWeighted);
        let mut lossy = ManufacturingVariance::default();
        lossy.resistance_scale = 1.25;
        let cells = vec![
            Cell::new(CellPosition::default(), config.cell.clone(), ManufacturingVariance::default(), 0.5, 25.0),
            Cell::new(CellPosition::default(), config.cell.clone(), lossy, 0.5, 25.0),
        ];
        let mut pack = Pack::from_cells(&config, cells).unwrap();
        let snap = pack.apply(9.0, 25.0, 1.0).unwrap();
        assert_relative_eq!(snap.string_currents[0], 5.0, epsilon = 1e-9);
        assert_relative_eq!(snap.string_currents[1], 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_weak_cell_diverges_under_equal_split() {
        let (_, mut pack) = weak_pair(0.9);
        let mut prev_imbalance = pack.measure().imbalance;
        let mut prev_gap = 0.0;
        for tick in 0..100 {
            let snap = pack.apply(6.4, 25.0, 1.0).unwrap();
            let gap = snap.cells[0].state().soc - snap.cells[1].state().soc;
            assert!(gap > prev_gap, "SoC gap shrank at tick {}", tick);
            assert!(
                snap.imbalance > prev_imbalance,
                "imbalance {} did not grow past {} at tick {}",
                snap.imbalance,
                prev_imbalance,
                tick
            );
            prev_gap = gap;
            prev_imbalance = snap.imbalance;
        }
    }

    #[test]
    fn test_failed_apply_leaves_pack_untouched() {
        let config = PackConfig::new(2, 2).with_seed(1);
        let mut pack = Pack::new(&config).unwrap();
        pack.apply(4.0, 25.0, 1.0).unwrap();
        let before = pack.measure();

        // 120 A over two strings is 60 A per cell, past the 50 A ceiling
        assert!(matches!(
            pack.apply(120.0, 25.0, 1.0),
            Err(ModelError::CurrentCeiling { .. })
        ));
        assert!(matches!(pack.apply(1.0, 25.0, 0.0), Err(ModelError::InvalidTimestep(_))));
        assert_eq!(pack.measure(), before);
    }

    #[test]
    fn test_current_limits_follow_split_and_bleed() {
        let cell = CellConstants::default().with_max_current(10.0);
        let config = matched_config(1, 2)
            .with_cell(cell.clone())
            .with_split_policy(SplitPolicy::ConductanceWeighted);
        let mut stiff = ManufacturingVariance::default();
        stiff.resistance_scale = 0.5;
        let cells = vec![
            Cell::new(CellPosition::default(), cell.clone(), stiff, 0.5, 25.0),
            Cell::new(CellPosition::default(), cell, ManufacturingVariance::default(), 0.5, 25.0),
        ];
        let mut pack = Pack::from_cells(&config, cells).unwrap();

        // The stiff string takes two thirds of the current
        let limits = pack.current_limits(&BalancingCommand::none());
        assert_relative_eq!(limits.discharge, 15.0, epsilon = 1e-6);
        assert_relative_eq!(limits.charge, 15.0, epsilon = 1e-6);
        assert!(pack.apply(limits.discharge, 25.0, 1.0).is_ok());
        assert!(pack.apply(-limits.charge, 25.0, 1.0).is_ok());
        assert!(pack.apply(15.1, 25.0, 1.0).is_err());

        let mut balancing = BalancingCommand::none();
        balancing.bleed(0, 1.0);
        let bled = pack.current_limits(&balancing);
        assert_relative_eq!(bled.discharge, 13.5, epsilon = 1e-6);
        assert_eq!(bled.charge, limits.charge);
        assert!(pack.apply_balanced(bled.discharge, &balancing, 25.0, 1.0).is_ok());

        assert_eq!(bled.clamp(100.0), bled.discharge);
        assert_eq!(bled.clamp(-100.0), -bled.charge);
        assert_eq!(bled.clamp(3.0), 3.0);
    }

    #[test]
    fn test_rest_at_ambient_is_fixed_point() {
        let config = PackConfig::new(3, 2).with_seed(21).with_initial_temperature(22.0);
        let mut pack = Pack::new(&config).unwrap();
        let before = pack.measure();
        let after = pack.apply(0.0, 22.0, 30.0).unwrap();
        for (a, b) in before.cell_states().zip(after.cell_states()) {
            assert_eq!(a.soc, b.soc);
            assert_eq!(a.temperature, b.temperature);
            assert_eq!(a.voltage, b.voltage);
        }
        assert_eq!(before.pack_voltage, after.pack_voltage);
    }

    #[test]
    fn test_bleed_drains_only_balanced_cells() {
        let config = matched_config(1, 2);
        let mut pack = Pack::new(&config).unwrap();
        let mut balancing = BalancingCommand::none();
        balancing.bleed(1, 0.5);
        balancing.bleed(0, -1.0);
        assert_eq!(balancing.cells(), vec![1]);

        let snap = pack.apply_balanced(0.0, &balancing, 25.0, 60.0).unwrap();
        assert_eq!(snap.pack_current, 0.0);
        assert_eq!(snap.cells[0].state().soc, 0.5);
        assert!(snap.cells[1].state().soc < 0.5);
    }

    #[test]
    fn test_snapshot_round_trip_reproduces_next_tick() {
        let config = PackConfig::new(4, 2).with_seed(77);
        let mut pack = Pack::new(&config).unwrap();
        for _ in 0..30 {
            pack.apply(7.5, 28.0, 10.0).unwrap();
        }

        let json = serde_json::to_string(&pack.measure()).unwrap();
        let snapshot: PackSnapshot = serde_json::from_str(&json).unwrap();
        let mut restored = Pack::restore(&config, &snapshot).unwrap();
        assert_eq!(restored.measure(), pack.measure());

        let original_next = pack.apply(-3.0, 20.0, 10.0).unwrap();
        let restored_next = restored.apply(-3.0, 20.0, 10.0).unwrap();
        assert_eq!(original_next, restored_next);
    }

    #[test]
    fn test_restore_rejects_other_topology() {
        let snapshot = Pack::new(&PackConfig::new(2, 2)).unwrap().measure();
        assert!(Pack::restore(&PackConfig::new(4, 1), &snapshot).is_err());
    }

    #[test]
    fn test_saturation_reported_on_snapshot() {
        let config = matched_config(1, 1).with_initial_soc(1.0);
        let mut pack = Pack::new(&config).unwrap();
        let snap = pack.apply(-2.0, 25.0, 10.0).unwrap();
        assert!(snap.saturated);
        assert_eq!(snap.saturated_cells().collect::<Vec<_>>(), vec![(0, SocBoundary::Full)]);

        let snap = pack.apply(2.0, 25.0, 10.0).unwrap();
        assert!(!snap.saturated);
    }
}
