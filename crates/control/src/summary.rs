//! Run statistics and the end-of-run summary

use electrical::PackSnapshot;
use serde::{Deserialize, Serialize};

use crate::bms::OperatingState;
use crate::fault::{FaultLog, FaultRecord};
use crate::thresholds::Severity;

/// Running totals accumulated tick by tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    ticks: u64,
    elapsed_s: f64,
    soc_sum: f64,
    max_temperature_sum: f64,
    imbalance_sum: f64,
    peak_temperature: Option<f64>,
    peak_imbalance: f64,
    saturated_ticks: u64,
    warning_ticks: u64,
    critical_ticks: u64,
}

impl RunStatistics {
    pub fn observe(&mut self, snapshot: &PackSnapshot, state: OperatingState, dt: f64) {
        self.ticks += 1;
        self.elapsed_s += dt;
        self.soc_sum += snapshot.mean_soc;
        self.max_temperature_sum += snapshot.max_temperature;
        self.imbalance_sum += snapshot.imbalance;
        self.peak_temperature = Some(
            self.peak_temperature
                .map_or(snapshot.max_temperature, |peak| peak.max(snapshot.max_temperature)),
        );
        self.peak_imbalance = self.peak_imbalance.max(snapshot.imbalance);
        if snapshot.saturated {
            self.saturated_ticks += 1;
        }
        match state {
            OperatingState::Normal => {}
            OperatingState::Warning => self.warning_ticks += 1,
            OperatingState::Critical => self.critical_ticks += 1,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    fn average(&self, sum: f64) -> f64 {
        if self.ticks == 0 { 0.0 } else { sum / self.ticks as f64 }
    }

    pub fn average_soc(&self) -> f64 {
        self.average(self.soc_sum)
    }

    pub fn average_max_temperature(&self) -> f64 {
        self.average(self.max_temperature_sum)
    }

    pub fn average_imbalance(&self) -> f64 {
        self.average(self.imbalance_sum)
    }
}

/// SoH across the pack at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SohDistribution {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    /// Row-major by (series position, string)
    pub per_cell: Vec<f64>,
}

impl SohDistribution {
    pub fn from_snapshot(snapshot: &PackSnapshot) -> Self {
        let per_cell: Vec<f64> = snapshot.cell_states().map(|s| s.soh).collect();
        let min = per_cell.iter().copied().fold(f64::INFINITY, f64::min);
        let max = per_cell.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        SohDistribution {
            min,
            mean: snapshot.mean_soh,
            max,
            per_cell,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed_s: f64,
    pub final_state: OperatingState,
    pub final_soc: f64,
    pub warning_records: usize,
    pub critical_records: usize,
    /// Ticks that ended in Warning
    pub warning_ticks: u64,
    /// Ticks that ended in Critical
    pub critical_ticks: u64,
    pub saturated_ticks: u64,
    pub average_soc: f64,
    pub average_max_temperature_c: f64,
    pub average_imbalance_v: f64,
    pub peak_temperature_c: f64,
    pub peak_imbalance_v: f64,
    pub soh: SohDistribution,
    pub faults: Vec<FaultRecord>,
}

impl RunSummary {
    pub fn new(
        statistics: &RunStatistics,
        faults: &FaultLog,
        final_state: OperatingState,
        last: &PackSnapshot,
    ) -> Self {
        RunSummary {
            ticks: statistics.ticks,
            elapsed_s: statistics.elapsed_s,
            final_state,
            final_soc: last.mean_soc,
            warning_records: faults.count(Severity::Warning),
            critical_records: faults.count(Severity::Critical),
            warning_ticks: statistics.warning_ticks,
            critical_ticks: statistics.critical_ticks,
            saturated_ticks: statistics.saturated_ticks,
            average_soc: statistics.average_soc(),
            average_max_temperature_c: statistics.average_max_temperature(),
            average_imbalance_v: statistics.average_imbalance(),
            peak_temperature_c: statistics.peak_temperature.unwrap_or(last.max_temperature),
            peak_imbalance_v: statistics.peak_imbalance,
            soh: SohDistribution::from_snapshot(last),
            faults: faults.records().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use electrical::{Pack, PackConfig};

    #[test]
    fn test_statistics_average_and_peak() {
        let mut pack = Pack::new(&PackConfig::new(2, 2).with_seed(4)).unwrap();
        let mut stats = RunStatistics::default();
        let mut socs = Vec::new();
        let mut peak_t: f64 = f64::NEG_INFINITY;
        for i in 0..10 {
            let snap = pack.apply(8.0, 25.0, 30.0).unwrap();
            socs.push(snap.mean_soc);
            peak_t = peak_t.max(snap.max_temperature);
            let state = if i < 7 { OperatingState::Normal } else { OperatingState::Warning };
            stats.observe(&snap, state, 30.0);
        }
        assert_eq!(stats.ticks(), 10);
        assert_relative_eq!(stats.elapsed_s(), 300.0);
        assert_relative_eq!(stats.average_soc(), socs.iter().sum::<f64>() / 10.0, epsilon = 1e-12);

        let summary = RunSummary::new(&stats, &FaultLog::new(), OperatingState::Warning, &pack.measure());
        assert_eq!(summary.warning_ticks, 3);
        assert_eq!(summary.critical_ticks, 0);
        assert_eq!(summary.peak_temperature_c, peak_t);
        assert_eq!(summary.soh.per_cell.len(), 4);
        assert!(summary.soh.min <= summary.soh.mean && summary.soh.mean <= summary.soh.max);
    }

    #[test]
    fn test_empty_run_summary() {
        let pack = Pack::new(&PackConfig::new(1, 1)).unwrap();
        let summary = RunSummary::new(
            &RunStatistics::default(),
            &FaultLog::new(),
            OperatingState::Normal,
            &pack.measure(),
        );
        assert_eq!(summary.ticks, 0);
        assert_eq!(summary.average_soc, 0.0);
        assert_eq!(summary.soh.per_cell, vec![1.0]);
        assert_eq!(summary.peak_temperature_c, 25.0);
    }
}
