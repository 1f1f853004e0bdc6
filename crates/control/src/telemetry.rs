//! Per-tick telemetry
//!
//! The controller hands every tick record to a sink. Sinks decide what to keep;
//! the controller never does I/O itself.

use electrical::PackSnapshot;
use log::info;
use serde::{Deserialize, Serialize};

use crate::bms::OperatingState;
use crate::fault::FaultRecord;
use crate::summary::RunSummary;

/// Everything observable about one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    /// Simulated time at the start of the tick (s)
    pub time_s: f64,
    /// State after this tick's evaluation
    pub state: OperatingState,
    /// Current the pack was driven with this tick (A)
    pub applied_current: f64,
    /// Current commanded for the next tick (A)
    pub next_current: f64,
    pub new_faults: Vec<FaultRecord>,
    /// Cells bled during this tick
    pub balanced_cells: Vec<usize>,
    #[serde(flatten)]
    pub snapshot: PackSnapshot,
}

pub trait TelemetrySink {
    fn record(&mut self, record: &TickRecord);

    /// Called once when a run ends.
    fn finish(&mut self, _summary: &RunSummary) {}
}

/// Collect every record in memory.
impl TelemetrySink for Vec<TickRecord> {
    fn record(&mut self, record: &TickRecord) {
        self.push(record.clone());
    }
}

/// Discard everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&mut self, _record: &TickRecord) {}
}

/// Periodic status line through the `log` facade.
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    every: u64,
}

impl LogSink {
    /// Log every `every`-th tick (at least every tick).
    pub fn new(every: u64) -> Self {
        Self { every: every.max(1) }
    }

    /// Roughly one line per simulated hour at step `dt_s`.
    pub fn hourly(dt_s: f64) -> Self {
        Self::new((3600.0 / dt_s).round() as u64)
    }
}

impl TelemetrySink for LogSink {
    fn record(&mut self, record: &TickRecord) {
        if record.tick % self.every != 0 {
            return;
        }
        let snap = &record.snapshot;
        info!(
            "t={:>6.1} h {:>8} soc {:>5.1}% {:>7.2} V {:>7.2} A temp {:>5.1} °C (max {:>5.1}) spread {:.3} V",
            record.time_s / 3600.0,
            record.state,
            snap.mean_soc * 100.0,
            snap.pack_voltage,
            record.applied_current,
            snap.mean_temperature,
            snap.max_temperature,
            snap.imbalance,
        );
        if !record.balanced_cells.is_empty() {
            info!("  balancing cells {:?}", record.balanced_cells);
        }
    }

    fn finish(&mut self, summary: &RunSummary) {
        info!(
            "run finished after {} ticks in {}: {} warning and {} critical records, mean SoH {:.4}",
            summary.ticks,
            summary.final_state,
            summary.warning_records,
            summary.critical_records,
            summary.soh.mean
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use electrical::{Pack, PackConfig};

    fn record(tick: u64) -> TickRecord {
        TickRecord {
            tick,
            time_s: tick as f64 * 60.0,
            state: OperatingState::Normal,
            applied_current: 0.0,
            next_current: 0.0,
            new_faults: Vec::new(),
            balanced_cells: Vec::new(),
            snapshot: Pack::new(&PackConfig::new(2, 2)).unwrap().measure(),
        }
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<TickRecord> = Vec::new();
        for tick in 0..3 {
            sink.record(&record(tick));
        }
        assert_eq!(sink.len(), 3);
        assert_eq!(sink[2].tick, 2);
    }

    #[test]
    fn test_record_json_is_flat() {
        let json = serde_json::to_value(record(4)).unwrap();
        assert_eq!(json["tick"], 4);
        assert_eq!(json["state"], "normal");
        // Snapshot fields sit beside the tick fields
        assert!(json.get("pack_voltage").is_some());
        assert!(json.get("snapshot").is_none());
        assert_eq!(json["cells"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn test_hourly_interval() {
        assert_eq!(LogSink::hourly(60.0).every, 60);
        assert_eq!(LogSink::hourly(7200.0).every, 1);
    }
}
