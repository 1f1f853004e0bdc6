use std::fmt;

use serde::{Deserialize, Serialize};

use crate::thresholds::{Metric, Severity, Violation};

/// A threshold violation observed at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultRecord {
    pub tick: u64,
    pub severity: Severity,
    pub metric: Metric,
    /// Measured value
    pub value: f64,
    /// Level that was crossed
    pub threshold: f64,
}

impl FaultRecord {
    pub fn from_violation(tick: u64, violation: &Violation) -> Self {
        FaultRecord {
            tick,
            severity: violation.severity,
            metric: violation.metric,
            value: violation.value,
            threshold: violation.threshold,
        }
    }
}

impl fmt::Display for FaultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {}: {} {} = {:.4} past {:.4}",
            self.tick, self.severity, self.metric, self.value, self.threshold
        )
    }
}

/// Append-only history of fault records in tick order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaultLog {
    records: Vec<FaultRecord>,
}

impl FaultLog {
    pub fn new() -> Self {
        FaultLog::default()
    }

    pub(crate) fn append(&mut self, record: FaultRecord) {
        debug_assert!(self.records.last().is_none_or(|last| last.tick <= record.tick));
        self.records.push(record);
    }

    pub fn records(&self) -> &[FaultRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &FaultRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&FaultRecord> {
        self.records.last()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.records.iter().filter(|r| r.severity == severity).count()
    }

    /// Records from `tick` onwards.
    pub fn since(&self, tick: u64) -> &[FaultRecord] {
        let start = self.records.partition_point(|r| r.tick < tick);
        &self.records[start..]
    }

    /// First tick that produced a critical record.
    pub fn first_critical(&self) -> Option<u64> {
        self.records
            .iter()
            .find(|r| r.severity == Severity::Critical)
            .map(|r| r.tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tick: u64, severity: Severity, metric: Metric) -> FaultRecord {
        FaultRecord {
            tick,
            severity,
            metric,
            value: 1.0,
            threshold: 0.5,
        }
    }

    #[test]
    fn test_log_keeps_order_and_counts() {
        let mut log = FaultLog::new();
        assert!(log.is_empty());
        log.append(record(3, Severity::Warning, Metric::TempMax));
        log.append(record(3, Severity::Warning, Metric::ImbalanceMax));
        log.append(record(7, Severity::Critical, Metric::VoltageMax));
        log.append(record(9, Severity::Warning, Metric::TempMax));

        assert_eq!(log.len(), 4);
        assert_eq!(log.count(Severity::Warning), 3);
        assert_eq!(log.count(Severity::Critical), 1);
        assert_eq!(log.first_critical(), Some(7));
        assert_eq!(log.since(4).len(), 2);
        assert_eq!(log.since(3).len(), 4);
        assert!(log.since(10).is_empty());
        assert_eq!(log.last().map(|r| r.tick), Some(9));
    }

    #[test]
    fn test_record_display() {
        let r = record(12, Severity::Critical, Metric::VoltageMax);
        assert_eq!(r.to_string(), "tick 12: critical voltage_max = 1.0000 past 0.5000");
    }
}
