use thiserror::Error;

/// Invalid physical input to a model step. Always fatal to the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("time step must be positive and finite, got {0} s")]
    InvalidTimestep(f64),
    #[error("cell {cell}: current {current:.3} A exceeds the {ceiling:.3} A hard ceiling")]
    CurrentCeiling {
        cell: usize,
        current: f64,
        ceiling: f64,
    },
    #[error("non-finite {quantity}: {value}")]
    NonFinite { quantity: &'static str, value: f64 },
}

/// Malformed or internally inconsistent configuration, detected before the
/// first tick runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("{metric}: warning level {warning} is stricter than critical level {critical}")]
    InvertedLimit {
        metric: &'static str,
        warning: f64,
        critical: f64,
    },
    #[error("{name} = {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{0} must be positive and finite")]
    NotPositive(&'static str),
    #[error("pack topology {series}S{parallel}P needs at least one cell in each direction")]
    EmptyTopology { series: usize, parallel: usize },
    #[error("pack topology {series}S{parallel}P expects {expected} cells, got {actual}")]
    CellCount {
        series: usize,
        parallel: usize,
        expected: usize,
        actual: usize,
    },
    #[error("OCV curve: {0}")]
    OcvCurve(String),
    #[error("{0}")]
    Inconsistent(String),
}
