//! Electrical, thermal and aging model of a lithium-ion pack
//!
//! - `cell`: equivalent-circuit cell and its single-step update
//! - `pack`: series-parallel aggregation and snapshots
//! - `split`: current sharing strategies between parallel strings
//! - `variance`: seeded manufacturing spread
//! - `analysis`: single-cell characterisation curves

pub mod analysis;
pub mod cell;
pub mod pack;
pub mod split;
pub mod variance;

pub use cell::{Cell, CellConstants, CellPosition, CellState, ManufacturingVariance, OcvCurve, OcvPoint};
pub use pack::{BalancingCommand, CurrentLimits, Pack, PackConfig, PackSnapshot};
pub use split::{ConductanceWeighted, CurrentSplit, EqualSplit, SplitPolicy};
pub use variance::{VarianceConfig, sample_variance};
