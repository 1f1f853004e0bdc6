//! Battery management for a simulated pack
//!
//! This crate provides:
//! - Warning/critical thresholds and the append-only fault log
//! - Charge tapering and the discharge ceiling
//! - Passive balancing
//! - The management controller and its Normal/Warning/Critical state machine
//! - Load profiles, telemetry sinks, run summaries and configuration

pub mod balancing;
pub mod bms;
pub mod config;
pub mod discharge;
pub mod error;
pub mod fault;
pub mod profile;
pub mod summary;
pub mod taper;
pub mod telemetry;
pub mod thresholds;

pub use balancing::*;
pub use bms::*;
pub use config::*;
pub use discharge::*;
pub use error::*;
pub use fault::*;
pub use profile::*;
pub use summary::*;
pub use taper::*;
pub use telemetry::*;
pub use thresholds::*;
