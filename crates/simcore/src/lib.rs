//! Shared simulation vocabulary for the battery pack workspace.
//!
//! Holds the tick context passed down the control loop, the `Model` trait
//! implemented by stateful components, and the error taxonomy shared by the
//! electrical and control crates.

pub mod error;
pub mod traits;

pub use error::*;
pub use traits::*;
