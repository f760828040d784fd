//! Common types, traits, and error definitions for vehicle_sim
//!
//! This module provides the foundational building blocks used by the
//! kinematic model, the pose estimator, and the demo drivers.

pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
