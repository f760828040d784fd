//! vehicle_sim - bicycle-model vehicle simulation with EKF pose estimation
//!
//! This crate simulates a steerable ground vehicle with bicycle kinematics
//! and estimates its pose (position, heading) from noisy velocity/steering
//! inputs and noisy position observations with an Extended Kalman Filter.

// Core modules
pub mod common;
pub mod utils;

// Simulation and estimation modules
pub mod control;
pub mod localization;
pub mod vehicle;

// Re-export common types for convenience
pub use common::{normalize_angle, Vector2D, VehicleInputs, VehicleState};
pub use common::{StateEstimator, VehicleSimError, VehicleSimResult};
pub use control::SpeedProfile;
pub use localization::{ConfidenceEllipse, ConfidenceLevel, EkfConfig, PoseEkf};
pub use vehicle::{BicycleModel, BicycleParams};
