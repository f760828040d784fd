//! Utility modules for vehicle_sim

pub mod visualization;

pub use visualization::{colors, PathStyle, PointStyle, Visualizer};
