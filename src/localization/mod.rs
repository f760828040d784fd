// Pose estimation module

pub mod ekf;
pub mod ellipse;

// Re-exports
pub use ekf::{EkfConfig, PoseEkf, PoseMean, PositionMeasurement};
pub use ellipse::{confidence_ellipse, ConfidenceEllipse, ConfidenceLevel};
