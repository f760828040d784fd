//! Error types for vehicle_sim

use std::fmt;

/// Main error type for simulation and estimation
#[derive(Debug)]
pub enum VehicleSimError {
    /// Invalid parameter
    InvalidParameter(String),
    /// Numerical computation failed (matrix inversion, zero-length vector, etc.)
    NumericalError(String),
}

impl fmt::Display for VehicleSimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleSimError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            VehicleSimError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for VehicleSimError {}

/// Result type alias for simulation operations
pub type VehicleSimResult<T> = Result<T, VehicleSimError>;
