//! Confidence ellipses for 2D position covariance
//!
//! Turns the 2x2 position block of an estimate covariance into the geometry
//! of a chi-square confidence ellipse for display.

use nalgebra::Matrix2;

use crate::common::{VehicleSimError, VehicleSimResult};

/// Supported confidence levels (2 degrees of freedom)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    P90,
    P95,
    P99,
    P999,
}

impl ConfidenceLevel {
    /// Map a fraction (0.9, 0.95, 0.99 or 0.999) to a confidence level.
    ///
    /// Anything else is a configuration error, never silently replaced by a
    /// default.
    pub fn from_fraction(fraction: f64) -> VehicleSimResult<Self> {
        if fraction == 0.9 {
            Ok(ConfidenceLevel::P90)
        } else if fraction == 0.95 {
            Ok(ConfidenceLevel::P95)
        } else if fraction == 0.99 {
            Ok(ConfidenceLevel::P99)
        } else if fraction == 0.999 {
            Ok(ConfidenceLevel::P999)
        } else {
            Err(VehicleSimError::InvalidParameter(format!(
                "unsupported confidence level {}, expected one of 0.9, 0.95, 0.99, 0.999",
                fraction
            )))
        }
    }

    /// Chi-square coefficient for 2 degrees of freedom
    pub fn chi_square(self) -> f64 {
        match self {
            ConfidenceLevel::P90 => 4.61,
            ConfidenceLevel::P95 => 5.99,
            ConfidenceLevel::P99 => 9.21,
            ConfidenceLevel::P999 => 13.82,
        }
    }
}

/// Geometry of a confidence ellipse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceEllipse {
    /// Full length of the minor axis
    pub minor_axis: f64,
    /// Full length of the major axis
    pub major_axis: f64,
    /// Angle of the major axis relative to the x axis [rad]
    pub angle: f64,
}

/// Confidence ellipse of a 2x2 position covariance block.
///
/// Eigenvalues are sorted ascending; axis lengths are `2 * sqrt(coeff * ev)`
/// and the rotation is the angle of the larger eigenvalue's eigenvector.
/// Eigenvalues pushed slightly negative by floating-point drift are clamped
/// to zero before the square root.
pub fn confidence_ellipse(covariance: &Matrix2<f64>, level: ConfidenceLevel) -> ConfidenceEllipse {
    let eig = covariance.symmetric_eigen();
    let (minor_idx, major_idx) = if eig.eigenvalues[0] <= eig.eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };

    let coeff = level.chi_square();
    let minor_axis = 2.0 * (coeff * eig.eigenvalues[minor_idx].max(0.0)).sqrt();
    let major_axis = 2.0 * (coeff * eig.eigenvalues[major_idx].max(0.0)).sqrt();

    let major_vec = eig.eigenvectors.column(major_idx);
    let angle = major_vec[1].atan2(major_vec[0]);

    ConfidenceEllipse {
        minor_axis,
        major_axis,
        angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_diagonal_covariance_axes() {
        // variance 4 along y, 1 along x: major axis follows y
        let cov = Matrix2::new(1.0, 0.0, 0.0, 4.0);
        let ellipse = confidence_ellipse(&cov, ConfidenceLevel::P95);

        assert!((ellipse.minor_axis - 2.0 * (5.99_f64 * 1.0).sqrt()).abs() < 1e-9);
        assert!((ellipse.major_axis - 2.0 * (5.99_f64 * 4.0).sqrt()).abs() < 1e-9);
        // major axis along +-y
        let angle = ellipse.angle.abs();
        assert!((angle - PI / 2.0).abs() < 1e-9);
        assert!(ellipse.major_axis >= ellipse.minor_axis);
    }

    #[test]
    fn test_isotropic_covariance_is_a_circle() {
        let cov = Matrix2::new(2.0, 0.0, 0.0, 2.0);
        let ellipse = confidence_ellipse(&cov, ConfidenceLevel::P99);
        assert!((ellipse.minor_axis - ellipse.major_axis).abs() < 1e-9);
        assert!((ellipse.major_axis - 2.0 * (9.21_f64 * 2.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_negative_drift_eigenvalue_clamped() {
        // a tiny negative eigenvalue must not produce NaN axes
        let cov = Matrix2::new(1e-18, 0.0, 0.0, -1e-18);
        let ellipse = confidence_ellipse(&cov, ConfidenceLevel::P90);
        assert!(ellipse.minor_axis >= 0.0);
        assert!(ellipse.major_axis >= 0.0);
        assert!(!ellipse.minor_axis.is_nan());
    }

    #[test]
    fn test_from_fraction() {
        assert_eq!(
            ConfidenceLevel::from_fraction(0.95).unwrap(),
            ConfidenceLevel::P95
        );
        assert!((ConfidenceLevel::from_fraction(0.999).unwrap().chi_square() - 13.82).abs() < 1e-12);
        assert!(ConfidenceLevel::from_fraction(0.5).is_err());
    }
}
