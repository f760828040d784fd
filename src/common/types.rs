//! Common types used throughout vehicle_sim

use std::f64::consts::PI;
use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::{Vector2, Vector3};

use crate::common::error::{VehicleSimError, VehicleSimResult};

/// Normalize an angle into [0, 2*pi)
pub fn normalize_angle(angle: f64) -> f64 {
    let mut wrapped = angle.rem_euclid(2.0 * PI);
    // rem_euclid can round up to exactly 2*pi for tiny negative inputs
    if wrapped >= 2.0 * PI {
        wrapped = 0.0;
    }
    wrapped
}

/// 2D vector with value semantics: every operation returns a new vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Unit vector pointing along `angle` (radians, counter-clockwise from the x axis)
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn from_polar(magnitude: f64, angle: f64) -> Self {
        Self::from_angle(angle) * magnitude
    }

    pub fn dot(&self, other: &Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn distance(&self, other: &Vector2D) -> f64 {
        (*other - *self).magnitude()
    }

    /// Unit vector in the same direction; fails on the zero vector.
    pub fn normalize(&self) -> VehicleSimResult<Vector2D> {
        let mag = self.magnitude();
        if mag == 0.0 {
            return Err(VehicleSimError::NumericalError(
                "cannot normalize a zero-length vector".to_string(),
            ));
        }
        Ok(*self * (1.0 / mag))
    }

    /// Rotate by `angle` radians, counter-clockwise (mathematical convention)
    pub fn rotate(&self, angle: f64) -> Vector2D {
        let c = angle.cos();
        let s = angle.sin();
        Vector2D::new(c * self.x - s * self.y, s * self.x + c * self.y)
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl Add for Vector2D {
    type Output = Vector2D;

    fn add(self, other: Vector2D) -> Vector2D {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;

    fn sub(self, other: Vector2D) -> Vector2D {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }
}

impl Neg for Vector2D {
    type Output = Vector2D;

    fn neg(self) -> Vector2D {
        Vector2D::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vector2D {
    type Output = Vector2D;

    fn mul(self, scalar: f64) -> Vector2D {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }
}

impl From<Vector2<f64>> for Vector2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// Vehicle pose: position of the kinematic reference point and heading.
///
/// Heading is kept in [0, 2*pi); the constructors normalize it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Vector2D,
    pub heading: f64,
}

impl VehicleState {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            position: Vector2D::new(x, y),
            heading: normalize_angle(heading),
        }
    }

    pub fn from_pose(position: Vector2D, heading: f64) -> Self {
        Self {
            position,
            heading: normalize_angle(heading),
        }
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.position.x, self.position.y, self.heading)
    }
}

impl From<Vector3<f64>> for VehicleState {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Per-tick vehicle inputs, held constant over the tick (zero-order hold)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleInputs {
    /// Steering angle in radians; must stay strictly within (-pi/2, pi/2)
    pub steering: f64,
    /// Signed speed in m/s
    pub velocity: f64,
}

impl VehicleInputs {
    pub fn new(steering: f64, velocity: f64) -> Self {
        Self { steering, velocity }
    }

    pub fn zero() -> Self {
        Self {
            steering: 0.0,
            velocity: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle_range() {
        let angles = [
            -10.0, -7.0, -2.0 * PI, -PI, -0.5, -1e-18, 0.0, 0.5, PI, 2.0 * PI, 7.0, 10.0,
        ];
        for &a in &angles {
            let n = normalize_angle(a);
            assert!(n >= 0.0 && n < 2.0 * PI, "normalize({}) = {}", a, n);
            // congruent modulo 2*pi
            let diff = (n - a).rem_euclid(2.0 * PI);
            assert!(diff < 1e-9 || 2.0 * PI - diff < 1e-9, "normalize({}) = {}", a, n);
        }
    }

    #[test]
    fn test_rotate_round_trip() {
        let v = Vector2D::new(3.0, -4.0);
        for i in 0..16 {
            let theta = i as f64 * PI / 8.0;
            let back = v.rotate(theta).rotate(-theta);
            assert!((back.x - v.x).abs() < 1e-12);
            assert!((back.y - v.y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_from_polar() {
        let v = Vector2D::from_polar(2.0, PI / 2.0);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 2.0).abs() < 1e-12);
        assert!((v.magnitude() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_vector_fails() {
        assert!(Vector2D::zero().normalize().is_err());
        let unit = Vector2D::new(3.0, 4.0).normalize().unwrap();
        assert!((unit.magnitude() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_vector_distance() {
        let a = Vector2D::new(0.0, 0.0);
        let b = Vector2D::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_vehicle_state_normalizes_heading() {
        let state = VehicleState::new(1.0, 2.0, -PI / 2.0);
        assert!((state.heading - 3.0 * PI / 2.0).abs() < 1e-12);
        let v = state.to_vector();
        assert_eq!(v[0], 1.0);
        assert_eq!(v[1], 2.0);
    }
}
