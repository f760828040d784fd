//! Bicycle kinematic model
//!
//! Integrates a steerable ground vehicle forward in time with the classic
//! bicycle (Ackermann-style) kinematics, referenced at the rear axle:
//!
//! ```text
//! x_dot     = v * cos(theta)
//! y_dot     = v * sin(theta)
//! theta_dot = v * tan(delta) / L
//! ```
//!
//! discretized with an explicit forward-Euler step of size `dt`.

use crate::common::{
    normalize_angle, Vector2D, VehicleInputs, VehicleSimError, VehicleSimResult, VehicleState,
};

/// Vehicle geometry, immutable after construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BicycleParams {
    wheelbase: f64,
}

impl BicycleParams {
    /// Create vehicle parameters; the wheelbase must be strictly positive.
    pub fn new(wheelbase: f64) -> VehicleSimResult<Self> {
        if wheelbase <= 0.0 {
            return Err(VehicleSimError::InvalidParameter(format!(
                "wheelbase must be positive, got {}",
                wheelbase
            )));
        }
        Ok(Self { wheelbase })
    }

    /// Distance between the front and rear axle reference points [m]
    pub fn wheelbase(&self) -> f64 {
        self.wheelbase
    }
}

/// One forward-Euler step of the bicycle kinematics.
///
/// Shared by [`BicycleModel::step`] and the EKF prediction so both integrate
/// the exact same equations. Inputs are held constant over the step
/// (zero-order hold). The returned heading is normalized into [0, 2*pi).
pub fn propagate(
    state: &VehicleState,
    inputs: &VehicleInputs,
    wheelbase: f64,
    dt: f64,
) -> VehicleState {
    let x_dot = inputs.velocity * state.heading.cos();
    let y_dot = inputs.velocity * state.heading.sin();
    let heading_dot = inputs.velocity * inputs.steering.tan() / wheelbase;

    VehicleState {
        position: Vector2D::new(
            state.position.x + dt * x_dot,
            state.position.y + dt * y_dot,
        ),
        heading: normalize_angle(state.heading + dt * heading_dot),
    }
}

/// Steerable vehicle simulated with bicycle kinematics.
///
/// The model exclusively owns its [`VehicleState`]; collaborators receive
/// copies through [`BicycleModel::state`] and never a mutable view. Inputs are
/// set each tick with [`BicycleModel::set_inputs`] before calling
/// [`BicycleModel::step`].
pub struct BicycleModel {
    params: BicycleParams,
    state: VehicleState,
    inputs: VehicleInputs,
}

impl BicycleModel {
    pub fn new(params: BicycleParams, initial_pose: VehicleState) -> Self {
        Self {
            params,
            state: initial_pose,
            inputs: VehicleInputs::zero(),
        }
    }

    /// Set the commanded steering angle [rad] and velocity [m/s] for the next step
    pub fn set_inputs(&mut self, steering: f64, velocity: f64) {
        self.inputs = VehicleInputs::new(steering, velocity);
    }

    /// Advance the state by `dt` seconds. `dt = 0` is a valid no-op.
    pub fn step(&mut self, dt: f64) {
        self.state = propagate(&self.state, &self.inputs, self.params.wheelbase(), dt);
    }

    /// Current state (copy)
    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn params(&self) -> &BicycleParams {
        &self.params
    }

    pub fn inputs(&self) -> VehicleInputs {
        self.inputs
    }

    /// Transform a point from the vehicle frame (origin at the kinematic
    /// reference point, x axis along the heading) into the global frame.
    pub fn vehicle_to_global(&self, local: Vector2D) -> Vector2D {
        self.state.position + local.rotate(self.state.heading)
    }
}
