//! Extended Kalman Filter (EKF) pose estimation
//!
//! Estimates the pose (x, y, heading) of a bicycle-model vehicle from noisy
//! velocity/steering inputs and noisy position measurements. The prediction
//! step integrates the same kinematic equations as the simulated vehicle;
//! process noise enters over (velocity, steering) and is mapped into state
//! space through the noise Jacobian.

use log::warn;
use nalgebra::{Matrix2, Matrix2x3, Matrix3, Matrix3x2, Vector2, Vector3};

use crate::common::{normalize_angle, StateEstimator, VehicleInputs, VehicleSimError,
    VehicleSimResult, VehicleState};
use crate::localization::ellipse::{confidence_ellipse, ConfidenceEllipse, ConfidenceLevel};
use crate::vehicle::bicycle;

/// State estimate mean (x, y, heading)
pub type PoseMean = Vector3<f64>;

/// Position measurement (x, y)
pub type PositionMeasurement = Vector2<f64>;

/// Configuration for the pose EKF
#[derive(Debug, Clone)]
pub struct EkfConfig {
    /// Process noise covariance Q over (velocity, steering) actuation
    pub process_noise: Matrix2<f64>,
    /// Measurement noise covariance over the (x, y) position measurement
    pub measurement_noise: Matrix2<f64>,
}

impl Default for EkfConfig {
    fn default() -> Self {
        let mut process_noise = Matrix2::<f64>::zeros();
        process_noise[(0, 0)] = 0.1_f64.powi(2);
        process_noise[(1, 1)] = (1.0_f64.to_radians()).powi(2);

        let measurement_noise = Matrix2::<f64>::identity();

        Self {
            process_noise,
            measurement_noise,
        }
    }
}

/// Extended Kalman Filter over the vehicle pose.
///
/// Owns its estimate (mean and covariance) independently of the simulated
/// vehicle; the covariance is re-symmetrized after every predict and update so
/// floating-point drift cannot accumulate into an asymmetric matrix.
///
/// Steering must stay strictly within (-pi/2, pi/2): at +-pi/2 the noise
/// Jacobian divides by cos(steering)^2 and is undefined.
pub struct PoseEkf {
    /// Current estimate mean [x, y, heading]
    mean: PoseMean,
    /// State covariance matrix
    covariance: Matrix3<f64>,
    /// Wheelbase of the modeled vehicle [m]
    wheelbase: f64,
    /// Configuration
    config: EkfConfig,
    /// Number of measurement updates skipped because S was singular
    skipped_updates: u64,
}

impl PoseEkf {
    /// Create a new pose EKF at the origin; the wheelbase must be strictly
    /// positive.
    pub fn new(wheelbase: f64, config: EkfConfig) -> VehicleSimResult<Self> {
        if wheelbase <= 0.0 {
            return Err(VehicleSimError::InvalidParameter(format!(
                "wheelbase must be positive, got {}",
                wheelbase
            )));
        }
        Ok(Self {
            mean: PoseMean::zeros(),
            covariance: Matrix3::identity(),
            wheelbase,
            config,
            skipped_updates: 0,
        })
    }

    /// Create with an initial pose estimate
    pub fn with_initial_pose(
        pose: &VehicleState,
        wheelbase: f64,
        config: EkfConfig,
    ) -> VehicleSimResult<Self> {
        let mut ekf = Self::new(wheelbase, config)?;
        ekf.mean = pose.to_vector();
        Ok(ekf)
    }

    /// Get the estimate mean [x, y, heading]
    pub fn mean(&self) -> &PoseMean {
        &self.mean
    }

    /// Get the estimate as a vehicle pose (copy)
    pub fn pose(&self) -> VehicleState {
        VehicleState::from(self.mean)
    }

    /// Get the state covariance
    pub fn covariance(&self) -> &Matrix3<f64> {
        &self.covariance
    }

    /// Get the 2x2 position block of the covariance
    pub fn position_covariance(&self) -> Matrix2<f64> {
        self.covariance.fixed_view::<2, 2>(0, 0).into_owned()
    }

    /// Confidence ellipse of the position estimate at the given level
    pub fn position_uncertainty(&self, level: ConfidenceLevel) -> ConfidenceEllipse {
        confidence_ellipse(&self.position_covariance(), level)
    }

    /// Number of measurement updates skipped due to a singular innovation
    /// covariance
    pub fn skipped_updates(&self) -> u64 {
        self.skipped_updates
    }

    /// Jacobian of the motion model with respect to the state, at heading
    /// `theta` and commanded velocity `v`
    fn jacobian_f(theta: f64, v: f64, dt: f64) -> Matrix3<f64> {
        Matrix3::new(
            1., 0., -dt * v * theta.sin(),
            0., 1., dt * v * theta.cos(),
            0., 0., 1.,
        )
    }

    /// Jacobian of the motion model with respect to the (velocity, steering)
    /// noise
    fn jacobian_g(theta: f64, v: f64, delta: f64, wheelbase: f64, dt: f64) -> Matrix3x2<f64> {
        Matrix3x2::new(
            dt * theta.cos(), 0.,
            dt * theta.sin(), 0.,
            0., dt * v / (wheelbase * delta.cos().powi(2)),
        )
    }

    /// Jacobian of the observation model (identity on position)
    fn jacobian_h() -> Matrix2x3<f64> {
        Matrix2x3::new(
            1., 0., 0.,
            0., 1., 0.,
        )
    }

    /// Prediction step: propagate the mean through the bicycle kinematics
    /// driven by the (noisy) inputs, and the covariance through the
    /// linearized dynamics.
    pub fn predict(&mut self, inputs: &VehicleInputs, dt: f64) {
        let theta = self.mean[2];
        let j_f = Self::jacobian_f(theta, inputs.velocity, dt);
        let j_g = Self::jacobian_g(theta, inputs.velocity, inputs.steering, self.wheelbase, dt);

        let state = VehicleState::new(self.mean[0], self.mean[1], theta);
        self.mean = bicycle::propagate(&state, inputs, self.wheelbase, dt).to_vector();

        self.covariance = j_f * self.covariance * j_f.transpose()
            + j_g * self.config.process_noise * j_g.transpose();
        self.symmetrize();
    }

    /// Correction step with a position measurement.
    ///
    /// If the innovation covariance is singular the update is skipped (logged
    /// and counted) instead of corrupting the estimate with NaN/Inf.
    pub fn update(&mut self, measurement: &PositionMeasurement) {
        let j_h = Self::jacobian_h();
        let z_pred = Vector2::new(self.mean[0], self.mean[1]);
        let y = measurement - z_pred;
        let s = j_h * self.covariance * j_h.transpose() + self.config.measurement_noise;

        let s_inv = match s.try_inverse() {
            Some(inv) if inv.iter().all(|e| e.is_finite()) => inv,
            _ => {
                self.skipped_updates += 1;
                warn!("singular innovation covariance, skipping measurement update");
                return;
            }
        };

        let k = self.covariance * j_h.transpose() * s_inv;
        self.mean += k * y;
        self.mean[2] = normalize_angle(self.mean[2]);
        self.covariance = (Matrix3::identity() - k * j_h) * self.covariance;
        self.symmetrize();
    }

    // P = (P + P^T) / 2
    fn symmetrize(&mut self) {
        self.covariance = (self.covariance + self.covariance.transpose()) * 0.5;
    }
}

impl StateEstimator for PoseEkf {
    type State = PoseMean;
    type Measurement = PositionMeasurement;
    type Control = VehicleInputs;

    fn predict(&mut self, control: &Self::Control, dt: f64) {
        PoseEkf::predict(self, control, dt);
    }

    fn update(&mut self, measurement: &Self::Measurement) {
        PoseEkf::update(self, measurement);
    }

    fn get_state(&self) -> &Self::State {
        &self.mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{BicycleModel, BicycleParams};
    use rand::prelude::*;

    const WHEELBASE: f64 = 2.5;

    #[test]
    fn test_rejects_non_positive_wheelbase() {
        assert!(PoseEkf::new(0.0, EkfConfig::default()).is_err());
        assert!(PoseEkf::new(-2.5, EkfConfig::default()).is_err());
    }

    #[test]
    fn test_predict_moves_along_heading() {
        let mut ekf = PoseEkf::new(WHEELBASE, EkfConfig::default()).unwrap();
        ekf.predict(&VehicleInputs::new(0.0, 1.0), 0.1);
        let mean = ekf.mean();
        assert!(mean[0] > 0.0);
        assert!(mean[1].abs() < 1e-12);
    }

    #[test]
    fn test_update_pulls_towards_measurement() {
        let mut ekf = PoseEkf::new(WHEELBASE, EkfConfig::default()).unwrap();
        ekf.update(&PositionMeasurement::new(1.0, 1.0));
        let mean = ekf.mean();
        assert!(mean[0] > 0.0);
        assert!(mean[1] > 0.0);
    }

    #[test]
    fn test_covariance_stays_symmetric_psd() {
        // random but valid predict/update sequences must not break symmetry
        // or produce negative eigenvalues
        let mut rng = StdRng::seed_from_u64(42);
        let mut ekf = PoseEkf::new(WHEELBASE, EkfConfig::default()).unwrap();

        for i in 0..500 {
            let steering = rng.gen_range(-1.2..1.2);
            let velocity = rng.gen_range(-2.0..8.0);
            ekf.predict(&VehicleInputs::new(steering, velocity), 0.1);

            if i % 3 == 0 {
                let z = PositionMeasurement::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
                ekf.update(&z);
            }

            let p = ekf.covariance();
            for r in 0..3 {
                for c in 0..3 {
                    assert!((p[(r, c)] - p[(c, r)]).abs() < 1e-12);
                    assert!(p[(r, c)].is_finite());
                }
            }
            let eig = p.symmetric_eigen();
            for ev in eig.eigenvalues.iter() {
                assert!(*ev > -1e-9, "negative eigenvalue {} at step {}", ev, i);
            }
        }
    }

    #[test]
    fn test_singular_innovation_covariance_skips_update() {
        // zero initial covariance, zero process noise and zero measurement
        // noise make S exactly singular; the update must leave the estimate
        // untouched instead of producing NaN
        let config = EkfConfig {
            process_noise: Matrix2::zeros(),
            measurement_noise: Matrix2::zeros(),
        };
        let mut ekf = PoseEkf::new(WHEELBASE, config).unwrap();
        ekf.covariance = Matrix3::zeros();

        let mean_before = *ekf.mean();
        let cov_before = *ekf.covariance();
        ekf.update(&PositionMeasurement::new(3.0, -1.0));

        assert_eq!(ekf.skipped_updates(), 1);
        assert_eq!(*ekf.mean(), mean_before);
        assert_eq!(*ekf.covariance(), cov_before);
        assert!(ekf.mean().iter().all(|e| e.is_finite()));
    }

    #[test]
    fn test_noiseless_tracking_matches_truth() {
        // Q = 0, perfect inputs and perfect measurements: the estimate must
        // follow the true trajectory exactly
        let config = EkfConfig {
            process_noise: Matrix2::zeros(),
            measurement_noise: Matrix2::zeros(),
        };
        let initial = VehicleState::new(0.0, 0.0, 0.0);
        let params = BicycleParams::new(WHEELBASE).unwrap();
        let mut vehicle = BicycleModel::new(params, initial);
        let mut ekf = PoseEkf::with_initial_pose(&initial, WHEELBASE, config).unwrap();

        let dt = 0.1;
        for _ in 0..200 {
            let inputs = VehicleInputs::new(0.2, 1.5);
            vehicle.set_inputs(inputs.steering, inputs.velocity);
            vehicle.step(dt);
            ekf.predict(&inputs, dt);

            let truth = vehicle.state();
            ekf.update(&PositionMeasurement::new(truth.position.x, truth.position.y));

            let mean = ekf.mean();
            assert!((mean[0] - truth.position.x).abs() < 1e-9);
            assert!((mean[1] - truth.position.y).abs() < 1e-9);
            assert!((mean[2] - truth.heading).abs() < 1e-9);
        }
    }

    #[test]
    fn test_estimator_trait_interface() {
        let mut ekf = PoseEkf::new(WHEELBASE, EkfConfig::default()).unwrap();
        let estimator: &mut dyn StateEstimator<
            State = PoseMean,
            Measurement = PositionMeasurement,
            Control = VehicleInputs,
        > = &mut ekf;

        estimator.predict(&VehicleInputs::new(0.0, 1.0), 0.1);
        estimator.update(&PositionMeasurement::new(0.1, 0.0));
        assert!(estimator.get_state()[0] > 0.0);
    }
}
