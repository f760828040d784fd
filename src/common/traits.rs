//! Common traits defining interfaces between the simulation core and its drivers

/// Trait for state estimation algorithms
///
/// The per-tick driver holds an estimator behind this seam: feed it the
/// (noisy) control inputs, feed it the (noisy) measurement, read the estimate.
pub trait StateEstimator {
    /// State type used by this estimator
    type State;
    /// Measurement type used by this estimator
    type Measurement;
    /// Control input type
    type Control;

    /// Prediction step
    fn predict(&mut self, control: &Self::Control, dt: f64);

    /// Update step with measurement
    fn update(&mut self, measurement: &Self::Measurement);

    /// Get current state estimate
    fn get_state(&self) -> &Self::State;
}
