// Pose uncertainty visualization
//
// Runs a short EKF localization scenario and renders the estimated
// trajectory together with 95% confidence ellipses of the position estimate.

use rand_distr::{Distribution, Normal};

use vehicle_sim::common::{Vector2D, VehicleInputs, VehicleState};
use vehicle_sim::localization::{ConfidenceLevel, EkfConfig, PoseEkf, PositionMeasurement};
use vehicle_sim::utils::{colors, PathStyle, PointStyle, Visualizer};
use vehicle_sim::vehicle::{BicycleModel, BicycleParams};

fn main() {
    let sim_time = 20.0;
    let dt = 0.1;
    let ellipse_every = 20; // ticks between ellipse snapshots

    let wheelbase = 2.5;
    let steering = 0.25;
    let velocity = 1.5;

    let velocity_noise_std = 0.3_f64;
    let steering_noise_std = 3.0_f64.to_radians();
    let measurement_noise_std = 0.4_f64;

    let initial = VehicleState::new(0., 0., 0.);
    let params = BicycleParams::new(wheelbase).expect("valid wheelbase");
    let mut vehicle = BicycleModel::new(params, initial);

    let mut config = EkfConfig::default();
    config.process_noise[(0, 0)] = velocity_noise_std.powi(2);
    config.process_noise[(1, 1)] = steering_noise_std.powi(2);
    config.measurement_noise[(0, 0)] = measurement_noise_std.powi(2);
    config.measurement_noise[(1, 1)] = measurement_noise_std.powi(2);
    let mut ekf = PoseEkf::with_initial_pose(&initial, wheelbase, config).expect("valid wheelbase");

    let mut rng = rand::thread_rng();
    let normal = Normal::new(0., 1.).unwrap();

    let mut vis = Visualizer::new();
    vis.set_title("EKF pose uncertainty (95% confidence)");

    let mut true_x = vec![0.];
    let mut true_y = vec![0.];
    let mut est_x = vec![0.];
    let mut est_y = vec![0.];

    let mut time = 0.;
    let mut tick = 0;
    while time < sim_time {
        time += dt;
        tick += 1;

        let noisy = VehicleInputs::new(
            steering + normal.sample(&mut rng) * steering_noise_std,
            velocity + normal.sample(&mut rng) * velocity_noise_std,
        );

        vehicle.set_inputs(steering, velocity);
        vehicle.step(dt);
        ekf.predict(&noisy, dt);

        let truth = vehicle.state();
        let z = PositionMeasurement::new(
            truth.position.x + normal.sample(&mut rng) * measurement_noise_std,
            truth.position.y + normal.sample(&mut rng) * measurement_noise_std,
        );
        ekf.update(&z);

        let est = ekf.pose();
        true_x.push(truth.position.x);
        true_y.push(truth.position.y);
        est_x.push(est.position.x);
        est_y.push(est.position.y);

        if tick % ellipse_every == 0 {
            let ellipse = ekf.position_uncertainty(ConfidenceLevel::P95);
            vis.plot_ellipse(
                est.position,
                &ellipse,
                &PathStyle::new(colors::UNCERTAINTY, "").with_line_width(1.0),
            );
        }
    }

    vis.plot_path_xy(
        &true_x,
        &true_y,
        &PathStyle::new(colors::GROUND_TRUTH, "Ground truth"),
    );
    vis.plot_path_xy(
        &est_x,
        &est_y,
        &PathStyle::new(colors::ESTIMATED, "EKF estimate"),
    );
    vis.plot_point(
        Vector2D::new(0., 0.),
        &PointStyle::new(colors::BLACK, "Start").with_size(1.5),
    );

    std::fs::create_dir_all("img").unwrap();
    match vis.save_png("img/covariance_ellipse.png", 800, 600) {
        Ok(()) => println!("saved img/covariance_ellipse.png"),
        Err(e) => eprintln!("failed to save plot: {}", e),
    }
}
