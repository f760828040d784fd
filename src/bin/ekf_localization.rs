// EKF localization of a bicycle-model vehicle
//
// A true vehicle is driven by a scripted speed profile; a second vehicle dead
// reckons on the noisy inputs, and the EKF fuses the noisy inputs with noisy
// position fixes. The four trajectories are plotted for comparison.

use plotlib::page::Page;
use plotlib::repr::Plot;
use plotlib::style::{PointMarker, PointStyle};
use plotlib::view::ContinuousView;

use rand_distr::{Distribution, Normal};

use vehicle_sim::common::{VehicleInputs, VehicleState};
use vehicle_sim::control::SpeedProfile;
use vehicle_sim::localization::{EkfConfig, PoseEkf, PositionMeasurement};
use vehicle_sim::vehicle::{BicycleModel, BicycleParams};

fn main() {
    let sim_time = 50.0;
    let dt = 0.1;
    let mut time = 0.;

    let wheelbase = 2.5;
    let steering = 0.35_f64;

    // actuation noise fed to dead reckoning and the filter
    let velocity_noise_std = 0.3_f64;
    let steering_noise_std = 2.0_f64.to_radians();
    // position fix noise
    let measurement_noise_std = 0.5_f64;

    let initial = VehicleState::new(0., 0., 0.);
    let params = BicycleParams::new(wheelbase).expect("valid wheelbase");
    let mut vehicle = BicycleModel::new(params, initial);
    let mut dead_reckoning = BicycleModel::new(params, initial);

    let mut config = EkfConfig::default();
    config.process_noise[(0, 0)] = velocity_noise_std.powi(2);
    config.process_noise[(1, 1)] = steering_noise_std.powi(2);
    config.measurement_noise[(0, 0)] = measurement_noise_std.powi(2);
    config.measurement_noise[(1, 1)] = measurement_noise_std.powi(2);
    let mut ekf = PoseEkf::with_initial_pose(&initial, wheelbase, config).expect("valid wheelbase");

    // speed script: accelerate, cruise, slow down
    let mut profile = SpeedProfile::new(0.0);
    profile.add_ramp(2.0, 5.0);
    profile.hold_current(25.0);
    profile.add_ramp(1.0, 10.0);
    profile.hold_current(10.0);

    let mut rng = rand::thread_rng();
    let normal = Normal::new(0., 1.).unwrap();

    let mut hz = vec![];
    let mut htrue = vec![(0., 0.)];
    let mut hdr = vec![(0., 0.)];
    let mut hest = vec![(0., 0.)];

    while time < sim_time {
        time += dt;

        let velocity = profile.update(dt);
        let noisy = VehicleInputs::new(
            steering + normal.sample(&mut rng) * steering_noise_std,
            velocity + normal.sample(&mut rng) * velocity_noise_std,
        );

        vehicle.set_inputs(steering, velocity);
        vehicle.step(dt);
        dead_reckoning.set_inputs(noisy.steering, noisy.velocity);
        dead_reckoning.step(dt);

        ekf.predict(&noisy, dt);

        let truth = vehicle.state();
        let z = PositionMeasurement::new(
            truth.position.x + normal.sample(&mut rng) * measurement_noise_std,
            truth.position.y + normal.sample(&mut rng) * measurement_noise_std,
        );
        ekf.update(&z);

        let dr = dead_reckoning.state();
        let est = ekf.mean();
        hz.push((z[0], z[1]));
        htrue.push((truth.position.x, truth.position.y));
        hdr.push((dr.position.x, dr.position.y));
        hest.push((est[0], est[1]));
    }

    println!(
        "simulated {:.0} s, skipped updates: {}",
        sim_time,
        ekf.skipped_updates()
    );

    let s0: Plot = Plot::new(hz).point_style(
        PointStyle::new()
            .marker(PointMarker::Circle)
            .colour("#DD3355")
            .size(2.),
    );
    let s1: Plot = Plot::new(htrue).point_style(
        PointStyle::new()
            .colour("#0000ff")
            .size(2.),
    );
    let s2: Plot = Plot::new(hdr).point_style(
        PointStyle::new()
            .colour("#FFFF00")
            .size(2.),
    );
    let s3: Plot = Plot::new(hest).point_style(
        PointStyle::new()
            .colour("#35C788")
            .size(2.),
    );

    let v = ContinuousView::new()
        .add(s0)
        .add(s1)
        .add(s2)
        .add(s3)
        .x_label("x [m]")
        .y_label("y [m]");

    std::fs::create_dir_all("./img").unwrap();
    Page::single(&v).save("./img/ekf_localization.svg").unwrap();
}
