mod common;

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use common::{angle_distance, simulation};
use pendulum::{EpisodeSimulation, SimConfig};

#[test]
fn reset_angle_round_trips_for_any_angle() {
    let mut sim = simulation(Some(100));
    let mut angle = -3.0 * TAU;
    while angle < 3.0 * TAU {
        sim.reset(Some(angle));
        let joint = &sim.joints()[0];
        let read = joint.relative_angle(sim.physics());
        assert!((0.0..TAU).contains(&read), "angle {read} outside [0, 2π)");
        assert!(
            angle_distance(read, angle) < 1e-9,
            "reset to {angle} read back {read}"
        );
        assert_eq!(joint.relative_angular_velocity(sim.physics()), 0.0);
        angle += 0.37;
    }
}

#[test]
fn cardinal_angles_round_trip_through_observation() {
    let mut sim = simulation(Some(100));
    for theta in [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2] {
        let obs = sim.reset(Some(theta));
        assert!(angle_distance(obs[0], theta) < 1e-9, "θ={theta} obs={}", obs[0]);
        assert_eq!(obs[1], 0.0);
        assert_eq!(obs[2], 0.0);
        assert_eq!(obs[3], 0.0);
    }
}

#[test]
fn upright_poles() {
    let mut sim = simulation(Some(100));
    sim.reset(Some(PI));
    let joint = &sim.joints()[0];
    assert!((joint.upright(sim.physics()) - 1.0).abs() < 1e-12);

    sim.reset(Some(0.0));
    let joint = &sim.joints()[0];
    assert_eq!(joint.relative_angle(sim.physics()), 0.0);
    assert_eq!(joint.upright(sim.physics()), -1.0);
}

#[test]
fn chained_links_reset_in_order() {
    let mut sim = EpisodeSimulation::new(SimConfig::double()).unwrap();
    sim.reset(Some(FRAC_PI_2));
    for joint in sim.joints() {
        assert!(angle_distance(joint.relative_angle(sim.physics()), FRAC_PI_2) < 1e-9);
        assert_eq!(joint.relative_angular_velocity(sim.physics()), 0.0);
    }
    // outermost bob sits at the sum of the link lengths
    let tip = sim.joints()[1].satellite();
    let total: f64 = sim.config().links.iter().map(|l| l.length).sum();
    assert!((sim.physics().bodies[tip.0].pos.x - total).abs() < 1e-9);
}

#[test]
fn links_keep_their_length_while_swinging() {
    let mut sim = EpisodeSimulation::new(SimConfig::double()).unwrap();
    sim.reset(Some(2.0));
    for i in 0..300 {
        sim.step(if i % 20 < 10 { 0.3 } else { -0.3 });
        for joint in sim.joints() {
            let physics = sim.physics();
            let r = physics.bodies[joint.satellite().0].pos
                - physics.bodies[joint.primary().0].pos;
            assert!(
                (r.length() - joint.length()).abs() < 5e-2,
                "link stretched to {}",
                r.length()
            );
        }
    }
}
