#![allow(dead_code)]

use std::f64::consts::TAU;

use pendulum::{EpisodeSimulation, SimConfig};

/// Deterministic single-pendulum simulation with the given step bound.
pub fn simulation(max_steps: Option<u32>) -> EpisodeSimulation {
    let mut config = SimConfig {
        max_steps,
        seed: Some(42),
        ..SimConfig::single()
    };
    if max_steps.is_none() {
        config.reward.out_of_bounds_penalty = Some(-10_000.0);
    }
    EpisodeSimulation::new(config).unwrap()
}

/// Distance between two angles on the circle.
pub fn angle_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}
