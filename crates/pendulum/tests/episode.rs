mod common;

use std::f64::consts::PI;

use common::simulation;
use pendulum::{
    AngleBand, AngleSchedule, EpisodeSimulation, MaxSteps, RailMode, SimConfig,
};

#[test]
fn done_fires_exactly_on_the_final_step() {
    for max_steps in [1_u32, 2, 200] {
        let mut sim = simulation(Some(max_steps));
        sim.reset(None);
        for i in 1..=max_steps {
            let outcome = sim.step(0.0);
            assert_eq!(
                outcome.done,
                i == max_steps,
                "max_steps={max_steps} step={i} done={}",
                outcome.done
            );
        }
    }
}

#[test]
fn step_counter_only_resets_on_reset() {
    let mut sim = simulation(Some(50));
    let mut last = sim.steps();
    for _ in 0..20 {
        sim.step(0.3);
        assert!(sim.steps() > last);
        last = sim.steps();
    }
    assert_eq!(sim.steps(), 20);
    sim.reset(None);
    assert_eq!(sim.steps(), 0);
    assert_eq!(sim.episode_reward(), 0.0);
}

#[test]
fn unbounded_episodes_never_time_out() {
    let mut sim = simulation(None);
    assert_eq!(sim.max_steps(), MaxSteps::Unbounded);
    for _ in 0..2_000 {
        assert!(!sim.step(0.0).done);
    }
}

#[test]
fn episode_reward_accumulates_step_rewards() {
    let mut sim = simulation(Some(100));
    sim.reset(Some(2.5));
    let mut total = 0.0;
    for i in 0..60 {
        total += sim.step((f64::from(i) * 0.1).sin()).reward;
    }
    assert!((sim.episode_reward() - total).abs() < 1e-9);
}

#[test]
fn out_of_range_control_is_clamped() {
    let mut a = simulation(Some(100));
    let mut b = simulation(Some(100));
    a.reset(Some(1.0));
    b.reset(Some(1.0));
    for _ in 0..10 {
        assert_eq!(a.step(25.0), b.step(1.0));
    }
    for _ in 0..10 {
        assert_eq!(a.step(-4.0), b.step(-1.0));
    }
    let mut c = simulation(Some(100));
    let mut d = simulation(Some(100));
    assert_eq!(c.step(f64::NAN), d.step(0.0));
}

#[test]
fn pushing_right_moves_the_cart_right() {
    let mut sim = simulation(Some(100));
    sim.reset(None);
    for _ in 0..10 {
        sim.step(1.0);
    }
    assert!(sim.cart_x() > 0.0);
    assert!(sim.cart_velocity_x() > 0.0);
}

#[test]
fn unbalanced_pole_falls_without_control() {
    let mut sim = simulation(Some(1000));
    sim.reset(Some(PI - 0.05));
    let start = sim.joints()[0].upright(sim.physics());
    let mut lowest = start;
    for _ in 0..120 {
        sim.step(0.0);
        lowest = lowest.min(sim.joints()[0].upright(sim.physics()));
    }
    assert!(lowest < 0.0, "pole should fall: upright {start} -> {lowest}");
}

#[test]
fn leaving_the_world_ends_with_the_catastrophic_penalty() {
    for angle in [0.0, 1.0, PI, 4.0] {
        let mut sim = simulation(Some(300));
        sim.reset(Some(angle));
        sim.place_cart(150.0);
        let outcome = sim.step(0.0);
        assert!(outcome.done);
        assert_eq!(outcome.reward, -3_000.0);
        assert_eq!(outcome.reward, sim.reward_model().out_of_bounds_penalty());
    }
}

#[test]
fn configured_penalty_overrides_the_default() {
    let mut config = SimConfig::single();
    config.reward.out_of_bounds_penalty = Some(-123.0);
    let mut sim = EpisodeSimulation::new(config).unwrap();
    sim.place_cart(-101.0);
    assert_eq!(sim.step(0.0).reward, -123.0);
}

#[test]
fn disabling_bounds_check_keeps_the_episode_alive() {
    let config = SimConfig {
        bounds_check: false,
        ..SimConfig::single()
    };
    let mut sim = EpisodeSimulation::new(config).unwrap();
    sim.place_cart(500.0);
    let outcome = sim.step(0.0);
    assert!(!outcome.done);
    assert!(outcome.reward > -1.0);
}

#[test]
fn axis_lock_zeroes_vertical_cart_velocity() {
    let config = SimConfig {
        rail: RailMode::AxisLock,
        ..SimConfig::single()
    };
    let mut sim = EpisodeSimulation::new(config).unwrap();
    sim.reset(Some(1.5));
    for _ in 0..30 {
        sim.step(0.5);
        assert_eq!(sim.cart_velocity().y, 0.0);
    }
}

#[test]
fn curriculum_interpolates_and_is_idempotent() {
    let mut sim = simulation(Some(100));
    let schedule = sim.config().curriculum;
    sim.progress_curriculum(0.0);
    assert_eq!(sim.gravity(), schedule.gravity.start);
    sim.progress_curriculum(1.0);
    assert_eq!(sim.gravity(), schedule.gravity.end);
    assert_eq!(sim.damping(), schedule.damping.end);

    sim.progress_curriculum(0.5);
    let (gravity, damping) = (sim.gravity(), sim.damping());
    assert!((gravity - 0.5 * (schedule.gravity.start + schedule.gravity.end)).abs() < 1e-9);
    sim.progress_curriculum(0.5);
    assert_eq!(sim.gravity(), gravity);
    assert_eq!(sim.damping(), damping);
    assert_eq!(sim.physics().params.gravity.y, gravity);
    assert_eq!(sim.physics().params.damping, damping);

    sim.progress_curriculum(7.0);
    assert_eq!(sim.progress(), 1.0);
}

#[test]
fn curriculum_moves_the_initial_angle_band() {
    let mut config = SimConfig {
        seed: Some(3),
        ..SimConfig::single()
    };
    config.curriculum.initial_angle = Some(AngleSchedule {
        start: AngleBand {
            low: PI - 0.1,
            high: PI + 0.1,
        },
        end: AngleBand {
            low: 0.0,
            high: 2.0 * PI,
        },
    });
    let mut sim = EpisodeSimulation::new(config).unwrap();
    for _ in 0..50 {
        sim.reset(None);
        let angle = sim.angles()[0];
        assert!((angle - PI).abs() <= 0.1 + 1e-9, "angle {angle} outside start band");
    }
    sim.progress_curriculum(1.0);
    let band = sim.angle_band().unwrap();
    assert_eq!(band.low, 0.0);
    assert!((band.high - 2.0 * PI).abs() < 1e-12);
    let spread = (0..200)
        .map(|_| {
            sim.reset(None);
            (sim.angles()[0] - PI).abs()
        })
        .fold(0.0_f64, f64::max);
    assert!(spread > 0.5, "band should have widened, max offset {spread}");
}

#[test]
fn explicit_reset_angle_beats_sampling() {
    let mut config = SimConfig::single();
    config.curriculum.initial_angle = Some(AngleSchedule {
        start: AngleBand { low: 3.0, high: 3.2 },
        end: AngleBand { low: 3.0, high: 3.2 },
    });
    let mut sim = EpisodeSimulation::new(config).unwrap();
    sim.reset(Some(0.5));
    assert!((sim.angles()[0] - 0.5).abs() < 1e-9);
}

#[test]
fn invalid_configs_refuse_to_build() {
    let mut config = SimConfig::single();
    config.links[0].length = -15.0;
    assert!(EpisodeSimulation::new(config).is_err());

    let mut config = SimConfig::single();
    config.curriculum.damping.end = 1.5;
    assert!(EpisodeSimulation::new(config).is_err());

    let config = SimConfig {
        frequency: 0.0,
        ..SimConfig::single()
    };
    assert!(EpisodeSimulation::new(config).is_err());
}

#[test]
fn cart_without_links_is_a_valid_chain() {
    let config = SimConfig {
        links: Vec::new(),
        reward: pendulum::RewardConfig {
            shaping: pendulum::RewardShaping::Survival,
            ..pendulum::RewardConfig::default()
        },
        ..SimConfig::single()
    };
    let mut sim = EpisodeSimulation::new(config).unwrap();
    assert_eq!(sim.obs_size(), 2);
    let outcome = sim.step(1.0);
    assert_eq!(outcome.observation.len(), 2);
    assert!((outcome.reward - 0.1).abs() < 1e-12);
}
