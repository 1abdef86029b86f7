use std::f64::consts::FRAC_PI_2;

use anyhow::Result;
use pendulum::{PendulumEnv, SimConfig};
use rl::{CurriculumTarget, RlError, VecEnv};

fn config(max_steps: u32, seed: u64) -> SimConfig {
    SimConfig {
        max_steps: Some(max_steps),
        seed: Some(seed),
        ..SimConfig::single()
    }
}

#[test]
fn reset_returns_one_observation_per_worker() -> Result<()> {
    let mut envs = VecEnv::new(3, |i| PendulumEnv::new(config(10, i as u64)))?;
    assert_eq!(envs.num_envs(), 3);
    assert_eq!(envs.obs_size(), 4);
    let obs = envs.reset()?;
    assert_eq!(obs.len(), 3);
    assert!(obs.iter().all(|o| o.len() == 4));
    Ok(())
}

#[test]
fn finished_workers_reset_themselves() -> Result<()> {
    let mut envs = VecEnv::new(2, |i| PendulumEnv::new(config(3, i as u64)))?;
    let initial = envs.reset()?;
    for _ in 0..2 {
        let transitions = envs.step(&[0.5, -0.5])?;
        assert!(transitions.iter().all(|t| !t.done && t.episode.is_none()));
    }
    let transitions = envs.step(&[0.5, -0.5])?;
    for (transition, start) in transitions.iter().zip(&initial) {
        assert!(transition.done);
        let episode = transition.episode.expect("finished episode");
        assert_eq!(episode.length, 3);
        assert_eq!(&transition.observation, start);
    }
    Ok(())
}

#[test]
fn action_count_must_match() -> Result<()> {
    let mut envs = VecEnv::new(2, |i| PendulumEnv::new(config(10, i as u64)))?;
    let err = envs.step(&[0.0]).unwrap_err();
    assert!(matches!(
        err,
        RlError::ActionCount {
            expected: 2,
            got: 1
        }
    ));
    Ok(())
}

#[test]
fn zero_workers_is_a_config_error() {
    let result = VecEnv::new(0, |_| PendulumEnv::single());
    assert!(matches!(result, Err(RlError::Config(_))));
}

#[test]
fn construction_errors_propagate() {
    let result = VecEnv::new(2, |_| {
        let mut config = SimConfig::single();
        config.links[0].length = -1.0;
        PendulumEnv::new(config)
    });
    assert!(matches!(result, Err(RlError::Env(_))));
}

#[test]
fn progress_broadcast_reaches_workers_before_their_next_step() -> Result<()> {
    let sideways = || {
        PendulumEnv::new(SimConfig {
            initial_angle: FRAC_PI_2,
            ..config(100, 1)
        })
    };

    let mut easy = VecEnv::new(1, |_| sideways())?;
    easy.broadcast_progress(0.0);
    easy.reset()?;
    let easy_rate = easy.step(&[0.0])?[0].observation[1].abs();

    let mut hard = VecEnv::new(1, |_| sideways())?;
    hard.broadcast_progress(1.0);
    hard.reset()?;
    let hard_rate = hard.step(&[0.0])?[0].observation[1].abs();

    assert!(hard_rate > easy_rate, "{hard_rate} <= {easy_rate}");
    Ok(())
}
