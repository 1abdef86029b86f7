//! # Rollout Orchestration
//!
//! Turns parsed command-line options into a configured set of workers and a
//! [`Trainer`], then runs it and reports the summary.

use anyhow::{Context, Result};
use pendulum::{PendulumEnv, SimConfig};
use rl::{
    CurriculumConfig, EnergyPolicy, Policy, RandomPolicy, Trainer, TrainingSummary, VecEnv,
    ZeroPolicy,
};
use tracing::info;

use crate::{Cli, PolicyKind};

/// Run a curriculum rollout as described by `cli`.
///
/// # Errors
///
/// Returns configuration, I/O and worker errors.
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    info!(
        links = config.links.len(),
        envs = cli.envs,
        steps = cli.steps,
        policy = ?cli.policy,
        "starting rollout"
    );

    let base_seed = cli.seed.or(config.seed);
    let worker_config = config.clone();
    let envs = VecEnv::new(cli.envs, move |i| {
        let mut config = worker_config.clone();
        config.seed = base_seed.map(|seed| seed.wrapping_add(i as u64));
        PendulumEnv::new(config)
    })
    .context("failed to start environment workers")?;

    let curriculum = CurriculumConfig {
        progress_threshold: cli.progress_threshold,
        stop_threshold: cli.stop_threshold,
        total_steps: cli.curriculum_steps,
        n_episodes: cli.window,
    };

    let summary = match cli.policy {
        PolicyKind::Zero => train(envs, ZeroPolicy, curriculum, cli.steps)?,
        PolicyKind::Random => train(envs, RandomPolicy::new(base_seed), curriculum, cli.steps)?,
        PolicyKind::Energy => {
            let gravity = config.curriculum.gravity.end;
            train(envs, EnergyPolicy::new(&config, gravity), curriculum, cli.steps)?
        }
    };

    info!(
        steps = summary.steps,
        episodes = summary.episodes,
        mean_return = summary.mean_return.unwrap_or(f64::NAN),
        best_return = summary.best_return.unwrap_or(f64::NAN),
        t = summary.progress,
        stopped_early = summary.stopped_early,
        "done"
    );
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    match &cli.config {
        Some(path) => SimConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None if cli.links == 2 => Ok(SimConfig::double()),
        None => Ok(SimConfig::single()),
    }
}

fn train<P: Policy>(
    envs: VecEnv,
    policy: P,
    curriculum: CurriculumConfig,
    steps: u64,
) -> Result<TrainingSummary> {
    let mut trainer = Trainer::new(envs, policy, curriculum)?;
    Ok(trainer.run(steps)?)
}
