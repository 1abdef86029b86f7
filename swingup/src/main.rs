//! # Swing-up Runtime
//!
//! Command-line entry point. Loads a simulation configuration, starts one
//! worker thread per environment and drives them through the curriculum with
//! a fixed policy.

mod app;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Policy used to pick actions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    Zero,
    Random,
    Energy,
}

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// JSON simulation config; built-in defaults when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of parallel environments.
    #[arg(long, default_value_t = 16)]
    pub envs: usize,

    /// Vectorized steps to run.
    #[arg(long, default_value_t = 100_000)]
    pub steps: u64,

    #[arg(long, value_enum, default_value_t = PolicyKind::Energy)]
    pub policy: PolicyKind,

    /// Base seed; worker `i` uses `seed + i`.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Links in the built-in preset used when no config is given.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    pub links: u8,

    /// Mean return needed to advance the curriculum.
    #[arg(long, default_value_t = 80.0)]
    pub progress_threshold: f64,

    /// Mean return needed to stop once the curriculum is done.
    #[arg(long, default_value_t = 80.0)]
    pub stop_threshold: f64,

    /// Number of curriculum steps.
    #[arg(long, default_value_t = 10)]
    pub curriculum_steps: u32,

    /// Finished episodes averaged per curriculum decision.
    #[arg(long, default_value_t = 2)]
    pub window: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    app::run(&Cli::parse())
}
