#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Curriculum Rollouts
//!
//! Drives many pendulum environments in parallel while a single
//! [`CurriculumController`] watches finished episodes and raises the
//! difficulty of every worker at once.
//!
//! ## Key Components
//!
//! -   [`CurriculumController`] keeps a rolling window of episode returns and
//!     decides when to advance the curriculum and when to stop.
//! -   [`VecEnv`] runs one environment per OS thread and talks to the workers
//!     over channels. Curriculum progress is pushed to workers without
//!     waiting for a reply.
//! -   [`Trainer`] is the periodic driver that connects a [`Policy`], the
//!     workers and the controller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pendulum::{PendulumEnv, SimConfig};
//! use rl::{CurriculumConfig, Trainer, VecEnv, ZeroPolicy};
//!
//! let envs = VecEnv::new(4, |_| PendulumEnv::new(SimConfig::single()))?;
//! let mut trainer = Trainer::new(envs, ZeroPolicy, CurriculumConfig::default())?;
//! let summary = trainer.run(1_000)?;
//! println!("{summary:?}");
//! # Ok::<(), rl::RlError>(())
//! ```

pub mod curriculum;
pub mod error;
pub mod policy;
pub mod trainer;
pub mod vec_env;

pub use curriculum::{
    CheckpointDecision, CurriculumConfig, CurriculumController, CurriculumTarget,
};
pub use error::RlError;
pub use policy::{EnergyPolicy, Policy, RandomPolicy, ZeroPolicy};
pub use trainer::{Trainer, TrainingSummary};
pub use vec_env::{Transition, VecEnv};
