#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Pendulum Episodes
//!
//! Episodic cart-pole environments for reinforcement learning. A cart slides
//! on a horizontal rail and carries a chain of pin-jointed links; the agent
//! pushes the cart with a single scalar action and is rewarded for swinging
//! the chain upright and keeping it there.
//!
//! ## Key Components
//!
//! -   [`RelativeJoint`] reads and resets the angle of one link relative to
//!     its parent body.
//! -   [`EpisodeSimulation`] owns the physics world and runs the
//!     reset/step state machine, including curriculum re-tuning.
//! -   [`RewardModel`] turns the physical state into a normalized reward.
//! -   [`AdaptiveAngle`] optionally widens a worker's initial-angle band as
//!     its own returns improve.
//! -   [`PendulumEnv`] exposes a simulation through the [`Env`] and
//!     [`CurriculumEnv`] traits.
//!
//! ## Usage
//!
//! ```rust
//! use pendulum::{Env, PendulumEnv};
//!
//! let mut env = PendulumEnv::single()?;
//! let obs = env.reset();
//! assert_eq!(obs.len(), env.obs_size());
//! let (_obs, reward, done) = env.step(0.5);
//! assert!(reward.is_finite());
//! assert!(!done);
//! # Ok::<(), pendulum::PendulumError>(())
//! ```

pub mod adaptive;
pub mod config;
pub mod env;
pub mod error;
pub mod joint;
pub mod reward;
pub mod simulation;

pub use adaptive::AdaptiveAngle;
pub use config::{
    AdaptiveAngleConfig, AngleBand, AngleSchedule, CartConfig, CurriculumSchedule, Lerp,
    LinkConfig, MaxSteps, ObservationLayout, PenaltyMode, RailMode, RewardConfig, RewardShaping,
    SimConfig, SolverConfig, UprightShape,
};
pub use env::{CurriculumEnv, Env, EpisodeInfo, PendulumEnv};
pub use error::PendulumError;
pub use joint::{JointState, RelativeJoint};
pub use reward::{shaped_upright, RewardInputs, RewardModel};
pub use simulation::{EpisodeSimulation, StepOutcome};
