//! Reinforcement learning environment interface.
//!
//! [`Env`] is the step/reset contract a training loop drives.
//! [`PendulumEnv`] adapts an [`EpisodeSimulation`] to it: a single scalar
//! action in, `f32` observations and rewards out.

use crate::config::SimConfig;
use crate::error::PendulumError;
use crate::simulation::EpisodeSimulation;

/// Reinforcement learning environment trait.
///
/// Inspired by classic frameworks like OpenAI Gym, this trait defines the core
/// interface an environment must provide. Each call to [`step`] advances the
/// simulation by one action and returns the new observation vector, a reward
/// signal, and whether the episode has terminated.
///
/// [`step`]: Env::step
pub trait Env {
    /// Advance the environment by one action.
    ///
    /// Returns `(obs, reward, done)` where `obs` is the new observation vector,
    /// `reward` is the scalar reward, and `done` indicates episode termination.
    fn step(&mut self, action: f32) -> (Vec<f32>, f32, bool);

    /// Reset the environment to its starting state and return the initial
    /// observation vector.
    fn reset(&mut self) -> Vec<f32>;

    /// Size of the observation vector.
    fn obs_size(&self) -> usize;

    /// Size of the action space.
    fn action_size(&self) -> usize;
}

/// Summary of a finished episode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EpisodeInfo {
    /// Undiscounted return.
    pub reward: f64,
    pub length: u32,
}

/// Environment whose difficulty follows a curriculum.
pub trait CurriculumEnv: Env {
    /// Apply curriculum progress `t ∈ [0, 1]`.
    fn progress_curriculum(&mut self, t: f64);

    /// Running return of the current episode.
    fn episode_reward(&self) -> f64;

    /// Summary of the episode that ended on the last `done` step, if any.
    /// Cleared by the call.
    fn take_finished_episode(&mut self) -> Option<EpisodeInfo>;
}

pub struct PendulumEnv {
    sim: EpisodeSimulation,
    finished: Option<EpisodeInfo>,
}

impl PendulumEnv {
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(config: SimConfig) -> Result<Self, PendulumError> {
        Ok(Self::from_simulation(EpisodeSimulation::new(config)?))
    }

    #[must_use]
    pub fn from_simulation(sim: EpisodeSimulation) -> Self {
        Self {
            sim,
            finished: None,
        }
    }

    /// Single pendulum on a cart.
    ///
    /// # Errors
    ///
    /// Propagates construction errors.
    pub fn single() -> Result<Self, PendulumError> {
        Self::new(SimConfig::single())
    }

    /// Double pendulum on a cart.
    ///
    /// # Errors
    ///
    /// Propagates construction errors.
    pub fn double() -> Result<Self, PendulumError> {
        Self::new(SimConfig::double())
    }

    /// Reset with every link at `angle`, for manual and debug use.
    pub fn reset_with_angle(&mut self, angle: f64) -> Vec<f32> {
        self.finished = None;
        to_f32(&self.sim.reset(Some(angle)))
    }

    #[must_use]
    pub fn simulation(&self) -> &EpisodeSimulation {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut EpisodeSimulation {
        &mut self.sim
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_f32(values: &[f64]) -> Vec<f32> {
    values.iter().map(|&v| v as f32).collect()
}

impl Env for PendulumEnv {
    #[allow(clippy::cast_possible_truncation)]
    fn step(&mut self, action: f32) -> (Vec<f32>, f32, bool) {
        let outcome = self.sim.step(f64::from(action));
        if outcome.done {
            self.finished = Some(EpisodeInfo {
                reward: self.sim.episode_reward(),
                length: self.sim.steps(),
            });
        }
        (to_f32(&outcome.observation), outcome.reward as f32, outcome.done)
    }

    fn reset(&mut self) -> Vec<f32> {
        self.finished = None;
        to_f32(&self.sim.reset(None))
    }

    fn obs_size(&self) -> usize {
        self.sim.obs_size()
    }

    fn action_size(&self) -> usize {
        1
    }
}

impl CurriculumEnv for PendulumEnv {
    fn progress_curriculum(&mut self, t: f64) {
        self.sim.progress_curriculum(t);
    }

    fn episode_reward(&self) -> f64 {
        self.sim.episode_reward()
    }

    fn take_finished_episode(&mut self) -> Option<EpisodeInfo> {
        self.finished.take()
    }
}
