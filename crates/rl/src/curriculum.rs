//! Cross-worker curriculum control.
//!
//! The controller only ever sees episode returns. Once its window holds
//! `n_episodes` returns it compares their mean against two thresholds: one to
//! advance the curriculum a notch, one to stop training after the last notch.
//! Both decisions are one-way; `t` never goes back down.

use std::collections::VecDeque;

use pendulum::CurriculumEnv;
use tracing::{debug, info};

use crate::error::RlError;

/// Anything that can receive a curriculum progress broadcast.
pub trait CurriculumTarget {
    /// Push progress `t ∈ [0, 1]` to every worker.
    fn broadcast_progress(&mut self, t: f64);
}

impl<E: CurriculumEnv> CurriculumTarget for [E] {
    fn broadcast_progress(&mut self, t: f64) {
        for env in self {
            env.progress_curriculum(t);
        }
    }
}

impl<E: CurriculumEnv> CurriculumTarget for Vec<E> {
    fn broadcast_progress(&mut self, t: f64) {
        self.as_mut_slice().broadcast_progress(t);
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CurriculumConfig {
    /// Mean return needed to advance one curriculum step.
    pub progress_threshold: f64,
    /// Mean return needed to stop once the curriculum is exhausted.
    pub stop_threshold: f64,
    /// Number of discrete curriculum steps between `t = 0` and `t = 1`.
    pub total_steps: u32,
    /// Window size, in finished episodes.
    pub n_episodes: usize,
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        Self {
            progress_threshold: 80.0,
            stop_threshold: 80.0,
            total_steps: 10,
            n_episodes: 2,
        }
    }
}

/// Outcome of [`CurriculumController::on_checkpoint`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CheckpointDecision {
    Continue,
    Stop,
}

#[derive(Clone, Debug)]
pub struct CurriculumController {
    config: CurriculumConfig,
    window: VecDeque<f64>,
    step: u32,
}

impl CurriculumController {
    /// # Errors
    ///
    /// Returns [`RlError::Config`] when `total_steps` or `n_episodes` is zero
    /// or a threshold is not finite.
    pub fn new(config: CurriculumConfig) -> Result<Self, RlError> {
        if config.total_steps == 0 {
            return Err(RlError::Config("curriculum total_steps must be at least 1".into()));
        }
        if config.n_episodes == 0 {
            return Err(RlError::Config("curriculum n_episodes must be at least 1".into()));
        }
        if !(config.progress_threshold.is_finite() && config.stop_threshold.is_finite()) {
            return Err(RlError::Config("curriculum thresholds must be finite".into()));
        }
        Ok(Self {
            window: VecDeque::with_capacity(config.n_episodes),
            config,
            step: 0,
        })
    }

    /// Put every worker at the start of the curriculum.
    pub fn on_training_start<T: CurriculumTarget + ?Sized>(&mut self, target: &mut T) {
        info!(
            total_steps = self.config.total_steps,
            n_episodes = self.config.n_episodes,
            "curriculum starting"
        );
        target.broadcast_progress(self.progress());
    }

    /// Record the return of a finished episode. The oldest return is evicted
    /// once the window is full.
    pub fn on_episode_end(&mut self, reward: f64) {
        if self.window.len() == self.config.n_episodes {
            self.window.pop_front();
        }
        self.window.push_back(reward);
    }

    /// Evaluate the window, advancing the curriculum or signalling a stop.
    pub fn on_checkpoint<T: CurriculumTarget + ?Sized>(
        &mut self,
        target: &mut T,
    ) -> CheckpointDecision {
        let Some(mean) = self.window_mean() else {
            return CheckpointDecision::Continue;
        };

        let exhausted = self.is_exhausted();
        if !exhausted && mean >= self.config.progress_threshold {
            self.step += 1;
            self.window.clear();
            let t = self.progress();
            info!(step = self.step, t, mean, "curriculum advanced");
            target.broadcast_progress(t);
        }

        if exhausted && mean >= self.config.stop_threshold {
            info!(mean, "curriculum finished and threshold reached, stopping");
            return CheckpointDecision::Stop;
        }
        debug!(mean, step = self.step, "curriculum checkpoint");
        CheckpointDecision::Continue
    }

    /// Mean of the window, once it holds `n_episodes` returns.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn window_mean(&self) -> Option<f64> {
        if self.window.len() < self.config.n_episodes {
            return None;
        }
        Some(self.window.iter().sum::<f64>() / self.window.len() as f64)
    }

    /// Current `t = step / total_steps`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        f64::from(self.step) / f64::from(self.config.total_steps)
    }

    #[must_use]
    pub fn step(&self) -> u32 {
        self.step
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.step >= self.config.total_steps
    }

    #[must_use]
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    #[must_use]
    pub fn config(&self) -> &CurriculumConfig {
        &self.config
    }
}
