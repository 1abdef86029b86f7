//! Periodic rollout driver.
//!
//! Steps every worker once per iteration, reports finished episodes to the
//! curriculum controller and asks it after every iteration whether to go on.

use tracing::info;

use crate::curriculum::{CheckpointDecision, CurriculumConfig, CurriculumController};
use crate::error::RlError;
use crate::policy::Policy;
use crate::vec_env::VecEnv;

/// Episodes between progress log lines.
const LOG_EVERY_EPISODES: u64 = 100;

/// What a rollout run did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingSummary {
    /// Vectorized steps taken; each one steps every worker.
    pub steps: u64,
    pub episodes: u64,
    pub mean_return: Option<f64>,
    pub best_return: Option<f64>,
    pub curriculum_step: u32,
    pub progress: f64,
    /// Set when the controller asked to stop before the step budget ran out.
    pub stopped_early: bool,
}

pub struct Trainer<P: Policy> {
    envs: VecEnv,
    policy: P,
    controller: CurriculumController,
}

impl<P: Policy> Trainer<P> {
    /// # Errors
    ///
    /// Returns [`RlError::Config`] for an invalid curriculum configuration.
    pub fn new(envs: VecEnv, policy: P, curriculum: CurriculumConfig) -> Result<Self, RlError> {
        Ok(Self {
            envs,
            policy,
            controller: CurriculumController::new(curriculum)?,
        })
    }

    /// Run up to `total_steps` vectorized steps.
    ///
    /// # Errors
    ///
    /// Propagates worker failures.
    #[allow(clippy::cast_precision_loss)]
    pub fn run(&mut self, total_steps: u64) -> Result<TrainingSummary, RlError> {
        self.controller.on_training_start(&mut self.envs);
        let mut observations = self.envs.reset()?;
        let mut summary = TrainingSummary::default();
        let mut return_sum = 0.0;

        while summary.steps < total_steps {
            let actions: Vec<f32> = observations
                .iter()
                .map(|obs| self.policy.act(obs))
                .collect();
            let transitions = self.envs.step(&actions)?;
            summary.steps += 1;

            for (obs, transition) in observations.iter_mut().zip(transitions) {
                if let Some(episode) = transition.episode {
                    self.controller.on_episode_end(episode.reward);
                    summary.episodes += 1;
                    return_sum += episode.reward;
                    summary.best_return = Some(
                        summary
                            .best_return
                            .map_or(episode.reward, |best| best.max(episode.reward)),
                    );
                    if summary.episodes % LOG_EVERY_EPISODES == 0 {
                        info!(
                            episodes = summary.episodes,
                            mean_return = return_sum / summary.episodes as f64,
                            t = self.controller.progress(),
                            "rollout progress"
                        );
                    }
                }
                *obs = transition.observation;
            }

            if self.controller.on_checkpoint(&mut self.envs) == CheckpointDecision::Stop {
                summary.stopped_early = true;
                break;
            }
        }

        if summary.episodes > 0 {
            summary.mean_return = Some(return_sum / summary.episodes as f64);
        }
        summary.curriculum_step = self.controller.step();
        summary.progress = self.controller.progress();
        info!(?summary, "rollout finished");
        Ok(summary)
    }

    #[must_use]
    pub fn controller(&self) -> &CurriculumController {
        &self.controller
    }

    #[must_use]
    pub fn envs(&self) -> &VecEnv {
        &self.envs
    }
}
