//! Reward shaping.
//!
//! Rewards are pure functions of the current observables. For bounded
//! episodes each step is divided by `max_step_reward`, chosen so that a
//! perfect episode (every link upright, cart centered and still) returns
//! exactly the configured target.

use crate::config::{MaxSteps, PenaltyMode, RewardConfig, RewardShaping, UprightShape};
use crate::error::PendulumError;

/// Out-of-bounds penalty per episode step when none is configured.
const DEFAULT_OUT_OF_BOUNDS_PER_STEP: f64 = -10.0;

/// Physical observables a reward is computed from.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardInputs<'a> {
    /// `upright()` of every link, cart-adjacent first.
    pub upright: &'a [f64],
    pub angular_velocity: &'a [f64],
    pub cart_x: f64,
    pub cart_velocity_x: f64,
    pub out_of_bounds: bool,
}

/// Maps `upright ∈ [-1, 1]` onto `[0, scale]`: `0` when hanging, `scale` when
/// upright, steeper near the top for higher powers.
#[must_use]
pub fn shaped_upright(upright: f64, scale: f64, shape: UprightShape) -> f64 {
    let normalized = (upright + 1.0) / 2.0;
    scale * normalized.powi(shape.power())
}

#[derive(Clone, Debug)]
pub struct RewardModel {
    shaping: RewardShaping,
    world_size: f64,
    max_step_reward: f64,
    out_of_bounds_penalty: f64,
}

impl RewardModel {
    /// # Errors
    ///
    /// Fails when the best-case step reward is not positive, which would make
    /// the normalization meaningless.
    pub fn new(
        config: &RewardConfig,
        world_size: f64,
        links: usize,
        max_steps: MaxSteps,
    ) -> Result<Self, PendulumError> {
        let mut model = Self {
            shaping: config.shaping,
            world_size,
            max_step_reward: 1.0,
            out_of_bounds_penalty: 0.0,
        };

        let upright = vec![1.0; links];
        let still = vec![0.0; links];
        let best_raw = model.raw(&RewardInputs {
            upright: &upright,
            angular_velocity: &still,
            cart_x: 0.0,
            cart_velocity_x: 0.0,
            out_of_bounds: false,
        });
        if !(best_raw.is_finite() && best_raw > 0.0) {
            return Err(PendulumError::config(format!(
                "best-case step reward must be > 0, got {best_raw}"
            )));
        }

        if let MaxSteps::Bounded(steps) = max_steps {
            model.max_step_reward = best_raw * f64::from(steps) / config.target_return;
        }
        model.out_of_bounds_penalty = match (config.out_of_bounds_penalty, max_steps) {
            (Some(penalty), _) => penalty,
            (None, MaxSteps::Bounded(steps)) => DEFAULT_OUT_OF_BOUNDS_PER_STEP * f64::from(steps),
            (None, MaxSteps::Unbounded) => {
                return Err(PendulumError::config(
                    "unbounded episodes need an explicit out_of_bounds_penalty",
                ))
            }
        };
        Ok(model)
    }

    /// Normalized step reward, or the out-of-bounds penalty verbatim.
    #[must_use]
    pub fn compute(&self, inputs: &RewardInputs<'_>) -> f64 {
        if inputs.out_of_bounds {
            return self.out_of_bounds_penalty;
        }
        self.raw(inputs) / self.max_step_reward
    }

    /// Unnormalized shaping terms.
    #[must_use]
    pub fn raw(&self, inputs: &RewardInputs<'_>) -> f64 {
        match self.shaping {
            RewardShaping::Survival => 1.0,
            RewardShaping::Shaped {
                upright_scale,
                shape,
                penalties,
                position_weight,
                velocity_weight,
            } => {
                let bonus: f64 = inputs
                    .upright
                    .iter()
                    .map(|&u| shaped_upright(u, upright_scale, shape))
                    .sum();
                let apply_penalties = match penalties {
                    PenaltyMode::Always => true,
                    PenaltyMode::Gated { bonus_threshold } => bonus > bonus_threshold,
                };
                if !apply_penalties {
                    return bonus;
                }
                let position_penalty = position_weight * inputs.cart_x.abs() / self.world_size;
                let spin: f64 = inputs.angular_velocity.iter().map(|w| w.abs()).sum();
                let velocity_penalty = velocity_weight * (spin + inputs.cart_velocity_x.abs());
                bonus - position_penalty - velocity_penalty
            }
        }
    }

    /// Divisor applied to raw rewards; `1` for unbounded episodes.
    #[must_use]
    pub fn max_step_reward(&self) -> f64 {
        self.max_step_reward
    }

    #[must_use]
    pub fn out_of_bounds_penalty(&self) -> f64 {
        self.out_of_bounds_penalty
    }

    /// Normalized reward of the idealized best-case state.
    #[must_use]
    pub fn best_step_reward(&self, links: usize) -> f64 {
        let upright = vec![1.0; links];
        let still = vec![0.0; links];
        self.compute(&RewardInputs {
            upright: &upright,
            angular_velocity: &still,
            cart_x: 0.0,
            cart_velocity_x: 0.0,
            out_of_bounds: false,
        })
    }
}
