//! Episode state machine for a cart carrying a chain of pendulum links.
//!
//! One [`EpisodeSimulation`] lives for the whole lifetime of a rollout
//! worker. `reset` starts an episode, `step` advances it by one control
//! step, and `progress_curriculum` re-tunes gravity, damping and the
//! initial-angle distribution between (or during) episodes.

use physics::{BodyHandle, PhysParams, PhysicsSim, Vec2};
use tracing::{debug, error};

use crate::adaptive::AdaptiveAngle;
use crate::config::{AngleBand, MaxSteps, ObservationLayout, RailMode, SimConfig};
use crate::error::PendulumError;
use crate::joint::RelativeJoint;
use crate::reward::{RewardInputs, RewardModel};

/// Result of a single control step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub observation: Vec<f64>,
    pub reward: f64,
    pub done: bool,
}

pub struct EpisodeSimulation {
    config: SimConfig,
    physics: PhysicsSim,
    cart: BodyHandle,
    joints: Vec<RelativeJoint>,
    reward: RewardModel,
    max_steps: MaxSteps,
    dt: f64,
    steps: u32,
    episode_reward: f64,
    episodes: u64,
    progress: f64,
    gravity: f64,
    damping: f64,
    angle_band: Option<AngleBand>,
    adaptive: Option<AdaptiveAngle>,
    rng: fastrand::Rng,
}

impl EpisodeSimulation {
    /// Build the cart, its link chain and the reward model, then reset.
    ///
    /// # Errors
    ///
    /// Returns [`PendulumError::Config`] for physically inconsistent
    /// parameters.
    pub fn new(config: SimConfig) -> Result<Self, PendulumError> {
        config.validate()?;
        let max_steps = config.max_steps();

        let mut physics = PhysicsSim::new();
        physics.params = PhysParams {
            substeps: config.solver.substeps,
            iterations: config.solver.iterations,
            ..PhysParams::default()
        };

        let cart = physics.add_body_with_infinite_moment(Vec2::ZERO, config.cart.mass);
        let mut joints = Vec::with_capacity(config.links.len());
        let mut primary = cart;
        let mut anchor = Vec2::ZERO;
        for link in &config.links {
            anchor += Vec2::new(0.0, link.length);
            let satellite = physics.add_body(anchor, link.mass);
            physics.add_pin_joint(primary, satellite)?;
            joints.push(RelativeJoint::new(primary, satellite, link.length)?);
            primary = satellite;
        }
        if config.rail == RailMode::Groove {
            physics.add_groove_joint(cart)?;
        }

        let reward = RewardModel::new(
            &config.reward,
            config.world_size,
            config.links.len(),
            max_steps,
        )?;
        let adaptive = match (config.adaptive_angle, max_steps) {
            (Some(adaptive), MaxSteps::Bounded(steps)) => {
                let best_return = reward.best_step_reward(config.links.len()) * f64::from(steps);
                Some(AdaptiveAngle::new(adaptive, best_return))
            }
            _ => None,
        };
        let rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

        let mut sim = Self {
            dt: 1.0 / config.frequency,
            physics,
            cart,
            joints,
            reward,
            max_steps,
            steps: 0,
            episode_reward: 0.0,
            episodes: 0,
            progress: 0.0,
            gravity: 0.0,
            damping: 1.0,
            angle_band: None,
            adaptive,
            rng,
            config,
        };
        sim.progress_curriculum(0.0);
        sim.reset(None);
        Ok(sim)
    }

    /// Advance one control step with `control ∈ [-1, 1]`.
    ///
    /// Out-of-range controls are clamped and `NaN` is treated as no push.
    pub fn step(&mut self, control: f64) -> StepOutcome {
        let control = if control.is_nan() {
            0.0
        } else {
            control.clamp(-1.0, 1.0)
        };
        let force = control * self.config.force_scale * self.config.world_size;
        self.physics.bodies[self.cart.0].force += Vec2::new(force, 0.0);

        for joint in &mut self.joints {
            joint.refresh(&self.physics);
        }
        if let Err(e) = self.physics.step(self.dt) {
            error!("physics step failed: {e}");
        }
        if self.config.rail == RailMode::AxisLock {
            self.physics.bodies[self.cart.0].vel.y = 0.0;
        }

        self.steps = self.steps.saturating_add(1);
        let done = self.max_steps.reached(self.steps) || self.is_out_of_bounds();
        let reward = self.current_reward();
        self.episode_reward += reward;

        StepOutcome {
            observation: self.observation(),
            reward,
            done,
        }
    }

    /// Start a new episode with every link at `angle`, or at a sampled angle
    /// when `None`.
    pub fn reset(&mut self, angle: Option<f64>) -> Vec<f64> {
        if self.steps > 0 {
            self.episodes += 1;
            if let Some(adaptive) = self.adaptive.as_mut() {
                adaptive.record_episode(self.episode_reward);
            }
        }
        let angle = angle.unwrap_or_else(|| self.sample_initial_angle());

        self.steps = 0;
        self.episode_reward = 0.0;

        let cart = &mut self.physics.bodies[self.cart.0];
        cart.pos = Vec2::ZERO;
        cart.vel = Vec2::ZERO;
        cart.angular_vel = 0.0;
        cart.force = Vec2::ZERO;
        for joint in &mut self.joints {
            joint.reset(&mut self.physics, angle);
            joint.refresh(&self.physics);
        }
        self.observation()
    }

    fn sample_initial_angle(&mut self) -> f64 {
        if let Some(adaptive) = &self.adaptive {
            return adaptive.sample(&mut self.rng);
        }
        if let Some(band) = &self.angle_band {
            return band.sample(&mut self.rng);
        }
        self.config.initial_angle
    }

    /// Re-derive curriculum-controlled parameters at progress `t ∈ [0, 1]`.
    pub fn progress_curriculum(&mut self, t: f64) {
        if t.is_nan() {
            error!("ignoring NaN curriculum progress");
            return;
        }
        let t = t.clamp(0.0, 1.0);
        let schedule = &self.config.curriculum;
        self.progress = t;
        self.gravity = schedule.gravity.at(t);
        self.damping = schedule.damping.at(t);
        self.angle_band = schedule.initial_angle.map(|angles| angles.at(t));
        self.physics.set_gravity(Vec2::new(0.0, self.gravity));
        self.physics.set_damping(self.damping);
        debug!(
            t,
            gravity = self.gravity,
            damping = self.damping,
            "curriculum progressed"
        );
    }

    /// Fixed-length observation for the configured layout.
    #[must_use]
    pub fn observation(&self) -> Vec<f64> {
        let mut obs = Vec::with_capacity(self.obs_size());
        for joint in &self.joints {
            let angle = joint.relative_angle(&self.physics);
            let rate = joint.relative_angular_velocity(&self.physics);
            match self.config.observation {
                ObservationLayout::Raw => obs.extend([angle, rate]),
                ObservationLayout::Trig => obs.extend([angle.sin(), angle.cos(), rate]),
            }
        }
        obs.push(self.cart_x());
        obs.push(self.cart_velocity_x());
        obs
    }

    /// Reward of the current state, as `step` would report it.
    #[must_use]
    pub fn current_reward(&self) -> f64 {
        let upright: Vec<f64> = self
            .joints
            .iter()
            .map(|j| j.upright(&self.physics))
            .collect();
        let spin = self.angular_velocities();
        self.reward.compute(&RewardInputs {
            upright: &upright,
            angular_velocity: &spin,
            cart_x: self.cart_x(),
            cart_velocity_x: self.cart_velocity_x(),
            out_of_bounds: self.is_out_of_bounds(),
        })
    }

    #[must_use]
    pub fn is_out_of_bounds(&self) -> bool {
        self.config.bounds_check && self.cart_x().abs() > self.config.world_size
    }

    /// Slide the cart, and the chain hanging from it, to `x`.
    pub fn place_cart(&mut self, x: f64) {
        let shift = Vec2::new(x - self.cart_x(), 0.0);
        self.physics.bodies[self.cart.0].pos += shift;
        for joint in &self.joints {
            self.physics.bodies[joint.satellite().0].pos += shift;
        }
    }

    /// Drive the cart at a fixed speed, for manual control.
    pub fn manually_move(&mut self, direction: f64) {
        let speed = self.config.world_size / 5.0;
        self.physics.bodies[self.cart.0].vel = Vec2::new(direction.clamp(-1.0, 1.0) * speed, 0.0);
    }

    #[must_use]
    pub fn cart_x(&self) -> f64 {
        self.physics.bodies[self.cart.0].pos.x
    }

    #[must_use]
    pub fn cart_velocity_x(&self) -> f64 {
        self.physics.bodies[self.cart.0].vel.x
    }

    #[must_use]
    pub fn cart_velocity(&self) -> Vec2 {
        self.physics.bodies[self.cart.0].vel
    }

    #[must_use]
    pub fn angles(&self) -> Vec<f64> {
        self.joints
            .iter()
            .map(|j| j.relative_angle(&self.physics))
            .collect()
    }

    #[must_use]
    pub fn angular_velocities(&self) -> Vec<f64> {
        self.joints
            .iter()
            .map(|j| j.relative_angular_velocity(&self.physics))
            .collect()
    }

    #[must_use]
    pub fn joints(&self) -> &[RelativeJoint] {
        &self.joints
    }

    #[must_use]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    #[must_use]
    pub fn episode_reward(&self) -> f64 {
        self.episode_reward
    }

    /// Episodes finished or abandoned since construction.
    #[must_use]
    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    #[must_use]
    pub fn max_steps(&self) -> MaxSteps {
        self.max_steps
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    #[must_use]
    pub fn angle_band(&self) -> Option<AngleBand> {
        self.angle_band
    }

    #[must_use]
    pub fn adaptive_angle(&self) -> Option<&AdaptiveAngle> {
        self.adaptive.as_ref()
    }

    #[must_use]
    pub fn obs_size(&self) -> usize {
        self.config.obs_size()
    }

    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn reward_model(&self) -> &RewardModel {
        &self.reward
    }

    #[must_use]
    pub fn physics(&self) -> &PhysicsSim {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsSim {
        &mut self.physics
    }
}
