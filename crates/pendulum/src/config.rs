//! Simulation configuration.
//!
//! Every tunable of an episode lives here and is passed to
//! [`crate::EpisodeSimulation::new`]; nothing is read from globals. Configs
//! load from JSON and are validated before a simulation is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PendulumError;

/// Episode length bound.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaxSteps {
    Bounded(u32),
    Unbounded,
}

impl MaxSteps {
    #[must_use]
    pub fn from_option(steps: Option<u32>) -> Self {
        steps.map_or(Self::Unbounded, Self::Bounded)
    }

    #[must_use]
    pub fn reached(self, steps: u32) -> bool {
        match self {
            Self::Bounded(max) => steps >= max,
            Self::Unbounded => false,
        }
    }

    #[must_use]
    pub fn bound(self) -> Option<u32> {
        match self {
            Self::Bounded(max) => Some(max),
            Self::Unbounded => None,
        }
    }
}

/// How the cart is kept on its horizontal rail.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RailMode {
    /// Native groove constraint in the physics engine.
    Groove,
    /// Zero the cart's vertical velocity after every physics advance.
    /// Gravity still moves the cart within each advance, so it sinks slowly
    /// until the next reset; relative link angles are unaffected.
    AxisLock,
}

/// Observation vector layout. Link entries come first, cart-adjacent link
/// first, followed by cart position and cart velocity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationLayout {
    /// `[θ, ω]` per link.
    Raw,
    /// `[sin θ, cos θ, ω]` per link.
    Trig,
}

impl ObservationLayout {
    #[must_use]
    pub fn per_link(self) -> usize {
        match self {
            Self::Raw => 2,
            Self::Trig => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    pub mass: f64,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self { mass: 1.0 }
    }
}

/// One pendulum link: a massive bob pinned `length` away from its parent.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub length: f64,
    pub mass: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            length: 15.0,
            mass: 0.1,
        }
    }
}

/// Linear interpolation between a start and end value.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lerp {
    pub start: f64,
    pub end: f64,
}

impl Lerp {
    #[must_use]
    pub const fn constant(value: f64) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    #[must_use]
    pub fn at(&self, t: f64) -> f64 {
        self.start + (self.end - self.start) * t
    }
}

/// Closed interval of initial angles, in radians (`0` = hanging).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleBand {
    pub low: f64,
    pub high: f64,
}

impl AngleBand {
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            low: self.low + (other.low - self.low) * t,
            high: self.high + (other.high - self.high) * t,
        }
    }

    #[must_use]
    pub fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        self.low + rng.f64() * (self.high - self.low)
    }

    fn validate(&self, field: &str) -> Result<(), PendulumError> {
        if !(self.low.is_finite() && self.high.is_finite()) {
            return Err(PendulumError::config(format!("{field} must be finite")));
        }
        if self.low > self.high {
            return Err(PendulumError::config(format!(
                "{field} is inverted: low {} > high {}",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Initial-angle band that moves with curriculum progress.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleSchedule {
    pub start: AngleBand,
    pub end: AngleBand,
}

impl AngleSchedule {
    #[must_use]
    pub fn at(&self, t: f64) -> AngleBand {
        self.start.lerp(&self.end, t)
    }
}

/// Parameters re-derived by `progress_curriculum(t)`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumSchedule {
    /// Gravity magnitude, pulling along +y.
    pub gravity: Lerp,
    /// Fraction of velocity kept per second.
    pub damping: Lerp,
    pub initial_angle: Option<AngleSchedule>,
}

impl Default for CurriculumSchedule {
    fn default() -> Self {
        Self {
            gravity: Lerp {
                start: 400.0,
                end: 981.0,
            },
            damping: Lerp {
                start: 0.8,
                end: 1.0,
            },
            initial_angle: None,
        }
    }
}

/// Per-worker initial-angle band driven by the worker's own returns.
///
/// The band is centered on the upright pole and its half-width grows with
/// `last_return / best_possible_return`, re-evaluated every
/// `every_episodes` episodes.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveAngleConfig {
    pub every_episodes: u32,
    pub min_half_width: f64,
    pub max_half_width: f64,
}

impl Default for AdaptiveAngleConfig {
    fn default() -> Self {
        Self {
            every_episodes: 5,
            min_half_width: 0.1,
            max_half_width: std::f64::consts::PI,
        }
    }
}

/// Curvature of the uprightness bonus.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UprightShape {
    Quadratic,
    Cubic,
}

impl UprightShape {
    #[must_use]
    pub fn power(self) -> i32 {
        match self {
            Self::Quadratic => 2,
            Self::Cubic => 3,
        }
    }
}

/// When position and velocity penalties apply.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PenaltyMode {
    Always,
    /// Only once the uprightness bonus exceeds `bonus_threshold`.
    Gated { bonus_threshold: f64 },
}

/// Per-step reward shaping strategy.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardShaping {
    Shaped {
        upright_scale: f64,
        shape: UprightShape,
        penalties: PenaltyMode,
        position_weight: f64,
        velocity_weight: f64,
    },
    /// `+1` for every step survived.
    Survival,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self::Shaped {
            upright_scale: 10.0,
            shape: UprightShape::Quadratic,
            penalties: PenaltyMode::Always,
            position_weight: 1.0,
            velocity_weight: 0.004,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub shaping: RewardShaping,
    /// Idealized return of a perfect bounded episode.
    pub target_return: f64,
    /// Reward returned when the cart leaves the world. Defaults to
    /// `-10 · max_steps`.
    pub out_of_bounds_penalty: Option<f64>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            shaping: RewardShaping::default(),
            target_return: 100.0,
            out_of_bounds_penalty: None,
        }
    }
}

/// Engine tuning knobs.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub substeps: usize,
    pub iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            substeps: 4,
            iterations: 8,
        }
    }
}

/// Main simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Half-width of the permitted cart range, in world units.
    pub world_size: f64,
    /// Control steps per second; `dt = 1 / frequency`.
    pub frequency: f64,
    /// `null` runs episodes without a step bound.
    pub max_steps: Option<u32>,
    /// Force per unit control per unit world size.
    pub force_scale: f64,
    /// End the episode when `|cart x| > world_size`.
    pub bounds_check: bool,
    pub rail: RailMode,
    pub cart: CartConfig,
    pub links: Vec<LinkConfig>,
    pub observation: ObservationLayout,
    pub initial_angle: f64,
    pub curriculum: CurriculumSchedule,
    pub adaptive_angle: Option<AdaptiveAngleConfig>,
    pub reward: RewardConfig,
    pub solver: SolverConfig,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_size: 100.0,
            frequency: 60.0,
            max_steps: Some(1000),
            force_scale: 10.0,
            bounds_check: true,
            rail: RailMode::Groove,
            cart: CartConfig::default(),
            links: vec![LinkConfig::default()],
            observation: ObservationLayout::Raw,
            initial_angle: 0.0,
            curriculum: CurriculumSchedule::default(),
            adaptive_angle: None,
            reward: RewardConfig::default(),
            solver: SolverConfig::default(),
            seed: None,
        }
    }
}

impl SimConfig {
    /// Single pendulum hanging from the cart.
    #[must_use]
    pub fn single() -> Self {
        Self::default()
    }

    /// Double pendulum with a trigonometric observation layout.
    #[must_use]
    pub fn double() -> Self {
        Self {
            links: vec![
                LinkConfig {
                    length: 12.0,
                    ..LinkConfig::default()
                },
                LinkConfig {
                    length: 12.0,
                    ..LinkConfig::default()
                },
            ],
            observation: ObservationLayout::Trig,
            reward: RewardConfig {
                shaping: RewardShaping::Shaped {
                    upright_scale: 10.0,
                    shape: UprightShape::Cubic,
                    penalties: PenaltyMode::Gated {
                        bonus_threshold: 10.0,
                    },
                    position_weight: 1.0,
                    velocity_weight: 0.004,
                },
                ..RewardConfig::default()
            },
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the config is invalid.
    pub fn from_json(json: &str) -> Result<Self, PendulumError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PendulumError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    #[must_use]
    pub fn max_steps(&self) -> MaxSteps {
        MaxSteps::from_option(self.max_steps)
    }

    #[must_use]
    pub fn obs_size(&self) -> usize {
        self.links.len() * self.observation.per_link() + 2
    }

    /// Reject physically inconsistent parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PendulumError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), PendulumError> {
        positive("world_size", self.world_size)?;
        positive("frequency", self.frequency)?;
        if self.max_steps == Some(0) {
            return Err(PendulumError::config("max_steps must be at least 1"));
        }
        non_negative("force_scale", self.force_scale)?;
        positive("cart.mass", self.cart.mass)?;
        for (i, link) in self.links.iter().enumerate() {
            positive(&format!("links[{i}].length"), link.length)?;
            positive(&format!("links[{i}].mass"), link.mass)?;
        }
        if !self.initial_angle.is_finite() {
            return Err(PendulumError::config("initial_angle must be finite"));
        }

        let schedule = &self.curriculum;
        non_negative("curriculum.gravity.start", schedule.gravity.start)?;
        non_negative("curriculum.gravity.end", schedule.gravity.end)?;
        unit_interval("curriculum.damping.start", schedule.damping.start)?;
        unit_interval("curriculum.damping.end", schedule.damping.end)?;
        if let Some(angles) = &schedule.initial_angle {
            angles.start.validate("curriculum.initial_angle.start")?;
            angles.end.validate("curriculum.initial_angle.end")?;
        }

        if let Some(adaptive) = &self.adaptive_angle {
            if adaptive.every_episodes == 0 {
                return Err(PendulumError::config(
                    "adaptive_angle.every_episodes must be at least 1",
                ));
            }
            non_negative("adaptive_angle.min_half_width", adaptive.min_half_width)?;
            non_negative("adaptive_angle.max_half_width", adaptive.max_half_width)?;
            if adaptive.min_half_width > adaptive.max_half_width {
                return Err(PendulumError::config(
                    "adaptive_angle half-widths are inverted",
                ));
            }
            if self.max_steps.is_none() {
                return Err(PendulumError::config(
                    "adaptive_angle requires a bounded max_steps",
                ));
            }
        }

        positive("reward.target_return", self.reward.target_return)?;
        if let RewardShaping::Shaped {
            upright_scale,
            penalties,
            position_weight,
            velocity_weight,
            ..
        } = self.reward.shaping
        {
            positive("reward.shaping.upright_scale", upright_scale)?;
            non_negative("reward.shaping.position_weight", position_weight)?;
            non_negative("reward.shaping.velocity_weight", velocity_weight)?;
            if let PenaltyMode::Gated { bonus_threshold } = penalties {
                non_negative("reward.shaping.bonus_threshold", bonus_threshold)?;
            }
        }
        if let Some(penalty) = self.reward.out_of_bounds_penalty {
            if !penalty.is_finite() {
                return Err(PendulumError::config(
                    "reward.out_of_bounds_penalty must be finite",
                ));
            }
        } else if self.bounds_check && self.max_steps.is_none() {
            return Err(PendulumError::config(
                "unbounded episodes with bounds_check need an explicit reward.out_of_bounds_penalty",
            ));
        }

        if self.solver.substeps == 0 || self.solver.iterations == 0 {
            return Err(PendulumError::config(
                "solver.substeps and solver.iterations must be at least 1",
            ));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), PendulumError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PendulumError::config(format!("{field} must be > 0, got {value}")))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), PendulumError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PendulumError::config(format!("{field} must be >= 0, got {value}")))
    }
}

fn unit_interval(field: &str, value: f64) -> Result<(), PendulumError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(PendulumError::config(format!("{field} must be in (0, 1], got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimConfig::single().validate().unwrap();
        SimConfig::double().validate().unwrap();
    }

    #[test]
    fn negative_length_is_rejected() {
        let mut config = SimConfig::default();
        config.links[0].length = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("links[0].length"));
    }

    #[test]
    fn inverted_angle_band_is_rejected() {
        let mut config = SimConfig::default();
        config.curriculum.initial_angle = Some(AngleSchedule {
            start: AngleBand { low: 3.0, high: 2.0 },
            end: AngleBand { low: 0.0, high: 6.0 },
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn unbounded_bounds_check_needs_explicit_penalty() {
        let mut config = SimConfig {
            max_steps: None,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
        config.reward.out_of_bounds_penalty = Some(-500.0);
        config.validate().unwrap();
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = SimConfig::from_json(
            r#"{
                "max_steps": 200,
                "links": [{ "length": 10.0 }, { "length": 8.0, "mass": 0.2 }],
                "observation": "trig",
                "reward": { "shaping": { "kind": "survival" } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_steps(), MaxSteps::Bounded(200));
        assert_eq!(config.links.len(), 2);
        assert!((config.links[0].mass - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.obs_size(), 8);
        assert_eq!(config.reward.shaping, RewardShaping::Survival);
        assert!((config.world_size - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shape_sizes_in_json_are_ignored() {
        let config = SimConfig::from_json(
            r#"{
                "cart": { "mass": 2.0, "radius": 3.0 },
                "links": [{ "length": 10.0, "radius": 1.5 }]
            }"#,
        )
        .unwrap();
        assert_eq!(config.cart, CartConfig { mass: 2.0 });
        assert_eq!(
            config.links,
            vec![LinkConfig {
                length: 10.0,
                mass: 0.1,
            }]
        );
    }

    #[test]
    fn null_max_steps_is_unbounded() {
        let config = SimConfig::from_json(
            r#"{ "max_steps": null, "bounds_check": false }"#,
        )
        .unwrap();
        assert_eq!(config.max_steps(), MaxSteps::Unbounded);
    }
}
