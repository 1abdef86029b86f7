//! Fixed policies for driving rollouts without a learner.

use pendulum::{ObservationLayout, SimConfig};

/// Maps one worker's observation to a scalar action in `[-1, 1]`.
pub trait Policy {
    fn act(&mut self, observation: &[f32]) -> f32;
}

/// Never pushes the cart.
#[derive(Copy, Clone, Debug, Default)]
pub struct ZeroPolicy;

impl Policy for ZeroPolicy {
    fn act(&mut self, _observation: &[f32]) -> f32 {
        0.0
    }
}

/// Uniformly random pushes.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    rng: fastrand::Rng,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &[f32]) -> f32 {
        self.rng.f32() * 2.0 - 1.0
    }
}

/// Energy-pumping swing-up controller for the cart-adjacent link.
///
/// Pushes the cart so that the link gains energy until it has enough to
/// reach the upright pole, with a weak pull back towards the center of the
/// rail.
#[derive(Copy, Clone, Debug)]
pub struct EnergyPolicy {
    gravity: f64,
    length: f64,
    layout: ObservationLayout,
    links: usize,
    /// Action per unit of normalized energy deficit.
    pub gain: f64,
    /// Largest push the controller issues for energy pumping.
    pub max_push: f64,
    /// Action per world unit of cart offset.
    pub centering: f64,
}

impl EnergyPolicy {
    /// Tune for `config` at the given gravity. Configurations without links
    /// get a policy that only centers the cart.
    #[must_use]
    pub fn new(config: &SimConfig, gravity: f64) -> Self {
        Self {
            gravity,
            length: config.links.first().map_or(1.0, |link| link.length),
            layout: config.observation,
            links: config.links.len(),
            gain: 1.0,
            max_push: 0.25,
            centering: 0.002,
        }
    }

    /// Angle and angular velocity of the first link.
    fn first_link(&self, observation: &[f32]) -> Option<(f64, f64)> {
        if self.links == 0 {
            return None;
        }
        match self.layout {
            ObservationLayout::Raw => Some((
                f64::from(*observation.first()?),
                f64::from(*observation.get(1)?),
            )),
            ObservationLayout::Trig => {
                let sin = f64::from(*observation.first()?);
                let cos = f64::from(*observation.get(1)?);
                Some((sin.atan2(cos), f64::from(*observation.get(2)?)))
            }
        }
    }
}

impl Policy for EnergyPolicy {
    #[allow(clippy::cast_possible_truncation)]
    fn act(&mut self, observation: &[f32]) -> f32 {
        let cart_x = observation
            .len()
            .checked_sub(2)
            .and_then(|i| observation.get(i))
            .map_or(0.0, |&x| f64::from(x));
        let center = -self.centering * cart_x;

        let Some((angle, rate)) = self.first_link(observation) else {
            return center.clamp(-1.0, 1.0) as f32;
        };

        // energy per unit mass, zero potential at the pivot height
        let target = self.gravity * self.length;
        let energy = 0.5 * (self.length * rate).powi(2) - target * angle.cos();
        let deficit = (target - energy) / target.max(f64::EPSILON);

        // cart acceleration feeds the link at a rate proportional to cos(θ)·ω
        let pump = angle.cos() * rate;
        let direction = if pump == 0.0 { 1.0 } else { pump.signum() };
        let push = (self.gain * deficit * direction).clamp(-self.max_push, self.max_push);
        (push + center).clamp(-1.0, 1.0) as f32
    }
}
