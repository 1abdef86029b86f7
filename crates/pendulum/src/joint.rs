//! Relative kinematics between a pinned parent body and its satellite.
//!
//! The physics engine keeps the two bodies `length` apart; this module only
//! reads and resets their relative state. Angles follow the pendulum
//! convention:
//!
//! - `0`    => satellite directly below the primary
//! - `π/2`  => to the right
//! - `π`    => directly above (upright)
//! - `3π/2` => to the left

use std::f64::consts::TAU;

use physics::{BodyHandle, PhysicsSim, Vec2};

use crate::error::PendulumError;

/// Snapshot of a joint's relative state.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct JointState {
    pub angle: f64,
    pub angular_velocity: f64,
}

/// Satellite body orbiting a primary at a fixed distance.
///
/// Holds handles into a [`PhysicsSim`] owned elsewhere. Every accessor takes
/// that simulation and panics if the handles do not belong to it.
#[derive(Clone, Debug)]
pub struct RelativeJoint {
    primary: BodyHandle,
    satellite: BodyHandle,
    length: f64,
    cached: JointState,
}

impl RelativeJoint {
    /// # Errors
    ///
    /// Returns [`PendulumError::Config`] unless `length` is finite and positive.
    pub fn new(
        primary: BodyHandle,
        satellite: BodyHandle,
        length: f64,
    ) -> Result<Self, PendulumError> {
        if !(length.is_finite() && length > 0.0) {
            return Err(PendulumError::config(format!(
                "joint length must be > 0, got {length}"
            )));
        }
        Ok(Self {
            primary,
            satellite,
            length,
            cached: JointState::default(),
        })
    }

    #[must_use]
    pub fn primary(&self) -> BodyHandle {
        self.primary
    }

    #[must_use]
    pub fn satellite(&self) -> BodyHandle {
        self.satellite
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    fn relative_position(&self, sim: &PhysicsSim) -> Vec2 {
        sim.bodies[self.satellite.0].pos - sim.bodies[self.primary.0].pos
    }

    /// Angle from primary to satellite in `[0, 2π)`.
    #[must_use]
    pub fn relative_angle(&self, sim: &PhysicsSim) -> f64 {
        let delta = self.relative_position(sim);
        let angle = delta.x.atan2(delta.y).rem_euclid(TAU);
        // rem_euclid can round up to exactly 2π for tiny negative inputs
        if angle >= TAU {
            0.0
        } else {
            angle
        }
    }

    /// `(r × v) / |r|²`, or `0` when the bodies coincide.
    #[must_use]
    pub fn relative_angular_velocity(&self, sim: &PhysicsSim) -> f64 {
        let r = self.relative_position(sim);
        let v = sim.bodies[self.satellite.0].vel - sim.bodies[self.primary.0].vel;
        let r_squared = r.length_squared();
        if r_squared == 0.0 {
            return 0.0;
        }
        r.cross(v) / r_squared
    }

    /// `1` when upright, `-1` when hanging.
    #[must_use]
    pub fn upright(&self, sim: &PhysicsSim) -> f64 {
        -self.relative_angle(sim).cos()
    }

    /// Place the satellite at `angle` around the primary and stop it.
    pub fn reset(&self, sim: &mut PhysicsSim, angle: f64) {
        let origin = sim.bodies[self.primary.0].pos;
        let satellite = &mut sim.bodies[self.satellite.0];
        satellite.pos = origin + Vec2::new(0.0, self.length).rotated(-angle);
        satellite.vel = Vec2::ZERO;
        satellite.angular_vel = 0.0;
    }

    /// Re-derive the cached relative state. Bookkeeping only.
    pub fn refresh(&mut self, sim: &PhysicsSim) -> JointState {
        self.cached = JointState {
            angle: self.relative_angle(sim),
            angular_velocity: self.relative_angular_velocity(sim),
        };
        self.cached
    }

    /// State as of the last [`RelativeJoint::refresh`].
    #[must_use]
    pub fn cached(&self) -> JointState {
        self.cached
    }
}
