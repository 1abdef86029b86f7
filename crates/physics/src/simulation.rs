//! # Physics Simulation Core
//!
//! Main simulation container. A step integrates bodies, projects joint
//! constraints and re-derives velocities from the projected motion.

use crate::error::PhysicsError;
use crate::integrator::{clear_forces, integrate_bodies, update_velocities};
use crate::types::{Body, BodyHandle, GrooveJoint, PhysParams, PinJoint, Vec2};

/// Below this separation a pin joint has no usable direction.
const MIN_JOINT_SEPARATION: f64 = 1e-9;

/// Main physics simulation container
#[derive(Clone, Debug, Default)]
pub struct PhysicsSim {
    pub bodies: Vec<Body>,
    pub params: PhysParams,
    pub pin_joints: Vec<PinJoint>,
    pub groove_joints: Vec<GrooveJoint>,
}

impl PhysicsSim {
    /// Create a new empty simulation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a stale handle.
    pub fn body(&self, handle: BodyHandle) -> Result<&Body, PhysicsError> {
        self.bodies
            .get(handle.0)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a stale handle.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body, PhysicsError> {
        self.bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a stale handle.
    pub fn set_position(&mut self, handle: BodyHandle, pos: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.pos = pos;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a stale handle.
    pub fn set_velocity(&mut self, handle: BodyHandle, vel: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.vel = vel;
        Ok(())
    }

    /// Add `force` to the body's accumulator for the next step.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a stale handle.
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.force += force;
        Ok(())
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.params.gravity = gravity;
    }

    pub fn set_damping(&mut self, damping: f64) {
        self.params.damping = damping;
    }

    /// Advance the world by `dt` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidTimeStep`] when `dt` is not a positive
    /// finite number.
    pub fn step(&mut self, dt: f64) -> Result<(), PhysicsError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PhysicsError::InvalidTimeStep(dt));
        }
        let substeps = self.params.substeps.max(1);
        #[allow(clippy::cast_precision_loss)]
        let h = dt / substeps as f64;

        for _ in 0..substeps {
            // 1. Apply forces and integrate positions
            let prev = integrate_bodies(&mut self.bodies, self.params.gravity, h);

            // 2. Project constraints
            self.solve_constraints();

            // 3. Velocities follow the corrected positions
            update_velocities(&mut self.bodies, &prev, self.params.damping, h);
        }

        clear_forces(&mut self.bodies);
        Ok(())
    }

    /// Run simulation for multiple steps
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`PhysicsSim::step`].
    pub fn run(&mut self, dt: f64, steps: usize) -> Result<(), PhysicsError> {
        for _ in 0..steps {
            self.step(dt)?;
        }
        Ok(())
    }

    /// Per-axis inverse mass; grooved bodies cannot be moved vertically.
    fn axis_inv_masses(&self) -> Vec<Vec2> {
        let mut weights: Vec<Vec2> = self
            .bodies
            .iter()
            .map(|b| {
                let w = b.inv_mass();
                Vec2::new(w, w)
            })
            .collect();
        for groove in &self.groove_joints {
            if let Some(w) = weights.get_mut(groove.body.0) {
                w.y = 0.0;
            }
        }
        weights
    }

    fn solve_constraints(&mut self) {
        let weights = self.axis_inv_masses();
        for _ in 0..self.params.iterations.max(1) {
            for joint in &self.pin_joints {
                solve_distance_constraint(&mut self.bodies, &weights, joint);
            }
            for groove in &self.groove_joints {
                if let Some(body) = self.bodies.get_mut(groove.body.0) {
                    body.pos.y = groove.y;
                }
            }
        }
    }
}

/// Mass-weighted projection of a single distance constraint.
fn solve_distance_constraint(bodies: &mut [Body], weights: &[Vec2], joint: &PinJoint) {
    let (a, b) = (joint.body_a.0, joint.body_b.0);
    if a == b || a >= bodies.len() || b >= bodies.len() {
        return;
    }
    let delta = bodies[b].pos - bodies[a].pos;
    let current_length = delta.length();
    if current_length < MIN_JOINT_SEPARATION {
        return;
    }
    let n = delta / current_length;
    let wa = weights[a].scale(n);
    let wb = weights[b].scale(n);
    let w = n.dot(wa) + n.dot(wb);
    if w <= 0.0 {
        return;
    }
    let lambda = (current_length - joint.length) / w;
    bodies[a].pos += wa * lambda;
    bodies[b].pos -= wb * lambda;
}
