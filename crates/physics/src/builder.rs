//! # Physics Simulation Builder
//!
//! Builder functions for adding bodies and constraints to the simulation.

use crate::error::PhysicsError;
use crate::types::{Body, BodyHandle, GrooveJoint, PinJoint, Vec2};
use crate::PhysicsSim;

/// Builder methods for adding rigid bodies to the simulation
impl PhysicsSim {
    /// Add a point mass at `pos`
    pub fn add_body(&mut self, pos: Vec2, mass: f64) -> BodyHandle {
        self.bodies.push(Body::new(pos, mass));
        BodyHandle(self.bodies.len() - 1)
    }

    /// Add a body that never rotates (infinite moment of inertia)
    pub fn add_body_with_infinite_moment(&mut self, pos: Vec2, mass: f64) -> BodyHandle {
        let handle = self.add_body(pos, mass);
        self.bodies[handle.0].infinite_moment = true;
        handle
    }
}

/// Builder methods for adding constraints
impl PhysicsSim {
    /// Pin two bodies together at their current distance.
    ///
    /// # Errors
    ///
    /// Fails if either handle is unknown or the bodies coincide.
    pub fn add_pin_joint(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
    ) -> Result<usize, PhysicsError> {
        let a = self.body(body_a)?.pos;
        let b = self.body(body_b)?.pos;
        let length = (b - a).length();
        if length <= f64::EPSILON {
            return Err(PhysicsError::DegenerateJoint(body_a, body_b));
        }
        self.pin_joints.push(PinJoint {
            body_a,
            body_b,
            length,
        });
        Ok(self.pin_joints.len() - 1)
    }

    /// Constrain `body` to slide along the horizontal line through its
    /// current position.
    ///
    /// # Errors
    ///
    /// Fails if the handle is unknown.
    pub fn add_groove_joint(&mut self, body: BodyHandle) -> Result<usize, PhysicsError> {
        let y = self.body(body)?.pos.y;
        self.groove_joints.push(GrooveJoint { body, y });
        Ok(self.groove_joints.len() - 1)
    }
}
