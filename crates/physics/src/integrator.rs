//! # Physics Integration
//!
//! Semi-implicit Euler integration of point masses, plus the post-solve
//! velocity update and damping.

use crate::types::{Body, Vec2};

/// Advance velocities then positions by `h`. Returns the positions before the
/// update so the solver can re-derive velocities afterwards.
pub fn integrate_bodies(bodies: &mut [Body], gravity: Vec2, h: f64) -> Vec<Vec2> {
    bodies
        .iter_mut()
        .map(|body| {
            let prev = body.pos;
            let inv_mass = body.inv_mass();
            if inv_mass > 0.0 {
                body.vel += (gravity + body.force * inv_mass) * h;
            }
            body.pos += body.vel * h;
            if body.infinite_moment {
                body.angular_vel = 0.0;
            }
            prev
        })
        .collect()
}

/// Replace velocities of dynamic bodies with their projected displacement
/// over `h`, then apply damping.
pub fn update_velocities(bodies: &mut [Body], prev: &[Vec2], damping: f64, h: f64) {
    let factor = damping.powf(h);
    for (body, &prev_pos) in bodies.iter_mut().zip(prev) {
        if body.inv_mass() == 0.0 {
            continue;
        }
        body.vel = (body.pos - prev_pos) / h;
        body.vel *= factor;
        body.angular_vel *= factor;
    }
}

/// Clear accumulated forces after a full step.
pub fn clear_forces(bodies: &mut [Body]) {
    for body in bodies {
        body.force = Vec2::ZERO;
    }
}
