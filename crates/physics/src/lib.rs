#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Swing-up Physics Engine
//!
//! A minimal 2D point-mass engine backing the pendulum environments.
//!
//! The engine offers exactly what a cart with a chain of pendulum links
//! needs: bodies with mass (optionally non-rotating), external forces,
//! gravity, global velocity damping, distance ("pin") joints and a
//! horizontal groove joint for the cart rail.
//!
//! ## Key Components
//!
//! -   **Bodies:** [`Body`] point masses addressed through [`BodyHandle`].
//! -   **Constraints:** [`PinJoint`] and [`GrooveJoint`], solved by
//!     mass-weighted position projection.
//! -   **Simulation:** [`PhysicsSim`] owns every body and joint and advances
//!     them with [`PhysicsSim::step`].
//!
//! ## Usage
//!
//! ```rust
//! use physics::{PhysicsSim, Vec2};
//!
//! let mut sim = PhysicsSim::new();
//! let cart = sim.add_body_with_infinite_moment(Vec2::ZERO, 1.0);
//! let bob = sim.add_body(Vec2::new(0.0, 15.0), 0.1);
//! sim.add_pin_joint(cart, bob)?;
//! sim.add_groove_joint(cart)?;
//! sim.run(1.0 / 60.0, 10)?;
//! # Ok::<(), physics::PhysicsError>(())
//! ```

pub mod builder;
pub mod error;
pub mod integrator;
pub mod simulation;
pub mod types;

pub use error::PhysicsError;
pub use simulation::PhysicsSim;
pub use types::{Body, BodyHandle, GrooveJoint, PhysParams, PinJoint, Vec2};
