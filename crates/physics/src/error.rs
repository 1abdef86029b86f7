use thiserror::Error;

use crate::types::BodyHandle;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("unknown body handle {0:?}")]
    UnknownBody(BodyHandle),
    #[error("joint between {0:?} and {1:?} has zero length")]
    DegenerateJoint(BodyHandle, BodyHandle),
    #[error("invalid time step {0} (must be finite and > 0)")]
    InvalidTimeStep(f64),
}
