use physics::PhysicsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PendulumError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("physics error: {0}")]
    Physics(#[from] PhysicsError),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

impl PendulumError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
