use pendulum::PendulumError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RlError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("expected {expected} actions, got {got}")]
    ActionCount { expected: usize, got: usize },
    #[error("environment worker {0} disconnected")]
    WorkerDisconnected(usize),
    #[error("failed to spawn environment worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error(transparent)]
    Env(#[from] PendulumError),
}
