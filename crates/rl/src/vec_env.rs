//! Vectorized environments, one OS thread per worker.
//!
//! Each worker owns its environment and physics world outright and only
//! talks to the driver through a pair of channels. Step and reset commands
//! are answered in order; curriculum progress is fire-and-forget, so a worker
//! applies it before whatever command it receives next.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use pendulum::{CurriculumEnv, EpisodeInfo, PendulumError};
use tracing::{debug, warn};

use crate::curriculum::CurriculumTarget;
use crate::error::RlError;

/// One worker's answer to a step command.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Observation after the step, or the first observation of the next
    /// episode when `done` is set.
    pub observation: Vec<f32>,
    pub reward: f32,
    pub done: bool,
    /// Summary of the episode this step finished.
    pub episode: Option<EpisodeInfo>,
}

enum Command {
    Step(f32),
    Reset,
    Progress(f64),
    Shutdown,
}

enum Reply {
    Step(Transition),
    Reset(Vec<f32>),
}

struct Worker {
    commands: Sender<Command>,
    replies: Receiver<Reply>,
    handle: Option<JoinHandle<()>>,
}

pub struct VecEnv {
    workers: Vec<Worker>,
    obs_size: usize,
}

impl VecEnv {
    /// Build `num_envs` environments with `make_env(index)` and move each
    /// onto its own thread.
    ///
    /// # Errors
    ///
    /// Fails if `num_envs` is zero, an environment cannot be built, a
    /// thread cannot be spawned, or the environments disagree on their
    /// observation size.
    pub fn new<E, F>(num_envs: usize, make_env: F) -> Result<Self, RlError>
    where
        E: CurriculumEnv + Send + 'static,
        F: Fn(usize) -> Result<E, PendulumError>,
    {
        if num_envs == 0 {
            return Err(RlError::Config("need at least one environment".into()));
        }
        let mut workers = Vec::with_capacity(num_envs);
        let mut obs_size = None;
        for index in 0..num_envs {
            let env = make_env(index)?;
            let size = env.obs_size();
            if *obs_size.get_or_insert(size) != size {
                return Err(RlError::Config(format!(
                    "environment {index} has observation size {size}, expected {}",
                    obs_size.unwrap_or_default()
                )));
            }

            let (command_tx, command_rx) = crossbeam_channel::unbounded();
            let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
            let handle = thread::Builder::new()
                .name(format!("env-worker-{index}"))
                .spawn(move || run_worker(index, env, &command_rx, &reply_tx))?;
            workers.push(Worker {
                commands: command_tx,
                replies: reply_rx,
                handle: Some(handle),
            });
        }
        debug!(num_envs, "environment workers started");
        Ok(Self {
            workers,
            obs_size: obs_size.unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn num_envs(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn obs_size(&self) -> usize {
        self.obs_size
    }

    /// Reset every worker and collect the initial observations.
    ///
    /// # Errors
    ///
    /// Returns [`RlError::WorkerDisconnected`] if a worker thread has died.
    pub fn reset(&mut self) -> Result<Vec<Vec<f32>>, RlError> {
        self.broadcast(|| Command::Reset)?;
        self.workers
            .iter()
            .enumerate()
            .map(|(index, worker)| match worker.replies.recv() {
                Ok(Reply::Reset(obs)) => Ok(obs),
                _ => Err(RlError::WorkerDisconnected(index)),
            })
            .collect()
    }

    /// Step every worker with its own action. Workers whose episode ends
    /// reset themselves before replying.
    ///
    /// # Errors
    ///
    /// Fails if `actions` does not hold one action per worker or a worker
    /// thread has died.
    pub fn step(&mut self, actions: &[f32]) -> Result<Vec<Transition>, RlError> {
        if actions.len() != self.workers.len() {
            return Err(RlError::ActionCount {
                expected: self.workers.len(),
                got: actions.len(),
            });
        }
        for (index, (worker, &action)) in self.workers.iter().zip(actions).enumerate() {
            worker
                .commands
                .send(Command::Step(action))
                .map_err(|_| RlError::WorkerDisconnected(index))?;
        }
        self.workers
            .iter()
            .enumerate()
            .map(|(index, worker)| match worker.replies.recv() {
                Ok(Reply::Step(transition)) => Ok(transition),
                _ => Err(RlError::WorkerDisconnected(index)),
            })
            .collect()
    }

    fn broadcast(&self, command: impl Fn() -> Command) -> Result<(), RlError> {
        for (index, worker) in self.workers.iter().enumerate() {
            worker
                .commands
                .send(command())
                .map_err(|_| RlError::WorkerDisconnected(index))?;
        }
        Ok(())
    }
}

impl CurriculumTarget for VecEnv {
    fn broadcast_progress(&mut self, t: f64) {
        if let Err(e) = self.broadcast(|| Command::Progress(t)) {
            warn!("curriculum broadcast incomplete: {e}");
        }
    }
}

impl Drop for VecEnv {
    fn drop(&mut self) {
        for worker in &self.workers {
            let _ = worker.commands.send(Command::Shutdown);
        }
        for (index, worker) in self.workers.iter_mut().enumerate() {
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    warn!(index, "environment worker panicked");
                }
            }
        }
    }
}

fn run_worker<E: CurriculumEnv>(
    index: usize,
    mut env: E,
    commands: &Receiver<Command>,
    replies: &Sender<Reply>,
) {
    for command in commands {
        let reply = match command {
            Command::Step(action) => {
                let (mut observation, reward, done) = env.step(action);
                let episode = if done {
                    let info = env.take_finished_episode();
                    observation = env.reset();
                    info
                } else {
                    None
                };
                Reply::Step(Transition {
                    observation,
                    reward,
                    done,
                    episode,
                })
            }
            Command::Reset => Reply::Reset(env.reset()),
            Command::Progress(t) => {
                env.progress_curriculum(t);
                continue;
            }
            Command::Shutdown => break,
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
    debug!(index, "environment worker stopped");
}
