use anyhow::Result;
use pendulum::{CurriculumEnv, PendulumEnv};
use rl::{CheckpointDecision, CurriculumConfig, CurriculumController, CurriculumTarget};

#[derive(Default)]
struct Recorder {
    pushed: Vec<f64>,
}

impl CurriculumTarget for Recorder {
    fn broadcast_progress(&mut self, t: f64) {
        self.pushed.push(t);
    }
}

fn controller(n_episodes: usize, total_steps: u32) -> Result<CurriculumController> {
    Ok(CurriculumController::new(CurriculumConfig {
        progress_threshold: 80.0,
        stop_threshold: 90.0,
        total_steps,
        n_episodes,
    })?)
}

#[test]
fn training_start_pushes_zero() -> Result<()> {
    let mut c = controller(2, 10)?;
    let mut target = Recorder::default();
    c.on_training_start(&mut target);
    assert_eq!(target.pushed, vec![0.0]);
    Ok(())
}

#[test]
fn full_window_above_threshold_advances_once_and_clears() -> Result<()> {
    let mut c = controller(3, 10)?;
    let mut target = Recorder::default();
    for r in [80.0, 95.0, 120.0] {
        c.on_episode_end(r);
    }
    assert_eq!(c.on_checkpoint(&mut target), CheckpointDecision::Continue);
    assert_eq!(c.step(), 1);
    assert!((c.progress() - 0.1).abs() < 1e-12);
    assert_eq!(c.window_len(), 0);
    assert_eq!(target.pushed, vec![0.1]);

    // the cleared window needs refilling before anything else happens
    assert_eq!(c.on_checkpoint(&mut target), CheckpointDecision::Continue);
    assert_eq!(c.step(), 1);
    Ok(())
}

#[test]
fn partial_window_leaves_progress_alone() -> Result<()> {
    let mut c = controller(3, 10)?;
    let mut target = Recorder::default();
    c.on_episode_end(100.0);
    c.on_episode_end(100.0);
    assert_eq!(c.on_checkpoint(&mut target), CheckpointDecision::Continue);
    assert_eq!(c.progress(), 0.0);
    assert_eq!(c.window_len(), 2);
    assert!(target.pushed.is_empty());
    Ok(())
}

#[test]
fn mean_below_threshold_does_not_advance() -> Result<()> {
    let mut c = controller(2, 10)?;
    let mut target = Recorder::default();
    c.on_episode_end(100.0);
    c.on_episode_end(50.0);
    assert_eq!(c.on_checkpoint(&mut target), CheckpointDecision::Continue);
    assert_eq!(c.step(), 0);
    // [50, 90] still averages 70
    c.on_episode_end(90.0);
    assert_eq!(c.on_checkpoint(&mut target), CheckpointDecision::Continue);
    assert_eq!(c.step(), 0);
    assert_eq!(c.window_len(), 2);
    // the window slides, so a strong episode lifts [50, 120] to 85
    c.on_episode_end(120.0);
    assert_eq!(c.on_checkpoint(&mut target), CheckpointDecision::Continue);
    assert_eq!(c.step(), 1);
    assert_eq!(c.window_len(), 0);
    assert_eq!(target.pushed, vec![0.1]);
    Ok(())
}

#[test]
fn progress_is_monotone_for_arbitrary_returns() -> Result<()> {
    let mut rng = fastrand::Rng::with_seed(99);
    for n_episodes in 1..=4 {
        let mut c = controller(n_episodes, 5)?;
        let mut target = Recorder::default();
        let mut last = c.progress();
        for _ in 0..2_000 {
            c.on_episode_end(rng.f64() * 200.0 - 50.0);
            c.on_checkpoint(&mut target);
            assert!(c.progress() >= last);
            assert!(c.progress() <= 1.0);
            last = c.progress();
        }
        assert!(target.pushed.windows(2).all(|w| w[0] <= w[1]));
    }
    Ok(())
}

#[test]
fn stops_only_after_the_curriculum_is_exhausted() -> Result<()> {
    let mut c = controller(1, 2)?;
    let mut target = Recorder::default();

    c.on_episode_end(100.0);
    assert_eq!(c.on_checkpoint(&mut target), CheckpointDecision::Continue);
    c.on_episode_end(100.0);
    assert_eq!(c.on_checkpoint(&mut target), CheckpointDecision::Continue);
    assert!(c.is_exhausted());
    assert_eq!(target.pushed, vec![0.5, 1.0]);

    // exhausted but below the stop threshold
    c.on_episode_end(85.0);
    assert_eq!(c.on_checkpoint(&mut target), CheckpointDecision::Continue);

    c.on_episode_end(95.0);
    assert_eq!(c.on_checkpoint(&mut target), CheckpointDecision::Stop);
    assert_eq!(c.progress(), 1.0);
    assert_eq!(target.pushed.len(), 2);
    Ok(())
}

#[test]
fn environments_in_a_vec_receive_progress() -> Result<()> {
    let mut envs = vec![PendulumEnv::single()?, PendulumEnv::single()?];
    let mut c = controller(1, 4)?;
    c.on_training_start(&mut envs);
    c.on_episode_end(100.0);
    c.on_checkpoint(&mut envs);
    for env in &envs {
        assert!((env.simulation().progress() - 0.25).abs() < 1e-12);
    }
    assert!(envs.iter().all(|env| env.episode_reward() == 0.0));
    Ok(())
}
