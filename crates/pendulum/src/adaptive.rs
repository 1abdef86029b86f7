//! Per-worker initial-angle adaptation.
//!
//! Independent of the cross-worker curriculum: a single simulation widens
//! its sampling band around the upright pole as its own returns approach the
//! best achievable return. The baseline is the last finished episode only, so
//! the band can jump around when episodes end early; treat the schedule as a
//! tuning knob rather than a monotone one.

use std::f64::consts::PI;

use tracing::debug;

use crate::config::AdaptiveAngleConfig;

#[derive(Clone, Debug)]
pub struct AdaptiveAngle {
    config: AdaptiveAngleConfig,
    best_return: f64,
    half_width: f64,
    since_update: u32,
    last_return: Option<f64>,
}

impl AdaptiveAngle {
    /// `best_return` is the return of a perfect episode at the step bound.
    #[must_use]
    pub fn new(config: AdaptiveAngleConfig, best_return: f64) -> Self {
        Self {
            config,
            best_return,
            half_width: config.min_half_width,
            since_update: 0,
            last_return: None,
        }
    }

    /// Record a finished episode; every `every_episodes` calls the band is
    /// re-derived from this episode's return.
    pub fn record_episode(&mut self, total_reward: f64) {
        self.last_return = Some(total_reward);
        self.since_update += 1;
        if self.since_update < self.config.every_episodes {
            return;
        }
        self.since_update = 0;
        let performance = if self.best_return > 0.0 {
            (total_reward / self.best_return).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.half_width = self.config.min_half_width
            + performance * (self.config.max_half_width - self.config.min_half_width);
        debug!(
            total_reward,
            performance,
            half_width = self.half_width,
            "adaptive initial-angle band updated"
        );
    }

    /// Uniform draw from `[π - half_width, π + half_width]`.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        PI + (rng.f64() * 2.0 - 1.0) * self.half_width
    }

    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    #[must_use]
    pub fn last_return(&self) -> Option<f64> {
        self.last_return
    }
}
