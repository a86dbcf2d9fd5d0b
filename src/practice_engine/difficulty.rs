//! Tier state machine.
//!
//! States are the tiers `min_tier..=max_tier`. Each recorded result can fire
//! at most one transition:
//!
//! | Rule | Fires when | Effect |
//! |------|------------|--------|
//! | Promotion | `promote_after` correct in a row | tier + 1 |
//! | Demotion | `demote_after` wrong in a row | tier - 1 |
//! | Rolling window | every `window` attempts, accuracy below `demote_below` (or at least `promote_at`) | tier - 1 (or + 1) |
//!
//! Any transition resets both streaks and the rolling window. The tier is
//! clamped to its bounds; a rule firing at a bound resets the counters but
//! reports no change.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::practice_engine::{config::ConfigError, models::Tier};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Accuracy check over a fixed number of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingWindow {
    pub window: u32,
    pub demote_below: f64,
    #[serde(default)]
    pub promote_at: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    pub min_tier: Tier,
    pub max_tier: Tier,
    /// Correct answers in a row needed to move up.
    pub promote_after: u32,
    /// Wrong answers in a row that move down; `None` disables the rule.
    pub demote_after: Option<u32>,
    pub rolling: Option<RollingWindow>,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        DifficultyConfig {
            min_tier: 1,
            max_tier: 3,
            promote_after: 3,
            demote_after: Some(2),
            rolling: None,
        }
    }
}

impl DifficultyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_tier > self.max_tier {
            return Err(ConfigError::InvalidTierRange { min: self.min_tier, max: self.max_tier });
        }
        if self.promote_after == 0 {
            return Err(ConfigError::ZeroThreshold("promote_after"));
        }
        if self.demote_after == Some(0) {
            return Err(ConfigError::ZeroThreshold("demote_after"));
        }
        if let Some(rolling) = self.rolling {
            if rolling.window == 0 {
                return Err(ConfigError::ZeroThreshold("rolling.window"));
            }
            check_accuracy("rolling.demote_below", rolling.demote_below)?;
            if let Some(promote_at) = rolling.promote_at {
                check_accuracy("rolling.promote_at", promote_at)?;
            }
        }
        Ok(())
    }

    pub fn clamp(&self, tier: Tier) -> Tier {
        tier.clamp(self.min_tier, self.max_tier)
    }
}

fn check_accuracy(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::AccuracyOutOfRange { name, value })
    }
}

// ---------------------------------------------------------------------------
// State and transitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyState {
    pub tier: Tier,
    pub consecutive_correct: u32,
    pub consecutive_wrong: u32,
    pub total_attempts: u32,
    pub total_correct: u32,
    pub window_attempts: u32,
    pub window_correct: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up   => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierChange {
    pub direction: Direction,
    pub from: Tier,
    pub to: Tier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub attempts: u32,
    pub correct: u32,
}

impl Stats {
    /// Fraction correct, `0.0` before the first attempt.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.attempts)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyController {
    config: DifficultyConfig,
    state: DifficultyState,
}

impl DifficultyController {
    /// Start at `start_tier`, clamped into the configured range.
    pub fn new(config: DifficultyConfig, start_tier: Tier) -> Result<Self, ConfigError> {
        Self::from_state(config, DifficultyState { tier: start_tier, ..DifficultyState::default() })
    }

    /// Resume from a previously persisted state. The tier is re-clamped in
    /// case the bounds changed since it was saved.
    pub fn from_state(config: DifficultyConfig, mut state: DifficultyState) -> Result<Self, ConfigError> {
        config.validate()?;
        state.tier = config.clamp(state.tier);
        Ok(DifficultyController { config, state })
    }

    pub fn current_tier(&self) -> Tier {
        self.state.tier
    }

    pub fn state(&self) -> &DifficultyState {
        &self.state
    }

    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    pub fn stats(&self) -> Stats {
        Stats { attempts: self.state.total_attempts, correct: self.state.total_correct }
    }

    /// Record one answer and apply at most one transition.
    pub fn record_result(&mut self, correct: bool) -> Option<TierChange> {
        let s = &mut self.state;
        s.total_attempts += 1;
        s.window_attempts += 1;
        if correct {
            s.total_correct += 1;
            s.window_correct += 1;
            s.consecutive_correct += 1;
            s.consecutive_wrong = 0;
        } else {
            s.consecutive_wrong += 1;
            s.consecutive_correct = 0;
        }

        let streak_rule = if correct && s.consecutive_correct >= self.config.promote_after {
            Some(Direction::Up)
        } else if !correct && self.config.demote_after.is_some_and(|m| s.consecutive_wrong >= m) {
            Some(Direction::Down)
        } else {
            None
        };

        let decision = streak_rule.or_else(|| self.evaluate_window());
        decision.and_then(|direction| self.transition(direction))
    }

    fn evaluate_window(&mut self) -> Option<Direction> {
        let rolling = self.config.rolling?;
        let s = &mut self.state;
        if s.window_attempts < rolling.window {
            return None;
        }
        let accuracy = f64::from(s.window_correct) / f64::from(s.window_attempts);
        s.window_attempts = 0;
        s.window_correct = 0;

        if accuracy < rolling.demote_below {
            Some(Direction::Down)
        } else if rolling.promote_at.is_some_and(|p| accuracy >= p) {
            Some(Direction::Up)
        } else {
            None
        }
    }

    fn transition(&mut self, direction: Direction) -> Option<TierChange> {
        let s = &mut self.state;
        s.consecutive_correct = 0;
        s.consecutive_wrong = 0;
        s.window_attempts = 0;
        s.window_correct = 0;

        let from = s.tier;
        let to = match direction {
            Direction::Up   => from.saturating_add(1).min(self.config.max_tier),
            Direction::Down => from.saturating_sub(1).max(self.config.min_tier),
        };
        if to == from {
            return None;
        }
        s.tier = to;
        info!(target: "math_drill_gen", %direction, from, to, "tier changed");
        Some(TierChange { direction, from, to })
    }
}
