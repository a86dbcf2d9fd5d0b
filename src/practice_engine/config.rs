//! Per-activity configuration.
//!
//! An activity is one [`ProblemKind`] plus the thresholds that drive its
//! [`DifficultyController`](crate::practice_engine::difficulty::DifficultyController).
//! Thresholds differ between activities, so every kind ships its own defaults
//! and a host can override them from TOML:
//!
//! ```toml
//! kind = "QuotientPairSelection"
//! start_tier = 2
//!
//! [difficulty]
//! promote_after = 4
//! demote_after = 2
//!
//! [difficulty.rolling]
//! window = 4
//! demote_below = 0.4
//! promote_at = 0.75
//! ```
//!
//! A `[difficulty]` table replaces the kind's defaults; keys missing from it
//! take the generic [`DifficultyConfig::default`] values.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::practice_engine::{
    difficulty::{DifficultyConfig, RollingWindow},
    models::{ProblemKind, Tier},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tier range is empty: min {min} > max {max}")]
    InvalidTierRange { min: Tier, max: Tier },
    #[error("`{0}` must be at least 1")]
    ZeroThreshold(&'static str),
    #[error("`{name}` must be within [0, 1], got {value}")]
    AccuracyOutOfRange { name: &'static str, value: f64 },
    #[error("failed to parse activity config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub kind: ProblemKind,
    pub start_tier: Tier,
    pub difficulty: DifficultyConfig,
}

/// On-disk form; omitted sections fall back to the kind's defaults.
#[derive(Debug, Deserialize)]
struct ActivityFile {
    kind: ProblemKind,
    start_tier: Option<Tier>,
    difficulty: Option<DifficultyConfig>,
}

impl ActivityConfig {
    /// Defaults for `kind`, starting at the lowest tier.
    pub fn for_kind(kind: ProblemKind) -> Self {
        let difficulty = default_difficulty(kind);
        ActivityConfig { kind, start_tier: difficulty.min_tier, difficulty }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ActivityFile = toml::from_str(text)?;
        let mut config = ActivityConfig::for_kind(file.kind);
        if let Some(difficulty) = file.difficulty {
            config.difficulty = difficulty;
            config.start_tier = difficulty.min_tier;
        }
        if let Some(start_tier) = file.start_tier {
            config.start_tier = start_tier;
        }
        config.validate()?;
        info!(
            target: "math_drill_gen",
            kind = %config.kind,
            start_tier = config.start_tier,
            "loaded activity config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.difficulty.validate()
    }
}

/// Thresholds each kind ships with.
///
/// Selection tasks with several options use a rolling accuracy window because
/// a single slip is common; short numeric answers use plain streaks.
pub fn default_difficulty(kind: ProblemKind) -> DifficultyConfig {
    let streaks = |promote_after, demote_after| DifficultyConfig {
        promote_after,
        demote_after: Some(demote_after),
        ..DifficultyConfig::default()
    };
    match kind {
        ProblemKind::DecimalAddition           => streaks(3, 2),
        ProblemKind::DistributiveDecomposition => streaks(3, 2),
        ProblemKind::QuotientPairSelection => DifficultyConfig {
            promote_after: 4,
            demote_after: None,
            rolling: Some(RollingWindow { window: 4, demote_below: 0.4, promote_at: Some(0.75) }),
            ..DifficultyConfig::default()
        },
        ProblemKind::FractionToDecimal => DifficultyConfig {
            promote_after: 3,
            demote_after: Some(3),
            rolling: Some(RollingWindow { window: 5, demote_below: 0.5, promote_at: None }),
            ..DifficultyConfig::default()
        },
        ProblemKind::ShadedFraction            => streaks(3, 2),
        ProblemKind::SimplifyFraction          => streaks(4, 3),
        ProblemKind::FractionComparison        => streaks(4, 2),
        ProblemKind::RectangleDimensions       => streaks(3, 2),
        ProblemKind::TriangleMissingAngle      => streaks(3, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_kind_has_valid_defaults() {
        for kind in ProblemKind::ALL {
            let config = ActivityConfig::for_kind(kind);
            assert!(config.validate().is_ok(), "{kind:?} defaults are invalid");
            assert_eq!(config.start_tier, config.difficulty.min_tier);
        }
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = ActivityConfig::from_toml_str(
            r#"
            kind = "QuotientPairSelection"
            start_tier = 2

            [difficulty]
            max_tier = 4
            promote_after = 4
            demote_after = 2

            [difficulty.rolling]
            window = 4
            demote_below = 0.4
            promote_at = 0.75
            "#,
        )
        .unwrap();
        assert_eq!(config.kind, ProblemKind::QuotientPairSelection);
        assert_eq!(config.start_tier, 2);
        assert_eq!(
            config.difficulty,
            DifficultyConfig {
                min_tier: 1,
                max_tier: 4,
                promote_after: 4,
                demote_after: Some(2),
                rolling: Some(RollingWindow { window: 4, demote_below: 0.4, promote_at: Some(0.75) }),
            }
        );
    }

    #[test]
    fn kind_only_uses_kind_defaults() {
        let config = ActivityConfig::from_toml_str(r#"kind = "TriangleMissingAngle""#).unwrap();
        assert_eq!(config, ActivityConfig::for_kind(ProblemKind::TriangleMissingAngle));
    }

    #[test]
    fn bad_toml_and_bad_values_are_errors() {
        assert!(matches!(
            ActivityConfig::from_toml_str("kind = \"NoSuchKind\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ActivityConfig::from_toml_str("kind = \"DecimalAddition\"\n[difficulty]\npromote_after = 0"),
            Err(ConfigError::ZeroThreshold("promote_after"))
        ));
    }
}
