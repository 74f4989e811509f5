//! Round configuration shared by the world, systems and adapters.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::SAFE_ZONE_WIDTH;

const DEFAULT_COLUMNS: u32 = 8;
const DEFAULT_LAYERS: u32 = 5;
const DEFAULT_BULLETS: u32 = 20;
const DEFAULT_HOSTAGES: u32 = 5;
const DEFAULT_SPAWN_INTERVAL_MS: u64 = 1_000;
const DEFAULT_SPAWN_DELAY_MS: u64 = 1_000;
const DEFAULT_TICK_MS: u64 = 20;

/// Smallest column count that leaves room for a safe zone plus its exit column.
pub const MIN_COLUMNS: u32 = SAFE_ZONE_WIDTH + 1;

/// Smallest layer count that lets the spawner alternate layers.
pub const MIN_LAYERS: u32 = 2;

/// Tunable parameters of a single round.
///
/// Every field falls back to the original game's value when omitted from a
/// configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoundConfig {
    /// Number of terrain columns per layer.
    pub columns: u32,
    /// Number of stacked terrain layers.
    pub layers: u32,
    /// Bullets available to the player.
    pub bullets: u32,
    /// Hostages that must be saved or killed before the round ends.
    pub hostages: u32,
    /// Milliseconds between two spawn decisions.
    pub spawn_interval_ms: u64,
    /// Milliseconds before the first spawn decision.
    pub spawn_delay_ms: u64,
    /// Length of a fixed simulation tick in milliseconds.
    pub tick_ms: u64,
    /// Seed for terrain and spawn randomness; fresh entropy when absent.
    pub seed: Option<u64>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            layers: DEFAULT_LAYERS,
            bullets: DEFAULT_BULLETS,
            hostages: DEFAULT_HOSTAGES,
            spawn_interval_ms: DEFAULT_SPAWN_INTERVAL_MS,
            spawn_delay_ms: DEFAULT_SPAWN_DELAY_MS,
            tick_ms: DEFAULT_TICK_MS,
            seed: None,
        }
    }
}

impl RoundConfig {
    /// Rejects configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dimensions(self.columns, self.layers)?;
        if self.bullets == 0 {
            return Err(ConfigError::NoBullets);
        }
        if self.hostages == 0 {
            return Err(ConfigError::NoHostages);
        }
        if self.spawn_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "spawn_interval_ms",
            });
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroDuration { field: "tick_ms" });
        }
        Ok(())
    }

    /// Time between two spawn decisions.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Time before the first spawn decision.
    #[must_use]
    pub fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }

    /// Length of a fixed simulation tick.
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Validates map dimensions against [`MIN_COLUMNS`] and [`MIN_LAYERS`].
pub fn check_dimensions(columns: u32, layers: u32) -> Result<(), ConfigError> {
    if columns < MIN_COLUMNS {
        return Err(ConfigError::TooFewColumns {
            columns,
            minimum: MIN_COLUMNS,
        });
    }
    if layers < MIN_LAYERS {
        return Err(ConfigError::TooFewLayers {
            layers,
            minimum: MIN_LAYERS,
        });
    }
    Ok(())
}

/// Reasons a round configuration is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The map is too narrow to hold a safe zone.
    #[error("map needs at least {minimum} columns (received {columns})")]
    TooFewColumns {
        /// Requested column count.
        columns: u32,
        /// Smallest accepted column count.
        minimum: u32,
    },
    /// The map has too few layers for spawns to alternate.
    #[error("map needs at least {minimum} layers (received {layers})")]
    TooFewLayers {
        /// Requested layer count.
        layers: u32,
        /// Smallest accepted layer count.
        minimum: u32,
    },
    /// The round would start with an empty magazine.
    #[error("round must start with at least one bullet")]
    NoBullets,
    /// The round would end before any hostage appears.
    #[error("round must start with at least one hostage")]
    NoHostages,
    /// A duration that drives a timer is zero.
    #[error("`{field}` must be greater than zero")]
    ZeroDuration {
        /// Name of the offending configuration field.
        field: &'static str,
    },
}
