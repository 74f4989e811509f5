//! Loading of run settings from a TOML file and command-line overrides.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use hostage_rescue_core::RoundConfig;
use serde::Deserialize;

const DEFAULT_TICKS: u64 = 3_000;

/// Headless run parameters that sit next to the round configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionSettings {
    /// Number of fixed ticks to simulate.
    pub(crate) ticks: u64,
    /// Fire at the lowest-numbered walking enemy every N ticks.
    pub(crate) shoot_every: Option<u32>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ticks: DEFAULT_TICKS,
            shoot_every: None,
        }
    }
}

/// Complete contents of a settings file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Round parameters handed to the world and systems.
    pub(crate) round: RoundConfig,
    /// Parameters of the headless driver.
    pub(crate) session: SessionSettings,
}

/// Values supplied on the command line that take precedence over the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) ticks: Option<u64>,
    pub(crate) columns: Option<u32>,
    pub(crate) layers: Option<u32>,
    pub(crate) shoot_every: Option<u32>,
}

impl Settings {
    /// Reads settings from `path`, or starts from defaults when no file is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid settings file at {}", path.display()))
    }

    /// Parses settings from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings toml contents")
    }

    /// Applies command-line overrides and validates the result.
    pub(crate) fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(seed) = overrides.seed {
            self.round.seed = Some(seed);
        }
        if let Some(columns) = overrides.columns {
            self.round.columns = columns;
        }
        if let Some(layers) = overrides.layers {
            self.round.layers = layers;
        }
        if let Some(ticks) = overrides.ticks {
            self.session.ticks = ticks;
        }
        if let Some(every) = overrides.shoot_every {
            self.session.shoot_every = Some(every);
        }
        if self.session.shoot_every == Some(0) {
            anyhow::bail!("`shoot_every` must be greater than zero");
        }
        self.round
            .validate()
            .context("round configuration rejected")?;
        Ok(self)
    }
}
