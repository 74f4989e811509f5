#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural terrain generation for stacked, ramp-connected layers.
//!
//! Each layer is resolved left to right against the layer beneath it. Column
//! levels never jump by more than one, every level change receives a ramp, and
//! a window of [`SAFE_ZONE_WIDTH`] columns per layer is kept free of ramps.

use hostage_rescue_core::{
    check_dimensions, walking_height, Block, BlockKind, ColumnHeightModel, Command, ConfigError,
    Event, LayerIndex, Ramp, RampId, RampOrientation, TerrainLayout, TerrainType, MAX_LEVEL,
    SAFE_ZONE_WIDTH,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

const TERRAIN_REROLL_ODDS: u32 = 5;

/// Ramp bookkeeping carried while scanning a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    Free,
    RampPlaced,
    Forced,
}

/// Pure system that builds terrain layouts from a seeded random source.
#[derive(Debug)]
pub struct TerrainGeneration {
    rng: ChaCha8Rng,
}

impl TerrainGeneration {
    /// Creates a generator whose maps are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a generator seeded from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Reinstalls terrain whenever the round restarts.
    pub fn handle(&mut self, events: &[Event], columns: u32, layers: u32, out: &mut Vec<Command>) {
        for event in events {
            if !matches!(event, Event::RoundRestarted) {
                continue;
            }
            match self.generate(columns, layers) {
                Ok(layout) => out.push(Command::InstallTerrain {
                    layout: Box::new(layout),
                }),
                Err(error) => warn!(%error, "terrain regeneration skipped"),
            }
        }
    }

    /// Generates a complete map of `layers` stacked layers of `columns` columns.
    pub fn generate(&mut self, columns: u32, layers: u32) -> Result<TerrainLayout, ConfigError> {
        check_dimensions(columns, layers)?;

        let width = columns as usize;
        let mut heights = ColumnHeightModel::new(columns, layers);
        let mut blocks = Vec::new();
        let mut ramps = Vec::new();
        let mut spawn_coordinates = Vec::with_capacity(layers as usize);

        let mut terrain: Vec<TerrainType> = (0..width).map(|_| self.random_terrain()).collect();
        let mut below = vec![0_u8; width];

        for layer in (0..layers).map(LayerIndex::new) {
            let levels = self.resolve_levels(layer, &below);

            for column in 0..width {
                if self.rng.gen_ratio(1, TERRAIN_REROLL_ODDS) {
                    terrain[column] = self.random_terrain();
                }
            }

            for column in 0..width {
                let level = levels[column];
                let surface = Block {
                    column: column as u32,
                    layer,
                    level,
                    terrain: terrain[column],
                    kind: BlockKind::Surface,
                };
                blocks.push(surface);
                let gap = i16::from(level) - i16::from(below[column]);
                if gap > 1 || (layer.get() == 0 && level > 0) {
                    blocks.push(Block {
                        kind: BlockKind::Filler,
                        ..surface
                    });
                }

                if column == 0 {
                    continue;
                }
                let left = levels[column - 1];
                if left > level {
                    ramps.push(Ramp {
                        id: RampId::new(ramps.len() as u32),
                        orientation: RampOrientation::East,
                        layer,
                        column: column as u32,
                        level: level + 1,
                    });
                } else if left < level {
                    ramps.push(Ramp {
                        id: RampId::new(ramps.len() as u32),
                        orientation: RampOrientation::West,
                        layer,
                        column: column as u32 - 1,
                        level,
                    });
                }
            }

            heights.set_layer(layer, &levels, &terrain);
            spawn_coordinates.push(walking_height(levels[0], layer));
            below = levels;
        }

        let layout = TerrainLayout {
            heights,
            blocks,
            ramps,
            spawn_coordinates,
        };
        debug_assert!(layout.check_invariants().is_ok());
        info!(columns, layers, ramps = layout.ramps.len(), "terrain generated");
        Ok(layout)
    }

    /// Resolves the level of every column on a layer.
    fn resolve_levels(&mut self, layer: LayerIndex, below: &[u8]) -> Vec<u8> {
        let width = below.len() as u32;
        let mut anchor = self.rng.gen_range(0..=width - SAFE_ZONE_WIDTH - 1);
        let mut cursor = Cursor::Free;
        let mut levels: Vec<u8> = Vec::with_capacity(below.len());

        for column in 0..width {
            let under = below[column as usize];
            let left = match levels.last() {
                Some(level) => *level,
                None => under,
            };

            let level = match cursor {
                Cursor::RampPlaced => {
                    cursor = Cursor::Forced;
                    left
                }
                Cursor::Forced => {
                    cursor = Cursor::Free;
                    left
                }
                Cursor::Free => {
                    let (minimum, maximum) = bounds(column, anchor, left, under);
                    if minimum > maximum {
                        if column == anchor && maximum < left {
                            let shifted = (anchor + 1).min(width - SAFE_ZONE_WIDTH);
                            debug!(?layer, from = anchor, to = shifted, "safe zone shifted");
                            anchor = shifted;
                        }
                        maximum
                    } else {
                        self.rng.gen_range(minimum..=maximum)
                    }
                }
            };

            if column > 0 && level < left {
                cursor = Cursor::RampPlaced;
            }
            levels.push(level);
        }

        levels
    }

    fn random_terrain(&mut self) -> TerrainType {
        TerrainType::ALL[self.rng.gen_range(0..TerrainType::ALL.len())]
    }
}

/// Level bounds for a free column relative to the safe zone `[anchor, anchor + width)`.
fn bounds(column: u32, anchor: u32, left: u8, under: u8) -> (u8, u8) {
    let mut minimum = under.saturating_sub(1).max(left.saturating_sub(1));
    let mut maximum = MAX_LEVEL.min(under + 1).min(left + 1);

    let exit = anchor + SAFE_ZONE_WIDTH;
    if column == anchor {
        minimum = under.max(left);
    } else if column > anchor && column < exit {
        return (left, left);
    } else if column == exit {
        maximum = maximum.min(left);
    }
    (minimum, maximum)
}
