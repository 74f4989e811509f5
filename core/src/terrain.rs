//! Terrain contracts shared by the generator, the world and adapters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest discrete elevation a column may reach within a layer.
pub const MAX_LEVEL: u8 = 2;

/// Vertical distance in world units covered by one elevation level.
pub const LEVEL_HEIGHT: f32 = 0.4;

/// Vertical distance in world units separating two stacked layers.
pub const LAYER_SPACING: f32 = 0.8;

/// Number of consecutive columns guaranteed to stay free of ramps per layer.
pub const SAFE_ZONE_WIDTH: u32 = 3;

/// Index of a horizontal stratum of the map, counted from the bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerIndex(u32);

impl LayerIndex {
    /// Creates a new layer index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the layer.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Material used to render a terrain block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    /// Bare earth.
    Dirt,
    /// Earth topped with grass.
    Grass,
    /// Rock.
    Stone,
    /// Water surface.
    Water,
    /// Wooden planks.
    Wood,
}

impl TerrainType {
    /// Every terrain type in declaration order.
    pub const ALL: [TerrainType; 5] = [
        TerrainType::Dirt,
        TerrainType::Grass,
        TerrainType::Stone,
        TerrainType::Water,
        TerrainType::Wood,
    ];
}

/// Direction a ramp leads when traversed from left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RampOrientation {
    /// Sits above a column lower than its left neighbour and leads down.
    East,
    /// Sits on a column lower than its right neighbour and leads up.
    West,
}

/// Unique identifier assigned to a placed ramp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RampId(u32);

impl RampId {
    /// Creates a new ramp identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Terrain piece connecting two adjacent elevation levels within a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ramp {
    /// Identifier allocated by the generator.
    pub id: RampId,
    /// Direction the ramp leads.
    pub orientation: RampOrientation,
    /// Layer the ramp belongs to.
    pub layer: LayerIndex,
    /// Column the ramp occupies.
    pub column: u32,
    /// Elevation level the ramp is drawn at.
    pub level: u8,
}

impl Ramp {
    /// World-space Y coordinate of the ramp sprite.
    #[must_use]
    pub fn height(&self) -> f32 {
        block_height(self.level, self.layer)
    }

    /// Elevation level an actor must walk at to mount the ramp.
    #[must_use]
    pub fn entry_level(&self) -> u8 {
        match self.orientation {
            RampOrientation::East => self.level,
            RampOrientation::West => self.level.saturating_sub(1),
        }
    }
}

/// Role of a placed block within the column stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Top block of the column on its layer.
    Surface,
    /// Extra block beneath a surface that would otherwise leave a visible gap.
    Filler,
}

/// Terrain block placed by the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    /// Column the block occupies.
    pub column: u32,
    /// Layer the block belongs to.
    pub layer: LayerIndex,
    /// Elevation level the block is drawn at.
    pub level: u8,
    /// Material of the block.
    pub terrain: TerrainType,
    /// Whether the block is the surface or a gap filler.
    pub kind: BlockKind,
}

impl Block {
    /// World-space Y coordinate of the block sprite.
    #[must_use]
    pub fn height(&self) -> f32 {
        match self.kind {
            BlockKind::Surface => block_height(self.level, self.layer),
            BlockKind::Filler => block_height(self.level, self.layer) - LEVEL_HEIGHT,
        }
    }
}

/// World-space Y coordinate of a surface block at the given level.
#[must_use]
pub fn block_height(level: u8, layer: LayerIndex) -> f32 {
    LEVEL_HEIGHT * (f32::from(level) + 1.0) + LAYER_SPACING * layer.get() as f32
}

/// World-space Y coordinate actors walk at while standing on the given level.
#[must_use]
pub fn walking_height(level: u8, layer: LayerIndex) -> f32 {
    LEVEL_HEIGHT * (f32::from(level) + 2.0) + LAYER_SPACING * layer.get() as f32
}

/// Elevation level matching a walking height, rounded to the closest level.
///
/// Heights below level zero resolve to `None`.
#[must_use]
pub fn level_at_walking_height(height: f32, layer: LayerIndex) -> Option<u8> {
    let relative = (height - LAYER_SPACING * layer.get() as f32) / LEVEL_HEIGHT - 2.0;
    let rounded = relative.round();
    if rounded < 0.0 || rounded > f32::from(u8::MAX) {
        return None;
    }
    Some(rounded as u8)
}

/// Per-column, per-layer discrete elevation and terrain type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHeightModel {
    columns: u32,
    layers: u32,
    levels: Vec<u8>,
    terrain: Vec<TerrainType>,
}

impl ColumnHeightModel {
    /// Creates a flat model where every column sits at level zero on dirt.
    #[must_use]
    pub fn new(columns: u32, layers: u32) -> Self {
        let capacity = columns as usize * layers as usize;
        Self {
            columns,
            layers,
            levels: vec![0; capacity],
            terrain: vec![TerrainType::Dirt; capacity],
        }
    }

    /// Number of columns per layer.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of stacked layers.
    #[must_use]
    pub const fn layers(&self) -> u32 {
        self.layers
    }

    /// Elevation level of a column, if the coordinates are in range.
    #[must_use]
    pub fn level(&self, layer: LayerIndex, column: u32) -> Option<u8> {
        self.index(layer, column).map(|index| self.levels[index])
    }

    /// Terrain type of a column, if the coordinates are in range.
    #[must_use]
    pub fn terrain(&self, layer: LayerIndex, column: u32) -> Option<TerrainType> {
        self.index(layer, column).map(|index| self.terrain[index])
    }

    /// Elevation levels of every column on a layer, left to right.
    #[must_use]
    pub fn layer_levels(&self, layer: LayerIndex) -> &[u8] {
        let Some(start) = self.index(layer, 0) else {
            return &[];
        };
        &self.levels[start..start + self.columns as usize]
    }

    /// Overwrites the resolved levels and terrain of a whole layer.
    ///
    /// Slices shorter than the column count leave the remaining columns untouched.
    pub fn set_layer(&mut self, layer: LayerIndex, levels: &[u8], terrain: &[TerrainType]) {
        for (column, (level, kind)) in levels.iter().zip(terrain).enumerate() {
            if let Some(index) = self.index(layer, column as u32) {
                self.levels[index] = *level;
                self.terrain[index] = *kind;
            }
        }
    }

    /// Verifies elevation range and horizontal continuity on every layer.
    pub fn check_invariants(&self) -> Result<(), TerrainInvariantError> {
        for layer in (0..self.layers).map(LayerIndex::new) {
            let levels = self.layer_levels(layer);
            for (column, level) in levels.iter().enumerate() {
                if *level > MAX_LEVEL {
                    return Err(TerrainInvariantError::LevelOutOfRange {
                        layer,
                        column: column as u32,
                        level: *level,
                    });
                }
            }
            for (column, pair) in levels.windows(2).enumerate() {
                if pair[0].abs_diff(pair[1]) > 1 {
                    return Err(TerrainInvariantError::Discontinuity {
                        layer,
                        column: column as u32 + 1,
                    });
                }
            }
        }
        Ok(())
    }

    fn index(&self, layer: LayerIndex, column: u32) -> Option<usize> {
        if layer.get() < self.layers && column < self.columns {
            Some(layer.get() as usize * self.columns as usize + column as usize)
        } else {
            None
        }
    }
}

/// Complete output of a terrain generation pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainLayout {
    /// Resolved elevation and terrain per column and layer.
    pub heights: ColumnHeightModel,
    /// Blocks placed for rendering and collision.
    pub blocks: Vec<Block>,
    /// Ramps placed at level discontinuities.
    pub ramps: Vec<Ramp>,
    /// Walking height at which actors enter each layer.
    pub spawn_coordinates: Vec<f32>,
}

impl TerrainLayout {
    /// Looks up a ramp by identifier.
    #[must_use]
    pub fn ramp(&self, id: RampId) -> Option<&Ramp> {
        self.ramps.iter().find(|ramp| ramp.id == id)
    }

    /// Ramps placed on the provided layer.
    pub fn ramps_on_layer(&self, layer: LayerIndex) -> impl Iterator<Item = &Ramp> {
        self.ramps.iter().filter(move |ramp| ramp.layer == layer)
    }

    /// Walking height at which actors enter the provided layer.
    #[must_use]
    pub fn spawn_coordinate(&self, layer: LayerIndex) -> Option<f32> {
        self.spawn_coordinates.get(layer.get() as usize).copied()
    }

    /// Leftmost column starting a window of [`SAFE_ZONE_WIDTH`] columns with no ramp.
    #[must_use]
    pub fn ramp_free_window(&self, layer: LayerIndex) -> Option<u32> {
        let columns = self.heights.columns();
        if columns < SAFE_ZONE_WIDTH {
            return None;
        }
        (0..=columns - SAFE_ZONE_WIDTH).find(|start| {
            !self.ramps_on_layer(layer).any(|ramp| {
                ramp.column >= *start && ramp.column < *start + SAFE_ZONE_WIDTH
            })
        })
    }

    /// Verifies the height model plus ramp placement and safe zones on every layer.
    pub fn check_invariants(&self) -> Result<(), TerrainInvariantError> {
        self.heights.check_invariants()?;

        for layer in (0..self.heights.layers()).map(LayerIndex::new) {
            let levels = self.heights.layer_levels(layer);
            for (index, pair) in levels.windows(2).enumerate() {
                let column = index as u32 + 1;
                let expected = if pair[0] > pair[1] {
                    Some((RampOrientation::East, column))
                } else if pair[0] < pair[1] {
                    Some((RampOrientation::West, column - 1))
                } else {
                    None
                };

                if let Some((orientation, ramp_column)) = expected {
                    let present = self.ramps_on_layer(layer).any(|ramp| {
                        ramp.orientation == orientation && ramp.column == ramp_column
                    });
                    if !present {
                        return Err(TerrainInvariantError::MissingRamp { layer, column });
                    }
                }
            }

            if self.ramp_free_window(layer).is_none() {
                return Err(TerrainInvariantError::MissingSafeZone { layer });
            }
        }

        Ok(())
    }
}

/// Violations detected when validating generated terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TerrainInvariantError {
    /// A column level exceeded [`MAX_LEVEL`].
    #[error("level {level} at layer {layer:?} column {column} exceeds the maximum level")]
    LevelOutOfRange {
        /// Layer containing the column.
        layer: LayerIndex,
        /// Offending column.
        column: u32,
        /// Level found in the column.
        level: u8,
    },
    /// Two adjacent columns differ by more than one level.
    #[error("columns {column} and its left neighbour on layer {layer:?} differ by more than one level")]
    Discontinuity {
        /// Layer containing the columns.
        layer: LayerIndex,
        /// Right-hand column of the pair.
        column: u32,
    },
    /// A level change is not bridged by a ramp.
    #[error("no ramp bridges the level change at layer {layer:?} column {column}")]
    MissingRamp {
        /// Layer containing the columns.
        layer: LayerIndex,
        /// Right-hand column of the pair.
        column: u32,
    },
    /// No ramp-free corridor exists on a layer.
    #[error("layer {layer:?} has no ramp-free safe zone")]
    MissingSafeZone {
        /// Layer lacking a safe zone.
        layer: LayerIndex,
    },
}
