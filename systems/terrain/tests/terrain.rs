use hostage_rescue_core::{
    walking_height, BlockKind, LayerIndex, RampOrientation, TerrainLayout, MAX_LEVEL,
};
use hostage_rescue_system_terrain::TerrainGeneration;

fn generate(seed: u64, columns: u32, layers: u32) -> TerrainLayout {
    TerrainGeneration::new(seed)
        .generate(columns, layers)
        .expect("valid dimensions")
}

#[test]
fn ten_thousand_maps_uphold_terrain_invariants() {
    for seed in 0..10_000 {
        let layout = generate(seed, 8, 5);
        if let Err(error) = layout.check_invariants() {
            panic!("seed {seed} produced invalid terrain: {error}");
        }
        for layer in (0..5).map(LayerIndex::new) {
            assert!(layout
                .heights
                .layer_levels(layer)
                .iter()
                .all(|level| *level <= MAX_LEVEL));
        }
    }
}

#[test]
fn narrow_and_wide_maps_keep_a_safe_zone() {
    for columns in [4, 5, 6, 12, 20] {
        for seed in 0..500 {
            let layout = generate(seed, columns, 3);
            assert!(
                layout.check_invariants().is_ok(),
                "seed {seed} with {columns} columns"
            );
        }
    }
}

#[test]
fn fixed_seed_produces_identical_maps() {
    let first = generate(0x5eed, 8, 5);
    let second = generate(0x5eed, 8, 5);
    assert_eq!(first, second);
}

#[test]
fn consecutive_maps_from_one_generator_differ() {
    let mut generation = TerrainGeneration::new(7);
    let maps: Vec<TerrainLayout> = (0..8)
        .map(|_| generation.generate(8, 5).expect("valid dimensions"))
        .collect();
    assert!(maps.windows(2).any(|pair| pair[0] != pair[1]));
}

#[test]
fn ramps_sit_on_the_lower_side_of_each_step() {
    for seed in 0..200 {
        let layout = generate(seed, 8, 5);
        for ramp in &layout.ramps {
            let levels = layout.heights.layer_levels(ramp.layer);
            let column = ramp.column as usize;
            match ramp.orientation {
                RampOrientation::East => {
                    assert_eq!(levels[column - 1], levels[column] + 1);
                    assert_eq!(ramp.level, levels[column - 1]);
                }
                RampOrientation::West => {
                    assert_eq!(levels[column + 1], levels[column] + 1);
                    assert_eq!(ramp.level, levels[column + 1]);
                }
            }
        }
        for (index, ramp) in layout.ramps.iter().enumerate() {
            assert_eq!(ramp.id.get(), index as u32);
        }
    }
}

#[test]
fn spawn_coordinates_follow_first_column() {
    let layout = generate(42, 8, 5);
    assert_eq!(layout.spawn_coordinates.len(), 5);
    for layer in (0..5).map(LayerIndex::new) {
        let level = layout.heights.level(layer, 0).expect("column zero");
        assert_eq!(
            layout.spawn_coordinate(layer),
            Some(walking_height(level, layer))
        );
    }
}

#[test]
fn fillers_close_gaps_below_tall_columns() {
    for seed in 0..200 {
        let layout = generate(seed, 8, 5);
        for layer in (0..5).map(LayerIndex::new) {
            for column in 0..8 {
                let level = layout.heights.level(layer, column).expect("in range");
                let under = if layer.get() == 0 {
                    0
                } else {
                    layout
                        .heights
                        .level(LayerIndex::new(layer.get() - 1), column)
                        .expect("in range")
                };
                let needs_filler =
                    i16::from(level) - i16::from(under) > 1 || (layer.get() == 0 && level > 0);
                let has_filler = layout.blocks.iter().any(|block| {
                    block.layer == layer && block.column == column && block.kind == BlockKind::Filler
                });
                assert_eq!(needs_filler, has_filler, "seed {seed} {layer:?} column {column}");
            }
        }
    }
}

#[test]
fn entropy_seeded_generator_builds_valid_maps() {
    let mut generation = TerrainGeneration::from_entropy();
    for _ in 0..50 {
        let layout = generation.generate(8, 5).expect("valid dimensions");
        assert!(layout.check_invariants().is_ok());
        assert_eq!(layout.spawn_coordinates.len(), 5);
    }
}
