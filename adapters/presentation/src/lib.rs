#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for hostage rescue adapters.
//!
//! The simulation never draws anything itself. Adapters implement
//! [`Presenter`] and feed it the world's event stream through [`dispatch`],
//! which translates events into fire-and-forget presentation calls.

use glam::Vec2;
use hostage_rescue_core::{
    ActorId, ActorKind, Block, BlockKind, EndCause, Event, HostageArchetype, LayerIndex, Ramp,
    RoundPhase, TerrainLayout,
};

/// Draw order bucket a visual is assigned to.
///
/// Later layers draw above earlier ones; within a map layer terrain sits below
/// ramps, which sit below characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortingLayer {
    /// Terrain blocks of a map layer.
    Terrain(u32),
    /// Ramps of a map layer.
    Ramp(u32),
    /// Characters walking a map layer.
    Character(u32),
    /// Rescue tally row drawn above everything else.
    Base,
}

impl SortingLayer {
    /// Bucket used by a terrain block; fillers hide the gap behind the next layer.
    #[must_use]
    pub fn for_block(block: &Block) -> Self {
        match block.kind {
            BlockKind::Surface => Self::Terrain(block.layer.get()),
            BlockKind::Filler => Self::Terrain(block.layer.get() + 1),
        }
    }

    /// Bucket used by characters walking the provided layer.
    #[must_use]
    pub const fn for_actor(layer: LayerIndex) -> Self {
        Self::Character(layer.get())
    }

    /// Rank of the bucket; higher ranks draw on top.
    #[must_use]
    pub const fn draw_order(self) -> u32 {
        match self {
            Self::Terrain(layer) => layer * 3,
            Self::Ramp(layer) => layer * 3 + 1,
            Self::Character(layer) => layer * 3 + 2,
            Self::Base => u32::MAX,
        }
    }
}

/// Something the presentation layer draws.
#[derive(Clone, Debug, PartialEq)]
pub enum Visual {
    /// Terrain block sprite.
    Block {
        /// Block placed by the generator.
        block: Block,
        /// World-space position of the sprite.
        position: Vec2,
    },
    /// Ramp sprite.
    Ramp {
        /// Ramp placed by the generator.
        ramp: Ramp,
        /// World-space position of the sprite.
        position: Vec2,
    },
    /// Character sprite that follows the actor's snapshot.
    Actor {
        /// Actor the sprite belongs to.
        actor: ActorId,
    },
    /// Killed hostage resting in the tally row.
    Memorial {
        /// Character template of the hostage.
        archetype: HostageArchetype,
        /// World-space position of the sprite.
        position: Vec2,
    },
}

/// Fire-and-forget surface implemented by presentation layers.
///
/// None of these calls report back synchronously; sequence completion flows
/// back into the simulation as commands.
pub trait Presenter {
    /// Places a visual in a draw order bucket.
    fn set_layer_visual(&mut self, visual: Visual, layer: SortingLayer);

    /// Starts the fade played when an actor dies.
    fn play_death_sequence(&mut self, actor: ActorId, kind: ActorKind);

    /// Starts the shrink-and-travel animation of a freed hostage.
    fn play_rescue_fade_sequence(&mut self, actor: ActorId, destination: Vec2);

    /// Shows the number of bullets left.
    fn update_ammo_display(&mut self, remaining: u32);

    /// Shows why the round ended.
    fn update_game_over_cause(&mut self, cause: EndCause);

    /// Freezes presentation while the round is paused.
    fn pause(&mut self);

    /// Unfreezes presentation.
    fn resume(&mut self);

    /// Shows the game over screen.
    fn end_round(&mut self, cause: EndCause);

    /// Discards every visual of the previous round.
    fn restart(&mut self);

    /// Shuts the presentation layer down.
    fn quit(&mut self);
}

/// Registers every block and ramp of a freshly installed layout.
pub fn present_terrain<P: Presenter + ?Sized>(layout: &TerrainLayout, presenter: &mut P) {
    for block in &layout.blocks {
        let position = Vec2::new(block.column as f32, block.height());
        presenter.set_layer_visual(
            Visual::Block {
                block: *block,
                position,
            },
            SortingLayer::for_block(block),
        );
    }
    for ramp in &layout.ramps {
        let position = Vec2::new(ramp.column as f32, ramp.height());
        presenter.set_layer_visual(
            Visual::Ramp {
                ramp: *ramp,
                position,
            },
            SortingLayer::Ramp(ramp.layer.get()),
        );
    }
}

/// Translates world events into presentation calls.
///
/// `terrain` is consulted when the batch announces a terrain installation.
pub fn dispatch<P: Presenter + ?Sized>(
    events: &[Event],
    terrain: Option<&TerrainLayout>,
    presenter: &mut P,
) {
    for event in events {
        match event {
            Event::TerrainInstalled { .. } => {
                if let Some(layout) = terrain {
                    present_terrain(layout, presenter);
                }
            }
            Event::ActorSpawned { actor, layer, .. } => {
                presenter.set_layer_visual(
                    Visual::Actor { actor: *actor },
                    SortingLayer::for_actor(*layer),
                );
            }
            Event::RescueStarted { actor, destination } => {
                presenter.play_rescue_fade_sequence(*actor, *destination);
            }
            Event::DeathSequenceStarted { actor, kind } => {
                presenter.play_death_sequence(*actor, *kind);
            }
            Event::MemorialPlaced {
                archetype,
                position,
            } => presenter.set_layer_visual(
                Visual::Memorial {
                    archetype: *archetype,
                    position: *position,
                },
                SortingLayer::Base,
            ),
            Event::AmmoChanged { remaining } => presenter.update_ammo_display(*remaining),
            Event::RoundPhaseChanged { phase } => match phase {
                RoundPhase::Paused => presenter.pause(),
                RoundPhase::Active => presenter.resume(),
                RoundPhase::Over => {}
            },
            Event::RoundEnded { cause } => {
                presenter.update_game_over_cause(*cause);
                presenter.end_round(*cause);
            }
            Event::RoundRestarted => presenter.restart(),
            Event::QuitRequested => presenter.quit(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostage_rescue_core::{
        ColumnHeightModel, RampId, RampOrientation, TerrainType, LAYER_SPACING, LEVEL_HEIGHT,
    };

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<String>,
        layers: Vec<SortingLayer>,
    }

    impl Presenter for Recorder {
        fn set_layer_visual(&mut self, _visual: Visual, layer: SortingLayer) {
            self.layers.push(layer);
        }

        fn play_death_sequence(&mut self, actor: ActorId, kind: ActorKind) {
            self.calls.push(format!("death {} {kind:?}", actor.index()));
        }

        fn play_rescue_fade_sequence(&mut self, actor: ActorId, _destination: Vec2) {
            self.calls.push(format!("rescue {}", actor.index()));
        }

        fn update_ammo_display(&mut self, remaining: u32) {
            self.calls.push(format!("ammo {remaining}"));
        }

        fn update_game_over_cause(&mut self, cause: EndCause) {
            self.calls.push(format!("cause {}", cause.message()));
        }

        fn pause(&mut self) {
            self.calls.push("pause".to_owned());
        }

        fn resume(&mut self) {
            self.calls.push("resume".to_owned());
        }

        fn end_round(&mut self, cause: EndCause) {
            self.calls.push(format!("end {cause:?}"));
        }

        fn restart(&mut self) {
            self.calls.push("restart".to_owned());
        }

        fn quit(&mut self) {
            self.calls.push("quit".to_owned());
        }
    }

    fn block(layer: u32, level: u8, kind: BlockKind) -> Block {
        Block {
            column: 2,
            layer: LayerIndex::new(layer),
            level,
            terrain: TerrainType::Stone,
            kind,
        }
    }

    #[test]
    fn fillers_sort_one_layer_up() {
        assert_eq!(
            SortingLayer::for_block(&block(1, 2, BlockKind::Surface)),
            SortingLayer::Terrain(1)
        );
        assert_eq!(
            SortingLayer::for_block(&block(1, 2, BlockKind::Filler)),
            SortingLayer::Terrain(2)
        );
        assert!(SortingLayer::Ramp(0).draw_order() < SortingLayer::Character(0).draw_order());
        assert!(SortingLayer::Character(0).draw_order() < SortingLayer::Terrain(1).draw_order());
        assert!(SortingLayer::Character(4).draw_order() < SortingLayer::Base.draw_order());
    }

    #[test]
    fn terrain_visuals_use_block_geometry() {
        let layout = TerrainLayout {
            heights: ColumnHeightModel::new(4, 2),
            blocks: vec![block(1, 1, BlockKind::Surface)],
            ramps: vec![Ramp {
                id: RampId::new(0),
                orientation: RampOrientation::East,
                layer: LayerIndex::new(1),
                column: 3,
                level: 1,
            }],
            spawn_coordinates: vec![0.8, 1.6],
        };

        #[derive(Default)]
        struct Positions(Vec<Vec2>);
        impl Presenter for Positions {
            fn set_layer_visual(&mut self, visual: Visual, _layer: SortingLayer) {
                if let Visual::Block { position, .. } | Visual::Ramp { position, .. } = visual {
                    self.0.push(position);
                }
            }
            fn play_death_sequence(&mut self, _actor: ActorId, _kind: ActorKind) {}
            fn play_rescue_fade_sequence(&mut self, _actor: ActorId, _destination: Vec2) {}
            fn update_ammo_display(&mut self, _remaining: u32) {}
            fn update_game_over_cause(&mut self, _cause: EndCause) {}
            fn pause(&mut self) {}
            fn resume(&mut self) {}
            fn end_round(&mut self, _cause: EndCause) {}
            fn restart(&mut self) {}
            fn quit(&mut self) {}
        }

        let mut positions = Positions::default();
        present_terrain(&layout, &mut positions);
        let expected = LEVEL_HEIGHT * 2.0 + LAYER_SPACING;
        assert_eq!(positions.0.len(), 2);
        assert!((positions.0[0] - Vec2::new(2.0, expected)).length() < 1e-6);
        assert!((positions.0[1] - Vec2::new(3.0, expected)).length() < 1e-6);
    }

    #[test]
    fn round_events_reach_presenter_in_order() {
        let mut recorder = Recorder::default();
        let actor = ActorId::new(3, 0);
        dispatch(
            &[
                Event::ActorSpawned {
                    actor,
                    kind: ActorKind::Enemy,
                    layer: LayerIndex::new(2),
                    position: Vec2::ZERO,
                    escorting: None,
                },
                Event::AmmoChanged { remaining: 0 },
                Event::RoundEnded {
                    cause: EndCause::OutOfAmmo,
                },
                Event::DeathSequenceStarted {
                    actor,
                    kind: ActorKind::Enemy,
                },
                Event::RoundPhaseChanged {
                    phase: RoundPhase::Paused,
                },
                Event::RoundRestarted,
                Event::QuitRequested,
            ],
            None,
            &mut recorder,
        );

        assert_eq!(recorder.layers, vec![SortingLayer::Character(2)]);
        assert_eq!(
            recorder.calls,
            vec![
                "ammo 0",
                "cause You run out of bullets!",
                "end OutOfAmmo",
                "death 3 Enemy",
                "pause",
                "restart",
                "quit",
            ]
        );
    }

    #[test]
    fn memorials_sort_into_base_layer() {
        let mut recorder = Recorder::default();
        dispatch(
            &[Event::MemorialPlaced {
                archetype: HostageArchetype::HornGirl,
                position: Vec2::new(7.25, 5.35),
            }],
            None,
            &mut recorder,
        );
        assert_eq!(recorder.layers, vec![SortingLayer::Base]);
    }
}
