//! Headless stand-in for the physics overlap system that reports zone contacts.

use hostage_rescue_core::{
    level_at_walking_height, ActorId, ActorSnapshot, Command, MovementState, Ramp, TerrainLayout,
    ZoneKind,
};
use hostage_rescue_world::{query, World};

/// Half the width of a ramp trigger around its column centre.
const RAMP_HALF_WIDTH: f32 = 0.5;
/// Distance past the last column at which actors leave the screen.
const BOUNDARY_MARGIN: f32 = 1.5;

/// Tracks which zones every walking actor overlaps and reports changes as commands.
#[derive(Debug, Default)]
pub(crate) struct ZoneProbe {
    overlaps: Vec<(ActorId, ZoneKind)>,
}

impl ZoneProbe {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Compares current overlaps against the previous scan, exits first.
    pub(crate) fn scan(&mut self, world: &World, out: &mut Vec<Command>) {
        let Some(terrain) = query::terrain(world) else {
            self.overlaps.clear();
            return;
        };

        let mut current = Vec::new();
        for actor in query::actor_view(world).iter() {
            if actor.movement != MovementState::Moving {
                continue;
            }
            self.collect(actor, terrain, &mut current);
        }

        for (actor, zone) in &self.overlaps {
            if current.contains(&(*actor, *zone)) {
                continue;
            }
            let Some(snapshot) = query::actor(world, *actor) else {
                continue;
            };
            if snapshot.movement != MovementState::Moving {
                continue;
            }
            out.push(Command::ExitZone {
                actor: *actor,
                zone: *zone,
                layer: snapshot.layer,
            });
        }

        for (actor, zone) in &current {
            if self.overlaps.contains(&(*actor, *zone)) {
                continue;
            }
            if let Some(snapshot) = query::actor(world, *actor) {
                out.push(Command::EnterZone {
                    actor: *actor,
                    zone: *zone,
                    layer: snapshot.layer,
                });
            }
        }

        self.overlaps = current;
    }

    fn collect(
        &self,
        actor: &ActorSnapshot,
        terrain: &TerrainLayout,
        current: &mut Vec<(ActorId, ZoneKind)>,
    ) {
        let boundary = terrain.heights.columns() as f32 + BOUNDARY_MARGIN;
        if actor.position.x >= boundary {
            current.push((actor.id, ZoneKind::Boundary));
            return;
        }

        for ramp in terrain.ramps_on_layer(actor.layer) {
            if (actor.position.x - ramp.column as f32).abs() > RAMP_HALF_WIDTH {
                continue;
            }
            let zone = ZoneKind::for_ramp(ramp);
            let already = self.overlaps.contains(&(actor.id, zone));
            if already || at_entry_level(actor, ramp) {
                current.push((actor.id, zone));
            }
        }
    }
}

fn at_entry_level(actor: &ActorSnapshot, ramp: &Ramp) -> bool {
    level_at_walking_height(actor.position.y, actor.layer) == Some(ramp.entry_level())
}
