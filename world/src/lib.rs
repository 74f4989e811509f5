#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the hostage rescue simulation.

mod actors;
mod locomotion;
mod round;

use std::time::Duration;

use glam::Vec2;
use hostage_rescue_core::{
    ActorId, ActorKind, Command, ConfigError, Event, HostageArchetype, HostageResolution,
    LayerIndex, Memorial, MovementState, RampId, RampOrientation, RemovalReason, RoundConfig,
    TerrainLayout, ZoneKind, ESCORTS_PER_HOSTAGE,
};
use tracing::{debug, info, trace};

use crate::{
    actors::{Actor, ActorTable, Role},
    locomotion::Locomotion,
    round::RoundController,
};

/// Represents the authoritative hostage rescue world state.
#[derive(Debug)]
pub struct World {
    config: RoundConfig,
    terrain: Option<TerrainLayout>,
    actors: ActorTable,
    round: RoundController,
    memorials: Vec<Memorial>,
    tick_index: u64,
}

impl World {
    /// Creates a world running a round with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(RoundConfig::default())
    }

    /// Creates a world running a round with the provided configuration.
    pub fn with_config(config: &RoundConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config.clone()))
    }

    fn from_valid_config(config: RoundConfig) -> Self {
        Self {
            round: RoundController::new(&config),
            config,
            terrain: None,
            actors: ActorTable::new(),
            memorials: Vec::new(),
            tick_index: 0,
        }
    }

    fn spawn(&mut self, layer: LayerIndex, position: Vec2, role: Role) -> ActorId {
        self.actors.insert(|id| Actor {
            id,
            layer,
            role,
            locomotion: Locomotion::new(position),
        })
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for id in self.actors.ids() {
            let Some(actor) = self.actors.get_mut(id) else {
                continue;
            };
            let outcome = actor.locomotion.step(dt);
            if let Some(height) = outcome.settled_at {
                debug!(?id, height, "actor settled after ramp");
                out_events.push(Event::RampSettled { actor: id, height });
            }
            if outcome.arrived {
                let position = actor.locomotion.position();
                let Role::Hostage { archetype, .. } = actor.role else {
                    continue;
                };
                out_events.push(Event::HostageSaved {
                    actor: id,
                    position,
                });
                self.clear_hostage(id, archetype, HostageResolution::Saved, out_events);
            }
        }
    }

    fn clear_hostage(
        &mut self,
        actor: ActorId,
        archetype: HostageArchetype,
        resolution: HostageResolution,
        out_events: &mut Vec<Event>,
    ) {
        info!(?actor, ?archetype, ?resolution, "hostage cleared");
        out_events.push(Event::HostageCleared {
            actor,
            archetype,
            resolution,
        });
        self.round
            .hostage_cleared(resolution.is_permanent(), out_events);
    }

    fn hit(&mut self, id: ActorId, out_events: &mut Vec<Event>) {
        let Some(actor) = self.actors.get(id) else {
            debug!(?id, "hit on unknown actor ignored");
            return;
        };
        if !actor.locomotion.is_active() {
            debug!(?id, "hit on inactive actor ignored");
            return;
        }
        let role = actor.role.clone();
        let kind = actor.kind();

        self.round.spend_bullet(out_events);

        match role {
            Role::Enemy { escorting } => {
                if let Some(hostage) = escorting {
                    self.escort_killed(hostage, out_events);
                }
            }
            Role::Hostage { archetype, .. } => {
                self.clear_hostage(id, archetype, HostageResolution::Killed, out_events);
            }
        }

        if let Some(actor) = self.actors.get_mut(id) {
            if actor.locomotion.kill() {
                out_events.push(Event::DeathSequenceStarted { actor: id, kind });
            }
        }
    }

    fn escort_killed(&mut self, hostage: ActorId, out_events: &mut Vec<Event>) {
        let Some(actor) = self.actors.get_mut(hostage) else {
            debug!(?hostage, "escort link no longer resolves");
            return;
        };
        let Role::Hostage { escorts, .. } = &mut actor.role else {
            debug!(?hostage, "escort link does not point at a hostage");
            return;
        };
        if *escorts == 0 {
            debug!(?hostage, "hostage has no escorts left");
            return;
        }
        *escorts -= 1;
        let remaining = *escorts;
        let walking = actor.locomotion.is_active();
        out_events.push(Event::EscortKilled { hostage, remaining });

        if remaining == 0 && walking {
            let destination = self.round.allocate_free_slot(false);
            if let Some(actor) = self.actors.get_mut(hostage) {
                if actor.locomotion.begin_rescue(destination) {
                    debug!(?hostage, ?destination, "rescue started");
                    out_events.push(Event::RescueStarted {
                        actor: hostage,
                        destination,
                    });
                }
            }
        }
    }

    fn enter_zone(
        &mut self,
        id: ActorId,
        zone: ZoneKind,
        layer: LayerIndex,
        out_events: &mut Vec<Event>,
    ) {
        let Some(actor) = self.actors.get(id) else {
            debug!(?id, ?zone, "zone entry by unknown actor ignored");
            return;
        };
        if !actor.locomotion.is_active() || actor.layer != layer {
            return;
        }

        match zone {
            ZoneKind::RampEast(ramp) | ZoneKind::RampWest(ramp) => {
                let Some(orientation) = self.ramp_orientation(ramp, layer) else {
                    debug!(?id, ?ramp, "zone references unknown ramp");
                    return;
                };
                let expected = match zone {
                    ZoneKind::RampEast(_) => RampOrientation::East,
                    _ => RampOrientation::West,
                };
                if orientation != expected {
                    return;
                }
                if let Some(actor) = self.actors.get_mut(id) {
                    if let Some(state) = actor.locomotion.enter_ramp(ramp, orientation) {
                        debug!(?id, ?ramp, ?state, "actor entered ramp");
                        out_events.push(Event::RampEntered {
                            actor: id,
                            ramp,
                            state,
                        });
                    }
                }
            }
            ZoneKind::Boundary => {
                if let Role::Hostage { archetype, .. } = actor.role {
                    self.clear_hostage(id, archetype, HostageResolution::Escaped, out_events);
                }
                let _ = self.actors.remove(id);
                debug!(?id, "actor left the screen");
                out_events.push(Event::ActorRemoved {
                    actor: id,
                    reason: RemovalReason::OffScreen,
                });
            }
        }
    }

    fn exit_zone(&mut self, id: ActorId, zone: ZoneKind, layer: LayerIndex) {
        let (ZoneKind::RampEast(ramp) | ZoneKind::RampWest(ramp)) = zone else {
            return;
        };
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        if actor.layer != layer {
            return;
        }
        if actor.locomotion.exit_ramp(ramp) {
            debug!(?id, ?ramp, "actor leaving ramp");
        }
    }

    fn complete_death_sequence(&mut self, id: ActorId, out_events: &mut Vec<Event>) {
        let Some(actor) = self.actors.get(id) else {
            debug!(?id, "death sequence for unknown actor ignored");
            return;
        };
        if actor.locomotion.movement() != MovementState::Dead {
            return;
        }
        let Some(actor) = self.actors.remove(id) else {
            return;
        };
        if let Role::Hostage { archetype, .. } = actor.role {
            let position = self.round.allocate_free_slot(true);
            self.memorials.push(Memorial {
                archetype,
                position,
            });
            out_events.push(Event::MemorialPlaced {
                archetype,
                position,
            });
        }
        out_events.push(Event::ActorRemoved {
            actor: id,
            reason: RemovalReason::SequenceCompleted,
        });
    }

    fn ramp_orientation(&self, ramp: RampId, layer: LayerIndex) -> Option<RampOrientation> {
        self.terrain
            .as_ref()?
            .ramp(ramp)
            .filter(|found| found.layer == layer)
            .map(|found| found.orientation)
    }

    fn restart(&mut self, out_events: &mut Vec<Event>) {
        self.actors.clear();
        self.memorials.clear();
        self.terrain = None;
        self.round = RoundController::new(&self.config);
        self.tick_index = 0;
        info!("round restarted");
        out_events.push(Event::RoundRestarted);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::InstallTerrain { layout } => {
            let columns = layout.heights.columns();
            let layers = layout.heights.layers();
            world.terrain = Some(*layout);
            info!(columns, layers, "terrain installed");
            out_events.push(Event::TerrainInstalled { columns, layers });
        }
        Command::Tick { dt } => {
            if !world.round.is_active() {
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance(dt, out_events);
        }
        Command::SpawnEnemy { layer, position } => {
            if !world.round.is_active() {
                return;
            }
            let actor = world.spawn(layer, position, Role::Enemy { escorting: None });
            trace!(?actor, ?layer, "enemy spawned");
            out_events.push(Event::ActorSpawned {
                actor,
                kind: ActorKind::Enemy,
                layer,
                position,
                escorting: None,
            });
        }
        Command::SpawnHostageGroup {
            layer,
            archetype,
            hostage,
            escorts,
        } => {
            if !world.round.is_active() {
                return;
            }
            let hostage_id = world.spawn(
                layer,
                hostage,
                Role::Hostage {
                    archetype,
                    escorts: ESCORTS_PER_HOSTAGE,
                },
            );
            trace!(actor = ?hostage_id, ?layer, ?archetype, "hostage group spawned");
            out_events.push(Event::ActorSpawned {
                actor: hostage_id,
                kind: ActorKind::Hostage,
                layer,
                position: hostage,
                escorting: None,
            });
            for position in escorts {
                let escort = world.spawn(
                    layer,
                    position,
                    Role::Enemy {
                        escorting: Some(hostage_id),
                    },
                );
                out_events.push(Event::ActorSpawned {
                    actor: escort,
                    kind: ActorKind::Enemy,
                    layer,
                    position,
                    escorting: Some(hostage_id),
                });
            }
        }
        Command::Hit { actor } => {
            if world.round.is_active() {
                world.hit(actor, out_events);
            }
        }
        Command::EnterZone { actor, zone, layer } => {
            if world.round.is_active() {
                world.enter_zone(actor, zone, layer, out_events);
            }
        }
        Command::ExitZone { actor, zone, layer } => {
            if world.round.is_active() {
                world.exit_zone(actor, zone, layer);
            }
        }
        Command::CompleteDeathSequence { actor } => {
            world.complete_death_sequence(actor, out_events);
        }
        Command::Pause => world.round.pause(out_events),
        Command::Resume => world.round.resume(out_events),
        Command::Restart => world.restart(out_events),
        Command::Quit => {
            info!("quit requested");
            out_events.push(Event::QuitRequested);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use hostage_rescue_core::{
        ActorId, ActorSnapshot, ActorView, Memorial, RoundConfig, RoundPhase, RoundSnapshot,
        TerrainLayout,
    };

    use super::{actors::Actor, actors::Role, World};

    /// Configuration the current round runs with.
    #[must_use]
    pub fn config(world: &World) -> &RoundConfig {
        &world.config
    }

    /// Installed terrain, if the generator already ran for this round.
    #[must_use]
    pub fn terrain(world: &World) -> Option<&TerrainLayout> {
        world.terrain.as_ref()
    }

    /// Number of ticks processed since the round started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Current lifecycle phase of the round.
    #[must_use]
    pub fn phase(world: &World) -> RoundPhase {
        world.round.phase()
    }

    /// Captures the round-global counters.
    #[must_use]
    pub fn round(world: &World) -> RoundSnapshot {
        world.round.snapshot()
    }

    /// Killed hostages laid to rest in the tally row this round.
    #[must_use]
    pub fn memorials(world: &World) -> &[Memorial] {
        &world.memorials
    }

    /// Captures a read-only view of every live actor.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(world.actors.iter().map(snapshot).collect())
    }

    /// Captures a single actor, if its handle still resolves.
    #[must_use]
    pub fn actor(world: &World, id: ActorId) -> Option<ActorSnapshot> {
        world.actors.get(id).map(snapshot)
    }

    fn snapshot(actor: &Actor) -> ActorSnapshot {
        let locomotion = &actor.locomotion;
        let (escorts, archetype, escorting) = match actor.role {
            Role::Hostage { archetype, escorts } => (Some(escorts), Some(archetype), None),
            Role::Enemy { escorting } => (None, None, escorting),
        };
        ActorSnapshot {
            id: actor.id,
            kind: actor.kind(),
            layer: actor.layer,
            position: locomotion.position(),
            track_height: locomotion.track_height(),
            rotation: locomotion.rotation(),
            scale: locomotion.scale(),
            movement: locomotion.movement(),
            ramp: locomotion.ramp(),
            escorts,
            archetype,
            escorting,
            destination: locomotion.destination(),
        }
    }
}
