#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the hostage rescue simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod config;
mod terrain;

pub use config::{check_dimensions, ConfigError, RoundConfig, MIN_COLUMNS, MIN_LAYERS};
pub use terrain::{
    block_height, level_at_walking_height, walking_height, Block, BlockKind, ColumnHeightModel,
    LayerIndex, Ramp, RampId, RampOrientation, TerrainInvariantError, TerrainLayout, TerrainType,
    LAYER_SPACING, LEVEL_HEIGHT, MAX_LEVEL, SAFE_ZONE_WIDTH,
};

/// Horizontal world coordinate at which spawned actors enter the screen.
pub const ENTRY_X: f32 = -2.5;

/// Horizontal spacing between a hostage and each of its escorts.
pub const ESCORT_SPACING: f32 = 1.0;

/// Number of escorts assigned to every hostage.
pub const ESCORTS_PER_HOSTAGE: u8 = 2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs a freshly generated terrain layout.
    InstallTerrain {
        /// Layout produced by the terrain generator.
        layout: Box<TerrainLayout>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a lone enemy enter the provided layer.
    SpawnEnemy {
        /// Layer the enemy walks on.
        layer: LayerIndex,
        /// Initial world position of the enemy.
        position: Vec2,
    },
    /// Requests that a hostage and its two escorts enter the provided layer.
    SpawnHostageGroup {
        /// Layer the group walks on.
        layer: LayerIndex,
        /// Character template of the hostage.
        archetype: HostageArchetype,
        /// Initial world position of the hostage.
        hostage: Vec2,
        /// Initial world positions of the escorts, ahead and behind.
        escorts: [Vec2; 2],
    },
    /// Reports that the player's shot landed on an actor.
    Hit {
        /// Actor under the cursor.
        actor: ActorId,
    },
    /// Reports that an actor started overlapping a trigger zone.
    EnterZone {
        /// Actor that entered the zone.
        actor: ActorId,
        /// Zone that was entered.
        zone: ZoneKind,
        /// Layer the zone belongs to.
        layer: LayerIndex,
    },
    /// Reports that an actor stopped overlapping a trigger zone.
    ExitZone {
        /// Actor that left the zone.
        actor: ActorId,
        /// Zone that was left.
        zone: ZoneKind,
        /// Layer the zone belongs to.
        layer: LayerIndex,
    },
    /// Reports that the death sequence of an actor finished playing.
    CompleteDeathSequence {
        /// Actor whose sequence completed.
        actor: ActorId,
    },
    /// Freezes the round.
    Pause,
    /// Unfreezes a paused round.
    Resume,
    /// Discards the current round and starts over.
    Restart,
    /// Asks the presentation layer to shut down.
    Quit,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a terrain layout replaced the previous map.
    TerrainInstalled {
        /// Number of columns per layer.
        columns: u32,
        /// Number of stacked layers.
        layers: u32,
    },
    /// Confirms that an actor entered the simulation.
    ActorSpawned {
        /// Identifier assigned to the actor.
        actor: ActorId,
        /// Whether the actor is a hostage or an enemy.
        kind: ActorKind,
        /// Layer the actor walks on.
        layer: LayerIndex,
        /// Initial world position.
        position: Vec2,
        /// Hostage escorted by the actor, for escort enemies.
        escorting: Option<ActorId>,
    },
    /// Announces that an actor mounted a ramp.
    RampEntered {
        /// Actor on the ramp.
        actor: ActorId,
        /// Ramp being traversed.
        ramp: RampId,
        /// Ramp sub-state the actor switched to.
        state: RampState,
    },
    /// Announces that an actor left a ramp and snapped to its new walking height.
    RampSettled {
        /// Actor that left the ramp.
        actor: ActorId,
        /// Walking height the actor snapped to.
        height: f32,
    },
    /// Announces that one of a hostage's escorts was killed.
    EscortKilled {
        /// Hostage that lost an escort.
        hostage: ActorId,
        /// Escorts still alive.
        remaining: u8,
    },
    /// Announces that a freed hostage started moving to its rescue slot.
    RescueStarted {
        /// Hostage being rescued.
        actor: ActorId,
        /// Slot the hostage travels to.
        destination: Vec2,
    },
    /// Announces that a hostage reached its rescue slot.
    HostageSaved {
        /// Hostage that was saved.
        actor: ActorId,
        /// Final resting position.
        position: Vec2,
    },
    /// Announces that a hostage left play, for scheduler and round bookkeeping.
    HostageCleared {
        /// Hostage that left play.
        actor: ActorId,
        /// Character template of the hostage.
        archetype: HostageArchetype,
        /// How the hostage left play.
        resolution: HostageResolution,
    },
    /// Announces that an actor died and its death sequence should play.
    DeathSequenceStarted {
        /// Actor that died.
        actor: ActorId,
        /// Kind of the actor that died.
        kind: ActorKind,
    },
    /// Announces that a killed hostage was laid to rest in the tally row.
    MemorialPlaced {
        /// Character template of the killed hostage.
        archetype: HostageArchetype,
        /// Slot the memorial occupies.
        position: Vec2,
    },
    /// Confirms that an actor left the simulation for good.
    ActorRemoved {
        /// Actor that was removed.
        actor: ActorId,
        /// Why the actor was removed.
        reason: RemovalReason,
    },
    /// Reports the number of bullets left after a shot.
    AmmoChanged {
        /// Bullets left in the magazine.
        remaining: u32,
    },
    /// Announces a pause or resume of the round.
    RoundPhaseChanged {
        /// Phase that became active.
        phase: RoundPhase,
    },
    /// Announces that the round ended.
    RoundEnded {
        /// Why the round ended.
        cause: EndCause,
    },
    /// Announces that the round was discarded and must be set up again.
    RoundRestarted,
    /// Announces that the player asked to quit.
    QuitRequested,
}

/// Generation-checked handle to an actor slot.
///
/// A handle whose slot was reused by a later actor no longer resolves, which
/// lets escorts hold a non-owning link to their hostage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

impl ActorId {
    /// Creates a handle from a slot index and the slot's generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot the actor occupies.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the actor was created.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Kinds of actors roaming the terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Escorted character the player tries to free.
    Hostage,
    /// Bug guarding hostages or roaming alone.
    Enemy,
}

/// Character templates available for hostages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HostageArchetype {
    /// Boy character.
    Boy,
    /// Cat girl character.
    CatGirl,
    /// Horned girl character.
    HornGirl,
    /// Pink girl character.
    PinkGirl,
    /// Princess character.
    Princess,
}

impl HostageArchetype {
    /// Full roster available at the start of a round.
    pub const ROSTER: [HostageArchetype; 5] = [
        HostageArchetype::Boy,
        HostageArchetype::CatGirl,
        HostageArchetype::HornGirl,
        HostageArchetype::PinkGirl,
        HostageArchetype::Princess,
    ];
}

/// Movement axis of the locomotion state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementState {
    /// Walking along the layer.
    Moving,
    /// Freed hostage travelling to its rescue slot.
    Saving,
    /// Hostage resting in its rescue slot.
    Saved,
    /// Killed and waiting for the death sequence to finish.
    Dead,
}

/// Ramp axis of the locomotion state machine, meaningful only while moving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RampState {
    /// Walking on flat ground.
    None,
    /// Climbing a west ramp.
    Ascending,
    /// Walking down an east ramp.
    Descending,
    /// Left a ramp; snaps to the new walking height on the next tick.
    Settling,
}

/// Trigger zones reported by the external geometry system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Trigger of an east ramp.
    RampEast(RampId),
    /// Trigger of a west ramp.
    RampWest(RampId),
    /// Off-screen boundary on the far side of the map.
    Boundary,
}

impl ZoneKind {
    /// Trigger zone matching the provided ramp.
    #[must_use]
    pub const fn for_ramp(ramp: &Ramp) -> Self {
        match ramp.orientation {
            RampOrientation::East => Self::RampEast(ramp.id),
            RampOrientation::West => Self::RampWest(ramp.id),
        }
    }
}

/// How a hostage left play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostageResolution {
    /// Walked off-screen; may appear again.
    Escaped,
    /// Reached the rescue slot.
    Saved,
    /// Shot by the player.
    Killed,
}

impl HostageResolution {
    /// Whether the hostage is gone for the rest of the round.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !matches!(self, Self::Escaped)
    }
}

/// Why an actor left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Crossed the off-screen boundary.
    OffScreen,
    /// Its death sequence finished.
    SequenceCompleted,
}

/// Lifecycle phase of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Simulation is running.
    Active,
    /// Simulation is frozen by the player.
    Paused,
    /// Round ended; only a restart resumes play.
    Over,
}

/// Why a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndCause {
    /// The player fired the last bullet.
    OutOfAmmo,
    /// Every hostage was saved or killed.
    AllHostagesResolved,
}

impl EndCause {
    /// Player-facing explanation shown on the game over screen.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::OutOfAmmo => "You run out of bullets!",
            Self::AllHostagesResolved => "All hostages were rescued or killed!",
        }
    }
}

/// Immutable representation of a single actor used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Identifier of the actor.
    pub id: ActorId,
    /// Whether the actor is a hostage or an enemy.
    pub kind: ActorKind,
    /// Layer the actor walks on.
    pub layer: LayerIndex,
    /// Current world position.
    pub position: Vec2,
    /// Walking height the actor settles at after its current ramp.
    pub track_height: f32,
    /// Facing tilt in degrees.
    pub rotation: f32,
    /// Uniform visual scale.
    pub scale: f32,
    /// Movement axis state.
    pub movement: MovementState,
    /// Ramp axis state.
    pub ramp: RampState,
    /// Live escorts, for hostages.
    pub escorts: Option<u8>,
    /// Character template, for hostages.
    pub archetype: Option<HostageArchetype>,
    /// Linked hostage, for escort enemies.
    pub escorting: Option<ActorId>,
    /// Rescue slot, for hostages being saved.
    pub destination: Option<Vec2>,
}

/// Read-only snapshot describing every live actor.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single actor.
    #[must_use]
    pub fn get(&self, actor: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == actor)
    }

    /// Number of captured actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}

/// Round-global counters exposed for presentation and systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSnapshot {
    /// Current lifecycle phase.
    pub phase: RoundPhase,
    /// Bullets left in the magazine.
    pub bullets_remaining: u32,
    /// Hostages not yet saved or killed.
    pub hostages_remaining: u32,
    /// Cause recorded when the round ended.
    pub end_cause: Option<EndCause>,
}

/// Killed hostage resting in the tally row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Memorial {
    /// Character template of the killed hostage.
    pub archetype: HostageArchetype,
    /// Slot the memorial occupies.
    pub position: Vec2,
}
