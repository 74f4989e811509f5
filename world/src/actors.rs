//! Generation-checked storage for the actors roaming the terrain.

use hostage_rescue_core::{ActorId, ActorKind, HostageArchetype, LayerIndex};

use crate::locomotion::Locomotion;

/// Kind-specific data carried by an actor.
#[derive(Clone, Debug)]
pub(crate) enum Role {
    /// Escorted character the player tries to free.
    Hostage {
        /// Character template of the hostage.
        archetype: HostageArchetype,
        /// Escorts still alive.
        escorts: u8,
    },
    /// Bug guarding a hostage or roaming alone.
    Enemy {
        /// Non-owning link to the escorted hostage.
        escorting: Option<ActorId>,
    },
}

/// Actor stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Actor {
    /// Handle the actor was registered under.
    pub(crate) id: ActorId,
    /// Layer the actor walks on.
    pub(crate) layer: LayerIndex,
    /// Kind-specific data.
    pub(crate) role: Role,
    /// Movement and ramp state machine.
    pub(crate) locomotion: Locomotion,
}

impl Actor {
    pub(crate) fn kind(&self) -> ActorKind {
        match self.role {
            Role::Hostage { .. } => ActorKind::Hostage,
            Role::Enemy { .. } => ActorKind::Enemy,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    actor: Option<Actor>,
}

/// Slab of actors whose handles stop resolving once their slot is reused.
#[derive(Clone, Debug, Default)]
pub(crate) struct ActorTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ActorTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers an actor built from the handle it is assigned.
    pub(crate) fn insert(&mut self, build: impl FnOnce(ActorId) -> Actor) -> ActorId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = ActorId::new(index, slot.generation);
        slot.actor = Some(build(id));
        id
    }

    pub(crate) fn get(&self, id: ActorId) -> Option<&Actor> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.actor.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.actor.as_mut())
    }

    /// Removes the actor and retires its handle.
    pub(crate) fn remove(&mut self, id: ActorId) -> Option<Actor> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())?;
        let actor = slot.actor.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        Some(actor)
    }

    /// Handles of every live actor in ascending slot order.
    pub(crate) fn ids(&self) -> Vec<ActorId> {
        self.iter().map(|actor| actor.id).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.slots.iter().filter_map(|slot| slot.actor.as_ref())
    }

    /// Removes every actor while keeping generations, so old handles stay dead.
    pub(crate) fn clear(&mut self) {
        for id in self.ids() {
            let _ = self.remove(id);
        }
    }
}
