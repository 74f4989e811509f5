#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timer-driven system that completes death sequences once their fade has played.

use std::{collections::BTreeMap, time::Duration};

use hostage_rescue_core::{ActorId, ActorKind, Command, Event};
use tracing::debug;

/// Length of the fade played when an enemy dies.
pub const ENEMY_FADE: Duration = Duration::from_millis(1_050);

/// Length of the fade played when a hostage dies, including the pause before the memorial.
pub const HOSTAGE_FADE: Duration = Duration::from_millis(1_150);

/// Fade length for the provided actor kind.
#[must_use]
pub const fn fade_duration(kind: ActorKind) -> Duration {
    match kind {
        ActorKind::Enemy => ENEMY_FADE,
        ActorKind::Hostage => HOSTAGE_FADE,
    }
}

/// Pure system tracking pending death sequences.
#[derive(Debug, Default)]
pub struct Sequences {
    pending: BTreeMap<ActorId, Duration>,
}

impl Sequences {
    /// Creates a system with no pending sequences.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sequences still playing.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Advances timers from the event stream and emits completion commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::DeathSequenceStarted { actor, kind } => {
                    let _ = self.pending.insert(*actor, fade_duration(*kind));
                }
                Event::ActorRemoved { actor, .. } => {
                    let _ = self.pending.remove(actor);
                }
                Event::RoundRestarted => self.pending.clear(),
                Event::TimeAdvanced { dt } => {
                    for remaining in self.pending.values_mut() {
                        *remaining = remaining.saturating_sub(*dt);
                    }
                }
                _ => {}
            }
        }

        self.pending.retain(|actor, remaining| {
            if !remaining.is_zero() {
                return true;
            }
            debug!(?actor, "death sequence completed");
            out.push(Command::CompleteDeathSequence { actor: *actor });
            false
        });
    }
}
