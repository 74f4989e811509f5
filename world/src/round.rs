//! Round bookkeeping: ammunition, outstanding hostages, rescue slots and phase.

use glam::Vec2;
use hostage_rescue_core::{EndCause, Event, RoundConfig, RoundPhase, RoundSnapshot};
use tracing::info;

const FIRST_FREE_SLOT: Vec2 = Vec2::new(7.3, 5.4);
const FREE_SLOT_STEP: f32 = 0.5;
const MEMORIAL_OFFSET: Vec2 = Vec2::new(-0.05, -0.05);

/// Owner of the round-global counters, reachable only through the world.
#[derive(Clone, Debug)]
pub(crate) struct RoundController {
    phase: RoundPhase,
    bullets_remaining: u32,
    hostages_remaining: u32,
    end_cause: Option<EndCause>,
    next_free_slot: Vec2,
}

impl RoundController {
    pub(crate) fn new(config: &RoundConfig) -> Self {
        Self {
            phase: RoundPhase::Active,
            bullets_remaining: config.bullets,
            hostages_remaining: config.hostages,
            end_cause: None,
            next_free_slot: FIRST_FREE_SLOT,
        }
    }

    pub(crate) fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub(crate) fn is_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    pub(crate) fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase,
            bullets_remaining: self.bullets_remaining,
            hostages_remaining: self.hostages_remaining,
            end_cause: self.end_cause,
        }
    }

    /// Consumes one bullet, ending the round when the magazine empties.
    pub(crate) fn spend_bullet(&mut self, out_events: &mut Vec<Event>) {
        self.bullets_remaining = self.bullets_remaining.saturating_sub(1);
        out_events.push(Event::AmmoChanged {
            remaining: self.bullets_remaining,
        });
        if self.bullets_remaining == 0 {
            self.end(EndCause::OutOfAmmo, out_events);
        }
    }

    /// Records a hostage leaving play; only permanent departures count.
    pub(crate) fn hostage_cleared(&mut self, permanent: bool, out_events: &mut Vec<Event>) {
        if !permanent {
            return;
        }
        self.hostages_remaining = self.hostages_remaining.saturating_sub(1);
        if self.hostages_remaining == 0 {
            self.end(EndCause::AllHostagesResolved, out_events);
        }
    }

    /// Hands out the next slot of the rescue tally row.
    pub(crate) fn allocate_free_slot(&mut self, is_dead: bool) -> Vec2 {
        let slot = self.next_free_slot;
        self.next_free_slot.x -= FREE_SLOT_STEP;
        if is_dead {
            slot + MEMORIAL_OFFSET
        } else {
            slot
        }
    }

    pub(crate) fn pause(&mut self, out_events: &mut Vec<Event>) {
        if self.phase == RoundPhase::Active {
            self.set_phase(RoundPhase::Paused, out_events);
        }
    }

    pub(crate) fn resume(&mut self, out_events: &mut Vec<Event>) {
        if self.phase == RoundPhase::Paused {
            self.set_phase(RoundPhase::Active, out_events);
        }
    }

    fn set_phase(&mut self, phase: RoundPhase, out_events: &mut Vec<Event>) {
        self.phase = phase;
        out_events.push(Event::RoundPhaseChanged { phase });
    }

    fn end(&mut self, cause: EndCause, out_events: &mut Vec<Event>) {
        if self.phase == RoundPhase::Over {
            return;
        }
        info!(?cause, "round ended");
        self.phase = RoundPhase::Over;
        self.end_cause = Some(cause);
        out_events.push(Event::RoundEnded { cause });
    }
}
