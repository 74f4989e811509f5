#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting hostage and enemy spawn commands.

use std::time::Duration;

use glam::Vec2;
use hostage_rescue_core::{
    Command, Event, HostageArchetype, LayerIndex, RoundPhase, ENTRY_X, ESCORT_SPACING,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    initial_delay: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence, delay and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, initial_delay: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            initial_delay,
            rng_seed,
        }
    }
}

/// Pure system that emits spawn commands on a fixed cadence while the round is active.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    initial_delay: Duration,
    remaining_delay: Duration,
    delay_elapsed: bool,
    accumulator: Duration,
    last_layer: Option<LayerIndex>,
    hostage_on_screen: bool,
    roster: Vec<HostageArchetype>,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            initial_delay: config.initial_delay,
            remaining_delay: config.initial_delay,
            delay_elapsed: false,
            accumulator: Duration::ZERO,
            last_layer: None,
            hostage_on_screen: false,
            roster: HostageArchetype::ROSTER.to_vec(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Archetypes that may still be picked for a hostage group.
    #[must_use]
    pub fn roster(&self) -> &[HostageArchetype] {
        &self.roster
    }

    /// Reports whether a hostage group is currently walking the map.
    #[must_use]
    pub fn hostage_on_screen(&self) -> bool {
        self.hostage_on_screen
    }

    /// Consumes events and the layers' spawn heights to emit spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RoundPhase,
        spawn_coordinates: &[f32],
        out: &mut Vec<Command>,
    ) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::HostageCleared {
                    archetype,
                    resolution,
                    ..
                } => {
                    self.hostage_on_screen = false;
                    if !resolution.is_permanent() && !self.roster.contains(archetype) {
                        self.roster.push(*archetype);
                    }
                }
                Event::RoundRestarted => self.reset(),
                _ => {}
            }
        }

        if phase != RoundPhase::Active {
            self.accumulator = Duration::ZERO;
            return;
        }

        if self.spawn_interval.is_zero() || spawn_coordinates.is_empty() || accumulated.is_zero()
        {
            return;
        }

        let mut elapsed = accumulated;
        if !self.delay_elapsed {
            let consumed = elapsed.min(self.remaining_delay);
            self.remaining_delay -= consumed;
            elapsed -= consumed;
            if !self.remaining_delay.is_zero() {
                return;
            }
            // The first spawn is due the moment the delay runs out.
            self.delay_elapsed = true;
            self.accumulator = self.spawn_interval;
        }
        self.accumulator = self.accumulator.saturating_add(elapsed);

        for _ in 0..self.resolve_spawn_attempts() {
            out.push(self.spawn(spawn_coordinates));
        }
    }

    fn reset(&mut self) {
        self.remaining_delay = self.initial_delay;
        self.delay_elapsed = false;
        self.accumulator = Duration::ZERO;
        self.last_layer = None;
        self.hostage_on_screen = false;
        self.roster = HostageArchetype::ROSTER.to_vec();
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn spawn(&mut self, spawn_coordinates: &[f32]) -> Command {
        let layer = self.select_layer(spawn_coordinates.len() as u32);
        let height = spawn_coordinates[layer.get() as usize];
        let entry = Vec2::new(ENTRY_X, height);

        let lone_enemy =
            self.hostage_on_screen || self.roster.is_empty() || self.rng.gen_bool(0.5);
        if lone_enemy {
            trace!(?layer, "spawning lone enemy");
            return Command::SpawnEnemy {
                layer,
                position: entry,
            };
        }

        let archetype = self.roster.remove(self.rng.gen_range(0..self.roster.len()));
        self.hostage_on_screen = true;
        trace!(?layer, ?archetype, "spawning hostage group");
        Command::SpawnHostageGroup {
            layer,
            archetype,
            hostage: entry,
            escorts: [
                entry + Vec2::new(ESCORT_SPACING, 0.0),
                entry - Vec2::new(ESCORT_SPACING, 0.0),
            ],
        }
    }

    /// Picks a layer uniformly among those different from the previous pick.
    fn select_layer(&mut self, layers: u32) -> LayerIndex {
        let index = match self.last_layer {
            Some(last) if layers > 1 => {
                let candidate = self.rng.gen_range(0..layers - 1);
                if candidate >= last.get() {
                    candidate + 1
                } else {
                    candidate
                }
            }
            Some(_) => 0,
            None => self.rng.gen_range(0..layers),
        };
        let layer = LayerIndex::new(index);
        self.last_layer = Some(layer);
        layer
    }
}
