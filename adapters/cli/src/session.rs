//! Fixed-timestep driver wiring the world, systems and a presenter together.

use std::{collections::VecDeque, time::Duration};

use anyhow::{Context, Result};
use hostage_rescue_core::{
    ActorId, ActorKind, Command, Event, HostageResolution, MovementState, RoundPhase,
    RoundSnapshot,
};
use hostage_rescue_presentation::{dispatch, Presenter};
use hostage_rescue_system_sequences::Sequences;
use hostage_rescue_system_spawning::{Config as SpawningConfig, Spawning};
use hostage_rescue_system_terrain::TerrainGeneration;
use hostage_rescue_world::{self as world, query, World};
use tracing::info;

use crate::{config::Settings, probe::ZoneProbe};

const SPAWN_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Outcome reported once a run stops.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Summary {
    pub(crate) seed: u64,
    pub(crate) ticks: u64,
    pub(crate) round: RoundSnapshot,
    pub(crate) saved: u32,
    pub(crate) memorials: usize,
}

/// Owns the simulation and pumps commands until every follow-up is applied.
#[derive(Debug)]
pub(crate) struct Session<P> {
    world: World,
    terrain: TerrainGeneration,
    spawning: Spawning,
    sequences: Sequences,
    probe: ZoneProbe,
    presenter: P,
    seed: u64,
    columns: u32,
    layers: u32,
    tick: Duration,
    shoot_every: Option<u32>,
    ticks_run: u64,
    saved: u32,
    quit: bool,
}

impl<P: Presenter> Session<P> {
    pub(crate) fn new(settings: &Settings, presenter: P) -> Result<Self> {
        let round = &settings.round;
        let world = World::with_config(round).context("failed to create world")?;
        let seed = round.seed.unwrap_or_else(rand::random);
        info!(seed, "session seeded");

        Ok(Self {
            world,
            terrain: TerrainGeneration::new(seed),
            spawning: Spawning::new(SpawningConfig::new(
                round.spawn_interval(),
                round.spawn_delay(),
                seed ^ SPAWN_STREAM,
            )),
            sequences: Sequences::new(),
            probe: ZoneProbe::new(),
            presenter,
            seed,
            columns: round.columns,
            layers: round.layers,
            tick: round.tick(),
            shoot_every: settings.session.shoot_every,
            ticks_run: 0,
            saved: 0,
            quit: false,
        })
    }

    /// Generates and installs the first map.
    pub(crate) fn start(&mut self) -> Result<()> {
        let layout = self
            .terrain
            .generate(self.columns, self.layers)
            .context("failed to generate terrain")?;
        self.submit(Command::InstallTerrain {
            layout: Box::new(layout),
        });
        Ok(())
    }

    /// Runs up to `ticks` fixed steps, stopping early when the round ends or quit is requested.
    pub(crate) fn run(&mut self, ticks: u64) -> Summary {
        for _ in 0..ticks {
            if self.quit || query::phase(&self.world) == RoundPhase::Over {
                break;
            }
            self.step();
        }
        self.summary()
    }

    /// Simulates one fixed step: zone contacts, the scripted shot, then the tick.
    pub(crate) fn step(&mut self) {
        self.ticks_run += 1;
        let mut commands = Vec::new();
        self.probe.scan(&self.world, &mut commands);
        if let Some(every) = self.shoot_every {
            if self.ticks_run % u64::from(every) == 0 {
                if let Some(actor) = self.target() {
                    commands.push(Command::Hit { actor });
                }
            }
        }
        commands.push(Command::Tick { dt: self.tick });
        self.pump(commands);
    }

    /// Applies a single command and everything it triggers.
    pub(crate) fn submit(&mut self, command: Command) {
        self.pump(vec![command]);
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn presenter(&self) -> &P {
        &self.presenter
    }

    pub(crate) fn summary(&self) -> Summary {
        Summary {
            seed: self.seed,
            ticks: self.ticks_run,
            round: query::round(&self.world),
            saved: self.saved,
            memorials: query::memorials(&self.world).len(),
        }
    }

    /// Lowest-numbered enemy that is walking across the visible map.
    fn target(&self) -> Option<ActorId> {
        query::actor_view(&self.world)
            .iter()
            .find(|actor| {
                actor.kind == ActorKind::Enemy
                    && actor.movement == MovementState::Moving
                    && actor.position.x >= 0.0
            })
            .map(|actor| actor.id)
    }

    fn pump(&mut self, initial: Vec<Command>) {
        let mut queue: VecDeque<Command> = initial.into();
        while let Some(command) = queue.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            if events.is_empty() {
                continue;
            }
            self.observe(&events);
            dispatch(&events, query::terrain(&self.world), &mut self.presenter);

            let mut follow_up = Vec::new();
            self.terrain
                .handle(&events, self.columns, self.layers, &mut follow_up);
            let spawn_coordinates = query::terrain(&self.world)
                .map(|layout| layout.spawn_coordinates.as_slice())
                .unwrap_or(&[]);
            self.spawning.handle(
                &events,
                query::phase(&self.world),
                spawn_coordinates,
                &mut follow_up,
            );
            self.sequences.handle(&events, &mut follow_up);
            queue.extend(follow_up);
        }
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::HostageCleared {
                    resolution: HostageResolution::Saved,
                    ..
                } => self.saved += 1,
                Event::RoundRestarted => {
                    self.saved = 0;
                    self.ticks_run = 0;
                }
                Event::QuitRequested => self.quit = true,
                _ => {}
            }
        }
    }
}
