use std::time::Duration;

use glam::Vec2;
use hostage_rescue_core::{
    ActorId, ActorKind, ColumnHeightModel, Command, EndCause, Event, HostageArchetype,
    HostageResolution, LayerIndex, MovementState, Ramp, RampId, RampOrientation, RampState,
    walking_height, RemovalReason, RoundConfig, RoundPhase, TerrainLayout, ZoneKind, ENTRY_X,
};
use hostage_rescue_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(20);
const LAYER: LayerIndex = LayerIndex::new(2);
const EAST: RampId = RampId::new(0);
const WEST: RampId = RampId::new(1);
const UPPER_WEST: RampId = RampId::new(2);

fn layout() -> TerrainLayout {
    TerrainLayout {
        heights: ColumnHeightModel::new(8, 3),
        blocks: Vec::new(),
        ramps: vec![
            Ramp {
                id: EAST,
                orientation: RampOrientation::East,
                layer: LAYER,
                column: 5,
                level: 1,
            },
            Ramp {
                id: WEST,
                orientation: RampOrientation::West,
                layer: LAYER,
                column: 1,
                level: 1,
            },
            Ramp {
                id: UPPER_WEST,
                orientation: RampOrientation::West,
                layer: LAYER,
                column: 2,
                level: 2,
            },
        ],
        spawn_coordinates: vec![0.8, 1.6, 2.4],
    }
}

fn world_with(config: RoundConfig) -> World {
    let mut world = World::with_config(&config).expect("valid config");
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::InstallTerrain {
            layout: Box::new(layout()),
        },
        &mut events,
    );
    world
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn spawn_enemy(world: &mut World) -> ActorId {
    let events = run(
        world,
        Command::SpawnEnemy {
            layer: LAYER,
            position: Vec2::new(ENTRY_X, 2.4),
        },
    );
    match events.as_slice() {
        [Event::ActorSpawned { actor, .. }] => *actor,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

fn spawn_group(world: &mut World) -> (ActorId, [ActorId; 2]) {
    let events = run(
        world,
        Command::SpawnHostageGroup {
            layer: LAYER,
            archetype: HostageArchetype::CatGirl,
            hostage: Vec2::new(ENTRY_X, 2.4),
            escorts: [Vec2::new(ENTRY_X + 1.0, 2.4), Vec2::new(ENTRY_X - 1.0, 2.4)],
        },
    );
    let ids: Vec<ActorId> = events
        .iter()
        .filter_map(|event| match event {
            Event::ActorSpawned { actor, .. } => Some(*actor),
            _ => None,
        })
        .collect();
    assert_eq!(ids.len(), 3);
    (ids[0], [ids[1], ids[2]])
}

fn tick(world: &mut World, count: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..count {
        world::apply(world, Command::Tick { dt: TICK }, &mut events);
    }
    events
}

fn enter(actor: ActorId, zone: ZoneKind) -> Command {
    Command::EnterZone {
        actor,
        zone,
        layer: LAYER,
    }
}

fn exit(actor: ActorId, zone: ZoneKind) -> Command {
    Command::ExitZone {
        actor,
        zone,
        layer: LAYER,
    }
}

fn ramp_state(world: &World, actor: ActorId) -> RampState {
    query::actor(world, actor).expect("live actor").ramp
}

#[test]
fn east_ramp_after_different_ramp_starts_descent() {
    let mut world = world_with(RoundConfig::default());
    let enemy = spawn_enemy(&mut world);

    let _ = run(&mut world, enter(enemy, ZoneKind::RampWest(WEST)));
    let _ = tick(&mut world, 15);
    let _ = run(&mut world, exit(enemy, ZoneKind::RampWest(WEST)));
    let settled = tick(&mut world, 1);
    assert!(settled
        .iter()
        .any(|event| matches!(event, Event::RampSettled { actor, .. } if *actor == enemy)));
    assert_eq!(ramp_state(&world, enemy), RampState::None);

    let events = run(&mut world, enter(enemy, ZoneKind::RampEast(EAST)));
    assert_eq!(
        events,
        vec![Event::RampEntered {
            actor: enemy,
            ramp: EAST,
            state: RampState::Descending,
        }]
    );
    assert_eq!(ramp_state(&world, enemy), RampState::Descending);
}

#[test]
fn adjacent_ramp_entered_mid_slope_climbs_a_second_level() {
    let mut world = world_with(RoundConfig::default());
    let enemy = spawn_enemy(&mut world);

    let _ = run(&mut world, enter(enemy, ZoneKind::RampWest(WEST)));
    let _ = tick(&mut world, 50);
    assert_eq!(ramp_state(&world, enemy), RampState::Ascending);

    let events = run(&mut world, enter(enemy, ZoneKind::RampWest(UPPER_WEST)));
    assert_eq!(
        events,
        vec![Event::RampEntered {
            actor: enemy,
            ramp: UPPER_WEST,
            state: RampState::Ascending,
        }]
    );
    let upper = walking_height(2, LAYER);
    let track = query::actor(&world, enemy).expect("enemy").track_height;
    assert!((track - upper).abs() < 1e-5);

    let _ = tick(&mut world, 1);
    assert!(run(&mut world, exit(enemy, ZoneKind::RampWest(WEST))).is_empty());
    assert_eq!(ramp_state(&world, enemy), RampState::Ascending);
    let _ = run(&mut world, exit(enemy, ZoneKind::RampWest(UPPER_WEST)));

    let mut settled_at = None;
    for _ in 0..30 {
        for event in tick(&mut world, 1) {
            if let Event::RampSettled { actor, height } = event {
                if actor == enemy {
                    settled_at = Some(height);
                }
            }
        }
        if settled_at.is_some() {
            break;
        }
    }
    let height = settled_at.expect("actor settled on the upper level");
    assert!((height - upper).abs() < 1e-5);
    let enemy_snapshot = query::actor(&world, enemy).expect("enemy");
    assert!((enemy_snapshot.position.y - upper).abs() < 1e-5);
    assert_eq!(enemy_snapshot.ramp, RampState::None);
}

#[test]
fn same_ramp_instance_does_not_retrigger() {
    let mut world = world_with(RoundConfig::default());
    let enemy = spawn_enemy(&mut world);

    assert_eq!(run(&mut world, enter(enemy, ZoneKind::RampEast(EAST))).len(), 1);
    let _ = tick(&mut world, 15);
    let _ = run(&mut world, exit(enemy, ZoneKind::RampEast(EAST)));
    let _ = tick(&mut world, 1);
    let height = query::actor(&world, enemy).expect("enemy").position.y;

    assert!(run(&mut world, enter(enemy, ZoneKind::RampEast(EAST))).is_empty());
    let _ = tick(&mut world, 5);
    assert_eq!(ramp_state(&world, enemy), RampState::None);
    let after = query::actor(&world, enemy).expect("enemy").position.y;
    assert!((after - height).abs() < 1e-6);
}

#[test]
fn zones_with_mismatched_orientation_or_layer_are_ignored() {
    let mut world = world_with(RoundConfig::default());
    let enemy = spawn_enemy(&mut world);

    assert!(run(&mut world, enter(enemy, ZoneKind::RampWest(EAST))).is_empty());
    assert!(run(
        &mut world,
        Command::EnterZone {
            actor: enemy,
            zone: ZoneKind::RampEast(EAST),
            layer: LayerIndex::new(0),
        }
    )
    .is_empty());
    assert_eq!(ramp_state(&world, enemy), RampState::None);
}

#[test]
fn escort_kill_decrements_counter_exactly_once() {
    let mut world = world_with(RoundConfig::default());
    let (hostage, escorts) = spawn_group(&mut world);

    let events = run(&mut world, Command::Hit { actor: escorts[0] });
    let kills: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::EscortKilled { .. }))
        .collect();
    assert_eq!(
        kills,
        vec![&Event::EscortKilled {
            hostage,
            remaining: 1
        }]
    );

    let repeat = run(&mut world, Command::Hit { actor: escorts[0] });
    assert!(repeat.is_empty());
    assert_eq!(query::actor(&world, hostage).and_then(|a| a.escorts), Some(1));
    assert_eq!(query::round(&world).bullets_remaining, 19);
}

#[test]
fn freed_hostage_is_saved_with_non_increasing_distance() {
    let mut world = world_with(RoundConfig::default());
    let (hostage, escorts) = spawn_group(&mut world);

    let _ = run(&mut world, Command::Hit { actor: escorts[0] });
    let events = run(&mut world, Command::Hit { actor: escorts[1] });
    let rescues: Vec<Vec2> = events
        .iter()
        .filter_map(|event| match event {
            Event::RescueStarted { actor, destination } if *actor == hostage => Some(*destination),
            _ => None,
        })
        .collect();
    assert_eq!(rescues, vec![Vec2::new(7.3, 5.4)]);
    let destination = rescues[0];

    let mut previous = query::actor(&world, hostage)
        .expect("hostage")
        .position
        .distance(destination);
    let mut saved_events = Vec::new();
    for _ in 0..1000 {
        let events = tick(&mut world, 1);
        let snapshot = query::actor(&world, hostage).expect("saved hostages persist");
        let distance = snapshot.position.distance(destination);
        assert!(distance <= previous + 1e-5);
        previous = distance;
        saved_events.extend(events.into_iter().filter(|event| {
            matches!(
                event,
                Event::HostageSaved { .. } | Event::HostageCleared { .. } | Event::RescueStarted { .. }
            )
        }));
        if snapshot.movement == MovementState::Saved {
            break;
        }
    }

    assert_eq!(
        saved_events,
        vec![
            Event::HostageSaved {
                actor: hostage,
                position: destination
            },
            Event::HostageCleared {
                actor: hostage,
                archetype: HostageArchetype::CatGirl,
                resolution: HostageResolution::Saved,
            },
        ]
    );
    assert_eq!(query::round(&world).hostages_remaining, 4);
    assert!(run(&mut world, Command::Hit { actor: hostage }).is_empty());
}

#[test]
fn boundary_removes_enemy_and_lets_escorted_hostage_escape() {
    let mut world = world_with(RoundConfig::default());
    let enemy = spawn_enemy(&mut world);
    let (hostage, _) = spawn_group(&mut world);

    let events = run(&mut world, enter(enemy, ZoneKind::Boundary));
    assert_eq!(
        events,
        vec![Event::ActorRemoved {
            actor: enemy,
            reason: RemovalReason::OffScreen
        }]
    );

    let events = run(&mut world, enter(hostage, ZoneKind::Boundary));
    assert_eq!(
        events,
        vec![
            Event::HostageCleared {
                actor: hostage,
                archetype: HostageArchetype::CatGirl,
                resolution: HostageResolution::Escaped,
            },
            Event::ActorRemoved {
                actor: hostage,
                reason: RemovalReason::OffScreen
            },
        ]
    );
    assert_eq!(query::round(&world).hostages_remaining, 5);
}

#[test]
fn last_bullet_ends_round_but_still_lands() {
    let mut world = world_with(RoundConfig {
        bullets: 1,
        ..RoundConfig::default()
    });
    let (hostage, escorts) = spawn_group(&mut world);

    let events = run(&mut world, Command::Hit { actor: escorts[0] });
    assert_eq!(
        events,
        vec![
            Event::AmmoChanged { remaining: 0 },
            Event::RoundEnded {
                cause: EndCause::OutOfAmmo
            },
            Event::EscortKilled {
                hostage,
                remaining: 1
            },
            Event::DeathSequenceStarted {
                actor: escorts[0],
                kind: ActorKind::Enemy
            },
        ]
    );
    assert_eq!(query::phase(&world), RoundPhase::Over);
    assert!(tick(&mut world, 3).is_empty());
    assert!(run(&mut world, Command::Hit { actor: escorts[1] }).is_empty());
}

#[test]
fn killing_last_hostage_resolves_round() {
    let mut world = world_with(RoundConfig {
        hostages: 1,
        ..RoundConfig::default()
    });
    let (hostage, _) = spawn_group(&mut world);

    let events = run(&mut world, Command::Hit { actor: hostage });
    assert!(events.contains(&Event::HostageCleared {
        actor: hostage,
        archetype: HostageArchetype::CatGirl,
        resolution: HostageResolution::Killed,
    }));
    assert!(events.contains(&Event::RoundEnded {
        cause: EndCause::AllHostagesResolved
    }));
    assert_eq!(
        query::round(&world).end_cause,
        Some(EndCause::AllHostagesResolved)
    );

    let events = run(&mut world, Command::CompleteDeathSequence { actor: hostage });
    assert!(matches!(
        events.as_slice(),
        [Event::MemorialPlaced { .. }, Event::ActorRemoved { .. }]
    ));
}

#[test]
fn stale_escort_link_is_a_no_op() {
    let mut world = world_with(RoundConfig::default());
    let (hostage, escorts) = spawn_group(&mut world);
    let _ = run(&mut world, enter(hostage, ZoneKind::Boundary));

    let events = run(&mut world, Command::Hit { actor: escorts[0] });
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EscortKilled { .. })));
    assert!(events.contains(&Event::DeathSequenceStarted {
        actor: escorts[0],
        kind: ActorKind::Enemy
    }));
}

#[test]
fn escorts_of_a_dying_hostage_still_count_down_without_rescue() {
    let mut world = world_with(RoundConfig::default());
    let (hostage, escorts) = spawn_group(&mut world);
    let _ = run(&mut world, Command::Hit { actor: hostage });

    let events = run(&mut world, Command::Hit { actor: escorts[0] });
    assert!(events.contains(&Event::EscortKilled {
        hostage,
        remaining: 1
    }));
    assert_eq!(query::actor(&world, hostage).and_then(|a| a.escorts), Some(1));

    let events = run(&mut world, Command::Hit { actor: escorts[1] });
    assert!(events.contains(&Event::EscortKilled {
        hostage,
        remaining: 0
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::RescueStarted { .. })));
    assert_eq!(
        query::actor(&world, hostage).map(|a| a.movement),
        Some(MovementState::Dead)
    );

    let events = run(&mut world, Command::CompleteDeathSequence { actor: hostage });
    let placed = events.iter().find_map(|event| match event {
        Event::MemorialPlaced { position, .. } => Some(*position),
        _ => None,
    });
    let position = placed.expect("memorial placed");
    assert!((position - Vec2::new(7.25, 5.35)).length() < 1e-5);
}

#[test]
fn hostage_leaving_with_one_escort_left_escapes() {
    let mut world = world_with(RoundConfig::default());
    let (hostage, escorts) = spawn_group(&mut world);
    let _ = run(&mut world, Command::Hit { actor: escorts[1] });

    let events = run(&mut world, enter(hostage, ZoneKind::Boundary));
    assert_eq!(
        events[0],
        Event::HostageCleared {
            actor: hostage,
            archetype: HostageArchetype::CatGirl,
            resolution: HostageResolution::Escaped,
        }
    );
    assert_eq!(query::round(&world).hostages_remaining, 5);
}

#[test]
fn hostage_without_escorts_is_rescued_instead_of_leaving() {
    let mut world = world_with(RoundConfig::default());
    let (hostage, escorts) = spawn_group(&mut world);
    for escort in escorts {
        let _ = run(&mut world, Command::Hit { actor: escort });
    }
    assert_eq!(
        query::actor(&world, hostage).map(|a| a.movement),
        Some(MovementState::Saving)
    );

    assert!(run(&mut world, enter(hostage, ZoneKind::Boundary)).is_empty());
    assert!(query::actor(&world, hostage).is_some());
}
