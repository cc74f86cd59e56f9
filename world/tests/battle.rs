use std::time::Duration;

use lane_siege_core::{
    AssignmentError, BattleConfig, BuildingKind, Command, Event, Outcome, PlacementError,
    PlayMode, SpeciesId, StageConfig, StructureId, Team, Vec2,
};
use lane_siege_world::{
    advance, apply, assign_species, commit_placement, load_stages, query, World,
};
use proptest::prelude::*;

const STEP: Duration = Duration::from_millis(50);

fn start_battle(world: &mut World, events: &mut Vec<Event>) {
    apply(
        world,
        Command::SetPlayMode {
            mode: PlayMode::Battle,
        },
        events,
    );
}

fn tick(world: &mut World, events: &mut Vec<Event>) {
    apply(world, Command::Tick { dt: STEP }, events);
}

/// Creatures ignore each other and walk straight into the opposing base.
fn base_race_world() -> World {
    let config = BattleConfig {
        creatures_can_fight: false,
        separation_strength: 0.0,
        ..BattleConfig::default()
    };
    let mut world = World::with_config(config);
    let mut events = Vec::new();
    load_stages(&mut world, StageConfig::new(false), &mut events);
    world
}

#[test]
fn huge_elapsed_time_is_clamped_to_one_step() {
    let mut world = World::new();
    let mut events = Vec::new();
    start_battle(&mut world, &mut events);
    events.clear();

    advance(&mut world, Duration::from_secs(30), &mut events);

    assert_eq!(
        events.first(),
        Some(&Event::TimeAdvanced {
            dt: Duration::from_millis(50)
        })
    );
    assert!(query::creatures(&world).is_empty());
}

#[test]
fn bases_fall_one_hit_at_a_time_and_the_latch_freezes_the_battle() {
    let mut world = base_race_world();
    let mut events = Vec::new();
    start_battle(&mut world, &mut events);

    let mut stages_applied = Vec::new();
    let mut last_hp = [200.0f32; 2];
    let mut outcome = None;
    for _ in 0..6_000 {
        events.clear();
        tick(&mut world, &mut events);
        for event in &events {
            match *event {
                Event::BaseDamaged { team, hp } => {
                    let slot = &mut last_hp[team as usize];
                    assert_eq!(*slot - hp, 1.0, "bases lose exactly one point per hit");
                    *slot = hp;
                }
                Event::StageApplied { index, count } => {
                    stages_applied.push((index, count));
                    assert!(query::creatures(&world)
                        .iter()
                        .all(|creature| creature.team == Team::Player));
                }
                Event::GameOver { outcome: latched } => {
                    assert_eq!(outcome, None, "game over is reported once");
                    outcome = Some(latched);
                }
                _ => {}
            }
        }
        if outcome.is_some() {
            break;
        }
    }

    assert_eq!(outcome, Some(Outcome::won_by(Team::Player)));
    assert_eq!(query::result_label(&world), Some("Victory"));
    assert_eq!(stages_applied, vec![(1, 3), (2, 3)]);
    assert_eq!(query::stage_label(&world), "Stage 3/3");
    assert_eq!(query::bases(&world).get(Team::Enemy).hp, 0.0);
    assert_eq!(query::base_hp_percent(&world, Team::Enemy), 0);
    assert!(query::bases(&world).get(Team::Player).hp > 0.0);

    let bases = query::bases(&world).clone();
    let creatures = query::creatures(&world).to_vec();
    let projectiles = query::projectiles(&world).to_vec();
    for _ in 0..100 {
        events.clear();
        tick(&mut world, &mut events);
        assert!(events.is_empty());
    }
    assert_eq!(query::bases(&world), &bases);
    assert_eq!(query::creatures(&world), creatures.as_slice());
    assert_eq!(query::projectiles(&world), projectiles.as_slice());

    let mut events = Vec::new();
    assert!(!assign_species(
        &mut world,
        StructureId::new(1),
        SpeciesId::Goblin,
        &mut events
    ));
    assert_eq!(
        events,
        vec![Event::SpeciesAssignmentRejected {
            nest: StructureId::new(1),
            species: SpeciesId::Goblin,
            reason: AssignmentError::BattleOver,
        }]
    );
    events.clear();
    apply(
        &mut world,
        Command::SetPlayMode {
            mode: PlayMode::Setup,
        },
        &mut events,
    );
    start_battle(&mut world, &mut events);
    assert_eq!(query::play_mode(&world), PlayMode::Setup);
}

#[test]
fn dead_creatures_linger_frozen_until_removed() {
    let mut world = World::new();
    let mut events = Vec::new();
    start_battle(&mut world, &mut events);

    let mut dying = None;
    for _ in 0..4_000 {
        events.clear();
        tick(&mut world, &mut events);
        dying = events.iter().find_map(|event| match *event {
            Event::CreatureDied { creature } => Some(creature),
            _ => None,
        });
        if dying.is_some() {
            break;
        }
    }
    let dying = dying.expect("opposing streams meet and someone dies");
    let corpse = query::creature(&world, dying).expect("corpse lingers").clone();
    assert!(corpse.is_dead);
    assert_eq!(corpse.hp, 0.0);

    let mut removed = false;
    for _ in 0..10 {
        events.clear();
        tick(&mut world, &mut events);
        if events.contains(&Event::CreatureRemoved { creature: dying }) {
            removed = true;
            assert!(query::creature(&world, dying).is_none());
            break;
        }
        let now = query::creature(&world, dying).expect("still lingering");
        assert_eq!(now.position, corpse.position);
        assert_eq!(now.hp, 0.0);
        assert!(!events.contains(&Event::CreatureDied { creature: dying }));
    }
    assert!(removed, "corpses are removed after the death delay");
}

#[test]
fn placement_reports_why_a_request_failed() {
    let mut world = World::new();
    let mut events = Vec::new();

    let outside = commit_placement(
        &mut world,
        Team::Player,
        BuildingKind::Wall,
        Vec2::new(360.0, 500.0),
        &mut events,
    );
    assert_eq!(outside, None);
    assert_eq!(
        events.pop(),
        Some(Event::PlacementRejected {
            team: Team::Player,
            kind: BuildingKind::Wall,
            reason: PlacementError::OutsideZone,
        })
    );

    let tower = commit_placement(
        &mut world,
        Team::Player,
        BuildingKind::Tower,
        Vec2::new(200.0, 1000.0),
        &mut events,
    );
    assert!(tower.is_some());

    let second = commit_placement(
        &mut world,
        Team::Player,
        BuildingKind::Tower,
        Vec2::new(500.0, 1000.0),
        &mut events,
    );
    assert_eq!(second, None);
    assert_eq!(
        events.pop(),
        Some(Event::PlacementRejected {
            team: Team::Player,
            kind: BuildingKind::Tower,
            reason: PlacementError::UnderConstruction,
        })
    );
}

#[test]
fn walls_dropped_on_a_tower_snap_beside_it() {
    let mut world = World::new();
    let mut events = Vec::new();
    let _ = commit_placement(
        &mut world,
        Team::Player,
        BuildingKind::Tower,
        Vec2::new(360.0, 1000.0),
        &mut events,
    )
    .expect("tower fits");
    events.clear();

    let request = Vec2::new(400.0, 1000.0);
    let wall = commit_placement(
        &mut world,
        Team::Player,
        BuildingKind::Wall,
        request,
        &mut events,
    )
    .expect("ring search finds a spot");

    let placed = query::structure(&world, wall).expect("wall exists");
    assert_ne!(placed.position, request);
    let tower_rect = query::structures(&world)[1].rect();
    assert!(!placed.rect().overlaps(&tower_rect, 8.0));
    assert_eq!(
        query::validate_placement(&world, Team::Player, BuildingKind::Wall, request),
        query::validate_placement(&world, Team::Player, BuildingKind::Wall, request)
    );
}

#[test]
fn tower_timer_expires_with_real_time_in_any_mode() {
    let mut world = World::new();
    let mut events = Vec::new();
    let _ = commit_placement(
        &mut world,
        Team::Player,
        BuildingKind::Tower,
        Vec2::new(150.0, 1000.0),
        &mut events,
    )
    .expect("tower fits");

    for _ in 0..299 {
        tick(&mut world, &mut events);
    }
    let status = query::construction_status(&world, Team::Player, BuildingKind::Tower)
        .expect("one step left");
    assert_eq!(status.remaining, STEP);

    tick(&mut world, &mut events);
    assert_eq!(
        query::construction_status(&world, Team::Player, BuildingKind::Tower),
        None
    );
    assert!(commit_placement(
        &mut world,
        Team::Player,
        BuildingKind::Tower,
        Vec2::new(550.0, 1000.0),
        &mut events,
    )
    .is_some());
}

#[test]
fn free_build_skips_construction_timers() {
    let config = BattleConfig {
        free_build: true,
        ..BattleConfig::default()
    };
    let mut world = World::with_config(config);
    let mut events = Vec::new();

    for x in [150.0, 360.0, 570.0] {
        assert!(commit_placement(
            &mut world,
            Team::Player,
            BuildingKind::Tower,
            Vec2::new(x, 1000.0),
            &mut events,
        )
        .is_some());
    }
}

#[test]
fn nests_accept_only_unit_tier_species() {
    let mut world = World::new();
    let mut events = Vec::new();
    let nest = commit_placement(
        &mut world,
        Team::Player,
        BuildingKind::Nest,
        Vec2::new(200.0, 950.0),
        &mut events,
    )
    .expect("nest fits");
    let wall = commit_placement(
        &mut world,
        Team::Player,
        BuildingKind::Wall,
        Vec2::new(520.0, 950.0),
        &mut events,
    )
    .expect("wall fits");
    events.clear();

    assert!(!assign_species(&mut world, nest, SpeciesId::Golem, &mut events));
    assert!(!assign_species(&mut world, wall, SpeciesId::Goblin, &mut events));
    assert!(!assign_species(
        &mut world,
        StructureId::new(99),
        SpeciesId::Goblin,
        &mut events
    ));
    let reasons: Vec<AssignmentError> = events
        .iter()
        .filter_map(|event| match *event {
            Event::SpeciesAssignmentRejected { reason, .. } => Some(reason),
            _ => None,
        })
        .collect();
    assert_eq!(
        reasons,
        vec![
            AssignmentError::WrongTier,
            AssignmentError::NotANest,
            AssignmentError::MissingNest
        ]
    );
    assert_eq!(query::structure(&world, nest).and_then(|s| s.assigned_species()), None);

    assert!(assign_species(&mut world, nest, SpeciesId::PupDragon, &mut events));
    start_battle(&mut world, &mut events);
    events.clear();
    for _ in 0..70 {
        tick(&mut world, &mut events);
    }

    assert!(events.iter().any(|event| matches!(
        event,
        Event::CreatureSpawned {
            team: Team::Player,
            species: SpeciesId::PupDragon,
            ..
        }
    )));
    assert_eq!(
        query::population(&world, Team::Player, SpeciesId::PupDragon).cap,
        4
    );
    assert_eq!(query::nest_spawn_percent(&world, nest), Some(17));
}

#[test]
fn reset_restores_the_opening_layout() {
    let mut world = World::new();
    let mut events = Vec::new();
    let _ = commit_placement(
        &mut world,
        Team::Player,
        BuildingKind::Wall,
        Vec2::new(200.0, 950.0),
        &mut events,
    );
    start_battle(&mut world, &mut events);
    for _ in 0..100 {
        tick(&mut world, &mut events);
    }
    events.clear();

    apply(&mut world, Command::Reset, &mut events);

    assert_eq!(events.first(), Some(&Event::BattleReset));
    assert_eq!(query::play_mode(&world), PlayMode::Setup);
    assert!(query::creatures(&world).is_empty());
    assert!(query::projectiles(&world).is_empty());
    assert_eq!(query::structures(&world).len(), 1);
    assert_eq!(query::base_hp_percent(&world, Team::Player), 100);
    assert_eq!(query::outcome(&world), None);
    assert_eq!(query::stage_index(&world), 0);
}

proptest! {
    #[test]
    fn no_tick_advances_more_than_the_clamp(
        elapsed in prop::collection::vec(0u64..5_000, 1..30),
    ) {
        let mut world = World::new();
        let mut events = Vec::new();
        start_battle(&mut world, &mut events);
        let max_step = query::config(&world).max_step();

        for millis in elapsed {
            events.clear();
            advance(&mut world, Duration::from_millis(millis), &mut events);
            let advanced = events.iter().find_map(|event| match *event {
                Event::TimeAdvanced { dt } => Some(dt),
                _ => None,
            });
            prop_assert!(advanced.is_some_and(|dt| dt <= max_step));
        }
    }
}
