#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for Lane Siege.
//!
//! The [`World`] owns every entity and runs the battle systems in a fixed
//! order once per tick. Entities live in vectors sorted by identifier;
//! systems mutate them in place and report creations through request buffers
//! that the world materializes with fresh identifiers. Removal is always
//! deferred to the end of the tick.

mod stages;

use std::time::Duration;

use lane_siege_core::{
    structure_index, AssignmentError, BattleConfig, Bases, BuildingKind, Command, Creature,
    CreatureId, Event, Field, Outcome, PlacementError, PlayMode, Projectile, ProjectileId,
    ProjectileLaunch, SpeciesId, StageConfig, Structure, StructureId, StructureRole, Team, Vec2,
    NEST_ASSIGNABLE_TIER, WELCOME_BANNER,
};
use lane_siege_system_combat::Combat;
use lane_siege_system_placement::{collect_obstacles, validate_placement, ConstructionTimers};
use lane_siege_system_projectiles::ProjectileFlight;
use lane_siege_system_separation::Separation;
use lane_siege_system_spawning::{Config as SpawningConfig, SpawnRequest, Spawning};
use lane_siege_system_stages::StageProgress;
use lane_siege_system_targeting::{TargetAssignments, Targeting};
use tracing::{debug, info};

/// Represents the authoritative Lane Siege battle state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: BattleConfig,
    field: Field,
    play_mode: PlayMode,
    bases: Bases,
    structures: Vec<Structure>,
    creatures: Vec<Creature>,
    projectiles: Vec<Projectile>,
    ids: IdAllocator,
    stage_config: StageConfig,
    progress: StageProgress,
    timers: ConstructionTimers,
    outcome: Option<Outcome>,
    systems: Systems,
}

impl World {
    /// Creates a world with default tuning and the one-nest skirmish layout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BattleConfig::default())
    }

    /// Creates a world with custom tuning and the one-nest skirmish layout.
    #[must_use]
    pub fn with_config(config: BattleConfig) -> Self {
        let field = config.field();
        let stage_config = StageConfig::skirmish(field.nest_position(Team::Enemy));
        let mut world = Self {
            banner: WELCOME_BANNER,
            play_mode: PlayMode::Setup,
            bases: Bases::new(&field),
            structures: Vec::new(),
            creatures: Vec::new(),
            projectiles: Vec::new(),
            ids: IdAllocator::new(),
            progress: StageProgress::new(stage_config.stages.len()),
            stage_config,
            timers: ConstructionTimers::new(config.free_build),
            outcome: None,
            systems: Systems::new(&config),
            field,
            config,
        };
        let mut initial_events = Vec::new();
        world.restart(&mut initial_events);
        world
    }

    fn restart(&mut self, out_events: &mut Vec<Event>) {
        self.play_mode = PlayMode::Setup;
        self.bases = Bases::new(&self.field);
        self.structures.clear();
        self.creatures.clear();
        self.projectiles.clear();
        self.ids = IdAllocator::new();
        self.timers = ConstructionTimers::new(self.config.free_build);
        self.outcome = None;
        self.systems = Systems::new(&self.config);
        self.progress = StageProgress::new(self.stage_config.stages.len());
        stages::apply_stage(self, 0, out_events);
    }

    fn finish(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        info!(
            winner = ?outcome.winner,
            result = outcome.result_label(),
            "battle finished"
        );
        out_events.push(Event::GameOver { outcome });
    }

    fn materialize_spawns(&mut self, out_events: &mut Vec<Event>) {
        for request in self.systems.spawn_requests.drain(..) {
            let SpawnRequest {
                team,
                species,
                position,
                speed,
            } = request;
            let id = self.ids.next_creature();
            self.creatures
                .push(Creature::spawn(id, team, species, position, speed));
            debug!(creature = id.get(), ?team, ?species, "creature spawned");
            out_events.push(Event::CreatureSpawned {
                creature: id,
                team,
                species,
                position,
            });
        }
    }

    fn materialize_launches(&mut self, out_events: &mut Vec<Event>) {
        for launch in self.systems.launches.drain(..) {
            let id = self.ids.next_projectile();
            let team = launch.team;
            self.projectiles.push(launch.into_projectile(id));
            out_events.push(Event::ProjectileFired {
                projectile: id,
                team,
            });
        }
    }

    fn remove_spent_projectiles(&mut self) {
        if self.systems.spent.is_empty() {
            return;
        }
        let spent = &mut self.systems.spent;
        spent.sort_unstable();
        self.projectiles
            .retain(|projectile| spent.binary_search(&projectile.id).is_err());
        spent.clear();
    }

    fn remove_expired_creatures(&mut self, out_events: &mut Vec<Event>) {
        self.creatures.retain(|creature| {
            if creature.is_expired() {
                out_events.push(Event::CreatureRemoved {
                    creature: creature.id,
                });
                false
            } else {
                true
            }
        });
    }

    fn check_stage(&mut self, out_events: &mut Vec<Event>) {
        let Some(stage) = self.stage_config.stages.get(self.progress.index()) else {
            return;
        };
        if !lane_siege_system_stages::should_advance(stage, self.bases.get(Team::Enemy)) {
            return;
        }
        match self.progress.advance() {
            Some(next) => stages::apply_stage(self, next, out_events),
            None => self.finish(Outcome::won_by(Team::Player), out_events),
        }
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
        Command::Tick { dt } => advance(world, dt, out_events),
        Command::SetPlayMode { mode } => set_play_mode(world, mode, out_events),
        Command::PlaceStructure {
            team,
            kind,
            position,
        } => {
            let _ = commit_placement(world, team, kind, position, out_events);
        }
        Command::AssignSpecies { nest, species } => {
            let _ = assign_species(world, nest, species, out_events);
        }
        Command::LoadStages { config } => load_stages(world, config, out_events),
        Command::Reset => reset(world, out_events),
    }
}

/// Advances the simulation by `dt`, clamped to the configured maximum step.
///
/// Construction timers run in every play mode. The battle systems only run
/// in [`PlayMode::Battle`], in this order: spawning, targeting, combat and
/// tower fire, projectiles, separation, corpse removal, stage check. Once the
/// battle is over nothing changes until [`reset`].
pub fn advance(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    if world.outcome.is_some() {
        return;
    }
    let dt = dt.min(world.config.max_step());
    out_events.push(Event::TimeAdvanced { dt });
    world.timers.tick(dt);

    let seconds = dt.as_secs_f32();
    if world.play_mode != PlayMode::Battle || seconds <= 0.0 {
        return;
    }

    world.systems.spawning.handle(
        seconds,
        &mut world.bases,
        &mut world.structures,
        &world.creatures,
        &mut world.systems.spawn_requests,
    );
    world.materialize_spawns(out_events);

    world.systems.targeting.handle(
        &world.config,
        &world.creatures,
        &world.structures,
        &mut world.systems.assignments,
    );

    let outcome = world.systems.combat.handle(
        &world.config,
        seconds,
        &mut world.creatures,
        &mut world.structures,
        &mut world.bases,
        &world.systems.assignments,
        &mut world.systems.launches,
        out_events,
    );
    if let Some(outcome) = outcome {
        world.finish(outcome, out_events);
        return;
    }
    world.systems.combat.fire_towers(
        seconds,
        &mut world.structures,
        &world.creatures,
        &world.systems.assignments,
        &mut world.systems.launches,
    );
    world.materialize_launches(out_events);

    let outcome = world.systems.flight.handle(
        &world.config,
        seconds,
        &mut world.projectiles,
        &mut world.creatures,
        &mut world.structures,
        &mut world.bases,
        &mut world.systems.spent,
        out_events,
    );
    if let Some(outcome) = outcome {
        world.finish(outcome, out_events);
        return;
    }
    world.remove_spent_projectiles();

    world.systems.separation.handle(
        &world.config,
        &mut world.creatures,
        &world.structures,
        &world.bases,
    );

    world.remove_expired_creatures(out_events);
    world.check_stage(out_events);
}

/// Switches between setup and battle. A finished battle cannot resume.
pub fn set_play_mode(world: &mut World, mode: PlayMode, out_events: &mut Vec<Event>) {
    if world.play_mode == mode || (world.outcome.is_some() && mode == PlayMode::Battle) {
        return;
    }
    world.play_mode = mode;
    info!(?mode, "play mode changed");
    out_events.push(Event::PlayModeChanged { mode });
}

/// Validates and commits a building placement for `team`.
///
/// On success the structure is created at the snapped point, the kind's
/// construction timer starts and the new identifier is returned. Failures
/// leave the world untouched and report a [`Event::PlacementRejected`].
pub fn commit_placement(
    world: &mut World,
    team: Team,
    kind: BuildingKind,
    point: Vec2,
    out_events: &mut Vec<Event>,
) -> Option<StructureId> {
    let snapped = match placement_point(world, team, kind, point) {
        Ok(snapped) => snapped,
        Err(reason) => {
            debug!(?team, ?kind, ?reason, "placement rejected");
            out_events.push(Event::PlacementRejected { team, kind, reason });
            return None;
        }
    };

    let id = world.ids.next_structure();
    world
        .structures
        .push(Structure::new(id, team, kind, snapped, None));
    world.timers.start(team, kind);
    debug!(structure = id.get(), ?team, ?kind, x = snapped.x, y = snapped.y, "structure placed");
    out_events.push(Event::StructurePlaced {
        structure: id,
        team,
        kind,
        position: snapped,
    });
    Some(id)
}

fn placement_point(
    world: &World,
    team: Team,
    kind: BuildingKind,
    point: Vec2,
) -> Result<Vec2, PlacementError> {
    if world.outcome.is_some() {
        return Err(PlacementError::BattleOver);
    }
    if !world.timers.is_ready(team, kind) {
        return Err(PlacementError::UnderConstruction);
    }
    if !point.is_finite() || !world.field.build_zone(team).contains(point) {
        return Err(PlacementError::OutsideZone);
    }
    query::validate_placement(world, team, kind, point).ok_or(PlacementError::NoClearSpot)
}

/// Assigns the species a nest produces.
///
/// Returns `false` without mutating anything when the nest is missing,
/// destroyed, not a nest, or the species' tier cannot be assigned.
pub fn assign_species(
    world: &mut World,
    nest: StructureId,
    species: SpeciesId,
    out_events: &mut Vec<Event>,
) -> bool {
    let result = species_slot(world, nest, species);
    match result {
        Ok(index) => {
            if let StructureRole::Nest {
                species: assigned, ..
            } = &mut world.structures[index].role
            {
                *assigned = Some(species);
            }
            debug!(nest = nest.get(), ?species, "species assigned");
            out_events.push(Event::SpeciesAssigned { nest, species });
            true
        }
        Err(reason) => {
            out_events.push(Event::SpeciesAssignmentRejected {
                nest,
                species,
                reason,
            });
            false
        }
    }
}

fn species_slot(
    world: &World,
    nest: StructureId,
    species: SpeciesId,
) -> Result<usize, AssignmentError> {
    if world.outcome.is_some() {
        return Err(AssignmentError::BattleOver);
    }
    let index = structure_index(&world.structures, nest).ok_or(AssignmentError::MissingNest)?;
    let structure = &world.structures[index];
    if structure.kind() != BuildingKind::Nest {
        return Err(AssignmentError::NotANest);
    }
    if !structure.is_active() {
        return Err(AssignmentError::Destroyed);
    }
    if species.stats().tier != NEST_ASSIGNABLE_TIER {
        return Err(AssignmentError::WrongTier);
    }
    Ok(index)
}

/// Replaces the stage list and restarts the battle on its first stage.
pub fn load_stages(world: &mut World, mut config: StageConfig, out_events: &mut Vec<Event>) {
    config.normalize();
    info!(
        stages = config.stages.len(),
        boss = config.is_boss_battle,
        "stage list loaded"
    );
    world.stage_config = config;
    reset(world, out_events);
}

/// Restores the initial battle state of the current stage list.
pub fn reset(world: &mut World, out_events: &mut Vec<Event>) {
    out_events.push(Event::BattleReset);
    world.restart(out_events);
}

/// Monotonic identifier counters, restarted on reset.
#[derive(Debug)]
struct IdAllocator {
    next_creature: u32,
    next_structure: u32,
    next_projectile: u32,
}

impl IdAllocator {
    const fn new() -> Self {
        Self {
            next_creature: 1,
            next_structure: 1,
            next_projectile: 1,
        }
    }

    fn next_creature(&mut self) -> CreatureId {
        let id = CreatureId::new(self.next_creature);
        self.next_creature = self.next_creature.saturating_add(1);
        id
    }

    fn next_structure(&mut self) -> StructureId {
        let id = StructureId::new(self.next_structure);
        self.next_structure = self.next_structure.saturating_add(1);
        id
    }

    fn next_projectile(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.saturating_add(1);
        id
    }
}

/// Battle systems together with the buffers they exchange every tick.
#[derive(Debug)]
struct Systems {
    spawning: Spawning,
    targeting: Targeting,
    combat: Combat,
    flight: ProjectileFlight,
    separation: Separation,
    spawn_requests: Vec<SpawnRequest>,
    assignments: TargetAssignments,
    launches: Vec<ProjectileLaunch>,
    spent: Vec<ProjectileId>,
}

impl Systems {
    fn new(config: &BattleConfig) -> Self {
        let spawning = SpawningConfig::new(config.spawn_interval(), config.rng_seed)
            .with_jitter(config.spawn_jitter)
            .with_base_species(config.base_spawn_species);
        Self {
            spawning: Spawning::new(spawning),
            targeting: Targeting::new(),
            combat: Combat::new(),
            flight: ProjectileFlight::new(),
            separation: Separation::new(),
            spawn_requests: Vec::new(),
            assignments: TargetAssignments::default(),
            launches: Vec::new(),
            spent: Vec::new(),
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use lane_siege_core::{
        creature_index, structure_index, BattleConfig, Bases, BuildingKind, Creature, CreatureId,
        Field, Outcome, PlayMode, Projectile, Rect, SpeciesId, StageConfig, Structure,
        StructureId, StructureRole, Team, Vec2,
    };
    use lane_siege_system_placement::ConstructionStatus;

    use super::{collect_obstacles, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Tuning the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &BattleConfig {
        &world.config
    }

    /// Field geometry derived from the tuning.
    #[must_use]
    pub fn field(world: &World) -> &Field {
        &world.field
    }

    /// Current play mode.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Both team bases.
    #[must_use]
    pub fn bases(world: &World) -> &Bases {
        &world.bases
    }

    /// Remaining base hit points of `team` as a whole, non-negative percentage.
    #[must_use]
    pub fn base_hp_percent(world: &World, team: Team) -> u32 {
        world.bases.get(team).hp_percent()
    }

    /// Every structure of both teams, destroyed ones included, by id.
    #[must_use]
    pub fn structures(world: &World) -> &[Structure] {
        &world.structures
    }

    /// Looks up a structure by identifier.
    #[must_use]
    pub fn structure(world: &World, id: StructureId) -> Option<&Structure> {
        structure_index(&world.structures, id).map(|index| &world.structures[index])
    }

    /// Every creature, lingering corpses included, by id.
    #[must_use]
    pub fn creatures(world: &World) -> &[Creature] {
        &world.creatures
    }

    /// Looks up a creature by identifier.
    #[must_use]
    pub fn creature(world: &World, id: CreatureId) -> Option<&Creature> {
        creature_index(&world.creatures, id).map(|index| &world.creatures[index])
    }

    /// Projectiles in flight, by id.
    #[must_use]
    pub fn projectiles(world: &World) -> &[Projectile] {
        &world.projectiles
    }

    /// Outcome of a finished battle.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Reports whether the game-over latch is set.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.outcome.is_some()
    }

    /// `Victory` or `Defeat` once the battle is over.
    #[must_use]
    pub fn result_label(world: &World) -> Option<&'static str> {
        world.outcome.as_ref().map(Outcome::result_label)
    }

    /// Zero-based index of the running stage.
    #[must_use]
    pub fn stage_index(world: &World) -> usize {
        world.progress.index()
    }

    /// Label of the running stage, such as `Stage 1/3`.
    #[must_use]
    pub fn stage_label(world: &World) -> String {
        world.progress.label()
    }

    /// Stage list driving the battle.
    #[must_use]
    pub fn stage_config(world: &World) -> &StageConfig {
        &world.stage_config
    }

    /// Build zone of `team`.
    #[must_use]
    pub fn build_zone(world: &World, team: Team) -> Rect {
        world.field.build_zone(team)
    }

    /// Snapped placement point for a building of `kind`, or `None` when the
    /// point is outside the zone or no clear spot exists nearby.
    #[must_use]
    pub fn validate_placement(
        world: &World,
        team: Team,
        kind: BuildingKind,
        point: Vec2,
    ) -> Option<Vec2> {
        let mut obstacles = Vec::with_capacity(world.structures.len() + 2);
        collect_obstacles(&world.bases, &world.structures, &mut obstacles);
        super::validate_placement(&world.config, &world.field, team, kind, point, &obstacles)
    }

    /// Running construction countdown of `kind` for `team`, if any.
    #[must_use]
    pub fn construction_status(
        world: &World,
        team: Team,
        kind: BuildingKind,
    ) -> Option<ConstructionStatus> {
        world.timers.status(team, kind)
    }

    /// Live creatures of a species against its population cap.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PopulationUsage {
        /// Live creatures of the species on the team.
        pub live: usize,
        /// Population cap of the species.
        pub cap: usize,
    }

    /// Population usage of `species` on `team`.
    #[must_use]
    pub fn population(world: &World, team: Team, species: SpeciesId) -> PopulationUsage {
        let live = world
            .creatures
            .iter()
            .filter(|creature| {
                creature.is_alive() && creature.team == team && creature.species == species
            })
            .count();
        PopulationUsage {
            live,
            cap: species.stats().pop_cap,
        }
    }

    /// Spawn progress of a nest as a whole percentage of the interval.
    ///
    /// `None` for missing structures and non-nests.
    #[must_use]
    pub fn nest_spawn_percent(world: &World, nest: StructureId) -> Option<u32> {
        let structure = structure(world, nest)?;
        let StructureRole::Nest {
            spawn_progress_ms, ..
        } = structure.role
        else {
            return None;
        };
        let interval_ms = world.config.spawn_interval().as_secs_f32() * 1000.0;
        if interval_ms <= 0.0 {
            return Some(0);
        }
        Some(
            (spawn_progress_ms / interval_ms * 100.0)
                .round()
                .clamp(0.0, 100.0) as u32,
        )
    }
}
