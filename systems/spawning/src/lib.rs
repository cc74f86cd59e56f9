#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that produces creatures at bases and nests.
//!
//! Every active source accumulates elapsed milliseconds and emits one
//! [`SpawnRequest`] per full interval, catching up after long ticks. A source
//! whose species already fills the team's population cap is held at exactly
//! one interval of progress until a slot frees up.

use std::time::Duration;

use lane_siege_core::{Bases, Creature, SpeciesId, Structure, StructureRole, Team, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
    jitter: bool,
    base_species: Option<SpeciesId>,
}

impl Config {
    /// Creates a configuration with jitter enabled and goblin-producing bases.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
            jitter: true,
            base_species: Some(SpeciesId::Goblin),
        }
    }

    /// Enables or disables random position and speed offsets.
    #[must_use]
    pub const fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Selects the species both bases produce; `None` disables base spawning.
    #[must_use]
    pub const fn with_base_species(mut self, species: Option<SpeciesId>) -> Self {
        self.base_species = species;
        self
    }
}

/// Creature the world should materialize this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    /// Team the creature fights for.
    pub team: Team,
    /// Species of the creature.
    pub species: SpeciesId,
    /// Spawn position.
    pub position: Vec2,
    /// Movement speed after jitter.
    pub speed: f32,
}

/// Pure system that emits spawn requests for every producing source.
#[derive(Debug)]
pub struct Spawning {
    interval_ms: f32,
    jitter: bool,
    base_species: Option<SpeciesId>,
    rng: ChaCha8Rng,
    population: Population,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval_ms: config.spawn_interval.as_secs_f32() * 1000.0,
            jitter: config.jitter,
            base_species: config.base_species,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            population: Population::default(),
        }
    }

    /// Advances every source by `dt` seconds and appends spawn requests.
    ///
    /// Bases are processed before nests, nests in slice order.
    pub fn handle(
        &mut self,
        dt: f32,
        bases: &mut Bases,
        structures: &mut [Structure],
        creatures: &[Creature],
        out: &mut Vec<SpawnRequest>,
    ) {
        if self.interval_ms <= 0.0 || dt <= 0.0 {
            return;
        }

        self.population.recount(creatures);
        let elapsed_ms = dt * 1000.0;

        if let Some(species) = self.base_species {
            for team in Team::ALL {
                let base = bases.get_mut(team);
                if !base.is_active() {
                    continue;
                }
                let origin = base.spawn_point();
                base.spawn_progress_ms += elapsed_ms;
                self.produce(team, species, origin, &mut base.spawn_progress_ms, out);
            }
        }

        for structure in structures.iter_mut() {
            if !structure.is_active() {
                continue;
            }
            let team = structure.team;
            let origin = structure.position;
            let StructureRole::Nest {
                spawn_progress_ms,
                species: Some(species),
            } = &mut structure.role
            else {
                continue;
            };
            let species = *species;
            *spawn_progress_ms += elapsed_ms;
            self.produce(team, species, origin, spawn_progress_ms, out);
        }
    }

    fn produce(
        &mut self,
        team: Team,
        species: SpeciesId,
        origin: Vec2,
        progress_ms: &mut f32,
        out: &mut Vec<SpawnRequest>,
    ) {
        let cap = species.stats().pop_cap;
        while *progress_ms >= self.interval_ms {
            if self.population.count(team, species) >= cap {
                *progress_ms = self.interval_ms;
                return;
            }
            *progress_ms -= self.interval_ms;
            self.population.add(team, species);
            out.push(self.request(team, species, origin));
        }
    }

    fn request(&mut self, team: Team, species: SpeciesId, origin: Vec2) -> SpawnRequest {
        let stats = species.stats();
        let (offset, speed_offset) = if self.jitter {
            (
                (self.rng.gen::<f32>() - 0.5) * stats.spawn_jitter,
                (self.rng.gen::<f32>() - 0.5) * stats.speed_jitter,
            )
        } else {
            (0.0, 0.0)
        };
        SpawnRequest {
            team,
            species,
            position: Vec2::new(origin.x + offset, origin.y),
            speed: stats.speed + speed_offset,
        }
    }
}

/// Live creature counts per team and species.
#[derive(Clone, Debug, Default)]
struct Population {
    counts: [[usize; SpeciesId::ALL.len()]; Team::ALL.len()],
}

impl Population {
    fn recount(&mut self, creatures: &[Creature]) {
        self.counts = Default::default();
        for creature in creatures.iter().filter(|creature| creature.is_alive()) {
            self.add(creature.team, creature.species);
        }
    }

    fn count(&self, team: Team, species: SpeciesId) -> usize {
        self.counts[team as usize][species as usize]
    }

    fn add(&mut self, team: Team, species: SpeciesId) {
        self.counts[team as usize][species as usize] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_siege_core::{BattleConfig, CreatureId};

    #[test]
    fn zero_interval_never_spawns() {
        let mut spawning = Spawning::new(Config::new(Duration::ZERO, 1));
        let mut bases = Bases::new(&BattleConfig::default().field());
        let mut out = Vec::new();

        spawning.handle(10.0, &mut bases, &mut [], &[], &mut out);

        assert!(out.is_empty());
        assert_eq!(bases.get(Team::Player).spawn_progress_ms, 0.0);
    }

    #[test]
    fn population_counts_only_live_creatures() {
        let mut creatures = vec![
            Creature::spawn(
                CreatureId::new(1),
                Team::Enemy,
                SpeciesId::Goblin,
                Vec2::ZERO,
                80.0,
            ),
            Creature::spawn(
                CreatureId::new(2),
                Team::Enemy,
                SpeciesId::Goblin,
                Vec2::ZERO,
                80.0,
            ),
        ];
        let _ = creatures[1].take_damage(10.0, 0.2);
        let mut population = Population::default();
        population.recount(&creatures);
        assert_eq!(population.count(Team::Enemy, SpeciesId::Goblin), 1);
        assert_eq!(population.count(Team::Player, SpeciesId::Goblin), 0);
    }
}
