#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks a target for every live creature and tower.
//!
//! Creatures search for the closest opposing creature or structure inside the
//! aggro radius and fall back to the opposing base. Two species-level group
//! behaviours then override the individual picks: gang-up focus fire and pack
//! target sharing with centroid cohesion.

use lane_siege_core::{
    creature_index, BattleConfig, BuildingKind, Creature, CreatureId, GroupBehavior, SpeciesId,
    Structure, StructureId, StructureRole, Target, Team, Vec2, TOWER_WEAPON,
};

/// Target chosen for a single creature this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreatureTarget {
    /// Creature the assignment belongs to.
    pub creature: CreatureId,
    /// Entity the creature should engage.
    pub target: Target,
    /// Flock centroid the creature's movement is blended toward, if any.
    pub cohesion: Option<Vec2>,
}

/// Creature a tower should fire at this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower the assignment belongs to.
    pub tower: StructureId,
    /// Creature the tower should shoot.
    pub creature: CreatureId,
}

/// Targets of every live creature and every tower with a creature in range.
///
/// Both lists are ordered by ascending identifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetAssignments {
    /// Creature assignments.
    pub creatures: Vec<CreatureTarget>,
    /// Tower assignments.
    pub towers: Vec<TowerTarget>,
}

impl TargetAssignments {
    /// Removes every assignment while keeping the allocations.
    pub fn clear(&mut self) {
        self.creatures.clear();
        self.towers.clear();
    }

    /// Assignment of the provided creature, if it is alive.
    #[must_use]
    pub fn creature(&self, id: CreatureId) -> Option<&CreatureTarget> {
        self.creatures
            .binary_search_by_key(&id, |assignment| assignment.creature)
            .ok()
            .map(|index| &self.creatures[index])
    }

    /// Creature the provided tower should shoot, if any.
    #[must_use]
    pub fn tower(&self, id: StructureId) -> Option<CreatureId> {
        self.towers
            .binary_search_by_key(&id, |assignment| assignment.tower)
            .ok()
            .map(|index| self.towers[index].creature)
    }
}

/// Targeting system that reuses scratch buffers across ticks.
#[derive(Debug, Default)]
pub struct Targeting {
    live: Vec<usize>,
    members: Vec<usize>,
}

impl Targeting {
    /// Creates a targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes targets from the pre-combat snapshot.
    ///
    /// `creatures` and `structures` must be sorted by identifier. The output
    /// buffer is cleared before it is populated.
    pub fn handle(
        &mut self,
        config: &BattleConfig,
        creatures: &[Creature],
        structures: &[Structure],
        out: &mut TargetAssignments,
    ) {
        out.clear();
        self.live.clear();

        for (index, creature) in creatures.iter().enumerate() {
            if !creature.is_alive() {
                continue;
            }
            self.live.push(index);
            out.creatures.push(CreatureTarget {
                creature: creature.id,
                target: find_target(config, creature, creatures, structures),
                cohesion: None,
            });
        }

        for species in SpeciesId::ALL {
            match species.stats().behavior {
                GroupBehavior::Independent => {}
                GroupBehavior::GangUp => self.apply_gang_up(config, species, creatures, out),
                GroupBehavior::Pack => {
                    for team in Team::ALL {
                        self.apply_pack(team, species, creatures, out);
                    }
                }
            }
        }

        for structure in structures {
            if !structure.is_active() || !matches!(structure.role, StructureRole::Tower { .. }) {
                continue;
            }
            if let Some(creature) = closest_creature_in_range(
                structure.position,
                TOWER_WEAPON.range,
                structure.team.opponent(),
                creatures,
            ) {
                out.towers.push(TowerTarget {
                    tower: structure.id,
                    creature,
                });
            }
        }
    }

    fn collect_members(&mut self, team: Team, species: SpeciesId, creatures: &[Creature]) {
        self.members.clear();
        for (slot, &index) in self.live.iter().enumerate() {
            let creature = &creatures[index];
            if creature.team == team && creature.species == species {
                self.members.push(slot);
            }
        }
    }

    /// Player-side members all focus the first enemy creature a member is
    /// already in weapon reach of.
    fn apply_gang_up(
        &mut self,
        config: &BattleConfig,
        species: SpeciesId,
        creatures: &[Creature],
        out: &mut TargetAssignments,
    ) {
        self.collect_members(Team::Player, species, creatures);

        let forced = self.members.iter().find_map(|&slot| {
            let Target::Creature(id) = out.creatures[slot].target else {
                return None;
            };
            let attacker = &creatures[self.live[slot]];
            let victim = &creatures[creature_index(creatures, id)?];
            (victim.is_alive()
                && victim.team != attacker.team
                && attacker.reaches_creature(victim, config.creature_contact_padding))
            .then_some(Target::Creature(id))
        });

        if let Some(target) = forced {
            for &slot in &self.members {
                out.creatures[slot].target = target;
            }
        }
    }

    /// Members of a flock share the first non-base target and drift toward
    /// their centroid.
    fn apply_pack(
        &mut self,
        team: Team,
        species: SpeciesId,
        creatures: &[Creature],
        out: &mut TargetAssignments,
    ) {
        self.collect_members(team, species, creatures);
        if self.members.len() < 2 {
            return;
        }

        let sum = self
            .members
            .iter()
            .fold(Vec2::ZERO, |acc, &slot| acc + creatures[self.live[slot]].position);
        let centroid = sum / self.members.len() as f32;

        let shared = self
            .members
            .iter()
            .map(|&slot| out.creatures[slot].target)
            .find(|target| !matches!(target, Target::Base(_)));

        for &slot in &self.members {
            let assignment = &mut out.creatures[slot];
            if let Some(target) = shared {
                assignment.target = target;
            }
            assignment.cohesion = Some(centroid);
        }
    }
}

/// Finds the closest opposing entity inside the aggro radius.
///
/// Exact distance ties prefer creatures over structures, then nests over
/// walls over towers, then the lowest identifier. Without any candidate the
/// opposing base is returned.
#[must_use]
pub fn find_target(
    config: &BattleConfig,
    creature: &Creature,
    creatures: &[Creature],
    structures: &[Structure],
) -> Target {
    let opposing = creature.team.opponent();
    let mut best: Option<Candidate> = None;

    let mut consider = |candidate: Candidate| {
        if candidate.distance > config.aggro_radius {
            return;
        }
        match &mut best {
            Some(existing) => {
                if candidate.precedes(existing) {
                    *existing = candidate;
                }
            }
            None => best = Some(candidate),
        }
    };

    if config.creatures_can_fight {
        for other in creatures {
            if other.team != opposing || !other.is_alive() {
                continue;
            }
            consider(Candidate {
                distance: creature.position.distance(other.position),
                rank: CREATURE_RANK,
                id: other.id.get(),
                target: Target::Creature(other.id),
            });
        }
    }

    for structure in structures {
        if structure.team != opposing || !structure.is_active() {
            continue;
        }
        consider(Candidate {
            distance: creature.position.distance(structure.position),
            rank: structure_rank(structure.kind()),
            id: structure.id.get(),
            target: Target::Structure(structure.id),
        });
    }

    best.map_or(Target::Base(opposing), |candidate| candidate.target)
}

/// Closest live creature of `team` strictly inside `range` of `origin`.
///
/// Ties resolve to the lowest identifier.
#[must_use]
pub fn closest_creature_in_range(
    origin: Vec2,
    range: f32,
    team: Team,
    creatures: &[Creature],
) -> Option<CreatureId> {
    let mut best: Option<(f32, CreatureId)> = None;
    for creature in creatures {
        if creature.team != team || !creature.is_alive() {
            continue;
        }
        let distance = origin.distance(creature.position);
        if distance >= range {
            continue;
        }
        let better = match best {
            Some((best_distance, best_id)) => {
                distance < best_distance || (distance == best_distance && creature.id < best_id)
            }
            None => true,
        };
        if better {
            best = Some((distance, creature.id));
        }
    }
    best.map(|(_, id)| id)
}

const CREATURE_RANK: u8 = 0;

const fn structure_rank(kind: BuildingKind) -> u8 {
    1 + kind.priority()
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    distance: f32,
    rank: u8,
    id: u32,
    target: Target,
}

impl Candidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        if self.rank != other.rank {
            return self.rank < other.rank;
        }

        self.id < other.id
    }
}
