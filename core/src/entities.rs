//! Plain records for every entity that lives on the battle field.

use glam::Vec2;

use crate::catalog::{AttackStyle, BuildingKind, SpeciesId, BASE_STATS};
use crate::config::Field;
use crate::damage::CombatProfile;
use crate::geometry::Rect;
use crate::{CreatureId, Outcome, ProjectileId, StructureId, Team};

/// Entity a creature or projectile is aimed at.
///
/// Only identifiers are stored; consumers re-resolve them every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// A creature, valid while it is alive.
    Creature(CreatureId),
    /// A nest, wall or tower, valid while it has hit points.
    Structure(StructureId),
    /// The base of the given team, always valid.
    Base(Team),
}

/// Mobile combatant produced by a base or nest.
#[derive(Clone, Debug, PartialEq)]
pub struct Creature {
    /// Unique identifier.
    pub id: CreatureId,
    /// Side the creature fights for.
    pub team: Team,
    /// Species the creature belongs to.
    pub species: SpeciesId,
    /// Centre in field coordinates.
    pub position: Vec2,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Keys into the damage tables.
    pub profile: CombatProfile,
    /// Melee or ranged delivery.
    pub attack: AttackStyle,
    /// Base damage per strike.
    pub damage: f32,
    /// Remaining hit points.
    pub hp: f32,
    /// Hit points at spawn.
    pub max_hp: f32,
    /// Seconds until the next strike is allowed.
    pub attack_cooldown: f32,
    /// Seconds until the pending strike lands.
    pub attack_windup: f32,
    /// Whether the creature received its killing blow.
    pub is_dead: bool,
    /// Seconds left before a dead creature is removed.
    pub death_timer: f32,
}

impl Creature {
    /// Creates a fresh creature with the species' stats for `team`.
    #[must_use]
    pub fn spawn(
        id: CreatureId,
        team: Team,
        species: SpeciesId,
        position: Vec2,
        speed: f32,
    ) -> Self {
        let stats = species.stats();
        let max_hp = stats.max_hp(team);
        Self {
            id,
            team,
            species,
            position,
            speed,
            radius: stats.radius,
            profile: stats.profile,
            attack: stats.attack,
            damage: stats.damage,
            hp: max_hp,
            max_hp,
            attack_cooldown: 0.0,
            attack_windup: 0.0,
            is_dead: false,
            death_timer: 0.0,
        }
    }

    /// Reports whether the creature can still act and be targeted.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// Applies damage and starts the death linger on the killing blow.
    ///
    /// Returns `true` only for the hit that killed the creature. Dead
    /// creatures ignore further damage.
    pub fn take_damage(&mut self, amount: f32, death_delay: f32) -> bool {
        if self.is_dead {
            return false;
        }
        self.hp = (self.hp - amount).max(0.0);
        if self.hp > 0.0 {
            return false;
        }
        self.is_dead = true;
        self.death_timer = death_delay;
        self.attack_windup = 0.0;
        true
    }

    /// Reports whether a dead creature finished lingering.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_dead && self.death_timer <= 0.0
    }

    /// Remaining hit points as a whole percentage.
    #[must_use]
    pub fn hp_percent(&self) -> u32 {
        percent(self.hp, self.max_hp)
    }

    /// Reports whether `other` lies within this creature's weapon reach.
    #[must_use]
    pub fn reaches_creature(&self, other: &Creature, contact_padding: f32) -> bool {
        let distance = self.position.distance(other.position);
        match self.attack {
            AttackStyle::Melee => distance <= self.radius + other.radius + contact_padding,
            AttackStyle::Ranged { range, .. } => distance <= range,
        }
    }

    /// Reports whether the rectangle lies within this creature's weapon reach.
    #[must_use]
    pub fn reaches_rect(&self, rect: &Rect, building_padding: f32) -> bool {
        let distance = self.position.distance(rect.closest_point(self.position));
        match self.attack {
            AttackStyle::Melee => distance <= self.radius + building_padding,
            AttackStyle::Ranged { range, .. } => distance <= range,
        }
    }
}

/// Kind-specific state of a structure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StructureRole {
    /// Spawner with its own production accumulator.
    Nest {
        /// Milliseconds accumulated toward the next spawn.
        spawn_progress_ms: f32,
        /// Species produced by the nest, if one was assigned.
        species: Option<SpeciesId>,
    },
    /// Passive blocker.
    Wall,
    /// Turret with a shot cooldown.
    Tower {
        /// Seconds until the tower may fire again.
        fire_cooldown: f32,
    },
}

/// Building owned by one of the teams.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    /// Unique identifier.
    pub id: StructureId,
    /// Owning team.
    pub team: Team,
    /// Centre in field coordinates.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: f32,
    /// Hit points at placement.
    pub max_hp: f32,
    /// Kind-specific state.
    pub role: StructureRole,
}

impl Structure {
    /// Creates a structure at full health. `species` is only kept by nests.
    #[must_use]
    pub fn new(
        id: StructureId,
        team: Team,
        kind: BuildingKind,
        position: Vec2,
        species: Option<SpeciesId>,
    ) -> Self {
        let role = match kind {
            BuildingKind::Nest => StructureRole::Nest {
                spawn_progress_ms: 0.0,
                species,
            },
            BuildingKind::Wall => StructureRole::Wall,
            BuildingKind::Tower => StructureRole::Tower { fire_cooldown: 0.0 },
        };
        let max_hp = kind.stats().max_hp;
        Self {
            id,
            team,
            position,
            hp: max_hp,
            max_hp,
            role,
        }
    }

    /// Building kind of the structure.
    #[must_use]
    pub const fn kind(&self) -> BuildingKind {
        match self.role {
            StructureRole::Nest { .. } => BuildingKind::Nest,
            StructureRole::Wall => BuildingKind::Wall,
            StructureRole::Tower { .. } => BuildingKind::Tower,
        }
    }

    /// Footprint of the structure.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.kind().stats().size)
    }

    /// Destroyed structures stay in the set but are ignored by every system.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.hp > 0.0
    }

    /// Applies damage, clamping hit points at zero.
    ///
    /// Returns `true` for the hit that destroyed the structure. A destroyed
    /// nest loses its spawn progress.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.hp = (self.hp - amount).max(0.0);
        if self.hp > 0.0 {
            return false;
        }
        if let StructureRole::Nest {
            spawn_progress_ms, ..
        } = &mut self.role
        {
            *spawn_progress_ms = 0.0;
        }
        true
    }

    /// Species produced by a nest, `None` for other kinds.
    #[must_use]
    pub const fn assigned_species(&self) -> Option<SpeciesId> {
        match self.role {
            StructureRole::Nest { species, .. } => species,
            _ => None,
        }
    }

    /// Remaining hit points as a whole percentage.
    #[must_use]
    pub fn hp_percent(&self) -> u32 {
        percent(self.hp, self.max_hp)
    }
}

/// Headquarters of a team; destroying it ends the match.
#[derive(Clone, Debug, PartialEq)]
pub struct Base {
    /// Owning team.
    pub team: Team,
    /// Centre in field coordinates.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: f32,
    /// Hit points at the start of a battle.
    pub max_hp: f32,
    /// Milliseconds accumulated toward the next spawn.
    pub spawn_progress_ms: f32,
}

impl Base {
    /// Creates a full-health base anchored on the team's field edge.
    #[must_use]
    pub fn new(team: Team, field: &Field) -> Self {
        Self {
            team,
            position: field.base_position(team),
            hp: BASE_STATS.max_hp,
            max_hp: BASE_STATS.max_hp,
            spawn_progress_ms: 0.0,
        }
    }

    /// Footprint of the base.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, BASE_STATS.size)
    }

    /// Whether the base still stands.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.hp > 0.0
    }

    /// Remaining hit points as a whole percentage, never negative.
    #[must_use]
    pub fn hp_percent(&self) -> u32 {
        percent(self.hp, self.max_hp)
    }

    /// Point on the edge facing the middle of the field where creatures emerge.
    #[must_use]
    pub fn spawn_point(&self) -> Vec2 {
        let rect = self.rect();
        match self.team {
            Team::Player => Vec2::new(self.position.x, rect.top()),
            Team::Enemy => Vec2::new(self.position.x, rect.bottom()),
        }
    }
}

/// Both team bases.
#[derive(Clone, Debug, PartialEq)]
pub struct Bases {
    player: Base,
    enemy: Base,
}

impl Bases {
    /// Creates full-health bases for both teams.
    #[must_use]
    pub fn new(field: &Field) -> Self {
        Self {
            player: Base::new(Team::Player, field),
            enemy: Base::new(Team::Enemy, field),
        }
    }

    /// Base owned by `team`.
    #[must_use]
    pub const fn get(&self, team: Team) -> &Base {
        match team {
            Team::Player => &self.player,
            Team::Enemy => &self.enemy,
        }
    }

    /// Mutable base owned by `team`.
    pub fn get_mut(&mut self, team: Team) -> &mut Base {
        match team {
            Team::Player => &mut self.player,
            Team::Enemy => &mut self.enemy,
        }
    }

    /// Iterates both bases in team order.
    pub fn iter(&self) -> impl Iterator<Item = &Base> {
        [&self.player, &self.enemy].into_iter()
    }

    /// Damages the team's base and reports the outcome once a base falls.
    ///
    /// The player base is checked first, so simultaneous destruction counts
    /// as a defeat.
    pub fn apply_damage(&mut self, team: Team, amount: f32) -> Option<Outcome> {
        let base = self.get_mut(team);
        base.hp = (base.hp - amount).max(0.0);
        self.outcome()
    }

    /// Outcome implied by the current base hit points, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        if self.player.hp <= 0.0 {
            Some(Outcome::won_by(Team::Enemy))
        } else if self.enemy.hp <= 0.0 {
            Some(Outcome::won_by(Team::Player))
        } else {
            None
        }
    }
}

/// Homing shot in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Unique identifier.
    pub id: ProjectileId,
    /// Team that fired the shot.
    pub team: Team,
    /// Centre in field coordinates.
    pub position: Vec2,
    /// Travel speed in units per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Damage applied on impact.
    pub damage: f32,
    /// Attacker profile; creature-fired shots carry one, tower shots do not.
    pub profile: Option<CombatProfile>,
    /// Entity the shot homes in on.
    pub target: Target,
    /// Current bearing in radians, measured from the +x axis.
    pub heading: f32,
}

/// Request to launch a projectile; the world assigns its identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileLaunch {
    /// Team that fires the shot.
    pub team: Team,
    /// Launch point.
    pub position: Vec2,
    /// Travel speed in units per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Damage applied on impact.
    pub damage: f32,
    /// Attacker profile for type and element modifiers.
    pub profile: Option<CombatProfile>,
    /// Entity the shot homes in on.
    pub target: Target,
    /// Initial bearing toward the target point.
    pub heading: f32,
}

impl ProjectileLaunch {
    /// Materializes the launch request with the provided identifier.
    #[must_use]
    pub fn into_projectile(self, id: ProjectileId) -> Projectile {
        Projectile {
            id,
            team: self.team,
            position: self.position,
            speed: self.speed,
            radius: self.radius,
            damage: self.damage,
            profile: self.profile,
            target: self.target,
            heading: self.heading,
        }
    }
}

/// Index of the creature with `id` in a slice sorted by identifier.
#[must_use]
pub fn creature_index(creatures: &[Creature], id: CreatureId) -> Option<usize> {
    creatures
        .binary_search_by_key(&id, |creature| creature.id)
        .ok()
}

/// Index of the structure with `id` in a slice sorted by identifier.
#[must_use]
pub fn structure_index(structures: &[Structure], id: StructureId) -> Option<usize> {
    structures
        .binary_search_by_key(&id, |structure| structure.id)
        .ok()
}

fn percent(hp: f32, max_hp: f32) -> u32 {
    if max_hp <= 0.0 {
        return 0;
    }
    (hp / max_hp * 100.0).round().max(0.0) as u32
}
