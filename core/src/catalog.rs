//! Static stat tables for every species and building kind.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::damage::{AttackType, CombatProfile, Element};
use crate::Team;

/// Production tier of a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Rank-and-file creature that any nest may produce.
    Unit,
    /// Powerful creature reserved for stage-configured enemy nests.
    Elite,
}

/// Tier that player nest assignments are restricted to.
pub const NEST_ASSIGNABLE_TIER: Tier = Tier::Unit;

/// Group behaviour layered on top of the standard target search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupBehavior {
    /// Every member picks its own nearest target.
    Independent,
    /// Player-side members focus whatever enemy creature the first engaged
    /// member is already fighting.
    GangUp,
    /// Members share one target and drift toward the flock centroid.
    Pack,
}

/// How a species delivers damage once its windup completes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttackStyle {
    /// Damage lands immediately on contact.
    Melee,
    /// A homing projectile is launched toward the target.
    Ranged {
        /// Maximum centre distance at which the creature opens fire.
        range: f32,
        /// Travel speed of launched projectiles in units per second.
        projectile_speed: f32,
        /// Collision radius of launched projectiles.
        projectile_radius: f32,
    },
}

/// Identifier of a creature species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesId {
    /// Weak melee swarmer.
    Goblin,
    /// Small fire-breathing flyer that hunts in packs.
    PupDragon,
    /// Slow, heavily armoured elite bruiser.
    Golem,
}

impl SpeciesId {
    /// Every species in catalog order.
    pub const ALL: [SpeciesId; 3] = [SpeciesId::Goblin, SpeciesId::PupDragon, SpeciesId::Golem];

    /// Interchange key used by stage files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Goblin => "goblin",
            Self::PupDragon => "pupdragon",
            Self::Golem => "golem",
        }
    }

    /// Parses an interchange key, returning `None` for unknown species.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|species| species.key() == key)
    }

    /// Static stats of the species.
    #[must_use]
    pub fn stats(self) -> &'static SpeciesStats {
        match self {
            Self::Goblin => &GOBLIN,
            Self::PupDragon => &PUP_DRAGON,
            Self::Golem => &GOLEM,
        }
    }
}

/// Static tuning of a single species.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeciesStats {
    /// Display name.
    pub name: &'static str,
    /// Production tier.
    pub tier: Tier,
    /// Hit points of player-side members.
    pub player_max_hp: f32,
    /// Hit points of enemy-side members.
    pub enemy_max_hp: f32,
    /// Base damage per strike or projectile.
    pub damage: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Maximum live members per team.
    pub pop_cap: usize,
    /// Maximum positional offset applied when spawning.
    pub spawn_jitter: f32,
    /// Maximum speed offset applied when spawning.
    pub speed_jitter: f32,
    /// Keys into the damage tables.
    pub profile: CombatProfile,
    /// Melee or ranged delivery.
    pub attack: AttackStyle,
    /// Group behaviour override.
    pub behavior: GroupBehavior,
}

impl SpeciesStats {
    /// Hit points a freshly spawned member of `team` starts with.
    #[must_use]
    pub const fn max_hp(&self, team: Team) -> f32 {
        match team {
            Team::Player => self.player_max_hp,
            Team::Enemy => self.enemy_max_hp,
        }
    }
}

static GOBLIN: SpeciesStats = SpeciesStats {
    name: "Goblin",
    tier: Tier::Unit,
    player_max_hp: 2.0,
    enemy_max_hp: 5.0,
    damage: 1.0,
    speed: 80.0,
    radius: 9.0,
    pop_cap: 8,
    spawn_jitter: 24.0,
    speed_jitter: 10.0,
    profile: CombatProfile::new(Some(AttackType::Melee), None),
    attack: AttackStyle::Melee,
    behavior: GroupBehavior::GangUp,
};

static PUP_DRAGON: SpeciesStats = SpeciesStats {
    name: "Pup Dragon",
    tier: Tier::Unit,
    player_max_hp: 3.0,
    enemy_max_hp: 3.0,
    damage: 1.0,
    speed: 80.0,
    radius: 8.0,
    pop_cap: 4,
    spawn_jitter: 24.0,
    speed_jitter: 10.0,
    profile: CombatProfile::new(Some(AttackType::Ranged), Some(Element::Fire)),
    attack: AttackStyle::Ranged {
        range: 120.0,
        projectile_speed: 200.0,
        projectile_radius: 6.0,
    },
    behavior: GroupBehavior::Pack,
};

static GOLEM: SpeciesStats = SpeciesStats {
    name: "Golem",
    tier: Tier::Elite,
    player_max_hp: 12.0,
    enemy_max_hp: 12.0,
    damage: 3.0,
    speed: 45.0,
    radius: 14.0,
    pop_cap: 2,
    spawn_jitter: 12.0,
    speed_jitter: 6.0,
    profile: CombatProfile::new(Some(AttackType::Melee), Some(Element::Earth)),
    attack: AttackStyle::Melee,
    behavior: GroupBehavior::Independent,
};

/// Kinds of buildings that can be placed on the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    /// Spawner that produces its assigned species.
    Nest,
    /// Passive blocker with a large hit point pool.
    Wall,
    /// Defensive turret that fires at nearby creatures.
    Tower,
}

impl BuildingKind {
    /// Every building kind in targeting priority order.
    pub const ALL: [BuildingKind; 3] = [BuildingKind::Nest, BuildingKind::Wall, BuildingKind::Tower];

    /// Interchange key used by stage files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Nest => "nest",
            Self::Wall => "wall",
            Self::Tower => "tower",
        }
    }

    /// Parses an interchange key, returning `None` for unknown kinds.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Targeting rank; lower values are preferred on distance ties.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Nest => 0,
            Self::Wall => 1,
            Self::Tower => 2,
        }
    }

    /// Static stats of the building kind.
    #[must_use]
    pub fn stats(self) -> &'static BuildingStats {
        match self {
            Self::Nest => &NEST,
            Self::Wall => &WALL,
            Self::Tower => &TOWER,
        }
    }
}

/// Static tuning of a building kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingStats {
    /// Display name.
    pub name: &'static str,
    /// Short description shown in build menus.
    pub description: &'static str,
    /// Hit points of a fresh building.
    pub max_hp: f32,
    /// Full footprint width and height.
    pub size: Vec2,
    /// Cooldown before another building of this kind may be placed.
    pub construction_time: Duration,
}

static NEST: BuildingStats = BuildingStats {
    name: "Nest",
    description: "Produces creatures of its assigned species.",
    max_hp: 50.0,
    size: Vec2::new(96.0, 64.0),
    construction_time: Duration::ZERO,
};

static WALL: BuildingStats = BuildingStats {
    name: "Wall",
    description: "Blocks the lane and soaks damage.",
    max_hp: 120.0,
    size: Vec2::new(120.0, 40.0),
    construction_time: Duration::ZERO,
};

static TOWER: BuildingStats = BuildingStats {
    name: "Tower",
    description: "Fires at enemy creatures in range.",
    max_hp: 20.0,
    size: Vec2::new(60.0, 90.0),
    construction_time: Duration::from_secs(15),
};

/// Weapon mounted on every tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerWeapon {
    /// Strict upper bound on the centre distance to a target.
    pub range: f32,
    /// Seconds between shots.
    pub fire_cooldown: f32,
    /// Projectile travel speed in units per second.
    pub projectile_speed: f32,
    /// Flat damage per projectile.
    pub damage: f32,
    /// Projectile collision radius.
    pub projectile_radius: f32,
}

/// Weapon stats shared by all towers.
pub const TOWER_WEAPON: TowerWeapon = TowerWeapon {
    range: 190.0,
    fire_cooldown: 0.5,
    projectile_speed: 240.0,
    damage: 1.0,
    projectile_radius: 4.0,
};

/// Static tuning of a team base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseStats {
    /// Hit points at the start of a battle.
    pub max_hp: f32,
    /// Full footprint width and height.
    pub size: Vec2,
}

/// Stats shared by both bases.
pub const BASE_STATS: BaseStats = BaseStats {
    max_hp: 200.0,
    size: Vec2::new(170.0, 170.0),
};
