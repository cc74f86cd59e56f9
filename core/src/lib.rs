#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Siege battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the battle systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what happened. Systems operate on the plain entity records defined here and
//! never hold references across a tick; every cross-entity link is a stable
//! identifier that is re-resolved when it is used.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod catalog;
mod config;
mod damage;
mod entities;
mod geometry;
mod stage;

pub use catalog::{
    AttackStyle, BaseStats, BuildingKind, BuildingStats, GroupBehavior, SpeciesId, SpeciesStats,
    Tier, TowerWeapon, BASE_STATS, NEST_ASSIGNABLE_TIER, TOWER_WEAPON,
};
pub use config::{BattleConfig, Field};
pub use damage::{
    effectiveness, modified_damage, AttackType, Category, CombatProfile, Element,
    ELEMENT_EFFECTIVENESS, TYPE_EFFECTIVENESS,
};
pub use entities::{
    creature_index, structure_index, Base, Bases, Creature, Projectile, ProjectileLaunch,
    Structure, StructureRole, Target,
};
pub use geometry::{heading, Rect, Side};
pub use glam::Vec2;
pub use stage::{
    EnemyBuilding, Stage, StageConfig, BOSS_STAGE_COUNT, STAGE_CONFIG_VERSION,
    STANDARD_STAGE_COUNT,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Lane Siege.";

/// Side of the battle an entity fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// The side controlled by the local player, defending the bottom lane.
    Player,
    /// The opposing side, defending the top lane.
    Enemy,
}

impl Team {
    /// Both teams in deterministic order.
    pub const ALL: [Team; 2] = [Team::Player, Team::Enemy];

    /// Returns the team this team fights against.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Describes the active gameplay mode for the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayMode {
    /// Planning mode: the battle is paused, only construction timers advance.
    Setup,
    /// The battle is running and every tick executes the full system pipeline.
    Battle,
}

/// Final result of a match once one base has fallen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    /// Team that destroyed the opposing base.
    pub winner: Team,
}

impl Outcome {
    /// Creates an outcome won by the provided team.
    #[must_use]
    pub const fn won_by(winner: Team) -> Self {
        Self { winner }
    }

    /// Label presented to the player once the match ends.
    #[must_use]
    pub const fn result_label(&self) -> &'static str {
        match self.winner {
            Team::Player => "Victory",
            Team::Enemy => "Defeat",
        }
    }
}

/// Unique identifier assigned to a creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(u32);

impl CreatureId {
    /// Creates a new creature identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a nest, wall or tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(u32);

impl StructureId {
    /// Creates a new structure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Wall-clock time that elapsed since the previous tick. The world
        /// clamps it to the configured maximum step.
        dt: Duration,
    },
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Requests placement of a building near the provided field point.
    PlaceStructure {
        /// Team that will own the structure.
        team: Team,
        /// Kind of building to construct.
        kind: BuildingKind,
        /// Requested centre of the building in field coordinates.
        position: Vec2,
    },
    /// Assigns the species a nest should produce.
    AssignSpecies {
        /// Nest receiving the assignment.
        nest: StructureId,
        /// Species the nest should spawn.
        species: SpeciesId,
    },
    /// Replaces the stage list and restarts the battle from its first stage.
    LoadStages {
        /// Stage list to install.
        config: StageConfig,
    },
    /// Fully re-initializes the battle, keeping configuration and stages.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clamped duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
    /// Confirms that a creature was produced by a base or nest.
    CreatureSpawned {
        /// Identifier assigned to the new creature.
        creature: CreatureId,
        /// Team the creature fights for.
        team: Team,
        /// Species of the creature.
        species: SpeciesId,
        /// Position the creature appeared at.
        position: Vec2,
    },
    /// Reports that a creature received a killing blow and started lingering.
    CreatureDied {
        /// Identifier of the creature that died.
        creature: CreatureId,
    },
    /// Reports that a dead creature finished lingering and left the field.
    CreatureRemoved {
        /// Identifier of the removed creature.
        creature: CreatureId,
    },
    /// Confirms that a structure was placed into the world.
    StructurePlaced {
        /// Identifier assigned to the structure.
        structure: StructureId,
        /// Team owning the structure.
        team: Team,
        /// Kind of building that was placed.
        kind: BuildingKind,
        /// Snapped centre of the structure.
        position: Vec2,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Team that requested the placement.
        team: Team,
        /// Kind of building requested.
        kind: BuildingKind,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a structure's hit points reached zero.
    StructureDestroyed {
        /// Identifier of the destroyed structure.
        structure: StructureId,
        /// Team that owned the structure.
        team: Team,
        /// Kind of the destroyed structure.
        kind: BuildingKind,
    },
    /// Confirms that a nest now produces the given species.
    SpeciesAssigned {
        /// Nest that accepted the assignment.
        nest: StructureId,
        /// Species assigned to the nest.
        species: SpeciesId,
    },
    /// Reports that a species assignment was refused.
    SpeciesAssignmentRejected {
        /// Nest targeted by the assignment.
        nest: StructureId,
        /// Species that was requested.
        species: SpeciesId,
        /// Specific reason the assignment failed.
        reason: AssignmentError,
    },
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Team that fired the projectile.
        team: Team,
    },
    /// Reports that a base took damage.
    BaseDamaged {
        /// Team owning the damaged base.
        team: Team,
        /// Remaining hit points after the hit.
        hp: f32,
    },
    /// Announces that the enemy structures were rebuilt from a stage snapshot.
    StageApplied {
        /// Zero-based index of the stage that became active.
        index: usize,
        /// Total number of stages in the active stage list.
        count: usize,
    },
    /// Announces that the match ended.
    GameOver {
        /// Result of the match.
        outcome: Outcome,
    },
    /// Confirms that the battle was re-initialized.
    BattleReset,
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The match has ended, so no further building is allowed.
    BattleOver,
    /// The requested point lies outside the team's build zone.
    OutsideZone,
    /// No clear spot was found near the requested point.
    NoClearSpot,
    /// The construction timer for this building kind is still running.
    UnderConstruction,
}

/// Reasons a species assignment may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentError {
    /// The match has ended, so no further mutation is allowed.
    BattleOver,
    /// No structure with the provided identifier exists.
    MissingNest,
    /// The structure exists but is not a nest.
    NotANest,
    /// The nest has been destroyed.
    Destroyed,
    /// The species' tier cannot be produced by nests.
    WrongTier,
}

#[cfg(test)]
mod tests {
    use super::{AssignmentError, CreatureId, Outcome, PlacementError, StructureId, Team};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn opponent_is_symmetric() {
        for team in Team::ALL {
            assert_ne!(team.opponent(), team);
            assert_eq!(team.opponent().opponent(), team);
        }
    }

    #[test]
    fn result_label_reflects_winner() {
        assert_eq!(Outcome::won_by(Team::Player).result_label(), "Victory");
        assert_eq!(Outcome::won_by(Team::Enemy).result_label(), "Defeat");
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&CreatureId::new(7));
        assert_round_trip(&StructureId::new(42));
    }

    #[test]
    fn rejection_reasons_round_trip_through_bincode() {
        assert_round_trip(&PlacementError::NoClearSpot);
        assert_round_trip(&AssignmentError::WrongTier);
        assert_round_trip(&Outcome::won_by(Team::Enemy));
    }
}
