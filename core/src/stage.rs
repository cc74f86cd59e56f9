//! Ordered snapshots of enemy structures that drive multi-stage battles.
//!
//! Field names follow the camelCase interchange format shared with level
//! editors: `{ version, isBossBattle, stages: [{ advanceAtEnemyHpPercent,
//! enemyBuildings: [{ type, x, y, spawnCreatureId }] }] }`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingKind, SpeciesId};

/// Interchange format version produced by this crate.
pub const STAGE_CONFIG_VERSION: u32 = 1;

/// Number of stages in a regular battle.
pub const STANDARD_STAGE_COUNT: usize = 3;

/// Number of stages in a boss battle.
pub const BOSS_STAGE_COUNT: usize = 5;

/// Full stage list of a battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConfig {
    /// Interchange format version.
    pub version: u32,
    /// Boss battles carry more stages.
    pub is_boss_battle: bool,
    /// Stages in play order.
    pub stages: Vec<Stage>,
}

/// Enemy layout active until the enemy base drops to the stage threshold.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// Enemy base hit point percentage at or below which the next stage
    /// starts. Zero means only total destruction advances.
    pub advance_at_enemy_hp_percent: f32,
    /// Enemy structures rebuilt when the stage starts.
    pub enemy_buildings: Vec<EnemyBuilding>,
}

/// Single enemy structure placement inside a stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyBuilding {
    /// Building kind.
    #[serde(rename = "type")]
    pub kind: BuildingKind,
    /// Centre x coordinate.
    pub x: f32,
    /// Centre y coordinate.
    pub y: f32,
    /// Species produced when the building is a nest.
    #[serde(rename = "spawnCreatureId", default)]
    pub spawn_species: Option<SpeciesId>,
}

impl EnemyBuilding {
    /// Centre of the building.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl StageConfig {
    /// Creates empty stages with evenly spaced thresholds.
    #[must_use]
    pub fn new(is_boss_battle: bool) -> Self {
        let count = Self::required_stage_count(is_boss_battle);
        let stages = (0..count)
            .map(|index| Stage {
                advance_at_enemy_hp_percent: Self::default_threshold(index, count),
                enemy_buildings: Vec::new(),
            })
            .collect();
        Self {
            version: STAGE_CONFIG_VERSION,
            is_boss_battle,
            stages,
        }
    }

    /// Single-stage layout with one enemy goblin nest, used when no stage list
    /// has been loaded.
    #[must_use]
    pub fn skirmish(nest_position: Vec2) -> Self {
        Self {
            version: STAGE_CONFIG_VERSION,
            is_boss_battle: false,
            stages: vec![Stage {
                advance_at_enemy_hp_percent: 0.0,
                enemy_buildings: vec![EnemyBuilding {
                    kind: BuildingKind::Nest,
                    x: nest_position.x,
                    y: nest_position.y,
                    spawn_species: Some(SpeciesId::Goblin),
                }],
            }],
        }
    }

    /// Number of stages required by the battle mode.
    #[must_use]
    pub const fn required_stage_count(is_boss_battle: bool) -> usize {
        if is_boss_battle {
            BOSS_STAGE_COUNT
        } else {
            STANDARD_STAGE_COUNT
        }
    }

    /// Evenly spaced threshold of stage `index` out of `count`, last one zero.
    #[must_use]
    pub fn default_threshold(index: usize, count: usize) -> f32 {
        if count == 0 || index + 1 >= count {
            return 0.0;
        }
        ((100 * (count - 1 - index)) / count) as f32
    }

    /// Switches battle mode, truncating or padding the stage list to match.
    pub fn set_boss_battle(&mut self, is_boss_battle: bool) {
        self.is_boss_battle = is_boss_battle;
        self.normalize();
    }

    /// Enforces the stage count of the battle mode, clamps thresholds into
    /// `0..=100`, and forces the final threshold to zero.
    pub fn normalize(&mut self) {
        self.version = STAGE_CONFIG_VERSION;
        let count = Self::required_stage_count(self.is_boss_battle);
        self.stages.truncate(count);
        while self.stages.len() < count {
            let index = self.stages.len();
            self.stages.push(Stage {
                advance_at_enemy_hp_percent: Self::default_threshold(index, count),
                enemy_buildings: Vec::new(),
            });
        }
        for stage in &mut self.stages {
            let threshold = stage.advance_at_enemy_hp_percent;
            stage.advance_at_enemy_hp_percent = if threshold.is_finite() {
                threshold.clamp(0.0, 100.0)
            } else {
                0.0
            };
        }
        if let Some(last) = self.stages.last_mut() {
            last.advance_at_enemy_hp_percent = 0.0;
        }
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_evenly_spaced() {
        let standard = StageConfig::new(false);
        let thresholds: Vec<f32> = standard
            .stages
            .iter()
            .map(|stage| stage.advance_at_enemy_hp_percent)
            .collect();
        assert_eq!(thresholds, vec![66.0, 33.0, 0.0]);

        let boss = StageConfig::new(true);
        let thresholds: Vec<f32> = boss
            .stages
            .iter()
            .map(|stage| stage.advance_at_enemy_hp_percent)
            .collect();
        assert_eq!(thresholds, vec![80.0, 60.0, 40.0, 20.0, 0.0]);
    }

    #[test]
    fn boss_toggle_pads_then_truncates() {
        let mut config = StageConfig::new(false);
        config.stages[0].enemy_buildings.push(EnemyBuilding {
            kind: BuildingKind::Wall,
            x: 100.0,
            y: 200.0,
            spawn_species: None,
        });
        config.set_boss_battle(true);
        assert_eq!(config.stages.len(), BOSS_STAGE_COUNT);
        assert_eq!(config.stages[0].enemy_buildings.len(), 1);
        assert_eq!(config.stages[3].advance_at_enemy_hp_percent, 20.0);
        assert_eq!(config.stages[4].advance_at_enemy_hp_percent, 0.0);

        config.stages[2].advance_at_enemy_hp_percent = 45.0;
        config.set_boss_battle(false);
        assert_eq!(config.stages.len(), STANDARD_STAGE_COUNT);
        assert_eq!(config.stages[2].advance_at_enemy_hp_percent, 0.0);
    }

    #[test]
    fn normalize_clamps_thresholds() {
        let mut config = StageConfig::new(false);
        config.stages[0].advance_at_enemy_hp_percent = 250.0;
        config.stages[1].advance_at_enemy_hp_percent = f32::NAN;
        config.stages[2].advance_at_enemy_hp_percent = 50.0;
        config.normalize();
        assert_eq!(config.stages[0].advance_at_enemy_hp_percent, 100.0);
        assert_eq!(config.stages[1].advance_at_enemy_hp_percent, 0.0);
        assert_eq!(config.stages[2].advance_at_enemy_hp_percent, 0.0);
    }

    #[test]
    fn serializes_with_interchange_names() {
        let config = StageConfig::skirmish(Vec2::new(360.0, 230.0));
        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["isBossBattle"], false);
        let building = &json["stages"][0]["enemyBuildings"][0];
        assert_eq!(building["type"], "nest");
        assert_eq!(building["spawnCreatureId"], "goblin");
        assert_eq!(json["stages"][0]["advanceAtEnemyHpPercent"], 0.0);
    }
}
