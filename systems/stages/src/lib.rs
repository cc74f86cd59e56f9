#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stage interchange and the enemy-base advancement rule.
//!
//! Import is lenient about individual entries: malformed buildings and stages
//! are dropped and counted rather than failing the whole document. Only a
//! document whose overall shape is wrong is rejected with
//! [`StageImportError`].

use lane_siege_core::{
    Base, BuildingKind, EnemyBuilding, SpeciesId, Stage, StageConfig, NEST_ASSIGNABLE_TIER,
    STAGE_CONFIG_VERSION,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Reasons a stage document is rejected as a whole.
#[derive(Debug, Error)]
pub enum StageImportError {
    /// The text is not valid JSON.
    #[error("stage data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document root is not a JSON object.
    #[error("stage data must be a JSON object")]
    NotAnObject,
    /// The `stages` field is absent or not an array.
    #[error("stage data has no `stages` array")]
    MissingStages,
    /// The document declares a version this crate cannot read.
    #[error("unsupported stage data version {found}")]
    UnsupportedVersion {
        /// Version value found in the document.
        found: Value,
    },
}

/// Result of a successful import.
#[derive(Clone, Debug, PartialEq)]
pub struct Imported {
    /// Normalized stage list.
    pub config: StageConfig,
    /// Number of stage or building entries dropped as malformed.
    pub discarded: usize,
}

/// Parses and normalizes a stage document from JSON text.
pub fn import_str(text: &str) -> Result<Imported, StageImportError> {
    let value: Value = serde_json::from_str(text)?;
    import_value(&value)
}

/// Normalizes an already parsed stage document.
pub fn import_value(value: &Value) -> Result<Imported, StageImportError> {
    let root = value.as_object().ok_or(StageImportError::NotAnObject)?;

    if let Some(version) = root.get("version") {
        let supported = number(version).is_some_and(|found| {
            found.fract() == 0.0 && (1.0..=STAGE_CONFIG_VERSION as f32).contains(&found)
        });
        if !supported {
            return Err(StageImportError::UnsupportedVersion {
                found: version.clone(),
            });
        }
    }

    let entries = root
        .get("stages")
        .and_then(Value::as_array)
        .ok_or(StageImportError::MissingStages)?;
    let is_boss_battle = root
        .get("isBossBattle")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let count = StageConfig::required_stage_count(is_boss_battle);

    let mut discarded = 0;
    let mut stages = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(fields) = entry.as_object() else {
            discarded += 1;
            continue;
        };
        let index = stages.len();
        stages.push(read_stage(fields, index, count, &mut discarded));
    }

    let mut config = StageConfig {
        version: STAGE_CONFIG_VERSION,
        is_boss_battle,
        stages,
    };
    config.normalize();
    Ok(Imported { config, discarded })
}

fn read_stage(fields: &Map<String, Value>, index: usize, count: usize, discarded: &mut usize) -> Stage {
    let advance_at_enemy_hp_percent = fields
        .get("advanceAtEnemyHpPercent")
        .and_then(number)
        .map(|threshold| threshold.clamp(0.0, 100.0))
        .unwrap_or_else(|| StageConfig::default_threshold(index, count));

    let mut enemy_buildings = Vec::new();
    if let Some(entries) = fields.get("enemyBuildings").and_then(Value::as_array) {
        for entry in entries {
            match read_building(entry) {
                Some(building) => enemy_buildings.push(building),
                None => *discarded += 1,
            }
        }
    }

    Stage {
        advance_at_enemy_hp_percent,
        enemy_buildings,
    }
}

fn read_building(entry: &Value) -> Option<EnemyBuilding> {
    let fields = entry.as_object()?;
    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .and_then(BuildingKind::from_key)?;
    let x = fields.get("x").and_then(number)?;
    let y = fields.get("y").and_then(number)?;
    let spawn_species = match kind {
        BuildingKind::Nest => fields
            .get("spawnCreatureId")
            .and_then(Value::as_str)
            .and_then(SpeciesId::from_key)
            .filter(|species| species.stats().tier == NEST_ASSIGNABLE_TIER),
        BuildingKind::Wall | BuildingKind::Tower => None,
    };
    Some(EnemyBuilding {
        kind,
        x,
        y,
        spawn_species,
    })
}

/// Finite number from a JSON number or a numeric string.
fn number(value: &Value) -> Option<f32> {
    let parsed = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let narrowed = parsed as f32;
    narrowed.is_finite().then_some(narrowed)
}

/// Serializes a stage list with coordinates rounded to whole pixels.
#[must_use]
pub fn export_value(config: &StageConfig) -> Value {
    let stages: Vec<Value> = config
        .stages
        .iter()
        .map(|stage| {
            let buildings: Vec<Value> = stage
                .enemy_buildings
                .iter()
                .map(|building| {
                    json!({
                        "type": building.kind.key(),
                        "x": building.x.round(),
                        "y": building.y.round(),
                        "spawnCreatureId": building.spawn_species.map(SpeciesId::key),
                    })
                })
                .collect();
            json!({
                "advanceAtEnemyHpPercent": round_percent(stage.advance_at_enemy_hp_percent),
                "enemyBuildings": buildings,
            })
        })
        .collect();

    json!({
        "version": STAGE_CONFIG_VERSION,
        "isBossBattle": config.is_boss_battle,
        "stages": stages,
    })
}

/// Pretty-printed JSON form of [`export_value`].
#[must_use]
pub fn export_string(config: &StageConfig) -> String {
    format!("{:#}", export_value(config))
}

fn round_percent(percent: f32) -> f64 {
    (f64::from(percent) * 100.0).round() / 100.0
}

/// Reports whether the enemy base has crossed the stage's threshold.
///
/// A positive threshold advances once the base's hit point percentage is at
/// or below it; a zero threshold only advances on total destruction.
#[must_use]
pub fn should_advance(stage: &Stage, enemy_base: &Base) -> bool {
    let threshold = stage.advance_at_enemy_hp_percent;
    if threshold > 0.0 {
        if enemy_base.max_hp <= 0.0 {
            return true;
        }
        enemy_base.hp / enemy_base.max_hp * 100.0 <= threshold
    } else {
        enemy_base.hp <= 0.0
    }
}

/// Position inside the stage list of a running battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageProgress {
    index: usize,
    count: usize,
}

impl StageProgress {
    /// Starts at the first of `count` stages.
    #[must_use]
    pub const fn new(count: usize) -> Self {
        Self { index: 0, count }
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Total number of stages.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Moves to the next stage. Returns its index, or `None` when the current
    /// stage was the last one.
    pub fn advance(&mut self) -> Option<usize> {
        if self.index + 1 >= self.count {
            return None;
        }
        self.index += 1;
        Some(self.index)
    }

    /// Human-readable label such as `Stage 2/3`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Stage {}/{}", self.index + 1, self.count.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_siege_core::{BattleConfig, Team, BOSS_STAGE_COUNT, STANDARD_STAGE_COUNT};

    fn enemy_base(hp: f32) -> Base {
        let mut base = Base::new(Team::Enemy, &BattleConfig::default().field());
        base.hp = hp;
        base
    }

    #[test]
    fn rejects_documents_with_the_wrong_shape() {
        assert!(matches!(import_str("{"), Err(StageImportError::Json(_))));
        assert!(matches!(
            import_str("[1, 2]"),
            Err(StageImportError::NotAnObject)
        ));
        assert!(matches!(
            import_str(r#"{"stages": 3}"#),
            Err(StageImportError::MissingStages)
        ));
        assert!(matches!(
            import_str(r#"{"version": 9, "stages": []}"#),
            Err(StageImportError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn malformed_entries_are_dropped_and_counted() {
        let text = r#"{
            "version": 1,
            "isBossBattle": false,
            "stages": [
                {
                    "advanceAtEnemyHpPercent": "150",
                    "enemyBuildings": [
                        { "type": "tower", "x": "120.5", "y": 200 },
                        { "type": "castle", "x": 1, "y": 1 },
                        { "type": "wall", "x": null, "y": 1 },
                        { "type": "wall", "x": 10, "y": 20, "spawnCreatureId": "goblin" },
                        { "type": "nest", "x": 300, "y": 150, "spawnCreatureId": "dragonlord" },
                        "garbage"
                    ]
                },
                7
            ]
        }"#;

        let imported = import_str(text).expect("valid shape");
        let config = imported.config;

        assert_eq!(imported.discarded, 4);
        assert_eq!(config.stages.len(), STANDARD_STAGE_COUNT);
        assert_eq!(config.stages[0].advance_at_enemy_hp_percent, 100.0);
        let buildings = &config.stages[0].enemy_buildings;
        assert_eq!(buildings.len(), 3);
        assert_eq!(buildings[0].kind, BuildingKind::Tower);
        assert_eq!(buildings[0].x, 120.5);
        assert_eq!(buildings[1].spawn_species, None);
        assert_eq!(buildings[2].kind, BuildingKind::Nest);
        assert_eq!(buildings[2].spawn_species, None);
        assert_eq!(config.stages[1].advance_at_enemy_hp_percent, 33.0);
        assert_eq!(config.stages[2].advance_at_enemy_hp_percent, 0.0);
    }

    #[test]
    fn elite_species_are_not_assigned_to_imported_nests() {
        let text = r#"{"stages": [{"enemyBuildings": [
            {"type": "nest", "x": 100, "y": 100, "spawnCreatureId": "golem"},
            {"type": "nest", "x": 300, "y": 100, "spawnCreatureId": "pupdragon"}
        ]}]}"#;

        let config = import_str(text).expect("valid shape").config;
        let buildings = &config.stages[0].enemy_buildings;

        assert_eq!(buildings[0].spawn_species, None);
        assert_eq!(buildings[1].spawn_species, Some(SpeciesId::PupDragon));
    }

    #[test]
    fn boss_documents_are_padded_and_the_last_threshold_forced() {
        let text = r#"{"isBossBattle": true, "stages": [
            {"advanceAtEnemyHpPercent": 90, "enemyBuildings": []},
            {"advanceAtEnemyHpPercent": 55, "enemyBuildings": []}
        ]}"#;

        let config = import_str(text).expect("valid shape").config;
        let thresholds: Vec<f32> = config
            .stages
            .iter()
            .map(|stage| stage.advance_at_enemy_hp_percent)
            .collect();

        assert_eq!(config.stages.len(), BOSS_STAGE_COUNT);
        assert_eq!(thresholds, vec![90.0, 55.0, 40.0, 20.0, 0.0]);
    }

    #[test]
    fn export_rounds_coordinates() {
        let mut config = StageConfig::new(false);
        config.stages[0].enemy_buildings.push(EnemyBuilding {
            kind: BuildingKind::Nest,
            x: 100.4,
            y: 219.6,
            spawn_species: Some(SpeciesId::Goblin),
        });

        let value = export_value(&config);
        let building = &value["stages"][0]["enemyBuildings"][0];

        assert_eq!(building["type"], "nest");
        assert_eq!(building["x"], 100.0);
        assert_eq!(building["y"], 220.0);
        assert_eq!(building["spawnCreatureId"], "goblin");
        assert_eq!(value["stages"][2]["advanceAtEnemyHpPercent"], 0.0);
        assert_eq!(value["isBossBattle"], false);
    }

    #[test]
    fn positive_thresholds_advance_at_or_below_the_percentage() {
        let stage = Stage {
            advance_at_enemy_hp_percent: 66.0,
            enemy_buildings: Vec::new(),
        };
        assert!(!should_advance(&stage, &enemy_base(134.0)));
        assert!(should_advance(&stage, &enemy_base(132.0)));
    }

    #[test]
    fn zero_threshold_requires_destruction() {
        let stage = Stage::default();
        assert!(!should_advance(&stage, &enemy_base(1.0)));
        assert!(should_advance(&stage, &enemy_base(0.0)));
    }

    #[test]
    fn progress_labels_and_stops_at_the_end() {
        let mut progress = StageProgress::new(3);
        assert_eq!(progress.label(), "Stage 1/3");
        assert_eq!(progress.advance(), Some(1));
        assert_eq!(progress.advance(), Some(2));
        assert_eq!(progress.label(), "Stage 3/3");
        assert_eq!(progress.advance(), None);
        assert_eq!(progress.index(), 2);
        assert_eq!(progress.count(), 3);
    }
}
