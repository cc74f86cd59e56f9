use lane_siege_core::{BuildingKind, EnemyBuilding, SpeciesId, Stage, StageConfig};
use lane_siege_system_stages::{export_string, export_value, import_str, import_value};
use proptest::prelude::*;

fn building() -> impl Strategy<Value = EnemyBuilding> {
    (
        prop::sample::select(BuildingKind::ALL.to_vec()),
        0i32..720,
        0i32..430,
        prop::option::of(prop::sample::select(vec![
            SpeciesId::Goblin,
            SpeciesId::PupDragon,
        ])),
    )
        .prop_map(|(kind, x, y, species)| EnemyBuilding {
            kind,
            x: x as f32,
            y: y as f32,
            spawn_species: if kind == BuildingKind::Nest {
                species
            } else {
                None
            },
        })
}

fn stage_config() -> impl Strategy<Value = StageConfig> {
    (
        any::<bool>(),
        prop::collection::vec(
            (0u8..=100, prop::collection::vec(building(), 0..6)),
            0..7,
        ),
    )
        .prop_map(|(is_boss_battle, stages)| {
            let mut config = StageConfig {
                version: 1,
                is_boss_battle,
                stages: stages
                    .into_iter()
                    .map(|(threshold, enemy_buildings)| Stage {
                        advance_at_enemy_hp_percent: f32::from(threshold),
                        enemy_buildings,
                    })
                    .collect(),
            };
            config.normalize();
            config
        })
}

#[test]
fn exported_text_imports_back() {
    let mut config = StageConfig::new(true);
    config.stages[1].enemy_buildings.push(EnemyBuilding {
        kind: BuildingKind::Nest,
        x: 360.0,
        y: 230.0,
        spawn_species: Some(SpeciesId::PupDragon),
    });
    config.stages[4].advance_at_enemy_hp_percent = 0.0;

    let imported = import_str(&export_string(&config)).expect("exported text is valid");

    assert_eq!(imported.discarded, 0);
    assert_eq!(imported.config, config);
}

proptest! {
    #[test]
    fn import_of_export_reproduces_the_stage_list(config in stage_config()) {
        let imported = import_value(&export_value(&config)).expect("exported value is valid");

        prop_assert_eq!(imported.discarded, 0);
        prop_assert_eq!(imported.config.stages.len(), config.stages.len());
        prop_assert_eq!(
            imported.config.stages.last().map(|stage| stage.advance_at_enemy_hp_percent),
            Some(0.0)
        );
        prop_assert_eq!(imported.config, config);
    }

    #[test]
    fn import_never_panics_on_arbitrary_text(text in ".{0,200}") {
        let _ = import_str(&text);
    }
}
