//! Applies stage snapshots to the enemy side of the battle.

use lane_siege_core::{Event, Structure, Team};
use tracing::info;

use crate::World;

/// Replaces the enemy layout with stage `index`.
///
/// Enemy structures are torn down and rebuilt from the snapshot, enemy
/// creatures and enemy projectiles are purged, and the enemy base keeps its
/// damage, clamped into its hit point range.
pub(crate) fn apply_stage(world: &mut World, index: usize, out_events: &mut Vec<Event>) {
    world
        .structures
        .retain(|structure| structure.team != Team::Enemy);
    world.creatures.retain(|creature| {
        if creature.team == Team::Enemy {
            out_events.push(Event::CreatureRemoved {
                creature: creature.id,
            });
            false
        } else {
            true
        }
    });
    world
        .projectiles
        .retain(|projectile| projectile.team != Team::Enemy);

    let base = world.bases.get_mut(Team::Enemy);
    base.hp = base.hp.clamp(0.0, base.max_hp);

    let Some(stage) = world.stage_config.stages.get(index) else {
        return;
    };
    for building in &stage.enemy_buildings {
        let id = world.ids.next_structure();
        let position = building.position();
        world.structures.push(Structure::new(
            id,
            Team::Enemy,
            building.kind,
            position,
            building.spawn_species,
        ));
        out_events.push(Event::StructurePlaced {
            structure: id,
            team: Team::Enemy,
            kind: building.kind,
            position,
        });
    }

    let count = world.stage_config.stages.len();
    info!(
        stage = index + 1,
        count,
        buildings = stage.enemy_buildings.len(),
        "stage applied"
    );
    out_events.push(Event::StageApplied { index, count });
}
