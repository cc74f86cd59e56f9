#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that flies homing projectiles and resolves their impacts.

use lane_siege_core::{
    creature_index, heading, modified_damage, structure_index, BattleConfig, Bases, Creature,
    Event, Outcome, Projectile, ProjectileId, Structure, Target, Vec2,
};

/// Projectile flight system.
#[derive(Debug, Default)]
pub struct ProjectileFlight;

impl ProjectileFlight {
    /// Creates a new projectile flight system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Advances every projectile once and applies impacts.
    ///
    /// Projectiles that hit or whose target became invalid are reported in
    /// `spent`; the caller removes them at the end of the tick. When an impact
    /// ends the match the outcome is returned immediately and the remaining
    /// projectiles are left untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn handle(
        &mut self,
        config: &BattleConfig,
        dt: f32,
        projectiles: &mut [Projectile],
        creatures: &mut [Creature],
        structures: &mut [Structure],
        bases: &mut Bases,
        spent: &mut Vec<ProjectileId>,
        events: &mut Vec<Event>,
    ) -> Option<Outcome> {
        for projectile in projectiles.iter_mut() {
            let Some((point, target_radius)) =
                resolve(projectile, creatures, structures, bases)
            else {
                spent.push(projectile.id);
                continue;
            };

            let (direction, distance) = heading(projectile.position, point);
            let travel = projectile.speed * dt;
            if distance > projectile.radius + target_radius + travel {
                projectile.position += direction * travel;
                if direction != Vec2::ZERO {
                    projectile.heading = direction.y.atan2(direction.x);
                }
                continue;
            }

            spent.push(projectile.id);
            let outcome = impact(config, projectile, creatures, structures, bases, events);
            if outcome.is_some() {
                return outcome;
            }
        }
        None
    }
}

/// Aim point and collision radius of the projectile's target, if still valid.
fn resolve(
    projectile: &Projectile,
    creatures: &[Creature],
    structures: &[Structure],
    bases: &Bases,
) -> Option<(Vec2, f32)> {
    match projectile.target {
        Target::Creature(id) => {
            let victim = &creatures[creature_index(creatures, id)?];
            victim
                .is_alive()
                .then_some((victim.position, victim.radius))
        }
        Target::Structure(id) => {
            let structure = &structures[structure_index(structures, id)?];
            structure
                .is_active()
                .then(|| (structure.rect().closest_point(projectile.position), 0.0))
        }
        Target::Base(team) => {
            let base = bases.get(team);
            Some((base.rect().closest_point(projectile.position), 0.0))
        }
    }
}

fn impact(
    config: &BattleConfig,
    projectile: &Projectile,
    creatures: &mut [Creature],
    structures: &mut [Structure],
    bases: &mut Bases,
    events: &mut Vec<Event>,
) -> Option<Outcome> {
    match projectile.target {
        Target::Creature(id) => {
            let index = creature_index(creatures, id)?;
            let victim = &mut creatures[index];
            let damage = match projectile.profile {
                Some(profile) => modified_damage(projectile.damage, profile, victim.profile),
                None => projectile.damage,
            };
            if victim.take_damage(damage, config.death_delay) {
                events.push(Event::CreatureDied { creature: id });
            }
            None
        }
        Target::Structure(id) => {
            let index = structure_index(structures, id)?;
            let structure = &mut structures[index];
            if structure.take_damage(projectile.damage) {
                events.push(Event::StructureDestroyed {
                    structure: id,
                    team: structure.team,
                    kind: structure.kind(),
                });
            }
            None
        }
        Target::Base(team) => {
            let outcome = bases.apply_damage(team, projectile.damage);
            events.push(Event::BaseDamaged {
                team,
                hp: bases.get(team).hp,
            });
            outcome
        }
    }
}
