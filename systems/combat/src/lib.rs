#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that advances creature windup/cooldown timers, resolves strikes,
//! moves creatures toward their targets, and fires towers.
//!
//! Every creature follows the same state machine each tick: idle, windup,
//! then strike once the windup expires with the cooldown spent. Melee strikes
//! land immediately while ranged strikes queue a [`ProjectileLaunch`]. Base
//! damage that ends the match stops the pass on the spot.

use lane_siege_core::{
    creature_index, heading, modified_damage, structure_index, AttackStyle, BattleConfig, Bases,
    Creature, Event, Outcome, ProjectileLaunch, Rect, Structure, StructureRole, Target, Vec2,
    TOWER_WEAPON,
};
use lane_siege_system_targeting::TargetAssignments;

/// Distances at or below this value count as already arrived.
const ARRIVAL_EPSILON: f32 = 0.001;

/// Combat resolver for creatures and towers.
#[derive(Debug, Default)]
pub struct Combat;

impl Combat {
    /// Creates a new combat resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs one combat pass over every creature in identifier order.
    ///
    /// Dead creatures only count down their linger timer. Creatures whose
    /// target became invalid earlier this tick take no action. Returns the
    /// match outcome as soon as a base falls; no creature after the striking
    /// one is processed in that case.
    #[allow(clippy::too_many_arguments)]
    pub fn handle(
        &mut self,
        config: &BattleConfig,
        dt: f32,
        creatures: &mut [Creature],
        structures: &mut [Structure],
        bases: &mut Bases,
        targets: &TargetAssignments,
        launches: &mut Vec<ProjectileLaunch>,
        events: &mut Vec<Event>,
    ) -> Option<Outcome> {
        for index in 0..creatures.len() {
            let creature = &mut creatures[index];
            if creature.is_dead {
                creature.death_timer = (creature.death_timer - dt).max(0.0);
                continue;
            }

            creature.attack_cooldown = (creature.attack_cooldown - dt).max(0.0);
            let windup_was_active = creature.attack_windup > 0.0;
            creature.attack_windup = (creature.attack_windup - dt).max(0.0);

            let Some(assignment) = targets.creature(creature.id) else {
                continue;
            };
            let Some(engagement) =
                resolve(config, &creatures[index], assignment.target, creatures, structures, bases)
            else {
                continue;
            };

            let creature = &mut creatures[index];
            if !engagement.in_reach {
                advance_toward(
                    creature,
                    engagement.approach,
                    assignment.cohesion,
                    config.pack_path_weight,
                    dt,
                );
                continue;
            }

            if windup_was_active && creature.attack_windup <= 0.0 && creature.attack_cooldown <= 0.0 {
                creature.attack_cooldown = config.attack_cooldown;
                let attacker = creatures[index].clone();
                let outcome = strike(
                    config,
                    &attacker,
                    assignment.target,
                    engagement.aim,
                    creatures,
                    structures,
                    bases,
                    launches,
                    events,
                );
                if outcome.is_some() {
                    return outcome;
                }
            } else if creature.attack_windup <= 0.0 && creature.attack_cooldown <= 0.0 {
                creature.attack_windup = config.attack_windup;
            }
        }
        None
    }

    /// Decays tower cooldowns and fires every ready tower at its assigned
    /// live creature. Tower shots deal flat damage.
    pub fn fire_towers(
        &mut self,
        dt: f32,
        structures: &mut [Structure],
        creatures: &[Creature],
        targets: &TargetAssignments,
        launches: &mut Vec<ProjectileLaunch>,
    ) {
        for structure in structures.iter_mut() {
            if !structure.is_active() {
                continue;
            }
            let StructureRole::Tower { fire_cooldown } = &mut structure.role else {
                continue;
            };
            *fire_cooldown = (*fire_cooldown - dt).max(0.0);
            if *fire_cooldown > 0.0 {
                continue;
            }

            let Some(victim) = targets
                .tower(structure.id)
                .and_then(|id| creature_index(creatures, id))
                .map(|index| &creatures[index])
                .filter(|victim| victim.is_alive())
            else {
                continue;
            };

            launches.push(ProjectileLaunch {
                team: structure.team,
                position: structure.position,
                speed: TOWER_WEAPON.projectile_speed,
                radius: TOWER_WEAPON.projectile_radius,
                damage: TOWER_WEAPON.damage,
                profile: None,
                target: Target::Creature(victim.id),
                heading: angle_toward(structure.position, victim.position),
            });
            *fire_cooldown = TOWER_WEAPON.fire_cooldown;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Engagement {
    /// Point the creature walks toward while out of reach.
    approach: Vec2,
    /// Point strikes and projectiles are aimed at.
    aim: Vec2,
    in_reach: bool,
}

fn resolve(
    config: &BattleConfig,
    creature: &Creature,
    target: Target,
    creatures: &[Creature],
    structures: &[Structure],
    bases: &Bases,
) -> Option<Engagement> {
    match target {
        Target::Creature(id) => {
            let victim = &creatures[creature_index(creatures, id)?];
            if !victim.is_alive() {
                return None;
            }
            Some(Engagement {
                approach: victim.position,
                aim: victim.position,
                in_reach: creature.reaches_creature(victim, config.creature_contact_padding),
            })
        }
        Target::Structure(id) => {
            let structure = &structures[structure_index(structures, id)?];
            if !structure.is_active() {
                return None;
            }
            Some(rect_engagement(config, creature, structure.rect()))
        }
        Target::Base(team) => {
            let base = bases.get(team);
            Some(rect_engagement(config, creature, base.rect()))
        }
    }
}

/// Rect targets are approached and struck at their closest point.
fn rect_engagement(config: &BattleConfig, creature: &Creature, rect: Rect) -> Engagement {
    let contact = rect.closest_point(creature.position);
    Engagement {
        approach: contact,
        aim: contact,
        in_reach: creature.reaches_rect(&rect, config.building_attack_padding),
    }
}

#[allow(clippy::too_many_arguments)]
fn strike(
    config: &BattleConfig,
    attacker: &Creature,
    target: Target,
    aim: Vec2,
    creatures: &mut [Creature],
    structures: &mut [Structure],
    bases: &mut Bases,
    launches: &mut Vec<ProjectileLaunch>,
    events: &mut Vec<Event>,
) -> Option<Outcome> {
    if let AttackStyle::Ranged {
        projectile_speed,
        projectile_radius,
        ..
    } = attacker.attack
    {
        launches.push(ProjectileLaunch {
            team: attacker.team,
            position: attacker.position,
            speed: projectile_speed,
            radius: projectile_radius,
            damage: attacker.damage,
            profile: Some(attacker.profile),
            target,
            heading: angle_toward(attacker.position, aim),
        });
        return None;
    }

    match target {
        Target::Creature(id) => {
            let index = creature_index(creatures, id)?;
            let victim = &mut creatures[index];
            let damage = modified_damage(attacker.damage, attacker.profile, victim.profile);
            if victim.take_damage(damage, config.death_delay) {
                events.push(Event::CreatureDied { creature: id });
            }
            None
        }
        Target::Structure(id) => {
            let index = structure_index(structures, id)?;
            let structure = &mut structures[index];
            if structure.take_damage(attacker.damage) {
                events.push(Event::StructureDestroyed {
                    structure: id,
                    team: structure.team,
                    kind: structure.kind(),
                });
            }
            None
        }
        Target::Base(team) => {
            let outcome = bases.apply_damage(team, attacker.damage);
            events.push(Event::BaseDamaged {
                team,
                hp: bases.get(team).hp,
            });
            outcome
        }
    }
}

fn advance_toward(
    creature: &mut Creature,
    destination: Vec2,
    cohesion: Option<Vec2>,
    path_weight: f32,
    dt: f32,
) {
    let (direction, distance) = heading(creature.position, destination);
    if distance <= ARRIVAL_EPSILON {
        return;
    }

    let direction = match cohesion {
        Some(centroid) => {
            let (toward_centroid, _) = heading(creature.position, centroid);
            let blended = direction * path_weight + toward_centroid * (1.0 - path_weight);
            blended.normalize_or_zero()
        }
        None => direction,
    };

    let step = (creature.speed * dt).min(distance);
    creature.position += direction * step;
}

/// Angle in radians from `from` to `to`, measured from the +x axis.
fn angle_toward(from: Vec2, to: Vec2) -> f32 {
    let (direction, _) = heading(from, to);
    direction.y.atan2(direction.x)
}
