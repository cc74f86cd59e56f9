#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that keeps creatures from overlapping each other and from
//! standing inside buildings.

use lane_siege_core::{BattleConfig, Bases, Creature, Field, Rect, Structure, Team, Vec2};

/// Distances at or below this value count as coincident centres.
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Rectangle creatures are pushed out of.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    /// Team owning the building.
    pub team: Team,
    /// Footprint of the building.
    pub rect: Rect,
    /// Whether friendly creatures receive a lateral nudge after push-out.
    pub nudges_allies: bool,
}

/// Separation system that reuses its obstacle buffer across ticks.
#[derive(Debug, Default)]
pub struct Separation {
    obstacles: Vec<Obstacle>,
}

impl Separation {
    /// Creates a separation system with an empty obstacle buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs pairwise separation followed by building push-out.
    pub fn handle(
        &mut self,
        config: &BattleConfig,
        creatures: &mut [Creature],
        structures: &[Structure],
        bases: &Bases,
    ) {
        separate_pairs(config, creatures);

        self.obstacles.clear();
        for base in bases.iter().filter(|base| base.is_active()) {
            self.obstacles.push(Obstacle {
                team: base.team,
                rect: base.rect(),
                nudges_allies: false,
            });
        }
        for structure in structures.iter().filter(|structure| structure.is_active()) {
            self.obstacles.push(Obstacle {
                team: structure.team,
                rect: structure.rect(),
                nudges_allies: true,
            });
        }

        push_out(config, &config.field(), creatures, &self.obstacles);
    }
}

/// Pushes every overlapping pair of live creatures apart along the line
/// joining their centres. Each creature moves half the overlap scaled by the
/// separation strength. Coincident centres separate along the x axis.
pub fn separate_pairs(config: &BattleConfig, creatures: &mut [Creature]) {
    if creatures.len() < 2 {
        return;
    }

    for i in 0..creatures.len() {
        if creatures[i].is_dead {
            continue;
        }
        for j in (i + 1)..creatures.len() {
            if creatures[j].is_dead {
                continue;
            }
            let (head, tail) = creatures.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];

            let spacing = if a.team == b.team {
                config.same_team_spacing
            } else {
                config.opponent_spacing
            };
            let min_distance = a.radius + b.radius + spacing;
            let delta = b.position - a.position;
            let distance = delta.length();
            if distance >= min_distance {
                continue;
            }

            let normal = if distance > COINCIDENT_EPSILON {
                delta / distance
            } else {
                Vec2::X
            };
            let push = normal * ((min_distance - distance) * 0.5 * config.separation_strength);
            a.position -= push;
            b.position += push;
        }
    }
}

/// Moves live creatures whose centre lies inside an obstacle just past the
/// nearest edge. Player creatures leaving a player-owned building are nudged
/// sideways, away from the building centre, and kept on the field.
pub fn push_out(config: &BattleConfig, field: &Field, creatures: &mut [Creature], obstacles: &[Obstacle]) {
    for creature in creatures.iter_mut().filter(|creature| creature.is_alive()) {
        for obstacle in obstacles {
            let Some((pushed, _)) = obstacle.rect.push_out_circle(
                creature.position,
                creature.radius,
                config.building_collision_padding,
            ) else {
                continue;
            };
            creature.position = pushed;

            if obstacle.nudges_allies && creature.team == Team::Player && obstacle.team == Team::Player {
                let direction = if creature.position.x >= obstacle.rect.center().x {
                    1.0
                } else {
                    -1.0
                };
                let nudge = creature.radius * config.nudge_radius_factor + config.nudge_offset;
                creature.position.x =
                    field.clamp_x(creature.position.x + direction * nudge, creature.radius);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_siege_core::{BuildingKind, CreatureId, SpeciesId, StructureId};

    fn goblin(id: u32, team: Team, x: f32, y: f32) -> Creature {
        Creature::spawn(
            CreatureId::new(id),
            team,
            SpeciesId::Goblin,
            Vec2::new(x, y),
            80.0,
        )
    }

    #[test]
    fn overlapping_allies_are_pushed_apart_symmetrically() {
        let config = BattleConfig::default();
        let mut creatures = vec![
            goblin(1, Team::Player, 100.0, 600.0),
            goblin(2, Team::Player, 110.0, 600.0),
        ];

        separate_pairs(&config, &mut creatures);

        // min distance 24, overlap 14, each side moves 14 * 0.5 * 0.5
        assert_eq!(creatures[0].position, Vec2::new(96.5, 600.0));
        assert_eq!(creatures[1].position, Vec2::new(113.5, 600.0));
    }

    #[test]
    fn opponents_use_their_own_spacing() {
        let config = BattleConfig::default();
        let mut creatures = vec![
            goblin(1, Team::Player, 100.0, 600.0),
            goblin(2, Team::Enemy, 119.0, 600.0),
        ];

        separate_pairs(&config, &mut creatures);

        assert_eq!(creatures[0].position, Vec2::new(100.0, 600.0));
        assert_eq!(creatures[1].position, Vec2::new(119.0, 600.0));
    }

    #[test]
    fn coincident_centres_separate_along_x() {
        let config = BattleConfig::default();
        let mut creatures = vec![
            goblin(1, Team::Player, 100.0, 600.0),
            goblin(2, Team::Player, 100.0, 600.0),
        ];

        separate_pairs(&config, &mut creatures);

        assert!(creatures[0].position.x < 100.0);
        assert!(creatures[1].position.x > 100.0);
        assert_eq!(creatures[0].position.y, 600.0);
        assert!(creatures.iter().all(|c| c.position.is_finite()));
    }

    #[test]
    fn dead_creatures_are_not_moved() {
        let config = BattleConfig::default();
        let mut creatures = vec![
            goblin(1, Team::Player, 100.0, 600.0),
            goblin(2, Team::Player, 105.0, 600.0),
        ];
        let _ = creatures[1].take_damage(10.0, 0.2);

        separate_pairs(&config, &mut creatures);

        assert_eq!(creatures[0].position, Vec2::new(100.0, 600.0));
        assert_eq!(creatures[1].position, Vec2::new(105.0, 600.0));
    }

    #[test]
    fn enemy_creatures_are_pushed_out_without_nudge() {
        let config = BattleConfig::default();
        let wall = Structure::new(
            StructureId::new(1),
            Team::Player,
            BuildingKind::Wall,
            Vec2::new(300.0, 900.0),
            None,
        );
        let bases = Bases::new(&config.field());
        let mut creatures = vec![goblin(1, Team::Enemy, 300.0, 885.0)];

        Separation::new().handle(&config, &mut creatures, &[wall], &bases);

        assert_eq!(creatures[0].position, Vec2::new(300.0, 880.0 - 9.0));
    }

    #[test]
    fn allies_leaving_own_buildings_are_nudged_sideways() {
        let config = BattleConfig::default();
        let tower = Structure::new(
            StructureId::new(1),
            Team::Player,
            BuildingKind::Tower,
            Vec2::new(300.0, 900.0),
            None,
        );
        let bases = Bases::new(&config.field());
        let mut creatures = vec![goblin(1, Team::Player, 325.0, 900.0)];

        Separation::new().handle(&config, &mut creatures, &[tower], &bases);

        let nudge = 9.0 * 0.7 + 2.0;
        let expected = 330.0 + 9.0 + nudge;
        assert!((creatures[0].position.x - expected).abs() < 1e-4);
        assert_eq!(creatures[0].position.y, 900.0);
    }

    #[test]
    fn nudge_is_clamped_to_the_field() {
        let config = BattleConfig::default();
        let field = config.field();
        let obstacle = Obstacle {
            team: Team::Player,
            rect: Rect::from_center(Vec2::new(20.0, 900.0), Vec2::new(40.0, 40.0)),
            nudges_allies: true,
        };
        let mut creatures = vec![goblin(1, Team::Player, 5.0, 900.0)];

        push_out(&config, &field, &mut creatures, &[obstacle]);

        assert_eq!(creatures[0].position.x, 9.0);
    }

    #[test]
    fn destroyed_buildings_do_not_push() {
        let config = BattleConfig::default();
        let mut wall = Structure::new(
            StructureId::new(1),
            Team::Enemy,
            BuildingKind::Wall,
            Vec2::new(300.0, 400.0),
            None,
        );
        let _ = wall.take_damage(500.0);
        let bases = Bases::new(&config.field());
        let mut creatures = vec![goblin(1, Team::Player, 300.0, 400.0)];

        Separation::new().handle(&config, &mut creatures, &[wall], &bases);

        assert_eq!(creatures[0].position, Vec2::new(300.0, 400.0));
    }
}
