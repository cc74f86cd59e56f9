//! Battle tuning constants and the field layout derived from them.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::SpeciesId;
use crate::geometry::Rect;
use crate::Team;

/// Every tunable constant consumed by the battle systems.
///
/// Missing fields fall back to [`BattleConfig::default`], so adapters can load
/// partial overrides from configuration files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Width of the field in world units.
    pub field_width: f32,
    /// Height of the field in world units.
    pub field_height: f32,
    /// Distance between a base centre and its field edge.
    pub base_edge_padding: f32,
    /// Distance between a base centre and its team's starting nest.
    pub nest_offset: f32,
    /// Fraction of the field height each team may build in.
    pub build_zone_depth_ratio: f32,
    /// Radius within which creatures acquire targets other than the base.
    pub aggro_radius: f32,
    /// Gap allowed between two creatures that are in melee contact.
    pub creature_contact_padding: f32,
    /// Gap allowed between a melee creature and the rect it attacks.
    pub building_attack_padding: f32,
    /// Clearance kept between creatures and rects after push-out.
    pub building_collision_padding: f32,
    /// Clearance required around every placed building.
    pub placement_padding: f32,
    /// Distance between probes during the placement ring search.
    pub placement_search_step: f32,
    /// Ring search bound as a multiple of the footprint's larger side.
    pub placement_search_extent: f32,
    /// Seconds a dead creature lingers before removal.
    pub death_delay: f32,
    /// Seconds between entering reach and the strike landing.
    pub attack_windup: f32,
    /// Seconds between two strikes.
    pub attack_cooldown: f32,
    /// Minimum gap kept between creatures of the same team.
    pub same_team_spacing: f32,
    /// Minimum gap kept between creatures of opposing teams.
    pub opponent_spacing: f32,
    /// Fraction of the overlap resolved per separation pass.
    pub separation_strength: f32,
    /// Whether creatures may target opposing creatures at all.
    pub creatures_can_fight: bool,
    /// Milliseconds between two spawns of the same source.
    pub spawn_interval_ms: u64,
    /// Species produced by both bases, if any.
    pub base_spawn_species: Option<SpeciesId>,
    /// Upper bound on the simulated time of a single tick, in seconds.
    pub max_step_seconds: f32,
    /// Weight of a pack member's own path when blended with the centroid.
    pub pack_path_weight: f32,
    /// Lateral nudge per unit of creature radius after own-structure push-out.
    pub nudge_radius_factor: f32,
    /// Constant lateral nudge after own-structure push-out.
    pub nudge_offset: f32,
    /// Whether spawned creatures receive random position and speed offsets.
    pub spawn_jitter: bool,
    /// Bypasses construction timers entirely.
    pub free_build: bool,
    /// Seed of the deterministic spawn jitter stream.
    pub rng_seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            field_width: 720.0,
            field_height: 1280.0,
            base_edge_padding: 90.0,
            nest_offset: 140.0,
            build_zone_depth_ratio: 1.0 / 3.0,
            aggro_radius: 160.0,
            creature_contact_padding: 4.0,
            building_attack_padding: 0.0,
            building_collision_padding: 0.0,
            placement_padding: 8.0,
            placement_search_step: 8.0,
            placement_search_extent: 3.0,
            death_delay: 0.2,
            attack_windup: 0.1,
            attack_cooldown: 0.8,
            same_team_spacing: 6.0,
            opponent_spacing: 0.0,
            separation_strength: 0.5,
            creatures_can_fight: true,
            spawn_interval_ms: 3000,
            base_spawn_species: Some(SpeciesId::Goblin),
            max_step_seconds: 0.05,
            pack_path_weight: 0.75,
            nudge_radius_factor: 0.7,
            nudge_offset: 2.0,
            spawn_jitter: true,
            free_build: false,
            rng_seed: 0x5eed_1a9e,
        }
    }
}

impl BattleConfig {
    /// Layout of the field described by this configuration.
    #[must_use]
    pub fn field(&self) -> Field {
        Field {
            width: self.field_width.max(0.0),
            height: self.field_height.max(0.0),
            base_edge_padding: self.base_edge_padding,
            nest_offset: self.nest_offset,
            zone_depth_ratio: self.build_zone_depth_ratio.clamp(0.0, 1.0),
        }
    }

    /// Largest duration a single tick may simulate, rounded to whole
    /// microseconds.
    #[must_use]
    pub fn max_step(&self) -> Duration {
        let micros = (f64::from(self.max_step_seconds) * 1_000_000.0).round();
        if micros.is_finite() && micros > 0.0 {
            Duration::from_micros(micros as u64)
        } else {
            Duration::ZERO
        }
    }

    /// Time between two spawns of the same source.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }
}

/// Field dimensions together with the fixed anchor points of both teams.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    width: f32,
    height: f32,
    base_edge_padding: f32,
    nest_offset: f32,
    zone_depth_ratio: f32,
}

impl Field {
    /// Width of the field.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the field.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Centre of the team's base. The player defends the bottom edge.
    #[must_use]
    pub fn base_position(&self, team: Team) -> Vec2 {
        let x = self.width * 0.5;
        match team {
            Team::Player => Vec2::new(x, self.height - self.base_edge_padding),
            Team::Enemy => Vec2::new(x, self.base_edge_padding),
        }
    }

    /// Default nest anchor in front of the team's base.
    #[must_use]
    pub fn nest_position(&self, team: Team) -> Vec2 {
        let base = self.base_position(team);
        match team {
            Team::Player => Vec2::new(base.x, base.y - self.nest_offset),
            Team::Enemy => Vec2::new(base.x, base.y + self.nest_offset),
        }
    }

    /// Sub-rectangle of the field the team may build in.
    #[must_use]
    pub fn build_zone(&self, team: Team) -> Rect {
        let depth = self.height * self.zone_depth_ratio;
        match team {
            Team::Player => Rect::from_edges(0.0, self.height - depth, self.width, self.height),
            Team::Enemy => Rect::from_edges(0.0, 0.0, self.width, depth),
        }
    }

    /// Clamps an x coordinate so a circle of `margin` radius stays inside
    /// the field. Fields narrower than the circle pin it to the centre line.
    #[must_use]
    pub fn clamp_x(&self, x: f32, margin: f32) -> f32 {
        let min_x = margin.min(self.width * 0.5);
        let max_x = (self.width - margin).max(min_x);
        x.clamp(min_x, max_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_x_keeps_the_margin_inside_the_field() {
        let field = BattleConfig::default().field();
        assert_eq!(field.clamp_x(-40.0, 9.0), 9.0);
        assert_eq!(field.clamp_x(900.0, 9.0), field.width() - 9.0);
        assert_eq!(field.clamp_x(300.0, 9.0), 300.0);

        let narrow = BattleConfig {
            field_width: 10.0,
            ..BattleConfig::default()
        }
        .field();
        assert_eq!(narrow.clamp_x(0.0, 9.0), 5.0);
    }

    #[test]
    fn bases_sit_on_opposite_edges() {
        let field = BattleConfig::default().field();
        assert_eq!(field.base_position(Team::Enemy), Vec2::new(360.0, 90.0));
        assert_eq!(field.base_position(Team::Player), Vec2::new(360.0, 1190.0));
    }

    #[test]
    fn nests_face_the_middle_of_the_field() {
        let field = BattleConfig::default().field();
        assert_eq!(field.nest_position(Team::Enemy), Vec2::new(360.0, 230.0));
        assert_eq!(field.nest_position(Team::Player), Vec2::new(360.0, 1050.0));
    }

    #[test]
    fn build_zones_cover_a_third_each() {
        let field = BattleConfig::default().field();
        let player = field.build_zone(Team::Player);
        let enemy = field.build_zone(Team::Enemy);
        assert!((player.top() - 1280.0 * 2.0 / 3.0).abs() < 1e-3);
        assert_eq!(player.bottom(), field.height());
        assert_eq!(enemy.top(), 0.0);
        assert!((enemy.bottom() - 1280.0 / 3.0).abs() < 1e-3);
        assert_eq!(enemy.size().x, field.width());
    }

    #[test]
    fn max_step_defaults_to_fifty_milliseconds() {
        assert_eq!(BattleConfig::default().max_step(), Duration::from_millis(50));
    }

    #[test]
    fn negative_max_step_collapses_to_zero() {
        let config = BattleConfig {
            max_step_seconds: -1.0,
            ..BattleConfig::default()
        };
        assert_eq!(config.max_step(), Duration::ZERO);
    }

    #[test]
    fn partial_documents_fall_back_to_defaults() {
        let config: BattleConfig =
            serde_json::from_str(r#"{ "aggro_radius": 90.0, "free_build": true }"#)
                .expect("deserialize");
        assert_eq!(config.aggro_radius, 90.0);
        assert!(config.free_build);
        assert_eq!(config.spawn_interval_ms, 3000);
    }
}
