#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Building placement validation and per-kind construction timers.
//!
//! Validation is pure: the same point and the same obstacle set always yield
//! the same snapped position. A requested point must lie inside the team's
//! build zone; the footprint is then clamped into the zone and, when it
//! overlaps an obstacle, an expanding square ring search looks for the first
//! clear spot nearby.

use std::collections::BTreeMap;
use std::time::Duration;

use lane_siege_core::{BattleConfig, Bases, BuildingKind, Field, Rect, Structure, Team, Vec2};

/// Appends the footprint of every active base and structure of both teams.
pub fn collect_obstacles(bases: &Bases, structures: &[Structure], out: &mut Vec<Rect>) {
    out.clear();
    out.extend(
        bases
            .iter()
            .filter(|base| base.is_active())
            .map(|base| base.rect()),
    );
    out.extend(
        structures
            .iter()
            .filter(|structure| structure.is_active())
            .map(|structure| structure.rect()),
    );
}

/// Moves `point` so that a footprint of `size` centred on it lies inside
/// `zone`. Footprints larger than the zone are centred on it.
#[must_use]
pub fn clamp_to_zone(zone: &Rect, size: Vec2, point: Vec2) -> Vec2 {
    let half = size * 0.5;
    let clamp_axis = |value: f32, low: f32, high: f32, centre: f32| {
        if low > high {
            centre
        } else {
            value.max(low).min(high)
        }
    };
    Vec2::new(
        clamp_axis(
            point.x,
            zone.left() + half.x,
            zone.right() - half.x,
            zone.center().x,
        ),
        clamp_axis(
            point.y,
            zone.top() + half.y,
            zone.bottom() - half.y,
            zone.center().y,
        ),
    )
}

/// Reports whether a footprint centred on `center` keeps `padding` of
/// clearance from every obstacle.
#[must_use]
pub fn is_placement_clear(center: Vec2, size: Vec2, obstacles: &[Rect], padding: f32) -> bool {
    let candidate = Rect::from_center(center, size);
    obstacles
        .iter()
        .all(|obstacle| !candidate.overlaps(obstacle, padding))
}

/// Snaps `point` to the nearest clear spot inside `zone`.
///
/// The clamped point itself is tried first. Otherwise square rings of
/// increasing radius are probed at the configured step, up to the configured
/// multiple of the footprint's larger side, iterating x offsets in the outer
/// loop. Each probe is clamped into the zone before testing.
#[must_use]
pub fn find_valid_placement(
    config: &BattleConfig,
    zone: &Rect,
    size: Vec2,
    point: Vec2,
    obstacles: &[Rect],
) -> Option<Vec2> {
    let padding = config.placement_padding;
    let candidate = clamp_to_zone(zone, size, point);
    if is_placement_clear(candidate, size, obstacles, padding) {
        return Some(candidate);
    }

    let step = config.placement_search_step;
    if step.is_nan() || step <= 0.0 {
        return None;
    }
    let max_radius = size.x.max(size.y) * config.placement_search_extent;
    let rings = (max_radius / step).floor().max(0.0) as i32;

    for ring in 1..=rings {
        for dx in -ring..=ring {
            for dy in -ring..=ring {
                if dx.abs() != ring && dy.abs() != ring {
                    continue;
                }
                let offset = Vec2::new(dx as f32 * step, dy as f32 * step);
                let probe = clamp_to_zone(zone, size, point + offset);
                if is_placement_clear(probe, size, obstacles, padding) {
                    return Some(probe);
                }
            }
        }
    }
    None
}

/// Validates a placement request for `team`.
///
/// Returns the snapped centre, or `None` when the raw point lies outside the
/// team's build zone or no clear spot exists within the search bound.
#[must_use]
pub fn validate_placement(
    config: &BattleConfig,
    field: &Field,
    team: Team,
    kind: BuildingKind,
    point: Vec2,
    obstacles: &[Rect],
) -> Option<Vec2> {
    let zone = field.build_zone(team);
    if !point.is_finite() || !zone.contains(point) {
        return None;
    }
    find_valid_placement(config, &zone, kind.stats().size, point, obstacles)
}

/// Remaining and total construction time of a building kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstructionStatus {
    /// Time left before the kind may be placed again.
    pub remaining: Duration,
    /// Full construction time of the kind.
    pub total: Duration,
}

impl ConstructionStatus {
    /// Completed fraction in `0.0..=1.0`, suitable for progress bars.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total.is_zero() {
            return 1.0;
        }
        1.0 - (self.remaining.as_secs_f32() / self.total.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Per-team, per-kind cooldowns started whenever a building is committed.
#[derive(Clone, Debug, Default)]
pub struct ConstructionTimers {
    remaining: BTreeMap<(Team, BuildingKind), Duration>,
    bypass: bool,
}

impl ConstructionTimers {
    /// Creates an empty timer set. With `bypass` set no timer ever runs.
    #[must_use]
    pub fn new(bypass: bool) -> Self {
        Self {
            remaining: BTreeMap::new(),
            bypass,
        }
    }

    /// Starts the construction countdown of `kind` for `team`.
    pub fn start(&mut self, team: Team, kind: BuildingKind) {
        let total = kind.stats().construction_time;
        if self.bypass || total.is_zero() {
            return;
        }
        let _ = self.remaining.insert((team, kind), total);
    }

    /// Counts every running timer down by `dt`, dropping finished ones.
    pub fn tick(&mut self, dt: Duration) {
        self.remaining.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(dt);
            !remaining.is_zero()
        });
    }

    /// Reports whether `team` may place another building of `kind`.
    #[must_use]
    pub fn is_ready(&self, team: Team, kind: BuildingKind) -> bool {
        self.bypass || !self.remaining.contains_key(&(team, kind))
    }

    /// Running countdown of `kind` for `team`, if any.
    #[must_use]
    pub fn status(&self, team: Team, kind: BuildingKind) -> Option<ConstructionStatus> {
        self.remaining
            .get(&(team, kind))
            .map(|&remaining| ConstructionStatus {
                remaining,
                total: kind.stats().construction_time,
            })
    }

    /// Cancels every running countdown.
    pub fn clear(&mut self) {
        self.remaining.clear();
    }
}
