use glam::Vec2;

use crate::components::Kinematics;
use crate::map::{CollisionGrid, ColliderId, RayHit};
use crate::params::Params;

/// Probe geometry. The player uses a much shorter downward range than
/// other entities to avoid false "grounded" states at tile-grid internal
/// corners.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSpec {
    pub down_range: f32,
    pub up_offset: f32,
    pub up_range: f32,
}

impl ProbeSpec {
    pub fn entity() -> Self {
        Self {
            down_range: Params::ENTITY_DOWN_RANGE,
            up_offset: Params::ENTITY_UP_OFFSET,
            up_range: Params::ENTITY_UP_RANGE,
        }
    }

    /// The upward probe origin tracks the player's current height.
    pub fn player(big: bool) -> Self {
        Self {
            down_range: Params::PLAYER_DOWN_RANGE,
            up_offset: if big {
                Params::PLAYER_UP_OFFSET_BIG
            } else {
                Params::PLAYER_UP_OFFSET_SMALL
            },
            up_range: Params::PLAYER_UP_RANGE,
        }
    }
}

/// Three parallel downward rays: center, +half-width, -half-width.
pub fn colliders_below(
    grid: &CollisionGrid,
    pos: Vec2,
    half_width: f32,
    range: f32,
) -> [Option<RayHit>; 3] {
    [
        grid.raycast(pos, Vec2::NEG_Y, range),
        grid.raycast(pos + Vec2::new(half_width, 0.0), Vec2::NEG_Y, range),
        grid.raycast(pos + Vec2::new(-half_width, 0.0), Vec2::NEG_Y, range),
    ]
}

/// Three parallel upward rays with per-tick deduplication: if two rays
/// resolve to the same collider only the first is kept, so one block can
/// never register two hits in a single tick.
pub fn colliders_above(
    grid: &CollisionGrid,
    pos: Vec2,
    half_width: f32,
    spec: ProbeSpec,
) -> [Option<RayHit>; 3] {
    let base = pos + Vec2::new(0.0, spec.up_offset);
    let mut hits = [
        grid.raycast(base, Vec2::Y, spec.up_range),
        grid.raycast(base + Vec2::new(half_width, 0.0), Vec2::Y, spec.up_range),
        grid.raycast(base + Vec2::new(-half_width, 0.0), Vec2::Y, spec.up_range),
    ];

    let mut seen: Vec<ColliderId> = Vec::with_capacity(3);
    for hit in hits.iter_mut() {
        if let Some(h) = hit {
            if seen.contains(&h.collider) {
                *hit = None;
            } else {
                seen.push(h.collider);
            }
        }
    }
    hits
}

/// Grounded iff a downward probe hits with its contact point at or below
/// the entity's own position, or the entity is non-solid / riding a
/// platform and therefore trivially grounded.
pub fn is_grounded(grid: &CollisionGrid, kin: &Kinematics, spec: ProbeSpec) -> bool {
    if !kin.solid || kin.riding_platform {
        return true;
    }
    colliders_below(grid, kin.pos, kin.half_width, spec.down_range)
        .iter()
        .flatten()
        .any(|hit| hit.point.y <= kin.pos.y)
}

pub fn is_touching_ceiling(grid: &CollisionGrid, kin: &Kinematics, spec: ProbeSpec) -> bool {
    colliders_above(grid, kin.pos, kin.half_width, spec)
        .iter()
        .any(|h| h.is_some())
}

/// One horizontal ray in the facing direction, lifted slightly off the
/// feet. Inactive entities never report walls.
pub fn facing_wall(grid: &CollisionGrid, kin: &Kinematics) -> bool {
    if !kin.active {
        return false;
    }
    let dir = if kin.facing_right { Vec2::X } else { Vec2::NEG_X };
    grid.raycast(
        kin.pos + Vec2::new(0.0, Params::WALL_PROBE_LIFT),
        dir,
        kin.wall_distance,
    )
    .is_some()
}

/// Downward probe at the leading edge; true when no ground is found.
pub fn pit_ahead(grid: &CollisionGrid, kin: &Kinematics) -> bool {
    let ahead = if kin.facing_right {
        Params::PIT_PROBE_AHEAD
    } else {
        -Params::PIT_PROBE_AHEAD
    };
    grid.raycast(
        kin.pos + Vec2::new(ahead, 0.0),
        Vec2::NEG_Y,
        Params::PIT_PROBE_DEPTH,
    )
    .is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Aabb, BlockKind, CollisionGrid};

    fn flat_ground() -> CollisionGrid {
        let mut grid = CollisionGrid::new();
        grid.add_ground_strip(-10.0, 10.0, 0.0);
        grid
    }

    fn standing_kin(pos: Vec2) -> Kinematics {
        let mut kin = Kinematics::new(pos, 0.0);
        kin.active = true;
        kin
    }

    #[test]
    fn test_grounded_on_flat_ground() {
        let grid = flat_ground();
        let kin = standing_kin(Vec2::new(0.0, 0.1));
        assert!(is_grounded(&grid, &kin, ProbeSpec::entity()));
    }

    #[test]
    fn test_not_grounded_when_out_of_probe_range() {
        let grid = flat_ground();
        let kin = standing_kin(Vec2::new(0.0, 0.5));
        assert!(
            !is_grounded(&grid, &kin, ProbeSpec::player(false)),
            "Player range is 0.25; half a unit up is airborne"
        );
        assert!(
            is_grounded(&grid, &kin, ProbeSpec::entity()),
            "Entity range is a full unit"
        );
    }

    #[test]
    fn test_non_solid_entity_is_trivially_grounded() {
        let grid = CollisionGrid::new();
        let mut kin = standing_kin(Vec2::new(0.0, 50.0));
        kin.solid = false;
        assert!(
            is_grounded(&grid, &kin, ProbeSpec::player(false)),
            "Mid-cutscene entities count as grounded"
        );
    }

    #[test]
    fn test_platform_rider_is_trivially_grounded() {
        let grid = CollisionGrid::new();
        let mut kin = standing_kin(Vec2::new(0.0, 50.0));
        kin.riding_platform = true;
        assert!(is_grounded(&grid, &kin, ProbeSpec::entity()));
    }

    #[test]
    fn test_edge_probe_keeps_entity_grounded() {
        let grid = flat_ground();
        // Center ray is past the strip edge but the -half_width ray isn't.
        let kin = standing_kin(Vec2::new(10.3, 0.1));
        assert!(is_grounded(&grid, &kin, ProbeSpec::entity()));
    }

    #[test]
    fn test_ceiling_dedup_single_block_single_hit() {
        let mut grid = CollisionGrid::new();
        // One wide block above; all three rays resolve to it.
        grid.add_block(
            Aabb::new(Vec2::new(-2.0, 1.0), Vec2::new(2.0, 2.0)),
            BlockKind::Brick,
        );

        let kin = standing_kin(Vec2::ZERO);
        let hits = colliders_above(&grid, kin.pos, kin.half_width, ProbeSpec::player(false));
        let count = hits.iter().flatten().count();
        assert_eq!(count, 1, "Duplicate collider hits must be nulled");
    }

    #[test]
    fn test_ceiling_distinct_blocks_all_reported() {
        let mut grid = CollisionGrid::new();
        grid.add_block(
            Aabb::new(Vec2::new(-1.0, 1.0), Vec2::new(-0.1, 2.0)),
            BlockKind::Brick,
        );
        grid.add_block(
            Aabb::new(Vec2::new(0.1, 1.0), Vec2::new(1.0, 2.0)),
            BlockKind::Brick,
        );

        let kin = standing_kin(Vec2::ZERO);
        let hits = colliders_above(&grid, kin.pos, kin.half_width, ProbeSpec::player(false));
        assert_eq!(
            hits.iter().flatten().count(),
            2,
            "Side rays see their own blocks"
        );
    }

    #[test]
    fn test_wall_probe_respects_facing() {
        let mut grid = flat_ground();
        grid.add_solid(Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 2.0)));

        let mut kin = standing_kin(Vec2::new(0.6, 0.0));
        kin.facing_right = true;
        assert!(facing_wall(&grid, &kin));
        kin.facing_right = false;
        assert!(!facing_wall(&grid, &kin), "No wall behind");
    }

    #[test]
    fn test_inactive_entity_sees_no_walls() {
        let mut grid = flat_ground();
        grid.add_solid(Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 2.0)));

        let mut kin = standing_kin(Vec2::new(0.6, 0.0));
        kin.facing_right = true;
        kin.active = false;
        assert!(!facing_wall(&grid, &kin));
    }

    #[test]
    fn test_pit_detected_at_strip_edge() {
        let grid = flat_ground();
        let mut kin = standing_kin(Vec2::new(9.8, 0.1));
        kin.facing_right = true;
        assert!(pit_ahead(&grid, &kin), "Leading edge ray finds no ground");
        kin.facing_right = false;
        assert!(!pit_ahead(&grid, &kin));
    }
}
