use glam::Vec2;

use crate::params::Params;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Check if circle intersects AABB
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = Vec2::new(
            center.x.clamp(self.min.x, self.max.x),
            center.y.clamp(self.min.y, self.max.y),
        );
        (center - closest).length_squared() <= radius * radius
    }
}

/// Identity of a static collider, stable for per-tick deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderId {
    Solid(usize),
    Block(usize),
}

/// A ray probe result against the Ground layer.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub collider: ColliderId,
    pub point: Vec2,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockItem {
    None,
    PowerUp,
    Coin,
    Star,
    ExtraLife,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Question { contains: BlockItem, multi_hit: bool },
    Brick,
}

/// Mutable per-block state. Spent question blocks stay solid; broken
/// bricks drop out of the collision grid entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockState {
    pub spent: bool,
    pub broken: bool,
    pub multi_started: bool,
    pub multi_timer: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub aabb: Aabb,
    pub kind: BlockKind,
    pub state: BlockState,
}

/// Static Ground-layer geometry: plain solids plus bumpable blocks.
///
/// Dynamic layers (Enemies, Items, Player) live in the ECS world and are
/// queried there; this grid only answers ray and box probes against
/// terrain.
#[derive(Debug, Clone, Default)]
pub struct CollisionGrid {
    pub solids: Vec<Aabb>,
    pub blocks: Vec<Block>,
    pub kill_plane_y: f32,
}

impl CollisionGrid {
    pub fn new() -> Self {
        Self {
            solids: Vec::new(),
            blocks: Vec::new(),
            kill_plane_y: -10.0,
        }
    }

    pub fn add_solid(&mut self, aabb: Aabb) -> ColliderId {
        self.solids.push(aabb);
        ColliderId::Solid(self.solids.len() - 1)
    }

    pub fn add_block(&mut self, aabb: Aabb, kind: BlockKind) -> ColliderId {
        self.blocks.push(Block {
            aabb,
            kind,
            state: BlockState {
                multi_timer: Params::MULTI_HIT_WINDOW,
                ..BlockState::default()
            },
        });
        ColliderId::Block(self.blocks.len() - 1)
    }

    /// Degenerate the solid so nothing hits it again, without shifting
    /// the indices other colliders are known by.
    pub fn clear_solid(&mut self, index: usize) {
        if let Some(solid) = self.solids.get_mut(index) {
            *solid = Aabb::new(Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY));
        }
    }

    /// A flat run of ground, handy for levels and tests.
    pub fn add_ground_strip(&mut self, x0: f32, x1: f32, top_y: f32) -> ColliderId {
        self.add_solid(Aabb::new(Vec2::new(x0, top_y - 1.0), Vec2::new(x1, top_y)))
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    fn collider_aabb(&self, id: ColliderId) -> Option<&Aabb> {
        match id {
            ColliderId::Solid(i) => self.solids.get(i),
            ColliderId::Block(i) => {
                let b = self.blocks.get(i)?;
                if b.state.broken {
                    None
                } else {
                    Some(&b.aabb)
                }
            }
        }
    }

    fn each_collider(&self) -> impl Iterator<Item = (ColliderId, &Aabb)> {
        let solids = self
            .solids
            .iter()
            .enumerate()
            .map(|(i, a)| (ColliderId::Solid(i), a));
        let blocks = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.state.broken)
            .map(|(i, b)| (ColliderId::Block(i), &b.aabb));
        solids.chain(blocks)
    }

    /// Nearest terrain hit along `dir` within `len`, or None.
    /// A "no collider" outcome is a normal result, never an error.
    pub fn raycast(&self, origin: Vec2, dir: Vec2, len: f32) -> Option<RayHit> {
        if len <= 0.0 {
            return None;
        }
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }

        let mut best: Option<RayHit> = None;
        for (id, aabb) in self.each_collider() {
            if let Some(t) = ray_vs_aabb(origin, dir, len, aabb) {
                if best.as_ref().map_or(true, |b| t < b.distance) {
                    best = Some(RayHit {
                        collider: id,
                        point: origin + dir * t,
                        distance: t,
                    });
                }
            }
        }
        best
    }

    /// Does any terrain overlap the box?
    pub fn overlaps(&self, aabb: &Aabb) -> bool {
        self.each_collider().any(|(_, a)| a.overlaps(aabb))
    }

    /// Re-fetch a collider's box, None once a brick is broken.
    pub fn aabb_of(&self, id: ColliderId) -> Option<Aabb> {
        self.collider_aabb(id).copied()
    }
}

/// Slab intersection; returns the entry distance along the ray.
fn ray_vs_aabb(origin: Vec2, dir: Vec2, len: f32, aabb: &Aabb) -> Option<f32> {
    let inv = Vec2::new(
        if dir.x != 0.0 { 1.0 / dir.x } else { f32::INFINITY },
        if dir.y != 0.0 { 1.0 / dir.y } else { f32::INFINITY },
    );

    let t1 = (aabb.min - origin) * inv;
    let t2 = (aabb.max - origin) * inv;
    let t_min = t1.min(t2);
    let t_max = t1.max(t2);

    // Degenerate axes: the origin must lie inside the slab.
    if dir.x == 0.0 && (origin.x < aabb.min.x || origin.x > aabb.max.x) {
        return None;
    }
    if dir.y == 0.0 && (origin.y < aabb.min.y || origin.y > aabb.max.y) {
        return None;
    }

    let near = t_min.x.max(t_min.y).max(0.0);
    let far = t_max.x.min(t_max.y);
    if near <= far && near <= len {
        Some(near)
    } else {
        None
    }
}
