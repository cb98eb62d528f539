use glam::Vec2;

use crate::components::PickupKind;
use crate::map::ColliderId;
use crate::params::Params;

/// Simulation time, tracked in two domains.
///
/// Scaled time can be frozen by a time-stop sequence while unscaled time
/// keeps moving; every timer in the core declares which one it reads.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    pub dt: f32,  // Scaled delta for this tick
    pub now: f32, // Scaled elapsed time
    pub unscaled_dt: f32,
    pub unscaled_now: f32,
    pub scale: f32,
}

impl Time {
    /// Clamp the raw frame delta and advance the unscaled domain.
    pub fn begin_frame(&mut self, raw_dt: f32) {
        self.unscaled_dt = raw_dt.min(Params::MAX_DT);
        self.unscaled_now += self.unscaled_dt;
    }

    /// Derive the scaled delta once sequences have settled the scale.
    pub fn apply_scale(&mut self) {
        self.dt = self.unscaled_dt * self.scale;
        self.now += self.dt;
    }

    pub fn paused(&self) -> bool {
        self.scale == 0.0
    }
}

impl Default for Time {
    fn default() -> Self {
        Self {
            dt: 0.016,
            now: 0.0,
            unscaled_dt: 0.016,
            unscaled_now: 0.0,
            scale: 1.0,
        }
    }
}

/// Shared counters, mutated only by `settle_events` in response to events.
#[derive(Debug, Clone, Copy)]
pub struct Score {
    pub points: u32,
    pub coins: u32,
    pub lives: i32, // Negative lives signal game over to the host
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            coins: 0,
            lives: Params::STARTING_LIVES,
        }
    }

    /// Award from the fixed score table. Index 11 grants a life and no points.
    pub fn add_points(&mut self, index: usize) {
        let index = index.min(Params::SCORE_TABLE.len() - 1);
        if index == Params::EXTRA_LIFE_INDEX {
            self.add_life();
        }
        self.points = (self.points + Params::SCORE_TABLE[index]).min(Params::SCORE_MAX);
    }

    pub fn add_coin(&mut self) {
        self.coins += 1;
        if self.coins >= Params::COINS_PER_LIFE {
            self.coins = 0;
            self.add_life();
        }
    }

    pub fn add_life(&mut self) {
        self.lives = (self.lives + 1).min(Params::LIVES_MAX);
    }

    pub fn lose_life(&mut self) {
        self.lives -= 1;
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic RNG for boss timers and off-screen spawn heights.
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }

    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        use rand::Rng;
        self.0.gen_range(lo..hi)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Per-frame input snapshot supplied by the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub axis_h: f32,
    pub axis_v: f32,
    pub jump_down: bool, // Edge
    pub jump_held: bool,
    pub fire_down: bool,
    pub fire_held: bool,
}

/// Camera window used for on-screen activation and culling.
/// The camera itself is a collaborator; the host updates the center.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Viewport {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        (pos.x - self.center.x).abs() <= self.half_extents.x
            && (pos.y - self.center.y).abs() <= self.half_extents.y
    }

    pub fn right_edge(&self) -> f32 {
        self.center.x + self.half_extents.x
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.half_extents.y
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: Vec2::new(8.0, 5.0),
            half_extents: Vec2::new(8.0, 5.0),
        }
    }
}

/// A score award at a table index, optionally with a marker position.
#[derive(Debug, Clone, Copy)]
pub struct ScoreAward {
    pub index: usize,
    pub pos: Option<Vec2>,
}

/// Sound request for the presentation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundRequest {
    pub name: &'static str,
    pub music: bool,
}

/// Animation trigger request for the presentation collaborator.
#[derive(Debug, Clone, Copy)]
pub struct AnimRequest {
    pub entity: hecs::Entity,
    pub trigger: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Fireball,
    BossFire,
    Pickup(PickupKind),
    /// Presentation-only effect (stomp puff, brick shards); the host
    /// consumes these, the spawner ignores them.
    Effect(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct SpawnRequest {
    pub kind: SpawnKind,
    pub pos: Vec2,
    pub facing_right: bool,
}

/// A block struck from below, queued for the block system.
#[derive(Debug, Clone, Copy)]
pub struct BlockBump {
    pub collider: ColliderId,
    pub contact: Vec2,
    pub powered: bool,
}

/// Everything entities raised this frame. Cleared at the start of the
/// next tick, so the host reads it between steps.
#[derive(Debug, Clone, Default)]
pub struct Events {
    pub score: Vec<ScoreAward>,
    pub coins_collected: u32,
    pub sounds: Vec<SoundRequest>,
    pub anim: Vec<AnimRequest>,
    pub spawns: Vec<SpawnRequest>,
    pub block_bumps: Vec<BlockBump>,
    pub life_lost: bool,
    pub panic_started: bool,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.score.clear();
        self.coins_collected = 0;
        self.sounds.clear();
        self.anim.clear();
        self.spawns.clear();
        self.block_bumps.clear();
        self.life_lost = false;
        self.panic_started = false;
    }

    /// Queue a score award; the combined index is clamped into the table.
    pub fn award(&mut self, index: usize, pos: Option<Vec2>) {
        self.score.push(ScoreAward {
            index: index.min(Params::SCORE_TABLE.len() - 1),
            pos,
        });
    }

    pub fn play_sound(&mut self, name: &'static str, music: bool) {
        self.sounds.push(SoundRequest { name, music });
    }

    pub fn trigger(&mut self, entity: hecs::Entity, trigger: &'static str) {
        self.anim.push(AnimRequest { entity, trigger });
    }

    pub fn request_spawn(&mut self, kind: SpawnKind, pos: Vec2, facing_right: bool) {
        self.spawns.push(SpawnRequest {
            kind,
            pos,
            facing_right,
        });
    }
}

/// Apply queued score/coin/life events to the shared counters.
/// This is the only place `Score` is mutated during a tick.
pub fn settle_events(score: &mut Score, events: &Events) {
    for award in &events.score {
        score.add_points(award.index);
    }
    for _ in 0..events.coins_collected {
        score.add_coin();
    }
    if events.life_lost {
        score.lose_life();
    }
}
