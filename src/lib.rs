pub mod components;
pub mod config;
pub mod map;
pub mod params;
pub mod resources;
pub mod systems;

pub use components::*;
pub use config::Config;
pub use map::*;
pub use params::*;
pub use resources::*;
pub use systems::{PipeDirection, Sequences};

use glam::Vec2;
use hecs::World;

/// Advance the deterministic platformer simulation by one frame.
///
/// One call per rendered frame; there is no fixed micro-stepping, the
/// raw delta is clamped and consumed whole. Events are valid between
/// this call and the next.
#[allow(clippy::too_many_arguments)]
pub fn step(
    world: &mut World,
    time: &mut Time,
    grid: &mut CollisionGrid,
    config: &Config,
    score: &mut Score,
    events: &mut Events,
    input: &InputState,
    viewport: &Viewport,
    seq: &mut Sequences,
    rng: &mut GameRng,
    raw_dt: f32,
) {
    // Clear last frame's events, then clamp and bank unscaled time.
    events.clear();
    time.begin_frame(raw_dt);

    // 1. On-screen activation latches before anything moves.
    systems::activate_visible(world, viewport);

    // 2. Cutscenes and time-stops run unscaled and settle the scale.
    systems::advance_sequences(world, time, grid, seq, events);
    time.apply_scale();

    // 3. Scaled-domain timers.
    systems::tick_level_timer(world, time, seq, events);
    systems::tick_blocks(grid, time);
    systems::platform_update(world, time);

    // 4. Movers and hazards.
    systems::player_update(world, grid, time, config, input, events);
    systems::enemy_update(world, grid, time, config, viewport, rng, events);
    systems::projectile_update(world, grid, time, config, seq, events);
    systems::pickup_update(world, grid, time, config, seq, events);
    systems::hazard_update(world, time, config, seq, events);

    // 5. Interactions: contacts, then the bump queue the player filled.
    systems::resolve_contacts(world, grid, config, seq, events);
    systems::process_bumps(world, grid, events);

    // 6. Materialize spawn requests raised this frame.
    systems::spawn_from_events(world, events);

    // 7. Corpses, culling, and the event-driven counters.
    systems::advance_death_falls(world, time);
    systems::expire_corpses(world, time);
    systems::cull(world, grid, viewport, seq, events);
    settle_events(score, events);
}

/// Helper to create the player entity.
pub fn create_player(world: &mut World, pos: Vec2) -> hecs::Entity {
    let mut kin = Kinematics::new(pos, 0.0);
    kin.active = true;
    kin.facing_right = true;
    log::info!("player spawned at {pos}");
    world.spawn((Player::new(), kin))
}

pub fn spawn_goomba(world: &mut World, pos: Vec2, variant: EnemyVariant) -> hecs::Entity {
    let kin = Kinematics::new(pos, Params::GOOMBA_SPEED);
    world.spawn((
        Enemy::new(EnemyKind::Goomba, variant),
        kin,
        Patrol { turn_at_pits: false },
    ))
}

/// Red koopas patrol ledges instead of walking off them.
pub fn spawn_koopa(world: &mut World, pos: Vec2, variant: EnemyVariant) -> hecs::Entity {
    let kin = Kinematics::new(pos, Params::KOOPA_SPEED);
    world.spawn((
        Enemy::new(EnemyKind::Koopa, variant),
        kin,
        Patrol {
            turn_at_pits: variant == EnemyVariant::Red,
        },
        Shell::default(),
    ))
}

pub fn spawn_paratroopa(world: &mut World, pos: Vec2, variant: EnemyVariant) -> hecs::Entity {
    let kin = Kinematics::new(pos, Params::KOOPA_SPEED);
    world.spawn((
        Enemy::new(EnemyKind::Paratroopa, variant),
        kin,
        Patrol { turn_at_pits: false },
        Shell::default(),
        Wings::new(),
    ))
}

pub fn spawn_plant(world: &mut World, pos: Vec2, variant: EnemyVariant) -> hecs::Entity {
    let kin = Kinematics::new(pos, 0.0);
    world.spawn((Enemy::new(EnemyKind::Plant, variant), kin, Popup::new()))
}

pub fn spawn_bowser(world: &mut World, pos: Vec2) -> hecs::Entity {
    let kin = Kinematics::new(pos, Params::BOSS_SPEED);
    log::info!("boss spawned at {pos}");
    world.spawn((
        Enemy::new(EnemyKind::Bowser, EnemyVariant::Castle),
        kin,
        BossPattern::new(pos.x),
    ))
}

pub fn spawn_platform(world: &mut World, origin: Vec2, span: Vec2, speed: f32) -> hecs::Entity {
    world.spawn((Platform::new(origin, span, speed), Kinematics::new(origin, 0.0)))
}

/// Castle fire bar anchored at `pivot`.
pub fn spawn_fire_bar(
    world: &mut World,
    pivot: Vec2,
    start_angle: f32,
    clockwise: bool,
) -> hecs::Entity {
    world.spawn((FireBar::new(start_angle, clockwise), Kinematics::new(pivot, 0.0)))
}

/// A coin placed in the level, collected on contact.
pub fn spawn_coin(world: &mut World, pos: Vec2) -> hecs::Entity {
    let mut pickup = Pickup::new(PickupKind::Coin);
    pickup.reveal_timer = 0.0;
    world.spawn((pickup, Kinematics::new(pos, 0.0)))
}
