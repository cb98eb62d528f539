/// Game tuning parameters for the platformer simulation
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Physics
    pub const GRAVITY_FALL: f32 = 50.0; // Player falling and animating-input gravity
    pub const GRAVITY_ASCENT: f32 = 20.0; // Drag on a held jump before the apex
    pub const GRAVITY_ENTITY: f32 = 20.0; // Enemies, pickups, fireballs
    pub const VERT_SPEED_MIN: f32 = -25.0;
    pub const VERT_SPEED_MAX: f32 = 13.0;
    pub const MAX_DT: f32 = 0.1; // Clamp to prevent large jumps

    // Probe ranges
    pub const PLAYER_DOWN_RANGE: f32 = 0.25; // Short to avoid corner-hover on tile seams
    pub const ENTITY_DOWN_RANGE: f32 = 1.0;
    pub const PLAYER_UP_RANGE: f32 = 1.0;
    pub const ENTITY_UP_RANGE: f32 = 0.05;
    pub const ENTITY_UP_OFFSET: f32 = 1.0;
    pub const PLAYER_UP_OFFSET_SMALL: f32 = 0.25;
    pub const PLAYER_UP_OFFSET_BIG: f32 = 1.25;
    pub const WALL_PROBE_LIFT: f32 = 0.25;
    pub const PIT_PROBE_AHEAD: f32 = 0.5;
    pub const PIT_PROBE_DEPTH: f32 = 2.0;

    // Player movement
    pub const JUMP_SPEED: f32 = 15.0;
    pub const WALK_MULTIPLIER: f32 = 1.25;
    pub const RUN_MULTIPLIER: f32 = 2.5;
    pub const INPUT_SCALE: f32 = 3.0;
    pub const ACCEL_INPUT: f32 = 3.0; // Approach rate while steering
    pub const ACCEL_RELEASE: f32 = 4.0; // Approach rate while letting go
    pub const AIR_CONTROL: f32 = 0.33;
    pub const ANIM_IDLE_THRESHOLD: f32 = 0.2; // State inference under animating input
    pub const COYOTE_TIME: f32 = 0.1;

    // Player combat / power
    pub const SHOOT_COOLDOWN: f32 = 0.175;
    pub const HIT_GRACE: f32 = 2.0;
    pub const STAR_DURATION: f32 = 10.0;
    pub const POWERUP_TIME_STOP: f32 = 1.0;
    pub const FIREBALL_SPAWN_AHEAD: f32 = 0.5;
    pub const FIREBALL_SPAWN_LIFT: f32 = 1.0;

    // Stomps
    pub const STOMP_RANGE: f32 = 1.0;
    pub const STOMP_MIDLINE: f32 = 0.5; // Player above enemy.y + this counts as a stomp
    pub const STOMP_COOLDOWN: f32 = 0.3;
    pub const FORCE_JUMP_SPEED: f32 = 6.0; // Non-player entities bounced off a block

    // Enemies
    pub const GOOMBA_SPEED: f32 = 1.5;
    pub const KOOPA_SPEED: f32 = 1.5;
    pub const SHELL_MULTIPLIER: f32 = 3.0;
    pub const SHELL_PROBE_LIFT: f32 = 0.5;
    pub const FLAP_INTERVAL: f32 = 1.0;
    pub const FLAP_IMPULSE: f32 = 10.0;
    pub const PLANT_TOGGLE_INTERVAL: f32 = 3.0;
    pub const PLANT_RANGE: f32 = 1.25;
    pub const PLANT_SUPPRESS_RANGE: f32 = 2.0;

    // Boss
    pub const BOSS_HEALTH: i32 = 5;
    pub const BOSS_SPEED: f32 = 1.0;
    pub const BOSS_WALK_SPAN: f32 = 5.0;
    pub const BOSS_RANGE: f32 = 2.0;
    pub const BOSS_FIRE_INTERVAL: f32 = 3.0;
    pub const BOSS_FIRE_SPEED: f32 = 5.0;
    pub const BOSS_JUMP_MIN: f32 = 3.0;
    pub const BOSS_JUMP_MAX: f32 = 7.51;
    pub const BOSS_JUMP_SPEED: f32 = 12.5;
    pub const BOSS_SCORE_INDEX: usize = 9;
    // Off-screen fire spawns this far above/below the viewport center.
    pub const BOSS_EDGE_FIRE_MIN: f32 = -3.0;
    pub const BOSS_EDGE_FIRE_MAX: f32 = 1.01;

    // Fire bars
    pub const FIRE_BAR_SPEED: f32 = 50.0 * std::f32::consts::PI / 180.0; // rad/s
    pub const FIRE_BAR_FLAMES: u32 = 6;
    pub const FIRE_BAR_FLAME_SPACING: f32 = 0.5;
    pub const FIRE_BAR_FLAME_RADIUS: f32 = 0.4;

    // Projectiles
    pub const FIREBALL_SPEED: f32 = 8.0;
    pub const FIREBALL_BOUNCE: f32 = 6.0;
    pub const FIREBALL_PROBE: f32 = 0.25;
    pub const BURST_DELAY: f32 = 0.6;

    // Pickups
    pub const MUSHROOM_SPEED: f32 = 2.0;
    pub const STAR_SPEED: f32 = 2.0;
    pub const STAR_BOUNCE: f32 = 2.5;
    pub const STAR_GRAVITY: f32 = 2.0;
    pub const REVEAL_DELAY: f32 = 1.0;
    pub const COIN_COLLECT_DELAY: f32 = 0.4;

    // Death sequences (unscaled time)
    pub const DEATH_POP: f32 = 3.0;
    pub const PLAYER_DEATH_POP: f32 = 4.0;
    pub const DEATH_GRAVITY: f32 = 5.0;
    pub const DEATH_LERP_RATE: f32 = 3.0;
    pub const PLAYER_DEATH_DURATION: f32 = 5.0;
    pub const PLAYER_DEATH_HOLD: f32 = 0.5; // Pause before the player starts falling
    pub const SQUISH_DURATION: f32 = 0.5;

    // Blocks
    pub const MULTI_HIT_WINDOW: f32 = 5.0;

    // Scoring. Index 11 grants a life and is worth nothing.
    // Compatibility contract with the UI layer; do not reorder.
    pub const SCORE_TABLE: [u32; 12] = [
        50, 100, 200, 400, 500, 800, 1000, 2000, 4000, 5000, 8000, 0,
    ];
    pub const EXTRA_LIFE_INDEX: usize = 11;
    pub const SCORE_MAX: u32 = 999_999;
    pub const COINS_PER_LIFE: u32 = 100;
    pub const LIVES_MAX: i32 = 128;
    pub const STARTING_LIVES: i32 = 3;

    // Level timer
    pub const LEVEL_TIME: f32 = 160.0;
    pub const PANIC_TIME: f32 = 30.0;

    // Sequences
    pub const FLAG_SLIDE_SPEED: f32 = -6.0;
    pub const FLAG_WALK_SPEED: f32 = 3.0;
    pub const FLAG_PAUSE: f32 = 1.0;
    pub const WARP_SPEED: f32 = 3.0;
    pub const WARP_ENTER_HORIZ: f32 = 0.325;
    pub const WARP_ENTER_VERT: f32 = 0.7;
    pub const WARP_MID_PAUSE: f32 = 1.0;
    pub const BRIDGE_PIECE_INTERVAL: f32 = 0.1;
    pub const BRIDGE_POST_PAUSE: f32 = 1.5;
    pub const BRIDGE_WALK_SPEED: f32 = 4.0;

    // Culling
    pub const CULL_BELOW: f32 = 10.0;
}
