use glam::Vec2;

use crate::params::Params;

/// Shared kinematic state for every moving entity.
///
/// The inheritance chain of a classic engine is flattened here: all movers
/// carry the same record and behavior components select what acts on it.
#[derive(Debug, Clone, Copy)]
pub struct Kinematics {
    pub pos: Vec2,
    pub h_speed: f32, // Unsigned patrol speed for entities; signed for the player
    pub v_speed: f32,
    pub h_multiplier: f32, // Freezes (0) or boosts (3) movement independent of base speed
    pub facing_right: bool,
    pub active: bool, // Latched on first entering the viewport
    pub despawn_offscreen: bool,
    pub wall_distance: f32,
    pub half_width: f32,
    pub solid: bool, // Non-solid entities (mid-cutscene) are trivially grounded
    pub riding_platform: bool,
}

impl Kinematics {
    pub fn new(pos: Vec2, h_speed: f32) -> Self {
        Self {
            pos,
            h_speed,
            v_speed: 0.0,
            h_multiplier: 1.0,
            facing_right: false,
            active: false,
            despawn_offscreen: false,
            wall_distance: 0.5,
            half_width: 0.5,
            solid: true,
            riding_platform: false,
        }
    }

    /// Signed horizontal velocity for patrol-style movers.
    pub fn patrol_velocity(&self) -> f32 {
        self.h_speed * self.h_multiplier * if self.facing_right { 1.0 } else { -1.0 }
    }

    /// Airborne gravity with the shared clamp.
    pub fn apply_gravity(&mut self, accel: f32, dt: f32) {
        self.v_speed -= accel * dt;
        self.v_speed = self
            .v_speed
            .clamp(Params::VERT_SPEED_MIN, Params::VERT_SPEED_MAX);
    }
}

/// Player motion state. Swim exists for parity but is never entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Run,
    Jump,
    Fall,
    Swim,
    Flag,
}

/// Power tier, ordered so damage steps down one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PowerTier {
    None,
    Mushroom,
    Flower,
    Dead,
}

impl PowerTier {
    /// One step down the ladder; `None` means the hit was fatal.
    pub fn down_one(self) -> Option<PowerTier> {
        match self {
            PowerTier::Flower => Some(PowerTier::Mushroom),
            PowerTier::Mushroom => Some(PowerTier::None),
            PowerTier::None => None,
            PowerTier::Dead => Some(PowerTier::Dead),
        }
    }
}

/// Player component - state machines, timers and the cutscene override.
#[derive(Debug, Clone, Copy)]
pub struct Player {
    pub state: MotionState,
    pub power: PowerTier,
    pub has_star: bool,
    pub invincible_timer: f32, // Star window or post-hit grace
    pub shoot_cooldown: f32,
    pub coyote_timer: f32,
    pub bounce_combo: u32,
    /// When non-zero, replaces input entirely (pipes, flagpole, death).
    pub animating_input: Vec2,
}

impl Player {
    pub fn new() -> Self {
        Self {
            state: MotionState::Idle,
            power: PowerTier::None,
            has_star: false,
            invincible_timer: 0.0,
            shoot_cooldown: 0.0,
            coyote_timer: 0.0,
            bounce_combo: 0,
            animating_input: Vec2::ZERO,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.power == PowerTier::Dead
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Goomba,
    Koopa,
    Paratroopa,
    Plant,
    Bowser,
}

/// Cosmetic/behavioral palette. Red koopas turn at pits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyVariant {
    Overworld,
    Underground,
    Underwater,
    Castle,
    Red,
    Flying,
}

/// Enemy component - health and the stomp gate shared by every species.
#[derive(Debug, Clone, Copy)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub variant: EnemyVariant,
    pub health: i32,
    pub can_be_stomped: bool,
    pub stomp_cooldown: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, variant: EnemyVariant) -> Self {
        Self {
            kind,
            variant,
            health: if kind == EnemyKind::Bowser {
                Params::BOSS_HEALTH
            } else {
                1
            },
            can_be_stomped: true,
            stomp_cooldown: 0.0,
        }
    }

    pub fn alive(&self) -> bool {
        self.health > 0
    }
}

/// Walks at fixed speed, reversing at walls (and pits when flagged).
#[derive(Debug, Clone, Copy)]
pub struct Patrol {
    pub turn_at_pits: bool,
}

/// Koopa-family shell lifecycle state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shell {
    pub in_shell: bool,
    pub combo: u32, // Chained kills while the shell is moving
}

/// Paratroopa flight; removed on the first non-tool hit.
#[derive(Debug, Clone, Copy)]
pub struct Wings {
    pub flap_timer: f32,
}

impl Wings {
    pub fn new() -> Self {
        Self { flap_timer: 0.5 }
    }
}

impl Default for Wings {
    fn default() -> Self {
        Self::new()
    }
}

/// Plant popup toggle.
#[derive(Debug, Clone, Copy)]
pub struct Popup {
    pub up: bool,
    pub change_timer: f32,
}

impl Popup {
    pub fn new() -> Self {
        Self {
            up: false,
            change_timer: Params::PLANT_TOGGLE_INTERVAL,
        }
    }
}

impl Default for Popup {
    fn default() -> Self {
        Self::new()
    }
}

/// Boss pattern: gated activation plus independent fire and jump timers.
#[derive(Debug, Clone, Copy)]
pub struct BossPattern {
    pub can_act: bool,
    pub fire_timer: f32,
    pub jump_timer: f32,
    pub left_limit: f32,
    pub right_limit: f32,
    pub moving_right: bool,
}

impl BossPattern {
    pub fn new(spawn_x: f32) -> Self {
        Self {
            can_act: false,
            fire_timer: 0.0,
            jump_timer: 0.0,
            left_limit: spawn_x - Params::BOSS_WALK_SPAN,
            right_limit: spawn_x,
            moving_right: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    PlayerFireball,
    BossFire,
}

/// Projectile component. `resolved` guards against double burst handling.
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub resolved: bool,
}

impl Projectile {
    pub fn new(kind: ProjectileKind) -> Self {
        Self {
            kind,
            resolved: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    Mushroom,
    Flower,
    Star,
    OneUp,
    Coin,
}

impl PickupKind {
    /// Score-table index awarded on collection.
    pub fn score_index(self) -> usize {
        match self {
            PickupKind::Mushroom | PickupKind::Flower | PickupKind::Star => 6,
            PickupKind::OneUp => Params::EXTRA_LIFE_INDEX,
            PickupKind::Coin => 2,
        }
    }
}

/// Pickup component. Inert until the reveal delay elapses.
#[derive(Debug, Clone, Copy)]
pub struct Pickup {
    pub kind: PickupKind,
    pub reveal_timer: f32,
    /// Block coins collect themselves shortly after spawning.
    pub auto_collect: Option<f32>,
}

impl Pickup {
    pub fn new(kind: PickupKind) -> Self {
        Self {
            kind,
            reveal_timer: Params::REVEAL_DELAY,
            auto_collect: None,
        }
    }

    pub fn block_coin() -> Self {
        Self {
            kind: PickupKind::Coin,
            reveal_timer: 0.0,
            auto_collect: Some(Params::COIN_COLLECT_DELAY),
        }
    }
}

/// Knocked-off-screen death fall. Advances on unscaled time so the
/// animation completes during a time-stop.
#[derive(Debug, Clone, Copy)]
pub struct DeathFall {
    pub v_speed: f32,
}

impl DeathFall {
    pub fn new() -> Self {
        Self {
            v_speed: Params::DEATH_POP,
        }
    }
}

impl Default for DeathFall {
    fn default() -> Self {
        Self::new()
    }
}

/// Stomped-flat death; the entity lingers briefly then despawns.
#[derive(Debug, Clone, Copy)]
pub struct Squish {
    pub timer: f32,
}

impl Squish {
    pub fn new() -> Self {
        Self {
            timer: Params::SQUISH_DURATION,
        }
    }
}

/// Spent projectile playing its burst effect before despawning.
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    pub timer: f32,
}

impl Burst {
    pub fn new() -> Self {
        Self {
            timer: Params::BURST_DELAY,
        }
    }
}

/// Moving platform ping-ponging between its origin and origin + span.
#[derive(Debug, Clone, Copy)]
pub struct Platform {
    pub origin: Vec2,
    pub span: Vec2,
    pub speed: f32,
    pub forward: bool,
}

impl Platform {
    pub fn new(origin: Vec2, span: Vec2, speed: f32) -> Self {
        Self {
            origin,
            span,
            speed,
            forward: true,
        }
    }
}

/// Castle hazard: a line of flames rotating slowly around a pivot.
/// Spins once on-screen and hurts the player on contact.
#[derive(Debug, Clone, Copy)]
pub struct FireBar {
    pub angle: f32,
    pub clockwise: bool,
    pub flames: u32,
}

impl FireBar {
    pub fn new(start_angle: f32, clockwise: bool) -> Self {
        Self {
            angle: start_angle,
            clockwise,
            flames: Params::FIRE_BAR_FLAMES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_tier_steps_down_one() {
        assert_eq!(PowerTier::Flower.down_one(), Some(PowerTier::Mushroom));
        assert_eq!(PowerTier::Mushroom.down_one(), Some(PowerTier::None));
        assert_eq!(
            PowerTier::None.down_one(),
            None,
            "A hit below the lowest tier is fatal"
        );
    }

    #[test]
    fn test_gravity_clamps_to_terminal_velocity() {
        let mut kin = Kinematics::new(Vec2::ZERO, 0.0);
        for _ in 0..100 {
            kin.apply_gravity(Params::GRAVITY_FALL, 0.1);
        }
        assert_eq!(
            kin.v_speed,
            Params::VERT_SPEED_MIN,
            "Vertical speed should clamp at the terminal minimum"
        );
    }

    #[test]
    fn test_patrol_velocity_respects_facing_and_multiplier() {
        let mut kin = Kinematics::new(Vec2::ZERO, 1.5);
        kin.facing_right = true;
        assert_eq!(kin.patrol_velocity(), 1.5);
        kin.facing_right = false;
        assert_eq!(kin.patrol_velocity(), -1.5);
        kin.h_multiplier = 3.0;
        assert_eq!(kin.patrol_velocity(), -4.5, "Shell multiplier scales speed");
        kin.h_multiplier = 0.0;
        assert_eq!(kin.patrol_velocity(), 0.0, "Zero multiplier freezes movement");
    }

    #[test]
    fn test_bowser_spawns_with_boss_health() {
        let boss = Enemy::new(EnemyKind::Bowser, EnemyVariant::Castle);
        assert_eq!(boss.health, Params::BOSS_HEALTH);
        let goomba = Enemy::new(EnemyKind::Goomba, EnemyVariant::Overworld);
        assert_eq!(goomba.health, 1);
    }
}
