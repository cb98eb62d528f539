use glam::Vec2;
use hecs::World;

use crate::components::{Kinematics, MotionState, Player, Popup, PowerTier};
use crate::config::Config;
use crate::map::{ColliderId, CollisionGrid};
use crate::params::Params;
use crate::resources::{Events, Time};
use crate::systems::combat;

/// Brief scaled-time freeze (power-up flourish, taking damage, death).
/// Measured in unscaled time so it actually elapses.
#[derive(Debug, Clone, Copy)]
pub struct TimeStop {
    pub remaining: f32,
}

/// The player's death fall. Unscaled so the animation completes while
/// the rest of the simulation is frozen.
#[derive(Debug, Clone, Copy)]
pub struct PlayerDeath {
    pub timer: f32,
    pub instant: bool, // Pit deaths skip the pop and the fall
}

#[derive(Debug, Clone, Copy)]
enum FlagPhase {
    Pause(f32),
    Slide,
    DoorPause(f32),
    Walk,
}

/// Flagpole descent: freeze, slide to the base, pause, walk to the door.
#[derive(Debug, Clone, Copy)]
pub struct FlagDescent {
    base_y: f32,
    phase: FlagPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl PipeDirection {
    pub fn vec(self) -> Vec2 {
        match self {
            PipeDirection::Left => Vec2::new(-Params::WARP_SPEED, 0.0),
            PipeDirection::Right => Vec2::new(Params::WARP_SPEED, 0.0),
            PipeDirection::Up => Vec2::new(0.0, Params::WARP_SPEED),
            PipeDirection::Down => Vec2::new(0.0, -Params::WARP_SPEED),
        }
    }

    fn enter_time(self) -> f32 {
        match self {
            PipeDirection::Left | PipeDirection::Right => Params::WARP_ENTER_HORIZ,
            PipeDirection::Up | PipeDirection::Down => Params::WARP_ENTER_VERT,
        }
    }

    /// Offset from the exit mouth so the emerge animation lines up.
    fn exit_adjust(self) -> Vec2 {
        match self {
            PipeDirection::Left => Vec2::new(2.1, 0.0),
            PipeDirection::Right => Vec2::new(-2.1, 0.0),
            PipeDirection::Up => Vec2::new(0.0, -2.5),
            PipeDirection::Down => Vec2::new(0.0, 2.5),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum WarpPhase {
    Enter(f32),
    MidPause(f32),
    Exit(f32),
}

/// Pipe warp: animate in, teleport, animate out, hand control back.
#[derive(Debug, Clone, Copy)]
pub struct PipeWarp {
    out_dir: PipeDirection,
    warp_pos: Vec2,
    out_music: &'static str,
    phase: WarpPhase,
}

#[derive(Debug, Clone, Copy)]
enum BridgePhase {
    Breaking,
    Settle(f32),
}

/// Boss-bridge collapse: scaled time frozen, pieces removed on an
/// unscaled beat, then a scripted kill and walk-off.
#[derive(Debug, Clone, Copy)]
pub struct BridgeCollapse {
    pieces_left: u32,
    piece_timer: f32,
    bridge_collider: Option<ColliderId>,
    phase: BridgePhase,
}

/// Level countdown with the one-shot panic threshold.
#[derive(Debug, Clone, Copy)]
pub struct LevelTimer {
    pub remaining: f32,
    pub active: bool,
    pub panic: bool,
}

impl LevelTimer {
    pub fn new() -> Self {
        Self {
            remaining: Params::LEVEL_TIME,
            active: false,
            panic: false,
        }
    }

    pub fn start(&mut self, duration: f32) {
        self.remaining = duration;
        self.active = true;
        self.panic = false;
    }
}

impl Default for LevelTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// All running multi-tick sequences. Each is an explicit resumable state
/// object advanced once per tick; a sequence ends by clearing its slot.
#[derive(Debug, Default)]
pub struct Sequences {
    pub time_stop: Option<TimeStop>,
    pub player_death: Option<PlayerDeath>,
    pub flag: Option<FlagDescent>,
    pub warp: Option<PipeWarp>,
    pub bridge: Option<BridgeCollapse>,
    pub level_timer: LevelTimer,
}

impl Sequences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze scaled time for `secs` of real time. Overlapping requests
    /// keep the longer freeze.
    pub fn start_time_stop(&mut self, secs: f32) {
        let remaining = self.time_stop.map_or(0.0, |t| t.remaining).max(secs);
        self.time_stop = Some(TimeStop { remaining });
    }

    /// Arm the level countdown with the configured duration. Called by
    /// the host when play begins.
    pub fn begin_level(&mut self, config: &Config) {
        self.level_timer.start(config.level_time);
    }
}

/// Put the player into the Dead terminal state and begin the fall.
pub fn start_player_death(
    player: &mut Player,
    kin: &mut Kinematics,
    seq: &mut Sequences,
    events: &mut Events,
    instant: bool,
) {
    if player.is_dead() {
        return;
    }
    player.power = PowerTier::Dead;
    player.animating_input = Vec2::ZERO;
    kin.h_speed = 0.0;

    seq.start_time_stop(Params::PLAYER_DEATH_DURATION);
    events.play_sound("", true); // Stop music
    events.play_sound("Die", false);

    if !instant {
        kin.v_speed = Params::PLAYER_DEATH_POP;
    }
    seq.player_death = Some(PlayerDeath {
        timer: Params::PLAYER_DEATH_DURATION,
        instant,
    });
    log::debug!("player death sequence started (instant: {})", instant);
}

/// Begin the flagpole descent, awarding the height-banded score.
pub fn start_flag_descent(
    world: &mut World,
    seq: &mut Sequences,
    events: &mut Events,
    pole_base: Vec2,
) {
    let Some(entity) = combat::find_player(world) else {
        return;
    };
    let height = {
        let mut player = world.get::<&mut Player>(entity).unwrap();
        let mut kin = world.get::<&mut Kinematics>(entity).unwrap();
        player.state = MotionState::Flag;
        player.animating_input = Vec2::new(0.001, 0.001); // Freeze in place
        kin.solid = false; // Slide through blocks and enemies
        kin.pos.distance(pole_base)
    };

    let index = if height < 1.5 {
        1 // 100
    } else if height < 3.0 {
        3 // 400
    } else if height < 4.5 {
        5 // 800
    } else if height < 6.0 {
        7 // 2000
    } else {
        9 // 5000
    };
    events.award(index, Some(pole_base));
    events.play_sound("Kick", false);
    events.play_sound("", true); // Stop music

    seq.level_timer.active = false;
    seq.flag = Some(FlagDescent {
        base_y: pole_base.y,
        phase: FlagPhase::Pause(Params::FLAG_PAUSE),
    });
}

/// Begin a pipe warp. The host decides entry eligibility (input pressed
/// toward the pipe mouth) and supplies the far side.
pub fn start_pipe_warp(
    world: &mut World,
    seq: &mut Sequences,
    events: &mut Events,
    in_dir: PipeDirection,
    out_dir: PipeDirection,
    warp_pos: Vec2,
    out_music: &'static str,
) {
    let Some(entity) = combat::find_player(world) else {
        return;
    };
    {
        let mut player = world.get::<&mut Player>(entity).unwrap();
        let mut kin = world.get::<&mut Kinematics>(entity).unwrap();
        player.animating_input = in_dir.vec();
        kin.solid = false;
    }
    events.play_sound("", true);
    events.play_sound("Warp", false);

    seq.warp = Some(PipeWarp {
        out_dir,
        warp_pos,
        out_music,
        phase: WarpPhase::Enter(in_dir.enter_time()),
    });
}

/// Begin the bridge collapse over the boss arena.
pub fn start_bridge_collapse(
    seq: &mut Sequences,
    pieces: u32,
    bridge_collider: Option<ColliderId>,
) {
    seq.level_timer.active = false;
    seq.bridge = Some(BridgeCollapse {
        pieces_left: pieces,
        piece_timer: Params::BRIDGE_PIECE_INTERVAL,
        bridge_collider,
        phase: BridgePhase::Breaking,
    });
}

/// Advance every running sequence by one tick of unscaled time and
/// settle the global time scale for this frame.
pub fn advance_sequences(
    world: &mut World,
    time: &mut Time,
    grid: &mut CollisionGrid,
    seq: &mut Sequences,
    events: &mut Events,
) {
    let u_dt = time.unscaled_dt;

    // Time-stop owns the scale; everything below reads unscaled time.
    if let Some(stop) = &mut seq.time_stop {
        stop.remaining -= u_dt;
        if stop.remaining <= 0.0 {
            seq.time_stop = None;
            time.scale = 1.0;
        } else {
            time.scale = 0.0;
        }
    }
    // The bridge collapse freezes scaled time for its whole run.
    if seq.bridge.is_some() {
        time.scale = 0.0;
    }

    advance_player_death(world, seq, events, u_dt);
    advance_flag(world, seq, events, u_dt);
    advance_warp(world, seq, events, u_dt);
    advance_bridge(world, time, grid, seq, events, u_dt);
}

fn advance_player_death(world: &mut World, seq: &mut Sequences, events: &mut Events, u_dt: f32) {
    let Some(death) = &mut seq.player_death else {
        return;
    };
    death.timer -= u_dt;

    if let Some(entity) = combat::find_player(world) {
        if !death.instant
            && death.timer <= Params::PLAYER_DEATH_DURATION - Params::PLAYER_DEATH_HOLD
        {
            if let Ok(mut kin) = world.get::<&mut Kinematics>(entity) {
                kin.pos.y += kin.v_speed * Params::DEATH_LERP_RATE * u_dt;
                kin.v_speed -= Params::DEATH_GRAVITY * u_dt;
            }
        }
    }

    if death.timer <= 0.0 {
        seq.player_death = None;
        events.life_lost = true;
    }
}

fn advance_flag(world: &mut World, seq: &mut Sequences, events: &mut Events, u_dt: f32) {
    let Some(flag) = &mut seq.flag else {
        return;
    };
    let Some(entity) = combat::find_player(world) else {
        seq.flag = None; // Owner destroyed mid-sequence
        return;
    };
    let mut player = world.get::<&mut Player>(entity).unwrap();
    let mut kin = world.get::<&mut Kinematics>(entity).unwrap();

    match &mut flag.phase {
        FlagPhase::Pause(t) => {
            *t -= u_dt;
            if *t <= 0.0 {
                player.animating_input = Vec2::new(0.0, Params::FLAG_SLIDE_SPEED);
                events.play_sound("Flagpole Slide", false);
                flag.phase = FlagPhase::Slide;
            }
        }
        FlagPhase::Slide => {
            if kin.pos.y - flag.base_y <= 0.5 {
                player.animating_input = Vec2::new(0.001, 0.001);
                flag.phase = FlagPhase::DoorPause(Params::FLAG_PAUSE);
            }
        }
        FlagPhase::DoorPause(t) => {
            *t -= u_dt;
            if *t <= 0.0 {
                events.play_sound("Flagpole", true);
                player.state = MotionState::Run;
                player.animating_input = Vec2::new(Params::FLAG_WALK_SPEED, 0.0);
                kin.solid = true;
                flag.phase = FlagPhase::Walk;
            }
        }
        // Walks until the host despawns the player at the door.
        FlagPhase::Walk => {}
    }
}

fn advance_warp(world: &mut World, seq: &mut Sequences, events: &mut Events, u_dt: f32) {
    let Some(warp) = &mut seq.warp else {
        return;
    };
    let Some(entity) = combat::find_player(world) else {
        seq.warp = None;
        return;
    };

    match &mut warp.phase {
        WarpPhase::Enter(t) => {
            *t -= u_dt;
            if *t <= 0.0 {
                let mut player = world.get::<&mut Player>(entity).unwrap();
                player.animating_input = Vec2::new(0.0001, 0.0001);
                warp.phase = WarpPhase::MidPause(Params::WARP_MID_PAUSE);
            }
        }
        WarpPhase::MidPause(t) => {
            *t -= u_dt;
            if *t <= 0.0 {
                let out_dir = warp.out_dir;
                let spawn = warp.warp_pos + out_dir.exit_adjust();
                {
                    let mut player = world.get::<&mut Player>(entity).unwrap();
                    let mut kin = world.get::<&mut Kinematics>(entity).unwrap();
                    kin.pos = spawn;
                    player.animating_input = out_dir.vec();
                }
                force_plants_down_near(world, events, warp.warp_pos);
                warp.phase = WarpPhase::Exit(out_dir.enter_time());
            }
        }
        WarpPhase::Exit(t) => {
            *t -= u_dt;
            if *t <= 0.0 {
                let mut player = world.get::<&mut Player>(entity).unwrap();
                let mut kin = world.get::<&mut Kinematics>(entity).unwrap();
                player.animating_input = Vec2::ZERO;
                kin.solid = true;
                events.play_sound(warp.out_music, true);
                seq.warp = None;
            }
        }
    }
}

/// A plant waiting at the warp exit would hit the player the moment he
/// emerges; push any within range back down.
pub fn force_plants_down_near(world: &mut World, events: &mut Events, pos: Vec2) {
    let mut forced = Vec::new();
    for (entity, (popup, kin)) in world.query::<(&mut Popup, &Kinematics)>().iter() {
        if kin.pos.distance(pos) <= 3.0 {
            popup.up = false;
            popup.change_timer = Params::PLANT_TOGGLE_INTERVAL;
            forced.push(entity);
        }
    }
    for entity in forced {
        events.trigger(entity, "SkipToDown");
    }
}

fn advance_bridge(
    world: &mut World,
    time: &mut Time,
    grid: &mut CollisionGrid,
    seq: &mut Sequences,
    events: &mut Events,
    u_dt: f32,
) {
    let Some(bridge) = &mut seq.bridge else {
        return;
    };
    match &mut bridge.phase {
        BridgePhase::Breaking => {
            bridge.piece_timer -= u_dt;
            if bridge.piece_timer <= 0.0 {
                bridge.piece_timer += Params::BRIDGE_PIECE_INTERVAL;
                bridge.pieces_left = bridge.pieces_left.saturating_sub(1);
                events.play_sound("Break", false);

                if bridge.pieces_left == 0 {
                    if let Some(ColliderId::Solid(i)) = bridge.bridge_collider {
                        grid.clear_solid(i);
                    }
                    // The environmental kill ignores remaining health.
                    if let Some(boss) = combat::find_boss(world) {
                        combat::take_damage(world, grid, boss, false, 0, events);
                    }
                    bridge.phase = BridgePhase::Settle(Params::BRIDGE_POST_PAUSE);
                }
            }
        }
        BridgePhase::Settle(t) => {
            *t -= u_dt;
            if *t <= 0.0 {
                time.scale = 1.0;
                events.play_sound("WorldClear", true);
                if let Some(entity) = combat::find_player(world) {
                    let mut player = world.get::<&mut Player>(entity).unwrap();
                    player.animating_input = Vec2::new(Params::BRIDGE_WALK_SPEED, 0.0);
                }
                seq.bridge = None;
            }
        }
    }
}

/// Scaled-time level countdown. Runs after the scale is settled; the
/// panic threshold fires once and timeout kills the player normally.
pub fn tick_level_timer(world: &mut World, time: &Time, seq: &mut Sequences, events: &mut Events) {
    if !seq.level_timer.active || seq.level_timer.remaining <= 0.0 {
        return;
    }
    seq.level_timer.remaining -= time.dt;

    if seq.level_timer.remaining <= 0.0 {
        seq.level_timer.remaining = 0.0;
        if let Some(entity) = combat::find_player(world) {
            let mut player = world.get::<&mut Player>(entity).unwrap();
            let mut kin = world.get::<&mut Kinematics>(entity).unwrap();
            let (p, k) = (&mut *player, &mut *kin);
            start_player_death(p, k, seq, events, false);
        }
    } else if seq.level_timer.remaining <= Params::PANIC_TIME && !seq.level_timer.panic {
        seq.level_timer.panic = true;
        events.panic_started = true;
        events.play_sound("Hurry Up", true);
        log::debug!("panic mode: {:.1}s remaining", seq.level_timer.remaining);
    }
}
