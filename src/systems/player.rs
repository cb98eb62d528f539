use glam::Vec2;
use hecs::World;

use crate::components::{Kinematics, MotionState, Player, PowerTier};
use crate::config::Config;
use crate::map::{ColliderId, CollisionGrid};
use crate::params::Params;
use crate::resources::{BlockBump, Events, InputState, SpawnKind, Time};
use crate::systems::combat;
use crate::systems::probes::{self, ProbeSpec};
use crate::systems::sequences::Sequences;

/// Per-tick player update: timers, the motion state machine, horizontal
/// easing, jumping with coyote time, ceiling bumps and shooting.
pub fn player_update(
    world: &mut World,
    grid: &CollisionGrid,
    time: &Time,
    config: &Config,
    input: &InputState,
    events: &mut Events,
) {
    let Some(entity) = combat::find_player(world) else {
        return;
    };
    let mut player = world.get::<&mut Player>(entity).unwrap();
    let mut kin = world.get::<&mut Kinematics>(entity).unwrap();
    let dt = time.dt;

    // Timers run on scaled time; a frozen frame freezes them too.
    if player.invincible_timer > 0.0 {
        player.invincible_timer -= dt;
        if player.invincible_timer <= 0.0 {
            player.invincible_timer = 0.0;
            if player.has_star {
                player.has_star = false;
                events.play_sound("Star End", true);
            }
        }
    }
    if player.shoot_cooldown > 0.0 {
        player.shoot_cooldown -= dt;
    }
    if player.coyote_timer > 0.0 {
        player.coyote_timer -= dt;
    }

    if player.is_dead() {
        return; // The death sequence owns the body now
    }

    // Cutscene override: scripted velocity replaces input and physics.
    if player.animating_input != Vec2::ZERO {
        kin.pos += player.animating_input * dt;
        if player.animating_input.x.abs() > 0.01 {
            kin.facing_right = player.animating_input.x > 0.0;
        }
        return;
    }

    let big = player.power >= PowerTier::Mushroom;
    // Crouching folds a big player down to the small head probe.
    let crouching = input.axis_v < -0.5;
    let spec = ProbeSpec::player(big && !crouching);
    let grounded = probes::is_grounded(grid, &kin, spec);

    // Horizontal: ease toward the input target, slower in the air.
    // Crouching on the ground ignores horizontal input entirely.
    let axis_h = if crouching && grounded {
        0.0
    } else {
        input.axis_h
    };
    let multiplier = if input.fire_held {
        config.run_multiplier
    } else {
        config.walk_multiplier
    };
    let target = axis_h.clamp(-1.0, 1.0) * Params::INPUT_SCALE * multiplier;
    let rate = if axis_h == 0.0 {
        Params::ACCEL_RELEASE
    } else {
        Params::ACCEL_INPUT
    } * if grounded { 1.0 } else { Params::AIR_CONTROL };
    kin.h_speed += (target - kin.h_speed) * (rate * dt).min(1.0);

    if kin.h_speed.abs() > 0.01 {
        kin.facing_right = kin.h_speed > 0.0;
    }
    // Pushing into a wall parks you against it instead of jittering.
    if probes::facing_wall(grid, &kin)
        && (kin.h_speed > 0.0) == kin.facing_right
        && kin.h_speed != 0.0
    {
        kin.h_speed = 0.0;
    }

    if grounded && kin.v_speed <= 0.0 {
        kin.v_speed = 0.0;
        // Snap to the highest supporting contact.
        let feet = probes::colliders_below(grid, kin.pos, kin.half_width, spec.down_range);
        if let Some(top) = feet
            .iter()
            .flatten()
            .filter(|h| h.point.y <= kin.pos.y)
            .map(|h| h.point.y)
            .reduce(f32::max)
        {
            kin.pos.y = top;
        }

        let landing = matches!(player.state, MotionState::Jump | MotionState::Fall);
        if landing && !player.has_star {
            player.bounce_combo = 0;
        }
        player.state = if kin.h_speed.abs() >= Params::ANIM_IDLE_THRESHOLD {
            MotionState::Run
        } else {
            MotionState::Idle
        };

        // A press buffered during the fall fires on the frame we land.
        if input.jump_down || (player.coyote_timer > 0.0 && input.jump_held) {
            kin.v_speed = config.jump_speed;
            player.state = MotionState::Jump;
            player.coyote_timer = 0.0;
            events.play_sound("Jump", false);
        } else {
            player.coyote_timer = 0.0;
        }
    } else {
        // Holding jump through the ascent floats; releasing drops hard.
        let accel = if kin.v_speed > 0.0 && input.jump_held {
            Params::GRAVITY_ASCENT
        } else {
            config.gravity_fall
        };
        kin.apply_gravity(accel, dt);

        let falling = kin.v_speed <= 0.0;
        if falling {
            // Walking off a ledge arms the coyote window once.
            if matches!(player.state, MotionState::Idle | MotionState::Run) {
                player.coyote_timer = config.coyote_time;
            }
            player.state = MotionState::Fall;
            if input.jump_down {
                if player.coyote_timer > 0.0 {
                    kin.v_speed = config.jump_speed;
                    player.state = MotionState::Jump;
                    player.coyote_timer = 0.0;
                    events.play_sound("Jump", false);
                } else {
                    player.coyote_timer = config.coyote_time;
                }
            }
        } else {
            player.state = MotionState::Jump;
            // Head contact: stop rising, queue one bump per block.
            let above = probes::colliders_above(grid, kin.pos, kin.half_width, spec);
            let mut bumped = false;
            for hit in above.iter().flatten() {
                bumped = true;
                if let ColliderId::Block(_) = hit.collider {
                    events.block_bumps.push(BlockBump {
                        collider: hit.collider,
                        contact: hit.point,
                        powered: big,
                    });
                }
            }
            if bumped {
                kin.v_speed = 0.0;
                events.play_sound("Bump", false);
            }
        }
    }

    kin.pos.x += kin.h_speed * dt;
    kin.pos.y += kin.v_speed * dt;

    // Flower-tier fireballs on a short cooldown.
    if player.power == PowerTier::Flower && input.fire_down && player.shoot_cooldown <= 0.0 {
        player.shoot_cooldown = config.shoot_cooldown;
        let ahead = if kin.facing_right {
            Params::FIREBALL_SPAWN_AHEAD
        } else {
            -Params::FIREBALL_SPAWN_AHEAD
        };
        let spawn_pos = kin.pos + Vec2::new(ahead, Params::FIREBALL_SPAWN_LIFT);
        events.request_spawn(SpawnKind::Fireball, spawn_pos, kin.facing_right);
        events.play_sound("Fireball", false);
        events.trigger(entity, "Shoot");
    }
}

/// Grant a power-up, promoting only to strictly higher tiers. A redundant
/// grab still pays its score but never downgrades. Promotion freezes
/// scaled time for the transformation flourish.
pub fn give_power(player: &mut Player, tier: PowerTier, seq: &mut Sequences, events: &mut Events) {
    if tier > player.power {
        player.power = tier;
        seq.start_time_stop(Params::POWERUP_TIME_STOP);
        events.play_sound("Power Up", false);
    }
}

/// Star pickup: invincibility window on the shared timer.
pub fn give_star(player: &mut Player, config: &Config, events: &mut Events) {
    player.has_star = true;
    player.invincible_timer = config.star_duration;
    events.play_sound("Star", true);
}
