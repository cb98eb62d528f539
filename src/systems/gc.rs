use hecs::{Entity, World};

use crate::components::{Burst, DeathFall, Kinematics, Platform, Player, Squish};
use crate::map::CollisionGrid;
use crate::params::Params;
use crate::resources::{Events, Time, Viewport};
use crate::systems::combat;
use crate::systems::sequences::{self, Sequences};

/// Latch entities active the first time they enter the viewport.
/// Activation is one-way; leaving the screen never de-activates.
pub fn activate_visible(world: &mut World, viewport: &Viewport) {
    for (_, kin) in world.query::<&mut Kinematics>().iter() {
        if !kin.active && viewport.contains(kin.pos) {
            kin.active = true;
        }
    }
}

/// Moving platforms ping-pong along their span; riders are carried by
/// the same delta and stay trivially grounded.
pub fn platform_update(world: &mut World, time: &Time) {
    let mut moved: Vec<(glam::Vec2, glam::Vec2)> = Vec::new(); // (new pos, step)
    for (_, (platform, kin)) in world.query::<(&mut Platform, &mut Kinematics)>().iter() {
        if !kin.active {
            continue;
        }
        let span_len = platform.span.length();
        if span_len == 0.0 {
            continue;
        }
        let dir = platform.span / span_len;
        let step = dir * platform.speed * time.dt * if platform.forward { 1.0 } else { -1.0 };
        kin.pos += step;

        let travelled = (kin.pos - platform.origin).dot(dir);
        if travelled >= span_len {
            platform.forward = false;
        } else if travelled <= 0.0 {
            platform.forward = true;
        }
        moved.push((kin.pos, step));
    }
    if moved.is_empty() {
        return;
    }

    // Carry anything flagged as riding by the step of its nearest
    // platform. The rider flag is the host's contract: it sets it from
    // its own contact information.
    for (_, kin) in world.query::<&mut Kinematics>().iter() {
        if !kin.riding_platform {
            continue;
        }
        if let Some((_, step)) = moved.iter().min_by(|a, b| {
            let da = a.0.distance_squared(kin.pos);
            let db = b.0.distance_squared(kin.pos);
            da.total_cmp(&db)
        }) {
            kin.pos += *step;
        }
    }
}

/// Knocked-out corpses fall in unscaled time so a kill during a
/// time-stop still clears the screen.
pub fn advance_death_falls(world: &mut World, time: &Time) {
    for (_, (fall, kin)) in world.query::<(&mut DeathFall, &mut Kinematics)>().iter() {
        kin.pos.y += fall.v_speed * Params::DEATH_LERP_RATE * time.unscaled_dt;
        fall.v_speed -= Params::DEATH_GRAVITY * time.unscaled_dt;
    }
}

/// Tick squish and burst timers and reap the expired.
pub fn expire_corpses(world: &mut World, time: &Time) {
    let mut expired: Vec<Entity> = Vec::new();
    for (entity, squish) in world.query::<&mut Squish>().iter() {
        squish.timer -= time.dt;
        if squish.timer <= 0.0 {
            expired.push(entity);
        }
    }
    for (entity, burst) in world.query::<&mut Burst>().iter() {
        burst.timer -= time.dt;
        if burst.timer <= 0.0 {
            expired.push(entity);
        }
    }
    for entity in expired {
        let _ = world.despawn(entity);
    }
}

/// Cull entities that left the playable space, and drop the player into
/// the endless pit if he fell past the kill plane.
pub fn cull(
    world: &mut World,
    grid: &CollisionGrid,
    viewport: &Viewport,
    seq: &mut Sequences,
    events: &mut Events,
) {
    let player_e = combat::find_player(world);
    if let Some(entity) = player_e {
        let below = {
            let player = world.get::<&Player>(entity).unwrap();
            let kin = world.get::<&Kinematics>(entity).unwrap();
            !player.is_dead() && kin.pos.y < grid.kill_plane_y
        };
        if below {
            let mut player = world.get::<&mut Player>(entity).unwrap();
            let mut kin = world.get::<&mut Kinematics>(entity).unwrap();
            let (p, k) = (&mut *player, &mut *kin);
            // No pop, no fall: the pit already swallowed him.
            sequences::start_player_death(p, k, seq, events, true);
        }
    }

    let floor = viewport.bottom() - Params::CULL_BELOW;
    let mut doomed: Vec<Entity> = Vec::new();
    for (entity, kin) in world.query::<&Kinematics>().iter() {
        if Some(entity) == player_e {
            continue;
        }
        if kin.pos.y < floor {
            doomed.push(entity);
            continue;
        }
        if kin.despawn_offscreen && !viewport.contains(kin.pos) {
            doomed.push(entity);
        }
    }
    for entity in doomed {
        let _ = world.despawn(entity);
    }
}
