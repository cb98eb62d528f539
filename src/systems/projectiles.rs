use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{
    Burst, DeathFall, Enemy, Kinematics, Player, Popup, Projectile, ProjectileKind, Squish,
};
use crate::config::Config;
use crate::map::{Aabb, CollisionGrid};
use crate::params::Params;
use crate::resources::{Events, Time};
use crate::systems::combat;
use crate::systems::sequences::Sequences;

/// Mark a projectile spent: it stops, plays its burst and lingers until
/// the burst timer despawns it.
fn burst(world: &mut World, entity: Entity, events: &mut Events) {
    {
        let Ok(mut projectile) = world.get::<&mut Projectile>(entity) else {
            return;
        };
        if projectile.resolved {
            return;
        }
        projectile.resolved = true;
        if let Ok(mut kin) = world.get::<&mut Kinematics>(entity) {
            kin.h_speed = 0.0;
            kin.v_speed = 0.0;
        }
    }
    events.trigger(entity, "Burst");
    let _ = world.insert_one(entity, Burst::new());
}

/// Per-tick projectile flight and impact resolution, in scaled time.
pub fn projectile_update(
    world: &mut World,
    grid: &CollisionGrid,
    time: &Time,
    config: &Config,
    seq: &mut Sequences,
    events: &mut Events,
) {
    let live: Vec<(Entity, ProjectileKind)> = world
        .query::<(&Projectile, &Kinematics)>()
        .iter()
        .filter(|(_, (p, _))| !p.resolved)
        .map(|(e, (p, _))| (e, p.kind))
        .collect();

    for (entity, kind) in live {
        match kind {
            ProjectileKind::PlayerFireball => fireball_tick(world, grid, time, entity, events),
            ProjectileKind::BossFire => boss_fire_tick(world, grid, time, config, seq, entity, events),
        }
    }
}

/// Bouncing fireball: constant horizontal speed, gravity, floor bounce,
/// and a forward sweep that kills the first enemy it touches.
fn fireball_tick(
    world: &mut World,
    grid: &CollisionGrid,
    time: &Time,
    entity: Entity,
    events: &mut Events,
) {
    let dt = time.dt;
    let mut hit_wall = false;
    let sweep_center = {
        let Ok(mut kin) = world.get::<&mut Kinematics>(entity) else {
            return;
        };
        let dir = if kin.facing_right { Vec2::X } else { Vec2::NEG_X };

        if grid
            .raycast(kin.pos, Vec2::NEG_Y, Params::FIREBALL_PROBE)
            .is_some()
            && kin.v_speed <= 0.0
        {
            kin.v_speed = Params::FIREBALL_BOUNCE;
        } else if kin.v_speed > 0.0
            && grid
                .raycast(kin.pos, Vec2::Y, Params::FIREBALL_PROBE)
                .is_some()
        {
            kin.v_speed = 0.0;
        } else {
            kin.apply_gravity(Params::GRAVITY_ENTITY, dt);
        }

        if grid.raycast(kin.pos, dir, Params::FIREBALL_PROBE).is_some() {
            hit_wall = true;
        } else {
            kin.pos.x += dir.x * Params::FIREBALL_SPEED * dt;
            kin.pos.y += kin.v_speed * dt;
        }
        kin.pos + dir * Params::FIREBALL_PROBE
    };

    if hit_wall {
        events.play_sound("Bump", false);
        burst(world, entity, events);
        return;
    }

    // The sweep leads the fireball, so it never kills behind itself.
    let mut victim = None;
    for (e, (enemy, kin)) in world.query::<(&Enemy, &Kinematics)>().iter() {
        if !enemy.alive() || !kin.active {
            continue;
        }
        if world.get::<&DeathFall>(e).is_ok() || world.get::<&Squish>(e).is_ok() {
            continue;
        }
        if let Ok(popup) = world.get::<&Popup>(e) {
            if !popup.up {
                continue; // Inside the pipe, out of reach
            }
        }
        let reach = Aabb::from_center_size(kin.pos, Vec2::new(1.0, 2.0));
        if reach.intersects_circle(sweep_center, Params::FIREBALL_PROBE) {
            victim = Some(e);
            break;
        }
    }
    if let Some(victim) = victim {
        combat::take_damage(world, grid, victim, true, 0, events);
        burst(world, entity, events);
    }
}

/// Boss fire flies dead straight and bursts on terrain or the player.
fn boss_fire_tick(
    world: &mut World,
    grid: &CollisionGrid,
    time: &Time,
    config: &Config,
    seq: &mut Sequences,
    entity: Entity,
    events: &mut Events,
) {
    let pos = {
        let Ok(mut kin) = world.get::<&mut Kinematics>(entity) else {
            return;
        };
        let dir = if kin.facing_right { 1.0 } else { -1.0 };
        kin.pos.x += dir * Params::BOSS_FIRE_SPEED * time.dt;
        kin.pos
    };

    if grid.overlaps(&Aabb::from_center_size(
        pos,
        Vec2::splat(Params::FIREBALL_PROBE * 2.0),
    )) {
        burst(world, entity, events);
        return;
    }

    let player_hit = combat::find_player(world).is_some_and(|e| {
        let Ok(player) = world.get::<&Player>(e) else {
            return false;
        };
        let Ok(kin) = world.get::<&Kinematics>(e) else {
            return false;
        };
        !player.is_dead() && (kin.pos + Vec2::Y).distance(pos) <= 1.0
    });
    if player_hit {
        combat::damage_player(world, config, seq, events);
        burst(world, entity, events);
    }
}
