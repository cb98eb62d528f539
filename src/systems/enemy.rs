use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{
    BossPattern, DeathFall, Enemy, Kinematics, Patrol, Popup, Shell, Squish, Wings,
};
use crate::config::Config;
use crate::map::CollisionGrid;
use crate::params::Params;
use crate::resources::{Events, GameRng, SpawnKind, SpawnRequest, Time, Viewport};
use crate::systems::combat;
use crate::systems::probes::{self, ProbeSpec};

fn is_dying(world: &World, entity: Entity) -> bool {
    world.get::<&DeathFall>(entity).is_ok() || world.get::<&Squish>(entity).is_ok()
}

/// All per-tick enemy behavior, in scaled time.
pub fn enemy_update(
    world: &mut World,
    grid: &CollisionGrid,
    time: &Time,
    config: &Config,
    viewport: &Viewport,
    rng: &mut GameRng,
    events: &mut Events,
) {
    tick_stomp_gates(world, time);
    patrol_movement(world, grid, time, config);
    wing_flaps(world, time);
    shell_impacts(world, grid, events);
    plant_popups(world, time, events);
    boss_patterns(world, grid, time, viewport, rng, events);
}

/// Re-arm the stomp gate once the cooldown runs out.
fn tick_stomp_gates(world: &mut World, time: &Time) {
    for (_, enemy) in world.query::<&mut Enemy>().iter() {
        if enemy.stomp_cooldown > 0.0 {
            enemy.stomp_cooldown -= time.dt;
            if enemy.stomp_cooldown <= 0.0 {
                enemy.can_be_stomped = true;
            }
        }
    }
}

/// Fixed-speed walkers: gravity, grounding snap, wall reversal, and pit
/// reversal for the red variants. Moving shells reverse in their own
/// pass so their bounce can also sweep for victims.
fn patrol_movement(world: &mut World, grid: &CollisionGrid, time: &Time, config: &Config) {
    let dying: Vec<Entity> = world
        .query::<(&Enemy, &Kinematics)>()
        .iter()
        .map(|(e, _)| e)
        .filter(|&e| is_dying(world, e))
        .collect();

    for (entity, (enemy, kin, patrol)) in
        world.query::<(&Enemy, &mut Kinematics, &Patrol)>().iter()
    {
        if !enemy.alive() || !kin.active || dying.contains(&entity) {
            continue;
        }
        let in_shell = world.get::<&Shell>(entity).map_or(false, |s| s.in_shell);
        let flying = world.get::<&Wings>(entity).is_ok();

        let grounded = probes::is_grounded(grid, kin, ProbeSpec::entity());
        if grounded && kin.v_speed <= 0.0 {
            kin.v_speed = 0.0;
            let feet =
                probes::colliders_below(grid, kin.pos, kin.half_width, Params::ENTITY_DOWN_RANGE);
            if let Some(top) = feet
                .iter()
                .flatten()
                .filter(|h| h.point.y <= kin.pos.y)
                .map(|h| h.point.y)
                .reduce(f32::max)
            {
                kin.pos.y = top;
            }
        } else {
            kin.apply_gravity(config.gravity_entity, time.dt);
        }

        if !in_shell {
            if probes::facing_wall(grid, kin) {
                kin.facing_right = !kin.facing_right;
            } else if patrol.turn_at_pits && !flying && grounded && probes::pit_ahead(grid, kin) {
                kin.facing_right = !kin.facing_right;
            }
        }

        kin.pos.x += kin.patrol_velocity() * time.dt;
        kin.pos.y += kin.v_speed * time.dt;
    }
}

/// Paratroopas beat their wings on a fixed interval.
fn wing_flaps(world: &mut World, time: &Time) {
    for (_, (enemy, kin, wings)) in world
        .query::<(&Enemy, &mut Kinematics, &mut Wings)>()
        .iter()
    {
        if !enemy.alive() || !kin.active {
            continue;
        }
        wings.flap_timer -= time.dt;
        if wings.flap_timer <= 0.0 {
            wings.flap_timer += Params::FLAP_INTERVAL;
            kin.v_speed = Params::FLAP_IMPULSE;
        }
    }
}

/// Moving shells bounce off walls and mow down everything in their path,
/// each kill extending the shell's own combo chain.
pub fn shell_impacts(world: &mut World, grid: &CollisionGrid, events: &mut Events) {
    let mut moving: Vec<(Entity, Vec2, bool, f32, u32)> = Vec::new();
    for (entity, (enemy, kin, shell)) in world.query::<(&Enemy, &Kinematics, &Shell)>().iter() {
        if enemy.alive()
            && kin.active
            && shell.in_shell
            && kin.h_multiplier > 0.0
            && !is_dying(world, entity)
        {
            moving.push((
                entity,
                kin.pos,
                kin.facing_right,
                kin.wall_distance,
                shell.combo,
            ));
        }
    }

    for (shell_e, pos, facing_right, reach, mut combo) in moving {
        let dir = if facing_right { Vec2::X } else { Vec2::NEG_X };
        let lifted = pos + Vec2::new(0.0, Params::SHELL_PROBE_LIFT);
        if grid.raycast(lifted, dir, reach).is_some() {
            if let Ok(mut kin) = world.get::<&mut Kinematics>(shell_e) {
                kin.facing_right = !kin.facing_right;
            }
            events.play_sound("Bump", false);
            continue;
        }

        let mut victims: Vec<Entity> = Vec::new();
        for (entity, (enemy, kin)) in world.query::<(&Enemy, &Kinematics)>().iter() {
            if entity == shell_e || !enemy.alive() || !kin.active || is_dying(world, entity) {
                continue;
            }
            // A lowered plant is inside its pipe, out of reach.
            if let Ok(popup) = world.get::<&Popup>(entity) {
                if !popup.up {
                    continue;
                }
            }
            let dx = kin.pos.x - pos.x;
            let toward = if facing_right { dx > 0.0 } else { dx < 0.0 };
            if toward
                && dx.abs() <= reach + kin.half_width
                && (kin.pos.y - pos.y).abs() <= 1.0
            {
                victims.push(entity);
            }
        }
        for victim in victims {
            combat::take_damage(world, grid, victim, true, combo, events);
            combo += 1;
        }
        if let Ok(mut shell) = world.get::<&mut Shell>(shell_e) {
            shell.combo = combo;
        }
    }
}

/// Pipe plants toggle up/down on a timer; a plant that is down stays
/// down while the player loiters by the pipe.
fn plant_popups(world: &mut World, time: &Time, events: &mut Events) {
    let player_pos = combat::find_player(world).and_then(|e| {
        world
            .get::<&Kinematics>(e)
            .ok()
            .map(|k| k.pos)
    });

    let mut toggled: Vec<(Entity, bool)> = Vec::new();
    for (entity, (enemy, kin, popup)) in world.query::<(&Enemy, &Kinematics, &mut Popup)>().iter()
    {
        if !enemy.alive() || !kin.active {
            continue;
        }
        popup.change_timer -= time.dt;
        if popup.change_timer > 0.0 {
            continue;
        }
        if popup.up {
            popup.up = false;
            popup.change_timer = Params::PLANT_TOGGLE_INTERVAL;
            toggled.push((entity, false));
        } else {
            let blocked = player_pos
                .map_or(false, |p| p.distance(kin.pos) <= Params::PLANT_SUPPRESS_RANGE);
            if blocked {
                continue; // Retry every tick until the player clears off
            }
            popup.up = true;
            popup.change_timer = Params::PLANT_TOGGLE_INTERVAL;
            toggled.push((entity, true));
        }
    }
    for (entity, up) in toggled {
        events.trigger(entity, if up { "Up" } else { "Down" });
    }
}

/// The boss walks his arena span, faces the player, breathes fire on a
/// fixed beat and jumps on a randomized one. The arena trigger can set
/// `can_act` early, so he can lob fire in from beyond the screen edge.
fn boss_patterns(
    world: &mut World,
    grid: &CollisionGrid,
    time: &Time,
    viewport: &Viewport,
    rng: &mut GameRng,
    events: &mut Events,
) {
    let player_x = combat::find_player(world)
        .and_then(|e| world.get::<&Kinematics>(e).ok().map(|k| k.pos.x));

    let mut fired: Vec<SpawnRequest> = Vec::new();
    for (entity, (enemy, kin, boss)) in world
        .query::<(&Enemy, &mut Kinematics, &mut BossPattern)>()
        .iter()
    {
        if !enemy.alive() || is_dying(world, entity) {
            continue;
        }
        if !boss.can_act {
            if kin.active {
                boss.can_act = true;
                boss.fire_timer = Params::BOSS_FIRE_INTERVAL;
                boss.jump_timer = rng.range_f32(Params::BOSS_JUMP_MIN, Params::BOSS_JUMP_MAX);
            } else {
                continue;
            }
        }

        if let Some(px) = player_x {
            kin.facing_right = px > kin.pos.x;
        }

        // Ping-pong walk across the arena span.
        if kin.pos.x <= boss.left_limit {
            boss.moving_right = true;
        } else if kin.pos.x >= boss.right_limit {
            boss.moving_right = false;
        }
        let walk = if boss.moving_right {
            kin.h_speed
        } else {
            -kin.h_speed
        };

        let grounded = probes::is_grounded(grid, kin, ProbeSpec::entity());
        if grounded && kin.v_speed <= 0.0 {
            kin.v_speed = 0.0;
        } else {
            kin.apply_gravity(Params::GRAVITY_ENTITY, time.dt);
        }

        boss.fire_timer -= time.dt;
        if boss.fire_timer <= 0.0 {
            boss.fire_timer += Params::BOSS_FIRE_INTERVAL;
            let (pos, facing_right) = if viewport.contains(kin.pos) {
                let ahead = if kin.facing_right { 1.0 } else { -1.0 };
                (kin.pos + Vec2::new(ahead, 1.0), kin.facing_right)
            } else {
                // Off-screen he lobs fire in from the right screen edge
                // at a random height.
                let height = rng.range_f32(Params::BOSS_EDGE_FIRE_MIN, Params::BOSS_EDGE_FIRE_MAX);
                let pos = Vec2::new(viewport.right_edge(), viewport.center.y + height);
                (pos, false)
            };
            fired.push(SpawnRequest {
                kind: SpawnKind::BossFire,
                pos,
                facing_right,
            });
            events.trigger(entity, "Fire");
        }

        boss.jump_timer -= time.dt;
        if boss.jump_timer <= 0.0 {
            boss.jump_timer = rng.range_f32(Params::BOSS_JUMP_MIN, Params::BOSS_JUMP_MAX);
            if grounded {
                kin.v_speed = Params::BOSS_JUMP_SPEED;
            }
        }

        kin.pos.x += walk * kin.h_multiplier * time.dt;
        kin.pos.y += kin.v_speed * time.dt;
        kin.pos.x = kin.pos.x.clamp(boss.left_limit, boss.right_limit);
    }
    for request in fired {
        events.play_sound("Fire", false);
        events.spawns.push(request);
    }
}
