use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{
    BossPattern, DeathFall, Enemy, EnemyKind, EnemyVariant, Kinematics, MotionState, Patrol,
    Player, Popup, Shell, Squish, Wings,
};
use crate::config::Config;
use crate::map::CollisionGrid;
use crate::params::Params;
use crate::resources::{Events, SpawnKind};
use crate::systems::probes::{self, ProbeSpec};
use crate::systems::sequences::{self, Sequences};

pub fn find_player(world: &World) -> Option<Entity> {
    world.query::<&Player>().iter().next().map(|(e, _)| e)
}

pub fn find_boss(world: &World) -> Option<Entity> {
    world
        .query::<&Enemy>()
        .iter()
        .find(|(_, enemy)| enemy.kind == EnemyKind::Bowser)
        .map(|(e, _)| e)
}

enum Death {
    None,
    /// Pop up and fall off screen: tool kills and mid-air stomp kills.
    Pop(&'static str),
    /// Flattened in place, lingers briefly.
    Squish,
}

/// Single damage entry point for every enemy species, dispatched on the
/// species tag. `by_tool` distinguishes shells/fireballs/scripted kills
/// from stomps; `combo` shifts the score-table index of the award.
pub fn take_damage(
    world: &mut World,
    grid: &CollisionGrid,
    entity: Entity,
    by_tool: bool,
    combo: u32,
    events: &mut Events,
) {
    let mut death = Death::None;
    let mut demote_wings = false;
    {
        let Ok(mut enemy) = world.get::<&mut Enemy>(entity) else {
            return;
        };
        if !enemy.alive() {
            return;
        }
        let Ok(mut kin) = world.get::<&mut Kinematics>(entity) else {
            return;
        };
        let pos = kin.pos;

        match enemy.kind {
            EnemyKind::Goomba => {
                enemy.health -= 1;
                events.award(1 + combo as usize, Some(pos));
                let grounded = probes::is_grounded(grid, &kin, ProbeSpec::entity());
                death = if by_tool || !grounded {
                    Death::Pop("Kick")
                } else {
                    Death::Squish
                };
            }
            EnemyKind::Koopa | EnemyKind::Paratroopa => {
                if by_tool {
                    enemy.health -= 1;
                    events.award(1 + combo as usize, Some(pos));
                    death = Death::Pop("Kick");
                } else {
                    // The stomp gate: one registration per cooldown.
                    if !enemy.can_be_stomped {
                        return;
                    }
                    enemy.can_be_stomped = false;
                    enemy.stomp_cooldown = Params::STOMP_COOLDOWN;
                    events.award(1 + combo as usize, Some(pos));

                    if world.get::<&Wings>(entity).is_ok() {
                        // First hit only clips the wings.
                        demote_wings = true;
                        events.play_sound("Squish", false);
                        events.trigger(entity, "GotHit");
                    } else if let Ok(mut shell) = world.get::<&mut Shell>(entity) {
                        if !shell.in_shell {
                            shell.in_shell = true;
                            shell.combo = 0;
                            kin.h_multiplier = 0.0;
                            events.play_sound("Squish", false);
                            events.trigger(entity, "GotHit");
                        } else if kin.h_multiplier == 0.0 {
                            shell.combo = 0;
                            kin.h_multiplier = Params::SHELL_MULTIPLIER;
                            events.play_sound("Kick", false);
                        } else {
                            kin.h_multiplier = 0.0;
                            events.play_sound("Kick", false);
                        }
                    }
                }
            }
            EnemyKind::Plant => {
                // Plants cannot be stomped; only tools reach them.
                if by_tool {
                    enemy.health -= 1;
                    events.award(1 + combo as usize, Some(pos));
                    death = Death::Pop("Kick");
                }
            }
            EnemyKind::Bowser => {
                if by_tool {
                    enemy.health -= 1;
                } else {
                    // The bridge collapse kills outright.
                    enemy.health = 0;
                }
                if enemy.health <= 0 {
                    events.award(Params::BOSS_SCORE_INDEX + combo as usize, Some(pos));
                    if let Ok(mut boss) = world.get::<&mut BossPattern>(entity) {
                        boss.can_act = false;
                    }
                    death = Death::Pop("Bowser Die");
                }
            }
        }
    }

    if demote_wings {
        let _ = world.remove_one::<Wings>(entity);
        if let Ok(mut enemy) = world.get::<&mut Enemy>(entity) {
            enemy.variant = EnemyVariant::Red;
        }
        if let Ok(mut kin) = world.get::<&mut Kinematics>(entity) {
            kin.v_speed = 0.0;
        }
        if let Ok(mut patrol) = world.get::<&mut Patrol>(entity) {
            patrol.turn_at_pits = true;
        }
        return;
    }

    match death {
        Death::None => {}
        Death::Pop(sound) => {
            {
                let mut kin = world.get::<&mut Kinematics>(entity).unwrap();
                kin.h_speed = 0.0;
                kin.solid = false;
                kin.pos.y += 1.0;
            }
            events.play_sound(sound, false);
            events.trigger(entity, "GotHitInstant");
            let _ = world.insert_one(entity, DeathFall::new());
        }
        Death::Squish => {
            {
                let mut kin = world.get::<&mut Kinematics>(entity).unwrap();
                kin.h_speed = 0.0;
            }
            events.play_sound("Squish", false);
            events.trigger(entity, "GotHit");
            let _ = world.insert_one(entity, Squish::new());
        }
    }
}

/// Apply one hit to the player: ignored during grace, steps the power
/// tier down one, fatal below the lowest tier.
pub fn damage_player(world: &mut World, config: &Config, seq: &mut Sequences, events: &mut Events) {
    let Some(entity) = find_player(world) else {
        return;
    };
    let mut player = world.get::<&mut Player>(entity).unwrap();
    let mut kin = world.get::<&mut Kinematics>(entity).unwrap();
    if player.is_dead() || player.invincible_timer > 0.0 {
        return;
    }

    match player.power.down_one() {
        Some(tier) => {
            player.power = tier;
            player.invincible_timer = config.hit_grace;
            events.play_sound("Warp", false);
            events.trigger(entity, "GotHit");
            seq.start_time_stop(Params::POWERUP_TIME_STOP);
        }
        None => {
            let (p, k) = (&mut *player, &mut *kin);
            sequences::start_player_death(p, k, seq, events, false);
        }
    }
}

/// Player-versus-enemy contact resolution: stomp from above the
/// midline, damage exchange from the side.
pub fn resolve_contacts(
    world: &mut World,
    grid: &CollisionGrid,
    config: &Config,
    seq: &mut Sequences,
    events: &mut Events,
) {
    let Some(player_e) = find_player(world) else {
        return;
    };
    let (p_pos, p_star, p_combo) = {
        let player = world.get::<&Player>(player_e).unwrap();
        let kin = world.get::<&Kinematics>(player_e).unwrap();
        if player.is_dead() || player.animating_input != Vec2::ZERO {
            return;
        }
        (kin.pos, player.has_star, player.bounce_combo)
    };

    enum Outcome {
        Stomp(Entity),
        StarKill(Entity),
        Hurt,
    }

    let mut outcome = None;
    for (entity, (enemy, kin)) in world.query::<(&Enemy, &Kinematics)>().iter() {
        if !enemy.alive() || !kin.active {
            continue;
        }
        if world.get::<&DeathFall>(entity).is_ok() || world.get::<&Squish>(entity).is_ok() {
            continue;
        }
        let range = match enemy.kind {
            EnemyKind::Bowser => {
                let acting = world
                    .get::<&BossPattern>(entity)
                    .map_or(false, |b| b.can_act);
                if !acting {
                    continue;
                }
                Params::BOSS_RANGE
            }
            EnemyKind::Plant => {
                let up = world.get::<&Popup>(entity).map_or(false, |p| p.up);
                if !up {
                    continue;
                }
                Params::PLANT_RANGE
            }
            _ => Params::STOMP_RANGE,
        };
        if p_pos.distance(kin.pos) > range {
            continue;
        }

        let from_above = p_pos.y > kin.pos.y + Params::STOMP_MIDLINE;
        let stompable = enemy.kind != EnemyKind::Plant && enemy.kind != EnemyKind::Bowser;
        if from_above && stompable {
            if enemy.can_be_stomped {
                outcome = Some(Outcome::Stomp(entity));
            }
        } else if enemy.stomp_cooldown <= 0.0 {
            if p_star {
                // The star kills everything but plants on contact.
                if enemy.kind != EnemyKind::Plant {
                    outcome = Some(Outcome::StarKill(entity));
                } else {
                    continue;
                }
            } else {
                outcome = Some(Outcome::Hurt);
            }
        }
        if outcome.is_some() {
            break;
        }
    }

    match outcome {
        None => {}
        Some(Outcome::Stomp(entity)) => {
            // Stomped shells launch away from the player's side.
            if let Ok(mut kin) = world.get::<&mut Kinematics>(entity) {
                kin.facing_right = p_pos.x < kin.pos.x;
            }
            take_damage(world, grid, entity, false, p_combo, events);
            events.request_spawn(SpawnKind::Effect("Stomp"), p_pos, true);
            force_bounce(world, player_e);
        }
        Some(Outcome::StarKill(entity)) => {
            take_damage(world, grid, entity, true, p_combo, events);
            let mut player = world.get::<&mut Player>(player_e).unwrap();
            player.bounce_combo += 1;
        }
        Some(Outcome::Hurt) => {
            damage_player(world, config, seq, events);
        }
    }
}

/// Launch the player upward at full jump speed, chaining the combo.
/// Used by stomps and by blocks struck while a pickup rides them.
pub fn force_bounce(world: &mut World, entity: Entity) {
    let Ok(mut player) = world.get::<&mut Player>(entity) else {
        return;
    };
    let Ok(mut kin) = world.get::<&mut Kinematics>(entity) else {
        return;
    };
    kin.v_speed = Params::JUMP_SPEED;
    player.state = MotionState::Jump;
    player.bounce_combo += 1;
}
