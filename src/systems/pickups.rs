use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Kinematics, Pickup, PickupKind, Player, PowerTier};
use crate::config::Config;
use crate::map::CollisionGrid;
use crate::params::Params;
use crate::resources::{Events, Time};
use crate::systems::combat;
use crate::systems::player as player_sys;
use crate::systems::probes::{self, ProbeSpec};
use crate::systems::sequences::Sequences;

/// Per-tick pickup update: reveal delay, movement per kind, block-coin
/// self-collection and player collection.
pub fn pickup_update(
    world: &mut World,
    grid: &CollisionGrid,
    time: &Time,
    config: &Config,
    seq: &mut Sequences,
    events: &mut Events,
) {
    let dt = time.dt;
    let player_e = combat::find_player(world);
    let player_pos = player_e.and_then(|e| world.get::<&Kinematics>(e).ok().map(|k| k.pos));
    let player_dead = player_e
        .and_then(|e| world.get::<&Player>(e).ok().map(|p| p.is_dead()))
        .unwrap_or(true);

    let mut collected: Vec<(Entity, PickupKind)> = Vec::new();
    let mut auto_collected: Vec<Entity> = Vec::new();

    for (entity, (pickup, kin)) in world.query::<(&mut Pickup, &mut Kinematics)>().iter() {
        // Rising out of the block: inert and motionless.
        if pickup.reveal_timer > 0.0 {
            pickup.reveal_timer -= dt;
            continue;
        }

        if let Some(delay) = &mut pickup.auto_collect {
            *delay -= dt;
            if *delay <= 0.0 {
                auto_collected.push(entity);
                continue;
            }
        }

        match pickup.kind {
            PickupKind::Mushroom | PickupKind::OneUp => {
                // Walks like a patroller, indifferent to pits.
                let grounded = probes::is_grounded(grid, kin, ProbeSpec::entity());
                if grounded && kin.v_speed <= 0.0 {
                    kin.v_speed = 0.0;
                    let feet = probes::colliders_below(
                        grid,
                        kin.pos,
                        kin.half_width,
                        Params::ENTITY_DOWN_RANGE,
                    );
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
                    kin.apply_gravity(config.gravity_entity, dt);
                }
                if probes::facing_wall(grid, kin) {
                    kin.facing_right = !kin.facing_right;
                }
                kin.pos.x += kin.patrol_velocity() * dt;
                kin.pos.y += kin.v_speed * dt;
            }
            PickupKind::Star => {
                // Bounces its way across the level under light gravity.
                let grounded = probes::is_grounded(grid, kin, ProbeSpec::entity());
                if grounded && kin.v_speed <= 0.0 {
                    kin.v_speed = Params::STAR_BOUNCE;
                } else if kin.v_speed > 0.0
                    && probes::is_touching_ceiling(grid, kin, ProbeSpec::entity())
                {
                    kin.v_speed = 0.0;
                } else {
                    kin.apply_gravity(Params::STAR_GRAVITY, dt);
                }
                if probes::facing_wall(grid, kin) {
                    kin.facing_right = !kin.facing_right;
                }
                kin.pos.x += kin.patrol_velocity() * dt;
                kin.pos.y += kin.v_speed * dt;
            }
            // Flowers and coins sit where they spawned.
            PickupKind::Flower | PickupKind::Coin => {}
        }

        if !player_dead {
            if let Some(p) = player_pos {
                let delta = p - kin.pos;
                if delta.x.abs() <= 1.0 && delta.y.abs() <= 1.0 {
                    collected.push((entity, pickup.kind));
                }
            }
        }
    }

    for entity in auto_collected {
        events.coins_collected += 1;
        events.award(PickupKind::Coin.score_index(), None);
        let _ = world.despawn(entity);
    }

    for (entity, kind) in collected {
        let pos = world.get::<&Kinematics>(entity).ok().map(|k| k.pos);
        if let Some(player_e) = player_e {
            let mut player = world.get::<&mut Player>(player_e).unwrap();
            apply_pickup(&mut player, kind, config, pos, seq, events);
        }
        let _ = world.despawn(entity);
    }
}

/// Collection effects per kind. A redundant power grab still pays.
fn apply_pickup(
    player: &mut Player,
    kind: PickupKind,
    config: &Config,
    pos: Option<Vec2>,
    seq: &mut Sequences,
    events: &mut Events,
) {
    events.award(kind.score_index(), pos);
    match kind {
        PickupKind::Mushroom => {
            player_sys::give_power(player, PowerTier::Mushroom, seq, events);
        }
        PickupKind::Flower => {
            player_sys::give_power(player, PowerTier::Flower, seq, events);
        }
        PickupKind::Star => {
            player_sys::give_star(player, config, events);
        }
        PickupKind::OneUp => {
            events.play_sound("1-Up", false);
        }
        PickupKind::Coin => {
            events.coins_collected += 1;
            events.play_sound("Coin", false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Aabb;
    use crate::resources::Score;

    const DT: f32 = 0.01;

    fn ticked_time() -> Time {
        let mut time = Time::default();
        time.begin_frame(DT);
        time.apply_scale();
        time
    }

    fn flat_grid() -> CollisionGrid {
        let mut grid = CollisionGrid::new();
        grid.add_ground_strip(-50.0, 50.0, 0.0);
        grid
    }

    fn run(world: &mut World, grid: &CollisionGrid, events: &mut Events, ticks: usize) {
        let time = ticked_time();
        let config = Config::default();
        let mut seq = Sequences::new();
        for _ in 0..ticks {
            pickup_update(world, grid, &time, &config, &mut seq, events);
        }
    }

    fn spawn_pickup(world: &mut World, kind: PickupKind, pos: Vec2) -> Entity {
        let mut kin = Kinematics::new(pos, Params::MUSHROOM_SPEED);
        kin.active = true;
        kin.facing_right = true;
        world.spawn((Pickup::new(kind), kin))
    }

    fn spawn_player(world: &mut World, pos: Vec2) -> Entity {
        let mut kin = Kinematics::new(pos, 0.0);
        kin.active = true;
        world.spawn((Player::new(), kin))
    }

    #[test]
    fn test_pickup_is_inert_during_reveal() {
        let grid = flat_grid();
        let mut world = World::new();
        spawn_player(&mut world, Vec2::new(0.0, 0.0));
        let shroom = spawn_pickup(&mut world, PickupKind::Mushroom, Vec2::new(0.5, 0.0));
        let mut events = Events::new();

        run(&mut world, &grid, &mut events, 50); // 0.5s of a 1s reveal
        assert!(
            world.get::<&Pickup>(shroom).is_ok(),
            "Still rising, cannot be collected"
        );
        assert_eq!(
            world.get::<&Kinematics>(shroom).unwrap().pos,
            Vec2::new(0.5, 0.0),
            "No movement during the reveal"
        );
    }

    #[test]
    fn test_mushroom_promotes_and_pays_after_reveal() {
        let grid = flat_grid();
        let mut world = World::new();
        let player = spawn_player(&mut world, Vec2::new(0.0, 0.0));
        let shroom = spawn_pickup(&mut world, PickupKind::Mushroom, Vec2::new(0.5, 0.0));
        let mut events = Events::new();

        run(&mut world, &grid, &mut events, 110);

        assert!(world.get::<&Pickup>(shroom).is_err(), "Collected and gone");
        assert_eq!(
            world.get::<&Player>(player).unwrap().power,
            PowerTier::Mushroom
        );
        assert!(events.score.iter().any(|a| a.index == 6), "1000 points");
        assert!(events.sounds.iter().any(|s| s.name == "Power Up"));
    }

    #[test]
    fn test_promotion_starts_the_transformation_freeze() {
        let grid = flat_grid();
        let mut world = World::new();
        let player = spawn_player(&mut world, Vec2::new(0.0, 0.0));
        spawn_pickup(&mut world, PickupKind::Mushroom, Vec2::new(0.5, 0.0));
        let time = ticked_time();
        let config = Config::default();
        let mut seq = Sequences::new();
        let mut events = Events::new();

        for _ in 0..110 {
            pickup_update(&mut world, &grid, &time, &config, &mut seq, &mut events);
        }

        assert_eq!(
            world.get::<&Player>(player).unwrap().power,
            PowerTier::Mushroom
        );
        let stop = seq.time_stop.expect("Promotion freezes scaled time");
        assert_eq!(stop.remaining, Params::POWERUP_TIME_STOP);
    }

    #[test]
    fn test_redundant_grab_pays_without_downgrading() {
        let grid = flat_grid();
        let mut world = World::new();
        let player = spawn_player(&mut world, Vec2::new(0.0, 0.0));
        world.get::<&mut Player>(player).unwrap().power = PowerTier::Flower;
        spawn_pickup(&mut world, PickupKind::Mushroom, Vec2::new(0.5, 0.0));
        let mut events = Events::new();

        run(&mut world, &grid, &mut events, 110);

        assert_eq!(
            world.get::<&Player>(player).unwrap().power,
            PowerTier::Flower,
            "Never downgraded"
        );
        assert!(
            events.score.iter().any(|a| a.index == 6),
            "The redundant grab still pays its score"
        );
    }

    #[test]
    fn test_mushroom_walks_and_reverses_at_walls() {
        let mut grid = flat_grid();
        grid.add_solid(Aabb::new(Vec2::new(3.0, 0.0), Vec2::new(3.5, 2.0)));
        let mut world = World::new();
        let shroom = spawn_pickup(&mut world, PickupKind::Mushroom, Vec2::new(1.0, 0.0));
        let mut events = Events::new();

        run(&mut world, &grid, &mut events, 400);
        let kin = world.get::<&Kinematics>(shroom).unwrap();
        assert!(!kin.facing_right, "Reversed off the wall");
        assert!(kin.pos.x < 3.0);
    }

    #[test]
    fn test_star_bounces_as_it_travels() {
        let grid = flat_grid();
        let mut world = World::new();
        let star = spawn_pickup(&mut world, PickupKind::Star, Vec2::new(0.0, 0.0));
        world.get::<&mut Kinematics>(star).unwrap().h_speed = Params::STAR_SPEED;
        let mut events = Events::new();

        let mut max_y: f32 = 0.0;
        for _ in 0..500 {
            run(&mut world, &grid, &mut events, 1);
            if let Ok(kin) = world.get::<&Kinematics>(star) {
                max_y = max_y.max(kin.pos.y);
            }
        }
        let kin = world.get::<&Kinematics>(star).unwrap();
        assert!(max_y > 0.5, "Bounces clear of the ground");
        assert!(kin.pos.x > 3.0, "Travels as it bounces");
    }

    #[test]
    fn test_star_collection_grants_invincibility_window() {
        let grid = flat_grid();
        let mut world = World::new();
        let player = spawn_player(&mut world, Vec2::new(0.0, 0.0));
        spawn_pickup(&mut world, PickupKind::Star, Vec2::new(0.5, 0.0));
        let mut events = Events::new();

        run(&mut world, &grid, &mut events, 110);

        let p = world.get::<&Player>(player).unwrap();
        assert!(p.has_star);
        assert_eq!(p.invincible_timer, Config::default().star_duration);
        assert!(events.sounds.iter().any(|s| s.name == "Star" && s.music));
    }

    #[test]
    fn test_one_up_routes_through_extra_life_index() {
        let grid = flat_grid();
        let mut world = World::new();
        spawn_player(&mut world, Vec2::new(0.0, 0.0));
        spawn_pickup(&mut world, PickupKind::OneUp, Vec2::new(0.5, 0.0));
        let mut events = Events::new();

        run(&mut world, &grid, &mut events, 110);

        let mut score = Score::new();
        crate::resources::settle_events(&mut score, &events);
        assert_eq!(score.lives, Params::STARTING_LIVES + 1);
        assert_eq!(score.points, 0, "The extra-life entry pays no points");
    }

    #[test]
    fn test_block_coin_collects_itself() {
        let grid = flat_grid();
        let mut world = World::new();
        spawn_player(&mut world, Vec2::new(30.0, 0.0)); // Far away
        let mut kin = Kinematics::new(Vec2::new(0.0, 2.0), 0.0);
        kin.active = true;
        let coin = world.spawn((Pickup::block_coin(), kin));
        let mut events = Events::new();

        run(&mut world, &grid, &mut events, 50);

        assert!(world.get::<&Pickup>(coin).is_err(), "Self-collected");
        assert_eq!(events.coins_collected, 1);
        assert!(events.score.iter().any(|a| a.index == 2), "200 points");
    }

    #[test]
    fn test_world_coin_collects_on_contact_only() {
        let grid = flat_grid();
        let mut world = World::new();
        spawn_player(&mut world, Vec2::new(30.0, 0.0));
        let mut kin = Kinematics::new(Vec2::new(0.0, 0.5), 0.0);
        kin.active = true;
        let mut pickup = Pickup::new(PickupKind::Coin);
        pickup.reveal_timer = 0.0; // Placed in the level, not from a block
        let coin = world.spawn((pickup, kin));
        let mut events = Events::new();

        run(&mut world, &grid, &mut events, 200);
        assert!(world.get::<&Pickup>(coin).is_ok(), "Untouched, uncollected");

        // Walk the player onto it.
        let player = combat::find_player(&world).unwrap();
        world.get::<&mut Kinematics>(player).unwrap().pos = Vec2::new(0.2, 0.5);
        run(&mut world, &grid, &mut events, 1);
        assert!(world.get::<&Pickup>(coin).is_err());
        assert_eq!(events.coins_collected, 1);
    }

    #[test]
    fn test_dead_player_collects_nothing() {
        let grid = flat_grid();
        let mut world = World::new();
        let player = spawn_player(&mut world, Vec2::new(0.0, 0.0));
        world.get::<&mut Player>(player).unwrap().power = PowerTier::Dead;
        let shroom = spawn_pickup(&mut world, PickupKind::Mushroom, Vec2::new(0.5, 0.0));
        let mut events = Events::new();

        run(&mut world, &grid, &mut events, 150);
        assert!(world.get::<&Pickup>(shroom).is_ok());
    }
}
