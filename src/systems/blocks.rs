use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{
    DeathFall, Enemy, Kinematics, Pickup, PickupKind, Player, PowerTier, Squish,
};
use crate::map::{Aabb, BlockItem, BlockKind, ColliderId, CollisionGrid};
use crate::params::Params;
use crate::resources::{Events, SpawnKind, Time};
use crate::systems::combat;

/// Expire multi-hit windows. A question block whose window ran out is
/// spent for good even if hits are still arriving.
pub fn tick_blocks(grid: &mut CollisionGrid, time: &Time) {
    for block in &mut grid.blocks {
        if block.state.multi_started && !block.state.spent {
            block.state.multi_timer -= time.dt;
            if block.state.multi_timer <= 0.0 {
                block.state.spent = true;
            }
        }
    }
}

/// Consume the bump queue filled by the player's head probes.
///
/// Activation has two explicit capability branches: an enemy standing on
/// the block takes tool damage, a pickup riding it is launched upward.
pub fn process_bumps(world: &mut World, grid: &mut CollisionGrid, events: &mut Events) {
    let bumps = events.block_bumps.clone();
    let player_power = combat::find_player(world)
        .and_then(|e| world.get::<&Player>(e).ok().map(|p| p.power))
        .unwrap_or(PowerTier::None);

    for bump in bumps {
        let ColliderId::Block(index) = bump.collider else {
            continue;
        };
        let (kind, aabb) = {
            let Some(block) = grid.block(index) else {
                continue;
            };
            if block.state.spent || block.state.broken {
                continue;
            }
            (block.kind, block.aabb)
        };

        match kind {
            BlockKind::Brick => {
                if bump.powered {
                    if let Some(block) = grid.block_mut(index) {
                        block.state.broken = true;
                    }
                    events.play_sound("Break", false);
                    events.request_spawn(SpawnKind::Effect("Shards"), aabb.center(), true);
                }
                // An unpowered bump just thuds; the player already
                // queued the sound.
            }
            BlockKind::Question {
                contains,
                multi_hit,
            } => {
                activate_above(world, grid, &aabb, events);
                spawn_contents(world, contains, &aabb, player_power, events);

                if let Some(block) = grid.block_mut(index) {
                    if multi_hit {
                        block.state.multi_started = true;
                    } else {
                        block.state.spent = true;
                    }
                }
            }
        }
    }
}

/// The box one unit above the struck block.
fn above_box(aabb: &Aabb) -> Aabb {
    Aabb::new(
        Vec2::new(aabb.min.x, aabb.max.y),
        Vec2::new(aabb.max.x, aabb.max.y + 1.0),
    )
}

fn activate_above(world: &mut World, grid: &CollisionGrid, aabb: &Aabb, events: &mut Events) {
    let zone = above_box(aabb);

    let mut struck_enemies: Vec<Entity> = Vec::new();
    for (entity, (enemy, kin)) in world.query::<(&Enemy, &Kinematics)>().iter() {
        if enemy.alive() && kin.active && zone.contains(kin.pos) {
            if world.get::<&DeathFall>(entity).is_err() && world.get::<&Squish>(entity).is_err() {
                struck_enemies.push(entity);
            }
        }
    }
    for entity in struck_enemies {
        combat::take_damage(world, grid, entity, true, 0, events);
    }

    for (_, (_, kin)) in world.query::<(&Pickup, &mut Kinematics)>().iter() {
        if zone.contains(kin.pos) {
            kin.v_speed = Params::FORCE_JUMP_SPEED;
        }
    }
}

fn spawn_contents(
    world: &mut World,
    contains: BlockItem,
    aabb: &Aabb,
    player_power: PowerTier,
    events: &mut Events,
) {
    let spawn_pos = Vec2::new(aabb.center().x, aabb.max.y);
    match contains {
        BlockItem::None => {}
        BlockItem::Coin => {
            let mut kin = Kinematics::new(spawn_pos, 0.0);
            kin.active = true;
            world.spawn((Pickup::block_coin(), kin));
            events.play_sound("Coin", false);
        }
        BlockItem::PowerUp => {
            // Flowers only once the player can use one.
            let kind = if player_power == PowerTier::None {
                PickupKind::Mushroom
            } else {
                PickupKind::Flower
            };
            let speed = if kind == PickupKind::Mushroom {
                Params::MUSHROOM_SPEED
            } else {
                0.0
            };
            spawn_walker(world, events, spawn_pos, kind, speed);
        }
        BlockItem::Star => {
            spawn_walker(world, events, spawn_pos, PickupKind::Star, Params::STAR_SPEED)
        }
        BlockItem::ExtraLife => spawn_walker(
            world,
            events,
            spawn_pos,
            PickupKind::OneUp,
            Params::MUSHROOM_SPEED,
        ),
    }
}

fn spawn_walker(world: &mut World, events: &mut Events, pos: Vec2, kind: PickupKind, speed: f32) {
    let mut kin = Kinematics::new(pos, speed);
    kin.active = true;
    kin.facing_right = true;
    kin.despawn_offscreen = true;
    world.spawn((Pickup::new(kind), kin));
    events.play_sound("Item", false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{EnemyKind, EnemyVariant, Patrol};
    use crate::resources::BlockBump;

    const DT: f32 = 0.01;

    fn ticked_time() -> Time {
        let mut time = Time::default();
        time.begin_frame(DT);
        time.apply_scale();
        time
    }

    fn grid_with_block(kind: BlockKind) -> (CollisionGrid, usize) {
        let mut grid = CollisionGrid::new();
        grid.add_ground_strip(-50.0, 50.0, 0.0);
        let id = grid.add_block(Aabb::new(Vec2::new(-0.5, 2.0), Vec2::new(0.5, 3.0)), kind);
        let ColliderId::Block(index) = id else {
            unreachable!()
        };
        (grid, index)
    }

    fn bump(index: usize, powered: bool) -> BlockBump {
        BlockBump {
            collider: ColliderId::Block(index),
            contact: Vec2::new(0.0, 2.0),
            powered,
        }
    }

    fn spawn_player(world: &mut World, power: PowerTier) {
        let mut player = Player::new();
        player.power = power;
        world.spawn((player, Kinematics::new(Vec2::new(0.0, 0.0), 0.0)));
    }

    #[test]
    fn test_brick_breaks_only_for_the_powered_player() {
        let (mut grid, index) = grid_with_block(BlockKind::Brick);
        let mut world = World::new();
        spawn_player(&mut world, PowerTier::None);
        let mut events = Events::new();

        events.block_bumps.push(bump(index, false));
        process_bumps(&mut world, &mut grid, &mut events);
        assert!(!grid.block(index).unwrap().state.broken, "Soft bump thuds");

        events.clear();
        events.block_bumps.push(bump(index, true));
        process_bumps(&mut world, &mut grid, &mut events);
        assert!(grid.block(index).unwrap().state.broken);
        assert!(events.sounds.iter().any(|s| s.name == "Break"));
        assert!(events
            .spawns
            .iter()
            .any(|s| s.kind == SpawnKind::Effect("Shards")));
        assert!(
            grid.raycast(Vec2::new(0.0, 1.0), Vec2::Y, 2.0).is_none(),
            "A broken brick stops colliding"
        );
    }

    #[test]
    fn test_question_block_spends_after_one_coin() {
        let (mut grid, index) = grid_with_block(BlockKind::Question {
            contains: BlockItem::Coin,
            multi_hit: false,
        });
        let mut world = World::new();
        spawn_player(&mut world, PowerTier::None);
        let mut events = Events::new();

        events.block_bumps.push(bump(index, false));
        process_bumps(&mut world, &mut grid, &mut events);
        assert_eq!(world.query::<&Pickup>().iter().count(), 1);
        assert!(grid.block(index).unwrap().state.spent);

        events.clear();
        events.block_bumps.push(bump(index, false));
        process_bumps(&mut world, &mut grid, &mut events);
        assert_eq!(
            world.query::<&Pickup>().iter().count(),
            1,
            "A spent block gives nothing more"
        );
    }

    #[test]
    fn test_power_up_block_matches_player_tier() {
        let (mut grid, index) = grid_with_block(BlockKind::Question {
            contains: BlockItem::PowerUp,
            multi_hit: false,
        });
        let mut world = World::new();
        spawn_player(&mut world, PowerTier::None);
        let mut events = Events::new();
        events.block_bumps.push(bump(index, false));
        process_bumps(&mut world, &mut grid, &mut events);
        let kinds: Vec<_> = world.query::<&Pickup>().iter().map(|(_, p)| p.kind).collect();
        assert_eq!(kinds, vec![PickupKind::Mushroom], "Small player: mushroom");

        let (mut grid, index) = grid_with_block(BlockKind::Question {
            contains: BlockItem::PowerUp,
            multi_hit: false,
        });
        let mut world = World::new();
        spawn_player(&mut world, PowerTier::Mushroom);
        let mut events = Events::new();
        events.block_bumps.push(bump(index, false));
        process_bumps(&mut world, &mut grid, &mut events);
        let kinds: Vec<_> = world.query::<&Pickup>().iter().map(|(_, p)| p.kind).collect();
        assert_eq!(kinds, vec![PickupKind::Flower], "Big player: flower");
    }

    #[test]
    fn test_multi_hit_block_spawns_until_window_expires() {
        let (mut grid, index) = grid_with_block(BlockKind::Question {
            contains: BlockItem::Coin,
            multi_hit: true,
        });
        let mut world = World::new();
        spawn_player(&mut world, PowerTier::None);
        let time = ticked_time();
        let mut events = Events::new();

        // First hit starts the window and spawns.
        events.block_bumps.push(bump(index, false));
        process_bumps(&mut world, &mut grid, &mut events);
        assert_eq!(world.query::<&Pickup>().iter().count(), 1);
        assert!(!grid.block(index).unwrap().state.spent);

        // Hits inside the window keep spawning.
        for _ in 0..100 {
            tick_blocks(&mut grid, &time); // 1s
        }
        events.clear();
        events.block_bumps.push(bump(index, false));
        process_bumps(&mut world, &mut grid, &mut events);
        assert_eq!(world.query::<&Pickup>().iter().count(), 2);

        // Window runs out; the block is permanently spent.
        for _ in 0..450 {
            tick_blocks(&mut grid, &time);
        }
        assert!(grid.block(index).unwrap().state.spent);
        events.clear();
        events.block_bumps.push(bump(index, false));
        process_bumps(&mut world, &mut grid, &mut events);
        assert_eq!(
            world.query::<&Pickup>().iter().count(),
            2,
            "No spawns after expiry"
        );
    }

    #[test]
    fn test_enemy_standing_on_block_takes_tool_damage() {
        let (mut grid, index) = grid_with_block(BlockKind::Question {
            contains: BlockItem::Coin,
            multi_hit: false,
        });
        let mut world = World::new();
        spawn_player(&mut world, PowerTier::None);
        let mut kin = Kinematics::new(Vec2::new(0.0, 3.0), Params::GOOMBA_SPEED);
        kin.active = true;
        let goomba = world.spawn((
            Enemy::new(EnemyKind::Goomba, EnemyVariant::Overworld),
            kin,
            Patrol { turn_at_pits: false },
        ));
        let mut events = Events::new();

        events.block_bumps.push(bump(index, false));
        process_bumps(&mut world, &mut grid, &mut events);

        assert!(!world.get::<&Enemy>(goomba).unwrap().alive());
        assert!(
            world.get::<&DeathFall>(goomba).is_ok(),
            "Struck from below counts as a tool kill"
        );
    }

    #[test]
    fn test_pickup_riding_block_is_launched() {
        let (mut grid, index) = grid_with_block(BlockKind::Question {
            contains: BlockItem::None,
            multi_hit: false,
        });
        let mut world = World::new();
        spawn_player(&mut world, PowerTier::None);
        let mut kin = Kinematics::new(Vec2::new(0.2, 3.2), Params::MUSHROOM_SPEED);
        kin.active = true;
        let shroom = world.spawn((Pickup::new(PickupKind::Mushroom), kin));
        let mut events = Events::new();

        events.block_bumps.push(bump(index, false));
        process_bumps(&mut world, &mut grid, &mut events);

        assert_eq!(
            world.get::<&Kinematics>(shroom).unwrap().v_speed,
            Params::FORCE_JUMP_SPEED,
            "The bump punts the pickup upward"
        );
    }
}
