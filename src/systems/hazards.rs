use glam::Vec2;
use hecs::World;

use crate::components::{FireBar, Kinematics, Player};
use crate::config::Config;
use crate::params::Params;
use crate::resources::{Events, Time};
use crate::systems::combat;
use crate::systems::sequences::Sequences;

/// Rotating fire bars. The arm sweeps on scaled time, so a time-stop
/// freezes it mid-swing; contact goes through the normal damage ladder
/// and its grace window.
pub fn hazard_update(
    world: &mut World,
    time: &Time,
    config: &Config,
    seq: &mut Sequences,
    events: &mut Events,
) {
    let chest = combat::find_player(world).and_then(|e| {
        let dead = world.get::<&Player>(e).map_or(true, |p| p.is_dead());
        if dead {
            None
        } else {
            world.get::<&Kinematics>(e).ok().map(|k| k.pos + Vec2::Y)
        }
    });

    let mut touched = false;
    for (_, (bar, kin)) in world.query::<(&mut FireBar, &Kinematics)>().iter() {
        if !kin.active {
            continue;
        }
        let spin = if bar.clockwise {
            -Params::FIRE_BAR_SPEED
        } else {
            Params::FIRE_BAR_SPEED
        };
        bar.angle += spin * time.dt;

        let Some(chest) = chest else {
            continue;
        };
        let arm = Vec2::new(bar.angle.cos(), bar.angle.sin());
        for i in 0..bar.flames {
            let flame = kin.pos + arm * (i as f32 * Params::FIRE_BAR_FLAME_SPACING);
            if flame.distance(chest) <= Params::FIRE_BAR_FLAME_RADIUS {
                touched = true;
                break;
            }
        }
    }
    if touched {
        combat::damage_player(world, config, seq, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::PowerTier;

    const DT: f32 = 0.01;

    fn ticked_time() -> Time {
        let mut time = Time::default();
        time.begin_frame(DT);
        time.apply_scale();
        time
    }

    fn spawn_bar(world: &mut World, pivot: Vec2, active: bool) -> hecs::Entity {
        let mut kin = Kinematics::new(pivot, 0.0);
        kin.active = active;
        world.spawn((FireBar::new(0.0, false), kin))
    }

    fn spawn_player(world: &mut World, pos: Vec2) -> hecs::Entity {
        let mut kin = Kinematics::new(pos, 0.0);
        kin.active = true;
        world.spawn((Player::new(), kin))
    }

    fn run(world: &mut World, seq: &mut Sequences, events: &mut Events, ticks: usize) {
        let time = ticked_time();
        let config = Config::default();
        for _ in 0..ticks {
            hazard_update(world, &time, &config, seq, events);
        }
    }

    #[test]
    fn test_bar_spins_only_while_active() {
        let mut world = World::new();
        let hidden = spawn_bar(&mut world, Vec2::new(50.0, 5.0), false);
        let seen = spawn_bar(&mut world, Vec2::new(5.0, 5.0), true);
        let mut seq = Sequences::new();
        let mut events = Events::new();

        run(&mut world, &mut seq, &mut events, 100);

        assert_eq!(
            world.get::<&FireBar>(hidden).unwrap().angle,
            0.0,
            "Off-screen bars hold still"
        );
        let angle = world.get::<&FireBar>(seen).unwrap().angle;
        let expected = Params::FIRE_BAR_SPEED * 1.0; // one second, counter-clockwise
        assert!(
            (angle - expected).abs() < 0.01,
            "One second of spin is 50 degrees, got {angle}"
        );
    }

    #[test]
    fn test_flame_contact_hurts_the_player() {
        let mut world = World::new();
        // Arm points along +x at angle zero; stand the player inside it.
        spawn_bar(&mut world, Vec2::new(5.0, 5.0), true);
        let player = spawn_player(&mut world, Vec2::new(6.5, 4.0)); // chest at (6.5, 5.0)
        world.get::<&mut Player>(player).unwrap().power = PowerTier::Mushroom;
        let mut seq = Sequences::new();
        let mut events = Events::new();

        run(&mut world, &mut seq, &mut events, 1);

        let p = world.get::<&Player>(player).unwrap();
        assert_eq!(p.power, PowerTier::None, "One tier lost to the flame");
        assert!(p.invincible_timer > 0.0, "Grace window opened");
    }

    #[test]
    fn test_grace_window_blocks_repeat_burns() {
        let mut world = World::new();
        spawn_bar(&mut world, Vec2::new(5.0, 5.0), true);
        let player = spawn_player(&mut world, Vec2::new(6.5, 4.0));
        world.get::<&mut Player>(player).unwrap().power = PowerTier::Mushroom;
        let mut seq = Sequences::new();
        let mut events = Events::new();

        // Linger in the flame well past the first hit.
        run(&mut world, &mut seq, &mut events, 50);

        let p = world.get::<&Player>(player).unwrap();
        assert!(
            !p.is_dead(),
            "Standing in the flame burns once per grace window, not per tick"
        );
        assert_eq!(p.power, PowerTier::None);
    }

    #[test]
    fn test_player_beyond_the_arm_is_safe() {
        let mut world = World::new();
        spawn_bar(&mut world, Vec2::new(5.0, 5.0), true);
        let reach = Params::FIRE_BAR_FLAMES as f32 * Params::FIRE_BAR_FLAME_SPACING;
        let player = spawn_player(&mut world, Vec2::new(5.0 + reach + 1.0, 4.0));
        world.get::<&mut Player>(player).unwrap().power = PowerTier::Mushroom;
        let mut seq = Sequences::new();
        let mut events = Events::new();

        run(&mut world, &mut seq, &mut events, 1);
        assert_eq!(
            world.get::<&Player>(player).unwrap().power,
            PowerTier::Mushroom,
            "Past the last flame there is nothing to touch"
        );
    }
}
