use hecs::World;

use crate::components::{Kinematics, Pickup, Projectile, ProjectileKind};
use crate::params::Params;
use crate::resources::{Events, SpawnKind};

/// Materialize the tick's spawn requests. Effect requests are left in
/// the queue for the presentation layer and spawn nothing here.
pub fn spawn_from_events(world: &mut World, events: &Events) {
    for request in &events.spawns {
        match request.kind {
            SpawnKind::Fireball => {
                let mut kin = Kinematics::new(request.pos, 0.0);
                kin.active = true;
                kin.facing_right = request.facing_right;
                kin.despawn_offscreen = true;
                kin.half_width = Params::FIREBALL_PROBE;
                kin.wall_distance = Params::FIREBALL_PROBE;
                world.spawn((Projectile::new(ProjectileKind::PlayerFireball), kin));
            }
            SpawnKind::BossFire => {
                let mut kin = Kinematics::new(request.pos, 0.0);
                kin.active = true;
                kin.facing_right = request.facing_right;
                kin.despawn_offscreen = true;
                kin.half_width = Params::FIREBALL_PROBE;
                world.spawn((Projectile::new(ProjectileKind::BossFire), kin));
            }
            SpawnKind::Pickup(kind) => {
                let mut kin = Kinematics::new(request.pos, Params::MUSHROOM_SPEED);
                kin.active = true;
                kin.facing_right = request.facing_right;
                kin.despawn_offscreen = true;
                world.spawn((Pickup::new(kind), kin));
            }
            SpawnKind::Effect(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_fireball_request_becomes_projectile_entity() {
        let mut world = World::new();
        let mut events = Events::new();
        events.spawns.push(crate::resources::SpawnRequest {
            kind: SpawnKind::Fireball,
            pos: Vec2::new(3.0, 1.0),
            facing_right: false,
        });

        spawn_from_events(&mut world, &events);

        let mut query = world.query::<(&Projectile, &Kinematics)>();
        let (_, (projectile, kin)) = query.iter().next().unwrap();
        assert_eq!(projectile.kind, ProjectileKind::PlayerFireball);
        assert!(!kin.facing_right);
        assert!(kin.despawn_offscreen, "Fireballs die when they leave view");
    }

    #[test]
    fn test_effect_requests_spawn_nothing() {
        let mut world = World::new();
        let mut events = Events::new();
        events.request_spawn(SpawnKind::Effect("Stomp"), Vec2::ZERO, true);

        spawn_from_events(&mut world, &events);
        assert_eq!(world.len(), 0, "Effects belong to the host, not the sim");
    }
}
