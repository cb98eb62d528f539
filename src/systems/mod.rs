pub mod blocks;
pub mod combat;
pub mod enemy;
pub mod gc;
pub mod hazards;
pub mod pickups;
pub mod player;
pub mod probes;
pub mod projectiles;
pub mod sequences;
pub mod spawner;

pub use blocks::{process_bumps, tick_blocks};
pub use combat::{damage_player, find_boss, find_player, force_bounce, resolve_contacts, take_damage};
pub use enemy::enemy_update;
pub use gc::{activate_visible, advance_death_falls, cull, expire_corpses, platform_update};
pub use hazards::hazard_update;
pub use pickups::pickup_update;
pub use player::{give_power, give_star, player_update};
pub use probes::{colliders_above, colliders_below, facing_wall, is_grounded, is_touching_ceiling, pit_ahead, ProbeSpec};
pub use projectiles::projectile_update;
pub use sequences::{
    advance_sequences, start_bridge_collapse, start_flag_descent, start_pipe_warp,
    start_player_death, tick_level_timer, PipeDirection, Sequences,
};
pub use spawner::spawn_from_events;
