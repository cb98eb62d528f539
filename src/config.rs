use crate::params::Params;

/// Runtime-tweakable copies of the core tuning values.
#[derive(Debug, Clone)]
pub struct Config {
    pub gravity_fall: f32,
    pub gravity_entity: f32,
    pub jump_speed: f32,
    pub walk_multiplier: f32,
    pub run_multiplier: f32,
    pub coyote_time: f32,
    pub shoot_cooldown: f32,
    pub hit_grace: f32,
    pub star_duration: f32,
    pub level_time: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gravity_fall: Params::GRAVITY_FALL,
            gravity_entity: Params::GRAVITY_ENTITY,
            jump_speed: Params::JUMP_SPEED,
            walk_multiplier: Params::WALK_MULTIPLIER,
            run_multiplier: Params::RUN_MULTIPLIER,
            coyote_time: Params::COYOTE_TIME,
            shoot_cooldown: Params::SHOOT_COOLDOWN,
            hit_grace: Params::HIT_GRACE,
            star_duration: Params::STAR_DURATION,
            level_time: Params::LEVEL_TIME,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_mirrors_params() {
        let config = Config::new();
        assert_eq!(config.jump_speed, Params::JUMP_SPEED);
        assert_eq!(config.coyote_time, Params::COYOTE_TIME);
    }
}
