pub mod config {
    use serde::{Deserialize, Serialize};

    fn default_port() -> u16 {
        3000
    }
    fn default_tick_rate() -> u32 {
        20
    }
    fn default_max_players() -> usize {
        16
    }
    fn default_max_monsters() -> usize {
        50
    }
    fn default_initial_spawn_count() -> usize {
        10
    }
    fn default_spawn_interval_ms() -> u64 {
        2000
    }
    fn default_view_distance() -> f32 {
        1500.0
    }
    fn default_world_width() -> u32 {
        100
    }
    fn default_world_height() -> u32 {
        100
    }
    fn default_tile_size() -> u32 {
        64
    }
    fn default_world_margin() -> f32 {
        20.0
    }
    fn default_respawn_delay_ms() -> u64 {
        3000
    }
    fn default_spawn_protection_ms() -> u64 {
        2000
    }
    fn default_monster_spawn_min_radius() -> f32 {
        400.0
    }
    fn default_monster_spawn_max_radius() -> f32 {
        2500.0
    }
    fn default_monster_spawn_attempts() -> u32 {
        10
    }
    fn default_max_projectiles() -> usize {
        1024
    }
    fn default_input_queue_high_water() -> usize {
        120
    }
    fn default_powerup_interval_ms() -> u64 {
        15000
    }
    fn default_powerup_lifetime_ms() -> u64 {
        30000
    }

    /// all tunables of a game instance. everything is read once at
    /// startup (env or config file) and never mutated afterwards.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct GameConfig {
        pub port: u16,
        pub tick_rate: u32,
        pub max_players: usize,
        pub max_monsters: usize,
        pub initial_spawn_count: usize,
        pub spawn_interval_ms: u64,
        pub view_distance: f32,
        pub world_width: u32,
        pub world_height: u32,
        pub tile_size: u32,
        pub world_margin: f32,
        pub respawn_delay_ms: u64,
        pub spawn_protection_ms: u64,
        pub monster_spawn_min_radius: f32,
        pub monster_spawn_max_radius: f32,
        pub monster_spawn_attempts: u32,
        pub max_projectiles: usize,
        pub input_queue_high_water: usize,
        pub powerup_interval_ms: u64,
        pub powerup_lifetime_ms: u64,
    }

    impl Default for GameConfig {
        fn default() -> Self {
            Self {
                port: default_port(),
                tick_rate: default_tick_rate(),
                max_players: default_max_players(),
                max_monsters: default_max_monsters(),
                initial_spawn_count: default_initial_spawn_count(),
                spawn_interval_ms: default_spawn_interval_ms(),
                view_distance: default_view_distance(),
                world_width: default_world_width(),
                world_height: default_world_height(),
                tile_size: default_tile_size(),
                world_margin: default_world_margin(),
                respawn_delay_ms: default_respawn_delay_ms(),
                spawn_protection_ms: default_spawn_protection_ms(),
                monster_spawn_min_radius: default_monster_spawn_min_radius(),
                monster_spawn_max_radius: default_monster_spawn_max_radius(),
                monster_spawn_attempts: default_monster_spawn_attempts(),
                max_projectiles: default_max_projectiles(),
                input_queue_high_water: default_input_queue_high_water(),
                powerup_interval_ms: default_powerup_interval_ms(),
                powerup_lifetime_ms: default_powerup_lifetime_ms(),
            }
        }
    }

    impl GameConfig {
        /// environment overrides for the handful of knobs operators
        /// actually touch. unparsable values fall back to the default.
        pub fn from_env() -> Self {
            let mut res = Self::default();
            fn read<T: std::str::FromStr>(name: &str, into: &mut T) {
                if let Ok(raw) = std::env::var(name) {
                    match raw.parse() {
                        Ok(val) => *into = val,
                        Err(_) => log::warn!("ignoring unparsable env var {name}={raw}"),
                    }
                }
            }
            read("PORT", &mut res.port);
            read("TICK_RATE", &mut res.tick_rate);
            read("MAX_PLAYERS", &mut res.max_players);
            read("MAX_MONSTERS", &mut res.max_monsters);
            read("INITIAL_SPAWN_COUNT", &mut res.initial_spawn_count);
            read("SPAWN_INTERVAL_MS", &mut res.spawn_interval_ms);
            read("VIEW_DISTANCE", &mut res.view_distance);
            res
        }

        pub fn tick_interval_ms(&self) -> u64 {
            1000 / self.tick_rate.max(1) as u64
        }

        pub fn tick_interval(&self) -> std::time::Duration {
            std::time::Duration::from_millis(self.tick_interval_ms())
        }

        /// fixed simulation step in seconds
        pub fn tick_dt(&self) -> f32 {
            1.0 / self.tick_rate.max(1) as f32
        }
    }
}
