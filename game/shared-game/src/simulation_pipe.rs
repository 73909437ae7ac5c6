pub mod simulation_pipe {
    use crate::{
        collision::collision::CollisionMask,
        config::config::GameConfig,
        entities::{character::character::Characters, monster::monster::Monsters},
        events::events::SimulationEvents,
    };

    /// borrow bundle for one full world tick: the world geometry, the
    /// game config and the clock, shared by every per-entity pipe
    pub struct SimulationPipe<'a> {
        pub collision: &'a CollisionMask,
        pub config: &'a GameConfig,
        pub cur_time_ms: u64,
        pub dt: f32,
    }

    impl<'a> SimulationPipe<'a> {
        pub fn new(
            collision: &'a CollisionMask,
            config: &'a GameConfig,
            cur_time_ms: u64,
            dt: f32,
        ) -> Self {
            Self {
                collision,
                config,
                cur_time_ms,
                dt,
            }
        }
    }

    /// borrow bundle for a character's attack-phase tick: the world
    /// geometry, the clock and the attackable monster population.
    /// monsters stay read-only — hits become damage requests.
    pub struct SimulationPipeCharacter<'a> {
        pub collision: &'a CollisionMask,
        pub cur_time_ms: u64,
        pub dt_ms: u64,
        pub world_margin: f32,
        pub monsters: &'a Monsters,
        pub events: &'a mut SimulationEvents,
    }

    /// borrow bundle for a monster AI tick
    pub struct SimulationPipeMonster<'a> {
        pub collision: &'a CollisionMask,
        pub cur_time_ms: u64,
        pub dt: f32,
        pub world_margin: f32,
        pub characters: &'a Characters,
        pub events: &'a mut SimulationEvents,
    }

    /// borrow bundle for a projectile step. hit results are returned,
    /// not applied, so both populations stay read-only here.
    pub struct SimulationPipeProjectile<'a> {
        pub collision: &'a CollisionMask,
        pub cur_time_ms: u64,
        pub dt: f32,
        pub characters: &'a Characters,
        pub monsters: &'a Monsters,
    }
}
