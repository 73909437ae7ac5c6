pub mod events {
    use game_interface::{events::GameEvent, types::game::GameEntityId};
    use math::math::vector::vec2;

    use crate::entities::projectile::projectile::OwnerKind;

    /// a hit that still has to go through the damage processor.
    /// nothing applies hp changes directly — every source (monster
    /// swings, projectiles, player melee) queues one of these instead.
    #[derive(Debug, Clone)]
    pub struct DamageRequest {
        pub target_id: GameEntityId,
        pub attacker_id: Option<GameEntityId>,
        pub amount: u32,
    }

    /// a projectile an ability or monster attack wants spawned.
    /// the world assigns the id and inserts the entity.
    #[derive(Debug, Clone)]
    pub struct ProjectileSpawn {
        pub owner_id: GameEntityId,
        pub owner_kind: OwnerKind,
        pub pos: vec2,
        pub angle: f32,
        pub speed: f32,
        pub range: f32,
        pub damage: u32,
        pub effect_tag: String,
    }

    /// per-tick event sink shared by all entity ticks
    #[derive(Debug, Default)]
    pub struct SimulationEvents {
        damage_requests: Vec<DamageRequest>,
        projectile_spawns: Vec<ProjectileSpawn>,
        game_events: Vec<GameEvent>,
    }

    impl SimulationEvents {
        pub fn push_damage(&mut self, req: DamageRequest) {
            self.damage_requests.push(req);
        }

        pub fn push_projectile(&mut self, spawn: ProjectileSpawn) {
            self.projectile_spawns.push(spawn);
        }

        pub fn push_event(&mut self, ev: GameEvent) {
            self.game_events.push(ev);
        }

        pub fn take_damage_requests(&mut self) -> Vec<DamageRequest> {
            std::mem::take(&mut self.damage_requests)
        }

        pub fn take_projectile_spawns(&mut self) -> Vec<ProjectileSpawn> {
            std::mem::take(&mut self.projectile_spawns)
        }

        pub fn take_events(&mut self) -> Vec<GameEvent> {
            std::mem::take(&mut self.game_events)
        }
    }
}
