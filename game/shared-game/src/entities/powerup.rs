pub mod powerup {
    use game_interface::types::game::GameEntityId;
    use hashlink::LinkedHashMap;
    use math::math::vector::vec2;
    use serde::{Deserialize, Serialize};

    use crate::entities::entity::entity::Entity;

    pub type Powerups = LinkedHashMap<GameEntityId, Powerup>;

    pub const POWERUP_RADIUS: f32 = 24.0;

    /// how much of max hp a heal powerup restores
    pub const HEAL_FRACTION: f32 = 0.5;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum PowerupType {
        Heal,
    }

    /// a pickup lying on the ground. contact logic lives in the world
    /// tick, this is pure record keeping.
    #[derive(Debug)]
    pub struct Powerup {
        pub base: Entity,
        pub ty: PowerupType,
        pub pos: vec2,
        pub spawned_at_ms: u64,
        pub expires_at_ms: u64,
    }

    impl Powerup {
        pub fn new(
            id: GameEntityId,
            ty: PowerupType,
            pos: vec2,
            now_ms: u64,
            lifetime_ms: u64,
        ) -> Self {
            Self {
                base: Entity::new(id),
                ty,
                pos,
                spawned_at_ms: now_ms,
                expires_at_ms: now_ms + lifetime_ms,
            }
        }

        pub fn expired(&self, now_ms: u64) -> bool {
            now_ms >= self.expires_at_ms
        }
    }
}
