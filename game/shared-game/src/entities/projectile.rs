pub mod projectile {
    use game_interface::types::game::GameEntityId;
    use hashlink::LinkedHashMap;
    use math::math::{distance, vector::vec2};
    use serde::{Deserialize, Serialize};

    use crate::{
        entities::{
            character_core::character_core,
            entity::entity::Entity,
        },
        simulation_pipe::simulation_pipe::SimulationPipeProjectile,
    };

    pub type Projectiles = LinkedHashMap<GameEntityId, Projectile>;

    /// server-side projectile body radius for hit tests
    pub const PROJECTILE_RADIUS: f32 = 4.0;

    /// hard lifetime bound regardless of range bookkeeping
    pub const MAX_LIFETIME_MS: u64 = 5000;

    /// candidates farther than this on either axis are not even
    /// distance-tested — the coarse spatial prefilter
    const COARSE_CELL: f32 = 160.0;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum OwnerKind {
        Player,
        Monster,
    }

    /// why a projectile left the world this tick
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ProjectileTickResult {
        Alive,
        /// range exhausted or lifetime exceeded
        Expired,
        /// first target hit, at most one per projectile per tick
        Hit(GameEntityId),
    }

    #[derive(Debug)]
    pub struct Projectile {
        pub base: Entity,
        pub owner_id: GameEntityId,
        pub owner_kind: OwnerKind,
        pub pos: vec2,
        /// pixels per second
        pub vel: vec2,
        pub speed: f32,
        pub angle: f32,
        pub damage: u32,
        /// pixels of travel left
        pub range_left: f32,
        pub effect_tag: String,
        pub created_at_ms: u64,
        pub max_lifetime_ms: u64,
    }

    impl Projectile {
        #[allow(clippy::too_many_arguments)]
        pub fn new(
            id: GameEntityId,
            owner_id: GameEntityId,
            owner_kind: OwnerKind,
            pos: vec2,
            angle: f32,
            speed: f32,
            range: f32,
            damage: u32,
            effect_tag: String,
            created_at_ms: u64,
        ) -> Self {
            Self {
                base: Entity::new(id),
                owner_id,
                owner_kind,
                pos,
                vel: vec2::new(angle.cos(), angle.sin()) * speed,
                speed,
                angle,
                damage,
                range_left: range,
                effect_tag,
                created_at_ms,
                max_lifetime_ms: MAX_LIFETIME_MS,
            }
        }

        /// advance, expire, then hit-test. expiry wins over hits: a
        /// projectile whose range runs out this tick is `Expired`, never
        /// `Hit`, even if it would graze a target at its final position.
        pub fn tick(&mut self, pipe: &SimulationPipeProjectile) -> ProjectileTickResult {
            let step = self.vel * pipe.dt;
            let step_len = math::math::length(&step);
            let capped = step_len.min(self.range_left);
            if step_len > 0.0 {
                self.pos += step * (capped / step_len);
            }
            self.range_left -= capped;

            if self.range_left <= 0.0
                || self.created_at_ms + self.max_lifetime_ms <= pipe.cur_time_ms
            {
                return ProjectileTickResult::Expired;
            }

            // walls stop projectiles too
            if !pipe.collision.is_walkable(self.pos.x, self.pos.y) {
                return ProjectileTickResult::Expired;
            }

            match self.owner_kind {
                OwnerKind::Player => self.hit_test(
                    pipe.monsters
                        .iter()
                        .filter(|(_, monster)| monster.alive)
                        .map(|(id, monster)| {
                            (*id, monster.core.pos, monster.stats().collision_radius)
                        }),
                ),
                OwnerKind::Monster => self.hit_test(
                    pipe.characters
                        .iter()
                        .filter(|(_, character)| !character.is_dead)
                        .map(|(id, character)| {
                            (*id, character.core.pos, character_core::PLAYER_RADIUS)
                        }),
                ),
            }
        }

        /// closest target by `distance - radius`, ties by id
        fn hit_test(
            &self,
            candidates: impl Iterator<Item = (GameEntityId, vec2, f32)>,
        ) -> ProjectileTickResult {
            let mut best: Option<(f32, GameEntityId)> = None;
            for (id, pos, radius) in candidates {
                if (pos.x - self.pos.x).abs() > COARSE_CELL + radius
                    || (pos.y - self.pos.y).abs() > COARSE_CELL + radius
                {
                    continue;
                }
                let dist = distance(&self.pos, &pos);
                if dist > radius + PROJECTILE_RADIUS {
                    continue;
                }
                let score = dist - radius;
                let better = match &best {
                    None => true,
                    Some((best_score, best_id)) => {
                        score < *best_score || (score == *best_score && id < *best_id)
                    }
                };
                if better {
                    best = Some((score, id));
                }
            }
            match best {
                Some((_, id)) => ProjectileTickResult::Hit(id),
                None => ProjectileTickResult::Alive,
            }
        }
    }

}
