pub mod monster {
    use game_interface::{
        events::GameEvent,
        types::{character::Facing, game::GameEntityId, monster::MonsterType},
    };
    use hashlink::LinkedHashMap;
    use math::math::{distance, normalize, vector::vec2};
    use serde::{Deserialize, Serialize};

    use crate::{
        abilities::abilities::{cone_hit, rect_hit, AttackArchetype},
        entities::{
            character::character::Characters,
            character_core::character_core::{self, Core},
            entity::entity::{Entity, EntityTickResult},
            projectile::projectile::OwnerKind,
        },
        events::events::{DamageRequest, ProjectileSpawn},
        lag_compensation::lag_compensation::PositionHistory,
        simulation_pipe::simulation_pipe::SimulationPipeMonster,
    };

    pub type Monsters = LinkedHashMap<GameEntityId, Monster>;

    /// corpses linger this long before the entity is removed
    pub const DYING_GRACE_MS: u64 = 500;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum MonsterAiState {
        Idle,
        Chase,
        Windup,
        Active,
        Recover,
        Dying,
    }

    /// per-type stats. configuration data with defaults, the same
    /// standing as the class attack tables.
    #[derive(Debug, Clone)]
    pub struct MonsterStats {
        pub max_hp: u32,
        /// pixels per frame at 60 Hz, same unit as player speeds
        pub move_speed: f32,
        pub attack_range: f32,
        pub aggro_range: f32,
        pub windup_ms: u64,
        pub recovery_ms: u64,
        pub attack_cooldown_ms: u64,
        pub xp_reward: u64,
        pub collision_radius: f32,
        pub damage: u32,
        pub archetype: AttackArchetype,
    }

    pub fn monster_stats(ty: MonsterType) -> MonsterStats {
        match ty {
            MonsterType::Ogre => MonsterStats {
                max_hp: 8,
                move_speed: 2.0,
                attack_range: 70.0,
                aggro_range: 500.0,
                windup_ms: 600,
                recovery_ms: 500,
                attack_cooldown_ms: 1500,
                xp_reward: 30,
                collision_radius: 28.0,
                damage: 2,
                archetype: AttackArchetype::MeleeRect {
                    length: 80.0,
                    width: 60.0,
                },
            },
            MonsterType::Skeleton => MonsterStats {
                max_hp: 4,
                move_speed: 2.5,
                attack_range: 350.0,
                aggro_range: 700.0,
                windup_ms: 400,
                recovery_ms: 300,
                attack_cooldown_ms: 2000,
                xp_reward: 25,
                collision_radius: 18.0,
                damage: 1,
                archetype: AttackArchetype::Projectile {
                    speed: 400.0,
                    range: 420.0,
                    effect_tag: "bone".to_string(),
                    spawn_offset: 20.0,
                    aimable: false,
                },
            },
            MonsterType::Ghoul => MonsterStats {
                max_hp: 3,
                move_speed: 4.0,
                attack_range: 60.0,
                aggro_range: 600.0,
                windup_ms: 250,
                recovery_ms: 250,
                attack_cooldown_ms: 800,
                xp_reward: 20,
                collision_radius: 16.0,
                damage: 1,
                archetype: AttackArchetype::MeleeCone {
                    range: 70.0,
                    angle_deg: 90.0,
                },
            },
            MonsterType::Wolf => MonsterStats {
                max_hp: 5,
                move_speed: 3.5,
                attack_range: 55.0,
                aggro_range: 650.0,
                windup_ms: 300,
                recovery_ms: 300,
                attack_cooldown_ms: 1000,
                xp_reward: 15,
                collision_radius: 18.0,
                damage: 1,
                archetype: AttackArchetype::MeleeRect {
                    length: 60.0,
                    width: 40.0,
                },
            },
        }
    }

    #[derive(Debug)]
    pub struct Monster {
        pub base: Entity,
        pub ty: MonsterType,
        pub core: Core,
        pub hp: u32,
        pub max_hp: u32,
        pub alive: bool,
        pub state: MonsterAiState,
        pub state_deadline_ms: u64,
        pub target_id: Option<GameEntityId>,
        pub attack_cooldown_until: u64,
        pub history: PositionHistory,
    }

    impl Monster {
        pub fn new(id: GameEntityId, ty: MonsterType, pos: vec2) -> Self {
            let stats = monster_stats(ty);
            Self {
                base: Entity::new(id),
                ty,
                core: Core {
                    pos,
                    vel: vec2::default(),
                    facing: Facing::default(),
                },
                hp: stats.max_hp,
                max_hp: stats.max_hp,
                alive: true,
                state: MonsterAiState::Idle,
                state_deadline_ms: 0,
                target_id: None,
                attack_cooldown_until: 0,
                history: PositionHistory::default(),
            }
        }

        pub fn stats(&self) -> MonsterStats {
            monster_stats(self.ty)
        }

        /// hp reached zero: linger as a corpse, stop being a target
        pub fn start_dying(&mut self, now_ms: u64) {
            self.alive = false;
            self.hp = 0;
            self.state = MonsterAiState::Dying;
            self.state_deadline_ms = now_ms + DYING_GRACE_MS;
            self.core.vel = vec2::default();
        }

        /// nearest live player within `range`; equidistant candidates
        /// resolve to the lowest player id
        fn nearest_target(
            pos: &vec2,
            characters: &Characters,
            range: f32,
        ) -> Option<GameEntityId> {
            let mut best: Option<(f32, GameEntityId)> = None;
            for (id, character) in characters.iter() {
                if character.is_dead {
                    continue;
                }
                let dist = distance(pos, &character.core.pos);
                if dist > range {
                    continue;
                }
                let better = match &best {
                    None => true,
                    Some((best_dist, best_id)) => {
                        dist < *best_dist || (dist == *best_dist && *id < *best_id)
                    }
                };
                if better {
                    best = Some((dist, *id));
                }
            }
            best.map(|(_, id)| id)
        }

        fn target_pos(&self, pipe: &SimulationPipeMonster) -> Option<vec2> {
            let target_id = self.target_id?;
            let target = pipe.characters.get(&target_id)?;
            (!target.is_dead).then_some(target.core.pos)
        }

        /// one AI step. everything is deadline driven — a monster that
        /// dies mid-windup simply never reaches the transition.
        pub fn tick(&mut self, pipe: &mut SimulationPipeMonster) -> EntityTickResult {
            let stats = self.stats();
            let now = pipe.cur_time_ms;
            match self.state {
                MonsterAiState::Dying => {
                    if now >= self.state_deadline_ms {
                        return EntityTickResult::RemoveEntity;
                    }
                }
                MonsterAiState::Idle => {
                    if let Some(target) =
                        Self::nearest_target(&self.core.pos, pipe.characters, stats.aggro_range)
                    {
                        self.target_id = Some(target);
                        self.state = MonsterAiState::Chase;
                    }
                }
                MonsterAiState::Chase => match self.target_pos(pipe) {
                    Some(target_pos)
                        if distance(&self.core.pos, &target_pos) <= stats.aggro_range =>
                    {
                        let dist = distance(&self.core.pos, &target_pos);
                        if dist <= stats.attack_range && now >= self.attack_cooldown_until {
                            self.state = MonsterAiState::Windup;
                            self.state_deadline_ms = now + stats.windup_ms;
                            self.core.vel = vec2::default();
                            if let Some(shape) = stats.archetype.telegraph_shape() {
                                pipe.events.push_event(GameEvent::AbilityTelegraph {
                                    source_id: self.base.id,
                                    pos: self.core.pos,
                                    facing: self.core.facing,
                                    shape,
                                    windup_ms: stats.windup_ms,
                                });
                            }
                        } else {
                            let dir = normalize(&(target_pos - self.core.pos));
                            self.core.facing = Facing::from_dir(&dir);
                            self.core.vel = dir * stats.move_speed;
                            character_core::step(
                                &mut self.core.pos,
                                &self.core.vel,
                                pipe.dt,
                                stats.collision_radius,
                                pipe.world_margin,
                                pipe.collision,
                            );
                        }
                    }
                    _ => {
                        self.target_id = None;
                        self.state = MonsterAiState::Idle;
                        self.core.vel = vec2::default();
                    }
                },
                MonsterAiState::Windup => {
                    if now >= self.state_deadline_ms {
                        self.state = MonsterAiState::Active;
                        self.resolve_attack(&stats, pipe);
                        self.attack_cooldown_until = now + stats.attack_cooldown_ms;
                        self.state = MonsterAiState::Recover;
                        self.state_deadline_ms = now + stats.recovery_ms;
                    }
                }
                MonsterAiState::Active => {
                    // resolution is instantaneous; the state only exists
                    // between resolve and recover inside one tick
                    self.state = MonsterAiState::Recover;
                    self.state_deadline_ms = now + stats.recovery_ms;
                }
                MonsterAiState::Recover => {
                    if now >= self.state_deadline_ms {
                        self.state = match self.target_pos(pipe) {
                            Some(target_pos)
                                if distance(&self.core.pos, &target_pos)
                                    <= stats.aggro_range =>
                            {
                                MonsterAiState::Chase
                            }
                            _ => {
                                self.target_id = None;
                                MonsterAiState::Idle
                            }
                        };
                    }
                }
            }
            EntityTickResult::None
        }

        /// hit resolution at the end of the windup. melee shapes test
        /// every live player, the ranged archetype launches at where
        /// the target stands right now.
        fn resolve_attack(&mut self, stats: &MonsterStats, pipe: &mut SimulationPipeMonster) {
            match &stats.archetype {
                AttackArchetype::MeleeRect { length, width } => {
                    for (id, character) in pipe.characters.iter() {
                        if character.is_dead {
                            continue;
                        }
                        if rect_hit(
                            &self.core.pos,
                            self.core.facing,
                            *length,
                            *width,
                            &character.core.pos,
                            character_core::PLAYER_RADIUS,
                        ) {
                            pipe.events.push_damage(DamageRequest {
                                target_id: *id,
                                attacker_id: Some(self.base.id),
                                amount: stats.damage,
                            });
                        }
                    }
                }
                AttackArchetype::MeleeCone { range, angle_deg } => {
                    for (id, character) in pipe.characters.iter() {
                        if character.is_dead {
                            continue;
                        }
                        if cone_hit(
                            &self.core.pos,
                            self.core.facing,
                            *range,
                            *angle_deg,
                            &character.core.pos,
                            character_core::PLAYER_RADIUS,
                        ) {
                            pipe.events.push_damage(DamageRequest {
                                target_id: *id,
                                attacker_id: Some(self.base.id),
                                amount: stats.damage,
                            });
                        }
                    }
                }
                AttackArchetype::Projectile {
                    speed,
                    range,
                    effect_tag,
                    spawn_offset,
                    ..
                } => {
                    if let Some(target_pos) = self.target_pos(pipe) {
                        let dir = normalize(&(target_pos - self.core.pos));
                        self.core.facing = Facing::from_dir(&dir);
                        let angle = dir.y.atan2(dir.x);
                        pipe.events.push_projectile(ProjectileSpawn {
                            owner_id: self.base.id,
                            owner_kind: OwnerKind::Monster,
                            pos: self.core.pos + dir * *spawn_offset,
                            angle,
                            speed: *speed,
                            range: *range,
                            damage: stats.damage,
                            effect_tag: effect_tag.clone(),
                        });
                    }
                }
                // jump/dash/roll never appear in monster tables
                _ => {}
            }
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use crate::{
            collision::collision::CollisionMask, config::config::GameConfig,
            entities::character::character::Character, events::events::SimulationEvents,
        };
        use game_interface::types::character::CharacterClass;

        fn world_setup() -> (CollisionMask, GameConfig, Characters, SimulationEvents) {
            let config = GameConfig::default();
            (
                CollisionMask::open(100, 100, 64),
                config,
                Characters::default(),
                SimulationEvents::default(),
            )
        }

        fn add_player(characters: &mut Characters, id: u64, pos: vec2) {
            let id = GameEntityId(id);
            characters.insert(
                id,
                Character::new(id, CharacterClass::Guardian, pos, 0, 0),
            );
        }

        fn tick_monster(
            monster: &mut Monster,
            collision: &CollisionMask,
            config: &GameConfig,
            characters: &Characters,
            events: &mut SimulationEvents,
            now: u64,
        ) -> EntityTickResult {
            monster.tick(&mut SimulationPipeMonster {
                collision,
                cur_time_ms: now,
                dt: 0.05,
                world_margin: config.world_margin,
                characters,
                events,
            })
        }

        #[test]
        fn idle_aggros_the_nearest_player_lowest_id_wins() {
            let (collision, config, mut characters, mut events) = world_setup();
            add_player(&mut characters, 7, vec2::new(1100.0, 1000.0));
            add_player(&mut characters, 3, vec2::new(900.0, 1000.0));
            // equidistant pair
            let mut monster = Monster::new(GameEntityId(100), MonsterType::Wolf, vec2::new(1000.0, 1000.0));
            tick_monster(&mut monster, &collision, &config, &characters, &mut events, 0);
            assert_eq!(monster.state, MonsterAiState::Chase);
            assert_eq!(monster.target_id, Some(GameEntityId(3)));
        }

        #[test]
        fn chase_closes_in_and_winds_up_with_a_telegraph() {
            let (collision, config, mut characters, mut events) = world_setup();
            add_player(&mut characters, 1, vec2::new(1200.0, 1000.0));
            let mut monster =
                Monster::new(GameEntityId(100), MonsterType::Wolf, vec2::new(1000.0, 1000.0));
            let mut now = 0;
            loop {
                tick_monster(&mut monster, &collision, &config, &characters, &mut events, now);
                if monster.state == MonsterAiState::Windup {
                    break;
                }
                now += 50;
                assert!(now < 10_000, "never reached windup");
            }
            let stats = monster.stats();
            assert_eq!(monster.state_deadline_ms, now + stats.windup_ms);
            let events = events.take_events();
            assert!(events
                .iter()
                .any(|ev| matches!(ev, GameEvent::AbilityTelegraph { .. })));
        }

        #[test]
        fn windup_resolves_into_damage_and_recover() {
            let (collision, config, mut characters, mut events) = world_setup();
            add_player(&mut characters, 1, vec2::new(1030.0, 1000.0));
            let mut monster =
                Monster::new(GameEntityId(100), MonsterType::Wolf, vec2::new(1000.0, 1000.0));
            monster.core.facing = Facing::Right;
            monster.state = MonsterAiState::Windup;
            monster.target_id = Some(GameEntityId(1));
            monster.state_deadline_ms = 300;
            tick_monster(&mut monster, &collision, &config, &characters, &mut events, 300);
            assert_eq!(monster.state, MonsterAiState::Recover);
            let requests = events.take_damage_requests();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].target_id, GameEntityId(1));
            assert_eq!(requests[0].amount, monster.stats().damage);
            assert_eq!(
                monster.attack_cooldown_until,
                300 + monster.stats().attack_cooldown_ms
            );
        }

        #[test]
        fn ranged_monsters_launch_a_projectile_instead() {
            let (collision, config, mut characters, mut events) = world_setup();
            add_player(&mut characters, 1, vec2::new(1300.0, 1000.0));
            let mut monster = Monster::new(
                GameEntityId(100),
                MonsterType::Skeleton,
                vec2::new(1000.0, 1000.0),
            );
            monster.state = MonsterAiState::Windup;
            monster.target_id = Some(GameEntityId(1));
            monster.state_deadline_ms = 400;
            tick_monster(&mut monster, &collision, &config, &characters, &mut events, 400);
            let spawns = events.take_projectile_spawns();
            assert_eq!(spawns.len(), 1);
            assert_eq!(spawns[0].owner_kind, OwnerKind::Monster);
            assert_eq!(spawns[0].angle, 0.0);
        }

        #[test]
        fn dying_monsters_are_removed_after_the_grace_period() {
            let (collision, config, characters, mut events) = world_setup();
            let mut monster =
                Monster::new(GameEntityId(100), MonsterType::Ghoul, vec2::new(1000.0, 1000.0));
            monster.start_dying(1000);
            assert_eq!(
                tick_monster(&mut monster, &collision, &config, &characters, &mut events, 1200),
                EntityTickResult::None
            );
            assert_eq!(
                tick_monster(
                    &mut monster,
                    &collision,
                    &config,
                    &characters,
                    &mut events,
                    1000 + DYING_GRACE_MS
                ),
                EntityTickResult::RemoveEntity
            );
        }

        #[test]
        fn losing_the_target_returns_to_idle() {
            let (collision, config, mut characters, mut events) = world_setup();
            add_player(&mut characters, 1, vec2::new(1100.0, 1000.0));
            let mut monster =
                Monster::new(GameEntityId(100), MonsterType::Wolf, vec2::new(1000.0, 1000.0));
            tick_monster(&mut monster, &collision, &config, &characters, &mut events, 0);
            assert_eq!(monster.state, MonsterAiState::Chase);
            // the player walks far out of aggro range
            characters.get_mut(&GameEntityId(1)).unwrap().core.pos = vec2::new(5000.0, 5000.0);
            tick_monster(&mut monster, &collision, &config, &characters, &mut events, 50);
            assert_eq!(monster.state, MonsterAiState::Idle);
            assert_eq!(monster.target_id, None);
        }
    }
}
