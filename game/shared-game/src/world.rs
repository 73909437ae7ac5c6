pub mod world {
    use game_interface::{
        events::{DespawnReason, EntityKind, GameEvent},
        types::{
            character::CharacterClass, game::GameEntityId, id_gen::IdGenerator,
            monster::MonsterType,
        },
    };
    use math::math::{distance, vector::vec2};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    use crate::{
        collision::collision::CollisionMask,
        config::config::GameConfig,
        damage::damage,
        entities::{
            character::character::{Character, Characters},
            character_core::character_core,
            entity::entity::EntityTickResult,
            monster::monster::{Monster, Monsters},
            powerup::powerup::{Powerup, PowerupType, Powerups, HEAL_FRACTION, POWERUP_RADIUS},
            projectile::projectile::{Projectile, ProjectileTickResult, Projectiles},
        },
        events::events::SimulationEvents,
        simulation_pipe::simulation_pipe::{
            SimulationPipe, SimulationPipeCharacter, SimulationPipeMonster,
            SimulationPipeProjectile,
        },
    };

    /// powerups lying around at the same time
    const MAX_POWERUPS: usize = 8;

    const MONSTER_TYPES: [MonsterType; 4] = [
        MonsterType::Ogre,
        MonsterType::Skeleton,
        MonsterType::Ghoul,
        MonsterType::Wolf,
    ];

    /// the entity store of one game instance plus the spawn control.
    /// iteration order of all maps is insertion order, which keeps two
    /// seeded runs identical.
    #[derive(Debug)]
    pub struct GameWorld {
        pub(crate) characters: Characters,
        pub(crate) monsters: Monsters,
        pub(crate) projectiles: Projectiles,
        pub(crate) powerups: Powerups,

        pub simulation_events: SimulationEvents,

        id_generator: IdGenerator,
        rng: Xoshiro256PlusPlus,
        next_monster_spawn_ms: u64,
        next_powerup_spawn_ms: u64,
    }

    impl GameWorld {
        pub fn new(seed: u64, config: &GameConfig) -> Self {
            Self {
                characters: Characters::default(),
                monsters: Monsters::default(),
                projectiles: Projectiles::default(),
                powerups: Powerups::default(),
                simulation_events: SimulationEvents::default(),
                id_generator: IdGenerator::new(),
                rng: Xoshiro256PlusPlus::seed_from_u64(seed),
                next_monster_spawn_ms: config.spawn_interval_ms,
                next_powerup_spawn_ms: config.powerup_interval_ms,
            }
        }

        pub fn characters(&self) -> &Characters {
            &self.characters
        }

        pub fn characters_mut(&mut self) -> &mut Characters {
            &mut self.characters
        }

        pub fn monsters(&self) -> &Monsters {
            &self.monsters
        }

        pub fn monsters_mut(&mut self) -> &mut Monsters {
            &mut self.monsters
        }

        pub fn projectiles(&self) -> &Projectiles {
            &self.projectiles
        }

        pub fn powerups(&self) -> &Powerups {
            &self.powerups
        }

        pub fn next_id(&mut self) -> GameEntityId {
            self.id_generator.next_id()
        }

        /// the initial monster population, placed before any player is
        /// in the world so the distance rules are vacuous
        pub fn populate_initial(&mut self, collision: &CollisionMask, config: &GameConfig) {
            for _ in 0..config.initial_spawn_count {
                if self.monsters.len() >= config.max_monsters {
                    break;
                }
                self.try_spawn_monster(collision, config, 0);
            }
        }

        pub fn add_character(
            &mut self,
            id: GameEntityId,
            class: CharacterClass,
            pos: vec2,
            now_ms: u64,
            spawn_protection_ms: u64,
        ) -> &mut Character {
            self.characters
                .insert(id, Character::new(id, class, pos, now_ms, spawn_protection_ms));
            self.characters.get_mut(&id).expect("just inserted")
        }

        pub fn remove_character(&mut self, id: &GameEntityId) -> Option<Character> {
            self.characters.remove(id)
        }

        /// a walkable spot near the world center for joining players
        pub fn find_player_spawn(&mut self, collision: &CollisionMask) -> vec2 {
            let center = vec2::new(
                collision.world_width_px() / 2.0,
                collision.world_height_px() / 2.0,
            );
            if collision.is_walkable(center.x, center.y) {
                return center;
            }
            for _ in 0..32 {
                let candidate = vec2::new(
                    self.rng.gen_range(0.0..collision.world_width_px()),
                    self.rng.gen_range(0.0..collision.world_height_px()),
                );
                if collision.is_walkable(candidate.x, candidate.y) {
                    return candidate;
                }
            }
            center
        }

        /// one full world step, in the fixed pipeline order
        pub fn tick(&mut self, pipe: &mut SimulationPipe) {
            self.tick_monsters(pipe);
            self.tick_projectiles(pipe);
            self.tick_characters(pipe);
            self.flush_projectile_spawns(pipe);

            let requests = self.simulation_events.take_damage_requests();
            damage::process(
                &mut self.characters,
                &mut self.monsters,
                &mut self.simulation_events,
                requests,
                pipe.cur_time_ms,
                pipe.config,
            );

            self.tick_powerups(pipe);

            self.spawn_monsters(pipe);
            self.spawn_powerups(pipe);

            self.capture_history(pipe.cur_time_ms);
            self.sanitize_positions(pipe);
        }

        fn tick_monsters(&mut self, pipe: &mut SimulationPipe) {
            let mut removed = Vec::new();
            for (id, monster) in self.monsters.iter_mut() {
                let res = monster.tick(&mut SimulationPipeMonster {
                    collision: pipe.collision,
                    cur_time_ms: pipe.cur_time_ms,
                    dt: pipe.dt,
                    world_margin: pipe.config.world_margin,
                    characters: &self.characters,
                    events: &mut self.simulation_events,
                });
                if res == EntityTickResult::RemoveEntity {
                    removed.push(*id);
                }
            }
            // the death broadcast happened when the monster started
            // dying, removal after the grace period is silent
            for id in removed {
                self.monsters.remove(&id);
            }
        }

        fn tick_projectiles(&mut self, pipe: &mut SimulationPipe) {
            let mut finished: Vec<(GameEntityId, ProjectileTickResult)> = Vec::new();
            for (id, projectile) in self.projectiles.iter_mut() {
                let res = projectile.tick(&SimulationPipeProjectile {
                    collision: pipe.collision,
                    cur_time_ms: pipe.cur_time_ms,
                    dt: pipe.dt,
                    characters: &self.characters,
                    monsters: &self.monsters,
                });
                if res != ProjectileTickResult::Alive {
                    finished.push((*id, res));
                }
            }
            for (id, res) in finished {
                let Some(projectile) = self.projectiles.remove(&id) else {
                    continue;
                };
                let reason = match res {
                    ProjectileTickResult::Hit(target_id) => {
                        self.simulation_events.push_damage(
                            crate::events::events::DamageRequest {
                                target_id,
                                attacker_id: Some(projectile.owner_id),
                                amount: projectile.damage,
                            },
                        );
                        DespawnReason::Hit
                    }
                    _ => DespawnReason::Expired,
                };
                self.simulation_events.push_event(GameEvent::EntityDespawn {
                    id,
                    kind: EntityKind::Projectile,
                    reason,
                });
            }
        }

        fn tick_characters(&mut self, pipe: &mut SimulationPipe) {
            for (id, character) in self.characters.iter_mut() {
                if character.is_dead {
                    if let Some(respawn_at) = character.respawn_at {
                        if pipe.cur_time_ms >= respawn_at {
                            character.hp = character.max_hp;
                            character.is_dead = false;
                            character.respawn_at = None;
                            character.cooldowns.clear();
                            character.core.pos = character.spawn_pos;
                            character.core.vel = Default::default();
                            character.spawn_protected_until =
                                pipe.cur_time_ms + pipe.config.spawn_protection_ms;
                            character.history.clear();
                            self.simulation_events
                                .push_event(GameEvent::PlayerRespawned { player_id: *id });
                        }
                    }
                    continue;
                }
                character.tick_attack(&mut SimulationPipeCharacter {
                    collision: pipe.collision,
                    cur_time_ms: pipe.cur_time_ms,
                    dt_ms: (pipe.dt * 1000.0) as u64,
                    world_margin: pipe.config.world_margin,
                    monsters: &self.monsters,
                    events: &mut self.simulation_events,
                });
            }
        }

        fn flush_projectile_spawns(&mut self, pipe: &mut SimulationPipe) {
            for spawn in self.simulation_events.take_projectile_spawns() {
                // deterministic shedding: the oldest projectile goes first
                while self.projectiles.len() >= pipe.config.max_projectiles {
                    if let Some((old_id, _)) = self.projectiles.pop_front() {
                        self.simulation_events.push_event(GameEvent::EntityDespawn {
                            id: old_id,
                            kind: EntityKind::Projectile,
                            reason: DespawnReason::Expired,
                        });
                    } else {
                        break;
                    }
                }
                let id = self.id_generator.next_id();
                let pos = spawn.pos;
                self.projectiles.insert(
                    id,
                    Projectile::new(
                        id,
                        spawn.owner_id,
                        spawn.owner_kind,
                        spawn.pos,
                        spawn.angle,
                        spawn.speed,
                        spawn.range,
                        spawn.damage,
                        spawn.effect_tag,
                        pipe.cur_time_ms,
                    ),
                );
                self.simulation_events.push_event(GameEvent::EntitySpawn {
                    id,
                    kind: EntityKind::Projectile,
                    monster_type: None,
                    pos,
                });
            }
        }

        fn tick_powerups(&mut self, pipe: &mut SimulationPipe) {
            let mut finished: Vec<(GameEntityId, DespawnReason)> = Vec::new();
            for (id, powerup) in self.powerups.iter() {
                if powerup.expired(pipe.cur_time_ms) {
                    finished.push((*id, DespawnReason::Expired));
                    continue;
                }
                let contact = self.characters.iter_mut().find(|(_, character)| {
                    !character.is_dead
                        && distance(&character.core.pos, &powerup.pos)
                            <= POWERUP_RADIUS + character_core::PLAYER_RADIUS
                });
                if let Some((_, character)) = contact {
                    let amount = ((character.max_hp as f32) * HEAL_FRACTION).ceil() as u32;
                    damage::heal(character, amount.max(1));
                    finished.push((*id, DespawnReason::PickedUp));
                }
            }
            for (id, reason) in finished {
                self.powerups.remove(&id);
                self.simulation_events.push_event(GameEvent::EntityDespawn {
                    id,
                    kind: EntityKind::Powerup,
                    reason,
                });
            }
        }

        fn spawn_monsters(&mut self, pipe: &mut SimulationPipe) {
            if pipe.cur_time_ms < self.next_monster_spawn_ms {
                return;
            }
            self.next_monster_spawn_ms = pipe.cur_time_ms + pipe.config.spawn_interval_ms;
            if self.monsters.len() >= pipe.config.max_monsters {
                return;
            }
            self.try_spawn_monster(pipe.collision, pipe.config, pipe.cur_time_ms);
        }

        /// candidate positions must be walkable and sit inside the
        /// allowed distance band around the live players. after the
        /// configured attempts the tick's spawn is skipped.
        fn try_spawn_monster(
            &mut self,
            collision: &CollisionMask,
            config: &GameConfig,
            _now_ms: u64,
        ) -> bool {
            for _ in 0..config.monster_spawn_attempts {
                let candidate = vec2::new(
                    self.rng
                        .gen_range(config.world_margin..collision.world_width_px() - config.world_margin),
                    self.rng
                        .gen_range(config.world_margin..collision.world_height_px() - config.world_margin),
                );
                if !collision.is_walkable(candidate.x, candidate.y) {
                    continue;
                }
                let live_player_dist = self
                    .characters
                    .values()
                    .filter(|character| !character.is_dead)
                    .map(|character| distance(&character.core.pos, &candidate))
                    .fold(None::<f32>, |acc, d| {
                        Some(acc.map_or(d, |best| best.min(d)))
                    });
                if let Some(dist) = live_player_dist {
                    if dist < config.monster_spawn_min_radius
                        || dist > config.monster_spawn_max_radius
                    {
                        continue;
                    }
                }
                let ty = MONSTER_TYPES[self.rng.gen_range(0..MONSTER_TYPES.len())];
                let id = self.id_generator.next_id();
                self.monsters.insert(id, Monster::new(id, ty, candidate));
                self.simulation_events.push_event(GameEvent::EntitySpawn {
                    id,
                    kind: EntityKind::Monster,
                    monster_type: Some(ty),
                    pos: candidate,
                });
                return true;
            }
            false
        }

        fn spawn_powerups(&mut self, pipe: &mut SimulationPipe) {
            if pipe.cur_time_ms < self.next_powerup_spawn_ms {
                return;
            }
            self.next_powerup_spawn_ms = pipe.cur_time_ms + pipe.config.powerup_interval_ms;
            if self.powerups.len() >= MAX_POWERUPS {
                return;
            }
            for _ in 0..pipe.config.monster_spawn_attempts {
                let candidate = vec2::new(
                    self.rng.gen_range(
                        pipe.config.world_margin
                            ..pipe.collision.world_width_px() - pipe.config.world_margin,
                    ),
                    self.rng.gen_range(
                        pipe.config.world_margin
                            ..pipe.collision.world_height_px() - pipe.config.world_margin,
                    ),
                );
                if !pipe.collision.is_walkable(candidate.x, candidate.y) {
                    continue;
                }
                let id = self.id_generator.next_id();
                self.powerups.insert(
                    id,
                    Powerup::new(
                        id,
                        PowerupType::Heal,
                        candidate,
                        pipe.cur_time_ms,
                        pipe.config.powerup_lifetime_ms,
                    ),
                );
                self.simulation_events.push_event(GameEvent::EntitySpawn {
                    id,
                    kind: EntityKind::Powerup,
                    monster_type: None,
                    pos: candidate,
                });
                return;
            }
        }

        fn capture_history(&mut self, now_ms: u64) {
            for character in self.characters.values_mut() {
                character.history.record(now_ms, character.core.pos);
            }
            for monster in self.monsters.values_mut() {
                monster.history.record(now_ms, monster.core.pos);
            }
        }

        /// invariant guard: non-finite positions are logged and reset
        /// instead of poisoning the rest of the tick
        fn sanitize_positions(&mut self, pipe: &SimulationPipe) {
            let fallback = vec2::new(
                pipe.collision.world_width_px() / 2.0,
                pipe.collision.world_height_px() / 2.0,
            );
            for (id, character) in self.characters.iter_mut() {
                if !character.core.pos.x.is_finite() || !character.core.pos.y.is_finite() {
                    log::error!(
                        "player {id} had a non-finite position {:?}, resetting to spawn",
                        character.core.pos
                    );
                    character.core.pos = character.spawn_pos;
                    character.core.vel = Default::default();
                }
            }
            for (id, monster) in self.monsters.iter_mut() {
                if !monster.core.pos.x.is_finite() || !monster.core.pos.y.is_finite() {
                    log::error!(
                        "monster {id} had a non-finite position {:?}, resetting",
                        monster.core.pos
                    );
                    monster.core.pos = fallback;
                    monster.core.vel = Default::default();
                }
            }
        }
    }
}
