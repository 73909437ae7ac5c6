pub mod state {
    use std::collections::VecDeque;

    use game_interface::{
        events::GameEvent,
        types::{
            character::CharacterClass,
            game::GameEntityId,
            input::{AbilityKind, CharacterInput},
        },
    };
    use hashlink::LinkedHashMap;
    use math::math::length;

    use crate::{
        abilities::abilities::AbilityTable,
        anti_cheat::anti_cheat::{AntiCheatStats, CheatVerdict, SessionAntiCheat},
        collision::collision::CollisionMask,
        config::config::GameConfig,
        entities::character_core::character_core,
        simulation_pipe::simulation_pipe::SimulationPipe,
        snapshot::snapshot::{self, ClientSnapshotState, SnapshotPayload},
        world::world::GameWorld,
    };

    /// per-connection bookkeeping the simulation keeps next to the
    /// in-world character: the sequenced input queue, the session
    /// validators and the per-client snapshot cache
    #[derive(Debug, Default)]
    pub struct Player {
        pub pending_inputs: VecDeque<CharacterInput>,
        pub anti_cheat: SessionAntiCheat,
        pub snapshot_state: ClientSnapshotState,
    }

    /// what happened to a message a client sent
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum MessageOutcome {
        Accepted,
        /// dropped, session stays
        Rejected,
        /// the session crossed the violation threshold
        CloseSession,
    }

    /// one authoritative game instance. all mutation happens on the
    /// simulation thread; the server drives `tick` at the fixed rate
    /// and pulls snapshots/events afterwards.
    pub struct GameState {
        pub config: GameConfig,
        pub collision: CollisionMask,
        pub world: GameWorld,
        players: LinkedHashMap<GameEntityId, Player>,
        ability_table: AbilityTable,

        /// authoritative world seed, fixed at construction, sent to
        /// every client in `world_init`
        seed: u64,
        monotonic_tick: u64,

        events: Vec<GameEvent>,
        pending_disconnects: Vec<GameEntityId>,
    }

    impl GameState {
        pub fn new(config: GameConfig, collision: CollisionMask, seed: u64) -> Self {
            let mut world = GameWorld::new(seed, &config);
            world.populate_initial(&collision, &config);
            let events = world.simulation_events.take_events();
            Self {
                config,
                collision,
                world,
                players: LinkedHashMap::default(),
                ability_table: AbilityTable::default(),
                seed,
                monotonic_tick: 0,
                events,
                pending_disconnects: Vec::new(),
            }
        }

        pub fn seed(&self) -> u64 {
            self.seed
        }

        pub fn monotonic_tick(&self) -> u64 {
            self.monotonic_tick
        }

        /// simulation clock: derived from the tick counter so that two
        /// seeded runs with the same inputs stay identical
        pub fn cur_time_ms(&self) -> u64 {
            self.monotonic_tick * self.config.tick_interval_ms()
        }

        pub fn player_count(&self) -> usize {
            self.players.len()
        }

        pub fn player_join(&mut self, class: CharacterClass) -> GameEntityId {
            let id = self.world.next_id();
            let pos = self.world.find_player_spawn(&self.collision);
            let now = self.cur_time_ms();
            self.world
                .add_character(id, class, pos, now, self.config.spawn_protection_ms);
            self.players.insert(id, Player::default());
            self.events
                .push(GameEvent::PlayerJoined { player_id: id, class });
            id
        }

        /// disconnect cleanup: the input queue and all scheduled attack
        /// transitions die with the character. projectiles the player
        /// owns keep flying until natural expiry.
        pub fn player_disconnect(&mut self, id: &GameEntityId) {
            if self.players.remove(id).is_some() {
                self.world.remove_character(id);
                self.events.push(GameEvent::PlayerLeft { player_id: *id });
            }
        }

        /// enqueues a sequenced input. validation happens when the tick
        /// drains the queue; only the overflow shedding happens here.
        pub fn player_input(&mut self, id: &GameEntityId, input: CharacterInput) -> MessageOutcome {
            let Some(player) = self.players.get_mut(id) else {
                return MessageOutcome::Rejected;
            };
            player.pending_inputs.push_back(input);
            if player.pending_inputs.len() > self.config.input_queue_high_water {
                // deterministic shedding: the oldest half goes
                let keep = player.pending_inputs.len() / 2;
                while player.pending_inputs.len() > keep {
                    player.pending_inputs.pop_front();
                }
                if player.anti_cheat.note_queue_overflow() == CheatVerdict::Disconnect {
                    self.pending_disconnects.push(*id);
                    return MessageOutcome::CloseSession;
                }
                return MessageOutcome::Rejected;
            }
            MessageOutcome::Accepted
        }

        /// the ability manager's request entry: anti-cheat rate check,
        /// then the gameplay gates (dead / attacking / cooldown / roll
        /// unlock), then the attack is armed on the character.
        pub fn ability_request(
            &mut self,
            id: &GameEntityId,
            kind: AbilityKind,
            aim_angle: Option<f32>,
        ) -> MessageOutcome {
            let now = self.cur_time_ms();
            let Some(player) = self.players.get_mut(id) else {
                return MessageOutcome::Rejected;
            };
            match player
                .anti_cheat
                .check_ability(now, self.ability_table.min_cooldown_ms())
            {
                CheatVerdict::Ok => {}
                CheatVerdict::Ignore => return MessageOutcome::Rejected,
                CheatVerdict::Disconnect => {
                    self.pending_disconnects.push(*id);
                    return MessageOutcome::CloseSession;
                }
            }
            let Some(character) = self.world.characters_mut().get_mut(id) else {
                return MessageOutcome::Rejected;
            };
            if character.is_dead
                || character.is_attacking()
                || !character.cooldowns.ready(kind, now)
            {
                return MessageOutcome::Rejected;
            }
            if kind == AbilityKind::Roll && !character.roll_unlocked {
                return MessageOutcome::Rejected;
            }
            let spec = self.ability_table.spec(character.class, kind).clone();
            character.begin_attack(kind, spec, now, aim_angle);
            MessageOutcome::Accepted
        }

        /// latency estimate from the server's ping tracking, feeds the
        /// lag compensation rewind
        pub fn set_player_latency(&mut self, id: &GameEntityId, one_way_ms: u64) {
            if let Some(character) = self.world.characters_mut().get_mut(id) {
                character.one_way_latency_ms = one_way_ms;
            }
        }

        /// sessions the anti cheat decided to close; the server owns
        /// the sockets and performs the actual disconnect
        pub fn take_pending_disconnects(&mut self) -> Vec<GameEntityId> {
            std::mem::take(&mut self.pending_disconnects)
        }

        /// read-only validator counters for the debug collaborator
        pub fn anti_cheat_stats(&self) -> Vec<(GameEntityId, AntiCheatStats)> {
            self.players
                .iter()
                .map(|(id, player)| (*id, player.anti_cheat.stats().clone()))
                .collect()
        }

        /// one fixed simulation step: drain input queues in sequence
        /// order, then run the world pipeline
        pub fn tick(&mut self) {
            self.monotonic_tick += 1;
            let now = self.cur_time_ms();

            // input processing, players in stable id order
            for (id, player) in self.players.iter_mut() {
                let Some(character) = self.world.characters_mut().get_mut(id) else {
                    player.pending_inputs.clear();
                    continue;
                };
                while let Some(input) = player.pending_inputs.pop_front() {
                    let vel = character_core::input_velocity(
                        input.keys,
                        input.facing,
                        character.base_speed(),
                        character.level,
                    );
                    let move_delta =
                        length(&vel) * input.delta_time * character_core::FRAME_RATE_FACTOR;
                    match player.anti_cheat.check_input(
                        now,
                        input.sequence,
                        input.delta_time,
                        move_delta,
                        character.max_speed(),
                    ) {
                        CheatVerdict::Ok => {
                            character.apply_move(
                                input.keys,
                                input.facing,
                                input.delta_time,
                                &self.collision,
                                self.config.world_margin,
                            );
                            character.last_processed_seq = input.sequence;
                        }
                        CheatVerdict::Ignore => {}
                        CheatVerdict::Disconnect => {
                            self.pending_disconnects.push(*id);
                            player.pending_inputs.clear();
                            break;
                        }
                    }
                }
            }

            let mut pipe = SimulationPipe::new(
                &self.collision,
                &self.config,
                now,
                self.config.tick_dt(),
            );
            self.world.tick(&mut pipe);
            self.events
                .extend(self.world.simulation_events.take_events());
        }

        /// reliable events produced since the last drain, in order
        pub fn drain_events(&mut self) -> Vec<GameEvent> {
            std::mem::take(&mut self.events)
        }

        /// the per-client `state` payload for this tick
        pub fn build_snapshot_for(&mut self, id: &GameEntityId) -> Option<SnapshotPayload> {
            let server_time = self.monotonic_tick * self.config.tick_interval_ms();
            let player = self.players.get_mut(id)?;
            Some(snapshot::build_for(
                *id,
                &mut player.snapshot_state,
                &self.world,
                self.monotonic_tick,
                server_time,
                self.config.view_distance,
            ))
        }
    }
}
