pub mod character {
    use game_interface::types::{
        character::{CharacterClass, Facing},
        game::GameEntityId,
        input::{AbilityKind, MoveKeys},
    };
    use hashlink::LinkedHashMap;
    use math::math::vector::vec2;

    use crate::{
        abilities::abilities::{
            cone_hit, rect_hit, validated_aim_angle, AbilitySpec, AttackArchetype,
        },
        collision::collision::CollisionMask,
        entities::{
            character_core::character_core::{self, Core},
            entity::entity::Entity,
            projectile::projectile::OwnerKind,
        },
        events::events::{DamageRequest, ProjectileSpawn},
        lag_compensation::lag_compensation::PositionHistory,
        simulation_pipe::simulation_pipe::SimulationPipeCharacter,
    };

    pub type Characters = LinkedHashMap<GameEntityId, Character>;

    pub const MAX_LEVEL: u32 = 10;

    /// class baselines. configuration data like the attack tables.
    #[derive(Debug, Copy, Clone)]
    pub struct ClassStats {
        pub base_speed: f32,
        pub max_hp: u32,
    }

    pub fn class_stats(class: CharacterClass) -> ClassStats {
        match class {
            CharacterClass::Bladedancer => ClassStats {
                base_speed: 5.0,
                max_hp: 5,
            },
            CharacterClass::Guardian => ClassStats {
                base_speed: 4.0,
                max_hp: 8,
            },
            CharacterClass::Hunter => ClassStats {
                base_speed: 4.5,
                max_hp: 4,
            },
            CharacterClass::Rogue => ClassStats {
                base_speed: 5.5,
                max_hp: 4,
            },
        }
    }

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum AttackPhase {
        Windup,
        Active,
        Recover,
    }

    /// a running attack. phases advance on deadlines inside the tick,
    /// there are no deferred callbacks that could outlive the player.
    #[derive(Debug, Clone)]
    pub struct ActiveAttack {
        pub kind: AbilityKind,
        pub spec: AbilitySpec,
        pub phase: AttackPhase,
        pub phase_deadline_ms: u64,
        /// locked at the moment of the request
        pub facing: Facing,
        pub aim_angle: Option<f32>,
        /// remaining translate distance for jump/dash/roll
        pub translate_left: f32,
    }

    /// absolute deadlines; a slot is ready when the clock passed it
    #[derive(Debug, Default, Copy, Clone)]
    pub struct AttackCooldowns {
        pub primary: u64,
        pub secondary: u64,
        pub roll: u64,
    }

    impl AttackCooldowns {
        pub fn deadline(&self, kind: AbilityKind) -> u64 {
            match kind {
                AbilityKind::Primary => self.primary,
                AbilityKind::Secondary => self.secondary,
                AbilityKind::Roll => self.roll,
            }
        }

        pub fn set(&mut self, kind: AbilityKind, deadline_ms: u64) {
            match kind {
                AbilityKind::Primary => self.primary = deadline_ms,
                AbilityKind::Secondary => self.secondary = deadline_ms,
                AbilityKind::Roll => self.roll = deadline_ms,
            }
        }

        pub fn ready(&self, kind: AbilityKind, now_ms: u64) -> bool {
            now_ms >= self.deadline(kind)
        }

        pub fn remaining_ms(&self, kind: AbilityKind, now_ms: u64) -> u64 {
            self.deadline(kind).saturating_sub(now_ms)
        }

        pub fn clear(&mut self) {
            *self = Self::default();
        }
    }

    /// the authoritative player body
    #[derive(Debug)]
    pub struct Character {
        pub base: Entity,
        pub core: Core,
        pub class: CharacterClass,

        pub hp: u32,
        pub max_hp: u32,
        pub level: u32,
        pub experience: u64,
        pub kill_count: u32,

        /// fraction shaved off recovery times by level ups
        pub attack_recovery_bonus: f32,
        /// fraction shaved off cooldowns by level ups
        pub attack_cooldown_bonus: f32,
        pub roll_unlocked: bool,

        pub is_dead: bool,
        pub spawn_protected_until: u64,
        /// i-frames from dash/roll active phases
        pub invulnerable_until: u64,
        pub respawn_at: Option<u64>,

        pub attack: Option<ActiveAttack>,
        pub cooldowns: AttackCooldowns,

        pub last_processed_seq: u64,
        /// one-way latency estimate, fed by the server's ping tracking
        pub one_way_latency_ms: u64,

        pub history: PositionHistory,
        pub spawn_pos: vec2,
    }

    impl Character {
        pub fn new(
            id: GameEntityId,
            class: CharacterClass,
            spawn_pos: vec2,
            now_ms: u64,
            spawn_protection_ms: u64,
        ) -> Self {
            let stats = class_stats(class);
            Self {
                base: Entity::new(id),
                core: Core {
                    pos: spawn_pos,
                    vel: vec2::default(),
                    facing: Facing::default(),
                },
                class,
                hp: stats.max_hp,
                max_hp: stats.max_hp,
                level: 1,
                experience: 0,
                kill_count: 0,
                attack_recovery_bonus: 0.0,
                attack_cooldown_bonus: 0.0,
                roll_unlocked: false,
                is_dead: false,
                spawn_protected_until: now_ms + spawn_protection_ms,
                invulnerable_until: 0,
                respawn_at: None,
                attack: None,
                cooldowns: AttackCooldowns::default(),
                last_processed_seq: 0,
                one_way_latency_ms: 0,
                history: PositionHistory::default(),
                spawn_pos,
            }
        }

        pub fn base_speed(&self) -> f32 {
            class_stats(self.class).base_speed
        }

        /// speed ceiling for the anti cheat movement bound, including
        /// every attainable level bonus
        pub fn max_speed(&self) -> f32 {
            self.base_speed() + 0.5
        }

        pub fn is_invulnerable(&self, now_ms: u64) -> bool {
            now_ms < self.spawn_protected_until || now_ms < self.invulnerable_until
        }

        pub fn is_attacking(&self) -> bool {
            self.attack.is_some()
        }

        pub fn current_attack_type(&self) -> Option<AbilityKind> {
            self.attack.as_ref().map(|attack| attack.kind)
        }

        /// effective recovery after level bonuses
        pub fn recovery_ms(&self, spec: &AbilitySpec) -> u64 {
            ((spec.recovery_ms as f32) * (1.0 - self.attack_recovery_bonus)) as u64
        }

        /// effective cooldown after level bonuses
        pub fn cooldown_ms(&self, spec: &AbilitySpec) -> u64 {
            ((spec.cooldown_ms as f32) * (1.0 - self.attack_cooldown_bonus)) as u64
        }

        /// whether normal movement input currently steers the body.
        /// windup and active phases root the player (translate
        /// archetypes move it themselves), recovery frees it again.
        pub fn movement_locked(&self) -> bool {
            self.attack
                .as_ref()
                .is_some_and(|attack| attack.phase != AttackPhase::Recover)
        }

        /// one applied movement input. the facing always updates, the
        /// body only moves when it is neither dead nor rooted.
        pub fn apply_move(
            &mut self,
            keys: MoveKeys,
            facing: Facing,
            delta_time: f32,
            collision: &CollisionMask,
            world_margin: f32,
        ) {
            self.core.facing = facing;
            if self.is_dead || self.movement_locked() {
                self.core.vel = vec2::default();
                return;
            }
            let vel =
                character_core::input_velocity(keys, facing, self.base_speed(), self.level);
            self.core.vel = vel;
            character_core::step(
                &mut self.core.pos,
                &vel,
                delta_time,
                character_core::PLAYER_RADIUS,
                world_margin,
                collision,
            );
        }

        /// arms an attack. gating (dead/attacking/cooldown/anti-cheat)
        /// already happened in the ability manager.
        pub fn begin_attack(
            &mut self,
            kind: AbilityKind,
            spec: AbilitySpec,
            now_ms: u64,
            aim_angle: Option<f32>,
        ) {
            let cooldown = self.cooldown_ms(&spec);
            self.cooldowns.set(kind, now_ms + cooldown);
            let translate_left = spec.archetype.translate_distance().unwrap_or(0.0);
            let windup_deadline = now_ms + spec.windup_ms;
            self.attack = Some(ActiveAttack {
                kind,
                spec,
                phase: AttackPhase::Windup,
                phase_deadline_ms: windup_deadline,
                facing: self.core.facing,
                aim_angle,
                translate_left,
            });
        }

        /// drops everything scheduled, used on death and disconnect
        pub fn cancel_attack(&mut self) {
            self.attack = None;
        }

        /// translate step for jump/dash/roll active phases. collision
        /// resolved like any other move.
        pub fn translate_step(&mut self, dt_ms: u64, collision: &CollisionMask, margin: f32) {
            let Some(attack) = &mut self.attack else {
                return;
            };
            if attack.phase != AttackPhase::Active || attack.translate_left <= 0.0 {
                return;
            }
            let total_active = attack.spec.active_ms.max(1) as f32;
            let total_dist = attack.spec.archetype.translate_distance().unwrap_or(0.0);
            let step_dist = (total_dist * dt_ms as f32 / total_active).min(attack.translate_left);
            let dir = attack.facing.dir();
            // expressed as per-frame velocity so the kernel's dt scaling cancels
            let vel = dir * (step_dist / (dt_ms as f32 / 1000.0) / character_core::FRAME_RATE_FACTOR);
            character_core::step(
                &mut self.core.pos,
                &vel,
                dt_ms as f32 / 1000.0,
                character_core::PLAYER_RADIUS,
                margin,
                collision,
            );
            attack.translate_left -= step_dist;
        }

        /// advances the attack state machine. deadlines may collapse
        /// several phases into one tick (e.g. a zero-length active
        /// phase), the loop runs them all.
        pub fn tick_attack(&mut self, pipe: &mut SimulationPipeCharacter) {
            self.translate_step(pipe.dt_ms, pipe.collision, pipe.world_margin);
            loop {
                let Some(attack) = &self.attack else {
                    return;
                };
                if pipe.cur_time_ms < attack.phase_deadline_ms {
                    return;
                }
                match attack.phase {
                    AttackPhase::Windup => {
                        let snapshot = attack.clone();
                        self.resolve_attack(&snapshot, pipe);
                        let mut i_frames_until = None;
                        if let Some(attack) = &mut self.attack {
                            attack.phase = AttackPhase::Active;
                            attack.phase_deadline_ms += attack.spec.active_ms;
                            if attack.spec.archetype.grants_i_frames() {
                                i_frames_until = Some(attack.phase_deadline_ms);
                            }
                        }
                        if let Some(until) = i_frames_until {
                            self.invulnerable_until = self.invulnerable_until.max(until);
                        }
                    }
                    AttackPhase::Active => {
                        let recovery_bonus = self.attack_recovery_bonus;
                        if let Some(attack) = &mut self.attack {
                            attack.phase = AttackPhase::Recover;
                            attack.phase_deadline_ms += ((attack.spec.recovery_ms as f32)
                                * (1.0 - recovery_bonus))
                                as u64;
                        }
                    }
                    AttackPhase::Recover => {
                        self.attack = None;
                    }
                }
            }
        }

        /// hit resolution at windup end: shapes anchor at the position
        /// the player holds now, rotated by the facing locked when the
        /// request came in. lag-compensated specs rewind each target to
        /// what the attacker saw.
        fn resolve_attack(&self, attack: &ActiveAttack, pipe: &mut SimulationPipeCharacter) {
            let rewind_to = pipe
                .cur_time_ms
                .saturating_sub(self.one_way_latency_ms);
            let target_pos = |monster: &crate::entities::monster::monster::Monster| {
                if attack.spec.lag_compensated {
                    monster
                        .history
                        .sample_at(pipe.cur_time_ms, rewind_to)
                        .unwrap_or(monster.core.pos)
                } else {
                    monster.core.pos
                }
            };
            match &attack.spec.archetype {
                AttackArchetype::MeleeRect { length, width } => {
                    for (id, monster) in pipe.monsters.iter() {
                        if !monster.alive {
                            continue;
                        }
                        let pos = target_pos(monster);
                        if rect_hit(
                            &self.core.pos,
                            attack.facing,
                            *length,
                            *width,
                            &pos,
                            monster.stats().collision_radius,
                        ) {
                            pipe.events.push_damage(DamageRequest {
                                target_id: *id,
                                attacker_id: Some(self.base.id),
                                amount: attack.spec.damage,
                            });
                        }
                    }
                }
                AttackArchetype::MeleeCone { range, angle_deg } => {
                    for (id, monster) in pipe.monsters.iter() {
                        if !monster.alive {
                            continue;
                        }
                        let pos = target_pos(monster);
                        if cone_hit(
                            &self.core.pos,
                            attack.facing,
                            *range,
                            *angle_deg,
                            &pos,
                            monster.stats().collision_radius,
                        ) {
                            pipe.events.push_damage(DamageRequest {
                                target_id: *id,
                                attacker_id: Some(self.base.id),
                                amount: attack.spec.damage,
                            });
                        }
                    }
                }
                AttackArchetype::Projectile {
                    speed,
                    range,
                    effect_tag,
                    spawn_offset,
                    aimable,
                } => {
                    let aim = if *aimable { attack.aim_angle } else { None };
                    let angle = validated_aim_angle(attack.facing, aim);
                    let dir = vec2::new(angle.cos(), angle.sin());
                    pipe.events.push_projectile(ProjectileSpawn {
                        owner_id: self.base.id,
                        owner_kind: OwnerKind::Player,
                        pos: self.core.pos + dir * *spawn_offset,
                        angle,
                        speed: *speed,
                        range: *range,
                        damage: attack.spec.damage,
                        effect_tag: effect_tag.clone(),
                    });
                }
                // pure movement, nothing to resolve
                AttackArchetype::Jump { .. }
                | AttackArchetype::Dash { .. }
                | AttackArchetype::Roll { .. } => {}
            }
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use crate::abilities::abilities::AbilityTable;
        use crate::collision::collision::CollisionMask;

        fn test_character() -> Character {
            Character::new(
                GameEntityId(1),
                CharacterClass::Bladedancer,
                vec2::new(3200.0, 3200.0),
                0,
                2000,
            )
        }

        #[test]
        fn spawn_protection_expires() {
            let character = test_character();
            assert!(character.is_invulnerable(0));
            assert!(character.is_invulnerable(1999));
            assert!(!character.is_invulnerable(2000));
        }

        #[test]
        fn movement_is_rooted_while_attacking() {
            let collision = CollisionMask::open(100, 100, 64);
            let mut character = test_character();
            let table = AbilityTable::default();
            let spec = table
                .spec(CharacterClass::Bladedancer, AbilityKind::Primary)
                .clone();
            character.begin_attack(AbilityKind::Primary, spec, 0, None);
            character.apply_move(MoveKeys::D, Facing::Right, 0.05, &collision, 20.0);
            assert_eq!(character.core.pos, vec2::new(3200.0, 3200.0));
            // the facing still follows the input
            assert_eq!(character.core.facing, Facing::Right);
        }

        #[test]
        fn cooldown_deadlines() {
            let mut cooldowns = AttackCooldowns::default();
            cooldowns.set(AbilityKind::Primary, 500);
            assert!(!cooldowns.ready(AbilityKind::Primary, 499));
            assert!(cooldowns.ready(AbilityKind::Primary, 500));
            assert_eq!(cooldowns.remaining_ms(AbilityKind::Primary, 300), 200);
        }

        #[test]
        fn translate_covers_the_full_distance() {
            let collision = CollisionMask::open(100, 100, 64);
            let mut character = test_character();
            let spec = AbilitySpec {
                archetype: AttackArchetype::Dash {
                    distance: 120.0,
                    i_frames: true,
                },
                windup_ms: 0,
                active_ms: 200,
                recovery_ms: 100,
                cooldown_ms: 3000,
                damage: 0,
                lag_compensated: false,
            };
            character.core.facing = Facing::Right;
            character.begin_attack(AbilityKind::Secondary, spec, 0, None);
            if let Some(attack) = &mut character.attack {
                attack.phase = AttackPhase::Active;
            }
            for _ in 0..4 {
                character.translate_step(50, &collision, 20.0);
            }
            assert_eq!(character.core.pos, vec2::new(3320.0, 3200.0));
        }
    }
}
