pub mod damage {
    use game_interface::events::{DespawnReason, EntityKind, GameEvent};

    use crate::{
        config::config::GameConfig,
        entities::{
            character::character::{Character, Characters, MAX_LEVEL},
            monster::monster::Monsters,
        },
        events::events::{DamageRequest, SimulationEvents},
    };

    /// cumulative experience required to hold `level`:
    /// 20 xp for 1 -> 2, 40 more for 2 -> 3, and so on
    pub fn total_xp_for_level(level: u32) -> u64 {
        let l = level as u64;
        10 * l * l.saturating_sub(1)
    }

    /// the single entry point for hp changes from combat. every queued
    /// request of a tick runs through here, in queue order.
    pub fn process(
        characters: &mut Characters,
        monsters: &mut Monsters,
        events: &mut SimulationEvents,
        requests: Vec<DamageRequest>,
        now_ms: u64,
        config: &GameConfig,
    ) {
        for req in requests {
            apply(characters, monsters, events, &req, now_ms, config);
        }
    }

    fn apply(
        characters: &mut Characters,
        monsters: &mut Monsters,
        events: &mut SimulationEvents,
        req: &DamageRequest,
        now_ms: u64,
        config: &GameConfig,
    ) {
        if let Some(target) = characters.get_mut(&req.target_id) {
            if target.is_dead || target.is_invulnerable(now_ms) {
                return;
            }
            target.hp = target.hp.saturating_sub(req.amount);
            events.push_event(GameEvent::Damage {
                target_id: req.target_id,
                attacker_id: req.attacker_id,
                amount: req.amount,
            });
            if target.hp == 0 {
                target.is_dead = true;
                target.cancel_attack();
                target.core.vel = Default::default();
                target.respawn_at = Some(now_ms + config.respawn_delay_ms);
                events.push_event(GameEvent::PlayerDied {
                    player_id: req.target_id,
                    killer_id: req.attacker_id,
                });
            }
            return;
        }

        let Some(monster) = monsters.get_mut(&req.target_id) else {
            // target despawned earlier this tick, the hit fizzles
            return;
        };
        if !monster.alive {
            return;
        }
        monster.hp = monster.hp.saturating_sub(req.amount);
        events.push_event(GameEvent::Damage {
            target_id: req.target_id,
            attacker_id: req.attacker_id,
            amount: req.amount,
        });
        if monster.hp == 0 {
            let xp = monster.stats().xp_reward;
            monster.start_dying(now_ms);
            events.push_event(GameEvent::EntityDespawn {
                id: req.target_id,
                kind: EntityKind::Monster,
                reason: DespawnReason::Died,
            });
            if let Some(attacker_id) = req.attacker_id {
                if let Some(player) = characters.get_mut(&attacker_id) {
                    player.kill_count += 1;
                    award_experience(player, xp, events);
                }
            }
        }
    }

    /// xp intake plus the level-up loop. each gained level restores hp
    /// to the (possibly raised) maximum.
    pub fn award_experience(player: &mut Character, xp: u64, events: &mut SimulationEvents) {
        player.experience += xp;
        while player.level < MAX_LEVEL && player.experience >= total_xp_for_level(player.level + 1)
        {
            player.level += 1;
            apply_level_bonus(player);
            player.hp = player.max_hp;
            events.push_event(GameEvent::LevelUp {
                player_id: player.base.id,
                level: player.level,
            });
        }
    }

    fn apply_level_bonus(player: &mut Character) {
        match player.level {
            // speed at 2 and 6 lives in the movement kernel's level bonus
            3 | 7 => player.attack_recovery_bonus += 0.1,
            4 | 8 => player.attack_cooldown_bonus += 0.1,
            5 => player.roll_unlocked = true,
            10 => player.max_hp += 1,
            _ => {}
        }
    }

    /// heal from powerups. dead players stay dead, overheal clamps.
    pub fn heal(player: &mut Character, amount: u32) {
        if player.is_dead {
            return;
        }
        player.hp = (player.hp + amount).min(player.max_hp);
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use game_interface::types::{
            character::CharacterClass, game::GameEntityId, monster::MonsterType,
        };
        use math::math::vector::vec2;

        use crate::entities::monster::monster::{Monster, MonsterAiState};

        fn setup() -> (Characters, Monsters, SimulationEvents, GameConfig) {
            let mut characters = Characters::default();
            let player = Character::new(
                GameEntityId(1),
                CharacterClass::Guardian,
                vec2::new(1000.0, 1000.0),
                0,
                0,
            );
            characters.insert(GameEntityId(1), player);
            let mut monsters = Monsters::default();
            monsters.insert(
                GameEntityId(10),
                Monster::new(GameEntityId(10), MonsterType::Wolf, vec2::new(1100.0, 1000.0)),
            );
            (
                characters,
                monsters,
                SimulationEvents::default(),
                GameConfig::default(),
            )
        }

        #[test]
        fn hp_clamps_at_zero_and_death_is_marked() {
            let (mut characters, mut monsters, mut events, config) = setup();
            let requests = vec![DamageRequest {
                target_id: GameEntityId(1),
                attacker_id: Some(GameEntityId(10)),
                amount: 100,
            }];
            process(
                &mut characters,
                &mut monsters,
                &mut events,
                requests,
                5000,
                &config,
            );
            let player = characters.get(&GameEntityId(1)).unwrap();
            assert_eq!(player.hp, 0);
            assert!(player.is_dead);
            assert_eq!(player.respawn_at, Some(5000 + config.respawn_delay_ms));
            let evs = events.take_events();
            assert!(evs.iter().any(|ev| matches!(ev, GameEvent::Damage { .. })));
            assert!(evs
                .iter()
                .any(|ev| matches!(ev, GameEvent::PlayerDied { .. })));
        }

        #[test]
        fn invulnerable_targets_discard_damage() {
            let (mut characters, mut monsters, mut events, config) = setup();
            characters
                .get_mut(&GameEntityId(1))
                .unwrap()
                .spawn_protected_until = 10_000;
            process(
                &mut characters,
                &mut monsters,
                &mut events,
                vec![DamageRequest {
                    target_id: GameEntityId(1),
                    attacker_id: None,
                    amount: 3,
                }],
                5000,
                &config,
            );
            assert_eq!(characters.get(&GameEntityId(1)).unwrap().hp, 8);
            assert!(events.take_events().is_empty());
        }

        #[test]
        fn monster_death_awards_xp_and_kill_count() {
            let (mut characters, mut monsters, mut events, config) = setup();
            process(
                &mut characters,
                &mut monsters,
                &mut events,
                vec![DamageRequest {
                    target_id: GameEntityId(10),
                    attacker_id: Some(GameEntityId(1)),
                    amount: 5,
                }],
                1000,
                &config,
            );
            let monster = monsters.get(&GameEntityId(10)).unwrap();
            assert!(!monster.alive);
            assert_eq!(monster.state, MonsterAiState::Dying);
            let player = characters.get(&GameEntityId(1)).unwrap();
            assert_eq!(player.kill_count, 1);
            // wolf xp reward
            assert_eq!(player.experience, 15);
        }

        #[test]
        fn level_curve_and_bonuses() {
            let (mut characters, _, mut events, _) = setup();
            let player = characters.get_mut(&GameEntityId(1)).unwrap();
            assert_eq!(total_xp_for_level(2), 20);
            assert_eq!(total_xp_for_level(3), 60);

            award_experience(player, 20, &mut events);
            assert_eq!(player.level, 2);

            // straight to roll unlock at level 5
            award_experience(player, total_xp_for_level(5) - player.experience, &mut events);
            assert_eq!(player.level, 5);
            assert!(player.roll_unlocked);
            assert!((player.attack_recovery_bonus - 0.1).abs() < f32::EPSILON);
            assert!((player.attack_cooldown_bonus - 0.1).abs() < f32::EPSILON);

            // max level caps and raises max hp
            award_experience(
                player,
                total_xp_for_level(MAX_LEVEL) + 10_000,
                &mut events,
            );
            assert_eq!(player.level, MAX_LEVEL);
            assert_eq!(player.max_hp, 9);
            assert_eq!(player.hp, 9);

            let level_ups = events
                .take_events()
                .into_iter()
                .filter(|ev| matches!(ev, GameEvent::LevelUp { .. }))
                .count();
            assert_eq!(level_ups, (MAX_LEVEL - 1) as usize);
        }

        #[test]
        fn heal_clamps_and_skips_the_dead() {
            let (mut characters, _, _, _) = setup();
            let player = characters.get_mut(&GameEntityId(1)).unwrap();
            player.hp = 3;
            heal(player, 100);
            assert_eq!(player.hp, 8);
            player.is_dead = true;
            player.hp = 0;
            heal(player, 4);
            assert_eq!(player.hp, 0);
        }
    }
}
