pub mod snapshot {
    use game_interface::{
        events::EntityKind,
        types::{
            character::{CharacterClass, Facing},
            game::GameEntityId,
            input::AbilityKind,
            monster::MonsterType,
        },
    };
    use math::math::{distance_squared, vector::vec2};
    use rustc_hash::{FxHashMap, FxHashSet};
    use serde::{Deserialize, Serialize};
    use serde_json::{Map, Value};

    use crate::{
        entities::{
            character::character::Character,
            monster::monster::{Monster, MonsterAiState},
            powerup::powerup::{Powerup, PowerupType},
            projectile::projectile::{OwnerKind, Projectile},
        },
        world::world::GameWorld,
    };

    /// positions closer than this count as unchanged in deltas
    pub const POSITION_EPSILON: f32 = 0.01;

    fn val<T: Serialize>(v: &T) -> Value {
        serde_json::to_value(v).unwrap_or(Value::Null)
    }

    fn moved(a: f32, b: f32) -> bool {
        (a - b).abs() > POSITION_EPSILON
    }

    /// wire field set of a player entity
    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PlayerFields {
        pub x: f32,
        pub y: f32,
        pub vel_x: f32,
        pub vel_y: f32,
        pub facing: Facing,
        pub class: CharacterClass,
        pub hp: u32,
        pub max_hp: u32,
        pub level: u32,
        pub experience: u64,
        pub kill_count: u32,
        pub is_dead: bool,
        pub is_invulnerable: bool,
        pub is_attacking: bool,
        pub current_attack: Option<AbilityKind>,
        pub roll_unlocked: bool,
        pub last_processed_seq: u64,
    }

    impl PlayerFields {
        pub fn capture(character: &Character, now_ms: u64) -> Self {
            Self {
                x: character.core.pos.x,
                y: character.core.pos.y,
                vel_x: character.core.vel.x,
                vel_y: character.core.vel.y,
                facing: character.core.facing,
                class: character.class,
                hp: character.hp,
                max_hp: character.max_hp,
                level: character.level,
                experience: character.experience,
                kill_count: character.kill_count,
                is_dead: character.is_dead,
                is_invulnerable: character.is_invulnerable(now_ms),
                is_attacking: character.is_attacking(),
                current_attack: character.current_attack_type(),
                roll_unlocked: character.roll_unlocked,
                last_processed_seq: character.last_processed_seq,
            }
        }

        /// changed fields plus the critical set. the critical fields
        /// (position, hp, facing, death and invulnerability state, and
        /// the ack for the own player) ship in every delta so a client
        /// that lost a packet converges without a full snapshot.
        fn write_delta(&self, last: &Self, own: bool) -> Map<String, Value> {
            let mut out = Map::new();
            out.insert("x".into(), val(&self.x));
            out.insert("y".into(), val(&self.y));
            out.insert("hp".into(), val(&self.hp));
            out.insert("facing".into(), val(&self.facing));
            out.insert("isDead".into(), val(&self.is_dead));
            out.insert("isInvulnerable".into(), val(&self.is_invulnerable));
            if own || self.last_processed_seq != last.last_processed_seq {
                out.insert("lastProcessedSeq".into(), val(&self.last_processed_seq));
            }
            if moved(self.vel_x, last.vel_x) {
                out.insert("velX".into(), val(&self.vel_x));
            }
            if moved(self.vel_y, last.vel_y) {
                out.insert("velY".into(), val(&self.vel_y));
            }
            if self.class != last.class {
                out.insert("class".into(), val(&self.class));
            }
            if self.max_hp != last.max_hp {
                out.insert("maxHp".into(), val(&self.max_hp));
            }
            if self.level != last.level {
                out.insert("level".into(), val(&self.level));
            }
            if self.experience != last.experience {
                out.insert("experience".into(), val(&self.experience));
            }
            if self.kill_count != last.kill_count {
                out.insert("killCount".into(), val(&self.kill_count));
            }
            if self.is_attacking != last.is_attacking {
                out.insert("isAttacking".into(), val(&self.is_attacking));
            }
            if self.current_attack != last.current_attack {
                out.insert("currentAttack".into(), val(&self.current_attack));
            }
            if self.roll_unlocked != last.roll_unlocked {
                out.insert("rollUnlocked".into(), val(&self.roll_unlocked));
            }
            out
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MonsterFields {
        pub x: f32,
        pub y: f32,
        pub facing: Facing,
        pub monster_type: MonsterType,
        pub hp: u32,
        pub max_hp: u32,
        pub state: MonsterAiState,
        pub alive: bool,
    }

    impl MonsterFields {
        pub fn capture(monster: &Monster) -> Self {
            Self {
                x: monster.core.pos.x,
                y: monster.core.pos.y,
                facing: monster.core.facing,
                monster_type: monster.ty,
                hp: monster.hp,
                max_hp: monster.max_hp,
                state: monster.state,
                alive: monster.alive,
            }
        }

        fn write_delta(&self, last: &Self) -> Map<String, Value> {
            let mut out = Map::new();
            out.insert("x".into(), val(&self.x));
            out.insert("y".into(), val(&self.y));
            out.insert("hp".into(), val(&self.hp));
            out.insert("facing".into(), val(&self.facing));
            out.insert("alive".into(), val(&self.alive));
            if self.monster_type != last.monster_type {
                out.insert("monsterType".into(), val(&self.monster_type));
            }
            if self.max_hp != last.max_hp {
                out.insert("maxHp".into(), val(&self.max_hp));
            }
            if self.state != last.state {
                out.insert("state".into(), val(&self.state));
            }
            out
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProjectileFields {
        pub x: f32,
        pub y: f32,
        pub angle: f32,
        pub speed: f32,
        pub effect_tag: String,
        pub owner_id: GameEntityId,
        pub owner_kind: OwnerKind,
    }

    impl ProjectileFields {
        pub fn capture(projectile: &Projectile) -> Self {
            Self {
                x: projectile.pos.x,
                y: projectile.pos.y,
                angle: projectile.angle,
                speed: projectile.speed,
                effect_tag: projectile.effect_tag.clone(),
                owner_id: projectile.owner_id,
                owner_kind: projectile.owner_kind,
            }
        }

        fn write_delta(&self, last: &Self) -> Map<String, Value> {
            let mut out = Map::new();
            out.insert("x".into(), val(&self.x));
            out.insert("y".into(), val(&self.y));
            if moved(self.angle, last.angle) {
                out.insert("angle".into(), val(&self.angle));
            }
            if moved(self.speed, last.speed) {
                out.insert("speed".into(), val(&self.speed));
            }
            out
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PowerupFields {
        pub x: f32,
        pub y: f32,
        pub powerup_type: PowerupType,
    }

    impl PowerupFields {
        pub fn capture(powerup: &Powerup) -> Self {
            Self {
                x: powerup.pos.x,
                y: powerup.pos.y,
                powerup_type: powerup.ty,
            }
        }

        fn write_delta(&self, _last: &Self) -> Map<String, Value> {
            let mut out = Map::new();
            out.insert("x".into(), val(&self.x));
            out.insert("y".into(), val(&self.y));
            out
        }
    }

    /// what the per-client cache remembers about one entity
    #[derive(Debug, Clone, PartialEq)]
    pub enum EntityFields {
        Player(PlayerFields),
        Monster(MonsterFields),
        Projectile(ProjectileFields),
        Powerup(PowerupFields),
    }

    impl EntityFields {
        pub fn kind(&self) -> EntityKind {
            match self {
                EntityFields::Player(_) => EntityKind::Player,
                EntityFields::Monster(_) => EntityKind::Monster,
                EntityFields::Projectile(_) => EntityKind::Projectile,
                EntityFields::Powerup(_) => EntityKind::Powerup,
            }
        }

        pub fn pos(&self) -> vec2 {
            match self {
                EntityFields::Player(f) => vec2::new(f.x, f.y),
                EntityFields::Monster(f) => vec2::new(f.x, f.y),
                EntityFields::Projectile(f) => vec2::new(f.x, f.y),
                EntityFields::Powerup(f) => vec2::new(f.x, f.y),
            }
        }

        fn to_full(&self) -> Map<String, Value> {
            let value = match self {
                EntityFields::Player(f) => val(f),
                EntityFields::Monster(f) => val(f),
                EntityFields::Projectile(f) => val(f),
                EntityFields::Powerup(f) => val(f),
            };
            match value {
                Value::Object(map) => map,
                _ => Map::new(),
            }
        }

        fn write_delta(&self, last: &Self, own: bool) -> Map<String, Value> {
            match (self, last) {
                (EntityFields::Player(cur), EntityFields::Player(last)) => {
                    cur.write_delta(last, own)
                }
                (EntityFields::Monster(cur), EntityFields::Monster(last)) => {
                    cur.write_delta(last)
                }
                (EntityFields::Projectile(cur), EntityFields::Projectile(last)) => {
                    cur.write_delta(last)
                }
                (EntityFields::Powerup(cur), EntityFields::Powerup(last)) => {
                    cur.write_delta(last)
                }
                // the id was reused across kinds — resend everything
                _ => self.to_full(),
            }
        }
    }

    #[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum UpdateType {
        Full,
        Delta,
        Leave,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UpdateRecord {
        pub id: GameEntityId,
        pub kind: EntityKind,
        pub update_type: UpdateType,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        pub fields: Map<String, Value>,
    }

    /// one per-client `state` message
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SnapshotPayload {
        pub tick: u64,
        pub server_time: u64,
        pub last_processed_seq: u64,
        pub entities: Vec<UpdateRecord>,
        pub projectiles: Vec<UpdateRecord>,
    }

    /// the per-client side of the optimizer: everything this client
    /// was last told, per entity. touched only on the simulation
    /// thread, dropped with the connection.
    #[derive(Debug, Default)]
    pub struct ClientSnapshotState {
        last_sent: FxHashMap<GameEntityId, EntityFields>,
    }

    impl ClientSnapshotState {
        pub fn knows(&self, id: &GameEntityId) -> bool {
            self.last_sent.contains_key(id)
        }
    }

    /// builds the payload for one client: interest filtering by view
    /// distance (squared euclidean, the own player is always in),
    /// full records for new entities, critical-set deltas for known
    /// ones, leave records for entities that fell out of view.
    pub fn build_for(
        client_player_id: GameEntityId,
        client: &mut ClientSnapshotState,
        world: &GameWorld,
        tick: u64,
        server_time_ms: u64,
        view_distance: f32,
    ) -> SnapshotPayload {
        let mut payload = SnapshotPayload {
            tick,
            server_time: server_time_ms,
            last_processed_seq: 0,
            entities: Vec::new(),
            projectiles: Vec::new(),
        };
        let Some(own) = world.characters().get(&client_player_id) else {
            return payload;
        };
        payload.last_processed_seq = own.last_processed_seq;
        let center = own.core.pos;
        let view_sq = view_distance * view_distance;
        let in_view = |pos: &vec2| distance_squared(&center, pos) <= view_sq;

        let mut current: Vec<(GameEntityId, EntityFields)> = Vec::new();
        for (id, character) in world.characters().iter() {
            if *id == client_player_id || in_view(&character.core.pos) {
                current.push((
                    *id,
                    EntityFields::Player(PlayerFields::capture(character, server_time_ms)),
                ));
            }
        }
        for (id, monster) in world.monsters().iter() {
            if in_view(&monster.core.pos) {
                current.push((*id, EntityFields::Monster(MonsterFields::capture(monster))));
            }
        }
        for (id, powerup) in world.powerups().iter() {
            if in_view(&powerup.pos) {
                current.push((*id, EntityFields::Powerup(PowerupFields::capture(powerup))));
            }
        }
        for (id, projectile) in world.projectiles().iter() {
            if in_view(&projectile.pos) {
                current.push((
                    *id,
                    EntityFields::Projectile(ProjectileFields::capture(projectile)),
                ));
            }
        }

        let mut relevant_ids: FxHashSet<GameEntityId> = FxHashSet::default();
        for (id, fields) in current {
            relevant_ids.insert(id);
            let own_record = id == client_player_id;
            let record = match client.last_sent.get(&id) {
                None => UpdateRecord {
                    id,
                    kind: fields.kind(),
                    update_type: UpdateType::Full,
                    fields: fields.to_full(),
                },
                Some(last) => UpdateRecord {
                    id,
                    kind: fields.kind(),
                    update_type: UpdateType::Delta,
                    fields: fields.write_delta(last, own_record),
                },
            };
            match fields.kind() {
                EntityKind::Projectile => payload.projectiles.push(record),
                _ => payload.entities.push(record),
            }
            client.last_sent.insert(id, fields);
        }

        // entities this client knew about that are no longer relevant
        let mut left: Vec<(GameEntityId, EntityKind)> = client
            .last_sent
            .iter()
            .filter(|(id, _)| !relevant_ids.contains(id))
            .map(|(id, fields)| (*id, fields.kind()))
            .collect();
        left.sort_by_key(|(id, _)| *id);
        for (id, kind) in left {
            client.last_sent.remove(&id);
            let record = UpdateRecord {
                id,
                kind,
                update_type: UpdateType::Leave,
                fields: Map::new(),
            };
            match kind {
                EntityKind::Projectile => payload.projectiles.push(record),
                _ => payload.entities.push(record),
            }
        }

        payload
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use crate::entities::character::character::Character;
        use game_interface::types::character::CharacterClass;

        fn sample_player_fields() -> PlayerFields {
            let character = Character::new(
                GameEntityId(1),
                CharacterClass::Hunter,
                vec2::new(100.0, 200.0),
                0,
                0,
            );
            PlayerFields::capture(&character, 0)
        }

        #[test]
        fn full_records_use_the_camel_case_wire_names() {
            let fields = EntityFields::Player(sample_player_fields()).to_full();
            for key in [
                "x",
                "y",
                "velX",
                "velY",
                "facing",
                "class",
                "hp",
                "maxHp",
                "level",
                "experience",
                "killCount",
                "isDead",
                "isInvulnerable",
                "isAttacking",
                "currentAttack",
                "rollUnlocked",
                "lastProcessedSeq",
            ] {
                assert!(fields.contains_key(key), "missing wire field {key}");
            }
            assert!(!fields.contains_key("is_dead"));
            assert!(!fields.contains_key("last_processed_seq"));
        }

        #[test]
        fn deltas_use_the_camel_case_wire_names() {
            let last = sample_player_fields();
            let mut cur = last.clone();
            cur.hp = 2;
            let delta = cur.write_delta(&last, true);
            for key in ["x", "y", "hp", "facing", "isDead", "isInvulnerable", "lastProcessedSeq"] {
                assert!(delta.contains_key(key), "missing critical field {key}");
            }
            assert!(!delta.contains_key("maxHp"));
        }

        #[test]
        fn payload_and_records_serialize_camel_case() {
            let payload = SnapshotPayload {
                tick: 3,
                server_time: 150,
                last_processed_seq: 12,
                entities: vec![UpdateRecord {
                    id: GameEntityId(8),
                    kind: EntityKind::Monster,
                    update_type: UpdateType::Leave,
                    fields: Map::new(),
                }],
                projectiles: Vec::new(),
            };
            let value = serde_json::to_value(&payload).unwrap();
            assert_eq!(value["serverTime"], 150);
            assert_eq!(value["lastProcessedSeq"], 12);
            assert_eq!(value["entities"][0]["updateType"], "leave");
            assert_eq!(value["entities"][0]["kind"], "monster");
            assert!(value.get("server_time").is_none());
            assert!(value["entities"][0].get("update_type").is_none());
        }
    }
}
