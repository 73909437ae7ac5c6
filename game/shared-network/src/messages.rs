use game_interface::{
    events::{DespawnReason, EntityKind, GameEvent, TelegraphShape},
    types::{
        character::{CharacterClass, Facing},
        game::GameEntityId,
        input::AbilityKind,
        monster::MonsterType,
    },
};
use serde::{Deserialize, Serialize};
use shared_game::snapshot::snapshot::SnapshotPayload;

/// everything a client may send. raw strings for keys/facing/class —
/// validation into the typed forms happens on the simulation side so
/// a bad value can be counted against the session.
///
/// message tags are snake_case, field names camelCase — the literal
/// wire shape the client predictor speaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientToServerMessage {
    Input {
        sequence: u64,
        timestamp: u64,
        keys: Vec<String>,
        facing: String,
        delta_time: f32,
    },
    AbilityRequest {
        ability: AbilityKind,
        #[serde(default)]
        angle: Option<f32>,
    },
    Ping {
        sequence: u64,
        client_time: u64,
    },
    /// permitted only before `ready`
    ClassSelect {
        class_name: String,
    },
    Ready {},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerToClientMessage {
    /// sent once after the connection is accepted
    WorldInit {
        seed: u64,
        tile_size: u32,
        width: u32,
        height: u32,
        /// flat indices of the solid tiles — the collision mask as
        /// clients reconstruct it
        #[serde(rename = "collisionMaskRef")]
        solid_tiles: Vec<u32>,
    },
    /// the server is full; position in the wait queue
    QueueInfo {
        position: usize,
    },
    State(SnapshotPayload),
    Pong {
        sequence: u64,
        client_time: u64,
        server_time: u64,
    },
    DamageEvent {
        target_id: GameEntityId,
        attacker_id: Option<GameEntityId>,
        amount: u32,
    },
    EntitySpawn {
        id: GameEntityId,
        kind: EntityKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        monster_type: Option<MonsterType>,
        x: f32,
        y: f32,
    },
    EntityDespawn {
        id: GameEntityId,
        kind: EntityKind,
        reason: DespawnReason,
    },
    LevelUp {
        player_id: GameEntityId,
        level: u32,
    },
    PlayerDied {
        player_id: GameEntityId,
        killer_id: Option<GameEntityId>,
    },
    PlayerRespawned {
        player_id: GameEntityId,
    },
    PlayerJoined {
        player_id: GameEntityId,
        class: CharacterClass,
    },
    PlayerLeft {
        player_id: GameEntityId,
    },
    AbilityTelegraph {
        source_id: GameEntityId,
        x: f32,
        y: f32,
        facing: Facing,
        #[serde(flatten)]
        shape: TelegraphShape,
        windup_ms: u64,
    },
}

impl ServerToClientMessage {
    /// the event reliability classifier: snapshots and pongs are
    /// best-effort (latest wins), everything else must arrive in order
    pub fn is_reliable(&self) -> bool {
        !matches!(
            self,
            ServerToClientMessage::State(_) | ServerToClientMessage::Pong { .. }
        )
    }
}

impl From<GameEvent> for ServerToClientMessage {
    fn from(ev: GameEvent) -> Self {
        match ev {
            GameEvent::Damage {
                target_id,
                attacker_id,
                amount,
            } => ServerToClientMessage::DamageEvent {
                target_id,
                attacker_id,
                amount,
            },
            GameEvent::EntitySpawn {
                id,
                kind,
                monster_type,
                pos,
            } => ServerToClientMessage::EntitySpawn {
                id,
                kind,
                monster_type,
                x: pos.x,
                y: pos.y,
            },
            GameEvent::EntityDespawn { id, kind, reason } => {
                ServerToClientMessage::EntityDespawn { id, kind, reason }
            }
            GameEvent::LevelUp { player_id, level } => {
                ServerToClientMessage::LevelUp { player_id, level }
            }
            GameEvent::PlayerDied {
                player_id,
                killer_id,
            } => ServerToClientMessage::PlayerDied {
                player_id,
                killer_id,
            },
            GameEvent::PlayerRespawned { player_id } => {
                ServerToClientMessage::PlayerRespawned { player_id }
            }
            GameEvent::PlayerJoined { player_id, class } => {
                ServerToClientMessage::PlayerJoined { player_id, class }
            }
            GameEvent::PlayerLeft { player_id } => {
                ServerToClientMessage::PlayerLeft { player_id }
            }
            GameEvent::AbilityTelegraph {
                source_id,
                pos,
                facing,
                shape,
                windup_ms,
            } => ServerToClientMessage::AbilityTelegraph {
                source_id,
                x: pos.x,
                y: pos.y,
                facing,
                shape,
                windup_ms,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn input_messages_decode_and_drop_unknown_fields() {
        let raw = r#"{
            "type": "input",
            "sequence": 12,
            "timestamp": 3400,
            "keys": ["w", "d"],
            "facing": "up-right",
            "deltaTime": 0.05,
            "some_modded_field": true
        }"#;
        let msg: ClientToServerMessage = serde_json::from_str(raw).unwrap();
        match msg {
            ClientToServerMessage::Input {
                sequence,
                keys,
                facing,
                delta_time,
                ..
            } => {
                assert_eq!(sequence, 12);
                assert_eq!(keys, vec!["w".to_string(), "d".to_string()]);
                assert_eq!(facing, "up-right");
                assert!((delta_time - 0.05).abs() < f32::EPSILON);
            }
            other => panic!("decoded the wrong variant: {other:?}"),
        }
    }

    #[test]
    fn ability_requests_accept_optional_angles() {
        let msg: ClientToServerMessage =
            serde_json::from_str(r#"{"type": "ability_request", "ability": "primary"}"#).unwrap();
        assert!(matches!(
            msg,
            ClientToServerMessage::AbilityRequest {
                ability: AbilityKind::Primary,
                angle: None
            }
        ));
        let msg: ClientToServerMessage = serde_json::from_str(
            r#"{"type": "ability_request", "ability": "roll", "angle": 1.25}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            ClientToServerMessage::AbilityRequest {
                ability: AbilityKind::Roll,
                angle: Some(_)
            }
        ));
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let pong = serde_json::to_value(ServerToClientMessage::Pong {
            sequence: 7,
            client_time: 120,
            server_time: 4500,
        })
        .unwrap();
        assert_eq!(pong["type"], "pong");
        assert_eq!(pong["clientTime"], 120);
        assert_eq!(pong["serverTime"], 4500);
        assert!(pong.get("client_time").is_none());

        let init = serde_json::to_value(ServerToClientMessage::WorldInit {
            seed: 9,
            tile_size: 64,
            width: 100,
            height: 100,
            solid_tiles: vec![1, 2],
        })
        .unwrap();
        assert_eq!(init["type"], "world_init");
        assert_eq!(init["tileSize"], 64);
        assert_eq!(init["collisionMaskRef"], serde_json::json!([1, 2]));

        let telegraph = serde_json::to_value(ServerToClientMessage::AbilityTelegraph {
            source_id: GameEntityId(3),
            x: 10.0,
            y: 20.0,
            facing: Facing::DownLeft,
            shape: TelegraphShape::Cone {
                range: 70.0,
                angle_deg: 90.0,
            },
            windup_ms: 250,
        })
        .unwrap();
        assert_eq!(telegraph["type"], "ability_telegraph");
        assert_eq!(telegraph["sourceId"], 3);
        assert_eq!(telegraph["facing"], "down-left");
        assert_eq!(telegraph["shape"], "cone");
        assert_eq!(telegraph["angleDeg"], 90.0);
        assert_eq!(telegraph["windupMs"], 250);

        let died = serde_json::to_value(ServerToClientMessage::PlayerDied {
            player_id: GameEntityId(4),
            killer_id: Some(GameEntityId(5)),
        })
        .unwrap();
        assert_eq!(died["type"], "player_died");
        assert_eq!(died["playerId"], 4);
        assert_eq!(died["killerId"], 5);

        // and the client side decodes the same convention
        let msg: ClientToServerMessage = serde_json::from_str(
            r#"{"type": "class_select", "className": "hunter"}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientToServerMessage::ClassSelect { class_name } if class_name == "hunter"));
        let msg: ClientToServerMessage =
            serde_json::from_str(r#"{"type": "ping", "sequence": 1, "clientTime": 99}"#).unwrap();
        assert!(matches!(
            msg,
            ClientToServerMessage::Ping {
                sequence: 1,
                client_time: 99
            }
        ));
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(serde_json::from_str::<ClientToServerMessage>(r#"{"type": "input"}"#).is_err());
        assert!(serde_json::from_str::<ClientToServerMessage>("not json").is_err());
        assert!(
            serde_json::from_str::<ClientToServerMessage>(r#"{"type": "rcon", "cmd": "x"}"#)
                .is_err()
        );
    }

    #[test]
    fn reliability_classifier() {
        let state = ServerToClientMessage::State(SnapshotPayload {
            tick: 1,
            server_time: 50,
            last_processed_seq: 0,
            entities: Vec::new(),
            projectiles: Vec::new(),
        });
        assert!(!state.is_reliable());
        assert!(!ServerToClientMessage::Pong {
            sequence: 1,
            client_time: 2,
            server_time: 3
        }
        .is_reliable());
        assert!(ServerToClientMessage::PlayerLeft {
            player_id: GameEntityId(4)
        }
        .is_reliable());
        assert!(ServerToClientMessage::DamageEvent {
            target_id: GameEntityId(4),
            attacker_id: None,
            amount: 2
        }
        .is_reliable());
    }
}
