use math::math::vector::vec2;
use serde::{Deserialize, Serialize};

use crate::types::{
    character::{CharacterClass, Facing},
    game::GameEntityId,
    monster::MonsterType,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Monster,
    Projectile,
    Powerup,
}

/// why an entity left the world. carried by despawn events so
/// clients can pick death/impact effects without guessing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DespawnReason {
    Expired,
    Hit,
    Died,
    PickedUp,
    Disconnected,
}

/// the attack shape a windup telegraphs to clients
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", rename_all_fields = "camelCase", tag = "shape")]
pub enum TelegraphShape {
    Rect { length: f32, width: f32 },
    Cone { range: f32, angle_deg: f32 },
}

/// everything the server broadcasts besides state snapshots.
/// all of these are classified reliable by the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    Damage {
        target_id: GameEntityId,
        attacker_id: Option<GameEntityId>,
        amount: u32,
    },
    EntitySpawn {
        id: GameEntityId,
        kind: EntityKind,
        monster_type: Option<MonsterType>,
        pos: vec2,
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
        pos: vec2,
        facing: Facing,
        shape: TelegraphShape,
        windup_ms: u64,
    },
}
