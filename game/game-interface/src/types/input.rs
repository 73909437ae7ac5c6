use serde::{Deserialize, Serialize};

use super::character::Facing;

bitflags::bitflags! {
    /// the movement key set. everything outside w/a/s/d is rejected
    /// before an input ever reaches the simulation.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MoveKeys: u8 {
        const W = 0b0001;
        const A = 0b0010;
        const S = 0b0100;
        const D = 0b1000;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputKeyError {
    #[error("key \"{0}\" is not part of the allowed key set")]
    UnknownKey(String),
}

impl MoveKeys {
    pub fn from_key_names(keys: &[String]) -> Result<Self, InputKeyError> {
        let mut res = MoveKeys::empty();
        for key in keys {
            res |= match key.as_str() {
                "w" => MoveKeys::W,
                "a" => MoveKeys::A,
                "s" => MoveKeys::S,
                "d" => MoveKeys::D,
                _ => return Err(InputKeyError::UnknownKey(key.clone())),
            };
        }
        Ok(res)
    }

    /// raw axis units before normalization. opposing keys cancel.
    pub fn axes(&self) -> (f32, f32) {
        let mut x = 0.0;
        let mut y = 0.0;
        if self.contains(MoveKeys::A) {
            x -= 1.0;
        }
        if self.contains(MoveKeys::D) {
            x += 1.0;
        }
        if self.contains(MoveKeys::W) {
            y -= 1.0;
        }
        if self.contains(MoveKeys::S) {
            y += 1.0;
        }
        (x, y)
    }
}

/// a single sequenced input record as the client sent it.
/// `delta_time` is the client's frame time in seconds; the sanity
/// bounds on it live in the anti cheat layer.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct CharacterInput {
    pub sequence: u64,
    pub timestamp: u64,
    pub keys: MoveKeys,
    pub facing: Facing,
    pub delta_time: f32,
}

/// which of the three ability slots a request targets
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    Primary,
    Secondary,
    Roll,
}
