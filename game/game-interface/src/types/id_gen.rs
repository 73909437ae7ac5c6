use serde::{Deserialize, Serialize};

use super::game::GameEntityId;

const ID_GENERATOR_ID_FIRST: GameEntityId = GameEntityId(1);

/// generates unique ids for all entities of a single game instance.
/// ids are never reused for the lifetime of the instance.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdGenerator {
    cur_id: GameEntityId,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            cur_id: ID_GENERATOR_ID_FIRST,
        }
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> GameEntityId {
        let cur = self.cur_id;
        self.cur_id.0 += 1;
        cur
    }
}
