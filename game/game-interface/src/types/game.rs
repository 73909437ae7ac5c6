use serde::{Deserialize, Serialize};

/// the id of any kind of identifiable game resource,
/// be it players, monsters, projectiles or powerups
#[derive(
    Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Default,
)]
pub struct GameEntityId(pub u64);

impl std::fmt::Display for GameEntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type GameTickType = u64;

/// monotonic milliseconds since the game state was created.
/// the simulation derives this from the tick counter, never from
/// the wall clock, so that seeded runs stay reproducible.
pub type GameTimeMs = u64;
