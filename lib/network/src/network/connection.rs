use serde::{Deserialize, Serialize};

/// identifies one client connection for its whole lifetime.
/// ids are never reused by a server instance.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NetworkConnectionId(pub u64);

impl std::fmt::Display for NetworkConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "con-{}", self.0)
    }
}
