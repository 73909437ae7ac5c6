use std::time::Duration;

use game_interface::types::{character::CharacterClass, game::GameEntityId};

/// how many undecodable frames a connection gets before it is closed
pub const MALFORMED_DISCONNECT_LIMIT: u32 = 10;

/// one-way latency estimation from ping traffic. the client stamps
/// each ping with its own clock; `receive_time - client_time` is the
/// clock offset plus the one-way trip. the smallest value ever seen
/// approximates the offset at the lowest latency, so the smoothed
/// difference to it tracks how far above the best case we currently
/// are.
#[derive(Debug, Default)]
pub struct PingTracker {
    min_offset_ms: Option<i64>,
    ewma_one_way_ms: f64,
}

impl PingTracker {
    pub fn note_ping(&mut self, server_now_ms: u64, client_time_ms: u64) {
        let offset = server_now_ms as i64 - client_time_ms as i64;
        let min = match self.min_offset_ms {
            Some(min) => min.min(offset),
            None => offset,
        };
        self.min_offset_ms = Some(min);
        let above_best = (offset - min).max(0) as f64;
        self.ewma_one_way_ms = 0.8 * self.ewma_one_way_ms + 0.2 * above_best;
    }

    pub fn one_way_ms(&self) -> u64 {
        self.ewma_one_way_ms as u64
    }
}

/// a client waiting for a free slot. not part of the game yet.
pub struct ServerNetworkQueuedClient {
    pub connect_timestamp: Duration,
}

impl ServerNetworkQueuedClient {
    pub fn new(connect_timestamp: Duration) -> Self {
        Self { connect_timestamp }
    }
}

/// a client that got a slot but has not sent `ready` yet; it may still
/// change its class selection.
pub struct ServerNetworkClient {
    pub connect_timestamp: Duration,
    pub class: CharacterClass,
    pub malformed_count: u32,
}

impl ServerNetworkClient {
    pub fn new(connect_timestamp: Duration) -> Self {
        Self {
            connect_timestamp,
            class: CharacterClass::default(),
            malformed_count: 0,
        }
    }
}

/// a client that is part of the game
pub struct ServerClient {
    pub player_id: GameEntityId,
    pub connect_timestamp: Duration,
    pub ping: PingTracker,
    pub malformed_count: u32,
}

impl ServerClient {
    pub fn new(player_id: GameEntityId, connect_timestamp: Duration) -> Self {
        Self {
            player_id,
            connect_timestamp,
            ping: PingTracker::default(),
            malformed_count: 0,
        }
    }
}
