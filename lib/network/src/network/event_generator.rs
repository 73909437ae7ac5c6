use std::time::Duration;

use async_trait::async_trait;

use super::{connection::NetworkConnectionId, event::NetworkEvent};

/// bridge from the I/O tasks into whatever consumes the messages.
/// implementations enqueue; they must never block the reader for long.
#[async_trait]
pub trait NetworkEventToGameEventGenerator {
    /// one received text frame. `timestamp` is the receive time as a
    /// duration since the network was started.
    async fn generate_from_text(
        &self,
        timestamp: Duration,
        con_id: &NetworkConnectionId,
        text: &str,
    );

    async fn generate_from_network_event(
        &self,
        timestamp: Duration,
        con_id: &NetworkConnectionId,
        network_event: &NetworkEvent,
    );
}
