use std::{
    collections::VecDeque,
    sync::{atomic::AtomicBool, Arc},
    time::Duration,
};

use async_trait::async_trait;
use network::network::{
    connection::NetworkConnectionId, event::NetworkEvent,
    event_generator::NetworkEventToGameEventGenerator,
};
use tokio::sync::Mutex;

use crate::messages::ClientToServerMessage;

pub enum GameEvents {
    NetworkEvent(NetworkEvent),
    NetworkMsg(ClientToServerMessage),
    /// a frame that did not decode into the closed schema. the server
    /// counts these per session and disconnects past the threshold.
    MalformedMsg {
        error: String,
    },
}

/// queue between the network tasks and the simulation thread. the
/// flag lets the game loop skip the mutex when nothing arrived.
pub struct GameEventGenerator {
    pub events: Mutex<VecDeque<(NetworkConnectionId, Duration, GameEvents)>>,
    pub has_events: Arc<AtomicBool>,
}

impl GameEventGenerator {
    pub fn new(has_events: Arc<AtomicBool>) -> Self {
        GameEventGenerator {
            events: Default::default(),
            has_events,
        }
    }
}

#[async_trait]
impl NetworkEventToGameEventGenerator for GameEventGenerator {
    async fn generate_from_text(
        &self,
        timestamp: Duration,
        con_id: &NetworkConnectionId,
        text: &str,
    ) {
        let event = match serde_json::from_str::<ClientToServerMessage>(text) {
            Ok(msg) => GameEvents::NetworkMsg(msg),
            Err(err) => GameEvents::MalformedMsg {
                error: err.to_string(),
            },
        };
        self.events.lock().await.push_back((*con_id, timestamp, event));
        self.has_events
            .store(true, std::sync::atomic::Ordering::Relaxed);
    }

    async fn generate_from_network_event(
        &self,
        timestamp: Duration,
        con_id: &NetworkConnectionId,
        network_event: &NetworkEvent,
    ) {
        self.events.lock().await.push_back((
            *con_id,
            timestamp,
            GameEvents::NetworkEvent(network_event.clone()),
        ));
        self.has_events
            .store(true, std::sync::atomic::Ordering::Relaxed);
    }
}
