use std::{
    collections::HashMap,
    sync::{atomic::AtomicBool, Arc},
    time::{Duration, Instant},
};

use game_interface::types::{
    character::{CharacterClass, Facing},
    input::{CharacterInput, MoveKeys},
};
use hashlink::LinkedHashMap;
use network::network::{
    connection::NetworkConnectionId,
    event::NetworkEvent,
    network::{Network, NetworkServerInitOptions},
};
use shared_game::{config::config::GameConfig, state::state::MessageOutcome};
use shared_network::{
    game_event_generator::{GameEventGenerator, GameEvents},
    messages::{ClientToServerMessage, ServerToClientMessage},
};

use crate::{
    client::{
        ServerClient, ServerNetworkClient, ServerNetworkQueuedClient, MALFORMED_DISCONNECT_LIMIT,
    },
    server_game::ServerGame,
};

/// connections with no inbound traffic for this long are dropped
const NET_TIMEOUT: Duration = Duration::from_secs(30);

/// catch-up bound: a stalled process never simulates more than this
/// many ticks in one frame
const MAX_CATCH_UP_TICKS: u32 = 5;

pub struct Server {
    /// waiting for a slot, in arrival order
    network_queued_clients: LinkedHashMap<NetworkConnectionId, ServerNetworkQueuedClient>,
    /// got a slot, selecting class / not ready yet
    network_clients: HashMap<NetworkConnectionId, ServerNetworkClient>,
    /// part of the game
    clients: HashMap<NetworkConnectionId, ServerClient>,

    max_players: usize,

    network: Network,

    is_open: Arc<AtomicBool>,
    has_new_events: Arc<AtomicBool>,
    game_event_generator: Arc<GameEventGenerator>,

    game_server: ServerGame,

    config: GameConfig,
    start_time: Instant,
    last_tick_time: Duration,
}

impl Server {
    pub fn new(config: GameConfig, is_open: Arc<AtomicBool>) -> anyhow::Result<Self> {
        let has_new_events = Arc::new(AtomicBool::new(false));
        let game_event_generator = Arc::new(GameEventGenerator::new(has_new_events.clone()));

        let (network, sock_addr) = Network::init_server(
            &format!("0.0.0.0:{}", config.port),
            game_event_generator.clone(),
            Some(
                NetworkServerInitOptions::new()
                    .with_timeout(NET_TIMEOUT)
                    .with_max_connections(config.max_players * 4),
            ),
        )?;
        log::info!("listening on {sock_addr}");

        Ok(Self {
            network_queued_clients: Default::default(),
            network_clients: HashMap::new(),
            clients: HashMap::new(),
            max_players: config.max_players,
            network,
            is_open,
            has_new_events,
            game_event_generator,
            game_server: ServerGame::new(&config),
            config,
            start_time: Instant::now(),
            last_tick_time: Duration::ZERO,
        })
    }

    fn server_time_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// every outgoing message picks its lane via the reliability
    /// classifier: reliable messages go in order, best-effort ones
    /// (snapshots, pongs) ride the latest-wins lane
    fn send_to(&self, msg: &ServerToClientMessage, con_id: &NetworkConnectionId) {
        if msg.is_reliable() {
            self.network.send_in_order_to(msg, con_id);
        } else {
            self.network.send_unordered_to(msg, con_id);
        }
    }

    fn try_client_connect(&mut self, con_id: &NetworkConnectionId, timestamp: Duration) {
        if self.clients.len() + self.network_clients.len() < self.max_players {
            self.network_clients
                .insert(*con_id, ServerNetworkClient::new(timestamp));
            // everything the client needs to join: seed and geometry
            self.send_to(&self.game_server.world_init_msg(), con_id);
        } else {
            self.network_queued_clients
                .insert(*con_id, ServerNetworkQueuedClient::new(timestamp));
            self.send_to(
                &ServerToClientMessage::QueueInfo {
                    position: self.network_queued_clients.len(),
                },
                con_id,
            );
        }
    }

    fn promote_from_queue(&mut self) {
        if self.clients.len() + self.network_clients.len() >= self.max_players {
            return;
        }
        let Some((con_id, queued)) = self.network_queued_clients.pop_front() else {
            return;
        };
        self.try_client_connect(&con_id, queued.connect_timestamp);
        // the rest moved up one position
        for (position, con_id) in self.network_queued_clients.keys().enumerate() {
            self.send_to(
                &ServerToClientMessage::QueueInfo {
                    position: position + 1,
                },
                con_id,
            );
        }
    }

    fn client_disconnect(&mut self, con_id: &NetworkConnectionId, reason: &str) {
        if self.network_queued_clients.remove(con_id).is_some() {
            return;
        }
        if self.network_clients.remove(con_id).is_some() {
            self.promote_from_queue();
            return;
        }
        if let Some(client) = self.clients.remove(con_id) {
            log::info!(
                "player {} disconnected ({reason})",
                client.player_id
            );
            self.game_server.game.player_disconnect(&client.player_id);
            self.promote_from_queue();
        }
    }

    fn note_malformed(&mut self, con_id: &NetworkConnectionId) {
        let count = if let Some(client) = self.clients.get_mut(con_id) {
            client.malformed_count += 1;
            client.malformed_count
        } else if let Some(client) = self.network_clients.get_mut(con_id) {
            client.malformed_count += 1;
            client.malformed_count
        } else {
            return;
        };
        if count > MALFORMED_DISCONNECT_LIMIT {
            log::info!("{con_id}: too many malformed messages, closing");
            self.network.kick(con_id);
        }
    }

    fn handle_message(&mut self, con_id: &NetworkConnectionId, msg: ClientToServerMessage) {
        match msg {
            ClientToServerMessage::Ping {
                sequence,
                client_time,
            } => {
                // answered right here, never waits for the tick
                let server_time = self.server_time_ms();
                self.send_to(
                    &ServerToClientMessage::Pong {
                        sequence,
                        client_time,
                        server_time,
                    },
                    con_id,
                );
                if let Some(client) = self.clients.get_mut(con_id) {
                    client.ping.note_ping(server_time, client_time);
                    let player_id = client.player_id;
                    let one_way = client.ping.one_way_ms();
                    self.game_server
                        .game
                        .set_player_latency(&player_id, one_way);
                }
            }
            ClientToServerMessage::ClassSelect { class_name } => {
                match class_name.parse::<CharacterClass>() {
                    Ok(class) => {
                        if let Some(client) = self.network_clients.get_mut(con_id) {
                            client.class = class;
                        }
                        // after `ready` the selection is locked in
                    }
                    Err(_) => self.note_malformed(con_id),
                }
            }
            ClientToServerMessage::Ready {} => {
                let Some(net_client) = self.network_clients.remove(con_id) else {
                    return;
                };
                let player_id = self.game_server.game.player_join(net_client.class);
                log::info!("{con_id} joined as player {player_id} ({})", net_client.class);
                self.clients.insert(
                    *con_id,
                    ServerClient::new(player_id, net_client.connect_timestamp),
                );
                // a first full snapshot so the client renders before the
                // next tick boundary
                if let Some(payload) = self.game_server.game.build_snapshot_for(&player_id) {
                    self.send_to(&ServerToClientMessage::State(payload), con_id);
                }
            }
            ClientToServerMessage::Input {
                sequence,
                timestamp,
                keys,
                facing,
                delta_time,
            } => {
                let Some(player_id) = self.clients.get(con_id).map(|c| c.player_id) else {
                    return;
                };
                let keys = match MoveKeys::from_key_names(&keys) {
                    Ok(keys) => keys,
                    Err(_) => {
                        self.note_malformed(con_id);
                        return;
                    }
                };
                let facing = match facing.parse::<Facing>() {
                    Ok(facing) => facing,
                    Err(_) => {
                        self.note_malformed(con_id);
                        return;
                    }
                };
                let outcome = self.game_server.game.player_input(
                    &player_id,
                    CharacterInput {
                        sequence,
                        timestamp,
                        keys,
                        facing,
                        delta_time,
                    },
                );
                if outcome == MessageOutcome::CloseSession {
                    self.network.kick(con_id);
                }
            }
            ClientToServerMessage::AbilityRequest { ability, angle } => {
                let Some(player_id) = self.clients.get(con_id).map(|c| c.player_id) else {
                    return;
                };
                let outcome = self
                    .game_server
                    .game
                    .ability_request(&player_id, ability, angle);
                if outcome == MessageOutcome::CloseSession {
                    self.network.kick(con_id);
                }
            }
        }
    }

    /// everything that leaves the server for one finished tick:
    /// anti-cheat kicks, per-client snapshots, reliable events.
    /// snapshots for tick N are handed to the transport before tick
    /// N+1 starts.
    fn after_tick(&mut self) {
        for player_id in self.game_server.game.take_pending_disconnects() {
            let found = self
                .clients
                .iter()
                .find(|(_, client)| client.player_id == player_id)
                .map(|(con_id, _)| *con_id);
            if let Some(con_id) = found {
                log::info!("closing session of player {player_id}: anti-cheat threshold");
                self.network.kick(&con_id);
            }
        }

        let mut snapshots = Vec::with_capacity(self.clients.len());
        for (con_id, client) in self.clients.iter() {
            if let Some(payload) = self.game_server.game.build_snapshot_for(&client.player_id) {
                snapshots.push((*con_id, payload));
            }
        }
        for (con_id, payload) in snapshots {
            self.send_to(&ServerToClientMessage::State(payload), &con_id);
        }

        for ev in self.game_server.game.drain_events() {
            let msg: ServerToClientMessage = ev.into();
            for con_id in self.clients.keys() {
                self.send_to(&msg, con_id);
            }
        }
    }

    fn drain_network_events(&mut self) {
        let drained: Vec<_> = {
            let mut events = self.game_event_generator.events.blocking_lock();
            events.drain(..).collect()
        };
        for (con_id, timestamp, event) in drained {
            match event {
                GameEvents::NetworkEvent(NetworkEvent::Connected) => {
                    self.try_client_connect(&con_id, timestamp);
                }
                GameEvents::NetworkEvent(NetworkEvent::Disconnected { reason }) => {
                    self.client_disconnect(&con_id, &reason);
                }
                GameEvents::NetworkMsg(msg) => self.handle_message(&con_id, msg),
                GameEvents::MalformedMsg { error } => {
                    log::debug!("{con_id}: malformed message: {error}");
                    self.note_malformed(&con_id);
                }
            }
        }
    }

    pub fn run(&mut self) {
        self.last_tick_time = self.start_time.elapsed();
        let target = self.config.tick_interval();
        while self.is_open.load(std::sync::atomic::Ordering::Relaxed) {
            if self
                .has_new_events
                .swap(false, std::sync::atomic::Ordering::SeqCst)
            {
                self.drain_network_events();
            }

            let mut cur = self.start_time.elapsed();
            if cur.saturating_sub(self.last_tick_time) > target * MAX_CATCH_UP_TICKS {
                // a long stall is skipped, not replayed
                self.last_tick_time = cur - target * MAX_CATCH_UP_TICKS;
            }
            while cur.saturating_sub(self.last_tick_time) >= target {
                self.game_server.game.tick();
                self.last_tick_time += target;
                self.after_tick();
                cur = self.start_time.elapsed();
            }

            // short sleeps keep ping replies prompt between ticks
            let since_tick = self.start_time.elapsed().saturating_sub(self.last_tick_time);
            let remaining = target.saturating_sub(since_tick);
            std::thread::sleep(remaining.min(Duration::from_millis(1)));
        }
    }
}

/// process entry used by the binary: runs the loop until `is_open`
/// flips, then tears the transport down.
pub fn game_server_main(config: GameConfig, is_open: Arc<AtomicBool>) -> anyhow::Result<()> {
    let mut server = Server::new(config, is_open)?;
    server.run();
    Ok(())
}
