use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Serialize;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{mpsc, watch},
};
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};

use super::{
    connection::NetworkConnectionId,
    event::NetworkEvent,
    event_generator::NetworkEventToGameEventGenerator,
};

#[derive(Debug, Default, Clone)]
pub struct NetworkServerInitOptions {
    /// drop a connection after this much inbound silence
    pub timeout: Option<Duration>,
    pub max_connections: Option<usize>,
}

impl NetworkServerInitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = Some(max);
        self
    }
}

/// the two outbound lanes of a connection. reliable messages queue up
/// and go out in order; best-effort messages overwrite each other so
/// only the latest one is ever written (snapshots, pongs).
struct ConnectionHandle {
    reliable: mpsc::UnboundedSender<String>,
    best_effort: watch::Sender<Option<String>>,
}

type Connections = Arc<Mutex<HashMap<NetworkConnectionId, ConnectionHandle>>>;

/// WebSocket server transport. owns its tokio runtime; everything the
/// simulation thread calls on this handle is non-blocking.
pub struct Network {
    runtime: Option<tokio::runtime::Runtime>,
    connections: Connections,
    sock_addr: SocketAddr,
}

impl Network {
    pub fn init_server(
        addr: &str,
        game_event_generator: Arc<dyn NetworkEventToGameEventGenerator + Send + Sync>,
        options: Option<NetworkServerInitOptions>,
    ) -> anyhow::Result<(Self, SocketAddr)> {
        let options = options.unwrap_or_default();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let listener = runtime.block_on(TcpListener::bind(addr))?;
        let sock_addr = listener.local_addr()?;
        let connections: Connections = Default::default();

        let accept_connections = connections.clone();
        let start_time = Instant::now();
        runtime.spawn(accept_loop(
            listener,
            game_event_generator,
            accept_connections,
            start_time,
            options,
        ));

        Ok((
            Self {
                runtime: Some(runtime),
                connections,
                sock_addr,
            },
            sock_addr,
        ))
    }

    pub fn sock_addr(&self) -> SocketAddr {
        self.sock_addr
    }

    /// reliable lane: delivered in order or the connection dies
    pub fn send_in_order_to<T: Serialize>(&self, msg: &T, con_id: &NetworkConnectionId) {
        let Ok(text) = serde_json::to_string(msg) else {
            log::error!("dropping unserializable message for {con_id}");
            return;
        };
        if let Some(conn) = self.connections.lock().unwrap().get(con_id) {
            // send errors mean the writer is gone; the disconnect event
            // is already on its way
            let _ = conn.reliable.send(text);
        }
    }

    /// best-effort lane: latest wins, stale payloads are overwritten
    /// before they ever hit the socket
    pub fn send_unordered_to<T: Serialize>(&self, msg: &T, con_id: &NetworkConnectionId) {
        let Ok(text) = serde_json::to_string(msg) else {
            log::error!("dropping unserializable message for {con_id}");
            return;
        };
        if let Some(conn) = self.connections.lock().unwrap().get(con_id) {
            conn.best_effort.send_replace(Some(text));
        }
    }

    /// server-initiated disconnect (anti cheat, protocol violations).
    /// dropping the senders ends the writer task, which closes the
    /// socket; the reader then reports the disconnect upward.
    pub fn kick(&self, con_id: &NetworkConnectionId) {
        self.connections.lock().unwrap().remove(con_id);
    }

    pub fn close(mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_timeout(Duration::from_secs(1));
        }
    }
}

impl Drop for Network {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    game_event_generator: Arc<dyn NetworkEventToGameEventGenerator + Send + Sync>,
    connections: Connections,
    start_time: Instant,
    options: NetworkServerInitOptions,
) {
    let mut next_id: u64 = 1;
    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(res) => res,
            Err(err) => {
                log::warn!("accept failed: {err}");
                continue;
            }
        };
        if let Some(max) = options.max_connections {
            if connections.lock().unwrap().len() >= max {
                log::info!("rejecting {peer_addr}: connection limit reached");
                continue;
            }
        }
        let con_id = NetworkConnectionId(next_id);
        next_id += 1;
        tokio::spawn(handle_connection(
            stream,
            con_id,
            game_event_generator.clone(),
            connections.clone(),
            start_time,
            options.timeout,
        ));
    }
}

async fn writer_task(
    mut sink: SplitSink<WebSocketStream<TcpStream>, Message>,
    mut reliable: mpsc::UnboundedReceiver<String>,
    mut best_effort: watch::Receiver<Option<String>>,
) {
    loop {
        tokio::select! {
            // reliable messages always win the race, order among them
            // is the channel order
            biased;
            msg = reliable.recv() => {
                let Some(text) = msg else { break };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            changed = best_effort.changed() => {
                if changed.is_err() {
                    break;
                }
                let text = best_effort.borrow_and_update().clone();
                if let Some(text) = text {
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
    let _ = sink.close().await;
}

async fn handle_connection(
    stream: TcpStream,
    con_id: NetworkConnectionId,
    game_event_generator: Arc<dyn NetworkEventToGameEventGenerator + Send + Sync>,
    connections: Connections,
    start_time: Instant,
    idle_timeout: Option<Duration>,
) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(err) => {
            log::info!("{con_id}: websocket handshake failed: {err}");
            return;
        }
    };
    let (sink, mut ws_stream) = ws.split();

    let (reliable_tx, reliable_rx) = mpsc::unbounded_channel();
    let (best_effort_tx, best_effort_rx) = watch::channel(None);
    connections.lock().unwrap().insert(
        con_id,
        ConnectionHandle {
            reliable: reliable_tx,
            best_effort: best_effort_tx,
        },
    );
    let writer = tokio::spawn(writer_task(sink, reliable_rx, best_effort_rx));

    game_event_generator
        .generate_from_network_event(start_time.elapsed(), &con_id, &NetworkEvent::Connected)
        .await;

    let reason = loop {
        let next = match idle_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, ws_stream.next()).await {
                Ok(next) => next,
                Err(_) => break "timeout".to_string(),
            },
            None => ws_stream.next().await,
        };
        match next {
            Some(Ok(Message::Text(text))) => {
                game_event_generator
                    .generate_from_text(start_time.elapsed(), &con_id, &text)
                    .await;
            }
            Some(Ok(Message::Close(_))) | None => break "connection closed".to_string(),
            Some(Ok(_)) => {
                // binary/ping/pong frames are not part of the protocol
            }
            Some(Err(err)) => break format!("read error: {err}"),
        }
    };

    connections.lock().unwrap().remove(&con_id);
    writer.abort();
    game_event_generator
        .generate_from_network_event(
            start_time.elapsed(),
            &con_id,
            &NetworkEvent::Disconnected { reason },
        )
        .await;
}
