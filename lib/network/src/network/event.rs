/// connection-level events the transport reports upward
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    Connected,
    Disconnected {
        reason: String,
    },
}
