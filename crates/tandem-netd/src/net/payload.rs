use bytes::Bytes;
use tokio_tungstenite::tungstenite::Message;

/// An application frame carried through a room unmodified.
///
/// Text stays text and binary stays binary, so the receiver sees exactly the frame the
/// sender wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Bytes),
}

impl Payload {
    /// Extract a relayable payload. Control frames (ping/pong/close) yield `None`.
    pub fn from_message(msg: Message) -> Option<Self> {
        match msg {
            Message::Text(text) => Some(Payload::Text(text.as_str().to_owned())),
            Message::Binary(data) => Some(Payload::Binary(data)),
            Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::Text(text) => text.len(),
            Payload::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Payload> for Message {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Text(text) => Message::text(text),
            Payload::Binary(data) => Message::binary(data),
        }
    }
}
