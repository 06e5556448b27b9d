//! Async WebSocket client for the room relay.
//!
//! [`connect`] performs the upgrade and spawns two tasks:
//! - a reader that turns inbound frames into [`RelayEvent`]s
//! - a writer that drains [`RelayClientHandle`] commands onto the socket

use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tandem_netproto::codec::{decode_message, encode_message};
use tandem_netproto::{ConnectParams, Foot, Role, RoomCode, WireMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, trace, warn};

use crate::error::NetplayError;

const EVENT_QUEUE: usize = 256;
const COMMAND_QUEUE: usize = 256;

/// Application data that is not part of the tap convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayData {
    Text(String),
    Binary(Bytes),
}

/// Events delivered by a running relay client.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// The partner seat is occupied by `role`.
    PartnerReady { role: Role },
    /// The partner holding `role` left.
    PartnerLeft { role: Role },
    /// The partner tapped.
    RemoteTap { role: Role, foot: Foot },
    /// Any other payload from the partner.
    Data(RelayData),
    /// The socket is gone; no further events follow.
    Disconnected { reason: String },
}

#[derive(Debug)]
pub(crate) enum ClientCommand {
    Send(Message),
    Close,
}

/// Handle for sending on a running relay client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RelayClientHandle {
    room: RoomCode,
    role: Role,
    cmd_tx: mpsc::Sender<ClientCommand>,
}

impl RelayClientHandle {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn room(&self) -> &RoomCode {
        &self.room
    }

    /// Send one of our own taps as `{"type":"tap","role":..,"foot":..}`.
    pub async fn send_tap(&self, foot: Foot) -> Result<(), NetplayError> {
        let text = encode_message(&WireMessage::Tap {
            role: self.role,
            foot,
        })?;
        self.send(Message::text(text)).await
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), NetplayError> {
        self.send(Message::text(text.into())).await
    }

    pub async fn send_binary(&self, data: impl Into<Bytes>) -> Result<(), NetplayError> {
        self.send(Message::binary(data.into())).await
    }

    /// Close the socket. The reader reports `Disconnected` once the relay acknowledges.
    pub async fn close(&self) -> Result<(), NetplayError> {
        self.cmd_tx
            .send(ClientCommand::Close)
            .await
            .map_err(|_| NetplayError::ChannelSend)
    }

    pub fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }

    async fn send(&self, msg: Message) -> Result<(), NetplayError> {
        self.cmd_tx
            .send(ClientCommand::Send(msg))
            .await
            .map_err(|_| NetplayError::ChannelSend)
    }

    #[cfg(test)]
    pub(crate) fn detached(room: RoomCode, role: Role) -> (Self, mpsc::Receiver<ClientCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE);
        (Self { room, role, cmd_tx }, cmd_rx)
    }
}

/// Build the upgrade URL for `params` on top of `base_url` (`ws://host:port[/path]`).
pub fn relay_url(base_url: &str, params: &ConnectParams) -> Result<String, NetplayError> {
    let rest = base_url
        .strip_prefix("ws://")
        .or_else(|| base_url.strip_prefix("wss://"))
        .ok_or_else(|| NetplayError::InvalidUrl(base_url.to_string()))?;
    let query = params.to_query();
    Ok(if rest.contains('?') {
        format!("{base_url}&{query}")
    } else if rest.contains('/') {
        format!("{base_url}?{query}")
    } else {
        format!("{base_url}/?{query}")
    })
}

/// Join `params.room` as `params.role` on the relay at `base_url`.
///
/// Fails with [`NetplayError::Rejected`] if the relay refuses the upgrade.
pub async fn connect(
    base_url: &str,
    params: &ConnectParams,
) -> Result<(RelayClientHandle, mpsc::Receiver<RelayEvent>), NetplayError> {
    let url = relay_url(base_url, params)?;
    info!(%url, "Connecting to relay");

    let (ws, _resp) = connect_async(url.as_str()).await.map_err(|e| match e {
        tungstenite::Error::Http(resp) => NetplayError::Rejected(resp.status().as_u16()),
        other => NetplayError::ConnectionFailed(other.to_string()),
    })?;

    let (write, read) = ws.split();
    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE);

    tokio::spawn(async move {
        if let Err(e) = writer_loop(write, cmd_rx).await {
            debug!(error = %e, "Relay writer stopped");
        }
    });
    tokio::spawn(reader_loop(read, event_tx, params.role));

    info!(room = %params.room, role = %params.role, "Joined relay room");

    Ok((
        RelayClientHandle {
            room: params.room.clone(),
            role: params.role,
            cmd_tx,
        },
        event_rx,
    ))
}

async fn writer_loop<S>(
    mut sink: S,
    mut cmd_rx: mpsc::Receiver<ClientCommand>,
) -> Result<(), NetplayError>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            ClientCommand::Send(msg) => sink
                .send(msg)
                .await
                .map_err(|e| NetplayError::ConnectionLost(e.to_string()))?,
            ClientCommand::Close => break,
        }
    }
    let _ = sink.close().await;
    Ok(())
}

async fn reader_loop<S>(mut stream: S, event_tx: mpsc::Sender<RelayEvent>, own_role: Role)
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let reason = loop {
        match stream.next().await {
            Some(Ok(Message::Close(frame))) => {
                break frame.map_or_else(|| "closed".to_string(), |f| f.reason.to_string());
            }
            Some(Ok(msg)) => {
                let Some(event) = event_from_message(msg) else {
                    continue;
                };
                trace!(role = %own_role, ?event, "Relay event");
                if event_tx.send(event).await.is_err() {
                    return;
                }
            }
            Some(Err(e)) => {
                warn!(role = %own_role, error = %e, "Relay read failed");
                break e.to_string();
            }
            None => break "closed".to_string(),
        }
    };
    let _ = event_tx.send(RelayEvent::Disconnected { reason }).await;
}

/// Map one inbound frame to an event. Control frames yield `None`.
fn event_from_message(msg: Message) -> Option<RelayEvent> {
    match msg {
        Message::Text(text) => Some(match decode_message(text.as_str()) {
            Ok(WireMessage::PartnerReady { role }) => RelayEvent::PartnerReady { role },
            Ok(WireMessage::Disconnect { role }) => RelayEvent::PartnerLeft { role },
            Ok(WireMessage::Tap { role, foot }) => RelayEvent::RemoteTap { role, foot },
            Err(_) => RelayEvent::Data(RelayData::Text(text.as_str().to_owned())),
        }),
        Message::Binary(data) => Some(RelayEvent::Data(RelayData::Binary(data))),
        _ => None,
    }
}
