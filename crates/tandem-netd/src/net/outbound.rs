use futures_util::{Sink, SinkExt};
use tandem_netproto::WireMessage;
use tandem_netproto::codec::encode_message;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{error, trace};

use super::payload::Payload;

/// Sending half of one connection's outbound queues.
///
/// Relayed frames go through a bounded queue and are dropped when it is full. Control
/// messages the relay originates (`partner-ready`, `disconnect`) use a separate
/// unbounded lane, so presence changes are never lost to backpressure.
#[derive(Debug, Clone)]
pub struct Outbound {
    data: mpsc::Sender<Payload>,
    control: mpsc::UnboundedSender<Payload>,
}

/// Receiving half, owned by the writer task.
#[derive(Debug)]
pub struct OutboundRx {
    data: mpsc::Receiver<Payload>,
    control: mpsc::UnboundedReceiver<Payload>,
}

/// Create the queues for one connection; `capacity` bounds relayed frames only.
pub fn outbound_channel(capacity: usize) -> (Outbound, OutboundRx) {
    let (data_tx, data_rx) = mpsc::channel(capacity);
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    (
        Outbound {
            data: data_tx,
            control: control_tx,
        },
        OutboundRx {
            data: data_rx,
            control: control_rx,
        },
    )
}

impl Outbound {
    /// Queue a relayed frame without waiting. Returns whether it was queued.
    ///
    /// A full queue or a dead connection drops the payload; nothing is retried.
    pub fn send_data(&self, payload: Payload) -> bool {
        match self.data.try_send(payload) {
            Ok(()) => true,
            Err(e) => {
                trace!(error = %e, "Dropped outbound payload");
                false
            }
        }
    }

    /// Encode and queue a relay-originated control message.
    ///
    /// Only fails once the connection's writer is gone.
    pub fn send_control(&self, msg: &WireMessage) -> bool {
        let text = match encode_message(msg) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode control message: {}", e);
                return false;
            }
        };
        self.control.send(Payload::Text(text)).is_ok()
    }
}

impl OutboundRx {
    /// Next frame to write, control lane first. `None` once every sender is dropped
    /// and both lanes are empty.
    pub async fn recv(&mut self) -> Option<Payload> {
        tokio::select! {
            biased;
            Some(payload) = self.control.recv() => Some(payload),
            Some(payload) = self.data.recv() => Some(payload),
            else => None,
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<Payload> {
        match self.control.try_recv() {
            Ok(payload) => Some(payload),
            Err(_) => self.data.try_recv().ok(),
        }
    }
}

/// Spawn a writer task that drains `rx` into the WebSocket sink.
///
/// Exits when every sender is dropped (then sends a close frame) or when a write fails.
pub fn spawn_writer<S>(
    mut write: S,
    mut rx: OutboundRx,
) -> tokio::task::JoinHandle<Result<(), tungstenite::Error>>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            write.send(Message::from(payload)).await?;
        }
        write.close().await
    })
}
