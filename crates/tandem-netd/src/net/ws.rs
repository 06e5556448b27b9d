use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tandem_netproto::ConnectParams;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async_with_config;
use tokio_tungstenite::tungstenite::{
    self, Message,
    handshake::server::{ErrorResponse, Request, Response},
    http::StatusCode,
    protocol::{CloseFrame, WebSocketConfig, frame::coding::CloseCode},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::{OccupiedPolicy, RelayConfig};
use crate::error::RelayError;
use crate::room::{Connection, Room, RoomRouter};

use super::inbound::{ConnEnd, ConnId, next_conn_id};
use super::outbound::{outbound_channel, spawn_writer};
use super::payload::Payload;

/// Bind `bind` and serve relay connections until the listener fails.
pub async fn run_ws_listener(
    bind: SocketAddr,
    router: Arc<RoomRouter>,
    config: RelayConfig,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    run_ws_listener_with_listener(listener, router, config).await
}

/// Run the accept loop on an existing listener.
pub async fn run_ws_listener_with_listener(
    listener: TcpListener,
    router: Arc<RoomRouter>,
    config: RelayConfig,
) -> anyhow::Result<()> {
    let config = Arc::new(config);
    info!(addr = %listener.local_addr()?, "Relay listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Accept failed: {}", e);
                continue;
            }
        };

        let conn_id = next_conn_id();
        let router = Arc::clone(&router);
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            handle_ws_connection(stream, peer, conn_id, router, config).await;
        });
    }
}

/// Drive one relay connection from upgrade to teardown.
///
/// The connect parameters are validated inside the handshake callback, so a bad room,
/// a bad role, or (under [`OccupiedPolicy::Reject`]) a taken seat is answered with an
/// HTTP error instead of `101 Switching Protocols`.
pub async fn handle_ws_connection(
    stream: TcpStream,
    peer: SocketAddr,
    conn_id: ConnId,
    router: Arc<RoomRouter>,
    config: Arc<RelayConfig>,
) {
    let _ = stream.set_nodelay(true);
    let policy = config.occupied_policy;

    let mut admitted: Option<(ConnectParams, Arc<Room>)> = None;
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        match admit(req, &router, policy) {
            Ok(found) => {
                admitted = Some(found);
                Ok(resp)
            }
            Err(err) => {
                warn!(conn_id, %peer, error = %err, "Connection refused");
                Err(reject_response(&err))
            }
        }
    };

    let ws_config = WebSocketConfig::default()
        .max_message_size(Some(config.max_payload))
        .max_frame_size(Some(config.max_payload));

    let mut ws = match accept_hdr_async_with_config(stream, callback, Some(ws_config)).await {
        Ok(ws) => ws,
        Err(e) => {
            debug!(conn_id, %peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };
    let Some((params, room)) = admitted.take() else {
        return;
    };

    let (outbound, out_rx) = outbound_channel(config.outbound_queue);
    let cancel = CancellationToken::new();
    let conn = Connection::new(conn_id, params.role, outbound.clone(), cancel.clone());

    // The pre-upgrade occupancy check can race with another join into the same seat.
    if let Err(err) = room.accept(conn, policy) {
        warn!(conn_id, %peer, room = %params.room, error = %err, "Join lost seat race");
        let frame = CloseFrame {
            code: CloseCode::Policy,
            reason: err.to_string().into(),
        };
        let _ = ws.close(Some(frame)).await;
        return;
    }

    let (write, mut read) = ws.split();
    let writer = spawn_writer(write, out_rx);

    let end = read_loop(&mut read, &room, conn_id, &cancel).await;
    if end.is_error() {
        room.error(conn_id);
    } else {
        room.close(conn_id);
    }
    info!(conn_id, %peer, room = %params.room, role = %params.role, reason = ?end, "Connection ended");

    // Last sender gone -> writer flushes, sends a close frame and exits.
    drop(outbound);
    let _ = writer.await;
}

fn admit(
    req: &Request,
    router: &RoomRouter,
    policy: OccupiedPolicy,
) -> Result<(ConnectParams, Arc<Room>), RelayError> {
    let params = ConnectParams::from_query(req.uri().query())?;
    let room = router.resolve(params.room.as_str())?;
    if policy == OccupiedPolicy::Reject && room.occupancy().has(params.role) {
        return Err(RelayError::RoleTaken(params.role));
    }
    Ok((params, room))
}

fn reject_response(err: &RelayError) -> ErrorResponse {
    let mut resp = ErrorResponse::new(Some(err.to_string()));
    *resp.status_mut() = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
    resp
}

async fn read_loop<S>(
    read: &mut S,
    room: &Room,
    conn_id: ConnId,
    cancel: &CancellationToken,
) -> ConnEnd
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        let next = tokio::select! {
            next = read.next() => next,
            _ = cancel.cancelled() => return ConnEnd::Cancelled,
        };

        match next {
            None | Some(Ok(Message::Close(_))) => return ConnEnd::Closed,
            Some(Ok(msg)) => {
                let Some(payload) = Payload::from_message(msg) else {
                    continue;
                };
                let len = payload.len();
                let delivered = room.relay(conn_id, payload);
                trace!(conn_id, room = %room.code(), len, delivered, "Relayed payload");
            }
            Some(Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed)) => {
                return ConnEnd::Closed;
            }
            Some(Err(e)) => return ConnEnd::Errored(e.to_string()),
        }
    }
}
