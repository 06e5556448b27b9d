//! Tandem relay server library.
//!
//! Pairs a captain and a stoker into a room and forwards frames between them when no
//! direct peer link is available. The relay carries no game semantics: apart from the
//! `partner-ready` / `disconnect` control messages it originates, every frame is passed
//! through untouched.
//!
//! # Architecture
//!
//! - [`room::RoomRouter`]: room code -> [`room::Room`], created on first reference
//! - [`room::RelaySession`]: two-seat state machine for one room
//! - [`net::ws`]: WebSocket listener; validates connect parameters before the upgrade
//! - [`config`]: server configuration

use std::sync::Arc;

use tokio::net::TcpListener;

pub mod config;
pub mod error;
pub mod net;
pub mod room;

pub use config::{OccupiedPolicy, RelayConfig};
pub use error::RelayError;
pub use room::{Room, RoomRouter};

/// Serve relay connections on `listener` using `router` for room lookup.
///
/// Runs until the task is dropped; tests spawn it on a `127.0.0.1:0` listener.
pub async fn run_server(
    listener: TcpListener,
    router: Arc<RoomRouter>,
    config: RelayConfig,
) -> anyhow::Result<()> {
    net::ws::run_ws_listener_with_listener(listener, router, config).await
}
