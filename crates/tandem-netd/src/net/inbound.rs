use std::sync::atomic::{AtomicU64, Ordering};

/// Unique connection identifier assigned by the relay.
pub type ConnId = u64;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_conn_id() -> ConnId {
    NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed)
}

/// Why a connection's read loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnEnd {
    /// Peer sent a close frame or the stream ended.
    Closed,
    /// Transport or protocol failure; the connection is forced shut.
    Errored(String),
    /// The relay cancelled the connection (eviction or shutdown).
    Cancelled,
}

impl ConnEnd {
    pub fn is_error(&self) -> bool {
        matches!(self, ConnEnd::Errored(_))
    }
}
