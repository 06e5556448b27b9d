//! Room state: one [`RelaySession`] per room code, looked up through [`RoomRouter`].

pub mod router;
pub mod session;

use parking_lot::Mutex;
use tandem_netproto::{Role, RoomCode};

use crate::config::OccupiedPolicy;
use crate::error::RelayError;
use crate::net::inbound::ConnId;
use crate::net::payload::Payload;

pub use router::RoomRouter;
pub use session::{Connection, Occupancy, RelaySession};

/// A room: its code plus the session, serialized behind a per-room lock.
///
/// Every operation takes the lock for the duration of one slot transition or one
/// forward, so `accept`/`relay`/`close` on the same room never interleave. Rooms share
/// nothing with each other.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    session: Mutex<RelaySession>,
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            session: Mutex::new(RelaySession::new(code.clone())),
            code,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn accept(&self, conn: Connection, policy: OccupiedPolicy) -> Result<(), RelayError> {
        self.session.lock().accept(conn, policy)
    }

    pub fn relay(&self, from: ConnId, payload: Payload) -> usize {
        self.session.lock().relay(from, payload)
    }

    pub fn close(&self, conn_id: ConnId) -> Option<Role> {
        self.session.lock().close(conn_id)
    }

    pub fn error(&self, conn_id: ConnId) -> Option<Role> {
        self.session.lock().error(conn_id)
    }

    pub fn occupancy(&self) -> Occupancy {
        self.session.lock().occupancy()
    }

    pub fn role_of(&self, conn_id: ConnId) -> Option<Role> {
        self.session.lock().role_of(conn_id)
    }
}
