//! Two-seat relay session.
//!
//! A session holds at most one connection per role in an explicit two-slot record.
//! It forwards opaque payloads from one seat to the other and announces presence
//! (`partner-ready`) and absence (`disconnect`). It knows nothing about game messages.
//!
//! All methods are synchronous and never block: outbound traffic goes through
//! `try_send`, so callers may hold the room lock while calling them.

use tandem_netproto::{Role, RoomCode, WireMessage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::OccupiedPolicy;
use crate::error::RelayError;
use crate::net::inbound::ConnId;
use crate::net::outbound::Outbound;
use crate::net::payload::Payload;

/// A connection seated in a room. Its role never changes.
#[derive(Debug, Clone)]
pub struct Connection {
    pub conn_id: ConnId,
    pub role: Role,
    pub outbound: Outbound,
    /// Cancelling this forces the connection task to shut down.
    pub cancel: CancellationToken,
}

impl Connection {
    pub fn new(conn_id: ConnId, role: Role, outbound: Outbound, cancel: CancellationToken) -> Self {
        Self {
            conn_id,
            role,
            outbound,
            cancel,
        }
    }
}

/// Which seats are currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Occupancy {
    pub captain: bool,
    pub stoker: bool,
}

impl Occupancy {
    pub fn has(&self, role: Role) -> bool {
        match role {
            Role::Captain => self.captain,
            Role::Stoker => self.stoker,
        }
    }
}

#[derive(Debug)]
pub struct RelaySession {
    room: RoomCode,
    captain: Option<Connection>,
    stoker: Option<Connection>,
}

impl RelaySession {
    pub fn new(room: RoomCode) -> Self {
        Self {
            room,
            captain: None,
            stoker: None,
        }
    }

    pub fn room(&self) -> &RoomCode {
        &self.room
    }

    fn slot(&self, role: Role) -> &Option<Connection> {
        match role {
            Role::Captain => &self.captain,
            Role::Stoker => &self.stoker,
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<Connection> {
        match role {
            Role::Captain => &mut self.captain,
            Role::Stoker => &mut self.stoker,
        }
    }

    /// Role currently seated under `conn_id`, if any.
    pub fn role_of(&self, conn_id: ConnId) -> Option<Role> {
        [Role::Captain, Role::Stoker]
            .into_iter()
            .find(|&role| self.slot(role).as_ref().is_some_and(|c| c.conn_id == conn_id))
    }

    pub fn occupancy(&self) -> Occupancy {
        Occupancy {
            captain: self.captain.is_some(),
            stoker: self.stoker.is_some(),
        }
    }

    /// Seat `conn` under its role.
    ///
    /// If the partner seat is held, both sides get exactly one `partner-ready` naming the
    /// other. An occupied seat is handled by `policy`: `Reject` refuses the newcomer,
    /// `Evict` cancels the previous holder (its partner is not told it left, since the
    /// seat is immediately filled again).
    pub fn accept(&mut self, conn: Connection, policy: OccupiedPolicy) -> Result<(), RelayError> {
        let role = conn.role;

        if let Some(current) = self.slot(role) {
            match policy {
                OccupiedPolicy::Reject => {
                    debug!(
                        room = %self.room,
                        %role,
                        holder = current.conn_id,
                        conn_id = conn.conn_id,
                        "Seat occupied, join refused"
                    );
                    return Err(RelayError::RoleTaken(role));
                }
                OccupiedPolicy::Evict => {
                    info!(
                        room = %self.room,
                        %role,
                        evicted = current.conn_id,
                        conn_id = conn.conn_id,
                        "Evicting previous seat holder"
                    );
                    current.cancel.cancel();
                }
            }
        }

        if let Some(partner) = self.slot(role.opposite()) {
            conn.outbound.send_control(&WireMessage::PartnerReady {
                role: partner.role,
            });
            partner
                .outbound
                .send_control(&WireMessage::PartnerReady { role });
            info!(room = %self.room, %role, "Room paired");
        }

        info!(room = %self.room, %role, conn_id = conn.conn_id, "Connection seated");
        *self.slot_mut(role) = Some(conn);
        Ok(())
    }

    /// Forward `payload` from `from` to the opposite seat.
    ///
    /// Returns how many connections the payload was queued for (0 or 1). Senders that are
    /// not seated here (already closed or evicted) are ignored.
    pub fn relay(&self, from: ConnId, payload: Payload) -> usize {
        let Some(role) = self.role_of(from) else {
            debug!(room = %self.room, conn_id = from, "Relay from unseated connection dropped");
            return 0;
        };

        match self.slot(role.opposite()) {
            Some(partner) => usize::from(partner.outbound.send_data(payload)),
            None => 0,
        }
    }

    /// Vacate the seat held by `conn_id` and tell the partner.
    ///
    /// Returns the vacated role. A second close, or a close from a connection that was
    /// evicted, is a no-op.
    pub fn close(&mut self, conn_id: ConnId) -> Option<Role> {
        let role = self.role_of(conn_id)?;
        *self.slot_mut(role) = None;

        if let Some(partner) = self.slot(role.opposite()) {
            partner
                .outbound
                .send_control(&WireMessage::Disconnect { role });
        }
        info!(room = %self.room, %role, conn_id, "Seat vacated");
        Some(role)
    }

    /// Force the connection shut, then vacate its seat as [`close`](Self::close) does.
    pub fn error(&mut self, conn_id: ConnId) -> Option<Role> {
        let role = self.role_of(conn_id)?;
        if let Some(conn) = self.slot(role) {
            conn.cancel.cancel();
        }
        self.close(conn_id)
    }
}
