//! Relay connect parameters.
//!
//! A client joins a room by upgrading `GET /?room=<code>&role=<captain|stoker>`.
//! Both parameters are validated before the upgrade is answered.

use crate::constants::{QUERY_ROLE, QUERY_ROOM};
use crate::error::ProtoError;
use crate::role::Role;
use crate::room_code::RoomCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub room: RoomCode,
    pub role: Role,
}

impl ConnectParams {
    pub fn new(room: RoomCode, role: Role) -> Self {
        Self { room, role }
    }

    /// Parse the query part of an upgrade URI.
    ///
    /// The room is checked first: a missing or malformed room yields `InvalidRequest`
    /// even when the role is also bad. Unknown keys are ignored; repeated keys are rejected.
    pub fn from_query(query: Option<&str>) -> Result<Self, ProtoError> {
        let mut room = None;
        let mut role = None;

        for pair in query.unwrap_or_default().split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match key {
                QUERY_ROOM => &mut room,
                QUERY_ROLE => &mut role,
                _ => continue,
            };
            if slot.replace(value).is_some() {
                return Err(ProtoError::InvalidRequest(format!(
                    "duplicate query parameter {key:?}"
                )));
            }
        }

        let room = room.ok_or_else(|| ProtoError::InvalidRequest("missing room".into()))?;
        let room = RoomCode::parse(room)?;
        let role = Role::parse(role.unwrap_or_default())?;
        Ok(Self { room, role })
    }

    /// Render as a query string (without the leading `?`).
    pub fn to_query(&self) -> String {
        format!(
            "{QUERY_ROOM}={}&{QUERY_ROLE}={}",
            self.room,
            self.role.as_str()
        )
    }
}
