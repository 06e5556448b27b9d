//! Relay error types.

use tandem_netproto::{ProtoError, Role};
use thiserror::Error;

/// Reasons a connection is refused before it joins a room.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid role: {0:?}")]
    InvalidRole(String),

    #[error("role {0} is already occupied")]
    RoleTaken(Role),
}

impl From<ProtoError> for RelayError {
    fn from(err: ProtoError) -> Self {
        match err {
            ProtoError::InvalidRole(raw) => RelayError::InvalidRole(raw),
            ProtoError::InvalidRequest(reason) => RelayError::InvalidRequest(reason),
            other => RelayError::InvalidRequest(other.to_string()),
        }
    }
}

impl RelayError {
    /// HTTP status answered on the upgrade request.
    pub fn http_status(&self) -> u16 {
        match self {
            RelayError::InvalidRequest(_) | RelayError::InvalidRole(_) => 400,
            RelayError::RoleTaken(_) => 409,
        }
    }
}
