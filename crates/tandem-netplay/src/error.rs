//! Relay client error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetplayError {
    #[error("invalid relay url: {0}")]
    InvalidUrl(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The relay answered the upgrade with an HTTP error (400 bad parameters, 409 seat taken).
    #[error("relay refused connection with HTTP {0}")]
    Rejected(u16),

    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] tandem_netproto::ProtoError),

    #[error("channel send error")]
    ChannelSend,
}
