//! Tandem relay client.
//!
//! # Architecture
//!
//! - [`client`]: WebSocket client for the room relay (`tandem-netd`)
//! - [`bridge`]: wires relay taps into a local pedal engine
//! - [`error`]: Error types

pub mod bridge;
pub mod client;
pub mod error;

pub use bridge::TapBridge;
pub use client::{RelayClientHandle, RelayData, RelayEvent, connect, relay_url};
pub use error::NetplayError;
