//! JSON messages exchanged over a room.
//!
//! The relay itself only ever originates `PartnerReady` and `Disconnect`; every other
//! frame is opaque application data forwarded verbatim. `Tap` is the client convention
//! for carrying pedal input across the relay (or a direct peer link).

use serde::{Deserialize, Serialize};

use crate::role::{Foot, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WireMessage {
    /// The partner seat is occupied; `role` is the partner's role.
    PartnerReady { role: Role },
    /// The participant holding `role` left the room.
    Disconnect { role: Role },
    /// A foot tap by `role`.
    Tap { role: Role, foot: Foot },
}

impl WireMessage {
    /// Messages originated by the relay rather than by a participant.
    pub const fn is_control(&self) -> bool {
        matches!(
            self,
            WireMessage::PartnerReady { .. } | WireMessage::Disconnect { .. }
        )
    }
}
