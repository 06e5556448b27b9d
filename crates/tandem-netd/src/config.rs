use clap::ValueEnum;
use tandem_netproto::constants::DEFAULT_MAX_PAYLOAD;

/// What happens when a connection asks for a role that is already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OccupiedPolicy {
    /// Refuse the newcomer (HTTP 409 on the upgrade).
    #[default]
    Reject,
    /// Force-close the current holder and seat the newcomer.
    Evict,
}

/// Relay server configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximum size of one inbound WebSocket message, in bytes.
    pub max_payload: usize,
    /// Per-connection queue depth for relayed frames. Frames beyond this are dropped;
    /// relay control messages are not bounded by it.
    pub outbound_queue: usize,
    pub occupied_policy: OccupiedPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
            outbound_queue: 256,
            occupied_policy: OccupiedPolicy::Reject,
        }
    }
}
