/// Query parameter carrying the room code on the relay upgrade request.
pub const QUERY_ROOM: &str = "room";

/// Query parameter carrying the requested role on the relay upgrade request.
pub const QUERY_ROLE: &str = "role";

/// Longest accepted room code, in bytes.
/// Room codes are short human-typed tokens; anything longer is treated as malformed.
pub const MAX_ROOM_CODE_LEN: usize = 32;

/// Default relay listen port.
pub const DEFAULT_RELAY_PORT: u16 = 7420;

/// Default cap for a single inbound relay message (header + payload), in bytes.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024;
