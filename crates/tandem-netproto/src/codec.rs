use crate::error::ProtoError;
use crate::messages::WireMessage;

/// Encode a message as a JSON text frame.
pub fn encode_message(msg: &WireMessage) -> Result<String, ProtoError> {
    Ok(serde_json::to_string(msg)?)
}

/// Decode a JSON text frame.
///
/// Frames that are not a known [`WireMessage`] come back as `ProtoError::Json`; callers
/// treating the room as an opaque pipe pass those through as application data.
pub fn decode_message(text: &str) -> Result<WireMessage, ProtoError> {
    Ok(serde_json::from_str(text)?)
}
