use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_ROOM_CODE_LEN;
use crate::error::ProtoError;

/// Validated room identifier.
///
/// Non-empty, at most [`MAX_ROOM_CODE_LEN`] bytes, ASCII alphanumerics plus `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    pub fn parse(raw: &str) -> Result<Self, ProtoError> {
        if raw.is_empty() {
            return Err(ProtoError::InvalidRequest("empty room code".into()));
        }
        if raw.len() > MAX_ROOM_CODE_LEN {
            return Err(ProtoError::InvalidRequest(format!(
                "room code longer than {MAX_ROOM_CODE_LEN} bytes"
            )));
        }
        if !raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(ProtoError::InvalidRequest(format!(
                "room code {raw:?} contains unsupported characters"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RoomCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RoomCode::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}
