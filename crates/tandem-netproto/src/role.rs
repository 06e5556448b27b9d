use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::ProtoError;

/// One of the two fixed seats on the shared crank.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Captain,
    Stoker,
}

impl Role {
    /// The other seat. `role.opposite().opposite() == role`.
    pub const fn opposite(self) -> Self {
        match self {
            Role::Captain => Role::Stoker,
            Role::Stoker => Role::Captain,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Parse the wire spelling (`captain` / `stoker`).
    pub fn parse(raw: &str) -> Result<Self, ProtoError> {
        Role::from_str(raw).map_err(|_| ProtoError::InvalidRole(raw.to_string()))
    }
}

/// Pedal side. Each role alternates between `A` and `B`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Foot {
    A,
    B,
}

impl Foot {
    pub const fn other(self) -> Self {
        match self {
            Foot::A => Foot::B,
            Foot::B => Foot::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Parse `A` / `B` (either case).
    pub fn parse(raw: &str) -> Result<Self, ProtoError> {
        Foot::from_str(raw).map_err(|_| ProtoError::InvalidFoot(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn role_wire_spelling_round_trips() {
        for role in Role::iter() {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
            assert_eq!(role.opposite().opposite(), role);
            assert_ne!(role.opposite(), role);
        }
        assert_eq!(Role::Captain.to_string(), "captain");
    }

    #[test]
    fn unknown_role_is_rejected() {
        for raw in ["", "pilot", "Captain ", "stokers"] {
            assert!(matches!(Role::parse(raw), Err(ProtoError::InvalidRole(_))));
        }
    }

    #[test]
    fn foot_parse_accepts_either_case() {
        assert_eq!(Foot::parse("a").unwrap(), Foot::A);
        assert_eq!(Foot::parse("B").unwrap(), Foot::B);
        assert!(matches!(Foot::parse("C"), Err(ProtoError::InvalidFoot(_))));
        assert_eq!(Foot::A.other(), Foot::B);
    }
}
