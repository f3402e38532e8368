//! Human-entered names: room names and member display names

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Upper bound, in characters, for room and display names
pub const MAX_NAME_LEN: usize = 50;

/// Room title, 1-50 characters after trimming
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomName(String);

impl RoomName {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let name = raw.trim();
        let len = name.chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(DomainError::InvalidRoomName(format!(
                "room name must be between 1 and {MAX_NAME_LEN} characters"
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(DomainError::InvalidRoomName(
                "room name must not contain control characters".to_string(),
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Member display name.
///
/// Input is sanitized rather than rejected: everything except letters,
/// digits, spaces, hyphens and underscores is dropped, then the result is
/// trimmed. It fails only when nothing usable is left or the sanitized name
/// is longer than [`MAX_NAME_LEN`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let sanitized: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
            .collect();
        let name = sanitized.trim();

        if name.is_empty() {
            return Err(DomainError::InvalidDisplayName(
                "display name must contain a letter or digit".to_string(),
            ));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::InvalidDisplayName(format!(
                "display name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! name_conversions {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$ty> for String {
            fn from(name: $ty) -> Self {
                name.0
            }
        }
    };
}

name_conversions!(RoomName);
name_conversions!(DisplayName);
