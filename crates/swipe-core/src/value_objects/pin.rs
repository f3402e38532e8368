//! Room PIN - the six-digit code people type to join a room

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Exactly six ASCII digits; leading zeros are significant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomPin(String);

impl RoomPin {
    pub const LEN: usize = 6;
    const SPACE: u32 = 1_000_000;

    /// Parse user input. Surrounding whitespace is ignored, anything else
    /// that is not six ASCII digits is rejected.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::InvalidPin)
        }
    }

    /// Draw a PIN uniformly from `000000..=999999`
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(format!("{:06}", rng.gen_range(0..Self::SPACE)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomPin {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomPin> for String {
    fn from(pin: RoomPin) -> Self {
        pin.0
    }
}
