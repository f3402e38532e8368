//! Opaque identifiers issued outside the engine
//!
//! User IDs come from the identity provider (the JWT `sub` claim at the HTTP
//! edge) and candidate IDs from the candidate provider. The engine never
//! interprets either; it only bounds their size.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Longest accepted opaque identifier, in bytes
pub const MAX_ID_LEN: usize = 128;

fn check_opaque_id(kind: &str, raw: &str) -> Result<(), DomainError> {
    if raw.is_empty() || raw.len() > MAX_ID_LEN {
        return Err(DomainError::ValidationError(format!(
            "{kind} must be between 1 and {MAX_ID_LEN} bytes"
        )));
    }
    if raw.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(DomainError::ValidationError(format!(
            "{kind} must not contain whitespace or control characters"
        )));
    }
    Ok(())
}

/// Identity of a room participant
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        check_opaque_id("user id", &raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity of an externally supplied candidate item
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CandidateId(String);

impl CandidateId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        check_opaque_id("candidate id", &raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_id_conversions {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id_conversions!(UserId);
string_id_conversions!(CandidateId);
