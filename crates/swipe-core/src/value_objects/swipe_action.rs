//! Swipe action - one member's vote on one candidate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Dislike,
    Superlike,
}

impl SwipeAction {
    /// Like and superlike both count towards a match
    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Like | Self::Superlike)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Superlike => "superlike",
        }
    }
}

impl fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwipeAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            "superlike" => Ok(Self::Superlike),
            other => Err(DomainError::ValidationError(format!(
                "unknown swipe action: {other}"
            ))),
        }
    }
}
