//! Candidate - an externally sourced item that members vote on

use serde::{Deserialize, Serialize};

use crate::value_objects::CandidateId;

/// Candidate as handed over by the candidate provider.
///
/// The engine only ever stores `id`; `title` and `metadata` exist so the
/// client has something to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub title: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl Candidate {
    pub fn new(id: CandidateId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            metadata: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
