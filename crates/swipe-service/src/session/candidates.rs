//! Fixed candidate queue, for demos and tests

use async_trait::async_trait;
use std::sync::Arc;
use swipe_core::{Candidate, CandidateId, CandidateProvider, DomainError, RepoResult, Snowflake};

/// Hands every room the same ordered list
#[derive(Debug, Clone, Default)]
pub struct StaticCandidates {
    candidates: Arc<[Candidate]>,
}

impl StaticCandidates {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: candidates.into(),
        }
    }

    /// Candidates titled after their ids
    pub fn from_ids<I, S>(ids: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let candidates = ids
            .into_iter()
            .map(|id| {
                let id = CandidateId::parse(id)?;
                let title = id.to_string();
                Ok(Candidate::new(id, title))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(Self::new(candidates))
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[async_trait]
impl CandidateProvider for StaticCandidates {
    async fn candidates(&self, _room_id: Snowflake) -> RepoResult<Vec<Candidate>> {
        Ok(self.candidates.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_ids_keeps_order() {
        let provider = StaticCandidates::from_ids(["c1", "c2", "c3"]).unwrap();
        let queue = provider.candidates(Snowflake::new(1)).await.unwrap();

        let ids: Vec<&str> = queue.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert_eq!(queue[0].title, "c1");
    }

    #[test]
    fn test_from_ids_rejects_blank_ids() {
        assert!(StaticCandidates::from_ids(["c1", ""]).is_err());
    }
}
