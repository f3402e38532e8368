//! PostgreSQL implementation of MatchRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use swipe_core::{CandidateId, DomainError, Match, MatchRepository, RepoResult, Snowflake};

use crate::models::MatchModel;

use super::error::{map_db_error, map_unique_violation, match_not_found};

/// PostgreSQL implementation of MatchRepository
#[derive(Clone)]
pub struct PgMatchRepository {
    pool: PgPool,
}

impl PgMatchRepository {
    /// Create a new PgMatchRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchRepository for PgMatchRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Match>> {
        let model = sqlx::query_as::<_, MatchModel>(
            r#"
            SELECT id, room_id, candidate_id, member_ids, matched_at, is_viewed
            FROM matches
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        model.map(Match::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_candidate(
        &self,
        room_id: Snowflake,
        candidate_id: &CandidateId,
    ) -> RepoResult<Option<Match>> {
        let model = sqlx::query_as::<_, MatchModel>(
            r#"
            SELECT id, room_id, candidate_id, member_ids, matched_at, is_viewed
            FROM matches
            WHERE room_id = $1 AND candidate_id = $2
            "#,
        )
        .bind(room_id.into_inner())
        .bind(candidate_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        model.map(Match::try_from).transpose()
    }

    #[instrument(skip(self, m), fields(room_id = %m.room_id, candidate_id = %m.candidate_id))]
    async fn create(&self, m: &Match) -> RepoResult<()> {
        let member_ids: Vec<&str> = m.member_ids.iter().map(|id| id.as_str()).collect();

        sqlx::query(
            r#"
            INSERT INTO matches (id, room_id, candidate_id, member_ids, matched_at, is_viewed)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(m.id.into_inner())
        .bind(m.room_id.into_inner())
        .bind(m.candidate_id.as_str())
        .bind(&member_ids)
        .bind(m.matched_at)
        .bind(m.is_viewed)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::MatchAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, room_id: Snowflake, limit: i64) -> RepoResult<Vec<Match>> {
        let models = sqlx::query_as::<_, MatchModel>(
            r#"
            SELECT id, room_id, candidate_id, member_ids, matched_at, is_viewed
            FROM matches
            WHERE room_id = $1
            ORDER BY matched_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(room_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(Match::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn mark_viewed(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE matches SET is_viewed = TRUE WHERE id = $1 AND NOT is_viewed
            "#,
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Nothing updated: either already viewed or no such match
        match self.find_by_id(id).await? {
            Some(_) => Ok(false),
            None => Err(match_not_found(id)),
        }
    }
}
