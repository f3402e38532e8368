//! PostgreSQL implementation of SwipeRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use swipe_core::{
    CandidateId, DomainError, RepoResult, Snowflake, SwipeRecord, SwipeRepository, UserId,
};

use crate::models::SwipeModel;

use super::error::{map_db_error, map_unique_violation, room_not_found};
use super::room::{lock_room, touch_room};

/// PostgreSQL implementation of SwipeRepository
#[derive(Clone)]
pub struct PgSwipeRepository {
    pool: PgPool,
}

impl PgSwipeRepository {
    /// Create a new PgSwipeRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SwipeRepository for PgSwipeRepository {
    #[instrument(skip(self))]
    async fn exists(
        &self,
        room_id: Snowflake,
        user_id: &UserId,
        candidate_id: &CandidateId,
    ) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM swipes
                WHERE room_id = $1 AND user_id = $2 AND candidate_id = $3
            )
            "#,
        )
        .bind(room_id.into_inner())
        .bind(user_id.as_str())
        .bind(candidate_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, swipe), fields(room_id = %swipe.room_id, user_id = %swipe.user_id))]
    async fn record(&self, swipe: &SwipeRecord) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Serializes with joins and leaves on the same room
        match lock_room(&mut tx, swipe.room_id).await? {
            Some(room) if room.is_active => {}
            _ => return Err(room_not_found(swipe.room_id)),
        }

        let updated = sqlx::query(
            r#"
            UPDATE room_members
            SET current_candidate_id = $3, current_action = $4, current_swiped_at = $5
            WHERE room_id = $1 AND user_id = $2 AND is_active
            "#,
        )
        .bind(swipe.room_id.into_inner())
        .bind(swipe.user_id.as_str())
        .bind(swipe.candidate_id.as_str())
        .bind(swipe.action.as_str())
        .bind(swipe.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::NotRoomMember);
        }

        sqlx::query(
            r#"
            INSERT INTO swipes (room_id, user_id, candidate_id, action, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(swipe.room_id.into_inner())
        .bind(swipe.user_id.as_str())
        .bind(swipe.candidate_id.as_str())
        .bind(swipe.action.as_str())
        .bind(swipe.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateSwipe))?;

        touch_room(&mut tx, swipe.room_id).await?;
        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_candidate(
        &self,
        room_id: Snowflake,
        candidate_id: &CandidateId,
    ) -> RepoResult<Vec<SwipeRecord>> {
        let models = sqlx::query_as::<_, SwipeModel>(
            r#"
            SELECT room_id, user_id, candidate_id, action, created_at
            FROM swipes
            WHERE room_id = $1 AND candidate_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(room_id.into_inner())
        .bind(candidate_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(SwipeRecord::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_room(&self, room_id: Snowflake) -> RepoResult<Vec<SwipeRecord>> {
        let models = sqlx::query_as::<_, SwipeModel>(
            r#"
            SELECT room_id, user_id, candidate_id, action, created_at
            FROM swipes
            WHERE room_id = $1
            ORDER BY created_at, user_id, candidate_id
            "#,
        )
        .bind(room_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(SwipeRecord::try_from).collect()
    }
}
