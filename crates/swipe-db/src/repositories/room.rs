//! PostgreSQL implementation of RoomRepository

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::instrument;

use swipe_core::{
    DomainError, Member, MembershipUpdate, RepoResult, Room, RoomPin, RoomRepository, Snowflake,
    UserId,
};

use crate::mappers::room_with_members;
use crate::models::{RoomMemberModel, RoomModel};

use super::error::{map_db_error, map_unique_violation, room_not_found};

/// PostgreSQL implementation of RoomRepository
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Create a new PgRoomRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read-only transaction that sees one snapshot across statements
    async fn snapshot(&self) -> RepoResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        Ok(tx)
    }
}

// ============================================================================
// Row helpers shared with the swipe repository
// ============================================================================

/// Lock the room row for the rest of the transaction
pub(super) async fn lock_room(conn: &mut PgConnection, id: Snowflake) -> RepoResult<Option<RoomModel>> {
    sqlx::query_as::<_, RoomModel>(
        r#"
        SELECT id, pin, name, owner_id, is_active, created_at, updated_at
        FROM rooms
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id.into_inner())
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)
}

/// Bump `updated_at` without ever moving it backwards
pub(super) async fn touch_room(conn: &mut PgConnection, id: Snowflake) -> RepoResult<RoomModel> {
    sqlx::query_as::<_, RoomModel>(
        r#"
        UPDATE rooms
        SET updated_at = GREATEST(updated_at, clock_timestamp())
        WHERE id = $1
        RETURNING id, pin, name, owner_id, is_active, created_at, updated_at
        "#,
    )
    .bind(id.into_inner())
    .fetch_one(conn)
    .await
    .map_err(map_db_error)
}

async fn load_members(conn: &mut PgConnection, room_id: i64) -> RepoResult<Vec<RoomMemberModel>> {
    sqlx::query_as::<_, RoomMemberModel>(
        r#"
        SELECT room_id, user_id, display_name, joined_at, is_active,
               current_candidate_id, current_action, current_swiped_at
        FROM room_members
        WHERE room_id = $1
        ORDER BY seq
        "#,
    )
    .bind(room_id)
    .fetch_all(conn)
    .await
    .map_err(map_db_error)
}

async fn assemble(conn: &mut PgConnection, model: RoomModel) -> RepoResult<Room> {
    let members = load_members(conn, model.id).await?;
    room_with_members(model, members)
}

async fn insert_member(conn: &mut PgConnection, room_id: Snowflake, member: &Member) -> RepoResult<()> {
    let current = member.current_swipe.as_ref();

    sqlx::query(
        r#"
        INSERT INTO room_members (
            room_id, user_id, display_name, joined_at, is_active,
            current_candidate_id, current_action, current_swiped_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(room_id.into_inner())
    .bind(member.user_id.as_str())
    .bind(member.display_name.as_str())
    .bind(member.joined_at)
    .bind(member.is_active)
    .bind(current.map(|c| c.candidate_id.as_str()))
    .bind(current.map(|c| c.action.as_str()))
    .bind(current.map(|c| c.swiped_at))
    .execute(conn)
    .await
    .map_err(map_db_error)?;

    Ok(())
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>> {
        let mut tx = self.snapshot().await?;

        let model = sqlx::query_as::<_, RoomModel>(
            r#"
            SELECT id, pin, name, owner_id, is_active, created_at, updated_at
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let room = match model {
            Some(model) => Some(assemble(&mut tx, model).await?),
            None => None,
        };
        tx.commit().await.map_err(map_db_error)?;
        Ok(room)
    }

    #[instrument(skip(self))]
    async fn find_active_by_pin(&self, pin: &RoomPin) -> RepoResult<Option<Room>> {
        let mut tx = self.snapshot().await?;

        let model = sqlx::query_as::<_, RoomModel>(
            r#"
            SELECT id, pin, name, owner_id, is_active, created_at, updated_at
            FROM rooms
            WHERE pin = $1 AND is_active
            "#,
        )
        .bind(pin.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let room = match model {
            Some(model) => Some(assemble(&mut tx, model).await?),
            None => None,
        };
        tx.commit().await.map_err(map_db_error)?;
        Ok(room)
    }

    #[instrument(skip(self))]
    async fn pin_in_use(&self, pin: &RoomPin) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM rooms WHERE pin = $1 AND is_active)
            "#,
        )
        .bind(pin.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, room), fields(room_id = %room.id))]
    async fn create(&self, room: &Room) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO rooms (id, pin, name, owner_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(room.id.into_inner())
        .bind(room.pin.as_str())
        .bind(room.name.as_str())
        .bind(room.owner_id.as_str())
        .bind(room.is_active)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::PinCollision))?;

        for member in &room.members {
            insert_member(&mut tx, room.id, member).await?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, member), fields(user_id = %member.user_id))]
    async fn add_member(&self, room_id: Snowflake, member: &Member) -> RepoResult<MembershipUpdate> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let model = match lock_room(&mut tx, room_id).await? {
            Some(model) if model.is_active => model,
            _ => return Err(room_not_found(room_id)),
        };

        let present = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM room_members WHERE room_id = $1 AND user_id = $2)
            "#,
        )
        .bind(room_id.into_inner())
        .bind(member.user_id.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let model = if present {
            model
        } else {
            insert_member(&mut tx, room_id, member).await?;
            touch_room(&mut tx, room_id).await?
        };

        let room = assemble(&mut tx, model).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(MembershipUpdate {
            room,
            changed: !present,
        })
    }

    #[instrument(skip(self))]
    async fn remove_member(&self, room_id: Snowflake, user_id: &UserId) -> RepoResult<MembershipUpdate> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let Some(model) = lock_room(&mut tx, room_id).await? else {
            return Err(room_not_found(room_id));
        };

        let removed = sqlx::query(
            r#"
            DELETE FROM room_members WHERE room_id = $1 AND user_id = $2
            "#,
        )
        .bind(room_id.into_inner())
        .bind(user_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected()
            > 0;

        let model = if removed {
            let remaining = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*) FROM room_members WHERE room_id = $1 AND is_active
                "#,
            )
            .bind(room_id.into_inner())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;

            sqlx::query_as::<_, RoomModel>(
                r#"
                UPDATE rooms
                SET is_active = is_active AND $2,
                    updated_at = GREATEST(updated_at, clock_timestamp())
                WHERE id = $1
                RETURNING id, pin, name, owner_id, is_active, created_at, updated_at
                "#,
            )
            .bind(room_id.into_inner())
            .bind(remaining > 0)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?
        } else {
            model
        };

        let room = assemble(&mut tx, model).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(MembershipUpdate {
            room,
            changed: removed,
        })
    }
}
