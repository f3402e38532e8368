//! Room handlers
//!
//! Endpoints for creating, joining, reading and leaving rooms.

use axum::{
    extract::{Path, State},
    Json,
};
use swipe_service::dto::{ApiResponse, CreateRoomRequest, JoinRoomRequest, RoomResponse};
use swipe_service::RoomService;

use crate::extractors::{AuthUser, RoomIdPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Create a room owned by the caller
///
/// POST /rooms
pub async fn create_room(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateRoomRequest>,
) -> ApiResult<Created<Json<ApiResponse<RoomResponse>>>> {
    let service = RoomService::new(state.service_context());
    let room = service
        .create_room(auth.user_id, &request.name, &request.display_name)
        .await?;
    Ok(Created(Json(ApiResponse::new(RoomResponse::from(&room)))))
}

/// Join an active room by PIN
///
/// POST /rooms/join
pub async fn join_room(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<JoinRoomRequest>,
) -> ApiResult<Json<ApiResponse<RoomResponse>>> {
    let service = RoomService::new(state.service_context());
    let room = service
        .join_room(&request.pin, auth.user_id, &request.display_name)
        .await?;
    Ok(Json(ApiResponse::new(RoomResponse::from(&room))))
}

/// Get a room the caller belongs to
///
/// GET /rooms/{room_id}
pub async fn get_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoomIdPath>,
) -> ApiResult<Json<ApiResponse<RoomResponse>>> {
    let room_id = path.room_id()?;

    let service = RoomService::new(state.service_context());
    let room = service.get_room(room_id, &auth.user_id).await?;
    Ok(Json(ApiResponse::new(RoomResponse::from(&room))))
}

/// Leave a room
///
/// DELETE /rooms/{room_id}/members/@me
pub async fn leave_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoomIdPath>,
) -> ApiResult<NoContent> {
    let room_id = path.room_id()?;

    let service = RoomService::new(state.service_context());
    service.leave_room(room_id, auth.user_id).await?;
    Ok(NoContent)
}
