//! Match handlers

use axum::{
    extract::{Path, State},
    Json,
};
use swipe_service::dto::{ApiResponse, MatchResponse};
use swipe_service::MatchService;

use crate::extractors::{AuthUser, MatchIdPath, RoomIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Most recent matches of a room, newest first
///
/// GET /rooms/{room_id}/matches
pub async fn get_matches(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoomIdPath>,
) -> ApiResult<Json<ApiResponse<Vec<MatchResponse>>>> {
    let room_id = path.room_id()?;

    let service = MatchService::new(state.service_context());
    let matches = service.get_matches(room_id, &auth.user_id).await?;
    Ok(Json(ApiResponse::new(matches.iter().map(MatchResponse::from).collect())))
}

/// Flag a match as seen
///
/// POST /matches/{match_id}/viewed
pub async fn mark_viewed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<MatchIdPath>,
) -> ApiResult<Json<ApiResponse<MatchResponse>>> {
    let match_id = path.match_id()?;

    let service = MatchService::new(state.service_context());
    let m = service.mark_match_viewed(match_id, auth.user_id).await?;
    Ok(Json(ApiResponse::new(MatchResponse::from(&m))))
}
