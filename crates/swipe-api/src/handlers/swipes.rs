//! Swipe handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use swipe_service::dto::{ApiResponse, SwipeRequest, SwipeResponse};
use swipe_service::SwipeService;

use crate::extractors::{json_rejection, AuthUser, SwipePath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Record the caller's vote on a candidate. Repeating it is a no-op that
/// reports `recorded: false`; match evaluation continues after the response.
///
/// PUT /rooms/{room_id}/swipes/{candidate_id}
pub async fn submit_swipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<SwipePath>,
    body: Result<Json<SwipeRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<SwipeResponse>>> {
    let room_id = path.room_id()?;
    let candidate_id = path.candidate_id()?;
    let Json(request) = body.map_err(json_rejection)?;

    let service = SwipeService::new(state.service_context());
    let receipt = service
        .submit_swipe(room_id, auth.user_id, candidate_id.as_str(), request.action)
        .await?;

    Ok(Json(ApiResponse::new(SwipeResponse {
        room_id: room_id.to_string(),
        candidate_id: candidate_id.to_string(),
        action: request.action,
        recorded: receipt.recorded(),
    })))
}
