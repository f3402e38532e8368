//! Room feed over WebSocket
//!
//! One socket carries both room and match updates for a single room. Each
//! frame is a full snapshot, so a dropped frame is repaired by the next one.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use swipe_common::ErrorResponse;
use swipe_core::{Snowflake, UserId};
use swipe_service::dto::{FeedFrame, MatchResponse, RoomResponse};
use swipe_service::{RoomService, ServiceError, SyncService};
use tokio::sync::mpsc;

use crate::extractors::{AuthUser, RoomIdPath};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Channel buffer size for outgoing frames
const FRAME_BUFFER_SIZE: usize = 64;

/// Upgrade to a live feed of the room and its matches
///
/// GET /rooms/{room_id}/feed
pub async fn room_feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoomIdPath>,
    ws: WebSocketUpgrade,
) -> ApiResult<impl IntoResponse> {
    let room_id = path.room_id()?;

    // Subscriptions do not check access, so do it before upgrading
    RoomService::new(state.service_context())
        .get_room(room_id, &auth.user_id)
        .await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, room_id, auth.user_id, socket)))
}

async fn handle_socket(state: AppState, room_id: Snowflake, user_id: UserId, socket: WebSocket) {
    let (tx, mut rx) = mpsc::channel::<FeedFrame>(FRAME_BUFFER_SIZE);

    let sync = SyncService::new(state.service_context());
    let room_sub = sync.subscribe_room(
        room_id,
        {
            let tx = tx.clone();
            move |room| push(&tx, FeedFrame::RoomUpdate(RoomResponse::from(&room)))
        },
        error_sink(tx.clone()),
    );
    let match_sub = sync.subscribe_matches(
        room_id,
        {
            let tx = tx.clone();
            move |matches| {
                push(
                    &tx,
                    FeedFrame::MatchesUpdate(matches.iter().map(MatchResponse::from).collect()),
                );
            }
        },
        error_sink(tx),
    );

    tracing::info!(room_id = %room_id, user_id = %user_id, "Feed connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let json = match serde_json::to_string(&frame) {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to encode feed frame");
                    continue;
                }
            };
            if ws_sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    // Clients only listen; anything they send other than close is ignored
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    room_sub.unsubscribe();
    match_sub.unsubscribe();
    tracing::info!(room_id = %room_id, user_id = %user_id, "Feed connection closed");
}

fn push(tx: &mpsc::Sender<FeedFrame>, frame: FeedFrame) {
    if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(frame) {
        tracing::warn!("Feed client is lagging, dropping frame");
    }
}

fn error_sink(tx: mpsc::Sender<FeedFrame>) -> impl FnMut(ServiceError) + Send + 'static {
    move |e| {
        let body = ErrorResponse::from(&ApiError::Service(e));
        push(&tx, FeedFrame::Error(body));
    }
}
