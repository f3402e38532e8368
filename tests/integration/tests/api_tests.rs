//! API Integration Tests
//!
//! Each test starts its own server on the in-memory store and local feed.
//! The PostgreSQL variant at the bottom runs only when DATABASE_URL is set.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, eventually, fixtures::*, postgres_config, TestServer,
};
use reqwest::StatusCode;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

async fn create_room(server: &TestServer, token: &str, name: &str, display_name: &str) -> RoomResponse {
    let response = server
        .post_auth("/api/v1/rooms", token, &CreateRoomRequest::new(name, display_name))
        .await
        .unwrap();
    let body: Envelope<RoomResponse> = assert_json(response, StatusCode::CREATED).await.unwrap();
    body.data
}

async fn join_room(server: &TestServer, token: &str, pin: &str, display_name: &str) -> RoomResponse {
    let response = server
        .post_auth("/api/v1/rooms/join", token, &JoinRoomRequest::new(pin, display_name))
        .await
        .unwrap();
    let body: Envelope<RoomResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    body.data
}

async fn swipe(server: &TestServer, token: &str, room_id: &str, candidate_id: &str, request: &SwipeRequest) -> SwipeResponse {
    let response = server
        .put_auth(&format!("/api/v1/rooms/{room_id}/swipes/{candidate_id}"), token, request)
        .await
        .unwrap();
    let body: Envelope<SwipeResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    body.data
}

async fn matches(server: &TestServer, token: &str, room_id: &str) -> Vec<MatchResponse> {
    let response = server
        .get_auth(&format!("/api/v1/rooms/{room_id}/matches"), token)
        .await
        .unwrap();
    let body: Envelope<Vec<MatchResponse>> = assert_json(response, StatusCode::OK).await.unwrap();
    body.data
}

async fn wait_for_matches(server: &TestServer, token: &str, room_id: &str, count: usize) -> Vec<MatchResponse> {
    eventually(|| async move {
        let found = matches(server, token, room_id).await;
        Ok((found.len() >= count).then_some(found))
    })
    .await
    .unwrap()
}

async fn error_code(response: reqwest::Response, status: StatusCode) -> String {
    let body: ErrorEnvelope = assert_json(response, status).await.unwrap();
    body.error.code
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["store"], "healthy");
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .client
        .post(format!("{}/api/v1/rooms", server.base_url()))
        .json(&CreateRoomRequest::new("Room", "Ana"))
        .send()
        .await
        .unwrap();
    assert_eq!(error_code(response, StatusCode::UNAUTHORIZED).await, "MISSING_AUTHORIZATION");
}

#[tokio::test]
async fn test_forged_token_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .post_auth("/api/v1/rooms", "not.a.jwt", &CreateRoomRequest::new("Room", "Ana"))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Room Tests
// ============================================================================

#[tokio::test]
async fn test_create_room() {
    let server = TestServer::start().await.unwrap();
    let owner = unique_user("owner");
    let token = server.token(&owner).unwrap();

    let room = create_room(&server, &token, "  Friday movie  ", "Ana").await;

    assert_eq!(room.name, "Friday movie");
    assert_eq!(room.pin.len(), 6);
    assert!(room.pin.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(room.owner_id, owner);
    assert_eq!(room.active_member_ids(), vec![owner.as_str()]);
    assert!(room.is_active);
}

#[tokio::test]
async fn test_create_room_validation() {
    let server = TestServer::start().await.unwrap();
    let token = server.token(&unique_user("owner")).unwrap();

    let response = server
        .post_auth("/api/v1/rooms", &token, &CreateRoomRequest::new("", "Ana"))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    // Passes the shape check, fails the domain parser after trimming
    let response = server
        .post_auth("/api/v1/rooms", &token, &CreateRoomRequest::new("   ", "Ana"))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_join_room_is_idempotent() {
    let server = TestServer::start().await.unwrap();
    let (a, b) = (unique_user("a"), unique_user("b"));
    let (token_a, token_b) = (server.token(&a).unwrap(), server.token(&b).unwrap());

    let room = create_room(&server, &token_a, "Dinner", "A").await;
    let joined = join_room(&server, &token_b, &format!(" {} ", room.pin), "B").await;
    assert_eq!(joined.id, room.id);

    let again = join_room(&server, &token_b, &room.pin, "B again").await;
    assert_eq!(again.active_member_ids(), vec![a.as_str(), b.as_str()]);
}

#[tokio::test]
async fn test_join_with_unknown_or_malformed_pin() {
    let server = TestServer::start().await.unwrap();
    let token = server.token(&unique_user("b")).unwrap();

    let owner_token = server.token(&unique_user("a")).unwrap();
    let room = create_room(&server, &owner_token, "Dinner", "A").await;
    // Any other 6-digit PIN is free: only one room exists
    let unknown = if room.pin == "000000" { "000001" } else { "000000" };

    let response = server
        .post_auth("/api/v1/rooms/join", &token, &JoinRoomRequest::new(unknown, "B"))
        .await
        .unwrap();
    assert_eq!(error_code(response, StatusCode::NOT_FOUND).await, "UNKNOWN_PIN");

    let response = server
        .post_auth("/api/v1/rooms/join", &token, &JoinRoomRequest::new("12ab56", "B"))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_get_room_requires_membership() {
    let server = TestServer::start().await.unwrap();
    let owner_token = server.token(&unique_user("a")).unwrap();
    let outsider_token = server.token(&unique_user("x")).unwrap();

    let room = create_room(&server, &owner_token, "Dinner", "A").await;
    let path = format!("/api/v1/rooms/{}", room.id);

    let response = server.get_auth(&path, &owner_token).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get_auth(&path, &outsider_token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.get_auth("/api/v1/rooms/not-an-id", &owner_token).await.unwrap();
    assert_eq!(error_code(response, StatusCode::BAD_REQUEST).await, "INVALID_PATH_PARAMETER");

    let response = server.get_auth("/api/v1/rooms/42", &owner_token).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_last_member_leaving_deactivates_room() {
    let server = TestServer::start().await.unwrap();
    let (a, b) = (unique_user("a"), unique_user("b"));
    let (token_a, token_b) = (server.token(&a).unwrap(), server.token(&b).unwrap());

    let room = create_room(&server, &token_a, "Dinner", "A").await;
    join_room(&server, &token_b, &room.pin, "B").await;
    swipe(&server, &token_a, &room.id, "c1", &SwipeRequest::like()).await;
    swipe(&server, &token_b, &room.id, "c1", &SwipeRequest::like()).await;
    wait_for_matches(&server, &token_a, &room.id, 1).await;

    let leave_path = format!("/api/v1/rooms/{}/members/@me", room.id);
    let response = server.delete_auth(&leave_path, &token_b).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    let response = server.delete_auth(&leave_path, &token_a).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    // The owner can still read the room and its history
    let response = server
        .get_auth(&format!("/api/v1/rooms/{}", room.id), &token_a)
        .await
        .unwrap();
    let body: Envelope<RoomResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!body.data.is_active);
    assert!(body.data.active_member_ids().is_empty());
    assert_eq!(matches(&server, &token_a, &room.id).await.len(), 1);

    // Its PIN no longer admits anyone
    let token_c = server.token(&unique_user("c")).unwrap();
    let response = server
        .post_auth("/api/v1/rooms/join", &token_c, &JoinRoomRequest::new(&room.pin, "C"))
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Swipe / Match Tests
// ============================================================================

#[tokio::test]
async fn test_two_members_like_the_same_candidate() {
    let server = TestServer::start().await.unwrap();
    let (a, b) = (unique_user("a"), unique_user("b"));
    let (token_a, token_b) = (server.token(&a).unwrap(), server.token(&b).unwrap());

    let room = create_room(&server, &token_a, "Movie night", "A").await;
    join_room(&server, &token_b, &room.pin, "B").await;

    let first = swipe(&server, &token_a, &room.id, "c1", &SwipeRequest::like()).await;
    assert!(first.recorded);
    assert_eq!(first.action, "like");
    assert!(swipe(&server, &token_b, &room.id, "c1", &SwipeRequest::like()).await.recorded);

    let found = wait_for_matches(&server, &token_a, &room.id, 1).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].room_id, room.id);
    assert_eq!(found[0].candidate_id, "c1");
    assert_eq!(found[0].member_ids, vec![a.clone(), b.clone()]);
    assert!(!found[0].is_viewed);

    // A likes c1 again: nothing new is written and no second match appears
    let again = swipe(&server, &token_a, &room.id, "c1", &SwipeRequest::like()).await;
    assert!(!again.recorded);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(matches(&server, &token_b, &room.id).await.len(), 1);
}

#[tokio::test]
async fn test_one_dislike_blocks_the_match() {
    let server = TestServer::start().await.unwrap();
    let users = [unique_user("a"), unique_user("b"), unique_user("c")];
    let tokens: Vec<String> = users.iter().map(|u| server.token(u).unwrap()).collect();

    let room = create_room(&server, &tokens[0], "Trip", "A").await;
    join_room(&server, &tokens[1], &room.pin, "B").await;
    join_room(&server, &tokens[2], &room.pin, "C").await;

    swipe(&server, &tokens[0], &room.id, "lisbon", &SwipeRequest::like()).await;
    swipe(&server, &tokens[1], &room.id, "lisbon", &SwipeRequest::action("superlike")).await;
    swipe(&server, &tokens[2], &room.id, "lisbon", &SwipeRequest::dislike()).await;

    for token in &tokens {
        swipe(&server, token, &room.id, "porto", &SwipeRequest::like()).await;
    }

    let found = wait_for_matches(&server, &tokens[0], &room.id, 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let found_later = matches(&server, &tokens[0], &room.id).await;

    assert_eq!(found.len(), 1);
    assert_eq!(found_later.len(), 1);
    assert_eq!(found_later[0].candidate_id, "porto");
    assert_eq!(found_later[0].member_ids.len(), 3);
}

#[tokio::test]
async fn test_swipe_is_recorded_on_the_room() {
    let server = TestServer::start().await.unwrap();
    let token = server.token(&unique_user("a")).unwrap();
    let room = create_room(&server, &token, "Solo", "A").await;

    swipe(&server, &token, &room.id, "c7", &SwipeRequest::dislike()).await;

    let response = server
        .get_auth(&format!("/api/v1/rooms/{}", room.id), &token)
        .await
        .unwrap();
    let body: Envelope<RoomResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    let current = body.data.members[0].current_swipe.as_ref().unwrap();
    assert_eq!(current.candidate_id, "c7");
    assert_eq!(current.action, "dislike");
}

#[tokio::test]
async fn test_swipe_rejections() {
    let server = TestServer::start().await.unwrap();
    let owner_token = server.token(&unique_user("a")).unwrap();
    let outsider_token = server.token(&unique_user("x")).unwrap();
    let room = create_room(&server, &owner_token, "Dinner", "A").await;
    let path = format!("/api/v1/rooms/{}/swipes/c1", room.id);

    let response = server
        .put_auth(&path, &owner_token, &SwipeRequest::action("maybe"))
        .await
        .unwrap();
    assert_eq!(error_code(response, StatusCode::BAD_REQUEST).await, "INVALID_BODY");

    let response = server.put_auth(&path, &outsider_token, &SwipeRequest::like()).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .put_auth("/api/v1/rooms/42/swipes/c1", &owner_token, &SwipeRequest::like())
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_matches_require_membership() {
    let server = TestServer::start().await.unwrap();
    let owner_token = server.token(&unique_user("a")).unwrap();
    let outsider_token = server.token(&unique_user("x")).unwrap();
    let room = create_room(&server, &owner_token, "Dinner", "A").await;

    let response = server
        .get_auth(&format!("/api/v1/rooms/{}/matches", room.id), &outsider_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_mark_match_viewed() {
    let server = TestServer::start().await.unwrap();
    let (token_a, token_b) = (
        server.token(&unique_user("a")).unwrap(),
        server.token(&unique_user("b")).unwrap(),
    );
    let outsider_token = server.token(&unique_user("x")).unwrap();

    let room = create_room(&server, &token_a, "Dinner", "A").await;
    join_room(&server, &token_b, &room.pin, "B").await;
    swipe(&server, &token_a, &room.id, "c1", &SwipeRequest::like()).await;
    swipe(&server, &token_b, &room.id, "c1", &SwipeRequest::like()).await;
    let found = wait_for_matches(&server, &token_a, &room.id, 1).await;
    let path = format!("/api/v1/matches/{}/viewed", found[0].id);

    let response = server.post_empty_auth(&path, &outsider_token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.post_empty_auth(&path, &token_b).await.unwrap();
    let body: Envelope<MatchResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(body.data.is_viewed);

    let listed = matches(&server, &token_a, &room.id).await;
    assert!(listed[0].is_viewed);

    let response = server.post_empty_auth("/api/v1/matches/42/viewed", &token_a).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// PostgreSQL
// ============================================================================

#[tokio::test]
async fn test_match_flow_on_postgres() {
    let Some(config) = postgres_config() else {
        return;
    };

    let server = TestServer::start_with_config(config).await.expect("Failed to start server");
    let (a, b) = (unique_user("a"), unique_user("b"));
    let (token_a, token_b) = (server.token(&a).unwrap(), server.token(&b).unwrap());

    let room = create_room(&server, &token_a, "Movie night", "A").await;
    join_room(&server, &token_b, &room.pin, "B").await;
    swipe(&server, &token_a, &room.id, "c1", &SwipeRequest::like()).await;
    swipe(&server, &token_b, &room.id, "c1", &SwipeRequest::like()).await;

    let found = wait_for_matches(&server, &token_a, &room.id, 1).await;
    assert_eq!(found[0].member_ids, vec![a, b]);
    assert!(!swipe(&server, &token_a, &room.id, "c1", &SwipeRequest::like()).await.recorded);
}
