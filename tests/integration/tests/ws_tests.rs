//! Room feed WebSocket tests
//!
//! Frames arrive as `{"type": ..., "data": ...}` snapshots. Tests wait for the
//! frame they care about and skip the rest, since the room and match streams
//! interleave freely.
//!
//! Run with: cargo test -p integration-tests --test ws_tests

use futures_util::StreamExt;
use integration_tests::{assert_json, fixtures::*, TestServer};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FRAME_TIMEOUT: Duration = Duration::from_secs(3);

async fn create_room(server: &TestServer, token: &str) -> RoomResponse {
    let response = server
        .post_auth("/api/v1/rooms", token, &CreateRoomRequest::new("Dinner", "A"))
        .await
        .unwrap();
    let body: Envelope<RoomResponse> = assert_json(response, StatusCode::CREATED).await.unwrap();
    body.data
}

async fn connect(server: &TestServer, room_id: &str, token: &str) -> Socket {
    let url = server.ws_url(&format!("/api/v1/rooms/{room_id}/feed"), token);
    let (socket, _) = connect_async(url).await.expect("feed handshake failed");
    socket
}

/// Next text frame, parsed
async fn next_frame(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(FRAME_TIMEOUT, socket.next())
            .await
            .expect("timed out waiting for a feed frame")
            .expect("feed closed")
            .expect("feed error");

        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("frame is not JSON");
        }
    }
}

/// Skip frames until one of `kind` satisfies `accept`
async fn wait_for(socket: &mut Socket, kind: &str, accept: impl Fn(&Value) -> bool) -> Value {
    loop {
        let frame = next_frame(socket).await;
        if frame["type"] == kind && accept(&frame["data"]) {
            return frame["data"].clone();
        }
    }
}

fn active_members(room: &Value) -> usize {
    room["members"]
        .as_array()
        .map(|members| members.iter().filter(|m| m["is_active"] == true).count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_feed_sends_initial_snapshots() {
    let server = TestServer::start().await.unwrap();
    let a = unique_user("a");
    let token = server.token(&a).unwrap();
    let room = create_room(&server, &token).await;

    let mut socket = connect(&server, &room.id, &token).await;

    let mut seen_room = false;
    let mut seen_matches = false;
    while !(seen_room && seen_matches) {
        let frame = next_frame(&mut socket).await;
        match frame["type"].as_str() {
            Some("ROOM_UPDATE") => {
                assert_eq!(frame["data"]["id"], room.id.as_str());
                assert_eq!(active_members(&frame["data"]), 1);
                seen_room = true;
            }
            Some("MATCHES_UPDATE") => {
                assert_eq!(frame["data"].as_array().map(Vec::len), Some(0));
                seen_matches = true;
            }
            other => panic!("unexpected frame type {other:?}"),
        }
    }

    socket.close(None).await.ok();
}

#[tokio::test]
async fn test_feed_follows_joins_and_matches() {
    let server = TestServer::start().await.unwrap();
    let (a, b) = (unique_user("a"), unique_user("b"));
    let (token_a, token_b) = (server.token(&a).unwrap(), server.token(&b).unwrap());
    let room = create_room(&server, &token_a).await;

    let mut socket = connect(&server, &room.id, &token_a).await;
    wait_for(&mut socket, "ROOM_UPDATE", |room| active_members(room) == 1).await;

    let response = server
        .post_auth("/api/v1/rooms/join", &token_b, &JoinRoomRequest::new(&room.pin, "B"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = wait_for(&mut socket, "ROOM_UPDATE", |room| active_members(room) == 2).await;
    assert_eq!(updated["id"], room.id.as_str());

    for token in [&token_a, &token_b] {
        let response = server
            .put_auth(&format!("/api/v1/rooms/{}/swipes/c1", room.id), token, &SwipeRequest::like())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let matches = wait_for(&mut socket, "MATCHES_UPDATE", |m| {
        m.as_array().is_some_and(|list| !list.is_empty())
    })
    .await;
    let list = matches.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["candidate_id"], "c1");
    assert_eq!(list[0]["room_id"], room.id.as_str());

    socket.close(None).await.ok();
}

#[tokio::test]
async fn test_outsider_cannot_open_feed() {
    let server = TestServer::start().await.unwrap();
    let (a, stranger) = (unique_user("a"), unique_user("stranger"));
    let token_a = server.token(&a).unwrap();
    let room = create_room(&server, &token_a).await;

    let url = server.ws_url(&format!("/api/v1/rooms/{}/feed", room.id), &server.token(&stranger).unwrap());
    match connect_async(url).await {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 403);
        }
        Err(e) => panic!("unexpected handshake error: {e}"),
        Ok(_) => panic!("outsider opened the feed"),
    }
}

#[tokio::test]
async fn test_feed_requires_token() {
    let server = TestServer::start().await.unwrap();
    let a = unique_user("a");
    let room = create_room(&server, &server.token(&a).unwrap()).await;

    let url = format!("ws://{}/api/v1/rooms/{}/feed", server.addr, room.id);
    match connect_async(url).await {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 401);
        }
        Err(e) => panic!("unexpected handshake error: {e}"),
        Ok(_) => panic!("feed opened without a token"),
    }
}
