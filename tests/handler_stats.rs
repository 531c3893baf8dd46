mod common;

use axum::http::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_stats_counts_links_and_users() {
    let (state, _pipeline) = common::memory_state();
    let first = common::server_as(state.clone(), "u1");
    let second = common::server_as(state, "u2");

    first.post("/").text("https://a.test").await;
    first.post("/").text("https://b.test").await;
    second.post("/").text("https://a.test").await;

    let response = first.get("/api/internal/stats").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["urls"], 3);
    assert_eq!(body["users"], 2);
}

#[tokio::test]
async fn test_stats_empty_store() {
    let (state, _pipeline) = common::memory_state();
    let server = common::server_as(state, "u1");

    let body = server.get("/api/internal/stats").await.json::<Value>();

    assert_eq!(body["urls"], 0);
    assert_eq!(body["users"], 0);
}

#[tokio::test]
async fn test_ping_without_database_fails() {
    let (state, _pipeline) = common::memory_state();
    let server = common::server_as(state, "u1");

    let response = server.get("/ping").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
