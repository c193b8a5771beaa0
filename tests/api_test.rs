//! Integration tests for the HTTP API.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use sessiond::config::SessionConfig;
use sessiond::http_server::build_router;
use sessiond::session::SessionManager;
use sessiond::state::AppState;

async fn test_app() -> (SessionManager, Router) {
    let config = SessionConfig::default().with_sweep_interval(Duration::from_secs(3600));
    let manager = SessionManager::start(config).await.unwrap();
    let app = build_router(AppState::new(manager.handle()));
    (manager, app)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create_session(app: &Router) -> String {
    let (status, body) = send(
        app,
        Request::post("/sessions").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let json: Value = serde_json::from_slice(&body).unwrap();
    json["session_id"].as_str().unwrap().to_string()
}

// ============================================================================
// Misc Endpoints
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (manager, app) = test_app().await;

    let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"OK");

    manager.stop().await;
}

#[tokio::test]
async fn test_hello() {
    let (manager, app) = test_app().await;

    let (status, body) =
        send(&app, Request::get("/api/hello").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({ "hello": "world" }));

    manager.stop().await;
}

// ============================================================================
// Sessions API
// ============================================================================

#[tokio::test]
async fn test_store_round_trip_and_conflict() {
    let (manager, app) = test_app().await;
    let id = create_session(&app).await;
    let store_uri = format!("/sessions/{}/store", id);

    let (status, body) = send(&app, Request::get(&store_uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let loaded: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(loaded["data"], json!({}));
    let token = loaded["consistency_token"].as_str().unwrap().to_string();

    let update = json!({ "data": { "name": "alice" }, "consistency_token": token });
    let (status, _) = send(&app, json_request("PUT", &store_uri, update.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Same token again: someone else already wrote.
    let (status, _) = send(&app, json_request("PUT", &store_uri, update)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, Request::get(&store_uri).body(Body::empty()).unwrap()).await;
    let reloaded: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(reloaded["data"]["name"], "alice");
    assert_ne!(reloaded["consistency_token"].as_str().unwrap(), token);

    manager.stop().await;
}

#[tokio::test]
async fn test_delete_then_not_found() {
    let (manager, app) = test_app().await;
    let id = create_session(&app).await;

    let (status, body) = send(&app, Request::get("/sessions").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(listed["session_ids"], json!([id.clone()]));

    let uri = format!("/sessions/{}", id);
    let (status, _) = send(&app, Request::delete(&uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Request::delete(&uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let store_uri = format!("/sessions/{}/store", id);
    let (status, _) = send(&app, Request::get(&store_uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    manager.stop().await;
}

#[tokio::test]
async fn test_sweep_endpoint() {
    let (manager, app) = test_app().await;
    let id = create_session(&app).await;

    let (status, _) = send(&app, Request::post("/sessions/sweep").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Fresh session survives the sweep.
    let store_uri = format!("/sessions/{}/store", id);
    let (status, _) = send(&app, Request::get(&store_uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    manager.stop().await;
}

#[tokio::test]
async fn test_requests_after_stop_are_unavailable() {
    let (manager, app) = test_app().await;
    manager.stop().await;

    let (status, _) = send(&app, Request::post("/sessions").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
