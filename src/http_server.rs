//! HTTP server implementation using Axum.

use crate::session::{SessionError, SessionId, SessionStore};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Serialize)]
struct CreateSessionResponse {
    session_id: SessionId,
}

#[derive(Serialize)]
struct ListSessionsResponse {
    session_ids: Vec<SessionId>,
}

type ApiError = (StatusCode, String);

/// Build the router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Session management
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/sweep", post(sweep_sessions))
        .route("/sessions/:id", delete(delete_session))
        .route("/sessions/:id/store", get(load_store).put(save_store))
        // Misc
        .route("/api/hello", get(hello))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on the given port until `shutdown` resolves.
pub async fn run_server(
    port: u16,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Map a session error onto the response the client sees.
fn error_response(err: SessionError) -> ApiError {
    let status = match err {
        SessionError::BadParameter(_) => StatusCode::BAD_REQUEST,
        SessionError::NotFound => StatusCode::NOT_FOUND,
        SessionError::InvalidToken => StatusCode::CONFLICT,
        SessionError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        SessionError::Stopped => StatusCode::SERVICE_UNAVAILABLE,
        SessionError::InvalidCommand | SessionError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

async fn health() -> &'static str {
    "OK"
}

async fn hello() -> Json<serde_json::Value> {
    Json(json!({ "hello": "world" }))
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let session_id = state.sessions.create().await.map_err(error_response)?;
    info!("Created session: {}", session_id);
    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}

async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<ListSessionsResponse>, ApiError> {
    let session_ids = state.sessions.session_ids().await.map_err(error_response)?;
    Ok(Json(ListSessionsResponse { session_ids }))
}

async fn load_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionStore>, ApiError> {
    let store = state
        .sessions
        .load_store(&SessionId::from(id))
        .await
        .map_err(error_response)?;
    Ok(Json(store))
}

async fn save_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(store): Json<SessionStore>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .save_store(&SessionId::from(id), store)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::from(id);
    state.sessions.delete(&id).await.map_err(error_response)?;
    info!("Deleted session: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn sweep_sessions(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.sessions.delete_expired().await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        assert_eq!(error_response(SessionError::NotFound).0, StatusCode::NOT_FOUND);
        assert_eq!(error_response(SessionError::InvalidToken).0, StatusCode::CONFLICT);
        assert_eq!(
            error_response(SessionError::BadParameter("x".into())).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(SessionError::InvalidCommand).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error_response(SessionError::Stopped).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
