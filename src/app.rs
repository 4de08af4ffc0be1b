use axum::{
    middleware::from_fn_with_state,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::SessionConfig;
use crate::handlers;
use crate::middleware::{session_middleware, SessionLayerState};

/// Build the application router.
///
/// Layer order matters: panics are caught inside the session layer so the
/// session cookie is still written when a handler blows up.
pub fn app(session: SessionConfig) -> Router {
    let session_state = SessionLayerState::new(session);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(session_routes())
        // Global middleware
        .layer(CatchPanicLayer::new())
        .layer(from_fn_with_state(session_state, session_middleware))
        .layer(TraceLayer::new_for_http())
}

fn session_routes() -> Router {
    Router::new()
        .route(
            "/api/session",
            get(handlers::session_get)
                .put(handlers::session_put)
                .delete(handlers::session_delete),
        )
        .route("/api/cookies", get(handlers::cookies_get))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "CVEDB web",
            "version": version,
            "endpoints": {
                "health": "/health",
                "session": "/api/session (GET, PUT, DELETE)",
                "cookies": "/api/cookies",
            }
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
