use axum::{extract::rejection::JsonRejection, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::session::Session;

fn describe(session: &Session) -> Value {
    json!({
        "session": session.data(),
        "is_new": session.is_new(),
        "is_changed": session.is_changed(),
        "is_populated": session.is_populated(),
    })
}

/// GET /api/session - Current session contents
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "session": { "user": "alice" },
///     "is_new": false,
///     "is_changed": false,
///     "is_populated": true
///   }
/// }
/// ```
pub async fn session_get(session: Session) -> ApiResult<Value> {
    Ok(ApiResponse::success(describe(&session)))
}

/// PUT /api/session - Merge a JSON object into the session
///
/// Keys with a `null` value are removed.
pub async fn session_put(
    session: Session,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;

    let Value::Object(fields) = payload else {
        return Err(ApiError::bad_request("Session body must be a JSON object"));
    };

    for (key, value) in fields {
        if value.is_null() {
            session.remove(&key);
        } else {
            session.insert_value(key, value);
        }
    }

    Ok(ApiResponse::success(describe(&session)))
}

/// DELETE /api/session - Drop the session and expire its cookie
pub async fn session_delete(session: Session) -> ApiResult<Value> {
    session.clear();
    tracing::debug!("Session cleared by client request");
    Ok(ApiResponse::success(json!({ "cleared": true })))
}
