//! Bearer-token authentication middleware.
//!
//! Runs before every generation handler; handlers never see an
//! unauthenticated request. A missing or malformed header yields 401, a
//! token mismatch 403. The workflow orchestrator relies on that split to
//! tell "not configured" from "wrong secret".

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = supplied else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error_code": "Unauthorized",
                "detail": "Missing or invalid authorization header",
            })),
        ));
    };

    if token != state.config.auth_token {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error_code": "Forbidden",
                "detail": "Invalid authentication token",
            })),
        ));
    }

    Ok(next.run(request).await)
}
