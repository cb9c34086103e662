//! Translation API - POST /api/translate
//!
//! Narration text in, French voice-over text out as JSON.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use framegate_core::translate::TranslateRequest;
use framegate_core::ValidationError;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ValidationError::single("text", "must be a non-empty string").into());
    }

    let translation =
        framegate_core::translate::translate(&state.genai, &state.config, &request).await?;
    Ok(Json(json!({ "translated_text": translation.translated_text })))
}
