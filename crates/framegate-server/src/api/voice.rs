//! Speech synthesis API - POST /api/generate/voice
//!
//! Text in, `audio/mpeg` out. Requires the ElevenLabs API key in the
//! gateway configuration; its absence is a 500, not a provider failure.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use framegate_core::voice::{self, VoiceRequest};
use framegate_core::ValidationError;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn generate_voice(
    State(state): State<AppState>,
    Json(request): Json<VoiceRequest>,
) -> Result<Response, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ValidationError::single("text", "must be a non-empty string").into());
    }

    let Some(api_key) = state.config.elevenlabs_api_key.as_deref() else {
        return Err(ApiError::Configuration(
            "ELEVENLABS_API_KEY is not configured".to_string(),
        ));
    };

    let speech = voice::synthesize(&state.http, &state.config, api_key, &request).await?;

    tracing::info!(bytes = speech.audio_bytes.len(), "speech synthesis completed");
    Ok(([(header::CONTENT_TYPE, speech.mime_type)], speech.audio_bytes).into_response())
}
