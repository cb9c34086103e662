//! Video generation API - POST /api/generate/video
//!
//! Accepts a scene description plus start/end keyframe references and
//! returns the provider-rendered interpolation clip as a binary body. The
//! pipeline is strictly sequential: validate → resolve keyframes → build
//! provider request → invoke → encode. Validation failures return before
//! any outbound call; keyframe failures return before any provider call.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use framegate_core::video::{builder, invoker, keyframes, request};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn generate_video(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    let scene = request::validate(&payload)?;

    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        model = %state.config.video_model,
        aspect_ratio = %scene.aspect_ratio.as_str(),
        duration = scene.duration_seconds,
        "video generation request accepted"
    );

    let (start_frame, end_frame) =
        keyframes::resolve_keyframes(&state.http, &scene.start_frame, &scene.end_frame).await?;

    let resolved = builder::build_generation_request(&scene, start_frame, end_frame, &state.config);
    let video = invoker::invoke(&state.genai, &state.config, &resolved).await?;

    tracing::info!(%request_id, bytes = video.video_bytes.len(), "video generation completed");
    Ok(encode_video_response(video))
}

/// Encode a completed generation: raw binary body, provider content type,
/// and the provider's narrative text (when any) in a side-channel header.
fn encode_video_response(video: invoker::GeneratedVideo) -> Response {
    let mut response =
        ([(header::CONTENT_TYPE, video.mime_type)], video.video_bytes).into_response();
    if let Some(text) = video.provider_text {
        append_provider_text(&mut response, &text);
    }
    response
}

/// Fold provider commentary into the `X-Provider-Text` header. Header values
/// cannot carry newlines, so they collapse to spaces.
pub(crate) fn append_provider_text(response: &mut Response, text: &str) {
    let single_line = text.replace(['\r', '\n'], " ");
    if let Ok(value) = header::HeaderValue::from_str(&single_line) {
        response.headers_mut().insert("x-provider-text", value);
    }
}
