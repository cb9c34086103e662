//! Image generation API - POST /api/generate/image
//!
//! Single-call proxy: reference images anchor the visual style, and END
//! frames additionally receive the start frame for temporal continuity.
//! Returns the generated image as a binary body with any model commentary
//! in the `X-Provider-Text` header.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use framegate_core::image::{self, SceneImageRequest};

use crate::api::video::append_provider_text;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn generate_image(
    State(state): State<AppState>,
    Json(request): Json<SceneImageRequest>,
) -> Result<Response, ApiError> {
    let generated = image::generate(&state.http, &state.genai, &state.config, &request).await?;

    tracing::info!(
        model = %state.config.image_model,
        bytes = generated.image_bytes.len(),
        "image generation completed"
    );

    let mut response = (
        [(header::CONTENT_TYPE, generated.mime_type)],
        generated.image_bytes,
    )
        .into_response();
    if let Some(text) = generated.provider_text {
        append_provider_text(&mut response, &text);
    }
    Ok(response)
}
