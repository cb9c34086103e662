pub mod image;
pub mod translate;
pub mod video;
pub mod voice;

use axum::middleware;
use axum::routing::post;
use axum::Router;

use crate::auth;
use crate::state::AppState;

/// Build the authenticated API router. Every route here sits behind the
/// bearer-token middleware; the health probe is wired separately.
pub fn api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/generate/video", post(video::generate_video))
        .route("/api/generate/image", post(image::generate_image))
        .route("/api/generate/voice", post(voice::generate_voice))
        .route("/api/translate", post(translate::translate))
        .layer(middleware::from_fn_with_state(state, auth::require_bearer))
}
