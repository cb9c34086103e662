//! Shared application state.
//!
//! One immutable state value per process: the injected configuration plus
//! the two outbound clients. Nothing here is mutated after startup and no
//! per-request data is retained, so concurrent requests share nothing but
//! read-only handles.

use std::sync::Arc;

use framegate_core::config::GatewayConfig;
use framegate_core::genai::GenAiClient;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub config: GatewayConfig,
    /// Typed client for the Gemini API (video, image, translation).
    pub genai: GenAiClient,
    /// Plain client for keyframe/reference fetches and the speech proxy.
    pub http: reqwest::Client,
}

impl AppStateInner {
    pub fn new(config: GatewayConfig) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        let genai =
            GenAiClient::new(&config).map_err(|e| format!("Failed to build provider client: {}", e))?;
        Ok(Self {
            config,
            genai,
            http,
        })
    }
}
