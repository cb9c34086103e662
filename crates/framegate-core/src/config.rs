//! Process-wide gateway configuration.
//!
//! All secrets and tunables are read from the environment exactly once at
//! startup and carried in an immutable `GatewayConfig` that is passed
//! explicitly into the components that need it. Handlers never read the
//! environment ad hoc, so tests can substitute a whole configuration.

use std::env;
use std::time::Duration;

/// Default Veo model for keyframe-interpolated video generation.
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-generate-preview";
/// Default Gemini model for scene image generation.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
/// Default Gemini model for narration translation.
pub const DEFAULT_TRANSLATE_MODEL: &str = "gemini-2.5-flash";
/// Default ElevenLabs voice for speech synthesis.
pub const DEFAULT_VOICE_ID: &str = "pNInz6obpgDQGcFmaJgB";

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io";

/// Immutable configuration for one gateway process.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bearer token expected in the `Authorization` header of every
    /// generation request.
    pub auth_token: String,

    /// API key for the Gemini API (video, image, and translation calls).
    pub gemini_api_key: String,
    /// Base URL of the Gemini API.
    pub gemini_api_base: String,

    /// API key for ElevenLabs speech synthesis. Optional: the voice route
    /// rejects requests when it is absent, everything else works without it.
    pub elevenlabs_api_key: Option<String>,
    /// Base URL of the ElevenLabs API.
    pub elevenlabs_api_base: String,
    /// Voice used when the caller does not name one.
    pub elevenlabs_voice_id: String,

    /// Video generation model id. Exactly one model is resolved per request;
    /// rejection handling is the invoker's job, never a silent model swap.
    pub video_model: String,
    /// Image generation model id.
    pub image_model: String,
    /// Translation model id.
    pub translate_model: String,

    /// Timeout for keyframe and reference-image fetches.
    pub fetch_timeout: Duration,
    /// Timeout for each individual provider HTTP request.
    pub request_timeout: Duration,
    /// Cadence at which long-running video operations are polled.
    pub poll_interval: Duration,
    /// Overall budget for one video generation, start to finish. Video
    /// synthesis is inherently slow; this is generous on purpose.
    pub poll_budget: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
}

impl GatewayConfig {
    /// Read the configuration from the environment. Call once at startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            auth_token: require_env("FRAMEGATE_AUTH_TOKEN")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_base: base_url_env("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            elevenlabs_api_key: non_empty_env("ELEVENLABS_API_KEY"),
            elevenlabs_api_base: base_url_env("ELEVENLABS_API_BASE", DEFAULT_ELEVENLABS_API_BASE),
            elevenlabs_voice_id: non_empty_env("ELEVENLABS_VOICE_ID")
                .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            video_model: non_empty_env("FRAMEGATE_VIDEO_MODEL")
                .unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string()),
            image_model: non_empty_env("FRAMEGATE_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            translate_model: non_empty_env("FRAMEGATE_TRANSLATE_MODEL")
                .unwrap_or_else(|| DEFAULT_TRANSLATE_MODEL.to_string()),
            fetch_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(10),
            poll_budget: Duration::from_secs(540),
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    non_empty_env(name).ok_or(ConfigError::MissingVar(name))
}

fn base_url_env(name: &str, default: &str) -> String {
    non_empty_env(name)
        .map(|value| value.trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_auth_token_is_reported() {
        std::env::remove_var("FRAMEGATE_AUTH_TOKEN");
        let err = GatewayConfig::from_env().err();
        assert!(matches!(err, Some(ConfigError::MissingVar("FRAMEGATE_AUTH_TOKEN"))));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        std::env::set_var("TEST_BASE_URL_VAR", "https://example.com/v1/");
        assert_eq!(
            base_url_env("TEST_BASE_URL_VAR", "unused"),
            "https://example.com/v1"
        );
        std::env::remove_var("TEST_BASE_URL_VAR");
    }

    #[test]
    fn test_blank_env_falls_back_to_default() {
        std::env::set_var("TEST_BLANK_VAR", "   ");
        assert_eq!(base_url_env("TEST_BLANK_VAR", "https://fallback"), "https://fallback");
        std::env::remove_var("TEST_BLANK_VAR");
    }
}
