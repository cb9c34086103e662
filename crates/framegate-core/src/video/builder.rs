//! Provider request assembly for keyframe-interpolated generation.
//!
//! The builder resolves exactly one model identifier per request (the
//! configured default, already overridable through the environment at
//! startup) and wires both keyframes into the provider payload: the start
//! frame as the seed image, the end frame as the interpolation target.
//! Handling a provider rejection is the invoker's job; the builder never
//! decides fallback.

use crate::config::GatewayConfig;
use crate::genai::types::{InlineImage, VideoGenerationPayload, VideoInstance, VideoParameters};
use crate::video::keyframes::NormalizedKeyframe;
use crate::video::request::{AspectRatio, SceneVideoRequest};

const NEGATIVE_PROMPT: &str = "glitch, distortion, text artifacts, abrupt style changes";

/// Immutable provider request for one generation call, owned by the invoker
/// for the duration of that call.
#[derive(Debug)]
pub struct ResolvedGenerationRequest {
    pub model_id: String,
    pub prompt: String,
    pub start_frame: NormalizedKeyframe,
    pub end_frame: NormalizedKeyframe,
    pub duration_seconds: f64,
    pub aspect_ratio: AspectRatio,
}

/// Combine the validated request and both normalized keyframes into one
/// `ResolvedGenerationRequest`.
pub fn build_generation_request(
    request: &SceneVideoRequest,
    start_frame: NormalizedKeyframe,
    end_frame: NormalizedKeyframe,
    config: &GatewayConfig,
) -> ResolvedGenerationRequest {
    ResolvedGenerationRequest {
        model_id: config.video_model.clone(),
        prompt: compose_prompt(request),
        start_frame,
        end_frame,
        duration_seconds: request.duration_seconds,
        aspect_ratio: request.aspect_ratio,
    }
}

fn compose_prompt(request: &SceneVideoRequest) -> String {
    format!(
        "Action: {}\n\n\
         Script context: {}\n\n\
         Create one coherent shot that starts on the first image and evolves \
         naturally into the second image.\n\
         Keep cinematic quality, stable identity, and smooth transitions.",
        request.image_prompt, request.script
    )
}

impl ResolvedGenerationRequest {
    /// Render the provider wire payload. Both keyframes are always attached;
    /// there is no single-keyframe path.
    pub fn to_payload(&self) -> VideoGenerationPayload {
        VideoGenerationPayload {
            instances: vec![VideoInstance {
                prompt: self.prompt.clone(),
                image: InlineImage::new(&self.start_frame.bytes, &self.start_frame.mime_type),
                last_frame: InlineImage::new(&self.end_frame.bytes, &self.end_frame.mime_type),
            }],
            parameters: VideoParameters {
                aspect_ratio: self.aspect_ratio.as_str().to_string(),
                duration_seconds: self.duration_seconds.max(1.0).round() as u32,
                number_of_videos: 1,
                person_generation: "allow_adult".to_string(),
                negative_prompt: NEGATIVE_PROMPT.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::request::KeyframeRef;

    fn test_config(video_model: &str) -> GatewayConfig {
        GatewayConfig {
            auth_token: "secret".to_string(),
            gemini_api_key: "key".to_string(),
            gemini_api_base: "https://example.invalid".to_string(),
            elevenlabs_api_key: None,
            elevenlabs_api_base: "https://example.invalid".to_string(),
            elevenlabs_voice_id: "voice".to_string(),
            video_model: video_model.to_string(),
            image_model: "image-model".to_string(),
            translate_model: "translate-model".to_string(),
            fetch_timeout: std::time::Duration::from_secs(30),
            request_timeout: std::time::Duration::from_secs(120),
            poll_interval: std::time::Duration::from_secs(10),
            poll_budget: std::time::Duration::from_secs(540),
        }
    }

    fn scene_request() -> SceneVideoRequest {
        SceneVideoRequest {
            image_prompt: "knight draws sword".to_string(),
            script: "The knight faces the dragon.".to_string(),
            start_frame: KeyframeRef {
                url: "https://x/a.png".to_string(),
                mime_type: None,
            },
            end_frame: KeyframeRef {
                url: "https://x/b.png".to_string(),
                mime_type: None,
            },
            duration_seconds: 5.0,
            aspect_ratio: AspectRatio::Portrait,
        }
    }

    fn keyframe(bytes: &[u8], mime: &str) -> NormalizedKeyframe {
        NormalizedKeyframe {
            bytes: bytes.to_vec(),
            mime_type: mime.to_string(),
        }
    }

    #[test]
    fn test_builder_resolves_the_configured_model() {
        let resolved = build_generation_request(
            &scene_request(),
            keyframe(b"a", "image/png"),
            keyframe(b"b", "image/png"),
            &test_config("veo-override-model"),
        );
        assert_eq!(resolved.model_id, "veo-override-model");
    }

    #[test]
    fn test_both_keyframes_are_always_attached() {
        let resolved = build_generation_request(
            &scene_request(),
            keyframe(b"start-bytes", "image/png"),
            keyframe(b"end-bytes", "image/jpeg"),
            &test_config("veo"),
        );
        let payload = serde_json::to_value(resolved.to_payload()).unwrap();
        let instance = &payload["instances"][0];
        assert!(instance["image"]["bytesBase64Encoded"].is_string());
        assert!(instance["lastFrame"]["bytesBase64Encoded"].is_string());
        assert_eq!(instance["lastFrame"]["mimeType"], "image/jpeg");
    }

    #[test]
    fn test_prompt_carries_action_and_script_context() {
        let resolved = build_generation_request(
            &scene_request(),
            keyframe(b"a", "image/png"),
            keyframe(b"b", "image/png"),
            &test_config("veo"),
        );
        assert!(resolved.prompt.contains("knight draws sword"));
        assert!(resolved.prompt.contains("The knight faces the dragon."));
        assert!(resolved.prompt.contains("evolves naturally into the second image"));
    }

    #[test]
    fn test_fractional_durations_round_to_whole_provider_seconds() {
        let mut request = scene_request();
        request.duration_seconds = 4.6;
        let resolved = build_generation_request(
            &request,
            keyframe(b"a", "image/png"),
            keyframe(b"b", "image/png"),
            &test_config("veo"),
        );
        let payload = serde_json::to_value(resolved.to_payload()).unwrap();
        assert_eq!(payload["parameters"]["durationSeconds"], 5);
    }
}
