//! Generation invocation and provider-error normalization.
//!
//! One provider call per request: start the long-running operation, poll it
//! within the configured budget, download the finished clip. The per-request
//! lifecycle is start → polling → completed-or-failed, both terminal; there
//! is no resume and no internal retry. In particular, a capability rejection
//! for the end keyframe fails the whole request; the gateway never retries
//! without the interpolation target.

use std::time::Instant;

use crate::classify::classify_provider_error;
use crate::config::GatewayConfig;
use crate::error::ProviderFailure;
use crate::genai::types::{GenerateVideoResponse, Operation, VideoHandle};
use crate::genai::GenAiClient;
use crate::ErrorClassification;
use crate::video::builder::ResolvedGenerationRequest;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// A completed generation: the decoded clip plus any narrative text the
/// provider attached.
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    pub video_bytes: Vec<u8>,
    pub mime_type: String,
    pub provider_text: Option<String>,
}

/// Issue the generation call for one resolved request.
pub async fn invoke(
    genai: &GenAiClient,
    config: &GatewayConfig,
    request: &ResolvedGenerationRequest,
) -> Result<GeneratedVideo, ProviderFailure> {
    let payload = request.to_payload();
    let mut operation = genai
        .start_video_generation(&request.model_id, &payload)
        .await?;
    tracing::info!(model = %request.model_id, operation = %operation.name, "video generation started");

    let started = Instant::now();
    while !operation.done {
        if operation.name.is_empty() {
            return Err(ProviderFailure::new(
                ErrorClassification::Unknown,
                "provider returned an unnamed pending operation",
            ));
        }
        if started.elapsed() >= config.poll_budget {
            return Err(ProviderFailure::transient(format!(
                "video generation did not complete within {}s",
                config.poll_budget.as_secs()
            )));
        }
        tokio::time::sleep(config.poll_interval).await;
        operation = genai.poll_operation(&operation.name).await?;
        tracing::debug!(operation = %operation.name, done = operation.done, "operation polled");
    }

    if let Some(error) = &operation.error {
        return Err(classify_provider_error(error));
    }

    let video = extract_video_handle(&operation)?;
    let (bytes, mime_type) = materialize(genai, video).await?;
    tracing::info!(size = bytes.len(), mime = %mime_type, "video generation completed");

    Ok(GeneratedVideo {
        video_bytes: bytes,
        mime_type,
        provider_text: None,
    })
}

fn extract_video_handle(operation: &Operation) -> Result<&VideoHandle, ProviderFailure> {
    let response: &GenerateVideoResponse = operation
        .response
        .as_ref()
        .and_then(|r| r.generate_video_response.as_ref())
        .ok_or_else(|| {
            ProviderFailure::new(
                ErrorClassification::Unknown,
                "operation completed without a video response",
            )
        })?;

    match response.generated_samples.first().and_then(|s| s.video.as_ref()) {
        Some(video) => Ok(video),
        None if !response.rai_media_filtered_reasons.is_empty() => Err(ProviderFailure::new(
            ErrorClassification::ProviderRejected,
            format!(
                "provider filtered the generation: {}",
                response.rai_media_filtered_reasons.join("; ")
            ),
        )),
        None => Err(ProviderFailure::new(
            ErrorClassification::Unknown,
            "provider returned no video samples",
        )),
    }
}

/// Turn the provider's video handle into raw bytes: inline payloads are
/// decoded in place, hosted files are downloaded.
async fn materialize(
    genai: &GenAiClient,
    video: &VideoHandle,
) -> Result<(Vec<u8>, String), ProviderFailure> {
    if let Some(inline) = &video.bytes_base64_encoded {
        let bytes = BASE64.decode(inline.as_bytes()).map_err(|e| {
            ProviderFailure::new(
                ErrorClassification::Unknown,
                format!("provider returned undecodable video data: {e}"),
            )
        })?;
        let mime = video
            .mime_type
            .clone()
            .unwrap_or_else(|| DEFAULT_VIDEO_MIME.to_string());
        return Ok((bytes, mime));
    }

    let Some(uri) = &video.uri else {
        return Err(ProviderFailure::new(
            ErrorClassification::Unknown,
            "provider video sample carries neither bytes nor a download URI",
        ));
    };
    let (bytes, header_mime) = genai.download_file(uri).await?;
    if bytes.is_empty() {
        return Err(ProviderFailure::transient("downloaded video was empty"));
    }
    let mime = video
        .mime_type
        .clone()
        .or(header_mime)
        .unwrap_or_else(|| DEFAULT_VIDEO_MIME.to_string());
    Ok((bytes, mime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn operation_with(response: serde_json::Value) -> Operation {
        serde_json::from_value(json!({
            "name": "models/veo/operations/op-1",
            "done": true,
            "response": response
        }))
        .unwrap()
    }

    #[test]
    fn test_filtered_generation_maps_to_provider_rejected() {
        let operation = operation_with(json!({
            "generateVideoResponse": {
                "generatedSamples": [],
                "raiMediaFilteredReasons": ["violence"]
            }
        }));
        let err = extract_video_handle(&operation).unwrap_err();
        assert_eq!(err.classification, ErrorClassification::ProviderRejected);
        assert!(err.detail.contains("violence"));
    }

    #[test]
    fn test_missing_video_response_is_unknown() {
        let operation = operation_with(json!({}));
        let err = extract_video_handle(&operation).unwrap_err();
        assert_eq!(err.classification, ErrorClassification::Unknown);
    }

    #[test]
    fn test_sample_with_uri_is_accepted() {
        let operation = operation_with(json!({
            "generateVideoResponse": {
                "generatedSamples": [{"video": {"uri": "https://host/files/clip"}}]
            }
        }));
        let video = extract_video_handle(&operation).unwrap();
        assert_eq!(video.uri.as_deref(), Some("https://host/files/clip"));
    }
}
