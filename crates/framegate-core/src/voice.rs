//! Speech synthesis: a single-call proxy to the ElevenLabs text-to-speech
//! REST API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::truncate_detail;
use crate::config::GatewayConfig;
use crate::error::ProviderFailure;
use crate::ErrorClassification;

const TTS_MODEL: &str = "eleven_multilingual_v2";
const TTS_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceRequest {
    pub text: String,
    #[serde(default)]
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SynthesizedSpeech {
    pub audio_bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
struct TtsPayload<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.45,
            similarity_boost: 0.8,
            style: 0.25,
            use_speaker_boost: true,
        }
    }
}

/// Synthesize speech for the given text. The caller resolves the API key
/// from configuration before calling; a missing key is a configuration
/// problem, not a provider failure.
pub async fn synthesize(
    http: &reqwest::Client,
    config: &GatewayConfig,
    api_key: &str,
    request: &VoiceRequest,
) -> Result<SynthesizedSpeech, ProviderFailure> {
    let voice_id = request
        .voice_id
        .as_deref()
        .unwrap_or(&config.elevenlabs_voice_id);
    let url = format!(
        "{}/v1/text-to-speech/{voice_id}",
        config.elevenlabs_api_base
    );

    let payload = TtsPayload {
        text: &request.text,
        model_id: TTS_MODEL,
        voice_settings: VoiceSettings::default(),
    };

    let response = http
        .post(&url)
        .header("xi-api-key", api_key)
        .header(reqwest::header::ACCEPT, "audio/mpeg")
        .timeout(TTS_TIMEOUT)
        .json(&payload)
        .send()
        .await
        .map_err(|e| ProviderFailure::transient(format!("speech synthesis request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let classification = if status.is_server_error() {
            ErrorClassification::Transient
        } else {
            ErrorClassification::ProviderRejected
        };
        return Err(ProviderFailure::new(
            classification,
            format!(
                "speech synthesis failed ({}): {}",
                status.as_u16(),
                truncate_detail(&body)
            ),
        ));
    }

    let audio_bytes = response
        .bytes()
        .await
        .map_err(|e| ProviderFailure::transient(format!("speech synthesis request failed: {e}")))?
        .to_vec();
    if audio_bytes.is_empty() {
        return Err(ProviderFailure::new(
            ErrorClassification::ProviderRejected,
            "provider returned empty audio",
        ));
    }

    Ok(SynthesizedSpeech {
        audio_bytes,
        mime_type: "audio/mpeg".to_string(),
    })
}
