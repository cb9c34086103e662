//! Narration translation: one text-only `generateContent` call producing
//! French voice-over copy.

use serde::Deserialize;

use crate::config::GatewayConfig;
use crate::error::ProviderFailure;
use crate::genai::types::{Content, GenerateContentPayload, GenerationConfig, Part};
use crate::genai::GenAiClient;
use crate::ErrorClassification;

#[derive(Debug, Clone, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Translation {
    pub translated_text: String,
}

pub async fn translate(
    genai: &GenAiClient,
    config: &GatewayConfig,
    request: &TranslateRequest,
) -> Result<Translation, ProviderFailure> {
    let prompt = format!(
        "Translate this narration into natural French for short-form video \
         voice-over. Keep meaning, pacing, and emotional tone. Return only \
         the translated text.\n\nText: {}",
        request.text
    );

    let payload = GenerateContentPayload {
        contents: vec![Content::user(vec![Part::text(prompt)])],
        system_instruction: None,
        generation_config: GenerationConfig {
            temperature: Some(0.0),
            max_output_tokens: Some(512),
            response_modalities: vec!["TEXT".to_string()],
            ..GenerationConfig::default()
        },
        safety_settings: Vec::new(),
    };

    let response = genai
        .generate_content(&config.translate_model, &payload)
        .await?;

    match response.joined_text().map(|text| text.trim().to_string()) {
        Some(text) if !text.is_empty() => Ok(Translation {
            translated_text: text,
        }),
        _ => Err(ProviderFailure::new(
            ErrorClassification::ProviderRejected,
            "provider returned no translated text",
        )),
    }
}
