//! Scene image generation: a single `generateContent` call with reference
//! images as the visual anchor and, for END frames, the start frame as the
//! temporal-continuity context.

use serde::Deserialize;

use crate::config::GatewayConfig;
use crate::error::ProviderFailure;
use crate::genai::types::{
    Content, GenerateContentPayload, GenerationConfig, ImageConfig, Part, SafetySetting,
};
use crate::genai::GenAiClient;
use crate::video::keyframes;
use crate::video::request::KeyframeRef;
use crate::ErrorClassification;

const SYSTEM_INSTRUCTION_BASE: &str = "\
### Role
You are a specialist in visual continuity for animation. Your job is to GENERATE \
an image for the requested scene - not describe it in text.

### Output Rules (CRITICAL)
- You MUST output an IMAGE. Do NOT output a text description or prompt.
- You may include a very short caption alongside the image, but the image is mandatory.

### Character Consistency Logic (IMPORTANT)
1. **Primary Reference:** You will be provided with Reference Images and a description. \
Use these as the visual \"Anchor\" for all generations - match their style, colors, and character design.
2. **Override Clause:** If the \"Current Scene Action\" explicitly describes a DIFFERENT \
character design (e.g., \"A new villain appears\" or \"The protagonist transforms into a \
dragon\"), the Scene Action takes priority over the Reference Images.
3. **Implicit Usage:** If the Scene Action just says \"He walks,\" assume \"He\" is the \
character from the Reference Images.

### Style
- Maintain visual consistency with the provided reference images.
- Match the art style, lighting, and color palette of the references.";

const END_FRAME_ADDENDUM: &str = "

### Temporal Continuity (END FRAME)
- You are generating the END frame of a scene. A START frame image is provided.
- The end frame must be visually continuous with the start frame: same characters, \
same environment, same art style, same lighting, same color palette.
- The ONLY differences should come from the scene action (e.g., a character has moved, \
an object has changed state). Everything else must remain consistent.
- Think of start -> end as two keyframes of the same animation.";

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceImage {
    pub url: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    #[default]
    Start,
    End,
}

/// Inbound scene-image request.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneImageRequest {
    pub assets: String,
    pub creative_direction: String,
    pub image_prompt: String,
    pub script: String,
    pub script_action: String,
    #[serde(default)]
    pub reference_images: Vec<ReferenceImage>,
    #[serde(default)]
    pub frame_type: FrameType,
    #[serde(default)]
    pub start_frame_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
    pub provider_text: Option<String>,
}

/// Generate one scene image. Reference images (and the start frame, when
/// producing an END frame) are fetched up front; their fetch failures are
/// transient like keyframe failures in the video pipeline.
pub async fn generate(
    http: &reqwest::Client,
    genai: &GenAiClient,
    config: &GatewayConfig,
    request: &SceneImageRequest,
) -> Result<GeneratedImage, ProviderFailure> {
    let mut parts: Vec<Part> = Vec::new();

    for reference in &request.reference_images {
        let label = reference.label.as_deref().unwrap_or("reference");
        let frame = keyframes::resolve_keyframe(
            http,
            &KeyframeRef {
                url: reference.url.clone(),
                mime_type: reference.mime_type.clone(),
            },
        )
        .await?;
        parts.push(Part::text(format!("[Reference image: {label}]")));
        parts.push(Part::inline(&frame.bytes, frame.mime_type));
    }

    let is_end_frame = request.frame_type == FrameType::End && request.start_frame_url.is_some();
    if is_end_frame {
        if let Some(url) = &request.start_frame_url {
            let frame = keyframes::resolve_keyframe(
                http,
                &KeyframeRef {
                    url: url.clone(),
                    mime_type: None,
                },
            )
            .await?;
            parts.push(Part::text("[Reference image: start_frame]"));
            parts.push(Part::inline(&frame.bytes, frame.mime_type));
        }
    }

    let frame_label = if is_end_frame { "END" } else { "START" };
    parts.push(Part::text(format!(
        "### REFERENCE ASSETS & CREATIVE DIRECTION (Anchor)\n\
         Assets: {}\n\
         Creative Direction: {}\n\n\
         ### CURRENT SCENE ACTION - {frame_label} FRAME (Instruction)\n\
         {}\n\n\
         ### SCRIPT CONTEXT (SOLELY FOR CONTEXT)\n\
         Full Script: {}\n\
         Scene Script: {}",
        request.assets,
        request.creative_direction,
        request.image_prompt,
        request.script,
        request.script_action
    )));

    let mut system_text = SYSTEM_INSTRUCTION_BASE.to_string();
    if is_end_frame {
        system_text.push_str(END_FRAME_ADDENDUM);
    }

    let payload = GenerateContentPayload {
        contents: vec![Content::user(parts)],
        system_instruction: Some(Content::system(system_text)),
        generation_config: GenerationConfig {
            temperature: Some(1.0),
            top_p: Some(0.95),
            max_output_tokens: Some(32768),
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            image_config: Some(ImageConfig {
                aspect_ratio: "9:16".to_string(),
                image_size: "1K".to_string(),
            }),
        },
        safety_settings: permissive_safety_settings(),
    };

    let response = genai.generate_content(&config.image_model, &payload).await?;
    let provider_text = response.joined_text();

    let Some(decoded) = response.first_inline_data() else {
        let detail = match &provider_text {
            Some(text) => format!("provider did not return an image. Text response: {text}"),
            None => "provider did not return an image".to_string(),
        };
        return Err(ProviderFailure::new(
            ErrorClassification::ProviderRejected,
            detail,
        ));
    };
    let (image_bytes, mime_type) = decoded.map_err(|e| {
        ProviderFailure::new(
            ErrorClassification::Unknown,
            format!("provider returned undecodable image data: {e}"),
        )
    })?;

    Ok(GeneratedImage {
        image_bytes,
        mime_type,
        provider_text,
    })
}

fn permissive_safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_HARASSMENT",
    ]
    .iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "OFF".to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_type_deserializes_lowercase() {
        let request: SceneImageRequest = serde_json::from_value(serde_json::json!({
            "assets": "a hero",
            "creative_direction": "storybook",
            "image_prompt": "he walks",
            "script": "full script",
            "script_action": "scene one",
            "frame_type": "end",
            "start_frame_url": "https://x/start.png"
        }))
        .unwrap();
        assert_eq!(request.frame_type, FrameType::End);
        assert!(request.reference_images.is_empty());
    }

    #[test]
    fn test_frame_type_defaults_to_start() {
        let request: SceneImageRequest = serde_json::from_value(serde_json::json!({
            "assets": "a hero",
            "creative_direction": "storybook",
            "image_prompt": "he walks",
            "script": "full script",
            "script_action": "scene one"
        }))
        .unwrap();
        assert_eq!(request.frame_type, FrameType::Start);
    }
}
