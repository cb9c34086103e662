//! Inbound scene-video payload validation.
//!
//! The validator takes the arbitrary JSON payload as received over HTTP and
//! either produces a typed `SceneVideoRequest` or a `ValidationError` that
//! enumerates every missing or malformed field, not just the first. It is a
//! pure function: no outbound call happens before it passes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FieldError, ValidationError};

/// Applied when the caller omits `duration_seconds`.
pub const DEFAULT_DURATION_SECONDS: f64 = 5.0;

/// A caller-supplied reference to a keyframe image. Resolved exactly once
/// per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyframeRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Square => "1:1",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "9:16" => Some(AspectRatio::Portrait),
            "16:9" => Some(AspectRatio::Landscape),
            "1:1" => Some(AspectRatio::Square),
            _ => None,
        }
    }
}

/// A validated scene-video request. Both keyframes are present by
/// construction; no code path past validation can drop the end frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneVideoRequest {
    pub image_prompt: String,
    pub script: String,
    pub start_frame: KeyframeRef,
    pub end_frame: KeyframeRef,
    pub duration_seconds: f64,
    pub aspect_ratio: AspectRatio,
}

/// Validate an untyped payload into a `SceneVideoRequest`.
pub fn validate(payload: &Value) -> Result<SceneVideoRequest, ValidationError> {
    let mut fields: Vec<FieldError> = Vec::new();

    let image_prompt = required_string(payload, "image_prompt", &mut fields);
    let script = required_string(payload, "script", &mut fields);
    let start_frame = required_keyframe(payload, "start_frame", &mut fields);
    let end_frame = required_keyframe(payload, "end_frame", &mut fields);
    let duration_seconds = optional_duration(payload, &mut fields);
    let aspect_ratio = optional_aspect_ratio(payload, &mut fields);

    if !fields.is_empty() {
        return Err(ValidationError::new(fields));
    }

    // Every accessor pushes a field error before returning None, so the
    // fallbacks below are unreachable once the list is empty.
    Ok(SceneVideoRequest {
        image_prompt: image_prompt.unwrap_or_default(),
        script: script.unwrap_or_default(),
        start_frame: start_frame.unwrap_or_else(|| KeyframeRef {
            url: String::new(),
            mime_type: None,
        }),
        end_frame: end_frame.unwrap_or_else(|| KeyframeRef {
            url: String::new(),
            mime_type: None,
        }),
        duration_seconds: duration_seconds.unwrap_or(DEFAULT_DURATION_SECONDS),
        aspect_ratio: aspect_ratio.unwrap_or_default(),
    })
}

fn push(fields: &mut Vec<FieldError>, field: impl Into<String>, message: impl Into<String>) {
    fields.push(FieldError {
        field: field.into(),
        message: message.into(),
    });
}

fn required_string(payload: &Value, field: &str, fields: &mut Vec<FieldError>) -> Option<String> {
    match payload.get(field) {
        None | Some(Value::Null) => {
            push(fields, field, "is required");
            None
        }
        Some(Value::String(value)) if value.trim().is_empty() => {
            push(fields, field, "must be a non-empty string");
            None
        }
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            push(fields, field, "must be a string");
            None
        }
    }
}

fn required_keyframe(
    payload: &Value,
    field: &str,
    fields: &mut Vec<FieldError>,
) -> Option<KeyframeRef> {
    let Some(value) = payload.get(field).filter(|v| !v.is_null()) else {
        push(fields, field, "is required");
        return None;
    };
    let Some(object) = value.as_object() else {
        push(fields, field, "must be an object with a url");
        return None;
    };

    let url = match object.get("url").and_then(Value::as_str).map(str::trim) {
        None | Some("") => {
            push(fields, format!("{field}.url"), "must be a non-empty string");
            return None;
        }
        Some(url) => url,
    };
    if !is_http_url(url) {
        push(fields, format!("{field}.url"), "must be a valid http(s) URL");
        return None;
    }

    let mime_type = match object.get("mime_type") {
        None | Some(Value::Null) => None,
        Some(Value::String(mime)) => Some(mime.clone()),
        Some(_) => {
            push(fields, format!("{field}.mime_type"), "must be a string");
            return None;
        }
    };

    Some(KeyframeRef {
        url: url.to_string(),
        mime_type,
    })
}

fn is_http_url(raw: &str) -> bool {
    match reqwest::Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

fn optional_duration(payload: &Value, fields: &mut Vec<FieldError>) -> Option<f64> {
    match payload.get("duration_seconds") {
        None | Some(Value::Null) => Some(DEFAULT_DURATION_SECONDS),
        Some(value) => match value.as_f64() {
            Some(seconds) if seconds.is_finite() && seconds > 0.0 => Some(seconds),
            _ => {
                push(fields, "duration_seconds", "must be a positive number");
                None
            }
        },
    }
}

fn optional_aspect_ratio(payload: &Value, fields: &mut Vec<FieldError>) -> Option<AspectRatio> {
    match payload.get("aspect_ratio") {
        None | Some(Value::Null) => Some(AspectRatio::default()),
        Some(Value::String(raw)) => match AspectRatio::parse(raw) {
            Some(ratio) => Some(ratio),
            None => {
                push(fields, "aspect_ratio", "must be one of 9:16, 16:9, 1:1");
                None
            }
        },
        Some(_) => {
            push(fields, "aspect_ratio", "must be one of 9:16, 16:9, 1:1");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "image_prompt": "knight draws sword",
            "script": "The knight faces the dragon at dawn.",
            "start_frame": {"url": "https://x/a.png"},
            "end_frame": {"url": "https://x/b.png"},
            "duration_seconds": 5,
            "aspect_ratio": "9:16"
        })
    }

    #[test]
    fn test_valid_payload_passes() {
        let request = validate(&valid_payload()).unwrap();
        assert_eq!(request.image_prompt, "knight draws sword");
        assert_eq!(request.start_frame.url, "https://x/a.png");
        assert_eq!(request.end_frame.url, "https://x/b.png");
        assert_eq!(request.duration_seconds, 5.0);
        assert_eq!(request.aspect_ratio, AspectRatio::Portrait);
    }

    #[test]
    fn test_missing_keyframes_are_both_reported() {
        let payload = json!({"image_prompt": "x", "script": "y"});
        let err = validate(&payload).unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"start_frame"));
        assert!(fields.contains(&"end_frame"));
    }

    #[test]
    fn test_every_invalid_field_is_listed_not_just_the_first() {
        let payload = json!({
            "image_prompt": "",
            "script": 42,
            "start_frame": {"url": "not a url"},
            "duration_seconds": -1,
            "aspect_ratio": "4:3"
        });
        let err = validate(&payload).unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "image_prompt",
                "script",
                "start_frame.url",
                "end_frame",
                "duration_seconds",
                "aspect_ratio"
            ]
        );
    }

    #[test]
    fn test_duration_and_aspect_ratio_defaults() {
        let payload = json!({
            "image_prompt": "x",
            "script": "y",
            "start_frame": {"url": "https://x/a.png"},
            "end_frame": {"url": "https://x/b.png"}
        });
        let request = validate(&payload).unwrap();
        assert_eq!(request.duration_seconds, DEFAULT_DURATION_SECONDS);
        assert_eq!(request.aspect_ratio, AspectRatio::Portrait);
    }

    #[test]
    fn test_non_http_scheme_is_rejected() {
        let mut payload = valid_payload();
        payload["end_frame"]["url"] = json!("ftp://x/b.png");
        let err = validate(&payload).unwrap_err();
        assert_eq!(err.fields[0].field, "end_frame.url");
    }

    #[test]
    fn test_keyframe_mime_type_is_carried_through() {
        let mut payload = valid_payload();
        payload["start_frame"]["mime_type"] = json!("image/jpeg");
        let request = validate(&payload).unwrap();
        assert_eq!(request.start_frame.mime_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn test_validation_is_idempotent() {
        // Re-validating the serialized form of an already-valid request
        // yields the same normalized structure.
        let first = validate(&valid_payload()).unwrap();
        let reserialized = serde_json::to_value(&first).unwrap();
        let second = validate(&reserialized).unwrap();
        assert_eq!(first, second);
    }
}
