//! Provider error classification.
//!
//! The provider's error surface is not stable across call sites: a plain
//! HTTP error body carries `{"error": {"code": 404, "message": "...",
//! "status": "NOT_FOUND"}}`, while an error embedded in a long-running
//! operation carries a numeric gRPC-style `code` and often no `status`
//! string at all. Extraction therefore runs an ordered list of strategies
//! over the payload; the first one that yields a code wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderFailure;

/// Normalized, provider-independent failure category. Drives the HTTP
/// status mapping and the caller's retry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClassification {
    /// The resolved model id is not found or not deployed.
    ModelUnavailable,
    /// The provider rejected the last-frame/interpolation capability for the
    /// resolved model. Terminal: the gateway never retries without the end
    /// keyframe.
    UnsupportedCapability,
    /// Any other provider-side rejection (quota, invalid argument, policy).
    ProviderRejected,
    /// Network-level or timeout failure; the caller may retry.
    Transient,
    Unknown,
}

/// A provider error code, as extracted from one of the known payload shapes.
#[derive(Debug, Clone, PartialEq)]
enum ProviderCode {
    Status(String),
    Numeric(i64),
}

type Extractor = fn(&Value) -> Option<ProviderCode>;

/// Ordered extraction strategies; first match wins.
const EXTRACTORS: &[Extractor] = &[extract_status, extract_numeric_code];

fn extract_status(error: &Value) -> Option<ProviderCode> {
    error
        .get("status")
        .and_then(Value::as_str)
        .map(|s| ProviderCode::Status(s.trim().to_ascii_uppercase()))
        .filter(|code| !matches!(code, ProviderCode::Status(s) if s.is_empty()))
}

fn extract_numeric_code(error: &Value) -> Option<ProviderCode> {
    error
        .get("code")
        .and_then(Value::as_i64)
        .map(ProviderCode::Numeric)
}

/// Classify a provider error payload (either the raw error object or a
/// wrapper with an `error` key) into a `ProviderFailure`.
pub fn classify_provider_error(payload: &Value) -> ProviderFailure {
    let error = payload.get("error").unwrap_or(payload);
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty());
    let code = EXTRACTORS.iter().find_map(|extract| extract(error));
    let classification = classify(code.as_ref(), message.unwrap_or_default());
    let detail = match message {
        Some(message) => truncate_detail(message),
        None => truncate_detail(&payload.to_string()),
    };
    ProviderFailure::new(classification, detail)
}

/// Classify a non-2xx provider response. Prefers the structured error body;
/// falls back to the transport-level status code when the body carries no
/// recognizable error shape.
pub fn classify_http_failure(status: u16, payload: &Value) -> ProviderFailure {
    let error = payload.get("error").unwrap_or(payload);
    if error.get("status").is_some() || error.get("code").is_some() {
        return classify_provider_error(payload);
    }
    let classification = classify(Some(&ProviderCode::Numeric(i64::from(status))), "");
    ProviderFailure::new(classification, format!("provider returned HTTP {status}"))
}

fn classify(code: Option<&ProviderCode>, message: &str) -> ErrorClassification {
    match code {
        Some(ProviderCode::Status(status)) => match status.as_str() {
            "NOT_FOUND" => ErrorClassification::ModelUnavailable,
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" if mentions_keyframe_capability(message) => {
                ErrorClassification::UnsupportedCapability
            }
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "PERMISSION_DENIED"
            | "UNAUTHENTICATED" | "RESOURCE_EXHAUSTED" | "OUT_OF_RANGE" => {
                ErrorClassification::ProviderRejected
            }
            "UNAVAILABLE" | "DEADLINE_EXCEEDED" | "INTERNAL" | "ABORTED" => {
                ErrorClassification::Transient
            }
            _ => ErrorClassification::Unknown,
        },
        Some(ProviderCode::Numeric(code)) => match code {
            // HTTP 404 and gRPC NOT_FOUND (5)
            404 | 5 => ErrorClassification::ModelUnavailable,
            // HTTP 400 and gRPC INVALID_ARGUMENT (3) / FAILED_PRECONDITION (9)
            400 | 3 | 9 if mentions_keyframe_capability(message) => {
                ErrorClassification::UnsupportedCapability
            }
            400 | 401 | 403 | 429 | 3 | 7 | 8 | 9 | 11 | 16 => {
                ErrorClassification::ProviderRejected
            }
            // HTTP 5xx and gRPC DEADLINE_EXCEEDED (4) / ABORTED (10) /
            // INTERNAL (13) / UNAVAILABLE (14)
            500 | 502 | 503 | 504 | 4 | 10 | 13 | 14 => ErrorClassification::Transient,
            _ => ErrorClassification::Unknown,
        },
        None => ErrorClassification::Unknown,
    }
}

fn mentions_keyframe_capability(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["last_frame", "lastframe", "last frame", "end frame", "interpolation"]
        .iter()
        .any(|needle| message.contains(needle))
}

pub(crate) fn truncate_detail(text: &str) -> String {
    const MAX_CHARS: usize = 512;
    match text.char_indices().nth(MAX_CHARS) {
        None => text.to_string(),
        Some((idx, _)) => format!("{}...", &text[..idx]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_string_wins_over_numeric_code() {
        // The numeric code alone would map to Transient; the status string
        // is tried first and maps to ModelUnavailable.
        let payload = json!({
            "error": {"code": 503, "status": "NOT_FOUND", "message": "models/nope is not found"}
        });
        let failure = classify_provider_error(&payload);
        assert_eq!(failure.classification, ErrorClassification::ModelUnavailable);
        assert_eq!(failure.detail, "models/nope is not found");
    }

    #[test]
    fn test_numeric_code_is_the_fallback_tier() {
        let payload = json!({"error": {"code": 14, "message": "backend unavailable"}});
        let failure = classify_provider_error(&payload);
        assert_eq!(failure.classification, ErrorClassification::Transient);
    }

    #[test]
    fn test_bare_operation_error_without_wrapper() {
        let payload = json!({"code": 5, "message": "model not deployed"});
        let failure = classify_provider_error(&payload);
        assert_eq!(failure.classification, ErrorClassification::ModelUnavailable);
    }

    #[test]
    fn test_capability_rejection_is_terminal_classification() {
        let payload = json!({
            "error": {
                "code": 400,
                "status": "INVALID_ARGUMENT",
                "message": "lastFrame is not supported by this model"
            }
        });
        let failure = classify_provider_error(&payload);
        assert_eq!(
            failure.classification,
            ErrorClassification::UnsupportedCapability
        );
    }

    #[test]
    fn test_invalid_argument_without_keyframe_mention_is_rejected() {
        let payload = json!({
            "error": {"status": "INVALID_ARGUMENT", "message": "prompt too long"}
        });
        let failure = classify_provider_error(&payload);
        assert_eq!(failure.classification, ErrorClassification::ProviderRejected);
    }

    #[test]
    fn test_quota_exhaustion_maps_to_provider_rejected() {
        let payload = json!({
            "error": {"code": 429, "status": "RESOURCE_EXHAUSTED", "message": "quota exceeded"}
        });
        let failure = classify_provider_error(&payload);
        assert_eq!(failure.classification, ErrorClassification::ProviderRejected);
    }

    #[test]
    fn test_unrecognized_payload_maps_to_unknown() {
        let payload = json!({"error": {"weird": true}});
        let failure = classify_provider_error(&payload);
        assert_eq!(failure.classification, ErrorClassification::Unknown);
        assert!(failure.detail.contains("weird"));
    }

    #[test]
    fn test_http_status_is_the_last_resort_tier() {
        let failure = classify_http_failure(503, &Value::Null);
        assert_eq!(failure.classification, ErrorClassification::Transient);
        assert_eq!(failure.detail, "provider returned HTTP 503");

        // A structured body still wins over the transport status.
        let payload = json!({"error": {"status": "NOT_FOUND", "message": "no such model"}});
        let failure = classify_http_failure(503, &payload);
        assert_eq!(failure.classification, ErrorClassification::ModelUnavailable);
    }

    #[test]
    fn test_classification_serializes_pascal_case() {
        let rendered = serde_json::to_string(&ErrorClassification::UnsupportedCapability).unwrap();
        assert_eq!(rendered, "\"UnsupportedCapability\"");
    }

    #[test]
    fn test_truncate_detail_respects_char_boundaries() {
        let long = "é".repeat(600);
        let truncated = truncate_detail(&long);
        assert!(truncated.chars().count() <= 515);
        assert!(truncated.ends_with("..."));
    }
}
