//! Error taxonomy for the gateway core.
//!
//! Every failure is mapped to exactly one of these types before it reaches
//! the HTTP boundary; nothing crosses unclassified. Nothing here retries:
//! retry policy belongs to the workflow orchestrator calling the gateway.

use serde::Serialize;

use crate::classify::ErrorClassification;

/// A single invalid field in an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Client-caused request rejection. Carries every invalid field, not just
/// the first one found, so the caller can fix the payload in one pass.
#[derive(Debug, Clone, thiserror::Error)]
#[error("request validation failed: {}", summarize_fields(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(fields: Vec<FieldError>) -> Self {
        Self { fields }
    }

    /// Rejection of a single field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }
}

fn summarize_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure while resolving a keyframe or reference image. Each mode is
/// distinct so logs tell unreachable hosts apart from bad responses, but all
/// of them classify as `Transient`: the caller may retry the whole request.
#[derive(Debug, thiserror::Error)]
pub enum KeyframeError {
    #[error("keyframe fetch failed for {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("keyframe fetch for {url} returned HTTP {status}")]
    BadStatus { url: String, status: u16 },

    #[error("keyframe fetch for {url} returned an empty body")]
    EmptyBody { url: String },
}

/// A provider-side failure, already normalized for the HTTP boundary.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{classification:?}: {detail}")]
pub struct ProviderFailure {
    pub classification: ErrorClassification,
    pub detail: String,
}

impl ProviderFailure {
    pub fn new(classification: ErrorClassification, detail: impl Into<String>) -> Self {
        Self {
            classification,
            detail: detail.into(),
        }
    }

    /// Network-level or timeout failure; safe for the caller to retry.
    pub fn transient(detail: impl Into<String>) -> Self {
        Self::new(ErrorClassification::Transient, detail)
    }
}

impl From<KeyframeError> for ProviderFailure {
    fn from(err: KeyframeError) -> Self {
        ProviderFailure::transient(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_field() {
        let err = ValidationError::new(vec![
            FieldError {
                field: "start_frame".to_string(),
                message: "is required".to_string(),
            },
            FieldError {
                field: "end_frame".to_string(),
                message: "is required".to_string(),
            },
        ]);
        let rendered = err.to_string();
        assert!(rendered.contains("start_frame: is required"));
        assert!(rendered.contains("end_frame: is required"));
    }

    #[test]
    fn test_keyframe_errors_classify_as_transient() {
        let err = KeyframeError::EmptyBody {
            url: "https://x/a.png".to_string(),
        };
        let failure = ProviderFailure::from(err);
        assert_eq!(failure.classification, ErrorClassification::Transient);
        assert!(failure.detail.contains("empty body"));
    }
}
