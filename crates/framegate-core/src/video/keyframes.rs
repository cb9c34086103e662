//! Keyframe resolution: fetch the referenced image and settle its MIME type.
//!
//! The original source format is preserved and bytes are passed through
//! untranscoded. MIME resolution order: caller-supplied type if it is a
//! recognized image type, then the response `Content-Type` header, then
//! magic-byte sniffing of the content, then the `image/png` fallback.

use reqwest::header::CONTENT_TYPE;

use crate::error::KeyframeError;
use crate::video::request::KeyframeRef;

/// Documented default when no other source yields a usable type.
pub const FALLBACK_MIME: &str = "image/png";

const RECOGNIZED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/gif"];

/// A provider-ready keyframe attachment.
#[derive(Debug, Clone)]
pub struct NormalizedKeyframe {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Resolve both keyframes concurrently. The fetches are independent and
/// order-insensitive, but either failure aborts the request before any
/// provider call is made.
pub async fn resolve_keyframes(
    http: &reqwest::Client,
    start: &KeyframeRef,
    end: &KeyframeRef,
) -> Result<(NormalizedKeyframe, NormalizedKeyframe), KeyframeError> {
    tokio::try_join!(resolve_keyframe(http, start), resolve_keyframe(http, end))
}

/// Fetch one keyframe and normalize its MIME type.
pub async fn resolve_keyframe(
    http: &reqwest::Client,
    frame: &KeyframeRef,
) -> Result<NormalizedKeyframe, KeyframeError> {
    let response = http
        .get(&frame.url)
        .send()
        .await
        .map_err(|source| KeyframeError::Unreachable {
            url: frame.url.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(KeyframeError::BadStatus {
            url: frame.url.clone(),
            status: status.as_u16(),
        });
    }

    let header_mime = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(normalize_content_type);

    let bytes = response
        .bytes()
        .await
        .map_err(|source| KeyframeError::Unreachable {
            url: frame.url.clone(),
            source,
        })?
        .to_vec();
    if bytes.is_empty() {
        return Err(KeyframeError::EmptyBody {
            url: frame.url.clone(),
        });
    }

    let mime_type = resolve_mime(frame.mime_type.as_deref(), header_mime.as_deref(), &bytes);
    tracing::debug!(url = %frame.url, mime = %mime_type, size = bytes.len(), "keyframe resolved");

    Ok(NormalizedKeyframe { bytes, mime_type })
}

fn resolve_mime(declared: Option<&str>, header: Option<&str>, bytes: &[u8]) -> String {
    if let Some(declared) = declared {
        let declared = declared.trim().to_ascii_lowercase();
        if RECOGNIZED_IMAGE_TYPES.contains(&declared.as_str()) {
            return declared;
        }
    }
    if let Some(header) = header {
        if header.starts_with("image/") {
            return header.to_string();
        }
    }
    if let Some(sniffed) = sniff_image_mime(bytes) {
        return sniffed.to_string();
    }
    FALLBACK_MIME.to_string()
}

/// Strip parameters and normalize case: `image/PNG; charset=x` → `image/png`.
fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or(raw)
        .trim()
        .to_ascii_lowercase()
}

fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}
