//! Minimal typed client for the Gemini REST API surface the gateway uses:
//! `generateContent` for image/text work and `predictLongRunning` plus
//! operation polling and file download for video work.
//!
//! Every transport failure and every non-2xx provider response is turned
//! into a classified `ProviderFailure` here; callers never see raw reqwest
//! errors or unparsed provider bodies.

pub mod types;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::classify::classify_http_failure;
use crate::config::GatewayConfig;
use crate::error::ProviderFailure;

use self::types::{ContentResponse, GenerateContentPayload, Operation, VideoGenerationPayload};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    request_timeout: Duration,
}

impl GenAiClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            api_base: config.gemini_api_base.clone(),
            api_key: config.gemini_api_key.clone(),
            request_timeout: config.request_timeout,
        })
    }

    /// Start a long-running video generation. Returns the operation handle
    /// to poll; the provider rarely completes synchronously.
    pub async fn start_video_generation(
        &self,
        model: &str,
        payload: &VideoGenerationPayload,
    ) -> Result<Operation, ProviderFailure> {
        let url = format!("{}/v1beta/models/{}:predictLongRunning", self.api_base, model);
        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.request_timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| ProviderFailure::transient(format!("video generation request failed: {e}")))?;
        decode_json("video generation start", response).await
    }

    /// Poll a long-running operation by its fully-qualified name.
    pub async fn poll_operation(&self, name: &str) -> Result<Operation, ProviderFailure> {
        let url = format!("{}/v1beta/{}", self.api_base, name);
        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| ProviderFailure::transient(format!("operation poll failed: {e}")))?;
        decode_json("operation poll", response).await
    }

    /// Download a provider-hosted file (a finished video). Returns the raw
    /// bytes and the `Content-Type` the provider reported, if any.
    pub async fn download_file(
        &self,
        uri: &str,
    ) -> Result<(Vec<u8>, Option<String>), ProviderFailure> {
        let response = self
            .http
            .get(uri)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| ProviderFailure::transient(format!("video download failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let payload = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(classify_http_failure(status.as_u16(), &payload));
        }
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderFailure::transient(format!("video download failed: {e}")))?
            .to_vec();
        Ok((bytes, mime_type))
    }

    /// Single synchronous `generateContent` call (image and text work).
    pub async fn generate_content(
        &self,
        model: &str,
        payload: &GenerateContentPayload,
    ) -> Result<ContentResponse, ProviderFailure> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.api_base, model);
        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.request_timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| ProviderFailure::transient(format!("content generation request failed: {e}")))?;
        decode_json("content generation", response).await
    }
}

/// Decode a provider response: classify non-2xx bodies, parse 2xx JSON.
async fn decode_json<T: DeserializeOwned>(
    context: &str,
    response: reqwest::Response,
) -> Result<T, ProviderFailure> {
    let status = response.status();
    if !status.is_success() {
        let payload = response.json::<Value>().await.unwrap_or(Value::Null);
        return Err(classify_http_failure(status.as_u16(), &payload));
    }
    response.json::<T>().await.map_err(|e| {
        ProviderFailure::new(
            crate::ErrorClassification::Unknown,
            format!("{context}: malformed provider response: {e}"),
        )
    })
}
