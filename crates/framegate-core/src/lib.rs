//! Framegate core domain — configuration, error taxonomy, the generative
//! provider client, and the generation adapters.
//!
//! This crate is transport-agnostic: it knows nothing about axum or HTTP
//! status codes. The HTTP surface (routes, auth middleware, status mapping)
//! lives in `framegate-server`.

pub mod classify;
pub mod config;
pub mod error;
pub mod genai;
pub mod image;
pub mod translate;
pub mod video;
pub mod voice;

pub use classify::ErrorClassification;
pub use config::GatewayConfig;
pub use error::{FieldError, KeyframeError, ProviderFailure, ValidationError};
