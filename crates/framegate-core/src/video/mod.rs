//! Keyframe-interpolated video generation.
//!
//! The pipeline is strictly sequential with no branching back:
//! validate → resolve keyframes → build the provider request → invoke.
//! Both keyframes are mandatory; there is no degraded single-keyframe mode.

pub mod builder;
pub mod invoker;
pub mod keyframes;
pub mod request;

pub use builder::ResolvedGenerationRequest;
pub use invoker::GeneratedVideo;
pub use keyframes::NormalizedKeyframe;
pub use request::{AspectRatio, KeyframeRef, SceneVideoRequest};
