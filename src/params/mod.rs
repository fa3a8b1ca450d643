//! Parameter definitions with units and documented semantics.
//!
//! All tuning constants live here with:
//! - Units (world units, degrees, dBFS, 60fps frames)
//! - Documented ranges and meanings
//! - Defaults matching the reference look

mod audio;
mod render;
mod scene;

// Re-export all types
pub use audio::{audio_constants, AnalyzerConfig};
pub use render::RenderConfig;
pub use scene::{
    srgb_hex_to_linear, BackdropParams, BloomParams, CameraParams, ReactivityWeights,
    SceneParams, SphereParams,
};
