//! Scene & shader pipeline: frame updates, compositing and the wgpu backend.
//!
//! [`ScenePipeline`] owns the scene, its uniforms and the pass chain, and
//! drives any [`FrameRenderer`]. [`GpuRenderer`] is the wgpu implementation.

mod environment;
mod gpu;
mod passes;
mod pipeline;
mod post;

use thiserror::Error;

use crate::scene::{SceneState, UniformRegistry};

// Re-export public types
pub use environment::{
    EnvironmentCompletion, EnvironmentError, EnvironmentLoader, EnvironmentMap, EnvironmentSlot,
    FileEnvironmentLoader, LoadState,
};
pub use gpu::GpuRenderer;
pub use passes::{
    PassChain, PassKind, PassResolutions, ViewportSize, BLOOM_FACTORS, BLOOM_KERNEL_RADII,
    BLOOM_MIP_COUNT,
};
pub use pipeline::ScenePipeline;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    Surface(String),

    #[error("Failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    Device(String),

    #[error("Failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("Environment map {width}x{height} exceeds the {max} texel limit")]
    EnvironmentTooLarge { width: u32, height: u32, max: u32 },

    #[error("Renderer already disposed")]
    Disposed,
}

/// Everything a renderer needs to draw one frame
pub struct FrameSnapshot<'a> {
    pub scene: &'a SceneState,
    pub uniforms: &'a UniformRegistry,
    pub passes: &'a [PassKind],
}

/// Backend that owns GPU resources and turns a snapshot into pixels
pub trait FrameRenderer {
    /// Reallocate size-dependent targets
    fn resize(&mut self, resolutions: &PassResolutions);

    /// Upload and bind the reflection map to the sphere material
    fn bind_environment(&mut self, map: &EnvironmentMap) -> Result<(), RenderError>;

    /// Run the pass chain and present
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), RenderError>;

    /// Release every GPU resource; later calls are no-ops
    fn dispose(&mut self);
}
