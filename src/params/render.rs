//! Window and pipeline configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial window width (logical pixels)
    pub window_width: u32,

    /// Initial window height (logical pixels)
    pub window_height: u32,

    /// Append an FXAA pass after bloom
    pub fxaa: bool,

    /// Environment reflection map (equirectangular EXR/HDR/PNG)
    pub environment_path: String,

    /// Seed for the per-frame backdrop noise
    pub noise_seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fxaa: false,
            environment_path: "assets/piz_compressed.exr".to_string(),
            noise_seed: 0x5eed,
        }
    }
}
