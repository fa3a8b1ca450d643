//! Shader uniform values driven by audio, held in one explicit registry.

use glam::{Vec2, Vec4};

/// Values feeding the sphere deformation shader
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SphereUniforms {
    /// Deformation phase, advanced by output bass energy
    pub time: f32,

    /// Weighted input bands (bass, mid, treble, 0)
    pub input_data: Vec4,

    /// Weighted output bands (bass, mid, treble, 0)
    pub output_data: Vec4,
}

/// Values feeding the backdrop gradient shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropUniforms {
    /// Drawing-buffer size (physical pixels)
    pub resolution: Vec2,

    /// Per-frame noise seed
    pub rand: f32,
}

impl Default for BackdropUniforms {
    fn default() -> Self {
        Self {
            resolution: Vec2::ONE,
            rand: 0.0,
        }
    }
}

/// Every audio- or viewport-driven uniform in the scene.
///
/// Returned by scene construction and threaded explicitly through each
/// frame update; the renderer reads it but never writes it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UniformRegistry {
    pub sphere: SphereUniforms,
    pub backdrop: BackdropUniforms,
}
