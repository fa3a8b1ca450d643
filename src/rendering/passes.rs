//! Post-processing pass chain and the resolutions each pass renders at.

use glam::Vec2;
use log::debug;

/// Number of bloom blur levels
pub const BLOOM_MIP_COUNT: usize = 5;

/// Gaussian kernel radius per bloom level
pub const BLOOM_KERNEL_RADII: [u32; BLOOM_MIP_COUNT] = [3, 5, 7, 9, 11];

/// Contribution of each bloom level before the radius lerp
pub const BLOOM_FACTORS: [f32; BLOOM_MIP_COUNT] = [1.0, 0.8, 0.6, 0.4, 0.2];

/// Host viewport in logical pixels plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// Physical drawing-buffer size, at least 1x1
    pub fn physical(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

/// One stage of the compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Scene render into the HDR target
    Base,
    /// Threshold, blur mip chain, additive composite
    Bloom,
    /// Edge anti-aliasing
    Fxaa,
}

/// Every size that depends on the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct PassResolutions {
    /// Drawing buffer (physical pixels)
    pub drawing: (u32, u32),

    /// Bloom blur levels, half the drawing buffer then halving
    pub bloom_mips: [(u32, u32); BLOOM_MIP_COUNT],

    /// One over the drawing-buffer size, for the FXAA sample offsets
    pub fxaa_texel: Vec2,

    /// Backdrop `resolution` uniform (physical pixels)
    pub backdrop: Vec2,

    /// Camera aspect ratio (logical width / height)
    pub aspect: f32,
}

impl PassResolutions {
    pub fn for_viewport(viewport: ViewportSize) -> Self {
        let drawing = viewport.physical();

        let mut bloom_mips = [(1, 1); BLOOM_MIP_COUNT];
        let mut mip = ((drawing.0 / 2).max(1), (drawing.1 / 2).max(1));
        for level in bloom_mips.iter_mut() {
            *level = mip;
            mip = ((mip.0 / 2).max(1), (mip.1 / 2).max(1));
        }

        let aspect = viewport.width.max(1) as f32 / viewport.height.max(1) as f32;

        Self {
            drawing,
            bloom_mips,
            fxaa_texel: Vec2::new(1.0 / drawing.0 as f32, 1.0 / drawing.1 as f32),
            backdrop: Vec2::new(drawing.0 as f32, drawing.1 as f32),
            aspect,
        }
    }
}

/// Ordered pass list bound to one output surface
#[derive(Debug, Clone)]
pub struct PassChain {
    passes: Vec<PassKind>,
    resolutions: Option<PassResolutions>,
}

impl PassChain {
    pub fn new(fxaa: bool) -> Self {
        let mut passes = vec![PassKind::Base, PassKind::Bloom];
        if fxaa {
            passes.push(PassKind::Fxaa);
        }
        Self {
            passes,
            resolutions: None,
        }
    }

    pub fn passes(&self) -> &[PassKind] {
        &self.passes
    }

    pub fn resolutions(&self) -> Option<&PassResolutions> {
        self.resolutions.as_ref()
    }

    /// Recompute resolutions; returns true when anything changed
    pub fn resize(&mut self, viewport: ViewportSize) -> bool {
        let next = PassResolutions::for_viewport(viewport);
        if self.resolutions.as_ref() == Some(&next) {
            return false;
        }
        debug!(
            "Pass chain resized: drawing {}x{}, bloom base {}x{}",
            next.drawing.0, next.drawing.1, next.bloom_mips[0].0, next.bloom_mips[0].1
        );
        self.resolutions = Some(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_order() {
        assert_eq!(PassChain::new(false).passes(), &[PassKind::Base, PassKind::Bloom]);
        assert_eq!(
            PassChain::new(true).passes(),
            &[PassKind::Base, PassKind::Bloom, PassKind::Fxaa]
        );
    }

    #[test]
    fn test_resolutions_scale_with_pixel_ratio() {
        let res = PassResolutions::for_viewport(ViewportSize::new(800, 600, 2.0));
        assert_eq!(res.drawing, (1600, 1200));
        assert_eq!(res.bloom_mips[0], (800, 600));
        assert_eq!(res.bloom_mips[4], (50, 37));
        assert_eq!(res.backdrop, Vec2::new(1600.0, 1200.0));
        assert!((res.aspect - 4.0 / 3.0).abs() < 1e-6);
        assert!((res.fxaa_texel.x - 1.0 / 1600.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sized_viewport_clamps() {
        let res = PassResolutions::for_viewport(ViewportSize::new(0, 0, 1.0));
        assert_eq!(res.drawing, (1, 1));
        assert!(res.bloom_mips.iter().all(|&m| m == (1, 1)));
        assert_eq!(res.aspect, 1.0);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut chain = PassChain::new(true);
        let viewport = ViewportSize::new(1280, 720, 1.0);

        assert!(chain.resize(viewport));
        let first = chain.resolutions().cloned();

        assert!(!chain.resize(viewport));
        assert_eq!(chain.resolutions().cloned(), first);

        assert!(chain.resize(ViewportSize::new(640, 360, 1.0)));
    }
}
