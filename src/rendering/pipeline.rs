//! Scene & shader pipeline driving a renderer backend.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::environment::{EnvironmentLoader, EnvironmentSlot};
use super::passes::{PassChain, PassResolutions, ViewportSize};
use super::{FrameRenderer, FrameSnapshot, RenderError};
use crate::audio::FrequencyFrame;
use crate::params::SceneParams;
use crate::scene::{build_scene, SceneState, UniformRegistry};

/// Scene graph, uniforms and pass chain bound to one renderer
pub struct ScenePipeline<R: FrameRenderer> {
    renderer: R,
    scene: SceneState,
    uniforms: UniformRegistry,
    passes: PassChain,
    environment: EnvironmentSlot,
    rng: StdRng,
    disposed: bool,
}

impl<R: FrameRenderer> ScenePipeline<R> {
    /// Build the scene with its initial constants around `renderer`
    pub fn new(renderer: R, params: SceneParams, fxaa: bool, noise_seed: u64) -> Self {
        let (scene, uniforms) = build_scene(params);
        Self {
            renderer,
            scene,
            uniforms,
            passes: PassChain::new(fxaa),
            environment: EnvironmentSlot::default(),
            rng: StdRng::seed_from_u64(noise_seed),
            disposed: false,
        }
    }

    /// Start loading the reflection map; the sphere stays hidden meanwhile
    pub fn load_environment(&mut self, url: &str, loader: &dyn EnvironmentLoader) {
        if self.disposed {
            return;
        }
        info!("Loading environment map from {}", url);
        loader.begin(url, self.environment.begin());
    }

    /// Apply a finished environment load, if any.
    ///
    /// Success binds the map and reveals the sphere; failure logs and
    /// reveals the sphere without reflections.
    pub fn poll_environment(&mut self) {
        if self.disposed {
            return;
        }
        match self.environment.take_finished() {
            Some(Ok(map)) => match self.renderer.bind_environment(&map) {
                Ok(()) => self.scene.reveal_sphere(true),
                Err(e) => {
                    warn!("Failed to bind environment map: {}", e);
                    self.scene.reveal_sphere(false);
                }
            },
            Some(Err(e)) => {
                warn!("Failed to load environment map: {}", e);
                self.scene.reveal_sphere(false);
            }
            None => {}
        }
    }

    /// Per-frame update from both spectra (`dt` in 60fps frames)
    pub fn apply_frame(&mut self, dt: f32, input: &FrequencyFrame, output: &FrequencyFrame) {
        self.scene.advance(&mut self.uniforms, dt, input, output);
        let range = self.scene.params.backdrop.rand_range.max(f32::EPSILON);
        self.uniforms.backdrop.rand = self.rng.random_range(0.0..range);
    }

    /// Run the pass chain and present
    pub fn composite(&mut self) -> Result<(), RenderError> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        let frame = FrameSnapshot {
            scene: &self.scene,
            uniforms: &self.uniforms,
            passes: self.passes.passes(),
        };
        self.renderer.render(&frame)
    }

    /// Follow a viewport change; repeated sizes are no-ops for the renderer
    pub fn resize(&mut self, viewport: ViewportSize) {
        if self.disposed {
            return;
        }
        if !self.passes.resize(viewport) {
            return;
        }
        if let Some(res) = self.passes.resolutions() {
            self.scene.camera.aspect = res.aspect;
            self.uniforms.backdrop.resolution = res.backdrop;
            self.renderer.resize(res);
        }
    }

    /// Release GPU resources exactly once and drop any in-flight load
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.environment.close();
        self.renderer.dispose();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn uniforms(&self) -> &UniformRegistry {
        &self.uniforms
    }

    pub fn resolutions(&self) -> Option<&PassResolutions> {
        self.passes.resolutions()
    }

    pub fn passes(&self) -> &PassChain {
        &self.passes
    }

    pub fn environment(&self) -> &EnvironmentSlot {
        &self.environment
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::{EnvironmentCompletion, EnvironmentError, EnvironmentMap, PassKind};
    use std::cell::RefCell;

    #[derive(Default)]
    struct CountingRenderer {
        resizes: usize,
        renders: usize,
        disposals: usize,
        bound: bool,
        last_passes: Vec<PassKind>,
    }

    impl FrameRenderer for CountingRenderer {
        fn resize(&mut self, _resolutions: &PassResolutions) {
            self.resizes += 1;
        }

        fn bind_environment(&mut self, _map: &EnvironmentMap) -> Result<(), RenderError> {
            self.bound = true;
            Ok(())
        }

        fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), RenderError> {
            self.renders += 1;
            self.last_passes = frame.passes.to_vec();
            Ok(())
        }

        fn dispose(&mut self) {
            self.disposals += 1;
        }
    }

    /// Holds completions so tests decide when loads finish
    #[derive(Default)]
    struct ManualLoader {
        pending: RefCell<Vec<EnvironmentCompletion>>,
    }

    impl EnvironmentLoader for ManualLoader {
        fn begin(&self, _url: &str, completion: EnvironmentCompletion) {
            self.pending.borrow_mut().push(completion);
        }
    }

    impl ManualLoader {
        fn finish(&self, result: Result<EnvironmentMap, EnvironmentError>) -> bool {
            self.pending
                .borrow_mut()
                .pop()
                .map(|c| c.complete(result))
                .unwrap_or(false)
        }
    }

    fn pipeline(fxaa: bool) -> ScenePipeline<CountingRenderer> {
        ScenePipeline::new(CountingRenderer::default(), SceneParams::default(), fxaa, 7)
    }

    fn map() -> EnvironmentMap {
        EnvironmentMap {
            width: 2,
            height: 1,
            texels: vec![[1.0; 4]; 2],
        }
    }

    #[test]
    fn test_resize_twice_reallocates_once() {
        let mut p = pipeline(false);
        let viewport = ViewportSize::new(1024, 768, 1.5);

        p.resize(viewport);
        let first = p.resolutions().cloned();
        p.resize(viewport);

        assert_eq!(p.renderer().resizes, 1);
        assert_eq!(p.resolutions().cloned(), first);
        assert_eq!(p.uniforms().backdrop.resolution, glam::Vec2::new(1536.0, 1152.0));
        assert!((p.scene().camera.aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_composite_runs_configured_passes() {
        let mut p = pipeline(true);
        p.composite().unwrap();
        assert_eq!(
            p.renderer().last_passes,
            vec![PassKind::Base, PassKind::Bloom, PassKind::Fxaa]
        );
    }

    #[test]
    fn test_successful_load_binds_and_reveals() {
        let mut p = pipeline(false);
        let loader = ManualLoader::default();
        p.load_environment("env.exr", &loader);

        p.poll_environment();
        assert!(!p.scene().sphere.visible);

        assert!(loader.finish(Ok(map())));
        p.poll_environment();
        assert!(p.scene().sphere.visible);
        assert!(p.scene().sphere.environment_bound);
        assert!(p.renderer().bound);
    }

    #[test]
    fn test_failed_load_reveals_without_map() {
        let mut p = pipeline(false);
        let loader = ManualLoader::default();
        p.load_environment("missing.exr", &loader);

        assert!(loader.finish(Err(EnvironmentError::Empty)));
        p.poll_environment();
        assert!(p.scene().sphere.visible);
        assert!(!p.scene().sphere.environment_bound);
        assert!(!p.renderer().bound);
    }

    #[test]
    fn test_dispose_once_and_discards_late_load() {
        let mut p = pipeline(false);
        let loader = ManualLoader::default();
        p.load_environment("env.exr", &loader);

        p.dispose();
        p.dispose();
        assert_eq!(p.renderer().disposals, 1);

        assert!(!loader.finish(Ok(map())));
        p.poll_environment();
        assert!(!p.renderer().bound);
        assert!(matches!(p.composite(), Err(RenderError::Disposed)));
    }

    #[test]
    fn test_backdrop_seed_rerolled_each_frame() {
        let mut p = pipeline(false);
        let silent = FrequencyFrame::default();
        let mut seeds = Vec::new();
        for _ in 0..8 {
            p.apply_frame(1.0, &silent, &silent);
            let rand = p.uniforms().backdrop.rand;
            assert!((0.0..10_000.0).contains(&rand));
            seeds.push(rand);
        }
        seeds.dedup();
        assert!(seeds.len() > 1);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let input = FrequencyFrame::from_leading(&[10, 20, 30]);
        let output = FrequencyFrame::from_leading(&[200, 150, 100]);
        let run = || {
            let mut p = pipeline(false);
            for _ in 0..10 {
                p.apply_frame(1.0, &input, &output);
            }
            (*p.uniforms(), p.scene().camera.position)
        };
        assert_eq!(run(), run());
    }
}
