//! Scene graph and the per-frame audio-reactive update.

use glam::{Vec3, Vec4};

use super::camera::{orbit_position, PerspectiveCamera};
use super::uniforms::UniformRegistry;
use crate::audio::FrequencyFrame;
use crate::params::{ReactivityWeights, SceneParams};

/// Reactive sphere at the scene origin
#[derive(Debug, Clone)]
pub struct Sphere {
    pub position: Vec3,
    pub scale: f32,

    /// Hidden until the environment load settles (success or failure)
    pub visible: bool,

    /// Reflection map bound to the material
    pub environment_bound: bool,
}

/// Complete scene: camera, sphere, rotation accumulator and tuning
#[derive(Debug, Clone)]
pub struct SceneState {
    pub camera: PerspectiveCamera,
    pub sphere: Sphere,

    /// Cumulative XYZ Euler rotation applied to the camera orbit
    pub rotation: Vec3,

    pub params: SceneParams,
}

/// Build the scene and its uniform registry with their initial values
pub fn build_scene(params: SceneParams) -> (SceneState, UniformRegistry) {
    let camera = PerspectiveCamera::new(&params.camera);
    let sphere = Sphere {
        position: Vec3::ZERO,
        scale: params.sphere.rest_scale,
        visible: false,
        environment_bound: false,
    };

    let scene = SceneState {
        camera,
        sphere,
        rotation: Vec3::ZERO,
        params,
    };

    (scene, UniformRegistry::default())
}

impl SceneState {
    /// Advance the scene by `dt` (in 60fps frames) from two spectra.
    ///
    /// Deterministic in `(dt, input, output, self.rotation, uniforms.sphere.time)`.
    /// The backdrop seed is left to the caller.
    pub fn advance(
        &mut self,
        uniforms: &mut UniformRegistry,
        dt: f32,
        input: &FrequencyFrame,
        output: &FrequencyFrame,
    ) {
        let w: &ReactivityWeights = &self.params.reactivity;

        self.sphere.scale =
            self.params.sphere.rest_scale + self.params.sphere.pulse_gain * output.mid();

        let rate = dt * w.rotation_rate;
        self.rotation.x += rate * w.x_from_output_mid * output.mid();
        self.rotation.z += rate * w.z_from_input_mid * input.mid();
        self.rotation.y += rate * w.y_from_input_treble * input.treble();
        self.rotation.z += rate * w.z_from_output_treble * output.treble();

        self.camera.position = orbit_position(
            self.rotation,
            Vec3::from_array(self.params.camera.orbit_offset),
        );
        self.camera.look_at(self.sphere.position);

        let sphere = &mut uniforms.sphere;
        sphere.time += dt * w.time_from_output_bass * output.bass();
        sphere.input_data = weighted_bands(input, w.input_data_weights);
        sphere.output_data = weighted_bands(output, w.output_data_weights);
    }

    /// Reveal the sphere, with or without a reflection map
    pub fn reveal_sphere(&mut self, environment_bound: bool) {
        self.sphere.visible = true;
        self.sphere.environment_bound = environment_bound;
    }
}

fn weighted_bands(frame: &FrequencyFrame, weights: [f32; 3]) -> Vec4 {
    Vec4::new(
        weights[0] * frame.bass(),
        weights[1] * frame.mid(),
        weights[2] * frame.treble(),
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> (SceneState, UniformRegistry) {
        build_scene(SceneParams::default())
    }

    #[test]
    fn test_sphere_starts_hidden() {
        let (scene, uniforms) = scene();
        assert!(!scene.sphere.visible);
        assert!(!scene.sphere.environment_bound);
        assert_eq!(scene.sphere.scale, 1.0);
        assert_eq!(uniforms.sphere.time, 0.0);
    }

    #[test]
    fn test_silence_keeps_rest_pose() {
        let (mut scene, mut uniforms) = scene();
        let silent = FrequencyFrame::default();

        for _ in 0..30 {
            scene.advance(&mut uniforms, 1.0, &silent, &silent);
        }

        assert_eq!(scene.sphere.scale, 1.0);
        assert_eq!(scene.rotation, Vec3::ZERO);
        assert_eq!(uniforms.sphere.time, 0.0);
        assert_eq!(scene.camera.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_output_mid_pulses_scale() {
        let (mut scene, mut uniforms) = scene();
        let output = FrequencyFrame::from_leading(&[0, 255, 0]);
        scene.advance(&mut uniforms, 1.0, &FrequencyFrame::default(), &output);
        assert!((scene.sphere.scale - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_axis_mapping_is_asymmetric() {
        let silent = FrequencyFrame::default();
        let loud = FrequencyFrame::from_leading(&[255, 255, 255]);

        // Output alone: x and z advance, y stays
        let (mut scene, mut uniforms) = scene();
        scene.advance(&mut uniforms, 1.0, &silent, &loud);
        assert!((scene.rotation.x - 0.0005).abs() < 1e-9);
        assert!((scene.rotation.z - 0.00025).abs() < 1e-9);
        assert_eq!(scene.rotation.y, 0.0);

        // Input alone: z and y advance, x stays
        let (mut scene, mut uniforms) = self::scene();
        scene.advance(&mut uniforms, 1.0, &loud, &silent);
        assert_eq!(scene.rotation.x, 0.0);
        assert!((scene.rotation.z - 0.0005).abs() < 1e-9);
        assert!((scene.rotation.y - 0.00025).abs() < 1e-9);
    }

    #[test]
    fn test_shader_data_weights() {
        let (mut scene, mut uniforms) = scene();
        let frame = FrequencyFrame::from_leading(&[255, 255, 255]);
        scene.advance(&mut uniforms, 2.0, &frame, &frame);

        assert_eq!(uniforms.sphere.input_data, Vec4::new(1.0, 0.1, 10.0, 0.0));
        assert_eq!(uniforms.sphere.output_data, Vec4::new(2.0, 0.1, 10.0, 0.0));
        assert!((uniforms.sphere.time - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_advance_is_deterministic() {
        let input = FrequencyFrame::from_leading(&[30, 60, 90]);
        let output = FrequencyFrame::from_leading(&[200, 150, 100]);

        let run = || {
            let (mut scene, mut uniforms) = scene();
            for step in 0..50 {
                scene.advance(&mut uniforms, 0.5 + step as f32 * 0.01, &input, &output);
            }
            (scene.camera.position, scene.rotation, uniforms)
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_camera_looks_at_sphere() {
        let (mut scene, mut uniforms) = scene();
        let frame = FrequencyFrame::from_leading(&[128, 128, 128]);
        scene.advance(&mut uniforms, 1.0, &frame, &frame);
        assert_eq!(scene.camera.target, scene.sphere.position);
        assert!((scene.camera.position.length() - 5.0).abs() < 1e-4);
    }
}
