//! Scene layout, material and audio-reactivity tuning.

/// Perspective camera parameters
#[derive(Debug, Clone)]
pub struct CameraParams {
    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units)
    pub far_plane: f32,

    /// Position before the first frame is applied
    pub initial_position: [f32; 3],

    /// Offset rotated by the cumulative rotation to place the orbiting camera
    pub orbit_offset: [f32; 3],
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            initial_position: [2.0, -2.0, 5.0],
            orbit_offset: [0.0, 0.0, 5.0],
        }
    }
}

/// Reactive sphere geometry and material
#[derive(Debug, Clone)]
pub struct SphereParams {
    /// Icosahedron radius (world units)
    pub radius: f32,

    /// Icosahedron subdivision level (each face split into (detail + 1)^2 triangles)
    pub detail: u32,

    /// Uniform scale with silent output
    pub rest_scale: f32,

    /// Extra scale at full output mid-band energy
    pub pulse_gain: f32,

    /// Base colour (linear RGB), 0x000010
    pub base_color: [f32; 3],

    /// Emissive colour (linear RGB), 0x000010
    pub emissive_color: [f32; 3],

    pub emissive_intensity: f32,

    /// 0 = dielectric, 1 = metal
    pub metalness: f32,

    /// 0 = mirror, 1 = fully diffuse
    pub roughness: f32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            detail: 10,
            rest_scale: 1.0,
            pulse_gain: 0.2,
            base_color: srgb_hex_to_linear(0x000010),
            emissive_color: srgb_hex_to_linear(0x000010),
            emissive_intensity: 1.5,
            metalness: 0.5,
            roughness: 0.1,
        }
    }
}

/// Backdrop shell surrounding the scene (rendered from the inside)
#[derive(Debug, Clone)]
pub struct BackdropParams {
    /// Shell radius (world units), must enclose the camera orbit
    pub radius: f32,

    /// Icosahedron subdivision level
    pub detail: u32,

    /// Upper bound (exclusive) of the per-frame noise seed
    pub rand_range: f32,
}

impl Default for BackdropParams {
    fn default() -> Self {
        Self {
            radius: 10.0,
            detail: 5,
            rand_range: 10_000.0,
        }
    }
}

/// Mapping from frequency bands to motion and shader uniforms.
///
/// Output (agent voice) and input (participant) bands land on different
/// rotation axes so the two speakers read differently on screen. All band
/// values are divided by 255 before weighting; `dt` is in 60fps frames.
#[derive(Debug, Clone)]
pub struct ReactivityWeights {
    /// Base rotation rate (radians per frame at full energy, before per-axis weights)
    pub rotation_rate: f32,

    /// rotation.x += dt * rate * w * out[1]
    pub x_from_output_mid: f32,

    /// rotation.z += dt * rate * w * in[1]
    pub z_from_input_mid: f32,

    /// rotation.y += dt * rate * w * in[2]
    pub y_from_input_treble: f32,

    /// rotation.z += dt * rate * w * out[2]
    pub z_from_output_treble: f32,

    /// time += dt * w * out[0]
    pub time_from_output_bass: f32,

    /// input_data = (w0 * in[0], w1 * in[1], w2 * in[2], 0)
    pub input_data_weights: [f32; 3],

    /// output_data = (w0 * out[0], w1 * out[1], w2 * out[2], 0)
    pub output_data_weights: [f32; 3],
}

impl Default for ReactivityWeights {
    fn default() -> Self {
        Self {
            rotation_rate: 0.001,
            x_from_output_mid: 0.5,
            z_from_input_mid: 0.5,
            y_from_input_treble: 0.25,
            z_from_output_treble: 0.25,
            time_from_output_bass: 0.1,
            input_data_weights: [1.0, 0.1, 10.0],
            output_data_weights: [2.0, 0.1, 10.0],
        }
    }
}

/// Bloom post-processing tuning
#[derive(Debug, Clone)]
pub struct BloomParams {
    /// Multiplier on the blurred highlights added back to the image
    pub strength: f32,

    /// 0 = tight glow, 1 = wide glow (shifts weight between mip levels)
    pub radius: f32,

    /// Luminance above which pixels contribute to bloom
    pub threshold: f32,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            strength: 5.0,
            radius: 0.5,
            threshold: 0.0,
        }
    }
}

/// Complete scene description
#[derive(Debug, Clone)]
pub struct SceneParams {
    /// Clear colour (linear RGB), 0x100c14
    pub background: [f32; 3],
    pub camera: CameraParams,
    pub sphere: SphereParams,
    pub backdrop: BackdropParams,
    pub reactivity: ReactivityWeights,
    pub bloom: BloomParams,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            background: srgb_hex_to_linear(0x100c14),
            camera: CameraParams::default(),
            sphere: SphereParams::default(),
            backdrop: BackdropParams::default(),
            reactivity: ReactivityWeights::default(),
            bloom: BloomParams::default(),
        }
    }
}

/// Convert a 0xRRGGBB sRGB colour into linear RGB
pub fn srgb_hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_hex_to_linear() {
        assert_eq!(srgb_hex_to_linear(0x000000), [0.0, 0.0, 0.0]);

        let white = srgb_hex_to_linear(0xffffff);
        for c in white {
            assert!((c - 1.0).abs() < 1e-5);
        }

        // Background is a very dark purple: blue > red > green
        let [r, g, b] = srgb_hex_to_linear(0x100c14);
        assert!(b > r && r > g);
    }

    #[test]
    fn test_sphere_colours_are_linear() {
        let sphere = SphereParams::default();
        let expected = (16.0 / 255.0) / 12.92;
        assert!((sphere.base_color[2] - expected).abs() < 1e-6);
        assert_eq!(sphere.base_color[..2], [0.0, 0.0]);
        assert_eq!(sphere.emissive_color, sphere.base_color);
    }

    #[test]
    fn test_backdrop_encloses_camera_orbit() {
        let params = SceneParams::default();
        let orbit = glam::Vec3::from_array(params.camera.orbit_offset).length();
        assert!(params.backdrop.radius > orbit);
    }
}
