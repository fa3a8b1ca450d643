//! Perspective camera orbiting the sphere.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::params::CameraParams;

/// Perspective camera with an explicit look-at target
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(params: &CameraParams) -> Self {
        Self {
            fov_degrees: params.fov_degrees,
            aspect: 1.0,
            near: params.near_plane,
            far: params.far_plane,
            position: Vec3::from_array(params.initial_position),
            target: Vec3::ZERO,
        }
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// World-to-view transform; Y is up unless looking straight along it
    pub fn view_matrix(&self) -> Mat4 {
        let forward = (self.target - self.position).normalize_or_zero();
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.position, self.target, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Rotate `offset` by the XYZ Euler angles in `rotation`
pub fn orbit_position(rotation: Vec3, offset: Vec3) -> Vec3 {
    Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z) * offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_camera() {
        let params = CameraParams::default();
        let camera = PerspectiveCamera::new(&params);
        assert_eq!(camera.position, Vec3::new(2.0, -2.0, 5.0));
        assert_eq!(camera.fov_degrees, 75.0);
    }

    #[test]
    fn test_zero_rotation_keeps_offset() {
        let offset = Vec3::new(0.0, 0.0, 5.0);
        assert_eq!(orbit_position(Vec3::ZERO, offset), offset);
    }

    #[test]
    fn test_orbit_preserves_distance() {
        let offset = Vec3::new(0.0, 0.0, 5.0);
        for step in 0..20 {
            let r = step as f32 * 0.37;
            let p = orbit_position(Vec3::new(r, r * 0.5, r * 0.25), offset);
            assert!((p.length() - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_rotation_about_x_tilts_toward_negative_y() {
        let p = orbit_position(
            Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 5.0),
        );
        assert!((p - Vec3::new(0.0, -5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let mut camera = PerspectiveCamera::new(&CameraParams::default());
        camera.set_aspect(1280.0, 720.0);
        let view_proj = camera.view_proj();

        assert_ne!(view_proj, Mat4::IDENTITY);
        assert!(view_proj.is_finite());
    }

    #[test]
    fn test_view_matrix_finite_when_looking_along_up() {
        let mut camera = PerspectiveCamera::new(&CameraParams::default());
        camera.position = Vec3::new(0.0, -5.0, 0.0);
        camera.look_at(Vec3::ZERO);
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn test_aspect_ignores_degenerate_sizes() {
        let mut camera = PerspectiveCamera::new(&CameraParams::default());
        camera.set_aspect(800.0, 400.0);
        camera.set_aspect(800.0, 0.0);
        assert_eq!(camera.aspect, 2.0);
    }
}
