//! Camera and view management.

use glam::{Mat4, Vec3};

/// A perspective camera orbiting a target point.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Camera {
    /// Creates a new camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
        }
    }

    /// Sets the aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Returns the camera's right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Tangent of half the vertical field of view.
    #[must_use]
    pub fn tan_half_fov_y(&self) -> f32 {
        (self.fov * 0.5).tan()
    }

    /// Orbits the camera around the target.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let radius = (self.position - self.target).length();
        let mut theta = (self.position.x - self.target.x).atan2(self.position.z - self.target.z);
        let mut phi = ((self.position.y - self.target.y) / radius).acos();

        theta -= delta_x;
        phi = (phi - delta_y).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Pans the camera.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.right() * delta_x + self.up * delta_y;
        self.position += offset;
        self.target += offset;
    }

    /// Moves toward (positive delta) or away from the target.
    pub fn zoom(&mut self, delta: f32) {
        let direction = self.forward();
        let distance = (self.position - self.target).length();
        let new_distance = (distance - delta).max(0.1);
        self.position = self.target - direction * new_distance;
    }

    /// Frames the given bounding box.
    pub fn look_at_box(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let size = (max - min).length();

        self.target = center;
        self.position = center + Vec3::new(0.0, 0.0, size * 1.5);
        self.near = size * 0.001;
        self.far = size * 100.0;
    }

    /// Sets the field of view in radians.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(0.1, std::f32::consts::PI - 0.1);
    }

    /// Returns FOV in degrees.
    #[must_use]
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    /// Sets FOV from degrees.
    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.set_fov(degrees.to_radians());
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::default();
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.up, Vec3::Y);
        assert!((camera.fov_degrees() - 45.0).abs() < 0.01);
    }

    #[test]
    fn test_projection_is_perspective() {
        let camera = Camera::new(1.0);
        let proj = camera.projection_matrix();
        // Perspective matrix has non-zero w division
        assert!(proj.w_axis.z != 0.0);
    }

    #[test]
    fn test_set_fov_clamping() {
        let mut camera = Camera::new(1.0);
        camera.set_fov(0.0);
        assert!(camera.fov >= 0.1);

        camera.set_fov(std::f32::consts::PI);
        assert!(camera.fov < std::f32::consts::PI);
    }

    #[test]
    fn test_tan_half_fov() {
        let mut camera = Camera::new(1.0);
        camera.set_fov_degrees(90.0);
        assert!((camera.tan_half_fov_y() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_look_at_box_frames_center() {
        let mut camera = Camera::new(1.0);
        camera.look_at_box(Vec3::splat(-32.0), Vec3::splat(32.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert!(camera.position.z > 64.0);
        assert!(camera.far > camera.near);
    }

    #[test]
    fn test_orbit_keeps_radius() {
        let mut camera = Camera::new(1.0);
        let before = (camera.position - camera.target).length();
        camera.orbit(0.3, -0.2);
        let after = (camera.position - camera.target).length();
        assert!((before - after).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_never_crosses_target() {
        let mut camera = Camera::new(1.0);
        camera.zoom(100.0);
        assert!((camera.position - camera.target).length() >= 0.1 - 1e-5);
    }
}
