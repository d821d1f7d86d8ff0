//! Camera sitting at the center of a panorama

use crate::core::types::{Vec3, Mat4};

/// Narrowest vertical field of view, reached at zoom level 100
pub const MIN_FOV_DEGREES: f32 = 30.0;
/// Widest vertical field of view, reached at zoom level 0
pub const MAX_FOV_DEGREES: f32 = 90.0;

/// Camera at the origin, oriented by yaw and pitch
#[derive(Clone, Copy, Debug)]
pub struct PanoramaCamera {
    /// Horizontal rotation in radians, positive turns towards +X
    pub yaw: f32,
    /// Vertical rotation in radians, positive looks up
    pub pitch: f32,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

/// Read-only snapshot of the camera handed to the visibility scan
#[derive(Clone, Copy, Debug)]
pub struct CameraState {
    pub projection: Mat4,
    pub view: Mat4,
    /// Unit vector the camera looks along
    pub direction: Vec3,
    pub fov_y: f32,
}

impl CameraState {
    /// Combined clip-space transform used to build the frustum
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl PanoramaCamera {
    /// Create a camera looking at the front face
    pub fn new(fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near: 0.01,
            far: 10.0,
        }
    }

    /// Create a camera looking along `direction`
    pub fn looking_at(direction: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        let mut camera = Self::new(fov_y_degrees, aspect);
        camera.look_at(direction);
        camera
    }

    /// Orient the camera along `direction`
    pub fn look_at(&mut self, direction: Vec3) {
        let d = direction.normalize_or_zero();
        if d == Vec3::ZERO {
            return;
        }
        self.yaw = d.x.atan2(-d.z);
        self.pitch = d.y.clamp(-1.0, 1.0).asin();
    }

    /// Set yaw and pitch in radians, pitch is clamped to the poles
    pub fn rotate_to(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
    }

    /// Map a zoom level in `[0, 100]` onto the field of view
    pub fn set_zoom(&mut self, level: f32) {
        let t = level.clamp(0.0, 100.0) / 100.0;
        let fov = MAX_FOV_DEGREES + (MIN_FOV_DEGREES - MAX_FOV_DEGREES) * t;
        self.fov_y = fov.to_radians();
    }

    /// Get forward direction
    pub fn direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(cp * sy, sp, -cp * cy).normalize()
    }

    /// Get view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.direction();
        // Looking straight up or down needs another up vector
        let up = if forward.y.abs() > 0.999 {
            Vec3::new(self.yaw.sin(), 0.0, -self.yaw.cos()) * -forward.y.signum()
        } else {
            Vec3::Y
        };
        Mat4::look_to_rh(Vec3::ZERO, forward, up)
    }

    /// Get projection matrix (camera to clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Snapshot the current state for scanning
    pub fn state(&self) -> CameraState {
        CameraState {
            projection: self.projection_matrix(),
            view: self.view_matrix(),
            direction: self.direction(),
            fov_y: self.fov_y,
        }
    }
}

impl Default for PanoramaCamera {
    fn default() -> Self {
        Self::new(MAX_FOV_DEGREES, 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_looks_at_front() {
        let camera = PanoramaCamera::default();
        let forward = camera.direction();
        assert!((forward.z - (-1.0)).abs() < 0.001);
    }

    #[test]
    fn test_yaw_turns_right() {
        let mut camera = PanoramaCamera::default();
        camera.rotate_to(std::f32::consts::FRAC_PI_2, 0.0);
        assert!((camera.direction().x - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_look_at_round_trips_direction() {
        let target = Vec3::new(-1.0, 0.75, 0.75).normalize();
        let camera = PanoramaCamera::looking_at(target, 90.0, 1.0);
        assert!(camera.direction().angle_between(target) < 1e-4);
    }

    #[test]
    fn test_view_matrix_maps_direction_to_minus_z() {
        let camera = PanoramaCamera::looking_at(Vec3::new(0.3, -0.2, 0.9), 60.0, 1.0);
        let forward = camera.view_matrix().transform_vector3(camera.direction());
        assert!((forward.z - (-1.0)).abs() < 0.001);
    }

    #[test]
    fn test_view_matrix_at_zenith_is_finite() {
        let mut camera = PanoramaCamera::default();
        camera.rotate_to(0.0, std::f32::consts::FRAC_PI_2);
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn test_zoom_narrows_fov() {
        let mut camera = PanoramaCamera::default();
        camera.set_zoom(0.0);
        let wide = camera.fov_y;
        camera.set_zoom(100.0);
        assert!(camera.fov_y < wide);
        assert!((camera.fov_y - MIN_FOV_DEGREES.to_radians()).abs() < 1e-5);
    }
}
