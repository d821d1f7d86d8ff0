//! View frustum for tile culling

use crate::core::camera::CameraState;
use crate::core::types::{Vec3, Vec4, Mat4};

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    fn from_coefficients(plane: Vec4) -> Self {
        let normal = plane.truncate();
        let len = normal.length();
        if len <= f32::EPSILON {
            return Self::new(Vec3::ZERO, plane.w);
        }
        Self::new(normal / len, plane.w / len)
    }
}

/// View frustum with 6 planes (Near, Far, Left, Right, Top, Bottom)
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Clip depth is `[0, 1]` as produced by `Mat4::perspective_rh`.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        Self {
            planes: [
                Plane::from_coefficients(r2),      // near
                Plane::from_coefficients(r3 - r2), // far
                Plane::from_coefficients(r3 + r0), // left
                Plane::from_coefficients(r3 - r0), // right
                Plane::from_coefficients(r3 - r1), // top
                Plane::from_coefficients(r3 + r1), // bottom
            ],
        }
    }

    /// Build the frustum of a camera snapshot
    pub fn from_camera(camera: &CameraState) -> Self {
        Self::from_view_projection(&camera.view_projection())
    }

    /// Check if point is inside frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_distance() {
        let plane = Plane::new(Vec3::Y, 0.0); // XZ plane
        assert_eq!(plane.distance_to_point(Vec3::new(0.0, 5.0, 0.0)), 5.0);
        assert_eq!(plane.distance_to_point(Vec3::new(0.0, -3.0, 0.0)), -3.0);
    }

    #[test]
    fn test_frustum_contains_point_ahead() {
        let proj = Mat4::perspective_rh(90.0_f32.to_radians(), 1.0, 0.01, 10.0);
        let view = Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let frustum = Frustum::from_view_projection(&(proj * view));

        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -1.0)));
        assert!(frustum.contains_point(Vec3::new(0.9, -0.9, -1.0)));
    }

    #[test]
    fn test_frustum_rejects_behind_and_outside() {
        let proj = Mat4::perspective_rh(90.0_f32.to_radians(), 1.0, 0.01, 10.0);
        let view = Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let frustum = Frustum::from_view_projection(&(proj * view));

        // Behind the camera
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 1.0)));
        // Past the 45 degree half angle
        assert!(!frustum.contains_point(Vec3::new(1.5, 0.0, -1.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, -1.5, -1.0)));
        // Beyond the far plane
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -20.0)));
    }
}
