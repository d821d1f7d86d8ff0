//! Visibility scan of the cubemap tile grid
//!
//! Every tile of every face is tested against the camera frustum by
//! sampling a few points of its surface. Corners are always sampled; tiles
//! covering half a face or more also sample their edge midpoints and center,
//! since the camera can sit inside such a tile with all four corners out of
//! view.

use crate::core::camera::CameraState;
use crate::core::types::{Quat, Vec3};
use crate::math::Frustum;
use crate::tiles::cube::CubeFace;
use crate::tiles::config::TilingScheme;
use crate::tiles::tile::Tile;

/// Tile-local sample points: four corners, then edge midpoints and center
const SAMPLES: [(f32, f32); 9] = [
    (0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0),
    (0.5, 0.0), (0.0, 0.5), (1.0, 0.5), (0.5, 1.0), (0.5, 0.5),
];

/// Computes the set of tiles a camera currently needs
#[derive(Clone, Copy, Debug)]
pub struct VisibilityScanner {
    scheme: TilingScheme,
    /// Rotation applied to the panorama sphere before testing
    correction: Quat,
}

impl VisibilityScanner {
    pub fn new(scheme: TilingScheme) -> Self {
        Self {
            scheme,
            correction: Quat::IDENTITY,
        }
    }

    pub fn with_correction(mut self, correction: Quat) -> Self {
        self.correction = correction;
        self
    }

    pub fn set_correction(&mut self, correction: Quat) {
        self.correction = correction;
    }

    pub fn correction(&self) -> Quat {
        self.correction
    }

    pub fn scheme(&self) -> &TilingScheme {
        &self.scheme
    }

    /// List every tile with at least one sampled point inside the frustum.
    ///
    /// The result is unordered and carries, per tile, the angle between the
    /// view direction and the closest of its center or visible samples.
    pub fn scan(&self, camera: &CameraState) -> Vec<Tile> {
        let frustum = Frustum::from_camera(camera);
        let direction = camera.direction;
        let nb_tiles = self.scheme.nb_tiles;
        let n = nb_tiles as f32;

        let samples = if self.scheme.samples_interior() {
            &SAMPLES[..]
        } else {
            &SAMPLES[..4]
        };

        let mut visible = Vec::new();

        for face in CubeFace::ALL {
            for row in 0..nb_tiles {
                for col in 0..nb_tiles {
                    let mut angle: Option<f32> = None;

                    for &(du, dv) in samples {
                        let point = self.position(face.point((col as f32 + du) / n, (row as f32 + dv) / n));
                        if frustum.contains_point(point) {
                            let a = point.angle_between(direction);
                            angle = Some(angle.map_or(a, |best| best.min(a)));
                        }
                    }

                    if let Some(angle) = angle {
                        let center = self.position(face.tile_center(col, row, nb_tiles));
                        visible.push(Tile {
                            face: face.index(),
                            col,
                            row,
                            angle: angle.min(center.angle_between(direction)),
                        });
                    }
                }
            }
        }

        log::trace!("Visibility scan: {} tiles visible", visible.len());
        visible
    }

    fn position(&self, point: Vec3) -> Vec3 {
        self.correction * point
    }
}
