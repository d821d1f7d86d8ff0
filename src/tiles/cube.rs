//! Cube face layout
//!
//! Each face is described by its center and two in-plane axes. A
//! face-local coordinate `(u, v)` in `[0, 1]^2` maps onto the unit cube as
//! `center + (2u - 1) * right + (2v - 1) * down`, so `(0, 0)` is the top-left
//! corner of the face image as seen from inside the cube.

use crate::core::types::Vec3;

/// Number of cube faces
pub const FACE_COUNT: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    Left,
    Front,
    Right,
    Back,
    Top,
    Bottom,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Left,
        CubeFace::Front,
        CubeFace::Right,
        CubeFace::Back,
        CubeFace::Top,
        CubeFace::Bottom,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Outward direction through the middle of the face
    pub fn center(self) -> Vec3 {
        match self {
            CubeFace::Left => Vec3::NEG_X,
            CubeFace::Front => Vec3::NEG_Z,
            CubeFace::Right => Vec3::X,
            CubeFace::Back => Vec3::Z,
            CubeFace::Top => Vec3::Y,
            CubeFace::Bottom => Vec3::NEG_Y,
        }
    }

    /// Direction of increasing column
    pub fn right(self) -> Vec3 {
        match self {
            CubeFace::Left => Vec3::NEG_Z,
            CubeFace::Front => Vec3::X,
            CubeFace::Right => Vec3::Z,
            CubeFace::Back => Vec3::NEG_X,
            CubeFace::Top | CubeFace::Bottom => Vec3::X,
        }
    }

    /// Direction of increasing row
    pub fn down(self) -> Vec3 {
        match self {
            CubeFace::Top => Vec3::NEG_Z,
            CubeFace::Bottom => Vec3::Z,
            _ => Vec3::NEG_Y,
        }
    }

    /// Point on the unit cube for face-local coordinates
    pub fn point(self, u: f32, v: f32) -> Vec3 {
        self.center() + self.right() * (2.0 * u - 1.0) + self.down() * (2.0 * v - 1.0)
    }

    /// Center of tile `(col, row)` on a `nb_tiles` x `nb_tiles` grid
    pub fn tile_center(self, col: u32, row: u32, nb_tiles: u32) -> Vec3 {
        let n = nb_tiles as f32;
        self.point((col as f32 + 0.5) / n, (row as f32 + 0.5) / n)
    }
}
