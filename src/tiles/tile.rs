//! Tile identity and visibility record

use std::fmt;

/// Identity of one grid cell of one cube face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub face: u8,
    pub col: u32,
    pub row: u32,
}

impl TileKey {
    pub fn new(face: u8, col: u32, row: u32) -> Self {
        Self { face, col, row }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}x{}", self.face, self.col, self.row)
    }
}

/// A visible tile produced by one scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub face: u8,
    pub col: u32,
    pub row: u32,
    /// Angle in radians between the view direction and the tile
    pub angle: f32,
}

impl Tile {
    pub fn key(&self) -> TileKey {
        TileKey::new(self.face, self.col, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(TileKey::new(3, 1, 2).to_string(), "3:1x2");
    }

    #[test]
    fn test_tile_key_ignores_angle() {
        let a = Tile { face: 0, col: 1, row: 1, angle: 0.2 };
        let b = Tile { face: 0, col: 1, row: 1, angle: 1.4 };
        assert_eq!(a.key(), b.key());
    }
}
