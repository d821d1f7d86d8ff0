//! Cubemap tiling: tile identities, face geometry, source configuration
//! and the visibility scan.

pub mod tile;
pub mod cube;
pub mod config;
pub mod scanner;

pub use tile::{Tile, TileKey};
pub use cube::{CubeFace, FACE_COUNT};
pub use config::{TileSourceConfig, TileSourceFile, TileUrl, TilingScheme};
pub use scanner::VisibilityScanner;

/// Reference subdivision of one cube face side
pub const CUBE_SEGMENTS: u32 = 16;

/// Finest grid accepted for `nb_tiles`
pub const MAX_NB_TILES: u32 = CUBE_SEGMENTS;
