//! Replacement image for tiles that failed to load

use image::{Rgba, RgbaImage};

const BACKGROUND: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 0xff]);
const WARNING: Rgba<u8> = Rgba([0xaa, 0x22, 0x22, 0xff]);

/// Largest placeholder side; the renderer stretches it over the tile
pub const MAX_ERROR_TILE_SIZE: u32 = 512;

/// Side of the placeholder drawn for tiles of `tile_size` pixels
pub fn error_tile_size(tile_size: u32) -> u32 {
    tile_size.clamp(1, MAX_ERROR_TILE_SIZE)
}

/// Dark square with a red warning triangle, `size` pixels wide
pub fn error_tile(size: u32) -> RgbaImage {
    let size = size.max(1);
    let s = size as f32;

    RgbaImage::from_fn(size, size, |x, y| {
        // Sample at pixel centers, in units of the tile side
        let u = (x as f32 + 0.5) / s;
        let v = (y as f32 + 0.5) / s;

        if in_triangle(u, v) && !in_exclamation_mark(u, v) {
            WARNING
        } else {
            BACKGROUND
        }
    })
}

// Apex at (0.5, 0.2), base from (0.2, 0.8) to (0.8, 0.8)
fn in_triangle(u: f32, v: f32) -> bool {
    if !(0.2..=0.8).contains(&v) {
        return false;
    }
    let half_width = (v - 0.2) * 0.5;
    (u - 0.5).abs() <= half_width
}

fn in_exclamation_mark(u: f32, v: f32) -> bool {
    let in_stem = (0.4..=0.62).contains(&v);
    let in_dot = (0.68..=0.74).contains(&v);
    (u - 0.5).abs() <= 0.03 && (in_stem || in_dot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let tile = error_tile(64);
        assert_eq!(tile.dimensions(), (64, 64));
        assert_eq!(error_tile(0).dimensions(), (1, 1));
    }

    #[test]
    fn test_size_is_capped() {
        assert_eq!(error_tile_size(256), 256);
        assert_eq!(error_tile_size(8192), MAX_ERROR_TILE_SIZE);
        assert_eq!(error_tile_size(0), 1);
    }

    #[test]
    fn test_corners_are_background() {
        let tile = error_tile(128);
        assert_eq!(*tile.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*tile.get_pixel(127, 127), BACKGROUND);
    }

    #[test]
    fn test_warning_sign_is_drawn() {
        let tile = error_tile(100);
        // Left of the stem, inside the triangle
        assert_eq!(*tile.get_pixel(45, 60), WARNING);
        // The stem itself is cut out
        assert_eq!(*tile.get_pixel(50, 50), BACKGROUND);
        // No transparent pixels anywhere
        assert!(tile.pixels().all(|p| p[3] == 0xff));
    }
}
