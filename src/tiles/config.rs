//! Tile source configuration and validation

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::tiles::{CUBE_SEGMENTS, MAX_NB_TILES};

/// Builds the URL of tile `(face, col, row)`
#[derive(Clone)]
pub struct TileUrl(Arc<dyn Fn(u8, u32, u32) -> String + Send + Sync>);

impl TileUrl {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(u8, u32, u32) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// URL pattern with `{face}`, `{col}` and `{row}` placeholders
    pub fn template(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self::from_fn(move |face, col, row| {
            pattern
                .replace("{face}", &face.to_string())
                .replace("{col}", &col.to_string())
                .replace("{row}", &row.to_string())
        })
    }

    pub fn url(&self, face: u8, col: u32, row: u32) -> String {
        (self.0)(face, col, row)
    }
}

impl fmt::Debug for TileUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TileUrl(<fn>)")
    }
}

/// Tiled cubemap panorama description
#[derive(Clone, Debug)]
pub struct TileSourceConfig {
    /// Size in pixels of one full face
    pub face_size: u32,
    /// Tiles per face side
    pub nb_tiles: u32,
    pub tile_url: TileUrl,
}

/// Validated tiling grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TilingScheme {
    pub nb_tiles: u32,
    /// Reference segments covered by one tile side
    pub faces_by_tile: u32,
    /// Size in pixels of one tile side
    pub tile_size: u32,
}

impl TilingScheme {
    /// Large tiles need more than their corners sampled to be found visible
    pub fn samples_interior(&self) -> bool {
        self.faces_by_tile >= CUBE_SEGMENTS / 2
    }
}

impl TileSourceConfig {
    pub fn new(face_size: u32, nb_tiles: u32, tile_url: TileUrl) -> Self {
        Self { face_size, nb_tiles, tile_url }
    }

    /// Check the grid before any scan or load happens
    pub fn validate(&self) -> Result<TilingScheme> {
        if !self.nb_tiles.is_power_of_two() || self.nb_tiles > MAX_NB_TILES {
            return Err(Error::InvalidTileCount(self.nb_tiles));
        }
        if self.face_size < self.nb_tiles {
            return Err(Error::InvalidFaceSize {
                face_size: self.face_size,
                nb_tiles: self.nb_tiles,
            });
        }

        Ok(TilingScheme {
            nb_tiles: self.nb_tiles,
            faces_by_tile: CUBE_SEGMENTS / self.nb_tiles,
            tile_size: self.face_size / self.nb_tiles,
        })
    }
}

/// On-disk form of a tile source, with a templated URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSourceFile {
    pub face_size: u32,
    pub nb_tiles: u32,
    pub tile_url: String,
}

impl TileSourceFile {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn into_config(self) -> Result<TileSourceConfig> {
        let missing = ["{face}", "{col}", "{row}"]
            .into_iter()
            .filter(|p| !self.tile_url.contains(p))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "tile_url `{}` lacks {}",
                self.tile_url,
                missing.join(", ")
            )));
        }

        let config = TileSourceConfig::new(
            self.face_size,
            self.nb_tiles,
            TileUrl::template(self.tile_url),
        );
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source(face_size: u32, nb_tiles: u32) -> TileSourceConfig {
        TileSourceConfig::new(face_size, nb_tiles, TileUrl::template("{face}/{col}_{row}.jpg"))
    }

    #[test]
    fn test_valid_grids() {
        for nb_tiles in [1, 2, 4, 8, 16] {
            let scheme = source(2048, nb_tiles).validate().unwrap();
            assert_eq!(scheme.faces_by_tile * nb_tiles, CUBE_SEGMENTS);
            assert_eq!(scheme.tile_size, 2048 / nb_tiles);
        }
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        for nb_tiles in [0, 3, 5, 6, 12] {
            assert!(matches!(
                source(2048, nb_tiles).validate(),
                Err(Error::InvalidTileCount(n)) if n == nb_tiles
            ));
        }
    }

    #[test]
    fn test_rejects_grid_finer_than_reference() {
        assert!(matches!(source(4096, 32).validate(), Err(Error::InvalidTileCount(32))));
    }

    #[test]
    fn test_rejects_tiny_face() {
        assert!(matches!(
            source(4, 8).validate(),
            Err(Error::InvalidFaceSize { face_size: 4, nb_tiles: 8 })
        ));
    }

    #[test]
    fn test_interior_sampling_threshold() {
        assert!(source(1024, 1).validate().unwrap().samples_interior());
        assert!(source(1024, 2).validate().unwrap().samples_interior());
        assert!(!source(1024, 4).validate().unwrap().samples_interior());
    }

    #[test]
    fn test_template_url() {
        let url = TileUrl::template("https://cdn/pano/{face}/{row}/{col}.jpg");
        assert_eq!(url.url(2, 3, 1), "https://cdn/pano/2/1/3.jpg");
    }

    #[test]
    fn test_load_source_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"face_size": 4096, "nb_tiles": 8, "tile_url": "tiles/{{face}}_{{col}}_{{row}}.jpg"}}"#).unwrap();

        let config = TileSourceFile::load(file.path()).unwrap().into_config().unwrap();
        assert_eq!(config.nb_tiles, 8);
        assert_eq!(config.tile_url.url(1, 2, 3), "tiles/1_2_3.jpg");
    }

    #[test]
    fn test_source_file_rejects_bad_grid() {
        let file = TileSourceFile::from_json_str(
            r#"{"face_size": 4096, "nb_tiles": 6, "tile_url": "{face}{col}{row}"}"#,
        )
        .unwrap();
        assert!(matches!(file.into_config(), Err(Error::InvalidTileCount(6))));
    }

    #[test]
    fn test_source_file_requires_placeholders() {
        let file = TileSourceFile::from_json_str(
            r#"{"face_size": 4096, "nb_tiles": 4, "tile_url": "tiles/{face}.jpg"}"#,
        )
        .unwrap();
        assert!(matches!(file.into_config(), Err(Error::Config(_))));
    }
}
