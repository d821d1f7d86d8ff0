//! Error types for tile streaming

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid nb_tiles {0}: must be a power of two no greater than {max}", max = crate::tiles::MAX_NB_TILES)]
    InvalidTileCount(u32),

    #[error("invalid face_size {face_size} for {nb_tiles} tiles per side")]
    InvalidFaceSize { face_size: u32, nb_tiles: u32 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Task error: {0}")]
    Task(String),
}
