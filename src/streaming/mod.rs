//! Priority-driven tile loading

pub mod task;
pub mod queue;
pub mod fetch;
pub mod placeholder;
pub mod streamer;

pub use task::{Task, TaskHandle, TaskStatus, TaskWork, TaskFuture, TaskResult};
pub use queue::{PriorityLoadQueue, StartedTask, DEFAULT_CONCURRENCY};
pub use fetch::{FetchFuture, FsFetcher, TileFetcher};
pub use placeholder::{error_tile, error_tile_size, MAX_ERROR_TILE_SIZE};
pub use streamer::{
    StreamerConfig, TaskCompletion, TileImage, TileReady, TileStreamer,
    priority_for_angle,
};
