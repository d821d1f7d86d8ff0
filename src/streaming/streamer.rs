//! Tile streaming adapter
//!
//! Turns camera changes into tile loads: every change runs a visibility
//! scan, feeds the visible set into the priority queue and spawns whatever
//! the queue promotes. Loaded tiles are handed to the renderer through a
//! callback. All queue mutations happen on the task that owns the streamer.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tokio::task::{Id, JoinSet};

use crate::core::camera::CameraState;
use crate::core::error::Error;
use crate::core::types::{Quat, Result};
use crate::streaming::fetch::TileFetcher;
use crate::streaming::placeholder::{error_tile, error_tile_size};
use crate::streaming::queue::{PriorityLoadQueue, DEFAULT_CONCURRENCY};
use crate::streaming::task::{TaskFuture, TaskHandle, TaskResult, TaskStatus, TaskWork};
use crate::tiles::{Tile, TileKey, TileSourceConfig, VisibilityScanner};

/// Streamer settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerConfig {
    /// Maximum simultaneous tile loads
    pub concurrency: usize,
    /// Replace failed tiles with a warning placeholder
    pub show_error_tile: bool,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            show_error_tile: true,
        }
    }
}

/// Image data delivered for a tile
#[derive(Debug, Clone)]
pub enum TileImage {
    /// Bytes as returned by the fetcher, decoding is up to the renderer
    Encoded(Vec<u8>),
    /// Substitute for a tile that failed to load, shared by all failures
    /// of the same source
    Placeholder(Arc<RgbaImage>),
}

/// Notification that a tile can be applied to the mesh
#[derive(Debug, Clone)]
pub struct TileReady {
    pub face: u8,
    pub col: u32,
    pub row: u32,
    pub image: TileImage,
}

impl TileReady {
    pub fn key(&self) -> TileKey {
        TileKey::new(self.face, self.col, self.row)
    }
}

/// Outcome of one spawned load, fed back into the queue
#[derive(Debug)]
pub struct TaskCompletion {
    pub key: TileKey,
    pub serial: u64,
    pub outcome: TaskResult,
}

/// Queue priority of a tile: central tiles rank highest
pub fn priority_for_angle(angle: f32) -> f32 {
    std::f32::consts::PI - angle
}

type TileReadyCallback = Arc<dyn Fn(TileReady) + Send + Sync>;

/// Error placeholder, drawn on the first failure of a source
type ErrorImage = Arc<OnceLock<Arc<RgbaImage>>>;

fn shared_error_tile(cell: &OnceLock<Arc<RgbaImage>>, tile_size: u32) -> Arc<RgbaImage> {
    Arc::clone(cell.get_or_init(|| Arc::new(error_tile(error_tile_size(tile_size)))))
}

/// Drives visibility scans and tile loads for one panorama at a time
pub struct TileStreamer {
    config: StreamerConfig,
    source: TileSourceConfig,
    scanner: VisibilityScanner,
    queue: PriorityLoadQueue,
    /// Tiles requested since the last reset, loaded or not
    requested: HashSet<TileKey>,
    fetcher: Arc<dyn TileFetcher>,
    on_ready: TileReadyCallback,
    error_image: ErrorImage,
    in_flight: JoinSet<TaskCompletion>,
    spawned: HashMap<Id, (TileKey, u64, TaskHandle)>,
}

impl TileStreamer {
    /// Create a streamer for `source`, rejecting an invalid tiling up front
    pub fn new<F, C>(source: TileSourceConfig, config: StreamerConfig, fetcher: F, on_ready: C) -> Result<Self>
    where
        F: TileFetcher,
        C: Fn(TileReady) + Send + Sync + 'static,
    {
        let scheme = source.validate()?;
        log::info!(
            "Tile source: {} tiles per face side, {}px tiles",
            scheme.nb_tiles,
            scheme.tile_size
        );

        Ok(Self {
            queue: PriorityLoadQueue::new(config.concurrency),
            config,
            source,
            scanner: VisibilityScanner::new(scheme),
            requested: HashSet::new(),
            fetcher: Arc::new(fetcher),
            on_ready: Arc::new(on_ready),
            error_image: ErrorImage::default(),
            in_flight: JoinSet::new(),
            spawned: HashMap::new(),
        })
    }

    /// Rotate the panorama sphere relative to the camera
    pub fn set_correction(&mut self, correction: Quat) {
        self.scanner.set_correction(correction);
    }

    /// Switch to another panorama. Outstanding loads are cancelled.
    pub fn set_source(&mut self, source: TileSourceConfig) -> Result<()> {
        let scheme = source.validate()?;
        self.clear();
        self.scanner = VisibilityScanner::new(scheme).with_correction(self.scanner.correction());
        self.source = source;
        self.error_image = ErrorImage::default();
        log::info!(
            "Tile source changed: {} tiles per face side, {}px tiles",
            scheme.nb_tiles,
            scheme.tile_size
        );
        Ok(())
    }

    /// Cancel every task and forget which tiles were requested
    pub fn clear(&mut self) {
        self.queue.clear();
        self.requested.clear();
    }

    /// Rescan after a camera move and schedule the tiles now needed.
    ///
    /// Returns the number of tiles requested for the first time.
    /// Panics if called outside a tokio runtime context.
    pub fn on_camera_changed(&mut self, camera: &CameraState) -> usize {
        let tiles = self.scanner.scan(camera);

        self.queue.disable_all();

        let mut added = 0;
        for tile in &tiles {
            let key = tile.key();
            let priority = priority_for_angle(tile.angle);

            if self.requested.contains(&key) {
                self.queue.set_priority(key, priority);
            } else {
                let work = self.tile_work(tile);
                self.requested.insert(key);
                self.queue.enqueue(key, priority, work);
                added += 1;
            }
        }

        log::debug!(
            "Camera changed: {} tiles visible, {} new, {} tracked",
            tiles.len(),
            added,
            self.queue.len()
        );

        self.spawn_started();
        added
    }

    /// Feed a finished load back into the queue and refill the free slot
    pub fn on_tile_loaded(&mut self, completion: TaskCompletion) -> TaskStatus {
        let status = self.queue.complete(completion.key, completion.serial, &completion.outcome);
        self.spawn_started();
        status
    }

    /// Wait for the next spawned load to finish and process it.
    ///
    /// Returns `None` once nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<(TileKey, TaskStatus)> {
        let completion = loop {
            match self.in_flight.join_next_with_id().await? {
                Ok((id, completion)) => {
                    self.spawned.remove(&id);
                    break completion;
                }
                Err(err) => {
                    let Some((key, serial, handle)) = self.spawned.remove(&err.id()) else {
                        log::error!("Unknown tile load task aborted: {}", err);
                        continue;
                    };
                    log::error!("Tile {} load task aborted: {}", key, err);
                    if self.config.show_error_tile && !handle.is_cancelled() {
                        (self.on_ready)(TileReady {
                            face: key.face,
                            col: key.col,
                            row: key.row,
                            image: TileImage::Placeholder(self.placeholder()),
                        });
                    }
                    break TaskCompletion {
                        key,
                        serial,
                        outcome: Err(Error::Task(err.to_string())),
                    };
                }
            }
        };

        let key = completion.key;
        Some((key, self.on_tile_loaded(completion)))
    }

    /// Process completions until no load is in flight
    pub async fn run_until_idle(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    pub fn queue(&self) -> &PriorityLoadQueue {
        &self.queue
    }

    pub fn config(&self) -> &StreamerConfig {
        &self.config
    }

    pub fn source(&self) -> &TileSourceConfig {
        &self.source
    }

    /// Number of spawned loads not yet processed
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Error placeholder for the current source
    pub fn placeholder(&self) -> Arc<RgbaImage> {
        shared_error_tile(&self.error_image, self.scanner.scheme().tile_size)
    }

    fn spawn_started(&mut self) {
        for started in self.queue.start() {
            let key = started.key;
            let serial = started.serial;
            let future = started.future;
            let handle = self.in_flight.spawn(async move {
                TaskCompletion {
                    key,
                    serial,
                    outcome: future.await,
                }
            });
            self.spawned.insert(handle.id(), (key, serial, started.handle));
        }
    }

    fn tile_work(&self, tile: &Tile) -> TaskWork {
        let key = tile.key();
        let url = self.source.tile_url.url(tile.face, tile.col, tile.row);
        let fetcher = Arc::clone(&self.fetcher);
        let on_ready = Arc::clone(&self.on_ready);
        let show_error_tile = self.config.show_error_tile;
        let error_image = Arc::clone(&self.error_image);
        let tile_size = self.scanner.scheme().tile_size;

        Box::new(move |handle: TaskHandle| -> TaskFuture {
            Box::pin(async move {
                let ready = |image| TileReady {
                    face: key.face,
                    col: key.col,
                    row: key.row,
                    image,
                };

                match fetcher.fetch(&url).await {
                    Ok(bytes) => {
                        if handle.is_cancelled() {
                            log::trace!("Tile {} loaded after cancellation, dropped", key);
                        } else {
                            on_ready(ready(TileImage::Encoded(bytes)));
                        }
                        Ok(())
                    }
                    Err(err) => {
                        log::warn!("Tile {} failed to load: {}", key, err);
                        if show_error_tile && !handle.is_cancelled() {
                            on_ready(ready(TileImage::Placeholder(shared_error_tile(&error_image, tile_size))));
                        }
                        Err(err)
                    }
                }
            })
        })
    }
}
