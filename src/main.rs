//! Panotile demo - pans a camera across a tiled panorama and streams tiles.
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>       Tile source JSON (default: 4096px faces, 8 tiles per side)
//!   --tiles-dir <PATH>    Read tiles from this directory instead of simulating them
//!   --yaw <DEGREES>       Yaw step between camera moves (default: 30)
//!   --fov <DEGREES>       Vertical field of view (default: 75)
//!   --steps <N>           Number of camera moves (default: 12)
//!   --frame-ms <MS>       Time spent loading between moves (default: 120)
//!   --concurrency <N>     Maximum simultaneous tile loads (default: 8)
//!   --fail-every <N>      Simulated fetches fail every Nth tile (default: never)

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use panotile::core::camera::PanoramaCamera;
use panotile::core::{logging, Error};
use panotile::streaming::{FsFetcher, StreamerConfig, TileFetcher, TileImage, TileStreamer};
use panotile::tiles::{TileSourceConfig, TileSourceFile, TileUrl};

struct DemoArgs {
    yaw_step: f32,
    fov: f32,
    steps: u32,
    frame: Duration,
}

#[tokio::main]
async fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();

    let source = match parse_str_arg(&args, "--config") {
        Some(path) => match TileSourceFile::load(&PathBuf::from(&path)).and_then(TileSourceFile::into_config) {
            Ok(source) => source,
            Err(e) => {
                log::error!("Invalid tile source {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => TileSourceConfig::new(4096, 8, TileUrl::template("{face}/{col}_{row}.jpg")),
    };

    let config = StreamerConfig {
        concurrency: parse_usize_arg(&args, "--concurrency").unwrap_or(8),
        ..Default::default()
    };

    let demo = DemoArgs {
        yaw_step: parse_f32_arg(&args, "--yaw").unwrap_or(30.0),
        fov: parse_f32_arg(&args, "--fov").unwrap_or(75.0),
        steps: parse_usize_arg(&args, "--steps").unwrap_or(12) as u32,
        frame: Duration::from_millis(parse_usize_arg(&args, "--frame-ms").unwrap_or(120) as u64),
    };

    let result = match parse_str_arg(&args, "--tiles-dir") {
        Some(dir) => run(source, config, FsFetcher::new(dir), demo).await,
        None => {
            let fail_every = parse_usize_arg(&args, "--fail-every").unwrap_or(0);
            run(source, config, simulated_fetcher(fail_every), demo).await
        }
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run<F: TileFetcher>(
    source: TileSourceConfig,
    config: StreamerConfig,
    fetcher: F,
    demo: DemoArgs,
) -> Result<(), Error> {
    let loaded = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let (loaded_count, failed_count) = (loaded.clone(), failed.clone());
    let mut streamer = TileStreamer::new(source, config, fetcher, move |tile| {
        let key = tile.key();
        match tile.image {
            TileImage::Encoded(bytes) => {
                loaded_count.fetch_add(1, Ordering::Relaxed);
                log::debug!("Tile {} ready ({} bytes)", key, bytes.len());
            }
            TileImage::Placeholder(_) => {
                failed_count.fetch_add(1, Ordering::Relaxed);
                log::debug!("Tile {} replaced by error placeholder", key);
            }
        }
    })?;

    let mut camera = PanoramaCamera::new(demo.fov, 16.0 / 9.0);
    let start = Instant::now();

    for step in 0..demo.steps {
        camera.rotate_to((demo.yaw_step * step as f32).to_radians(), 0.0);
        let added = streamer.on_camera_changed(&camera.state());
        log::info!(
            "Step {}: yaw {:.0} deg, {} new tiles, {} tracked, {} in flight",
            step,
            camera.yaw.to_degrees(),
            added,
            streamer.queue().len(),
            streamer.in_flight_count()
        );

        let frame = tokio::time::sleep(demo.frame);
        tokio::pin!(frame);
        loop {
            tokio::select! {
                _ = &mut frame => break,
                Some((key, status)) = streamer.next_completion() => {
                    log::trace!("Tile {} finished: {:?}", key, status);
                }
            }
        }
    }

    streamer.run_until_idle().await;

    log::info!(
        "Done in {:.2}s: {} tiles loaded, {} placeholders, {} tiles parked",
        start.elapsed().as_secs_f32(),
        loaded.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        streamer.queue().len()
    );
    Ok(())
}

/// Fetcher answering after a short, URL-dependent delay
fn simulated_fetcher(fail_every: usize) -> impl TileFetcher {
    let counter = Arc::new(AtomicUsize::new(0));
    move |url: String| {
        let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
        let delay = 20 + url.bytes().map(u64::from).sum::<u64>() % 40;
        async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if fail_every > 0 && n % fail_every == 0 {
                return Err(Error::Fetch { url, reason: "simulated failure".into() });
            }
            Ok(url.into_bytes())
        }
    }
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
