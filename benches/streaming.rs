use criterion::{criterion_group, criterion_main, Criterion, black_box};

use panotile::core::camera::PanoramaCamera;
use panotile::core::Error;
use panotile::streaming::{priority_for_angle, PriorityLoadQueue, TaskFuture, TaskWork};
use panotile::tiles::{TileKey, TileSourceConfig, TileUrl, VisibilityScanner};

fn scanner(nb_tiles: u32) -> VisibilityScanner {
    let config = TileSourceConfig::new(8192, nb_tiles, TileUrl::template("{face}/{col}_{row}"));
    VisibilityScanner::new(config.validate().unwrap())
}

fn noop_work() -> TaskWork {
    Box::new(|_handle| -> TaskFuture { Box::pin(async { Ok::<(), Error>(()) }) })
}

fn bench_scan_4(c: &mut Criterion) {
    let scanner = scanner(4);
    let camera = PanoramaCamera::new(75.0, 16.0 / 9.0).state();

    c.bench_function("scan_4x4", |b| {
        b.iter(|| scanner.scan(black_box(&camera)));
    });
}

fn bench_scan_16(c: &mut Criterion) {
    let scanner = scanner(16);

    c.bench_function("scan_16x16_panning", |b| {
        let mut camera = PanoramaCamera::new(75.0, 16.0 / 9.0);
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            camera.rotate_to(frame as f32 * 0.01, (frame as f32 * 0.003).sin() * 0.8);
            scanner.scan(black_box(&camera.state()))
        });
    });
}

fn bench_queue_rescan(c: &mut Criterion) {
    let scanner = scanner(16);
    let camera = PanoramaCamera::new(75.0, 16.0 / 9.0).state();
    let tiles = scanner.scan(&camera);

    c.bench_function("queue_disable_refresh_start", |b| {
        b.iter(|| {
            let mut queue = PriorityLoadQueue::new(8);
            for tile in &tiles {
                queue.enqueue(tile.key(), priority_for_angle(tile.angle), noop_work());
            }
            queue.disable_all();
            for tile in &tiles {
                queue.set_priority(tile.key(), priority_for_angle(tile.angle));
            }
            black_box(queue.start().len())
        });
    });
}

fn bench_queue_drain(c: &mut Criterion) {
    c.bench_function("queue_drain_1536_tasks", |b| {
        b.iter(|| {
            let mut queue = PriorityLoadQueue::new(8);
            for face in 0..6u8 {
                for row in 0..16 {
                    for col in 0..16 {
                        let priority = (face as u32 * 256 + row * 16 + col) as f32;
                        queue.enqueue(TileKey::new(face, col, row), priority, noop_work());
                    }
                }
            }

            let mut in_flight = queue.start();
            while let Some(task) = in_flight.pop() {
                queue.complete(task.key, task.serial, &Ok(()));
                in_flight.extend(queue.start());
            }
            black_box(queue.len())
        });
    });
}

criterion_group!(
    benches,
    bench_scan_4,
    bench_scan_16,
    bench_queue_rescan,
    bench_queue_drain,
);

criterion_main!(benches);
