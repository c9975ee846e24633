// Throughput of channel inversion on a 1080p BGRA8 frame, one worker
// versus every available hardware thread.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use zenmap::rgb::Rgba;
use zenmap::{MapConfig, Parallelism, ParallelPixelMapper, PixelBuffer, invert};

fn map_throughput(c: &mut Criterion) {
    let input = PixelBuffer::filled(1920, 1080, Rgba::new(100, 150, 200, 255)).unwrap();
    let hardware = Parallelism::Available.resolve(None);

    let mut group = c.benchmark_group("invert_1080p");
    group.throughput(Throughput::Bytes(input.as_bytes().len() as u64));

    let mut counts = vec![1, hardware];
    counts.dedup();
    for workers in counts {
        let mapper = ParallelPixelMapper::new(MapConfig::new().with_workers(workers));
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| mapper.map(black_box(&input.as_slice()), invert).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, map_throughput);
criterion_main!(benches);
