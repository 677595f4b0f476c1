use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;
use std::time::Duration;
use tempfile::TempDir;

use zipmerge::archive::{ArchiveName, discover_archives};
use zipmerge::fixtures::{self, FixtureSpec};
use zipmerge::parallel::{ExecutionStrategy, StrategyKind};
use zipmerge::record::XmlRecordParser;
use zipmerge::Pipeline;

/// Archive sets shaped like the original workload, scaled down
const SETS: [(&str, FixtureSpec); 2] = [
    ("small", FixtureSpec { archives: 16, records_per_archive: 100 }),
    ("medium", FixtureSpec { archives: 50, records_per_archive: 400 }),
];

fn archive_set(spec: FixtureSpec) -> (TempDir, Vec<ArchiveName>) {
    let dir = TempDir::new().expect("Failed to create fixture dir");
    let mut rng = StdRng::seed_from_u64(50);
    fixtures::generate(&mut rng, dir.path(), spec).expect("Failed to generate archives");
    let archives = discover_archives(dir.path(), "zip").expect("Failed to list archives");
    (dir, archives)
}

/// Every strategy on the same archive set, sized for this machine
fn bench_strategies(c: &mut Criterion) {
    let workers = ExecutionStrategy::calculate_optimal_workers(0, 100);

    for (name, spec) in SETS {
        let (_dir, archives) = archive_set(spec);

        let mut group = c.benchmark_group(format!("merge_{name}"));
        group.measurement_time(Duration::from_secs(10));
        group.sample_size(10);

        for kind in StrategyKind::ALL {
            let pipeline = Pipeline::new(ExecutionStrategy::new(kind, workers, None), XmlRecordParser::new());
            group.bench_with_input(BenchmarkId::new(kind.to_string(), workers), &archives, |b, archives| {
                b.iter(|| {
                    let merged = pipeline.run(archives).expect("Merge failed");
                    black_box(merged.len())
                });
            });
        }

        group.finish();
    }
}

/// Pool strategy across worker counts
fn bench_pool_scaling(c: &mut Criterion) {
    let (_dir, archives) = archive_set(SETS[1].1);

    let mut group = c.benchmark_group("pool_scaling");
    group.sample_size(10);

    for workers in [1, 2, 4, 8] {
        let pipeline = Pipeline::new(
            ExecutionStrategy::new(StrategyKind::Pool, workers, None),
            XmlRecordParser::new(),
        );
        group.bench_with_input(BenchmarkId::from_parameter(workers), &archives, |b, archives| {
            b.iter(|| black_box(pipeline.run(archives).expect("Merge failed").len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_strategies, bench_pool_scaling);
criterion_main!(benches);
