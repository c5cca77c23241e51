use cache_hierarchy_sim::cache::{AllocatePolicy, Cache, CacheParams, MemoryHierarchy, WritePolicy};
use cache_hierarchy_sim::controller::MemoryController;
use cache_hierarchy_sim::policy::{BypassPolicy, PrefetchPolicy, ReplacementPolicy};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn two_level_hierarchy() -> MemoryHierarchy {
    let l1 = Cache::new(CacheParams {
        name: "L1".into(),
        level_number: 1,
        cache_size_bytes: 32 * 1024,
        block_size: 64,
        associativity: 8,
        hit_latency: 1,
        replacement_policy: ReplacementPolicy::Lru,
        write_policy: WritePolicy::WriteBack,
        allocate_policy: AllocatePolicy::WriteAllocate,
        prefetch_policy: PrefetchPolicy::next_n_line(2),
        bypass_policy: BypassPolicy::no_bypass(),
    });
    let l2 = Cache::new(CacheParams {
        name: "L2".into(),
        level_number: 2,
        cache_size_bytes: 256 * 1024,
        block_size: 64,
        associativity: 16,
        hit_latency: 10,
        replacement_policy: ReplacementPolicy::Srrip,
        write_policy: WritePolicy::WriteBack,
        allocate_policy: AllocatePolicy::WriteAllocate,
        prefetch_policy: PrefetchPolicy::none(),
        bypass_policy: BypassPolicy::no_bypass(),
    });
    MemoryHierarchy::new(vec![l1, l2], vec![10, 50], 200)
}

fn sequential_access_benchmark(c: &mut Criterion) {
    c.bench_function("sequential_read_write_through_two_levels", |b| {
        b.iter(|| {
            let mut controller = MemoryController::new(two_level_hierarchy());
            for i in 0..4096u64 {
                let addr = i * 64;
                controller.read(addr);
                controller.write(addr);
                black_box(&controller.metrics.total_latency);
            }
        });
    });
}

fn strided_access_benchmark(c: &mut Criterion) {
    c.bench_function("strided_read_through_two_levels", |b| {
        b.iter(|| {
            let mut controller = MemoryController::new(two_level_hierarchy());
            for i in 0..4096u64 {
                let addr = (i * 256) % (1024 * 1024);
                controller.read(addr);
                black_box(&controller.metrics.total_latency);
            }
        });
    });
}

criterion_group!(benches, sequential_access_benchmark, strided_access_benchmark);
criterion_main!(benches);
