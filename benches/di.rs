use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_container::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let container = Container::new();
    container.instance("answer", 42u64);

    // Prime the singleton
    let _ = container.get("answer").unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = container.get_as::<u64>("answer").unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let container = Container::new();
                container.singleton("expensive", |_| ExpensiveToCreate {
                    data: (0..1000).collect(),
                });
                container
            },
            |container| {
                let v = container.get_as::<ExpensiveToCreate>("expensive").unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_singleton_vs_transient(c: &mut Criterion) {
    struct Service {
        data: [u8; 64],
    }

    let mut group = c.benchmark_group("singleton_vs_transient");

    let container = Container::new();
    container.singleton("shared", |_| Service { data: [0; 64] });
    container.transient("fresh", |_| Service { data: [0; 64] });

    group.bench_function("singleton_hit", |b| {
        b.iter(|| {
            let v = container.get_as::<Service>("shared").unwrap();
            black_box(&v.data);
        })
    });

    group.bench_function("transient", |b| {
        b.iter(|| {
            let v = container.get_as::<Service>("fresh").unwrap();
            black_box(&v.data);
        })
    });

    group.finish();
}

fn bench_autowire(c: &mut Criterion) {
    struct Config {
        url: String,
    }

    impl Injectable for Config {
        fn describe() -> ClassDescriptor {
            ClassDescriptor::of::<Config>()
                .param(ParameterDescriptor::untyped("url").with_default(String::from("sqlite::memory:")))
                .construct(|args| Ok(Config { url: args.cloned(0)? }))
        }
    }

    struct Repository {
        config: Arc<Config>,
    }

    impl Injectable for Repository {
        fn describe() -> ClassDescriptor {
            ClassDescriptor::of::<Repository>()
                .param(ParameterDescriptor::autowired::<Config>("config"))
                .construct(|args| Ok(Repository { config: args.get(0)? }))
        }
    }

    let mut group = c.benchmark_group("autowire");

    let container = Container::new();
    container.register_class::<Repository>();
    group.bench_function("resolve_two_levels", |b| {
        b.iter(|| {
            let repo = container.resolve::<Repository>().unwrap();
            black_box(repo.config.url.len());
        })
    });

    let bound = Container::new();
    bound.bind_parameter::<Repository, _>("config", Config { url: String::from("pg") });
    group.bench_function("resolve_with_binding", |b| {
        b.iter(|| {
            let repo = bound.resolve::<Repository>().unwrap();
            black_box(repo.config.url.len());
        })
    });

    group.finish();
}

fn bench_middleware_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("middleware_chain");

    for &count in &[0usize, 1, 4, 16] {
        let container = Container::new();
        container.instance("answer", 42u64);
        for _ in 0..count {
            container.add_middleware(|_, instance| instance);
        }

        group.bench_with_input(BenchmarkId::new("get", count), &count, |b, _| {
            b.iter(|| {
                let v = container.get("answer").unwrap();
                black_box(v);
            })
        });
    }

    group.finish();
}

fn bench_tag_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_scaling");

    for &count in &[1usize, 4, 16, 64] {
        let container = Container::new();
        for i in 0..count {
            let id = format!("handler.{}", i);
            container.instance(id.clone(), i);
            container.tag(&id, "handlers");
        }

        group.bench_with_input(BenchmarkId::new("get_by_tag", count), &count, |b, _| {
            b.iter(|| {
                let all = container.get_by_tag("handlers").unwrap();
                black_box(all.len());
            })
        });
    }

    group.finish();
}

fn bench_circular_detection_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("circular_detection");

    // Non-circular chain of depth 8
    let container = Container::new();
    container.transient("s1", |_| 1u64);
    for level in 2..=8u64 {
        let dep = format!("s{}", level - 1);
        container.transient(format!("s{}", level), move |c| {
            c.get_as::<u64>(&dep).map(|v| *v + 1).unwrap_or(0)
        });
    }

    group.bench_function("chain_depth_8", |b| {
        b.iter(|| {
            let v = container.get_as::<u64>("s8").unwrap();
            black_box(v);
        })
    });

    group.finish();
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");

    let container = Container::new();
    container.instance("answer", 42u64);

    for &thread_count in &[1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("singleton_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    std::thread::scope(|s| {
                        for _ in 0..threads {
                            let container = container.clone();
                            s.spawn(move || {
                                for _ in 0..iters / threads as u64 {
                                    let v = container.get("answer").unwrap();
                                    black_box(v);
                                }
                            });
                        }
                    });
                    start.elapsed()
                })
            },
        );
    }

    group.finish();
}

// ===== Macro Benchmarks =====

fn bench_large_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_registry");

    for &service_count in &[10, 100, 1000] {
        let container = Container::new();
        container.instance("answer", 42u64);
        for i in 0..service_count {
            container.instance(format!("service.{}", i), i as u32);
        }

        group.bench_with_input(
            BenchmarkId::new("resolve_from_large_registry", service_count),
            &service_count,
            |b, _| {
                b.iter(|| {
                    let v = container.get("answer").unwrap();
                    black_box(v);
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_singleton_vs_transient,
    bench_autowire,
    bench_middleware_chain,
    bench_tag_scaling,
    bench_circular_detection_depth,
    bench_contention
);

criterion_group!(macro_benches, bench_large_registry);

criterion_main!(micro_benches, macro_benches);
