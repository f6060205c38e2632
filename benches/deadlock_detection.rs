use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flaketrace::domain::models::WaitForGraph;
use flaketrace::services::{detect_deadlocks, parse_dump};

/// `n` threads in a single wait chain, closed into a ring when `ring` is set.
fn chain(n: i64, ring: bool) -> WaitForGraph {
    let mut graph = WaitForGraph::new();
    for i in 0..n.saturating_sub(1) {
        graph.add_edge(i, i + 1, &format!("lock-{i}"));
    }
    if ring && n > 1 {
        graph.add_edge(n - 1, 0, "lock-close");
    }
    graph
}

/// Many independent two-thread deadlocks.
fn pairs(n: i64) -> WaitForGraph {
    let mut graph = WaitForGraph::new();
    for i in (0..n).step_by(2) {
        graph.add_edge(i, i + 1, &format!("a-{i}"));
        graph.add_edge(i + 1, i, &format!("b-{i}"));
    }
    graph
}

fn dump_json(n: i64) -> String {
    let threads: Vec<String> = (0..n)
        .map(|i| format!(r#"{{"id": {i}, "name": "worker-{i}", "state": "BLOCKED"}}"#))
        .collect();
    let locks: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"identity": "L{i}", "owner_thread": {}, "waiting_threads": [{i}]}}"#,
                (i + 1) % n
            )
        })
        .collect();
    format!(
        r#"{{"threads": [{}], "locks": [{}]}}"#,
        threads.join(","),
        locks.join(",")
    )
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_deadlocks");
    for size in [100i64, 1_000, 10_000] {
        let acyclic = chain(size, false);
        let ring = chain(size, true);
        let many = pairs(size);

        group.bench_with_input(BenchmarkId::new("chain", size), &acyclic, |b, g| {
            b.iter(|| detect_deadlocks(black_box(g)));
        });
        group.bench_with_input(BenchmarkId::new("ring", size), &ring, |b, g| {
            b.iter(|| detect_deadlocks(black_box(g)));
        });
        group.bench_with_input(BenchmarkId::new("pairs", size), &many, |b, g| {
            b.iter(|| detect_deadlocks(black_box(g)));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let json = dump_json(2_000);
    c.bench_function("parse_dump_2000_threads", |b| {
        b.iter(|| parse_dump(black_box(&json), "bench.json"));
    });
}

criterion_group!(benches, bench_detection, bench_parse);
criterion_main!(benches);
