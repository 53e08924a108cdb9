use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use stepflow::config::LayoutConfig;
use stepflow::graph::build_graph;
use stepflow::layout::{Direction, compute_layout};
use stepflow::model::Step;

fn step(id: String, title: String, deps: Vec<String>) -> Step {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "dependencies": deps,
    }))
    .expect("step decode failed")
}

/// A single dependency chain of `n` steps.
fn chain_steps(n: usize) -> Vec<Step> {
    (0..n)
        .map(|i| {
            let deps = if i == 0 { vec![] } else { vec![format!("S{}", i - 1)] };
            step(format!("S{i}"), format!("Station {i}"), deps)
        })
        .collect()
}

/// A diamond-heavy graph: every step depends on the two before it.
fn weave_steps(n: usize) -> Vec<Step> {
    (0..n)
        .map(|i| {
            let deps = (i.saturating_sub(2)..i).map(|j| format!("S{j}")).collect();
            step(format!("S{i}"), format!("Station {i}"), deps)
        })
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    for (name, steps) in [
        ("chain_20", chain_steps(20)),
        ("chain_100", chain_steps(100)),
        ("weave_100", weave_steps(100)),
        ("weave_400", weave_steps(400)),
    ] {
        let graph = build_graph(&steps);
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| {
                let layout = compute_layout(black_box(graph), Direction::LeftRight, &config);
                black_box(layout.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_graph");
    for (name, steps) in [("chain_100", chain_steps(100)), ("weave_400", weave_steps(400))] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &steps, |b, steps| {
            b.iter(|| {
                let graph = build_graph(black_box(steps));
                black_box(graph.edges.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_build, bench_layout
);
criterion_main!(benches);
