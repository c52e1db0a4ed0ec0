//! Benchmarks for the geometry cores:
//! - CSR construction from shuffled edge lists
//! - wavefront shortest paths on grid-shaped graphs
//! - occupancy grid insertion of synthetic scans
//!
//! Run with: `cargo bench`
//! View HTML reports in: `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use drishti_geom::{Edge, Graph, OccupancyGrid, OccupancyGridConfig, Point3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Random undirected graph with `n` vertices and `m` logical edges.
fn random_graph(n: usize, m: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<Point3> = (0..n)
        .map(|_| {
            Point3::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
            )
        })
        .collect();
    let edges: Vec<Edge> = (0..m)
        .map(|_| Edge::new(rng.random_range(0..n as u32), rng.random_range(0..n as u32)))
        .collect();
    let mut graph = Graph::from_points(points);
    graph.add_edges(&edges, &[]).expect("non-empty edge list");
    graph
}

/// Synthetic panoramic scan: `count` returns on a sphere of `radius`.
fn synthetic_scan(count: usize, radius: f32, seed: u64) -> Vec<Point3> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let theta = rng.random_range(0.0..std::f32::consts::TAU);
            let z = rng.random_range(-1.0..1.0f32);
            let r = (1.0 - z * z).sqrt();
            Point3::new(r * theta.cos(), r * theta.sin(), z) * radius
        })
        .collect()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_construct");
    for &m in &[1_000usize, 10_000, 100_000] {
        let graph = random_graph(m / 4, m, 42);
        group.throughput(Throughput::Elements(m as u64));
        group.bench_with_input(BenchmarkId::from_parameter(m), &graph, |b, g| {
            b.iter(|| {
                let mut g = g.clone();
                g.construct().unwrap();
                black_box(g);
            });
        });
    }
    group.finish();
}

fn bench_sssp(c: &mut Criterion) {
    let mut group = c.benchmark_group("dijkstra_paths");
    for &n in &[100usize, 1_000, 5_000] {
        let mut graph = random_graph(n, n * 4, 7);
        graph.set_edge_weights_from_distance();
        group.bench_with_input(BenchmarkId::from_parameter(n), &graph, |b, g| {
            b.iter(|| black_box(g.dijkstra_paths(0).unwrap()));
        });
    }
    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_insert");
    for &count in &[100usize, 1_000] {
        let scan = synthetic_scan(count, 3.0, 11);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &scan, |b, points| {
            b.iter(|| {
                let mut grid = OccupancyGrid::new(OccupancyGridConfig::new(0.1, 128));
                black_box(grid.insert(points, &Point3::ZERO, -1.0));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_construct, bench_sssp, bench_insert);
criterion_main!(benches);
