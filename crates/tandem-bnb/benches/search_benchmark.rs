// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;
use tandem_bnb::{
    bnb::BnbSolver,
    bound::strategy_for,
    config::{BoundMethod, SearchConfig, SearchMethod},
    monitor::no_op::NoOpMonitor,
};
use tandem_model::{index::StationIndex, model::Model, model::ModelBuilder};

/// A connectable instance with `n` evenly jittered points and `m` stations.
fn synthetic_instance(n: usize, m: usize, seed: u64) -> Model {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut coordinates = Vec::with_capacity(n);
    let mut x = 0.0;
    for _ in 0..n {
        x += rng.random_range(5.0..15.0);
        coordinates.push(x);
    }

    let mut builder = ModelBuilder::new(n, m);
    builder
        .set_placement_coordinates(&coordinates)
        .set_gateways(0.0, x + 5.0)
        .set_uniform_link_range(40.0)
        .set_cost_limit(m as f64 * 2.0)
        .set_delay_limit(5.0)
        .set_arrival(0.5, 1.0);
    for s in 0..m {
        let station = StationIndex::new(s);
        builder
            .set_station_coverage(station, rng.random_range(3.0..12.0))
            .set_station_cost(station, rng.random_range(1.0..4.0))
            .set_station_throughput(station, rng.random_range(10.0..30.0));
    }
    builder.build().expect("synthetic instance should be valid")
}

fn bench_bound_methods(c: &mut Criterion) {
    let sizes = [(6, 3), (8, 4), (10, 4)];
    let configs = [
        ("brute_force", SearchConfig::default().with_method(SearchMethod::BruteForce)),
        ("ilp", SearchConfig::default().with_bound_method(BoundMethod::Ilp)),
        ("knapsack", SearchConfig::default().with_bound_method(BoundMethod::Knapsack)),
        ("lp", SearchConfig::default().with_bound_method(BoundMethod::Lp)),
    ];

    let mut group = c.benchmark_group("search_benchmark");
    for (n, m) in sizes {
        let model = synthetic_instance(n, m, 42);
        let size_label = format!("{}x{}", n, m);
        group.throughput(Throughput::Elements((n * m) as u64));

        for (name, config) in &configs {
            let mut solver = BnbSolver::preallocated(n, m);
            let mut strategy = strategy_for(config);
            group.bench_with_input(BenchmarkId::new(*name, &size_label), &model, |b, model| {
                b.iter(|| {
                    let outcome = solver
                        .solve(black_box(model), config, strategy.as_mut(), NoOpMonitor::new())
                        .expect("benchmark instance should be connectable");
                    black_box(outcome.schedule().best_optimal())
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_bound_methods);
criterion_main!(benches);
