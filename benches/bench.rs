// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::*;
use ndarray::prelude::*;

use paramdb::{c64, Chunk, Parameter, Query};

/// A gain-like parameter over 32 times, 48 channels and 8 antennas, with a
/// few flagged values.
fn gains() -> Parameter<c64> {
    let times: Vec<f64> = (0..32).map(|i| i as f64 * 8.0).collect();
    let freqs: Vec<f64> = (0..48).map(|i| 1.5e8 + i as f64 * 8e4).collect();
    let values = Array3::from_shape_fn((times.len(), freqs.len(), 8), |(t, f, a)| {
        c64::new(1.0 + t as f64 * 1e-3 + a as f64, f as f64 * 1e-2)
    });
    let mask = Array3::from_shape_fn(values.raw_dim(), |(t, f, a)| (t + f + a) % 17 == 0);
    let chunk = Chunk::masked(values.into_dyn(), mask.into_dyn())
        .unwrap()
        .with_grid("time", times)
        .with_grid("freq", freqs);

    let mut param = Parameter::new("G", &["time", "freq", "ant"], &["time", "freq"], c64::default())
        .unwrap();
    param.update_shape(chunk.shape(), &chunk.grid).unwrap();
    param.finalize_shape().unwrap();
    param.load([&chunk]).unwrap();
    param
}

fn interpolation(c: &mut Criterion) {
    let mut param = gains();
    let query = Query::new()
        .coords("time", (0..100).map(|i| i as f64 * 2.5).collect())
        .coords("freq", (0..100).map(|i| 1.5e8 + i as f64 * 3.8e4).collect());

    c.bench_function("lookup on grid", |b| {
        b.iter(|| param.lookup(&Query::new().index("ant", 3)).unwrap())
    });

    c.bench_function("reinterpolate 2D, warm cache", |b| {
        b.iter(|| param.reinterpolate(&query).unwrap())
    });

    let mut group = c.benchmark_group("reinterpolate 2D, cold cache");
    group.sample_size(10);
    group.bench_function("one antenna", |b| {
        b.iter(|| {
            param.release_cache();
            param.reinterpolate(&query.clone().index("ant", 0)).unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, interpolation);
criterion_main!(benches);
