// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use ndarray::prelude::*;

use super::{delaunay::triangulate, *};
use crate::c64;

/// A linear function is reproduced exactly by piecewise-linear interpolation,
/// whatever the triangulation.
fn plane(p: [f64; 2]) -> f64 {
    p[0] + 2.0 * p[1]
}

#[test]
fn test_linear_interpolation() {
    let l = LinearInterpolator::new(vec![(0.0, 1.0), (0.5, 2.0), (1.0, 3.0)]).unwrap();
    assert_abs_diff_eq!(l.evaluate(0.25).unwrap(), 1.5);
    assert_abs_diff_eq!(l.evaluate(0.75).unwrap(), 2.5);
    assert_abs_diff_eq!(l.evaluate(0.0).unwrap(), 1.0);
    assert_abs_diff_eq!(l.evaluate(1.0).unwrap(), 3.0);
    assert!(l.evaluate(-0.1).is_none());
    assert!(l.evaluate(1.1).is_none());
    assert!(l.evaluate(f64::NAN).is_none());
}

#[test]
fn test_linear_single_point_does_not_extrapolate() {
    let l = LinearInterpolator::new(vec![(0.4, 7.0)]).unwrap();
    for x in [0.4, 0.4 + 1e-7, 0.4 - 1e-7] {
        assert_abs_diff_eq!(l.evaluate(x).unwrap(), 7.0);
    }
    for x in [-10.0, 0.0, 0.5, 1.0, 10.0] {
        assert!(l.evaluate(x).is_none(), "x = {x}");
    }
}

#[test]
fn test_linear_no_points() {
    assert!(LinearInterpolator::<f64>::new(vec![]).is_none());
}

#[test]
fn test_linear_complex() {
    let l = LinearInterpolator::new(vec![
        (0.0, c64::new(1.0, 0.0)),
        (1.0, c64::new(0.0, 1.0)),
    ])
    .unwrap();
    let v = l.evaluate(0.5).unwrap();
    assert_abs_diff_eq!(v.re, 0.5);
    assert_abs_diff_eq!(v.im, 0.5);
}

#[test]
fn test_triangulate_counts() {
    // 4 points with a triangular hull: 2n - h - 2 = 3 triangles.
    let points = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.3, 0.3]];
    assert_eq!(triangulate(&points).len(), 3);

    assert!(triangulate(&points[..2]).is_empty());
}

#[test]
fn test_triangulated_reproduces_plane() {
    let mut points = vec![];
    for x in [0.0, 0.5, 1.0] {
        for y in [0.0, 0.25, 1.0] {
            points.push([x, y]);
        }
    }
    let values = points.iter().map(|&p| plane(p)).collect();
    let t = TriangulatedInterpolator::new(points.clone(), values);
    assert!(t.num_triangles() > 0);

    for p in &points {
        assert_abs_diff_eq!(t.evaluate(*p).unwrap(), plane(*p), epsilon = 1e-12);
    }
    for q in [[0.3, 0.7], [0.9, 0.1], [0.5, 0.5]] {
        assert_abs_diff_eq!(t.evaluate(q).unwrap(), plane(q), epsilon = 1e-12);
    }
    assert!(t.evaluate([1.5, 0.5]).is_none());
    assert!(t.evaluate([0.5, -0.01]).is_none());
    assert!(t.evaluate([f64::NAN, 0.5]).is_none());
}

#[test]
fn test_triangulated_too_few_points() {
    let points = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
    let values = points.iter().map(|&p| plane(p)).collect();
    let t = TriangulatedInterpolator::new(points, values);
    let v = t.evaluate([0.25, 0.25]).unwrap();
    assert_abs_diff_eq!(v, 0.75, epsilon = 1e-6);

    // A single point must not fail to triangulate; anything it gives back is
    // that point's value.
    let t = TriangulatedInterpolator::new(vec![[0.5, 0.5]], vec![7.0]);
    for q in [[0.5, 0.5], [0.0, 0.0], [0.9, 0.2]] {
        if let Some(v) = t.evaluate(q) {
            assert_abs_diff_eq!(v, 7.0, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_triangulated_colinear_points() {
    let points: Vec<[f64; 2]> = [0.0, 0.25, 0.5, 1.0].iter().map(|&x| [x, 0.5]).collect();
    let values = points.iter().map(|&p| p[0]).collect();
    let t = TriangulatedInterpolator::new(points, values);
    for q in [[0.1, 0.5], [0.6, 0.5], [0.3, 0.9]] {
        if let Some(v) = t.evaluate(q) {
            assert_abs_diff_eq!(v, q[0], epsilon = 1e-6);
        }
    }
}

#[test]
fn test_interpolator_dimensions() {
    let scalar = MaskedArray::unmasked(arr0(3.0).into_dyn());
    let i = Interpolator::new(&[], &scalar);
    assert_eq!(i.dims(), Some(0));
    assert_abs_diff_eq!(i.evaluate(&[]).unwrap(), 3.0);

    let flagged = MaskedArray::fully_masked(&[3], 0.0);
    let grid: &[f64] = &[0.0, 0.5, 1.0];
    let i = Interpolator::new(&[grid], &flagged);
    assert_eq!(i.dims(), None);
    assert!(i.evaluate(&[0.5]).is_none());
}

#[test]
fn test_interpolator_skips_flagged_points() {
    // The middle value is garbage, but flagged.
    let segment = MaskedArray::new(
        array![1.0, 100.0, 3.0].into_dyn(),
        array![false, true, false].into_dyn(),
    )
    .unwrap();
    let grid: &[f64] = &[0.0, 0.5, 1.0];
    let i = Interpolator::new(&[grid], &segment);
    assert_eq!(i.dims(), Some(1));
    assert_abs_diff_eq!(i.evaluate(&[0.5]).unwrap(), 2.0);

    let xs: &[f64] = &[0.0, 0.5, 1.0];
    let ys: &[f64] = &[0.0, 0.5, 1.0];
    let mut values = Array2::zeros((3, 3));
    for (i, &x) in xs.iter().enumerate() {
        for (j, &y) in ys.iter().enumerate() {
            values[(i, j)] = plane([x, y]);
        }
    }
    let mut mask = Array2::from_elem((3, 3), false);
    mask[(1, 1)] = true;
    values[(1, 1)] = -50.0;
    let segment = MaskedArray::new(values.into_dyn(), mask.into_dyn()).unwrap();
    let i = Interpolator::new(&[xs, ys], &segment);
    assert_eq!(i.dims(), Some(2));
    assert_abs_diff_eq!(i.evaluate(&[0.5, 0.5]).unwrap(), 1.5, epsilon = 1e-12);
}

#[test]
fn test_cached_interpolator_covers() {
    let cached = CachedInterpolator {
        interpolator: Interpolator::Constant(1.0),
        windows: vec![Window {
            axis: 0,
            start: 2,
            end: 10,
        }],
    };
    let w = |axis, start, end| Window { axis, start, end };
    assert!(cached.covers(&[w(0, 2, 10)]));
    assert!(cached.covers(&[w(0, 3, 8)]));
    assert!(!cached.covers(&[w(0, 1, 8)]));
    assert!(!cached.covers(&[w(0, 3, 11)]));
    assert!(!cached.covers(&[w(1, 3, 8)]));
    assert!(!cached.covers(&[w(0, 3, 8), w(1, 0, 1)]));
}
