// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Delaunay triangulation of scattered 2D points (Bowyer-Watson), and
//! piecewise-linear interpolation over the resulting triangles.

use std::collections::HashMap;

use crate::{
    constants::{BARYCENTRIC_TOLERANCE, JOGGLE_SCALE, MIN_TRIANGULATION_POINTS},
    ParamValue,
};

#[derive(Debug, Clone)]
pub struct TriangulatedInterpolator<T> {
    points: Vec<[f64; 2]>,
    values: Vec<T>,
    triangles: Vec<[usize; 3]>,
    locator: TriangleLocator,
}

impl<T: ParamValue> TriangulatedInterpolator<T> {
    /// Triangulate the points. Degenerate point sets (fewer than 4 points, or
    /// all points sharing an x or a y coordinate) are padded and joggled so
    /// that triangles exist.
    ///
    /// # Panics
    ///
    /// Panics if `points` and `values` have different lengths.
    pub fn new(mut points: Vec<[f64; 2]>, mut values: Vec<T>) -> TriangulatedInterpolator<T> {
        assert_eq!(points.len(), values.len());

        let same_along = |d: usize| points.iter().all(|p| p[d] == points[0][d]);
        let degenerate = !points.is_empty()
            && (points.len() < MIN_TRIANGULATION_POINTS || same_along(0) || same_along(1));
        if degenerate {
            let n = points.len();
            for i in n..MIN_TRIANGULATION_POINTS {
                points.push(points[i % n]);
                values.push(values[i % n]);
            }
            joggle(&mut points);
        }

        let triangles = triangulate(&points);
        let locator = TriangleLocator::new(&points, &triangles);
        TriangulatedInterpolator {
            points,
            values,
            triangles,
            locator,
        }
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Interpolate at `q`. `None` if `q` is outside the convex hull of the
    /// points.
    pub fn evaluate(&self, q: [f64; 2]) -> Option<T> {
        if q[0].is_nan() || q[1].is_nan() {
            return None;
        }
        self.locator.candidates(q).iter().find_map(|&i_tri| {
            let [a, b, c] = self.triangles[i_tri];
            let [l0, l1, l2] =
                barycentric(self.points[a], self.points[b], self.points[c], q)?;
            if l0 < -BARYCENTRIC_TOLERANCE
                || l1 < -BARYCENTRIC_TOLERANCE
                || l2 < -BARYCENTRIC_TOLERANCE
            {
                return None;
            }
            Some(self.values[a] * l0 + self.values[b] * l1 + self.values[c] * l2)
        })
    }
}

/// Barycentric coordinates of `q` in the triangle `abc`, or `None` if the
/// triangle has no area.
fn barycentric(a: [f64; 2], b: [f64; 2], c: [f64; 2], q: [f64; 2]) -> Option<[f64; 3]> {
    let det = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
    if det == 0.0 {
        return None;
    }
    let l0 = ((b[1] - c[1]) * (q[0] - c[0]) + (c[0] - b[0]) * (q[1] - c[1])) / det;
    let l1 = ((c[1] - a[1]) * (q[0] - c[0]) + (a[0] - c[0]) * (q[1] - c[1])) / det;
    Some([l0, l1, 1.0 - l0 - l1])
}

/// Displace every point by a tiny, deterministic amount (splitmix64 noise).
fn joggle(points: &mut [[f64; 2]]) {
    let mut state = 0_u64;
    let mut next = move || {
        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        // Uniform in [-1, 1).
        (z >> 11) as f64 / (1_u64 << 52) as f64 - 1.0
    };
    for p in points {
        p[0] += JOGGLE_SCALE * next();
        p[1] += JOGGLE_SCALE * next();
    }
}

#[derive(Debug, Clone)]
struct Triangle {
    vertices: [usize; 3],
    centre: [f64; 2],
    radius2: f64,
}

impl Triangle {
    fn new(verts: &[[f64; 2]], vertices: [usize; 3]) -> Option<Triangle> {
        let [a, b, c] = vertices.map(|v| verts[v]);
        let (bx, by) = (b[0] - a[0], b[1] - a[1]);
        let (cx, cy) = (c[0] - a[0], c[1] - a[1]);
        let d = 2.0 * (bx * cy - by * cx);
        if d == 0.0 {
            return None;
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        Some(Triangle {
            vertices,
            centre: [a[0] + ux, a[1] + uy],
            radius2: ux * ux + uy * uy,
        })
    }

    fn circumcircle_contains(&self, p: [f64; 2]) -> bool {
        let dx = p[0] - self.centre[0];
        let dy = p[1] - self.centre[1];
        dx * dx + dy * dy < self.radius2
    }
}

/// Bowyer-Watson triangulation. The returned triangles index into `points`.
pub(crate) fn triangulate(points: &[[f64; 2]]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return vec![];
    }

    let (min, max) = bounding_box(points.iter());
    let span = match (max[0] - min[0]).max(max[1] - min[1]) {
        s if s > 0.0 => s,
        _ => 1.0,
    };
    let mid = [(min[0] + max[0]) / 2.0, (min[1] + max[1]) / 2.0];

    // A super-triangle enclosing everything; its vertices are n, n+1, n+2.
    let mut verts = points.to_vec();
    verts.push([mid[0] - 20.0 * span, mid[1] - span]);
    verts.push([mid[0], mid[1] + 20.0 * span]);
    verts.push([mid[0] + 20.0 * span, mid[1] - span]);

    let mut triangles: Vec<Triangle> = Triangle::new(&verts, [n, n + 1, n + 2])
        .into_iter()
        .collect();
    let mut edges: Vec<[usize; 2]> = vec![];
    let mut edge_counts: HashMap<[usize; 2], usize> = HashMap::new();
    for (i, &p) in points.iter().enumerate() {
        edges.clear();
        edge_counts.clear();
        triangles.retain(|t| {
            if t.circumcircle_contains(p) {
                let [a, b, c] = t.vertices;
                edges.extend([[a, b], [b, c], [c, a]]);
                false
            } else {
                true
            }
        });
        for e in &edges {
            *edge_counts.entry(sorted_edge(*e)).or_default() += 1;
        }
        // The boundary of the cavity is made of edges belonging to only one
        // removed triangle.
        for &[a, b] in &edges {
            if edge_counts[&sorted_edge([a, b])] == 1 {
                triangles.extend(Triangle::new(&verts, [a, b, i]));
            }
        }
    }

    triangles
        .into_iter()
        .map(|t| t.vertices)
        .filter(|v| v.iter().all(|&i| i < n))
        .collect()
}

fn sorted_edge([a, b]: [usize; 2]) -> [usize; 2] {
    if a < b {
        [a, b]
    } else {
        [b, a]
    }
}

fn bounding_box<'a, I: Iterator<Item = &'a [f64; 2]>>(points: I) -> ([f64; 2], [f64; 2]) {
    points.fold(
        ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]),
        |(min, max), p| {
            (
                [min[0].min(p[0]), min[1].min(p[1])],
                [max[0].max(p[0]), max[1].max(p[1])],
            )
        },
    )
}

/// A uniform grid of buckets over the triangles' bounding box; each bucket
/// lists the triangles whose bounding boxes overlap it.
#[derive(Debug, Clone)]
struct TriangleLocator {
    origin: [f64; 2],
    cell: [f64; 2],
    num_cells: usize,
    buckets: Vec<Vec<usize>>,
}

impl TriangleLocator {
    fn new(points: &[[f64; 2]], triangles: &[[usize; 3]]) -> TriangleLocator {
        let (min, max) = bounding_box(triangles.iter().flatten().map(|&v| &points[v]));
        let num_cells = ((triangles.len() as f64).sqrt().ceil() as usize).clamp(1, 512);
        let cell_size = |d: usize| match (max[d] - min[d]) / num_cells as f64 {
            s if s > 0.0 => s,
            _ => 1.0,
        };
        let mut locator = TriangleLocator {
            origin: min,
            cell: [cell_size(0), cell_size(1)],
            num_cells,
            buckets: vec![vec![]; num_cells * num_cells],
        };

        for (i_tri, tri) in triangles.iter().enumerate() {
            let (tmin, tmax) = bounding_box(tri.iter().map(|&v| &points[v]));
            let [x0, y0] = locator.cell_of(tmin);
            let [x1, y1] = locator.cell_of(tmax);
            for x in x0..=x1 {
                for y in y0..=y1 {
                    locator.buckets[x * num_cells + y].push(i_tri);
                }
            }
        }
        locator
    }

    fn cell_of(&self, p: [f64; 2]) -> [usize; 2] {
        let index = |d: usize| {
            let i = ((p[d] - self.origin[d]) / self.cell[d]).floor();
            if i.is_nan() || i < 0.0 {
                0
            } else {
                (i as usize).min(self.num_cells - 1)
            }
        };
        [index(0), index(1)]
    }

    fn candidates(&self, q: [f64; 2]) -> &[usize] {
        let [x, y] = self.cell_of(q);
        &self.buckets[x * self.num_cells + y]
    }
}
