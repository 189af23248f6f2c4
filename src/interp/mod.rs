// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interpolators over the valid points of a slice segment, in 0, 1 or 2
//! dimensions, and the per-slice cache of them.

mod delaunay;
mod linear;
#[cfg(test)]
mod tests;

pub use delaunay::TriangulatedInterpolator;
pub use linear::LinearInterpolator;

use std::collections::HashMap;

use ndarray::Dimension;

use crate::{parameter::SliceKey, MaskedArray, ParamValue};

#[derive(Debug, Clone)]
pub enum Interpolator<T> {
    /// There was no valid data; nothing can be interpolated.
    Missing,

    /// No interpolatable dimensions; the single value is passed through.
    Constant(T),

    Linear(LinearInterpolator<T>),

    Triangulated(TriangulatedInterpolator<T>),
}

impl<T: ParamValue> Interpolator<T> {
    /// Build an interpolator from a segment of a slice. `grid` holds the
    /// normalised coordinates of each dimension of `segment`; masked cells of
    /// `segment` are left out.
    ///
    /// # Panics
    ///
    /// Panics if `segment` has more than 2 dimensions, or if `grid` doesn't
    /// match the shape of `segment`.
    pub fn new(grid: &[&[f64]], segment: &MaskedArray<T>) -> Interpolator<T> {
        assert_eq!(grid.len(), segment.ndim());
        assert!(segment.ndim() <= 2, "at most 2D interpolation is supported");

        let mut coords: Vec<Vec<f64>> = vec![];
        let mut values: Vec<T> = vec![];
        for ((index, &v), &flagged) in segment.values.indexed_iter().zip(segment.mask.iter()) {
            if flagged {
                continue;
            }
            coords.push(
                index
                    .slice()
                    .iter()
                    .zip(grid.iter())
                    .map(|(&i, g)| g[i])
                    .collect(),
            );
            values.push(v);
        }

        if values.is_empty() {
            return Interpolator::Missing;
        }
        match grid.len() {
            0 => Interpolator::Constant(values[0]),
            1 => {
                let points = coords.into_iter().map(|c| c[0]).zip(values).collect();
                match LinearInterpolator::new(points) {
                    Some(l) => Interpolator::Linear(l),
                    None => Interpolator::Missing,
                }
            }
            _ => Interpolator::Triangulated(TriangulatedInterpolator::new(
                coords.into_iter().map(|c| [c[0], c[1]]).collect(),
                values,
            )),
        }
    }

    pub fn dims(&self) -> Option<usize> {
        match self {
            Interpolator::Missing => None,
            Interpolator::Constant(_) => Some(0),
            Interpolator::Linear(_) => Some(1),
            Interpolator::Triangulated(_) => Some(2),
        }
    }

    /// Interpolate at the given (normalised) coordinates. `None` means the
    /// value is undefined there, e.g. outside the convex hull of the data.
    pub fn evaluate(&self, coords: &[f64]) -> Option<T> {
        match (self, coords) {
            (Interpolator::Missing, _) => None,
            (Interpolator::Constant(v), _) => Some(*v),
            (Interpolator::Linear(l), [x, ..]) => l.evaluate(*x),
            (Interpolator::Triangulated(t), [x, y, ..]) => t.evaluate([*x, *y]),
            _ => None,
        }
    }
}

/// The range of positions `[start, end)` along one interpolatable axis of a
/// slice that an interpolator was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) axis: usize,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Window {
    fn covers(&self, other: &Window) -> bool {
        self.axis == other.axis && self.start <= other.start && self.end >= other.end
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CachedInterpolator<T> {
    pub(crate) interpolator: Interpolator<T>,
    pub(crate) windows: Vec<Window>,
}

impl<T> CachedInterpolator<T> {
    /// Can this interpolator serve a request over `windows`?
    pub(crate) fn covers(&self, windows: &[Window]) -> bool {
        self.windows.len() == windows.len()
            && self
                .windows
                .iter()
                .zip(windows.iter())
                .all(|(cached, wanted)| cached.covers(wanted))
    }
}

pub(crate) type InterpolatorCache<T> = HashMap<SliceKey, CachedInterpolator<T>>;
