// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Piecewise-linear interpolation in one dimension.

use vec1::{vec1, Vec1};

use crate::{constants::SINGLE_POINT_HALF_WIDTH, ParamValue};

#[derive(Debug, Clone)]
pub struct LinearInterpolator<T> {
    xs: Vec1<f64>,
    values: Vec1<T>,
}

impl<T: ParamValue> LinearInterpolator<T> {
    /// Make an interpolator from points sorted by ascending coordinate.
    /// Returns `None` if there are no points.
    ///
    /// A single point is turned into a tiny two-point segment centred on it.
    /// Nothing is extrapolated, so it only covers its own neighbourhood.
    pub fn new(points: Vec<(f64, T)>) -> Option<LinearInterpolator<T>> {
        match points.len() {
            0 => None,
            1 => {
                let (x, v) = points[0];
                Some(LinearInterpolator {
                    xs: vec1![x - SINGLE_POINT_HALF_WIDTH, x + SINGLE_POINT_HALF_WIDTH],
                    values: vec1![v, v],
                })
            }
            _ => {
                let (xs, values): (Vec<f64>, Vec<T>) = points.into_iter().unzip();
                Some(LinearInterpolator {
                    xs: Vec1::try_from_vec(xs).ok()?,
                    values: Vec1::try_from_vec(values).ok()?,
                })
            }
        }
    }

    pub fn evaluate(&self, x: f64) -> Option<T> {
        if x.is_nan() || x < *self.xs.first() || x > *self.xs.last() {
            return None;
        }

        // The first grid point strictly above x. x >= first, so this is >= 1.
        let hi = self.xs.partition_point(|&g| g <= x);
        if hi == self.xs.len() {
            return Some(*self.values.last());
        }
        let lo = hi - 1;
        let t = (x - self.xs[lo]) / (self.xs[hi] - self.xs[lo]);
        Some(self.values[lo] * (1.0 - t) + self.values[hi] * t)
    }
}
