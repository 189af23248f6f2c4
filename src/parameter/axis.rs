// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Axis descriptions, grid coordinates and grid normalisation.

use std::{
    cmp::Ordering,
    collections::HashMap,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Whether a parameter can be interpolated along an axis.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKind {
    /// A continuous axis, e.g. time or frequency. A parameter's slices span
    /// all of its interpolatable axes.
    #[strum(serialize = "interpolatable")]
    Interpolatable,

    /// A discrete axis, e.g. antenna, direction or correlation. Each index on
    /// a discrete axis selects a different slice.
    #[strum(serialize = "discrete")]
    Discrete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub name: String,
    pub kind: AxisKind,
    /// The position of this axis in the parameter's axis order.
    pub index: usize,
}

impl Axis {
    pub fn is_interpolatable(&self) -> bool {
        self.kind == AxisKind::Interpolatable
    }
}

/// A grid coordinate with total ordering and hashing, so that it can key
/// sets and maps. `-0.0` and `0.0` are the same coordinate. NaN is never
/// allowed into a grid.
#[derive(Debug, Clone, Copy)]
pub struct Coord(pub f64);

impl Coord {
    fn canonical_bits(self) -> u64 {
        if self.0 == 0.0 {
            0.0_f64.to_bits()
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for Coord {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for Coord {}

impl Hash for Coord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            Ordering::Equal
        } else {
            self.0.total_cmp(&other.0)
        }
    }
}

/// Reverse mapping from a coordinate to its position on a grid.
pub type GridMap = HashMap<Coord, usize>;

pub(crate) fn make_grid_map(grid: &[f64]) -> GridMap {
    grid.iter().enumerate().map(|(i, &x)| (Coord(x), i)).collect()
}

/// Is this grid strictly increasing and free of NaNs?
pub(crate) fn is_strictly_increasing(grid: &[f64]) -> bool {
    grid.iter().all(|x| !x.is_nan()) && grid.windows(2).all(|w| w[0] < w[1])
}

/// The mapping of an interpolatable axis's grid onto \[0, 1\]:
/// `norm = (x - min) / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalisation {
    pub min: f64,
    pub scale: f64,
}

impl Normalisation {
    /// Derive the normalisation of a sorted grid. A degenerate grid (size 0
    /// or 1, or zero span) gets a scale of 1.
    pub(crate) fn from_grid(grid: &[f64]) -> Normalisation {
        let min = grid.first().copied().unwrap_or(0.0);
        let span = grid.last().copied().unwrap_or(0.0) - min;
        Normalisation {
            min,
            scale: if span == 0.0 { 1.0 } else { span },
        }
    }

    #[inline]
    pub fn to_norm(&self, x: f64) -> f64 {
        (x - self.min) / self.scale
    }

    #[inline]
    pub fn from_norm(&self, x: f64) -> f64 {
        x * self.scale + self.min
    }
}
