// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use indexmap::IndexMap;
use ndarray::{ArrayD, ShapeError};

use crate::MaskedArray;

/// A partial update to a parameter's values, as produced by a solver.
///
/// The array has one dimension per parameter axis. For an axis on which the
/// chunk covers only part of the full grid, `grid` holds the explicit
/// coordinates of the covered points; for any other axis the chunk spans the
/// whole axis.
#[derive(Debug, Clone)]
pub struct Chunk<T> {
    pub array: MaskedArray<T>,
    pub grid: IndexMap<String, Vec<f64>>,
}

impl<T: Clone> Chunk<T> {
    /// A chunk of entirely valid values.
    pub fn new(values: ArrayD<T>) -> Chunk<T> {
        Chunk {
            array: MaskedArray::unmasked(values),
            grid: IndexMap::new(),
        }
    }

    /// A chunk with flags; `true` in `mask` marks an invalid solution. The
    /// mask must have the same shape as the values.
    pub fn masked(values: ArrayD<T>, mask: ArrayD<bool>) -> Result<Chunk<T>, ShapeError> {
        Ok(Chunk {
            array: MaskedArray::new(values, mask)?,
            grid: IndexMap::new(),
        })
    }

    /// Restrict the chunk to explicit coordinates along `axis`.
    pub fn with_grid<S: Into<String>>(mut self, axis: S, coords: Vec<f64>) -> Chunk<T> {
        self.grid.insert(axis.into(), coords);
        self
    }

    pub fn shape(&self) -> &[usize] {
        self.array.shape()
    }
}
