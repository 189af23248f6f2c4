// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Masked arrays: a value channel and a flag channel of the same shape.
//!
//! A `true` in the mask means the corresponding value is invalid (flagged or
//! missing). The value underneath a masked cell is never meaningful; it is
//! kept at the parameter's fill value wherever this crate produces output.

use ndarray::{prelude::*, ErrorKind, ShapeError};

#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray<T> {
    /// The values. Cells where `mask` is `true` should be ignored.
    pub values: ArrayD<T>,

    /// `true` where the corresponding value is invalid.
    pub mask: ArrayD<bool>,
}

impl<T: Clone> MaskedArray<T> {
    /// Make a new masked array from values and a mask of the same shape.
    pub fn new(values: ArrayD<T>, mask: ArrayD<bool>) -> Result<MaskedArray<T>, ShapeError> {
        if values.shape() != mask.shape() {
            return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape));
        }
        Ok(MaskedArray { values, mask })
    }

    /// All values are valid.
    pub fn unmasked(values: ArrayD<T>) -> MaskedArray<T> {
        let mask = ArrayD::from_elem(values.raw_dim(), false);
        MaskedArray { values, mask }
    }

    /// Every cell is `fill` and masked.
    pub fn fully_masked(shape: &[usize], fill: T) -> MaskedArray<T> {
        MaskedArray {
            values: ArrayD::from_elem(IxDyn(shape), fill),
            mask: ArrayD::from_elem(IxDyn(shape), true),
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn ndim(&self) -> usize {
        self.values.ndim()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `index`, or `None` if it is masked.
    pub fn get(&self, index: &[usize]) -> Option<T> {
        match self.mask.get(IxDyn(index)) {
            Some(false) => self.values.get(IxDyn(index)).cloned(),
            _ => None,
        }
    }

    pub fn num_masked(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    pub fn is_fully_masked(&self) -> bool {
        self.mask.iter().all(|&m| m)
    }

    /// Overwrite every masked value with `fill`.
    pub fn fill_masked(&mut self, fill: T) {
        ndarray::Zip::from(&mut self.values)
            .and(&self.mask)
            .for_each(|v, &m| {
                if m {
                    *v = fill.clone();
                }
            });
    }

    /// Drop an axis by taking a single index along it.
    pub(crate) fn index_axis_move(self, axis: usize, index: usize) -> MaskedArray<T> {
        MaskedArray {
            values: self.values.index_axis_move(Axis(axis), index),
            mask: self.mask.index_axis_move(Axis(axis), index),
        }
    }

    /// Keep only the given indices along an axis.
    pub(crate) fn select(&self, axis: usize, indices: &[usize]) -> MaskedArray<T> {
        MaskedArray {
            values: self.values.select(Axis(axis), indices),
            mask: self.mask.select(Axis(axis), indices),
        }
    }
}
