// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Decomposition of the dense cube into per-discrete-index slices over the
//! interpolatable axes (the skeleton -> populated transition).

use indexmap::IndexMap;
use log::trace;
use ndarray::{Dimension, IxDyn};
use rayon::prelude::*;

use super::{
    accumulate::Skeleton,
    axis::{make_grid_map, GridMap},
    dense::DenseStore,
    Axis, ParamValue,
};
use crate::MaskedArray;

/// One index per discrete axis, in axis order.
pub type SliceKey = Vec<usize>;

pub(crate) type SliceSet<T> = IndexMap<SliceKey, Slice<T>>;

/// The values of a parameter at one point of its discrete axes. For two
/// interpolatable axes of sizes N and M, `array` is NxM (or smaller, if fully
/// flagged rows or columns were trimmed), and `grid` holds the N- and
/// M-vectors of coordinates that survived the trim.
#[derive(Debug, Clone)]
pub struct Slice<T> {
    /// `None` if there are no valid values at all.
    pub array: Option<MaskedArray<T>>,

    /// Coordinates of each interpolatable axis.
    pub grid: Vec<Vec<f64>>,

    /// The same coordinates, normalised.
    pub norm_grid: Vec<Vec<f64>>,

    /// Reverse mapping from coordinates to positions in `array`.
    pub(crate) grid_map: Vec<GridMap>,
}

/// Break the dense cube into slices. The cube is consumed.
pub(crate) fn decompose<T: ParamValue>(
    param: &str,
    axes: &[Axis],
    skeleton: &Skeleton,
    store: DenseStore<T>,
) -> SliceSet<T> {
    let (interp_axes, discrete_axes): (Vec<&Axis>, Vec<&Axis>) =
        axes.iter().partition(|a| a.is_interpolatable());
    let discrete_shape: Vec<usize> = discrete_axes
        .iter()
        .map(|a| skeleton.grids[a.index].len())
        .collect();
    let keys: Vec<SliceKey> = ndarray::indices(IxDyn(&discrete_shape))
        .into_iter()
        .map(|key| key.slice().to_vec())
        .collect();
    trace!("decomposing {param} into {} slices", keys.len());

    let store = &store.array;
    let slices: Vec<(SliceKey, Slice<T>)> = keys
        .into_par_iter()
        .map(|key| {
            let mut values = store.values.view();
            let mut mask = store.mask.view();
            // Remove the highest axes first so lower axis numbers stay valid.
            for (axis, &i) in discrete_axes.iter().zip(key.iter()).rev() {
                values = values.index_axis_move(ndarray::Axis(axis.index), i);
                mask = mask.index_axis_move(ndarray::Axis(axis.index), i);
            }
            let array = MaskedArray {
                values: values.to_owned(),
                mask: mask.to_owned(),
            };
            let slice = trim_slice(param, &key, &interp_axes, skeleton, array);
            (key, slice)
        })
        .collect();

    slices.into_iter().collect()
}

/// Cut out coordinates that are flagged across all other interpolatable axes.
/// Internal holes are left for the interpolators to deal with.
fn trim_slice<T: ParamValue>(
    param: &str,
    key: &[usize],
    interp_axes: &[&Axis],
    skeleton: &Skeleton,
    array: MaskedArray<T>,
) -> Slice<T> {
    let mut grid: Vec<Vec<f64>> = interp_axes
        .iter()
        .map(|a| skeleton.grids[a.index].clone())
        .collect();
    let mut norm_grid: Vec<Vec<f64>> = interp_axes
        .iter()
        .map(|a| skeleton.norm_grids[a.index].clone().unwrap_or_default())
        .collect();

    let mut array = if array.ndim() == 0 && array.is_fully_masked() {
        None
    } else {
        Some(array)
    };

    for (i_axis, axis) in interp_axes.iter().enumerate() {
        let Some(current) = array.as_ref() else {
            break;
        };
        let all_flagged: Vec<bool> = current
            .mask
            .axis_iter(ndarray::Axis(i_axis))
            .map(|lane| lane.iter().all(|&m| m))
            .collect();

        if all_flagged.iter().all(|&f| f) {
            trace!("  {param} slice {key:?} fully flagged");
            array = None;
        } else if all_flagged.iter().any(|&f| f) {
            let keep: Vec<usize> = all_flagged
                .iter()
                .enumerate()
                .filter(|&(_, &f)| !f)
                .map(|(i, _)| i)
                .collect();
            trace!(
                "  {param} slice {key:?} flagged at {} {} points",
                all_flagged.len() - keep.len(),
                axis.name
            );
            array = Some(current.select(i_axis, &keep));
            grid[i_axis] = keep.iter().map(|&i| grid[i_axis][i]).collect();
            norm_grid[i_axis] = keep.iter().map(|&i| norm_grid[i_axis][i]).collect();
        }
    }

    let grid_map = grid.iter().map(|g| make_grid_map(g)).collect();
    Slice {
        array,
        grid,
        norm_grid,
        grid_map,
    }
}
