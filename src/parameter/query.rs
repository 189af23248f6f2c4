// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Queries against populated parameters: direct slice access, exact lookup
//! and reinterpolation onto arbitrary grids.

use indexmap::IndexMap;
use log::{debug, trace};
use ndarray::{ArrayD, ArrayViewMutD, Dimension, IxDyn};

use super::{axis::Coord, slices::Slice, Parameter, ParameterError, ParameterState, SliceKey};
use crate::{
    interp::{CachedInterpolator, Interpolator, Window},
    MaskedArray, ParamValue,
};

/// How a query selects along one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisSelection {
    /// The whole axis (the default for axes a query doesn't mention).
    Full,

    /// A single index on a discrete axis. The axis is dropped from the
    /// output.
    Index(usize),

    /// Indices on a discrete axis.
    Indices(Vec<usize>),

    /// A single coordinate on an interpolatable axis. The axis is dropped
    /// from the output.
    Coord(f64),

    /// Coordinates on an interpolatable axis.
    Coords(Vec<f64>),
}

/// A mapping from axis names to [`AxisSelection`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    selections: IndexMap<String, AxisSelection>,
}

impl Query {
    pub fn new() -> Query {
        Query::default()
    }

    pub fn select<S: Into<String>>(mut self, axis: S, selection: AxisSelection) -> Query {
        self.selections.insert(axis.into(), selection);
        self
    }

    pub fn index<S: Into<String>>(self, axis: S, index: usize) -> Query {
        self.select(axis, AxisSelection::Index(index))
    }

    pub fn indices<S: Into<String>>(self, axis: S, indices: Vec<usize>) -> Query {
        self.select(axis, AxisSelection::Indices(indices))
    }

    pub fn coord<S: Into<String>>(self, axis: S, coord: f64) -> Query {
        self.select(axis, AxisSelection::Coord(coord))
    }

    pub fn coords<S: Into<String>>(self, axis: S, coords: Vec<f64>) -> Query {
        self.select(axis, AxisSelection::Coords(coords))
    }

    pub fn get(&self, axis: &str) -> Option<&AxisSelection> {
        self.selections.get(axis)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AxisSelection)> {
        self.selections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// A borrowed slice of a populated parameter.
#[derive(Debug, Clone, Copy)]
pub struct SliceView<'a, T> {
    /// `None` if the slice has no valid values.
    pub array: Option<&'a MaskedArray<T>>,

    /// The raw coordinates of each interpolatable axis of `array`.
    pub grid: &'a [Vec<f64>],
}

/// A query resolved against a parameter's axes.
struct QueryPlan {
    /// The output shape, one dimension per parameter axis.
    shape: Vec<usize>,

    /// The axis numbers of the discrete axes.
    discrete_axes: Vec<usize>,

    /// Parameter indices to visit on each discrete axis.
    discrete: Vec<Vec<usize>>,

    /// Output coordinates on each interpolatable axis.
    coords: Vec<Vec<f64>>,

    /// Axis numbers to drop from the output.
    collapse: Vec<usize>,
}

impl QueryPlan {
    /// Every (output position along the discrete axes, slice key) pair.
    fn slice_positions(&self) -> Vec<(Vec<usize>, SliceKey)> {
        let lens: Vec<usize> = self.discrete.iter().map(Vec::len).collect();
        ndarray::indices(IxDyn(&lens))
            .into_iter()
            .map(|pos| {
                let pos = pos.slice().to_vec();
                let key = pos
                    .iter()
                    .zip(self.discrete.iter())
                    .map(|(&p, list)| list[p])
                    .collect();
                (pos, key)
            })
            .collect()
    }

    /// Drop the collapsed axes from a result.
    fn reduce<T: ParamValue>(&self, mut out: MaskedArray<T>, empty: T) -> MaskedArray<T> {
        for &axis in self.collapse.iter().rev() {
            out = out.index_axis_move(axis, 0);
        }
        out.fill_masked(empty);
        out
    }
}

/// The part of an output array belonging to one slice.
fn slice_output<'a, A>(
    out: &'a mut ArrayD<A>,
    discrete_axes: &[usize],
    pos: &[usize],
) -> ArrayViewMutD<'a, A> {
    let mut view = out.view_mut();
    for (&axis, &i) in discrete_axes.iter().zip(pos.iter()).rev() {
        view = view.index_axis_move(ndarray::Axis(axis), i);
    }
    view
}

fn shape_str(shape: &[usize]) -> String {
    shape
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("x")
}

impl<T: ParamValue> Parameter<T> {
    fn populated_slices(
        &self,
        operation: &'static str,
    ) -> Result<&IndexMap<SliceKey, Slice<T>>, ParameterError> {
        self.slices
            .as_ref()
            .ok_or_else(|| self.wrong_state(operation))
    }

    fn check_query_axes(&self, query: &Query) -> Result<(), ParameterError> {
        for (axis, _) in query.iter() {
            self.axis_index(axis)?;
        }
        Ok(())
    }

    fn invalid_value(&self, axis: &str, reason: &'static str) -> ParameterError {
        ParameterError::InvalidAxisValue {
            param: self.name.clone(),
            axis: axis.to_string(),
            reason,
        }
    }

    fn check_index(&self, axis: &str, index: usize, len: usize) -> Result<usize, ParameterError> {
        if index < len {
            Ok(index)
        } else {
            Err(ParameterError::IndexOutOfRange {
                param: self.name.clone(),
                axis: axis.to_string(),
                index,
                len,
            })
        }
    }

    /// The key of the slice a query selects. Every discrete axis longer than
    /// 1 needs a single index.
    fn slice_key(&self, query: &Query) -> Result<SliceKey, ParameterError> {
        self.check_query_axes(query)?;
        let shape = self.shape();
        let mut key = vec![];
        for axis in &self.axes {
            let len = shape[axis.index];
            match (axis.is_interpolatable(), query.get(&axis.name)) {
                (true, None) => (),
                (true, Some(_)) => {
                    return Err(
                        self.invalid_value(&axis.name, "slices span the interpolatable axes")
                    )
                }
                (false, Some(AxisSelection::Index(i))) => {
                    key.push(self.check_index(&axis.name, *i, len)?)
                }
                (false, Some(_)) => {
                    return Err(self.invalid_value(&axis.name, "a single index is required"))
                }
                (false, None) if len == 1 => key.push(0),
                (false, None) => {
                    return Err(ParameterError::AxisNotSpecified {
                        param: self.name.clone(),
                        axis: axis.name.clone(),
                    })
                }
            }
        }
        Ok(key)
    }

    /// The array and grids of the slice selected by `query`. The array is
    /// `None` if the slice has no valid values.
    pub fn get_slice(&self, query: &Query) -> Result<SliceView<T>, ParameterError> {
        let slices = self.populated_slices("get a slice")?;
        let key = self.slice_key(query)?;
        let slice = &slices[&key];
        Ok(SliceView {
            array: slice.array.as_ref(),
            grid: &slice.grid,
        })
    }

    /// Mutable access to the values of a slice. Any cached interpolator for
    /// the slice is dropped, as it may no longer match the values.
    pub fn get_slice_mut(
        &mut self,
        query: &Query,
    ) -> Result<Option<&mut MaskedArray<T>>, ParameterError> {
        self.populated_slices("get a slice")?;
        let key = self.slice_key(query)?;
        self.interpolators.remove(&key);
        Ok(self
            .slices
            .as_mut()
            .and_then(|slices| slices.get_mut(&key))
            .and_then(|slice| slice.array.as_mut()))
    }

    /// Does the slice selected by `query` have any valid values?
    pub fn is_slice_valid(&self, query: &Query) -> Result<bool, ParameterError> {
        Ok(self.get_slice(query)?.array.is_some())
    }

    /// The number of slices with valid values, and the total number of
    /// slices.
    pub fn num_valid_slices(&self) -> Result<(usize, usize), ParameterError> {
        let slices = self.populated_slices("count slices")?;
        let valid = slices.values().filter(|s| s.array.is_some()).count();
        Ok((valid, slices.len()))
    }

    /// All values on the full parameter grids.
    pub fn get_cube(&self) -> Result<MaskedArray<T>, ParameterError> {
        self.lookup(&Query::new())
    }

    fn plan(&self, query: &Query, operation: &'static str) -> Result<QueryPlan, ParameterError> {
        let skeleton = self.skeleton(operation)?;
        if self.state() != ParameterState::Populated {
            return Err(self.wrong_state(operation));
        }
        self.check_query_axes(query)?;

        let mut plan = QueryPlan {
            shape: vec![],
            discrete_axes: vec![],
            discrete: vec![],
            coords: vec![],
            collapse: vec![],
        };
        for axis in &self.axes {
            let grid = &skeleton.grids[axis.index];
            let selection = query.get(&axis.name).unwrap_or(&AxisSelection::Full);
            if axis.is_interpolatable() {
                let coords = match selection {
                    AxisSelection::Full => grid.clone(),
                    AxisSelection::Coords(c) => c.clone(),
                    AxisSelection::Coord(x) => {
                        plan.collapse.push(axis.index);
                        vec![*x]
                    }
                    AxisSelection::Index(_) | AxisSelection::Indices(_) => {
                        return Err(self.invalid_value(
                            &axis.name,
                            "an interpolatable axis is selected by coordinates",
                        ))
                    }
                };
                plan.shape.push(coords.len());
                plan.coords.push(coords);
            } else {
                let indices = match selection {
                    AxisSelection::Full => (0..grid.len()).collect(),
                    AxisSelection::Index(i) => {
                        plan.collapse.push(axis.index);
                        vec![self.check_index(&axis.name, *i, grid.len())?]
                    }
                    AxisSelection::Indices(is) => is
                        .iter()
                        .map(|&i| self.check_index(&axis.name, i, grid.len()))
                        .collect::<Result<_, _>>()?,
                    AxisSelection::Coord(_) | AxisSelection::Coords(_) => {
                        return Err(self.invalid_value(
                            &axis.name,
                            "a discrete axis is selected by indices",
                        ))
                    }
                };
                plan.shape.push(indices.len());
                plan.discrete_axes.push(axis.index);
                plan.discrete.push(indices);
            }
        }
        Ok(plan)
    }

    /// Look up values at exactly the requested coordinates. Output cells
    /// where a coordinate isn't on the slice grid (or the value there is
    /// flagged) are masked.
    pub fn lookup(&self, query: &Query) -> Result<MaskedArray<T>, ParameterError> {
        let plan = self.plan(query, "look up values")?;
        let slices = self.populated_slices("look up values")?;
        debug!(
            "will lookup {} solutions on {} grid",
            self.name,
            shape_str(&plan.shape)
        );

        let mut out = MaskedArray::fully_masked(&plan.shape, self.empty);
        for (pos, key) in plan.slice_positions() {
            let slice = &slices[&key];
            let Some(array) = slice.array.as_ref() else {
                trace!("  slice {key:?} fully flagged");
                continue;
            };

            // (output index, slice index) for every output coordinate found
            // on the slice grid.
            let pairs: Vec<Vec<(usize, usize)>> = plan
                .coords
                .iter()
                .zip(slice.grid_map.iter())
                .map(|(coords, grid_map)| {
                    coords
                        .iter()
                        .enumerate()
                        .filter_map(|(i, &x)| grid_map.get(&Coord(x)).map(|&j| (i, j)))
                        .collect()
                })
                .collect();
            trace!(
                "  slice {key:?}: looking up {} valid points",
                shape_str(&pairs.iter().map(Vec::len).collect::<Vec<_>>())
            );

            let mut values = slice_output(&mut out.values, &plan.discrete_axes, &pos);
            let mut mask = slice_output(&mut out.mask, &plan.discrete_axes, &pos);
            let lens: Vec<usize> = pairs.iter().map(Vec::len).collect();
            let mut out_index = vec![0; pairs.len()];
            let mut in_index = vec![0; pairs.len()];
            for index in ndarray::indices(IxDyn(&lens)) {
                for (k, &p) in index.slice().iter().enumerate() {
                    (out_index[k], in_index[k]) = pairs[k][p];
                }
                values[&out_index[..]] = array.values[&in_index[..]];
                mask[&out_index[..]] = array.mask[&in_index[..]];
            }
        }

        let out = plan.reduce(out, self.empty);
        debug!(
            "{} solutions: lookup results in {}/{} missing values",
            self.name,
            out.num_masked(),
            out.len()
        );
        Ok(out)
    }

    /// Interpolate values onto the requested coordinates. Output cells where
    /// nothing can be interpolated (no valid data, or outside the hull of
    /// the valid data) are masked.
    ///
    /// Interpolators are cached per slice, and reused by later calls whose
    /// data windows they cover.
    pub fn reinterpolate(&mut self, query: &Query) -> Result<MaskedArray<T>, ParameterError> {
        let plan = self.plan(query, "interpolate values")?;
        debug!(
            "will interpolate {} solutions onto {} grid",
            self.name,
            shape_str(&plan.shape)
        );

        let (Some(skeleton), Some(slices)) = (self.skeleton.as_ref(), self.slices.as_ref()) else {
            return Err(self.wrong_state("interpolate values"));
        };
        let cache = &mut self.interpolators;

        // Normalised output coordinates, for the interpolatable axes that are
        // longer than 1. The others are broadcast.
        let out_norm: Vec<Option<Vec<f64>>> = self
            .interpolation_axes
            .iter()
            .zip(plan.coords.iter())
            .map(|(&iaxis, coords)| {
                let norm = skeleton.normalisations[iaxis]?;
                (skeleton.grids[iaxis].len() > 1)
                    .then(|| coords.iter().map(|&x| norm.to_norm(x)).collect())
            })
            .collect();

        let mut out = MaskedArray::fully_masked(&plan.shape, self.empty);
        for (pos, key) in plan.slice_positions() {
            let slice = &slices[&key];
            let Some(array) = slice.array.as_ref() else {
                trace!("  slice {key:?} fully flagged");
                continue;
            };

            // A lone valid sample is held at every coordinate, whatever the
            // window.
            let sole = sole_value(array);
            let windows: Vec<Window> = self
                .interpolation_axes
                .iter()
                .enumerate()
                .filter(|&(k, _)| out_norm[k].is_some())
                .map(|(k, &iaxis)| {
                    let (start, end) = match sole {
                        Some(_) => (0, slice.grid[k].len()),
                        None => data_window(&slice.grid[k], &plan.coords[k]),
                    };
                    Window {
                        axis: iaxis,
                        start,
                        end,
                    }
                })
                .collect();

            if !cache.get(&key).map_or(false, |c| c.covers(&windows)) {
                trace!(
                    "  slice {key:?} preparing {}D interpolator for {}",
                    windows.len(),
                    windows
                        .iter()
                        .map(|w| format!("{}:{}", w.start, w.end))
                        .collect::<Vec<_>>()
                        .join(",")
                );
                let interpolator = match sole {
                    Some(v) => Interpolator::Constant(v),
                    None => {
                        let (seg_grid, seg) = segment(slice, array, &out_norm, &windows);
                        let grid_refs: Vec<&[f64]> =
                            seg_grid.iter().map(Vec::as_slice).collect();
                        Interpolator::new(&grid_refs, &seg)
                    }
                };
                cache.insert(
                    key.clone(),
                    CachedInterpolator {
                        interpolator,
                        windows,
                    },
                );
            }
            let interpolator = &cache[&key].interpolator;

            let mut values = slice_output(&mut out.values, &plan.discrete_axes, &pos);
            let mut mask = slice_output(&mut out.mask, &plan.discrete_axes, &pos);
            let mut point = vec![];
            for index in ndarray::indices(IxDyn(values.shape())) {
                point.clear();
                point.extend(
                    index
                        .slice()
                        .iter()
                        .zip(out_norm.iter())
                        .filter_map(|(&i, norm)| norm.as_ref().map(|n| n[i])),
                );
                if let Some(v) = interpolator.evaluate(&point) {
                    values[index.slice()] = v;
                    mask[index.slice()] = false;
                }
            }
            trace!("  interpolated onto {} grid", shape_str(values.shape()));
        }

        let out = plan.reduce(out, self.empty);
        debug!(
            "{} solutions: interpolation results in {}/{} missing values",
            self.name,
            out.num_masked(),
            out.len()
        );
        Ok(out)
    }

    /// Are all the requested coordinates on the parameter's grids? If so,
    /// [`Parameter::lookup`] can be used instead of
    /// [`Parameter::reinterpolate`].
    ///
    /// Selections by index, or of whole axes, are always on the grids;
    /// coordinates on a discrete axis never are.
    pub fn match_grids(&self, query: &Query) -> Result<bool, ParameterError> {
        let skeleton = self.skeleton("match grids")?;
        for (axis, selection) in query.iter() {
            let i = self.axis_index(axis)?;
            let on_grid = |x: &f64| skeleton.grid_maps[i].contains_key(&Coord(*x));
            let matched = match (self.axes[i].is_interpolatable(), selection) {
                (true, AxisSelection::Coord(x)) => on_grid(x),
                (true, AxisSelection::Coords(xs)) => xs.iter().all(on_grid),
                (true, AxisSelection::Full) => true,
                (true, _) => false,
                (false, AxisSelection::Coord(_) | AxisSelection::Coords(_)) => false,
                (false, _) => true,
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Drop every cached interpolator. This must be done before a parameter
    /// is handed off for persistence; it is always safe to call.
    pub fn release_cache(&mut self) {
        self.interpolators.clear();
    }

    pub fn num_cached_interpolators(&self) -> usize {
        self.interpolators.len()
    }
}

/// The value of the only valid cell of `array`, if it has exactly one.
fn sole_value<T: ParamValue>(array: &MaskedArray<T>) -> Option<T> {
    let mut valid = array
        .values
        .iter()
        .zip(array.mask.iter())
        .filter(|(_, &m)| !m)
        .map(|(&v, _)| v);
    match (valid.next(), valid.next()) {
        (Some(v), None) => Some(v),
        _ => None,
    }
}

/// The positions `[start, end)` on a slice grid bracketing the requested
/// coordinates, widened by one point each side.
fn data_window(grid: &[f64], coords: &[f64]) -> (usize, usize) {
    let finite = coords.iter().copied().filter(|x| x.is_finite());
    let lo = finite.clone().fold(f64::INFINITY, f64::min);
    let hi = finite.fold(f64::NEG_INFINITY, f64::max);
    if lo > hi {
        return (0, grid.len());
    }
    let start = grid.partition_point(|&g| g < lo).saturating_sub(1);
    let end = (grid.partition_point(|&g| g < hi) + 1).min(grid.len());
    (start, end)
}

/// Cut the part of a slice an interpolator is built from. Interpolatable
/// axes of length 1 are dropped; the others are cut to their windows.
fn segment<T: ParamValue>(
    slice: &Slice<T>,
    array: &MaskedArray<T>,
    out_norm: &[Option<Vec<f64>>],
    windows: &[Window],
) -> (Vec<Vec<f64>>, MaskedArray<T>) {
    let mut values = array.values.view();
    let mut mask = array.mask.view();
    let mut grid = vec![];
    let mut windows = windows.iter();
    for (k, norm) in out_norm.iter().enumerate() {
        if norm.is_some() {
            if let Some(w) = windows.next() {
                let range = ndarray::Slice::from(w.start..w.end);
                values.slice_axis_inplace(ndarray::Axis(k), range);
                mask.slice_axis_inplace(ndarray::Axis(k), range);
                grid.push(slice.norm_grid[k][w.start..w.end].to_vec());
            }
        }
    }
    for (k, norm) in out_norm.iter().enumerate().rev() {
        if norm.is_none() {
            values = values.index_axis_move(ndarray::Axis(k), 0);
            mask = mask.index_axis_move(ndarray::Axis(k), 0);
        }
    }
    let segment = MaskedArray {
        values: values.to_owned(),
        mask: mask.to_owned(),
    };
    (grid, segment)
}
