// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reconciliation of grids and shapes as chunks of solutions arrive (the
//! prototype -> skeleton transition).

use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::{
    axis::{make_grid_map, Axis, Coord, GridMap, Normalisation},
    ParameterError,
};

/// Grid and shape information gathered while a parameter is a prototype.
#[derive(Debug, Clone)]
pub(crate) struct ShapeAccumulator {
    /// Grids supplied when the parameter was defined.
    declared: Vec<Option<Vec<f64>>>,

    /// The known length of each axis, if any.
    shape: Vec<Option<usize>>,

    /// The coordinates supplied by chunks so far.
    grid_set: Vec<BTreeSet<Coord>>,

    /// Has at least one chunk been accumulated?
    pub(crate) populated: bool,
}

impl ShapeAccumulator {
    pub(crate) fn new(num_axes: usize) -> ShapeAccumulator {
        ShapeAccumulator {
            declared: vec![None; num_axes],
            shape: vec![None; num_axes],
            grid_set: vec![BTreeSet::new(); num_axes],
            populated: false,
        }
    }

    pub(crate) fn declare_grid(&mut self, axis: usize, grid: Vec<f64>) {
        self.shape[axis] = Some(grid.len());
        self.declared[axis] = Some(grid);
    }

    /// The best-known length of each axis (0 where unknown).
    pub(crate) fn shape(&self) -> Vec<usize> {
        self.shape
            .iter()
            .zip(self.grid_set.iter())
            .map(|(s, set)| s.unwrap_or(set.len()))
            .collect()
    }

    /// Account for a chunk of the given shape. `grid` holds explicit
    /// coordinates for the axes on which the chunk is a partial slice.
    ///
    /// Everything is checked before anything is recorded, so a rejected chunk
    /// leaves the accumulator as it was.
    pub(crate) fn update(
        &mut self,
        param: &str,
        axes: &[Axis],
        shape: &[usize],
        grid: &IndexMap<String, Vec<f64>>,
    ) -> Result<(), ParameterError> {
        if shape.len() != axes.len() {
            return Err(ParameterError::DimensionMismatch {
                param: param.to_string(),
                expected: axes.len(),
                got: shape.len(),
            });
        }
        if let Some(unknown) = grid.keys().find(|k| !axes.iter().any(|a| &a.name == *k)) {
            return Err(ParameterError::UnknownAxis {
                param: param.to_string(),
                axis: unknown.clone(),
            });
        }

        for (axis, &len) in axes.iter().zip(shape) {
            let i = axis.index;
            match grid.get(&axis.name) {
                Some(coords) => {
                    if coords.len() != len {
                        return Err(ParameterError::GridLengthMismatch {
                            param: param.to_string(),
                            axis: axis.name.clone(),
                            num_coords: coords.len(),
                            len,
                        });
                    }
                    if coords.iter().any(|x| x.is_nan()) {
                        return Err(ParameterError::InvalidGrid {
                            param: param.to_string(),
                            axis: axis.name.clone(),
                        });
                    }
                    // A predeclared discrete grid is fixed; chunks may only
                    // cover points on it.
                    if let (false, Some(declared)) =
                        (axis.is_interpolatable(), self.declared[i].as_ref())
                    {
                        let declared: BTreeSet<Coord> = declared.iter().map(|&x| Coord(x)).collect();
                        if let Some(&coord) = coords.iter().find(|&&x| !declared.contains(&Coord(x)))
                        {
                            return Err(ParameterError::AxisMismatch {
                                param: param.to_string(),
                                axis: axis.name.clone(),
                                coord,
                            });
                        }
                    }
                }

                None => {
                    if let Some(expected) = self.shape[i] {
                        if expected != len {
                            return Err(ParameterError::ShapeMismatch {
                                param: param.to_string(),
                                axis: axis.name.clone(),
                                got: len,
                                expected,
                            });
                        }
                    }
                }
            }
        }

        for (axis, &len) in axes.iter().zip(shape) {
            let i = axis.index;
            match grid.get(&axis.name) {
                Some(coords) => self.grid_set[i].extend(coords.iter().map(|&x| Coord(x))),
                None => {
                    self.shape[i].get_or_insert(len);
                }
            }
        }
        self.populated = true;

        Ok(())
    }

    /// Turn the accumulated information into final grids. Returns `None` if
    /// no chunks were ever accumulated.
    pub(crate) fn finalize(&self, axes: &[Axis]) -> Option<Skeleton> {
        if !self.populated {
            return None;
        }

        let grids: Vec<Vec<f64>> = axes
            .iter()
            .map(|axis| {
                let i = axis.index;
                let set = &self.grid_set[i];
                let declared = self.declared[i].as_ref();
                // The accumulated grid wins for interpolatable axes, and for
                // axes without a predeclared grid.
                if !set.is_empty() && (axis.is_interpolatable() || declared.is_none()) {
                    set.iter().map(|c| c.0).collect()
                } else if let Some(declared) = declared {
                    declared.clone()
                } else {
                    (0..self.shape[i].unwrap_or(0)).map(|x| x as f64).collect()
                }
            })
            .collect();

        Some(Skeleton::new(axes, grids))
    }
}

/// The fixed grids of a parameter whose shape has been finalised.
#[derive(Debug, Clone)]
pub(crate) struct Skeleton {
    pub(crate) grids: Vec<Vec<f64>>,
    pub(crate) grid_maps: Vec<GridMap>,
    /// Only populated for interpolatable axes.
    pub(crate) normalisations: Vec<Option<Normalisation>>,
    /// Only populated for interpolatable axes.
    pub(crate) norm_grids: Vec<Option<Vec<f64>>>,
}

impl Skeleton {
    fn new(axes: &[Axis], grids: Vec<Vec<f64>>) -> Skeleton {
        let grid_maps = grids.iter().map(|g| make_grid_map(g)).collect();
        let normalisations: Vec<Option<Normalisation>> = axes
            .iter()
            .zip(grids.iter())
            .map(|(axis, grid)| {
                axis.is_interpolatable()
                    .then(|| Normalisation::from_grid(grid))
            })
            .collect();
        let norm_grids = normalisations
            .iter()
            .zip(grids.iter())
            .map(|(norm, grid)| {
                norm.map(|norm| grid.iter().map(|&x| norm.to_norm(x)).collect())
            })
            .collect();

        Skeleton {
            grids,
            grid_maps,
            normalisations,
            norm_grids,
        }
    }

    pub(crate) fn shape(&self) -> Vec<usize> {
        self.grids.iter().map(Vec::len).collect()
    }
}
