// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters: N-dimensional sets of values (and flags) with axis
//! information.
//!
//! A parameter has two kinds of axes: continuous, interpolatable axes (e.g.
//! time and frequency) and discrete axes (e.g. antenna, direction and
//! correlation). Internally, a populated parameter is a set of masked arrays
//! over the interpolatable axes, one such "slice" for each point of the
//! discrete axes.
//!
//! A parameter goes through three states, in order, and never back:
//!
//! * Prototype: axes are declared, and grids may be partially known. A solver
//!   calls [`Parameter::update_shape`] for each chunk of solutions it makes.
//!
//! * Skeleton: [`Parameter::finalize_shape`] fixes every grid. No values are
//!   loaded yet.
//!
//! * Populated: [`Parameter::init_arrays`], [`Parameter::paste_slice`] (once
//!   per chunk) and [`Parameter::finalize_arrays`] load the values and break
//!   them into slices. Only now may the parameter be queried.

mod accumulate;
mod axis;
mod chunk;
mod definition;
mod dense;
mod error;
mod query;
mod slices;

pub use axis::{Axis, AxisKind, Coord, GridMap, Normalisation};
pub use chunk::Chunk;
pub use definition::ParameterDefinition;
pub use error::ParameterError;
pub use query::{AxisSelection, Query, SliceView};
pub use slices::{Slice, SliceKey};

use std::{
    fmt::Debug,
    ops::{Add, Mul},
};

use indexmap::IndexMap;
use log::{debug, info};
use num_traits::Zero;
use strum_macros::Display;

use accumulate::{ShapeAccumulator, Skeleton};
use axis::is_strictly_increasing;
use dense::DenseStore;
use slices::SliceSet;

use crate::{constants::MAX_INTERPOLATION_AXES, interp::InterpolatorCache};

/// The types that parameter values can have. Interpolation needs values to be
/// scalable by real weights and summed; `f64` and [`crate::c64`] qualify.
pub trait ParamValue:
    Copy + Debug + Send + Sync + Zero + Add<Output = Self> + Mul<f64, Output = Self>
{
}

impl<T> ParamValue for T where
    T: Copy + Debug + Send + Sync + Zero + Add<Output = T> + Mul<f64, Output = T>
{
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ParameterState {
    #[strum(serialize = "prototype")]
    Prototype,

    #[strum(serialize = "skeleton")]
    Skeleton,

    /// Between [`Parameter::init_arrays`] and [`Parameter::finalize_arrays`].
    #[strum(serialize = "loading")]
    Loading,

    #[strum(serialize = "populated")]
    Populated,
}

#[derive(Debug)]
pub struct Parameter<T> {
    name: String,

    /// The fill value for undefined values.
    empty: T,

    metadata: Option<String>,

    axes: Vec<Axis>,

    /// Axis name -> axis number.
    axis_index: IndexMap<String, usize>,

    /// Axis numbers of the interpolatable axes, in axis order.
    interpolation_axes: Vec<usize>,

    accumulator: ShapeAccumulator,

    skeleton: Option<Skeleton>,

    store: Option<DenseStore<T>>,

    slices: Option<SliceSet<T>>,

    /// Interpolators are cached per slice. This is not part of the durable
    /// state of the parameter; see [`Parameter::release_cache`].
    interpolators: InterpolatorCache<T>,
}

impl<T: ParamValue> Parameter<T> {
    /// Define a new parameter.
    ///
    /// `interpolation_axes` names at most 2 of `axes`; the rest are discrete.
    /// `empty` is the value reported wherever there is no valid data.
    pub fn new<S: AsRef<str>, S2: AsRef<str>>(
        name: &str,
        axes: &[S],
        interpolation_axes: &[S2],
        empty: T,
    ) -> Result<Parameter<T>, ParameterError> {
        if interpolation_axes.len() > MAX_INTERPOLATION_AXES {
            return Err(ParameterError::TooManyInterpolationAxes {
                param: name.to_string(),
                num: interpolation_axes.len(),
            });
        }

        let mut axis_index = IndexMap::with_capacity(axes.len());
        for (i, axis) in axes.iter().enumerate() {
            let axis = axis.as_ref();
            if axis_index.insert(axis.to_string(), i).is_some() {
                return Err(ParameterError::DuplicateAxis {
                    param: name.to_string(),
                    axis: axis.to_string(),
                });
            }
        }

        let mut interp_flags = vec![false; axes.len()];
        for axis in interpolation_axes {
            let axis = axis.as_ref();
            match axis_index.get(axis) {
                Some(&i) => interp_flags[i] = true,
                None => {
                    return Err(ParameterError::UnknownAxis {
                        param: name.to_string(),
                        axis: axis.to_string(),
                    })
                }
            }
        }

        let axes: Vec<Axis> = axis_index
            .keys()
            .zip(interp_flags)
            .enumerate()
            .map(|(index, (axis, interp))| Axis {
                name: axis.clone(),
                kind: if interp {
                    AxisKind::Interpolatable
                } else {
                    AxisKind::Discrete
                },
                index,
            })
            .collect();
        let interpolation_axes = axes
            .iter()
            .filter(|a| a.is_interpolatable())
            .map(|a| a.index)
            .collect();

        debug!(
            "defining parameter '{name}' over {}",
            axis_index.keys().map(|s| s.as_str()).collect::<Vec<_>>().join(",")
        );
        Ok(Parameter {
            name: name.to_string(),
            empty,
            metadata: None,
            accumulator: ShapeAccumulator::new(axes.len()),
            axes,
            axis_index,
            interpolation_axes,
            skeleton: None,
            store: None,
            slices: None,
            interpolators: InterpolatorCache::new(),
        })
    }

    /// Declare the full grid of an axis ahead of time. For a discrete axis,
    /// chunks may then only cover points on this grid; for an interpolatable
    /// axis, any coordinates supplied by chunks replace it.
    pub fn with_grid(mut self, axis: &str, grid: Vec<f64>) -> Result<Parameter<T>, ParameterError> {
        if self.accumulator.populated {
            return Err(self.wrong_state("declare a grid"));
        }
        let i = self.axis_index(axis)?;
        if !is_strictly_increasing(&grid) {
            return Err(ParameterError::InvalidGrid {
                param: self.name.clone(),
                axis: axis.to_string(),
            });
        }
        self.accumulator.declare_grid(i, grid);
        Ok(self)
    }

    pub fn with_metadata(mut self, metadata: String) -> Parameter<T> {
        self.metadata = Some(metadata);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn empty(&self) -> T {
        self.empty
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// The axis number of the named axis.
    pub fn axis_index(&self, axis: &str) -> Result<usize, ParameterError> {
        self.axis_index
            .get(axis)
            .copied()
            .ok_or_else(|| ParameterError::UnknownAxis {
                param: self.name.clone(),
                axis: axis.to_string(),
            })
    }

    pub fn interpolation_axes(&self) -> &[usize] {
        &self.interpolation_axes
    }

    pub fn state(&self) -> ParameterState {
        if self.slices.is_some() {
            ParameterState::Populated
        } else if self.store.is_some() {
            ParameterState::Loading
        } else if self.skeleton.is_some() {
            ParameterState::Skeleton
        } else {
            ParameterState::Prototype
        }
    }

    /// The length of each axis. Before the shape is finalised, unknown
    /// lengths are 0.
    pub fn shape(&self) -> Vec<usize> {
        match &self.skeleton {
            Some(s) => s.shape(),
            None => self.accumulator.shape(),
        }
    }

    /// The finalised grid of the named axis.
    pub fn grid(&self, axis: &str) -> Result<&[f64], ParameterError> {
        let i = self.axis_index(axis)?;
        let skeleton = self.skeleton("get a grid")?;
        Ok(&skeleton.grids[i])
    }

    /// The normalisation of the named axis, if it is interpolatable.
    pub fn normalisation(&self, axis: &str) -> Result<Option<Normalisation>, ParameterError> {
        let i = self.axis_index(axis)?;
        let skeleton = self.skeleton("get a normalisation")?;
        Ok(skeleton.normalisations[i])
    }

    /// Account for a chunk of solutions of the given shape. `grid` supplies
    /// coordinates for the axes along which the chunk is a partial slice.
    pub fn update_shape(
        &mut self,
        shape: &[usize],
        grid: &IndexMap<String, Vec<f64>>,
    ) -> Result<(), ParameterError> {
        if self.state() != ParameterState::Prototype {
            return Err(self.wrong_state("update the shape"));
        }
        self.accumulator.update(&self.name, &self.axes, shape, grid)
    }

    /// Fix the grids of every axis. Returns `false`, and stays a prototype,
    /// if no chunks were ever accounted for.
    pub fn finalize_shape(&mut self) -> Result<bool, ParameterError> {
        if self.state() != ParameterState::Prototype {
            return Err(self.wrong_state("finalize the shape"));
        }
        match self.accumulator.finalize(&self.axes) {
            Some(skeleton) => {
                info!(
                    "dimensions of {} are {}",
                    self.name,
                    skeleton
                        .shape()
                        .iter()
                        .map(|n| n.to_string())
                        .collect::<Vec<_>>()
                        .join(",")
                );
                self.skeleton = Some(skeleton);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Allocate the dense cube. Everything starts flagged.
    pub fn init_arrays(&mut self) -> Result<(), ParameterError> {
        if self.state() != ParameterState::Skeleton {
            return Err(self.wrong_state("initialise arrays"));
        }
        let shape = self.shape();
        debug!(
            "  loading {}, shape {}",
            self.name,
            shape
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join("x")
        );
        self.store = Some(DenseStore::new(&shape, self.empty));
        Ok(())
    }

    /// Paste a chunk's values into the cube. Where chunks overlap, the last
    /// one pasted wins.
    pub fn paste_slice(&mut self, chunk: &Chunk<T>) -> Result<(), ParameterError> {
        if let (Some(skeleton), Some(store), None) = (&self.skeleton, &mut self.store, &self.slices)
        {
            return store.paste(&self.name, &self.axes, skeleton, chunk);
        }
        Err(self.wrong_state("paste a chunk"))
    }

    /// Break the cube into slices; the parameter is now populated.
    pub fn finalize_arrays(&mut self) -> Result<(), ParameterError> {
        if self.state() != ParameterState::Loading {
            return Err(self.wrong_state("finalize arrays"));
        }
        if let (Some(skeleton), Some(store)) = (&self.skeleton, self.store.take()) {
            let slices = slices::decompose(&self.name, &self.axes, skeleton, store);
            debug!(
                "{}: {} of {} slices have valid data",
                self.name,
                slices.values().filter(|s| s.array.is_some()).count(),
                slices.len()
            );
            self.slices = Some(slices);
        }
        Ok(())
    }

    /// Can this chunk be pasted once the shape is finalised?
    pub fn check_chunk(&self, chunk: &Chunk<T>) -> Result<(), ParameterError> {
        let skeleton = self.skeleton("check a chunk")?;
        dense::placement(&self.name, &self.axes, skeleton, chunk).map(|_| ())
    }

    /// Initialise, paste every chunk and finalise, in one go. Every chunk is
    /// checked first; if any is rejected, the parameter is left untouched.
    pub fn load<'a, I>(&mut self, chunks: I) -> Result<(), ParameterError>
    where
        I: IntoIterator<Item = &'a Chunk<T>>,
        T: 'a,
    {
        if self.state() != ParameterState::Skeleton {
            return Err(self.wrong_state("load chunks"));
        }
        let chunks: Vec<&Chunk<T>> = chunks.into_iter().collect();
        for chunk in &chunks {
            self.check_chunk(chunk)?;
        }

        self.init_arrays()?;
        for chunk in chunks {
            self.paste_slice(chunk)?;
        }
        self.finalize_arrays()
    }

    fn skeleton(&self, operation: &'static str) -> Result<&Skeleton, ParameterError> {
        self.skeleton
            .as_ref()
            .ok_or_else(|| self.wrong_state(operation))
    }

    fn wrong_state(&self, operation: &'static str) -> ParameterError {
        ParameterError::WrongState {
            param: self.name.clone(),
            operation,
            state: self.state(),
        }
    }
}
