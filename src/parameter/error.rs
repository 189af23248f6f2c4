// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with building and querying parameters.

use thiserror::Error;

use super::ParameterState;
use crate::constants::MAX_INTERPOLATION_AXES;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Parameter '{param}': coordinate {coord} on axis '{axis}' is not on the axis grid")]
    AxisMismatch {
        param: String,
        axis: String,
        coord: f64,
    },

    #[error("Parameter '{param}': axis '{axis}' has length {got}, but it was previously defined with length {expected}")]
    ShapeMismatch {
        param: String,
        axis: String,
        got: usize,
        expected: usize,
    },

    #[error("Parameter '{param}': axis '{axis}' has length > 1, so an index must be specified for it")]
    AxisNotSpecified { param: String, axis: String },

    #[error("Parameter '{param}': invalid value for axis '{axis}': {reason}")]
    InvalidAxisValue {
        param: String,
        axis: String,
        reason: &'static str,
    },

    #[error("Parameter '{param}' has no axis named '{axis}'")]
    UnknownAxis { param: String, axis: String },

    #[error("Parameter '{param}': axis '{axis}' is declared more than once")]
    DuplicateAxis { param: String, axis: String },

    #[error("Parameter '{param}': {num} interpolation axes were requested, but at most {} are supported", MAX_INTERPOLATION_AXES)]
    TooManyInterpolationAxes { param: String, num: usize },

    #[error("Parameter '{param}': the grid for axis '{axis}' must be strictly increasing and contain no NaNs")]
    InvalidGrid { param: String, axis: String },

    #[error("Parameter '{param}': index {index} is out of range for axis '{axis}' (length {len})")]
    IndexOutOfRange {
        param: String,
        axis: String,
        index: usize,
        len: usize,
    },

    #[error("Parameter '{param}' has {expected} axes, but a chunk with {got} dimensions was supplied")]
    DimensionMismatch {
        param: String,
        expected: usize,
        got: usize,
    },

    #[error("Parameter '{param}': a chunk's values have shape {values:?}, but its mask has shape {mask:?}")]
    MaskShapeMismatch {
        param: String,
        values: Vec<usize>,
        mask: Vec<usize>,
    },

    #[error("Parameter '{param}': {num_coords} coordinates were supplied for axis '{axis}', but the chunk has length {len} along it")]
    GridLengthMismatch {
        param: String,
        axis: String,
        num_coords: usize,
        len: usize,
    },

    #[error("Parameter '{param}': cannot {operation} while in the {state} state")]
    WrongState {
        param: String,
        operation: &'static str,
        state: ParameterState,
    },
}
