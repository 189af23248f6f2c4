// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
A database of calibration-solution parameters (gains, bandpasses,
direction-dependent terms), with lookup of values on their grids and
reinterpolation onto arbitrary grids.
 */

pub mod cli;
pub mod constants;
pub mod database;
pub mod description;
pub mod interp;
pub mod masked;
pub mod parameter;

// Re-exports.
pub use cli::{ParamDbError, Paramdb};
pub use database::{DatabaseError, ParameterDatabase};
pub use masked::MaskedArray;
pub use parameter::{
    AxisSelection, Chunk, Parameter, ParameterDefinition, ParameterError, ParameterState,
    ParamValue, Query,
};

/// Complex values of parameters such as gains.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;
