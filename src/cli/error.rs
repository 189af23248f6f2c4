// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all paramdb command-line errors. This should be the *only*
//! error enum that the binary sees.

use thiserror::Error;

use super::query::QueryArgsError;
use crate::{database::DatabaseError, description::DescriptionError, parameter::ParameterError};

/// The *only* error the binary sees. Each error message should include a
/// hint, unless it's "generic".
#[derive(Error, Debug)]
pub enum ParamDbError {
    /// An error related to a description file.
    #[error("{0}\n\nDescription files are toml or json documents of parameter definitions and chunks of solutions.")]
    Description(String),

    /// An error related to defining or loading parameters.
    #[error("{0}\n\nCheck that the chunks of each parameter agree with its axes and grids.")]
    Database(String),

    /// An error related to querying a parameter.
    #[error("{0}\n\nInterpolatable axes are selected by coordinates and discrete axes by indices; `paramdb summarise` lists the axes of each parameter.")]
    Query(String),

    /// A generic error that can't be clarified further with documentation, e.g.
    /// IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<DescriptionError> for ParamDbError {
    fn from(e: DescriptionError) -> Self {
        let s = e.to_string();
        match e {
            DescriptionError::UnknownFileType { .. }
            | DescriptionError::Toml { .. }
            | DescriptionError::Json { .. }
            | DescriptionError::ValueCount { .. }
            | DescriptionError::FlagCount { .. }
            | DescriptionError::Shape(_) => Self::Description(s),
            DescriptionError::Database(e) => Self::from(e),
            DescriptionError::IO(e) => Self::from(e),
        }
    }
}

impl From<DatabaseError> for ParamDbError {
    fn from(e: DatabaseError) -> Self {
        let s = e.to_string();
        match e {
            DatabaseError::DuplicateParameter(_)
            | DatabaseError::UnknownParameter(_)
            | DatabaseError::AlreadyLoaded => Self::Database(s),
            DatabaseError::Parameter(e) => Self::from(e),
        }
    }
}

impl From<ParameterError> for ParamDbError {
    fn from(e: ParameterError) -> Self {
        let s = e.to_string();
        match e {
            ParameterError::AxisNotSpecified { .. }
            | ParameterError::InvalidAxisValue { .. }
            | ParameterError::IndexOutOfRange { .. } => Self::Query(s),
            _ => Self::Database(s),
        }
    }
}

impl From<QueryArgsError> for ParamDbError {
    fn from(e: QueryArgsError) -> Self {
        Self::Query(e.to_string())
    }
}

impl From<std::io::Error> for ParamDbError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<serde_json::Error> for ParamDbError {
    fn from(e: serde_json::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
