// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::parameter::ParameterError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatabaseError {
    #[error("Parameter '{0}' is already defined")]
    DuplicateParameter(String),

    #[error("No parameter named '{0}' is defined")]
    UnknownParameter(String),

    #[error("The database has already been loaded; no more parameters or chunks can be added")]
    AlreadyLoaded,

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}
