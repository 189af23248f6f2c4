// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("Database description file {file:?} has an unsupported extension; supported formats: {supported}")]
    UnknownFileType { file: PathBuf, supported: String },

    #[error("Couldn't decode toml structure from {file:?}:\n{err}")]
    Toml { file: PathBuf, err: String },

    #[error("Couldn't decode json structure from {file:?}:\n{err}")]
    Json { file: PathBuf, err: String },

    #[error("Chunk {index} of parameter '{param}': expected {expected} values (from shape {shape:?}), but got {got}")]
    ValueCount {
        index: usize,
        param: String,
        shape: Vec<usize>,
        expected: usize,
        got: usize,
    },

    #[error("Chunk {index} of parameter '{param}': expected {expected} flags (from shape {shape:?}), but got {got}")]
    FlagCount {
        index: usize,
        param: String,
        shape: Vec<usize>,
        expected: usize,
        got: usize,
    },

    #[error("Couldn't shape chunk values: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
