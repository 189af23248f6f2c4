// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Database description files.
//!
//! A description file (toml or json) defines parameters and the chunks of
//! solutions that populate them, e.g.
//!
//! ```toml
//! dtype = "complex"
//!
//! [[parameters]]
//! name = "G"
//! axes = ["time", "freq", "ant"]
//! interpolation_axes = ["freq"]
//! grid = { ant = [0, 1, 2] }
//!
//! [[chunks]]
//! param = "G"
//! shape = [1, 2, 1]
//! values = [[1.0, 0.0], [0.5, 0.5]]
//! flags = [false, true]
//! grid = { ant = [0], freq = [100e6, 200e6] }
//! ```
//!
//! Values are flattened in row-major order. Complex values are
//! `[real, imag]` pairs.

mod error;
#[cfg(test)]
mod tests;

pub use error::DescriptionError;

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use ndarray::{ArrayD, IxDyn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    c64,
    database::ParameterDatabase,
    parameter::{Chunk, ParameterDefinition},
    ParamValue,
};

lazy_static::lazy_static! {
    pub static ref DESCRIPTION_FILE_TYPES_COMMA_SEPARATED: String =
        DescriptionFileType::iter().join(", ");
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
pub enum DescriptionFileType {
    #[strum(serialize = "toml")]
    Toml,

    #[strum(serialize = "json")]
    Json,
}

/// The type of every value in a database.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[strum(serialize = "float")]
    Float,

    #[strum(serialize = "complex")]
    Complex,
}

/// Parameter values that can be written in a description file.
pub trait DescribedValue: ParamValue {
    /// How a value is written.
    type Repr: DeserializeOwned;

    fn from_repr(repr: Self::Repr) -> Self;
}

impl DescribedValue for f64 {
    type Repr = f64;

    fn from_repr(repr: f64) -> f64 {
        repr
    }
}

impl DescribedValue for c64 {
    type Repr = [f64; 2];

    fn from_repr([re, im]: [f64; 2]) -> c64 {
        c64::new(re, im)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
pub struct DatabaseDescription<V> {
    pub dtype: ValueType,

    /// The fill value. Zero if not given.
    #[serde(default)]
    pub empty: Option<V>,

    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,

    #[serde(default)]
    pub chunks: Vec<ChunkDescription<V>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
pub struct ChunkDescription<V> {
    /// The name of the parameter this chunk belongs to.
    pub param: String,

    pub shape: Vec<usize>,

    /// Row-major values.
    pub values: Vec<V>,

    /// Row-major flags; `true` marks an invalid value. If not given, all
    /// values are valid.
    #[serde(default)]
    pub flags: Option<Vec<bool>>,

    #[serde(default)]
    pub grid: IndexMap<String, Vec<f64>>,
}

/// Only used to find out the value type before the rest is decoded.
#[derive(Deserialize)]
struct Header {
    dtype: ValueType,
}

/// A loaded database of either value type.
#[derive(Debug)]
pub enum Database {
    Float(ParameterDatabase<f64>),
    Complex(ParameterDatabase<c64>),
}

impl Database {
    pub fn value_type(&self) -> ValueType {
        match self {
            Database::Float(_) => ValueType::Float,
            Database::Complex(_) => ValueType::Complex,
        }
    }
}

impl<V> DatabaseDescription<V> {
    /// Define every parameter, add every chunk and load the database.
    pub fn build<T: DescribedValue<Repr = V>>(
        self,
    ) -> Result<ParameterDatabase<T>, DescriptionError> {
        let empty = self.empty.map(T::from_repr).unwrap_or_else(T::zero);
        let mut db = ParameterDatabase::new();
        for def in &self.parameters {
            db.define_param(def, empty)?;
        }

        for (index, chunk) in self.chunks.into_iter().enumerate() {
            let expected = chunk.shape.iter().product::<usize>();
            if chunk.values.len() != expected {
                return Err(DescriptionError::ValueCount {
                    index,
                    param: chunk.param,
                    shape: chunk.shape,
                    expected,
                    got: chunk.values.len(),
                });
            }
            let flags = match chunk.flags {
                Some(flags) if flags.len() != expected => {
                    return Err(DescriptionError::FlagCount {
                        index,
                        param: chunk.param,
                        shape: chunk.shape,
                        expected,
                        got: flags.len(),
                    })
                }
                Some(flags) => flags,
                None => vec![false; expected],
            };

            let values: Vec<T> = chunk.values.into_iter().map(T::from_repr).collect();
            let values = ArrayD::from_shape_vec(IxDyn(&chunk.shape), values)?;
            let mask = ArrayD::from_shape_vec(IxDyn(&chunk.shape), flags)?;
            let mut c = Chunk::masked(values, mask)?;
            c.grid = chunk.grid;
            db.add_chunk(&chunk.param, c)?;
        }

        db.load()?;
        Ok(db)
    }
}

/// Read a description file, and build and load the database it describes.
pub fn read_description_file<P: AsRef<Path>>(file: P) -> Result<Database, DescriptionError> {
    let file = file.as_ref();
    debug!("Attempting to parse database description file {}", file.display());

    let file_type = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .and_then(|e| DescriptionFileType::from_str(&e).ok())
        .ok_or_else(|| DescriptionError::UnknownFileType {
            file: file.to_path_buf(),
            supported: DESCRIPTION_FILE_TYPES_COMMA_SEPARATED.clone(),
        })?;
    let mut contents = String::new();
    let mut fh = File::open(file)?;
    fh.read_to_string(&mut contents)?;

    let header: Header = decode(file, file_type, &contents)?;
    debug!("Database values are {}", header.dtype);
    let db = match header.dtype {
        ValueType::Float => {
            let desc: DatabaseDescription<f64> = decode(file, file_type, &contents)?;
            Database::Float(desc.build()?)
        }
        ValueType::Complex => {
            let desc: DatabaseDescription<[f64; 2]> = decode(file, file_type, &contents)?;
            Database::Complex(desc.build()?)
        }
    };
    Ok(db)
}

/// Decode a description from a string.
pub fn decode<D: DeserializeOwned>(
    file: &Path,
    file_type: DescriptionFileType,
    contents: &str,
) -> Result<D, DescriptionError> {
    let file: PathBuf = file.to_path_buf();
    match file_type {
        DescriptionFileType::Toml => {
            debug!("Parsing toml file...");
            toml::from_str(contents).map_err(|err| DescriptionError::Toml {
                file,
                err: err.to_string(),
            })
        }
        DescriptionFileType::Json => {
            debug!("Parsing json file...");
            serde_json::from_str(contents).map_err(|err| DescriptionError::Json {
                file,
                err: err.to_string(),
            })
        }
    }
}
