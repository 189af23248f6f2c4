// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Query a parameter of a database, either by looking values up on its grids
//! or by reinterpolating them onto new coordinates. The result is written as
//! json.


use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    str::FromStr,
};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use super::{
    common::{display_warnings, read_database, InfoPrinter, DESCRIPTION_HELP},
    ParamDbError,
};
use crate::{
    database::ParameterDatabase,
    description::Database,
    parameter::{Axis, AxisSelection, Parameter, Query},
    ParamValue,
};

lazy_static::lazy_static! {
    static ref QUERY_MODES_COMMA_SEPARATED: String = QueryMode::iter().join(", ");

    static ref QUERY_MODE_HELP: String =
        format!("How values are found. \"lookup\" only uses values on the parameter's grids; \"interpolate\" reinterpolates onto any coordinates; \"auto\" looks up if every requested coordinate is on the grids. Valid modes: {}. Default: {}",
                *QUERY_MODES_COMMA_SEPARATED, QueryMode::Auto);
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
pub(super) enum QueryMode {
    #[strum(serialize = "auto")]
    Auto,

    #[strum(serialize = "lookup")]
    Lookup,

    #[strum(serialize = "interpolate")]
    Interpolate,
}

#[derive(Error, Debug)]
pub enum QueryArgsError {
    #[error("Couldn't parse selection '{0}'; expected AXIS=VALUE[,VALUE...]")]
    BadSelection(String),

    #[error("Couldn't parse '{value}' as a coordinate on axis '{axis}'")]
    BadCoord { axis: String, value: String },

    #[error("Couldn't parse '{value}' as an index on axis '{axis}'; discrete axes are selected by index")]
    BadIndex { axis: String, value: String },

    #[error("Parameter '{param}' has no axis '{axis}'; its axes are: {axes}")]
    UnknownAxis {
        param: String,
        axis: String,
        axes: String,
    },

    #[error("Axis '{0}' was selected more than once")]
    DuplicateAxis(String),

    #[error("Unrecognised query mode '{got}'; valid modes are: {valid}")]
    BadMode { got: String, valid: String },
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    #[clap(name = "DESCRIPTION_FILE", parse(from_os_str), help = DESCRIPTION_HELP.as_str())]
    file: PathBuf,

    /// The name of the parameter to query.
    #[clap(short, long)]
    param: String,

    /// A selection on one axis, e.g. "freq=1.4e8,1.5e8" or "ant=3".
    /// Interpolatable axes are selected by coordinates, discrete axes by
    /// indices. A single value removes the axis from the output. Axes that
    /// aren't selected are output whole. May be given multiple times.
    #[clap(short, long)]
    select: Vec<String>,

    #[clap(short, long, help = QUERY_MODE_HELP.as_str())]
    mode: Option<String>,

    /// Write the result to this json file rather than to stdout.
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

/// The result of a query, as written out.
#[derive(Debug, Serialize)]
pub(super) struct QueryOutput<T> {
    param: String,
    mode: QueryModeName,
    shape: Vec<usize>,

    /// Row-major values. Complex values are `[real, imag]` pairs. Masked
    /// values hold the parameter's fill value.
    values: Vec<T>,

    /// Row-major; `true` marks an invalid value.
    mask: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(super) enum QueryModeName {
    Lookup,
    Interpolate,
}

impl QueryArgs {
    /// Is the result written to stdout?
    pub(super) fn writes_to_stdout(&self) -> bool {
        self.output.is_none()
    }

    pub fn run(self) -> Result<(), ParamDbError> {
        let mode = match self.mode.as_deref() {
            None => QueryMode::Auto,
            Some(m) => QueryMode::from_str(&m.to_lowercase()).map_err(|_| {
                QueryArgsError::BadMode {
                    got: m.to_string(),
                    valid: QUERY_MODES_COMMA_SEPARATED.clone(),
                }
            })?,
        };
        let selections = self
            .select
            .iter()
            .map(|s| parse_selection(s))
            .collect::<Result<Vec<_>, _>>()?;

        let db = read_database(&self.file)?;
        display_warnings();
        let json = match db {
            Database::Float(mut db) => {
                let output = run_query(&mut db, &self.param, &selections, mode)?;
                serde_json::to_string_pretty(&output)?
            }
            Database::Complex(mut db) => {
                let output = run_query(&mut db, &self.param, &selections, mode)?;
                serde_json::to_string_pretty(&output)?
            }
        };

        match self.output {
            Some(path) => {
                let mut f = BufWriter::new(File::create(&path)?);
                f.write_all(json.as_bytes())?;
                f.flush()?;
                info!("Wrote query result to {}", path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

/// Split "AXIS=V1,V2,..." into the axis name and its values.
pub(super) fn parse_selection(s: &str) -> Result<(String, Vec<String>), QueryArgsError> {
    let (axis, values) = s
        .split_once('=')
        .ok_or_else(|| QueryArgsError::BadSelection(s.to_string()))?;
    let axis = axis.trim();
    let values: Vec<String> = values
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if axis.is_empty() || values.is_empty() {
        return Err(QueryArgsError::BadSelection(s.to_string()));
    }
    Ok((axis.to_string(), values))
}

/// Interpret the values of a selection according to the kind of its axis.
pub(super) fn make_selection(
    axis: &Axis,
    values: &[String],
) -> Result<AxisSelection, QueryArgsError> {
    if axis.is_interpolatable() {
        let coords = values
            .iter()
            .map(|v| {
                v.parse::<f64>().map_err(|_| QueryArgsError::BadCoord {
                    axis: axis.name.clone(),
                    value: v.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match coords.as_slice() {
            [x] => AxisSelection::Coord(*x),
            _ => AxisSelection::Coords(coords),
        })
    } else {
        let indices = values
            .iter()
            .map(|v| {
                v.parse::<usize>().map_err(|_| QueryArgsError::BadIndex {
                    axis: axis.name.clone(),
                    value: v.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match indices.as_slice() {
            [i] => AxisSelection::Index(*i),
            _ => AxisSelection::Indices(indices),
        })
    }
}

pub(super) fn make_query<T: ParamValue>(
    param: &Parameter<T>,
    selections: &[(String, Vec<String>)],
) -> Result<Query, QueryArgsError> {
    let mut query = Query::new();
    for (name, values) in selections {
        let axis = param
            .axes()
            .iter()
            .find(|a| &a.name == name)
            .ok_or_else(|| QueryArgsError::UnknownAxis {
                param: param.name().to_string(),
                axis: name.clone(),
                axes: param.axes().iter().map(|a| a.name.as_str()).join(", "),
            })?;
        if query.get(name).is_some() {
            return Err(QueryArgsError::DuplicateAxis(name.clone()));
        }
        query = query.select(name.as_str(), make_selection(axis, values)?);
    }
    Ok(query)
}

pub(super) fn run_query<T: ParamValue + Serialize>(
    db: &mut ParameterDatabase<T>,
    name: &str,
    selections: &[(String, Vec<String>)],
    mode: QueryMode,
) -> Result<QueryOutput<T>, ParamDbError> {
    let param = db.get_mut(name)?;
    let query = make_query(param, selections)?;
    debug!("Query: {query:?}");

    let mode = match mode {
        QueryMode::Auto if param.match_grids(&query)? => QueryModeName::Lookup,
        QueryMode::Auto => QueryModeName::Interpolate,
        QueryMode::Lookup => QueryModeName::Lookup,
        QueryMode::Interpolate => QueryModeName::Interpolate,
    };
    let result = match mode {
        QueryModeName::Lookup => param.lookup(&query)?,
        QueryModeName::Interpolate => param.reinterpolate(&query)?,
    };

    let mut printer = InfoPrinter::new(format!("Query of {name}").into());
    printer.push_line(format!("Mode: {mode:?}").into());
    printer.push_line(format!("Output shape: [{}]", result.shape().iter().join(", ")).into());
    printer.push_line(
        format!(
            "{} of {} values are masked",
            result.num_masked(),
            result.len()
        )
        .into(),
    );
    printer.display();

    Ok(QueryOutput {
        param: name.to_string(),
        mode,
        shape: result.shape().to_vec(),
        values: result.values.iter().copied().collect(),
        mask: result.mask.iter().copied().collect(),
    })
}
