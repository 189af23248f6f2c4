// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Print the parameters of a database: their axes, grids and how many of
//! their slices have valid values.

use std::{borrow::Cow, path::PathBuf};

use clap::Parser;
use itertools::Itertools;

use super::{
    common::{display_warnings, read_database, InfoPrinter, Warn, DESCRIPTION_HELP},
    ParamDbError,
};
use crate::{
    database::ParameterDatabase,
    description::Database,
    parameter::{Parameter, ParameterState},
    ParamValue,
};

#[derive(Parser, Debug)]
pub struct SummariseArgs {
    #[clap(name = "DESCRIPTION_FILE", parse(from_os_str), help = DESCRIPTION_HELP.as_str())]
    file: PathBuf,

    /// Print every coordinate of every grid, rather than only the ends.
    #[clap(long)]
    all_coords: bool,
}

impl SummariseArgs {
    pub fn run(self) -> Result<(), ParamDbError> {
        let db = read_database(&self.file)?;
        display_warnings();
        match &db {
            Database::Float(db) => summarise(db, "float", self.all_coords)?,
            Database::Complex(db) => summarise(db, "complex", self.all_coords)?,
        }
        display_warnings();
        Ok(())
    }
}

fn summarise<T: ParamValue>(
    db: &ParameterDatabase<T>,
    dtype: &str,
    all_coords: bool,
) -> Result<(), ParamDbError> {
    let mut printer = InfoPrinter::new("Database".into());
    printer.push_line(format!("{} parameters of {dtype} values", db.names().count()).into());
    printer.push_line(format!("Populated: {}", db.populated_names().join(", ")).into());
    printer.display();

    for param in db.params() {
        summarise_param(param, all_coords)?;
    }
    Ok(())
}

fn grid_str(grid: &[f64], all_coords: bool) -> String {
    match grid {
        [] => "<empty>".to_string(),
        _ if all_coords || grid.len() <= 4 => format!("[{}]", grid.iter().join(", ")),
        [first, .., last] => format!("[{first}, ..., {last}]"),
        [only] => format!("[{only}]"),
    }
}

fn summarise_param<T: ParamValue>(
    param: &Parameter<T>,
    all_coords: bool,
) -> Result<(), ParamDbError> {
    let mut printer = InfoPrinter::new(format!("Parameter {}", param.name()).into());
    if let Some(metadata) = param.metadata() {
        printer.push_line(metadata.to_string().into());
    }
    printer.push_line(format!("State: {}", param.state()).into());
    if param.state() != ParameterState::Populated {
        printer.display();
        format!("Parameter {} has no solutions", param.name()).warn();
        return Ok(());
    }

    let shape = param.shape();
    let mut block: Vec<Cow<'static, str>> =
        vec![format!("Shape: {}", shape.iter().join("x")).into()];
    for axis in param.axes() {
        let grid = param.grid(&axis.name)?;
        let line = match param.normalisation(&axis.name)? {
            Some(norm) => format!(
                "{} ({}): {} points {} [norm min {}, scale {}]",
                axis.name,
                axis.kind,
                grid.len(),
                grid_str(grid, all_coords),
                norm.min,
                norm.scale
            ),
            None => format!(
                "{} ({}): {} points {}",
                axis.name,
                axis.kind,
                grid.len(),
                grid_str(grid, all_coords)
            ),
        };
        block.push(line.into());
    }
    printer.push_block(block);

    let (valid, total) = param.num_valid_slices()?;
    printer.push_line(format!("{valid} of {total} slices have valid values").into());
    if valid == 0 {
        format!("Every value of parameter {} is flagged", param.name()).warn();
    }
    printer.display();
    Ok(())
}
