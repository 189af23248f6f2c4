// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Things shared by the `paramdb` subcommands: help texts, printers, and
//! reading a database from a description file.

mod printers;
#[cfg(test)]
mod tests;

pub(super) use printers::{display_warnings, InfoPrinter, Warn};

use std::path::Path;

use log::info;

use super::ParamDbError;
use crate::{
    database::ParameterDatabase,
    description::{read_description_file, Database, DESCRIPTION_FILE_TYPES_COMMA_SEPARATED},
    ParamValue,
};

lazy_static::lazy_static! {
    pub(super) static ref DESCRIPTION_HELP: String =
        format!("The database description file. Supported formats: {}", *DESCRIPTION_FILE_TYPES_COMMA_SEPARATED);
}

/// Read and load the database in a description file. Parameters that never
/// received any solutions are reported as warnings.
pub(super) fn read_database(file: &Path) -> Result<Database, ParamDbError> {
    info!("Reading database description {}", file.display());
    let db = read_description_file(file)?;
    match &db {
        Database::Float(db) => warn_unpopulated(db),
        Database::Complex(db) => warn_unpopulated(db),
    }
    Ok(db)
}

fn warn_unpopulated<T: ParamValue>(db: &ParameterDatabase<T>) {
    let populated: Vec<&str> = db.populated_names().collect();
    let unpopulated: Vec<&str> = db.names().filter(|n| !populated.contains(n)).collect();
    if !unpopulated.is_empty() {
        format!(
            "No solutions for parameter(s) {}; they can't be queried",
            unpopulated.join(", ")
        )
        .warn();
    }
}
