// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code. More specific options for `paramdb`
//! subcommands are contained in modules.
//!
//! Only 3 things should be public in this module: `Paramdb`, `Paramdb::run`,
//! and `ParamDbError`.

mod common;
mod error;
mod query;
mod summarise;

pub use error::ParamDbError;

use clap::{AppSettings, Args, Parser, Subcommand};
use log::info;

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = "Inspect and query databases of calibration solutions (gains, bandpasses, direction-dependent terms)."
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_subcommands = true)]
#[clap(propagate_version = true)]
#[clap(infer_long_args = true)]
pub struct Paramdb {
    #[clap(flatten)]
    global_opts: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    #[clap(global = true)]
    verbosity: u8,
}

#[derive(Debug, Subcommand)]
#[clap(arg_required_else_help = true)]
enum Command {
    #[clap(alias = "summarize")]
    #[clap(about = "Print the parameters of a database: their axes, grids and valid slices.")]
    Summarise(summarise::SummariseArgs),

    #[clap(about = "Look up or reinterpolate the values of a parameter, writing them as json.")]
    Query(query::QueryArgs),
}

impl Paramdb {
    pub fn run(self) -> Result<(), ParamDbError> {
        let GlobalArgs { verbosity } = self.global_opts;
        // Keep stdout clean when it carries a query result.
        let log_target = match &self.command {
            Command::Query(args) if args.writes_to_stdout() => env_logger::Target::Stderr,
            _ => env_logger::Target::Stdout,
        };
        setup_logging(verbosity, log_target)
            .map_err(|e| ParamDbError::Generic(format!("Failed to initialise logging: {e}")))?;

        // Print the version of paramdb and its build-time information.
        let sub_command = match &self.command {
            Command::Summarise(_) => "summarise",
            Command::Query(_) => "query",
        };
        info!("paramdb {} {}", sub_command, env!("CARGO_PKG_VERSION"));
        display_build_info();

        match self.command {
            Command::Summarise(args) => args.run()?,
            Command::Query(args) => args.run()?,
        }

        info!("paramdb {} complete.", sub_command);
        Ok(())
    }
}

/// Activate a logger. All log messages are put onto `target`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty (e.g. a
/// terminal); piped output will be formatted sensibly. Source code lines are
/// displayed in log messages when verbosity >= 3.
fn setup_logging(verbosity: u8, target: env_logger::Target) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(target);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.try_init()
}

/// Write many info-level log lines of how this executable was compiled.
fn display_build_info() {
    let dirty = match GIT_DIRTY {
        Some(true) => " (dirty)",
        _ => "",
    };
    match GIT_COMMIT_HASH_SHORT {
        Some(hash) => {
            info!("Compiled on git commit hash: {hash}{dirty}");
        }
        None => info!("Compiled on git commit hash: <no git info>"),
    }
    if let Some(hr) = GIT_HEAD_REF {
        info!("            git head ref: {}", hr);
    }
    info!("            {}", BUILT_TIME_UTC);
    info!("         with compiler {}", RUSTC_VERSION);
    info!("");
}
