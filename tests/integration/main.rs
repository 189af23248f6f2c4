// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod query;
mod summarise;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::str::from_utf8;

use assert_cmd::{output::OutputError, Command};
use indoc::indoc;

fn paramdb() -> Command {
    Command::cargo_bin("paramdb").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

fn make_file_in_dir<T: AsRef<Path>, U: AsRef<Path>>(filename: T, dir: U) -> (PathBuf, File) {
    let path = dir.as_ref().join(filename);
    let f = File::create(&path).expect("couldn't make file");
    (path, f)
}

/// A database with a complex gain over time, frequency and antenna, a real
/// bandpass over antenna and frequency, and a parameter that never gets any
/// solutions.
///
/// The gain of antenna `a` is `(a + 1) + (f / 1e8) i` at every time; antenna
/// 2 is fully flagged.
const GAINS_TOML: &str = indoc! {r#"
    dtype = "complex"

    [[parameters]]
    name = "G"
    axes = ["time", "freq", "ant"]
    interpolation_axes = ["time", "freq"]
    metadata = "direction-independent gains"

    [[parameters]]
    name = "dE"
    axes = ["dir", "time"]
    interpolation_axes = ["time"]

    [[chunks]]
    param = "G"
    shape = [2, 2, 3]
    values = [
        [1.0, 1.0], [2.0, 1.0], [3.0, 1.0],
        [1.0, 2.0], [2.0, 2.0], [3.0, 2.0],
        [1.0, 1.0], [2.0, 1.0], [3.0, 1.0],
        [1.0, 2.0], [2.0, 2.0], [3.0, 2.0],
    ]
    flags = [
        false, false, true,
        false, false, true,
        false, false, true,
        false, false, true,
    ]
    grid = { time = [0, 10], freq = [100e6, 200e6] }
"#};

fn write_gains(dir: &Path) -> PathBuf {
    let (path, mut f) = make_file_in_dir("gains.toml", dir);
    f.write_all(GAINS_TOML.as_bytes()).unwrap();
    path
}
