// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests for summarise.

use std::io::Write;

use tempfile::TempDir;

use crate::{get_cmd_output, make_file_in_dir, paramdb, write_gains};

#[test]
fn test_summarise() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = write_gains(tmp_dir.path());

    let cmd = paramdb()
        .args(["summarise", file.to_str().unwrap()])
        .ok();
    assert!(cmd.is_ok(), "summarise failed on a good database");
    let (stdout, _) = get_cmd_output(cmd);

    assert!(stdout.contains("Parameter G"), "{stdout}");
    assert!(stdout.contains("direction-independent gains"), "{stdout}");
    assert!(stdout.contains("Shape: 2x2x3"), "{stdout}");
    assert!(stdout.contains("2 of 3 slices have valid values"), "{stdout}");
    // dE never got any solutions.
    assert!(stdout.contains("Parameter dE has no solutions"), "{stdout}");
}

#[test]
fn test_summarise_all_coords() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = write_gains(tmp_dir.path());

    let cmd = paramdb()
        .args(["summarise", "--all-coords", file.to_str().unwrap()])
        .ok();
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("time (interpolatable): 2 points [0, 10]"), "{stdout}");
    assert!(stdout.contains("ant (discrete): 3 points [0, 1, 2]"), "{stdout}");
}

#[test]
fn test_summarise_bad_extension() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let (file, mut f) = make_file_in_dir("gains.yaml", tmp_dir.path());
    f.write_all(b"dtype = \"float\"\n").unwrap();

    let cmd = paramdb()
        .args(["summarise", file.to_str().unwrap()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("toml, json"), "{stderr}");
}

#[test]
fn test_summarise_missing_file() {
    let cmd = paramdb()
        .args(["summarise", "/does/not/exist.toml"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
}
