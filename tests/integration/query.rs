// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests for query.

use std::fs::read_to_string;

use approx::assert_abs_diff_eq;
use serde_json::Value;
use tempfile::TempDir;

use crate::{get_cmd_output, paramdb, write_gains};

fn run_query(args: &[&str]) -> Value {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = write_gains(tmp_dir.path());
    let output = tmp_dir.path().join("result.json");

    let mut all_args = vec![
        "query",
        file.to_str().unwrap(),
        "-p",
        "G",
        "-o",
        output.to_str().unwrap(),
    ];
    all_args.extend_from_slice(args);
    let cmd = paramdb().args(&all_args).ok();
    assert!(cmd.is_ok(), "query failed: {:?}", get_cmd_output(cmd));

    serde_json::from_str(&read_to_string(&output).unwrap()).unwrap()
}

fn complex_values(json: &Value) -> Vec<(f64, f64)> {
    json["values"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| (v[0].as_f64().unwrap(), v[1].as_f64().unwrap()))
        .collect()
}

#[test]
fn test_query_lookup() {
    let json = run_query(&["-s", "ant=1", "-s", "time=10"]);
    assert_eq!(json["mode"], "lookup");
    assert_eq!(json["shape"], serde_json::json!([2]));
    assert_eq!(complex_values(&json), vec![(2.0, 1.0), (2.0, 2.0)]);
    assert_eq!(json["mask"], serde_json::json!([false, false]));
}

#[test]
fn test_query_interpolate() {
    let json = run_query(&["-s", "ant=0", "-s", "time=5", "-s", "freq=150e6"]);
    assert_eq!(json["mode"], "interpolate");
    assert_eq!(json["shape"], serde_json::json!([]));
    let values = complex_values(&json);
    assert_abs_diff_eq!(values[0].0, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(values[0].1, 1.5, epsilon = 1e-9);
}

#[test]
fn test_query_flagged_antenna() {
    let json = run_query(&["-s", "ant=2", "-s", "freq=100e6,150e6"]);
    assert_eq!(json["shape"], serde_json::json!([2, 2]));
    assert_eq!(json["mask"], serde_json::json!([true, true, true, true]));
}

#[test]
fn test_query_forced_lookup() {
    let json = run_query(&["-s", "ant=0", "-s", "time=0", "-s", "freq=150e6", "-m", "lookup"]);
    assert_eq!(json["mode"], "lookup");
    assert_eq!(json["mask"], serde_json::json!([true]));
}

#[test]
fn test_query_errors() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = write_gains(tmp_dir.path());
    let file = file.to_str().unwrap();

    // Discrete axes are selected by index.
    let cmd = paramdb()
        .args(["query", file, "-p", "G", "-s", "ant=0.5"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("as an index on axis 'ant'"), "{stderr}");

    let cmd = paramdb()
        .args(["query", file, "-p", "G", "-s", "ant=7"])
        .ok();
    assert!(cmd.is_err());

    let cmd = paramdb()
        .args(["query", file, "-p", "G", "-m", "sideways"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("auto, lookup, interpolate"), "{stderr}");

    // dE was defined but never populated.
    let cmd = paramdb().args(["query", file, "-p", "dE"]).ok();
    assert!(cmd.is_err());
}

#[test]
fn test_query_to_stdout() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = write_gains(tmp_dir.path());
    let cmd = paramdb()
        .args([
            "query",
            file.to_str().unwrap(),
            "-p",
            "G",
            "-s",
            "ant=1",
            "-s",
            "time=10",
        ])
        .ok();
    let ok = cmd.is_ok();
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(ok, "query failed: {stdout}\n{stderr}");

    // Only the result goes to stdout; the log goes to stderr.
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["mode"], "lookup");
    assert_eq!(complex_values(&json), vec![(2.0, 1.0), (2.0, 2.0)]);
    assert!(stderr.contains("paramdb query"), "{stderr}");
}
