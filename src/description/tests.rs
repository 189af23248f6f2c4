// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::NamedTempFile;

use super::*;
use crate::parameter::Query;

fn write_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("couldn't make tmp file");
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const GAINS_TOML: &str = indoc! {r#"
    dtype = "complex"

    [[parameters]]
    name = "G"
    axes = ["time", "freq", "ant"]
    interpolation_axes = ["freq"]
    grid = { ant = [0, 1, 2] }

    [[parameters]]
    name = "dE"
    axes = ["dir", "time"]
    interpolation_axes = ["time"]

    [[chunks]]
    param = "G"
    shape = [1, 2, 1]
    values = [[1.0, 0.0], [0.0, 1.0]]
    grid = { ant = [0], freq = [100e6, 200e6] }

    [[chunks]]
    param = "G"
    shape = [1, 2, 1]
    values = [[2.0, 0.0], [2.0, 0.0]]
    flags = [true, true]
    grid = { ant = [1], freq = [100e6, 200e6] }
"#};

#[test]
fn test_read_toml_complex() {
    let file = write_file(".toml", GAINS_TOML);
    let db = read_description_file(file.path()).unwrap();
    assert_eq!(db.value_type(), ValueType::Complex);
    let mut db = match db {
        Database::Complex(db) => db,
        Database::Float(_) => panic!("expected complex values"),
    };

    assert!(db.is_loaded());
    assert_eq!(db.populated_names().collect::<Vec<_>>(), vec!["G"]);

    let g = db.get_mut("G").unwrap();
    assert_eq!(g.shape(), vec![1, 2, 3]);
    assert!(g.is_slice_valid(&Query::new().index("ant", 0)).unwrap());
    assert!(!g.is_slice_valid(&Query::new().index("ant", 1)).unwrap());

    let result = g
        .reinterpolate(&Query::new().index("ant", 0).coord("freq", 150e6))
        .unwrap();
    let v = result.get(&[0]).unwrap();
    assert_abs_diff_eq!(v.re, 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(v.im, 0.5, epsilon = 1e-12);
}

#[test]
fn test_read_json_float() {
    let contents = indoc! {r#"
        {
            "dtype": "float",
            "empty": -1.0,
            "parameters": [
                { "name": "B", "axes": ["ant", "freq"], "interpolation_axes": ["freq"] }
            ],
            "chunks": [
                {
                    "param": "B",
                    "shape": [2, 2],
                    "values": [1.0, 2.0, 3.0, 4.0],
                    "flags": [false, false, false, true],
                    "grid": { "freq": [10, 20] }
                }
            ]
        }
    "#};
    let file = write_file(".json", contents);
    let db = match read_description_file(file.path()).unwrap() {
        Database::Float(db) => db,
        Database::Complex(_) => panic!("expected float values"),
    };
    let b = db.get("B").unwrap();
    assert_eq!(b.empty(), -1.0);
    let cube = b.get_cube().unwrap();
    assert_eq!(cube.values.iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, -1.0]);
    assert_eq!(cube.num_masked(), 1);
}

#[test]
fn test_unsupported_extension() {
    let file = write_file(".yaml", GAINS_TOML);
    let result = read_description_file(file.path());
    assert!(matches!(
        result,
        Err(DescriptionError::UnknownFileType { .. })
    ));
}

#[test]
fn test_bad_toml() {
    let file = write_file(".toml", "dtype = ");
    let result = read_description_file(file.path());
    assert!(matches!(result, Err(DescriptionError::Toml { .. })));

    let file = write_file(".toml", r#"dtype = "quaternion""#);
    let result = read_description_file(file.path());
    assert!(matches!(result, Err(DescriptionError::Toml { .. })));
}

#[test]
fn test_value_counts() {
    let contents = indoc! {r#"
        dtype = "float"

        [[parameters]]
        name = "B"
        axes = ["freq"]
        interpolation_axes = ["freq"]

        [[chunks]]
        param = "B"
        shape = [3]
        values = [1.0, 2.0]
    "#};
    let file = write_file(".toml", contents);
    let result = read_description_file(file.path());
    assert!(matches!(
        result,
        Err(DescriptionError::ValueCount {
            expected: 3,
            got: 2,
            ..
        })
    ));

    let contents = indoc! {r#"
        dtype = "float"

        [[parameters]]
        name = "B"
        axes = ["freq"]

        [[chunks]]
        param = "B"
        shape = [2]
        values = [1.0, 2.0]
        flags = [true]
    "#};
    let file = write_file(".toml", contents);
    let result = read_description_file(file.path());
    assert!(matches!(
        result,
        Err(DescriptionError::FlagCount {
            expected: 2,
            got: 1,
            ..
        })
    ));
}

#[test]
fn test_bad_chunk_is_a_database_error() {
    let contents = indoc! {r#"
        dtype = "float"

        [[parameters]]
        name = "B"
        axes = ["freq"]

        [[chunks]]
        param = "C"
        shape = [1]
        values = [1.0]
    "#};
    let file = write_file(".toml", contents);
    let result = read_description_file(file.path());
    assert!(matches!(
        result,
        Err(DescriptionError::Database(
            crate::database::DatabaseError::UnknownParameter(_)
        ))
    ));
}
