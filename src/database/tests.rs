// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use ndarray::prelude::*;

use super::*;
use crate::{
    parameter::{ParameterError, Query},
    MaskedArray,
};

fn def(name: &str, axes: &[&str], interp: &[&str]) -> ParameterDefinition {
    ParameterDefinition {
        name: name.to_string(),
        axes: axes.iter().map(|s| s.to_string()).collect(),
        interpolation_axes: interp.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn test_database_lifecycle() {
    let mut db = ParameterDatabase::new();
    db.define_param(&def("G", &["time", "ant"], &["time"]), 0.0)
        .unwrap();
    db.define_param(&def("B", &["freq"], &["freq"]), 0.0)
        .unwrap();
    assert_eq!(
        db.define_param(&def("G", &["time"], &[]), 0.0),
        Err(DatabaseError::DuplicateParameter("G".to_string()))
    );

    db.add_chunk(
        "G",
        Chunk::new(array![[1.0, 10.0], [2.0, 20.0]].into_dyn()).with_grid("time", vec![0.0, 10.0]),
    )
    .unwrap();
    db.add_chunk(
        "G",
        Chunk::new(array![[3.0, 30.0]].into_dyn()).with_grid("time", vec![20.0]),
    )
    .unwrap();
    assert_eq!(
        db.add_chunk("X", Chunk::new(array![1.0].into_dyn())),
        Err(DatabaseError::UnknownParameter("X".to_string()))
    );
    assert!(matches!(
        db.add_chunk("G", Chunk::new(array![[1.0, 2.0, 3.0]].into_dyn())),
        Err(DatabaseError::Parameter(ParameterError::ShapeMismatch { .. }))
    ));

    let skipped = db.load().unwrap();
    assert_eq!(skipped, vec!["B".to_string()]);
    assert!(db.is_loaded());
    assert_eq!(db.names().collect::<Vec<_>>(), vec!["G", "B"]);
    assert_eq!(db.populated_names().collect::<Vec<_>>(), vec!["G"]);
    assert_eq!(db.load(), Err(DatabaseError::AlreadyLoaded));

    let g = db.get_mut("G").unwrap();
    assert_eq!(g.grid("time").unwrap(), &[0.0, 10.0, 20.0]);
    let result = g
        .reinterpolate(&Query::new().index("ant", 1).coords("time", vec![15.0]))
        .unwrap();
    assert_abs_diff_eq!(result.values[[0]], 25.0, epsilon = 1e-12);
    assert_eq!(g.num_cached_interpolators(), 1);

    db.release_caches();
    assert_eq!(db.get("G").unwrap().num_cached_interpolators(), 0);
    assert_eq!(
        db.get("B").unwrap().state(),
        crate::parameter::ParameterState::Prototype
    );
}

#[test]
fn test_failed_load_consumes_nothing() {
    let mut db = ParameterDatabase::new();
    db.define_param(&def("G", &["time"], &["time"]), 0.0)
        .unwrap();
    db.define_param(&def("B", &["freq"], &["freq"]), 0.0)
        .unwrap();
    db.add_chunk(
        "G",
        Chunk::new(array![1.0, 2.0].into_dyn()).with_grid("time", vec![0.0, 10.0]),
    )
    .unwrap();
    // The mask doesn't match the values; only pasting notices.
    let bad = Chunk {
        array: MaskedArray {
            values: array![1.0, 2.0, 3.0].into_dyn(),
            mask: array![false].into_dyn(),
        },
        grid: IndexMap::new(),
    };
    db.add_chunk("B", bad).unwrap();

    let expected = Err(DatabaseError::Parameter(ParameterError::MaskShapeMismatch {
        param: "B".to_string(),
        values: vec![3],
        mask: vec![1],
    }));
    assert_eq!(db.load(), expected);
    assert!(!db.is_loaded());
    assert_eq!(db.get("G").unwrap().state(), ParameterState::Skeleton);
    assert_eq!(db.get("B").unwrap().state(), ParameterState::Skeleton);
    assert_eq!(db.populated_names().count(), 0);

    // Trying again gives the same error, not a lifecycle error.
    assert_eq!(db.load(), expected);
}
