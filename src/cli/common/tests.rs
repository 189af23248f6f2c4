// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against command-line interfaces that aren't big enough to go in their
//! own modules.

use std::borrow::Cow;

use super::printers::tree_lines;

#[test]
fn test_tree_lines() {
    let blocks: Vec<Vec<Cow<'static, str>>> = vec![
        vec!["a".into()],
        vec!["b".into(), "c".into()],
        vec!["d".into()],
    ];
    assert_eq!(tree_lines(&blocks), vec!["├ a", "├ b", "│ c", "└ d"]);
}

#[test]
fn test_tree_lines_single_block() {
    let blocks: Vec<Vec<Cow<'static, str>>> = vec![vec!["a".into(), "b".into()]];
    assert_eq!(tree_lines(&blocks), vec!["├ a", "│ b"]);
}
