// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Grid coordinates are normalised to
\[0, 1\] before any interpolation happens, so the tolerances below are in
normalised units.
 */

/// The maximum number of axes of a parameter that can be interpolated over.
pub const MAX_INTERPOLATION_AXES: usize = 2;

/// When only a single valid sample is available to a 1D interpolator, the
/// sample is duplicated this far either side of its (normalised) coordinate.
pub const SINGLE_POINT_HALF_WIDTH: f64 = 1e-6;

/// The magnitude of the perturbation applied to degenerate 2D point sets
/// (fewer than 4 points, or all points on a line parallel to an axis) so
/// that a triangulation exists.
pub const JOGGLE_SCALE: f64 = 1e-9;

/// Triangulations need at least this many points before they are trusted
/// without joggling.
pub const MIN_TRIANGULATION_POINTS: usize = 4;

/// Barycentric weights down to this (negative) value still count as "inside"
/// a triangle. This allows points on shared edges and hull edges to be found.
pub const BARYCENTRIC_TOLERANCE: f64 = 1e-10;
