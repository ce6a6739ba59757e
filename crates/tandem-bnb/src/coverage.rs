// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Noncoverage arithmetic.
//!
//! The segment between the gateways is covered by discs of radius
//! `coverage[s]` around each placed station; a gateway is a point. Uncovered
//! length is the sum of the gaps between consecutive covered objects.

use crate::tree::AssignmentMatrix;
use tandem_model::{
    index::{PlacementIndex, StationIndex},
    model::Model,
    solution::PlacementPattern,
};

/// The uncovered length between an object at `x1` with radius `c1` and an
/// object at `x2 ≥ x1` with radius `c2`.
#[inline]
pub fn coverage_gap(x1: f64, c1: f64, x2: f64, c2: f64) -> f64 {
    (x2 - x1 - (c1 + c2)).max(0.0)
}

/// Coordinate and radius of the rightmost covered object of `matrix`: the
/// last placed station, or the left gateway if nothing is placed.
#[inline]
pub fn left_anchor(model: &Model, matrix: &AssignmentMatrix) -> (f64, f64) {
    match matrix.last_placed() {
        Some((p, s)) => (model.placement(p), model.coverage(s)),
        None => (model.gateway_left(), 0.0),
    }
}

/// Left noncoverage after placing `station` at `placement` on top of `parent`.
#[inline]
pub fn left_noncoverage(
    model: &Model,
    parent: &AssignmentMatrix,
    parent_left: f64,
    placement: PlacementIndex,
    station: StationIndex,
) -> f64 {
    let (x, c) = left_anchor(model, parent);
    parent_left + coverage_gap(x, c, model.placement(placement), model.coverage(station))
}

/// The gap between `station` at `placement` and the right gateway.
#[inline]
pub fn right_noncoverage(model: &Model, placement: PlacementIndex, station: StationIndex) -> f64 {
    coverage_gap(
        model.placement(placement),
        model.coverage(station),
        model.gateway_right(),
        0.0,
    )
}

/// Noncoverage of a complete pattern, evaluated from scratch over the chain
/// `g_left, placed stations, g_right`.
pub fn pattern_noncoverage(model: &Model, pattern: &PlacementPattern) -> f64 {
    let mut total = 0.0;
    let (mut x, mut c) = (model.gateway_left(), 0.0);
    for (p, s) in pattern.placed() {
        let (nx, nc) = (model.placement(p), model.coverage(s));
        total += coverage_gap(x, c, nx, nc);
        (x, c) = (nx, nc);
    }
    total + coverage_gap(x, c, model.gateway_right(), 0.0)
}
