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

use tandem_model::{index::StationIndex, model::Model};
use tandem_relax::RelaxError;

/// What is still available below a candidate node.
#[derive(Debug, Clone, Copy)]
pub struct BoundQuery<'a> {
    pub model: &'a Model,
    /// Stations placed neither in the parent nor by the candidate.
    pub vacant_stations: &'a [StationIndex],
    /// Number of points after the candidate's point.
    pub vacant_points: usize,
    /// Cost budget left after the candidate, never negative.
    pub remaining_cost: f64,
}

impl BoundQuery<'_> {
    /// Returns `true` if nothing more can be placed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vacant_stations.is_empty() || self.vacant_points == 0
    }
}

/// A strategy that bounds how much length the vacant stations can still cover.
///
/// The search turns the returned length `C` into a lower bound on the
/// noncoverage to the right of the candidate:
/// `max(g_right − place[p] − coverage[s] − C, 0)`. For the pruning to be
/// exact, `C` must never be smaller than `Σ 2·coverage` over any subset of
/// the vacant stations that fits the remaining budget and the vacant points.
///
/// An `Err` is not fatal: the caller falls back to `C = 0`.
pub trait BoundStrategy {
    /// Returns the name of the strategy.
    fn name(&self) -> &str;

    /// Returns an upper bound on the coverage diameter the vacant stations can add.
    fn covered_length(&mut self, query: &BoundQuery<'_>) -> Result<f64, RelaxError>;
}

impl std::fmt::Debug for dyn BoundStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundStrategy({})", self.name())
    }
}

impl std::fmt::Display for dyn BoundStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundStrategy({})", self.name())
    }
}
