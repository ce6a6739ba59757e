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

use crate::bound::strategy::{BoundQuery, BoundStrategy};
use smallvec::SmallVec;
use tandem_relax::RelaxError;

/// Sums the largest coverage diameters without a solver.
///
/// Takes every affordable vacant station on its own, keeps the
/// `vacant_points` largest diameters and adds them up. Ignoring the shared
/// budget makes this weaker than the relaxations but it cannot fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageSumBound;

impl CoverageSumBound {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl BoundStrategy for CoverageSumBound {
    fn name(&self) -> &str {
        "CoverageSumBound"
    }

    fn covered_length(&mut self, query: &BoundQuery<'_>) -> Result<f64, RelaxError> {
        let model = query.model;
        let mut diameters: SmallVec<[f64; 16]> = query
            .vacant_stations
            .iter()
            .filter(|&&s| model.station_cost(s) <= query.remaining_cost)
            .map(|&s| 2.0 * model.coverage(s))
            .collect();
        diameters.sort_unstable_by(|a, b| b.total_cmp(a));
        Ok(diameters.iter().take(query.vacant_points).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_model::{index::StationIndex, model::ModelBuilder};

    #[test]
    fn test_takes_largest_affordable() {
        let mut builder = ModelBuilder::new(3, 3);
        let costs = [1.0, 5.0, 1.0];
        let radii = [1.0, 10.0, 3.0];
        for s in 0..3 {
            builder
                .set_station_coverage(StationIndex::new(s), radii[s])
                .set_station_cost(StationIndex::new(s), costs[s]);
        }
        let model = builder.build().expect("model should be valid");
        let stations = [StationIndex::new(0), StationIndex::new(1), StationIndex::new(2)];

        let query = BoundQuery {
            model: &model,
            vacant_stations: &stations,
            vacant_points: 1,
            remaining_cost: 2.0,
        };
        // Station 1 is too expensive; the best single diameter left is 6.
        assert_eq!(CoverageSumBound::new().covered_length(&query), Ok(6.0));

        let query = BoundQuery {
            vacant_points: 3,
            remaining_cost: 10.0,
            ..query
        };
        assert_eq!(CoverageSumBound::new().covered_length(&query), Ok(28.0));
    }
}
