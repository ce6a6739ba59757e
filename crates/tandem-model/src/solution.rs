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

use crate::index::{PlacementIndex, StationIndex};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Label used for a placement point without a station.
pub const EMPTY_LABEL: &str = "-";

/// Errors produced when parsing a placement pattern label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternLabelError {
    #[error("invalid placement label '{0}': expected \"-\" or \"S<k>\" with k >= 1")]
    InvalidLabel(String),
    #[error("station {0} appears more than once in the pattern")]
    DuplicateStation(usize),
}

/// Which station (if any) occupies each placement point.
///
/// Data is indexed by `PlacementIndex`. Serialized as a list of labels,
/// `"-"` for an empty point and `"S<k>"` for station `k - 1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct PlacementPattern {
    stations: Vec<Option<StationIndex>>,
}

impl PlacementPattern {
    /// Creates a pattern with every point empty.
    pub fn empty(num_placements: usize) -> Self {
        Self {
            stations: vec![None; num_placements],
        }
    }

    /// Creates a pattern from `(point, station)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if a point index is out of bounds.
    pub fn from_assignments<I>(num_placements: usize, assignments: I) -> Self
    where
        I: IntoIterator<Item = (PlacementIndex, StationIndex)>,
    {
        let mut pattern = Self::empty(num_placements);
        for (placement, station) in assignments {
            pattern.assign(placement, station);
        }
        pattern
    }

    /// Places `station` at `placement`, replacing any previous occupant.
    #[inline]
    pub fn assign(&mut self, placement: PlacementIndex, station: StationIndex) {
        let index = placement.get();
        debug_assert!(
            index < self.num_placements(),
            "called `PlacementPattern::assign` with placement index out of bounds: the len is {} but the index is {}",
            self.num_placements(),
            index
        );
        self.stations[index] = Some(station);
    }

    #[inline]
    pub fn num_placements(&self) -> usize {
        self.stations.len()
    }

    /// Returns the station placed at `placement`, if any.
    #[inline]
    pub fn station_at(&self, placement: PlacementIndex) -> Option<StationIndex> {
        self.stations.get(placement.get()).copied().flatten()
    }

    /// Returns the number of occupied points.
    #[inline]
    pub fn placed_count(&self) -> usize {
        self.stations.iter().filter(|s| s.is_some()).count()
    }

    /// Iterates over occupied points in increasing point order.
    pub fn placed(&self) -> impl Iterator<Item = (PlacementIndex, StationIndex)> + '_ {
        self.stations
            .iter()
            .enumerate()
            .filter_map(|(p, s)| s.map(|s| (PlacementIndex::new(p), s)))
    }

    /// Returns the report labels for every point.
    pub fn labels(&self) -> Vec<String> {
        self.stations
            .iter()
            .map(|s| match s {
                Some(station) => format!("S{}", station.get() + 1),
                None => EMPTY_LABEL.to_string(),
            })
            .collect()
    }
}

fn parse_label(label: &str) -> Result<Option<StationIndex>, PatternLabelError> {
    if label == EMPTY_LABEL {
        return Ok(None);
    }
    label
        .strip_prefix('S')
        .and_then(|k| k.parse::<usize>().ok())
        .filter(|&k| k >= 1)
        .map(|k| Some(StationIndex::new(k - 1)))
        .ok_or_else(|| PatternLabelError::InvalidLabel(label.to_string()))
}

impl TryFrom<Vec<String>> for PlacementPattern {
    type Error = PatternLabelError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        let mut seen: SmallVec<[usize; 16]> = SmallVec::new();
        let mut stations = Vec::with_capacity(labels.len());
        for label in &labels {
            let station = parse_label(label)?;
            if let Some(s) = station {
                if seen.contains(&s.get()) {
                    return Err(PatternLabelError::DuplicateStation(s.get()));
                }
                seen.push(s.get());
            }
            stations.push(station);
        }
        Ok(Self { stations })
    }
}

impl From<PlacementPattern> for Vec<String> {
    fn from(pattern: PlacementPattern) -> Self {
        pattern.labels()
    }
}

impl std::fmt::Display for PlacementPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.labels().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pi(i: usize) -> PlacementIndex {
        PlacementIndex::new(i)
    }

    fn si(i: usize) -> StationIndex {
        StationIndex::new(i)
    }

    #[test]
    fn test_empty_pattern_has_no_stations() {
        let pattern = PlacementPattern::empty(3);
        assert_eq!(pattern.num_placements(), 3);
        assert_eq!(pattern.placed_count(), 0);
        assert_eq!(pattern.labels(), vec!["-", "-", "-"]);
        assert_eq!(pattern.station_at(pi(7)), None);
    }

    #[test]
    fn test_labels_are_one_based() {
        let pattern = PlacementPattern::from_assignments(3, [(pi(0), si(1)), (pi(2), si(0))]);
        assert_eq!(pattern.labels(), vec!["S2", "-", "S1"]);
        assert_eq!(pattern.to_string(), "[S2, -, S1]");
        assert_eq!(pattern.placed_count(), 2);
        let placed: Vec<_> = pattern.placed().collect();
        assert_eq!(placed, vec![(pi(0), si(1)), (pi(2), si(0))]);
    }

    #[test]
    fn test_serializes_as_label_list() {
        let pattern = PlacementPattern::from_assignments(2, [(pi(1), si(0))]);
        let json = serde_json::to_string(&pattern).unwrap();
        assert_eq!(json, r#"["-","S1"]"#);
        let back: PlacementPattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pattern);
    }

    #[test]
    fn test_rejects_malformed_and_duplicate_labels() {
        assert_eq!(
            PlacementPattern::try_from(vec!["S0".to_string()]),
            Err(PatternLabelError::InvalidLabel("S0".to_string()))
        );
        assert_eq!(
            PlacementPattern::try_from(vec!["x".to_string()]),
            Err(PatternLabelError::InvalidLabel("x".to_string()))
        );
        assert_eq!(
            PlacementPattern::try_from(vec!["S1".to_string(), "S1".to_string()]),
            Err(PatternLabelError::DuplicateStation(0))
        );
    }
}
