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

//! Feasibility of placing one more station.
//!
//! A candidate `(p, s)` on top of a parent node must satisfy, in order:
//!
//! 1. **Left link**: `s` can talk to the last placed station (or the left
//!    gateway).
//! 2. **Right link**: `s` reaches the right gateway, or the next point with a
//!    station that is still vacant.
//! 3. **Vacant reachability**: the vacant stations can still close the
//!    remaining distance to the right gateway.
//! 4. **Cost** within `cost_limit`.
//! 5. **Delay** finite and within `delay_limit`.
//!
//! The link checks are necessary conditions only; gateway connectivity of a
//! node is decided separately from its `LinkReach`.
//!
//! `ensure_connectable` runs once before the search and rejects instances in
//! which no chain of at most `m` stations can join the gateways.

use crate::{
    coverage::{left_noncoverage, right_noncoverage},
    queueing::accumulated_delay,
    tree::{AssignmentMatrix, LinkReach, NodeMetrics, Noncoverage, TreeNode},
};
use smallvec::SmallVec;
use std::collections::VecDeque;
use tandem_model::{
    index::{PlacementIndex, StationIndex},
    model::Model,
};

/// Why a candidate placement was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Infeasibility {
    /// The hop from the left neighbour is longer than the link range.
    LeftLinkOutOfRange { distance: f64, range: f64 },
    /// Neither the right gateway nor the next point is within range.
    RightLinkOutOfRange { distance: f64, range: f64 },
    /// The vacant stations cannot relay to the right gateway from `reached`.
    VacantStationsCannotReach { reached: f64 },
    CostLimitExceeded { cost: f64, limit: f64 },
    DelayLimitExceeded { delay: f64, limit: f64 },
}

impl std::fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Infeasibility::LeftLinkOutOfRange { distance, range } => {
                write!(f, "left link out of range ({} > {})", distance, range)
            }
            Infeasibility::RightLinkOutOfRange { distance, range } => {
                write!(f, "right link out of range ({} > {})", distance, range)
            }
            Infeasibility::VacantStationsCannotReach { reached } => {
                write!(f, "vacant stations cannot reach the right gateway from {}", reached)
            }
            Infeasibility::CostLimitExceeded { cost, limit } => {
                write!(f, "cost limit exceeded ({} > {})", cost, limit)
            }
            Infeasibility::DelayLimitExceeded { delay, limit } => {
                write!(f, "delay limit exceeded ({} > {})", delay, limit)
            }
        }
    }
}

/// Stations not placed in `parent`, excluding `station`.
pub fn vacant_stations_excluding(parent: &AssignmentMatrix, station: StationIndex) -> SmallVec<[StationIndex; 16]> {
    parent
        .vacant_stations()
        .into_iter()
        .filter(|&v| v != station)
        .collect()
}

/// Evaluates candidate placements against a model.
#[derive(Debug, Clone, Copy)]
pub struct FeasibilityChecker<'a> {
    model: &'a Model,
}

impl<'a> FeasibilityChecker<'a> {
    #[inline]
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Checks the hop into `placement` and returns its length.
    pub fn check_left_link(
        &self,
        parent: &AssignmentMatrix,
        placement: PlacementIndex,
        station: StationIndex,
    ) -> Result<f64, Infeasibility> {
        let model = self.model;
        let (from, range) = match parent.last_placed() {
            Some((lp, ls)) => (model.placement(lp), model.hop_range(ls, station)),
            None => (model.gateway_left(), model.gateway_hop_range(station)),
        };
        let distance = model.placement(placement) - from;
        if distance <= range {
            Ok(distance)
        } else {
            Err(Infeasibility::LeftLinkOutOfRange { distance, range })
        }
    }

    /// Checks that `station` at `placement` can pass traffic onwards.
    pub fn check_right_link(
        &self,
        parent: &AssignmentMatrix,
        placement: PlacementIndex,
        station: StationIndex,
    ) -> Result<(), Infeasibility> {
        let model = self.model;
        let x = model.placement(placement);
        let to_gateway = model.gateway_right() - x;
        let gateway_range = model.gateway_hop_range(station);
        if to_gateway <= gateway_range {
            return Ok(());
        }

        let vacant = vacant_stations_excluding(parent, station);
        let next = placement.get() + 1;
        if next == model.num_placements() || vacant.is_empty() {
            return Err(Infeasibility::RightLinkOutOfRange {
                distance: to_gateway,
                range: gateway_range,
            });
        }

        let relay_range = vacant
            .iter()
            .map(|&v| model.hop_range(station, v))
            .fold(0.0, f64::max);
        let distance = model.placement(PlacementIndex::new(next)) - x;
        if distance <= relay_range {
            Ok(())
        } else {
            Err(Infeasibility::RightLinkOutOfRange {
                distance,
                range: relay_range,
            })
        }
    }

    /// Checks that the vacant stations could still relay from the points
    /// after `placement` to the right gateway.
    pub fn check_vacant_reachability(
        &self,
        parent: &AssignmentMatrix,
        placement: PlacementIndex,
        station: StationIndex,
    ) -> Result<(), Infeasibility> {
        let model = self.model;
        let x = model.placement(placement);
        if model.gateway_right() - x <= model.gateway_hop_range(station) {
            return Ok(());
        }

        let vacant = vacant_stations_excluding(parent, station);
        let gateway_reach = vacant
            .iter()
            .map(|&v| model.gateway_hop_range(v))
            .fold(0.0, f64::max);

        let mut relay_reach = vacant
            .iter()
            .map(|&v| model.hop_range(station, v))
            .fold(0.0, f64::max);
        for (i, &a) in vacant.iter().enumerate() {
            for &b in &vacant[i + 1..] {
                relay_reach = relay_reach.max(model.hop_range(a, b));
            }
        }

        let mut reached = x;
        for q in placement.get() + 1..model.num_placements() {
            let xq = model.placement(PlacementIndex::new(q));
            if xq - reached > relay_reach {
                break;
            }
            reached = xq;
            if model.gateway_right() - xq <= gateway_reach {
                return Ok(());
            }
        }
        Err(Infeasibility::VacantStationsCannotReach { reached })
    }

    #[inline]
    pub fn check_cost(&self, cost: f64) -> Result<(), Infeasibility> {
        let limit = self.model.cost_limit();
        if cost <= limit {
            Ok(())
        } else {
            Err(Infeasibility::CostLimitExceeded { cost, limit })
        }
    }

    #[inline]
    pub fn check_delay(&self, delay: f64) -> Result<(), Infeasibility> {
        let limit = self.model.delay_limit();
        if delay.is_finite() && delay <= limit {
            Ok(())
        } else {
            Err(Infeasibility::DelayLimitExceeded { delay, limit })
        }
    }

    /// Runs every check for `station` at `placement` on top of `parent` and
    /// returns the child's metrics. The estimate is set to the true
    /// noncoverage; the bound oracle tightens it afterwards.
    pub fn evaluate(
        &self,
        parent: &TreeNode,
        placement: PlacementIndex,
        station: StationIndex,
    ) -> Result<NodeMetrics, Infeasibility> {
        let model = self.model;
        let matrix = parent.matrix();

        let hop = self.check_left_link(matrix, placement, station)?;
        self.check_right_link(matrix, placement, station)?;
        self.check_vacant_reachability(matrix, placement, station)?;

        let cost = parent.cost() + model.station_cost(station);
        self.check_cost(cost)?;

        let delay = accumulated_delay(model, parent.delay(), station, matrix.placed_count() + 1);
        self.check_delay(delay)?;

        let left = left_noncoverage(model, matrix, parent.noncoverage().left, placement, station);
        let right = right_noncoverage(model, placement, station);
        Ok(NodeMetrics {
            cost,
            delay,
            link: LinkReach {
                left: parent.link().left + hop,
                right: model.gateway_hop_range(station),
            },
            noncoverage: Noncoverage {
                left,
                right,
                estimate: left + right,
            },
        })
    }

    /// Returns `true` if the placed chain of `node` joins both gateways.
    #[inline]
    pub fn is_gateway_connected(&self, node: &TreeNode) -> bool {
        node.link().spans(self.model.span())
    }
}

/// Why no placement can join the gateways.
#[derive(Debug, Clone, PartialEq)]
pub struct UnbridgeableGap {
    /// Farthest coordinate reachable from the left gateway.
    pub reached: f64,
    pub gateway_right: f64,
    /// Stations a shortest chain would need, if a chain exists at all.
    pub stations_required: Option<usize>,
    pub stations_available: usize,
    pub gateway_range: f64,
    pub station_range: f64,
}

impl std::fmt::Display for UnbridgeableGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.stations_required {
            Some(required) => write!(
                f,
                "joining the gateways needs {} stations but only {} are available",
                required, self.stations_available
            ),
            None => write!(
                f,
                "no chain reaches the right gateway at {}: coverage of the link stops at {} (best gateway range {}, best station range {})",
                self.gateway_right, self.reached, self.gateway_range, self.station_range
            ),
        }
    }
}

/// Checks that some chain of at most `m` points joins the gateways, using
/// the best ranges any station offers. Returns the length of the shortest
/// such chain.
pub fn ensure_connectable(model: &Model) -> Result<usize, UnbridgeableGap> {
    let n = model.num_placements();
    let gateway_range = model.max_gateway_hop_range();
    let station_range = model.max_station_hop_range();

    // 0 is the left gateway, 1..=n the points, n + 1 the right gateway.
    let last = n + 1;
    let coordinate = |v: usize| match v {
        0 => model.gateway_left(),
        v if v == last => model.gateway_right(),
        v => model.placement(PlacementIndex::new(v - 1)),
    };
    let adjacent = |a: usize, b: usize| {
        let (lo, hi) = (a.min(b), a.max(b));
        if lo == 0 && hi == last {
            return false;
        }
        let range = if lo == 0 || hi == last {
            gateway_range
        } else {
            station_range
        };
        (coordinate(hi) - coordinate(lo)).abs() <= range
    };

    let mut hops = vec![usize::MAX; n + 2];
    hops[0] = 0;
    let mut queue = VecDeque::from([0usize]);
    while let Some(v) = queue.pop_front() {
        if v == last {
            continue;
        }
        for w in 1..=last {
            if hops[w] == usize::MAX && adjacent(v, w) {
                hops[w] = hops[v] + 1;
                queue.push_back(w);
            }
        }
    }

    let stations_available = model.num_stations();
    let reached = (0..=last)
        .filter(|&v| hops[v] != usize::MAX)
        .map(coordinate)
        .fold(model.gateway_left(), f64::max);
    let gap = |stations_required| UnbridgeableGap {
        reached,
        gateway_right: model.gateway_right(),
        stations_required,
        stations_available,
        gateway_range,
        station_range,
    };

    match hops[last] {
        usize::MAX => Err(gap(None)),
        h if h - 1 > stations_available => Err(gap(Some(h - 1))),
        h => Ok(h - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SearchTree;
    use tandem_model::model::ModelBuilder;

    fn p(i: usize) -> PlacementIndex {
        PlacementIndex::new(i)
    }

    fn s(i: usize) -> StationIndex {
        StationIndex::new(i)
    }

    /// Points at `coords`, gateways at `gateways`, every station with the
    /// same coverage, range and unit cost.
    fn build_model(coords: &[f64], gateways: (f64, f64), stations: usize, coverage: f64, range: f64) -> Model {
        let mut builder = ModelBuilder::new(coords.len(), stations);
        builder
            .set_placement_coordinates(coords)
            .set_gateways(gateways.0, gateways.1)
            .set_uniform_link_range(range)
            .set_cost_limit(10.0);
        for i in 0..stations {
            builder.set_station_coverage(s(i), coverage).set_station_cost(s(i), 1.0);
        }
        builder.build().expect("model should be valid")
    }

    #[test]
    fn test_left_link_from_gateway_and_station() {
        let model = build_model(&[0.0, 10.0, 40.0], (-5.0, 50.0), 2, 5.0, 20.0);
        let checker = FeasibilityChecker::new(&model);
        let mut matrix = AssignmentMatrix::new(3, 2);

        assert_eq!(checker.check_left_link(&matrix, p(0), s(0)), Ok(5.0));
        assert!(matches!(
            checker.check_left_link(&matrix, p(2), s(0)),
            Err(Infeasibility::LeftLinkOutOfRange { .. })
        ));

        matrix.place(p(0), s(0));
        assert_eq!(checker.check_left_link(&matrix, p(1), s(1)), Ok(10.0));
        assert!(checker.check_left_link(&matrix, p(2), s(1)).is_err());
    }

    #[test]
    fn test_right_link_via_next_point() {
        let model = build_model(&[0.0, 10.0], (-5.0, 40.0), 2, 1.0, 20.0);
        let checker = FeasibilityChecker::new(&model);
        let matrix = AssignmentMatrix::new(2, 2);
        // 40 to the gateway, 10 to the next point with S2 still vacant.
        assert_eq!(checker.check_right_link(&matrix, p(0), s(0)), Ok(()));
        // The last point must reach the gateway itself.
        assert!(matches!(
            checker.check_right_link(&matrix, p(1), s(0)),
            Err(Infeasibility::RightLinkOutOfRange { distance, .. }) if distance == 30.0
        ));
    }

    #[test]
    fn test_right_link_without_vacant_station() {
        let model = build_model(&[0.0, 10.0], (-5.0, 40.0), 1, 1.0, 20.0);
        let checker = FeasibilityChecker::new(&model);
        let matrix = AssignmentMatrix::new(2, 1);
        assert!(checker.check_right_link(&matrix, p(0), s(0)).is_err());
    }

    #[test]
    fn test_vacant_reachability_walks_points() {
        let model = build_model(&[0.0, 15.0, 30.0, 45.0], (-5.0, 60.0), 3, 1.0, 20.0);
        let checker = FeasibilityChecker::new(&model);
        let matrix = AssignmentMatrix::new(4, 3);
        // 0 -> 15 -> 30 -> 45 in steps of 15; 45 is 15 from the gateway.
        assert_eq!(checker.check_vacant_reachability(&matrix, p(0), s(0)), Ok(()));
    }

    #[test]
    fn test_vacant_reachability_fails_on_wide_gap() {
        let model = build_model(&[0.0, 15.0, 50.0], (-5.0, 80.0), 3, 1.0, 20.0);
        let checker = FeasibilityChecker::new(&model);
        let matrix = AssignmentMatrix::new(3, 3);
        assert_eq!(
            checker.check_vacant_reachability(&matrix, p(0), s(0)),
            Err(Infeasibility::VacantStationsCannotReach { reached: 15.0 })
        );
    }

    #[test]
    fn test_cost_and_delay_limits() {
        let model = build_model(&[0.0], (-1.0, 1.0), 1, 1.0, 5.0);
        let checker = FeasibilityChecker::new(&model);
        assert!(checker.check_cost(10.0).is_ok());
        assert!(checker.check_cost(10.5).is_err());
        assert!(checker.check_delay(1e6).is_ok());
        assert!(checker.check_delay(f64::INFINITY).is_err());
    }

    #[test]
    fn test_evaluate_first_station() {
        let model = build_model(&[0.0, 10.0], (-5.0, 15.0), 2, 5.0, 20.0);
        let tree = SearchTree::initialize(&model);
        let checker = FeasibilityChecker::new(&model);
        let metrics = checker
            .evaluate(tree.node(tree.root()), p(0), s(0))
            .expect("placement should be feasible");
        assert_eq!(metrics.cost, 1.0);
        assert_eq!(metrics.link, LinkReach { left: 5.0, right: 20.0 });
        assert_eq!(metrics.noncoverage.left, 0.0);
        assert_eq!(metrics.noncoverage.right, 10.0);
        assert_eq!(metrics.noncoverage.estimate, 10.0);
        assert!(metrics.link.spans(model.span()));
    }

    #[test]
    fn test_evaluate_rejects_over_budget() {
        let mut builder = ModelBuilder::new(1, 1);
        builder
            .set_gateways(-1.0, 1.0)
            .set_uniform_link_range(5.0)
            .set_station_cost(s(0), 3.0)
            .set_cost_limit(2.0);
        let model = builder.build().expect("model should be valid");
        let tree = SearchTree::initialize(&model);
        let checker = FeasibilityChecker::new(&model);
        assert_eq!(
            checker.evaluate(tree.node(tree.root()), p(0), s(0)),
            Err(Infeasibility::CostLimitExceeded { cost: 3.0, limit: 2.0 })
        );
    }

    #[test]
    fn test_connectable_counts_shortest_chain() {
        let model = build_model(&[0.0, 10.0, 20.0, 30.0], (-5.0, 35.0), 3, 1.0, 15.0);
        // -5 -> 10 -> 20 -> 35
        assert_eq!(ensure_connectable(&model), Ok(2));
    }

    #[test]
    fn test_connectable_rejects_long_span() {
        let model = build_model(&[0.0, 500.0], (-5.0, 1000.0), 2, 1.0, 10.0);
        let gap = ensure_connectable(&model).expect_err("span cannot be bridged");
        assert_eq!(gap.stations_required, None);
        assert_eq!(gap.reached, 0.0);
    }

    #[test]
    fn test_connectable_rejects_too_few_stations() {
        let model = build_model(&[0.0, 10.0, 20.0, 30.0], (-5.0, 35.0), 1, 1.0, 15.0);
        // With a single station there is no station-to-station hop at all.
        let gap = ensure_connectable(&model).expect_err("one station cannot bridge 40");
        assert_eq!(gap.stations_required, None);

        let model = build_model(&[0.0, 10.0, 20.0, 30.0], (-5.0, 35.0), 2, 1.0, 10.0);
        let gap = ensure_connectable(&model).expect_err("two stations cannot bridge 40");
        assert_eq!(gap.stations_required, Some(4));
    }
}
