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

use crate::{
    bound::strategy::{BoundQuery, BoundStrategy},
    feasibility::vacant_stations_excluding,
    tree::{NodeKey, NodeMetrics, TreeNode},
};
use tandem_model::{
    index::{PlacementIndex, StationIndex},
    model::Model,
};
use tandem_relax::RelaxError;

/// Multiple of the backend tolerance added, relative to `1 + C`, to a
/// solver's covered length `C`.
const COVERED_LENGTH_SLACK_FACTOR: f64 = 2.0;

/// The estimate of an assign child.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundEstimate {
    pub estimate: f64,
    /// The strategy error that forced the trivial estimate, if any.
    pub fallback: Option<RelaxError>,
}

/// Computes the estimate of the assign child `(placement, station)` of
/// `parent`, whose evaluated metrics are `child`.
///
/// The strategy's covered length `C` tightens the right part of the
/// noncoverage to `max(g_right − place[p] − coverage[s] − C, 0)`. When the
/// strategy fails the child keeps its trivial estimate; the failure is
/// logged and returned so the caller can count it.
pub fn estimate_child<S>(
    strategy: &mut S,
    model: &Model,
    parent: &TreeNode,
    key: NodeKey,
    placement: PlacementIndex,
    station: StationIndex,
    child: &NodeMetrics,
) -> BoundEstimate
where
    S: BoundStrategy + ?Sized,
{
    let noncoverage = child.noncoverage;
    let trivial = noncoverage.left + noncoverage.right;

    let vacant_stations = vacant_stations_excluding(parent.matrix(), station);
    let query = BoundQuery {
        model,
        vacant_stations: &vacant_stations,
        vacant_points: model.num_placements() - placement.get() - 1,
        remaining_cost: (model.cost_limit() - child.cost).max(0.0),
    };
    if query.is_empty() {
        return BoundEstimate {
            estimate: trivial,
            fallback: None,
        };
    }

    match strategy.covered_length(&query) {
        Ok(covered) => {
            let covered = covered.max(0.0);
            let slack = COVERED_LENGTH_SLACK_FACTOR * tandem_relax::tolerance::<f64>();
            let covered = covered + slack * (1.0 + covered);
            let right = (model.gateway_right() - model.placement(placement) - model.coverage(station) - covered)
                .max(0.0)
                .min(noncoverage.right);
            tracing::trace!(
                node = %key,
                covered,
                estimate = noncoverage.left + right,
                "bound computed"
            );
            BoundEstimate {
                estimate: noncoverage.left + right,
                fallback: None,
            }
        }
        Err(error) => {
            tracing::warn!(
                node = %key,
                placement = placement.get(),
                station = station.get(),
                strategy = strategy.name(),
                %error,
                "bound solver failed, using the trivial estimate"
            );
            BoundEstimate {
                estimate: trivial,
                fallback: Some(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bound::{coverage_sum::CoverageSumBound, relaxation::RelaxationBound, trivial::TrivialBound},
        feasibility::FeasibilityChecker,
        tree::SearchTree,
    };
    use tandem_model::model::ModelBuilder;
    use tandem_relax::{RelaxedProblem, RelaxedSolution, SolveBudget, VariableDomain};

    /// Two stations of radius 5 on points 0 and 10 between gateways at -5 and 15.
    fn build_model() -> Model {
        let mut builder = ModelBuilder::new(2, 2);
        builder
            .set_placement_coordinates(&[0.0, 10.0])
            .set_gateways(-5.0, 15.0)
            .set_uniform_link_range(20.0)
            .set_cost_limit(10.0);
        for s in 0..2 {
            builder
                .set_station_coverage(StationIndex::new(s), 5.0)
                .set_station_cost(StationIndex::new(s), 1.0);
        }
        builder.build().expect("model should be valid")
    }

    fn first_child(model: &Model) -> (SearchTree, NodeKey, NodeMetrics) {
        let mut tree = SearchTree::initialize(model);
        let (assign, _) = tree.branch(tree.root(), PlacementIndex::new(0), StationIndex::new(0));
        let metrics = FeasibilityChecker::new(model)
            .evaluate(tree.node(tree.root()), PlacementIndex::new(0), StationIndex::new(0))
            .expect("first placement should be feasible");
        (tree, assign, metrics)
    }

    #[test]
    fn test_relaxation_tightens_estimate() {
        let model = build_model();
        let (tree, key, metrics) = first_child(&model);
        let mut strategy = RelaxationBound::ilp(SolveBudget::default());
        let bound = estimate_child(
            &mut strategy,
            &model,
            tree.node(tree.root()),
            key,
            PlacementIndex::new(0),
            StationIndex::new(0),
            &metrics,
        );
        assert_eq!(metrics.noncoverage.total(), 10.0);
        assert_eq!(bound.estimate, 0.0);
        assert!(bound.fallback.is_none());
    }

    #[test]
    fn test_trivial_strategy_keeps_true_noncoverage() {
        let model = build_model();
        let (tree, key, metrics) = first_child(&model);
        let bound = estimate_child(
            &mut TrivialBound::new(),
            &model,
            tree.node(tree.root()),
            key,
            PlacementIndex::new(0),
            StationIndex::new(0),
            &metrics,
        );
        assert_eq!(bound.estimate, 10.0);
    }

    #[test]
    fn test_coverage_sum_matches_relaxation_here() {
        let model = build_model();
        let (tree, key, metrics) = first_child(&model);
        let bound = estimate_child(
            &mut CoverageSumBound::new(),
            &model,
            tree.node(tree.root()),
            key,
            PlacementIndex::new(0),
            StationIndex::new(0),
            &metrics,
        );
        assert_eq!(bound.estimate, 0.0);
    }

    #[test]
    fn test_solver_failure_falls_back() {
        let model = build_model();
        let (tree, key, metrics) = first_child(&model);
        let failing = |_: &RelaxedProblem<f64>, _: &SolveBudget| -> Result<RelaxedSolution<f64>, RelaxError> {
            Err(RelaxError::NodeLimit(0))
        };
        let mut strategy = RelaxationBound::with_solver(failing, VariableDomain::Binary, true, SolveBudget::default());
        let bound = estimate_child(
            &mut strategy,
            &model,
            tree.node(tree.root()),
            key,
            PlacementIndex::new(0),
            StationIndex::new(0),
            &metrics,
        );
        assert_eq!(bound.estimate, 10.0);
        assert_eq!(bound.fallback, Some(RelaxError::NodeLimit(0)));
    }

    #[test]
    fn test_slack_absorbs_backend_tolerance() {
        // Station 1 at point 10 leaves exactly 0.5 uncovered before the right gateway.
        let mut builder = ModelBuilder::new(2, 2);
        builder
            .set_placement_coordinates(&[0.0, 10.0])
            .set_gateways(-5.0, 15.5)
            .set_uniform_link_range(20.0)
            .set_cost_limit(10.0);
        for s in 0..2 {
            builder
                .set_station_coverage(StationIndex::new(s), 5.0)
                .set_station_cost(StationIndex::new(s), 1.0);
        }
        let model = builder.build().expect("model should be valid");
        let (tree, key, metrics) = first_child(&model);

        // A backend that stops within its tolerance of the optimal covered length 10.
        let short = |_: &RelaxedProblem<f64>, _: &SolveBudget| -> Result<RelaxedSolution<f64>, RelaxError> {
            Ok(RelaxedSolution {
                objective: 10.0 - tandem_relax::tolerance::<f64>(),
                values: vec![1.0],
                nodes: 1,
                iterations: 0,
            })
        };
        let mut strategy = RelaxationBound::with_solver(short, VariableDomain::Binary, true, SolveBudget::default());
        let bound = estimate_child(
            &mut strategy,
            &model,
            tree.node(tree.root()),
            key,
            PlacementIndex::new(0),
            StationIndex::new(0),
            &metrics,
        );
        assert!(bound.fallback.is_none());
        assert!(
            bound.estimate <= 0.5,
            "estimate {} exceeds the achievable noncoverage 0.5",
            bound.estimate
        );
        assert!(bound.estimate > 0.5 - 1e-6);
    }

    #[test]
    fn test_last_point_uses_trivial_estimate() {
        let model = build_model();
        let tree = SearchTree::initialize(&model);
        let metrics = FeasibilityChecker::new(&model)
            .evaluate(tree.node(tree.root()), PlacementIndex::new(1), StationIndex::new(0))
            .expect("placing at the last point should be feasible");
        let bound = estimate_child(
            &mut RelaxationBound::ilp(SolveBudget::default()),
            &model,
            tree.node(tree.root()),
            NodeKey::new(1),
            PlacementIndex::new(1),
            StationIndex::new(0),
            &metrics,
        );
        assert_eq!(bound.estimate, metrics.noncoverage.total());
        assert_eq!(bound.estimate, 10.0);
    }
}
