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

//! Coverage bounds from a numeric relaxation.
//!
//! The vacant stations become variables `x_i`, each worth its coverage
//! diameter `2·coverage[i]`. The problem
//!
//! ```text
//! maximize    Σ 2·coverage[i]·x_i
//! subject to  Σ cost[i]·x_i ≤ remaining_cost
//!             Σ x_i         ≤ vacant_points      (ILP and LP only)
//! ```
//!
//! is handed to a `RelaxationSolver`. Its optimum is at least the diameter
//! sum of any selection the subtree can still place.

use crate::bound::strategy::{BoundQuery, BoundStrategy};
use tandem_relax::{
    BinaryBranchAndBound, KnapsackSolver, RelaxError, RelaxationSolver, RelaxedProblem, SimplexSolver,
    SolveBudget, VariableDomain,
};

/// A `BoundStrategy` backed by any `RelaxationSolver`.
#[derive(Debug, Clone)]
pub struct RelaxationBound<R> {
    solver: R,
    budget: SolveBudget,
    domain: VariableDomain,
    cardinality_row: bool,
    name: String,
}

impl<R> RelaxationBound<R>
where
    R: RelaxationSolver<f64>,
{
    /// Wraps `solver`, which receives problems over `domain`. With
    /// `cardinality_row` the selection is also limited to the number of
    /// vacant points.
    pub fn with_solver(solver: R, domain: VariableDomain, cardinality_row: bool, budget: SolveBudget) -> Self {
        let name = format!("RelaxationBound({}, {})", solver.name(), domain);
        Self {
            solver,
            budget,
            domain,
            cardinality_row,
            name,
        }
    }

    #[inline]
    pub fn budget(&self) -> &SolveBudget {
        &self.budget
    }

    #[inline]
    pub fn solver(&self) -> &R {
        &self.solver
    }

    /// Builds the relaxed problem for `query`.
    pub fn build_problem(&self, query: &BoundQuery<'_>) -> Result<RelaxedProblem<f64>, RelaxError> {
        let model = query.model;
        let objective = query
            .vacant_stations
            .iter()
            .map(|&s| 2.0 * model.coverage(s))
            .collect();
        let costs = query
            .vacant_stations
            .iter()
            .map(|&s| model.station_cost(s))
            .collect();

        let mut problem = RelaxedProblem::new(objective, self.domain);
        problem.add_constraint(costs, query.remaining_cost.max(0.0))?;
        if self.cardinality_row {
            let ones = vec![1.0; query.vacant_stations.len()];
            problem.add_constraint(ones, query.vacant_points as f64)?;
        }
        Ok(problem)
    }
}

impl RelaxationBound<BinaryBranchAndBound> {
    /// Binary selection with both rows, solved exactly.
    pub fn ilp(budget: SolveBudget) -> Self {
        Self::with_solver(BinaryBranchAndBound::new(), VariableDomain::Binary, true, budget)
    }
}

impl RelaxationBound<KnapsackSolver> {
    /// Binary selection under the cost row only.
    pub fn knapsack(budget: SolveBudget) -> Self {
        Self::with_solver(KnapsackSolver::new(), VariableDomain::Binary, false, budget)
    }
}

impl RelaxationBound<SimplexSolver> {
    /// Continuous selection with both rows.
    pub fn lp(budget: SolveBudget) -> Self {
        Self::with_solver(SimplexSolver::new(), VariableDomain::Continuous, true, budget)
    }
}

impl<R> BoundStrategy for RelaxationBound<R>
where
    R: RelaxationSolver<f64>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn covered_length(&mut self, query: &BoundQuery<'_>) -> Result<f64, RelaxError> {
        if query.is_empty() {
            return Ok(0.0);
        }
        let problem = self.build_problem(query)?;
        let solution = self.solver.solve(&problem, &self.budget)?;
        Ok(solution.objective.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use tandem_model::{
        index::StationIndex,
        model::{Model, ModelBuilder},
    };
    use tandem_relax::RelaxedSolution;

    fn build_model(radii: &[f64], costs: &[f64]) -> Model {
        let mut builder = ModelBuilder::new(4, radii.len());
        for (s, (&r, &c)) in radii.iter().zip(costs).enumerate() {
            builder
                .set_station_coverage(StationIndex::new(s), r)
                .set_station_cost(StationIndex::new(s), c);
        }
        builder.build().expect("model should be valid")
    }

    fn stations(m: usize) -> Vec<StationIndex> {
        (0..m).map(StationIndex::new).collect()
    }

    /// Best diameter sum over subsets within both limits.
    fn exhaustive(model: &Model, vacant: &[StationIndex], points: usize, budget: f64) -> f64 {
        let mut best = 0.0_f64;
        for mask in 0u32..(1 << vacant.len()) {
            let chosen: Vec<StationIndex> = (0..vacant.len())
                .filter(|&i| (mask >> i) & 1 == 1)
                .map(|i| vacant[i])
                .collect();
            let cost: f64 = chosen.iter().map(|&s| model.station_cost(s)).sum();
            if chosen.len() <= points && cost <= budget {
                best = best.max(chosen.iter().map(|&s| 2.0 * model.coverage(s)).sum());
            }
        }
        best
    }

    #[test]
    fn test_ilp_respects_cardinality() {
        let model = build_model(&[5.0, 4.0, 3.0], &[1.0, 1.0, 1.0]);
        let vacant = stations(3);
        let query = BoundQuery {
            model: &model,
            vacant_stations: &vacant,
            vacant_points: 2,
            remaining_cost: 10.0,
        };
        let c = RelaxationBound::ilp(SolveBudget::default())
            .covered_length(&query)
            .expect("ilp should solve");
        assert!((c - 18.0).abs() < 1e-9, "expected the two largest diameters, got {c}");
    }

    #[test]
    fn test_knapsack_ignores_cardinality() {
        let model = build_model(&[5.0, 4.0, 3.0], &[1.0, 1.0, 1.0]);
        let vacant = stations(3);
        let query = BoundQuery {
            model: &model,
            vacant_stations: &vacant,
            vacant_points: 2,
            remaining_cost: 10.0,
        };
        let c = RelaxationBound::knapsack(SolveBudget::default())
            .covered_length(&query)
            .expect("knapsack should solve");
        assert!((c - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_lp_with_fractional_budget() {
        let model = build_model(&[5.0, 4.0], &[2.0, 2.0]);
        let vacant = stations(2);
        let query = BoundQuery {
            model: &model,
            vacant_stations: &vacant,
            vacant_points: 2,
            remaining_cost: 3.0,
        };
        let c = RelaxationBound::lp(SolveBudget::default())
            .covered_length(&query)
            .expect("lp should solve");
        // One full station of diameter 10 plus half of one of diameter 8.
        assert!((c - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_query_covers_nothing() {
        let model = build_model(&[5.0], &[1.0]);
        let query = BoundQuery {
            model: &model,
            vacant_stations: &[],
            vacant_points: 3,
            remaining_cost: 10.0,
        };
        assert_eq!(RelaxationBound::ilp(SolveBudget::default()).covered_length(&query), Ok(0.0));
    }

    #[test]
    fn test_injected_solver_error_propagates() {
        let failing = |_: &RelaxedProblem<f64>, _: &SolveBudget| -> Result<RelaxedSolution<f64>, RelaxError> {
            Err(RelaxError::Unbounded)
        };
        let model = build_model(&[5.0], &[1.0]);
        let vacant = stations(1);
        let query = BoundQuery {
            model: &model,
            vacant_stations: &vacant,
            vacant_points: 1,
            remaining_cost: 10.0,
        };
        let mut bound = RelaxationBound::with_solver(failing, VariableDomain::Binary, true, SolveBudget::default());
        assert_eq!(bound.covered_length(&query), Err(RelaxError::Unbounded));
        assert!(bound.name().contains("FnRelaxationSolver"));
    }

    #[test]
    fn test_every_backend_dominates_exhaustive_optimum() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..40 {
            let m = rng.random_range(1..=7);
            let radii: Vec<f64> = (0..m).map(|_| rng.random_range(1..=20) as f64).collect();
            let costs: Vec<f64> = (0..m).map(|_| rng.random_range(1..=9) as f64).collect();
            let model = build_model(&radii, &costs);
            let vacant = stations(m);
            let points = rng.random_range(1..=m);
            let budget = rng.random_range(0..=30) as f64;
            let query = BoundQuery {
                model: &model,
                vacant_stations: &vacant,
                vacant_points: points,
                remaining_cost: budget,
            };
            let truth = exhaustive(&model, &vacant, points, budget);

            let ilp = RelaxationBound::ilp(SolveBudget::default())
                .covered_length(&query)
                .expect("ilp should solve");
            let knapsack = RelaxationBound::knapsack(SolveBudget::default())
                .covered_length(&query)
                .expect("knapsack should solve");
            let lp = RelaxationBound::lp(SolveBudget::default())
                .covered_length(&query)
                .expect("lp should solve");

            assert!((ilp - truth).abs() < 1e-6, "ilp {ilp} differs from the exhaustive optimum {truth}");
            assert!(knapsack >= truth - 1e-6, "knapsack {knapsack} below {truth}");
            assert!(lp >= ilp - 1e-6, "lp {lp} below ilp {ilp}");
        }
    }
}
