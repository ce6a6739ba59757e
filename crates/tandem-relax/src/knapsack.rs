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

//! 0/1 knapsack by depth-first branch-and-bound with the Dantzig bound.

use crate::{
    error::RelaxError,
    problem::RelaxedProblem,
    solver::{tolerance, Deadline, RelaxationSolver, RelaxedSolution, SolveBudget},
};
use num_traits::Float;
use std::cmp::Ordering;

const DEADLINE_CHECK_MASK: usize = 0x3FF;

#[derive(Debug, Clone, Copy)]
struct Item<F> {
    index: usize,
    value: F,
    weight: F,
}

struct Search<'a, F> {
    items: &'a [Item<F>],
    capacity: F,
    tol: F,
    deadline: Deadline,
    max_nodes: usize,
    nodes: usize,
    taken: Vec<bool>,
    best_value: F,
    best_taken: Vec<bool>,
}

impl<F: Float> Search<'_, F> {
    /// Greedy fractional fill of the items from `level` on.
    fn upper_bound(&self, level: usize, value: F, weight: F) -> F {
        let mut bound = value;
        let mut room = self.capacity - weight;
        for item in &self.items[level..] {
            if item.weight <= room {
                room = room - item.weight;
                bound = bound + item.value;
            } else {
                return bound + item.value * room / item.weight;
            }
        }
        bound
    }

    fn branch(&mut self, level: usize, value: F, weight: F) -> Result<(), RelaxError> {
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            return Err(RelaxError::NodeLimit(self.max_nodes));
        }
        if self.nodes & DEADLINE_CHECK_MASK == 1 {
            self.deadline.check()?;
        }

        if value > self.best_value {
            self.best_value = value;
            self.best_taken.clone_from(&self.taken);
        }
        if level == self.items.len() || self.upper_bound(level, value, weight) <= self.best_value + self.tol {
            return Ok(());
        }

        let item = self.items[level];
        if weight + item.weight <= self.capacity {
            self.taken[level] = true;
            self.branch(level + 1, value + item.value, weight + item.weight)?;
            self.taken[level] = false;
        }
        self.branch(level + 1, value, weight)
    }
}

/// Knapsack backend.
///
/// Accepts at most one binding row with non-negative coefficients (the
/// weights) and treats every variable as binary. Items with a non-positive
/// objective coefficient are never taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KnapsackSolver;

impl KnapsackSolver {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl<F: Float> RelaxationSolver<F> for KnapsackSolver {
    fn name(&self) -> &str {
        "KnapsackSolver"
    }

    fn solve(&self, problem: &RelaxedProblem<F>, budget: &SolveBudget) -> Result<RelaxedSolution<F>, RelaxError> {
        problem.validate()?;
        let mut binding = problem.constraints().iter().filter(|row| !row.is_redundant());
        let row = binding.next();
        if binding.next().is_some() {
            return Err(RelaxError::UnsupportedShape {
                backend: "KnapsackSolver",
                reason: "more than one binding constraint",
            });
        }
        if row.is_some_and(|row| row.coefficients().iter().any(|&w| w < F::zero())) {
            return Err(RelaxError::UnsupportedShape {
                backend: "KnapsackSolver",
                reason: "negative weight",
            });
        }

        let n = problem.num_variables();
        let mut values = vec![F::zero(); n];
        let mut base = F::zero();
        let mut items: Vec<Item<F>> = Vec::with_capacity(n);
        for (index, &value) in problem.objective().iter().enumerate() {
            if value <= F::zero() {
                continue;
            }
            let weight = row.map_or(F::zero(), |row| row.coefficients()[index]);
            if weight == F::zero() {
                values[index] = F::one();
                base = base + value;
            } else {
                items.push(Item { index, value, weight });
            }
        }
        items.sort_by(|a, b| {
            (b.value / b.weight)
                .partial_cmp(&(a.value / a.weight))
                .unwrap_or(Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });

        let capacity = row.map_or(F::infinity(), |row| row.rhs());
        let mut search = Search {
            items: &items,
            capacity,
            tol: tolerance::<F>(),
            deadline: budget.start(),
            max_nodes: budget.max_nodes,
            nodes: 0,
            taken: vec![false; items.len()],
            best_value: F::zero(),
            best_taken: vec![false; items.len()],
        };
        search.branch(0, F::zero(), F::zero())?;

        for (item, &taken) in items.iter().zip(&search.best_taken) {
            if taken {
                values[item.index] = F::one();
            }
        }

        Ok(RelaxedSolution {
            objective: base + search.best_value,
            values,
            nodes: search.nodes,
            iterations: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::VariableDomain;
    use crate::testing::{exhaustive_optimum, random_problem};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Duration;

    #[test]
    fn test_small_knapsack_optimum() {
        let mut problem = RelaxedProblem::new(vec![6.0, 10.0, 12.0], VariableDomain::Binary);
        problem.add_constraint(vec![1.0, 2.0, 3.0], 5.0).unwrap();
        let solution = KnapsackSolver::new()
            .solve(&problem, &SolveBudget::default())
            .unwrap();
        assert_eq!(solution.objective, 22.0);
        assert_eq!(solution.values, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_zero_weight_and_unconstrained_items_are_taken() {
        let mut problem = RelaxedProblem::new(vec![3.0, 4.0, -1.0], VariableDomain::Binary);
        problem.add_constraint(vec![0.0, 10.0, 1.0], 5.0).unwrap();
        let solution = KnapsackSolver::new()
            .solve(&problem, &SolveBudget::default())
            .unwrap();
        assert_eq!(solution.objective, 3.0);
        assert_eq!(solution.values, vec![1.0, 0.0, 0.0]);

        let free = RelaxedProblem::new(vec![1.0, 2.0], VariableDomain::Binary);
        let solution = KnapsackSolver::new()
            .solve(&free, &SolveBudget::default())
            .unwrap();
        assert_eq!(solution.objective, 3.0);
    }

    #[test]
    fn test_second_binding_row_is_unsupported() {
        let mut problem = RelaxedProblem::new(vec![1.0, 1.0], VariableDomain::Binary);
        problem.add_constraint(vec![1.0, 1.0], 1.0).unwrap();
        problem.add_constraint(vec![1.0, 1.0], 1.0).unwrap();
        assert!(matches!(
            KnapsackSolver::new().solve(&problem, &SolveBudget::default()),
            Err(RelaxError::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn test_limits_are_reported() {
        let mut problem = RelaxedProblem::new(vec![6.0, 10.0, 12.0], VariableDomain::Binary);
        problem.add_constraint(vec![1.0, 2.0, 3.0], 5.0).unwrap();
        assert_eq!(
            KnapsackSolver::new().solve(&problem, &SolveBudget::default().with_max_nodes(2)),
            Err(RelaxError::NodeLimit(2))
        );
        assert_eq!(
            KnapsackSolver::new().solve(&problem, &SolveBudget::default().with_time_limit(Duration::ZERO)),
            Err(RelaxError::TimeLimit(Duration::ZERO))
        );
    }

    #[test]
    fn test_matches_exhaustive_enumeration_on_random_problems() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for round in 0..100 {
            let problem = random_problem(&mut rng, 10, false);
            let expected = exhaustive_optimum(&problem);
            let solution = KnapsackSolver::new()
                .solve(&problem, &SolveBudget::default())
                .unwrap();
            assert!(
                (solution.objective - expected).abs() < 1e-9,
                "round {round}: knapsack found {} but the optimum is {expected}",
                solution.objective
            );
            assert!(problem.is_feasible(&solution.values, 1e-9));
        }
    }
}
