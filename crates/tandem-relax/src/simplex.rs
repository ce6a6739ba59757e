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

//! Dense tableau simplex over the unit box.
//!
//! Solves `maximize c·x  s.t.  A x ≤ b,  0 ≤ x ≤ 1` with `b ≥ 0`, so the slack
//! basis is feasible from the start and no phase one is needed. The upper
//! bounds are carried as explicit rows. Pivoting follows Bland's rule, which
//! rules out cycling on degenerate vertices.

use crate::{
    error::RelaxError,
    problem::RelaxedProblem,
    solver::{tolerance, Deadline, RelaxationSolver, RelaxedSolution, SolveBudget},
};
use num_traits::Float;

/// Clock checks happen once every `DEADLINE_CHECK_MASK + 1` pivots.
const DEADLINE_CHECK_MASK: usize = 0x3F;

/// Result of one LP solve.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LpOutcome<F> {
    pub objective: F,
    pub values: Vec<F>,
    pub iterations: usize,
}

fn pivot<F: Float>(tableau: &mut [Vec<F>], row: usize, column: usize) {
    let element = tableau[row][column];
    for value in tableau[row].iter_mut() {
        *value = *value / element;
    }
    let pivot_row = tableau[row].clone();
    for (i, other) in tableau.iter_mut().enumerate() {
        if i == row {
            continue;
        }
        let factor = other[column];
        if factor == F::zero() {
            continue;
        }
        for (value, &p) in other.iter_mut().zip(&pivot_row) {
            *value = *value - factor * p;
        }
    }
}

/// Maximizes `objective·x` over `rows` (each `(a, b)` meaning `a·x ≤ b`) and the unit box.
pub(crate) fn maximize_unit_box<F: Float>(
    objective: &[F],
    rows: &[(Vec<F>, F)],
    max_iterations: usize,
    deadline: &Deadline,
) -> Result<LpOutcome<F>, RelaxError> {
    let n = objective.len();
    let k = rows.len();
    let r = k + n;
    let rhs = n + r;
    let obj = r;

    let mut tableau = vec![vec![F::zero(); n + r + 1]; r + 1];
    for (i, (a, b)) in rows.iter().enumerate() {
        debug_assert_eq!(
            a.len(),
            n,
            "called `maximize_unit_box` with row {} of length {} for {} variables",
            i,
            a.len(),
            n
        );
        tableau[i][..n].copy_from_slice(a);
        tableau[i][n + i] = F::one();
        tableau[i][rhs] = *b;
    }
    for j in 0..n {
        let i = k + j;
        tableau[i][j] = F::one();
        tableau[i][n + i] = F::one();
        tableau[i][rhs] = F::one();
    }
    for (j, &c) in objective.iter().enumerate() {
        tableau[obj][j] = -c;
    }

    let mut basis: Vec<usize> = (n..n + r).collect();
    let tol = tolerance::<F>();
    let mut iterations = 0usize;

    loop {
        if iterations & DEADLINE_CHECK_MASK == 0 {
            deadline.check()?;
        }

        // Bland: lowest-index improving column.
        let Some(entering) = (0..n + r).find(|&j| tableau[obj][j] < -tol) else {
            break;
        };
        if iterations >= max_iterations {
            return Err(RelaxError::IterationLimit(max_iterations));
        }

        let mut leaving: Option<(usize, F)> = None;
        for i in 0..r {
            let a = tableau[i][entering];
            if a <= tol {
                continue;
            }
            let ratio = tableau[i][rhs] / a;
            leaving = match leaving {
                None => Some((i, ratio)),
                Some((best, best_ratio)) => {
                    let tied = (ratio - best_ratio).abs() <= tol;
                    if (!tied && ratio < best_ratio) || (tied && basis[i] < basis[best]) {
                        Some((i, ratio))
                    } else {
                        Some((best, best_ratio))
                    }
                }
            };
        }
        let Some((row, _)) = leaving else {
            return Err(RelaxError::Unbounded);
        };

        pivot(&mut tableau, row, entering);
        basis[row] = entering;
        iterations += 1;
    }

    let mut values = vec![F::zero(); n];
    for (i, &b) in basis.iter().enumerate() {
        if b < n {
            values[b] = tableau[i][rhs].max(F::zero()).min(F::one());
        }
    }

    Ok(LpOutcome {
        objective: tableau[obj][rhs],
        values,
        iterations,
    })
}

/// Collects the binding rows of `problem` in the form `maximize_unit_box` expects.
pub(crate) fn binding_rows<F: Float>(problem: &RelaxedProblem<F>) -> Vec<(Vec<F>, F)> {
    problem
        .constraints()
        .iter()
        .filter(|row| !row.is_redundant())
        .map(|row| (row.coefficients().to_vec(), row.rhs()))
        .collect()
}

/// LP backend. Always solves the continuous relaxation, whatever the
/// problem's declared domain, so its optimum bounds the binary one from above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplexSolver;

impl SimplexSolver {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl<F: Float> RelaxationSolver<F> for SimplexSolver {
    fn name(&self) -> &str {
        "SimplexSolver"
    }

    fn solve(&self, problem: &RelaxedProblem<F>, budget: &SolveBudget) -> Result<RelaxedSolution<F>, RelaxError> {
        problem.validate()?;
        let deadline = budget.start();
        let rows = binding_rows(problem);
        let outcome = maximize_unit_box(problem.objective(), &rows, budget.max_iterations, &deadline)?;
        Ok(RelaxedSolution {
            objective: outcome.objective,
            values: outcome.values,
            nodes: 1,
            iterations: outcome.iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::VariableDomain;
    use std::time::Duration;

    fn solve(problem: &RelaxedProblem<f64>) -> RelaxedSolution<f64> {
        SimplexSolver::new()
            .solve(problem, &SolveBudget::default())
            .expect("LP should solve")
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_fractional_knapsack_optimum() {
        let mut problem = RelaxedProblem::new(vec![6.0, 10.0, 12.0], VariableDomain::Continuous);
        problem.add_constraint(vec![1.0, 2.0, 3.0], 5.0).unwrap();
        let solution = solve(&problem);
        assert_close(solution.objective, 24.0);
        assert_close(solution.values[0], 1.0);
        assert_close(solution.values[1], 1.0);
        assert_close(solution.values[2], 2.0 / 3.0);
        assert!(problem.is_feasible(&solution.values, 1e-9));
    }

    #[test]
    fn test_two_variable_vertex() {
        let mut problem = RelaxedProblem::new(vec![3.0, 2.0], VariableDomain::Continuous);
        problem.add_constraint(vec![1.0, 1.0], 1.5).unwrap();
        let solution = solve(&problem);
        assert_close(solution.objective, 4.0);
        assert_close(solution.values[0], 1.0);
        assert_close(solution.values[1], 0.5);
    }

    #[test]
    fn test_unconstrained_takes_positive_coefficients() {
        let problem = RelaxedProblem::new(vec![1.0, -2.0, 3.0], VariableDomain::Continuous);
        let solution = solve(&problem);
        assert_close(solution.objective, 4.0);
        assert_eq!(solution.values, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_degenerate_zero_rhs() {
        let mut problem = RelaxedProblem::new(vec![1.0, 1.0], VariableDomain::Continuous);
        problem.add_constraint(vec![1.0, 1.0], 0.0).unwrap();
        let solution = solve(&problem);
        assert_close(solution.objective, 0.0);
    }

    #[test]
    fn test_infinite_rhs_row_is_ignored() {
        let mut problem = RelaxedProblem::new(vec![2.0, 2.0], VariableDomain::Continuous);
        problem.add_constraint(vec![5.0, 5.0], f64::INFINITY).unwrap();
        problem.add_constraint(vec![1.0, 1.0], 1.0).unwrap();
        assert_close(solve(&problem).objective, 2.0);
    }

    #[test]
    fn test_cardinality_row_limits_selection() {
        let mut problem = RelaxedProblem::new(vec![4.0, 3.0, 2.0], VariableDomain::Continuous);
        problem.add_constraint(vec![1.0, 1.0, 1.0], 10.0).unwrap();
        problem.add_constraint(vec![1.0, 1.0, 1.0], 1.5).unwrap();
        assert_close(solve(&problem).objective, 5.5);
    }

    #[test]
    fn test_iteration_limit_is_reported() {
        let mut problem = RelaxedProblem::new(vec![1.0], VariableDomain::Continuous);
        problem.add_constraint(vec![1.0], 0.5).unwrap();
        let budget = SolveBudget {
            max_iterations: 0,
            ..SolveBudget::default()
        };
        assert_eq!(
            SimplexSolver::new().solve(&problem, &budget),
            Err(RelaxError::IterationLimit(0))
        );
    }

    #[test]
    fn test_time_limit_is_reported() {
        let problem = RelaxedProblem::new(vec![1.0], VariableDomain::Continuous);
        let budget = SolveBudget::default().with_time_limit(Duration::ZERO);
        assert_eq!(
            SimplexSolver::new().solve(&problem, &budget),
            Err(RelaxError::TimeLimit(Duration::ZERO))
        );
    }

    #[test]
    fn test_negative_rhs_is_rejected() {
        let mut problem = RelaxedProblem::new(vec![1.0], VariableDomain::Continuous);
        problem.add_constraint(vec![1.0], -1.0).unwrap();
        assert_eq!(
            SimplexSolver::new().solve(&problem, &SolveBudget::default()),
            Err(RelaxError::NegativeRightHandSide(0))
        );
    }
}
