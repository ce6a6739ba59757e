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

//! LP-based branch-and-bound for binary problems.
//!
//! Depth-first over variable fixings. Each node substitutes its fixed
//! variables into the rows, solves the remaining LP over the unit box and
//! branches on the most fractional variable, exploring `x = 1` first.

use crate::{
    error::RelaxError,
    problem::{RelaxedProblem, VariableDomain},
    simplex::{binding_rows, maximize_unit_box, SimplexSolver},
    solver::{tolerance, RelaxationSolver, RelaxedSolution, SolveBudget},
};
use num_traits::Float;
use std::cmp::Ordering;

/// ILP backend.
///
/// Problems declared `Continuous` are answered by the root LP alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryBranchAndBound;

impl BinaryBranchAndBound {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl<F: Float> RelaxationSolver<F> for BinaryBranchAndBound {
    fn name(&self) -> &str {
        "BinaryBranchAndBound"
    }

    fn solve(&self, problem: &RelaxedProblem<F>, budget: &SolveBudget) -> Result<RelaxedSolution<F>, RelaxError> {
        if problem.domain() == VariableDomain::Continuous {
            return SimplexSolver::new().solve(problem, budget);
        }
        problem.validate()?;

        let deadline = budget.start();
        let n = problem.num_variables();
        let objective = problem.objective();
        let rows = binding_rows(problem);
        let tol = tolerance::<F>();

        // x = 0 is feasible because every rhs is non-negative.
        let mut best_value = F::zero();
        let mut best_values = vec![F::zero(); n];
        let mut nodes = 0usize;
        let mut iterations = 0usize;

        let mut stack: Vec<Vec<Option<bool>>> = vec![vec![None; n]];
        while let Some(fixing) = stack.pop() {
            if nodes >= budget.max_nodes {
                return Err(RelaxError::NodeLimit(budget.max_nodes));
            }
            nodes += 1;
            deadline.check()?;

            let free: Vec<usize> = (0..n).filter(|&j| fixing[j].is_none()).collect();
            let mut constant = F::zero();
            let mut residual: Vec<F> = rows.iter().map(|(_, b)| *b).collect();
            for j in (0..n).filter(|&j| fixing[j] == Some(true)) {
                constant = constant + objective[j];
                for (r, (a, _)) in residual.iter_mut().zip(&rows) {
                    *r = *r - a[j];
                }
            }
            if residual.iter().any(|&r| r < -tol) {
                continue;
            }

            let reduced_rows: Vec<(Vec<F>, F)> = rows
                .iter()
                .zip(&residual)
                .map(|((a, _), &r)| (free.iter().map(|&j| a[j]).collect(), r.max(F::zero())))
                .collect();
            let reduced_objective: Vec<F> = free.iter().map(|&j| objective[j]).collect();

            let lp = maximize_unit_box(&reduced_objective, &reduced_rows, budget.max_iterations, &deadline)?;
            iterations += lp.iterations;
            if constant + lp.objective <= best_value + tol {
                continue;
            }

            let most_fractional = free
                .iter()
                .zip(&lp.values)
                .map(|(&j, &v)| (j, (v - v.round()).abs()))
                .filter(|&(_, frac)| frac > tol)
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

            match most_fractional {
                None => {
                    let mut x: Vec<F> = fixing
                        .iter()
                        .map(|f| if *f == Some(true) { F::one() } else { F::zero() })
                        .collect();
                    for (&j, &v) in free.iter().zip(&lp.values) {
                        x[j] = v.round();
                    }
                    let value = problem.evaluate(&x);
                    if value > best_value {
                        best_value = value;
                        best_values = x;
                    }
                }
                Some((j, _)) => {
                    let mut down = fixing.clone();
                    down[j] = Some(false);
                    let mut up = fixing;
                    up[j] = Some(true);
                    stack.push(down);
                    stack.push(up);
                }
            }
        }

        Ok(RelaxedSolution {
            objective: best_value,
            values: best_values,
            nodes,
            iterations,
        })
    }
}
