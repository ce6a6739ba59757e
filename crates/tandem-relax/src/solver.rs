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

use crate::{error::RelaxError, problem::RelaxedProblem};
use num_traits::Float;
use std::time::{Duration, Instant};

/// Work limits for a single relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveBudget {
    /// Wall-clock limit, `None` for unlimited.
    pub time_limit: Option<Duration>,
    /// Maximum branch-and-bound nodes (integer backends).
    pub max_nodes: usize,
    /// Maximum simplex pivots per LP solve.
    pub max_iterations: usize,
}

impl Default for SolveBudget {
    fn default() -> Self {
        Self {
            time_limit: None,
            max_nodes: 100_000,
            max_iterations: 10_000,
        }
    }
}

impl SolveBudget {
    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Starts the clock for this budget.
    #[inline]
    pub(crate) fn start(&self) -> Deadline {
        Deadline {
            at: self.time_limit.map(|limit| (Instant::now() + limit, limit)),
        }
    }
}

/// A started time budget.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Option<(Instant, Duration)>,
}

impl Deadline {
    /// Returns `RelaxError::TimeLimit` once the deadline has passed.
    #[inline]
    pub(crate) fn check(&self) -> Result<(), RelaxError> {
        match self.at {
            Some((at, limit)) if Instant::now() >= at => Err(RelaxError::TimeLimit(limit)),
            _ => Ok(()),
        }
    }
}

/// The optimum of a relaxed problem.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxedSolution<F> {
    pub objective: F,
    pub values: Vec<F>,
    /// Branch-and-bound nodes explored (1 for a plain LP).
    pub nodes: usize,
    /// Simplex pivots performed over all nodes.
    pub iterations: usize,
}

/// A numeric backend that maximizes a `RelaxedProblem`.
///
/// Any `Fn(&RelaxedProblem<F>, &SolveBudget) -> Result<RelaxedSolution<F>, RelaxError>`
/// is a `RelaxationSolver`, so a solve routine can be passed as a plain function.
pub trait RelaxationSolver<F: Float> {
    /// Returns the name of the backend.
    fn name(&self) -> &str {
        "RelaxationSolver"
    }

    /// Solves `problem` to optimality within `budget`.
    fn solve(&self, problem: &RelaxedProblem<F>, budget: &SolveBudget) -> Result<RelaxedSolution<F>, RelaxError>;
}

impl<F, S> RelaxationSolver<F> for S
where
    F: Float,
    S: Fn(&RelaxedProblem<F>, &SolveBudget) -> Result<RelaxedSolution<F>, RelaxError>,
{
    fn name(&self) -> &str {
        "FnRelaxationSolver"
    }

    #[inline]
    fn solve(&self, problem: &RelaxedProblem<F>, budget: &SolveBudget) -> Result<RelaxedSolution<F>, RelaxError> {
        self(problem, budget)
    }
}

impl<F: Float> std::fmt::Debug for dyn RelaxationSolver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RelaxationSolver({})", self.name())
    }
}

impl<F: Float> std::fmt::Display for dyn RelaxationSolver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RelaxationSolver({})", self.name())
    }
}

/// Numerical tolerance used by the backends. A reported optimum may fall
/// short of the true one by up to this amount.
#[inline]
pub fn tolerance<F: Float>() -> F {
    F::epsilon().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::VariableDomain;

    #[test]
    fn test_closure_is_a_solver() {
        let constant = |problem: &RelaxedProblem<f64>, _: &SolveBudget| -> Result<RelaxedSolution<f64>, RelaxError> {
            Ok(RelaxedSolution {
                objective: 7.0,
                values: vec![0.0; problem.num_variables()],
                nodes: 1,
                iterations: 0,
            })
        };
        let problem = RelaxedProblem::new(vec![1.0, 2.0], VariableDomain::Binary);
        let solution = constant.solve(&problem, &SolveBudget::default()).unwrap();
        assert_eq!(solution.objective, 7.0);
        assert_eq!(solution.values.len(), 2);

        let boxed: Box<dyn RelaxationSolver<f64>> = Box::new(constant);
        assert_eq!(format!("{}", boxed), "RelaxationSolver(FnRelaxationSolver)");
    }

    #[test]
    fn test_zero_time_limit_expires_immediately() {
        let deadline = SolveBudget::default().with_time_limit(Duration::ZERO).start();
        assert_eq!(deadline.check(), Err(RelaxError::TimeLimit(Duration::ZERO)));
        assert_eq!(SolveBudget::default().start().check(), Ok(()));
    }
}
