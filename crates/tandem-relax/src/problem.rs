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

use crate::error::RelaxError;
use num_traits::Float;

/// Domain shared by every variable of a relaxed problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableDomain {
    /// `x ∈ {0, 1}`.
    Binary,
    /// `x ∈ [0, 1]`.
    Continuous,
}

impl std::fmt::Display for VariableDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableDomain::Binary => write!(f, "Binary"),
            VariableDomain::Continuous => write!(f, "Continuous"),
        }
    }
}

/// A single `a·x ≤ b` row.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint<F> {
    coefficients: Vec<F>,
    rhs: F,
}

impl<F: Float> LinearConstraint<F> {
    #[inline]
    pub fn coefficients(&self) -> &[F] {
        &self.coefficients
    }

    #[inline]
    pub fn rhs(&self) -> F {
        self.rhs
    }

    /// A row with an infinite right-hand side never binds.
    #[inline]
    pub fn is_redundant(&self) -> bool {
        self.rhs == F::infinity()
    }

    #[inline]
    pub fn activity(&self, x: &[F]) -> F {
        self.coefficients
            .iter()
            .zip(x)
            .fold(F::zero(), |acc, (&a, &v)| acc + a * v)
    }
}

/// `maximize c·x  s.t.  A x ≤ b,  x ∈ domain^n`.
///
/// # Examples
///
/// ```rust
/// use tandem_relax::problem::{RelaxedProblem, VariableDomain};
///
/// let mut problem = RelaxedProblem::new(vec![6.0, 10.0, 12.0], VariableDomain::Binary);
/// problem.add_constraint(vec![1.0, 2.0, 3.0], 5.0).unwrap();
/// assert_eq!(problem.num_variables(), 3);
/// assert_eq!(problem.num_constraints(), 1);
/// assert_eq!(problem.evaluate(&[0.0, 1.0, 1.0]), 22.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxedProblem<F> {
    objective: Vec<F>,
    constraints: Vec<LinearConstraint<F>>,
    domain: VariableDomain,
}

impl<F: Float> RelaxedProblem<F> {
    pub fn new(objective: Vec<F>, domain: VariableDomain) -> Self {
        Self {
            objective,
            constraints: Vec::new(),
            domain,
        }
    }

    /// Appends the row `coefficients·x ≤ rhs`.
    ///
    /// # Errors
    ///
    /// Returns `RelaxError::DimensionMismatch` if the row length differs from
    /// the number of variables.
    pub fn add_constraint(&mut self, coefficients: Vec<F>, rhs: F) -> Result<&mut Self, RelaxError> {
        if coefficients.len() != self.objective.len() {
            return Err(RelaxError::DimensionMismatch {
                constraint: self.constraints.len(),
                expected: self.objective.len(),
                found: coefficients.len(),
            });
        }
        self.constraints.push(LinearConstraint { coefficients, rhs });
        Ok(self)
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    #[inline]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn objective(&self) -> &[F] {
        &self.objective
    }

    #[inline]
    pub fn constraints(&self) -> &[LinearConstraint<F>] {
        &self.constraints
    }

    #[inline]
    pub fn domain(&self) -> VariableDomain {
        self.domain
    }

    /// Checks that every coefficient is finite and that `x = 0` is feasible.
    pub fn validate(&self) -> Result<(), RelaxError> {
        if self.objective.iter().any(|c| !c.is_finite()) {
            return Err(RelaxError::NonFinite("objective"));
        }
        for (i, row) in self.constraints.iter().enumerate() {
            if row.coefficients.iter().any(|a| !a.is_finite()) {
                return Err(RelaxError::NonFinite("constraint coefficients"));
            }
            if row.rhs.is_nan() {
                return Err(RelaxError::NonFinite("right-hand side"));
            }
            if row.rhs < F::zero() {
                return Err(RelaxError::NegativeRightHandSide(i));
            }
        }
        Ok(())
    }

    /// Returns `c·x`.
    #[inline]
    pub fn evaluate(&self, x: &[F]) -> F {
        self.objective
            .iter()
            .zip(x)
            .fold(F::zero(), |acc, (&c, &v)| acc + c * v)
    }

    /// Returns `true` if `x` satisfies every row and the variable domain within `tol`.
    pub fn is_feasible(&self, x: &[F], tol: F) -> bool {
        if x.len() != self.num_variables() {
            return false;
        }
        let in_domain = x.iter().all(|&v| match self.domain {
            VariableDomain::Binary => v.abs() <= tol || (v - F::one()).abs() <= tol,
            VariableDomain::Continuous => v >= -tol && v <= F::one() + tol,
        });
        in_domain
            && self
                .constraints
                .iter()
                .all(|row| row.is_redundant() || row.activity(x) <= row.rhs + tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mut problem = RelaxedProblem::new(vec![1.0, 2.0], VariableDomain::Binary);
        let err = problem.add_constraint(vec![1.0], 1.0).unwrap_err();
        assert_eq!(
            err,
            RelaxError::DimensionMismatch {
                constraint: 0,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_validate_rejects_negative_rhs_and_nan() {
        let mut problem = RelaxedProblem::new(vec![1.0], VariableDomain::Continuous);
        problem.add_constraint(vec![1.0], 2.0).unwrap();
        problem.add_constraint(vec![1.0], -0.5).unwrap();
        assert_eq!(problem.validate(), Err(RelaxError::NegativeRightHandSide(1)));

        let mut problem = RelaxedProblem::new(vec![f64::NAN], VariableDomain::Continuous);
        assert_eq!(problem.validate(), Err(RelaxError::NonFinite("objective")));
        problem = RelaxedProblem::new(vec![1.0], VariableDomain::Continuous);
        problem.add_constraint(vec![1.0], f64::INFINITY).unwrap();
        assert_eq!(problem.validate(), Ok(()));
        assert!(problem.constraints()[0].is_redundant());
    }

    #[test]
    fn test_feasibility_respects_domain() {
        let mut problem = RelaxedProblem::new(vec![1.0, 1.0], VariableDomain::Binary);
        problem.add_constraint(vec![1.0, 1.0], 1.0).unwrap();
        assert!(problem.is_feasible(&[1.0, 0.0], 1e-9));
        assert!(!problem.is_feasible(&[1.0, 1.0], 1e-9));
        assert!(!problem.is_feasible(&[0.5, 0.5], 1e-9));

        let mut relaxed = problem.clone();
        relaxed.domain = VariableDomain::Continuous;
        assert!(relaxed.is_feasible(&[0.5, 0.5], 1e-9));
    }
}
