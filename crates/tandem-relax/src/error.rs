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

use std::time::Duration;
use thiserror::Error;

/// Errors reported by the relaxation backends.
///
/// Every variant means "no usable bound"; callers fall back to a weaker one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelaxError {
    #[error("constraint {constraint} has {found} coefficients but the problem has {expected} variables")]
    DimensionMismatch {
        constraint: usize,
        expected: usize,
        found: usize,
    },
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    /// The all-zero point violates the constraint.
    #[error("constraint {0} has a negative right-hand side")]
    NegativeRightHandSide(usize),
    #[error("backend `{backend}` cannot solve this problem: {reason}")]
    UnsupportedShape {
        backend: &'static str,
        reason: &'static str,
    },
    #[error("the relaxation is unbounded")]
    Unbounded,
    #[error("simplex iteration limit of {0} reached")]
    IterationLimit(usize),
    #[error("branch-and-bound node limit of {0} reached")]
    NodeLimit(usize),
    #[error("time limit of {0:?} exceeded")]
    TimeLimit(Duration),
}
