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

//! # Tandem Relax
//!
//! **Numeric backends for the coverage bound of the tandem placement search.**
//!
//! The bound needs the best covered length a cost-limited subset of the
//! still-vacant stations can contribute. That is a small selection problem,
//! `maximize c·x  s.t.  A x ≤ b`, solved here in one of three ways:
//!
//! * **`simplex`**: `SimplexSolver`, the LP relaxation over `x ∈ [0, 1]`.
//! * **`binary`**: `BinaryBranchAndBound`, the exact binary optimum by LP-based branch-and-bound.
//! * **`knapsack`**: `KnapsackSolver`, the exact binary optimum of a single-row problem.
//!
//! All three implement `RelaxationSolver`, as does any closure with the
//! matching signature. Every backend honours a `SolveBudget` and reports a
//! `RelaxError` rather than returning a truncated answer, so a caller that
//! needs an upper bound can always fall back to a weaker one.

pub mod binary;
pub mod error;
pub mod knapsack;
pub mod problem;
pub mod simplex;
pub mod solver;

pub use binary::BinaryBranchAndBound;
pub use error::RelaxError;
pub use knapsack::KnapsackSolver;
pub use problem::{LinearConstraint, RelaxedProblem, VariableDomain};
pub use simplex::SimplexSolver;
pub use solver::{RelaxationSolver, RelaxedSolution, SolveBudget, tolerance};
