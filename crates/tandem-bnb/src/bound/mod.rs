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

//! Lower bounds on the noncoverage below a node.
//!
//! Submodules:
//! - `strategy`: the `BoundStrategy` trait and the `BoundQuery` it answers.
//! - `relaxation`: strategies backed by a numeric relaxation (ILP, knapsack, LP).
//! - `coverage_sum`: a solver-free strategy for the place-all mode.
//! - `trivial`: no tightening at all, used by brute force.
//! - `oracle`: turns a strategy's answer into a node estimate and absorbs
//!   solver failures.

pub mod coverage_sum;
pub mod oracle;
pub mod relaxation;
pub mod strategy;
pub mod trivial;

use crate::config::{BoundMethod, SearchConfig, SearchMethod};
use coverage_sum::CoverageSumBound;
use relaxation::RelaxationBound;
use strategy::BoundStrategy;
use trivial::TrivialBound;

/// Returns the strategy a configuration asks for.
///
/// Brute force never consults a bound; the place-all mode uses
/// `CoverageSumBound`; otherwise the configured relaxation is used with the
/// configured solver budget.
pub fn strategy_for(config: &SearchConfig) -> Box<dyn BoundStrategy> {
    if config.method == SearchMethod::BruteForce {
        return Box::new(TrivialBound::new());
    }
    if config.place_all_stations {
        return Box::new(CoverageSumBound::new());
    }
    match config.bound_method {
        BoundMethod::Ilp => Box::new(RelaxationBound::ilp(config.solver_budget)),
        BoundMethod::Knapsack => Box::new(RelaxationBound::knapsack(config.solver_budget)),
        BoundMethod::Lp => Box::new(RelaxationBound::lp(config.solver_budget)),
    }
}
