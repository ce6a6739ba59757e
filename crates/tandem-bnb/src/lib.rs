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

//! Tandem-BnB: branch-and-bound for tandem station placement
//!
//! Places a subset of heterogeneous relay stations on candidate points of a
//! line between two gateways so that the stations form a connected relay
//! chain and the length of the segment left uncovered is minimal, subject to
//! a cost budget and a queueing delay limit.
//!
//! Core flow
//! - Provide a `tandem_model::model::Model`.
//! - Resolve a `config::SearchConfig` (method, bound, tolerance, place-all).
//! - Pick a `bound::strategy::BoundStrategy`, usually via `bound::strategy_for`.
//! - Optionally compose monitors (log, time limit, record limit, interrupt).
//! - Run `bnb::BnbSolver` and read the `incumbent::Schedule` off the outcome.
//! - Persist it with `report::SolutionReport` or draw the tree with `render`.
//!
//! Design highlights
//! - The tree is an arena of nodes addressed by `tree::NodeKey`; each node
//!   owns its assignment matrix.
//! - Feasibility checks run before the bound, so the relaxation is only
//!   solved for children that could be part of a solution.
//! - Bounds are admissible: branch-and-bound and brute force report the same
//!   optimum.
//! - A failed relaxation falls back to the trivial estimate and never aborts
//!   the search.
//!
//! Module map
//! - `bnb`: the solver engine and session orchestration.
//! - `bound`: lower-bound strategies and the estimate oracle.
//! - `config`: search configuration from TOML or the instance JSON.
//! - `coverage`: noncoverage arithmetic.
//! - `feasibility`: per-child checks and the up-front connectivity check.
//! - `incumbent`: record schedule, exact and tolerance modes.
//! - `monitor`: tree-search monitors.
//! - `queueing`: M/M/1 delay accumulation.
//! - `render`: Graphviz export of the tree.
//! - `report`: the persisted `solution.json` layout.
//! - `result`: solver outcomes with termination reasons.
//! - `stack`: the deferred-node stack.
//! - `stats`: lightweight counters/timing.
//! - `tree`: nodes, decisions and the assignment matrix.

pub mod bnb;
pub mod bound;
pub mod config;
pub mod coverage;
pub mod error;
pub mod feasibility;
pub mod incumbent;
pub mod monitor;
pub mod queueing;
pub mod render;
pub mod report;
pub mod result;
pub mod stack;
pub mod stats;
pub mod tree;

pub use bnb::BnbSolver;
pub use config::SearchConfig;
pub use error::{ReportError, SearchError};
pub use result::{BnbSolverOutcome, TerminationReason};
