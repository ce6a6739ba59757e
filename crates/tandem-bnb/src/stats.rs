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

/// Statistics collected during one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BnbSolverStatistics {
    /// Iterations of the main loop.
    pub steps: u64,
    /// Tree nodes created, the root included.
    pub nodes_created: u64,
    /// Nodes branched on.
    pub expansions: u64,
    /// Deferred nodes resumed from the stack.
    pub backtracks: u64,
    /// The deepest level reached in the tree.
    pub max_depth: u64,
    /// Assign children rejected by the feasibility checks.
    pub prunings_infeasible: u64,
    /// Nodes closed because their estimate exceeded the threshold.
    pub prunings_bound: u64,
    /// Calls to the bound strategy.
    pub bound_evaluations: u64,
    /// Bound solves that failed and fell back to the trivial estimate.
    pub bound_fallbacks: u64,
    /// Records appended to the schedule, the trivial one excluded.
    pub records_accepted: u64,
    /// Total time spent in the solver.
    pub time_total: Duration,
}

impl BnbSolverStatistics {
    #[inline]
    pub fn on_step(&mut self) {
        self.steps = self.steps.saturating_add(1);
    }

    #[inline]
    pub fn on_nodes_created(&mut self, count: u64) {
        self.nodes_created = self.nodes_created.saturating_add(count);
    }

    #[inline]
    pub fn on_expansion(&mut self) {
        self.expansions = self.expansions.saturating_add(1);
    }

    #[inline]
    pub fn on_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    #[inline]
    pub fn on_depth_update(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_bound_evaluation(&mut self) {
        self.bound_evaluations = self.bound_evaluations.saturating_add(1);
    }

    #[inline]
    pub fn on_bound_fallback(&mut self) {
        self.bound_fallbacks = self.bound_fallbacks.saturating_add(1);
    }

    #[inline]
    pub fn on_record_accepted(&mut self) {
        self.records_accepted = self.records_accepted.saturating_add(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }
}

impl std::fmt::Display for BnbSolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Tandem-BnB Solver Statistics:")?;
        writeln!(f, "  Steps:                {}", self.steps)?;
        writeln!(f, "  Nodes created:        {}", self.nodes_created)?;
        writeln!(f, "  Expansions:           {}", self.expansions)?;
        writeln!(f, "  Backtracks:           {}", self.backtracks)?;
        writeln!(f, "  Max depth reached:    {}", self.max_depth)?;
        writeln!(f, "  Prunings (infeasible):{}", self.prunings_infeasible)?;
        writeln!(f, "  Prunings (bound):     {}", self.prunings_bound)?;
        writeln!(f, "  Bound evaluations:    {}", self.bound_evaluations)?;
        writeln!(f, "  Bound fallbacks:      {}", self.bound_fallbacks)?;
        writeln!(f, "  Records accepted:     {}", self.records_accepted)?;
        writeln!(f, "  Total time:           {:.2?}", self.time_total)?;
        Ok(())
    }
}
