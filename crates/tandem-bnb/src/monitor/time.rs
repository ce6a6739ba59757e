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

//! Time limit monitor.
//!
//! `TimeLimitMonitor` resets its clock when the search starts and asks for
//! termination once the limit has passed. The clock is only read on masked
//! steps to keep the per-step overhead negligible.

use crate::{
    monitor::tree_search_monitor::{SearchCommand, TreeSearchMonitor},
    stats::BnbSolverStatistics,
    tree::TreeNode,
};
use std::time::{Duration, Instant};
use tandem_model::model::Model;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitMonitor {
    start_time: Instant,
    time_limit: Duration,
    clock_check_mask: u64,
}

impl TimeLimitMonitor {
    /// Checks the clock every 1024 steps; a step of this search solves a
    /// relaxation, so it is far slower than a plain tree step.
    const DEFAULT_STEP_CLOCK_CHECK_MASK: u64 = 0x3FF;

    pub fn new(time_limit: Duration) -> Self {
        Self::with_clock_check_mask(time_limit, Self::DEFAULT_STEP_CLOCK_CHECK_MASK)
    }

    pub fn with_clock_check_mask(time_limit: Duration, mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            time_limit,
            clock_check_mask: mask,
        }
    }

    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

impl TreeSearchMonitor for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_search(&mut self, _model: &Model, _statistics: &BnbSolverStatistics) {
        self.start_time = Instant::now();
    }

    fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {}

    fn on_step(&mut self, _node: &TreeNode, _statistics: &BnbSolverStatistics) {}

    fn search_command(&mut self, _node: &TreeNode, statistics: &BnbSolverStatistics) -> SearchCommand {
        if (statistics.steps & self.clock_check_mask) == 0 && self.start_time.elapsed() >= self.time_limit {
            SearchCommand::Terminate(format!("Time limit of {:?} reached", self.time_limit))
        } else {
            SearchCommand::Continue
        }
    }
}
