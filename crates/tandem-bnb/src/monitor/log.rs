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

use crate::{
    incumbent::IncumbentRecord,
    monitor::tree_search_monitor::TreeSearchMonitor,
    stats::BnbSolverStatistics,
    tree::TreeNode,
};
use std::time::{Duration, Instant};
use tandem_model::model::Model;

/// Periodic progress lines through `tracing`.
///
/// The clock is read only on steps whose counter has no bits in common with
/// `clock_check_mask`, so a mask of `2^k − 1` checks every `2^k` steps.
#[derive(Debug, Clone)]
pub struct LogMonitor {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_noncoverage: Option<f64>,
}

impl LogMonitor {
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            clock_check_mask,
            best_noncoverage: None,
        }
    }

    fn log_line(&mut self, node: &TreeNode, stats: &BnbSolverStatistics) {
        let now = Instant::now();
        let best = match self.best_noncoverage {
            Some(best) => format!("{}", best),
            None => "-".to_string(),
        };
        tracing::info!(
            "{:<9} | {:<12} | {:<6} | {:<12} | {:<10} | {:<10} | {:<10}",
            format!("{:.1}s", now.duration_since(self.start_time).as_secs_f32()),
            stats.nodes_created,
            node.depth(),
            best,
            stats.backtracks,
            stats.prunings_infeasible,
            stats.prunings_bound
        );
        self.last_log_time = now;
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl std::fmt::Display for LogMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogMonitor(log_interval: {}s, clock_check_mask: {})",
            self.log_interval.as_secs(),
            self.clock_check_mask
        )
    }
}

impl TreeSearchMonitor for LogMonitor {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter_search(&mut self, model: &Model, _statistics: &BnbSolverStatistics) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_noncoverage = None;
        tracing::info!(
            placements = model.num_placements(),
            stations = model.num_stations(),
            complexity = %model.complexity(),
            "search started"
        );
        tracing::info!(
            "{:<9} | {:<12} | {:<6} | {:<12} | {:<10} | {:<10} | {:<10}",
            "Elapsed",
            "Nodes",
            "Depth",
            "Best",
            "Backtracks",
            "Infeasible",
            "Bounded"
        );
    }

    fn on_step(&mut self, node: &TreeNode, statistics: &BnbSolverStatistics) {
        if (statistics.steps & self.clock_check_mask) == 0 && self.last_log_time.elapsed() >= self.log_interval {
            self.log_line(node, statistics);
        }
    }

    fn on_record(&mut self, record: &IncumbentRecord, _statistics: &BnbSolverStatistics) {
        if self.best_noncoverage.is_none_or(|best| record.noncoverage < best) {
            self.best_noncoverage = Some(record.noncoverage);
        }
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        tracing::info!(
            nodes = statistics.nodes_created,
            records = statistics.records_accepted,
            elapsed = ?self.start_time.elapsed(),
            "search finished"
        );
    }
}
