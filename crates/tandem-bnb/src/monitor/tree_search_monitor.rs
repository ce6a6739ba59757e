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
    feasibility::Infeasibility,
    incumbent::IncumbentRecord,
    stats::BnbSolverStatistics,
    tree::TreeNode,
};
use tandem_model::{
    index::{PlacementIndex, StationIndex},
    model::Model,
};

/// What a monitor asks the search loop to do next.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SearchCommand {
    #[default]
    Continue,
    /// Stop the search, keeping every record found so far.
    Terminate(String),
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// Why a node was closed without descending into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PruneReason {
    /// The assign child failed a feasibility check.
    Infeasible(Infeasibility),
    /// The node's estimate exceeded the schedule threshold.
    BoundDominated,
}

impl std::fmt::Display for PruneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneReason::Infeasible(reason) => write!(f, "Infeasible: {}", reason),
            PruneReason::BoundDominated => write!(f, "BoundDominated"),
        }
    }
}

/// Observer of the branch-and-bound loop.
///
/// The solver calls `search_command` at the top of every iteration; all other
/// callbacks are notifications. Keep handlers cheap, they run on the hot path.
pub trait TreeSearchMonitor {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Called once before the root is processed.
    fn on_enter_search(&mut self, model: &Model, statistics: &BnbSolverStatistics);

    /// Called once after the loop ends.
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics);

    /// Called at the start of every iteration with the current node.
    fn on_step(&mut self, node: &TreeNode, statistics: &BnbSolverStatistics);

    /// Asked once per iteration whether to go on.
    fn search_command(&mut self, _node: &TreeNode, _statistics: &BnbSolverStatistics) -> SearchCommand {
        SearchCommand::Continue
    }

    /// Called after `parent` was split on `(placement, station)`.
    fn on_branch(
        &mut self,
        _parent: &TreeNode,
        _placement: PlacementIndex,
        _station: StationIndex,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    /// Called after the estimate of an assign child was computed.
    fn on_bound_computed(&mut self, _node: &TreeNode, _estimate: f64, _statistics: &BnbSolverStatistics) {}

    /// Called when a node is closed by feasibility or by the bound.
    fn on_prune(&mut self, _node: &TreeNode, _reason: PruneReason, _statistics: &BnbSolverStatistics) {}

    /// Called when the search moves into an assign child.
    fn on_descend(&mut self, _node: &TreeNode, _statistics: &BnbSolverStatistics) {}

    /// Called when a deferred node is resumed.
    fn on_backtrack(&mut self, _node: &TreeNode, _statistics: &BnbSolverStatistics) {}

    /// Called when the schedule accepts a record.
    fn on_record(&mut self, _record: &IncumbentRecord, _statistics: &BnbSolverStatistics) {}
}

impl<'a> std::fmt::Debug for dyn TreeSearchMonitor + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl<'a> std::fmt::Display for dyn TreeSearchMonitor + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl<M> TreeSearchMonitor for &mut M
where
    M: TreeSearchMonitor + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_enter_search(&mut self, model: &Model, statistics: &BnbSolverStatistics) {
        (**self).on_enter_search(model, statistics)
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        (**self).on_exit_search(statistics)
    }

    fn on_step(&mut self, node: &TreeNode, statistics: &BnbSolverStatistics) {
        (**self).on_step(node, statistics)
    }

    fn search_command(&mut self, node: &TreeNode, statistics: &BnbSolverStatistics) -> SearchCommand {
        (**self).search_command(node, statistics)
    }

    fn on_branch(
        &mut self,
        parent: &TreeNode,
        placement: PlacementIndex,
        station: StationIndex,
        statistics: &BnbSolverStatistics,
    ) {
        (**self).on_branch(parent, placement, station, statistics)
    }

    fn on_bound_computed(&mut self, node: &TreeNode, estimate: f64, statistics: &BnbSolverStatistics) {
        (**self).on_bound_computed(node, estimate, statistics)
    }

    fn on_prune(&mut self, node: &TreeNode, reason: PruneReason, statistics: &BnbSolverStatistics) {
        (**self).on_prune(node, reason, statistics)
    }

    fn on_descend(&mut self, node: &TreeNode, statistics: &BnbSolverStatistics) {
        (**self).on_descend(node, statistics)
    }

    fn on_backtrack(&mut self, node: &TreeNode, statistics: &BnbSolverStatistics) {
        (**self).on_backtrack(node, statistics)
    }

    fn on_record(&mut self, record: &IncumbentRecord, statistics: &BnbSolverStatistics) {
        (**self).on_record(record, statistics)
    }
}
