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

//! Fan-out monitor.
//!
//! `CompositeMonitor` forwards every event to its children in insertion
//! order. `search_command` short-circuits on the first `Terminate`, so put
//! the strictest stop condition first.

use crate::{
    incumbent::IncumbentRecord,
    monitor::tree_search_monitor::{PruneReason, SearchCommand, TreeSearchMonitor},
    stats::BnbSolverStatistics,
    tree::TreeNode,
};
use tandem_model::{
    index::{PlacementIndex, StationIndex},
    model::Model,
};

/// A monitor that aggregates several monitors.
#[derive(Default)]
pub struct CompositeMonitor<'a> {
    monitors: Vec<Box<dyn TreeSearchMonitor + 'a>>,
}

impl<'a> CompositeMonitor<'a> {
    #[inline]
    pub fn new() -> Self {
        Self { monitors: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    /// Appends a monitor.
    #[inline]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    #[inline]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn TreeSearchMonitor + 'a>) {
        self.monitors.push(monitor);
    }

    #[inline]
    pub fn monitors(&self) -> &[Box<dyn TreeSearchMonitor + 'a>] {
        &self.monitors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a> FromIterator<Box<dyn TreeSearchMonitor + 'a>> for CompositeMonitor<'a> {
    fn from_iter<I: IntoIterator<Item = Box<dyn TreeSearchMonitor + 'a>>>(iter: I) -> Self {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for CompositeMonitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.monitors.iter()).finish()
    }
}

impl TreeSearchMonitor for CompositeMonitor<'_> {
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn on_enter_search(&mut self, model: &Model, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(model, statistics);
        }
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(statistics);
        }
    }

    fn on_step(&mut self, node: &TreeNode, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_step(node, statistics);
        }
    }

    fn search_command(&mut self, node: &TreeNode, statistics: &BnbSolverStatistics) -> SearchCommand {
        for monitor in &mut self.monitors {
            if let SearchCommand::Terminate(reason) = monitor.search_command(node, statistics) {
                return SearchCommand::Terminate(reason);
            }
        }
        SearchCommand::Continue
    }

    fn on_branch(
        &mut self,
        parent: &TreeNode,
        placement: PlacementIndex,
        station: StationIndex,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_branch(parent, placement, station, statistics);
        }
    }

    fn on_bound_computed(&mut self, node: &TreeNode, estimate: f64, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_bound_computed(node, estimate, statistics);
        }
    }

    fn on_prune(&mut self, node: &TreeNode, reason: PruneReason, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_prune(node, reason, statistics);
        }
    }

    fn on_descend(&mut self, node: &TreeNode, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_descend(node, statistics);
        }
    }

    fn on_backtrack(&mut self, node: &TreeNode, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_backtrack(node, statistics);
        }
    }

    fn on_record(&mut self, record: &IncumbentRecord, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_record(record, statistics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{monitor::no_op::NoOpMonitor, tree::SearchTree};
    use tandem_model::model::ModelBuilder;

    struct StopAfter {
        remaining: u32,
    }

    impl TreeSearchMonitor for StopAfter {
        fn name(&self) -> &str {
            "StopAfter"
        }

        fn on_enter_search(&mut self, _model: &Model, _statistics: &BnbSolverStatistics) {}

        fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {}

        fn on_step(&mut self, _node: &TreeNode, _statistics: &BnbSolverStatistics) {}

        fn search_command(&mut self, _node: &TreeNode, _statistics: &BnbSolverStatistics) -> SearchCommand {
            if self.remaining == 0 {
                SearchCommand::Terminate("done".to_string())
            } else {
                self.remaining -= 1;
                SearchCommand::Continue
            }
        }
    }

    #[test]
    fn test_first_terminate_wins() {
        let model = ModelBuilder::new(1, 1).build().expect("model should be valid");
        let tree = SearchTree::initialize(&model);
        let stats = BnbSolverStatistics::default();

        let mut composite = CompositeMonitor::new();
        composite.add_monitor(NoOpMonitor::new());
        composite.add_monitor(StopAfter { remaining: 1 });
        assert_eq!(composite.len(), 2);

        let root = tree.node(tree.root());
        assert_eq!(composite.search_command(root, &stats), SearchCommand::Continue);
        assert_eq!(
            composite.search_command(root, &stats),
            SearchCommand::Terminate("done".to_string())
        );
    }
}
