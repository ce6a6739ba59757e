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
    monitor::tree_search_monitor::{SearchCommand, TreeSearchMonitor},
    stats::BnbSolverStatistics,
    tree::TreeNode,
};
use tandem_model::model::Model;

/// Stops the search once `record_limit` records have been accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLimitMonitor {
    record_limit: u64,
}

impl RecordLimitMonitor {
    pub fn new(record_limit: u64) -> Self {
        Self { record_limit }
    }
}

impl TreeSearchMonitor for RecordLimitMonitor {
    fn name(&self) -> &str {
        "RecordLimitMonitor"
    }

    fn on_enter_search(&mut self, _model: &Model, _statistics: &BnbSolverStatistics) {}

    fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {}

    fn on_step(&mut self, _node: &TreeNode, _statistics: &BnbSolverStatistics) {}

    fn search_command(&mut self, _node: &TreeNode, statistics: &BnbSolverStatistics) -> SearchCommand {
        if statistics.records_accepted >= self.record_limit {
            SearchCommand::Terminate("Record limit reached".to_string())
        } else {
            SearchCommand::Continue
        }
    }
}
