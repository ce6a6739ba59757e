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
    incumbent::{IncumbentRecord, Schedule},
    stats::BnbSolverStatistics,
    tree::SearchTree,
};

/// Why the search loop ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// Every node was closed; the best record is optimal.
    SearchExhausted,
    /// A monitor stopped the search; the records found so far are kept.
    Aborted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::SearchExhausted => write!(f, "Search exhausted"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

/// Result of the solver after termination.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome {
    schedule: Schedule,
    tree: SearchTree,
    termination_reason: TerminationReason,
    statistics: BnbSolverStatistics,
}

impl BnbSolverOutcome {
    #[inline]
    pub fn exhausted(schedule: Schedule, tree: SearchTree, statistics: BnbSolverStatistics) -> Self {
        Self {
            schedule,
            tree,
            termination_reason: TerminationReason::SearchExhausted,
            statistics,
        }
    }

    #[inline]
    pub fn aborted<R>(schedule: Schedule, tree: SearchTree, reason: R, statistics: BnbSolverStatistics) -> Self
    where
        R: Into<String>,
    {
        Self {
            schedule,
            tree,
            termination_reason: TerminationReason::Aborted(reason.into()),
            statistics,
        }
    }

    /// Returns the schedule of accepted records.
    #[inline]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Returns the tree as it stood when the search ended.
    #[inline]
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics {
        &self.statistics
    }

    /// Returns `true` if the search closed every node.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.termination_reason == TerminationReason::SearchExhausted
    }

    /// The best solution found, the trivial record if nothing better was.
    #[inline]
    pub fn best_record(&self) -> Option<&IncumbentRecord> {
        self.schedule.best_record()
    }

    /// Splits the outcome into its parts.
    #[inline]
    pub fn into_parts(self) -> (Schedule, SearchTree, TerminationReason, BnbSolverStatistics) {
        (self.schedule, self.tree, self.termination_reason, self.statistics)
    }
}

impl std::fmt::Display for BnbSolverOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.termination_reason)?;
        match self.best_record() {
            Some(record) => writeln!(f, "Best: {}", record)?,
            None => writeln!(f, "Best: none")?,
        }
        write!(f, "{}", self.statistics)
    }
}
