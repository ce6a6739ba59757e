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

//! Branch-and-bound driver for the tandem placement problem.
//!
//! The solver walks a binary tree depth first. Every expansion picks the
//! first undecided cell `(p, s)` of the current node and creates two
//! children: the assign child places station `s` at point `p`, the forbid
//! child excludes that pairing. The forbid child is deferred on a stack and
//! the search descends into the assign child if it survives the feasibility
//! checks and, in branch-and-bound mode, is not dominated by the schedule's
//! threshold. Dead ends pop the most recent deferred node; an empty stack
//! ends the search.
//!
//! Brute force runs the same loop with the bound switched off, so both
//! methods see identical feasible sets and agree on the optimum. The
//! `BnbSolver` keeps the deferred stack between runs and a search session
//! owns the per-run state: tree, schedule, statistics and timing.

use crate::{
    bound::{oracle, strategy::BoundStrategy},
    config::{SearchConfig, SearchMethod},
    error::SearchError,
    feasibility::{self, FeasibilityChecker},
    incumbent::{IncumbentMode, Schedule},
    monitor::tree_search_monitor::{PruneReason, SearchCommand, TreeSearchMonitor},
    result::BnbSolverOutcome,
    stack::DeferredStack,
    stats::BnbSolverStatistics,
    tree::{NodeKey, SearchTree},
};
use tandem_model::{
    index::{PlacementIndex, StationIndex},
    model::Model,
};

/// A depth-first branch-and-bound solver for station placement.
///
/// This is only the execution engine: the lower bound comes from a
/// `BoundStrategy` and observation and early termination from a
/// `TreeSearchMonitor`.
#[derive(Debug, Clone, Default)]
pub struct BnbSolver {
    stack: DeferredStack,
}

impl BnbSolver {
    #[inline]
    pub fn new() -> Self {
        Self {
            stack: DeferredStack::new(),
        }
    }

    /// Creates a solver whose deferred stack can hold a full-depth path of
    /// an `n × m` instance without reallocating.
    #[inline]
    pub fn preallocated(num_placements: usize, num_stations: usize) -> Self {
        Self {
            stack: DeferredStack::preallocated(num_placements, num_stations),
        }
    }

    /// Searches `model` under `config`.
    ///
    /// `strategy` is consulted for every surviving assign child in
    /// branch-and-bound mode and ignored by brute force.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Config` if the deviation settings are invalid
    /// and `SearchError::NoFeasibleInstance` if no chain of the available
    /// stations can join the gateways. Both are reported before the monitor
    /// sees `on_enter_search`.
    pub fn solve<S, M>(
        &mut self,
        model: &Model,
        config: &SearchConfig,
        strategy: &mut S,
        mut monitor: M,
    ) -> Result<BnbSolverOutcome, SearchError>
    where
        S: BoundStrategy + ?Sized,
        M: TreeSearchMonitor,
    {
        let mode = config.incumbent_mode(model)?;

        match feasibility::ensure_connectable(model) {
            Ok(stations) => {
                tracing::debug!(stations, "gateways can be joined");
            }
            Err(gap) => {
                tracing::warn!(%gap, "instance cannot be connected");
                return Err(SearchError::NoFeasibleInstance(gap));
            }
        }

        let session = BnbSolverSearchSession::new(self, model, config, mode, strategy, &mut monitor);
        let outcome = session.run();
        self.reset();
        Ok(outcome)
    }

    /// Clears the deferred stack without releasing its memory.
    #[inline]
    fn reset(&mut self) {
        self.stack.reset();
    }
}

/// The state of a single search run.
struct BnbSolverSearchSession<'a, S: ?Sized, M> {
    solver: &'a mut BnbSolver,
    model: &'a Model,
    checker: FeasibilityChecker<'a>,
    strategy: &'a mut S,
    monitor: &'a mut M,
    use_bound: bool,
    tree: SearchTree,
    schedule: Schedule,
    stats: BnbSolverStatistics,
    start_time: std::time::Instant,
}

impl<'a, S, M> std::fmt::Display for BnbSolverSearchSession<'a, S, M>
where
    S: BoundStrategy + ?Sized,
    M: TreeSearchMonitor,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchSession(strategy: {}, monitor: {}, {}, {}, stack: {})",
            self.strategy.name(),
            self.monitor.name(),
            self.tree,
            self.schedule,
            self.solver.stack
        )
    }
}

impl<'a, S, M> BnbSolverSearchSession<'a, S, M>
where
    S: BoundStrategy + ?Sized,
    M: TreeSearchMonitor,
{
    fn new(
        solver: &'a mut BnbSolver,
        model: &'a Model,
        config: &SearchConfig,
        mode: IncumbentMode,
        strategy: &'a mut S,
        monitor: &'a mut M,
    ) -> Self {
        solver.stack.reset();
        let tree = SearchTree::initialize(model);
        let schedule = Schedule::new(mode, config.solution_criterion(), model, tree.node(tree.root()));

        Self {
            solver,
            model,
            checker: FeasibilityChecker::new(model),
            strategy,
            monitor,
            use_bound: config.method == SearchMethod::BranchAndBound,
            tree,
            schedule,
            stats: BnbSolverStatistics::default(),
            start_time: std::time::Instant::now(),
        }
    }

    fn run(mut self) -> BnbSolverOutcome {
        self.monitor.on_enter_search(self.model, &self.stats);
        self.stats.on_nodes_created(1);
        tracing::debug!(session = %self, "search session started");

        let mut current = self.tree.root();
        let aborted: Option<String> = loop {
            self.stats.on_step();
            self.monitor.on_step(self.tree.node(current), &self.stats);

            if let SearchCommand::Terminate(reason) = self.monitor.search_command(self.tree.node(current), &self.stats) {
                break Some(reason);
            }

            let descended = if self.tree.is_dead_end(current) {
                self.close(current);
                if self.tree.is_exhausted(current, &self.solver.stack) {
                    break None;
                }
                None
            } else {
                self.tree
                    .next_undecided(current)
                    .and_then(|(placement, station)| self.expand(current, placement, station))
            };

            current = match descended.or_else(|| self.backtrack()) {
                Some(key) => key,
                None => break None,
            };
        };

        self.stats.set_total_time(self.start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);

        match aborted {
            Some(reason) => {
                tracing::info!(%reason, "search aborted");
                BnbSolverOutcome::aborted(self.schedule, self.tree, reason, self.stats)
            }
            None => BnbSolverOutcome::exhausted(self.schedule, self.tree, self.stats),
        }
    }

    /// Branches `parent` on `(placement, station)` and returns the assign
    /// child if the search should descend into it.
    fn expand(&mut self, parent: NodeKey, placement: PlacementIndex, station: StationIndex) -> Option<NodeKey> {
        let (assign, forbid) = self.tree.branch(parent, placement, station);
        self.stats.on_expansion();
        self.stats.on_nodes_created(2);
        self.monitor.on_branch(self.tree.node(parent), placement, station, &self.stats);
        self.solver.stack.push(forbid);

        let metrics = match self.checker.evaluate(self.tree.node(parent), placement, station) {
            Ok(metrics) => metrics,
            Err(reason) => {
                tracing::trace!(node = %assign, %reason, "assign child infeasible");
                self.tree.close(assign);
                self.schedule.record_infeasible(assign);
                self.schedule.record_closed(assign);
                self.stats.on_pruning_infeasible();
                self.monitor
                    .on_prune(self.tree.node(assign), PruneReason::Infeasible(reason), &self.stats);
                return None;
            }
        };
        self.tree.set_metrics(assign, metrics);

        if self.use_bound {
            self.stats.on_bound_evaluation();
            let bound = oracle::estimate_child(
                &mut *self.strategy,
                self.model,
                self.tree.node(parent),
                assign,
                placement,
                station,
                &metrics,
            );
            if bound.fallback.is_some() {
                self.stats.on_bound_fallback();
            }
            self.tree.set_estimate(assign, bound.estimate);
        }

        let node = self.tree.node(assign);
        let estimate = node.estimate();
        self.monitor.on_bound_computed(node, estimate, &self.stats);

        if let Some(record) = self.schedule.offer(self.model, node) {
            self.stats.on_record_accepted();
            tracing::info!(
                kind = %record.kind,
                node = %record.node,
                noncoverage = record.noncoverage,
                cost = record.cost,
                delay = record.delay,
                pattern = %record.pattern,
                "record accepted"
            );
            self.monitor.on_record(record, &self.stats);
        }

        if self.use_bound && self.schedule.is_dominated(estimate) {
            self.prune_dominated(assign);
            return None;
        }

        self.stats.on_depth_update(node.depth() as u64);
        self.monitor.on_descend(node, &self.stats);
        Some(assign)
    }

    /// Pops deferred nodes until one survives the current threshold.
    fn backtrack(&mut self) -> Option<NodeKey> {
        while let Some(key) = self.solver.stack.pop() {
            // Forbid children carry their parent's estimate, which may have
            // been overtaken by records found since they were deferred.
            if self.use_bound && self.schedule.is_dominated(self.tree.node(key).estimate()) {
                self.prune_dominated(key);
                continue;
            }
            self.stats.on_backtrack();
            self.monitor.on_backtrack(self.tree.node(key), &self.stats);
            return Some(key);
        }
        None
    }

    fn prune_dominated(&mut self, key: NodeKey) {
        tracing::trace!(node = %key, threshold = self.schedule.threshold(), "node dominated");
        self.close(key);
        self.stats.on_pruning_bound();
        self.monitor
            .on_prune(self.tree.node(key), PruneReason::BoundDominated, &self.stats);
    }

    #[inline]
    fn close(&mut self, key: NodeKey) {
        if !self.tree.node(key).is_closed() {
            self.tree.close(key);
            self.schedule.record_closed(key);
        }
    }
}
