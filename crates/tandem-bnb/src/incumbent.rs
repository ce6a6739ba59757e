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

//! The schedule of incumbent records.
//!
//! The schedule is an append-only list of accepted solutions. It always
//! starts with the trivial record (nothing placed, the whole span uncovered)
//! and every later `Optimal` record strictly improves on the previous one.
//! In tolerance mode it additionally collects `Feasible` records: solutions
//! within a fixed deviation of a reference value that are not improvements.

use crate::tree::{NodeKey, TreeNode};
use serde::{Deserialize, Serialize};
use tandem_model::{model::Model, solution::PlacementPattern};

/// Kind of an incumbent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Strictly better than every earlier record.
    Optimal,
    /// Within the deviation threshold but not an improvement.
    Feasible,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Optimal => write!(f, "Optimal"),
            RecordKind::Feasible => write!(f, "Feasible"),
        }
    }
}

/// One accepted solution.
#[derive(Debug, Clone, PartialEq)]
pub struct IncumbentRecord {
    pub kind: RecordKind,
    pub noncoverage: f64,
    pub cost: f64,
    pub delay: f64,
    pub node: NodeKey,
    pub pattern: PlacementPattern,
}

impl std::fmt::Display for IncumbentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (noncoverage: {}, cost: {}, delay: {}) {}",
            self.kind, self.node, self.noncoverage, self.cost, self.delay, self.pattern
        )
    }
}

/// How records are accepted and nodes pruned.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum IncumbentMode {
    /// Only strict improvements are recorded.
    #[default]
    Exact,
    /// Also record solutions within `deviation` of
    /// `min(best optimal, baseline)`.
    Tolerance { deviation: f64, baseline: f64 },
}

/// What makes a node a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SolutionCriterion {
    /// The placed chain joins both gateways.
    #[default]
    GatewayConnected,
    /// Every station is placed.
    AllStationsPlaced,
}

impl SolutionCriterion {
    /// Returns `true` if `node` meets the criterion.
    #[inline]
    pub fn is_met(&self, model: &Model, node: &TreeNode) -> bool {
        match self {
            SolutionCriterion::GatewayConnected => node.link().spans(model.span()),
            SolutionCriterion::AllStationsPlaced => node.matrix().all_stations_placed(),
        }
    }
}

/// The records of one search plus the bookkeeping needed to render it.
#[derive(Debug, Clone)]
pub struct Schedule {
    mode: IncumbentMode,
    criterion: SolutionCriterion,
    records: Vec<IncumbentRecord>,
    best_optimal: f64,
    closed: Vec<NodeKey>,
    infeasible: Vec<NodeKey>,
}

impl Schedule {
    /// Creates a schedule holding the trivial record of `root`.
    pub fn new(mode: IncumbentMode, criterion: SolutionCriterion, model: &Model, root: &TreeNode) -> Self {
        let span = model.span();
        Self {
            mode,
            criterion,
            records: vec![IncumbentRecord {
                kind: RecordKind::Optimal,
                noncoverage: span,
                cost: 0.0,
                delay: 0.0,
                node: root.key(),
                pattern: PlacementPattern::empty(model.num_placements()),
            }],
            best_optimal: span,
            closed: Vec::new(),
            infeasible: Vec::new(),
        }
    }

    #[inline]
    pub fn mode(&self) -> IncumbentMode {
        self.mode
    }

    #[inline]
    pub fn criterion(&self) -> SolutionCriterion {
        self.criterion
    }

    /// The noncoverage of the latest `Optimal` record.
    #[inline]
    pub fn best_optimal(&self) -> f64 {
        self.best_optimal
    }

    /// The value dominance is measured against.
    #[inline]
    pub fn reference(&self) -> f64 {
        match self.mode {
            IncumbentMode::Exact => self.best_optimal,
            IncumbentMode::Tolerance { baseline, .. } => self.best_optimal.min(baseline),
        }
    }

    /// `reference + deviation`; equal to the reference in exact mode.
    #[inline]
    pub fn threshold(&self) -> f64 {
        match self.mode {
            IncumbentMode::Exact => self.reference(),
            IncumbentMode::Tolerance { deviation, .. } => self.reference() + deviation,
        }
    }

    /// Returns `true` if no solution below a node with this estimate can be recorded.
    #[inline]
    pub fn is_dominated(&self, estimate: f64) -> bool {
        estimate > self.threshold()
    }

    /// Offers an evaluated node and returns the record it produced, if any.
    pub fn offer(&mut self, model: &Model, node: &TreeNode) -> Option<&IncumbentRecord> {
        let estimate = node.estimate();
        let noncoverage = node.noncoverage().total();
        if !self.criterion.is_met(model, node) {
            return None;
        }

        let kind = match self.mode {
            IncumbentMode::Exact => {
                if estimate < self.best_optimal && noncoverage < self.best_optimal {
                    RecordKind::Optimal
                } else {
                    return None;
                }
            }
            IncumbentMode::Tolerance { .. } => {
                let threshold = self.threshold();
                if estimate > threshold {
                    return None;
                }
                if noncoverage < self.best_optimal {
                    RecordKind::Optimal
                } else if noncoverage <= threshold {
                    RecordKind::Feasible
                } else {
                    return None;
                }
            }
        };

        if kind == RecordKind::Optimal {
            self.best_optimal = noncoverage;
        }
        self.records.push(IncumbentRecord {
            kind,
            noncoverage,
            cost: node.cost(),
            delay: node.delay(),
            node: node.key(),
            pattern: node.matrix().pattern(),
        });
        self.records.last()
    }

    /// All records in acceptance order, the trivial record first.
    #[inline]
    pub fn records(&self) -> &[IncumbentRecord] {
        &self.records
    }

    #[inline]
    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    /// The latest `Optimal` record: the best solution found.
    pub fn best_record(&self) -> Option<&IncumbentRecord> {
        self.records.iter().rev().find(|r| r.kind == RecordKind::Optimal)
    }

    pub fn optimal_records(&self) -> impl Iterator<Item = &IncumbentRecord> + '_ {
        self.records.iter().filter(|r| r.kind == RecordKind::Optimal)
    }

    pub fn feasible_records(&self) -> impl Iterator<Item = &IncumbentRecord> + '_ {
        self.records.iter().filter(|r| r.kind == RecordKind::Feasible)
    }

    /// Returns the record made from `node`, if any.
    pub fn record_for(&self, node: NodeKey) -> Option<&IncumbentRecord> {
        self.records.iter().find(|r| r.node == node)
    }

    #[inline]
    pub fn record_closed(&mut self, node: NodeKey) {
        self.closed.push(node);
    }

    #[inline]
    pub fn record_infeasible(&mut self, node: NodeKey) {
        self.infeasible.push(node);
    }

    /// Keys of closed nodes in closing order.
    #[inline]
    pub fn closed_keys(&self) -> &[NodeKey] {
        &self.closed
    }

    /// Keys of nodes rejected by the feasibility checks.
    #[inline]
    pub fn infeasible_keys(&self) -> &[NodeKey] {
        &self.infeasible
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Schedule ({} records):", self.records.len())?;
        for record in &self.records {
            writeln!(f, "  {}", record)?;
        }
        Ok(())
    }
}
