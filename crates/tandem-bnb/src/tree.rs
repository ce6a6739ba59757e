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

//! Assignment matrices and the arena-backed binary search tree.
//!
//! Every node of the search owns a complete `AssignmentMatrix`: an
//! `n × m` grid whose cell `(p, s)` is `Open`, `Placed` (station `s` stands at
//! point `p`) or `Forbidden`. Branching on an open cell produces two children,
//! one with the cell placed and one with it forbidden, so every root-to-leaf
//! path fixes each cell at most once.
//!
//! Nodes live in a flat `Vec` owned by `SearchTree` and are addressed by
//! `NodeKey`, which doubles as the creation order: the root is key 0 and each
//! branching step hands out the next two keys, assign child first.

use crate::stack::DeferredStack;
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;
use tandem_model::{
    index::{PlacementIndex, StationIndex},
    model::Model,
    solution::PlacementPattern,
};

/// The state of one `(point, station)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Not yet decided.
    #[default]
    Open,
    /// The station stands at the point.
    Placed,
    /// The station may not stand at the point in this subtree.
    Forbidden,
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Open => write!(f, "."),
            Cell::Placed => write!(f, "1"),
            Cell::Forbidden => write!(f, "0"),
        }
    }
}

/// The point-by-station decision grid of a node.
///
/// Cells are stored row-major in a flat vector. Two bit masks mirror the
/// `Placed` cells so that "is this point taken" and "is this station used"
/// are O(1).
#[derive(Clone, PartialEq, Eq)]
pub struct AssignmentMatrix {
    num_placements: usize,
    num_stations: usize,
    cells: Vec<Cell>,
    occupied_points: FixedBitSet,
    used_stations: FixedBitSet,
}

impl AssignmentMatrix {
    /// Creates a matrix with every cell open.
    pub fn new(num_placements: usize, num_stations: usize) -> Self {
        Self {
            num_placements,
            num_stations,
            cells: vec![Cell::Open; num_placements * num_stations],
            occupied_points: FixedBitSet::with_capacity(num_placements),
            used_stations: FixedBitSet::with_capacity(num_stations),
        }
    }

    #[inline]
    pub fn num_placements(&self) -> usize {
        self.num_placements
    }

    #[inline]
    pub fn num_stations(&self) -> usize {
        self.num_stations
    }

    #[inline]
    fn flat_index(&self, placement: PlacementIndex, station: StationIndex) -> usize {
        let (p, s) = (placement.get(), station.get());
        debug_assert!(
            p < self.num_placements,
            "called `AssignmentMatrix::flat_index` with placement index out of bounds: the len is {} but the index is {}",
            self.num_placements,
            p
        );
        debug_assert!(
            s < self.num_stations,
            "called `AssignmentMatrix::flat_index` with station index out of bounds: the len is {} but the index is {}",
            self.num_stations,
            s
        );
        p * self.num_stations + s
    }

    /// Returns the state of cell `(placement, station)`.
    #[inline]
    pub fn cell(&self, placement: PlacementIndex, station: StationIndex) -> Cell {
        self.cells[self.flat_index(placement, station)]
    }

    /// Places `station` at `placement`.
    ///
    /// The cell must be open, the point free and the station unused.
    pub fn place(&mut self, placement: PlacementIndex, station: StationIndex) {
        let index = self.flat_index(placement, station);
        debug_assert!(
            self.cells[index] == Cell::Open,
            "called `AssignmentMatrix::place` with a decided cell ({}, {})",
            placement,
            station
        );
        debug_assert!(
            !self.is_point_occupied(placement),
            "called `AssignmentMatrix::place` with occupied point {}",
            placement
        );
        debug_assert!(
            !self.is_station_used(station),
            "called `AssignmentMatrix::place` with already placed station {}",
            station
        );
        self.cells[index] = Cell::Placed;
        self.occupied_points.insert(placement.get());
        self.used_stations.insert(station.get());
    }

    /// Forbids `station` at `placement`.
    pub fn forbid(&mut self, placement: PlacementIndex, station: StationIndex) {
        let index = self.flat_index(placement, station);
        debug_assert!(
            self.cells[index] == Cell::Open,
            "called `AssignmentMatrix::forbid` with a decided cell ({}, {})",
            placement,
            station
        );
        self.cells[index] = Cell::Forbidden;
    }

    #[inline]
    pub fn is_point_occupied(&self, placement: PlacementIndex) -> bool {
        self.occupied_points.contains(placement.get())
    }

    #[inline]
    pub fn is_station_used(&self, station: StationIndex) -> bool {
        self.used_stations.contains(station.get())
    }

    /// Returns the number of placed stations.
    #[inline]
    pub fn placed_count(&self) -> usize {
        self.used_stations.count_ones(..)
    }

    /// Returns `true` if every station has been placed.
    #[inline]
    pub fn all_stations_placed(&self) -> bool {
        self.placed_count() == self.num_stations
    }

    /// Returns the station standing at `placement`, if any.
    pub fn station_at(&self, placement: PlacementIndex) -> Option<StationIndex> {
        if !self.is_point_occupied(placement) {
            return None;
        }
        (0..self.num_stations)
            .map(StationIndex::new)
            .find(|&s| self.cell(placement, s) == Cell::Placed)
    }

    /// Returns the placed station at the highest occupied point.
    pub fn last_placed(&self) -> Option<(PlacementIndex, StationIndex)> {
        let p = PlacementIndex::new(self.occupied_points.ones().last()?);
        self.station_at(p).map(|s| (p, s))
    }

    /// Returns all placed `(point, station)` pairs in increasing point order.
    pub fn placed(&self) -> SmallVec<[(PlacementIndex, StationIndex); 8]> {
        self.occupied_points
            .ones()
            .map(PlacementIndex::new)
            .filter_map(|p| self.station_at(p).map(|s| (p, s)))
            .collect()
    }

    /// Returns the stations not placed anywhere.
    pub fn vacant_stations(&self) -> SmallVec<[StationIndex; 16]> {
        (0..self.num_stations)
            .filter(|&s| !self.used_stations.contains(s))
            .map(StationIndex::new)
            .collect()
    }

    /// Returns the first open cell, in row-major order, whose point and
    /// station are both still free.
    pub fn next_undecided(&self) -> Option<(PlacementIndex, StationIndex)> {
        (0..self.num_placements)
            .map(PlacementIndex::new)
            .filter(|&p| !self.is_point_occupied(p))
            .find_map(|p| {
                (0..self.num_stations)
                    .map(StationIndex::new)
                    .find(|&s| !self.is_station_used(s) && self.cell(p, s) == Cell::Open)
                    .map(|s| (p, s))
            })
    }

    /// Checks that every point and every station holds at most one `Placed`
    /// cell and that the masks agree with the cells.
    pub fn is_consistent(&self) -> bool {
        let mut per_station = vec![0usize; self.num_stations];
        for p in 0..self.num_placements {
            let mut in_row = 0usize;
            for s in 0..self.num_stations {
                if self.cells[p * self.num_stations + s] == Cell::Placed {
                    in_row += 1;
                    per_station[s] += 1;
                }
            }
            if in_row > 1 || (in_row == 1) != self.occupied_points.contains(p) {
                return false;
            }
        }
        per_station
            .iter()
            .enumerate()
            .all(|(s, &count)| count <= 1 && (count == 1) == self.used_stations.contains(s))
    }

    /// Returns the placement pattern encoded by the `Placed` cells.
    pub fn pattern(&self) -> PlacementPattern {
        PlacementPattern::from_assignments(self.num_placements, self.placed())
    }
}

impl std::fmt::Debug for AssignmentMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AssignmentMatrix(num_placements: {}, num_stations: {}, placed: {})",
            self.num_placements,
            self.num_stations,
            self.placed_count()
        )
    }
}

impl std::fmt::Display for AssignmentMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for p in 0..self.num_placements {
            for s in 0..self.num_stations {
                write!(f, "{}", self.cells[p * self.num_stations + s])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The stable identifier of a tree node, equal to its creation order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeKey(usize);

impl NodeKey {
    pub const ROOT: NodeKey = NodeKey(0);

    #[inline]
    pub const fn new(key: usize) -> Self {
        Self(key)
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeKey({})", self.0)
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which child of a branching step a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Assign,
    Forbid,
}

/// The cell fixed on the edge into a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decision {
    pub placement: PlacementIndex,
    pub station: StationIndex,
    pub branch: Branch,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = self.placement.get() + 1;
        let s = self.station.get() + 1;
        match self.branch {
            Branch::Assign => write!(f, "S{} @ P{}", s, p),
            Branch::Forbid => write!(f, "S{} !@ P{}", s, p),
        }
    }
}

/// How far the placed chain reaches from each gateway.
///
/// `left` is the distance from the left gateway to the last placed station,
/// accumulated hop by hop. `right` is the gateway range of the last placed
/// station.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinkReach {
    pub left: f64,
    pub right: f64,
}

impl LinkReach {
    /// Returns `true` if the chain closes the gateway-to-gateway `span`.
    #[inline]
    pub fn spans(&self, span: f64) -> bool {
        self.left + self.right >= span
    }
}

/// Uncovered length of a node, split at its last placed station.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Noncoverage {
    /// Gaps from the left gateway up to the last placed station.
    pub left: f64,
    /// Gap from the last placed station to the right gateway.
    pub right: f64,
    /// Admissible lower bound on the noncoverage of any solution in the subtree.
    pub estimate: f64,
}

impl Noncoverage {
    /// The noncoverage if nothing further were placed.
    #[inline]
    pub fn total(&self) -> f64 {
        self.left + self.right
    }
}

/// The performance figures of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeMetrics {
    pub cost: f64,
    pub delay: f64,
    pub link: LinkReach,
    pub noncoverage: Noncoverage,
}

/// A node of the search tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    key: NodeKey,
    parent: Option<NodeKey>,
    decision: Option<Decision>,
    depth: usize,
    matrix: AssignmentMatrix,
    metrics: NodeMetrics,
    closed: bool,
    assign_child: Option<NodeKey>,
    forbid_child: Option<NodeKey>,
}

impl TreeNode {
    #[inline]
    pub fn key(&self) -> NodeKey {
        self.key
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// The decision on the edge from the parent, `None` for the root.
    #[inline]
    pub fn decision(&self) -> Option<Decision> {
        self.decision
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn matrix(&self) -> &AssignmentMatrix {
        &self.matrix
    }

    #[inline]
    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    #[inline]
    pub fn cost(&self) -> f64 {
        self.metrics.cost
    }

    #[inline]
    pub fn delay(&self) -> f64 {
        self.metrics.delay
    }

    #[inline]
    pub fn link(&self) -> LinkReach {
        self.metrics.link
    }

    #[inline]
    pub fn noncoverage(&self) -> Noncoverage {
        self.metrics.noncoverage
    }

    #[inline]
    pub fn estimate(&self) -> f64 {
        self.metrics.noncoverage.estimate
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn assign_child(&self) -> Option<NodeKey> {
        self.assign_child
    }

    #[inline]
    pub fn forbid_child(&self) -> Option<NodeKey> {
        self.forbid_child
    }

    /// Returns `true` if the node has been branched on.
    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.assign_child.is_some()
    }
}

impl std::fmt::Display for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TreeNode({}, depth: {}, noncoverage: {}, estimate: {}, cost: {})",
            self.key,
            self.depth,
            self.metrics.noncoverage.total(),
            self.metrics.noncoverage.estimate,
            self.metrics.cost
        )
    }
}

/// Arena of all nodes created during one search.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
}

impl SearchTree {
    /// Creates a tree holding only the root: nothing decided, zero cost and
    /// delay, the whole span uncovered.
    pub fn initialize(model: &Model) -> Self {
        let span = model.span();
        let root = TreeNode {
            key: NodeKey::ROOT,
            parent: None,
            decision: None,
            depth: 0,
            matrix: AssignmentMatrix::new(model.num_placements(), model.num_stations()),
            metrics: NodeMetrics {
                cost: 0.0,
                delay: 0.0,
                link: LinkReach::default(),
                noncoverage: Noncoverage {
                    left: 0.0,
                    right: span,
                    estimate: (span - model.total_coverage_diameter()).max(0.0),
                },
            },
            closed: false,
            assign_child: None,
            forbid_child: None,
        };
        Self { nodes: vec![root] }
    }

    #[inline]
    pub fn root(&self) -> NodeKey {
        NodeKey::ROOT
    }

    /// Returns the number of nodes created so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, key: NodeKey) -> &TreeNode {
        debug_assert!(
            key.get() < self.nodes.len(),
            "called `SearchTree::node` with unknown key {}: the tree has {} nodes",
            key,
            self.nodes.len()
        );
        &self.nodes[key.get()]
    }

    /// Returns all nodes in creation order.
    #[inline]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Splits `parent` on cell `(placement, station)`.
    ///
    /// Returns the keys of the assign child and the forbid child. Both start
    /// with the parent's metrics; the caller re-evaluates the assign child.
    pub fn branch(&mut self, parent: NodeKey, placement: PlacementIndex, station: StationIndex) -> (NodeKey, NodeKey) {
        debug_assert!(
            !self.node(parent).is_expanded(),
            "called `SearchTree::branch` on node {} which already has children",
            parent
        );

        let assign_key = NodeKey::new(self.nodes.len());
        let forbid_key = NodeKey::new(self.nodes.len() + 1);

        let source = self.node(parent);
        let depth = source.depth + 1;
        let metrics = source.metrics;
        let mut assign_matrix = source.matrix.clone();
        let mut forbid_matrix = source.matrix.clone();
        assign_matrix.place(placement, station);
        forbid_matrix.forbid(placement, station);

        let child = |key, branch, matrix| TreeNode {
            key,
            parent: Some(parent),
            decision: Some(Decision {
                placement,
                station,
                branch,
            }),
            depth,
            matrix,
            metrics,
            closed: false,
            assign_child: None,
            forbid_child: None,
        };
        let assign = child(assign_key, Branch::Assign, assign_matrix);
        let forbid = child(forbid_key, Branch::Forbid, forbid_matrix);
        self.nodes.push(assign);
        self.nodes.push(forbid);

        let node = &mut self.nodes[parent.get()];
        node.assign_child = Some(assign_key);
        node.forbid_child = Some(forbid_key);
        (assign_key, forbid_key)
    }

    /// Replaces the metrics of `key` after evaluation.
    #[inline]
    pub(crate) fn set_metrics(&mut self, key: NodeKey, metrics: NodeMetrics) {
        self.nodes[key.get()].metrics = metrics;
    }

    #[inline]
    pub(crate) fn set_estimate(&mut self, key: NodeKey, estimate: f64) {
        self.nodes[key.get()].metrics.noncoverage.estimate = estimate;
    }

    /// Marks `key` as fully processed.
    #[inline]
    pub fn close(&mut self, key: NodeKey) {
        self.nodes[key.get()].closed = true;
    }

    /// Returns the next cell to branch on at `key`, if any.
    #[inline]
    pub fn next_undecided(&self, key: NodeKey) -> Option<(PlacementIndex, StationIndex)> {
        self.node(key).matrix.next_undecided()
    }

    /// Returns `true` if `key` is closed or has nothing left to decide.
    #[inline]
    pub fn is_dead_end(&self, key: NodeKey) -> bool {
        let node = self.node(key);
        node.closed || node.matrix.next_undecided().is_none()
    }

    /// Returns `true` if `key` is a dead end and no deferred node remains.
    #[inline]
    pub fn is_exhausted(&self, key: NodeKey, stack: &DeferredStack) -> bool {
        self.is_dead_end(key) && stack.is_empty()
    }
}

impl std::fmt::Display for SearchTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let closed = self.nodes.iter().filter(|n| n.closed).count();
        write!(f, "SearchTree(nodes: {}, closed: {})", self.nodes.len(), closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_model::model::ModelBuilder;

    fn p(i: usize) -> PlacementIndex {
        PlacementIndex::new(i)
    }

    fn s(i: usize) -> StationIndex {
        StationIndex::new(i)
    }

    fn build_model(coords: &[f64], coverages: &[f64], gateways: (f64, f64)) -> Model {
        let mut builder = ModelBuilder::new(coords.len(), coverages.len());
        builder
            .set_placement_coordinates(coords)
            .set_gateways(gateways.0, gateways.1)
            .set_uniform_link_range(100.0);
        for (i, &c) in coverages.iter().enumerate() {
            builder.set_station_coverage(s(i), c);
        }
        builder.build().expect("model should be valid")
    }

    #[test]
    fn test_new_matrix_is_open() {
        let matrix = AssignmentMatrix::new(3, 2);
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(matrix.cell(p(i), s(j)), Cell::Open);
            }
        }
        assert_eq!(matrix.placed_count(), 0);
        assert_eq!(matrix.next_undecided(), Some((p(0), s(0))));
        assert!(matrix.is_consistent());
    }

    #[test]
    fn test_place_updates_masks() {
        let mut matrix = AssignmentMatrix::new(3, 2);
        matrix.place(p(1), s(0));
        assert!(matrix.is_point_occupied(p(1)));
        assert!(matrix.is_station_used(s(0)));
        assert_eq!(matrix.station_at(p(1)), Some(s(0)));
        assert_eq!(matrix.station_at(p(0)), None);
        assert_eq!(matrix.vacant_stations().as_slice(), &[s(1)]);
        assert!(matrix.is_consistent());
    }

    #[test]
    fn test_next_undecided_skips_used_rows_and_columns() {
        let mut matrix = AssignmentMatrix::new(3, 3);
        matrix.place(p(0), s(0));
        // Row 0 is occupied and column 0 is used.
        assert_eq!(matrix.next_undecided(), Some((p(1), s(1))));
        matrix.forbid(p(1), s(1));
        assert_eq!(matrix.next_undecided(), Some((p(1), s(2))));
        matrix.forbid(p(1), s(2));
        assert_eq!(matrix.next_undecided(), Some((p(2), s(1))));
    }

    #[test]
    fn test_next_undecided_none_when_all_stations_placed() {
        let mut matrix = AssignmentMatrix::new(3, 1);
        matrix.place(p(0), s(0));
        assert!(matrix.all_stations_placed());
        assert_eq!(matrix.next_undecided(), None);
    }

    #[test]
    fn test_last_placed_is_highest_point() {
        let mut matrix = AssignmentMatrix::new(4, 3);
        matrix.place(p(0), s(2));
        matrix.place(p(2), s(0));
        assert_eq!(matrix.last_placed(), Some((p(2), s(0))));
        assert_eq!(matrix.placed().as_slice(), &[(p(0), s(2)), (p(2), s(0))]);
        assert_eq!(matrix.pattern().to_string(), "[S3, -, S1, -]");
    }

    #[test]
    fn test_root_metrics() {
        let model = build_model(&[0.0, 10.0], &[5.0, 5.0], (-5.0, 15.0));
        let tree = SearchTree::initialize(&model);
        let root = tree.node(tree.root());
        assert_eq!(tree.len(), 1);
        assert_eq!(root.noncoverage().left, 0.0);
        assert_eq!(root.noncoverage().right, 20.0);
        assert_eq!(root.estimate(), 0.0);
        assert_eq!(root.cost(), 0.0);
        assert!(root.decision().is_none());
    }

    #[test]
    fn test_branch_hands_out_sequential_keys() {
        let model = build_model(&[0.0, 10.0], &[5.0, 5.0], (-5.0, 15.0));
        let mut tree = SearchTree::initialize(&model);
        let (assign, forbid) = tree.branch(tree.root(), p(0), s(0));
        assert_eq!((assign.get(), forbid.get()), (1, 2));

        let root = tree.node(tree.root());
        assert_eq!(root.assign_child(), Some(assign));
        assert_eq!(root.forbid_child(), Some(forbid));

        assert_eq!(tree.node(assign).matrix().cell(p(0), s(0)), Cell::Placed);
        assert_eq!(tree.node(forbid).matrix().cell(p(0), s(0)), Cell::Forbidden);
        assert_eq!(tree.node(assign).depth(), 1);
        assert_eq!(tree.node(forbid).parent(), Some(tree.root()));

        let (a2, f2) = tree.branch(assign, p(1), s(1));
        assert_eq!((a2.get(), f2.get()), (3, 4));
        assert_eq!(tree.node(a2).parent(), Some(assign));
        assert_eq!(tree.node(a2).depth(), 2);
    }

    #[test]
    fn test_dead_end_and_exhausted() {
        let model = build_model(&[0.0], &[1.0], (-1.0, 1.0));
        let mut tree = SearchTree::initialize(&model);
        let mut stack = DeferredStack::new();
        assert!(!tree.is_dead_end(tree.root()));

        let (assign, forbid) = tree.branch(tree.root(), p(0), s(0));
        stack.push(forbid);
        assert!(tree.is_dead_end(assign));
        assert!(!tree.is_exhausted(assign, &stack));

        let popped = stack.pop().expect("forbid child was deferred");
        assert!(tree.is_dead_end(popped));
        assert!(tree.is_exhausted(popped, &stack));

        tree.close(assign);
        assert!(tree.node(assign).is_closed());
    }
}
