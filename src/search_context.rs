//! Per-run search state shared by the frontier-based strategies. Nodes are stored in
//! an [IndexMap] in discovery order so parents can be recorded as plain indices and
//! the discovery index doubles as an insertion-order tie-breaker.
use fxhash::FxBuildHasher;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;

use crate::grid::Grid;
use crate::path::reconstruct_path;
use grid_util::Point;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

struct SmallestCostHolder {
    estimated_cost: f64,
    cost: f64,
    tie: usize,
    index: usize,
}

impl Eq for SmallestCostHolder {}

impl PartialEq for SmallestCostHolder {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the BinaryHeap pops the smallest estimate first, and among equal
        // estimates the smallest tie-break key.
        other
            .estimated_cost
            .total_cmp(&self.estimated_cost)
            .then_with(|| other.tie.cmp(&self.tie))
            .then_with(|| other.cost.total_cmp(&self.cost))
    }
}

#[derive(Clone, Copy, Debug)]
struct Node {
    parent: usize,
    cost: f64,
    closed: bool,
}

/// Scratch state of a single search run: discovered nodes with their best known cost
/// and parent, plus the priority frontier. Owned by the run and dropped with it.
pub(crate) struct SearchContext {
    nodes: FxIndexMap<Point, Node>,
    to_see: BinaryHeap<SmallestCostHolder>,
}

impl SearchContext {
    /// Creates a context holding only `start` at cost 0 (index 0).
    pub fn new(start: Point) -> SearchContext {
        let mut nodes = FxIndexMap::default();
        nodes.insert(
            start,
            Node {
                parent: usize::MAX,
                cost: 0.0,
                closed: false,
            },
        );
        SearchContext {
            nodes,
            to_see: BinaryHeap::new(),
        }
    }

    pub fn point(&self, index: usize) -> Point {
        self.nodes
            .get_index(index)
            .map(|(p, _)| *p)
            .unwrap_or_else(|| panic!("node index {index} was never discovered"))
    }

    pub fn cost(&self, index: usize) -> f64 {
        self.nodes[index].cost
    }

    pub fn close(&mut self, index: usize) {
        self.nodes[index].closed = true;
    }

    /// Records `p` as reached from `parent` if it has not been seen before and returns
    /// its index. Used by the breadth-first search, which never improves a node.
    pub fn discover(&mut self, parent: usize, p: Point) -> Option<usize> {
        let depth = self.nodes[parent].cost + 1.0;
        match self.nodes.entry(p) {
            Vacant(e) => {
                let index = e.index();
                e.insert(Node {
                    parent,
                    cost: depth,
                    closed: false,
                });
                Some(index)
            }
            Occupied(_) => None,
        }
    }

    /// Lowers the cost of `successor` to `new_cost` via `parent` when that is strictly
    /// better than what is known and the node is not closed. Returns the index of the
    /// node when it was updated. A node keeps its index (and so its tie-break key)
    /// when it is improved, which amounts to an in-place update of the open set.
    pub fn relax(&mut self, parent: usize, successor: Point, new_cost: f64) -> Option<usize> {
        match self.nodes.entry(successor) {
            Vacant(e) => {
                let index = e.index();
                e.insert(Node {
                    parent,
                    cost: new_cost,
                    closed: false,
                });
                Some(index)
            }
            Occupied(mut e) => {
                let node = e.get_mut();
                if node.closed || new_cost >= node.cost {
                    return None;
                }
                node.parent = parent;
                node.cost = new_cost;
                Some(e.index())
            }
        }
    }

    /// Adds a node to the frontier, ordered by `estimated_cost` then `tie`.
    pub fn push(&mut self, index: usize, estimated_cost: f64, tie: usize) {
        let cost = self.nodes[index].cost;
        self.to_see.push(SmallestCostHolder {
            estimated_cost,
            cost,
            tie,
            index,
        });
    }

    /// Pops the best open node. Entries left behind by an improvement, and nodes that
    /// are already closed, are discarded.
    pub fn pop(&mut self) -> Option<usize> {
        while let Some(SmallestCostHolder { cost, index, .. }) = self.to_see.pop() {
            let node = &self.nodes[index];
            if node.closed || cost > node.cost {
                continue;
            }
            return Some(index);
        }
        None
    }

    /// The path from the start to the node at `index`.
    ///
    /// # Panics
    /// If the parent chain does not lead back to the grid's start cell; that means the
    /// search recorded its parents incorrectly.
    pub fn path_to(&self, grid: &Grid, index: usize) -> Vec<Point> {
        let end = self.point(index);
        reconstruct_path(grid, end, |p| {
            self.nodes
                .get(p)
                .and_then(|n| self.nodes.get_index(n.parent))
                .map(|(parent, _)| *parent)
        })
        .unwrap_or_else(|| panic!("parent chain from {end} does not reach the start cell"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{point, Paint};

    #[test]
    fn pops_smallest_estimate_then_tie() {
        let mut ctx = SearchContext::new(point(0, 0));
        let a = ctx.relax(0, point(0, 1), 2.0).unwrap();
        let b = ctx.relax(0, point(1, 0), 2.0).unwrap();
        let c = ctx.relax(0, point(1, 1), 1.0).unwrap();
        ctx.push(b, 2.0, 9);
        ctx.push(a, 2.0, 3);
        ctx.push(c, 1.0, 50);
        assert_eq!(ctx.pop(), Some(c));
        assert_eq!(ctx.pop(), Some(a));
        assert_eq!(ctx.pop(), Some(b));
        assert_eq!(ctx.pop(), None);
    }

    #[test]
    fn improvement_keeps_index_and_discards_stale_entry() {
        let mut ctx = SearchContext::new(point(0, 0));
        let a = ctx.relax(0, point(0, 1), 5.0).unwrap();
        ctx.push(a, 5.0, a);
        assert_eq!(ctx.relax(0, point(0, 1), 6.0), None);
        assert_eq!(ctx.relax(0, point(0, 1), 3.0), Some(a));
        ctx.push(a, 3.0, a);
        assert_eq!(ctx.pop(), Some(a));
        ctx.close(a);
        assert_eq!(ctx.pop(), None);
        assert_eq!(ctx.relax(0, point(0, 1), 1.0), None);
        assert_eq!(ctx.cost(a), 3.0);
    }

    #[test]
    fn path_to_walks_back_to_start() {
        let mut grid = Grid::new(1, 3);
        grid.set_cell(0, 0, Paint::Start);
        grid.set_cell(0, 2, Paint::End);
        let mut ctx = SearchContext::new(point(0, 0));
        let mid = ctx.discover(0, point(0, 1)).unwrap();
        let end = ctx.discover(mid, point(0, 2)).unwrap();
        assert_eq!(ctx.discover(0, point(0, 1)), None);
        assert_eq!(
            ctx.path_to(&grid, end),
            vec![point(0, 0), point(0, 1), point(0, 2)]
        );
    }
}
