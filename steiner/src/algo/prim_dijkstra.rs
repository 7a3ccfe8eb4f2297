use crate::tree::STree;
use rst_common::geom::cell::GCell;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

#[derive(Clone, Copy, PartialEq)]
struct QueueEntry {
    node: GCell,
    uphill: GCell,
    path_dist: i32,
    cost: f64,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; the lowest cost, then the lowest
        // cell, must pop first.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds the initial tree by best-first expansion over the neighbour
/// graph, from Prim-Dijkstra Revisited. `alpha` weights source-to-sink
/// path length against wirelength: with 0 this is Prim on edge cost,
/// with 1 Dijkstra on path cost.
pub fn run(tree: &mut STree, alpha: f64) {
    let Some(source) = tree.source else {
        return;
    };
    let mut to_visit: BinaryHeap<QueueEntry> = BinaryHeap::new();
    let mut best_cost: HashMap<GCell, f64> = HashMap::new();
    best_cost.insert(source, 0.0);

    expand(tree, &mut to_visit, &mut best_cost, 0, source, alpha);
    while let Some(next) = to_visit.pop() {
        if tree.nodes[&next.node].uphill.is_some() {
            continue; // committed through a cheaper entry
        }
        if let Some(record) = tree.nodes.get_mut(&next.node) {
            record.uphill = Some(next.uphill);
        }
        expand(
            tree,
            &mut to_visit,
            &mut best_cost,
            next.path_dist,
            next.node,
            alpha,
        );
    }
}

fn expand(
    tree: &STree,
    to_visit: &mut BinaryHeap<QueueEntry>,
    best_cost: &mut HashMap<GCell, f64>,
    path_dist: i32,
    cell: GCell,
    alpha: f64,
) {
    tree.iterate_neighbours(cell, |neighbour| {
        let edge_cost = cell.mdist(neighbour);
        let next_path_dist = path_dist + edge_cost;
        let node_cost = alpha * f64::from(next_path_dist) + f64::from(edge_cost);
        if best_cost
            .get(&neighbour)
            .is_some_and(|&cost| cost <= node_cost)
        {
            return;
        }
        if tree.nodes[&neighbour].uphill.is_some() {
            return;
        }
        to_visit.push(QueueEntry {
            node: neighbour,
            uphill: cell,
            path_dist: next_path_dist,
            cost: node_cost,
        });
        best_cost.insert(neighbour, node_cost);
    });
}
