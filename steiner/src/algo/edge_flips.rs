use crate::tree::STree;
use rst_common::geom::cell::GCell;
use std::collections::{BTreeMap, BTreeSet};

type Children = BTreeMap<GCell, BTreeSet<GCell>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SEdge {
    src: GCell,
    dst: GCell,
}

impl SEdge {
    fn new(src: GCell, dst: GCell) -> Self {
        Self { src, dst }
    }
    fn flipped(self) -> SEdge {
        SEdge::new(self.dst, self.src)
    }
    fn dist(self) -> i32 {
        self.src.mdist(self.dst)
    }
}

#[derive(Clone, Copy, Debug)]
struct Move {
    removed: SEdge,
    added: SEdge,
    flipped: SEdge,
}

/// PD-II local search, restricted to D = 1 single-flip moves: detach a
/// node's subtree-entry edge, hang one of its children under one of its
/// siblings and flip the residual edge. Moves are chosen greedily by the
/// detour-cost delta; the pass stops when no move models as an
/// improvement, and verifies each committed move against the exact
/// weighted cost so the total never increases.
pub fn run(tree: &mut STree, alpha: f64) -> usize {
    let mut children = tree.children();
    let mut moves_made = 0usize;
    let mut prev_cost = f64::INFINITY;
    let mut last: Option<Move> = None;

    loop {
        let leaf_count = total_leaf_counts(tree, &children);
        let cost = weighted_cost(tree, &leaf_count, alpha);
        if cost >= prev_cost {
            // The local delta model oversold the last move; put it back.
            if let Some(mv) = last.take() {
                undo_move(tree, &mut children, &mv);
                moves_made -= 1;
            }
            break;
        }
        prev_cost = cost;

        let Some(mv) = best_move(tree, &children, &leaf_count, alpha) else {
            break;
        };
        apply_move(tree, &mut children, &mv);
        moves_made += 1;
        last = Some(mv);
    }

    log::debug!("edge flipping made {} moves", moves_made);
    moves_made
}

/// Descendant count per node, exclusive of the node itself.
fn total_leaf_counts(tree: &STree, children: &Children) -> BTreeMap<GCell, i64> {
    let mut counts = BTreeMap::new();
    if let Some(source) = tree.source {
        count_descendants(source, children, &mut counts);
    }
    counts
}

fn count_descendants(cursor: GCell, children: &Children, counts: &mut BTreeMap<GCell, i64>) -> i64 {
    let mut count = 0;
    if let Some(kids) = children.get(&cursor) {
        for &kid in kids {
            count += count_descendants(kid, children, counts) + 1;
        }
    }
    counts.insert(cursor, count);
    count
}

/// alpha * (total source-to-node path length) + (1 - alpha) * wirelength.
/// The path-length sum equals sum over edges of dist * subtree size.
fn weighted_cost(tree: &STree, leaf_count: &BTreeMap<GCell, i64>, alpha: f64) -> f64 {
    let mut detour = 0i64;
    let mut wirelength = 0i64;
    for (&cell, node) in &tree.nodes {
        if let Some(up) = node.uphill {
            let dist = i64::from(cell.mdist(up));
            detour += dist * (1 + leaf_count[&cell]);
            wirelength += dist;
        }
    }
    alpha * detour as f64 + (1.0 - alpha) * wirelength as f64
}

fn best_move(
    tree: &STree,
    children: &Children,
    leaf_count: &BTreeMap<GCell, i64>,
    alpha: f64,
) -> Option<Move> {
    let mut best: Option<(Move, f64)> = None;
    for (&cell, node) in &tree.nodes {
        let Some(up) = node.uphill else { continue };
        let (Some(siblings), Some(kids)) = (children.get(&up), children.get(&cell)) else {
            continue;
        };
        for &new_src in siblings {
            if new_src == cell {
                continue;
            }
            for &new_dst in kids {
                let removed = SEdge::new(up, cell);
                let added = SEdge::new(new_src, new_dst);
                let flipped = SEdge::new(cell, new_dst);

                // Path-cost deltas weighted by total leaf count: path
                // distance to a node counts towards every one of its
                // leaves' detours too.
                let subtree = 1 + leaf_count[&cell];
                let moved = 1 + leaf_count[&new_dst];
                let orig_path =
                    i64::from(removed.dist()) * subtree + i64::from(flipped.dist()) * moved;
                let new_path = i64::from(added.dist() + flipped.dist()) * (subtree - moved)
                    + i64::from(added.dist()) * moved;
                let delta = alpha * (new_path - orig_path) as f64
                    + (1.0 - alpha) * f64::from(added.dist() - removed.dist());

                if delta < best.as_ref().map_or(0.0, |(_, d)| *d) {
                    best = Some((
                        Move {
                            removed,
                            added,
                            flipped,
                        },
                        delta,
                    ));
                }
            }
        }
    }
    best.map(|(mv, _)| mv)
}

fn apply_move(tree: &mut STree, children: &mut Children, mv: &Move) {
    rem_edge(tree, children, mv.removed);
    rem_edge(tree, children, mv.flipped);
    add_edge(tree, children, mv.added);
    add_edge(tree, children, mv.flipped.flipped());
}

fn undo_move(tree: &mut STree, children: &mut Children, mv: &Move) {
    rem_edge(tree, children, mv.flipped.flipped());
    rem_edge(tree, children, mv.added);
    add_edge(tree, children, mv.flipped);
    add_edge(tree, children, mv.removed);
}

fn rem_edge(tree: &mut STree, children: &mut Children, e: SEdge) {
    let record = tree
        .nodes
        .get_mut(&e.dst)
        .expect("edge endpoint missing from tree");
    assert!(
        record.uphill == Some(e.src),
        "removing edge {:?} -> {:?} with a different recorded parent",
        e.src,
        e.dst
    );
    record.uphill = None;
    let removed = children
        .get_mut(&e.src)
        .map_or(false, |kids| kids.remove(&e.dst));
    assert!(removed, "child set out of sync at {:?}", e.src);
}

fn add_edge(tree: &mut STree, children: &mut Children, e: SEdge) {
    let record = tree
        .nodes
        .get_mut(&e.dst)
        .expect("edge endpoint missing from tree");
    assert!(
        record.uphill.is_none(),
        "edge destination {:?} already has a parent",
        e.dst
    );
    record.uphill = Some(e.src);
    children.entry(e.src).or_default().insert(e.dst);
}
