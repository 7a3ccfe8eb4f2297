use crate::oracle::NetOracle;
use crate::ports::PortIndex;
use rst_common::db::core::RouteSegment;
use rst_common::db::indices::NetId;
use rst_common::geom::bbox::GridBox;
use rst_common::geom::cell::GCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

#[derive(Debug, Default, Clone, Copy)]
pub struct STreeNode {
    /// Parent pointer; `None` for the source and for unattached pins.
    pub uphill: Option<GCell>,
    /// Number of pins mapped onto this gcell; zero marks a Steiner node.
    pub port_count: u32,
}

/// A rooted {Steiner, spanning} tree over gcells. Ordered maps keep every
/// construction phase deterministic.
#[derive(Debug, Default, Clone)]
pub struct STree {
    pub source: Option<GCell>,
    pub nodes: BTreeMap<GCell, STreeNode>,
    pub ports: PortIndex,
    pub bounds: GridBox,
}

impl STree {
    /// Enumerates the net's driver and sinks through the oracle. A net
    /// without a driver (or whose driver is skipped) yields an empty
    /// tree; coincident pins accumulate their port counts on one node.
    pub fn init_from_net<O: NetOracle + ?Sized>(oracle: &O, net: NetId) -> STree {
        let mut tree = STree::default();
        let Some(driver) = oracle.driver(net) else {
            return tree;
        };
        if oracle.skip_pin(net, driver) {
            return tree;
        }
        let driver_cell = oracle.pin_gcell(driver);
        tree.source = Some(driver_cell);
        tree.add_port(driver_cell);
        for pin in oracle.sinks(net) {
            if oracle.skip_pin(net, pin) {
                continue;
            }
            tree.add_port(oracle.pin_gcell(pin));
        }
        tree.ports.seal();
        tree
    }

    fn add_port(&mut self, cell: GCell) {
        self.nodes.entry(cell).or_default().port_count += 1;
        self.bounds.extend(cell);
        self.ports.push(cell);
    }

    /// Child sets, rebuilt from the parent pointers on demand.
    pub fn children(&self) -> BTreeMap<GCell, BTreeSet<GCell>> {
        let mut children: BTreeMap<GCell, BTreeSet<GCell>> = BTreeMap::new();
        for (&cell, node) in &self.nodes {
            if let Some(up) = node.uphill {
                children.entry(up).or_default().insert(cell);
            }
        }
        children
    }

    /// Kahn's algorithm over the uphill -> child edges.
    pub fn topo_sorted(&self) -> Vec<GCell> {
        let children = self.children();
        let mut queue: VecDeque<GCell> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.uphill.is_none())
            .map(|(&cell, _)| cell)
            .collect();
        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(cell) = queue.pop_front() {
            sorted.push(cell);
            if let Some(kids) = children.get(&cell) {
                queue.extend(kids.iter().copied());
            }
        }
        assert!(
            sorted.len() == self.nodes.len(),
            "cycle in steiner tree topology"
        );
        sorted
    }

    /// Longest downward path length per node; leaves sit at zero.
    pub fn altitudes(&self) -> BTreeMap<GCell, u32> {
        let mut altitudes: BTreeMap<GCell, u32> = BTreeMap::new();
        let mut sorted = self.topo_sorted();
        sorted.reverse(); // leaves first
        for cell in sorted {
            let alt = *altitudes.entry(cell).or_insert(0);
            if let Some(up) = self.nodes[&cell].uphill {
                let entry = altitudes.entry(up).or_insert(0);
                *entry = (*entry).max(alt + 1);
            }
        }
        altitudes
    }

    /// Tree path length from the source down to `cell`.
    pub fn path_dist(&self, cell: GCell) -> i32 {
        let mut dist = 0;
        let mut cursor = cell;
        while let Some(up) = self.nodes[&cursor].uphill {
            dist += cursor.mdist(up);
            cursor = up;
        }
        dist
    }

    pub fn wirelength(&self) -> i64 {
        self.nodes
            .iter()
            .filter_map(|(&cell, node)| node.uphill.map(|up| i64::from(cell.mdist(up))))
            .sum()
    }

    pub fn steiner_count(&self) -> usize {
        self.nodes.values().filter(|n| n.port_count == 0).count()
    }

    pub fn is_rectilinear(&self) -> bool {
        self.nodes.iter().all(|(&cell, node)| {
            node.uphill
                .is_none_or(|up| up.x == cell.x || up.y == cell.y)
        })
    }

    pub fn to_segments(&self) -> Vec<RouteSegment> {
        self.nodes
            .iter()
            .filter_map(|(&cell, node)| {
                node.uphill.map(|up| RouteSegment { p1: up, p2: cell })
            })
            .collect()
    }

    /// Structural invariants: exactly one parentless node (the source),
    /// parent pointers closed over the node set, and a single connected
    /// acyclic tree hanging off the source.
    pub fn validate(&self) -> Result<(), String> {
        let Some(source) = self.source else {
            return if self.nodes.is_empty() {
                Ok(())
            } else {
                Err("tree without a source holds nodes".to_string())
            };
        };
        if !self.nodes.contains_key(&source) {
            return Err(format!("source {:?} is not a node", source));
        }
        for (&cell, node) in &self.nodes {
            match node.uphill {
                None => {
                    if cell != source {
                        return Err(format!("{:?} has no uphill but is not the source", cell));
                    }
                }
                Some(up) => {
                    if cell == source {
                        return Err(format!("source has uphill {:?}", up));
                    }
                    if !self.nodes.contains_key(&up) {
                        return Err(format!("{:?} points at missing uphill {:?}", cell, up));
                    }
                }
            }
        }

        let children = self.children();
        let mut visited: BTreeSet<GCell> = BTreeSet::new();
        let mut queue = VecDeque::from([source]);
        visited.insert(source);
        while let Some(cell) = queue.pop_front() {
            if let Some(kids) = children.get(&cell) {
                for &kid in kids {
                    if visited.insert(kid) {
                        queue.push_back(kid);
                    }
                }
            }
        }
        if visited.len() != self.nodes.len() {
            return Err(format!(
                "{} of {} nodes unreachable from the source",
                self.nodes.len() - visited.len(),
                self.nodes.len()
            ));
        }
        Ok(())
    }
}
