use rst_common::db::indices::{NetId, PinId};
use rst_common::geom::cell::GCell;
use rst_steiner::build_tree;
use rst_steiner::oracle::{NetOracle, PinSetOracle};
use rst_steiner::tree::STree;

const NET: NetId = NetId(0);

/// Universal invariants: structural validity, parent closure, rectilinear
/// edges after Steinerisation and port-count conservation.
fn assert_built(tree: &STree, endpoint_count: u32) {
    tree.validate().unwrap();
    assert!(tree.is_rectilinear());
    let ports: u32 = tree.nodes.values().map(|n| n.port_count).sum();
    assert_eq!(ports, endpoint_count);
}

#[test]
fn two_pin_net_gets_one_bend() {
    let oracle = PinSetOracle::new(GCell::new(0, 0), vec![GCell::new(3, 2)]);
    let tree = build_tree(&oracle, NET, 0.3);

    assert_built(&tree, 2);
    assert_eq!(tree.nodes.len(), 3);
    assert_eq!(tree.wirelength(), 5);
    let bend_low = GCell::new(3, 0);
    let bend_high = GCell::new(0, 2);
    let bend = tree
        .nodes
        .iter()
        .find(|(_, n)| n.port_count == 0)
        .map(|(&c, _)| c)
        .unwrap();
    assert!(bend == bend_low || bend == bend_high);
}

#[test]
fn collinear_pins_make_a_single_row() {
    let oracle = PinSetOracle::new(GCell::new(0, 0), vec![GCell::new(5, 0), GCell::new(10, 0)]);
    let tree = build_tree(&oracle, NET, 0.3);

    assert_built(&tree, 3);
    assert_eq!(tree.nodes.len(), 3);
    assert_eq!(tree.steiner_count(), 0);
    assert_eq!(tree.wirelength(), 10);
    assert_eq!(tree.nodes[&GCell::new(5, 0)].uphill, Some(GCell::new(0, 0)));
    assert_eq!(tree.nodes[&GCell::new(10, 0)].uphill, Some(GCell::new(5, 0)));
}

#[test]
fn four_pin_l_reaches_the_optimal_wirelength() {
    let oracle = PinSetOracle::new(
        GCell::new(0, 0),
        vec![GCell::new(4, 0), GCell::new(0, 4), GCell::new(4, 4)],
    );
    let tree = build_tree(&oracle, NET, 0.3);

    assert_built(&tree, 4);
    assert_eq!(tree.wirelength(), 12);
}

#[test]
fn centre_driver_shares_corner_wire() {
    let oracle = PinSetOracle::new(
        GCell::new(5, 5),
        vec![
            GCell::new(0, 0),
            GCell::new(0, 10),
            GCell::new(10, 0),
            GCell::new(10, 10),
        ],
    );
    let tree = build_tree(&oracle, NET, 0.3);

    assert_built(&tree, 5);
    // The four diagonal edges coalesce pairwise into shared trunks.
    assert!(tree.wirelength() <= 40);
    assert!(tree.steiner_count() >= 2);
    assert_eq!(tree.wirelength(), 30);
}

#[test]
fn alpha_one_keeps_every_sink_at_manhattan_distance() {
    let driver = GCell::new(0, 0);
    let mut sinks = Vec::new();
    for y in 0..=20i16 {
        for x in 0..=20i16 {
            if (x, y) != (0, 0) {
                sinks.push(GCell::new(x, y));
            }
        }
    }
    let oracle = PinSetOracle::new(driver, sinks.clone());
    let tree = build_tree(&oracle, NET, 1.0);

    assert_built(&tree, 441);
    for &sink in &sinks {
        assert_eq!(tree.path_dist(sink), driver.mdist(sink), "sink {:?}", sink);
    }
}

#[test]
fn driver_without_sinks_yields_a_single_node() {
    let oracle = PinSetOracle::new(GCell::new(4, 4), vec![]);
    let tree = build_tree(&oracle, NET, 0.3);

    assert_eq!(tree.nodes.len(), 1);
    assert_eq!(tree.source, Some(GCell::new(4, 4)));
    assert_eq!(tree.nodes[&GCell::new(4, 4)].port_count, 1);
    assert!(tree.nodes[&GCell::new(4, 4)].uphill.is_none());
    assert!(tree.to_segments().is_empty());
}

struct DriverlessOracle;

impl NetOracle for DriverlessOracle {
    fn driver(&self, _net: NetId) -> Option<PinId> {
        None
    }
    fn sinks(&self, _net: NetId) -> Vec<PinId> {
        vec![PinId::new(1)]
    }
    fn pin_gcell(&self, _pin: PinId) -> GCell {
        GCell::new(0, 0)
    }
    fn skip_pin(&self, _net: NetId, _pin: PinId) -> bool {
        false
    }
}

#[test]
fn net_without_a_driver_yields_an_empty_tree() {
    let tree = build_tree(&DriverlessOracle, NET, 0.3);
    assert!(tree.nodes.is_empty());
    assert!(tree.source.is_none());
    assert!(tree.to_segments().is_empty());
}

struct SkippingOracle {
    inner: PinSetOracle,
}

impl NetOracle for SkippingOracle {
    fn driver(&self, net: NetId) -> Option<PinId> {
        self.inner.driver(net)
    }
    fn sinks(&self, net: NetId) -> Vec<PinId> {
        self.inner.sinks(net)
    }
    fn pin_gcell(&self, pin: PinId) -> GCell {
        self.inner.pin_gcell(pin)
    }
    fn skip_pin(&self, _net: NetId, pin: PinId) -> bool {
        // Skip the last sink.
        pin.index() == 3
    }
}

#[test]
fn skipped_endpoints_stay_out_of_the_tree() {
    let skipped = GCell::new(19, 19);
    let oracle = SkippingOracle {
        inner: PinSetOracle::new(
            GCell::new(0, 0),
            vec![GCell::new(6, 1), GCell::new(1, 6), skipped],
        ),
    };
    let tree = build_tree(&oracle, NET, 0.3);

    assert_built(&tree, 3);
    assert!(!tree.nodes.contains_key(&skipped));
}

#[test]
fn coincident_endpoints_share_a_node() {
    let oracle = PinSetOracle::new(
        GCell::new(0, 0),
        vec![GCell::new(0, 0), GCell::new(7, 3), GCell::new(7, 3)],
    );
    let tree = build_tree(&oracle, NET, 0.3);

    assert_built(&tree, 4);
    assert_eq!(tree.nodes[&GCell::new(0, 0)].port_count, 2);
    assert_eq!(tree.nodes[&GCell::new(7, 3)].port_count, 2);
    assert_eq!(tree.wirelength(), 10);
}

#[test]
fn accessors_agree_after_a_full_build() {
    let oracle = PinSetOracle::new(
        GCell::new(2, 2),
        vec![
            GCell::new(9, 4),
            GCell::new(4, 11),
            GCell::new(12, 9),
            GCell::new(0, 7),
        ],
    );
    let tree = build_tree(&oracle, NET, 0.5);
    assert_built(&tree, 5);

    let topo = tree.topo_sorted();
    assert_eq!(topo.len(), tree.nodes.len());
    assert_eq!(topo[0], tree.source.unwrap());

    let altitudes = tree.altitudes();
    assert_eq!(altitudes.len(), tree.nodes.len());
    assert!(altitudes.values().any(|&a| a == 0));

    let segments = tree.to_segments();
    assert_eq!(segments.len(), tree.nodes.len() - 1);
    let seg_total: i64 = segments
        .iter()
        .map(|s| i64::from(s.p1.mdist(s.p2)))
        .sum();
    assert_eq!(seg_total, tree.wirelength());
}
