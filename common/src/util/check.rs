use crate::db::core::{NetData, NetlistDB};
use crate::geom::cell::GCell;
use crate::geom::convert::GridConverter;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Verifies the built trees of every net: each wire segment rectilinear,
/// the segments of a net connected through shared endpoints, and every
/// pin's gcell touched by the wiring.
pub fn run(db: &NetlistDB, gcell_size: f64) -> Result<(), String> {
    log::info!("Starting Steiner Tree Verification...");
    let converter = GridConverter::new(&db.die_area, gcell_size);

    let error_found = AtomicBool::new(false);
    let error_msg = Arc::new(Mutex::new(String::new()));

    db.nets.par_iter().for_each(|net| {
        if error_found.load(Ordering::Relaxed) {
            return;
        }
        if let Err(msg) = check_net(db, &converter, net) {
            log::error!("FAIL: {}", msg);
            if !error_found.swap(true, Ordering::Relaxed) {
                *error_msg.lock().unwrap() = msg;
            }
        }
    });

    if error_found.load(Ordering::Relaxed) {
        log::error!("\x1b[31mFAILURE\x1b[0m: INVALID WIRING");
        Err(error_msg.lock().unwrap().clone())
    } else {
        log::info!("\x1b[32mPASS\x1b[0m: All nets are rectilinear and fully connected.");
        Ok(())
    }
}

fn check_net(db: &NetlistDB, converter: &GridConverter, net: &NetData) -> Result<(), String> {
    let mut pin_cells: HashSet<GCell> = HashSet::new();
    if let Some(driver) = net.driver {
        pin_cells.insert(converter.to_gcell(db.get_pin_position(driver)));
    }
    for &sink in &net.sinks {
        pin_cells.insert(converter.to_gcell(db.get_pin_position(sink)));
    }

    // A net whose pins collapse onto fewer than two gcells needs no wire.
    if net.driver.is_none() || net.sinks.is_empty() || pin_cells.len() < 2 {
        if !net.route_segments.is_empty() {
            return Err(format!("Net '{}': degenerate net carries wire", net.name));
        }
        return Ok(());
    }

    if net.route_segments.is_empty() {
        return Err(format!("Net '{}': Unrouted (No segments)", net.name));
    }

    for seg in &net.route_segments {
        if seg.p1.x != seg.p2.x && seg.p1.y != seg.p2.y {
            return Err(format!(
                "Net '{}': non-rectilinear segment {:?} -> {:?}",
                net.name, seg.p1, seg.p2
            ));
        }
    }

    // Connectivity over shared endpoints.
    let n = net.route_segments.len();
    let mut by_endpoint: HashMap<GCell, Vec<usize>> = HashMap::new();
    for (i, seg) in net.route_segments.iter().enumerate() {
        by_endpoint.entry(seg.p1).or_default().push(i);
        by_endpoint.entry(seg.p2).or_default().push(i);
    }
    let mut adj = vec![Vec::new(); n];
    for indices in by_endpoint.values() {
        for &i in &indices[1..] {
            adj[indices[0]].push(i);
            adj[i].push(indices[0]);
        }
    }

    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    visited[0] = true;
    queue.push_back(0);
    while let Some(u) = queue.pop_front() {
        for &v in &adj[u] {
            if !visited[v] {
                visited[v] = true;
                queue.push_back(v);
            }
        }
    }
    if !visited.iter().all(|&v| v) {
        return Err(format!(
            "Net '{}': Broken connectivity (Split net).",
            net.name
        ));
    }

    for pin_cell in pin_cells {
        if !by_endpoint.contains_key(&pin_cell) {
            return Err(format!(
                "Net '{}': Pin at {:?} not connected to any wire.",
                net.name, pin_cell
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::core::RouteSegment;
    use crate::geom::point::Point;
    use crate::geom::rect::Rect;

    fn two_pin_db() -> NetlistDB {
        let mut db = NetlistDB::new();
        db.die_area = Rect::new(Point::new(0.0, 0.0), Point::new(20.0, 20.0));
        let a = db.add_cell("a".into(), 1.0, 1.0);
        let b = db.add_cell("b".into(), 1.0, 1.0);
        db.positions[a.index()] = Point::new(2.0, 2.0);
        db.positions[b.index()] = Point::new(7.0, 5.0);
        let net = db.add_net("n".into());
        db.add_pin(a, net, Point::new(0.0, 0.0), true);
        db.add_pin(b, net, Point::new(0.0, 0.0), false);
        db
    }

    #[test]
    fn accepts_a_valid_l_route() {
        let mut db = two_pin_db();
        db.nets[0].route_segments = vec![
            RouteSegment {
                p1: GCell::new(2, 2),
                p2: GCell::new(7, 2),
            },
            RouteSegment {
                p1: GCell::new(7, 2),
                p2: GCell::new(7, 5),
            },
        ];
        assert!(run(&db, 1.0).is_ok());
    }

    #[test]
    fn rejects_a_diagonal_segment() {
        let mut db = two_pin_db();
        db.nets[0].route_segments = vec![RouteSegment {
            p1: GCell::new(2, 2),
            p2: GCell::new(7, 5),
        }];
        assert!(run(&db, 1.0).is_err());
    }

    #[test]
    fn rejects_a_split_net() {
        let mut db = two_pin_db();
        db.nets[0].route_segments = vec![
            RouteSegment {
                p1: GCell::new(2, 2),
                p2: GCell::new(4, 2),
            },
            RouteSegment {
                p1: GCell::new(7, 2),
                p2: GCell::new(7, 5),
            },
        ];
        assert!(run(&db, 1.0).is_err());
    }

    #[test]
    fn rejects_an_unrouted_net() {
        let db = two_pin_db();
        assert!(run(&db, 1.0).is_err());
    }
}
