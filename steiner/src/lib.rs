pub mod algo;
pub mod neighbours;
pub mod oracle;
pub mod ports;
pub mod svg;
pub mod tree;

use oracle::{DbOracle, NetOracle};
use rayon::prelude::*;
use rst_common::db::core::NetlistDB;
use rst_common::db::indices::NetId;
use rst_common::geom::convert::GridConverter;
use rst_common::util::config::SteinerConfig;
use std::io::Write;
use std::sync::Mutex;
use std::time::Instant;
use tree::STree;

/// Builds one net's tree: init, Prim-Dijkstra expansion, PD-II edge
/// flips, HVW Steinerisation. Nets without a driver or without sinks
/// come back as empty or single-node trees with no edges.
pub fn build_tree<O: NetOracle + ?Sized>(oracle: &O, net: NetId, alpha: f64) -> STree {
    let mut tree = STree::init_from_net(oracle, net);
    if tree.nodes.len() < 2 {
        return tree;
    }
    algo::prim_dijkstra::run(&mut tree, alpha);
    algo::edge_flips::run(&mut tree, alpha);
    algo::hvw::run(&mut tree);
    tree
}

/// Builds trees for every net in the design in parallel and writes the
/// resulting wire segments back into the database.
pub fn run(db: &mut NetlistDB, config: &SteinerConfig) -> Result<(), String> {
    let total_nets = db.nets.len();
    log::info!(
        "Starting Steiner construction for {} nets (alpha = {})...",
        total_nets,
        config.alpha
    );
    let converter = GridConverter::new(&db.die_area, config.gcell_size);
    log::info!("GCell grid: {}x{}", converter.width(), converter.height());

    let oracle = DbOracle::new(db, converter);
    let start_time = Instant::now();
    let progress = Mutex::new(0usize);

    let trees: Vec<STree> = (0..total_nets)
        .into_par_iter()
        .map(|net_id| {
            let tree = build_tree(&oracle, NetId::new(net_id), config.alpha);

            let done = {
                let mut p = progress.lock().unwrap();
                *p += 1;
                *p
            };
            if done.is_multiple_of(50) || done == total_nets {
                let pct = (done as f64 / total_nets as f64) * 100.0;
                eprint!(
                    "\r\x1b[36m[Steiner] Progress: {:>3.0}% ({}/{}) Time: {:.1}s\x1b[0m",
                    pct,
                    done,
                    total_nets,
                    start_time.elapsed().as_secs_f32()
                );
                let _ = std::io::stderr().flush();
            }
            tree
        })
        .collect();
    eprint!("\r\x1b[2K");

    if let Some(svg_dir) = &config.svg_dir {
        std::fs::create_dir_all(svg_dir)
            .map_err(|e| format!("failed to create svg dir '{}': {}", svg_dir, e))?;
        for (net_id, tree) in trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                continue;
            }
            let path = format!("{}/{}.svg", svg_dir, db.nets[net_id].name);
            tree.dump_svg(&path)
                .map_err(|e| format!("failed to write '{}': {}", path, e))?;
        }
    }

    let mut total_wirelength = 0i64;
    let mut steiner_nodes = 0usize;
    for (net_id, tree) in trees.into_iter().enumerate() {
        total_wirelength += tree.wirelength();
        steiner_nodes += tree.steiner_count();
        db.nets[net_id].route_segments = tree.to_segments();
    }

    log::info!(
        "Steiner construction done: {} nets, wirelength {}, {} steiner nodes, {} ms",
        total_nets,
        total_wirelength,
        steiner_nodes,
        start_time.elapsed().as_millis()
    );
    Ok(())
}
