use crate::db::core::NetlistDB;
use crate::geom::point::Point;
use crate::geom::rect::Rect;
use anyhow::{Result, anyhow};
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Parses a placed netlist in the STN text format:
///
/// ```text
/// VERSION 1 ;
/// DESIGN demo ;
/// DIEAREA ( 0 0 ) ( 40 40 ) ;
/// COMPONENTS 2 ;
/// - u1 1.5 2.0 ( 3.0 4.0 ) ;
/// END COMPONENTS
/// NETS 1 ;
/// - n1 + DRIVER ( u1 0.75 1.0 ) + SINK ( u2 0.25 1.0 ) ;
/// END NETS
/// END DESIGN
/// ```
pub fn parse(db: &mut NetlistDB, filename: &str) -> Result<()> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);

    let mut in_components = false;
    let mut in_nets = false;

    for line in reader.lines() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "DIEAREA" => {
                let x1: f64 = parts[2].parse()?;
                let y1: f64 = parts[3].parse()?;
                let x2: f64 = parts[6].parse()?;
                let y2: f64 = parts[7].parse()?;
                db.die_area = Rect::new(Point::new(x1, y1), Point::new(x2, y2));
            }
            "COMPONENTS" => {
                in_components = true;
                in_nets = false;
            }
            "NETS" => {
                in_nets = true;
                in_components = false;
            }
            "END" => {
                if parts.len() > 1 {
                    match parts[1] {
                        "COMPONENTS" => in_components = false,
                        "NETS" => in_nets = false,
                        _ => {}
                    }
                }
            }
            "-" => {
                if in_components {
                    let name = parts[1].to_string();
                    let width: f64 = parts[2].parse()?;
                    let height: f64 = parts[3].parse()?;
                    let x: f64 = parts[5].parse()?;
                    let y: f64 = parts[6].parse()?;
                    let id = db.add_cell(name, width, height);
                    db.positions[id.index()] = Point::new(x, y);
                } else if in_nets {
                    let net = db.add_net(parts[1].to_string());
                    let mut i = 2;
                    while i + 5 < parts.len() {
                        if parts[i] != "+" {
                            i += 1;
                            continue;
                        }
                        let is_driver = match parts[i + 1] {
                            "DRIVER" => true,
                            "SINK" => false,
                            other => return Err(anyhow!("unknown endpoint kind '{}'", other)),
                        };
                        let cell_name = parts[i + 3];
                        let ox: f64 = parts[i + 4].parse()?;
                        let oy: f64 = parts[i + 5].parse()?;
                        let cell = *db
                            .cell_name_map
                            .get(cell_name)
                            .ok_or_else(|| anyhow!("net references unknown component '{}'", cell_name))?;
                        db.add_pin(cell, net, Point::new(ox, oy), is_driver);
                        i += 7;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}
