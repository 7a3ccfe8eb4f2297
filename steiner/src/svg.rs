use crate::tree::STree;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

const SCALE: f64 = 50.0;
const OBJ_SIZE: f64 = 10.0;

impl STree {
    /// Debug dump: white viewport over the bounding box padded by one
    /// cell, each edge as a polyline with a midpoint arrowhead, the
    /// source as a red square, ports as blue squares and Steiner nodes as
    /// black circles.
    pub fn dump_svg<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut out = File::create(path)?;

        let (x0, y0, width, height) = if self.bounds.is_empty() {
            (-1, -1, 2, 2)
        } else {
            let x0 = i32::from(self.bounds.x0) - 1;
            let y0 = i32::from(self.bounds.y0) - 1;
            (
                x0,
                y0,
                i32::from(self.bounds.x1) - x0 + 1,
                i32::from(self.bounds.y1) - y0 + 1,
            )
        };

        writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>")?;
        writeln!(
            out,
            "<svg viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" xmlns=\"http://www.w3.org/2000/svg\">",
            w = width as f64 * SCALE,
            h = height as f64 * SCALE,
        )?;
        writeln!(out, "<defs>")?;
        writeln!(
            out,
            "<marker id=\"arrowhead\" markerWidth=\"10\" markerHeight=\"7\" refX=\"0\" refY=\"3.5\" orient=\"auto\">"
        )?;
        writeln!(out, "    <polygon points=\"0 0, 10 3.5, 0 7\" /> ")?;
        writeln!(out, "  </marker>")?;
        writeln!(out, "</defs>")?;
        writeln!(
            out,
            "<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" stroke=\"#fff\" fill=\"#fff\"/>"
        )?;

        for (&cell, node) in &self.nodes {
            let Some(up) = node.uphill else { continue };
            let lx0 = (i32::from(up.x) - x0) as f64 * SCALE;
            let ly0 = (i32::from(up.y) - y0) as f64 * SCALE;
            let lx1 = (i32::from(cell.x) - x0) as f64 * SCALE;
            let ly1 = (i32::from(cell.y) - y0) as f64 * SCALE;
            writeln!(
                out,
                "<polyline points=\"{},{} {},{} {},{}\" stroke=\"black\" marker-mid=\"url(#arrowhead)\"/>",
                lx0,
                ly0,
                (lx0 + lx1) / 2.0,
                (ly0 + ly1) / 2.0,
                lx1,
                ly1
            )?;
        }

        for (&cell, node) in &self.nodes {
            let cx = (i32::from(cell.x) - x0) as f64 * SCALE;
            let cy = (i32::from(cell.y) - y0) as f64 * SCALE;
            if Some(cell) == self.source {
                writeln!(
                    out,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" style=\"fill:red;stroke:black;stroke-width:1\" />",
                    cx - OBJ_SIZE / 2.0,
                    cy - OBJ_SIZE / 2.0,
                    OBJ_SIZE,
                    OBJ_SIZE
                )?;
            } else if node.port_count > 0 {
                writeln!(
                    out,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" style=\"fill:blue;stroke:black;stroke-width:1\" />",
                    cx - OBJ_SIZE / 2.0,
                    cy - OBJ_SIZE / 2.0,
                    OBJ_SIZE,
                    OBJ_SIZE
                )?;
            } else {
                writeln!(
                    out,
                    "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" style=\"fill:black;stroke:black;stroke-width:1\" />",
                    cx,
                    cy,
                    OBJ_SIZE / 2.0
                )?;
            }
        }

        writeln!(out, "</svg>")?;
        Ok(())
    }
}
