use crate::db::core::NetlistDB;
use crate::geom::convert::GridConverter;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as ImageRect;
use std::path::Path;

/// Renders the placed cells and every net's built tree onto a PNG.
/// Horizontal wire and vertical wire get their own colours; sinks are
/// white, drivers red.
pub fn draw_steiner_trees(
    db: &NetlistDB,
    gcell_size: f64,
    filename: &str,
    width: u32,
    height: u32,
) {
    let mut img = RgbaImage::new(width, height);
    image::imageops::replace(
        &mut img,
        &RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
        0,
        0,
    );

    let die_w = db.die_area.width();
    let die_h = db.die_area.height();
    if die_w <= 0.0 {
        return;
    }

    let scale_x = width as f64 / die_w;
    let scale_y = height as f64 / die_h;

    let map = |x: f64, y: f64| {
        (
            (x - db.die_area.min.x) * scale_x,
            (height as f64 - (y - db.die_area.min.y) * scale_y),
        )
    };

    let cell_color = Rgba([35, 35, 40, 255]);
    for i in 0..db.num_cells() {
        let pos = db.positions[i];
        let cell = &db.cells[i];
        let (x, y_bot) = map(pos.x, pos.y);
        let w = (cell.width * scale_x).max(1.0);
        let h = (cell.height * scale_y).max(1.0);
        let rect = ImageRect::at(x as i32, (y_bot - h) as i32).of_size(w as u32, h as u32);
        draw_filled_rect_mut(&mut img, rect, cell_color);
    }

    let converter = GridConverter::new(&db.die_area, gcell_size);
    // Horizontal: red. Vertical: blue.
    let h_color = Rgba([255, 20, 80, 170]);
    let v_color = Rgba([0, 110, 255, 170]);

    for net in &db.nets {
        for seg in &net.route_segments {
            if seg.p1 == seg.p2 {
                continue;
            }
            let w1 = converter.to_world(seg.p1);
            let w2 = converter.to_world(seg.p2);
            let (x1, y1) = map(w1.x, w1.y);
            let (x2, y2) = map(w2.x, w2.y);
            let color = if seg.p1.y == seg.p2.y { h_color } else { v_color };
            draw_line_segment_mut(
                &mut img,
                (x1 as f32, y1 as f32),
                (x2 as f32, y2 as f32),
                color,
            );
        }
    }

    let sink_color = Rgba([255, 255, 255, 255]);
    let driver_color = Rgba([255, 40, 40, 255]);
    for net in &db.nets {
        for &pin in &net.sinks {
            let pos = db.get_pin_position(pin);
            let (px, py) = map(pos.x, pos.y);
            let rect = ImageRect::at(px as i32, py as i32).of_size(2, 2);
            draw_filled_rect_mut(&mut img, rect, sink_color);
        }
        if let Some(driver) = net.driver {
            let pos = db.get_pin_position(driver);
            let (px, py) = map(pos.x, pos.y);
            let rect = ImageRect::at(px as i32 - 1, py as i32 - 1).of_size(3, 3);
            draw_filled_rect_mut(&mut img, rect, driver_color);
        }
    }

    let _ = img.save(Path::new(filename));
}
