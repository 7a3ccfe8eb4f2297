use super::cell::GCell;
use super::point::Point;
use super::rect::Rect;

/// Maps world coordinates onto the gcell grid and back.
pub struct GridConverter {
    scale_x: f64,
    scale_y: f64,
    offset_x: f64,
    offset_y: f64,
    grid_w: u32,
    grid_h: u32,
}

impl GridConverter {
    pub fn new(die: &Rect, gcell_size: f64) -> Self {
        let grid_w = ((die.width() / gcell_size).ceil().max(1.0) as u32).min(i16::MAX as u32);
        let grid_h = ((die.height() / gcell_size).ceil().max(1.0) as u32).min(i16::MAX as u32);
        Self {
            scale_x: grid_w as f64 / die.width().max(f64::MIN_POSITIVE),
            scale_y: grid_h as f64 / die.height().max(f64::MIN_POSITIVE),
            offset_x: die.min.x,
            offset_y: die.min.y,
            grid_w,
            grid_h,
        }
    }

    pub fn width(&self) -> u32 {
        self.grid_w
    }
    pub fn height(&self) -> u32 {
        self.grid_h
    }

    pub fn to_gcell(&self, p: Point<f64>) -> GCell {
        let raw_x = (p.x - self.offset_x) * self.scale_x;
        let raw_y = (p.y - self.offset_y) * self.scale_y;

        let x = raw_x.round().clamp(0.0, (self.grid_w - 1) as f64) as i16;
        let y = raw_y.round().clamp(0.0, (self.grid_h - 1) as f64) as i16;
        GCell::new(x, y)
    }

    pub fn to_world(&self, c: GCell) -> Point<f64> {
        Point::new(
            (c.x as f64 / self.scale_x) + self.offset_x,
            (c.y as f64 / self.scale_y) + self.offset_y,
        )
    }
}
