use crate::tree::STree;
use rst_common::geom::cell::GCell;

impl STree {
    /// Visits the maximum-bounding-box neighbours of `cell`: every port
    /// whose minimum bounding box with `cell` contains no third port.
    /// Same-row neighbours come straight from the index; the rows above
    /// and below are swept while narrowing one x-interval per side of the
    /// query column.
    pub fn iterate_neighbours(&self, cell: GCell, mut func: impl FnMut(GCell)) {
        let row_prev = self.ports.prev_cell(cell).filter(|p| p.y == cell.y);
        let row_next = self.ports.next_cell(cell).filter(|n| n.y == cell.y);
        if let Some(p) = row_prev {
            func(p);
        }
        if let Some(n) = row_next {
            func(n);
        }
        self.sweep_rows(cell, row_prev, row_next, false, &mut func);
        self.sweep_rows(cell, row_prev, row_next, true, &mut func);
    }

    fn sweep_rows(
        &self,
        cell: GCell,
        row_prev: Option<GCell>,
        row_next: Option<GCell>,
        upwards: bool,
        func: &mut impl FnMut(GCell),
    ) {
        let cx = i32::from(cell.x);
        // Left interval [x0, cell.x], right interval (cell.x, x1]. A
        // same-row neighbour caps the interval on its side.
        let mut x0 = i32::from(row_prev.map_or(self.bounds.x0, |p| p.x));
        let mut x1 = i32::from(row_next.map_or(self.bounds.x1, |n| n.x));

        let mut row = if upwards {
            self.ports.next_y(cell.y)
        } else {
            self.ports.prev_y(cell.y)
        };
        while let Some(y) = row {
            if x0 > cx && x1 <= cx {
                break;
            }
            if x0 <= cx {
                if let Some(l) = self
                    .ports
                    .prev_cell(GCell::new(cell.x.saturating_add(1), y))
                {
                    if l.y == y && i32::from(l.x) >= x0 {
                        func(l);
                        x0 = i32::from(l.x) + 1;
                    }
                }
            }
            if x1 > cx {
                if let Some(r) = self.ports.next_cell(GCell::new(cell.x, y)) {
                    if r.y == y && i32::from(r.x) <= x1 {
                        func(r);
                        x1 = i32::from(r.x) - 1;
                    }
                }
            }
            row = if upwards {
                self.ports.next_y(y)
            } else {
                self.ports.prev_y(y)
            };
        }
    }
}
