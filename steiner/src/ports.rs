use rst_common::geom::cell::GCell;

/// A sorted set of gcells supporting predecessor/successor queries by
/// cell and by row. Built by pushing, then sealed; queries are only valid
/// on a sealed index.
#[derive(Debug, Default, Clone)]
pub struct PortIndex {
    cells: Vec<GCell>,
    dirty: bool,
}

impl PortIndex {
    pub fn clear(&mut self) {
        self.dirty = false;
        self.cells.clear();
    }

    pub fn push(&mut self, cell: GCell) {
        self.dirty = true;
        self.cells.push(cell);
    }

    pub fn seal(&mut self) {
        self.dirty = false;
        self.cells.sort_unstable();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Greatest element strictly less than `c`.
    pub fn prev_cell(&self, c: GCell) -> Option<GCell> {
        assert!(!self.dirty, "port index queried before sealing");
        let i = self.cells.partition_point(|&e| e < c);
        (i > 0).then(|| self.cells[i - 1])
    }

    /// Least element strictly greater than `c`.
    pub fn next_cell(&self, c: GCell) -> Option<GCell> {
        assert!(!self.dirty, "port index queried before sealing");
        let i = self.cells.partition_point(|&e| e <= c);
        self.cells.get(i).copied()
    }

    /// Largest occupied row strictly below `y`.
    pub fn prev_y(&self, y: i16) -> Option<i16> {
        self.prev_cell(GCell::new(i16::MIN, y)).map(|c| c.y)
    }

    /// Smallest occupied row strictly above `y`.
    pub fn next_y(&self, y: i16) -> Option<i16> {
        self.next_cell(GCell::new(i16::MAX, y)).map(|c| c.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn reference_prev(cells: &[GCell], c: GCell) -> Option<GCell> {
        cells.iter().copied().filter(|&e| e < c).max()
    }

    fn reference_next(cells: &[GCell], c: GCell) -> Option<GCell> {
        cells.iter().copied().filter(|&e| e > c).min()
    }

    #[test]
    fn queries_match_linear_reference() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut index = PortIndex::default();
            let mut cells = Vec::new();
            for _ in 0..40 {
                let c = GCell::new(rng.gen_range(-20..20), rng.gen_range(-20..20));
                cells.push(c);
                index.push(c);
            }
            index.seal();

            let mut queries = cells.clone();
            for _ in 0..100 {
                queries.push(GCell::new(rng.gen_range(-22..22), rng.gen_range(-22..22)));
            }
            for q in queries {
                assert_eq!(index.prev_cell(q), reference_prev(&cells, q), "prev of {:?}", q);
                assert_eq!(index.next_cell(q), reference_next(&cells, q), "next of {:?}", q);
            }
        }
    }

    #[test]
    fn row_queries() {
        let mut index = PortIndex::default();
        for c in [
            GCell::new(4, -3),
            GCell::new(0, 2),
            GCell::new(9, 2),
            GCell::new(-5, 8),
        ] {
            index.push(c);
        }
        index.seal();

        assert_eq!(index.prev_y(2), Some(-3));
        assert_eq!(index.prev_y(-3), None);
        assert_eq!(index.next_y(2), Some(8));
        assert_eq!(index.next_y(8), None);
        // A query row that is itself occupied is skipped in both directions.
        assert_eq!(index.prev_y(8), Some(2));
        assert_eq!(index.next_y(-3), Some(2));
    }

    #[test]
    fn duplicates_are_skipped_by_strict_queries() {
        let mut index = PortIndex::default();
        index.push(GCell::new(1, 1));
        index.push(GCell::new(1, 1));
        index.push(GCell::new(3, 1));
        index.seal();

        assert_eq!(index.prev_cell(GCell::new(1, 1)), None);
        assert_eq!(index.next_cell(GCell::new(1, 1)), Some(GCell::new(3, 1)));
    }

    #[test]
    #[should_panic(expected = "sealing")]
    fn query_before_seal_panics() {
        let mut index = PortIndex::default();
        index.push(GCell::new(0, 0));
        index.prev_cell(GCell::new(1, 1));
    }
}
