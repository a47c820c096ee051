//! Inclusive row/column ranges over the tile grid or the block grid

use super::rect::Rect;

/// Inclusive range of grid rows and columns.
///
/// Used both for tile ranges (one cell per generated point) and block ranges
/// (one cell per cached block).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridRange {
    pub row_start: i32,
    pub row_end: i32,
    pub col_start: i32,
    pub col_end: i32,
}

impl GridRange {
    pub fn new(row_start: i32, row_end: i32, col_start: i32, col_end: i32) -> Self {
        Self { row_start, row_end, col_start, col_end }
    }

    /// Tile range covering `bounds`: `floor(edge / cell_size)` on all four sides.
    pub fn covering(bounds: &Rect, cell_size: f64) -> Self {
        Self {
            row_start: (bounds.top / cell_size).floor() as i32,
            row_end: (bounds.bottom / cell_size).floor() as i32,
            col_start: (bounds.left / cell_size).floor() as i32,
            col_end: (bounds.right / cell_size).floor() as i32,
        }
    }

    /// Range of coarse cells (e.g. blocks of `rows x cols` tiles) covering this range.
    pub fn coarsen(&self, rows: i32, cols: i32) -> Self {
        Self {
            row_start: self.row_start.div_euclid(rows),
            row_end: self.row_end.div_euclid(rows),
            col_start: self.col_start.div_euclid(cols),
            col_end: self.col_end.div_euclid(cols),
        }
    }

    pub fn rows(&self) -> usize {
        (self.row_end as i64 - self.row_start as i64 + 1).max(0) as usize
    }

    pub fn cols(&self) -> usize {
        (self.col_end as i64 - self.col_start as i64 + 1).max(0) as usize
    }

    /// Number of cells in the range
    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= self.row_start && row <= self.row_end &&
        col >= self.col_start && col <= self.col_end
    }

    pub fn contains_range(&self, other: &GridRange) -> bool {
        self.contains(other.row_start, other.col_start) &&
        self.contains(other.row_end, other.col_end)
    }

    /// Smallest range containing both
    pub fn union(&self, other: &GridRange) -> GridRange {
        GridRange {
            row_start: self.row_start.min(other.row_start),
            row_end: self.row_end.max(other.row_end),
            col_start: self.col_start.min(other.col_start),
            col_end: self.col_end.max(other.col_end),
        }
    }

    /// Row-major offset of `(row, col)` within the range
    pub fn offset_of(&self, row: i32, col: i32) -> Option<usize> {
        if !self.contains(row, col) {
            return None;
        }
        let r = (row as i64 - self.row_start as i64) as usize;
        let c = (col as i64 - self.col_start as i64) as usize;
        Some(r * self.cols() + c)
    }

    /// Iterate `(row, col)` pairs in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> {
        let (col_start, col_end) = (self.col_start, self.col_end);
        (self.row_start..=self.row_end)
            .flat_map(move |row| (col_start..=col_end).map(move |col| (row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covering() {
        let bounds = Rect::new(-320.0, 320.0, -320.0, 320.0);
        let range = GridRange::covering(&bounds, 64.0);
        assert_eq!(range, GridRange::new(-5, 5, -5, 5));
        assert_eq!(range.len(), 121);

        let bounds = Rect::new(-1.0, 63.9, 0.5, 64.0);
        let range = GridRange::covering(&bounds, 64.0);
        assert_eq!(range, GridRange::new(0, 1, -1, 0));
    }

    #[test]
    fn test_coarsen_negative() {
        let tiles = GridRange::new(-5, 5, -9, 8);
        let blocks = tiles.coarsen(8, 8);
        assert_eq!(blocks, GridRange::new(-1, 0, -2, 1));
    }

    #[test]
    fn test_offsets_round_trip() {
        let range = GridRange::new(-2, 1, 3, 5);
        assert_eq!(range.rows(), 4);
        assert_eq!(range.cols(), 3);
        assert_eq!(range.offset_of(-2, 3), Some(0));
        assert_eq!(range.offset_of(-1, 3), Some(3));
        assert_eq!(range.offset_of(1, 5), Some(11));
        assert_eq!(range.offset_of(2, 5), None);
    }

    #[test]
    fn test_iter_row_major() {
        let range = GridRange::new(0, 1, -1, 0);
        let cells: Vec<_> = range.iter().collect();
        assert_eq!(cells, vec![(0, -1), (0, 0), (1, -1), (1, 0)]);
        for (i, (row, col)) in range.iter().enumerate() {
            assert_eq!(range.offset_of(row, col), Some(i));
        }
    }

    #[test]
    fn test_union_and_contains() {
        let a = GridRange::new(0, 1, 0, 1);
        let b = GridRange::new(3, 3, -2, 0);
        let u = a.union(&b);
        assert_eq!(u, GridRange::new(0, 3, -2, 1));
        assert!(u.contains_range(&a));
        assert!(u.contains_range(&b));
        assert!(!a.contains_range(&u));
    }
}
