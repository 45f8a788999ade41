use core::fmt;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Position of a cell on the board, 1-indexed on both axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub row: Coord,
    pub column: Coord,
}

impl CellPos {
    pub const fn new(row: Coord, column: Coord) -> Self {
        Self { row, column }
    }

    /// Whether this position lies on a `rows` by `columns` board.
    pub const fn is_within(self, rows: Coord, columns: Coord) -> bool {
        self.row >= 1 && self.row <= rows && self.column >= 1 && self.column <= columns
    }

    pub(crate) fn from_nd_index([row, column]: [usize; 2]) -> Self {
        // boards are at most Coord::MAX on each side, so the +1 cannot overflow
        Self {
            row: (row + 1) as Coord,
            column: (column + 1) as Coord,
        }
    }
}

impl From<(Coord, Coord)> for CellPos {
    fn from((row, column): (Coord, Coord)) -> Self {
        Self::new(row, column)
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for CellPos {
    type Output = [usize; 2];

    /// Positions must be validated against the board first, row and column 0 do not exist.
    fn to_nd_index(self) -> Self::Output {
        [usize::from(self.row) - 1, usize::from(self.column) - 1]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, pos: CellPos) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, pos: CellPos) -> NeighborIter {
        let (rows, columns) = self.dim();
        NeighborIter::new(pos, (rows as Coord, columns as Coord))
    }
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `pos`, returning a value only when it remains on the board.
fn apply_delta(pos: CellPos, delta: (i8, i8), bounds: (Coord, Coord)) -> Option<CellPos> {
    let (dr, dc) = delta;
    let next = CellPos::new(
        pos.row.checked_add_signed(dr)?,
        pos.column.checked_add_signed(dc)?,
    );
    next.is_within(bounds.0, bounds.1).then_some(next)
}

/// Iterates the up-to-8 positions surrounding a cell, skipping those off the board.
#[derive(Debug)]
pub struct NeighborIter {
    center: CellPos,
    bounds: (Coord, Coord),
    index: u8,
}

impl NeighborIter {
    pub fn new(center: CellPos, bounds: (Coord, Coord)) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = CellPos;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors(pos: CellPos, bounds: (Coord, Coord)) -> Vec<CellPos> {
        NeighborIter::new(pos, bounds).collect()
    }

    #[test]
    fn corner_has_three_neighbors() {
        let found = neighbors(CellPos::new(1, 1), (9, 9));
        assert_eq!(
            found,
            vec![CellPos::new(1, 2), CellPos::new(2, 1), CellPos::new(2, 2)]
        );
    }

    #[test]
    fn edge_has_five_neighbors() {
        assert_eq!(neighbors(CellPos::new(1, 5), (9, 9)).len(), 5);
        assert_eq!(neighbors(CellPos::new(5, 9), (9, 9)).len(), 5);
    }

    #[test]
    fn interior_has_eight_neighbors() {
        let found = neighbors(CellPos::new(5, 5), (9, 9));
        assert_eq!(found.len(), 8);
        assert!(!found.contains(&CellPos::new(5, 5)));
    }

    #[test]
    fn single_cell_board_has_no_neighbors() {
        assert!(neighbors(CellPos::new(1, 1), (1, 1)).is_empty());
    }

    #[test]
    fn nd_index_is_zero_based() {
        assert_eq!(CellPos::new(1, 1).to_nd_index(), [0, 0]);
        assert_eq!(CellPos::new(16, 30).to_nd_index(), [15, 29]);
        assert_eq!(CellPos::from_nd_index([15, 29]), CellPos::new(16, 30));
    }
}
