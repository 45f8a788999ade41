use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use config::*;
pub use difficulty::*;
pub use error::*;
pub use generator::*;
pub use gesture::*;
pub use records::*;
pub use session::*;
pub use timer::*;
pub use types::*;

mod board;
mod cell;
mod config;
mod difficulty;
mod error;
mod generator;
mod gesture;
mod records;
mod session;
mod timer;
mod types;

/// Board shape and mine total, validated on construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    rows: Coord,
    columns: Coord,
    mines: CellCount,
}

impl BoardConfig {
    pub(crate) const fn new_unchecked(rows: Coord, columns: Coord, mines: CellCount) -> Self {
        Self {
            rows,
            columns,
            mines,
        }
    }

    /// Fails when the board is empty or the mines would not leave at least one safe cell.
    pub fn new(rows: Coord, columns: Coord, mines: CellCount) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(GameError::InvalidDimensions);
        }
        let cells = mult(rows, columns);
        if mines == 0 || mines >= cells {
            return Err(GameError::InvalidMineCount { mines, cells });
        }
        Ok(Self::new_unchecked(rows, columns, mines))
    }

    pub const fn rows(&self) -> Coord {
        self.rows
    }

    pub const fn columns(&self) -> Coord {
        self.columns
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    /// Also the board-size key under which best times are stored.
    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.columns)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    pub fn validate_pos(&self, pos: CellPos) -> Result<CellPos> {
        if pos.is_within(self.rows, self.columns) {
            Ok(pos)
        } else {
            Err(GameError::InvalidCoords(pos))
        }
    }

    pub(crate) fn to_nd_shape(self) -> (usize, usize) {
        (self.rows.into(), self.columns.into())
    }
}

/// Where the mines are. Immutable once generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_count,
            mine_mask,
        }
    }

    /// Builds a fixed layout, mostly useful for tests and replays.
    pub fn from_mine_positions(rows: Coord, columns: Coord, mines: &[CellPos]) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(GameError::InvalidDimensions);
        }
        let mut mine_mask: Array2<bool> = Array2::default((rows.into(), columns.into()));
        for &pos in mines {
            if !pos.is_within(rows, columns) {
                return Err(GameError::InvalidCoords(pos));
            }
            mine_mask[pos.to_nd_index()] = true;
        }
        let layout = Self::from_mine_mask(mine_mask);
        let cells = layout.total_cells();
        if layout.mine_count == 0 || layout.mine_count >= cells {
            return Err(GameError::InvalidMineCount {
                mines: layout.mine_count,
                cells,
            });
        }
        Ok(layout)
    }

    pub fn config(&self) -> BoardConfig {
        let (rows, columns) = self.size();
        BoardConfig::new_unchecked(rows, columns, self.mine_count)
    }

    /// `(rows, columns)`
    pub fn size(&self) -> (Coord, Coord) {
        let (rows, columns) = self.mine_mask.dim();
        (rows as Coord, columns as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, pos: CellPos) -> bool {
        self[pos]
    }

    /// Number of mines among the existing neighbors of `pos`, 0 to 8.
    pub fn adjacent_mine_count(&self, pos: CellPos) -> u8 {
        self.iter_neighbors(pos).filter(|&next| self[next]).count() as u8
    }

    /// Row-major list of mine positions.
    pub fn mine_positions(&self) -> Vec<CellPos> {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((row, column), _)| CellPos::from_nd_index([row, column]))
            .collect()
    }

    pub fn iter_neighbors(&self, pos: CellPos) -> NeighborIter {
        self.mine_mask.iter_neighbors(pos)
    }
}

impl Index<CellPos> for MineLayout {
    type Output = bool;

    fn index(&self, pos: CellPos) -> &Self::Output {
        &self.mine_mask[pos.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_empty_board() {
        assert_eq!(BoardConfig::new(0, 9, 1), Err(GameError::InvalidDimensions));
        assert_eq!(BoardConfig::new(9, 0, 1), Err(GameError::InvalidDimensions));
    }

    #[test]
    fn config_requires_a_safe_cell() {
        assert_eq!(
            BoardConfig::new(3, 3, 9),
            Err(GameError::InvalidMineCount { mines: 9, cells: 9 })
        );
        assert_eq!(
            BoardConfig::new(3, 3, 0),
            Err(GameError::InvalidMineCount { mines: 0, cells: 9 })
        );
        assert!(BoardConfig::new(3, 3, 8).is_ok());
    }

    #[test]
    fn config_validates_positions() {
        let config = BoardConfig::new(9, 9, 10).unwrap();
        assert!(config.validate_pos(CellPos::new(9, 9)).is_ok());
        assert_eq!(
            config.validate_pos(CellPos::new(0, 1)),
            Err(GameError::InvalidCoords(CellPos::new(0, 1)))
        );
        assert_eq!(
            config.validate_pos(CellPos::new(1, 10)),
            Err(GameError::InvalidCoords(CellPos::new(1, 10)))
        );
    }

    #[test]
    fn adjacent_counts_at_corner_edge_and_interior() {
        // every cell is a mine except the ones probed, so counts equal neighbor totals
        let mut mines = Vec::new();
        for row in 1..=5 {
            for column in 1..=5 {
                let pos = CellPos::new(row, column);
                if ![(1, 1), (1, 3), (3, 3)].contains(&(row, column)) {
                    mines.push(pos);
                }
            }
        }
        let layout = MineLayout::from_mine_positions(5, 5, &mines).unwrap();

        assert_eq!(layout.adjacent_mine_count(CellPos::new(1, 1)), 3);
        assert_eq!(layout.adjacent_mine_count(CellPos::new(1, 3)), 5);
        assert_eq!(layout.adjacent_mine_count(CellPos::new(3, 3)), 8);
    }

    #[test]
    fn adjacent_count_ignores_the_cell_itself() {
        let layout = MineLayout::from_mine_positions(3, 3, &[CellPos::new(2, 2)]).unwrap();
        assert_eq!(layout.adjacent_mine_count(CellPos::new(2, 2)), 0);
        assert_eq!(layout.adjacent_mine_count(CellPos::new(1, 1)), 1);
    }

    #[test]
    fn layout_rejects_out_of_bounds_mines() {
        assert_eq!(
            MineLayout::from_mine_positions(2, 2, &[CellPos::new(3, 1)]),
            Err(GameError::InvalidCoords(CellPos::new(3, 1)))
        );
    }

    #[test]
    fn mine_positions_are_row_major() {
        let mines = [CellPos::new(2, 1), CellPos::new(1, 3)];
        let layout = MineLayout::from_mine_positions(3, 3, &mines).unwrap();
        assert_eq!(
            layout.mine_positions(),
            vec![CellPos::new(1, 3), CellPos::new(2, 1)]
        );
        assert_eq!(layout.config(), BoardConfig::new(3, 3, 2).unwrap());
    }
}
