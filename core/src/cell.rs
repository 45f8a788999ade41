use serde::{Deserialize, Serialize};

use crate::CellPos;

/// Player annotation on a covered cell, cycled by the flag action.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    #[default]
    Unmarked,
    Flagged,
    Questioned,
}

impl Mark {
    pub const fn is_marked(self) -> bool {
        !matches!(self, Self::Unmarked)
    }
}

/// Player-visible state of one cell. A revealed cell can carry no mark.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Covered(Mark),
    Revealed(u8),
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_))
    }

    pub const fn mark(self) -> Mark {
        match self {
            Self::Covered(mark) => mark,
            Self::Revealed(_) => Mark::Unmarked,
        }
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Covered(Mark::Unmarked)
    }
}

/// Read-only copy of a cell as stored by the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub pos: CellPos,
    pub contains_mine: bool,
    pub state: CellState,
}

impl Cell {
    pub const fn is_revealed(&self) -> bool {
        self.state.is_revealed()
    }

    /// Only known once the cell has been revealed.
    pub const fn adjacent_mine_count(&self) -> Option<u8> {
        match self.state {
            CellState::Revealed(count) => Some(count),
            CellState::Covered(_) => None,
        }
    }
}

/// What the face of a cell shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum Glyph {
    Blank,
    Number(u8),
    Mine,
}

impl Glyph {
    pub const fn for_count(count: u8) -> Self {
        match count {
            0 => Self::Blank,
            n => Self::Number(n),
        }
    }
}

/// Render instruction for one cell, emitted in change batches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub row: u8,
    pub column: u8,
    pub glyph: Glyph,
    pub mark: Mark,
    pub disabled: bool,
}

impl CellView {
    pub fn pos(&self) -> CellPos {
        CellPos::new(self.row, self.column)
    }

    /// View of a cell while the round is still being played.
    pub fn of(cell: &Cell) -> Self {
        let (glyph, disabled) = match cell.state {
            CellState::Covered(_) => (Glyph::Blank, false),
            CellState::Revealed(count) => (Glyph::for_count(count), true),
        };
        Self {
            row: cell.pos.row,
            column: cell.pos.column,
            glyph,
            mark: cell.state.mark(),
            disabled,
        }
    }

    /// View of a cell after a mine was hit: everything is disabled and mines are exposed.
    pub fn of_lost(cell: &Cell) -> Self {
        let mut view = Self::of(cell);
        if cell.contains_mine {
            view.glyph = Glyph::Mine;
        }
        view.disabled = true;
        view
    }
}
