use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardStatus {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl BoardStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    /// Cell was already revealed, marked, or the board is finished.
    Ignored,
    Revealed,
    MineHit,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Everything a reveal changed, in the order the cells were opened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealResult {
    pub outcome: RevealOutcome,
    pub changes: Vec<CellView>,
    pub status: BoardStatus,
    pub remaining_flags: CellCount,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagOutcome {
    /// The cell now carries the given mark.
    Changed(Mark),
    /// Cell was revealed or the board is finished.
    Ignored,
    /// No flag budget left.
    Rejected,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagResult {
    pub outcome: FlagOutcome,
    pub change: Option<CellView>,
    pub remaining_flags: CellCount,
}

/// The cell grid of one round: mine layout plus everything the player has done to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    layout: MineLayout,
    cells: Array2<CellState>,
    /// Zero cells whose neighbors have already been opened by the flood fill.
    expanded: Array2<bool>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    status: BoardStatus,
    triggered_mine: Option<CellPos>,
}

impl Board {
    pub fn new(layout: MineLayout) -> Self {
        let shape = layout.config().to_nd_shape();
        Self {
            layout,
            cells: Array2::default(shape),
            expanded: Array2::default(shape),
            revealed_count: 0,
            flagged_count: 0,
            status: BoardStatus::default(),
            triggered_mine: None,
        }
    }

    /// Fresh board with mines placed uniformly at random.
    pub fn generate<R: Rng + ?Sized>(config: BoardConfig, rng: &mut R) -> Self {
        Self::new(RandomMineLayoutGenerator::new(rng).generate(config))
    }

    pub fn config(&self) -> BoardConfig {
        self.layout.config()
    }

    pub fn rows(&self) -> Coord {
        self.layout.size().0
    }

    pub fn columns(&self) -> Coord {
        self.layout.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        self.layout.total_cells()
    }

    pub fn total_mines(&self) -> CellCount {
        self.layout.mine_count()
    }

    pub fn remaining_flags(&self) -> CellCount {
        self.layout.mine_count() - self.flagged_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn status(&self) -> BoardStatus {
        self.status
    }

    pub fn triggered_mine(&self) -> Option<CellPos> {
        self.triggered_mine
    }

    pub fn layout(&self) -> &MineLayout {
        &self.layout
    }

    pub fn cell(&self, pos: CellPos) -> Result<Cell> {
        let pos = self.config().validate_pos(pos)?;
        Ok(self.cell_unchecked(pos))
    }

    pub fn adjacent_mine_count(&self, pos: CellPos) -> Result<u8> {
        let pos = self.config().validate_pos(pos)?;
        Ok(self.layout.adjacent_mine_count(pos))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.indexed_iter().map(|((row, column), &state)| {
            let pos = CellPos::from_nd_index([row, column]);
            Cell {
                pos,
                contains_mine: self.layout[pos],
                state,
            }
        })
    }

    /// Render state of every cell, for a full redraw.
    pub fn views(&self) -> Vec<CellView> {
        let lost = matches!(self.status, BoardStatus::Lost);
        self.cells()
            .map(|cell| {
                if lost {
                    CellView::of_lost(&cell)
                } else {
                    CellView::of(&cell)
                }
            })
            .collect()
    }

    pub fn reveal(&mut self, pos: CellPos) -> Result<RevealResult> {
        let pos = self.config().validate_pos(pos)?;

        if self.status.is_finished() || self.cells[pos.to_nd_index()] != CellState::default() {
            log::trace!("Ignoring reveal at {}", pos);
            return Ok(self.reveal_result(RevealOutcome::Ignored, Vec::new()));
        }

        if self.layout[pos] {
            log::debug!("Mine hit at {}", pos);
            self.triggered_mine = Some(pos);
            self.status = BoardStatus::Lost;
            let changes = self.views();
            return Ok(self.reveal_result(RevealOutcome::MineHit, changes));
        }

        let mut changes = Vec::new();
        let count = self.open_cell(pos, &mut changes);
        log::debug!("Revealed {}, adjacent mines: {}", pos, count);
        if count == 0 {
            self.flood_fill(pos, &mut changes);
        }

        if self.revealed_count + self.layout.mine_count() == self.layout.total_cells() {
            log::debug!("All safe cells revealed");
            self.status = BoardStatus::Won;
        }

        Ok(self.reveal_result(RevealOutcome::Revealed, changes))
    }

    /// Cycles unmarked, flagged, questioned. Flagging needs budget left, the other steps always succeed.
    pub fn toggle_flag(&mut self, pos: CellPos) -> Result<FlagResult> {
        let pos = self.config().validate_pos(pos)?;

        let state = self.cells[pos.to_nd_index()];
        let outcome = match state {
            _ if self.status.is_finished() => FlagOutcome::Ignored,
            CellState::Revealed(_) => FlagOutcome::Ignored,
            CellState::Covered(Mark::Unmarked) if self.remaining_flags() == 0 => {
                log::debug!("No flags left for {}", pos);
                FlagOutcome::Rejected
            }
            CellState::Covered(Mark::Unmarked) => {
                self.flagged_count += 1;
                self.set_mark(pos, Mark::Flagged)
            }
            CellState::Covered(Mark::Flagged) => {
                self.flagged_count -= 1;
                self.set_mark(pos, Mark::Questioned)
            }
            CellState::Covered(Mark::Questioned) => self.set_mark(pos, Mark::Unmarked),
        };

        let change = outcome
            .has_update()
            .then(|| CellView::of(&self.cell_unchecked(pos)));
        Ok(FlagResult {
            outcome,
            change,
            remaining_flags: self.remaining_flags(),
        })
    }

    fn set_mark(&mut self, pos: CellPos, mark: Mark) -> FlagOutcome {
        self.cells[pos.to_nd_index()] = CellState::Covered(mark);
        FlagOutcome::Changed(mark)
    }

    fn cell_unchecked(&self, pos: CellPos) -> Cell {
        Cell {
            pos,
            contains_mine: self.layout[pos],
            state: self.cells[pos.to_nd_index()],
        }
    }

    /// Opens a covered safe cell, dropping any mark it carried, and returns its count.
    fn open_cell(&mut self, pos: CellPos, changes: &mut Vec<CellView>) -> u8 {
        let count = self.layout.adjacent_mine_count(pos);
        if let CellState::Covered(Mark::Flagged) = self.cells[pos.to_nd_index()] {
            self.flagged_count -= 1;
        }
        self.cells[pos.to_nd_index()] = CellState::Revealed(count);
        self.revealed_count += 1;
        changes.push(CellView::of(&self.cell_unchecked(pos)));
        count
    }

    /// Opens the connected zero region around `origin` and its numbered border.
    ///
    /// Neighbors of a zero cell are never mines, so marked neighbors are opened too.
    fn flood_fill(&mut self, origin: CellPos, changes: &mut Vec<CellView>) {
        self.expanded[origin.to_nd_index()] = true;
        let mut to_expand = vec![origin];

        while let Some(center) = to_expand.pop() {
            for pos in self.layout.iter_neighbors(center) {
                let CellState::Covered(_) = self.cells[pos.to_nd_index()] else {
                    continue;
                };

                let count = self.open_cell(pos, changes);
                log::trace!("Flood opened {}, adjacent mines: {}", pos, count);

                if count == 0 && !self.expanded[pos.to_nd_index()] {
                    self.expanded[pos.to_nd_index()] = true;
                    to_expand.push(pos);
                }
            }
        }
    }

    fn reveal_result(&self, outcome: RevealOutcome, changes: Vec<CellView>) -> RevealResult {
        RevealResult {
            outcome,
            changes,
            status: self.status,
            remaining_flags: self.remaining_flags(),
        }
    }
}
