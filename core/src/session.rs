use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Shown in the records panel for a preset nobody has won yet.
pub const NO_RECORD_DISPLAY: &str = "00:00:00";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    #[default]
    AwaitingDifficulty,
    InProgress,
    Won,
    Lost,
}

impl RoundStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl From<BoardStatus> for RoundStatus {
    fn from(status: BoardStatus) -> Self {
        match status {
            BoardStatus::InProgress => Self::InProgress,
            BoardStatus::Won => Self::Won,
            BoardStatus::Lost => Self::Lost,
        }
    }
}

/// Emitted when a round starts so the presentation can lay out an empty board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub difficulty: Difficulty,
    pub layout: Layout,
    pub rows: Coord,
    pub columns: Coord,
    pub cell_count: CellCount,
    pub total_mines: CellCount,
    pub remaining_flags: CellCount,
    pub best_ms: Option<u64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEnded {
    pub status: RoundStatus,
    pub elapsed_ms: u64,
    pub is_new_record: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Reveal(RevealOutcome),
    Flag(FlagOutcome),
}

impl ActionOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Reveal(outcome) => outcome.has_update(),
            Self::Flag(outcome) => outcome.has_update(),
        }
    }
}

/// Result batch of one player action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub outcome: ActionOutcome,
    pub changes: Vec<CellView>,
    pub remaining_flags: CellCount,
    pub status: RoundStatus,
    /// Set only by the action that ended the round.
    pub ended: Option<RoundEnded>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerTick {
    pub elapsed_ms: u64,
    pub display: String,
}

/// One line of the best-times panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub difficulty: Difficulty,
    pub key: CellCount,
    pub best_ms: Option<u64>,
    pub display: String,
}

#[derive(Clone, Debug)]
struct Round {
    difficulty: Difficulty,
    layout: Layout,
    board: Board,
    stopwatch: Stopwatch,
    ended: Option<RoundEnded>,
}

/// Owns the live round and connects it to the clock and the record store.
///
/// Every call runs to completion before the next one, so the session is the only owner of the board.
#[derive(Debug)]
pub struct Session<S, C, R> {
    config: SessionConfig,
    store: S,
    clock: C,
    rng: R,
    round: Option<Round>,
}

impl<S: RecordStore, C: Clock, R: Rng> Session<S, C, R> {
    pub fn new(config: SessionConfig, store: S, clock: C, rng: R) -> Self {
        Self {
            config,
            store,
            clock,
            rng,
            round: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn board(&self) -> Option<&Board> {
        self.round.as_ref().map(|round| &round.board)
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.round.as_ref().map(|round| round.difficulty)
    }

    pub fn status(&self) -> RoundStatus {
        self.round
            .as_ref()
            .map_or(RoundStatus::AwaitingDifficulty, |round| {
                round.board.status().into()
            })
    }

    /// Discards any previous round and deals a new board.
    pub fn start_round(&mut self, difficulty: Difficulty, layout: Layout) -> RoundSnapshot {
        let config = difficulty.board_config(layout);
        let board = Board::generate(config, &mut self.rng);
        log::debug!(
            "Starting {} round ({:?}, {}x{}, {} mines)",
            difficulty,
            layout,
            config.rows(),
            config.columns(),
            config.mines()
        );

        let snapshot = RoundSnapshot {
            difficulty,
            layout,
            rows: board.rows(),
            columns: board.columns(),
            cell_count: board.total_cells(),
            total_mines: board.total_mines(),
            remaining_flags: board.remaining_flags(),
            best_ms: self.store.load().best(board.total_cells()),
        };
        self.round = Some(Round {
            difficulty,
            layout,
            board,
            stopwatch: Stopwatch::default(),
            ended: None,
        });
        snapshot
    }

    /// Like [`Self::start_round`], picking the layout from the viewport width.
    pub fn start_round_for_viewport(&mut self, difficulty: Difficulty, width: u32) -> RoundSnapshot {
        let layout = self.config.layout_for_viewport(width);
        self.start_round(difficulty, layout)
    }

    /// Stops the clock and forgets the round.
    pub fn abandon_round(&mut self) {
        if let Some(mut round) = self.round.take() {
            round.stopwatch.pause(self.clock.now_ms());
            log::debug!("Abandoned {} round", round.difficulty);
        }
    }

    pub fn player_action(&mut self, action: PlayerAction) -> Result<ActionReport> {
        let round = self.round.as_mut().ok_or(GameError::NoActiveRound)?;
        let pos = round.board.config().validate_pos(action.pos)?;
        let now = self.clock.now_ms();

        let (outcome, changes, remaining_flags) = match action.kind {
            ActionKind::Reveal => {
                if !round.stopwatch.has_started() && !round.board.status().is_finished() {
                    round.stopwatch.start(now);
                }
                let result = round.board.reveal(pos)?;
                (
                    ActionOutcome::Reveal(result.outcome),
                    result.changes,
                    result.remaining_flags,
                )
            }
            ActionKind::ToggleFlag => {
                let result = round.board.toggle_flag(pos)?;
                (
                    ActionOutcome::Flag(result.outcome),
                    result.change.into_iter().collect(),
                    result.remaining_flags,
                )
            }
        };

        let status = RoundStatus::from(round.board.status());
        let ended = if status.is_finished() && round.ended.is_none() {
            let ended = Self::finish_round(round, &mut self.store, now);
            round.ended = Some(ended);
            Some(ended)
        } else {
            None
        };

        Ok(ActionReport {
            outcome,
            changes,
            remaining_flags,
            status,
            ended,
        })
    }

    /// Current timer reading for display. Reads only, the round is untouched.
    pub fn tick(&self) -> TimerTick {
        let elapsed_ms = self.elapsed_ms();
        TimerTick {
            elapsed_ms,
            display: format_duration(elapsed_ms, self.config.show_hours),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.round
            .as_ref()
            .map_or(0, |round| round.stopwatch.elapsed_ms(self.clock.now_ms()))
    }

    pub fn records(&self) -> Records {
        self.store.load()
    }

    /// Best time per preset, formatted for the records panel.
    pub fn records_view(&self) -> Vec<RecordRow> {
        let records = self.store.load();
        Difficulty::ALL
            .into_iter()
            .map(|difficulty| {
                let key = difficulty.record_key();
                let best_ms = records.best(key);
                RecordRow {
                    difficulty,
                    key,
                    best_ms,
                    display: best_ms.map_or_else(
                        || NO_RECORD_DISPLAY.to_owned(),
                        |ms| format_duration(ms, self.config.show_hours),
                    ),
                }
            })
            .collect()
    }

    pub fn reset_records(&mut self) -> core::result::Result<(), StoreError> {
        log::debug!("Clearing all records");
        self.store.clear()
    }

    fn finish_round(round: &mut Round, store: &mut S, now: u64) -> RoundEnded {
        round.stopwatch.pause(now);
        let elapsed_ms = round.stopwatch.elapsed_ms(now);
        let status = RoundStatus::from(round.board.status());

        let is_new_record = matches!(status, RoundStatus::Won) && {
            let key = round.board.total_cells();
            let mut records = store.load();
            let improved = records.submit(key, elapsed_ms);
            improved && {
                log::debug!("New record for {} cells: {}ms", key, elapsed_ms);
                store
                    .save(&records)
                    .map_err(|err| log::error!("Could not save records: {}", err))
                    .is_ok()
            }
        };

        log::debug!(
            "{} round ended: {:?} after {}ms ({:?} layout)",
            round.difficulty,
            status,
            elapsed_ms,
            round.layout
        );
        RoundEnded {
            status,
            elapsed_ms,
            is_new_record,
        }
    }
}
