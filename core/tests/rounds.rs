use mineclear_core::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

type TestSession = Session<MemoryRecordStore, ManualClock, SmallRng>;

fn new_session(raw_records: Option<&str>, clock: &ManualClock, seed: u64) -> TestSession {
    let store = raw_records.map_or_else(MemoryRecordStore::new, |raw| MemoryRecordStore::with_raw(raw));
    Session::new(
        SessionConfig::default(),
        store,
        clock.clone(),
        SmallRng::seed_from_u64(seed),
    )
}

fn safe_cells(session: &TestSession) -> Vec<CellPos> {
    session
        .board()
        .unwrap()
        .cells()
        .filter(|cell| !cell.contains_mine)
        .map(|cell| cell.pos)
        .collect()
}

/// Opens one numbered cell at `start_ms`, then every other safe cell at `finish_ms`.
fn win_round(session: &mut TestSession, clock: &ManualClock, start_ms: u64, finish_ms: u64) -> RoundEnded {
    let board = session.board().unwrap();
    let opener = board
        .cells()
        .find(|cell| !cell.contains_mine && board.layout().adjacent_mine_count(cell.pos) > 0)
        .unwrap()
        .pos;

    clock.set(start_ms);
    let first = session.player_action(PlayerAction::reveal(opener)).unwrap();
    assert_eq!(first.status, RoundStatus::InProgress);

    clock.set(finish_ms);
    let mut ended = None;
    for pos in safe_cells(session) {
        let report = session.player_action(PlayerAction::reveal(pos)).unwrap();
        if let Some(end) = report.ended {
            assert!(ended.is_none(), "round ended twice");
            ended = Some(end);
        }
    }
    ended.expect("revealing every safe cell wins")
}

#[test]
fn faster_win_updates_record() {
    let clock = ManualClock::new(0);
    let mut session = new_session(Some(r#"{"cells_81": 50000}"#), &clock, 1);
    session.start_round(Difficulty::Beginner, Layout::Wide);

    let ended = win_round(&mut session, &clock, 1_000, 41_000);

    assert_eq!(
        ended,
        RoundEnded {
            status: RoundStatus::Won,
            elapsed_ms: 40_000,
            is_new_record: true,
        }
    );
    assert_eq!(session.status(), RoundStatus::Won);
    assert_eq!(session.records().best(81), Some(40_000));
    assert_eq!(session.store().raw(), Some(r#"{"cells_81":40000}"#));
}

#[test]
fn slower_win_keeps_record() {
    let clock = ManualClock::new(0);
    let mut session = new_session(Some(r#"{"cells_81": 50000}"#), &clock, 2);
    session.start_round(Difficulty::Beginner, Layout::Wide);

    let ended = win_round(&mut session, &clock, 0, 60_000);

    assert_eq!(ended.elapsed_ms, 60_000);
    assert!(!ended.is_new_record);
    assert_eq!(session.records().best(81), Some(50_000));
}

#[test]
fn equal_time_keeps_record() {
    let clock = ManualClock::new(0);
    let mut session = new_session(Some(r#"{"cells_81": 50000}"#), &clock, 3);
    session.start_round(Difficulty::Beginner, Layout::Wide);

    let ended = win_round(&mut session, &clock, 0, 50_000);

    assert!(!ended.is_new_record);
}

#[test]
fn first_win_on_corrupt_store_sets_record() {
    let clock = ManualClock::new(0);
    let mut session = new_session(Some("{oops"), &clock, 4);
    let snapshot = session.start_round(Difficulty::Beginner, Layout::Wide);
    assert_eq!(snapshot.best_ms, None);

    let ended = win_round(&mut session, &clock, 500, 20_500);

    assert!(ended.is_new_record);
    assert_eq!(session.records().best(81), Some(20_000));
}

#[test]
fn compact_layout_shares_record_with_wide() {
    let clock = ManualClock::new(0);
    let mut session = new_session(None, &clock, 5);
    session.start_round(Difficulty::Intermediate, Layout::Compact);

    let ended = win_round(&mut session, &clock, 0, 90_000);
    assert!(ended.is_new_record);

    let snapshot = session.start_round(Difficulty::Intermediate, Layout::Wide);
    assert_eq!(snapshot.best_ms, Some(90_000));
}

#[test]
fn finished_round_ignores_further_actions() {
    let clock = ManualClock::new(0);
    let mut session = new_session(None, &clock, 6);
    session.start_round(Difficulty::Beginner, Layout::Wide);
    win_round(&mut session, &clock, 0, 10_000);
    let mine = session.board().unwrap().layout().mine_positions()[0];

    clock.set(99_000);
    let reveal = session.player_action(PlayerAction::reveal(mine)).unwrap();
    let flag = session.player_action(PlayerAction::toggle_flag(mine)).unwrap();

    assert_eq!(reveal.outcome, ActionOutcome::Reveal(RevealOutcome::Ignored));
    assert_eq!(flag.outcome, ActionOutcome::Flag(FlagOutcome::Ignored));
    assert_eq!(reveal.ended, None);
    assert_eq!(session.status(), RoundStatus::Won);
    assert_eq!(session.tick().elapsed_ms, 10_000);
}

#[test]
fn flag_actions_report_budget() {
    let clock = ManualClock::new(0);
    let mut session = new_session(None, &clock, 7);
    session.start_round(Difficulty::Beginner, Layout::Wide);

    let mut last = None;
    for column in 1..=9 {
        last = Some(
            session
                .player_action(PlayerAction::toggle_flag(CellPos::new(9, column)))
                .unwrap(),
        );
    }
    let report = last.unwrap();
    assert_eq!(report.remaining_flags, 1);
    assert_eq!(report.changes.len(), 1);
    assert_eq!(report.changes[0].mark, Mark::Flagged);

    session
        .player_action(PlayerAction::toggle_flag(CellPos::new(8, 1)))
        .unwrap();
    let rejected = session
        .player_action(PlayerAction::toggle_flag(CellPos::new(8, 2)))
        .unwrap();
    assert_eq!(rejected.outcome, ActionOutcome::Flag(FlagOutcome::Rejected));
    assert!(rejected.changes.is_empty());
    assert_eq!(rejected.remaining_flags, 0);
}

#[test]
fn new_round_discards_previous_board() {
    let clock = ManualClock::new(0);
    let mut session = new_session(None, &clock, 8);
    session.start_round(Difficulty::Beginner, Layout::Wide);
    session
        .player_action(PlayerAction::toggle_flag(CellPos::new(1, 1)))
        .unwrap();
    let opener = safe_cells(&session)[0];
    session.player_action(PlayerAction::reveal(opener)).unwrap();
    clock.set(5_000);

    let snapshot = session.start_round(Difficulty::Expert, Layout::Wide);

    assert_eq!(snapshot.remaining_flags, 99);
    assert_eq!(session.tick().elapsed_ms, 0);
    let board = session.board().unwrap();
    assert_eq!(board.revealed_count(), 0);
    assert_eq!(board.flagged_count(), 0);
    assert_eq!((board.rows(), board.columns()), (16, 30));
}

#[test]
fn gestures_drive_the_session() {
    let clock = ManualClock::new(0);
    let mut session = new_session(None, &clock, 9);
    let mut gestures = session.config().gesture_resolver();
    session.start_round(Difficulty::Beginner, Layout::Compact);
    let target = CellPos::new(5, 5);
    let tap = |kind| PointerEvent::Down {
        pos: Some(target),
        kind,
        buttons: MouseButtons::empty(),
    };
    let release = |kind| PointerEvent::Up {
        pos: Some(target),
        kind,
        buttons: MouseButtons::empty(),
    };

    gestures.handle(tap(PointerKind::Touch), 0);
    gestures.handle(release(PointerKind::Touch), 20);
    let action = gestures.handle(tap(PointerKind::Touch), 100).unwrap();
    let report = session.player_action(action).unwrap();

    assert_eq!(report.outcome, ActionOutcome::Flag(FlagOutcome::Changed(Mark::Flagged)));
    assert_eq!(session.board().unwrap().remaining_flags(), 9);
}
