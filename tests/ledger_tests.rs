//! Scoring arithmetic over realistic event sequences.

use tui_wam::core::ScoreLedger;
use tui_wam::term::view;
use tui_wam::types::PlayResult;

#[test]
fn mixed_game_totals_add_up() {
    let ledger = ScoreLedger::new();

    // Quick whack in the first fifth.
    ledger.record(1, 4, Some('5'), 0, PlayResult::Whack); // +45 -> 45
    // Escape.
    ledger.record(2, 0, None, 0, PlayResult::Escape); // -10 -> 35
    // Misfire scares the field, no score change.
    ledger.record(-1, 2, Some('9'), 0, PlayResult::Misfire); // 35
    // The scared mole goes down as a miss.
    ledger.record(3, 7, None, 0, PlayResult::ScaredOff); // -20 -> 15
    // Nerves-of-steel whack in the last fifth.
    ledger.record(4, 1, Some('8'), 4, PlayResult::Whack); // +100 -> 115
    // Too-soon strike on a hiding mole.
    ledger.record(-1, 6, Some('1'), 0, PlayResult::TooSoon); // 115
    ledger.record(5, 6, None, 0, PlayResult::ScaredOff); // -30 -> 85

    assert_eq!(ledger.current_score(), 85);
    assert_eq!(ledger.len(), 7);

    let events = ledger.snapshot();
    for window in events.windows(2) {
        assert_eq!(
            window[0].end_score, window[1].start_score,
            "running totals must chain"
        );
    }
    let deltas: Vec<i32> = events.iter().map(|e| e.delta()).collect();
    assert_eq!(deltas, vec![45, -10, 0, -20, 100, 0, -30]);
}

#[test]
fn penalties_never_take_the_total_below_zero() {
    let ledger = ScoreLedger::new();
    ledger.record(1, 0, Some('7'), 2, PlayResult::Whack); // +20 -> 20
    for mole in 2..8 {
        ledger.record(mole, 1, None, 0, PlayResult::Escape);
    }
    assert_eq!(ledger.current_score(), 0);
    for event in ledger.snapshot() {
        assert!(event.end_score >= 0);
        assert!(event.start_score + event.delta() == event.end_score);
    }
}

#[test]
fn sheet_renumbering_is_sequential_and_leaves_misfires_alone() {
    let ledger = ScoreLedger::new();
    // Workers finish out of order, so mole numbers arrive shuffled.
    ledger.record(2, 0, Some('7'), 0, PlayResult::Whack);
    ledger.record(-1, 3, Some('4'), 0, PlayResult::Misfire);
    ledger.record(3, 1, None, 0, PlayResult::Escape);
    ledger.record(1, 2, Some('9'), 1, PlayResult::Whack);

    let mut events = ledger.snapshot();
    view::renumber(&mut events);
    let moles: Vec<i32> = events.iter().map(|e| e.mole).collect();
    assert_eq!(moles, vec![1, -1, 2, 3]);

    // Renumbering works on a copy; the ledger itself is untouched.
    assert_eq!(ledger.get(0).unwrap().mole, 2);
}
