//! Whole-session scenarios through the public API.

use std::cell::Cell;
use std::rc::Rc;

use excavation::{
    ExcavationConfig, ExcavationSession, HeadlessHost, InputFrame, Outcome, RandomSource, SessionPhase,
    game::{
        catalog::{ItemId, ItemKind},
        dig::{pickaxe, reveal_scan},
        grid::{CellPos, OccupancyTag},
        host::SoundCue,
        outcome::award_item,
        placement::place_item,
        state::SessionState,
        tick::{tick, replay_session},
    },
    InputRecording,
};

const TICK_LIMIT: u32 = 20_000;

fn config() -> ExcavationConfig {
    ExcavationConfig { fade_ticks: 4, ..ExcavationConfig::default() }
}

/// Always accepts the first candidate cell.
struct AcceptAll;

impl RandomSource for AcceptAll {
    fn next_u32(&mut self) -> u32 {
        u32::MAX
    }
}

fn step_toward(cursor: CellPos, target: CellPos) -> InputFrame {
    let flag = if cursor.col < target.col {
        InputFrame::FLAG_RIGHT
    } else if cursor.col > target.col {
        InputFrame::FLAG_LEFT
    } else if cursor.row < target.row {
        InputFrame::FLAG_DOWN
    } else if cursor.row > target.row {
        InputFrame::FLAG_UP
    } else {
        InputFrame::FLAG_CONFIRM
    };
    InputFrame::with(flag)
}

/// Confirms messages, and while playing asks `play` for the next input.
fn run<F>(session: &mut ExcavationSession, host: &mut HeadlessHost, mut play: F) -> Option<Outcome>
where
    F: FnMut(&ExcavationSession) -> InputFrame,
{
    let mut outcome = None;
    for _ in 0..TICK_LIMIT {
        let input = match session.phase() {
            SessionPhase::Intro | SessionPhase::Finished(_) | SessionPhase::Reporting { .. } => {
                InputFrame::confirm()
            }
            SessionPhase::Playing if !session.is_shaking() => play(session),
            _ => InputFrame::new(),
        };
        let result = tick(session, input, host);
        outcome = outcome.or(result.outcome);
        if result.session_closed {
            break;
        }
    }
    outcome
}

/// Digs every buried item cell with the pickaxe.
fn treasure_hunter(session: &ExcavationSession) -> InputFrame {
    let state = session.state();
    match CellPos::all().find(|&p| matches!(state.occupancy(p), OccupancyTag::Item(_))) {
        Some(target) => step_toward(state.cursor, target),
        None => InputFrame::new(),
    }
}

/// A cell whose 3×3 neighborhood holds no item.
fn barren_cell(state: &SessionState) -> Option<CellPos> {
    CellPos::all().find(|&center| {
        (-1..=1).all(|dy| {
            (-1..=1).all(|dx| {
                center
                    .offset(dx, dy)
                    .map_or(true, |p| !matches!(state.occupancy(p), OccupancyTag::Item(_)))
            })
        })
    })
}

#[test]
fn hard_stone_found_exactly_once() {
    let mut state = SessionState::new(0);
    let mut host = HeadlessHost::new();

    let (anchor, forced) =
        place_item(&mut state, &mut AcceptAll, &ExcavationConfig::default(), 0, ItemKind::HardStone).unwrap();
    assert_eq!(anchor, CellPos { col: 0, row: 0 });
    assert!(!forced);
    assert_eq!(state.progress(0).threshold, 4);

    let footprint = [(0, 0), (1, 0), (0, 1), (1, 1)].map(|(c, r)| CellPos { col: c, row: r });
    for pos in footprint {
        state.set_layer(pos, 5);
    }

    // Three of the four cells clear; not found yet.
    pickaxe(&mut state, CellPos { col: 0, row: 0 });
    let report = reveal_scan(&mut state);
    assert_eq!(report.collected[0], 3);
    assert!(report.completed.is_empty());
    assert!(!state.is_found(0));

    // The last cell completes the slot.
    pickaxe(&mut state, CellPos { col: 1, row: 1 });
    let report = reveal_scan(&mut state);
    assert_eq!(report.completed, vec![0]);
    for slot in report.completed {
        award_item(&mut state, &mut host, slot);
    }
    assert!(state.is_found(0));

    // Nothing fires again.
    for _ in 0..4 {
        assert!(reveal_scan(&mut state).completed.is_empty());
    }
    assert_eq!(host.inventory_requests(), vec![(ItemId::HARD_STONE, 1, true)]);
    assert_eq!(host.cues(), vec![SoundCue::ItemFound]);
}

#[test]
fn wall_collapse_shows_only_collapse_message() {
    for seed in [3u64, 17, 40] {
        let mut host = HeadlessHost::new();
        let ran = Rc::new(Cell::new(false));
        let inner = Rc::clone(&ran);
        let mut session =
            ExcavationSession::from_seed(config(), seed, &mut host, move || inner.set(true)).unwrap();
        let Some(target) = barren_cell(session.state()) else {
            continue;
        };

        let outcome = run(&mut session, &mut host, |s| {
            if s.state().tool != excavation::game::Tool::Hammer {
                return InputFrame::with(InputFrame::FLAG_HAMMER);
            }
            step_toward(s.state().cursor, target)
        });

        assert_eq!(outcome, Some(Outcome::Lost), "seed {}", seed);
        assert_eq!(session.state().crack_position(), 7);
        assert_eq!(session.state().items_found(), 0);
        assert_eq!(&host.messages()[1..], &["The wall collapsed!"]);
        assert!(host.inventory_requests().is_empty());
        assert!(session.is_closed());
        assert!(ran.get());
    }
}

#[test]
fn finished_sessions_report_each_found_item() {
    for seed in 0..8u64 {
        let mut host = HeadlessHost::new();
        let mut session = ExcavationSession::from_seed(config(), seed, &mut host, || {}).unwrap();

        let outcome = run(&mut session, &mut host, treasure_hunter);
        assert!(matches!(outcome, Some(Outcome::Won) | Some(Outcome::Lost)), "seed {}", seed);
        assert!(session.is_closed());

        let state = session.state();
        let expected_headline = match outcome {
            Some(Outcome::Won) => "Everything was dug up!",
            _ => "The wall collapsed!",
        };
        let mut expected = vec![expected_headline.to_owned()];
        for slot in state.slots().iter().filter(|s| s.found) {
            expected.push(format!("{}\nwas obtained!", slot.item_id.name()));
        }

        let messages = host.messages();
        assert_eq!(&messages[1..], expected.iter().map(String::as_str).collect::<Vec<_>>().as_slice());
        assert_eq!(host.inventory_requests().len(), state.items_found());
        assert_eq!(host.bag().len(), state.items_found());
        if outcome == Some(Outcome::Won) {
            assert_eq!(state.items_found(), state.items_configured());
        }
    }
}

#[test]
fn full_bag_reports_too_bad() {
    let mut any_found = false;
    for seed in 0..8u64 {
        let mut host = HeadlessHost::with_bag_capacity(0);
        let mut session = ExcavationSession::from_seed(config(), seed, &mut host, || {}).unwrap();
        run(&mut session, &mut host, treasure_hunter);

        let found = session.state().items_found();
        any_found |= found > 0;

        let too_bad = host.messages().iter().filter(|m| **m == "Too bad!\nYour Bag is full!").count();
        assert_eq!(too_bad, found, "seed {}", seed);
        assert!(host.bag().is_empty());
        // Each found item was offered exactly once.
        assert_eq!(host.inventory_requests().len(), found);
        assert_eq!(session.summary().refused.len(), found);
    }
    assert!(any_found);
}

#[test]
fn cancel_leaves_without_awards() {
    let mut host = HeadlessHost::new();
    let ran = Rc::new(Cell::new(false));
    let inner = Rc::clone(&ran);
    let mut session = ExcavationSession::from_seed(config(), 9, &mut host, move || inner.set(true)).unwrap();

    let outcome = run(&mut session, &mut host, |_| InputFrame::cancel());

    assert_eq!(outcome, Some(Outcome::Cancelled));
    assert!(session.is_closed());
    assert!(ran.get());
    assert_eq!(host.messages().len(), 1);
    assert!(host.inventory_requests().is_empty());
    assert_eq!(host.cues(), vec![SoundCue::Exit]);
}

#[test]
fn invalid_config_returns_control_without_drawing() {
    let mut host = HeadlessHost::new();
    let ran = Rc::new(Cell::new(false));
    let inner = Rc::clone(&ran);
    let config = ExcavationConfig { crack_limit: 9, ..ExcavationConfig::default() };

    let result = ExcavationSession::from_seed(config, 1, &mut host, move || inner.set(true));

    assert!(result.is_err());
    assert!(ran.get());
    assert!(host.is_untouched());
}

#[test]
fn recorded_session_replays_to_same_hash() {
    let mut host = HeadlessHost::new();
    let mut session = ExcavationSession::from_seed(config(), 2024, &mut host, || {}).unwrap();
    run(&mut session, &mut host, treasure_hunter);

    let bytes = session.recording().to_bytes().unwrap();
    let recording = InputRecording::from_bytes(&bytes).unwrap();
    assert_eq!(recording.digest(), session.recording().digest());

    let (hash, events) = replay_session(&config(), &recording).unwrap();
    assert_eq!(hash, session.compute_hash());
    assert!(!events.is_empty());
}
