//! Progress & Outcome Controller
//!
//! Decides when play is over, grants completed items, and sequences the
//! end-of-session messages.
//!
//! ```text
//! FadingIn ─► Intro ─► Playing ─► Finished(Won|Lost) ─► Reporting[0..4] ─► Exiting ─► Closed
//!                         │                                                   ▲
//!                         └────────────── cancel ─────────────────────────────┘
//! ```

use serde::{Serialize, Deserialize};
use tracing::{info, warn};

use crate::game::catalog::ItemId;
use crate::game::grid::SLOT_COUNT;
use crate::game::host::{Host, SoundCue};
use crate::game::state::{BuriedItem, SessionState};

/// How play ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every configured item was found
    Won,
    /// The wall collapsed first
    Lost,
    /// The player backed out
    Cancelled,
}

/// Session phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Screen fading in
    FadingIn {
        /// Ticks until the intro message
        ticks_remaining: u16,
    },
    /// Intro message up, waiting for confirm
    Intro,
    /// Digging
    Playing,
    /// Result message up, waiting for confirm
    Finished(Outcome),
    /// Report message for `slot` up, waiting for confirm
    Reporting {
        /// Slot being reported
        slot: u8,
    },
    /// Screen fading out
    Exiting {
        /// Ticks until teardown
        ticks_remaining: u16,
    },
    /// Torn down, continuation has run
    Closed,
}

impl SessionPhase {
    /// Short name for logs and events.
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::FadingIn { .. } => "FadingIn",
            SessionPhase::Intro => "Intro",
            SessionPhase::Playing => "Playing",
            SessionPhase::Finished(Outcome::Won) => "Won",
            SessionPhase::Finished(Outcome::Lost) => "Lost",
            SessionPhase::Finished(Outcome::Cancelled) => "Cancelled",
            SessionPhase::Reporting { .. } => "Reporting",
            SessionPhase::Exiting { .. } => "Exiting",
            SessionPhase::Closed => "Closed",
        }
    }
}

// =============================================================================
// TERMINAL CONDITIONS
// =============================================================================

/// Won if every configured slot is found, else Lost if the crack reached
/// `crack_limit`. Won is checked first.
pub fn check_outcome(state: &SessionState, crack_limit: u8) -> Option<Outcome> {
    if state.items_configured() > 0 && state.all_items_found() {
        Some(Outcome::Won)
    } else if state.crack_position() >= crack_limit {
        Some(Outcome::Lost)
    } else {
        None
    }
}

// =============================================================================
// AWARDS
// =============================================================================

/// Grant the item in a slot that just completed.
///
/// Plays the found cue and flashes the slot, then offers the item to the
/// bag once. A refusal is remembered for the report; the item is not
/// offered again. Returns whether the bag accepted it.
pub fn award_item<H: Host>(state: &mut SessionState, host: &mut H, slot: usize) -> bool {
    let item = state.buried_item_id(slot);
    host.play_cue(SoundCue::ItemFound);
    host.flash_slot(slot);

    let stored = host.add_to_inventory(item, 1);
    state.slot_mut(slot).bag_full = !stored;
    if stored {
        info!("Slot {} found: {}", slot, item.name());
    } else {
        warn!("Slot {} found: {} but the bag is full", slot, item.name());
    }
    stored
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Shown after the fade-in.
pub fn intro_message(items: usize) -> String {
    format!("Something pinged in the wall!\n{} confirmed!", items)
}

/// Shown when play ends; cancelling skips straight to the exit.
pub fn outcome_message(outcome: Outcome) -> Option<&'static str> {
    match outcome {
        Outcome::Won => Some("Everything was dug up!"),
        Outcome::Lost => Some("The wall collapsed!"),
        Outcome::Cancelled => None,
    }
}

/// Report line for a slot, if it has one.
///
/// Unused and unfound slots are skipped.
pub fn report_message(slot: &BuriedItem) -> Option<String> {
    if !slot.is_configured() || !slot.found {
        return None;
    }
    if slot.bag_full {
        Some("Too bad!\nYour Bag is full!".to_owned())
    } else {
        Some(format!("{}\nwas obtained!", slot.item_id.name()))
    }
}

/// First slot at or after `from` with a report line.
pub fn next_report(state: &SessionState, from: usize) -> Option<(usize, String)> {
    (from..SLOT_COUNT).find_map(|slot| report_message(state.slot(slot)).map(|text| (slot, text)))
}

// =============================================================================
// SUMMARY
// =============================================================================

/// End-of-session result, for logging and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// How play ended, if it has
    pub outcome: Option<Outcome>,
    /// Items granted
    pub obtained: Vec<ItemId>,
    /// Items found but refused by the bag
    pub refused: Vec<ItemId>,
    /// Items still buried
    pub missed: Vec<ItemId>,
    /// Final crack position
    pub crack_position: u8,
}

/// Summarize a session's slots.
pub fn summarize(state: &SessionState, outcome: Option<Outcome>) -> SessionSummary {
    let mut summary = SessionSummary {
        outcome,
        crack_position: state.crack_position(),
        ..SessionSummary::default()
    };
    for slot in state.slots().iter().filter(|s| s.is_configured()) {
        match (slot.found, slot.bag_full) {
            (true, false) => summary.obtained.push(slot.item_id),
            (true, true) => summary.refused.push(slot.item_id),
            (false, _) => summary.missed.push(slot.item_id),
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::host::{HeadlessHost, HostCall};

    fn two_item_state() -> SessionState {
        let mut state = SessionState::new(0);
        state.set_buried_item_id(0, ItemId::HARD_STONE);
        state.set_buried_item_id(3, ItemId::EVERSTONE);
        state
    }

    #[test]
    fn test_in_progress() {
        let state = two_item_state();
        assert_eq!(check_outcome(&state, 7), None);
    }

    #[test]
    fn test_won_when_all_found() {
        let mut state = two_item_state();
        state.set_found(0, true);
        assert_eq!(check_outcome(&state, 7), None);
        state.set_found(3, true);
        assert_eq!(check_outcome(&state, 7), Some(Outcome::Won));
    }

    #[test]
    fn test_lost_at_crack_limit() {
        let mut state = two_item_state();
        state.crack.position = 7;
        assert_eq!(check_outcome(&state, 7), Some(Outcome::Lost));
    }

    #[test]
    fn test_won_beats_lost_on_tie() {
        let mut state = two_item_state();
        state.set_found(0, true);
        state.set_found(3, true);
        state.crack.position = 7;
        assert_eq!(check_outcome(&state, 7), Some(Outcome::Won));
    }

    #[test]
    fn test_award_records_bag_full() {
        let mut state = two_item_state();
        let mut host = HeadlessHost::with_bag_capacity(0);

        assert!(!award_item(&mut state, &mut host, 0));
        assert!(state.slot(0).bag_full);
        assert_eq!(host.inventory_requests(), vec![(ItemId::HARD_STONE, 1, false)]);
        assert!(host.calls().contains(&HostCall::FlashSlot(0)));
        assert_eq!(host.cues(), vec![SoundCue::ItemFound]);
    }

    #[test]
    fn test_report_sequence_skips_unfound() {
        let mut state = two_item_state();
        assert!(next_report(&state, 0).is_none());

        state.set_found(3, true);
        let (slot, text) = next_report(&state, 0).unwrap();
        assert_eq!(slot, 3);
        assert_eq!(text, "Everstone\nwas obtained!");
        assert!(next_report(&state, 4).is_none());

        state.set_found(0, true);
        state.slot_mut(0).bag_full = true;
        assert_eq!(next_report(&state, 0).unwrap(), (0, "Too bad!\nYour Bag is full!".to_owned()));
    }

    #[test]
    fn test_messages() {
        assert_eq!(intro_message(3), "Something pinged in the wall!\n3 confirmed!");
        assert_eq!(outcome_message(Outcome::Lost), Some("The wall collapsed!"));
        assert_eq!(outcome_message(Outcome::Cancelled), None);
    }

    #[test]
    fn test_summary_buckets() {
        let mut state = two_item_state();
        state.set_found(0, true);
        let summary = summarize(&state, Some(Outcome::Lost));
        assert_eq!(summary.obtained, vec![ItemId::HARD_STONE]);
        assert_eq!(summary.missed, vec![ItemId::EVERSTONE]);
        assert!(summary.refused.is_empty());
    }
}
