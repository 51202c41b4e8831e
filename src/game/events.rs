//! Game Events
//!
//! Events generated during a session for logging and replay comparison.

use serde::{Serialize, Deserialize};

use crate::game::catalog::ItemId;
use crate::game::outcome::Outcome;
use crate::game::state::Tool;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Tool hits first
    Dig = 0,
    /// Then wall damage
    Crack = 1,
    /// Then reveals and awards
    Reveal = 2,
    /// Then phase transitions
    Phase = 3,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A tool struck the wall
    ToolUsed {
        /// Tool used
        tool: Tool,
        /// Cursor column
        col: u8,
        /// Cursor row
        row: u8,
        /// Cells hit
        cells: u8,
        /// Center was already dug up
        blocked: bool,
    },

    /// The crack moved to a new position
    CrackAdvanced {
        /// New position
        position: u8,
    },

    /// Cursor moved
    CursorMoved {
        /// New column
        col: u8,
        /// New row
        row: u8,
    },

    /// Tool selection changed
    ToolSelected {
        /// New tool
        tool: Tool,
    },

    /// Footprint cells of a slot were uncovered
    CellsRevealed {
        /// Slot
        slot: u8,
        /// Cells uncovered this tick
        count: u8,
    },

    /// Every cell of a slot has been uncovered
    ItemFound {
        /// Slot
        slot: u8,
        /// Reward
        item: ItemId,
        /// The inventory accepted it
        stored: bool,
    },

    /// Session phase changed
    PhaseChanged {
        /// Previous phase name
        old_phase: String,
        /// New phase name
        new_phase: String,
    },

    /// Play is over
    SessionEnded {
        /// How it ended
        outcome: Outcome,
        /// Items found
        items_found: u8,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Slot involved (for tie-breaking)
    pub slot: Option<u8>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let slot = match &data {
            GameEventData::CellsRevealed { slot, .. } => Some(*slot),
            GameEventData::ItemFound { slot, .. } => Some(*slot),
            _ => None,
        };

        Self { tick, priority, slot, data }
    }

    /// Create tool used event.
    pub fn tool_used(tick: u32, tool: Tool, col: u8, row: u8, cells: u8, blocked: bool) -> Self {
        Self::new(
            tick,
            EventPriority::Dig,
            GameEventData::ToolUsed { tool, col, row, cells, blocked },
        )
    }

    /// Create crack advanced event.
    pub fn crack_advanced(tick: u32, position: u8) -> Self {
        Self::new(tick, EventPriority::Crack, GameEventData::CrackAdvanced { position })
    }

    /// Create item found event.
    pub fn item_found(tick: u32, slot: u8, item: ItemId, stored: bool) -> Self {
        Self::new(tick, EventPriority::Reveal, GameEventData::ItemFound { slot, item, stored })
    }

    /// Create phase changed event.
    pub fn phase_changed(tick: u32, old_phase: impl Into<String>, new_phase: impl Into<String>) -> Self {
        Self::new(
            tick,
            EventPriority::Phase,
            GameEventData::PhaseChanged {
                old_phase: old_phase.into(),
                new_phase: new_phase.into(),
            },
        )
    }

    /// Create session ended event.
    pub fn session_ended(tick: u32, outcome: Outcome, items_found: u8) -> Self {
        Self::new(tick, EventPriority::Phase, GameEventData::SessionEnded { outcome, items_found })
    }
}

impl GameEvent {
    /// Processing order: tick, then priority, then slot.
    ///
    /// Events that tie keep their emission order under a stable sort.
    pub fn processing_order(&self, other: &Self) -> std::cmp::Ordering {
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.slot.cmp(&other.slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let dig = GameEvent::tool_used(10, Tool::Hammer, 1, 1, 9, false);
        let found0 = GameEvent::item_found(10, 0, ItemId::REVIVE, true);
        let found2 = GameEvent::item_found(10, 2, ItemId::EVERSTONE, true);
        let later = GameEvent::crack_advanced(11, 1);

        assert!(dig.processing_order(&found0).is_lt());
        assert!(found0.processing_order(&found2).is_lt());
        assert!(found2.processing_order(&later).is_lt());
    }

    #[test]
    fn test_equality_compares_data() {
        let crack = GameEvent::crack_advanced(4, 1);
        let further = GameEvent::crack_advanced(4, 2);

        assert!(crack.processing_order(&further).is_eq());
        assert_ne!(crack, further);
        assert_eq!(crack, GameEvent::crack_advanced(4, 1));
    }

    #[test]
    fn test_slot_extracted() {
        assert_eq!(GameEvent::item_found(1, 3, ItemId::REVIVE, false).slot, Some(3));
        assert_eq!(GameEvent::crack_advanced(1, 2).slot, None);
    }
}
