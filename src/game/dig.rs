//! Dig Engine
//!
//! Tool hits erode the layer map around the cursor and wear the wall's
//! crack counter. A separate reveal scan, run every tick, turns fully
//! cleared item and stone cells into dug-up cells and counts per-slot
//! progress.
//!
//! ## Neighborhoods
//!
//! ```text
//!   pickaxe        hammer
//!   . X .          X X X
//!   X X X          X X X
//!   . X .          X X X
//! ```
//!
//! Cells past a grid edge are skipped. Depth is clamped at 6.

#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::game::grid::{CellPos, OccupancyTag, DEPTH_CLEARED, SLOT_COUNT};
use crate::game::state::{CrackState, SessionState, Tool};

/// Highest crack position the counter can hold.
pub const MAX_CRACK_POSITION: u8 = 7;

/// Crack animation frames per position.
pub const CRACK_FRAMES: u8 = 7;

const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

// =============================================================================
// TOOL HITS
// =============================================================================

/// Result of one tool activation on the layer map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DigResult {
    /// The cursor cell was already dug up; nothing changed
    pub blocked: bool,
    /// Cells hit, in update order (includes cells already at depth 6)
    pub touched: Vec<CellPos>,
}

fn erode(state: &mut SessionState, pos: CellPos, touched: &mut Vec<CellPos>) {
    let depth = state.layer(pos);
    let next = (depth + 1).min(DEPTH_CLEARED);
    state.set_layer(pos, next);
    touched.push(pos);

    #[cfg(feature = "debug-tracing")]
    trace!("erode ({}, {}) {} -> {}", pos.col, pos.row, depth, next);
}

/// Plus-shaped hit: the four orthogonal neighbors, then the center.
///
/// Does nothing when the center cell is already dug up.
pub fn pickaxe(state: &mut SessionState, at: CellPos) -> DigResult {
    let mut result = DigResult::default();
    if state.occupancy(at) == OccupancyTag::DugUp {
        result.blocked = true;
        return result;
    }

    for (dx, dy) in ORTHOGONAL {
        if let Some(pos) = at.offset(dx, dy) {
            erode(state, pos, &mut result.touched);
        }
    }
    erode(state, at, &mut result.touched);
    result
}

/// Pickaxe hit plus the four diagonals, unless the pickaxe was blocked.
pub fn hammer(state: &mut SessionState, at: CellPos) -> DigResult {
    let mut result = pickaxe(state, at);
    if result.blocked {
        return result;
    }

    for (dx, dy) in DIAGONAL {
        if let Some(pos) = at.offset(dx, dy) {
            erode(state, pos, &mut result.touched);
        }
    }
    result
}

/// Hit at the cursor with the selected tool.
pub fn apply_tool(state: &mut SessionState) -> DigResult {
    let at = state.cursor;
    match state.tool {
        Tool::Pickaxe => pickaxe(state, at),
        Tool::Hammer => hammer(state, at),
    }
}

// =============================================================================
// CRACK COUNTER
// =============================================================================

/// One crack advancement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CrackStep {
    /// Position the frame was drawn at
    pub position: u8,
    /// Frame drawn
    pub frame: u8,
    /// The position counter moved on
    pub advanced: bool,
}

/// Advance the crack after a tool activation.
///
/// Frames 0-4 step by one, or two with the hammer. Frame 5 steps by one.
/// Frame 6 wraps to 1 and moves the position on.
pub fn advance_crack(crack: &mut CrackState, tool: Tool) -> CrackStep {
    let step = CrackStep {
        position: crack.position,
        frame: crack.frame,
        advanced: false,
    };

    match crack.frame {
        0..=4 => {
            crack.frame += if tool == Tool::Hammer { 2 } else { 1 };
            step
        }
        5 => {
            crack.frame += 1;
            step
        }
        _ => {
            crack.frame = 1;
            crack.position = (crack.position + 1).min(MAX_CRACK_POSITION);
            CrackStep { advanced: true, ..step }
        }
    }
}

// =============================================================================
// REVEAL SCAN
// =============================================================================

/// What one reveal scan changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealReport {
    /// Cells collected this scan, per slot
    pub collected: [u8; SLOT_COUNT],
    /// Slots that reached their threshold this scan
    pub completed: Vec<usize>,
    /// Stone cells cleared this scan
    pub stones_cleared: u8,
    /// Every cell recoded to dug-up, in scan order
    pub recoded: Vec<CellPos>,
}

impl RevealReport {
    /// Nothing changed.
    pub fn is_empty(&self) -> bool {
        self.recoded.is_empty()
    }
}

/// Collect fully cleared cells and complete slots that reach their threshold.
///
/// A completed slot is marked found and its counter parked one past the
/// threshold, so completion is reported exactly once.
pub fn reveal_scan(state: &mut SessionState) -> RevealReport {
    let mut report = RevealReport::default();

    for slot in 0..SLOT_COUNT {
        let progress = *state.progress(slot);
        if progress.threshold == 0 || progress.collected > progress.threshold {
            continue;
        }

        let tag = OccupancyTag::item(slot);
        let mut collected = progress.collected;
        for pos in CellPos::all() {
            if state.occupancy(pos) == tag && state.layer(pos) == DEPTH_CLEARED {
                state.set_occupancy(pos, OccupancyTag::DugUp);
                collected += 1;
                report.collected[slot] += 1;
                report.recoded.push(pos);
            }
        }

        if collected == progress.threshold {
            state.set_found(slot, true);
            collected = progress.threshold + 1;
            report.completed.push(slot);
        }
        state.progress_mut(slot).collected = collected;
    }

    for pos in CellPos::all() {
        if state.occupancy(pos) == OccupancyTag::Stone && state.layer(pos) == DEPTH_CLEARED {
            state.set_occupancy(pos, OccupancyTag::DugUp);
            report.stones_cleared += 1;
            report.recoded.push(pos);
        }
    }

    report
}
