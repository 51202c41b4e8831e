//! Input Capture and Recording
//!
//! The host's input layer reduces the pad to one [`InputFrame`] per tick:
//! a bit set of buttons that fired this tick (new presses, plus key-repeat
//! for the D-pad). The session acts on at most one of them per tick.
//!
//! Frames can be captured in a delta-compressed [`InputRecording`] and
//! replayed to reproduce a session exactly.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::hash::{StateHash, StateHasher};
use crate::game::state::Tool;

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Buttons that fired during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    /// Packed button bits, see the `FLAG_*` constants
    pub buttons: u8,
}

/// The single action a tick resolves to during play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerAction {
    /// Strike at the cursor
    Dig,
    /// Move the cursor one cell
    Move {
        /// Column delta
        dx: i8,
        /// Row delta
        dy: i8,
    },
    /// Switch tools
    SelectTool(Tool),
    /// Leave the minigame
    Cancel,
}

impl InputFrame {
    /// A: dig / confirm message
    pub const FLAG_CONFIRM: u8 = 0x01;
    /// B: leave
    pub const FLAG_CANCEL: u8 = 0x02;
    /// D-pad left
    pub const FLAG_LEFT: u8 = 0x04;
    /// D-pad right
    pub const FLAG_RIGHT: u8 = 0x08;
    /// D-pad up
    pub const FLAG_UP: u8 = 0x10;
    /// D-pad down
    pub const FLAG_DOWN: u8 = 0x20;
    /// R: select hammer
    pub const FLAG_HAMMER: u8 = 0x40;
    /// L: select pickaxe
    pub const FLAG_PICKAXE: u8 = 0x80;

    /// Empty frame.
    pub const fn new() -> Self {
        Self { buttons: 0 }
    }

    /// Frame with the given button bits set.
    pub const fn with(buttons: u8) -> Self {
        Self { buttons }
    }

    /// A pressed.
    pub const fn confirm() -> Self {
        Self::with(Self::FLAG_CONFIRM)
    }

    /// B pressed.
    pub const fn cancel() -> Self {
        Self::with(Self::FLAG_CANCEL)
    }

    /// Whether any bit in `flag` is set.
    #[inline]
    pub fn pressed(&self, flag: u8) -> bool {
        self.buttons & flag != 0
    }

    /// Confirm pressed this tick.
    #[inline]
    pub fn confirm_pressed(&self) -> bool {
        self.pressed(Self::FLAG_CONFIRM)
    }

    /// Cancel pressed this tick.
    #[inline]
    pub fn cancel_pressed(&self) -> bool {
        self.pressed(Self::FLAG_CANCEL)
    }

    /// No button fired.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.buttons == 0
    }

    /// Resolve to one action: dig, left, right, up, down, hammer, pickaxe,
    /// cancel, first match wins.
    pub fn action(&self) -> Option<PlayerAction> {
        if self.pressed(Self::FLAG_CONFIRM) {
            Some(PlayerAction::Dig)
        } else if self.pressed(Self::FLAG_LEFT) {
            Some(PlayerAction::Move { dx: -1, dy: 0 })
        } else if self.pressed(Self::FLAG_RIGHT) {
            Some(PlayerAction::Move { dx: 1, dy: 0 })
        } else if self.pressed(Self::FLAG_UP) {
            Some(PlayerAction::Move { dx: 0, dy: -1 })
        } else if self.pressed(Self::FLAG_DOWN) {
            Some(PlayerAction::Move { dx: 0, dy: 1 })
        } else if self.pressed(Self::FLAG_HAMMER) {
            Some(PlayerAction::SelectTool(Tool::Hammer))
        } else if self.pressed(Self::FLAG_PICKAXE) {
            Some(PlayerAction::SelectTool(Tool::Pickaxe))
        } else if self.pressed(Self::FLAG_CANCEL) {
            Some(PlayerAction::Cancel)
        } else {
            None
        }
    }
}

/// Delta-compressed input entry.
///
/// Only stored when input CHANGES (not every tick).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u32,
    /// The new input state
    pub frame: InputFrame,
}

// =============================================================================
// RECORDING
// =============================================================================

/// Recording encode/decode failures.
#[derive(Debug, Error)]
pub enum RecordingError {
    /// bincode rejected the bytes
    #[error("recording codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Deltas out of tick order
    #[error("delta at tick {tick} is not after tick {previous}")]
    OutOfOrder {
        /// Offending tick
        tick: u32,
        /// Tick of the delta before it
        previous: u32,
    },
}

/// Complete input recording for one session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputRecording {
    /// Seed the session was started with
    pub rng_seed: u64,

    /// Last tick recorded
    pub end_tick: u32,

    /// Only ticks where input CHANGED
    deltas: Vec<InputDelta>,

    /// Last recorded input (for delta comparison)
    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputRecording {
    /// Start recording a session.
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_frame: InputFrame::new(),
        }
    }

    /// Record input for a tick.
    pub fn record(&mut self, tick: u32, frame: InputFrame) {
        self.end_tick = tick;
        if frame != self.last_frame {
            self.deltas.push(InputDelta { tick, frame });
            self.last_frame = frame;
        }
    }

    /// Input at a specific tick.
    pub fn input_at(&self, tick: u32) -> InputFrame {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].frame
        }
    }

    /// All deltas.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Iterate `(tick, frame)` for every tick from 0 to `end_tick`.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: 0,
            delta_idx: 0,
            current_frame: InputFrame::new(),
        }
    }

    /// Digest of the recording contents.
    pub fn digest(&self) -> StateHash {
        let mut hasher = StateHasher::for_input_recording();
        hasher.update_u64(self.rng_seed);
        hasher.update_u32(self.end_tick);
        for delta in &self.deltas {
            hasher.update_u32(delta.tick);
            hasher.update_u8(delta.frame.buttons);
        }
        hasher.finalize()
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordingError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode and check tick ordering.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordingError> {
        let mut recording: Self = bincode::deserialize(bytes)?;
        for pair in recording.deltas.windows(2) {
            if pair[1].tick <= pair[0].tick {
                return Err(RecordingError::OutOfOrder { tick: pair[1].tick, previous: pair[0].tick });
            }
        }
        recording.last_frame = recording.deltas.last().map(|d| d.frame).unwrap_or_default();
        Ok(recording)
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    delta_idx: usize,
    current_frame: InputFrame,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, InputFrame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.recording.end_tick {
            return None;
        }

        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current_frame = delta.frame;
            self.delta_idx += 1;
        }

        let result = (self.current_tick, self.current_frame);
        self.current_tick += 1;
        Some(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================
