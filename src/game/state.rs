//! Session State
//!
//! Plain data owned by one excavation session: the two per-cell maps,
//! the four buried item slots with their dig progress, the crack counters,
//! and the cursor/tool selection. Behavior lives in `placement`, `dig`
//! and `outcome`; this module only offers bounds-checked accessors.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, compute_state_hash};
use crate::game::catalog::{ItemId, ItemKind, StoneKind};
use crate::game::grid::{CellPos, OccupancyTag, CELL_COUNT, DEPTH_CLEARED, DEPTH_INTACT, SLOT_COUNT};

// =============================================================================
// TOOL
// =============================================================================

/// Active digging tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    /// Red button: 3×3 blast, wears the wall twice as fast
    Hammer,
    /// Blue button: plus-shaped dig
    #[default]
    Pickaxe,
}

impl Tool {
    /// Hash encoding.
    pub fn code(self) -> u8 {
        match self {
            Tool::Pickaxe => 0,
            Tool::Hammer => 1,
        }
    }
}

// =============================================================================
// BURIED ITEMS
// =============================================================================

/// One of the four item slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuriedItem {
    /// Inventory reward, `ItemId::NONE` when the slot is unused
    pub item_id: ItemId,
    /// Catalog shape, set together with `item_id`
    pub kind: Option<ItemKind>,
    /// Anchor cell of the footprint
    pub anchor: Option<CellPos>,
    /// Every footprint cell has been collected
    pub found: bool,
    /// Found, but the inventory refused it
    pub bag_full: bool,
}

impl BuriedItem {
    /// Whether this slot holds an item this session.
    #[inline]
    pub fn is_configured(&self) -> bool {
        !self.item_id.is_none()
    }
}

/// Per-slot dig progress.
///
/// `threshold == 0` means nothing was placed in the slot. After the slot is
/// found `collected` sits at `threshold + 1` so the award fires only once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotProgress {
    /// Footprint cells revealed so far
    pub collected: u8,
    /// Cells required
    pub threshold: u8,
}

/// A placed decorative stone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedStone {
    /// Shape
    pub kind: StoneKind,
    /// Anchor cell
    pub anchor: CellPos,
}

// =============================================================================
// CRACK
// =============================================================================

/// Wall damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrackState {
    /// Outer counter, the wall collapses at the configured limit
    pub position: u8,
    /// Animation frame within the current position, 0..=6
    pub frame: u8,
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// All mutable state of one session.
#[derive(Clone, Debug)]
pub struct SessionState {
    /// Ticks simulated so far
    pub tick: u32,

    /// Seed the layout was generated from
    pub rng_seed: u64,

    /// Erosion depth per cell, 0..=6
    layer_map: [u8; CELL_COUNT],

    /// What is buried under each cell
    occupancy: [OccupancyTag; CELL_COUNT],

    /// Buried item slots
    slots: [BuriedItem; SLOT_COUNT],

    /// Dig progress, parallel to `slots`
    progress: [SlotProgress; SLOT_COUNT],

    /// Stones placed at session start
    pub stones: Vec<PlacedStone>,

    /// Wall damage
    pub crack: CrackState,

    /// Cursor cell
    pub cursor: CellPos,

    /// Selected tool
    pub tool: Tool,
}

impl SessionState {
    /// Fresh state: intact rock everywhere, nothing buried.
    pub fn new(rng_seed: u64) -> Self {
        Self {
            tick: 0,
            rng_seed,
            layer_map: [DEPTH_INTACT; CELL_COUNT],
            occupancy: [OccupancyTag::Empty; CELL_COUNT],
            slots: [BuriedItem::default(); SLOT_COUNT],
            progress: [SlotProgress::default(); SLOT_COUNT],
            stones: Vec::new(),
            crack: CrackState::default(),
            cursor: CellPos::default(),
            tool: Tool::default(),
        }
    }

    // =========================================================================
    // Cell access
    // =========================================================================

    /// Layer depth at `pos`.
    #[inline]
    pub fn layer(&self, pos: CellPos) -> u8 {
        self.layer_map[pos.index()]
    }

    /// Overwrite layer depth at `pos`.
    #[inline]
    pub fn set_layer(&mut self, pos: CellPos, depth: u8) {
        debug_assert!(depth <= DEPTH_CLEARED, "depth {} past cleared", depth);
        self.layer_map[pos.index()] = depth.min(DEPTH_CLEARED);
    }

    /// Occupancy at `pos`.
    #[inline]
    pub fn occupancy(&self, pos: CellPos) -> OccupancyTag {
        self.occupancy[pos.index()]
    }

    /// Overwrite occupancy at `pos`.
    #[inline]
    pub fn set_occupancy(&mut self, pos: CellPos, tag: OccupancyTag) {
        self.occupancy[pos.index()] = tag;
    }

    /// Whole layer map, row-major.
    pub fn layer_map(&self) -> &[u8; CELL_COUNT] {
        &self.layer_map
    }

    /// Whole occupancy map, row-major.
    pub fn occupancy_map(&self) -> &[OccupancyTag; CELL_COUNT] {
        &self.occupancy
    }

    // =========================================================================
    // Slot access
    // =========================================================================

    /// Slot record.
    #[inline]
    pub fn slot(&self, slot: usize) -> &BuriedItem {
        debug_assert!(slot < SLOT_COUNT, "slot {} out of range", slot);
        &self.slots[slot]
    }

    /// Mutable slot record.
    #[inline]
    pub fn slot_mut(&mut self, slot: usize) -> &mut BuriedItem {
        debug_assert!(slot < SLOT_COUNT, "slot {} out of range", slot);
        &mut self.slots[slot]
    }

    /// All slots in order.
    pub fn slots(&self) -> &[BuriedItem; SLOT_COUNT] {
        &self.slots
    }

    /// Reward item in `slot`.
    pub fn buried_item_id(&self, slot: usize) -> ItemId {
        self.slot(slot).item_id
    }

    /// Set the reward item in `slot`.
    pub fn set_buried_item_id(&mut self, slot: usize, item_id: ItemId) {
        self.slot_mut(slot).item_id = item_id;
    }

    /// Whether `slot` has been dug up.
    pub fn is_found(&self, slot: usize) -> bool {
        self.slot(slot).found
    }

    /// Mark `slot` found or not.
    pub fn set_found(&mut self, slot: usize, found: bool) {
        self.slot_mut(slot).found = found;
    }

    /// Progress record for `slot`.
    #[inline]
    pub fn progress(&self, slot: usize) -> &SlotProgress {
        debug_assert!(slot < SLOT_COUNT, "slot {} out of range", slot);
        &self.progress[slot]
    }

    /// Mutable progress record for `slot`.
    #[inline]
    pub fn progress_mut(&mut self, slot: usize) -> &mut SlotProgress {
        debug_assert!(slot < SLOT_COUNT, "slot {} out of range", slot);
        &mut self.progress[slot]
    }

    /// Number of slots holding an item.
    pub fn items_configured(&self) -> usize {
        self.slots.iter().filter(|s| s.is_configured()).count()
    }

    /// Number of configured slots already found.
    pub fn items_found(&self) -> usize {
        self.slots.iter().filter(|s| s.is_configured() && s.found).count()
    }

    /// Every configured slot has been found.
    pub fn all_items_found(&self) -> bool {
        self.slots.iter().all(|s| !s.is_configured() || s.found)
    }

    /// Current crack position.
    #[inline]
    pub fn crack_position(&self) -> u8 {
        self.crack.position
    }

    // =========================================================================
    // Hashing
    // =========================================================================

    /// Digest of everything that influences future ticks.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_bytes(&self.layer_map);
            for tag in &self.occupancy {
                hasher.update_u8(tag.code());
            }
            for (slot, progress) in self.slots.iter().zip(&self.progress) {
                hasher.update_u16(slot.item_id.0);
                hasher.update_bool(slot.found);
                hasher.update_bool(slot.bag_full);
                hasher.update_u8(progress.collected);
                hasher.update_u8(progress.threshold);
            }
            hasher.update_u8(self.crack.position);
            hasher.update_u8(self.crack.frame);
            hasher.update_u8(self.cursor.col);
            hasher.update_u8(self.cursor.row);
            hasher.update_u8(self.tool.code());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = SessionState::new(1);
        assert!(state.layer_map().iter().all(|&d| d == DEPTH_INTACT));
        assert!(state.occupancy_map().iter().all(|t| *t == OccupancyTag::Empty));
        assert_eq!(state.cursor, CellPos { col: 0, row: 0 });
        assert_eq!(state.tool, Tool::Pickaxe);
        assert_eq!(state.crack_position(), 0);
        assert_eq!(state.items_configured(), 0);
    }

    #[test]
    fn test_unconfigured_slots_count_as_found() {
        let mut state = SessionState::new(1);
        assert!(state.all_items_found());

        state.set_buried_item_id(0, ItemId::REVIVE);
        assert!(!state.all_items_found());

        state.set_found(0, true);
        assert!(state.all_items_found());
        assert_eq!(state.items_found(), 1);
    }

    #[test]
    fn test_slot_accessors() {
        let mut state = SessionState::new(1);
        state.set_buried_item_id(3, ItemId::EVERSTONE);
        assert_eq!(state.buried_item_id(3), ItemId::EVERSTONE);
        assert!(!state.is_found(3));
        state.set_found(3, true);
        assert!(state.is_found(3));
    }

    #[test]
    fn test_hash_tracks_dig_state() {
        let mut a = SessionState::new(9);
        let b = SessionState::new(9);
        assert_eq!(a.compute_hash(), b.compute_hash());

        let pos = CellPos { col: 3, row: 2 };
        a.set_layer(pos, 5);
        assert_ne!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn test_hash_tracks_seed() {
        assert_ne!(SessionState::new(1).compute_hash(), SessionState::new(2).compute_hash());
    }
}
