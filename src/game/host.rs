//! Host Collaborators
//!
//! The minigame never touches graphics, audio, text or the bag directly.
//! Everything visible goes through the [`Host`] trait, which the embedding
//! game implements. [`HeadlessHost`] is an in-memory implementation that
//! records every call; the demo binary and the tests drive sessions with it.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::catalog::{ItemId, ItemKind, StoneKind};
use crate::game::state::Tool;

// =============================================================================
// HANDLES & ASSETS
// =============================================================================

/// Opaque handle to a placed visual.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u32);

/// Background layer a tile is written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BgLayer {
    /// Dirt strata and the crack strip
    Terrain,
}

/// What a visual shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualAsset {
    /// Selection cursor
    Cursor,
    /// Tool selector button
    ToolButton(Tool),
    /// Buried item
    Item(ItemKind),
    /// Buried stone
    Stone(StoneKind),
    /// Impact flash at the cursor
    HitEffect(Tool),
    /// Swinging tool next to the cursor
    HitTool(Tool),
}

/// Sound cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Hammer strike
    HammerHit,
    /// Pickaxe strike
    PickaxeHit,
    /// Tool switched
    Select,
    /// An item was fully uncovered
    ItemFound,
    /// Leaving the minigame
    Exit,
}

/// Screen fade direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fade {
    /// From black
    In,
    /// To black
    Out,
}

// =============================================================================
// HOST TRAIT
// =============================================================================

/// Services the embedding game provides.
///
/// Calls are fire-and-forget except `place_visual` and `add_to_inventory`.
/// Confirm and cancel presses arrive through the tick's `InputFrame`.
pub trait Host {
    /// Overwrite one tile in a background layer.
    fn draw_tile(&mut self, layer: BgLayer, x: u8, y: u8, tile: u16, palette: u8);

    /// Create a visual anchored at a grid cell.
    fn place_visual(&mut self, asset: VisualAsset, col: u8, row: u8, priority: u8) -> VisualHandle;

    /// Show or hide a visual.
    fn set_visual_visible(&mut self, handle: VisualHandle, visible: bool);

    /// Switch a visual's animation frame.
    fn set_visual_frame(&mut self, handle: VisualHandle, frame: u8);

    /// Move a visual to another grid cell.
    fn move_visual(&mut self, handle: VisualHandle, col: u8, row: u8);

    /// Remove a visual.
    fn destroy_visual(&mut self, handle: VisualHandle);

    /// Offset the dig-site layers (screen shake).
    fn set_layer_offset(&mut self, dx: i8, dy: i8);

    /// Grant items. `false` means the bag is full.
    fn add_to_inventory(&mut self, item: ItemId, count: u16) -> bool;

    /// Open the message box with `text`.
    fn show_message(&mut self, text: &str);

    /// Close the message box.
    fn clear_message(&mut self);

    /// Play a sound cue.
    fn play_cue(&mut self, cue: SoundCue);

    /// Flash the palette of the item in `slot`.
    fn flash_slot(&mut self, slot: usize);

    /// Start a screen fade lasting `ticks`.
    fn begin_fade(&mut self, fade: Fade, ticks: u16);
}

// =============================================================================
// HEADLESS HOST
// =============================================================================

/// A recorded host call (tile writes are kept separately, see
/// [`HeadlessHost::tile`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum HostCall {
    PlaceVisual { handle: VisualHandle, asset: VisualAsset, col: u8, row: u8 },
    SetVisible { handle: VisualHandle, visible: bool },
    SetFrame { handle: VisualHandle, frame: u8 },
    MoveVisual { handle: VisualHandle, col: u8, row: u8 },
    DestroyVisual { handle: VisualHandle },
    LayerOffset { dx: i8, dy: i8 },
    AddToInventory { item: ItemId, count: u16, accepted: bool },
    ShowMessage(String),
    ClearMessage,
    PlayCue(SoundCue),
    FlashSlot(usize),
    BeginFade { fade: Fade, ticks: u16 },
}

/// Live state of a visual on the headless host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualRecord {
    /// Asset shown
    pub asset: VisualAsset,
    /// Grid column
    pub col: u8,
    /// Grid row
    pub row: u8,
    /// Visible flag
    pub visible: bool,
    /// Animation frame
    pub frame: u8,
}

/// In-memory [`Host`] that records everything.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    calls: Vec<HostCall>,
    tiles: BTreeMap<(BgLayer, u8, u8), (u16, u8)>,
    tile_writes: usize,
    visuals: BTreeMap<VisualHandle, VisualRecord>,
    next_handle: u32,
    bag: Vec<(ItemId, u16)>,
    bag_capacity: Option<usize>,
    message: Option<String>,
    layer_offset: (i8, i8),
}

impl HeadlessHost {
    /// Host with an unlimited bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose bag refuses items after `capacity` distinct grants.
    pub fn with_bag_capacity(capacity: usize) -> Self {
        Self {
            bag_capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Every recorded call in order.
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Items accepted into the bag.
    pub fn bag(&self) -> &[(ItemId, u16)] {
        &self.bag
    }

    /// Every `add_to_inventory` call, accepted or not.
    pub fn inventory_requests(&self) -> Vec<(ItemId, u16, bool)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::AddToInventory { item, count, accepted } => Some((*item, *count, *accepted)),
                _ => None,
            })
            .collect()
    }

    /// Every message shown, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::ShowMessage(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every cue played, in order.
    pub fn cues(&self) -> Vec<SoundCue> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::PlayCue(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    /// Message currently on screen.
    pub fn current_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Last tile written at a position, with its palette.
    pub fn tile(&self, layer: BgLayer, x: u8, y: u8) -> Option<(u16, u8)> {
        self.tiles.get(&(layer, x, y)).copied()
    }

    /// Total tile writes received.
    pub fn tile_writes(&self) -> usize {
        self.tile_writes
    }

    /// Live visuals.
    pub fn visuals(&self) -> impl Iterator<Item = (&VisualHandle, &VisualRecord)> {
        self.visuals.iter()
    }

    /// Look up a live visual.
    pub fn visual(&self, handle: VisualHandle) -> Option<&VisualRecord> {
        self.visuals.get(&handle)
    }

    /// Current layer offset.
    pub fn layer_offset(&self) -> (i8, i8) {
        self.layer_offset
    }

    /// Whether nothing visible has happened yet.
    pub fn is_untouched(&self) -> bool {
        self.calls.is_empty() && self.tile_writes == 0
    }
}

impl Host for HeadlessHost {
    fn draw_tile(&mut self, layer: BgLayer, x: u8, y: u8, tile: u16, palette: u8) {
        self.tiles.insert((layer, x, y), (tile, palette));
        self.tile_writes += 1;
    }

    fn place_visual(&mut self, asset: VisualAsset, col: u8, row: u8, _priority: u8) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.visuals.insert(handle, VisualRecord { asset, col, row, visible: true, frame: 0 });
        self.calls.push(HostCall::PlaceVisual { handle, asset, col, row });
        handle
    }

    fn set_visual_visible(&mut self, handle: VisualHandle, visible: bool) {
        if let Some(v) = self.visuals.get_mut(&handle) {
            v.visible = visible;
        }
        self.calls.push(HostCall::SetVisible { handle, visible });
    }

    fn set_visual_frame(&mut self, handle: VisualHandle, frame: u8) {
        if let Some(v) = self.visuals.get_mut(&handle) {
            v.frame = frame;
        }
        self.calls.push(HostCall::SetFrame { handle, frame });
    }

    fn move_visual(&mut self, handle: VisualHandle, col: u8, row: u8) {
        if let Some(v) = self.visuals.get_mut(&handle) {
            v.col = col;
            v.row = row;
        }
        self.calls.push(HostCall::MoveVisual { handle, col, row });
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.visuals.remove(&handle);
        self.calls.push(HostCall::DestroyVisual { handle });
    }

    fn set_layer_offset(&mut self, dx: i8, dy: i8) {
        self.layer_offset = (dx, dy);
        self.calls.push(HostCall::LayerOffset { dx, dy });
    }

    fn add_to_inventory(&mut self, item: ItemId, count: u16) -> bool {
        let accepted = self.bag_capacity.map_or(true, |cap| self.bag.len() < cap);
        if accepted {
            self.bag.push((item, count));
        }
        debug!("Inventory add {} x{}: {}", item.name(), count, accepted);
        self.calls.push(HostCall::AddToInventory { item, count, accepted });
        accepted
    }

    fn show_message(&mut self, text: &str) {
        self.message = Some(text.to_owned());
        self.calls.push(HostCall::ShowMessage(text.to_owned()));
    }

    fn clear_message(&mut self) {
        self.message = None;
        self.calls.push(HostCall::ClearMessage);
    }

    fn play_cue(&mut self, cue: SoundCue) {
        self.calls.push(HostCall::PlayCue(cue));
    }

    fn flash_slot(&mut self, slot: usize) {
        self.calls.push(HostCall::FlashSlot(slot));
    }

    fn begin_fade(&mut self, fade: Fade, ticks: u16) {
        self.calls.push(HostCall::BeginFade { fade, ticks });
    }
}
