//! Terrain Tilemap
//!
//! Maps layer depth and crack state to tiles on the 32×32 terrain layer.
//! Each grid cell is a 2×2 block of tiles; the dig site starts four tile
//! rows down, leaving rows 0-3 for the crack strip across the top.
//!
//! The renderer keeps its own copy of the layer (entry = `tile | palette << 12`)
//! and forwards every write to the host.

use std::collections::TryReserveError;

use crate::game::dig::CrackStep;
use crate::game::grid::CellPos;
use crate::game::host::{BgLayer, Host};
use crate::game::state::SessionState;

/// Tilemap side length in tiles.
pub const TILEMAP_DIM: usize = 32;

/// Palette bank used for terrain and cracks.
pub const TERRAIN_PALETTE: u8 = 1;

/// First tile row of the dig site.
pub const SITE_TOP_TILE_ROW: u8 = 4;

/// Tile columns the crack strip shifts left per crack position.
const CRACK_SHIFT_PER_POSITION: i16 = 3;

/// Tiles for one cell at each depth: top-left, top-right, bottom-left, bottom-right.
const DEPTH_TILES: [[u16; 4]; 7] = [
    [0x20, 0x21, 0x24, 0x25],
    [0x19, 0x1A, 0x1E, 0x1F],
    [0x10, 0x11, 0x15, 0x16],
    [0x0C, 0x0D, 0x12, 0x13],
    [0x05, 0x06, 0x0A, 0x0B],
    [0x01, 0x02, 0x03, 0x04],
    [0x00, 0x00, 0x00, 0x00],
];

/// `(tile, column, row)` writes per crack frame, columns before shifting.
const CRACK_FRAME_TILES: [&[(u16, u8, u8)]; 7] = [
    &[
        (0x07, 21, 1), (0x08, 22, 1), (0x09, 23, 1),
        (0x0E, 22, 2), (0x0F, 23, 2),
        (0x14, 23, 3),
    ],
    &[
        (0x17, 21, 0), (0x18, 22, 0),
        (0x1B, 21, 1), (0x1C, 22, 1), (0x1D, 23, 1),
        (0x22, 22, 2), (0x23, 23, 2),
        (0x26, 23, 3),
    ],
    &[
        (0x27, 20, 0), (0x28, 21, 0), (0x29, 22, 0),
        (0x2A, 20, 1), (0x2B, 21, 1), (0x2C, 22, 1), (0x2D, 23, 1),
        (0x2E, 21, 2), (0x2F, 22, 2), (0x30, 23, 2),
        (0x26, 23, 3),
    ],
    &[
        (0x00, 20, 0), (0x00, 21, 0), (0x00, 22, 0),
        (0x31, 22, 0),
        (0x32, 20, 1), (0x33, 21, 1), (0x34, 22, 1), (0x2D, 23, 1),
        (0x35, 20, 2), (0x36, 21, 2), (0x37, 22, 2), (0x30, 23, 2),
        (0x26, 23, 3),
    ],
    &[
        (0x00, 20, 0), (0x00, 21, 0), (0x00, 22, 0),
        (0x38, 22, 0),
        (0x39, 20, 1), (0x3A, 21, 1), (0x3B, 22, 1), (0x2D, 23, 1),
        (0x3C, 19, 2), (0x3D, 20, 2), (0x3E, 21, 2), (0x3F, 22, 2), (0x30, 23, 2),
        (0x40, 19, 3), (0x41, 20, 3), (0x42, 21, 3), (0x26, 23, 3),
    ],
    &[
        (0x43, 20, 1), (0x44, 21, 1), (0x3B, 22, 1), (0x2D, 23, 1),
        (0x45, 19, 2), (0x46, 20, 2), (0x47, 21, 2), (0x3F, 22, 2), (0x30, 23, 2),
        (0x48, 19, 3), (0x49, 20, 3), (0x4A, 21, 3), (0x26, 23, 3),
    ],
    &[
        (0x00, 19, 3), (0x00, 20, 3),
        (0x07, 18, 1), (0x08, 19, 1), (0x09, 20, 1), (0x44, 21, 1), (0x3B, 22, 1), (0x2D, 23, 1),
        (0x0E, 19, 2), (0x0F, 20, 2), (0x4B, 21, 2), (0x3F, 22, 2), (0x30, 23, 2),
        (0x14, 20, 3), (0x4A, 21, 3), (0x26, 23, 3),
    ],
];

/// Tiles for a cell at `depth` (depths past 6 draw as cleared).
pub fn depth_tiles(depth: u8) -> [u16; 4] {
    DEPTH_TILES[(depth as usize).min(DEPTH_TILES.len() - 1)]
}

/// Owner of the terrain layer's tile buffer.
#[derive(Debug)]
pub struct TerrainRenderer {
    tilemap: Vec<u16>,
}

impl TerrainRenderer {
    /// Allocate the tile buffer, reporting failure instead of aborting.
    pub fn new() -> Result<Self, TryReserveError> {
        let mut tilemap = Vec::new();
        tilemap.try_reserve_exact(TILEMAP_DIM * TILEMAP_DIM)?;
        tilemap.resize(TILEMAP_DIM * TILEMAP_DIM, 0);
        Ok(Self { tilemap })
    }

    /// Raw entry at tile `(x, y)`.
    pub fn entry(&self, x: u8, y: u8) -> u16 {
        self.tilemap[y as usize * TILEMAP_DIM + x as usize]
    }

    /// Whole buffer, row-major.
    pub fn tilemap(&self) -> &[u16] {
        &self.tilemap
    }

    fn write<H: Host>(&mut self, host: &mut H, x: u8, y: u8, tile: u16) {
        debug_assert!((x as usize) < TILEMAP_DIM && (y as usize) < TILEMAP_DIM);
        self.tilemap[y as usize * TILEMAP_DIM + x as usize] = tile | (TERRAIN_PALETTE as u16) << 12;
        host.draw_tile(BgLayer::Terrain, x, y, tile, TERRAIN_PALETTE);
    }

    /// Redraw one cell at its current depth.
    pub fn draw_cell<H: Host>(&mut self, host: &mut H, state: &SessionState, pos: CellPos) {
        let [tl, tr, bl, br] = depth_tiles(state.layer(pos));
        let x = pos.col * 2;
        let y = pos.row * 2 + SITE_TOP_TILE_ROW;
        self.write(host, x, y, tl);
        self.write(host, x + 1, y, tr);
        self.write(host, x, y + 1, bl);
        self.write(host, x + 1, y + 1, br);
    }

    /// Redraw every cell.
    pub fn draw_site<H: Host>(&mut self, host: &mut H, state: &SessionState) {
        for pos in CellPos::all() {
            self.draw_cell(host, state, pos);
        }
    }

    /// Draw the crack frame a step reported.
    pub fn draw_crack<H: Host>(&mut self, host: &mut H, step: CrackStep) {
        let Some(frame) = CRACK_FRAME_TILES.get(step.frame as usize) else {
            return;
        };
        let shift = step.position as i16 * CRACK_SHIFT_PER_POSITION;
        for &(tile, col, row) in frame.iter() {
            let x = col as i16 - shift;
            // The strip runs off the left edge at the last positions.
            if x < 0 {
                continue;
            }
            self.write(host, x as u8, row, tile);
        }
    }
}
