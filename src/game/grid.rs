//! Grid Geometry
//!
//! The dig site is a fixed 12×8 matrix of cells stored row-major
//! (`row * 12 + col`). Two parallel per-cell maps live on top of it:
//! the layer map (erosion depth) and the occupancy map (what is buried).

use serde::{Serialize, Deserialize};

/// Cells per row.
pub const GRID_WIDTH: u8 = 12;

/// Rows in the grid.
pub const GRID_HEIGHT: u8 = 8;

/// Total cell count.
pub const CELL_COUNT: usize = GRID_WIDTH as usize * GRID_HEIGHT as usize;

/// Number of buried item slots (one per quadrant).
pub const SLOT_COUNT: usize = 4;

// =============================================================================
// LAYER DEPTH
// =============================================================================

/// Depth of untouched rock.
pub const DEPTH_INTACT: u8 = 4;

/// Depth at which a cell is fully cleared and whatever lies beneath is exposed.
pub const DEPTH_CLEARED: u8 = 6;

// =============================================================================
// CELL POSITION
// =============================================================================

/// A cell coordinate. Always inside the grid once constructed through
/// [`CellPos::new`] or [`CellPos::offset`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPos {
    /// Column, 0..12
    pub col: u8,
    /// Row, 0..8
    pub row: u8,
}

impl CellPos {
    /// Checked constructor.
    pub const fn new(col: u8, row: u8) -> Option<Self> {
        if col < GRID_WIDTH && row < GRID_HEIGHT {
            Some(Self { col, row })
        } else {
            None
        }
    }

    /// Position of a row-major cell index.
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < CELL_COUNT, "cell index {} out of range", index);
        Self {
            col: (index % GRID_WIDTH as usize) as u8,
            row: (index / GRID_WIDTH as usize) as u8,
        }
    }

    /// Row-major cell index.
    #[inline]
    pub fn index(self) -> usize {
        debug_assert!(self.col < GRID_WIDTH && self.row < GRID_HEIGHT);
        self.row as usize * GRID_WIDTH as usize + self.col as usize
    }

    /// Neighbor at `(dx, dy)`, or `None` past a grid edge.
    pub fn offset(self, dx: i8, dy: i8) -> Option<Self> {
        let col = self.col as i16 + dx as i16;
        let row = self.row as i16 + dy as i16;
        if (0..GRID_WIDTH as i16).contains(&col) && (0..GRID_HEIGHT as i16).contains(&row) {
            Some(Self { col: col as u8, row: row as u8 })
        } else {
            None
        }
    }

    /// Iterate every cell in row-major order.
    pub fn all() -> impl Iterator<Item = CellPos> {
        (0..CELL_COUNT).map(CellPos::from_index)
    }
}

// =============================================================================
// OCCUPANCY TAG
// =============================================================================

/// What sits under a cell.
///
/// Encoded as the small integers the occupancy map historically used:
/// 0 empty, 1-4 item slot, 5 dug up, 6 stone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupancyTag {
    /// Nothing buried here
    #[default]
    Empty,
    /// Part of the item in slot 0..4
    Item(u8),
    /// Revealed and collected; inert from now on
    DugUp,
    /// Decorative stone
    Stone,
}

impl OccupancyTag {
    /// Tag for item slot `slot`.
    pub fn item(slot: usize) -> Self {
        debug_assert!(slot < SLOT_COUNT, "slot {} out of range", slot);
        OccupancyTag::Item(slot as u8)
    }

    /// Wire/hash encoding.
    pub fn code(self) -> u8 {
        match self {
            OccupancyTag::Empty => 0,
            OccupancyTag::Item(slot) => slot + 1,
            OccupancyTag::DugUp => 5,
            OccupancyTag::Stone => 6,
        }
    }

    /// True for anything but `Empty`.
    #[inline]
    pub fn is_occupied(self) -> bool {
        self != OccupancyTag::Empty
    }
}

// =============================================================================
// QUADRANTS
// =============================================================================

/// One of the four fixed 6×4 zones reserved for an item slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    /// Slot 0
    TopLeft,
    /// Slot 1
    BottomLeft,
    /// Slot 2
    TopRight,
    /// Slot 3
    BottomRight,
}

impl Quadrant {
    /// Quadrants in slot order.
    pub const ALL: [Quadrant; SLOT_COUNT] = [
        Quadrant::TopLeft,
        Quadrant::BottomLeft,
        Quadrant::TopRight,
        Quadrant::BottomRight,
    ];

    /// Quadrant owned by item slot `slot`.
    pub fn for_slot(slot: usize) -> Self {
        debug_assert!(slot < SLOT_COUNT, "slot {} out of range", slot);
        Self::ALL[slot % SLOT_COUNT]
    }

    /// Inclusive column range `(first, last)`.
    pub fn cols(self) -> (u8, u8) {
        match self {
            Quadrant::TopLeft | Quadrant::BottomLeft => (0, 5),
            Quadrant::TopRight | Quadrant::BottomRight => (6, 11),
        }
    }

    /// Inclusive row range `(first, last)`.
    pub fn rows(self) -> (u8, u8) {
        match self {
            Quadrant::TopLeft | Quadrant::TopRight => (0, 3),
            Quadrant::BottomLeft | Quadrant::BottomRight => (4, 7),
        }
    }

    /// Whether `pos` lies inside this quadrant.
    pub fn contains(self, pos: CellPos) -> bool {
        let (c0, c1) = self.cols();
        let (r0, r1) = self.rows();
        (c0..=c1).contains(&pos.col) && (r0..=r1).contains(&pos.row)
    }

    /// Candidate anchors in row-major scan order.
    pub fn cells(self) -> impl Iterator<Item = CellPos> {
        let (c0, c1) = self.cols();
        let (r0, r1) = self.rows();
        (r0..=r1).flat_map(move |row| (c0..=c1).map(move |col| CellPos { col, row }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip_corners() {
        assert_eq!(CellPos::from_index(0), CellPos { col: 0, row: 0 });
        assert_eq!(CellPos::from_index(11), CellPos { col: 11, row: 0 });
        assert_eq!(CellPos::from_index(12), CellPos { col: 0, row: 1 });
        assert_eq!(CellPos::from_index(95), CellPos { col: 11, row: 7 });
        assert_eq!(CellPos { col: 5, row: 3 }.index(), 41);
    }

    #[test]
    fn test_checked_constructor() {
        assert!(CellPos::new(11, 7).is_some());
        assert!(CellPos::new(12, 0).is_none());
        assert!(CellPos::new(0, 8).is_none());
    }

    #[test]
    fn test_offset_stops_at_edges() {
        let corner = CellPos { col: 0, row: 0 };
        assert!(corner.offset(-1, 0).is_none());
        assert!(corner.offset(0, -1).is_none());
        assert_eq!(corner.offset(1, 1), Some(CellPos { col: 1, row: 1 }));

        let far = CellPos { col: 11, row: 7 };
        assert!(far.offset(1, 0).is_none());
        assert!(far.offset(0, 1).is_none());
    }

    #[test]
    fn test_occupancy_codes() {
        assert_eq!(OccupancyTag::Empty.code(), 0);
        assert_eq!(OccupancyTag::item(0).code(), 1);
        assert_eq!(OccupancyTag::item(3).code(), 4);
        assert_eq!(OccupancyTag::DugUp.code(), 5);
        assert_eq!(OccupancyTag::Stone.code(), 6);
        assert!(!OccupancyTag::Empty.is_occupied());
        assert!(OccupancyTag::Stone.is_occupied());
    }

    #[test]
    fn test_quadrants_tile_the_grid() {
        let mut hits = [0u8; CELL_COUNT];
        for quadrant in Quadrant::ALL {
            let cells: Vec<_> = quadrant.cells().collect();
            assert_eq!(cells.len(), 24);
            for pos in cells {
                assert!(quadrant.contains(pos));
                hits[pos.index()] += 1;
            }
        }
        assert!(hits.iter().all(|&h| h == 1));
    }

    #[test]
    fn test_quadrant_slot_mapping() {
        assert_eq!(Quadrant::for_slot(0), Quadrant::TopLeft);
        assert_eq!(Quadrant::for_slot(1), Quadrant::BottomLeft);
        assert_eq!(Quadrant::for_slot(2), Quadrant::TopRight);
        assert_eq!(Quadrant::for_slot(3), Quadrant::BottomRight);
    }
}
