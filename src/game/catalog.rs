//! Item and Stone Catalog
//!
//! Static, read-only shape data for everything that can be buried.
//! Each entry lists its footprint as `(dx, dy)` offsets from the anchor
//! cell, its right/bottom extents, and its zero-based tile count.

use serde::{Serialize, Deserialize};

use crate::core::rng::RandomSource;

// =============================================================================
// INVENTORY ITEM ID
// =============================================================================

/// Host inventory item identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u16);

impl ItemId {
    /// Marks an unused slot.
    pub const NONE: ItemId = ItemId(0);
    #[allow(missing_docs)]
    pub const HARD_STONE: ItemId = ItemId(1);
    #[allow(missing_docs)]
    pub const REVIVE: ItemId = ItemId(2);
    #[allow(missing_docs)]
    pub const STAR_PIECE: ItemId = ItemId(3);
    #[allow(missing_docs)]
    pub const WATER_STONE: ItemId = ItemId(4);
    #[allow(missing_docs)]
    pub const RED_SHARD: ItemId = ItemId(5);
    #[allow(missing_docs)]
    pub const BLUE_SHARD: ItemId = ItemId(6);
    #[allow(missing_docs)]
    pub const ULTRA_BALL: ItemId = ItemId(7);
    #[allow(missing_docs)]
    pub const MAX_REVIVE: ItemId = ItemId(8);
    #[allow(missing_docs)]
    pub const EVERSTONE: ItemId = ItemId(9);
    #[allow(missing_docs)]
    pub const HEART_SCALE: ItemId = ItemId(10);

    /// True for [`ItemId::NONE`].
    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Display name used in result messages.
    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "Hard Stone",
            2 => "Revive",
            3 => "Star Piece",
            4 => "Water Stone",
            5 => "Red Shard",
            6 => "Blue Shard",
            7 => "Ultra Ball",
            8 => "Max Revive",
            9 => "Everstone",
            10 => "Heart Scale",
            _ => "?????",
        }
    }
}

// =============================================================================
// FOOTPRINTS
// =============================================================================

/// Shape data shared by items and stones.
#[derive(Debug)]
pub struct Footprint {
    /// Extra rows below the anchor the shape reaches.
    pub top: u8,
    /// Extra columns right of the anchor the shape reaches.
    pub left: u8,
    /// Footprint size minus one.
    pub total_tiles: u8,
    /// Occupied `(dx, dy)` offsets.
    pub cells: &'static [(u8, u8)],
}

impl Footprint {
    /// Cells a slot must collect before it counts as found.
    ///
    /// One past the zero-based tile count, i.e. every footprint cell.
    #[inline]
    pub fn dig_threshold(&self) -> u8 {
        self.total_tiles + 1
    }
}

const SQUARE_2X2: &[(u8, u8)] = &[(0, 0), (1, 0), (0, 1), (1, 1)];

const SQUARE_3X3: &[(u8, u8)] = &[
    (0, 0), (1, 0), (2, 0),
    (0, 1), (1, 1), (2, 1),
    (0, 2), (1, 2), (2, 2),
];

const PLUS_3X3: &[(u8, u8)] = &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)];

// =============================================================================
// ITEMS
// =============================================================================

/// Buriable item kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ItemKind {
    HardStone,
    Revive,
    StarPiece,
    DampRock,
    RedShard,
    BlueShard,
    IronBall,
    ReviveMax,
    EverStone,
    HeartScale,
}

static HEART_SCALE: Footprint = Footprint {
    top: 1,
    left: 1,
    total_tiles: 2,
    cells: &[(0, 0), (0, 1), (1, 1)],
};

static HARD_STONE: Footprint = Footprint {
    top: 1,
    left: 1,
    total_tiles: 3,
    cells: SQUARE_2X2,
};

static PLUS_ITEM: Footprint = Footprint {
    top: 2,
    left: 2,
    total_tiles: 4,
    cells: PLUS_3X3,
};

static DAMP_ROCK: Footprint = Footprint {
    top: 2,
    left: 2,
    total_tiles: 7,
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 1), (2, 0), (0, 2), (2, 2)],
};

static RED_SHARD: Footprint = Footprint {
    top: 2,
    left: 2,
    total_tiles: 7,
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (1, 2), (2, 0), (0, 2), (2, 2)],
};

static BLUE_SHARD: Footprint = Footprint {
    top: 2,
    left: 2,
    total_tiles: 7,
    cells: &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2), (0, 0), (2, 0), (0, 2)],
};

static BALL_ITEM: Footprint = Footprint {
    top: 2,
    left: 2,
    total_tiles: 8,
    cells: SQUARE_3X3,
};

static EVER_STONE: Footprint = Footprint {
    top: 1,
    left: 3,
    total_tiles: 7,
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 0), (3, 0), (2, 1), (3, 1)],
};

impl ItemKind {
    /// Every item kind.
    pub const ALL: [ItemKind; 10] = [
        ItemKind::HardStone,
        ItemKind::Revive,
        ItemKind::StarPiece,
        ItemKind::DampRock,
        ItemKind::RedShard,
        ItemKind::BlueShard,
        ItemKind::IronBall,
        ItemKind::ReviveMax,
        ItemKind::EverStone,
        ItemKind::HeartScale,
    ];

    /// Shape of this item.
    pub fn footprint(self) -> &'static Footprint {
        match self {
            ItemKind::HardStone => &HARD_STONE,
            ItemKind::Revive | ItemKind::StarPiece => &PLUS_ITEM,
            ItemKind::DampRock => &DAMP_ROCK,
            ItemKind::RedShard => &RED_SHARD,
            ItemKind::BlueShard => &BLUE_SHARD,
            ItemKind::IronBall | ItemKind::ReviveMax => &BALL_ITEM,
            ItemKind::EverStone => &EVER_STONE,
            ItemKind::HeartScale => &HEART_SCALE,
        }
    }

    /// Inventory item granted when this is dug up.
    pub fn reward(self) -> ItemId {
        match self {
            ItemKind::HardStone => ItemId::HARD_STONE,
            ItemKind::Revive => ItemId::REVIVE,
            ItemKind::StarPiece => ItemId::STAR_PIECE,
            ItemKind::DampRock => ItemId::WATER_STONE,
            ItemKind::RedShard => ItemId::RED_SHARD,
            ItemKind::BlueShard => ItemId::BLUE_SHARD,
            ItemKind::IronBall => ItemId::ULTRA_BALL,
            ItemKind::ReviveMax => ItemId::MAX_REVIVE,
            ItemKind::EverStone => ItemId::EVERSTONE,
            ItemKind::HeartScale => ItemId::HEART_SCALE,
        }
    }
}

// =============================================================================
// RARITY
// =============================================================================

/// Rarity band an item is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    /// 4 in 7
    Common,
    /// 2 in 7
    Uncommon,
    /// 1 in 7
    Rare,
}

const COMMON_ITEMS: [ItemKind; 3] = [ItemKind::HeartScale, ItemKind::RedShard, ItemKind::BlueShard];

const UNCOMMON_ITEMS: [ItemKind; 4] = [
    ItemKind::IronBall,
    ItemKind::HardStone,
    ItemKind::Revive,
    ItemKind::EverStone,
];

const RARE_ITEMS: [ItemKind; 3] = [ItemKind::StarPiece, ItemKind::DampRock, ItemKind::ReviveMax];

impl Rarity {
    /// Draw a rarity band: 4/7 common, 2/7 uncommon, 1/7 rare.
    pub fn roll<R: RandomSource>(rng: &mut R) -> Self {
        match rng.below(7) {
            0..=3 => Rarity::Common,
            4..=5 => Rarity::Uncommon,
            _ => Rarity::Rare,
        }
    }

    /// Items in this band.
    pub fn table(self) -> &'static [ItemKind] {
        match self {
            Rarity::Common => &COMMON_ITEMS,
            Rarity::Uncommon => &UNCOMMON_ITEMS,
            Rarity::Rare => &RARE_ITEMS,
        }
    }
}

/// Weighted item draw: rarity band first, then uniform within the band.
pub fn roll_item<R: RandomSource>(rng: &mut R) -> ItemKind {
    let table = Rarity::roll(rng).table();
    table[rng.below(table.len() as u32) as usize]
}

// =============================================================================
// STONES
// =============================================================================

/// Decorative stone shapes, named width × height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum StoneKind {
    Stone1x4,
    Stone4x1,
    Stone2x4,
    Stone4x2,
    Stone2x2,
    Stone3x3,
}

static STONE_1X4: Footprint = Footprint {
    top: 3,
    left: 0,
    total_tiles: 3,
    cells: &[(0, 0), (0, 1), (0, 2), (0, 3)],
};

static STONE_4X1: Footprint = Footprint {
    top: 0,
    left: 3,
    total_tiles: 3,
    cells: &[(0, 0), (1, 0), (2, 0), (3, 0)],
};

static STONE_2X4: Footprint = Footprint {
    top: 3,
    left: 1,
    total_tiles: 7,
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (0, 3), (1, 2), (1, 3)],
};

static STONE_4X2: Footprint = Footprint {
    top: 1,
    left: 3,
    total_tiles: 7,
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 0), (3, 0), (2, 1), (3, 1)],
};

static STONE_2X2: Footprint = Footprint {
    top: 1,
    left: 1,
    total_tiles: 3,
    cells: SQUARE_2X2,
};

static STONE_3X3: Footprint = Footprint {
    top: 2,
    left: 2,
    total_tiles: 8,
    cells: SQUARE_3X3,
};

impl StoneKind {
    /// Every stone shape, in draw-band order.
    pub const ALL: [StoneKind; 6] = [
        StoneKind::Stone1x4,
        StoneKind::Stone4x1,
        StoneKind::Stone2x4,
        StoneKind::Stone4x2,
        StoneKind::Stone2x2,
        StoneKind::Stone3x3,
    ];

    /// Shape of this stone.
    pub fn footprint(self) -> &'static Footprint {
        match self {
            StoneKind::Stone1x4 => &STONE_1X4,
            StoneKind::Stone4x1 => &STONE_4X1,
            StoneKind::Stone2x4 => &STONE_2X4,
            StoneKind::Stone4x2 => &STONE_4X2,
            StoneKind::Stone2x2 => &STONE_2X2,
            StoneKind::Stone3x3 => &STONE_3X3,
        }
    }

    /// Pick a shape from six equal bands over a 16-bit draw.
    pub fn roll<R: RandomSource>(rng: &mut R) -> Self {
        let band = (rng.next_u16() as u32 * Self::ALL.len() as u32) >> 16;
        Self::ALL[band as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;

    fn assert_consistent(fp: &Footprint) {
        assert_eq!(fp.cells.len(), fp.total_tiles as usize + 1);
        assert_eq!(fp.dig_threshold() as usize, fp.cells.len());

        let max_dx = fp.cells.iter().map(|c| c.0).max().unwrap_or(0);
        let max_dy = fp.cells.iter().map(|c| c.1).max().unwrap_or(0);
        assert_eq!(max_dx, fp.left);
        assert_eq!(max_dy, fp.top);

        let mut sorted = fp.cells.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), fp.cells.len(), "duplicate footprint cell");
    }

    #[test]
    fn test_item_footprints_consistent() {
        for kind in ItemKind::ALL {
            assert_consistent(kind.footprint());
        }
    }

    #[test]
    fn test_stone_footprints_consistent() {
        for kind in StoneKind::ALL {
            assert_consistent(kind.footprint());
        }
    }

    #[test]
    fn test_hard_stone_threshold_is_four() {
        assert_eq!(ItemKind::HardStone.footprint().total_tiles, 3);
        assert_eq!(ItemKind::HardStone.footprint().dig_threshold(), 4);
        assert_eq!(ItemKind::HardStone.reward(), ItemId::HARD_STONE);
    }

    #[test]
    fn test_every_item_in_exactly_one_table() {
        for kind in ItemKind::ALL {
            let hits = [Rarity::Common, Rarity::Uncommon, Rarity::Rare]
                .iter()
                .filter(|r| r.table().contains(&kind))
                .count();
            assert_eq!(hits, 1, "{:?}", kind);
        }
    }

    #[test]
    fn test_rarity_distribution() {
        let mut rng = DeterministicRng::new(2024);
        let mut counts = [0u32; 3];
        for _ in 0..7000 {
            match Rarity::roll(&mut rng) {
                Rarity::Common => counts[0] += 1,
                Rarity::Uncommon => counts[1] += 1,
                Rarity::Rare => counts[2] += 1,
            }
        }
        // Expected 4000 / 2000 / 1000
        assert!((3700..4300).contains(&counts[0]), "{:?}", counts);
        assert!((1750..2250).contains(&counts[1]), "{:?}", counts);
        assert!((800..1200).contains(&counts[2]), "{:?}", counts);
    }

    #[test]
    fn test_stone_roll_hits_every_shape() {
        let mut rng = DeterministicRng::new(31337);
        let mut seen = [false; 6];
        for _ in 0..600 {
            let kind = StoneKind::roll(&mut rng);
            let idx = StoneKind::ALL.iter().position(|k| *k == kind).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_item_names() {
        assert_eq!(ItemId::WATER_STONE.name(), "Water Stone");
        assert_eq!(ItemKind::IronBall.reward().name(), "Ultra Ball");
        assert!(ItemId::NONE.is_none());
    }
}
