//! Placement Engine
//!
//! Runs once at session start. Seeds the terrain depth, decides which item
//! slots are active, draws an item for each active slot and buries it in
//! the slot's quadrant, then scatters two decorative stones anywhere on the
//! grid. Placement only writes `SessionState`; visuals are created by the
//! session afterwards.
//!
//! ## Scan & retry
//!
//! Both scans walk candidate anchors row by row and accept a legal anchor
//! only when a 16-bit draw clears a threshold. A pass that accepts nothing
//! starts over from the first row. After `max_placement_passes` passes the
//! first legal anchor is taken outright.

use tracing::{debug, warn};

use crate::config::ExcavationConfig;
use crate::core::rng::RandomSource;
use crate::game::catalog::{roll_item, Footprint, ItemKind, StoneKind};
use crate::game::grid::{CellPos, OccupancyTag, Quadrant, GRID_HEIGHT, GRID_WIDTH, SLOT_COUNT};
use crate::game::state::{PlacedStone, SessionState};

/// Stones scattered per session.
pub const STONES_PER_SESSION: usize = 2;

/// What placement produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutReport {
    /// Item buried per slot (`None` for inactive slots)
    pub items: [Option<(ItemKind, CellPos)>; SLOT_COUNT],
    /// Stones placed
    pub stones: Vec<PlacedStone>,
    /// Placements that needed the forced fallback
    pub forced: u32,
    /// Stones with no legal anchor even after a reroll
    pub dropped_stones: u32,
}

// =============================================================================
// TERRAIN
// =============================================================================

/// Lower some cells' starting depth.
///
/// Per cell, 2 in 8 drop to depth 2 and 3 in 8 drop to depth 0; the rest
/// stay intact.
pub fn seed_terrain<R: RandomSource>(state: &mut SessionState, rng: &mut R) {
    for pos in CellPos::all() {
        match rng.next_u16() >> 13 {
            0..=1 => state.set_layer(pos, 2),
            2..=4 => state.set_layer(pos, 0),
            _ => {}
        }
    }
}

// =============================================================================
// SLOT ACTIVATION
// =============================================================================

/// Which slots get an item this session.
///
/// Slots 0 and 3 always do. An 8-bit roll adds nothing (<85), slot 2
/// (<185), or slots 1 and 2.
pub fn roll_active_slots<R: RandomSource>(rng: &mut R) -> [bool; SLOT_COUNT] {
    match rng.next_u8() {
        0..=84 => [true, false, false, true],
        85..=184 => [true, false, true, true],
        _ => [true, true, true, true],
    }
}

// =============================================================================
// ITEMS
// =============================================================================

/// Whether `fp` anchored at `anchor` stays inside `quadrant` and covers no
/// occupied cell.
pub fn item_fits(state: &SessionState, fp: &Footprint, anchor: CellPos, quadrant: Quadrant) -> bool {
    let (_, last_col) = quadrant.cols();
    let (_, last_row) = quadrant.rows();
    if anchor.col + fp.left > last_col || anchor.row + fp.top > last_row {
        return false;
    }
    footprint_clear(state, fp, anchor)
}

fn footprint_clear(state: &SessionState, fp: &Footprint, anchor: CellPos) -> bool {
    fp.cells.iter().all(|&(dx, dy)| {
        anchor
            .offset(dx as i8, dy as i8)
            .map_or(false, |pos| !state.occupancy(pos).is_occupied())
    })
}

fn stamp(state: &mut SessionState, fp: &Footprint, anchor: CellPos, tag: OccupancyTag) {
    for &(dx, dy) in fp.cells {
        if let Some(pos) = anchor.offset(dx as i8, dy as i8) {
            state.set_occupancy(pos, tag);
        }
    }
}

/// Bury `kind` in `slot`'s quadrant.
///
/// Returns the anchor and whether the forced fallback picked it, or `None`
/// if the quadrant has no legal anchor at all.
pub fn place_item<R: RandomSource>(
    state: &mut SessionState,
    rng: &mut R,
    config: &ExcavationConfig,
    slot: usize,
    kind: ItemKind,
) -> Option<(CellPos, bool)> {
    let quadrant = Quadrant::for_slot(slot);
    let fp = kind.footprint();

    let mut chosen = None;
    'passes: for _ in 0..config.max_placement_passes {
        for anchor in quadrant.cells() {
            if rng.next_u16() > config.item_accept_threshold && item_fits(state, fp, anchor, quadrant) {
                chosen = Some((anchor, false));
                break 'passes;
            }
        }
    }

    let chosen = chosen.or_else(|| {
        quadrant
            .cells()
            .find(|&anchor| item_fits(state, fp, anchor, quadrant))
            .map(|anchor| (anchor, true))
    });

    let (anchor, forced) = chosen?;
    stamp(state, fp, anchor, OccupancyTag::item(slot));

    let record = state.slot_mut(slot);
    record.item_id = kind.reward();
    record.kind = Some(kind);
    record.anchor = Some(anchor);
    record.found = false;
    record.bag_full = false;
    let progress = state.progress_mut(slot);
    progress.collected = 0;
    progress.threshold = fp.dig_threshold();

    debug!(
        "Slot {}: {:?} at ({}, {}){}",
        slot,
        kind,
        anchor.col,
        anchor.row,
        if forced { " [forced]" } else { "" }
    );
    Some((anchor, forced))
}

// =============================================================================
// STONES
// =============================================================================

/// Whether a stone of shape `fp` fits at `anchor` on the open grid.
pub fn stone_fits(state: &SessionState, fp: &Footprint, anchor: CellPos) -> bool {
    anchor.col + fp.left < GRID_WIDTH
        && anchor.row + fp.top < GRID_HEIGHT
        && footprint_clear(state, fp, anchor)
}

/// Scatter one stone; the first accepted anchor ends the scan.
pub fn place_stone<R: RandomSource>(
    state: &mut SessionState,
    rng: &mut R,
    config: &ExcavationConfig,
    kind: StoneKind,
) -> Option<(PlacedStone, bool)> {
    let fp = kind.footprint();

    let mut chosen = None;
    'passes: for _ in 0..config.max_placement_passes {
        for anchor in CellPos::all() {
            // Only legal anchors consume a draw.
            if stone_fits(state, fp, anchor) && rng.next_u16() > config.stone_accept_threshold {
                chosen = Some((anchor, false));
                break 'passes;
            }
        }
    }

    let chosen = chosen.or_else(|| {
        CellPos::all()
            .find(|&anchor| stone_fits(state, fp, anchor))
            .map(|anchor| (anchor, true))
    });

    let (anchor, forced) = chosen?;
    stamp(state, fp, anchor, OccupancyTag::Stone);
    let stone = PlacedStone { kind, anchor };
    state.stones.push(stone);
    Some((stone, forced))
}

// =============================================================================
// FULL LAYOUT
// =============================================================================

/// Seed terrain, bury items in every active quadrant, then scatter stones.
///
/// All four quadrants are attempted in slot order in one call.
pub fn generate_layout<R: RandomSource>(
    state: &mut SessionState,
    rng: &mut R,
    config: &ExcavationConfig,
) -> LayoutReport {
    let mut report = LayoutReport::default();

    seed_terrain(state, rng);

    let active = roll_active_slots(rng);
    for slot in 0..SLOT_COUNT {
        if !active[slot] {
            continue;
        }
        let kind = roll_item(rng);
        match place_item(state, rng, config, slot, kind) {
            Some((anchor, forced)) => {
                report.items[slot] = Some((kind, anchor));
                report.forced += forced as u32;
            }
            None => warn!("No legal anchor for {:?} in slot {}; slot left empty", kind, slot),
        }
    }

    for _ in 0..STONES_PER_SESSION {
        let first = StoneKind::roll(rng);
        // One reroll: a smaller shape may still fit a crowded wall.
        let placed = place_stone(state, rng, config, first).or_else(|| {
            let second = StoneKind::roll(rng);
            debug!("No room for stone {:?}, rerolled {:?}", first, second);
            place_stone(state, rng, config, second)
        });
        match placed {
            Some((stone, forced)) => {
                report.stones.push(stone);
                report.forced += forced as u32;
            }
            None => {
                warn!("No legal anchor for stone after reroll; stone dropped");
                report.dropped_stones += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;
    use crate::game::grid::{CELL_COUNT, DEPTH_INTACT};
    use proptest::prelude::*;

    fn cells_of(fp: &Footprint, anchor: CellPos) -> Vec<CellPos> {
        fp.cells
            .iter()
            .map(|&(dx, dy)| anchor.offset(dx as i8, dy as i8).unwrap())
            .collect()
    }

    #[test]
    fn test_seed_terrain_depths() {
        let mut state = SessionState::new(1);
        let mut rng = DeterministicRng::new(1);
        seed_terrain(&mut state, &mut rng);

        assert!(state.layer_map().iter().all(|&d| d == 0 || d == 2 || d == DEPTH_INTACT));
    }

    #[test]
    fn test_seed_terrain_proportions() {
        let mut counts = [0u32; 5];
        for seed in 0..100 {
            let mut state = SessionState::new(seed);
            let mut rng = DeterministicRng::new(seed);
            seed_terrain(&mut state, &mut rng);
            for &d in state.layer_map() {
                counts[d as usize] += 1;
            }
        }
        let total = (100 * CELL_COUNT) as u32;
        // 25% / 37.5% / 37.5%
        assert!((counts[2] * 100 / total).abs_diff(25) <= 3, "{:?}", counts);
        assert!((counts[0] * 1000 / total).abs_diff(375) <= 30, "{:?}", counts);
        assert!((counts[4] * 1000 / total).abs_diff(375) <= 30, "{:?}", counts);
    }

    #[test]
    fn test_corner_slots_always_active() {
        let mut rng = DeterministicRng::new(77);
        for _ in 0..200 {
            let active = roll_active_slots(&mut rng);
            assert!(active[0] && active[3]);
            // Slot 1 never without slot 2.
            assert!(!active[1] || active[2]);
        }
    }

    #[test]
    fn test_item_fits_respects_quadrant_edge() {
        let state = SessionState::new(0);
        let fp = ItemKind::EverStone.footprint();

        // 4 wide: anchor col 2 reaches col 5, col 3 would reach col 6.
        assert!(item_fits(&state, fp, CellPos::new(2, 0).unwrap(), Quadrant::TopLeft));
        assert!(!item_fits(&state, fp, CellPos::new(3, 0).unwrap(), Quadrant::TopLeft));
        // 2 tall: anchor row 2 reaches row 3, row 3 would leave the quadrant.
        assert!(item_fits(&state, fp, CellPos::new(0, 2).unwrap(), Quadrant::TopLeft));
        assert!(!item_fits(&state, fp, CellPos::new(0, 3).unwrap(), Quadrant::TopLeft));
    }

    #[test]
    fn test_item_blocked_by_any_tag() {
        let mut state = SessionState::new(0);
        let fp = ItemKind::HardStone.footprint();
        let anchor = CellPos::new(0, 0).unwrap();

        for tag in [OccupancyTag::item(2), OccupancyTag::Stone] {
            state.set_occupancy(CellPos::new(1, 1).unwrap(), tag);
            assert!(!item_fits(&state, fp, anchor, Quadrant::TopLeft));
        }
    }

    #[test]
    fn test_place_item_sets_threshold() {
        let mut state = SessionState::new(5);
        let mut rng = DeterministicRng::new(5);
        let config = ExcavationConfig::default();

        let (anchor, _) = place_item(&mut state, &mut rng, &config, 0, ItemKind::HardStone).unwrap();

        assert_eq!(state.progress(0).threshold, 4);
        assert_eq!(state.buried_item_id(0), ItemKind::HardStone.reward());
        for pos in cells_of(ItemKind::HardStone.footprint(), anchor) {
            assert_eq!(state.occupancy(pos), OccupancyTag::item(0));
        }
    }

    #[test]
    fn test_forced_fallback_when_draws_never_accept() {
        let mut state = SessionState::new(5);
        let mut rng = DeterministicRng::new(5);
        let config = ExcavationConfig {
            item_accept_threshold: u16::MAX,
            max_placement_passes: 2,
            ..ExcavationConfig::default()
        };

        let (anchor, forced) = place_item(&mut state, &mut rng, &config, 3, ItemKind::IronBall).unwrap();
        assert!(forced);
        assert_eq!(anchor, CellPos::new(6, 4).unwrap());
    }

    #[test]
    fn test_stone_needs_empty_cells() {
        let mut state = SessionState::new(0);
        let fp = StoneKind::Stone4x1.footprint();
        let anchor = CellPos::new(8, 0).unwrap();
        assert!(stone_fits(&state, fp, anchor));
        assert!(!stone_fits(&state, fp, CellPos::new(9, 0).unwrap()));

        state.set_occupancy(CellPos::new(11, 0).unwrap(), OccupancyTag::item(2));
        assert!(!stone_fits(&state, fp, anchor));
    }

    #[test]
    fn test_full_wall_drops_stones() {
        let mut state = SessionState::new(8);
        for pos in CellPos::all() {
            state.set_occupancy(pos, OccupancyTag::Stone);
        }
        let mut rng = DeterministicRng::new(8);
        let report = generate_layout(&mut state, &mut rng, &ExcavationConfig::default());

        assert!(report.stones.is_empty());
        assert_eq!(report.dropped_stones, STONES_PER_SESSION as u32);
        assert!(report.items.iter().all(Option::is_none));
    }

    #[test]
    fn test_layout_is_deterministic() {
        let config = ExcavationConfig::default();
        let run = |seed| {
            let mut state = SessionState::new(seed);
            let mut rng = DeterministicRng::new(seed);
            let report = generate_layout(&mut state, &mut rng, &config);
            (report, state.compute_hash())
        };
        assert_eq!(run(424242), run(424242));
    }

    proptest! {
        #[test]
        fn prop_footprints_never_overlap(seed in any::<u64>()) {
            let config = ExcavationConfig::default();
            let mut state = SessionState::new(seed);
            let mut rng = DeterministicRng::new(seed);
            let report = generate_layout(&mut state, &mut rng, &config);

            let mut owners = [0u8; CELL_COUNT];
            for (kind, anchor) in report.items.iter().flatten() {
                for pos in cells_of(kind.footprint(), *anchor) {
                    owners[pos.index()] += 1;
                }
            }
            for stone in &report.stones {
                for pos in cells_of(stone.kind.footprint(), stone.anchor) {
                    owners[pos.index()] += 1;
                }
            }
            prop_assert!(owners.iter().all(|&n| n <= 1));
        }

        #[test]
        fn prop_items_stay_in_their_quadrant(seed in any::<u64>()) {
            let config = ExcavationConfig::default();
            let mut state = SessionState::new(seed);
            let mut rng = DeterministicRng::new(seed);
            let report = generate_layout(&mut state, &mut rng, &config);

            prop_assert!(report.items[0].is_some());
            prop_assert!(report.items[3].is_some());
            for (slot, item) in report.items.iter().enumerate() {
                if let Some((kind, anchor)) = item {
                    let quadrant = Quadrant::for_slot(slot);
                    for pos in cells_of(kind.footprint(), *anchor) {
                        prop_assert!(quadrant.contains(pos));
                        prop_assert_eq!(state.occupancy(pos), OccupancyTag::item(slot));
                    }
                }
            }
        }

        #[test]
        fn prop_threshold_matches_footprint(seed in any::<u64>()) {
            let config = ExcavationConfig::default();
            let mut state = SessionState::new(seed);
            let mut rng = DeterministicRng::new(seed);
            generate_layout(&mut state, &mut rng, &config);

            for slot in 0..SLOT_COUNT {
                let tagged = state
                    .occupancy_map()
                    .iter()
                    .filter(|t| **t == OccupancyTag::item(slot))
                    .count();
                prop_assert_eq!(tagged, state.progress(slot).threshold as usize);
            }
        }
    }
}
