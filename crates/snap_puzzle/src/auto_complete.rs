//! Endgame help: once only one or two slots are left, a tile dropped roughly
//! next to the last open slot is pulled in without a precise drag.

use tracing::debug;

use crate::board::{Board, BoardError, SlotId, Tile, TileId};
use crate::config::{AutoCompleteMatching, PuzzleConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSnap {
    pub tile: TileId,
    pub slot: SlotId,
}

/// Runs after every successful snap.
///
/// With two slots free the later one in slot order is the target. At most one
/// tile is pulled in per call.
pub fn auto_complete(
    board: &mut Board,
    config: &PuzzleConfig,
) -> Result<Option<AutoSnap>, BoardError> {
    let free = board.slots().len().saturating_sub(board.occupied_count());
    if !(1..=2).contains(&free) {
        return Ok(None);
    }

    let Some(slot) = board.slots().iter().rev().find(|slot| !slot.is_occupied()) else {
        return Ok(None);
    };
    let (slot_id, slot_position) = (slot.id(), slot.position());

    let accepts = |tile: &Tile| match config.auto_complete {
        AutoCompleteMatching::AnyTile => true,
        AutoCompleteMatching::MatchingTileOnly => tile.id() == slot_id.owner(),
    };
    let Some(tile_id) = board
        .tiles()
        .iter()
        .filter(|tile| tile.is_free() && accepts(*tile))
        .find(|tile| tile.position().distance(slot_position) < config.snap_threshold)
        .map(Tile::id)
    else {
        return Ok(None);
    };

    board.snap(tile_id, slot_id, config.snapped_z)?;
    if tile_id != slot_id.owner() {
        debug!("Auto-completion put {tile_id} into {slot_id}, which is not its home");
    }

    Ok(Some(AutoSnap {
        tile: tile_id,
        slot: slot_id,
    }))
}
