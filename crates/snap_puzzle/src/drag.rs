//! Drag lifecycle of a single tile: `Free | Snapped -> Dragging -> Snapped | Free`.

use bevy::prelude::*;
use tracing::{debug, warn};

use crate::auto_complete::{AutoSnap, auto_complete};
use crate::board::{Board, BoardError, SlotId, TileId, TileState};
use crate::config::PuzzleConfig;
use crate::resolver::find_nearest_free_slot;
use crate::win::{CompletionEffect, check_completion};

/// What releasing a tile did to the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// The tile landed in `slot`. The auto-completer may have filled the last
    /// slot right after, and the board may now be solved.
    Snapped {
        tile: TileId,
        slot: SlotId,
        auto_snap: Option<AutoSnap>,
        solved: bool,
    },
    /// No free slot was close enough, the tile stays where it was dropped.
    Dropped { tile: TileId, position: Vec2 },
    /// The tile was not being dragged.
    NotDragging,
}

/// Keeps a box of `size` inside the viewport, pinning it to the left and top
/// edges when it is larger than the viewport.
pub fn clamp_to_viewport(position: Vec2, size: Vec2, viewport: Vec2) -> Vec2 {
    let mut clamped = position.max(Vec2::ZERO);
    if clamped.x + size.x > viewport.x {
        clamped.x = viewport.x - size.x;
    }
    if clamped.y + size.y > viewport.y {
        clamped.y = viewport.y - size.y;
    }
    clamped
}

impl Board {
    /// Picks a tile up. A snapped tile frees its slot right away.
    pub fn touch_start(
        &mut self,
        id: TileId,
        pointer: Vec2,
        config: &PuzzleConfig,
    ) -> Result<(), BoardError> {
        let tile = self.tile_mut(id)?;
        let previous = tile.state;
        tile.state = TileState::Dragging {
            offset: pointer - tile.position(),
        };
        tile.set_z(config.dragging_z);

        if let TileState::Snapped(slot) = previous {
            self.set_occupied(slot, false)?;
            debug!("{id} lifted out of {slot}");
        } else {
            debug!("{id} picked up");
        }
        Ok(())
    }

    /// Follows the pointer. Never touches occupancy.
    pub fn touch_move(&mut self, id: TileId, pointer: Vec2) -> Result<(), BoardError> {
        let viewport = self.viewport();
        let tile = self.tile_mut(id)?;
        let TileState::Dragging { offset } = tile.state else {
            warn!("Ignoring move of {id}, it is not being dragged");
            return Ok(());
        };

        let position = clamp_to_viewport(pointer - offset, tile.size(), viewport);
        tile.set_position(position);
        Ok(())
    }

    /// Drops the tile, snapping it into the nearest free slot in range.
    ///
    /// After a snap the auto-completer runs, then the win check, which calls
    /// `effect` when the board is solved.
    pub fn touch_end(
        &mut self,
        id: TileId,
        config: &PuzzleConfig,
        effect: &mut impl CompletionEffect,
    ) -> Result<Release, BoardError> {
        let tile = self.tile(id).ok_or(BoardError::UnknownTile(id))?;
        if !tile.is_dragging() {
            return Ok(Release::NotDragging);
        }

        let Some(slot) = find_nearest_free_slot(tile, self.slots(), config.snap_threshold) else {
            let tile = self.tile_mut(id)?;
            tile.state = TileState::Free;
            debug!("{id} dropped at {}", tile.position());
            return Ok(Release::Dropped {
                tile: id,
                position: tile.position(),
            });
        };

        self.snap(id, slot, config.snapped_z)?;
        let auto_snap = auto_complete(self, config)?;
        let solved = check_completion(self, config.placement_tolerance, effect);

        Ok(Release::Snapped {
            tile: id,
            slot,
            auto_snap,
            solved,
        })
    }
}
