//! Tiles, slots and the occupancy bookkeeping that ties them together.
//!
//! All positions are top-left corners in viewport pixels, y pointing down,
//! the same space pointer events arrive in.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use bevy::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Identity of a tile, `1..=N`. Tile `i` belongs in slot `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

/// Identity of a slot, `1..=N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl TileId {
    pub const fn home(self) -> SlotId {
        SlotId(self.0)
    }
}

impl SlotId {
    pub const fn owner(self) -> TileId {
        TileId(self.0)
    }
}

impl Display for TileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "tile {}", self.0)
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("A board needs at least one tile")]
    Empty,

    #[error("Tile and slot counts differ: {tiles} tiles, {slots} slots")]
    CountMismatch { tiles: usize, slots: usize },

    #[error("{0} appears more than once")]
    DuplicateTile(TileId),

    #[error("{0} appears more than once")]
    DuplicateSlot(SlotId),

    #[error("{0} has no matching slot")]
    MissingSlot(TileId),

    #[error("Unknown {0}")]
    UnknownTile(TileId),

    #[error("Unknown {0}")]
    UnknownSlot(SlotId),

    #[error("{slot} is claimed by more than one tile")]
    SlotClaimedTwice { slot: SlotId },

    #[error("{slot} occupancy flag disagrees with the tiles")]
    OccupancyMismatch { slot: SlotId },
}

/// Where a tile is in its drag lifecycle.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum TileState {
    /// Lying on the board outside any slot.
    #[default]
    Free,
    /// Following the pointer. `offset` is the pointer position relative to
    /// the tile's top-left corner when the gesture started.
    Dragging { offset: Vec2 },
    /// Sitting exactly on a slot.
    Snapped(SlotId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    id: TileId,
    position: Vec2,
    size: Vec2,
    z: f32,
    pub(crate) state: TileState,
}

impl Tile {
    pub const fn new(id: TileId, position: Vec2, size: Vec2, z: f32) -> Self {
        Self {
            id,
            position,
            size,
            z,
            state: TileState::Free,
        }
    }

    pub const fn id(&self) -> TileId {
        self.id
    }

    pub const fn position(&self) -> Vec2 {
        self.position
    }

    pub const fn size(&self) -> Vec2 {
        self.size
    }

    pub const fn z(&self) -> f32 {
        self.z
    }

    pub const fn state(&self) -> TileState {
        self.state
    }

    /// The slot this tile is snapped into, if any.
    pub const fn slot(&self) -> Option<SlotId> {
        match self.state {
            TileState::Snapped(slot) => Some(slot),
            TileState::Free | TileState::Dragging { .. } => None,
        }
    }

    pub const fn is_free(&self) -> bool {
        matches!(self.state, TileState::Free)
    }

    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, TileState::Dragging { .. })
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.position, self.position + self.size)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.rect().contains(point)
    }

    pub(crate) const fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub(crate) const fn set_z(&mut self, z: f32) {
        self.z = z;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    id: SlotId,
    position: Vec2,
    occupied: bool,
}

impl Slot {
    pub const fn new(id: SlotId, position: Vec2) -> Self {
        Self {
            id,
            position,
            occupied: false,
        }
    }

    pub const fn id(&self) -> SlotId {
        self.id
    }

    pub const fn position(&self) -> Vec2 {
        self.position
    }

    pub const fn is_occupied(&self) -> bool {
        self.occupied
    }
}

/// Every tile and slot of the current round.
///
/// Slot occupancy only changes through [`Board::set_occupied`], called by the
/// drag controller and the auto-completer.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct Board {
    tiles: Vec<Tile>,
    slots: Vec<Slot>,
    viewport: Vec2,
}

impl Board {
    pub fn new(tiles: Vec<Tile>, slots: Vec<Slot>, viewport: Vec2) -> Result<Self, BoardError> {
        if tiles.is_empty() {
            return Err(BoardError::Empty);
        }
        if tiles.len() != slots.len() {
            return Err(BoardError::CountMismatch {
                tiles: tiles.len(),
                slots: slots.len(),
            });
        }

        let mut slot_ids = HashSet::new();
        for slot in &slots {
            if !slot_ids.insert(slot.id) {
                return Err(BoardError::DuplicateSlot(slot.id));
            }
        }
        let mut tile_ids = HashSet::new();
        for tile in &tiles {
            if !tile_ids.insert(tile.id) {
                return Err(BoardError::DuplicateTile(tile.id));
            }
            if !slot_ids.contains(&tile.id.home()) {
                return Err(BoardError::MissingSlot(tile.id));
            }
        }

        Ok(Self {
            tiles,
            slots,
            viewport,
        })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id == id)
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub(crate) fn tile_mut(&mut self, id: TileId) -> Result<&mut Tile, BoardError> {
        self.tiles
            .iter_mut()
            .find(|tile| tile.id == id)
            .ok_or(BoardError::UnknownTile(id))
    }

    pub const fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub const fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn set_occupied(&mut self, id: SlotId, occupied: bool) -> Result<(), BoardError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .ok_or(BoardError::UnknownSlot(id))?;
        slot.occupied = occupied;
        Ok(())
    }

    /// Unknown slots read as free.
    pub fn is_occupied(&self, id: SlotId) -> bool {
        self.slot(id).is_some_and(Slot::is_occupied)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.occupied).count()
    }

    pub fn snapped_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.slot().is_some()).count()
    }

    /// Moves a tile exactly onto a slot and marks the slot taken.
    pub(crate) fn snap(&mut self, tile: TileId, slot: SlotId, z: f32) -> Result<(), BoardError> {
        let position = self
            .slot(slot)
            .map(Slot::position)
            .ok_or(BoardError::UnknownSlot(slot))?;

        let target = self.tile_mut(tile)?;
        target.set_position(position);
        target.set_z(z);
        target.state = TileState::Snapped(slot);
        self.set_occupied(slot, true)?;

        debug!("{tile} snapped into {slot}");
        Ok(())
    }

    /// Topmost tile under `point`. Equal z-orders resolve to the tile listed
    /// last, the one drawn on top.
    pub fn tile_at(&self, point: Vec2) -> Option<TileId> {
        self.tiles
            .iter()
            .filter(|tile| tile.contains(point))
            .max_by(|a, b| a.z.total_cmp(&b.z))
            .map(Tile::id)
    }

    /// Checks that no slot is claimed twice and that every occupancy flag
    /// matches the tiles referencing its slot.
    pub fn check_invariants(&self) -> Result<(), BoardError> {
        let mut claimed = HashSet::new();
        for slot in self.tiles.iter().filter_map(Tile::slot) {
            if !claimed.insert(slot) {
                return Err(BoardError::SlotClaimedTwice { slot });
            }
        }
        for slot in &self.slots {
            if slot.occupied != claimed.contains(&slot.id) {
                return Err(BoardError::OccupancyMismatch { slot: slot.id });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const TILE: Vec2 = Vec2::splat(80.0);
    pub const VIEWPORT: Vec2 = Vec2::new(360.0, 640.0);

    /// Slots in a row along the top, tiles stacked far below them.
    pub fn row_board(count: u32) -> Board {
        let slots = (1..=count)
            .map(|i| Slot::new(SlotId(i), Vec2::new((i - 1) as f32 * 90.0, 0.0)))
            .collect();
        let tiles = (1..=count)
            .map(|i| Tile::new(TileId(i), Vec2::new((i - 1) as f32 * 90.0, 400.0), TILE, 1.0))
            .collect();
        Board::new(tiles, slots, VIEWPORT).expect("row board is well formed")
    }

    #[test]
    fn rejects_malformed_boards() {
        assert_eq!(
            Board::new(Vec::new(), Vec::new(), VIEWPORT),
            Err(BoardError::Empty),
            "empty board"
        );

        let tiles = vec![Tile::new(TileId(1), Vec2::ZERO, TILE, 1.0)];
        let slots = vec![
            Slot::new(SlotId(1), Vec2::ZERO),
            Slot::new(SlotId(2), Vec2::ZERO),
        ];
        assert_eq!(
            Board::new(tiles, slots, VIEWPORT),
            Err(BoardError::CountMismatch { tiles: 1, slots: 2 }),
            "count mismatch"
        );

        let tiles = vec![
            Tile::new(TileId(1), Vec2::ZERO, TILE, 1.0),
            Tile::new(TileId(3), Vec2::ZERO, TILE, 1.0),
        ];
        let slots = vec![
            Slot::new(SlotId(1), Vec2::ZERO),
            Slot::new(SlotId(2), Vec2::ZERO),
        ];
        assert_eq!(
            Board::new(tiles, slots, VIEWPORT),
            Err(BoardError::MissingSlot(TileId(3))),
            "tile without a home slot"
        );

        let tiles = vec![
            Tile::new(TileId(1), Vec2::ZERO, TILE, 1.0),
            Tile::new(TileId(1), Vec2::ZERO, TILE, 1.0),
        ];
        let slots = vec![
            Slot::new(SlotId(1), Vec2::ZERO),
            Slot::new(SlotId(2), Vec2::ZERO),
        ];
        assert_eq!(
            Board::new(tiles, slots, VIEWPORT),
            Err(BoardError::DuplicateTile(TileId(1))),
            "duplicate tile"
        );
    }

    #[test]
    fn occupancy_tracker_counts_flags() {
        let mut board = row_board(3);
        assert_eq!(board.occupied_count(), 0, "fresh board is empty");

        board.set_occupied(SlotId(2), true).expect("slot 2 exists");
        assert!(board.is_occupied(SlotId(2)), "slot 2 was just taken");
        assert!(!board.is_occupied(SlotId(1)), "slot 1 untouched");
        assert_eq!(board.occupied_count(), 1, "one flag set");

        board.set_occupied(SlotId(2), false).expect("slot 2 exists");
        assert_eq!(board.occupied_count(), 0, "flag cleared");

        assert_eq!(
            board.set_occupied(SlotId(9), true),
            Err(BoardError::UnknownSlot(SlotId(9))),
            "unknown slot"
        );
        assert!(!board.is_occupied(SlotId(9)), "unknown slots read as free");
    }

    #[test]
    fn snap_keeps_invariants() {
        let mut board = row_board(3);
        board.snap(TileId(2), SlotId(1), 5.0).expect("valid snap");

        let tile = board.tile(TileId(2)).expect("tile 2 exists");
        assert_eq!(tile.position(), Vec2::ZERO, "tile sits on slot 1");
        assert_eq!(tile.slot(), Some(SlotId(1)), "tile references slot 1");
        assert_eq!(board.occupied_count(), board.snapped_count(), "counts agree");
        assert_eq!(board.check_invariants(), Ok(()), "board is consistent");

        board.set_occupied(SlotId(3), true).expect("slot 3 exists");
        assert_eq!(
            board.check_invariants(),
            Err(BoardError::OccupancyMismatch { slot: SlotId(3) }),
            "flag without a tile is caught"
        );
    }

    #[test]
    fn tile_at_prefers_the_topmost_tile() {
        let tiles = vec![
            Tile::new(TileId(1), Vec2::new(0.0, 0.0), TILE, 1.0),
            Tile::new(TileId(2), Vec2::new(40.0, 40.0), TILE, 1.0),
            Tile::new(TileId(3), Vec2::new(200.0, 200.0), TILE, 1.0),
        ];
        let slots = (1..=3).map(|i| Slot::new(SlotId(i), Vec2::ZERO)).collect();
        let mut board = Board::new(tiles, slots, VIEWPORT).expect("valid board");

        let overlap = Vec2::new(60.0, 60.0);
        assert_eq!(board.tile_at(overlap), Some(TileId(2)), "later tile on top");

        board.tile_mut(TileId(1)).expect("tile 1").set_z(10.0);
        assert_eq!(board.tile_at(overlap), Some(TileId(1)), "raised tile on top");

        assert_eq!(board.tile_at(Vec2::new(150.0, 20.0)), None, "empty spot");
    }
}
