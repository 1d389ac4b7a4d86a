use bevy::prelude::*;

use crate::board::{Board, BoardError, Slot, SlotId, Tile};
use crate::config::PuzzleConfig;

/// Slot grid centred horizontally, `grid_top_margin` below the top edge.
/// Slots are numbered row by row from the top-left.
pub fn slot_grid(config: &PuzzleConfig, viewport: Vec2) -> Vec<Slot> {
    let grid_width = config.columns as f32 * config.tile_size;
    let origin = Vec2::new(
        ((viewport.x - grid_width) / 2.0).max(0.0),
        config.grid_top_margin,
    );

    (0..config.rows)
        .flat_map(|row| (0..config.columns).map(move |column| (row, column)))
        .map(|(row, column)| {
            let id = SlotId(row * config.columns + column + 1);
            let offset = Vec2::new(column as f32, row as f32) * config.tile_size;
            Slot::new(id, origin + offset)
        })
        .collect()
}

/// Uniform position keeping a tile of `size` fully inside the viewport.
pub fn random_position(size: Vec2, viewport: Vec2, rng: &mut fastrand::Rng) -> Vec2 {
    let room = (viewport - size).max(Vec2::ZERO);
    Vec2::new(rng.f32() * room.x, rng.f32() * room.y)
}

/// A fresh round: every slot free, every tile scattered at random.
pub fn build_board(
    config: &PuzzleConfig,
    viewport: Vec2,
    rng: &mut fastrand::Rng,
) -> Result<Board, BoardError> {
    let slots = slot_grid(config, viewport);
    let tiles = slots
        .iter()
        .map(|slot| {
            let size = config.tile_extent();
            let position = random_position(size, viewport, rng);
            Tile::new(slot.id().owner(), position, size, config.resting_z)
        })
        .collect();

    Board::new(tiles, slots, viewport)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(360.0, 640.0);

    #[test]
    fn slots_form_a_centred_grid() {
        let config = PuzzleConfig::default();
        let slots = slot_grid(&config, VIEWPORT);

        assert_eq!(slots.len(), 24, "4 x 6 grid");
        let first = slots.first().expect("at least one slot");
        assert_eq!(first.id(), SlotId(1), "numbered from 1");
        assert_eq!(first.position(), Vec2::new(20.0, 60.0), "centred, below the margin");

        let last = slots.last().expect("at least one slot");
        assert_eq!(last.id(), SlotId(24), "numbered row by row");
        assert_eq!(last.position(), Vec2::new(260.0, 460.0), "bottom-right slot");
    }

    #[test]
    fn initial_positions_stay_inside_the_viewport() {
        let config = PuzzleConfig::default();
        let mut rng = fastrand::Rng::with_seed(7);

        for _ in 0..50 {
            let board = build_board(&config, VIEWPORT, &mut rng).expect("valid board");
            for tile in board.tiles() {
                let max = VIEWPORT - tile.size();
                let position = tile.position();
                assert!(
                    position.x >= 0.0 && position.x <= max.x,
                    "{} x out of bounds: {position}",
                    tile.id()
                );
                assert!(
                    position.y >= 0.0 && position.y <= max.y,
                    "{} y out of bounds: {position}",
                    tile.id()
                );
            }
            assert_eq!(board.occupied_count(), 0, "nothing placed yet");
        }
    }

    #[test]
    fn tiny_viewport_pins_tiles_to_the_corner() {
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(
            random_position(Vec2::splat(80.0), Vec2::splat(50.0), &mut rng),
            Vec2::ZERO,
            "no room to scatter"
        );
    }

    #[test]
    fn every_tile_has_its_home_slot() {
        let config = PuzzleConfig::default();
        let mut rng = fastrand::Rng::with_seed(3);
        let board = build_board(&config, VIEWPORT, &mut rng).expect("valid board");

        for tile in board.tiles() {
            let id = tile.id();
            assert!(board.slot(id.home()).is_some(), "{id} has a slot");
        }
    }
}
