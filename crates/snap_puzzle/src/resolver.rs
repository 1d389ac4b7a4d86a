use crate::board::{Slot, SlotId, Tile};

/// Closest free slot to the tile's top-left corner, if strictly closer than
/// `threshold`. Equally close slots resolve to the first one in `slots`.
pub fn find_nearest_free_slot(tile: &Tile, slots: &[Slot], threshold: f32) -> Option<SlotId> {
    let mut nearest: Option<(SlotId, f32)> = None;

    for slot in slots.iter().filter(|slot| !slot.is_occupied()) {
        let distance = tile.position().distance(slot.position());
        if distance >= threshold {
            continue;
        }
        if nearest.is_none_or(|(_, best)| distance < best) {
            nearest = Some((slot.id(), distance));
        }
    }

    nearest.map(|(slot, _)| slot)
}
