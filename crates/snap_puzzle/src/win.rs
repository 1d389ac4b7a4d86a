use tracing::info;

use crate::board::{Board, Slot};

/// Receives the request to celebrate a solved board.
pub trait CompletionEffect {
    fn trigger_completion_effect(&mut self);
}

impl Board {
    /// Whether the tile belonging to `slot` sits on it, within `tolerance` on
    /// both axes. The tile currently snapped there does not matter.
    pub fn is_correctly_placed(&self, slot: &Slot, tolerance: f32) -> bool {
        self.tile(slot.id().owner()).is_some_and(|tile| {
            let delta = (tile.position() - slot.position()).abs();
            delta.x < tolerance && delta.y < tolerance
        })
    }

    /// Every slot is occupied and every tile sits on its own slot.
    pub fn is_won(&self, tolerance: f32) -> bool {
        let all_occupied = self.slots().iter().all(Slot::is_occupied);
        all_occupied
            && self
                .slots()
                .iter()
                .all(|slot| self.is_correctly_placed(slot, tolerance))
    }
}

/// Requests the completion effect when the board is won.
///
/// There is no memory of earlier wins: every call on a won board fires the
/// effect again. Callers that only want one celebration per round have to
/// stop calling once it fired.
pub fn check_completion(
    board: &Board,
    tolerance: f32,
    effect: &mut impl CompletionEffect,
) -> bool {
    if !board.is_won(tolerance) {
        return false;
    }

    info!("Puzzle solved with {} tiles", board.tiles().len());
    effect.trigger_completion_effect();
    true
}
