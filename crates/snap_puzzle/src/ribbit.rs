use bevy::prelude::*;
use bits_helpers::RibbitMessageHandler;
use ribbit_bits::{BitDuration, BitResult};

use crate::board::Board;
use crate::config::PuzzleConfig;
use crate::gameplay::GameState;

#[derive(Default, Clone, Copy)]
pub struct SnapPuzzle;

impl RibbitMessageHandler for SnapPuzzle {
    fn restart(world: &mut World) {
        info!("Restarting snap puzzle");

        world
            .resource_mut::<NextState<GameState>>()
            .set(GameState::Setup);
    }

    fn end(world: &mut World) -> BitResult {
        let tolerance = world
            .get_resource::<PuzzleConfig>()
            .map_or(0.0, |config| config.placement_tolerance);
        let solved = world
            .get_resource::<Board>()
            .is_some_and(|board| board.is_won(tolerance));
        info!("Ending snap puzzle, solved: {solved}");

        if solved {
            BitResult::Success
        } else {
            BitResult::Failure
        }
    }

    fn duration(_world: &mut World) -> BitDuration {
        BitDuration::max_duration()
    }
}
