//! Snap puzzle: drag numbered tiles into the slot grid. Tiles snap into a
//! free slot when released close to it, and the round is won once every tile
//! rests in its own slot.

use bevy::prelude::*;
use bits_helpers::input::PointerInputPlugin;

pub mod auto_complete;
pub mod board;
pub mod config;
pub mod drag;
pub mod effects;
pub mod gameplay;
pub mod layout;
pub mod resolver;
mod ribbit;
mod screen;
pub mod visuals;
pub mod win;

pub use ribbit::SnapPuzzle;

pub struct PuzzlePlugin;

impl Plugin for PuzzlePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            config::ConfigPlugin,
            PointerInputPlugin,
            gameplay::GameplayPlugin,
            visuals::VisualsPlugin,
            effects::EffectsPlugin,
            screen::ScreenPlugin,
        ));
    }
}

pub fn run() {
    bits_helpers::get_default_app::<SnapPuzzle>(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        .add_plugins(PuzzlePlugin)
        .run();
}
