use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bits_helpers::WINDOW_SIZE;
use bits_helpers::input::{PointerEvent, PointerPhase};

use crate::auto_complete::AutoSnap;
use crate::board::{Board, SlotId, TileId};
use crate::config::PuzzleConfig;
use crate::drag::Release;
use crate::layout::build_board;
use crate::visuals::{RoundEntity, spawn_board_visuals};
use crate::win::CompletionEffect;

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Builds a new round, then moves on to `Playing`.
    #[default]
    Setup,
    Playing,
    Solved,
}

/// A tile landed in a slot, by hand or through auto-completion.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSnapped {
    pub tile: TileId,
    pub slot: SlotId,
    pub automatic: bool,
}

/// The board was found solved.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleCompleted;

impl CompletionEffect for EventWriter<'_, PuzzleCompleted> {
    fn trigger_completion_effect(&mut self) {
        self.send(PuzzleCompleted);
    }
}

/// Tile owned by the current pointer gesture.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveDrag(pub Option<TileId>);

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<Board>()
            .init_resource::<ActiveDrag>()
            .add_event::<PointerEvent>()
            .add_event::<TileSnapped>()
            .add_event::<PuzzleCompleted>()
            .add_systems(OnEnter(GameState::Setup), setup_round)
            .add_systems(Update, sync_viewport)
            .add_systems(
                Update,
                (handle_pointer_gestures, enter_solved_state)
                    .chain()
                    .after(sync_viewport)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn setup_round(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    round_entities: Query<Entity, With<RoundEntity>>,
    config: Res<PuzzleConfig>,
    mut board: ResMut<Board>,
    mut active_drag: ResMut<ActiveDrag>,
    mut pointer_events: ResMut<Events<PointerEvent>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for entity in &round_entities {
        commands.entity(entity).despawn_recursive();
    }
    // The tap that asked for this round must not grab a tile of it.
    pointer_events.clear();

    let viewport = windows
        .get_single()
        .map_or(WINDOW_SIZE, |window| window.size());
    let mut rng = fastrand::Rng::new();

    match build_board(&config, viewport, &mut rng) {
        Ok(new_board) => *board = new_board,
        Err(err) => {
            error!("Could not build the puzzle: {err}");
            return;
        }
    }
    active_drag.0 = None;

    spawn_board_visuals(&mut commands, &board, &config);
    info!(
        "New round: {} tiles on a {}x{} viewport",
        board.tiles().len(),
        viewport.x,
        viewport.y
    );
    next_state.set(GameState::Playing);
}

fn sync_viewport(windows: Query<&Window, With<PrimaryWindow>>, mut board: ResMut<Board>) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = window.size();
    if board.viewport() != size {
        board.set_viewport(size);
    }
}

fn handle_pointer_gestures(
    mut pointer_events: EventReader<PointerEvent>,
    mut board: ResMut<Board>,
    mut active_drag: ResMut<ActiveDrag>,
    config: Res<PuzzleConfig>,
    mut snapped_events: EventWriter<TileSnapped>,
    mut completed_events: EventWriter<PuzzleCompleted>,
) {
    for event in pointer_events.read() {
        match event.phase {
            PointerPhase::Start => {
                // A gesture that never ended still owns a tile, drop it first.
                if let Some(stale) = active_drag.0.take() {
                    warn!("{stale} was still dragged when a new gesture started");
                    if release_tile(
                        &mut board,
                        stale,
                        &config,
                        &mut snapped_events,
                        &mut completed_events,
                    ) {
                        break;
                    }
                }

                let Some(tile) = board.tile_at(event.position) else {
                    continue;
                };
                match board.touch_start(tile, event.position, &config) {
                    Ok(()) => active_drag.0 = Some(tile),
                    Err(err) => error!("Could not pick up {tile}: {err}"),
                }
            }
            PointerPhase::Move => {
                let Some(tile) = active_drag.0 else {
                    continue;
                };
                if let Err(err) = board.touch_move(tile, event.position) {
                    error!("Could not move {tile}: {err}");
                }
            }
            // A cancelled touch releases like a lifted finger, so no tile is
            // left stuck in the dragging state. Once the board is solved the
            // remaining gestures of the frame are dropped.
            PointerPhase::End | PointerPhase::Cancel => {
                let Some(tile) = active_drag.0.take() else {
                    continue;
                };
                if release_tile(
                    &mut board,
                    tile,
                    &config,
                    &mut snapped_events,
                    &mut completed_events,
                ) {
                    break;
                }
            }
        }
    }
}

/// Returns whether the release solved the board.
fn release_tile(
    board: &mut Board,
    tile: TileId,
    config: &PuzzleConfig,
    snapped_events: &mut EventWriter<TileSnapped>,
    completed_events: &mut EventWriter<PuzzleCompleted>,
) -> bool {
    match board.touch_end(tile, config, completed_events) {
        Ok(Release::Snapped {
            tile,
            slot,
            auto_snap,
            solved,
        }) => {
            snapped_events.send(TileSnapped {
                tile,
                slot,
                automatic: false,
            });
            if let Some(AutoSnap { tile, slot }) = auto_snap {
                snapped_events.send(TileSnapped {
                    tile,
                    slot,
                    automatic: true,
                });
            }
            if !solved {
                debug!(
                    "{} of {} slots filled",
                    board.occupied_count(),
                    board.slots().len()
                );
            }
            solved
        }
        Ok(Release::Dropped { .. } | Release::NotDragging) => false,
        Err(err) => {
            error!("Could not release {tile}: {err}");
            false
        }
    }
}

fn enter_solved_state(
    mut completed_events: EventReader<PuzzleCompleted>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !completed_events.is_empty() {
        completed_events.clear();
        next_state.set(GameState::Solved);
    }
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::board::{Slot, Tile};
    use crate::config::ConfigPlugin;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, ConfigPlugin, GameplayPlugin));
        for _ in 0..3 {
            app.update();
        }
        app
    }

    /// Three slots in a row and three tiles waiting below them.
    fn three_pair_board() -> Board {
        let size = Vec2::splat(80.0);
        let slots = (1..=3)
            .map(|i| Slot::new(SlotId(i), Vec2::new(i as f32 * 100.0 - 100.0, 50.0)))
            .collect();
        let tiles = (1..=3)
            .map(|i| Tile::new(TileId(i), Vec2::new(i as f32 * 100.0 - 100.0, 400.0), size, 1.0))
            .collect();
        Board::new(tiles, slots, WINDOW_SIZE).expect("valid board")
    }

    fn drag(app: &mut App, from: Vec2, to: Vec2) {
        let world = app.world_mut();
        world.send_event(PointerEvent::new(PointerPhase::Start, from));
        world.send_event(PointerEvent::new(PointerPhase::Move, to));
        world.send_event(PointerEvent::new(PointerPhase::End, to));
        app.update();
    }

    fn state(app: &App) -> GameState {
        app.world().resource::<State<GameState>>().get().clone()
    }

    #[test]
    fn setup_builds_a_round_and_starts_playing() {
        let app = test_app();
        let board = app.world().resource::<Board>();
        let config = app.world().resource::<PuzzleConfig>();

        assert_eq!(state(&app), GameState::Playing, "setup hands over to play");
        assert_eq!(
            board.tiles().len(),
            config.tile_count() as usize,
            "one tile per slot"
        );
        assert_eq!(board.occupied_count(), 0, "fresh round");
    }

    #[test]
    fn dragging_every_tile_home_solves_the_puzzle() {
        let mut app = test_app();
        app.world_mut().insert_resource(three_pair_board());

        // Grab each tile 10px inside its corner and drop it near its slot.
        drag(&mut app, Vec2::new(10.0, 410.0), Vec2::new(13.0, 62.0));
        drag(&mut app, Vec2::new(110.0, 410.0), Vec2::new(108.0, 58.0));
        assert_eq!(
            app.world().resource::<Events<TileSnapped>>().len(),
            2,
            "two snaps reported"
        );
        assert_eq!(state(&app), GameState::Playing, "one tile left");

        drag(&mut app, Vec2::new(210.0, 410.0), Vec2::new(211.0, 61.0));
        let board = app.world().resource::<Board>();
        assert!(board.is_won(5.0), "all tiles home");
        assert_eq!(
            app.world().resource::<Events<PuzzleCompleted>>().len(),
            1,
            "completion requested once"
        );
        assert_eq!(app.world().resource::<ActiveDrag>().0, None, "gesture over");

        app.update();
        assert_eq!(state(&app), GameState::Solved, "round is over");
    }

    #[test]
    fn cancelled_touch_releases_the_tile() {
        let mut app = test_app();
        app.world_mut().insert_resource(three_pair_board());

        let world = app.world_mut();
        world.send_event(PointerEvent::new(PointerPhase::Start, Vec2::new(10.0, 410.0)));
        world.send_event(PointerEvent::new(PointerPhase::Move, Vec2::new(15.0, 60.0)));
        world.send_event(PointerEvent::new(PointerPhase::Cancel, Vec2::new(15.0, 60.0)));
        app.update();

        let board = app.world().resource::<Board>();
        let tile = board.tile(TileId(1)).expect("tile 1");
        assert_eq!(tile.slot(), Some(SlotId(1)), "cancel snaps like a release");
        assert_eq!(app.world().resource::<ActiveDrag>().0, None, "gesture over");
    }

    #[test]
    fn new_gesture_releases_the_tile_still_dragged() {
        let mut app = test_app();
        app.world_mut().insert_resource(three_pair_board());

        let world = app.world_mut();
        world.send_event(PointerEvent::new(PointerPhase::Start, Vec2::new(10.0, 410.0)));
        world.send_event(PointerEvent::new(PointerPhase::Move, Vec2::new(13.0, 62.0)));
        // The end of the first gesture never arrives.
        world.send_event(PointerEvent::new(PointerPhase::Start, Vec2::new(110.0, 410.0)));
        app.update();

        let board = app.world().resource::<Board>();
        assert_eq!(
            board.tile(TileId(1)).expect("tile 1").slot(),
            Some(SlotId(1)),
            "stale tile was released into the slot under it"
        );
        assert!(
            board.tile(TileId(2)).expect("tile 2").is_dragging(),
            "second tile picked up"
        );
        assert_eq!(
            app.world().resource::<ActiveDrag>().0,
            Some(TileId(2)),
            "new gesture owns tile 2"
        );
        assert_eq!(board.check_invariants(), Ok(()), "occupancy consistent");
        assert_eq!(
            app.world().resource::<Events<TileSnapped>>().len(),
            1,
            "one snap reported"
        );
    }

    #[test]
    fn gestures_after_the_winning_release_are_dropped() {
        let mut app = test_app();
        app.world_mut().insert_resource(three_pair_board());
        drag(&mut app, Vec2::new(10.0, 410.0), Vec2::new(10.0, 60.0));
        drag(&mut app, Vec2::new(110.0, 410.0), Vec2::new(110.0, 60.0));

        let world = app.world_mut();
        world.send_event(PointerEvent::new(PointerPhase::Start, Vec2::new(210.0, 410.0)));
        world.send_event(PointerEvent::new(PointerPhase::Move, Vec2::new(210.0, 60.0)));
        world.send_event(PointerEvent::new(PointerPhase::End, Vec2::new(210.0, 60.0)));
        // Same frame: a new touch on tile 1, sitting in slot 1.
        world.send_event(PointerEvent::new(PointerPhase::Start, Vec2::new(20.0, 70.0)));
        world.send_event(PointerEvent::new(PointerPhase::Move, Vec2::new(20.0, 300.0)));
        app.update();

        let board = app.world().resource::<Board>();
        assert!(board.is_won(5.0), "winning board left untouched");
        assert_eq!(app.world().resource::<ActiveDrag>().0, None, "no tile picked up");

        app.update();
        assert_eq!(state(&app), GameState::Solved, "round is over");
    }

    #[test]
    fn touch_on_empty_board_area_does_nothing() {
        let mut app = test_app();
        app.world_mut().insert_resource(three_pair_board());
        let before = app.world().resource::<Board>().clone();

        drag(&mut app, Vec2::new(350.0, 620.0), Vec2::new(10.0, 50.0));

        assert_eq!(
            *app.world().resource::<Board>(),
            before,
            "no tile under the pointer"
        );
    }
}
