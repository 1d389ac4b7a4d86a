use core::time::Duration;

use bevy::prelude::*;

use crate::board::{Board, SlotId, Tile, TileId};
use crate::config::PuzzleConfig;
use crate::gameplay::TileSnapped;

const SLOT_COLOR: Color = Color::srgb(0.18, 0.18, 0.22);
const SLOT_TEXT_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.15);
const TILE_TEXT_COLOR: Color = Color::srgba(0.0, 0.0, 0.0, 0.7);
/// Gap left around each square so neighbours stay distinguishable.
const INSET: f32 = 2.0;
/// Separates tiles sharing a z-order; later tiles draw on top.
const Z_STEP: f32 = 0.01;
const SNAP_PULSE: Duration = Duration::from_millis(150);
const SNAP_PULSE_SCALE: f32 = 1.08;

/// Despawned when a new round starts.
#[derive(Component)]
pub struct RoundEntity;

#[derive(Component)]
pub struct TileVisual {
    pub id: TileId,
}

#[derive(Component)]
pub struct SlotVisual {
    pub id: SlotId,
}

/// Short scale bump played when a tile lands in a slot.
#[derive(Component)]
struct SnapPulse(Timer);

pub struct VisualsPlugin;

impl Plugin for VisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            PostUpdate,
            (sync_board_transforms, start_snap_pulse, animate_snap_pulse)
                .chain()
                .before(TransformSystem::TransformPropagate),
        );
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Centre of a box given by its top-left corner in viewport pixels, in world
/// space of a default 2D camera (origin at the window centre, y up).
pub fn viewport_to_world(top_left: Vec2, size: Vec2, viewport: Vec2) -> Vec2 {
    let center = top_left + size / 2.0;
    Vec2::new(center.x - viewport.x / 2.0, viewport.y / 2.0 - center.y)
}

fn tile_depth(tile: &Tile) -> f32 {
    (tile.id().0 as f32).mul_add(Z_STEP, tile.z())
}

/// Gives every tile a hue following its home position, so a solved board
/// reads as one smooth gradient.
fn tile_color(id: TileId, config: &PuzzleConfig) -> Color {
    let index = id.0.saturating_sub(1);
    let column = (index % config.columns.max(1)) as f32 / config.columns.max(1) as f32;
    let row = (index / config.columns.max(1)) as f32 / config.rows.max(1) as f32;
    Color::hsl(360.0 * row.mul_add(0.75, column * 0.25), 0.65, 0.6)
}

pub fn spawn_board_visuals(commands: &mut Commands, board: &Board, config: &PuzzleConfig) {
    let viewport = board.viewport();
    let square = config.tile_extent() - Vec2::splat(INSET * 2.0);
    let font_size = config.tile_size * 0.4;

    for slot in board.slots() {
        let center = viewport_to_world(slot.position(), config.tile_extent(), viewport);
        commands
            .spawn((
                Sprite::from_color(SLOT_COLOR, square),
                Transform::from_translation(center.extend(0.0)),
                SlotVisual { id: slot.id() },
                RoundEntity,
            ))
            .with_child((
                Text2d::new(slot.id().0.to_string()),
                TextFont {
                    font_size,
                    ..default()
                },
                TextColor(SLOT_TEXT_COLOR),
                Transform::from_xyz(0.0, 0.0, Z_STEP / 2.0),
            ));
    }

    for tile in board.tiles() {
        let center = viewport_to_world(tile.position(), tile.size(), viewport);
        commands
            .spawn((
                Sprite::from_color(tile_color(tile.id(), config), tile.size() - INSET * 2.0),
                Transform::from_translation(center.extend(tile_depth(tile))),
                TileVisual { id: tile.id() },
                RoundEntity,
            ))
            .with_child((
                Text2d::new(tile.id().0.to_string()),
                TextFont {
                    font_size,
                    ..default()
                },
                TextColor(TILE_TEXT_COLOR),
                Transform::from_xyz(0.0, 0.0, Z_STEP / 2.0),
            ));
    }
}

/// Re-places slots and tiles whenever the board changed, including a new
/// viewport size, so snapped tiles stay drawn on their slots.
fn sync_board_transforms(
    board: Res<Board>,
    mut tiles: Query<(&TileVisual, &mut Transform), Without<SlotVisual>>,
    mut slots: Query<(&SlotVisual, &mut Transform), Without<TileVisual>>,
) {
    if !board.is_changed() {
        return;
    }

    let viewport = board.viewport();
    for (visual, mut transform) in &mut slots {
        let Some(slot) = board.slot(visual.id) else {
            continue;
        };
        let size = board
            .tile(visual.id.owner())
            .map_or(Vec2::ZERO, Tile::size);
        let center = viewport_to_world(slot.position(), size, viewport);
        transform.translation = center.extend(transform.translation.z);
    }
    for (visual, mut transform) in &mut tiles {
        let Some(tile) = board.tile(visual.id) else {
            continue;
        };
        let center = viewport_to_world(tile.position(), tile.size(), viewport);
        transform.translation = center.extend(tile_depth(tile));
    }
}

fn start_snap_pulse(
    mut commands: Commands,
    mut snapped_events: EventReader<TileSnapped>,
    tiles: Query<(Entity, &TileVisual)>,
) {
    for snapped in snapped_events.read() {
        if let Some((entity, _)) = tiles.iter().find(|(_, visual)| visual.id == snapped.tile) {
            commands
                .entity(entity)
                .insert(SnapPulse(Timer::new(SNAP_PULSE, TimerMode::Once)));
        }
    }
}

fn animate_snap_pulse(
    mut commands: Commands,
    time: Res<Time>,
    mut pulses: Query<(Entity, &mut SnapPulse, &mut Transform)>,
) {
    for (entity, mut pulse, mut transform) in &mut pulses {
        pulse.0.tick(time.delta());
        let bump = (SNAP_PULSE_SCALE - 1.0).mul_add(1.0 - pulse.0.fraction(), 1.0);
        transform.scale = Vec3::splat(bump);

        if pulse.0.finished() {
            transform.scale = Vec3::ONE;
            commands.entity(entity).remove::<SnapPulse>();
        }
    }
}
