//! Single pointer gesture tracking.
//!
//! Touches and the left mouse button are folded into one stream of
//! [`PointerEvent`]s in window coordinates (logical pixels, origin at the
//! top-left corner, y pointing down). Only one pointer owns the gesture at a
//! time: extra fingers are ignored until the owning one is lifted.

use bevy::input::InputSystem;
use bevy::input::touch::Touch;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Start,
    Move,
    End,
    /// The platform dropped the pointer without a release (touch cancel,
    /// finger lost between frames, mouse released outside the window).
    Cancel,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Vec2,
}

impl PointerEvent {
    pub const fn new(phase: PointerPhase, position: Vec2) -> Self {
        Self { phase, position }
    }
}

/// Which device currently owns the gesture.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePointer {
    #[default]
    Idle,
    Mouse,
    Touch(u64),
}

pub struct PointerInputPlugin;

impl Plugin for PointerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PointerEvent>()
            .init_resource::<ActivePointer>()
            .add_systems(PreUpdate, track_pointer.after(InputSystem));
    }
}

fn track_pointer(
    mouse_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut active: ResMut<ActivePointer>,
    mut last_position: Local<Vec2>,
    mut events: EventWriter<PointerEvent>,
) {
    let cursor = windows
        .get_single()
        .ok()
        .and_then(Window::cursor_position);

    if *active == ActivePointer::Idle {
        if let Some(touch) = touch_input.iter_just_pressed().next() {
            *active = ActivePointer::Touch(touch.id());
            *last_position = touch.position();
            events.send(PointerEvent::new(PointerPhase::Start, touch.position()));
        } else if mouse_input.just_pressed(MouseButton::Left) {
            if let Some(position) = cursor {
                *active = ActivePointer::Mouse;
                *last_position = position;
                events.send(PointerEvent::new(PointerPhase::Start, position));
            }
        }
    }

    let next = match *active {
        ActivePointer::Idle => return,
        ActivePointer::Touch(id) => track_touch(&touch_input, id, &mut last_position),
        ActivePointer::Mouse => track_mouse(&mouse_input, cursor, &mut last_position),
    };

    if let Some(event) = next {
        if matches!(event.phase, PointerPhase::End | PointerPhase::Cancel) {
            *active = ActivePointer::Idle;
        }
        events.send(event);
    }
}

fn find_touch<'a>(mut touches: impl Iterator<Item = &'a Touch>, id: u64) -> Option<&'a Touch> {
    touches.find(|touch| touch.id() == id)
}

fn track_touch(touch_input: &Touches, id: u64, last_position: &mut Vec2) -> Option<PointerEvent> {
    if let Some(touch) = find_touch(touch_input.iter_just_released(), id) {
        return Some(PointerEvent::new(PointerPhase::End, touch.position()));
    }
    if find_touch(touch_input.iter_just_canceled(), id).is_some() {
        return Some(PointerEvent::new(PointerPhase::Cancel, *last_position));
    }

    // A tap shorter than a frame leaves no trace in `Touches`.
    let Some(touch) = touch_input.get_pressed(id) else {
        return Some(PointerEvent::new(PointerPhase::Cancel, *last_position));
    };

    if touch_input.just_pressed(id) || touch.position() == *last_position {
        return None;
    }
    *last_position = touch.position();
    Some(PointerEvent::new(PointerPhase::Move, touch.position()))
}

fn track_mouse(
    mouse_input: &ButtonInput<MouseButton>,
    cursor: Option<Vec2>,
    last_position: &mut Vec2,
) -> Option<PointerEvent> {
    if mouse_input.just_released(MouseButton::Left) {
        return Some(PointerEvent::new(
            PointerPhase::End,
            cursor.unwrap_or(*last_position),
        ));
    }
    if !mouse_input.pressed(MouseButton::Left) {
        return Some(PointerEvent::new(PointerPhase::Cancel, *last_position));
    }

    let position = cursor?;
    if position == *last_position {
        return None;
    }
    *last_position = position;
    Some(PointerEvent::new(PointerPhase::Move, position))
}
