use bevy::prelude::*;
use bits_helpers::input::{PointerEvent, PointerPhase};

use crate::config::PuzzleConfig;
use crate::gameplay::GameState;

const BANNER_FONT_SIZE: f32 = 48.0;
const BANNER_Y: f32 = 240.0;
const BANNER_Z: f32 = 30.0;

#[derive(Component)]
struct ResultBanner;

/// Blocks a new round until it finished, so the winning drag does not
/// immediately restart the game.
#[derive(Resource)]
struct ResultTimer(Timer);

pub struct ScreenPlugin;

impl Plugin for ScreenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Solved), show_result)
            .add_systems(
                Update,
                tap_for_new_round.run_if(in_state(GameState::Solved)),
            )
            .add_systems(OnExit(GameState::Solved), hide_result);
    }
}

fn show_result(mut commands: Commands, config: Res<PuzzleConfig>) {
    commands.spawn((
        Text2d::new("Good job!"),
        TextFont {
            font_size: BANNER_FONT_SIZE,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
        Transform::from_xyz(0.0, BANNER_Y, BANNER_Z),
        ResultBanner,
    ));
    commands.insert_resource(ResultTimer(Timer::new(config.result_delay, TimerMode::Once)));
}

fn tap_for_new_round(
    time: Res<Time>,
    mut timer: ResMut<ResultTimer>,
    mut pointer_events: EventReader<PointerEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    timer.0.tick(time.delta());
    let tapped = pointer_events
        .read()
        .any(|event| event.phase == PointerPhase::Start);

    if tapped && timer.0.finished() {
        debug!("Starting a new round");
        next_state.set(GameState::Setup);
    }
}

fn hide_result(mut commands: Commands, banners: Query<Entity, With<ResultBanner>>) {
    for entity in &banners {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<ResultTimer>();
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::config::ConfigPlugin;
    use crate::gameplay::GameplayPlugin;

    fn solved_app(result_delay: Duration) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_resource(PuzzleConfig {
                result_delay,
                ..PuzzleConfig::default()
            })
            .add_plugins((ConfigPlugin, GameplayPlugin, ScreenPlugin));
        app.update();
        app.update();
        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(GameState::Solved);
        app.update();
        app
    }

    fn state(app: &App) -> GameState {
        app.world().resource::<State<GameState>>().get().clone()
    }

    fn banner_count(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<(), With<ResultBanner>>()
            .iter(app.world())
            .count()
    }

    fn tap(app: &mut App) {
        app.world_mut()
            .send_event(PointerEvent::new(PointerPhase::Start, Vec2::new(180.0, 320.0)));
        app.update();
    }

    #[test]
    fn solved_shows_the_banner() {
        let mut app = solved_app(Duration::from_secs(2));

        assert_eq!(state(&app), GameState::Solved, "round is over");
        assert_eq!(banner_count(&mut app), 1, "one banner");
    }

    #[test]
    fn early_tap_is_ignored() {
        let mut app = solved_app(Duration::from_secs(60));

        tap(&mut app);
        app.update();

        assert_eq!(state(&app), GameState::Solved, "result delay not over");
    }

    #[test]
    fn tap_after_the_delay_starts_a_new_round() {
        let mut app = solved_app(Duration::ZERO);

        tap(&mut app);
        app.update();
        app.update();

        assert_eq!(state(&app), GameState::Playing, "a fresh round is running");
        assert_eq!(banner_count(&mut app), 0, "banner removed");
        assert!(
            app.world().get_resource::<ResultTimer>().is_none(),
            "timer removed"
        );
    }
}
