use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bits_helpers::WINDOW_SIZE;
use bits_helpers::haptics::vibrate;

use crate::config::{ConfettiConfig, PuzzleConfig};
use crate::gameplay::{GameState, PuzzleCompleted};

/// Above every tile, including one being dragged.
const CONFETTI_Z: f32 = 20.0;
/// Confetti motion is tuned per frame at this rate.
const TICKS_PER_SECOND: f32 = 60.0;
/// Gravity is applied three times over per tick.
const GRAVITY_FACTOR: f32 = 3.0;

const CONFETTI_COLORS: [Color; 7] = [
    Color::srgb(0.149, 0.8, 1.0),
    Color::srgb(0.635, 0.353, 0.992),
    Color::srgb(1.0, 0.369, 0.494),
    Color::srgb(0.533, 1.0, 0.353),
    Color::srgb(0.988, 1.0, 0.259),
    Color::srgb(1.0, 0.651, 0.176),
    Color::srgb(1.0, 0.212, 1.0),
];

/// One piece of the completion burst.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ConfettiParticle {
    /// Direction of travel in radians, counter-clockwise from +x
    heading: f32,
    /// Pixels per tick
    speed: f32,
    lifetime: Timer,
}

impl ConfettiParticle {
    /// Draws a particle around the configured launch angle.
    /// `spread_roll` and `speed_roll` are uniform samples in `[0, 1)`.
    pub fn launch(config: &ConfettiConfig, spread_roll: f32, speed_roll: f32) -> Self {
        let spread = config.spread_degrees.to_radians();
        let heading = config.angle_degrees.to_radians() + spread.mul_add(0.5, -spread_roll * spread);
        Self {
            heading,
            speed: config.start_velocity * (0.5 + speed_roll),
            lifetime: Timer::new(config.duration, TimerMode::Once),
        }
    }

    pub const fn heading(&self) -> f32 {
        self.heading
    }

    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Moves by `ticks` frames worth of motion and returns the displacement.
    /// Fractional ticks keep the motion frame-rate independent.
    pub fn advance(&mut self, config: &ConfettiConfig, ticks: f32) -> Vec2 {
        let direction = Vec2::from_angle(self.heading);
        let fall = Vec2::new(0.0, -GRAVITY_FACTOR * config.gravity);
        let displacement = (direction * self.speed + fall) * ticks;
        self.speed *= config.decay.powf(ticks);
        displacement
    }
}

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (celebrate_completion, update_confetti).chain())
            .add_systems(OnExit(GameState::Solved), cleanup_confetti);
    }
}

fn celebrate_completion(
    mut commands: Commands,
    mut completed_events: EventReader<PuzzleCompleted>,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<PuzzleConfig>,
    mut rng: Local<fastrand::Rng>,
) {
    if completed_events.is_empty() {
        return;
    }
    completed_events.clear();

    if !vibrate(&config.haptic_pattern) {
        debug!("Completion vibration not played");
    }

    let viewport = windows
        .get_single()
        .map_or(WINDOW_SIZE, |window| window.size());
    spawn_confetti(&mut commands, &config.confetti, viewport, &mut rng);
}

fn spawn_confetti(
    commands: &mut Commands,
    confetti: &ConfettiConfig,
    viewport: Vec2,
    rng: &mut fastrand::Rng,
) {
    // Launched from the horizontal centre, `origin_y` down from the top.
    let origin = Vec2::new(0.0, viewport.y.mul_add(-confetti.origin_y, viewport.y / 2.0));
    let size = Vec2::splat(confetti.particle_size * confetti.scalar);

    let colors = CONFETTI_COLORS.iter().cycle();
    for &color in colors.take(confetti.particle_count as usize) {
        commands.spawn((
            ConfettiParticle::launch(confetti, rng.f32(), rng.f32()),
            Sprite::from_color(color, size),
            Transform::from_translation(origin.extend(CONFETTI_Z))
                .with_rotation(Quat::from_rotation_z(rng.f32() * core::f32::consts::TAU)),
        ));
    }
    debug!("Spawned {} confetti particles", confetti.particle_count);
}

fn update_confetti(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<PuzzleConfig>,
    mut particles: Query<(Entity, &mut ConfettiParticle, &mut Transform, &mut Sprite)>,
) {
    let ticks = time.delta_secs() * TICKS_PER_SECOND;

    for (entity, mut particle, mut transform, mut sprite) in &mut particles {
        particle.lifetime.tick(time.delta());

        let displacement = particle.advance(&config.confetti, ticks);
        transform.translation += displacement.extend(0.0);
        transform.rotate_z(ticks * 0.1);
        sprite.color = sprite.color.with_alpha(1.0 - particle.lifetime.fraction());

        if particle.lifetime.finished() {
            commands.entity(entity).despawn();
        }
    }
}

fn cleanup_confetti(mut commands: Commands, particles: Query<Entity, With<ConfettiParticle>>) {
    for entity in &particles {
        commands.entity(entity).despawn();
    }
}
